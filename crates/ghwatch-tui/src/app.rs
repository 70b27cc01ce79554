//! Application core: event loop, action dispatch, header and search bar.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use ghwatch_core::{CoreError, Dashboard, RefreshInterval, Surface};

use crate::action::Action;
use crate::component::Component;
use crate::data_bridge::spawn_data_bridge;
use crate::event::{Event, EventReader, tick_rate};
use crate::screens::StatusScreen;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::connectivity::connectivity_span;

/// What woke the event loop.
enum Wake {
    Event(Event),
    Action(Action),
}

/// Top-level application state and event loop.
pub struct App {
    dashboard: Dashboard,
    screen: StatusScreen,
    running: bool,
    /// Last surface, kept for the header.
    surface: Arc<Surface>,
    /// Cycles currently fetching; drives the throbber.
    in_flight: usize,
    throbber_state: ThrobberState,
    interval: RefreshInterval,
    search_active: bool,
    search: String,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(dashboard: Dashboard) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let config = dashboard.config();
        let language = config.language;
        let interval = config.refresh_interval;

        Self {
            dashboard,
            screen: StatusScreen::new(language),
            running: true,
            surface: Arc::new(Surface::initial()),
            in_flight: 0,
            throbber_state: ThrobberState::default(),
            interval,
            search_active: false,
            search: String::new(),
            action_tx,
            action_rx,
        }
    }

    /// Run the main event loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        let cancel = CancellationToken::new();
        let bridge = tokio::spawn(spawn_data_bridge(
            self.dashboard.clone(),
            self.action_tx.clone(),
            cancel.clone(),
        ));

        let mut events = EventReader::new(tick_rate(self.in_flight));

        info!("TUI event loop started");
        tui.draw(|frame| self.render(frame))?;

        while self.running {
            let wake = tokio::select! {
                event = events.next() => event.map(Wake::Event),
                Some(action) = self.action_rx.recv() => Some(Wake::Action(action)),
            };
            let action = match wake {
                None => break,
                Some(Wake::Action(action)) => Some(action),
                Some(Wake::Event(Event::Key(key))) => self.handle_key_event(key)?,
                Some(Wake::Event(Event::Tick)) => Some(Action::Tick),
                Some(Wake::Event(Event::Resize)) => None,
            };
            if let Some(action) = action {
                self.process_action(&action).await?;
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action).await?;
            }

            events.set_tick_rate(tick_rate(self.in_flight));
            tui.draw(|frame| self.render(frame))?;
        }

        events.stop();
        cancel.cancel();
        let _ = bridge.await;
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Search input captures everything
    /// except Ctrl+C; otherwise global keys come first and the rest go to
    /// the screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.search_active {
            let action = match key.code {
                KeyCode::Esc => Some(Action::ClearSearch),
                KeyCode::Enter => Some(Action::SubmitSearch),
                KeyCode::Backspace => self
                    .search
                    .pop()
                    .map(|_| Action::SearchChanged(self.search.clone())),
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.search.push(c);
                    Some(Action::SearchChanged(self.search.clone()))
                }
                _ => None,
            };
            return Ok(action);
        }

        match key.code {
            KeyCode::Char('q') => Ok(Some(Action::Quit)),
            KeyCode::Char('r') => Ok(Some(Action::Reload)),
            KeyCode::Char('/') => Ok(Some(Action::OpenSearch)),
            KeyCode::Char('+' | '=') => Ok(Some(Action::IntervalLonger)),
            KeyCode::Char('-') => Ok(Some(Action::IntervalShorter)),
            _ => self.screen.handle_key_event(key),
        }
    }

    async fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Tick => {
                if self.in_flight > 0 {
                    self.throbber_state.calc_next();
                }
            }

            Action::Reload => {
                debug!("manual reload");
                self.dashboard.reload();
            }

            Action::InFlightChanged(n) => self.in_flight = *n,

            Action::OpenSearch => self.search_active = true,

            Action::SearchChanged(query) => {
                self.dashboard.set_filter(query.clone()).await;
            }

            Action::SubmitSearch => self.search_active = false,

            Action::ClearSearch => {
                self.search_active = false;
                if !self.search.is_empty() {
                    self.search.clear();
                    self.dashboard.set_filter(String::new()).await;
                }
            }

            Action::IntervalLonger | Action::IntervalShorter => {
                let next = if matches!(action, Action::IntervalLonger) {
                    self.interval.longer()
                } else {
                    self.interval.shorter()
                };
                if next != self.interval {
                    self.dashboard.set_refresh_interval(next).await;
                    self.interval = next;
                }
            }

            Action::SurfaceUpdated(surface) => {
                self.surface = Arc::clone(surface);
                self.forward(action)?;
            }

            Action::OpenGetterDetail(key) => {
                self.spawn_getter_detail(key.clone());
                self.forward(action)?;
            }

            _ => self.forward(action)?,
        }

        Ok(())
    }

    fn forward(&mut self, action: &Action) -> Result<()> {
        if let Some(follow_up) = self.screen.update(action)? {
            self.action_tx.send(follow_up)?;
        }
        Ok(())
    }

    /// Fetch one getter off the event loop; the result arrives as an action.
    fn spawn_getter_detail(&self, key: String) {
        let dashboard = self.dashboard.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let action = match dashboard.getter_detail(&key).await {
                Ok(detail) => Action::GetterDetailLoaded(Box::new(detail)),
                Err(e @ CoreError::GetterNotFound { .. }) => {
                    Action::GetterDetailFailed(e.to_string())
                }
                Err(e) => Action::GetterDetailFailed(format!(
                    "{}: {e}",
                    dashboard.config().language.load_error()
                )),
            };
            let _ = tx.send(action);
        });
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&mut self, frame: &mut Frame) {
        let show_search = self.search_active || !self.search.is_empty();
        let [header, search, content, hints] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(u16::from(show_search)),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        self.render_header(frame, header);
        if show_search {
            self.render_search(frame, search);
        }
        self.screen.render(frame, content);
        Self::render_hints(frame, hints);
    }

    fn render_header(&mut self, frame: &mut Frame, area: Rect) {
        let [info, spinner] =
            Layout::horizontal([Constraint::Min(1), Constraint::Length(14)]).areas(area);

        let sep = || Span::styled("  │  ", theme::key_hint());
        let mut spans = vec![
            Span::raw(" "),
            connectivity_span(self.surface.connectivity),
            sep(),
            Span::styled(
                self.dashboard.config().base_url.to_string(),
                Style::default().fg(theme::NEON_CYAN),
            ),
            sep(),
            Span::styled("refresh ", theme::key_hint()),
            Span::styled(self.interval.to_string(), theme::key_hint_key()),
        ];
        if let Some(at) = self.surface.rendered_at {
            let age = (Utc::now() - at).to_std().unwrap_or_default();
            spans.push(sep());
            spans.push(Span::styled(
                format!(
                    "cycle #{} at {} ({} ago)",
                    self.surface.cycle,
                    at.with_timezone(&Local).format("%H:%M:%S"),
                    humantime::format_duration(Duration::from_secs(age.as_secs())),
                ),
                theme::muted(),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), info);

        if self.in_flight > 0 {
            let throbber = Throbber::default()
                .label("fetching")
                .style(theme::muted())
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber, spinner, &mut self.throbber_state);
        }
    }

    fn render_search(&self, frame: &mut Frame, area: Rect) {
        let cursor = if self.search_active { "▏" } else { "" };
        let line = Line::from(vec![
            Span::styled(" / ", theme::key_hint_key()),
            Span::styled(format!("{}{cursor}", self.search), theme::title_style()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_hints(frame: &mut Frame, area: Rect) {
        let pairs = [
            ("q", "quit"),
            ("r", "reload"),
            ("/", "search"),
            ("+/-", "interval"),
            ("Tab", "panel"),
            ("j/k", "select"),
            ("Enter", "detail"),
        ];
        let mut spans = vec![Span::raw(" ")];
        for (key, label) in pairs {
            spans.push(Span::styled(format!("{key} "), theme::key_hint_key()));
            spans.push(Span::styled(format!("{label}  "), theme::key_hint()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

