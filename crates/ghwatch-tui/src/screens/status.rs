//! Status screen: getters and executors side by side, with an on-demand
//! getter detail popup.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Table, TableState, Wrap};

use ghwatch_core::view::{UNKNOWN_PLACEHOLDER, typed_value_text};
use ghwatch_core::{Freshness, GetterDetail, Language, Panel, Surface, Validity};

use crate::action::{Action, PanelFocus};
use crate::component::Component;
use crate::theme;
use crate::widgets::record_row;

/// State of the getter detail popup.
#[derive(Debug, Clone)]
enum DetailView {
    Loading(String),
    Loaded(Box<GetterDetail>),
    Failed(String),
}

pub struct StatusScreen {
    language: Language,
    surface: Arc<Surface>,
    focus: PanelFocus,
    getter_state: TableState,
    executor_state: TableState,
    detail: Option<DetailView>,
}

impl StatusScreen {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            surface: Arc::new(Surface::initial()),
            focus: PanelFocus::default(),
            getter_state: TableState::default(),
            executor_state: TableState::default(),
            detail: None,
        }
    }

    fn panel(&self, focus: PanelFocus) -> &Panel {
        match focus {
            PanelFocus::Getters => &self.surface.getters,
            PanelFocus::Executors => &self.surface.executors,
        }
    }

    fn state_mut(&mut self, focus: PanelFocus) -> &mut TableState {
        match focus {
            PanelFocus::Getters => &mut self.getter_state,
            PanelFocus::Executors => &mut self.executor_state,
        }
    }

    /// Key of the highlighted getter, if the getters panel has focus.
    fn selected_getter(&self) -> Option<&str> {
        if self.focus != PanelFocus::Getters {
            return None;
        }
        let idx = self.getter_state.selected()?;
        self.surface
            .getters
            .rows()
            .get(idx)
            .map(|r| r.key.as_str())
    }

    /// Keep both selections inside the (possibly shorter) new row lists.
    fn clamp_selections(&mut self) {
        for focus in [PanelFocus::Getters, PanelFocus::Executors] {
            let len = self.panel(focus).rows().len();
            let state = self.state_mut(focus);
            let selected = match (len, state.selected()) {
                (0, _) => None,
                (_, None) => Some(0),
                (len, Some(idx)) => Some(idx.min(len - 1)),
            };
            state.select(selected);
        }
    }

    fn move_selection(&mut self, forward: bool) {
        let len = self.panel(self.focus).rows().len();
        if len == 0 {
            return;
        }
        let focus = self.focus;
        let state = self.state_mut(focus);
        let current = state.selected().unwrap_or(0);
        let next = if forward {
            (current + 1).min(len - 1)
        } else {
            current.saturating_sub(1)
        };
        state.select(Some(next));
    }

    fn render_panel(&self, frame: &mut Frame, area: Rect, focus: PanelFocus) {
        let (title, count, state) = match focus {
            PanelFocus::Getters => ("Getters", self.surface.getter_count, self.getter_state),
            PanelFocus::Executors => (
                "Executors",
                self.surface.executor_count,
                self.executor_state,
            ),
        };
        let border = if self.focus == focus {
            theme::border_focused()
        } else {
            theme::border_default()
        };
        let block = Block::default()
            .title(format!(" {title} ({count}) "))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match self.panel(focus) {
            Panel::Rows(rows) => {
                let table = Table::new(
                    rows.iter().map(record_row::record_row),
                    record_row::widths(),
                )
                .header(record_row::header_row())
                .row_highlight_style(theme::table_selected());
                let mut state = state;
                frame.render_stateful_widget(table, inner, &mut state);
            }
            Panel::Empty => {
                frame.render_widget(
                    Paragraph::new(self.language.no_data()).style(theme::muted()),
                    inner,
                );
            }
            Panel::Error(message) => {
                frame.render_widget(
                    Paragraph::new(message.as_str())
                        .style(theme::bad())
                        .wrap(Wrap { trim: true }),
                    inner,
                );
            }
            Panel::Pending => {
                frame.render_widget(
                    Paragraph::new(self.language.loading()).style(theme::muted()),
                    inner,
                );
            }
        }
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect, detail: &DetailView) {
        let width = 56u16.min(area.width.saturating_sub(4));
        let height = 9u16.min(area.height.saturating_sub(2));
        let popup = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        );
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" Getter ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let field = |name: &'static str, value: String, style: Style| {
            Line::from(vec![
                Span::styled(format!("  {name:<8}"), theme::key_hint_key()),
                Span::styled(value, style),
            ])
        };

        let mut lines = match detail {
            DetailView::Loading(key) => vec![
                field("key", key.clone(), theme::title_style()),
                Line::from(Span::styled(
                    format!("  {}", self.language.loading()),
                    theme::muted(),
                )),
            ],
            DetailView::Failed(message) => {
                vec![Line::from(Span::styled(format!("  {message}"), theme::bad()))]
            }
            DetailView::Loaded(detail) => {
                let validity = Validity::from_flag(detail.entry.valid);
                let value = detail
                    .entry
                    .data
                    .as_ref()
                    .map_or_else(|| UNKNOWN_PLACEHOLDER.to_owned(), typed_value_text);
                vec![
                    field("key", detail.key.clone(), theme::title_style()),
                    field(
                        "valid",
                        validity.label().to_owned(),
                        if validity == Validity::Valid {
                            theme::good()
                        } else {
                            theme::bad()
                        },
                    ),
                    field(
                        "stamp",
                        Freshness::from_stamp(detail.entry.stamp_ms).to_string(),
                        theme::muted(),
                    ),
                    field("value", value, theme::value()),
                ]
            }
        };
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("  Esc ", theme::key_hint_key()),
            Span::styled("close", theme::key_hint()),
        ]));

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Component for StatusScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.detail.is_some() {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Enter => Some(Action::CloseDetail),
                _ => None,
            });
        }

        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(Action::SelectNext),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::SelectPrev),
            KeyCode::Tab | KeyCode::BackTab => Some(Action::FocusPanel(self.focus.toggle())),
            KeyCode::Enter => self
                .selected_getter()
                .map(|key| Action::OpenGetterDetail(key.to_owned())),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::SurfaceUpdated(surface) => {
                self.surface = Arc::clone(surface);
                self.clamp_selections();
            }
            Action::FocusPanel(focus) => self.focus = *focus,
            Action::SelectNext => self.move_selection(true),
            Action::SelectPrev => self.move_selection(false),
            Action::OpenGetterDetail(key) => {
                self.detail = Some(DetailView::Loading(key.clone()));
            }
            Action::GetterDetailLoaded(detail) => {
                if self.detail.is_some() {
                    self.detail = Some(DetailView::Loaded(detail.clone()));
                }
            }
            Action::GetterDetailFailed(message) => {
                if self.detail.is_some() {
                    self.detail = Some(DetailView::Failed(message.clone()));
                }
            }
            Action::CloseDetail => self.detail = None,
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(area);
        self.render_panel(frame, left, PanelFocus::Getters);
        self.render_panel(frame, right, PanelFocus::Executors);

        if let Some(detail) = &self.detail {
            self.render_detail(frame, area, detail);
        }
    }
}
