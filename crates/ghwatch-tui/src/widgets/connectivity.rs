//! Connectivity dot: ● healthy / ○ unhealthy.

use ratatui::style::Style;
use ratatui::text::Span;

use ghwatch_core::Connectivity;

use crate::theme;

pub fn connectivity_span(connectivity: Connectivity) -> Span<'static> {
    let (symbol, label, color) = match connectivity {
        Connectivity::Healthy => ("●", "ok", theme::SUCCESS_GREEN),
        Connectivity::Unhealthy => ("○", "down", theme::ERROR_RED),
    };
    Span::styled(format!("{symbol} {label}"), Style::default().fg(color))
}
