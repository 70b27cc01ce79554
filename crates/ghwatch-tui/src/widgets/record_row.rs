//! One `RecordView` as a table row: label, badges, value.

use ratatui::layout::{Alignment, Constraint};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Row};

use ghwatch_core::{RecordKind, RecordView, Validity};

use crate::theme;

pub const HEADERS: [&str; 6] = ["Name", "Type", "Valid", "Mode", "Stamp", "Value"];

pub fn widths() -> [Constraint; 6] {
    [
        Constraint::Min(12),
        Constraint::Length(14),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(16),
        Constraint::Min(10),
    ]
}

/// The value column is right-aligned, header included.
pub fn header_row() -> Row<'static> {
    Row::new(HEADERS.map(|h| {
        let line = if h == "Value" {
            Line::from(h).alignment(Alignment::Right)
        } else {
            Line::from(h)
        };
        Cell::from(line).style(theme::table_header())
    }))
}

/// Executors show the id followed by the muted name.
fn label_line(record: &RecordView) -> Line<'static> {
    match (record.kind, &record.secondary) {
        (RecordKind::Executor, Some(name)) => Line::from(vec![
            Span::styled(record.label.clone(), theme::title_style()),
            Span::raw(" "),
            Span::styled(name.clone(), theme::muted()),
        ]),
        _ => Line::from(Span::styled(record.label.clone(), theme::title_style())),
    }
}

pub fn record_row(record: &RecordView) -> Row<'static> {
    let validity = match record.validity {
        Validity::Valid => Span::styled(record.validity.label(), theme::good()),
        Validity::Invalid => Span::styled(record.validity.label(), theme::bad()),
    };

    let mode = record.mode.as_ref().map_or_else(
        || Span::raw(""),
        |m| {
            let style = if m.nominal { theme::good() } else { theme::warn() };
            Span::styled(m.label.clone(), style)
        },
    );

    Row::new(vec![
        Cell::from(label_line(record)),
        Cell::from(Span::styled(record.type_badge(), theme::muted())),
        Cell::from(validity),
        Cell::from(mode),
        Cell::from(Span::styled(record.stamp_badge(), theme::muted())),
        Cell::from(
            Line::from(Span::styled(record.value_text().to_owned(), theme::value()))
                .alignment(Alignment::Right),
        ),
    ])
    .style(theme::table_row())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ghwatch_core::Freshness;
    use ratatui::widgets::Table;
    use ratatui::{Terminal, backend::TestBackend};

    fn getter(value: Option<&str>) -> RecordView {
        RecordView {
            kind: RecordKind::Getter,
            key: "temp".into(),
            label: "temp".into(),
            secondary: None,
            declared_type: Some("float".into()),
            validity: Validity::Valid,
            mode: None,
            freshness: Freshness::Millis(12),
            value: value.map(str::to_owned),
        }
    }

    /// Column just past the last non-blank cell of the rendered row.
    fn row_end(record: &RecordView) -> usize {
        let mut terminal = Terminal::new(TestBackend::new(100, 1)).unwrap();
        terminal
            .draw(|f| {
                let table = Table::new([record_row(record)], widths());
                f.render_widget(table, f.area());
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..buffer.area.width)
            .filter(|&x| buffer[(x, 0)].symbol() != " ")
            .map(|x| usize::from(x) + 1)
            .max()
            .unwrap()
    }

    #[test]
    fn values_of_any_width_end_in_the_same_column() {
        let long = row_end(&getter(Some("float:21.5")));
        let short = row_end(&getter(Some("int:1")));
        let missing = row_end(&getter(None));
        assert_eq!(long, short);
        assert_eq!(long, missing);
    }
}
