// ── HTML markup ──
//
// Serializes a `Surface` as an HTML fragment for `ghwatch --snapshot`.
// Every backend-supplied string passes through `escape`, so getter keys,
// executor names and values can never inject markup.

use std::fmt::Write as _;

use crate::language::Language;
use crate::render::{Panel, Surface};
use crate::view::{ModeBadge, RecordView, Validity};

/// Escape the five HTML-significant characters.
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn pill(class: &str, text: &str) -> String {
    format!(r#"<span class="pill {class}">{}</span>"#, escape(text))
}

fn validity_pill(validity: Validity) -> String {
    match validity {
        Validity::Valid => pill("good", validity.label()),
        Validity::Invalid => pill("bad", validity.label()),
    }
}

fn mode_pill(mode: &ModeBadge) -> String {
    pill(if mode.nominal { "good" } else { "warn" }, &mode.label)
}

/// One record as an `item` block.
pub fn render_record(record: &RecordView) -> String {
    let mut title = format!(r#"<span class="mono">{}</span>"#, escape(&record.label));
    if let Some(secondary) = &record.secondary {
        let _ = write!(
            title,
            r#" <span class="mono muted">{}</span>"#,
            escape(secondary)
        );
    }

    let mut meta = vec![
        pill("muted", &record.type_badge()),
        validity_pill(record.validity),
    ];
    if let Some(mode) = &record.mode {
        meta.push(mode_pill(mode));
    }
    meta.push(pill("muted", &record.stamp_badge()));

    format!(
        concat!(
            r#"<div class="item">"#,
            r#"<div class="left"><div class="k">{title}</div><div class="meta">{meta}</div></div>"#,
            r#"<div class="right">{value}</div>"#,
            "</div>"
        ),
        title = title,
        meta = meta.join(" "),
        value = pill("mono", record.value_text()),
    )
}

/// Inner HTML of one panel.
pub fn render_panel(panel: &Panel, language: Language) -> String {
    match panel {
        Panel::Rows(rows) => rows.iter().map(render_record).collect(),
        Panel::Empty => format!(
            r#"<div class="small muted">{}</div>"#,
            escape(language.no_data())
        ),
        Panel::Error(message) => format!(r#"<div class="small bad">{}</div>"#, escape(message)),
        Panel::Pending => format!(
            r#"<div class="small muted">{}</div>"#,
            escape(language.loading())
        ),
    }
}

/// The whole surface: header counters plus both panels.
pub fn render_surface(surface: &Surface, language: Language) -> String {
    let dot = if surface.connectivity.is_healthy() {
        "good"
    } else {
        "bad"
    };
    format!(
        concat!(
            r#"<div class="dot {dot}"></div>"#,
            r#"<section id="getters" data-count="{gc}">{getters}</section>"#,
            r#"<section id="executors" data-count="{ec}">{executors}</section>"#,
        ),
        dot = dot,
        gc = surface.getter_count,
        getters = render_panel(&surface.getters, language),
        ec = surface.executor_count,
        executors = render_panel(&surface.executors, language),
    )
}
