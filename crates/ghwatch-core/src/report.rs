// ── Error / connectivity reporter ──
//
// A failed cycle marks the backend unreachable and replaces both panels
// with the same inline message. Counts from the last good surface stay.

use chrono::{DateTime, Utc};

use crate::error::CoreError;
use crate::language::Language;
use crate::render::{Connectivity, Panel, Surface};

/// The inline text shown in both panels, e.g. `Load error: /getters -> 500`.
pub fn failure_message(err: &CoreError, language: Language) -> String {
    format!("{}: {err}", language.load_error())
}

/// Surface for a failed cycle stamped `at`, derived from the one currently
/// displayed.
pub fn failure_surface(
    previous: &Surface,
    err: &CoreError,
    language: Language,
    cycle: u64,
    at: DateTime<Utc>,
) -> Surface {
    let message = failure_message(err, language);
    Surface {
        connectivity: Connectivity::Unhealthy,
        getter_count: previous.getter_count,
        executor_count: previous.executor_count,
        getters: Panel::Error(message.clone()),
        executors: Panel::Error(message),
        cycle,
        rendered_at: Some(at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn failure_replaces_both_panels_and_keeps_counts() {
        let previous = Surface {
            connectivity: Connectivity::Healthy,
            getter_count: 4,
            executor_count: 2,
            getters: Panel::Empty,
            executors: Panel::Empty,
            cycle: 1,
            rendered_at: None,
        };
        let err = CoreError::HttpStatus {
            path: "/executors".into(),
            status: 500,
        };

        let at = Utc::now();
        let surface = failure_surface(&previous, &err, Language::English, 2, at);

        let expected = Panel::Error("Load error: /executors -> 500".into());
        assert_eq!(surface.getters, expected);
        assert_eq!(surface.executors, expected);
        assert_eq!(surface.connectivity, Connectivity::Unhealthy);
        assert_eq!(surface.getter_count, 4);
        assert_eq!(surface.executor_count, 2);
        assert_eq!(surface.cycle, 2);
        assert_eq!(surface.rendered_at, Some(at));
    }

    #[test]
    fn message_is_localized() {
        let err = CoreError::Unreachable {
            path: "/status".into(),
            reason: "connection refused".into(),
        };
        assert_eq!(
            failure_message(&err, Language::Russian),
            "Ошибка загрузки: /status: backend unreachable: connection refused"
        );
    }
}
