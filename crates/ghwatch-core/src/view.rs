// ── View model builder ──
//
// Correlates the five payloads of one cycle into per-entity display
// records. Everything here is rebuilt from scratch on every cycle; no
// record outlives the snapshot it was derived from.

use std::fmt;

use ghwatch_api::{
    ExecutorEntry, ExecutorList, GetterEntry, GetterMap, StatusReport, TypeSchema, TypedValue,
};

use crate::filter::SearchFilter;

/// Shown wherever a value is unknown, zero, or absent.
pub const UNKNOWN_PLACEHOLDER: &str = "—";

/// Shown when the schema declares no type for a record.
pub const UNKNOWN_TYPE: &str = "?";

/// The mode an executor is expected to run in.
const NOMINAL_MODE: &str = "AUTO";

// ── Snapshot ─────────────────────────────────────────────────────────

/// All five payloads fetched during a single cycle.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub status: StatusReport,
    pub getter_schema: TypeSchema,
    pub executor_schema: TypeSchema,
    pub getters: GetterMap,
    pub executors: ExecutorList,
}

// ── Record badges ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid,
}

impl Validity {
    /// Missing and `false` both read as invalid.
    pub fn from_flag(flag: Option<bool>) -> Self {
        if flag == Some(true) {
            Self::Valid
        } else {
            Self::Invalid
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        }
    }
}

/// Recency of a value's last update.
///
/// A stamp of `0` is indistinguishable from a missing stamp: both are
/// `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Millis(i64),
    Unknown,
}

impl Freshness {
    pub fn from_stamp(stamp_ms: Option<i64>) -> Self {
        match stamp_ms {
            None | Some(0) => Self::Unknown,
            Some(ms) => Self::Millis(ms),
        }
    }
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Millis(ms) => write!(f, "{ms}ms"),
            Self::Unknown => f.write_str(UNKNOWN_PLACEHOLDER),
        }
    }
}

/// Executor operating mode, uppercased for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeBadge {
    pub label: String,
    /// `true` only for `AUTO`; anything else is a warning.
    pub nominal: bool,
}

impl ModeBadge {
    /// An absent or empty mode yields no badge at all.
    pub fn from_mode(mode: Option<&str>) -> Option<Self> {
        let mode = mode.filter(|m| !m.is_empty())?;
        let label = mode.to_uppercase();
        let nominal = label == NOMINAL_MODE;
        Some(Self { label, nominal })
    }
}

// ── RecordView ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Getter,
    Executor,
}

/// One display row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordView {
    pub kind: RecordKind,
    /// The text the search filter is matched against.
    pub key: String,
    /// Primary label: getter name, or executor id.
    pub label: String,
    /// Executor name, shown muted next to the id.
    pub secondary: Option<String>,
    pub declared_type: Option<String>,
    pub validity: Validity,
    pub mode: Option<ModeBadge>,
    pub freshness: Freshness,
    /// `"<type>:<value>"` when the backend reported a value.
    pub value: Option<String>,
}

impl RecordView {
    /// `type:<declared>` or `type:?`.
    pub fn type_badge(&self) -> String {
        format!(
            "type:{}",
            self.declared_type.as_deref().unwrap_or(UNKNOWN_TYPE)
        )
    }

    /// `stamp:<n>ms` or `stamp:—`.
    pub fn stamp_badge(&self) -> String {
        format!("stamp:{}", self.freshness)
    }

    pub fn value_text(&self) -> &str {
        self.value.as_deref().unwrap_or(UNKNOWN_PLACEHOLDER)
    }
}

// ── DashboardView ────────────────────────────────────────────────────

/// Everything the renderer needs for one successful cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub healthy: bool,
    /// Filtered getters, key order.
    pub getters: Vec<RecordView>,
    /// Filtered executors, id order.
    pub executors: Vec<RecordView>,
    /// Unfiltered getter total.
    pub getter_count: usize,
    /// Unfiltered executor total, duplicates included.
    pub executor_count: usize,
}

/// Build both panels from one cycle's payloads.
pub fn build(snapshot: &Snapshot, filter: &SearchFilter) -> DashboardView {
    // `GetterMap` iterates in key order, so no explicit sort is needed.
    let getters = snapshot
        .getters
        .iter()
        .filter(|(key, _)| filter.matches(key))
        .map(|(key, entry)| getter_record(key, entry.as_ref(), &snapshot.getter_schema))
        .collect();

    let mut executors: Vec<(i64, RecordView)> = snapshot
        .executors
        .iter()
        .map(|entry| (entry.id.unwrap_or(0), executor_record(entry, &snapshot.executor_schema)))
        .filter(|(_, record)| filter.matches(&record.key))
        .collect();
    executors.sort_by_key(|(id, _)| *id);

    DashboardView {
        healthy: snapshot.status.is_ok(),
        getters,
        executors: executors.into_iter().map(|(_, record)| record).collect(),
        getter_count: snapshot.getters.len(),
        executor_count: snapshot.executors.len(),
    }
}

fn getter_record(key: &str, entry: Option<&GetterEntry>, schema: &TypeSchema) -> RecordView {
    RecordView {
        kind: RecordKind::Getter,
        key: key.to_owned(),
        label: key.to_owned(),
        secondary: None,
        declared_type: declared_type(schema, key),
        validity: Validity::from_flag(entry.and_then(|e| e.valid)),
        mode: None,
        freshness: Freshness::from_stamp(entry.and_then(|e| e.stamp_ms)),
        value: entry.and_then(|e| e.data.as_ref()).map(typed_value_text),
    }
}

fn executor_record(entry: &ExecutorEntry, schema: &TypeSchema) -> RecordView {
    let name = entry.name.clone().unwrap_or_default();
    let id_text = entry.id.map(|id| id.to_string());
    // Filter by name, falling back to the id when the name is empty.
    let key = if name.is_empty() {
        id_text.clone().unwrap_or_default()
    } else {
        name.clone()
    };

    RecordView {
        kind: RecordKind::Executor,
        key,
        label: id_text.unwrap_or_else(|| UNKNOWN_PLACEHOLDER.to_owned()),
        declared_type: declared_type(schema, &name),
        secondary: Some(name),
        validity: Validity::from_flag(entry.valid),
        mode: ModeBadge::from_mode(entry.mode.as_deref()),
        freshness: Freshness::from_stamp(entry.stamp_ms),
        value: entry.data.as_ref().map(typed_value_text),
    }
}

fn declared_type(schema: &TypeSchema, name: &str) -> Option<String> {
    schema
        .get(name)
        .and_then(Option::as_deref)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

/// `<type>:<value>`, with `?` for a missing type.
pub fn typed_value_text(data: &TypedValue) -> String {
    let kind = data.kind.as_deref().unwrap_or(UNKNOWN_TYPE);
    format!("{kind}:{}", data.value_text())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn snapshot(getters: serde_json::Value, executors: serde_json::Value) -> Snapshot {
        Snapshot {
            status: StatusReport {
                status: Some("ok".into()),
            },
            getter_schema: serde_json::from_value(json!({"temp": "float"})).unwrap(),
            executor_schema: serde_json::from_value(json!({"pump": "bool"})).unwrap(),
            getters: serde_json::from_value(getters).unwrap(),
            executors: serde_json::from_value(executors).unwrap(),
        }
    }

    #[test]
    fn getter_row_formats_every_badge() {
        let snap = snapshot(
            json!({"temp": {"valid": true, "stampMs": 12, "data": {"type": "float", "value": 21.5}}}),
            json!([]),
        );
        let view = build(&snap, &SearchFilter::default());

        assert_eq!(view.getters.len(), 1);
        let row = &view.getters[0];
        assert_eq!(row.type_badge(), "type:float");
        assert_eq!(row.validity.label(), "valid");
        assert_eq!(row.freshness.to_string(), "12ms");
        assert_eq!(row.value_text(), "float:21.5");
    }

    #[test]
    fn executor_row_with_manual_mode_and_no_data() {
        let snap = snapshot(
            json!({}),
            json!([{"id": 2, "name": "pump", "valid": false, "mode": "manual", "stampMs": 0, "data": null}]),
        );
        let view = build(&snap, &SearchFilter::default());

        let row = &view.executors[0];
        assert_eq!(row.label, "2");
        assert_eq!(row.secondary.as_deref(), Some("pump"));
        assert_eq!(row.type_badge(), "type:bool");
        assert_eq!(
            row.mode,
            Some(ModeBadge {
                label: "MANUAL".into(),
                nominal: false
            })
        );
        assert_eq!(row.validity, Validity::Invalid);
        assert_eq!(row.freshness.to_string(), UNKNOWN_PLACEHOLDER);
        assert_eq!(row.value_text(), UNKNOWN_PLACEHOLDER);
    }

    #[test]
    fn zero_and_missing_stamp_render_the_same() {
        assert_eq!(Freshness::from_stamp(Some(0)), Freshness::from_stamp(None));
        assert_eq!(Freshness::from_stamp(Some(0)).to_string(), UNKNOWN_PLACEHOLDER);
    }

    #[test]
    fn null_getter_and_null_types_fall_back() {
        let snap = snapshot(
            json!({
                "gone": null,
                "temp": {"valid": true, "data": {"type": null, "value": 21.5}}
            }),
            json!([]),
        );
        let view = build(&snap, &SearchFilter::default());
        assert_eq!(view.getter_count, 2);

        let gone = &view.getters[0];
        assert_eq!(gone.key, "gone");
        assert_eq!(gone.validity, Validity::Invalid);
        assert_eq!(gone.freshness, Freshness::Unknown);
        assert_eq!(gone.value_text(), UNKNOWN_PLACEHOLDER);

        assert_eq!(view.getters[1].value_text(), "?:21.5");
    }

    #[test]
    fn unknown_type_uses_marker_never_blank() {
        let snap = snapshot(json!({"humidity": {}}), json!([{"id": 1, "name": "valve"}]));
        let view = build(&snap, &SearchFilter::default());
        assert_eq!(view.getters[0].type_badge(), "type:?");
        assert_eq!(view.executors[0].type_badge(), "type:?");
    }

    #[test]
    fn mode_badge_rules() {
        assert_eq!(ModeBadge::from_mode(None), None);
        assert_eq!(ModeBadge::from_mode(Some("")), None);
        assert!(ModeBadge::from_mode(Some("auto")).unwrap().nominal);
        assert!(ModeBadge::from_mode(Some("Auto")).unwrap().nominal);
        assert!(!ModeBadge::from_mode(Some("autopilot")).unwrap().nominal);
    }

    #[test]
    fn getters_sorted_and_counted_before_filtering() {
        let snap = snapshot(
            json!({"zeta": {}, "alpha": {}, "temp_b": {}, "temp_a": {}}),
            json!([]),
        );
        let view = build(&snap, &SearchFilter::new("TEMP"));

        let keys: Vec<&str> = view.getters.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["temp_a", "temp_b"]);
        assert_eq!(view.getter_count, 4);

        let all = build(&snap, &SearchFilter::new("  "));
        let keys: Vec<&str> = all.getters.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["alpha", "temp_a", "temp_b", "zeta"]);
    }

    #[test]
    fn executors_sorted_by_id_with_missing_as_zero() {
        let snap = snapshot(
            json!({}),
            json!([
                {"id": 5, "name": "e"},
                {"name": "no-id"},
                {"id": -1, "name": "neg"},
                {"id": 5, "name": "dup"},
                {"id": 0, "name": "zero"}
            ]),
        );
        let view = build(&snap, &SearchFilter::default());
        let names: Vec<&str> = view
            .executors
            .iter()
            .map(|r| r.secondary.as_deref().unwrap())
            .collect();
        assert_eq!(names, vec!["neg", "no-id", "zero", "e", "dup"]);
    }

    #[test]
    fn executor_count_includes_duplicates_and_ignores_filter() {
        let snap = snapshot(
            json!({}),
            json!([{"id": 1, "name": "pump"}, {"id": 2, "name": "pump"}, {"id": 3, "name": "fan"}]),
        );
        let view = build(&snap, &SearchFilter::new("fan"));
        assert_eq!(view.executor_count, 3);
        assert_eq!(view.executors.len(), 1);
    }

    #[test]
    fn executor_filter_falls_back_to_id() {
        let snap = snapshot(json!({}), json!([{"id": 42, "name": ""}, {"id": 7, "name": "x42"}]));
        let view = build(&snap, &SearchFilter::new("42"));
        let labels: Vec<&str> = view.executors.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["7", "42"]);
    }

    #[test]
    fn every_visible_row_contains_the_query() {
        let snap = snapshot(
            json!({"Boiler": {}, "boiler_temp": {}, "fan": {}, "OIL": {}}),
            json!([{"id": 1, "name": "SPOILER"}, {"id": 2, "name": "pump"}]),
        );
        let filter = SearchFilter::new("oil");
        let view = build(&snap, &filter);
        for row in view.getters.iter().chain(view.executors.iter()) {
            assert!(row.key.to_lowercase().contains("oil"), "{} leaked", row.key);
        }
        assert_eq!(view.getters.len(), 3);
        assert_eq!(view.executors.len(), 1);
    }

    #[test]
    fn health_follows_status_record() {
        let mut snap = Snapshot::default();
        assert!(!build(&snap, &SearchFilter::default()).healthy);
        snap.status.status = Some("ok".into());
        assert!(build(&snap, &SearchFilter::default()).healthy);
    }
}
