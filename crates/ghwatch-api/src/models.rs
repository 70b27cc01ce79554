// Wire types for the status backend.
//
// Every field the backend may omit is an `Option` with a documented fallback
// applied by the view model builder; nothing here is a free-form map except
// the keyed collections the backend itself defines.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Declared value type per entity name, used for display annotation only.
/// A `null` type reads as undeclared.
pub type TypeSchema = BTreeMap<String, Option<String>>;

/// `GET /getters`: getter name → current entry. Ordered by key. A `null`
/// entry still counts as a getter, with every field absent.
pub type GetterMap = BTreeMap<String, Option<GetterEntry>>;

/// `GET /executors`: executors in backend order.
pub type ExecutorList = Vec<ExecutorEntry>;

/// `GET /status` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    #[serde(default)]
    pub status: Option<String>,
}

impl StatusReport {
    /// The backend is healthy only when it reports exactly `"ok"`.
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some("ok")
    }
}

/// A value tagged with its runtime type, e.g. `{"type":"float","value":21.5}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedValue {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl TypedValue {
    /// Plain-text rendering of the value: strings unquoted, whole floats
    /// without a trailing `.0`, `null` spelled out.
    pub fn value_text(&self) -> String {
        match &self.value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) if !n.is_i64() && !n.is_u64() => format!("{f}"),
                _ => n.to_string(),
            },
            other => other.to_string(),
        }
    }
}

/// One getter as reported by `GET /getters`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetterEntry {
    #[serde(default)]
    pub valid: Option<bool>,
    #[serde(default)]
    pub stamp_ms: Option<i64>,
    #[serde(default)]
    pub data: Option<TypedValue>,
}

/// `GET /getters/<key>`: a single getter with its key echoed back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetterDetail {
    pub key: String,
    #[serde(flatten)]
    pub entry: GetterEntry,
}

/// One executor as reported by `GET /executors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutorEntry {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub valid: Option<bool>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub stamp_ms: Option<i64>,
    #[serde(default)]
    pub data: Option<TypedValue>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn getter_entry_tolerates_missing_fields() {
        let entry: GetterEntry = serde_json::from_value(json!({})).unwrap();
        assert_eq!(entry, GetterEntry::default());
    }

    #[test]
    fn null_data_is_absent() {
        let entry: ExecutorEntry = serde_json::from_value(json!({
            "id": 2, "name": "pump", "valid": false, "mode": "manual", "stampMs": 0, "data": null
        }))
        .unwrap();
        assert_eq!(entry.id, Some(2));
        assert_eq!(entry.mode.as_deref(), Some("manual"));
        assert_eq!(entry.stamp_ms, Some(0));
        assert!(entry.data.is_none());
    }

    #[test]
    fn value_text_matches_plain_rendering() {
        let cases = [
            (json!(21.5), "21.5"),
            (json!(3.0), "3"),
            (json!(42), "42"),
            (json!(true), "true"),
            (json!("on"), "on"),
            (json!(null), "null"),
        ];
        for (value, expected) in cases {
            let typed = TypedValue {
                kind: Some("x".into()),
                value,
            };
            assert_eq!(typed.value_text(), expected);
        }
    }

    #[test]
    fn status_ok_is_exact() {
        let ok = StatusReport {
            status: Some("ok".into()),
        };
        let shouting = StatusReport {
            status: Some("OK".into()),
        };
        assert!(ok.is_ok());
        assert!(!shouting.is_ok());
        assert!(!StatusReport::default().is_ok());
    }

    #[test]
    fn getter_detail_flattens_entry() {
        let detail: GetterDetail = serde_json::from_value(json!({
            "key": "temp", "valid": true, "stampMs": 12,
            "data": {"type": "double", "value": 21.5}
        }))
        .unwrap();
        assert_eq!(detail.key, "temp");
        assert_eq!(detail.entry.stamp_ms, Some(12));
        assert_eq!(detail.entry.data.unwrap().kind.as_deref(), Some("double"));
    }

    #[test]
    fn null_entries_and_types_decode() {
        let getters: GetterMap = serde_json::from_value(json!({
            "gone": null,
            "temp": {"data": {"type": null, "value": 1}}
        }))
        .unwrap();
        assert_eq!(getters.len(), 2);
        assert!(getters["gone"].is_none());
        let data = getters["temp"].as_ref().unwrap().data.as_ref().unwrap();
        assert!(data.kind.is_none());

        let schema: TypeSchema = serde_json::from_value(json!({"temp": null})).unwrap();
        assert_eq!(schema["temp"], None);
    }
}
