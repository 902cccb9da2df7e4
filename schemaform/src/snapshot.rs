//! Records exchanged with the gateway over the transport.
//!
//! Parsing is total: fields with an unexpected type are treated as absent
//! instead of failing the whole response.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::hints::UiHints;

/// One validation problem reported by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub message: String,
}

/// Configuration as last fetched from the gateway.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Structured configuration, when the gateway could parse it.
    pub config: Option<Map<String, Value>>,
    /// File text exactly as stored.
    pub raw: Option<String>,
    /// Whether the stored config passed validation; `None` if not reported.
    pub valid: Option<bool>,
    pub issues: Vec<Issue>,
}

impl Snapshot {
    pub fn from_value(value: &Value) -> Self {
        let issues = value
            .get("issues")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(|v| serde_json::from_value::<Issue>(v.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            config: value.get("config").and_then(Value::as_object).cloned(),
            raw: value.get("raw").and_then(Value::as_str).map(str::to_string),
            valid: value.get("valid").and_then(Value::as_bool),
            issues,
        }
    }

    /// The structured config as a tree, `{}` when absent.
    pub fn config_value(&self) -> Value {
        Value::Object(self.config.clone().unwrap_or_default())
    }
}

/// Schema bundle served by `config.schema`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaResponse {
    pub schema: Option<Value>,
    pub ui_hints: UiHints,
    pub version: Option<String>,
}

impl SchemaResponse {
    pub fn from_value(value: &Value) -> Self {
        Self {
            schema: value.get("schema").filter(|v| !v.is_null()).cloned(),
            ui_hints: UiHints::from_value(value.get("uiHints")),
            version: value.get("version").and_then(Value::as_str).map(str::to_string),
        }
    }
}

/// Text form used to persist a config: 2-space indented JSON plus newline.
pub fn serialize_config(value: &Value) -> serde_json::Result<String> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_snapshot_tolerates_bad_fields() {
        let snap = Snapshot::from_value(&json!({
            "config": [1, 2],
            "raw": 5,
            "valid": "yes",
            "issues": [{"path": "slack", "message": "bad"}, 3, {"message": "no path"}]
        }));
        assert_eq!(snap.config, None);
        assert_eq!(snap.raw, None);
        assert_eq!(snap.valid, None);
        assert_eq!(snap.issues.len(), 2);
        assert_eq!(snap.issues[1].path, "");
        assert_eq!(snap.config_value(), json!({}));
    }

    #[test]
    fn test_serialized_text_round_trips() {
        let tree = json!({"slack": {"botToken": "x", "channels": [{"name": "a"}]}, "n": 1.5});
        let text = serialize_config(&tree).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\n  \"slack\": {"));
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn test_schema_response() {
        let resp = SchemaResponse::from_value(&json!({
            "schema": {"type": "object"},
            "uiHints": {"slack.botToken": {"sensitive": true}},
            "version": "2026.1"
        }));
        assert!(resp.schema.is_some());
        assert_eq!(resp.ui_hints.len(), 1);
        assert_eq!(resp.version.as_deref(), Some("2026.1"));
    }
}
