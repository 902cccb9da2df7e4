//! Per-field UI hints and the fallbacks used when a hint is missing.
//!
//! Hints are keyed by the dotted path of object keys. Array indices are
//! skipped when building the lookup key; map keys are kept, so a hint can
//! name one map entry (`plugins.audit`) but not every entry at once.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{path::PathSegment, schema::SchemaNode};

/// Path substrings that mark a field as secret when no hint says otherwise.
pub const SENSITIVE_MARKERS: [&str; 6] = [
    "token",
    "password",
    "secret",
    "apikey",
    "api_key",
    "private_key",
];

/// Presentation overrides for one field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiHint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// Hints keyed by dotted property path.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UiHints(HashMap<String, UiHint>);

impl UiHints {
    /// Parse a hints object, dropping entries that are not valid hints.
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(Value::Object(map)) = value else {
            return Self::default();
        };
        let hints = map
            .iter()
            .filter_map(|(k, v)| match serde_json::from_value::<UiHint>(v.clone()) {
                Ok(h) => Some((k.clone(), h)),
                Err(e) => {
                    warn!("ignoring malformed ui hint for `{k}`: {e}");
                    None
                }
            })
            .collect();
        Self(hints)
    }

    pub fn insert(&mut self, key: impl Into<String>, hint: UiHint) {
        self.0.insert(key.into(), hint);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hint for a value path.
    pub fn get(&self, path: &[PathSegment]) -> Option<&UiHint> {
        self.0.get(&hint_key(path))
    }

    /// Display label: hint, then schema title, then the humanized key.
    pub fn label(&self, path: &[PathSegment], schema: Option<&SchemaNode>) -> String {
        if let Some(label) = self.get(path).and_then(|h| h.label.clone()) {
            return label;
        }
        if let Some(title) = schema.and_then(|s| s.title.clone()) {
            return title;
        }
        path.iter()
            .rev()
            .find_map(PathSegment::as_key)
            .map(humanize)
            .unwrap_or_default()
    }

    /// Help text: hint, then schema description.
    pub fn help(&self, path: &[PathSegment], schema: Option<&SchemaNode>) -> Option<String> {
        self.get(path)
            .and_then(|h| h.help.clone())
            .or_else(|| schema.and_then(|s| s.description.clone()))
    }

    pub fn placeholder(&self, path: &[PathSegment]) -> Option<String> {
        self.get(path).and_then(|h| h.placeholder.clone())
    }

    /// Whether the field holds a secret.
    pub fn is_sensitive(&self, path: &[PathSegment]) -> bool {
        self.get(path)
            .and_then(|h| h.sensitive)
            .unwrap_or_else(|| looks_sensitive(path))
    }

    pub fn order(&self, path: &[PathSegment]) -> Option<i64> {
        self.get(path).and_then(|h| h.order)
    }
}

/// Lookup key of a path: its object-key segments joined with `.`.
pub fn hint_key(path: &[PathSegment]) -> String {
    path.iter()
        .filter_map(PathSegment::as_key)
        .collect::<Vec<_>>()
        .join(".")
}

/// Heuristic secret detection on the path's key segments.
pub fn looks_sensitive(path: &[PathSegment]) -> bool {
    path.iter().filter_map(PathSegment::as_key).any(|seg| {
        let seg = seg.to_ascii_lowercase();
        SENSITIVE_MARKERS.iter().any(|m| seg.contains(m))
    })
}

/// `botToken` -> `Bot Token`, `media_max_mb` -> `Media max mb`.
pub fn humanize(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev: Option<char> = None;
    for c in key.chars() {
        if c == '_' {
            out.push(' ');
        } else {
            if c.is_uppercase()
                && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit())
            {
                out.push(' ');
            }
            out.push(c);
        }
        prev = Some(c);
    }

    let mut chars = out.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => out,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::path;

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("botToken"), "Bot Token");
        assert_eq!(humanize("media_max_mb"), "Media max mb");
        assert_eq!(humanize("http2Enabled"), "Http2 Enabled");
        assert_eq!(humanize("URL"), "URL");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn test_sensitive_heuristic_and_override() {
        let mut hints = UiHints::default();
        assert!(hints.is_sensitive(&path!["slack", "botToken"]));
        assert!(hints.is_sensitive(&path!["signal", "apiKey"]));
        assert!(!hints.is_sensitive(&path!["slack", "enabled"]));

        hints.insert(
            "slack.botToken",
            UiHint {
                sensitive: Some(false),
                ..Default::default()
            },
        );
        assert!(!hints.is_sensitive(&path!["slack", "botToken"]));
    }

    #[test]
    fn test_hint_key_skips_indices() {
        let p = path!["discord", "guilds", 0usize, "id"];
        assert_eq!(hint_key(&p), "discord.guilds.id");
        let p = path!["plugins", "audit", "path"];
        assert_eq!(hint_key(&p), "plugins.audit.path");
    }

    #[test]
    fn test_label_fallbacks() {
        let hints = UiHints::from_value(Some(&json!({
            "telegram.botToken": {"label": "Bot token", "order": 2},
            "telegram.proxy": {"order": "first"}
        })));
        assert_eq!(hints.len(), 1);
        assert_eq!(hints.label(&path!["telegram", "botToken"], None), "Bot token");
        assert_eq!(hints.order(&path!["telegram", "botToken"]), Some(2));

        let (node, _) = crate::schema::normalize(&json!({"type": "string", "title": "HTTP proxy"}), &[]);
        assert_eq!(hints.label(&path!["telegram", "proxy"], Some(&node)), "HTTP proxy");
        assert_eq!(hints.label(&path!["telegram", "webhookUrl"], None), "Webhook Url");
        assert_eq!(hints.label(&path!["telegram", "allowFrom", 3usize], None), "Allow From");
    }
}
