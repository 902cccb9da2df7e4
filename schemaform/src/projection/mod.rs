//! Read-only, UI-shaped views of the messaging integration sections.
//!
//! Each projection is derived from `config.<integration>` with total
//! defaulting: a field that is absent or has the wrong type takes the named
//! default of its record, arrays of ids are joined into `", "`-separated
//! display strings, numbers become display text. Deriving never fails, so a
//! config missing a section entirely produces that section's default record.
//!
//! Projections are recomputed from scratch on every snapshot; edits to them
//! never flow back into the config.

use serde::Serialize;
use serde_json::{Map, Value};

mod discord;
mod imessage;
mod signal;
mod slack;
mod telegram;

pub use discord::{DiscordActions, DiscordForm, DiscordGuild};
pub use imessage::IMessageForm;
pub use signal::SignalForm;
pub use slack::{SlackActions, SlackForm};
pub use telegram::TelegramForm;

/// Projections for every known integration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Projections {
    pub telegram: TelegramForm,
    pub discord: DiscordForm,
    pub slack: SlackForm,
    pub signal: SignalForm,
    pub imessage: IMessageForm,
}

impl Projections {
    pub fn derive(config: &Map<String, Value>) -> Self {
        Self {
            telegram: TelegramForm::from_section(Section::of(config, "telegram")),
            discord: DiscordForm::from_section(Section::of(config, "discord")),
            slack: SlackForm::from_section(Section::of(config, "slack")),
            signal: SignalForm::from_section(Section::of(config, "signal")),
            imessage: IMessageForm::from_section(Section::of(config, "imessage")),
        }
    }
}

/// Per-channel switches shared by the Slack and Discord views.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRow {
    pub key: String,
    /// `allow`, default `true`.
    pub allow: bool,
    /// `requireMention`, default `false`.
    pub require_mention: bool,
}

impl ChannelRow {
    fn rows(section: Section<'_>) -> Vec<ChannelRow> {
        section
            .entries()
            .map(|(key, s)| ChannelRow {
                key: key.to_string(),
                allow: s.flag("allow", true),
                require_mention: s.flag("requireMention", false),
            })
            .collect()
    }
}

/// Borrowed view of one config object; missing or mistyped objects read as empty.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Section<'a>(Option<&'a Map<String, Value>>);

impl<'a> Section<'a> {
    pub(crate) const EMPTY: Section<'static> = Section(None);

    pub(crate) fn of(config: &'a Map<String, Value>, key: &str) -> Self {
        Section(config.get(key).and_then(Value::as_object))
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.0.and_then(|m| m.get(key))
    }

    pub(crate) fn section(&self, key: &str) -> Section<'a> {
        Section(self.get(key).and_then(Value::as_object))
    }

    /// Object-valued entries, in stored order.
    pub(crate) fn entries(self) -> impl Iterator<Item = (&'a str, Section<'a>)> {
        self.0
            .into_iter()
            .flat_map(|m| m.iter())
            .map(|(k, v)| (k.as_str(), Section(v.as_object())))
    }

    pub(crate) fn flag(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    pub(crate) fn text(&self, key: &str, default: &str) -> String {
        self.get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    /// Numbers as display text, anything else as `""`.
    pub(crate) fn number_text(&self, key: &str) -> String {
        match self.get(key) {
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    /// Lists of ids as `a, b`; a plain string passes through.
    pub(crate) fn list_text(&self, key: &str) -> String {
        match self.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(", "),
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        }
    }

    /// String restricted to `allowed`, else `default`.
    pub(crate) fn choice(&self, key: &str, allowed: &[&str], default: &str) -> String {
        self.get(key)
            .and_then(Value::as_str)
            .filter(|s| allowed.contains(s))
            .unwrap_or(default)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn config(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_section_coercions() {
        let cfg = config(json!({
            "s": {
                "on": false, "bad": "yes",
                "name": "x", "num": 2.5, "int": 7,
                "ids": ["a", 12, null, {"x": 1}], "idText": "a,b",
                "mode": "all", "oddMode": "sometimes"
            }
        }));
        let s = Section::of(&cfg, "s");
        assert!(!s.flag("on", true));
        assert!(s.flag("bad", true));
        assert_eq!(s.text("name", "d"), "x");
        assert_eq!(s.text("num", "d"), "d");
        assert_eq!(s.number_text("num"), "2.5");
        assert_eq!(s.number_text("int"), "7");
        assert_eq!(s.number_text("name"), "");
        assert_eq!(s.list_text("ids"), "a, 12");
        assert_eq!(s.list_text("idText"), "a,b");
        assert_eq!(s.list_text("missing"), "");
        assert_eq!(s.choice("mode", &["off", "all"], "off"), "all");
        assert_eq!(s.choice("oddMode", &["off", "all"], "off"), "off");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let p = Projections::derive(&config(json!({"slack": "not an object"})));
        assert_eq!(p, Projections::default());
        assert!(p.slack.enabled);
        assert_eq!(p.slack.reaction_notifications, slack::DEFAULT_REACTION_NOTIFICATIONS);
        assert_eq!(p.imessage.service, imessage::DEFAULT_SERVICE);
    }

    #[test]
    fn test_channel_rows_keep_order() {
        let cfg = config(json!({
            "slack": {"channels": {"#ops": {"allow": false}, "#general": {"requireMention": true}, "#x": 1}}
        }));
        let p = Projections::derive(&cfg);
        let keys: Vec<_> = p.slack.channels.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["#ops", "#general", "#x"]);
        assert!(!p.slack.channels[0].allow);
        assert!(p.slack.channels[1].require_mention);
        assert!(p.slack.channels[2].allow);
    }
}
