//! Typed gateway configuration.
//!
//! These types are only used to validate a config file and to derive the
//! built-in schema served when no schema file is present. The editing cycle
//! itself works on untyped JSON so that unknown or invalid content is never
//! lost on save.
//!
//! # Configuration File Format
//!
//! ```json
//! {
//!   "telegram": { "botToken": "123:abc", "streamMode": "partial" },
//!   "slack": { "botToken": "xoxb-...", "channels": { "#ops": { "allow": true } } }
//! }
//! ```

use std::collections::BTreeMap;

use schemars::{JsonSchema, generate::SchemaSettings};
use schemaform::{UiHint, UiHints, snapshot::Issue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root of the gateway configuration.
#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Gateway process settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<GatewaySection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram: Option<TelegramConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord: Option<DiscordConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack: Option<SlackConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<SignalConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imessage: Option<IMessageConfig>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GatewaySection {
    /// Port the gateway listens on.
    pub port: Option<u16>,
    /// Address the gateway binds to.
    pub bind: Option<String>,
    /// Log level of the gateway process.
    pub log_level: Option<LogLevel>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TelegramConfig {
    pub enabled: Option<bool>,
    /// Token issued by BotFather.
    pub bot_token: Option<String>,
    /// Only answer in groups when mentioned.
    pub require_mention: Option<bool>,
    /// Users allowed to talk to the bot.
    pub allow_from: Option<Vec<String>>,
    /// HTTP(S) or SOCKS proxy URL.
    pub proxy: Option<String>,
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub webhook_path: Option<String>,
    /// How replies are streamed while being generated.
    pub stream_mode: Option<StreamMode>,
    pub media_max_mb: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StreamMode {
    Off,
    Partial,
    Block,
}

/// Shared direct-message policy of Slack and Discord.
#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DmPolicy {
    pub enabled: Option<bool>,
    pub allow_from: Option<Vec<String>>,
    pub group_enabled: Option<bool>,
    pub group_channels: Option<Vec<String>>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SlashCommand {
    pub enabled: Option<bool>,
    pub name: Option<String>,
    pub session_prefix: Option<String>,
    /// Reply only to the user who ran the command.
    pub ephemeral: Option<bool>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChannelConfig {
    pub allow: Option<bool>,
    pub require_mention: Option<bool>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SlackConfig {
    pub enabled: Option<bool>,
    /// Bot user OAuth token (`xoxb-`).
    pub bot_token: Option<String>,
    /// App-level token for socket mode (`xapp-`).
    pub app_token: Option<String>,
    pub dm: Option<DmPolicy>,
    pub media_max_mb: Option<u32>,
    pub text_chunk_limit: Option<u32>,
    pub reaction_notifications: Option<ReactionNotifications>,
    pub reaction_allowlist: Option<Vec<String>>,
    pub slash_command: Option<SlashCommand>,
    pub actions: Option<SlackActions>,
    /// Per-channel overrides keyed by channel id or name.
    pub channels: Option<BTreeMap<String, ChannelConfig>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ReactionNotifications {
    Off,
    Own,
    All,
    Allowlist,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SlackActions {
    pub reactions: Option<bool>,
    pub messages: Option<bool>,
    pub pins: Option<bool>,
    pub member_info: Option<bool>,
    pub emoji_list: Option<bool>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DiscordConfig {
    pub enabled: Option<bool>,
    pub token: Option<String>,
    pub dm: Option<DmPolicy>,
    pub media_max_mb: Option<u32>,
    pub history_limit: Option<u32>,
    pub text_chunk_limit: Option<u32>,
    pub reply_to_mode: Option<ReplyToMode>,
    pub slash_command: Option<SlashCommand>,
    pub actions: Option<DiscordActions>,
    /// Per-guild settings keyed by guild id.
    pub guilds: Option<BTreeMap<String, DiscordGuild>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ReplyToMode {
    Off,
    First,
    All,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DiscordActions {
    pub reactions: Option<bool>,
    pub stickers: Option<bool>,
    pub polls: Option<bool>,
    pub messages: Option<bool>,
    pub threads: Option<bool>,
    pub pins: Option<bool>,
    pub search: Option<bool>,
    pub moderation: Option<bool>,
    pub roles: Option<bool>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DiscordGuild {
    pub slug: Option<String>,
    pub require_mention: Option<bool>,
    pub users: Option<Vec<String>>,
    pub channels: Option<BTreeMap<String, ChannelConfig>>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SignalConfig {
    pub enabled: Option<bool>,
    /// Phone number of the linked account.
    pub account: Option<String>,
    pub http_url: Option<String>,
    pub http_host: Option<String>,
    pub http_port: Option<u16>,
    pub cli_path: Option<String>,
    pub auto_start: Option<bool>,
    pub receive_mode: Option<ReceiveMode>,
    pub ignore_attachments: Option<bool>,
    pub ignore_stories: Option<bool>,
    pub send_read_receipts: Option<bool>,
    pub allow_from: Option<Vec<String>>,
    pub media_max_mb: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub enum ReceiveMode {
    #[serde(rename = "on-start")]
    OnStart,
    #[serde(rename = "manual")]
    Manual,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IMessageConfig {
    pub enabled: Option<bool>,
    pub cli_path: Option<String>,
    /// Path to the Messages database.
    pub db_path: Option<String>,
    pub service: Option<IMessageService>,
    pub region: Option<String>,
    pub allow_from: Option<Vec<String>>,
    pub include_attachments: Option<bool>,
    pub media_max_mb: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum IMessageService {
    Auto,
    Imessage,
    Sms,
}

/// Built-in schema, with every subschema inlined.
pub fn schema() -> anyhow::Result<Value> {
    let schema = SchemaSettings::draft2020_12()
        .with(|s| s.inline_subschemas = true)
        .into_generator()
        .into_root_schema_for::<GatewayConfig>();
    Ok(serde_json::to_value(&schema)?)
}

/// Built-in UI hints for the typed model.
pub fn ui_hints() -> UiHints {
    let mut hints = UiHints::default();
    let mut hint = |key: &str, label: &str, order: Option<i64>| {
        hints.insert(
            key,
            UiHint {
                label: Some(label.to_string()),
                order,
                ..Default::default()
            },
        );
    };
    for (order, section) in ["gateway", "telegram", "discord", "slack", "signal", "imessage"]
        .into_iter()
        .enumerate()
    {
        let label = match section {
            "imessage" => "iMessage",
            "gateway" => "Gateway",
            "telegram" => "Telegram",
            "discord" => "Discord",
            "slack" => "Slack",
            _ => "Signal",
        };
        hint(section, label, Some(order as i64));
    }
    for section in ["telegram", "discord", "slack", "signal", "imessage"] {
        hint(&format!("{section}.enabled"), "Enabled", None);
    }

    hints.insert(
        "telegram.botToken",
        UiHint {
            placeholder: Some("123456:ABC-DEF".to_string()),
            ..Default::default()
        },
    );
    hints.insert(
        "slack.appToken",
        UiHint {
            placeholder: Some("xapp-...".to_string()),
            sensitive: Some(true),
            ..Default::default()
        },
    );
    hints.insert(
        "signal.account",
        UiHint {
            placeholder: Some("+15551234567".to_string()),
            ..Default::default()
        },
    );
    hints
}

/// Check `value` against [`GatewayConfig`], reporting the first problem
/// with the path it was found at.
pub fn validate(value: &Value) -> Vec<Issue> {
    match serde_path_to_error::deserialize::<_, GatewayConfig>(value) {
        Ok(_) => Vec::new(),
        Err(e) => {
            let path = e.path().to_string();
            vec![Issue {
                path: if path == "." { String::new() } else { path },
                message: e.inner().to_string(),
            }]
        }
    }
}
