use serde::Serialize;

use super::Section;

pub const RECEIVE_MODES: [&str; 2] = ["on-start", "manual"];

/// Signal status view, from `config.signal`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalForm {
    /// `enabled`, default `true`.
    pub enabled: bool,
    /// `account`, default `""`.
    pub account: String,
    /// `httpUrl`, default `""`.
    pub http_url: String,
    /// `httpHost`, default `""`.
    pub http_host: String,
    /// `httpPort` as text, default `""`.
    pub http_port: String,
    /// `cliPath`, default `""`.
    pub cli_path: String,
    /// `autoStart`, default `true`.
    pub auto_start: bool,
    /// `receiveMode`, one of [`RECEIVE_MODES`], default `""` (unset).
    pub receive_mode: String,
    /// `ignoreAttachments`, default `false`.
    pub ignore_attachments: bool,
    /// `ignoreStories`, default `false`.
    pub ignore_stories: bool,
    /// `sendReadReceipts`, default `false`.
    pub send_read_receipts: bool,
    /// `allowFrom` joined, default `""`.
    pub allow_from: String,
    /// `mediaMaxMb` as text, default `""`.
    pub media_max_mb: String,
}

impl SignalForm {
    pub(crate) fn from_section(s: Section<'_>) -> Self {
        Self {
            enabled: s.flag("enabled", true),
            account: s.text("account", ""),
            http_url: s.text("httpUrl", ""),
            http_host: s.text("httpHost", ""),
            http_port: s.number_text("httpPort"),
            cli_path: s.text("cliPath", ""),
            auto_start: s.flag("autoStart", true),
            receive_mode: s.choice("receiveMode", &RECEIVE_MODES, ""),
            ignore_attachments: s.flag("ignoreAttachments", false),
            ignore_stories: s.flag("ignoreStories", false),
            send_read_receipts: s.flag("sendReadReceipts", false),
            allow_from: s.list_text("allowFrom"),
            media_max_mb: s.number_text("mediaMaxMb"),
        }
    }
}

impl Default for SignalForm {
    fn default() -> Self {
        Self::from_section(Section::EMPTY)
    }
}
