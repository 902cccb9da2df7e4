use serde::Serialize;

use super::Section;

pub const STREAM_MODES: [&str; 3] = ["off", "partial", "block"];
pub const DEFAULT_STREAM_MODE: &str = "partial";

/// Telegram status view, from `config.telegram`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramForm {
    /// `enabled`, default `true`.
    pub enabled: bool,
    /// `botToken`, default `""`.
    pub token: String,
    /// `requireMention`, default `true`.
    pub require_mention: bool,
    /// `allowFrom` joined, default `""`.
    pub allow_from: String,
    /// `proxy`, default `""`.
    pub proxy: String,
    /// `webhookUrl`, default `""`.
    pub webhook_url: String,
    /// `webhookSecret`, default `""`.
    pub webhook_secret: String,
    /// `webhookPath`, default `""`.
    pub webhook_path: String,
    /// `streamMode`, one of [`STREAM_MODES`], default [`DEFAULT_STREAM_MODE`].
    pub stream_mode: String,
    /// `mediaMaxMb` as text, default `""`.
    pub media_max_mb: String,
}

impl TelegramForm {
    pub(crate) fn from_section(s: Section<'_>) -> Self {
        Self {
            enabled: s.flag("enabled", true),
            token: s.text("botToken", ""),
            require_mention: s.flag("requireMention", true),
            allow_from: s.list_text("allowFrom"),
            proxy: s.text("proxy", ""),
            webhook_url: s.text("webhookUrl", ""),
            webhook_secret: s.text("webhookSecret", ""),
            webhook_path: s.text("webhookPath", ""),
            stream_mode: s.choice("streamMode", &STREAM_MODES, DEFAULT_STREAM_MODE),
            media_max_mb: s.number_text("mediaMaxMb"),
        }
    }
}

impl Default for TelegramForm {
    fn default() -> Self {
        Self::from_section(Section::EMPTY)
    }
}
