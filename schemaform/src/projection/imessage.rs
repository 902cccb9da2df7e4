use serde::Serialize;

use super::Section;

pub const SERVICES: [&str; 3] = ["auto", "imessage", "sms"];
pub const DEFAULT_SERVICE: &str = "auto";

/// iMessage status view, from `config.imessage`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IMessageForm {
    /// `enabled`, default `true`.
    pub enabled: bool,
    /// `cliPath`, default `""`.
    pub cli_path: String,
    /// `dbPath`, default `""`.
    pub db_path: String,
    /// `service`, one of [`SERVICES`], default [`DEFAULT_SERVICE`].
    pub service: String,
    /// `region`, default `""`.
    pub region: String,
    /// `allowFrom` joined, default `""`.
    pub allow_from: String,
    /// `includeAttachments`, default `false`.
    pub include_attachments: bool,
    /// `mediaMaxMb` as text, default `""`.
    pub media_max_mb: String,
}

impl IMessageForm {
    pub(crate) fn from_section(s: Section<'_>) -> Self {
        Self {
            enabled: s.flag("enabled", true),
            cli_path: s.text("cliPath", ""),
            db_path: s.text("dbPath", ""),
            service: s.choice("service", &SERVICES, DEFAULT_SERVICE),
            region: s.text("region", ""),
            allow_from: s.list_text("allowFrom"),
            include_attachments: s.flag("includeAttachments", false),
            media_max_mb: s.number_text("mediaMaxMb"),
        }
    }
}

impl Default for IMessageForm {
    fn default() -> Self {
        Self::from_section(Section::EMPTY)
    }
}
