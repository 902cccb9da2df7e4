use serde::Serialize;

use super::{ChannelRow, Section};

pub const REPLY_TO_MODES: [&str; 3] = ["off", "first", "all"];
pub const DEFAULT_REPLY_TO_MODE: &str = "off";
pub const DEFAULT_SLASH_SESSION_PREFIX: &str = "discord:slash";

/// Discord status view, from `config.discord`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordForm {
    /// `enabled`, default `true`.
    pub enabled: bool,
    /// `token`, default `""`.
    pub token: String,
    /// `dm.allowFrom` joined, default `""`.
    pub allow_from: String,
    /// `dm.groupEnabled`, default `false`.
    pub group_enabled: bool,
    /// `dm.groupChannels` joined, default `""`.
    pub group_channels: String,
    /// `mediaMaxMb` as text, default `""`.
    pub media_max_mb: String,
    /// `historyLimit` as text, default `""`.
    pub history_limit: String,
    /// `textChunkLimit` as text, default `""`.
    pub text_chunk_limit: String,
    /// `replyToMode`, one of [`REPLY_TO_MODES`], default [`DEFAULT_REPLY_TO_MODE`].
    pub reply_to_mode: String,
    /// `slashCommand.enabled`, default `false`.
    pub slash_enabled: bool,
    /// `slashCommand.name`, default `""`.
    pub slash_name: String,
    /// `slashCommand.sessionPrefix`, default [`DEFAULT_SLASH_SESSION_PREFIX`].
    pub slash_session_prefix: String,
    /// `slashCommand.ephemeral`, default `true`.
    pub slash_ephemeral: bool,
    pub actions: DiscordActions,
    /// `guilds.<key>` rows in stored order.
    pub guilds: Vec<DiscordGuild>,
}

/// `actions.*` switches. Moderation and role management default off.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordActions {
    pub reactions: bool,
    pub stickers: bool,
    pub polls: bool,
    pub messages: bool,
    pub threads: bool,
    pub pins: bool,
    pub search: bool,
    pub moderation: bool,
    pub role_management: bool,
}

/// One configured guild.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordGuild {
    pub key: String,
    /// `slug`, default `""`.
    pub slug: String,
    /// `requireMention`, default `false`.
    pub require_mention: bool,
    /// `users` joined, default `""`.
    pub users: String,
    pub channels: Vec<ChannelRow>,
}

impl DiscordForm {
    pub(crate) fn from_section(s: Section<'_>) -> Self {
        let dm = s.section("dm");
        let slash = s.section("slashCommand");
        let actions = s.section("actions");
        Self {
            enabled: s.flag("enabled", true),
            token: s.text("token", ""),
            allow_from: dm.list_text("allowFrom"),
            group_enabled: dm.flag("groupEnabled", false),
            group_channels: dm.list_text("groupChannels"),
            media_max_mb: s.number_text("mediaMaxMb"),
            history_limit: s.number_text("historyLimit"),
            text_chunk_limit: s.number_text("textChunkLimit"),
            reply_to_mode: s.choice("replyToMode", &REPLY_TO_MODES, DEFAULT_REPLY_TO_MODE),
            slash_enabled: slash.flag("enabled", false),
            slash_name: slash.text("name", ""),
            slash_session_prefix: slash.text("sessionPrefix", DEFAULT_SLASH_SESSION_PREFIX),
            slash_ephemeral: slash.flag("ephemeral", true),
            actions: DiscordActions {
                reactions: actions.flag("reactions", true),
                stickers: actions.flag("stickers", true),
                polls: actions.flag("polls", true),
                messages: actions.flag("messages", true),
                threads: actions.flag("threads", true),
                pins: actions.flag("pins", true),
                search: actions.flag("search", true),
                moderation: actions.flag("moderation", false),
                role_management: actions.flag("roles", false),
            },
            guilds: s
                .section("guilds")
                .entries()
                .map(|(key, g)| DiscordGuild {
                    key: key.to_string(),
                    slug: g.text("slug", ""),
                    require_mention: g.flag("requireMention", false),
                    users: g.list_text("users"),
                    channels: ChannelRow::rows(g.section("channels")),
                })
                .collect(),
        }
    }
}

impl Default for DiscordForm {
    fn default() -> Self {
        Self::from_section(Section::EMPTY)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_guild_rows() {
        let cfg = json!({
            "discord": {
                "token": "t",
                "replyToMode": "first",
                "guilds": {
                    "123": {
                        "slug": "home",
                        "users": [1, 2],
                        "channels": {"general": {"requireMention": true}}
                    },
                    "456": null
                },
                "actions": {"moderation": true, "roles": "yes"}
            }
        });
        let f = DiscordForm::from_section(Section::of(cfg.as_object().unwrap(), "discord"));
        assert_eq!(f.reply_to_mode, "first");
        assert_eq!(f.guilds.len(), 2);
        assert_eq!(f.guilds[0].slug, "home");
        assert_eq!(f.guilds[0].users, "1, 2");
        assert!(f.guilds[0].channels[0].require_mention);
        assert_eq!(f.guilds[1].slug, "");
        assert!(f.actions.moderation);
        assert!(!f.actions.role_management);
    }
}
