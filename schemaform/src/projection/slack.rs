use serde::Serialize;

use super::{ChannelRow, Section};

pub const REACTION_NOTIFICATION_MODES: [&str; 4] = ["off", "own", "all", "allowlist"];
pub const DEFAULT_REACTION_NOTIFICATIONS: &str = "own";
pub const DEFAULT_SLASH_NAME: &str = "gateway";
pub const DEFAULT_SLASH_SESSION_PREFIX: &str = "slack:slash";

/// Slack status view, from `config.slack`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlackForm {
    /// `enabled`, default `true`.
    pub enabled: bool,
    /// `botToken`, default `""`.
    pub bot_token: String,
    /// `appToken`, default `""`.
    pub app_token: String,
    /// `dm.enabled`, default `true`.
    pub dm_enabled: bool,
    /// `dm.allowFrom` joined, default `""`.
    pub allow_from: String,
    /// `dm.groupEnabled`, default `false`.
    pub group_enabled: bool,
    /// `dm.groupChannels` joined, default `""`.
    pub group_channels: String,
    /// `mediaMaxMb` as text, default `""`.
    pub media_max_mb: String,
    /// `textChunkLimit` as text, default `""`.
    pub text_chunk_limit: String,
    /// `reactionNotifications`, one of [`REACTION_NOTIFICATION_MODES`],
    /// default [`DEFAULT_REACTION_NOTIFICATIONS`].
    pub reaction_notifications: String,
    /// `reactionAllowlist` joined, default `""`.
    pub reaction_allowlist: String,
    /// `slashCommand.enabled`, default `false`.
    pub slash_enabled: bool,
    /// `slashCommand.name`, default [`DEFAULT_SLASH_NAME`].
    pub slash_name: String,
    /// `slashCommand.sessionPrefix`, default [`DEFAULT_SLASH_SESSION_PREFIX`].
    pub slash_session_prefix: String,
    /// `slashCommand.ephemeral`, default `true`.
    pub slash_ephemeral: bool,
    pub actions: SlackActions,
    /// `channels.<key>` rows in stored order.
    pub channels: Vec<ChannelRow>,
}

/// `actions.*` switches, all default `true`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlackActions {
    pub reactions: bool,
    pub messages: bool,
    pub pins: bool,
    pub member_info: bool,
    pub emoji_list: bool,
}

impl SlackForm {
    pub(crate) fn from_section(s: Section<'_>) -> Self {
        let dm = s.section("dm");
        let slash = s.section("slashCommand");
        let actions = s.section("actions");
        Self {
            enabled: s.flag("enabled", true),
            bot_token: s.text("botToken", ""),
            app_token: s.text("appToken", ""),
            dm_enabled: dm.flag("enabled", true),
            allow_from: dm.list_text("allowFrom"),
            group_enabled: dm.flag("groupEnabled", false),
            group_channels: dm.list_text("groupChannels"),
            media_max_mb: s.number_text("mediaMaxMb"),
            text_chunk_limit: s.number_text("textChunkLimit"),
            reaction_notifications: s.choice(
                "reactionNotifications",
                &REACTION_NOTIFICATION_MODES,
                DEFAULT_REACTION_NOTIFICATIONS,
            ),
            reaction_allowlist: s.list_text("reactionAllowlist"),
            slash_enabled: slash.flag("enabled", false),
            slash_name: slash.text("name", DEFAULT_SLASH_NAME),
            slash_session_prefix: slash.text("sessionPrefix", DEFAULT_SLASH_SESSION_PREFIX),
            slash_ephemeral: slash.flag("ephemeral", true),
            actions: SlackActions {
                reactions: actions.flag("reactions", true),
                messages: actions.flag("messages", true),
                pins: actions.flag("pins", true),
                member_info: actions.flag("memberInfo", true),
                emoji_list: actions.flag("emojiList", true),
            },
            channels: ChannelRow::rows(s.section("channels")),
        }
    }
}

impl Default for SlackForm {
    fn default() -> Self {
        Self::from_section(Section::EMPTY)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_default_record() {
        let f = SlackForm::default();
        assert!(f.enabled);
        assert_eq!(f.bot_token, "");
        assert_eq!(f.app_token, "");
        assert!(f.dm_enabled);
        assert_eq!(f.allow_from, "");
        assert!(!f.group_enabled);
        assert_eq!(f.media_max_mb, "");
        assert_eq!(f.reaction_notifications, "own");
        assert!(!f.slash_enabled);
        assert_eq!(f.slash_name, DEFAULT_SLASH_NAME);
        assert_eq!(f.slash_session_prefix, "slack:slash");
        assert!(f.slash_ephemeral);
        assert!(f.actions.reactions && f.actions.emoji_list);
        assert!(f.channels.is_empty());
    }

    #[test]
    fn test_from_config() {
        let cfg = json!({
            "slack": {
                "enabled": false,
                "botToken": "xoxb-1",
                "appToken": 42,
                "dm": {"allowFrom": ["U1", "U2"], "groupEnabled": true},
                "mediaMaxMb": 20,
                "reactionNotifications": "allowlist",
                "slashCommand": {"enabled": true, "name": "ops"},
                "actions": {"pins": false}
            }
        });
        let f = SlackForm::from_section(Section::of(cfg.as_object().unwrap(), "slack"));
        assert!(!f.enabled);
        assert_eq!(f.bot_token, "xoxb-1");
        assert_eq!(f.app_token, "");
        assert_eq!(f.allow_from, "U1, U2");
        assert!(f.group_enabled);
        assert_eq!(f.media_max_mb, "20");
        assert_eq!(f.reaction_notifications, "allowlist");
        assert!(f.slash_enabled);
        assert_eq!(f.slash_name, "ops");
        assert!(!f.actions.pins);
        assert!(f.actions.messages);
    }
}
