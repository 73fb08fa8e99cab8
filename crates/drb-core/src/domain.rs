use std::fmt;

use serde::Serialize;

/// Discord user id (snowflake).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct UserId(pub u64);

/// Discord channel id (snowflake).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ChannelId(pub u64);

/// Discord guild id (snowflake).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct GuildId(pub u64);

/// Discord message id (snowflake).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct MessageId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Message author as seen by the router.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Author {
    pub id: UserId,
    pub name: String,
    pub is_bot: bool,
}

/// A single name/value field inside an embed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Rich-content attachment on a message.
///
/// Only the parts the diagnostic dump cares about; the adapter drops the
/// rest (images, footers, providers) at conversion time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: Option<String>,
    pub description: Option<String>,
    /// RFC3339 timestamp as rendered by the transport.
    pub timestamp: Option<String>,
    pub author: Option<String>,
    pub fields: Vec<EmbedField>,
}

/// One inbound gateway event, converted out of the transport's types.
///
/// `author` is `None` for system/author-less events; the router treats
/// those the same as bot-authored messages.
#[derive(Clone, Debug, Serialize)]
pub struct InboundMessage {
    pub id: MessageId,
    pub author: Option<Author>,
    pub channel_id: ChannelId,
    pub channel_name: String,
    pub content: String,
    pub embeds: Vec<Embed>,
}

impl InboundMessage {
    /// A message the bot should react to: authored by a human user.
    pub fn is_user_message(&self) -> bool {
        matches!(self.author, Some(ref a) if !a.is_bot)
    }
}

/// One guild with its channels, for the startup diagnostic dump.
#[derive(Clone, Debug)]
pub struct GuildSnapshot {
    pub id: GuildId,
    pub name: String,
    pub channels: Vec<(ChannelId, String)>,
}
