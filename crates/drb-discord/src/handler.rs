//! Serenity event handler bridging gateway events into the core.

use std::sync::Arc;

use serenity::all::{Context, EventHandler, GuildId, Message, MessageType, Ready};
use serenity::async_trait;

use tracing::{debug, info};

use drb_core::{
    domain::{Author, ChannelId, Embed, EmbedField, InboundMessage, MessageId, UserId},
    ports::InboundHandler,
};

use crate::HttpTransport;

/// Bridge between serenity's callback surface and the subscribed
/// `InboundHandler`. Each event gets a fresh transport handle built from
/// the gateway's HTTP client.
pub struct GatewayEvents {
    pub handler: Arc<dyn InboundHandler>,
}

#[async_trait]
impl EventHandler for GatewayEvents {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            bot_name = %ready.user.name,
            guilds = ready.guilds.len(),
            "discord gateway ready"
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Display name, served from cache when possible; fall back to the
        // raw id so routing on the name still sees something stable.
        let channel_name = msg
            .channel_id
            .name(&ctx)
            .await
            .unwrap_or_else(|_| msg.channel_id.to_string());

        let inbound = convert_message(&msg, channel_name);
        let transport = HttpTransport::new(ctx.http.clone());
        self.handler.on_message(inbound, &transport).await;
    }

    async fn cache_ready(&self, _ctx: Context, guilds: Vec<GuildId>) {
        debug!(guild_count = guilds.len(), "discord cache ready");
    }
}

fn convert_message(msg: &Message, channel_name: String) -> InboundMessage {
    // Non-regular kinds (joins, pins, boosts, ...) become author-less
    // events so the router ignores them.
    let author = is_user_kind(msg.kind).then(|| Author {
        id: UserId(msg.author.id.get()),
        name: msg.author.name.clone(),
        is_bot: msg.author.bot,
    });

    InboundMessage {
        id: MessageId(msg.id.get()),
        author,
        channel_id: ChannelId(msg.channel_id.get()),
        channel_name,
        content: msg.content.clone(),
        embeds: msg.embeds.iter().map(convert_embed).collect(),
    }
}

fn is_user_kind(kind: MessageType) -> bool {
    matches!(kind, MessageType::Regular | MessageType::InlineReply)
}

fn convert_embed(e: &serenity::all::Embed) -> Embed {
    Embed {
        title: e.title.clone(),
        description: e.description.clone(),
        timestamp: e.timestamp.as_ref().map(|t| t.to_string()),
        author: e.author.as_ref().map(|a| a.name.clone()),
        fields: e
            .fields
            .iter()
            .map(|f| EmbedField {
                name: f.name.clone(),
                value: f.value.clone(),
                inline: f.inline,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_regular_kinds_carry_an_author() {
        assert!(is_user_kind(MessageType::Regular));
        assert!(is_user_kind(MessageType::InlineReply));
        assert!(!is_user_kind(MessageType::PinsAdd));
        assert!(!is_user_kind(MessageType::MemberJoin));
    }
}
