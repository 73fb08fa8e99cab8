//! Discord adapter (serenity).
//!
//! Implements the `drb-core` gateway and transport ports over the Discord
//! gateway/REST API.

use std::sync::Arc;

use async_trait::async_trait;

use serenity::all::{
    Channel, ChannelId as DiscordChannelId, ChannelType, Client, GatewayIntents, Http,
};
use serenity::gateway::ShardManager;

use tokio::task::JoinHandle;
use tracing::{error, info};

pub mod handler;

use drb_core::{
    domain::{ChannelId, GuildId, GuildSnapshot},
    errors::Error,
    ports::{ChatTransport, GatewayClient, InboundHandler, MessageChannel, TokenKind},
    Result,
};

use crate::handler::GatewayEvents;

/// Gateway client over serenity.
///
/// serenity fuses login and connect into `Client::start`, so `login` here
/// validates the token against the REST API and `connect` spawns the
/// gateway loop with the subscribed handler.
pub struct DiscordGateway {
    intents: GatewayIntents,
    handler: Option<Arc<dyn InboundHandler>>,
    token: Option<String>,
    http: Option<Arc<Http>>,
    shard_manager: Option<Arc<ShardManager>>,
    gateway_task: Option<JoinHandle<()>>,
}

impl DiscordGateway {
    pub fn new() -> Self {
        Self {
            intents: Self::intents(),
            handler: None,
            token: None,
            http: None,
            shard_manager: None,
            gateway_task: None,
        }
    }

    /// Required gateway intents for the bot.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }

    fn map_transport_err(e: serenity::Error) -> Error {
        Error::Transport(format!("discord error: {e}"))
    }
}

impl Default for DiscordGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GatewayClient for DiscordGateway {
    fn subscribe(&mut self, handler: Arc<dyn InboundHandler>) {
        self.handler = Some(handler);
    }

    async fn login(&mut self, _kind: TokenKind, token: &str) -> Result<()> {
        let http = Arc::new(Http::new(token));
        let me = http
            .get_current_user()
            .await
            .map_err(|e| Error::Auth(format!("token rejected: {e}")))?;

        info!(bot_name = %me.name, "logged in");
        self.token = Some(token.to_string());
        self.http = Some(http);
        Ok(())
    }

    async fn connect(&mut self) -> Result<()> {
        let token = self
            .token
            .clone()
            .ok_or_else(|| Error::Transport("connect before login".to_string()))?;
        let handler = self
            .handler
            .clone()
            .ok_or_else(|| Error::Transport("no inbound handler subscribed".to_string()))?;

        let mut client = Client::builder(&token, self.intents)
            .event_handler(GatewayEvents { handler })
            .await
            .map_err(Self::map_transport_err)?;

        self.shard_manager = Some(client.shard_manager.clone());
        self.http = Some(client.http.clone());

        self.gateway_task = Some(tokio::spawn(async move {
            if let Err(e) = client.start().await {
                error!(error = %e, "gateway loop ended with error");
            }
        }));

        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(sm) = self.shard_manager.take() {
            sm.shutdown_all().await;
        }
        if let Some(task) = self.gateway_task.take() {
            let _ = task.await;
        }
        Ok(())
    }

    async fn logout(&mut self) -> Result<()> {
        // Discord has no REST logout; dropping the authenticated client is
        // all there is to do.
        self.token = None;
        self.http = None;
        Ok(())
    }

    async fn guilds(&self) -> Result<Vec<GuildSnapshot>> {
        let http = self
            .http
            .as_ref()
            .ok_or_else(|| Error::Transport("not logged in".to_string()))?;

        let mut out = Vec::new();
        for guild in http
            .get_guilds(None, None)
            .await
            .map_err(Self::map_transport_err)?
        {
            let channels = http
                .get_channels(guild.id)
                .await
                .map_err(Self::map_transport_err)?;

            out.push(GuildSnapshot {
                id: GuildId(guild.id.get()),
                name: guild.name.clone(),
                channels: channels
                    .into_iter()
                    .map(|c| (ChannelId(c.id.get()), c.name))
                    .collect(),
            });
        }

        Ok(out)
    }
}

/// Channel lookup + send over the REST API, built per event by the
/// handler bridge.
pub struct HttpTransport {
    http: Arc<Http>,
}

impl HttpTransport {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn resolve_channel(&self, id: ChannelId) -> Result<Box<dyn MessageChannel>> {
        let channel = self
            .http
            .get_channel(DiscordChannelId::new(id.0))
            .await
            .map_err(|e| Error::ForwardResolution {
                channel: id,
                reason: e.to_string(),
            })?;

        if !is_message_capable(&channel) {
            return Err(Error::ForwardResolution {
                channel: id,
                reason: "not a message-capable channel".to_string(),
            });
        }

        Ok(Box::new(HttpChannel {
            http: self.http.clone(),
            id: DiscordChannelId::new(id.0),
        }))
    }
}

fn is_message_capable(channel: &Channel) -> bool {
    match channel {
        Channel::Guild(c) => is_sendable_kind(c.kind),
        Channel::Private(_) => true,
        _ => false,
    }
}

fn is_sendable_kind(kind: ChannelType) -> bool {
    matches!(
        kind,
        ChannelType::Text
            | ChannelType::News
            | ChannelType::PublicThread
            | ChannelType::PrivateThread
            | ChannelType::NewsThread
    )
}

struct HttpChannel {
    http: Arc<Http>,
    id: DiscordChannelId,
}

#[async_trait]
impl MessageChannel for HttpChannel {
    async fn send_message(&self, text: &str) -> Result<()> {
        self.id
            .say(&self.http, text)
            .await
            .map_err(|e| Error::Transport(format!("send to {} failed: {e}", self.id)))?;
        Ok(())
    }
}
