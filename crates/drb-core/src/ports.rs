use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    domain::{ChannelId, GuildSnapshot, InboundMessage},
    Result,
};

/// Kind of credential presented at login.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Bot,
}

/// Receiver for inbound gateway events.
///
/// Implemented by the router; invoked by the adapter once per event, on the
/// adapter's dispatch task. Implementations must not keep mutable state
/// across invocations.
#[async_trait]
pub trait InboundHandler: Send + Sync {
    async fn on_message(&self, msg: InboundMessage, transport: &dyn ChatTransport);
}

/// Hexagonal port for the gateway connection lifecycle.
///
/// The adapter owns the wire protocol (auth handshake, heartbeats,
/// reconnects); this port only exposes the lifecycle the session manager
/// drives.
#[async_trait]
pub trait GatewayClient: Send + Sync {
    /// Register the handler that receives inbound message events. Must be
    /// called before `connect`.
    fn subscribe(&mut self, handler: Arc<dyn InboundHandler>);

    async fn login(&mut self, kind: TokenKind, token: &str) -> Result<()>;
    async fn connect(&mut self) -> Result<()>;
    async fn disconnect(&mut self) -> Result<()>;
    async fn logout(&mut self) -> Result<()>;

    /// Currently-joined guilds with their channels. Diagnostic only.
    async fn guilds(&self) -> Result<Vec<GuildSnapshot>>;
}

/// Lookup port for outbound channel access.
///
/// Passed into the router per event rather than held globally, so command
/// modules and the forward path get an explicit handle instead of reaching
/// into ambient state.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Resolve a channel id to a message-capable handle.
    ///
    /// Fails with `Error::ForwardResolution` when the channel is missing or
    /// cannot receive text messages.
    async fn resolve_channel(&self, id: ChannelId) -> Result<Box<dyn MessageChannel>>;
}

/// A resolved channel that can receive text messages.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    async fn send_message(&self, text: &str) -> Result<()>;
}
