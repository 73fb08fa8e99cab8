//! Inbound message classification and dispatch.
//!
//! Every gateway event lands here exactly once and gets exactly one
//! disposition: ignored, executed as a command, or forwarded to the
//! configured relay channel.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use tracing::{debug, info, warn};

use crate::{
    commands::{CommandContext, CommandRegistry},
    domain::{ChannelId, InboundMessage},
    ports::{ChatTransport, InboundHandler},
};

/// Static routing configuration, immutable for the process lifetime.
#[derive(Clone, Debug)]
pub struct RoutingRule {
    /// Sentinel char that marks a message as a command (`!` by default).
    pub prefix: char,
    /// Channel-name substring that triggers passive forwarding.
    pub forward_marker: String,
    /// Destination channel for forwarded messages.
    pub forward_target: ChannelId,
}

/// Routing decision for one inbound message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    Ignored,
    /// Byte offset of the text right after the prefix sentinel.
    Command { offset: usize },
    Forwarded { target: ChannelId },
}

/// Pure classification, in priority order: bot/system events are ignored,
/// the command prefix beats the channel-name marker, everything else is
/// inert.
pub fn classify(msg: &InboundMessage, rules: &RoutingRule) -> Disposition {
    if !msg.is_user_message() {
        return Disposition::Ignored;
    }

    if msg.content.starts_with(rules.prefix) {
        return Disposition::Command {
            offset: rules.prefix.len_utf8(),
        };
    }

    if msg.channel_name.contains(&rules.forward_marker) {
        return Disposition::Forwarded {
            target: rules.forward_target,
        };
    }

    Disposition::Ignored
}

/// The single inbound event handler.
///
/// Stateless across invocations apart from the immutable rule set and the
/// registry handle, so the gateway may call it back-to-back from its
/// dispatch task.
pub struct Router {
    rules: RoutingRule,
    commands: Arc<CommandRegistry>,
}

impl Router {
    pub fn new(rules: RoutingRule, commands: Arc<CommandRegistry>) -> Self {
        Self { rules, commands }
    }

    pub fn rules(&self) -> &RoutingRule {
        &self.rules
    }

    /// Classify one message and carry out the resulting side effect.
    ///
    /// Command lookup/argument failures belong to the registry and are
    /// logged here, not propagated; same for forward delivery failures.
    /// The returned disposition reflects classification, not delivery.
    pub async fn handle(
        &self,
        msg: &InboundMessage,
        transport: &dyn ChatTransport,
    ) -> Disposition {
        let author = match &msg.author {
            Some(a) if !a.is_bot => a,
            _ => {
                dump_event(msg);
                info!(message_id = msg.id.0, "ignoring non-user message");
                return Disposition::Ignored;
            }
        };

        // One-line audit record for every user message, commands included.
        info!(
            "{}: {} {} : {}",
            Local::now().format("%H:%M"),
            author.name,
            msg.channel_name,
            msg.content
        );

        let disposition = classify(msg, &self.rules);
        match disposition {
            Disposition::Command { offset } => {
                let ctx = CommandContext { msg, transport };
                if let Err(e) = self.commands.execute(ctx, offset).await {
                    warn!(author = %author.id, error = %e, "command execution failed");
                }
            }
            Disposition::Forwarded { target } => {
                self.forward(msg, target, transport).await;
            }
            Disposition::Ignored => {}
        }

        disposition
    }

    async fn forward(&self, msg: &InboundMessage, target: ChannelId, transport: &dyn ChatTransport) {
        match transport.resolve_channel(target).await {
            Ok(channel) => {
                if let Err(e) = channel.send_message(&msg.content).await {
                    warn!(target = %target, error = %e, "forward send failed");
                }
            }
            Err(e) => {
                warn!(target = %target, error = %e, "forward target resolution failed");
            }
        }
    }
}

#[async_trait]
impl InboundHandler for Router {
    async fn on_message(&self, msg: InboundMessage, transport: &dyn ChatTransport) {
        self.handle(&msg, transport).await;
    }
}

/// Verbose diagnostic dump of an ignored event. Observability only.
fn dump_event(msg: &InboundMessage) {
    let author = msg
        .author
        .as_ref()
        .map(|a| a.name.as_str())
        .unwrap_or("<none>");
    debug!(author, embeds = msg.embeds.len(), "ignored event");

    if let Some(embed) = msg.embeds.first() {
        let json = serde_json::to_string(embed).unwrap_or_else(|_| "<unserializable>".to_string());
        debug!(embed = %json, "first embed");
    }
}
