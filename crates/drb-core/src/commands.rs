//! Command modules and their registry.
//!
//! Replaces the reflective module loading + process-wide service provider
//! of the original bot with explicit registration and an explicit per-call
//! context.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    domain::InboundMessage,
    errors::Error,
    ports::ChatTransport,
    Result,
};

/// Everything a command module gets to work with for one invocation.
///
/// Built fresh per message; nothing here outlives the event that produced
/// it.
pub struct CommandContext<'a> {
    pub msg: &'a InboundMessage,
    pub transport: &'a dyn ChatTransport,
}

impl CommandContext<'_> {
    /// Reply into the channel the command came from.
    pub async fn reply(&self, text: &str) -> Result<()> {
        let channel = self.transport.resolve_channel(self.msg.channel_id).await?;
        channel.send_message(text).await
    }
}

/// A unit of command-handling logic, keyed by its trigger word.
#[async_trait]
pub trait CommandModule: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, ctx: CommandContext<'_>, args: &str) -> Result<()>;
}

/// Set of registered command modules.
///
/// Populated once at startup and immutable afterwards (the session wraps it
/// in an `Arc` before connecting).
#[derive(Default)]
pub struct CommandRegistry {
    modules: HashMap<String, Arc<dyn CommandModule>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module under its trigger word. Re-registering a name
    /// replaces the previous module.
    pub fn register(&mut self, module: Arc<dyn CommandModule>) {
        self.modules.insert(module.name().to_string(), module);
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Execute the command found at `offset` into the message content
    /// (the byte position right after the prefix sentinel).
    ///
    /// The first whitespace-delimited word is the trigger; the rest is
    /// handed to the module verbatim (leading whitespace trimmed).
    pub async fn execute(&self, ctx: CommandContext<'_>, offset: usize) -> Result<()> {
        let text = ctx.msg.content.get(offset..).unwrap_or("").trim_start();
        let (name, args) = match text.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim_start()),
            None => (text, ""),
        };

        if name.is_empty() {
            return Err(Error::Command("empty command".to_string()));
        }

        let Some(module) = self.modules.get(name) else {
            return Err(Error::Command(format!("unknown command: {name}")));
        };

        module.run(ctx, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Author, ChannelId, InboundMessage, MessageId, UserId};
    use crate::ports::MessageChannel;
    use std::sync::Mutex;

    struct NullTransport;

    #[async_trait]
    impl ChatTransport for NullTransport {
        async fn resolve_channel(&self, id: ChannelId) -> Result<Box<dyn MessageChannel>> {
            Err(Error::ForwardResolution {
                channel: id,
                reason: "not wired in this test".to_string(),
            })
        }
    }

    struct Recording {
        name: &'static str,
        calls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl CommandModule for Recording {
        fn name(&self) -> &str {
            self.name
        }

        async fn run(&self, _ctx: CommandContext<'_>, args: &str) -> Result<()> {
            self.calls.lock().unwrap().push(args.to_string());
            Ok(())
        }
    }

    fn msg(content: &str) -> InboundMessage {
        InboundMessage {
            id: MessageId(1),
            author: Some(Author {
                id: UserId(7),
                name: "alice".to_string(),
                is_bot: false,
            }),
            channel_id: ChannelId(100),
            channel_name: "general".to_string(),
            content: content.to_string(),
            embeds: Vec::new(),
        }
    }

    fn registry_with(name: &'static str, calls: Arc<Mutex<Vec<String>>>) -> CommandRegistry {
        let mut reg = CommandRegistry::new();
        reg.register(Arc::new(Recording { name, calls }));
        reg
    }

    #[tokio::test]
    async fn dispatches_by_first_word_and_passes_args() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let reg = registry_with("roll", calls.clone());

        let m = msg("!roll 2d6 + 3");
        let ctx = CommandContext {
            msg: &m,
            transport: &NullTransport,
        };
        reg.execute(ctx, 1).await.unwrap();

        assert_eq!(calls.lock().unwrap().as_slice(), ["2d6 + 3"]);
    }

    #[tokio::test]
    async fn bare_command_gets_empty_args() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let reg = registry_with("ping", calls.clone());

        let m = msg("!ping");
        let ctx = CommandContext {
            msg: &m,
            transport: &NullTransport,
        };
        reg.execute(ctx, 1).await.unwrap();

        assert_eq!(calls.lock().unwrap().as_slice(), [""]);
    }

    #[tokio::test]
    async fn unknown_command_is_an_error() {
        let reg = registry_with("ping", Arc::new(Mutex::new(Vec::new())));

        let m = msg("!nosuch");
        let ctx = CommandContext {
            msg: &m,
            transport: &NullTransport,
        };
        let err = reg.execute(ctx, 1).await.unwrap_err();

        assert!(matches!(err, Error::Command(_)));
    }

    #[tokio::test]
    async fn prefix_alone_is_an_error() {
        let reg = registry_with("ping", Arc::new(Mutex::new(Vec::new())));

        let m = msg("!");
        let ctx = CommandContext {
            msg: &m,
            transport: &NullTransport,
        };
        let err = reg.execute(ctx, 1).await.unwrap_err();

        assert!(matches!(err, Error::Command(_)));
    }

    #[tokio::test]
    async fn reregistering_replaces_the_module() {
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));

        let mut reg = CommandRegistry::new();
        reg.register(Arc::new(Recording {
            name: "ping",
            calls: first.clone(),
        }));
        reg.register(Arc::new(Recording {
            name: "ping",
            calls: second.clone(),
        }));
        assert_eq!(reg.len(), 1);

        let m = msg("!ping");
        let ctx = CommandContext {
            msg: &m,
            transport: &NullTransport,
        };
        reg.execute(ctx, 1).await.unwrap();

        assert!(first.lock().unwrap().is_empty());
        assert_eq!(second.lock().unwrap().len(), 1);
    }
}
