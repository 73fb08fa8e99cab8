//! Built-in command modules.

use async_trait::async_trait;

use drb_core::{
    commands::{CommandContext, CommandModule},
    Result,
};

/// `!ping` — liveness check.
pub struct Ping;

#[async_trait]
impl CommandModule for Ping {
    fn name(&self) -> &str {
        "ping"
    }

    async fn run(&self, ctx: CommandContext<'_>, _args: &str) -> Result<()> {
        ctx.reply("pong").await
    }
}

/// `!echo <text>` — repeats the argument tail.
pub struct Echo;

#[async_trait]
impl CommandModule for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    async fn run(&self, ctx: CommandContext<'_>, args: &str) -> Result<()> {
        if args.is_empty() {
            return ctx.reply("nothing to echo").await;
        }
        ctx.reply(args).await
    }
}
