use std::sync::Arc;

use drb_core::{
    commands::CommandRegistry, config::Config, router::Router, session::Session,
};
use drb_discord::DiscordGateway;

mod commands;

#[tokio::main]
async fn main() -> Result<(), drb_core::Error> {
    drb_core::logging::init("drb");

    let cfg = Config::load()?;

    let mut registry = CommandRegistry::new();
    registry.register(Arc::new(commands::Ping));
    registry.register(Arc::new(commands::Echo));

    let router = Arc::new(Router::new(cfg.routing_rule(), Arc::new(registry)));

    let mut session = Session::new(Box::new(DiscordGateway::new()));
    session.start(&cfg, router).await?;

    tokio::signal::ctrl_c().await?;

    session.stop().await?;
    Ok(())
}
