//! Gateway session lifecycle.
//!
//! Owns the connection to the chat platform: start (authenticate, register
//! the inbound handler, announce readiness) and stop (deauthenticate,
//! disconnect). Depends only on the gateway port.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    config::Config,
    errors::Error,
    ports::{GatewayClient, InboundHandler, TokenKind},
    Result,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Stopped,
    Starting,
    Running,
    /// A start attempt failed; `start` may be retried.
    Failed,
}

/// One authenticated gateway connection.
///
/// Not shared outside this module's caller; the adapter's dispatch loop
/// runs independently once `start` returns.
pub struct Session {
    gateway: Box<dyn GatewayClient>,
    state: SessionState,
}

impl Session {
    pub fn new(gateway: Box<dyn GatewayClient>) -> Self {
        Self {
            gateway,
            state: SessionState::Stopped,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Authenticate and connect, registering `handler` for inbound events.
    ///
    /// Requires a non-empty token in the configuration. On success the
    /// currently-joined guilds and channels are logged as a diagnostic
    /// snapshot; a snapshot failure is logged but does not fail the start.
    pub async fn start(&mut self, cfg: &Config, handler: Arc<dyn InboundHandler>) -> Result<()> {
        if self.state == SessionState::Running {
            return Ok(());
        }

        if cfg.discord_token.trim().is_empty() {
            return Err(Error::MissingCredential("DISCORD_TOKEN".to_string()));
        }

        self.state = SessionState::Starting;
        info!("starting gateway session");

        self.gateway.subscribe(handler);

        if let Err(e) = self.gateway.login(TokenKind::Bot, &cfg.discord_token).await {
            self.state = SessionState::Failed;
            return Err(e);
        }
        if let Err(e) = self.gateway.connect().await {
            self.state = SessionState::Failed;
            return Err(e);
        }

        self.state = SessionState::Running;
        info!("gateway session running");

        self.dump_guilds().await;

        Ok(())
    }

    /// Deauthenticate and disconnect. Stopping a session that is not
    /// running is a no-op.
    pub async fn stop(&mut self) -> Result<()> {
        if self.state != SessionState::Running {
            return Ok(());
        }

        let logout = self.gateway.logout().await;
        let disconnect = self.gateway.disconnect().await;

        // Mark stopped either way so a later stop stays a no-op.
        self.state = SessionState::Stopped;
        info!("gateway session stopped");

        logout?;
        disconnect
    }

    async fn dump_guilds(&self) {
        match self.gateway.guilds().await {
            Ok(guilds) => {
                for guild in guilds {
                    info!("Guild: {}", guild.name);
                    for (id, name) in &guild.channels {
                        info!("Channel: {name} : {id}");
                    }
                }
            }
            Err(e) => warn!(error = %e, "guild snapshot failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChannelId, GuildSnapshot, InboundMessage};
    use crate::ports::ChatTransport;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn test_config(token: &str) -> Config {
        Config {
            discord_token: token.to_string(),
            command_prefix: '!',
            forward_marker: "-updates".to_string(),
            forward_target: ChannelId(42),
        }
    }

    struct NullHandler;

    #[async_trait]
    impl InboundHandler for NullHandler {
        async fn on_message(&self, _msg: InboundMessage, _transport: &dyn ChatTransport) {}
    }

    #[derive(Default)]
    struct FakeGateway {
        ops: Arc<Mutex<Vec<String>>>,
        fail_login: bool,
        fail_connect: bool,
        fail_guilds: bool,
    }

    impl FakeGateway {
        fn shared() -> (Arc<Mutex<Vec<String>>>, Self) {
            let ops = Arc::new(Mutex::new(Vec::new()));
            (
                ops.clone(),
                Self {
                    ops,
                    ..Self::default()
                },
            )
        }

        fn push(&self, op: &str) {
            self.ops.lock().unwrap().push(op.to_string());
        }
    }

    #[async_trait]
    impl GatewayClient for FakeGateway {
        fn subscribe(&mut self, _handler: Arc<dyn InboundHandler>) {
            self.push("subscribe");
        }

        async fn login(&mut self, kind: TokenKind, _token: &str) -> Result<()> {
            self.push(&format!("login:{kind:?}"));
            if self.fail_login {
                return Err(Error::Auth("bad token".to_string()));
            }
            Ok(())
        }

        async fn connect(&mut self) -> Result<()> {
            self.push("connect");
            if self.fail_connect {
                return Err(Error::Transport("gateway unreachable".to_string()));
            }
            Ok(())
        }

        async fn disconnect(&mut self) -> Result<()> {
            self.push("disconnect");
            Ok(())
        }

        async fn logout(&mut self) -> Result<()> {
            self.push("logout");
            Ok(())
        }

        async fn guilds(&self) -> Result<Vec<GuildSnapshot>> {
            self.push("guilds");
            if self.fail_guilds {
                return Err(Error::Transport("rest error".to_string()));
            }
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn start_requires_a_token() {
        let (ops, gw) = FakeGateway::shared();
        let mut session = Session::new(Box::new(gw));

        let err = session
            .start(&test_config("  "), Arc::new(NullHandler))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingCredential(_)));
        assert_eq!(session.state(), SessionState::Stopped);
        assert!(ops.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn start_subscribes_before_connecting() {
        let (ops, gw) = FakeGateway::shared();
        let mut session = Session::new(Box::new(gw));

        session
            .start(&test_config("tok"), Arc::new(NullHandler))
            .await
            .unwrap();

        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(
            ops.lock().unwrap().as_slice(),
            ["subscribe", "login:Bot", "connect", "guilds"]
        );
    }

    #[tokio::test]
    async fn login_failure_marks_the_session_failed() {
        let (ops, mut gw) = FakeGateway::shared();
        gw.fail_login = true;
        let mut session = Session::new(Box::new(gw));

        let err = session
            .start(&test_config("tok"), Arc::new(NullHandler))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Auth(_)));
        assert_eq!(session.state(), SessionState::Failed);
        assert!(!ops.lock().unwrap().contains(&"connect".to_string()));
    }

    #[tokio::test]
    async fn connect_failure_marks_the_session_failed() {
        let (_, mut gw) = FakeGateway::shared();
        gw.fail_connect = true;
        let mut session = Session::new(Box::new(gw));

        let err = session
            .start(&test_config("tok"), Arc::new(NullHandler))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(session.state(), SessionState::Failed);
    }

    #[tokio::test]
    async fn guild_snapshot_failure_is_not_fatal() {
        let (_, mut gw) = FakeGateway::shared();
        gw.fail_guilds = true;
        let mut session = Session::new(Box::new(gw));

        session
            .start(&test_config("tok"), Arc::new(NullHandler))
            .await
            .unwrap();

        assert_eq!(session.state(), SessionState::Running);
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let (ops, gw) = FakeGateway::shared();
        let mut session = Session::new(Box::new(gw));

        session
            .start(&test_config("tok"), Arc::new(NullHandler))
            .await
            .unwrap();

        session.stop().await.unwrap();
        session.stop().await.unwrap();

        let ops = ops.lock().unwrap();
        assert_eq!(ops.iter().filter(|o| *o == "logout").count(), 1);
        assert_eq!(ops.iter().filter(|o| *o == "disconnect").count(), 1);
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[tokio::test]
    async fn stop_before_start_is_a_noop() {
        let (ops, gw) = FakeGateway::shared();
        let mut session = Session::new(Box::new(gw));

        session.stop().await.unwrap();

        assert!(ops.lock().unwrap().is_empty());
        assert_eq!(session.state(), SessionState::Stopped);
    }
}
