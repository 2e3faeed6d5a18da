//! `PartyCardsServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → room registry.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use partycards_game::CardPool;
use partycards_protocol::{Codec, JsonCodec};
use partycards_room::{RoomConfig, RoomRegistry};
use partycards_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::PartyCardsError;
use crate::handler::handle_connection;

/// Default time a connected player may stay silent before being dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Default time a new connection has to send its `join`.
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) registry: Mutex<RoomRegistry>,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
    pub(crate) join_timeout: Duration,
}

/// Builder for configuring and starting a partycards server.
///
/// # Example
///
/// ```rust,no_run
/// use partycards::prelude::*;
///
/// # async fn start() -> Result<(), PartyCardsError> {
/// let server = PartyCardsServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct PartyCardsServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    cards: Option<CardPool>,
    idle_timeout: Duration,
    join_timeout: Duration,
}

impl PartyCardsServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_config: RoomConfig::default(),
            cards: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            join_timeout: DEFAULT_JOIN_TIMEOUT,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the configuration applied to every room.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Sets the card content. Defaults to [`CardPool::builtin`].
    pub fn cards(mut self, pool: CardPool) -> Self {
        self.cards = Some(pool);
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    /// Binds the listener. Frames are JSON over WebSocket.
    pub async fn build(self) -> Result<PartyCardsServer, PartyCardsError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let pool = Arc::new(self.cards.unwrap_or_else(CardPool::builtin));
        tracing::info!(
            prompts = pool.prompts().len(),
            responses = pool.responses().len(),
            "card pool loaded"
        );

        let state = Arc::new(ServerState {
            registry: Mutex::new(RoomRegistry::new(self.room_config, pool)),
            codec: JsonCodec,
            idle_timeout: self.idle_timeout,
            join_timeout: self.join_timeout,
        });

        Ok(PartyCardsServer { transport, state })
    }
}

impl Default for PartyCardsServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound partycards server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct PartyCardsServer {
    transport: WebSocketTransport,
    state: Arc<ServerState<JsonCodec>>,
}

impl PartyCardsServer {
    /// Creates a new builder.
    pub fn builder() -> PartyCardsServerBuilder {
        PartyCardsServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, PartyCardsError> {
        Ok(self.transport.local_addr()?)
    }

    /// Runs the accept loop, spawning one handler task per connection.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), PartyCardsError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "partycards server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
