//! Relay server - binds both endpoints and spawns per-connection sessions.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use super::config::RelayConfig;
use super::error::RelayError;
use super::ingest::run_ingestion_session;
use super::viewer::run_viewer_session;
use crate::store::{PositionStore, SharedPositionStore};
use crate::transport::split_websocket;

/// Pause after a failed `accept()` so a persistent error does not spin.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Vehicles,
    Viewers,
}

impl Endpoint {
    fn name(self) -> &'static str {
        match self {
            Endpoint::Vehicles => "vehicle",
            Endpoint::Viewers => "viewer",
        }
    }
}

/// Relay server with both listening endpoints bound.
///
/// # Example
///
/// ```ignore
/// let server = RelayServer::bind(RelayConfig::default()).await?;
/// let shutdown = CancellationToken::new();
/// server.run(shutdown.clone()).await;
/// ```
pub struct RelayServer {
    config: RelayConfig,
    store: SharedPositionStore,
    vehicles: TcpListener,
    viewers: TcpListener,
}

impl RelayServer {
    /// Bind both endpoints with a fresh, empty position store.
    pub async fn bind(config: RelayConfig) -> Result<Self, RelayError> {
        Self::bind_with_store(config, PositionStore::shared()).await
    }

    /// Bind both endpoints serving from an existing store.
    pub async fn bind_with_store(
        config: RelayConfig,
        store: SharedPositionStore,
    ) -> Result<Self, RelayError> {
        let vehicles = bind_endpoint(&config.host, config.vehicle_port, Endpoint::Vehicles).await?;
        let viewers = bind_endpoint(&config.host, config.viewer_port, Endpoint::Viewers).await?;

        Ok(Self {
            config,
            store,
            vehicles,
            viewers,
        })
    }

    /// The store sessions read from and write to.
    pub fn store(&self) -> &SharedPositionStore {
        &self.store
    }

    /// Address the vehicle endpoint is listening on.
    pub fn vehicle_addr(&self) -> Option<SocketAddr> {
        self.vehicles.local_addr().ok()
    }

    /// Address the viewer endpoint is listening on.
    pub fn viewer_addr(&self) -> Option<SocketAddr> {
        self.viewers.local_addr().ok()
    }

    /// Accept connections until `shutdown` is cancelled.
    ///
    /// On shutdown every running session is cancelled and awaited before this
    /// returns.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            vehicles = ?self.vehicle_addr(),
            viewers = ?self.viewer_addr(),
            "Relay server started"
        );

        let tracker = TaskTracker::new();
        tokio::join!(
            self.accept_loop(&self.vehicles, Endpoint::Vehicles, &tracker, &shutdown),
            self.accept_loop(&self.viewers, Endpoint::Viewers, &tracker, &shutdown),
        );

        tracker.close();
        debug!(sessions = tracker.len(), "Waiting for sessions to finish");
        tracker.wait().await;

        info!(vehicles = self.store.len(), "Relay server stopped");
    }

    async fn accept_loop(
        &self,
        listener: &TcpListener,
        endpoint: Endpoint,
        tracker: &TaskTracker,
        shutdown: &CancellationToken,
    ) {
        loop {
            let (stream, peer) = tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!(endpoint = endpoint.name(), error = %e, "Failed to accept connection");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                        continue;
                    }
                },
            };

            let store = Arc::clone(&self.store);
            let interval = self.config.broadcast_interval;
            let cancel = shutdown.child_token();
            tracker.spawn(serve_connection(stream, peer, endpoint, store, interval, cancel));
        }
    }
}

async fn bind_endpoint(host: &str, port: u16, endpoint: Endpoint) -> Result<TcpListener, RelayError> {
    TcpListener::bind((host, port))
        .await
        .map_err(|e| RelayError::Bind {
            endpoint: endpoint.name(),
            addr: format!("{}:{}", host, port),
            source: e,
        })
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    endpoint: Endpoint,
    store: SharedPositionStore,
    broadcast_interval: Duration,
    cancel: CancellationToken,
) {
    let ws = tokio::select! {
        _ = cancel.cancelled() => return,
        handshake = tokio_tungstenite::accept_async(stream) => match handshake {
            Ok(ws) => ws,
            Err(e) => {
                warn!(endpoint = endpoint.name(), %peer, error = %e, "WebSocket handshake failed");
                return;
            }
        },
    };

    info!(endpoint = endpoint.name(), %peer, "Connection opened");
    let (sink, source) = split_websocket(ws);

    let result = match endpoint {
        Endpoint::Vehicles => run_ingestion_session(source, sink, &store, cancel).await,
        Endpoint::Viewers => {
            run_viewer_session(source, sink, &store, broadcast_interval, cancel).await
        }
    };

    match result {
        Ok(()) => info!(endpoint = endpoint.name(), %peer, "Connection closed"),
        Err(e) => warn!(endpoint = endpoint.name(), %peer, error = %e, "Connection failed"),
    }
}
