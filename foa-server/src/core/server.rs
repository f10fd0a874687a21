//! Server Implementation
//!
//! HTTP listener, maintenance tasks and graceful shutdown.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::checkout::purge_stale;
use crate::core::{Config, Result, ServerState};

/// Maintenance tick for rate-limiter cleanup and checkout expiry
const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(60);

/// Unpaid checkouts older than this are dropped
const CHECKOUT_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// Ctrl-C fan-out to the listener and background tasks
#[derive(Clone)]
struct ShutdownSignal(watch::Receiver<bool>);

impl ShutdownSignal {
    fn install() -> Self {
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Shutdown signal received"),
                Err(e) => {
                    tracing::error!(error = %e, "Cannot listen for Ctrl-C; running until killed");
                    std::future::pending::<()>().await;
                }
            }
            let _ = tx.send(true);
        });
        Self(rx)
    }

    async fn wait(mut self) {
        let _ = self.0.wait_for(|stop| *stop).await;
    }
}

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        let shutdown = ShutdownSignal::install();
        spawn_maintenance(state.clone(), shutdown.clone());

        let app = crate::api::build_app(&state);
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, environment = %self.config.environment, "FOA server listening");

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.wait())
        .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

/// Periodic housekeeping until shutdown
fn spawn_maintenance(state: ServerState, shutdown: ShutdownSignal) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(MAINTENANCE_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let stop = shutdown.wait();
        tokio::pin!(stop);

        loop {
            tokio::select! {
                _ = &mut stop => break,
                _ = ticker.tick() => {
                    state.rate_limiter.cleanup().await;
                    match purge_stale(&state.store, CHECKOUT_TTL_MS) {
                        Ok(0) => {}
                        Ok(n) => tracing::info!(purged = n, "Expired unpaid checkouts"),
                        Err(e) => tracing::warn!(error = %e, "Checkout purge failed"),
                    }
                }
            }
        }
        tracing::debug!("Maintenance task stopped");
    });
}
