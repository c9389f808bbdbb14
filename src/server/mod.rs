//! HTTP server.
//!
//! Thin axum layer over the providers and the profile aggregator. Input
//! validation happens here so the aggregator only ever sees well-formed
//! vehicle identities and locations.

pub mod handlers;
pub mod routes;
pub mod validation;

#[cfg(test)]
mod tests;

use crate::profile::{ProfileAggregator, SearchSettings};
use crate::providers::{InsightsProvider, ListingsProvider, SafetyProvider};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

pub use routes::create_router;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: ProfileAggregator,
    pub safety: Arc<dyn SafetyProvider>,
    pub insights: Arc<dyn InsightsProvider>,
    pub listings: Arc<dyn ListingsProvider>,
}

impl AppState {
    pub fn new(
        safety: Arc<dyn SafetyProvider>,
        insights: Arc<dyn InsightsProvider>,
        listings: Arc<dyn ListingsProvider>,
        settings: SearchSettings,
    ) -> Self {
        let aggregator = ProfileAggregator::new(
            safety.clone(),
            insights.clone(),
            listings.clone(),
            settings,
        );

        Self {
            aggregator,
            safety,
            insights,
            listings,
        }
    }

    pub fn settings(&self) -> &SearchSettings {
        self.aggregator.settings()
    }
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
