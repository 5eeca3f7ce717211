//! CCTV Dashboard - headless runner
//!
//! Starts the synchronizer against the configured backend and logs state
//! transitions until interrupted.

use cctv_dashboard::config::DashboardConfig;
use cctv_dashboard::gateway::GatewayClient;
use cctv_dashboard::sync::DashboardSynchronizer;
use cctv_dashboard::view::{self, HomeStats};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cctv_dashboard=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting CCTV dashboard core v{}", env!("CARGO_PKG_VERSION"));

    let config = DashboardConfig::from_env();
    tracing::info!(
        base_url = %config.base_url,
        detection_limit = config.detection_limit,
        refresh_interval_sec = config.refresh_interval.as_secs(),
        "Configuration loaded"
    );

    let gateway = GatewayClient::new(config.base_url.clone());
    let synchronizer = Arc::new(DashboardSynchronizer::new(Arc::new(gateway), config));
    synchronizer.start().await;

    // Report stat changes until shutdown
    let mut rx = synchronizer.subscribe();
    let reporter = tokio::spawn(async move {
        let mut last: Option<HomeStats> = None;

        while rx.changed().await.is_ok() {
            let (stats, loading, last_error) = {
                let state = rx.borrow_and_update();
                (
                    view::home_stats(&state),
                    state.loading,
                    state.last_error.clone(),
                )
            };

            if loading || last == Some(stats) {
                continue;
            }
            last = Some(stats);

            if let Some(message) = last_error {
                tracing::warn!(error = %message, "Dashboard degraded");
            }

            tracing::info!(
                cameras = stats.camera_count,
                detections = stats.detection_count,
                online = stats.online_count,
                avg_confidence_pct = stats.average_confidence_percent(),
                "Dashboard state updated"
            );
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    synchronizer.stop().await;
    reporter.abort();

    Ok(())
}
