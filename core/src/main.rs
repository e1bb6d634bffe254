//! VeilPay Server
//!
//! Main entry point for the payment-link service.

use anyhow::Result;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

use veilpay_config::VeilpayConfig;
use veilpay_core::api::{ApiState, create_router};
use veilpay_core::store::RocksLinkStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Load configuration
    let config = VeilpayConfig::load()?;

    info!("============================================");
    info!(
        "          VEILPAY SERVER v{}               ",
        env!("CARGO_PKG_VERSION")
    );
    info!("============================================");
    info!("DB path      : {}", config.database.path);
    info!("API port     : {}", config.api.port);
    info!("Link TTL     : {}s", config.links.ttl_secs);
    info!("Settle delay : {}ms", config.transfer.settle_delay_ms);
    info!("============================================");

    // Open link store
    let store = Arc::new(RocksLinkStore::open(
        &config.database.path,
        config.links.ttl_secs,
    )?);
    info!("Link store opened at {}", config.database.path);

    // Create API state
    let api_state = ApiState {
        store,
        start_time: std::time::Instant::now(),
    };

    // Create and start HTTP server
    let router = create_router(api_state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.api.port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP API listening on {}", addr);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    info!("============================================");
    info!("  VeilPay is ready!");
    info!("  API: http://0.0.0.0:{}", config.api.port);
    info!("============================================");

    // Wait for shutdown signal
    signal::ctrl_c().await?;
    info!("Shutdown signal received");

    info!("VeilPay server stopped");
    Ok(())
}
