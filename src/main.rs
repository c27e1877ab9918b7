// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use axum::{
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};

use crate::infrastructure::config::{load_influx_config, load_pipeline_config};
use crate::infrastructure::influx_writer::InfluxStore;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    health_check, ingest_calibration_reads, ingest_exercises, ingest_glucose_reads,
    ingest_injections, ingest_meals,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let influx_config = load_influx_config()?;
    let pipeline_config = load_pipeline_config()?;

    // Create the backing store handle (infrastructure layer)
    let store = InfluxStore::new(
        influx_config.influx.host,
        influx_config.influx.token,
        influx_config.influx.database,
        influx_config.influx.retention_policy,
    );

    // Create application state; each request builds its own streamer chain
    // on top of the shared store handle
    let state = Arc::new(AppState {
        store,
        pipeline: pipeline_config.pipeline,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/v1/glucosereads", post(ingest_glucose_reads))
        .route("/v1/calibrations", post(ingest_calibration_reads))
        .route("/v1/injections", post(ingest_injections))
        .route("/v1/meals", post(ingest_meals))
        .route("/v1/exercises", post(ingest_exercises))
        .with_state(state);

    // Start server
    let addr: SocketAddr = "0.0.0.0:8080".parse().unwrap();
    println!("Starting metabolite-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
