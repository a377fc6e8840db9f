mod config;
mod errors;
mod llm_client;
mod resume;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::resume::classify::EmploymentClassifier;
use crate::resume::normalizer::{NormalizeOptions, ResumeNormalizer};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing or invalid env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create upload directory {}",
                config.upload_dir.display()
            )
        })?;
    info!("Upload directory: {}", config.upload_dir.display());

    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!(
        "LLM client initialized (model: {}, pdf mode: {:?})",
        llm_client::MODEL,
        config.pdf_mode
    );

    let classifier = EmploymentClassifier::new(&config.internship_keywords);
    info!(
        "Internship keywords: {:?} (policy: {:?})",
        classifier.keywords(),
        config.internship_policy
    );
    let normalizer = ResumeNormalizer::new(
        classifier,
        NormalizeOptions {
            duration_format: config.experience_format,
            internship_policy: config.internship_policy,
        },
    );

    let state = AppState {
        gateway: Arc::new(llm),
        normalizer: Arc::new(normalizer),
        config: config.clone(),
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
