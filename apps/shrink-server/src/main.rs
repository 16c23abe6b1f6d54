//! PDF Shrink Server
//!
//! A stateless server that reduces the byte size of uploaded PDF documents.
//! Provides REST API endpoints for:
//!
//! - PDF compression (`POST /api/compress`)
//! - Health checks
//!
//! ## Architecture
//!
//! Each request is independent: the document arrives as a base64 data URL,
//! is rewritten by a [`PdfRewriter`] on a blocking worker, and leaves the
//! same way. Nothing is persisted. The server adds:
//!
//! - Rate limiting via tower-governor
//! - A request body ceiling sized for 10 MiB documents after base64 expansion
//! - A response deadline and a cap on concurrent rewrites

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use shrink_core::limits::{encoded_len, DEFAULT_BODY_LIMIT, MAX_UPLOAD_BYTES};
use shrink_core::{LopdfRewriter, PdfRewriter, RewriteOptions};
use tokio::sync::Semaphore;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;

use api::{handle_compress, handle_health, handle_method_not_allowed};

/// Command-line arguments for the shrink server
#[derive(Parser, Debug)]
#[command(name = "shrink-server")]
#[command(about = "Stateless PDF size-reduction server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Response deadline for a compress request, in milliseconds. A rewrite
    /// still running at the deadline finishes in the background and keeps
    /// its slot until then.
    #[arg(long, default_value = "30000")]
    timeout_ms: u64,

    /// Maximum number of rewrites running at once
    #[arg(long, default_value_t = DEFAULT_REWRITE_SLOTS)]
    max_rewrites: usize,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10")]
    rate_limit: u32,

    /// Maximum request body size in bytes
    #[arg(long, default_value_t = DEFAULT_BODY_LIMIT)]
    body_limit: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Default for `--max-rewrites`
const DEFAULT_REWRITE_SLOTS: usize = 4;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Engine performing the size-reducing rewrite
    pub rewriter: Arc<dyn PdfRewriter>,
    /// Response deadline in milliseconds
    pub timeout_ms: u64,
    /// One permit per rewrite allowed to run; held until the rewrite returns
    pub rewrite_slots: Arc<Semaphore>,
}

impl AppState {
    pub fn new(rewriter: Arc<dyn PdfRewriter>, timeout_ms: u64, max_rewrites: usize) -> Self {
        Self {
            rewriter,
            timeout_ms,
            rewrite_slots: Arc::new(Semaphore::new(max_rewrites.max(1))),
        }
    }
}

/// Burst allowance for the per-IP rate limiter
fn burst_size(rate_limit: u32) -> u32 {
    rate_limit.saturating_mul(2)
}

/// Routes and body ceiling, without network-facing middleware
pub fn build_router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route(
            "/api/compress",
            post(handle_compress).fallback(handle_method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting shrink server on {}:{}", args.host, args.port);

    let largest_upload = encoded_len(MAX_UPLOAD_BYTES as usize);
    if args.body_limit < largest_upload {
        warn!(
            "Body limit {} is below {} bytes; 10 MiB uploads will be rejected",
            args.body_limit, largest_upload
        );
    }

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(burst_size(args.rate_limit))
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limit: {}", args.rate_limit))?,
    );

    // Create shared state
    let state = AppState::new(
        Arc::new(LopdfRewriter::new(RewriteOptions::default())),
        args.timeout_ms,
        args.max_rewrites,
    );

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = build_router(state, args.body_limit).layer(
        ServiceBuilder::new().layer(cors).layer(GovernorLayer {
            config: governor_conf,
        }),
    );

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!("Body limit: {} bytes", args.body_limit);
    info!("Response deadline: {}ms", args.timeout_ms);
    info!("Concurrent rewrites: {}", args.max_rewrites.max(1));

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
