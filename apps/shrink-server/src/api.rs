//! API handlers for the shrink server
//!
//! Provides REST endpoints for:
//! - PDF compression
//! - Health checks

use std::time::Duration;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;
use tracing::{debug, info};

use shrink_core::{decode_data_url, encode_data_url, CompressRequest, CompressResponse};

use crate::error::ServerError;
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "shrink-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: POST /api/compress
///
/// Decodes the data URL, rewrites the document on a blocking worker and
/// returns it re-encoded with both raw sizes. Waiting for a free rewrite
/// slot counts against the timeout.
pub async fn handle_compress(
    State(state): State<AppState>,
    payload: Result<Json<CompressRequest>, JsonRejection>,
) -> Result<Json<CompressResponse>, ServerError> {
    let Json(req) = payload?;

    let data_url = req
        .pdf_base64
        .filter(|url| !url.trim().is_empty())
        .ok_or(ServerError::MissingPayload)?;

    let original = decode_data_url(&data_url).map_err(|e| {
        debug!("Undecodable payload: {}", e);
        ServerError::InvalidRequest("PDF data must be a base64 data URL".into())
    })?;
    let original_size = original.len() as u64;

    info!("Compress request: {} bytes", original_size);

    let timeout_ms = state.timeout_ms;
    let rewriter = state.rewriter.clone();
    let slots = state.rewrite_slots.clone();

    // Permit lives in the blocking closure: held until the rewrite returns,
    // even past the deadline
    let work = async move {
        let permit = slots
            .acquire_owned()
            .await
            .map_err(|e| ServerError::Processing(format!("rewrite slots closed: {}", e)))?;
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            rewriter.rewrite(&original)
        })
        .await
        .map_err(|e| ServerError::Processing(format!("rewrite task failed: {}", e)))
    };

    let compressed = tokio::time::timeout(Duration::from_millis(timeout_ms), work)
        .await
        .map_err(|_| ServerError::Timeout(timeout_ms))??
        .map_err(|e| ServerError::Processing(e.to_string()))?;
    let compressed_size = compressed.len() as u64;

    info!(
        "Compressed {} -> {} bytes",
        original_size, compressed_size
    );

    Ok(Json(CompressResponse {
        compressed_pdf: encode_data_url(&compressed),
        original_size,
        compressed_size,
    }))
}

/// Handler: any other method on /api/compress
pub async fn handle_method_not_allowed() -> ServerError {
    ServerError::MethodNotAllowed
}
