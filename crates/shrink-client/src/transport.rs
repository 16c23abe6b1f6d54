//! HTTP transport to the transformation service

use async_trait::async_trait;
use tracing::debug;

use shrink_core::{CompressRequest, CompressResponse, ErrorResponse};

use crate::error::ClientError;
use crate::source::Transport;

/// Path of the transformation endpoint
pub const COMPRESS_PATH: &str = "/api/compress";

/// POSTs JSON to the transformation endpoint
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// `endpoint` is the full URL of the compress route
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Endpoint under `base`, e.g. `http://localhost:3000`
    pub fn with_base_url(base: &str) -> Self {
        Self::new(format!("{}{}", base.trim_end_matches('/'), COMPRESS_PATH))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
    async fn compress(&self, request: &CompressRequest) -> Result<CompressResponse, ClientError> {
        debug!("POST {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Best effort: the body is only used for diagnostics
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.message)
                .unwrap_or_else(|_| "<no message>".to_string());
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<CompressResponse>()
            .await
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }
}
