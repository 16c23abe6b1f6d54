//! JSON bodies exchanged with `POST /api/compress`

use serde::{Deserialize, Serialize};

/// Client → server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompressRequest {
    /// Document as a `data:application/pdf;base64,` URL.
    /// Optional so the server can answer a missing payload with 400.
    #[serde(default)]
    pub pdf_base64: Option<String>,
}

impl CompressRequest {
    pub fn new(data_url: String) -> Self {
        Self {
            pdf_base64: Some(data_url),
        }
    }
}

/// Server → client on success
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompressResponse {
    /// Rewritten document as a data URL
    pub compressed_pdf: String,
    /// Raw byte length of the uploaded document
    pub original_size: u64,
    /// Raw byte length of the rewritten document
    pub compressed_size: u64,
}

/// Server → client on failure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_uses_camel_case() {
        let req = CompressRequest::new("data:application/pdf;base64,AA==".into());
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({ "pdfBase64": "data:application/pdf;base64,AA==" }));
    }

    #[test]
    fn test_request_without_payload_deserializes() {
        let req: CompressRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.pdf_base64, None);
    }

    #[test]
    fn test_response_field_names() {
        let json = r#"{"compressedPdf":"data:application/pdf;base64,","originalSize":10,"compressedSize":7}"#;
        let resp: CompressResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            resp,
            CompressResponse {
                compressed_pdf: "data:application/pdf;base64,".into(),
                original_size: 10,
                compressed_size: 7,
            }
        );
    }

    #[test]
    fn test_error_response_omits_missing_code() {
        let body = ErrorResponse {
            message: "No PDF data provided".into(),
            code: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, json!({ "message": "No PDF data provided" }));
    }
}
