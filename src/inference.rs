//! Client for the external sign-recognition service.
//!
//! The model itself is an opaque collaborator: we POST a captured frame and
//! get back a scored verdict. The API layer proxies this call so the service
//! endpoint is never exposed to browsers and sits behind the same auth gate
//! as the rest of the API.

use crate::error::Result;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Request body for `POST /infer-sign`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub target_sign_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<f64>>,
    /// Base64-encoded frame. Passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A single hand landmark in normalized coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Scored verdict for one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub predicted_sign_id: String,
    /// Confidence in [0, 1].
    pub confidence: f64,
    pub is_correct: bool,
    pub feedback: Vec<String>,
    #[serde(default)]
    pub scores: HashMap<String, f64>,
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,
}

/// HTTP client for the inference service.
#[derive(Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
    endpoint: String,
}

impl InferenceClient {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build inference HTTP client")?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Score one frame against a target sign.
    pub async fn infer(&self, request: &InferenceRequest) -> Result<InferenceResponse> {
        let url = format!("{}/infer-sign", self.endpoint);
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .context("inference request failed")?
            .error_for_status()
            .context("inference service returned an error status")?
            .json::<InferenceResponse>()
            .await
            .context("failed to decode inference response")?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_decodes_without_optional_fields() {
        let raw = r#"{
            "predicted_sign_id": "Hello",
            "confidence": 0.87,
            "is_correct": true,
            "feedback": ["Good handshape"]
        }"#;

        let response: InferenceResponse = serde_json::from_str(raw).unwrap();

        assert!(response.is_correct);
        assert!(response.scores.is_empty());
        assert!(response.landmarks.is_none());
    }

    #[test]
    fn request_omits_absent_frame_data() {
        let request = InferenceRequest {
            target_sign_id: "Hello".into(),
            features: None,
            image: None,
        };

        let encoded = serde_json::to_value(&request).unwrap();

        assert_eq!(
            encoded,
            serde_json::json!({ "target_sign_id": "Hello" })
        );
    }
}
