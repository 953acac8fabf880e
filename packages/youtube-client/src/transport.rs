use async_trait::async_trait;
use serde::Deserialize;

use crate::error::CallError;

const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// A prepared, key-independent API request. The unit cost is declared by
/// the caller because the service bills operations very differently
/// (search ≈ 100 units, simple lookups ≈ 1 unit) and the consumption
/// counters feed strategy-yield accounting upstream.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub endpoint: &'static str,
    pub params: Vec<(&'static str, String)>,
    pub unit_cost: u64,
}

impl ApiRequest {
    pub fn new(endpoint: &'static str, unit_cost: u64) -> Self {
        Self {
            endpoint,
            params: Vec::new(),
            unit_cost,
        }
    }

    pub fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push((name, value.into()));
        self
    }
}

/// Executes one HTTP exchange with a specific API key. Split out as a trait
/// so the rotation and retry policy can be tested against a scripted
/// transport.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn execute(
        &self,
        key: &str,
        request: &ApiRequest,
    ) -> Result<serde_json::Value, CallError>;
}

/// reqwest-backed transport against the production API.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Error envelope the API wraps every failure in.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorReason>,
}

#[derive(Debug, Deserialize)]
struct ErrorReason {
    #[serde(default)]
    reason: String,
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn execute(
        &self,
        key: &str,
        request: &ApiRequest,
    ) -> Result<serde_json::Value, CallError> {
        let url = format!("{}/{}", self.base_url, request.endpoint);
        let resp = self
            .client
            .get(&url)
            .query(&request.params)
            .query(&[("key", key)])
            .send()
            .await
            .map_err(|e| CallError::Network(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return resp
                .json()
                .await
                .map_err(|e| CallError::Network(e.to_string()));
        }

        let body = resp.text().await.unwrap_or_default();
        Err(classify_failure(status.as_u16(), &body))
    }
}

/// Map a non-success HTTP response onto the call-error taxonomy. Quota
/// rejections arrive as 403 with a quota-flavored reason string.
fn classify_failure(status: u16, body: &str) -> CallError {
    let (message, reasons) = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => {
            let reasons: Vec<String> =
                parsed.error.errors.into_iter().map(|e| e.reason).collect();
            (parsed.error.message, reasons)
        }
        Err(_) => (body.chars().take(200).collect(), Vec::new()),
    };

    if status == 403
        && reasons
            .iter()
            .any(|r| r == "quotaExceeded" || r == "dailyLimitExceeded" || r == "rateLimitExceeded")
    {
        return CallError::QuotaExceeded;
    }

    if (500..600).contains(&status) {
        CallError::ServerError { status, message }
    } else {
        CallError::Rejected { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_reason_maps_to_quota_exceeded() {
        let body = r#"{"error":{"code":403,"message":"Quota exceeded.","errors":[{"reason":"quotaExceeded"}]}}"#;
        assert!(matches!(
            classify_failure(403, body),
            CallError::QuotaExceeded
        ));
    }

    #[test]
    fn plain_403_is_rejected_not_quota() {
        let body = r#"{"error":{"code":403,"message":"Comments are disabled.","errors":[{"reason":"commentsDisabled"}]}}"#;
        assert!(matches!(
            classify_failure(403, body),
            CallError::Rejected { status: 403, .. }
        ));
    }

    #[test]
    fn five_xx_is_server_error() {
        assert!(matches!(
            classify_failure(503, "upstream unavailable"),
            CallError::ServerError { status: 503, .. }
        ));
    }
}
