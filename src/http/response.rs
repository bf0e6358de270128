//! Response translation.
//!
//! # Responsibilities
//! - Map each `UpstreamOutcome` to exactly one downstream response
//! - Attach `Content-Type: application/json` and the CORS header
//! - Render failures as `{"error": ..., "status": "offline"}`
//!
//! # Design Decisions
//! - Headers are inserted, never appended, so repeated application is a no-op
//! - Upstream status is passed through on success, even 4xx/5xx from the device
//! - Timeout → 504, connection failure → 502, anything else → 500

use axum::body::{Body, Bytes};
use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::upstream::UpstreamOutcome;

/// Value of the `status` field in every error body.
pub const OFFLINE: &str = "offline";

/// Set `Access-Control-Allow-Origin: *`, replacing any existing value.
pub fn allow_any_origin(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
}

/// The single response written for one proxy request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownstreamResponse {
    status: StatusCode,
    body: Bytes,
}

impl DownstreamResponse {
    /// Structured JSON failure with `status: "offline"`.
    pub fn offline(status: StatusCode, message: impl Into<String>) -> Self {
        let body = json!({ "error": message.into(), "status": OFFLINE });
        Self {
            status,
            body: Bytes::from(body.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<UpstreamOutcome> for DownstreamResponse {
    fn from(outcome: UpstreamOutcome) -> Self {
        match outcome {
            UpstreamOutcome::Success { status, body, .. } => Self {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                body,
            },
            UpstreamOutcome::Timeout => {
                Self::offline(StatusCode::GATEWAY_TIMEOUT, "Connection Timed Out")
            }
            UpstreamOutcome::ConnectionFailed { reason } => Self::offline(
                StatusCode::BAD_GATEWAY,
                format!("Connection Failed: {}", reason),
            ),
            UpstreamOutcome::OtherError { reason } => Self::offline(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Proxy Error: {}", reason),
            ),
        }
    }
}

impl IntoResponse for DownstreamResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        allow_any_origin(headers);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::BodyEncoding;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn cors_count(response: &Response) -> usize {
        response
            .headers()
            .get_all(ACCESS_CONTROL_ALLOW_ORIGIN)
            .iter()
            .count()
    }

    #[tokio::test]
    async fn success_passes_body_and_status_through() {
        let response = DownstreamResponse::from(UpstreamOutcome::Success {
            status: 200,
            body: Bytes::from_static(br#"{"hashRate":450}"#),
            encoding: BodyEncoding::Identity,
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(cors_count(&response), 1);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], br#"{"hashRate":450}"#);
    }

    #[test]
    fn device_error_status_is_preserved() {
        let translated = DownstreamResponse::from(UpstreamOutcome::Success {
            status: 404,
            body: Bytes::new(),
            encoding: BodyEncoding::Identity,
        });
        assert_eq!(translated.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn timeout_is_504_offline() {
        let response = DownstreamResponse::from(UpstreamOutcome::Timeout).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(cors_count(&response), 1);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Connection Timed Out", "status": "offline" })
        );
    }

    #[tokio::test]
    async fn connection_failure_is_502_with_reason() {
        let response = DownstreamResponse::from(UpstreamOutcome::ConnectionFailed {
            reason: "Connection refused (os error 111)".into(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(
            body_json(response).await,
            json!({
                "error": "Connection Failed: Connection refused (os error 111)",
                "status": "offline"
            })
        );
    }

    #[tokio::test]
    async fn other_error_is_500() {
        let response = DownstreamResponse::from(UpstreamOutcome::OtherError {
            reason: "gzip decode failed: invalid gzip header".into(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(cors_count(&response), 1);
        assert_eq!(
            body_json(response).await["error"],
            "Proxy Error: gzip decode failed: invalid gzip header"
        );
    }

    #[test]
    fn allow_any_origin_is_idempotent() {
        let mut headers = HeaderMap::new();
        allow_any_origin(&mut headers);
        allow_any_origin(&mut headers);
        assert_eq!(headers.get_all(ACCESS_CONTROL_ALLOW_ORIGIN).iter().count(), 1);
    }
}
