//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::DomainError;
use std::collections::BTreeMap;
use std::path::Path;

/// HTTP verbs the backend gateway supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one HTTP exchange. Never an `Err`: transport failures are
/// encoded as `status_code == 0` with `error_message` set, HTTP failures as
/// the real status with an empty `error_message`.
#[derive(Debug, Clone, Default)]
pub struct ApiResponse {
    pub status_code: u16,
    pub body: String,
    pub headers: BTreeMap<String, String>,
    pub success: bool,
    pub error_message: String,
}

impl ApiResponse {
    /// Response for a request the server actually answered.
    /// `success` holds iff the status is in [200, 300).
    pub fn from_http(status_code: u16, body: String, headers: BTreeMap<String, String>) -> Self {
        Self {
            success: (200..300).contains(&status_code),
            status_code,
            body,
            headers,
            error_message: String::new(),
        }
    }

    /// Response for a request that never reached the server.
    pub fn transport_failure(error_message: impl Into<String>) -> Self {
        Self {
            status_code: 0,
            body: String::new(),
            headers: BTreeMap::new(),
            success: false,
            error_message: error_message.into(),
        }
    }

    /// Convert into a domain result. Use cases call this at the boundary so
    /// failures carry a typed cause instead of an ad hoc flag.
    pub fn into_result(self) -> Result<ApiResponse, DomainError> {
        if self.success {
            return Ok(self);
        }
        if self.status_code == 0 {
            Err(DomainError::Transport(self.error_message))
        } else {
            Err(DomainError::Api {
                status: self.status_code,
                message: truncate(&self.body, 200),
            })
        }
    }

    /// Deserialize the body. Callers map the error into `DomainError::Parse`.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Backend gateway. Generic JSON:API-flavored HTTP access with default
/// headers, optional bearer auth, and a fixed per-request timeout.
#[async_trait::async_trait]
pub trait ApiGateway: Send + Sync {
    async fn get(&self, endpoint: &str) -> ApiResponse;

    async fn post(&self, endpoint: &str, body: &serde_json::Value) -> ApiResponse;

    async fn put(&self, endpoint: &str, body: &serde_json::Value) -> ApiResponse;

    async fn patch(&self, endpoint: &str, body: &serde_json::Value) -> ApiResponse;

    async fn delete(&self, endpoint: &str) -> ApiResponse;

    /// Multipart form upload. Separate code path from the JSON machinery:
    /// the default Content-Type header is not applied here.
    async fn upload_file(
        &self,
        endpoint: &str,
        field_name: &str,
        file_path: &Path,
        additional_fields: &BTreeMap<String, String>,
    ) -> ApiResponse;

    /// `GET /health`, success flag only.
    async fn is_server_available(&self) -> bool;

    /// Merge a header into every subsequent request.
    fn set_header(&self, name: &str, value: &str);

    fn remove_header(&self, name: &str);

    /// Reset to exactly the two JSON defaults (Content-Type, Accept).
    /// Does not touch the auth token.
    fn clear_headers(&self);

    /// Non-empty: every subsequent request carries `Authorization: Bearer <t>`.
    /// Empty: the header is omitted.
    fn set_auth_token(&self, token: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_iff_2xx() {
        assert!(ApiResponse::from_http(200, String::new(), BTreeMap::new()).success);
        assert!(ApiResponse::from_http(204, String::new(), BTreeMap::new()).success);
        assert!(ApiResponse::from_http(299, String::new(), BTreeMap::new()).success);
        assert!(!ApiResponse::from_http(300, String::new(), BTreeMap::new()).success);
        assert!(!ApiResponse::from_http(199, String::new(), BTreeMap::new()).success);
        assert!(!ApiResponse::from_http(404, String::new(), BTreeMap::new()).success);
        assert!(!ApiResponse::from_http(500, String::new(), BTreeMap::new()).success);
    }

    #[test]
    fn test_http_failure_keeps_status_and_empty_error_message() {
        let resp = ApiResponse::from_http(404, "not found".into(), BTreeMap::new());
        assert!(!resp.success);
        assert_eq!(resp.status_code, 404);
        assert_eq!(resp.error_message, "");
        assert_eq!(resp.body, "not found");
    }

    #[test]
    fn test_transport_failure_has_status_zero() {
        let resp = ApiResponse::transport_failure("connection refused");
        assert!(!resp.success);
        assert_eq!(resp.status_code, 0);
        assert_eq!(resp.error_message, "connection refused");
        assert!(resp.body.is_empty());
    }

    #[test]
    fn test_into_result_maps_failure_classes() {
        let err = ApiResponse::transport_failure("dns").into_result().unwrap_err();
        assert!(matches!(err, crate::domain::DomainError::Transport(_)));

        let err = ApiResponse::from_http(500, "boom".into(), BTreeMap::new())
            .into_result()
            .unwrap_err();
        match err {
            crate::domain::DomainError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(ApiResponse::from_http(201, "{}".into(), BTreeMap::new())
            .into_result()
            .is_ok());
    }
}
