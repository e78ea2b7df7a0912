//! Backend HTTP client. Implements `ApiGateway` over reqwest.
//!
//! Stateless per request apart from the shared header/token configuration,
//! which sits behind locks so dispatched requests may run while a session
//! mutates headers.

use crate::ports::{ApiGateway, ApiResponse, Method};
use reqwest::multipart;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, warn};

const HEADER_CONTENT_TYPE: &str = "Content-Type";
const HEADER_ACCEPT: &str = "Accept";
const APPLICATION_JSON: &str = "application/json";

/// JSON:API backend client with default headers, optional bearer auth, and a
/// fixed per-request timeout.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    headers: RwLock<BTreeMap<String, String>>,
    auth_token: RwLock<Option<String>>,
}

impl ApiClient {
    /// Create a client for `base_url` with the given per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, crate::domain::DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| crate::domain::DomainError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            headers: RwLock::new(default_headers()),
            auth_token: RwLock::new(None),
        })
    }

    /// Join base and endpoint with exactly one `/` between them.
    fn build_full_url(base: &str, endpoint: &str) -> String {
        let base = base.trim_end_matches('/');
        let endpoint = endpoint.trim_start_matches('/');
        if endpoint.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{endpoint}")
        }
    }

    /// Snapshot of the headers every request carries, auth included.
    /// Locks are released before any await point.
    fn effective_headers(&self) -> BTreeMap<String, String> {
        let mut headers = self
            .headers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let token = self.auth_token.read().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = token.as_deref() {
            headers.insert("Authorization".to_string(), format!("Bearer {token}"));
        }
        headers
    }

    async fn perform(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&serde_json::Value>,
    ) -> ApiResponse {
        let url = Self::build_full_url(&self.base_url, endpoint);
        let headers = self.effective_headers();
        debug!(method = %method, url = %url, "dispatching request");

        let mut request = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Patch => self.client.patch(&url),
            Method::Delete => self.client.delete(&url),
        };
        for (name, value) in &headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(method = %method, url = %url, error = %e, "transport failure");
                return ApiResponse::transport_failure(e.to_string());
            }
        };

        Self::collect(method, &url, response).await
    }

    async fn collect(method: Method, url: &str, response: reqwest::Response) -> ApiResponse {
        let status = response.status().as_u16();
        let mut headers = BTreeMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_string(), value.to_string());
            }
        }
        let body = match response.text().await {
            Ok(b) => b,
            // Connection died while streaming the body; the exchange failed.
            Err(e) => return ApiResponse::transport_failure(e.to_string()),
        };
        let api_response = ApiResponse::from_http(status, body, headers);
        if api_response.success {
            debug!(method = %method, url = %url, status, "request ok");
        } else {
            warn!(method = %method, url = %url, status, "request failed");
        }
        api_response
    }
}

fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        (HEADER_CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()),
        (HEADER_ACCEPT.to_string(), APPLICATION_JSON.to_string()),
    ])
}

#[async_trait::async_trait]
impl ApiGateway for ApiClient {
    async fn get(&self, endpoint: &str) -> ApiResponse {
        self.perform(Method::Get, endpoint, None).await
    }

    async fn post(&self, endpoint: &str, body: &serde_json::Value) -> ApiResponse {
        self.perform(Method::Post, endpoint, Some(body)).await
    }

    async fn put(&self, endpoint: &str, body: &serde_json::Value) -> ApiResponse {
        self.perform(Method::Put, endpoint, Some(body)).await
    }

    async fn patch(&self, endpoint: &str, body: &serde_json::Value) -> ApiResponse {
        self.perform(Method::Patch, endpoint, Some(body)).await
    }

    async fn delete(&self, endpoint: &str) -> ApiResponse {
        self.perform(Method::Delete, endpoint, None).await
    }

    async fn upload_file(
        &self,
        endpoint: &str,
        field_name: &str,
        file_path: &Path,
        additional_fields: &BTreeMap<String, String>,
    ) -> ApiResponse {
        let url = Self::build_full_url(&self.base_url, endpoint);

        let bytes = match tokio::fs::read(file_path).await {
            Ok(b) => b,
            Err(e) => {
                return ApiResponse::transport_failure(format!(
                    "failed to read {}: {e}",
                    file_path.display()
                ));
            }
        };
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());

        let mut form = multipart::Form::new().part(
            field_name.to_string(),
            multipart::Part::bytes(bytes).file_name(file_name),
        );
        for (name, value) in additional_fields {
            form = form.text(name.clone(), value.clone());
        }

        // Multipart sets its own Content-Type with the boundary; the stored
        // JSON default must not override it.
        let mut request = self.client.post(&url).multipart(form);
        for (name, value) in self.effective_headers() {
            if name.eq_ignore_ascii_case(HEADER_CONTENT_TYPE) {
                continue;
            }
            request = request.header(name.as_str(), value.as_str());
        }

        debug!(url = %url, field = field_name, "uploading file");
        match request.send().await {
            Ok(response) => Self::collect(Method::Post, &url, response).await,
            Err(e) => {
                warn!(url = %url, error = %e, "upload transport failure");
                ApiResponse::transport_failure(e.to_string())
            }
        }
    }

    async fn is_server_available(&self) -> bool {
        self.get("/health").await.success
    }

    fn set_header(&self, name: &str, value: &str) {
        self.headers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), value.to_string());
    }

    fn remove_header(&self, name: &str) {
        self.headers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(name);
    }

    fn clear_headers(&self) {
        *self.headers.write().unwrap_or_else(|e| e.into_inner()) = default_headers();
    }

    fn set_auth_token(&self, token: &str) {
        let mut slot = self.auth_token.write().unwrap_or_else(|e| e.into_inner());
        *slot = if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new("http://host/api", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_build_full_url_single_slash() {
        assert_eq!(
            ApiClient::build_full_url("http://host/api", "Student"),
            "http://host/api/Student"
        );
        assert_eq!(
            ApiClient::build_full_url("http://host/api", "/Student"),
            "http://host/api/Student"
        );
        assert_eq!(
            ApiClient::build_full_url("http://host/api/", "Student"),
            "http://host/api/Student"
        );
        assert_eq!(
            ApiClient::build_full_url("http://host/api/", "/Student"),
            "http://host/api/Student"
        );
    }

    #[test]
    fn test_build_full_url_empty_endpoint() {
        assert_eq!(
            ApiClient::build_full_url("http://host/api/", ""),
            "http://host/api"
        );
    }

    #[test]
    fn test_build_full_url_keeps_nested_path() {
        assert_eq!(
            ApiClient::build_full_url("http://host/api", "FormSubmission/7/attachments"),
            "http://host/api/FormSubmission/7/attachments"
        );
    }

    #[test]
    fn test_default_headers_present() {
        let c = client();
        let headers = c.effective_headers();
        assert_eq!(headers.get("Content-Type").map(String::as_str), Some("application/json"));
        assert_eq!(headers.get("Accept").map(String::as_str), Some("application/json"));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_clear_headers_resets_to_exactly_two_defaults() {
        let c = client();
        c.set_header("X-Portal", "admin");
        c.remove_header("Accept");
        c.clear_headers();
        let headers = c.effective_headers();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("Content-Type").map(String::as_str), Some("application/json"));
        assert_eq!(headers.get("Accept").map(String::as_str), Some("application/json"));
    }

    #[test]
    fn test_set_and_remove_header() {
        let c = client();
        c.set_header("X-Portal", "admin");
        assert_eq!(c.effective_headers().get("X-Portal").map(String::as_str), Some("admin"));
        c.remove_header("X-Portal");
        assert!(!c.effective_headers().contains_key("X-Portal"));
    }

    #[test]
    fn test_auth_token_bearer_header() {
        let c = client();
        c.set_auth_token("admin_token_7");
        assert_eq!(
            c.effective_headers().get("Authorization").map(String::as_str),
            Some("Bearer admin_token_7")
        );

        // Empty token omits the header entirely.
        c.set_auth_token("");
        assert!(!c.effective_headers().contains_key("Authorization"));
    }

    #[test]
    fn test_clear_headers_does_not_drop_auth() {
        let c = client();
        c.set_auth_token("tok");
        c.clear_headers();
        assert_eq!(
            c.effective_headers().get("Authorization").map(String::as_str),
            Some("Bearer tok")
        );
    }
}
