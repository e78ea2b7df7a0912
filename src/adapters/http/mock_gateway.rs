//! Scripted ApiGateway for testing use cases without a backend.
//!
//! Responses are queued ahead of time and handed out in FIFO order; every
//! call is recorded for assertions. Test double only — never wired into the
//! production path.

use crate::ports::{ApiGateway, ApiResponse, Method};
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// One observed gateway call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub endpoint: String,
    pub body: Option<serde_json::Value>,
}

#[derive(Default)]
pub struct MockGateway {
    script: Mutex<VecDeque<ApiResponse>>,
    calls: Mutex<Vec<RecordedCall>>,
    headers: Mutex<BTreeMap<String, String>>,
    auth_token: Mutex<Option<String>>,
    available: AtomicBool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            ..Default::default()
        }
    }

    /// Queue a raw response.
    pub fn enqueue(&self, response: ApiResponse) {
        self.script.lock().unwrap().push_back(response);
    }

    /// Queue a 200 response with the given JSON body.
    pub fn enqueue_ok(&self, body: serde_json::Value) {
        self.enqueue(ApiResponse::from_http(
            200,
            body.to_string(),
            BTreeMap::new(),
        ));
    }

    /// Queue an HTTP error with an empty body.
    pub fn enqueue_status(&self, status: u16) {
        self.enqueue(ApiResponse::from_http(status, String::new(), BTreeMap::new()));
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn auth_token(&self) -> Option<String> {
        self.auth_token.lock().unwrap().clone()
    }

    fn record_and_pop(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<serde_json::Value>,
    ) -> ApiResponse {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            endpoint: endpoint.to_string(),
            body,
        });
        self.script
            .lock()
            .unwrap()
            .pop_front()
            // Loud failure: an unscripted call is a broken test, not a 404.
            .unwrap_or_else(|| ApiResponse::transport_failure("mock script exhausted"))
    }
}

#[async_trait::async_trait]
impl ApiGateway for MockGateway {
    async fn get(&self, endpoint: &str) -> ApiResponse {
        self.record_and_pop(Method::Get, endpoint, None)
    }

    async fn post(&self, endpoint: &str, body: &serde_json::Value) -> ApiResponse {
        self.record_and_pop(Method::Post, endpoint, Some(body.clone()))
    }

    async fn put(&self, endpoint: &str, body: &serde_json::Value) -> ApiResponse {
        self.record_and_pop(Method::Put, endpoint, Some(body.clone()))
    }

    async fn patch(&self, endpoint: &str, body: &serde_json::Value) -> ApiResponse {
        self.record_and_pop(Method::Patch, endpoint, Some(body.clone()))
    }

    async fn delete(&self, endpoint: &str) -> ApiResponse {
        self.record_and_pop(Method::Delete, endpoint, None)
    }

    async fn upload_file(
        &self,
        endpoint: &str,
        field_name: &str,
        file_path: &Path,
        additional_fields: &BTreeMap<String, String>,
    ) -> ApiResponse {
        let body = serde_json::json!({
            "field_name": field_name,
            "file_path": file_path.display().to_string(),
            "additional_fields": additional_fields,
        });
        self.record_and_pop(Method::Post, endpoint, Some(body))
    }

    async fn is_server_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn set_header(&self, name: &str, value: &str) {
        self.headers
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    fn remove_header(&self, name: &str) {
        self.headers.lock().unwrap().remove(name);
    }

    fn clear_headers(&self) {
        self.headers.lock().unwrap().clear();
    }

    fn set_auth_token(&self, token: &str) {
        *self.auth_token.lock().unwrap() = if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        };
    }
}
