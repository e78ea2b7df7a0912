//! Async task: reads queued API calls from a bounded mpsc channel and runs
//! them against the gateway with capped concurrency.
//!
//! Replaces fire-and-forget background requests: every call yields a handle
//! the submitter can join, and shutdown drains the queue and waits for all
//! in-flight requests before returning.

use crate::domain::DomainError;
use crate::ports::{ApiGateway, ApiResponse, Method};
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

/// One queued HTTP exchange.
#[derive(Debug, Clone)]
pub struct ApiCall {
    pub method: Method,
    pub endpoint: String,
    pub body: Option<serde_json::Value>,
}

impl ApiCall {
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            endpoint: endpoint.into(),
            body: None,
        }
    }

    pub fn post(endpoint: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            endpoint: endpoint.into(),
            body: Some(body),
        }
    }

    pub fn put(endpoint: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Put,
            endpoint: endpoint.into(),
            body: Some(body),
        }
    }

    pub fn patch(endpoint: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Patch,
            endpoint: endpoint.into(),
            body: Some(body),
        }
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            endpoint: endpoint.into(),
            body: None,
        }
    }
}

struct Job {
    call: ApiCall,
    reply: oneshot::Sender<ApiResponse>,
}

/// Handle to a dispatched request. Await `join` for the result; dropping the
/// handle abandons interest without cancelling the exchange itself (the
/// worker still owns it to completion).
#[derive(Debug)]
pub struct PendingResponse {
    rx: oneshot::Receiver<ApiResponse>,
}

impl PendingResponse {
    pub async fn join(self) -> Result<ApiResponse, DomainError> {
        self.rx
            .await
            .map_err(|_| DomainError::Dispatch("dispatcher dropped the request".into()))
    }
}

/// Bounded request dispatcher. Jobs queue on a bounded channel (submitters
/// block when full) and run with at most `max_in_flight` concurrent requests.
pub struct RequestDispatcher {
    tx: std::sync::Mutex<Option<mpsc::Sender<Job>>>,
    worker: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl RequestDispatcher {
    pub fn spawn(
        gateway: Arc<dyn ApiGateway>,
        queue_capacity: usize,
        max_in_flight: usize,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<Job>(queue_capacity.max(1));
        let worker = tokio::spawn(run_worker(gateway, rx, max_in_flight.max(1)));
        Self {
            tx: std::sync::Mutex::new(Some(tx)),
            worker: tokio::sync::Mutex::new(Some(worker)),
        }
    }

    /// Enqueue a call. Blocks when the queue is full (backpressure); errors
    /// only after shutdown.
    pub async fn submit(&self, call: ApiCall) -> Result<PendingResponse, DomainError> {
        let tx = self
            .tx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| DomainError::Dispatch("dispatcher is shut down".into()))?;
        let (reply, rx) = oneshot::channel();
        tx.send(Job { call, reply })
            .await
            .map_err(|_| DomainError::Dispatch("dispatcher is shut down".into()))?;
        Ok(PendingResponse { rx })
    }

    /// Close the queue and wait for the worker, and thus every in-flight
    /// request, to finish. Already-submitted handles still resolve.
    /// Idempotent; later `submit` calls fail with a dispatch error.
    pub async fn shutdown(&self) {
        self.tx.lock().unwrap_or_else(|e| e.into_inner()).take();
        let handle = self.worker.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "dispatcher worker panicked during shutdown");
            }
            info!("request dispatcher stopped");
        }
    }
}

async fn run_worker(
    gateway: Arc<dyn ApiGateway>,
    mut rx: mpsc::Receiver<Job>,
    max_in_flight: usize,
) {
    let semaphore = Arc::new(Semaphore::new(max_in_flight));
    let mut tasks = JoinSet::new();

    while let Some(job) = rx.recv().await {
        let sem = Arc::clone(&semaphore);
        let gateway = Arc::clone(&gateway);

        tasks.spawn(async move {
            let _permit = sem.acquire().await.expect("semaphore closed");
            debug!(method = %job.call.method, endpoint = %job.call.endpoint, "running dispatched call");
            let response = execute(&*gateway, &job.call).await;
            // Submitter may have dropped its handle; that's fine.
            let _ = job.reply.send(response);
        });

        // Reap whatever already finished so the set doesn't grow unbounded.
        while tasks.try_join_next().is_some() {}
    }

    // Queue closed: drain in-flight requests before exiting.
    while tasks.join_next().await.is_some() {}
    info!("dispatcher worker finished (queue closed)");
}

async fn execute(gateway: &dyn ApiGateway, call: &ApiCall) -> ApiResponse {
    let empty = serde_json::Value::Null;
    let body = call.body.as_ref().unwrap_or(&empty);
    match call.method {
        Method::Get => gateway.get(&call.endpoint).await,
        Method::Post => gateway.post(&call.endpoint, body).await,
        Method::Put => gateway.put(&call.endpoint, body).await,
        Method::Patch => gateway.patch(&call.endpoint, body).await,
        Method::Delete => gateway.delete(&call.endpoint).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::MockGateway;

    #[tokio::test]
    async fn test_submit_and_join() {
        let gw = Arc::new(MockGateway::new());
        gw.enqueue_ok(serde_json::json!({"data": []}));
        let dispatcher = RequestDispatcher::spawn(gw, 8, 2);

        let pending = dispatcher.submit(ApiCall::get("/Curriculum")).await.unwrap();
        let response = pending.join().await.unwrap();
        assert!(response.success);

        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_serial_dispatch_preserves_script_order() {
        let gw = Arc::new(MockGateway::new());
        gw.enqueue_status(200);
        gw.enqueue_status(404);
        // Single in-flight slot: calls run in submission order.
        let dispatcher = RequestDispatcher::spawn(Arc::clone(&gw) as _, 8, 1);

        let first = dispatcher.submit(ApiCall::get("/Student/1")).await.unwrap();
        let second = dispatcher.submit(ApiCall::get("/Student/2")).await.unwrap();
        assert_eq!(first.join().await.unwrap().status_code, 200);
        assert_eq!(second.join().await.unwrap().status_code, 404);

        dispatcher.shutdown().await;
        assert_eq!(gw.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_resolves_submitted_handles() {
        let gw = Arc::new(MockGateway::new());
        gw.enqueue_status(204);
        let dispatcher = RequestDispatcher::spawn(gw, 8, 2);

        let pending = dispatcher.submit(ApiCall::delete("/ActivityLog/5")).await.unwrap();
        dispatcher.shutdown().await;
        // Handle submitted before shutdown still joins to its result.
        assert_eq!(pending.join().await.unwrap().status_code, 204);

        // Submissions after shutdown are rejected.
        let err = dispatcher.submit(ApiCall::get("/Student")).await.unwrap_err();
        assert!(matches!(err, DomainError::Dispatch(_)));
    }

    #[tokio::test]
    async fn test_dropped_handle_does_not_poison_worker() {
        let gw = Arc::new(MockGateway::new());
        gw.enqueue_status(200);
        gw.enqueue_status(200);
        let dispatcher = RequestDispatcher::spawn(Arc::clone(&gw) as _, 8, 2);

        let abandoned = dispatcher.submit(ApiCall::get("/Instructor")).await.unwrap();
        drop(abandoned);
        let kept = dispatcher.submit(ApiCall::get("/Instructor")).await.unwrap();
        assert!(kept.join().await.unwrap().success);

        dispatcher.shutdown().await;
        assert_eq!(gw.calls().len(), 2);
    }
}
