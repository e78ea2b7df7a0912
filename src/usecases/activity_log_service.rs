//! Audit trail. Records back-office actions and reads recent history.

use crate::domain::{ActivityLog, DomainError};
use crate::ports::ApiGateway;
use crate::shared::jsonapi;
use crate::usecases::dispatcher::{ApiCall, PendingResponse, RequestDispatcher};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ActivityLogService {
    gateway: Arc<dyn ApiGateway>,
}

impl ActivityLogService {
    pub fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        Self { gateway }
    }

    fn entry_payload(
        actor: &str,
        action: &str,
        entity_type: &str,
        entity_id: &str,
        detail: &str,
    ) -> Result<serde_json::Value, DomainError> {
        let entry = serde_json::json!({
            "actor": actor,
            "action": action,
            "entity_type": entity_type,
            "entity_id": entity_id,
            "detail": detail,
            "logged_at": Utc::now(),
        });
        jsonapi::wrap_new("ActivityLog", &entry)
    }

    /// Record one audit entry. Failures are surfaced to the caller — whether a
    /// failed audit write aborts the surrounding operation is the caller's
    /// decision, not this service's.
    pub async fn record(
        &self,
        actor: &str,
        action: &str,
        entity_type: &str,
        entity_id: &str,
        detail: &str,
    ) -> Result<(), DomainError> {
        let payload = Self::entry_payload(actor, action, entity_type, entity_id, detail)?;
        let result = self
            .gateway
            .post("/ActivityLog", &payload)
            .await
            .into_result();
        match result {
            Ok(_) => {
                debug!(actor, action, entity_type, entity_id, "activity recorded");
                Ok(())
            }
            Err(e) => {
                warn!(actor, action, error = %e, "failed to record activity");
                Err(e)
            }
        }
    }

    /// Queue an audit entry on the dispatcher instead of blocking the caller.
    /// The returned handle can be joined or dropped; either way the write
    /// completes (or is logged as failed) inside the worker.
    pub async fn record_deferred(
        &self,
        dispatcher: &RequestDispatcher,
        actor: &str,
        action: &str,
        entity_type: &str,
        entity_id: &str,
        detail: &str,
    ) -> Result<PendingResponse, DomainError> {
        let payload = Self::entry_payload(actor, action, entity_type, entity_id, detail)?;
        debug!(actor, action, entity_type, entity_id, "activity queued");
        dispatcher.submit(ApiCall::post("/ActivityLog", payload)).await
    }

    /// Most recent entries, newest first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<ActivityLog>, DomainError> {
        let response = self
            .gateway
            .get(&format!("/ActivityLog?page[limit]={limit}&sort=-logged_at"))
            .await
            .into_result()?;
        jsonapi::unwrap_list(&response.body)
    }

    /// History for one entity (e.g. every action taken on a submission).
    pub async fn for_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Vec<ActivityLog>, DomainError> {
        let response = self
            .gateway
            .get(&format!(
                "/ActivityLog?filter[entity_type]={entity_type}&filter[entity_id]={entity_id}"
            ))
            .await
            .into_result()?;
        jsonapi::unwrap_list(&response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::MockGateway;
    use crate::ports::Method;

    #[tokio::test]
    async fn test_record_posts_envelope_with_timestamp() {
        let gw = Arc::new(MockGateway::new());
        gw.enqueue_status(201);
        let service = ActivityLogService::new(Arc::clone(&gw) as _);

        service
            .record("kim", "approve", "FormSubmission", "44", "approved intake form")
            .await
            .unwrap();

        let call = &gw.calls()[0];
        assert_eq!(call.method, Method::Post);
        assert_eq!(call.endpoint, "/ActivityLog");
        let attrs = &call.body.as_ref().unwrap()["data"]["attributes"];
        assert_eq!(attrs["actor"], "kim");
        assert_eq!(attrs["action"], "approve");
        assert_eq!(attrs["entity_id"], "44");
        assert!(attrs["logged_at"].is_string());
    }

    #[tokio::test]
    async fn test_record_failure_is_reported() {
        let gw = Arc::new(MockGateway::new());
        gw.enqueue_status(503);
        let service = ActivityLogService::new(Arc::clone(&gw) as _);
        let err = service
            .record("kim", "approve", "FormSubmission", "44", "")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_record_deferred_goes_through_dispatcher() {
        let gw = Arc::new(MockGateway::new());
        gw.enqueue_status(201);
        let service = ActivityLogService::new(Arc::clone(&gw) as _);
        let dispatcher = RequestDispatcher::spawn(Arc::clone(&gw) as _, 8, 2);

        let pending = service
            .record_deferred(&dispatcher, "kim", "approve", "FormSubmission", "44", "")
            .await
            .unwrap();
        assert!(pending.join().await.unwrap().success);
        dispatcher.shutdown().await;

        let call = &gw.calls()[0];
        assert_eq!(call.endpoint, "/ActivityLog");
        assert_eq!(call.body.as_ref().unwrap()["data"]["attributes"]["actor"], "kim");
    }

    #[tokio::test]
    async fn test_recent_passes_limit_and_sort() {
        let gw = Arc::new(MockGateway::new());
        gw.enqueue_ok(serde_json::json!({ "data": [
            { "type": "ActivityLog", "id": "2", "attributes": { "action": "approve" } },
            { "type": "ActivityLog", "id": "1", "attributes": { "action": "submit" } }
        ]}));
        let service = ActivityLogService::new(Arc::clone(&gw) as _);

        let entries = service.recent(20).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "approve");
        assert_eq!(
            gw.calls()[0].endpoint,
            "/ActivityLog?page[limit]=20&sort=-logged_at"
        );
    }
}
