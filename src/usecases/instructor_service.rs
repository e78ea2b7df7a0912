//! Instructor portal operations: roster, session scheduling and validation,
//! post-session feedback.

use crate::domain::{
    DomainError, Instructor, NewSessionFeedback, NewTrainingSession, SessionFeedback,
    SessionStatus, TrainingSession,
};
use crate::ports::ApiGateway;
use crate::shared::jsonapi;
use std::sync::Arc;
use tracing::{debug, info};

pub struct InstructorService {
    gateway: Arc<dyn ApiGateway>,
}

impl InstructorService {
    pub fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Instructor>, DomainError> {
        let response = self.gateway.get("/Instructor").await.into_result()?;
        let instructors = jsonapi::unwrap_list(&response.body)?;
        debug!(count = instructors.len(), "loaded instructors");
        Ok(instructors)
    }

    pub async fn get(&self, id: &str) -> Result<Instructor, DomainError> {
        let response = self
            .gateway
            .get(&format!("/Instructor/{id}"))
            .await
            .into_result()?;
        jsonapi::unwrap_one(&response.body)
    }

    /// Propose a new session. It starts in `Proposed` until the instructor
    /// confirms or cancels it.
    pub async fn schedule_session(
        &self,
        new: NewTrainingSession,
    ) -> Result<TrainingSession, DomainError> {
        if new.instructor_id.trim().is_empty() || new.curriculum_id.trim().is_empty() {
            return Err(DomainError::Validation(
                "Instructor and curriculum are required".into(),
            ));
        }

        let payload = jsonapi::wrap_new("TrainingSession", &new)?;
        let response = self
            .gateway
            .post("/TrainingSession", &payload)
            .await
            .into_result()?;
        let session: TrainingSession = jsonapi::unwrap_one(&response.body)?;
        info!(session_id = %session.id, instructor_id = %session.instructor_id, "session scheduled");
        Ok(session)
    }

    pub async fn sessions_for_instructor(
        &self,
        instructor_id: &str,
    ) -> Result<Vec<TrainingSession>, DomainError> {
        let response = self
            .gateway
            .get(&format!(
                "/TrainingSession?filter[instructor_id]={instructor_id}"
            ))
            .await
            .into_result()?;
        jsonapi::unwrap_list(&response.body)
    }

    pub async fn confirm_session(&self, id: &str) -> Result<TrainingSession, DomainError> {
        self.set_session_status(id, SessionStatus::Confirmed).await
    }

    pub async fn cancel_session(&self, id: &str) -> Result<TrainingSession, DomainError> {
        self.set_session_status(id, SessionStatus::Cancelled).await
    }

    async fn set_session_status(
        &self,
        id: &str,
        status: SessionStatus,
    ) -> Result<TrainingSession, DomainError> {
        let payload = jsonapi::wrap_update(
            "TrainingSession",
            id,
            &serde_json::json!({ "status": status }),
        )?;
        let response = self
            .gateway
            .patch(&format!("/TrainingSession/{id}"), &payload)
            .await
            .into_result()?;
        let session: TrainingSession = jsonapi::unwrap_one(&response.body)?;
        info!(session_id = %id, status = ?status, "session status updated");
        Ok(session)
    }

    pub async fn submit_feedback(
        &self,
        new: NewSessionFeedback,
    ) -> Result<SessionFeedback, DomainError> {
        if !(1..=5).contains(&new.rating) {
            return Err(DomainError::Validation(
                "Rating must be between 1 and 5".into(),
            ));
        }
        if new.session_id.trim().is_empty() {
            return Err(DomainError::Validation("Session is required".into()));
        }

        let payload = jsonapi::wrap_new("SessionFeedback", &new)?;
        let response = self
            .gateway
            .post("/SessionFeedback", &payload)
            .await
            .into_result()?;
        let feedback: SessionFeedback = jsonapi::unwrap_one(&response.body)?;
        info!(session_id = %feedback.session_id, rating = feedback.rating, "feedback recorded");
        Ok(feedback)
    }
}
