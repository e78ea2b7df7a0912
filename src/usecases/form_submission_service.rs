//! Intake form submissions: submit, list, review, attach files.

use crate::domain::{DomainError, FormSubmission, NewFormSubmission, SubmissionStatus};
use crate::ports::ApiGateway;
use crate::shared::jsonapi;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub struct FormSubmissionService {
    gateway: Arc<dyn ApiGateway>,
}

impl FormSubmissionService {
    pub fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn submit(&self, new: NewFormSubmission) -> Result<FormSubmission, DomainError> {
        if new.student_id.trim().is_empty() || new.form_type.trim().is_empty() {
            return Err(DomainError::Validation(
                "Student and form type are required".into(),
            ));
        }

        let payload = jsonapi::wrap_new("FormSubmission", &new)?;
        let response = self
            .gateway
            .post("/FormSubmission", &payload)
            .await
            .into_result()?;
        let submission: FormSubmission = jsonapi::unwrap_one(&response.body)?;
        info!(
            submission_id = %submission.id,
            form_type = %submission.form_type,
            "form submitted"
        );
        Ok(submission)
    }

    pub async fn list(&self) -> Result<Vec<FormSubmission>, DomainError> {
        let response = self.gateway.get("/FormSubmission").await.into_result()?;
        let submissions = jsonapi::unwrap_list(&response.body)?;
        debug!(count = submissions.len(), "loaded submissions");
        Ok(submissions)
    }

    pub async fn list_for_student(&self, student_id: &str) -> Result<Vec<FormSubmission>, DomainError> {
        let response = self
            .gateway
            .get(&format!("/FormSubmission?filter[student_id]={student_id}"))
            .await
            .into_result()?;
        jsonapi::unwrap_list(&response.body)
    }

    pub async fn get(&self, id: &str) -> Result<FormSubmission, DomainError> {
        let response = self
            .gateway
            .get(&format!("/FormSubmission/{id}"))
            .await
            .into_result()?;
        jsonapi::unwrap_one(&response.body)
    }

    /// Review decision. `reviewed_by` is the admin recorded on the submission.
    pub async fn update_status(
        &self,
        id: &str,
        status: SubmissionStatus,
        reviewed_by: &str,
    ) -> Result<FormSubmission, DomainError> {
        let payload = jsonapi::wrap_update(
            "FormSubmission",
            id,
            &serde_json::json!({
                "status": status,
                "reviewed_by": reviewed_by,
            }),
        )?;
        let response = self
            .gateway
            .patch(&format!("/FormSubmission/{id}"), &payload)
            .await
            .into_result()?;
        let submission: FormSubmission = jsonapi::unwrap_one(&response.body)?;
        info!(submission_id = %id, status = status.as_str(), "submission reviewed");
        Ok(submission)
    }

    /// Attach a document (multipart upload, separate path from the JSON calls).
    pub async fn upload_attachment(
        &self,
        submission_id: &str,
        file_path: &Path,
    ) -> Result<(), DomainError> {
        let fields = BTreeMap::from([("submission_id".to_string(), submission_id.to_string())]);
        self.gateway
            .upload_file(
                &format!("/FormSubmission/{submission_id}/attachments"),
                "file",
                file_path,
                &fields,
            )
            .await
            .into_result()?;
        info!(submission_id = %submission_id, file = %file_path.display(), "attachment uploaded");
        Ok(())
    }
}
