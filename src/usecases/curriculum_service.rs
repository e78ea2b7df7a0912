//! Curriculum catalog access for the intake flow.

use crate::domain::{Curriculum, DomainError};
use crate::ports::ApiGateway;
use crate::shared::jsonapi;
use std::sync::Arc;
use tracing::debug;

pub struct CurriculumService {
    gateway: Arc<dyn ApiGateway>,
}

impl CurriculumService {
    pub fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        Self { gateway }
    }

    /// All curriculums, active or not. Callers filter for presentation.
    pub async fn list(&self) -> Result<Vec<Curriculum>, DomainError> {
        let response = self.gateway.get("/Curriculum").await.into_result()?;
        let curriculums = jsonapi::unwrap_list(&response.body)?;
        debug!(count = curriculums.len(), "loaded curriculums");
        Ok(curriculums)
    }

    pub async fn get(&self, id: &str) -> Result<Curriculum, DomainError> {
        let response = self
            .gateway
            .get(&format!("/Curriculum/{id}"))
            .await
            .into_result()?;
        jsonapi::unwrap_one(&response.body)
    }

    /// Form types a student must submit for the given curriculum.
    pub async fn required_forms(&self, id: &str) -> Result<Vec<String>, DomainError> {
        Ok(self.get(id).await?.required_forms)
    }
}
