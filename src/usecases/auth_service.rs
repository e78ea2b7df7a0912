//! Student login / registration flow. Delegates transport to the gateway.

use crate::domain::{AuthSession, DomainError, NewStudent, Student};
use crate::ports::ApiGateway;
use crate::shared::jsonapi;
use std::sync::Arc;
use tracing::info;

pub struct AuthService {
    gateway: Arc<dyn ApiGateway>,
}

impl AuthService {
    pub fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        Self { gateway }
    }

    /// Unified student login. On success the bearer token is installed on the
    /// gateway so every subsequent call is authenticated.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, DomainError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(DomainError::Validation(
                "Email and password are required".into(),
            ));
        }

        let body = serde_json::json!({ "email": email.trim(), "password": password });
        let response = self.gateway.post("/auth/login", &body).await.into_result()?;

        // Auth endpoints answer plain JSON, not the JSON:API envelope.
        let session: AuthSession = response
            .json()
            .map_err(|e| DomainError::Parse(e.to_string()))?;
        if session.token.is_empty() {
            return Err(DomainError::Auth("login response carried no token".into()));
        }

        self.gateway.set_auth_token(&session.token);
        info!(student_id = %session.student.id, "student logged in");
        Ok(session)
    }

    /// Register a new student record during intake.
    pub async fn register_student(&self, new: NewStudent) -> Result<Student, DomainError> {
        if new.email.trim().is_empty() {
            return Err(DomainError::Validation("Email is required".into()));
        }
        if new.first_name.trim().is_empty() && new.last_name.trim().is_empty() {
            return Err(DomainError::Validation("Name is required".into()));
        }

        let payload = jsonapi::wrap_new("Student", &new)?;
        let response = self.gateway.post("/Student", &payload).await.into_result()?;
        let student: Student = jsonapi::unwrap_one(&response.body)?;
        info!(student_id = %student.id, "student registered");
        Ok(student)
    }

    pub fn logout(&self) {
        self.gateway.set_auth_token("");
        info!("student logged out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::MockGateway;
    use crate::ports::Method;

    #[tokio::test]
    async fn test_login_requires_email_and_password() {
        let gw = Arc::new(MockGateway::new());
        let service = AuthService::new(Arc::clone(&gw) as _);

        let err = service.login("", "secret").await.unwrap_err();
        assert_eq!(err.to_string(), "Email and password are required");
        let err = service.login("a@b.c", "").await.unwrap_err();
        assert_eq!(err.to_string(), "Email and password are required");
        // Nothing hit the wire.
        assert!(gw.calls().is_empty());
    }

    #[tokio::test]
    async fn test_login_installs_bearer_token() {
        let gw = Arc::new(MockGateway::new());
        gw.enqueue_ok(serde_json::json!({
            "token": "student_token_12",
            "student": { "id": "12", "email": "ada@example.org" }
        }));
        let service = AuthService::new(Arc::clone(&gw) as _);

        let session = service.login("ada@example.org", "pw").await.unwrap();
        assert_eq!(session.student.id, "12");
        assert_eq!(gw.auth_token().as_deref(), Some("student_token_12"));

        let calls = gw.calls();
        assert_eq!(calls[0].method, Method::Post);
        assert_eq!(calls[0].endpoint, "/auth/login");
    }

    #[tokio::test]
    async fn test_login_failure_propagates_no_fallback() {
        let gw = Arc::new(MockGateway::new());
        gw.enqueue_status(401);
        let service = AuthService::new(Arc::clone(&gw) as _);

        let err = service.login("ada@example.org", "wrong").await.unwrap_err();
        assert!(matches!(err, DomainError::Api { status: 401, .. }));
        assert!(gw.auth_token().is_none());
    }

    #[tokio::test]
    async fn test_register_student_wraps_jsonapi() {
        let gw = Arc::new(MockGateway::new());
        gw.enqueue_ok(serde_json::json!({
            "data": { "type": "Student", "id": 31,
                      "attributes": { "email": "ada@example.org", "first_name": "Ada" } }
        }));
        let service = AuthService::new(Arc::clone(&gw) as _);

        let student = service
            .register_student(NewStudent {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: "ada@example.org".into(),
                phone: None,
                curriculum_id: None,
            })
            .await
            .unwrap();
        assert_eq!(student.id, "31");

        let calls = gw.calls();
        assert_eq!(calls[0].endpoint, "/Student");
        let body = calls[0].body.as_ref().unwrap();
        assert_eq!(body["data"]["type"], "Student");
        assert_eq!(body["data"]["attributes"]["email"], "ada@example.org");
    }

    #[tokio::test]
    async fn test_logout_clears_token() {
        let gw = Arc::new(MockGateway::new());
        gw.set_auth_token("t");
        let service = AuthService::new(Arc::clone(&gw) as _);
        service.logout();
        assert!(gw.auth_token().is_none());
    }
}
