//! Back-office authentication. Tracks the logged-in admin and installs the
//! ad hoc `admin_token_<id>` bearer token the backend expects.

use crate::domain::{AdminRole, AdminUser, DomainError};
use crate::ports::ApiGateway;
use crate::shared::jsonapi;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

pub struct AdminAuthManager {
    gateway: Arc<dyn ApiGateway>,
    current: RwLock<Option<AdminUser>>,
}

impl AdminAuthManager {
    pub fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        Self {
            gateway,
            current: RwLock::new(None),
        }
    }

    /// Admin login. The backend verifies the password and returns the admin
    /// resource; the token itself is the legacy `admin_token_<id>` string.
    pub async fn login(&self, username: &str, password: &str) -> Result<AdminUser, DomainError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(DomainError::Validation(
                "Username and password are required".into(),
            ));
        }

        let body = serde_json::json!({ "username": username.trim(), "password": password });
        let response = self
            .gateway
            .post("/auth/admin_login", &body)
            .await
            .into_result()?;
        let admin: AdminUser = jsonapi::unwrap_one(&response.body)?;

        if !admin.active {
            warn!(admin_id = %admin.id, "login attempt on disabled account");
            return Err(DomainError::Auth("account is disabled".into()));
        }

        let token = format!("admin_token_{}", admin.id);
        self.gateway.set_auth_token(&token);
        info!(admin_id = %admin.id, role = ?admin.role, "admin logged in");

        *self.current.write().await = Some(admin.clone());
        Ok(admin)
    }

    pub async fn current(&self) -> Option<AdminUser> {
        self.current.read().await.clone()
    }

    /// Whether the logged-in admin may manage the given program. Superadmins
    /// manage everything; program admins only their assignments; viewers and
    /// logged-out sessions nothing.
    pub async fn has_program_access(&self, program: &str) -> bool {
        match self.current.read().await.as_ref() {
            Some(admin) => match admin.role {
                AdminRole::SuperAdmin => true,
                AdminRole::ProgramAdmin => {
                    admin.assigned_programs.iter().any(|p| p == program)
                }
                AdminRole::Viewer => false,
            },
            None => false,
        }
    }

    pub async fn logout(&self) {
        self.gateway.set_auth_token("");
        *self.current.write().await = None;
        info!("admin logged out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::MockGateway;

    fn admin_doc(id: &str, role: &str, programs: &[&str], active: bool) -> serde_json::Value {
        serde_json::json!({
            "data": { "type": "AdminUser", "id": id, "attributes": {
                "username": "kim",
                "role": role,
                "assigned_programs": programs,
                "active": active,
            }}
        })
    }

    #[tokio::test]
    async fn test_login_builds_legacy_token() {
        let gw = Arc::new(MockGateway::new());
        gw.enqueue_ok(admin_doc("7", "superadmin", &[], true));
        let manager = AdminAuthManager::new(Arc::clone(&gw) as _);

        let admin = manager.login("kim", "pw").await.unwrap();
        assert_eq!(admin.id, "7");
        assert_eq!(gw.auth_token().as_deref(), Some("admin_token_7"));
        assert!(manager.current().await.is_some());
    }

    #[tokio::test]
    async fn test_login_validation() {
        let gw = Arc::new(MockGateway::new());
        let manager = AdminAuthManager::new(Arc::clone(&gw) as _);
        let err = manager.login(" ", "pw").await.unwrap_err();
        assert_eq!(err.to_string(), "Username and password are required");
        assert!(gw.calls().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_account_rejected() {
        let gw = Arc::new(MockGateway::new());
        gw.enqueue_ok(admin_doc("9", "programadmin", &["Welding"], false));
        let manager = AdminAuthManager::new(Arc::clone(&gw) as _);

        let err = manager.login("kim", "pw").await.unwrap_err();
        assert!(matches!(err, DomainError::Auth(_)));
        assert!(gw.auth_token().is_none());
        assert!(manager.current().await.is_none());
    }

    #[tokio::test]
    async fn test_program_access_by_role() {
        let gw = Arc::new(MockGateway::new());
        gw.enqueue_ok(admin_doc("3", "programadmin", &["Welding", "Plumbing"], true));
        let manager = AdminAuthManager::new(Arc::clone(&gw) as _);

        assert!(!manager.has_program_access("Welding").await); // logged out

        manager.login("kim", "pw").await.unwrap();
        assert!(manager.has_program_access("Welding").await);
        assert!(!manager.has_program_access("Carpentry").await);

        manager.logout().await;
        assert!(!manager.has_program_access("Welding").await);
        assert!(gw.auth_token().is_none());
    }

    #[tokio::test]
    async fn test_viewer_has_no_manage_access() {
        let gw = Arc::new(MockGateway::new());
        gw.enqueue_ok(admin_doc("4", "viewer", &["Welding"], true));
        let manager = AdminAuthManager::new(Arc::clone(&gw) as _);
        manager.login("kim", "pw").await.unwrap();
        assert!(!manager.has_program_access("Welding").await);
    }
}
