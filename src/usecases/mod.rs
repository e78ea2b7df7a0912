//! Application use cases. Orchestrate domain logic via ports.

pub mod activity_log_service;
pub mod admin_auth;
pub mod auth_service;
pub mod curriculum_service;
pub mod dispatcher;
pub mod form_submission_service;
pub mod instructor_service;

pub use activity_log_service::ActivityLogService;
pub use admin_auth::AdminAuthManager;
pub use auth_service::AuthService;
pub use curriculum_service::CurriculumService;
pub use dispatcher::{ApiCall, PendingResponse, RequestDispatcher};
pub use form_submission_service::FormSubmissionService;
pub use instructor_service::InstructorService;
