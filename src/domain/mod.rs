//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;

pub use entities::{
    ActivityLog, AdminRole, AdminUser, AuthSession, Curriculum, EnrollmentStatus, FormSubmission,
    Instructor, NewFormSubmission, NewSessionFeedback, NewStudent, NewTrainingSession,
    SessionFeedback, SessionStatus, Student, SubmissionStatus, TrainingSession,
};
pub use errors::DomainError;
