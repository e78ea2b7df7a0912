//! Domain entities. Pure data structures for the core business.
//!
//! No HTTP/wire types here — these are mapped from adapters. Every struct
//! deserializes with container-level defaults so records with missing
//! attributes still load instead of failing the whole response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A student going through the intake portal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Student {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Curriculum chosen during intake, if any.
    pub curriculum_id: Option<String>,
    pub status: EnrollmentStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Enrolled,
    Withdrawn,
    /// Initial state; also the fallback for values this client predates.
    #[default]
    #[serde(other)]
    Applied,
}

/// Payload for registering a new student. No id; the backend assigns one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curriculum_id: Option<String>,
}

/// Back-office account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub role: AdminRole,
    /// Program names this admin may manage. Ignored for superadmins.
    pub assigned_programs: Vec<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    SuperAdmin,
    ProgramAdmin,
    /// Least privilege; unknown roles land here rather than failing.
    #[default]
    #[serde(other)]
    Viewer,
}

/// A course of study students can enroll in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Curriculum {
    pub id: String,
    pub name: String,
    pub description: String,
    pub duration_weeks: u32,
    /// Form types a student must submit before enrollment completes.
    pub required_forms: Vec<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Instructor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub specialties: Vec<String>,
    pub accepting_students: bool,
}

/// A scheduled meeting between an instructor and a student for a curriculum.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSession {
    pub id: String,
    pub curriculum_id: String,
    pub instructor_id: String,
    pub student_id: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub location: String,
    pub status: SessionStatus,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Confirmed,
    Completed,
    Cancelled,
    #[default]
    #[serde(other)]
    Proposed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTrainingSession {
    pub curriculum_id: String,
    pub instructor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
    pub location: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

/// One intake form a student filled in. `fields` is the form's key/value body;
/// the set of expected keys comes from the curriculum's `required_forms`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSubmission {
    pub id: String,
    pub student_id: String,
    pub form_type: String,
    pub fields: BTreeMap<String, String>,
    pub status: SubmissionStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Approved,
    Rejected,
    #[default]
    #[serde(other)]
    Pending,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFormSubmission {
    pub student_id: String,
    pub form_type: String,
    pub fields: BTreeMap<String, String>,
}

/// Instructor feedback after a completed session. Rating is 1..=5.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionFeedback {
    pub id: String,
    pub session_id: String,
    pub instructor_id: String,
    pub rating: u8,
    pub comments: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSessionFeedback {
    pub session_id: String,
    pub instructor_id: String,
    pub rating: u8,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comments: String,
}

/// Audit trail entry. Written by the back office for every state change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityLog {
    pub id: String,
    pub actor: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub detail: String,
    pub logged_at: Option<DateTime<Utc>>,
}

/// Result of a successful login: the bearer token plus who logged in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSession {
    pub token: String,
    pub student: Student,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_attributes_fall_back_to_defaults() {
        let student: Student = serde_json::from_str(r#"{"email": "a@b.c"}"#).unwrap();
        assert_eq!(student.email, "a@b.c");
        assert_eq!(student.first_name, "");
        assert_eq!(student.status, EnrollmentStatus::Applied);
        assert!(student.curriculum_id.is_none());
    }

    #[test]
    fn test_unknown_status_falls_back_to_default_variant() {
        let sub: FormSubmission =
            serde_json::from_str(r#"{"id": "7", "status": "archived"}"#).unwrap();
        assert_eq!(sub.status, SubmissionStatus::Pending);

        let session: TrainingSession =
            serde_json::from_str(r#"{"id": "3", "status": "tentative"}"#).unwrap();
        assert_eq!(session.status, SessionStatus::Proposed);
    }

    #[test]
    fn test_statuses_serialize_lowercase() {
        let json = serde_json::to_string(&SubmissionStatus::Approved).unwrap();
        assert_eq!(json, r#""approved""#);
        let json = serde_json::to_string(&SessionStatus::Confirmed).unwrap();
        assert_eq!(json, r#""confirmed""#);
    }

    #[test]
    fn test_full_name_trims_when_partial() {
        let student = Student {
            first_name: "Ada".into(),
            ..Default::default()
        };
        assert_eq!(student.full_name(), "Ada");
    }
}
