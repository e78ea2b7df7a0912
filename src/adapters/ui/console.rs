//! Implements ConsolePort. Inquire-based interactive prompts.
//!
//! The three web portals of the original system collapse into one operator
//! console: student intake, admin review, instructor scheduling. All data
//! access goes through the services; backend failures are shown, never
//! papered over with sample data.

use crate::domain::{
    Curriculum, DomainError, NewFormSubmission, NewSessionFeedback, NewStudent,
    NewTrainingSession, SubmissionStatus,
};
use crate::ports::{ApiGateway, ConsolePort};
use crate::usecases::{
    ActivityLogService, AdminAuthManager, AuthService, CurriculumService, FormSubmissionService,
    InstructorService, RequestDispatcher,
};
use async_trait::async_trait;
use indicatif::ProgressBar;
use inquire::{Password, Select, Text};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub struct ConsoleAdapter {
    gateway: Arc<dyn ApiGateway>,
    auth: Arc<AuthService>,
    admin_auth: Arc<AdminAuthManager>,
    curriculums: Arc<CurriculumService>,
    submissions: Arc<FormSubmissionService>,
    activity: Arc<ActivityLogService>,
    instructors: Arc<InstructorService>,
    dispatcher: Arc<RequestDispatcher>,
}

impl ConsoleAdapter {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        gateway: Arc<dyn ApiGateway>,
        auth: Arc<AuthService>,
        admin_auth: Arc<AdminAuthManager>,
        curriculums: Arc<CurriculumService>,
        submissions: Arc<FormSubmissionService>,
        activity: Arc<ActivityLogService>,
        instructors: Arc<InstructorService>,
        dispatcher: Arc<RequestDispatcher>,
    ) -> Self {
        Self {
            gateway,
            auth,
            admin_auth,
            curriculums,
            submissions,
            activity,
            instructors,
            dispatcher,
        }
    }

    async fn check_health(&self) {
        let spinner = spinner("Checking backend availability");
        let available = self.gateway.is_server_available().await;
        spinner.finish_and_clear();
        if available {
            println!("Backend is reachable.");
        } else {
            println!("Backend is NOT reachable. Operations will fail until it is up.");
        }
    }

    async fn pick_curriculum(&self) -> Result<Curriculum, DomainError> {
        let spinner = spinner("Loading curriculums");
        let result = self.curriculums.list().await;
        spinner.finish_and_clear();
        let all = result?;
        let active: Vec<Curriculum> = all.into_iter().filter(|c| c.active).collect();
        if active.is_empty() {
            return Err(DomainError::Validation("No active curriculums".into()));
        }
        let options: Vec<String> = active
            .iter()
            .map(|c| format!("{} ({} weeks)", c.name, c.duration_weeks))
            .collect();
        let selected = Select::new("Curriculum:", options.clone())
            .prompt()
            .map_err(prompt_err)?;
        let index = options.iter().position(|o| *o == selected).unwrap_or(0);
        Ok(active[index].clone())
    }

    async fn run_student_intake(&self) -> Result<(), DomainError> {
        let mode = Select::new(
            "Student:",
            vec![
                "New registration".to_string(),
                "Returning student login".to_string(),
            ],
        )
        .prompt()
        .map_err(prompt_err)?;
        if mode == "Returning student login" {
            return self.run_student_login().await;
        }

        let first_name = Text::new("First name:").prompt().map_err(prompt_err)?;
        let last_name = Text::new("Last name:").prompt().map_err(prompt_err)?;
        let email = Text::new("Email:").prompt().map_err(prompt_err)?;
        let phone = Text::new("Phone (optional):").prompt().map_err(prompt_err)?;

        let curriculum = self.pick_curriculum().await?;

        let student = self
            .auth
            .register_student(NewStudent {
                first_name,
                last_name,
                email,
                phone: Some(phone).filter(|p| !p.trim().is_empty()),
                curriculum_id: Some(curriculum.id.clone()),
            })
            .await?;
        println!("Registered {} (id {}).", student.full_name(), student.id);

        for form_type in &curriculum.required_forms {
            println!("Required form: {form_type}");
            let notes = Text::new("Form notes:").prompt().map_err(prompt_err)?;
            let submission = self
                .submissions
                .submit(NewFormSubmission {
                    student_id: student.id.clone(),
                    form_type: form_type.clone(),
                    fields: BTreeMap::from([("notes".to_string(), notes)]),
                })
                .await?;
            println!("  submitted ({}).", submission.id);

            let attachment = Text::new("Attachment path (optional):")
                .prompt()
                .map_err(prompt_err)?;
            if !attachment.trim().is_empty() {
                self.submissions
                    .upload_attachment(&submission.id, std::path::Path::new(attachment.trim()))
                    .await?;
                println!("  attachment uploaded.");
            }
        }
        Ok(())
    }

    async fn run_student_login(&self) -> Result<(), DomainError> {
        let email = Text::new("Email:").prompt().map_err(prompt_err)?;
        let password = Password::new("Password:")
            .without_confirmation()
            .prompt()
            .map_err(prompt_err)?;
        let session = self.auth.login(&email, &password).await?;
        println!("Welcome back, {}.", session.student.full_name());

        let submissions = self.submissions.list_for_student(&session.student.id).await?;
        if submissions.is_empty() {
            println!("No submissions on file.");
        }
        for s in submissions {
            println!("  {} — {}", s.form_type, s.status.as_str());
        }
        self.auth.logout();
        Ok(())
    }

    async fn run_admin(&self) -> Result<(), DomainError> {
        let username = Text::new("Admin username:").prompt().map_err(prompt_err)?;
        let password = Password::new("Password:")
            .without_confirmation()
            .prompt()
            .map_err(prompt_err)?;
        let admin = self.admin_auth.login(&username, &password).await?;
        println!("Welcome, {}.", admin.username);

        loop {
            let choice = Select::new(
                "Admin:",
                vec![
                    "Review pending submissions".to_string(),
                    "Recent activity".to_string(),
                    "Logout".to_string(),
                ],
            )
            .prompt()
            .map_err(prompt_err)?;

            match choice.as_str() {
                "Review pending submissions" => self.review_submissions(&admin.username).await?,
                "Recent activity" => {
                    let entries = self.activity.recent(20).await?;
                    for entry in entries {
                        println!(
                            "  [{}] {} {} {}/{} {}",
                            entry
                                .logged_at
                                .map(|t| t.to_rfc3339())
                                .unwrap_or_default(),
                            entry.actor,
                            entry.action,
                            entry.entity_type,
                            entry.entity_id,
                            entry.detail
                        );
                    }
                }
                _ => {
                    self.admin_auth.logout().await;
                    return Ok(());
                }
            }
        }
    }

    async fn review_submissions(&self, reviewer: &str) -> Result<(), DomainError> {
        let spinner = spinner("Loading submissions");
        let result = self.submissions.list().await;
        spinner.finish_and_clear();
        let pending: Vec<_> = result?
            .into_iter()
            .filter(|s| s.status == SubmissionStatus::Pending)
            .collect();
        if pending.is_empty() {
            println!("No pending submissions.");
            return Ok(());
        }

        let options: Vec<String> = pending
            .iter()
            .map(|s| format!("{} from student {} ({})", s.form_type, s.student_id, s.id))
            .collect();
        let selected = Select::new("Submission:", options.clone())
            .prompt()
            .map_err(prompt_err)?;
        let index = options.iter().position(|o| *o == selected).unwrap_or(0);
        let submission = &pending[index];

        let decision = Select::new(
            "Decision:",
            vec!["Approve".to_string(), "Reject".to_string(), "Skip".to_string()],
        )
        .prompt()
        .map_err(prompt_err)?;
        let status = match decision.as_str() {
            "Approve" => SubmissionStatus::Approved,
            "Reject" => SubmissionStatus::Rejected,
            _ => return Ok(()),
        };

        self.submissions
            .update_status(&submission.id, status, reviewer)
            .await?;
        // Audit write goes through the dispatcher; the review flow does not
        // wait on it. The handle is dropped, the worker still completes it.
        match self
            .activity
            .record_deferred(
                &self.dispatcher,
                reviewer,
                status.as_str(),
                "FormSubmission",
                &submission.id,
                &submission.form_type,
            )
            .await
        {
            Ok(_pending) => {}
            Err(e) => println!("Warning: review saved but not audited: {e}"),
        }
        println!("Submission {} {}.", submission.id, status.as_str());
        Ok(())
    }

    async fn run_instructor(&self) -> Result<(), DomainError> {
        let spinner = spinner("Loading instructors");
        let result = self.instructors.list().await;
        spinner.finish_and_clear();
        let roster = result?;
        if roster.is_empty() {
            println!("No instructors on file.");
            return Ok(());
        }
        let options: Vec<String> = roster
            .iter()
            .map(|i| format!("{} ({})", i.name, i.id))
            .collect();
        let selected = Select::new("Instructor:", options.clone())
            .prompt()
            .map_err(prompt_err)?;
        let index = options.iter().position(|o| *o == selected).unwrap_or(0);
        let instructor = roster[index].clone();

        loop {
            let choice = Select::new(
                "Instructor:",
                vec![
                    "My sessions".to_string(),
                    "Schedule a session".to_string(),
                    "Submit feedback".to_string(),
                    "Back".to_string(),
                ],
            )
            .prompt()
            .map_err(prompt_err)?;

            match choice.as_str() {
                "My sessions" => {
                    let sessions = self
                        .instructors
                        .sessions_for_instructor(&instructor.id)
                        .await?;
                    if sessions.is_empty() {
                        println!("No sessions.");
                        continue;
                    }
                    let options: Vec<String> = sessions
                        .iter()
                        .map(|s| format!("{} at {} [{:?}] ({})", s.curriculum_id, s.location, s.status, s.id))
                        .collect();
                    let selected = Select::new("Session:", options.clone())
                        .prompt()
                        .map_err(prompt_err)?;
                    let index = options.iter().position(|o| *o == selected).unwrap_or(0);
                    let session = &sessions[index];

                    let action = Select::new(
                        "Action:",
                        vec!["Confirm".to_string(), "Cancel".to_string(), "Back".to_string()],
                    )
                    .prompt()
                    .map_err(prompt_err)?;
                    match action.as_str() {
                        "Confirm" => {
                            self.instructors.confirm_session(&session.id).await?;
                            println!("Session {} confirmed.", session.id);
                        }
                        "Cancel" => {
                            self.instructors.cancel_session(&session.id).await?;
                            println!("Session {} cancelled.", session.id);
                        }
                        _ => {}
                    }
                }
                "Schedule a session" => {
                    let curriculum = self.pick_curriculum().await?;
                    let location = Text::new("Location:").prompt().map_err(prompt_err)?;
                    let session = self
                        .instructors
                        .schedule_session(NewTrainingSession {
                            curriculum_id: curriculum.id,
                            instructor_id: instructor.id.clone(),
                            student_id: None,
                            scheduled_at: None,
                            location,
                            notes: String::new(),
                        })
                        .await?;
                    println!("Session {} proposed.", session.id);
                }
                "Submit feedback" => {
                    let session_id = Text::new("Session id:").prompt().map_err(prompt_err)?;
                    let rating = Select::new(
                        "Rating:",
                        vec!["1", "2", "3", "4", "5"]
                            .into_iter()
                            .map(String::from)
                            .collect(),
                    )
                    .prompt()
                    .map_err(prompt_err)?
                    .parse::<u8>()
                    .unwrap_or(3);
                    let comments = Text::new("Comments:").prompt().map_err(prompt_err)?;
                    self.instructors
                        .submit_feedback(NewSessionFeedback {
                            session_id,
                            instructor_id: instructor.id.clone(),
                            rating,
                            comments,
                        })
                        .await?;
                    println!("Feedback recorded.");
                }
                _ => return Ok(()),
            }
        }
    }
}

#[async_trait]
impl ConsolePort for ConsoleAdapter {
    async fn run(&self) -> Result<(), DomainError> {
        self.check_health().await;

        loop {
            let choice = Select::new(
                "Portal:",
                vec![
                    "Student intake".to_string(),
                    "Admin review".to_string(),
                    "Instructor scheduling".to_string(),
                    "Backend health".to_string(),
                    "Exit".to_string(),
                ],
            )
            .prompt()
            .map_err(prompt_err)?;

            let outcome = match choice.as_str() {
                "Student intake" => self.run_student_intake().await,
                "Admin review" => self.run_admin().await,
                "Instructor scheduling" => self.run_instructor().await,
                "Backend health" => {
                    self.check_health().await;
                    Ok(())
                }
                _ => return Ok(()),
            };

            if let Err(e) = outcome {
                println!("Error: {e}");
            }
        }
    }
}

fn prompt_err(e: inquire::InquireError) -> DomainError {
    DomainError::Validation(e.to_string())
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
