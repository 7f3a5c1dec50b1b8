// src/models/enrollment.rs

use serde::{Deserialize, Deserializer, Serialize};

/// One user's enrollment in an internship simulation.
/// Stored in `enrollments.json`; the internship id is kept as a string so
/// records survive either store backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub internship_id: String,
    pub internship_name: Option<String>,
    pub enrolled_at: String,
    #[serde(default)]
    pub tasks: Vec<EnrollmentTask>,
}

/// A task copied into the enrollment at enroll time, with a local
/// completion flag used when the primary store has no progress rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentTask {
    pub task_id: String,
    pub title: String,
    pub order: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

/// DTO for `POST /enroll`.
#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    /// Clients send this either as a number or a string.
    #[serde(default, deserialize_with = "string_or_number")]
    pub internship_id: Option<String>,
    pub internship_name: Option<String>,
}

/// Query parameters for `GET /enrollment-status`.
#[derive(Debug, Deserialize)]
pub struct EnrollmentStatusParams {
    pub user_id: Option<String>,
    pub internship_id: Option<String>,
}

/// Enrollment plus task-progress aggregates for the candidates listing.
#[derive(Debug, Serialize)]
pub struct CandidateResponse {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub progress: i64,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
