// src/models/task.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::models::simulation::validate_optional_url;

/// Represents the 'tasks' table in the database.
///
/// `description`, `what_youll_learn` and `what_youll_do` hold sanitized HTML.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub simulation_id: i64,

    /// 1-based position within the simulation.
    pub sequence: i32,

    /// Short label ("Task 1", "Task 2", ...), derived from the sequence.
    pub title: String,

    pub full_title: String,
    pub duration: String,
    pub difficulty: String,
    pub material_url: String,
    pub description: String,
    pub what_youll_learn: String,
    pub what_youll_do: String,
}

/// DTO for one task in a simulation creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskInput {
    pub title: Option<String>,
    pub full_title: Option<String>,
    pub duration: Option<String>,
    pub difficulty: Option<String>,
    pub description: Option<String>,
    pub what_youll_learn: Option<String>,
    pub what_youll_do: Option<String>,
    #[validate(length(max = 500), custom(function = validate_optional_url))]
    pub material_url: Option<String>,
}

/// Validated, sanitized task payload handed to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub sequence: i32,
    pub title: String,
    pub full_title: String,
    pub duration: String,
    pub difficulty: String,
    pub material_url: String,
    pub description: String,
    pub what_youll_learn: String,
    pub what_youll_do: String,
}
