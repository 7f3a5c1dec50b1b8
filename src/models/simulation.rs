// src/models/simulation.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use url::Url;
use validator::Validate;

use crate::models::task::TaskInput;

/// Represents the 'simulations' table in the database (and the records of
/// the JSON fallback store).
///
/// The four rich-text columns hold sanitized HTML; the plain-text character
/// gate runs before anything is written here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Simulation {
    pub id: i64,

    pub title: String,

    /// Category label (e.g., "Software Engineering").
    pub category: String,

    pub difficulty: String,

    /// Human-readable duration (e.g., "4 weeks").
    pub duration: String,

    /// URL of the cover image, possibly empty.
    pub image: String,

    /// Aggregate rating; always null for new simulations.
    pub rating: Option<f64>,

    pub description: String,
    pub overview: String,
    pub features: String,
    pub skills: String,
}

/// DTO for creating a new simulation. Presence of required fields is checked
/// procedurally in the handler so each missing field produces its own
/// field-qualified error; the derive covers scalar caps only.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSimulationRequest {
    #[validate(length(max = 200, message = "Title must not exceed 200 characters."))]
    pub title: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(length(max = 50))]
    pub difficulty: Option<String>,
    #[validate(length(max = 100))]
    pub duration: Option<String>,
    #[validate(length(max = 500), custom(function = validate_optional_url))]
    pub image: Option<String>,

    pub description: Option<String>,
    pub overview: Option<String>,
    pub features: Option<String>,
    pub skills: Option<String>,

    pub tasks: Option<Vec<TaskInput>>,
}

/// DTO for updating a simulation. All fields optional; empty values are
/// treated as absent.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSimulationRequest {
    #[validate(length(max = 200, message = "Title must not exceed 200 characters."))]
    pub title: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(length(max = 50))]
    pub difficulty: Option<String>,
    #[validate(length(max = 100))]
    pub duration: Option<String>,
    #[validate(length(max = 500), custom(function = validate_optional_url))]
    pub image: Option<String>,

    pub description: Option<String>,
    pub overview: Option<String>,
    pub features: Option<String>,
    pub skills: Option<String>,
}

/// Validated, sanitized payload handed to the store for insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSimulation {
    pub title: String,
    pub category: String,
    pub difficulty: String,
    pub duration: String,
    pub image: String,
    pub rating: Option<f64>,
    pub description: String,
    pub overview: String,
    pub features: String,
    pub skills: String,
}

/// Partial update applied by the store. Rich-text fields arrive already
/// sanitized.
#[derive(Debug, Clone, Default)]
pub struct SimulationChanges {
    pub title: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub duration: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub overview: Option<String>,
    pub features: Option<String>,
    pub skills: Option<String>,
}

impl SimulationChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.category.is_none()
            && self.difficulty.is_none()
            && self.duration.is_none()
            && self.image.is_none()
            && self.description.is_none()
            && self.overview.is_none()
            && self.features.is_none()
            && self.skills.is_none()
    }
}

/// Validates that a string is a correctly formatted URL. Empty values are
/// allowed; the field is optional.
pub(crate) fn validate_optional_url(url: &str) -> Result<(), validator::ValidationError> {
    if url.is_empty() {
        return Ok(());
    }
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}
