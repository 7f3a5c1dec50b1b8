// src/handlers/simulation.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        simulation::{
            CreateSimulationRequest, NewSimulation, Simulation, SimulationChanges,
            UpdateSimulationRequest,
        },
        task::NewTask,
    },
    state::AppState,
    utils::html,
};

/// Plain-text length bounds applied to every rich-text field.
const MIN_PLAIN_CHARS: usize = 5;
const MAX_PLAIN_CHARS: usize = 500;

/// Runs one rich-text field through the sanitize / emptiness / length
/// pipeline. The first failing step rejects the whole request with a
/// field-qualified error; on success the sanitized HTML (not the plain
/// text) is what gets persisted.
fn sanitize_rich_field(label: &str, raw: Option<&str>) -> Result<String, AppError> {
    let raw = raw.unwrap_or("");
    if raw.is_empty() {
        return Err(AppError::BadRequest(format!("{label} is required")));
    }

    let sanitized = html::sanitize(raw);
    if sanitized.trim().is_empty() {
        return Err(AppError::BadRequest(format!(
            "{label} content is empty after sanitization"
        )));
    }

    let validation = html::validate_plain_text_length(&sanitized, MIN_PLAIN_CHARS, MAX_PLAIN_CHARS);
    if !validation.valid {
        return Err(AppError::BadRequest(format!(
            "{label}: {}",
            validation.message
        )));
    }

    Ok(sanitized)
}

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().unwrap_or("").trim().to_string()
}

/// Creates a new internship simulation with rich HTML content.
///
/// Field validation is fail-fast: processing stops at the first invalid
/// field and the response carries that one field-qualified error.
pub async fn create_internship(
    State(state): State<AppState>,
    Json(payload): Json<CreateSimulationRequest>,
) -> Result<impl IntoResponse, AppError> {
    for (name, value) in [
        ("title", &payload.title),
        ("category", &payload.category),
        ("difficulty", &payload.difficulty),
        ("duration", &payload.duration),
        ("description", &payload.description),
        ("overview", &payload.overview),
    ] {
        if value.as_deref().unwrap_or("").is_empty() {
            return Err(AppError::BadRequest(format!(
                "Missing required field: {name}"
            )));
        }
    }

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    // Rich-text fields, in order; the first failure aborts the request.
    let description = sanitize_rich_field("description", payload.description.as_deref())?;
    let overview = sanitize_rich_field("overview", payload.overview.as_deref())?;
    let features = sanitize_rich_field("features", payload.features.as_deref())?;
    let skills = sanitize_rich_field("skills", payload.skills.as_deref())?;

    let sim = NewSimulation {
        title: trimmed(&payload.title),
        category: trimmed(&payload.category),
        difficulty: trimmed(&payload.difficulty),
        duration: trimmed(&payload.duration),
        image: trimmed(&payload.image),
        // Always null for new simulations
        rating: None,
        description,
        overview,
        features,
        skills,
    };

    let mut new_tasks: Vec<NewTask> = Vec::new();
    if let Some(tasks) = &payload.tasks {
        for (idx, task) in tasks.iter().enumerate() {
            let n = idx + 1;

            for (name, value) in [
                ("title", &task.title),
                ("full_title", &task.full_title),
                ("duration", &task.duration),
                ("difficulty", &task.difficulty),
                ("description", &task.description),
                ("what_youll_learn", &task.what_youll_learn),
                ("what_youll_do", &task.what_youll_do),
            ] {
                if value.as_deref().unwrap_or("").is_empty() {
                    return Err(AppError::BadRequest(format!(
                        "Task {n}: Missing required field: {name}"
                    )));
                }
            }

            if let Err(validation_errors) = task.validate() {
                return Err(AppError::BadRequest(format!(
                    "Task {n}: {validation_errors}"
                )));
            }

            let description =
                sanitize_rich_field(&format!("Task {n}: description"), task.description.as_deref())?;
            let what_youll_learn = sanitize_rich_field(
                &format!("Task {n}: what_youll_learn"),
                task.what_youll_learn.as_deref(),
            )?;
            let what_youll_do = sanitize_rich_field(
                &format!("Task {n}: what_youll_do"),
                task.what_youll_do.as_deref(),
            )?;

            new_tasks.push(NewTask {
                sequence: n as i32,
                title: format!("Task {n}"),
                full_title: trimmed(&task.full_title),
                duration: trimmed(&task.duration),
                difficulty: trimmed(&task.difficulty),
                material_url: trimmed(&task.material_url),
                description,
                what_youll_learn,
                what_youll_do,
            });
        }
    }

    tracing::info!("Creating simulation: {}", sim.title);
    let simulation = state.store.insert_simulation(sim).await.map_err(|e| {
        tracing::error!("Failed to create simulation: {}", e);
        e
    })?;
    tracing::info!("Simulation created with ID: {}", simulation.id);

    let task_count = if new_tasks.is_empty() {
        0
    } else {
        match state.store.insert_tasks(simulation.id, new_tasks).await {
            Ok(created) => {
                tracing::info!(
                    "Created {} tasks for simulation {}",
                    created.len(),
                    simulation.id
                );
                created.len()
            }
            Err(e) => {
                // The simulation itself was created; report that success.
                tracing::warn!(
                    "Task insert failed for simulation {}: {}",
                    simulation.id,
                    e
                );
                0
            }
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": simulation.id,
            "message": "Internship created successfully",
            "simulation": simulation,
            "task_count": task_count,
        })),
    ))
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub data: Vec<Simulation>,
    pub count: usize,
    /// Present only when serving from the degraded JSON store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'static str>,
}

/// Fetches all simulations from the active store.
pub async fn list_internships(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let data = state.store.list_simulations().await?;
    tracing::info!(
        "Fetched {} simulations from {}",
        data.len(),
        state.store.backend_name()
    );

    let source = (state.store.backend_name() == "json").then_some("json");

    Ok(Json(ListResponse {
        success: true,
        count: data.len(),
        data,
        source,
    }))
}

/// Updates an existing simulation. Partial updates are supported: only
/// provided, non-empty fields are touched, and rich-text fields go through
/// the same sanitization pipeline as creation.
pub async fn update_internship(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateSimulationRequest>,
) -> Result<Response, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    fn provided(value: &Option<String>) -> Option<String> {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(|v| v.trim().to_string())
    }

    let mut changes = SimulationChanges {
        title: provided(&payload.title),
        category: provided(&payload.category),
        difficulty: provided(&payload.difficulty),
        duration: provided(&payload.duration),
        image: provided(&payload.image),
        ..Default::default()
    };

    // Rich-text fields keep creation order; the first failure aborts.
    if let Some(raw) = payload.description.as_deref().filter(|v| !v.is_empty()) {
        changes.description = Some(sanitize_rich_field("description", Some(raw))?);
    }
    if let Some(raw) = payload.overview.as_deref().filter(|v| !v.is_empty()) {
        changes.overview = Some(sanitize_rich_field("overview", Some(raw))?);
    }
    if let Some(raw) = payload.features.as_deref().filter(|v| !v.is_empty()) {
        changes.features = Some(sanitize_rich_field("features", Some(raw))?);
    }
    if let Some(raw) = payload.skills.as_deref().filter(|v| !v.is_empty()) {
        changes.skills = Some(sanitize_rich_field("skills", Some(raw))?);
    }

    if changes.is_empty() {
        return Ok(StatusCode::OK.into_response());
    }

    let updated = state
        .store
        .update_simulation(id, changes)
        .await?
        .ok_or(AppError::NotFound("Simulation not found".to_string()))?;

    tracing::info!("Updated simulation {}", id);
    Ok(Json(serde_json::json!({
        "message": "Internship updated successfully",
        "simulation": updated,
    }))
    .into_response())
}
