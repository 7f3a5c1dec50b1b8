// src/handlers/enrollment.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::enrollment::{
        CandidateResponse, EnrollRequest, Enrollment, EnrollmentStatusParams, EnrollmentTask,
    },
    state::AppState,
};

/// Enrolls a user in an internship, copying the simulation's task list into
/// the enrollment record. Enrolling twice is a no-op.
pub async fn enroll(
    State(state): State<AppState>,
    Json(payload): Json<EnrollRequest>,
) -> Result<Response, AppError> {
    let user_id = payload.user_id.as_deref().unwrap_or("").to_string();
    let user_email = payload.user_email.as_deref().unwrap_or("").to_string();
    let internship_id = payload.internship_id.as_deref().unwrap_or("").to_string();

    if user_id.is_empty() || user_email.is_empty() || internship_id.is_empty() {
        tracing::warn!("Enrollment request with missing fields");
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    }

    let mut enrollments = state.enrollments.lock().await;

    let already_enrolled = enrollments
        .iter()
        .any(|e| e.user_id == user_id && e.internship_id == internship_id);
    if already_enrolled {
        return Ok((
            StatusCode::OK,
            Json(serde_json::json!({"message": "Already enrolled", "is_enrolled": true})),
        )
            .into_response());
    }

    // Copy the simulation's tasks into the enrollment so progress can be
    // tracked locally even when the primary store is unavailable later.
    let mut tasks: Vec<EnrollmentTask> = Vec::new();
    if let Ok(sim_id) = internship_id.parse::<i64>() {
        match state.store.list_tasks(sim_id).await {
            Ok(list) => {
                tasks = list
                    .into_iter()
                    .map(|t| EnrollmentTask {
                        task_id: t.id.to_string(),
                        title: t.full_title,
                        order: t.sequence as i64,
                        description: t.description,
                        completed: false,
                    })
                    .collect();
                tracing::debug!(
                    "Loaded {} tasks for internship {}",
                    tasks.len(),
                    internship_id
                );
            }
            Err(e) => {
                tracing::warn!("Failed to load tasks for internship {}: {}", internship_id, e);
            }
        }
    }

    if tasks.is_empty() {
        tasks.push(EnrollmentTask {
            task_id: format!("task_{}", Uuid::new_v4()),
            title: "Complete Internship".to_string(),
            order: 1,
            description: String::new(),
            completed: false,
        });
    }

    let user_name = payload
        .user_name
        .clone()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| {
            user_email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string()
        });

    let enrollment = Enrollment {
        user_id,
        user_name,
        user_email,
        internship_id,
        internship_name: payload.internship_name.clone(),
        enrolled_at: Utc::now().to_rfc3339(),
        tasks,
    };

    enrollments.push(enrollment.clone());
    state.enrollments_file().save(&*enrollments).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Enrollment successful",
            "enrollment": enrollment,
        })),
    )
        .into_response())
}

/// Checks whether a user is enrolled in an internship.
pub async fn enrollment_status(
    State(state): State<AppState>,
    Query(params): Query<EnrollmentStatusParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = params.user_id.as_deref().unwrap_or("");
    let internship_id = params.internship_id.as_deref().unwrap_or("");

    if user_id.is_empty() || internship_id.is_empty() {
        return Err(AppError::BadRequest(
            "Missing user_id or internship_id".to_string(),
        ));
    }

    let enrollments = state.enrollments.lock().await;
    let is_enrolled = enrollments
        .iter()
        .any(|e| e.user_id == user_id && e.internship_id == internship_id);
    tracing::debug!(
        "Enrollment status user={} internship={}: {}",
        user_id,
        internship_id,
        is_enrolled
    );

    Ok(Json(serde_json::json!({"is_enrolled": is_enrolled})))
}

/// Marks one enrollment task as completed.
pub async fn complete_task(
    State(state): State<AppState>,
    Path((internship_id, user_id, task_id)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let mut enrollments = state.enrollments.lock().await;
    let mut updated = false;

    for enrollment in enrollments
        .iter_mut()
        .filter(|e| e.internship_id == internship_id && e.user_id == user_id)
    {
        for task in enrollment.tasks.iter_mut().filter(|t| t.task_id == task_id) {
            task.completed = true;
            updated = true;
        }
    }

    if !updated {
        return Err(AppError::NotFound("Task not found".to_string()));
    }

    state.enrollments_file().save(&*enrollments).await?;
    Ok(Json(serde_json::json!({"message": "Task marked as completed"})))
}

/// Lists all candidates enrolled in an internship, newest first, with task
/// progress. Completion counts come from the primary store when it has
/// progress rows for the user, otherwise from the enrollment's own flags.
pub async fn internship_candidates(
    State(state): State<AppState>,
    Path(internship_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let enrollments = state.enrollments.lock().await;

    let mut candidates: Vec<&Enrollment> = enrollments
        .iter()
        .filter(|e| e.internship_id == internship_id)
        .collect();
    candidates.sort_by(|a, b| b.enrolled_at.cmp(&a.enrolled_at));
    tracing::debug!(
        "Found {} candidates for internship {}",
        candidates.len(),
        internship_id
    );

    let sim_id = internship_id.parse::<i64>().ok();

    let total_for_sim = match sim_id {
        Some(id) => state.store.count_tasks(id).await.unwrap_or_else(|e| {
            tracing::warn!("Failed to get total task count: {}", e);
            0
        }),
        None => 0,
    };

    let mut rows = Vec::with_capacity(candidates.len());
    for enrollment in candidates {
        let total_tasks = if total_for_sim > 0 {
            total_for_sim
        } else {
            enrollment.tasks.len() as i64
        };

        let from_store = match sim_id {
            Some(id) => state
                .store
                .completed_task_count(id, &enrollment.user_id)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(
                        "Progress lookup failed for user {}: {}",
                        enrollment.user_id,
                        e
                    );
                    None
                }),
            None => None,
        };

        let completed_tasks = from_store.unwrap_or_else(|| {
            enrollment.tasks.iter().filter(|t| t.completed).count() as i64
        });

        let progress = if total_tasks == 0 {
            0
        } else {
            ((completed_tasks as f64 / total_tasks as f64) * 100.0).round() as i64
        };

        rows.push(CandidateResponse {
            enrollment: enrollment.clone(),
            total_tasks,
            completed_tasks,
            progress,
        });
    }

    let internship_name = rows
        .first()
        .and_then(|c| c.enrollment.internship_name.clone())
        .unwrap_or_else(|| "Internship".to_string());

    Ok(Json(serde_json::json!({
        "internship_id": internship_id,
        "internship_name": internship_name,
        "candidates": rows,
        "total_count": rows.len(),
    })))
}
