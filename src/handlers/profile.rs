// src/handlers/profile.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{error::AppError, models::enrollment::Enrollment, state::AppState};

fn enrollment_summary(enrollment: &Enrollment) -> serde_json::Value {
    let total_tasks = enrollment.tasks.len() as i64;
    let completed_tasks = enrollment.tasks.iter().filter(|t| t.completed).count() as i64;
    let progress = if total_tasks == 0 {
        0
    } else {
        ((completed_tasks as f64 / total_tasks as f64) * 100.0).round() as i64
    };

    serde_json::json!({
        "internship_id": enrollment.internship_id,
        "internship_name": enrollment
            .internship_name
            .as_deref()
            .unwrap_or("Unknown Internship"),
        "enrolled_at": enrollment.enrolled_at,
        "completed_tasks": completed_tasks,
        "total_tasks": total_tasks,
        "progress": progress,
    })
}

/// Admin view of a user's profile with all their enrollments and progress.
/// User details come from the enrollment records themselves.
pub async fn get_user_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let enrollments = state.enrollments.lock().await;

    let mut user: Option<serde_json::Value> = None;
    let mut rows = Vec::new();

    for enrollment in enrollments.iter().filter(|e| e.user_id == user_id) {
        rows.push(enrollment_summary(enrollment));

        if user.is_none() {
            user = Some(serde_json::json!({
                "id": user_id,
                "user_name": enrollment.user_name,
                "user_email": enrollment.user_email,
                "email": enrollment.user_email,
                "display_name": enrollment.user_name,
                "created_at": enrollment.enrolled_at,
            }));
        }
    }

    let user = user.unwrap_or_else(|| {
        serde_json::json!({
            "id": user_id,
            "user_name": "Unknown User",
            "user_email": "No email available",
            "display_name": "Unknown User",
        })
    });

    Ok(Json(serde_json::json!({
        "user": user,
        "enrollments": rows,
    })))
}

/// All enrollments for one user.
pub async fn get_user_enrollments(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let enrollments = state.enrollments.lock().await;

    let rows: Vec<serde_json::Value> = enrollments
        .iter()
        .filter(|e| e.user_id == user_id)
        .map(enrollment_summary)
        .collect();

    Ok(Json(serde_json::json!({"enrollments": rows})))
}
