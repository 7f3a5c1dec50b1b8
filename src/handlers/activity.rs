// src/handlers/activity.rs

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::activity::{
        PageAnalytics, PageDurationRequest, PageVisit, SessionEndRequest, SessionRecord,
        TrackEventRequest, UserActivity,
    },
    state::AppState,
};

/// Records a user activity event (session lifecycle or page view).
pub async fn track_event(
    State(state): State<AppState>,
    Json(payload): Json<TrackEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let Some(user_id) = payload.user_id.clone().filter(|v| !v.is_empty()) else {
        return Err(AppError::BadRequest("Missing user_id".to_string()));
    };

    let mut activity = state.activity.lock().await;
    let record = activity.entry(user_id.clone()).or_insert_with(|| UserActivity {
        user_id: user_id.clone(),
        user_email: payload.user_email.clone(),
        user_name: payload.user_name.clone(),
        first_seen: payload.timestamp.clone(),
        ..Default::default()
    });
    record.last_seen = payload.timestamp.clone();

    match payload.event_type.as_deref() {
        Some("session_start") => {
            record.current_session = Some(SessionRecord {
                session_id: Uuid::new_v4().to_string(),
                started_at: payload.timestamp.clone(),
                ended_at: None,
                duration_seconds: 0,
                pages_visited: Vec::new(),
            });
        }
        Some("heartbeat") => {
            if let Some(session) = record.current_session.as_mut() {
                session.duration_seconds = payload.session_duration;
            }
        }
        Some("session_end") => {
            if let Some(mut session) = record.current_session.take() {
                session.ended_at = payload.timestamp.clone();
                session.duration_seconds = payload.session_duration;
                record.total_session_time += session.duration_seconds;
                record.sessions.push(session);
            }
        }
        Some("page_view") => {
            if let Some(session) = record.current_session.as_mut() {
                session.pages_visited.push(PageVisit {
                    page_path: payload.page_path.clone(),
                    visited_at: payload.timestamp.clone(),
                    ..Default::default()
                });
            }
        }
        _ => {}
    }

    state.activity_file().save(&*activity).await?;
    Ok(Json(serde_json::json!({"status": "success"})))
}

/// Records the time a user spent on one page.
pub async fn track_page_duration(
    State(state): State<AppState>,
    Json(payload): Json<PageDurationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let Some(user_id) = payload.user_id.clone().filter(|v| !v.is_empty()) else {
        return Err(AppError::BadRequest("Missing user_id".to_string()));
    };

    let mut activity = state.activity.lock().await;
    let record = activity.entry(user_id.clone()).or_insert_with(|| UserActivity {
        user_id: user_id.clone(),
        ..Default::default()
    });

    record.page_visits.push(PageVisit {
        page_path: payload.page_path.clone(),
        duration_seconds: Some(payload.duration_seconds),
        started_at: payload.started_at.clone(),
        ended_at: payload.ended_at.clone(),
        visited_at: None,
    });

    state.activity_file().save(&*activity).await?;
    Ok(Json(serde_json::json!({"status": "success"})))
}

/// Closes the current session. Sent via `navigator.sendBeacon`, which may
/// use a `text/plain` body, so the payload is parsed leniently and the
/// endpoint always answers 200.
pub async fn session_end(
    State(state): State<AppState>,
    body: String,
) -> Result<impl IntoResponse, AppError> {
    let ok = Json(serde_json::json!({"status": "ok"}));

    let Ok(payload) = serde_json::from_str::<SessionEndRequest>(&body) else {
        return Ok(ok);
    };
    let Some(user_id) = payload.user_id.clone().filter(|v| !v.is_empty()) else {
        return Ok(ok);
    };

    let mut activity = state.activity.lock().await;
    let Some(record) = activity.get_mut(&user_id) else {
        return Ok(ok);
    };

    if let Some(mut session) = record.current_session.take() {
        session.ended_at = payload.timestamp.clone();
        session.duration_seconds = payload.session_duration;
        record.total_session_time += session.duration_seconds;
        record.sessions.push(session);
    }

    if payload.last_page.is_some() && payload.last_page_duration > 0 {
        record.page_visits.push(PageVisit {
            page_path: payload.last_page.clone(),
            duration_seconds: Some(payload.last_page_duration),
            ended_at: payload.timestamp.clone(),
            ..Default::default()
        });
    }

    record.last_seen = payload.timestamp.clone();
    state.activity_file().save(&*activity).await?;

    Ok(Json(serde_json::json!({"status": "success"})))
}

/// Aggregated activity view for the admin UI: totals, top pages by time
/// spent, and the ten most recent sessions.
pub async fn get_user_activity(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let activity = state.activity.lock().await;
    let record = activity.get(&user_id).cloned().unwrap_or_default();

    let total_sessions = record.sessions.len();
    let mut total_time = record.total_session_time;
    if let Some(session) = &record.current_session {
        total_time += session.duration_seconds;
    }

    let mut page_time: HashMap<String, PageAnalytics> = HashMap::new();
    for visit in &record.page_visits {
        let path = visit
            .page_path
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());
        let duration = visit.duration_seconds.unwrap_or(0);
        let entry = page_time.entry(path.clone()).or_insert(PageAnalytics {
            page_path: path,
            total_seconds: 0,
            visit_count: 0,
        });
        entry.total_seconds += duration;
        entry.visit_count += 1;
    }

    let mut page_analytics: Vec<PageAnalytics> = page_time.into_values().collect();
    page_analytics.sort_by(|a, b| b.total_seconds.cmp(&a.total_seconds));
    page_analytics.truncate(10);

    // Last 10 sessions, most recent first
    let recent_sessions: Vec<SessionRecord> =
        record.sessions.iter().rev().take(10).cloned().collect();

    Ok(Json(serde_json::json!({
        "user_id": user_id,
        "first_seen": record.first_seen,
        "last_seen": record.last_seen,
        "total_sessions": total_sessions,
        "total_time_seconds": total_time,
        "is_currently_active": record.current_session.is_some(),
        "current_session_duration": record
            .current_session
            .as_ref()
            .map(|s| s.duration_seconds)
            .unwrap_or(0),
        "page_analytics": page_analytics,
        "recent_sessions": recent_sessions,
    })))
}
