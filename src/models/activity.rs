// src/models/activity.rs

use serde::{Deserialize, Serialize};

/// Per-user usage record stored in `user_activity.json`, keyed by user id.
///
/// Timestamps are kept as the client-supplied ISO strings; the backend only
/// orders and aggregates them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserActivity {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub first_seen: Option<String>,
    pub last_seen: Option<String>,
    #[serde(default)]
    pub total_session_time: i64,
    #[serde(default)]
    pub total_active_time: i64,
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
    #[serde(default)]
    pub page_visits: Vec<PageVisit>,
    pub current_session: Option<SessionRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    #[serde(default)]
    pub duration_seconds: i64,
    #[serde(default)]
    pub pages_visited: Vec<PageVisit>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageVisit {
    pub page_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visited_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
}

/// DTO for `POST /activity/track`.
#[derive(Debug, Deserialize)]
pub struct TrackEventRequest {
    pub user_id: Option<String>,
    pub event_type: Option<String>,
    pub timestamp: Option<String>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    #[serde(default)]
    pub session_duration: i64,
    pub page_path: Option<String>,
}

/// DTO for `POST /activity/page-duration`.
#[derive(Debug, Deserialize)]
pub struct PageDurationRequest {
    pub user_id: Option<String>,
    pub page_path: Option<String>,
    #[serde(default)]
    pub duration_seconds: i64,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
}

/// DTO for `POST /activity/session-end`. Sent via `navigator.sendBeacon`,
/// so the body may arrive as `text/plain` and is parsed leniently.
#[derive(Debug, Default, Deserialize)]
pub struct SessionEndRequest {
    pub user_id: Option<String>,
    pub timestamp: Option<String>,
    #[serde(default)]
    pub session_duration: i64,
    pub last_page: Option<String>,
    #[serde(default)]
    pub last_page_duration: i64,
}

/// Aggregated time per page for the admin activity view.
#[derive(Debug, Serialize)]
pub struct PageAnalytics {
    pub page_path: String,
    pub total_seconds: i64,
    pub visit_count: i64,
}
