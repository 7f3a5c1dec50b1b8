// tests/enrollment_tests.rs

use std::sync::Arc;

use simhub_backend::{config::Config, routes, state::AppState, storage::JsonStore};
use tempfile::TempDir;

async fn spawn_app() -> (String, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let config = Config {
        database_url: None,
        data_dir: dir.path().to_path_buf(),
        allowed_origins: vec!["http://localhost:5173".to_string()],
        port: 0,
        rust_log: "error".to_string(),
    };

    let store = Arc::new(JsonStore::new(dir.path()));
    let state = AppState::load(store, config).await;
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, dir)
}

/// Creates a simulation with two tasks and returns its id.
async fn seed_simulation(client: &reqwest::Client, address: &str) -> i64 {
    let payload = serde_json::json!({
        "title": "Data Engineering Internship",
        "category": "Data",
        "difficulty": "Intermediate",
        "duration": "6 weeks",
        "image": "",
        "description": "<p>Work with batch and streaming pipelines.</p>",
        "overview": "<p>A simulated data engineering rotation.</p>",
        "features": "<p>Realistic datasets and reviews.</p>",
        "skills": "<p>SQL, Rust, orchestration.</p>",
        "tasks": [
            {
                "title": "Task 1",
                "full_title": "Model the warehouse schema",
                "duration": "1 week",
                "difficulty": "Medium",
                "description": "<p>Design the core fact tables.</p>",
                "what_youll_learn": "<p>Dimensional modeling.</p>",
                "what_youll_do": "<p>Write the schema migration.</p>"
            },
            {
                "title": "Task 2",
                "full_title": "Build the ingestion job",
                "duration": "1 week",
                "difficulty": "Medium",
                "description": "<p>Ingest the raw events feed.</p>",
                "what_youll_learn": "<p>Idempotent ingestion.</p>",
                "what_youll_do": "<p>Implement and backfill the job.</p>"
            }
        ]
    });

    let response = client
        .post(format!("{}/admin/internships", address))
        .json(&payload)
        .send()
        .await
        .expect("Failed to create simulation");
    assert_eq!(response.status().as_u16(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

fn enroll_payload(user_id: &str, internship_id: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "user_id": user_id,
        "user_name": "Jordan Doe",
        "user_email": "jordan@example.com",
        "internship_id": internship_id,
        "internship_name": "Data Engineering Internship"
    })
}

#[tokio::test]
async fn enroll_copies_simulation_tasks() {
    let (address, _dir) = spawn_app().await;
    let client = reqwest::Client::new();
    let sim_id = seed_simulation(&client, &address).await;

    let response = client
        .post(format!("{}/enroll", address))
        .json(&enroll_payload("user-1", serde_json::json!(sim_id.to_string())))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Enrollment successful");

    let tasks = body["enrollment"]["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["title"], "Model the warehouse schema");
    assert_eq!(tasks[0]["completed"], false);
    assert_eq!(tasks[1]["order"], 2);
}

#[tokio::test]
async fn enroll_accepts_numeric_internship_id() {
    let (address, _dir) = spawn_app().await;
    let client = reqwest::Client::new();
    let sim_id = seed_simulation(&client, &address).await;

    let response = client
        .post(format!("{}/enroll", address))
        .json(&enroll_payload("user-1", serde_json::json!(sim_id)))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["enrollment"]["internship_id"], sim_id.to_string());
}

#[tokio::test]
async fn enrolling_twice_is_a_no_op() {
    let (address, _dir) = spawn_app().await;
    let client = reqwest::Client::new();
    let sim_id = seed_simulation(&client, &address).await;
    let payload = enroll_payload("user-1", serde_json::json!(sim_id.to_string()));

    let first = client
        .post(format!("{}/enroll", address))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 201);

    let second = client
        .post(format!("{}/enroll", address))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status().as_u16(), 200);
    let body: serde_json::Value = second.json().await.unwrap();
    assert_eq!(body["message"], "Already enrolled");
    assert_eq!(body["is_enrolled"], true);
}

#[tokio::test]
async fn enroll_requires_identifying_fields() {
    let (address, _dir) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/enroll", address))
        .json(&serde_json::json!({"user_id": "user-1"}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn enroll_without_store_tasks_gets_placeholder() {
    let (address, _dir) = spawn_app().await;
    let client = reqwest::Client::new();

    // No simulation seeded; internship id does not resolve to tasks.
    let response = client
        .post(format!("{}/enroll", address))
        .json(&enroll_payload("user-1", serde_json::json!("42")))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    let tasks = body["enrollment"]["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Complete Internship");
    assert!(tasks[0]["task_id"].as_str().unwrap().starts_with("task_"));
}

#[tokio::test]
async fn enrollment_status_flips_after_enrolling() {
    let (address, _dir) = spawn_app().await;
    let client = reqwest::Client::new();
    let sim_id = seed_simulation(&client, &address).await;

    let response = client
        .get(format!(
            "{}/enrollment-status?user_id=user-1&internship_id={}",
            address, sim_id
        ))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["is_enrolled"], false);

    client
        .post(format!("{}/enroll", address))
        .json(&enroll_payload("user-1", serde_json::json!(sim_id.to_string())))
        .send()
        .await
        .unwrap();

    let response = client
        .get(format!(
            "{}/enrollment-status?user_id=user-1&internship_id={}",
            address, sim_id
        ))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["is_enrolled"], true);
}

#[tokio::test]
async fn enrollment_status_requires_both_params() {
    let (address, _dir) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/enrollment-status?user_id=user-1", address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn completing_a_task_updates_candidate_progress() {
    let (address, _dir) = spawn_app().await;
    let client = reqwest::Client::new();
    let sim_id = seed_simulation(&client, &address).await;

    let enroll_response = client
        .post(format!("{}/enroll", address))
        .json(&enroll_payload("user-1", serde_json::json!(sim_id.to_string())))
        .send()
        .await
        .unwrap();
    let enroll_body: serde_json::Value = enroll_response.json().await.unwrap();
    let task_id = enroll_body["enrollment"]["tasks"][0]["task_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = client
        .patch(format!(
            "{}/enrollments/{}/user-1/tasks/{}",
            address, sim_id, task_id
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = client
        .get(format!(
            "{}/admin/internships/{}/candidates",
            address, sim_id
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["total_count"], 1);
    assert_eq!(body["internship_name"], "Data Engineering Internship");

    let candidate = &body["candidates"][0];
    assert_eq!(candidate["user_id"], "user-1");
    assert_eq!(candidate["total_tasks"], 2);
    assert_eq!(candidate["completed_tasks"], 1);
    assert_eq!(candidate["progress"], 50);
}

#[tokio::test]
async fn completing_unknown_task_404() {
    let (address, _dir) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .patch(format!("{}/enrollments/1/user-1/tasks/nope", address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn candidates_empty_for_unknown_internship() {
    let (address, _dir) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/admin/internships/77/candidates", address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["total_count"], 0);
    assert_eq!(body["internship_name"], "Internship");
}

#[tokio::test]
async fn user_profile_reflects_enrollments() {
    let (address, _dir) = spawn_app().await;
    let client = reqwest::Client::new();
    let sim_id = seed_simulation(&client, &address).await;

    client
        .post(format!("{}/enroll", address))
        .json(&enroll_payload("user-1", serde_json::json!(sim_id.to_string())))
        .send()
        .await
        .unwrap();

    let response = client
        .get(format!("{}/admin/user/user-1", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"]["user_email"], "jordan@example.com");
    assert_eq!(body["user"]["display_name"], "Jordan Doe");

    let enrollments = body["enrollments"].as_array().unwrap();
    assert_eq!(enrollments.len(), 1);
    assert_eq!(enrollments[0]["total_tasks"], 2);
    assert_eq!(enrollments[0]["progress"], 0);

    // Unknown users still get a stub profile
    let response = client
        .get(format!("{}/admin/user/ghost", address))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"]["user_name"], "Unknown User");
    assert_eq!(body["enrollments"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn activity_session_lifecycle() {
    let (address, _dir) = spawn_app().await;
    let client = reqwest::Client::new();

    // Start a session
    let response = client
        .post(format!("{}/activity/track", address))
        .json(&serde_json::json!({
            "user_id": "user-9",
            "user_email": "nine@example.com",
            "event_type": "session_start",
            "timestamp": "2026-08-07T10:00:00Z"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    // Heartbeat updates the running duration
    client
        .post(format!("{}/activity/track", address))
        .json(&serde_json::json!({
            "user_id": "user-9",
            "event_type": "heartbeat",
            "timestamp": "2026-08-07T10:05:00Z",
            "session_duration": 300
        }))
        .send()
        .await
        .unwrap();

    // A page view lands inside the current session
    client
        .post(format!("{}/activity/track", address))
        .json(&serde_json::json!({
            "user_id": "user-9",
            "event_type": "page_view",
            "timestamp": "2026-08-07T10:06:00Z",
            "page_path": "/dashboard"
        }))
        .send()
        .await
        .unwrap();

    // Standalone page duration record
    client
        .post(format!("{}/activity/page-duration", address))
        .json(&serde_json::json!({
            "user_id": "user-9",
            "page_path": "/dashboard",
            "duration_seconds": 120,
            "started_at": "2026-08-07T10:06:00Z",
            "ended_at": "2026-08-07T10:08:00Z"
        }))
        .send()
        .await
        .unwrap();

    let response = client
        .get(format!("{}/admin/user/user-9/activity", address))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["is_currently_active"], true);
    assert_eq!(body["current_session_duration"], 300);
    assert_eq!(body["total_time_seconds"], 300);
    assert_eq!(body["page_analytics"][0]["page_path"], "/dashboard");
    assert_eq!(body["page_analytics"][0]["total_seconds"], 120);

    // Beacon-style session end: plain-text body, always 200
    let response = client
        .post(format!("{}/activity/session-end", address))
        .body(
            serde_json::json!({
                "user_id": "user-9",
                "timestamp": "2026-08-07T10:10:00Z",
                "session_duration": 600,
                "last_page": "/dashboard",
                "last_page_duration": 30
            })
            .to_string(),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = client
        .get(format!("{}/admin/user/user-9/activity", address))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["is_currently_active"], false);
    assert_eq!(body["total_sessions"], 1);
    assert_eq!(body["total_time_seconds"], 600);
    assert_eq!(body["recent_sessions"][0]["duration_seconds"], 600);
}

#[tokio::test]
async fn activity_requires_user_id() {
    let (address, _dir) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/activity/track", address))
        .json(&serde_json::json!({"event_type": "session_start"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);

    // Malformed beacon bodies never error
    let response = client
        .post(format!("{}/activity/session-end", address))
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}
