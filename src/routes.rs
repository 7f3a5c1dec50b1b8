// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, patch, post, put},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{activity, category, enrollment, health, profile, simulation},
    state::AppState,
};

// Restrictive defaults; img-src keeps data:/https: for editor previews.
const CSP_POLICY: &str = "default-src 'self'; script-src 'self'; \
                          style-src 'self' 'unsafe-inline'; img-src 'self' data: https:; \
                          frame-ancestors 'none'; base-uri 'self'; form-action 'self'";

/// Assembles the main application router.
///
/// * Admin simulation CRUD, enrollment, activity, category and profile routes.
/// * Applies global middleware (Trace, CORS, security headers).
/// * Injects global state (store handle + file-backed collections).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ])
        .allow_credentials(true);

    let activity_routes = Router::new()
        .route("/track", post(activity::track_event))
        .route("/page-duration", post(activity::track_page_duration))
        .route("/session-end", post(activity::session_end));

    let admin_user_routes = Router::new()
        .route("/{user_id}", get(profile::get_user_profile))
        .route("/{user_id}/enrollments", get(profile::get_user_enrollments))
        .route("/{user_id}/activity", get(activity::get_user_activity));

    Router::new()
        .route(
            "/admin/internships",
            post(simulation::create_internship).get(simulation::list_internships),
        )
        .route("/admin/internships/{id}", put(simulation::update_internship))
        .route(
            "/admin/internships/{id}/candidates",
            get(enrollment::internship_candidates),
        )
        .nest("/admin/user", admin_user_routes)
        .route("/enroll", post(enrollment::enroll))
        .route("/enrollment-status", get(enrollment::enrollment_status))
        .route(
            "/enrollments/{internship_id}/{user_id}/tasks/{task_id}",
            patch(enrollment::complete_task),
        )
        .nest("/activity", activity_routes)
        .route(
            "/api/categories",
            get(category::list_categories).post(category::add_category),
        )
        .route("/api/categories/search", get(category::search_categories))
        .route("/health", get(health::health_check))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CSP_POLICY),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}
