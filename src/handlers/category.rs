// src/handlers/category.rs

use std::sync::LazyLock;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use regex::Regex;
use serde::Deserialize;

use crate::{error::AppError, state::AppState};

const MAX_SEARCH_RESULTS: usize = 20;

// Alphanumerics, spaces, and a small set of punctuation; keeps markup and
// control characters out of category names before any other check runs.
static CATEGORY_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\s\-&/().,]+$").expect("valid charset pattern"));

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

/// Returns all categories.
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let categories: Vec<String> = state.categories_file().load().await;
    Ok(Json(serde_json::json!({"categories": categories})))
}

#[derive(Debug, Deserialize)]
pub struct AddCategoryRequest {
    pub category: Option<String>,
}

/// Adds a new category after the full validation chain: required, length
/// bounds, charset allow-list, tag stripping, and case-insensitive
/// duplicate detection.
pub async fn add_category(
    State(state): State<AppState>,
    Json(payload): Json<AddCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let category = payload.category.unwrap_or_default().trim().to_string();

    if category.is_empty() {
        return Err(AppError::BadRequest("Category cannot be empty".to_string()));
    }

    if category.chars().count() < 3 {
        return Err(AppError::BadRequest(
            "Category must be at least 3 characters".to_string(),
        ));
    }

    if category.chars().count() > 50 {
        return Err(AppError::BadRequest(
            "Category must not exceed 50 characters".to_string(),
        ));
    }

    if !CATEGORY_CHARSET.is_match(&category) {
        return Err(AppError::BadRequest(
            "Category contains invalid characters. Only letters, numbers, spaces, and - & / ( ) . , are allowed"
                .to_string(),
        ));
    }

    // Defense in depth; the charset check already rejects angle brackets.
    let category = HTML_TAG.replace_all(&category, "").trim().to_string();
    if category.is_empty() {
        return Err(AppError::BadRequest(
            "Category is empty after sanitization".to_string(),
        ));
    }

    let file = state.categories_file();
    let mut categories: Vec<String> = file.load().await;

    let category_lower = category.to_lowercase();
    if categories.iter().any(|c| c.to_lowercase() == category_lower) {
        return Err(AppError::Conflict("Category already exists".to_string()));
    }

    categories.push(category.clone());
    file.save(&categories).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Category added successfully",
            "category": category,
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Prefix search over categories, case-insensitive, capped result count.
pub async fn search_categories(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = params.q.unwrap_or_default().trim().to_string();

    if query.is_empty() {
        return Ok(Json(serde_json::json!({"categories": []})));
    }

    if query.chars().count() > 50 {
        return Err(AppError::BadRequest("Search query too long".to_string()));
    }

    let query = HTML_TAG
        .replace_all(&query, "")
        .trim()
        .to_lowercase();

    let categories: Vec<String> = state.categories_file().load().await;
    let matching: Vec<String> = categories
        .into_iter()
        .filter(|c| c.to_lowercase().starts_with(&query))
        .take(MAX_SEARCH_RESULTS)
        .collect();

    Ok(Json(serde_json::json!({"categories": matching})))
}
