use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    api::AppState,
    db::library,
    error::{AppError, AppResult},
    models::{Author, NewAuthor},
};

/// Trims the name and rejects blank ones
pub fn validate_new_author(mut author: NewAuthor) -> AppResult<NewAuthor> {
    author.name = author.name.trim().to_string();
    if author.name.is_empty() {
        return Err(AppError::InvalidInput(
            "Author name cannot be empty.".to_string(),
        ));
    }
    Ok(author)
}

/// Lists all authors by name
pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Author>>> {
    let authors = library::list_authors(&state.db_pool).await?;
    Ok(Json(authors))
}

/// Adds an author; names are unique
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewAuthor>,
) -> AppResult<(StatusCode, Json<Author>)> {
    let author = validate_new_author(request)?;

    if library::find_author_by_name(&state.db_pool, &author.name)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Author already exists.".to_string()));
    }

    let created = library::insert_author(&state.db_pool, &author).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Deletes an author and all of their books
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    library::delete_author(&state.db_pool, id).await?;
    Ok(Json(json!({ "message": "Author deleted successfully." })))
}
