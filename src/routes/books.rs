use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    api::AppState,
    db::library::{self, BookRecord},
    error::{AppError, AppResult},
    models::{Book, BookSort, BookWithAuthor, NewBook},
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    sort: Option<String>,
}

/// Checks a new book and normalizes its optional fields
///
/// The cover URL is passed through untouched; it is checked separately
/// because that needs a network round trip.
pub fn validate_new_book(request: NewBook) -> AppResult<BookRecord> {
    let title = request.title.trim().to_string();
    let author_id = match request.author_id {
        Some(id) if !title.is_empty() => id,
        _ => {
            return Err(AppError::InvalidInput(
                "Title and author are required.".to_string(),
            ))
        }
    };

    if let Some(rating) = request.rating {
        if !(0.0..=10.0).contains(&rating) {
            return Err(AppError::InvalidInput(
                "Rating must be a number between 0 and 10.".to_string(),
            ));
        }
    }

    let isbn = request
        .isbn
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty());
    let cover_url = request
        .cover_url
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    Ok(BookRecord {
        title,
        publication_year: request.publication_year,
        isbn,
        rating: request.rating,
        cover_url,
        author_id,
    })
}

/// Lists books with optional search (`q`) and ordering (`sort`)
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<Vec<BookWithAuthor>>> {
    let sort = BookSort::parse(params.sort.as_deref());
    let books = library::list_books(&state.db_pool, params.q.as_deref(), sort).await?;
    Ok(Json(books))
}

/// Adds a book to an existing author
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let mut record = validate_new_book(request)?;

    if library::get_author(&state.db_pool, record.author_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound(format!("Author {}", record.author_id)));
    }

    if let Some(url) = record.cover_url.take() {
        record.cover_url = state.covers.validate(&url).await;
    }

    let created = library::insert_book(&state.db_pool, &record).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Deletes a book; an author left without books is deleted as well
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    let deletion = library::delete_book(&state.db_pool, id).await?;
    Ok(Json(json!({
        "message": "Book deleted successfully.",
        "author_removed": deletion.author_removed,
    })))
}
