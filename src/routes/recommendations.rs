use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    api::AppState, db::library, error::AppResult, middleware::RequestId,
    models::Recommendation,
};

/// Handler for the recommendation endpoint
///
/// Always answers with a recommendation once the library has been read; provider
/// failures only shift the answer further down the fallback chain.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<Recommendation>> {
    let books = library::all_books(&state.db_pool).await?;

    tracing::info!(
        request_id = %request_id,
        library_size = books.len(),
        "Processing recommendation request"
    );

    let recommendation = state.recommender.recommend(&books).await;

    Ok(Json(recommendation))
}
