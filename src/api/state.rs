use reqwest::Client as HttpClient;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::{
    config::Config,
    db::Cache,
    services::{
        providers::{HuggingFaceProvider, OpenLibraryProvider, RecommendationProvider},
        CoverValidator, Recommender,
    },
};

/// Shared application state
///
/// Handlers receive it as `State<Arc<AppState>>`; everything inside is cheap to
/// share (the pool and HTTP client are reference-counted internally).
pub struct AppState {
    pub db_pool: SqlitePool,
    pub covers: CoverValidator,
    pub recommender: Recommender,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, covers: CoverValidator, recommender: Recommender) -> Self {
        Self {
            db_pool,
            covers,
            recommender,
        }
    }

    /// Wires the external providers from configuration
    ///
    /// The chain is AI first, then Open Library; the library pick inside
    /// `Recommender` is the last resort.
    pub fn from_config(config: &Config, db_pool: SqlitePool, cache: Cache) -> Self {
        let http_client = HttpClient::new();

        let covers = CoverValidator::new(http_client.clone(), cache.clone());

        let providers: Vec<Arc<dyn RecommendationProvider>> = vec![
            Arc::new(HuggingFaceProvider::new(
                http_client.clone(),
                config.huggingface_url.clone(),
                config.huggingface_api_key.clone(),
                config.default_cover_url.clone(),
            )),
            Arc::new(OpenLibraryProvider::new(
                http_client,
                config.openlibrary_url.clone(),
                cache,
                config.default_cover_url.clone(),
            )),
        ];

        let recommender =
            Recommender::new(providers, covers.clone(), config.default_cover_url.clone());

        Self::new(db_pool, covers, recommender)
    }

    /// State without external providers, for running against a local database only
    pub fn offline(db_pool: SqlitePool, default_cover_url: &str) -> Self {
        let covers = CoverValidator::new(HttpClient::new(), Cache::disabled().0);
        let recommender = Recommender::new(vec![], covers.clone(), default_cover_url.to_string());
        Self::new(db_pool, covers, recommender)
    }
}
