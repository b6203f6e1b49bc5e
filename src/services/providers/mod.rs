/// Recommendation provider abstraction
///
/// Each external source of book suggestions (AI inference, Open Library) sits
/// behind the same trait so the recommendation chain can try them in order and
/// fall through on failure.
use crate::{
    error::AppResult,
    models::{BookWithAuthor, Recommendation},
};

pub mod huggingface;
pub mod open_library;

pub use huggingface::HuggingFaceProvider;
pub use open_library::OpenLibraryProvider;

/// Trait for book recommendation sources
///
/// `Ok(None)` means the provider had nothing to offer for this library; errors
/// are reserved for transport and payload failures. Callers treat both the same
/// way and move on to the next provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationProvider: Send + Sync {
    /// Suggests one book based on the books currently in the library
    async fn recommend(&self, books: &[BookWithAuthor]) -> AppResult<Option<Recommendation>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
