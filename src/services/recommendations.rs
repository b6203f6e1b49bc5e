use rand::seq::SliceRandom;
use std::sync::Arc;

use crate::{
    models::{BookWithAuthor, Recommendation},
    services::{covers::CoverValidator, providers::RecommendationProvider},
};

const EMPTY_LIBRARY_TITLE: &str = "No books available";
const LIBRARY_PICK_REASON: &str = "Random suggestion from your library";

/// Produces one recommendation for the current library
///
/// External providers are tried in order; the first one to come back with a
/// suggestion wins. When all of them fail or come back empty, a random book
/// from the library itself is suggested, so a non-empty library always gets an
/// answer.
#[derive(Clone)]
pub struct Recommender {
    providers: Vec<Arc<dyn RecommendationProvider>>,
    covers: CoverValidator,
    default_cover_url: String,
}

impl Recommender {
    pub fn new(
        providers: Vec<Arc<dyn RecommendationProvider>>,
        covers: CoverValidator,
        default_cover_url: String,
    ) -> Self {
        Self {
            providers,
            covers,
            default_cover_url,
        }
    }

    pub async fn recommend(&self, books: &[BookWithAuthor]) -> Recommendation {
        if books.is_empty() {
            return self.empty_library();
        }

        for provider in &self.providers {
            match provider.recommend(books).await {
                Ok(Some(rec)) => {
                    tracing::info!(provider = provider.name(), title = %rec.title, "Recommendation found");
                    return rec;
                }
                Ok(None) => {
                    tracing::debug!(provider = provider.name(), "Provider had no suggestion");
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "Provider failed");
                }
            }
        }

        self.library_pick(books).await
    }

    fn empty_library(&self) -> Recommendation {
        Recommendation {
            title: EMPTY_LIBRARY_TITLE.to_string(),
            author: String::new(),
            cover_url: self.default_cover_url.clone(),
            reason: None,
        }
    }

    /// Suggests a random book the user already owns
    async fn library_pick(&self, books: &[BookWithAuthor]) -> Recommendation {
        let Some(book) = books.choose(&mut rand::thread_rng()).cloned() else {
            return self.empty_library();
        };

        let cover_url = match book.cover_url.as_deref() {
            Some(url) => self.covers.validate(url).await,
            None => None,
        }
        .unwrap_or_else(|| self.default_cover_url.clone());

        tracing::info!(title = %book.title, "Falling back to a random library pick");

        Recommendation {
            title: book.title,
            author: book.author_name,
            cover_url,
            reason: Some(LIBRARY_PICK_REASON.to_string()),
        }
    }
}
