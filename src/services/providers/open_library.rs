/// Open Library provider
///
/// Recommends a work that shares a subject with a randomly chosen book from the
/// library.
///
/// API Flow:
/// 1. Book data: /api/books?bibkeys=ISBN:{isbn}&jscmd=data → subjects of the base book
/// 2. Subject: /subjects/{slug}.json?limit=5 → works filed under the first subject
use rand::seq::SliceRandom;
use reqwest::Client as HttpClient;
use std::{collections::HashMap, time::Duration};

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{BookWithAuthor, OpenLibraryBook, OpenLibrarySubject, OpenLibraryWork, Recommendation},
    services::providers::RecommendationProvider,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const ISBN_CACHE_TTL: u64 = 604800; // 1 week
const SUBJECT_CACHE_TTL: u64 = 3600; // 1 hour
const SUBJECT_LIMIT: &str = "5";
const COVERS_URL: &str = "https://covers.openlibrary.org/b/id";

/// Turns a subject name into the path segment Open Library expects
pub fn subject_slug(subject: &str) -> String {
    subject.to_lowercase().replace(' ', "_")
}

/// Maps a subject work onto a recommendation
pub fn work_to_recommendation(
    work: &OpenLibraryWork,
    base_title: &str,
    default_cover_url: &str,
) -> Recommendation {
    let cover_url = match work.cover_id {
        Some(id) => format!("{}/{}-L.jpg", COVERS_URL, id),
        None => default_cover_url.to_string(),
    };

    Recommendation {
        title: work
            .title
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        author: work
            .authors
            .first()
            .map(|a| a.name.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        cover_url,
        reason: Some(format!("Because you liked '{}'", base_title)),
    }
}

#[derive(Clone)]
pub struct OpenLibraryProvider {
    http_client: HttpClient,
    api_url: String,
    cache: Cache,
    default_cover_url: String,
}

impl OpenLibraryProvider {
    pub fn new(
        http_client: HttpClient,
        api_url: String,
        cache: Cache,
        default_cover_url: String,
    ) -> Self {
        Self {
            http_client,
            api_url,
            cache,
            default_cover_url,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> AppResult<T> {
        let response = self
            .http_client
            .get(url)
            .query(query)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Open Library returned status {}: {}",
                status, body
            )));
        }

        response.json::<T>().await.map_err(|e| {
            AppError::ExternalApi(format!("Failed to parse Open Library response: {}", e))
        })
    }

    /// First subject Open Library files the ISBN under, if any
    async fn first_subject(&self, isbn: &str) -> AppResult<Option<String>> {
        cached!(
            self.cache,
            CacheKey::IsbnSubject(isbn.to_string()),
            ISBN_CACHE_TTL,
            async move {
                let key = format!("ISBN:{}", isbn);
                let url = format!("{}/api/books", self.api_url);

                let data: HashMap<String, OpenLibraryBook> = self
                    .get_json(
                        &url,
                        &[("bibkeys", key.as_str()), ("jscmd", "data"), ("format", "json")],
                    )
                    .await?;

                Ok::<Option<String>, AppError>(
                    data.get(&key)
                        .and_then(|book| book.subjects.first())
                        .map(|subject| subject.name.clone()),
                )
            }
        )
    }

    async fn subject_works(&self, subject: &str) -> AppResult<Vec<OpenLibraryWork>> {
        let slug = subject_slug(subject);

        cached!(
            self.cache,
            CacheKey::SubjectWorks(slug.clone()),
            SUBJECT_CACHE_TTL,
            async {
                let url = format!("{}/subjects/{}.json", self.api_url, slug);
                let subject: OpenLibrarySubject =
                    self.get_json(&url, &[("limit", SUBJECT_LIMIT)]).await?;
                Ok::<Vec<OpenLibraryWork>, AppError>(subject.works)
            }
        )
    }
}

#[async_trait::async_trait]
impl RecommendationProvider for OpenLibraryProvider {
    async fn recommend(&self, books: &[BookWithAuthor]) -> AppResult<Option<Recommendation>> {
        let Some(base) = books.choose(&mut rand::thread_rng()).cloned() else {
            return Ok(None);
        };

        let Some(isbn) = base.isbn.as_deref().map(str::trim).filter(|i| !i.is_empty()) else {
            tracing::debug!(book = %base.title, "Base book has no ISBN");
            return Ok(None);
        };

        let Some(subject) = self.first_subject(isbn).await? else {
            tracing::debug!(isbn = %isbn, "No subjects for ISBN");
            return Ok(None);
        };

        let works = self.subject_works(&subject).await?;
        let work = works.choose(&mut rand::thread_rng()).cloned();

        tracing::info!(
            provider = self.name(),
            base = %base.title,
            subject = %subject,
            works = works.len(),
            "Open Library recommendation completed"
        );

        Ok(work.map(|w| work_to_recommendation(&w, &base.title, &self.default_cover_url)))
    }

    fn name(&self) -> &'static str {
        "openlibrary"
    }
}
