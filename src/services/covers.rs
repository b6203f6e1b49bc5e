use reqwest::{header::CONTENT_TYPE, Client as HttpClient, StatusCode};
use std::time::Duration;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::AppResult,
};

const COVER_CACHE_TTL: u64 = 86400; // 1 day
const COVER_TIMEOUT: Duration = Duration::from_secs(5);
/// Most image headers fit in the first few KB; stop reading well past that
const MAX_HEADER_BYTES: usize = 64 * 1024;

/// Decides whether a fetched cover is a real image
///
/// Open Library answers unknown covers with a 1x1 placeholder, so anything not
/// larger than one pixel in both directions is rejected.
pub fn is_usable_cover(status: StatusCode, content_type: Option<&str>, body: &[u8]) -> bool {
    if status != StatusCode::OK {
        return false;
    }
    if !content_type.is_some_and(|ct| ct.starts_with("image")) {
        return false;
    }
    match imagesize::blob_size(body) {
        Ok(size) => size.width > 1 && size.height > 1,
        Err(_) => false,
    }
}

/// Checks that cover URLs point at usable images
#[derive(Clone)]
pub struct CoverValidator {
    http_client: HttpClient,
    cache: Cache,
}

impl CoverValidator {
    pub fn new(http_client: HttpClient, cache: Cache) -> Self {
        Self { http_client, cache }
    }

    /// Returns the URL back if it serves a usable image, `None` otherwise
    pub async fn validate(&self, url: &str) -> Option<String> {
        let url = url.trim();
        if url.is_empty() {
            return None;
        }

        match self.check(url).await {
            Ok(true) => Some(url.to_string()),
            Ok(false) => {
                tracing::debug!(url = %url, "Cover rejected");
                None
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Cover check failed");
                None
            }
        }
    }

    async fn check(&self, url: &str) -> AppResult<bool> {
        cached!(
            self.cache,
            CacheKey::CoverCheck(url.to_string()),
            COVER_CACHE_TTL,
            async move {
                let mut response = self
                    .http_client
                    .get(url)
                    .timeout(COVER_TIMEOUT)
                    .send()
                    .await?;

                let status = response.status();
                let content_type = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let mut header = Vec::new();
                while header.len() < MAX_HEADER_BYTES && imagesize::blob_size(&header).is_err() {
                    match response.chunk().await? {
                        Some(chunk) => header.extend_from_slice(&chunk),
                        None => break,
                    }
                }

                Ok::<bool, crate::error::AppError>(is_usable_cover(
                    status,
                    content_type.as_deref(),
                    &header,
                ))
            }
        )
    }
}
