use reqwest::Client as HttpClient;
use std::time::Duration;

use crate::models::Recommendation;

use super::{ports::RecommendationSource, ClientError};

/// Default limit on how long a recommendation fetch may take
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Fetches recommendations from the server's `/recommend` endpoint
///
/// A timeout turns a hung request into a failed one, so the client never stays
/// in the loading state forever.
#[derive(Clone)]
pub struct HttpRecommendationSource {
    http_client: HttpClient,
    endpoint: String,
    timeout: Duration,
}

impl HttpRecommendationSource {
    pub fn new(http_client: HttpClient, base_url: &str) -> Self {
        Self {
            http_client,
            endpoint: format!("{}/recommend", base_url.trim_end_matches('/')),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl RecommendationSource for HttpRecommendationSource {
    async fn fetch(&self) -> Result<Recommendation, ClientError> {
        let response = self
            .http_client
            .get(&self.endpoint)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ClientError::FetchFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClientError::FetchFailed(format!(
                "server returned status {}",
                response.status()
            )));
        }

        response
            .json::<Recommendation>()
            .await
            .map_err(|e| ClientError::FetchFailed(format!("malformed recommendation: {}", e)))
    }
}
