use std::time::Duration;

use crate::models::Recommendation;

use super::ClientError;

/// What the results region shows for one recommendation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationCard {
    pub cover_url: String,
    pub title: String,
    pub author: String,
    /// Empty when the recommendation carries no reason
    pub reason: String,
}

impl From<&Recommendation> for RecommendationCard {
    fn from(rec: &Recommendation) -> Self {
        Self {
            cover_url: rec.cover_url.clone(),
            title: rec.title.clone(),
            author: rec.author.clone(),
            reason: rec.reason.clone().unwrap_or_default(),
        }
    }
}

/// Output port for everything the client draws
pub trait RenderPort: Send + Sync {
    /// Replaces the results region with a card
    ///
    /// Fails with `MissingTarget` when the page has no results region.
    fn show_card(&self, card: &RecommendationCard) -> Result<(), ClientError>;

    /// Shows or hides the element with the given ID; unknown IDs are ignored
    fn set_visible(&self, id: &str, visible: bool);

    fn show_toast(&self, message: &str, duration: Duration);
}

/// Network side of the recommendation client
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationSource: Send + Sync {
    /// Fetches one recommendation; transport, status, and payload problems are `FetchFailed`
    async fn fetch(&self) -> Result<Recommendation, ClientError>;
}

/// Persistent key-value surface that outlives a page session
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError>;
}
