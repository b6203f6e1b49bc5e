//! Client-side behaviour of the library page.
//!
//! Everything here talks to the page through the ports in [`ports`], so the
//! request/cache logic runs the same against the in-memory [`Document`] used in
//! tests as against any real rendering surface.

pub mod document;
pub mod modal;
pub mod page;
pub mod ports;
pub mod recommendation;
pub mod source;
pub mod theme;
pub mod toast;

use std::time::Duration;

pub use document::{Document, ElementKind};
pub use modal::ModalController;
pub use page::Page;
pub use ports::{KeyValueStore, RecommendationCard, RecommendationSource, RenderPort};
pub use recommendation::{ClientPhase, RecommendationClient, RequestOutcome};
pub use source::HttpRecommendationSource;
pub use theme::{FileStore, MemoryStore, Theme, ThemeToggle};
pub use toast::ToastNotifier;

/// Element IDs the page is expected to provide
pub mod ids {
    pub const STATUS_REGION: &str = "toast";
    pub const RESULTS_REGION: &str = "recommendation-result";
    pub const RECOMMENDATION_MODAL: &str = "recommendation-modal";
    pub const RECOMMEND_TRIGGER: &str = "recommend-btn";
    pub const REFRESH_CONTROL: &str = "refresh-recommendation";
    pub const THEME_TOGGLE: &str = "theme-toggle";
}

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);

/// Errors surfaced by the client core
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Recommendation fetch failed: {0}")]
    FetchFailed(String),

    #[error("Render target not found: {0}")]
    MissingTarget(String),

    #[error("Preference storage error: {0}")]
    Storage(String),
}
