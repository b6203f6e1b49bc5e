use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

use super::document::Document;

/// Transient status messages in a single region
///
/// A new toast replaces the visible one immediately; there is no queue. Each
/// toast arms its own hide timer, and a timer only hides the region if no newer
/// toast was shown in the meantime, so a short toast shown over a long one is
/// never cut off by the older timer.
#[derive(Debug, Clone)]
pub struct ToastNotifier {
    document: Document,
    region_id: String,
    generation: Arc<AtomicU64>,
}

impl ToastNotifier {
    pub fn new(document: Document, region_id: &str) -> Self {
        Self {
            document,
            region_id: region_id.to_string(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Shows `message` for `duration`; no-op if the page has no status region
    pub fn notify(&self, message: &str, duration: Duration) {
        if !self.document.contains(&self.region_id) {
            return;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.document.set_text(&self.region_id, message);
        self.document.set_visible(&self.region_id, true);

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime, toast will stay visible");
            return;
        };

        let toasts = self.clone();
        runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            toasts.expire(generation);
        });
    }

    fn expire(&self, generation: u64) {
        if self.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        self.document.set_visible(&self.region_id, false);
        self.document.set_text(&self.region_id, "");
    }

    pub fn is_visible(&self) -> bool {
        self.document.is_visible(&self.region_id)
    }

    /// Text currently shown, if any
    pub fn message(&self) -> Option<String> {
        if !self.is_visible() {
            return None;
        }
        self.document.text(&self.region_id)
    }
}
