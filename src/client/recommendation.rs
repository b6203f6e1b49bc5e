use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::models::Recommendation;

use super::{
    ids,
    ports::{RecommendationCard, RecommendationSource, RenderPort},
    DEFAULT_TOAST_DURATION,
};

pub const WAIT_MESSAGE: &str = "Please wait, a recommendation is already on its way...";
pub const FETCHING_MESSAGE: &str = "Fetching a recommendation...";
pub const FAILED_MESSAGE: &str = "Could not fetch a recommendation. Please try again.";

/// Where the client is in its request cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientPhase {
    /// Nothing cached, nothing in flight
    Idle,
    /// A fetch is outstanding
    Loading,
    /// A recommendation is cached
    Ready,
}

/// What one trigger did
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// Another fetch was in flight; only a toast was shown
    Rejected,
    /// The cached recommendation was rendered without a fetch
    ServedFromCache(Recommendation),
    /// A fetch succeeded, was cached, and rendered
    Fetched(Recommendation),
    /// The fetch failed; the cache stays empty
    Failed,
}

/// Per-page state of the recommendation client
///
/// The cache slot and the in-flight flag are tracked independently.
#[derive(Debug, Default)]
struct RecommendationState {
    in_flight: bool,
    cache: Option<Recommendation>,
    refresh_armed: bool,
}

enum NextStep {
    Reject,
    Serve(Recommendation),
    Fetch,
}

/// Resets the in-flight flag on every exit from a fetch, including panics and
/// the request future being dropped mid-flight
struct InFlightGuard<'a> {
    state: &'a Mutex<RecommendationState>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .in_flight = false;
    }
}

/// Single-flight, cached recommendation fetching for one page session
///
/// At most one fetch is outstanding at a time: the in-flight flag is set before
/// the only await point and cleared after it, and a trigger that finds it set is
/// turned away with a toast. A successful result is cached until the user asks
/// for a refresh; there is no expiry.
pub struct RecommendationClient<S, P> {
    source: S,
    port: P,
    state: Mutex<RecommendationState>,
    toast_duration: Duration,
}

impl<S, P> RecommendationClient<S, P>
where
    S: RecommendationSource,
    P: RenderPort,
{
    pub fn new(source: S, port: P) -> Self {
        Self {
            source,
            port,
            state: Mutex::new(RecommendationState::default()),
            toast_duration: DEFAULT_TOAST_DURATION,
        }
    }

    fn lock(&self) -> MutexGuard<'_, RecommendationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn phase(&self) -> ClientPhase {
        let state = self.lock();
        if state.in_flight {
            ClientPhase::Loading
        } else if state.cache.is_some() {
            ClientPhase::Ready
        } else {
            ClientPhase::Idle
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.lock().in_flight
    }

    pub fn cached(&self) -> Option<Recommendation> {
        self.lock().cache.clone()
    }

    /// Whether a rendered card currently offers the refresh control
    pub fn refresh_armed(&self) -> bool {
        self.lock().refresh_armed
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    /// Entry point for the recommend trigger
    pub async fn request_recommendation(&self) -> RequestOutcome {
        let next = {
            let mut state = self.lock();
            if state.in_flight {
                NextStep::Reject
            } else if let Some(rec) = &state.cache {
                NextStep::Serve(rec.clone())
            } else {
                state.in_flight = true;
                NextStep::Fetch
            }
        };

        match next {
            NextStep::Reject => {
                tracing::debug!("Recommendation request rejected, fetch already in flight");
                self.port.show_toast(WAIT_MESSAGE, self.toast_duration);
                RequestOutcome::Rejected
            }
            NextStep::Serve(rec) => {
                self.render(&rec);
                RequestOutcome::ServedFromCache(rec)
            }
            NextStep::Fetch => self.fetch_and_render().await,
        }
    }

    async fn fetch_and_render(&self) -> RequestOutcome {
        let _guard = InFlightGuard { state: &self.state };

        self.port.show_toast(FETCHING_MESSAGE, self.toast_duration);

        match self.source.fetch().await {
            Ok(rec) => {
                self.lock().cache = Some(rec.clone());
                tracing::info!(title = %rec.title, "Recommendation fetched");
                self.render(&rec);
                RequestOutcome::Fetched(rec)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Recommendation fetch failed");
                self.port.show_toast(FAILED_MESSAGE, self.toast_duration);
                RequestOutcome::Failed
            }
        }
    }

    /// Shows the card, opens the modal, and arms the refresh control
    ///
    /// Without a results region there is nothing to show or refresh from, so the
    /// whole step is skipped.
    pub fn render(&self, rec: &Recommendation) {
        let card = RecommendationCard::from(rec);
        if let Err(e) = self.port.show_card(&card) {
            tracing::debug!(error = %e, "Skipping recommendation render");
            return;
        }

        self.port.set_visible(ids::RECOMMENDATION_MODAL, true);

        // Arming is a flag, so re-rendering never stacks refresh handlers
        self.lock().refresh_armed = true;
    }

    /// Drops the cached recommendation, closes the modal, and fetches again
    ///
    /// While a fetch is in flight this behaves like a rejected trigger and leaves
    /// the cache alone.
    pub async fn refresh(&self) -> RequestOutcome {
        let cleared = {
            let mut state = self.lock();
            if state.in_flight {
                false
            } else {
                state.cache = None;
                state.refresh_armed = false;
                true
            }
        };

        if cleared {
            self.port.set_visible(ids::RECOMMENDATION_MODAL, false);
        }

        self.request_recommendation().await
    }

    /// Delegated click handler for the client's controls
    ///
    /// The refresh control only responds once per render; a second click before
    /// the next card is drawn is ignored. Returns `None` for unrelated targets.
    pub async fn handle_click(&self, target_id: &str) -> Option<RequestOutcome> {
        match target_id {
            ids::RECOMMEND_TRIGGER => Some(self.request_recommendation().await),
            ids::REFRESH_CONTROL => {
                let armed = std::mem::take(&mut self.lock().refresh_armed);
                if armed {
                    Some(self.refresh().await)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}
