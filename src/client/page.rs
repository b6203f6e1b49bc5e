use std::time::Duration;

use super::{
    document::Document,
    ids,
    modal::ModalController,
    ports::{RecommendationCard, RenderPort},
    toast::ToastNotifier,
    ClientError,
};

/// Render port backed by a [`Document`]
#[derive(Debug, Clone)]
pub struct Page {
    document: Document,
    toasts: ToastNotifier,
    modals: ModalController,
}

impl Page {
    pub fn new(document: Document) -> Self {
        Self {
            toasts: ToastNotifier::new(document.clone(), ids::STATUS_REGION),
            modals: ModalController::new(document.clone()),
            document,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn toasts(&self) -> &ToastNotifier {
        &self.toasts
    }

    pub fn modals(&self) -> &ModalController {
        &self.modals
    }
}

impl RenderPort for Page {
    fn show_card(&self, card: &RecommendationCard) -> Result<(), ClientError> {
        if self.document.set_card(ids::RESULTS_REGION, card.clone()) {
            Ok(())
        } else {
            Err(ClientError::MissingTarget(ids::RESULTS_REGION.to_string()))
        }
    }

    fn set_visible(&self, id: &str, visible: bool) {
        if visible {
            self.modals.open(id);
        } else {
            self.modals.close(id);
        }
    }

    fn show_toast(&self, message: &str, duration: Duration) {
        self.toasts.notify(message, duration);
    }
}
