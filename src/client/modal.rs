use super::document::{Document, ElementKind};

/// Shows and hides overlay elements
#[derive(Debug, Clone)]
pub struct ModalController {
    document: Document,
}

impl ModalController {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// No-op if the element does not exist
    pub fn open(&self, id: &str) {
        if !self.document.set_visible(id, true) {
            tracing::debug!(id, "Cannot open missing modal");
        }
    }

    pub fn close(&self, id: &str) {
        if !self.document.set_visible(id, false) {
            tracing::debug!(id, "Cannot close missing modal");
        }
    }

    /// Document-wide click handler
    ///
    /// A click whose target is the modal element itself landed on the backdrop
    /// and closes it. Clicks on content inside the modal have a different target
    /// and leave it open. Returns true if a modal was closed.
    pub fn handle_click(&self, target_id: &str) -> bool {
        let is_shown_modal = self.document.kind(target_id) == Some(ElementKind::Modal)
            && self.document.is_visible(target_id);

        if is_shown_modal {
            self.close(target_id);
        }
        is_shown_modal
    }
}
