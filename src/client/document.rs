use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{ids, ports::RecommendationCard};

/// What an element is, which decides how clicks and toggles treat it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Plain region holding text or a card
    Region,
    /// Overlay closed by clicking its backdrop
    Modal,
    /// Checkbox-like control
    Toggle,
    /// Button
    Control,
}

#[derive(Debug, Clone)]
struct Element {
    kind: ElementKind,
    visible: bool,
    text: String,
    card: Option<RecommendationCard>,
    checked: bool,
}

impl Element {
    fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            // Modals start hidden
            visible: !matches!(kind, ElementKind::Modal),
            text: String::new(),
            card: None,
            checked: false,
        }
    }
}

#[derive(Debug, Default)]
struct DocumentInner {
    elements: HashMap<String, Element>,
    root_classes: BTreeSet<String>,
}

/// In-memory rendering surface keyed by element ID
///
/// Cloning gives another handle to the same document, which is how the toast
/// timers and the controllers share it.
#[derive(Debug, Clone, Default)]
pub struct Document {
    inner: Arc<Mutex<DocumentInner>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// The library page: status region, results region, recommendation modal,
    /// trigger, and theme toggle
    pub fn library_page() -> Self {
        let document = Self::new();
        document.insert(ids::STATUS_REGION, ElementKind::Region);
        document.set_visible(ids::STATUS_REGION, false);
        document.insert(ids::RESULTS_REGION, ElementKind::Region);
        document.insert(ids::RECOMMENDATION_MODAL, ElementKind::Modal);
        document.insert(ids::RECOMMEND_TRIGGER, ElementKind::Control);
        document.insert(ids::THEME_TOGGLE, ElementKind::Toggle);
        document
    }

    fn lock(&self) -> MutexGuard<'_, DocumentInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds (or replaces) an element
    pub fn insert(&self, id: &str, kind: ElementKind) {
        self.lock().elements.insert(id.to_string(), Element::new(kind));
    }

    pub fn remove(&self, id: &str) {
        self.lock().elements.remove(id);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().elements.contains_key(id)
    }

    pub fn kind(&self, id: &str) -> Option<ElementKind> {
        self.lock().elements.get(id).map(|e| e.kind)
    }

    /// Returns false when the element does not exist
    pub fn set_visible(&self, id: &str, visible: bool) -> bool {
        match self.lock().elements.get_mut(id) {
            Some(element) => {
                element.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.lock().elements.get(id).is_some_and(|e| e.visible)
    }

    pub fn set_text(&self, id: &str, text: &str) -> bool {
        match self.lock().elements.get_mut(id) {
            Some(element) => {
                element.text = text.to_string();
                true
            }
            None => false,
        }
    }

    pub fn text(&self, id: &str) -> Option<String> {
        self.lock().elements.get(id).map(|e| e.text.clone())
    }

    /// Replaces the element's contents with a card
    pub fn set_card(&self, id: &str, card: RecommendationCard) -> bool {
        match self.lock().elements.get_mut(id) {
            Some(element) => {
                element.text.clear();
                element.card = Some(card);
                true
            }
            None => false,
        }
    }

    pub fn card(&self, id: &str) -> Option<RecommendationCard> {
        self.lock().elements.get(id).and_then(|e| e.card.clone())
    }

    pub fn set_checked(&self, id: &str, checked: bool) -> bool {
        match self.lock().elements.get_mut(id) {
            Some(element) => {
                element.checked = checked;
                true
            }
            None => false,
        }
    }

    pub fn is_checked(&self, id: &str) -> bool {
        self.lock().elements.get(id).is_some_and(|e| e.checked)
    }

    pub fn add_root_class(&self, class: &str) {
        self.lock().root_classes.insert(class.to_string());
    }

    pub fn remove_root_class(&self, class: &str) {
        self.lock().root_classes.remove(class);
    }

    pub fn root_has_class(&self, class: &str) -> bool {
        self.lock().root_classes.contains(class)
    }
}
