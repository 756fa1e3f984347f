use std::time::{Duration, Instant};

use super::{FilterField, FilterSettings};
use crate::element::CanvasElement;
use crate::id_generator::ElementId;
use crate::util::Debounce;

/// Two-stage filter editing for the selected image: `live` follows every
/// control change, the element only sees the value once edits settle.
#[derive(Debug, Clone)]
pub struct FilterEditor {
    target: Option<ElementId>,
    live: Option<FilterSettings>,
    commit: Debounce,
}

impl FilterEditor {
    pub fn new(delay: Duration) -> Self {
        Self {
            target: None,
            live: None,
            commit: Debounce::new(delay),
        }
    }

    pub fn target(&self) -> Option<&ElementId> {
        self.target.as_ref()
    }

    pub fn live(&self) -> Option<&FilterSettings> {
        self.live.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.commit.is_pending()
    }

    /// Sync with the current selection. Non-images detach the editor.
    pub fn load(&mut self, element: Option<&CanvasElement>) {
        self.commit.cancel();
        match element.and_then(|el| el.as_image().map(|img| (el, img))) {
            Some((el, img)) => {
                self.target = Some(el.id.clone());
                self.live = Some(img.filters.unwrap_or_default());
            }
            None => self.detach(),
        }
    }

    /// Drop the target and any pending commit
    pub fn detach(&mut self) {
        self.commit.cancel();
        self.target = None;
        self.live = None;
    }

    pub fn set_field(&mut self, field: FilterField, now: Instant) {
        let Some(live) = self.live.as_mut() else {
            log::debug!("Filter edit ignored, no image selected");
            return;
        };
        live.set(field);
        self.commit.schedule(now);
    }

    /// Back to neutral values, committed like any other edit
    pub fn reset(&mut self, now: Instant) {
        let Some(live) = self.live.as_mut() else { return };
        *live = FilterSettings::default();
        self.commit.schedule(now);
    }

    /// Commit a pending edit now instead of waiting for the quiet period
    pub fn flush(&mut self) -> Option<(ElementId, FilterSettings)> {
        if !self.commit.is_pending() {
            return None;
        }
        self.commit.cancel();
        Some((self.target.clone()?, self.live?))
    }

    /// The settled value to write into the element, once per burst of edits
    pub fn poll(&mut self, now: Instant) -> Option<(ElementId, FilterSettings)> {
        if !self.commit.fire_if_due(now) {
            return None;
        }
        let target = self.target.clone()?;
        let settings = self.live?;
        log::debug!("Committing filters for {}: {:?}", target, settings);
        Some((target, settings))
    }
}
