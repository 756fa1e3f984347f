use image::RgbaImage;
use std::borrow::Cow;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::{FilterBackend, active_stack};
use crate::element::{CanvasElement, ImageContent};
use crate::id_generator::ElementId;
use crate::util::Debounce;

/// Deferred cache of filtered bitmaps.
///
/// A filter change drops the element's baked bitmap and renders uncached;
/// once no further change arrives within the bake delay the filtered result
/// is stored and reused until the next change.
pub struct FilterCache {
    /// Baked bitmaps by (element_id, version)
    baked: HashMap<(ElementId, u64), RgbaImage>,
    /// Tracks when each bitmap was last used
    last_used: HashMap<(ElementId, u64), u64>,
    versions: HashMap<ElementId, u64>,
    pending: HashMap<ElementId, Debounce>,
    /// Element currently being cropped, rendered without filters
    bypassed: Option<ElementId>,
    bake_delay: Duration,
    current_frame: u64,
    max_cache_size: usize,
}

impl FilterCache {
    pub fn new(max_cache_size: usize, bake_delay: Duration) -> Self {
        Self {
            baked: HashMap::new(),
            last_used: HashMap::new(),
            versions: HashMap::new(),
            pending: HashMap::new(),
            bypassed: None,
            bake_delay,
            current_frame: 0,
            max_cache_size,
        }
    }

    /// Increments the frame counter, should be called once per paint
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    pub fn version(&self, id: &ElementId) -> u64 {
        self.versions.get(id).copied().unwrap_or(0)
    }

    pub fn is_baked(&self, id: &ElementId) -> bool {
        self.baked.contains_key(&(id.clone(), self.version(id)))
    }

    pub fn is_bake_pending(&self, id: &ElementId) -> bool {
        self.pending.get(id).is_some_and(Debounce::is_pending)
    }

    pub fn is_bypassed(&self, id: &ElementId) -> bool {
        self.bypassed.as_ref() == Some(id)
    }

    /// A filter record changed: clear the old bitmap and restart the bake timer
    pub fn invalidate(&mut self, id: &ElementId, now: Instant) {
        *self.versions.entry(id.clone()).or_insert(0) += 1;
        self.evict_element(id);
        if self.is_bypassed(id) {
            return;
        }
        let delay = self.bake_delay;
        self.pending
            .entry(id.clone())
            .or_insert_with(|| Debounce::new(delay))
            .schedule(now);
    }

    /// Render `id` unfiltered until [`FilterCache::restore`]
    pub fn bypass(&mut self, id: &ElementId) {
        log::debug!("Filter cache bypassed for {}", id);
        self.evict_element(id);
        if let Some(timer) = self.pending.get_mut(id) {
            timer.cancel();
        }
        self.bypassed = Some(id.clone());
    }

    pub fn restore(&mut self, id: &ElementId, now: Instant) {
        if self.is_bypassed(id) {
            self.bypassed = None;
        }
        self.invalidate(id, now);
    }

    /// Drop all state for an element that left the document
    pub fn forget(&mut self, id: &ElementId) {
        self.evict_element(id);
        self.versions.remove(id);
        self.pending.remove(id);
        if self.is_bypassed(id) {
            self.bypassed = None;
        }
    }

    /// Bake every element whose idle window has elapsed. Returns how many were baked.
    pub fn poll(&mut self, now: Instant, elements: &[CanvasElement], backend: &dyn FilterBackend) -> usize {
        let due: Vec<ElementId> = self
            .pending
            .iter_mut()
            .filter_map(|(id, timer)| timer.fire_if_due(now).then(|| id.clone()))
            .collect();

        let mut baked = 0;
        for id in due {
            let Some(content) = elements.iter().find(|e| e.id == id).and_then(CanvasElement::as_image) else {
                continue;
            };
            let stack = active_stack(content.filters.as_ref());
            if stack.is_empty() {
                continue;
            }
            let image = backend.apply(content.raster.image(), &stack);
            self.store(&id, image);
            baked += 1;
        }
        baked
    }

    /// Bitmap to paint for an image element: source when bypassed or
    /// unfiltered, the baked bitmap when current, otherwise filtered on the spot
    pub fn render<'a>(
        &'a mut self,
        id: &ElementId,
        content: &'a ImageContent,
        backend: &dyn FilterBackend,
    ) -> Cow<'a, RgbaImage> {
        if self.is_bypassed(id) {
            return Cow::Borrowed(content.raster.image());
        }
        let stack = active_stack(content.filters.as_ref());
        if stack.is_empty() {
            return Cow::Borrowed(content.raster.image());
        }

        let key = (id.clone(), self.version(id));
        if self.baked.contains_key(&key) {
            self.last_used.insert(key.clone(), self.current_frame);
            if let Some(image) = self.baked.get(&key) {
                return Cow::Borrowed(image);
            }
        }
        Cow::Owned(backend.apply(content.raster.image(), &stack))
    }

    fn store(&mut self, id: &ElementId, image: RgbaImage) {
        let key = (id.clone(), self.version(id));
        self.baked.insert(key.clone(), image);
        self.last_used.insert(key, self.current_frame);
        self.prune_cache_if_needed();
    }

    fn evict_element(&mut self, id: &ElementId) {
        self.baked.retain(|(element_id, _), _| element_id != id);
        self.last_used.retain(|(element_id, _), _| element_id != id);
    }

    /// Prunes the cache if it exceeds the maximum size
    fn prune_cache_if_needed(&mut self) {
        if self.baked.len() <= self.max_cache_size {
            return;
        }

        let mut entries: Vec<((ElementId, u64), u64)> =
            self.last_used.iter().map(|(k, v)| (k.clone(), *v)).collect();

        // Oldest first
        entries.sort_by_key(|(_, frame)| *frame);

        let to_remove = entries.len().saturating_sub(self.max_cache_size);
        for (key, _) in entries.into_iter().take(to_remove) {
            self.baked.remove(&key);
            self.last_used.remove(&key);
        }
    }

    pub fn clear(&mut self) {
        self.baked.clear();
        self.last_used.clear();
        self.versions.clear();
        self.pending.clear();
        self.bypassed = None;
    }

    pub fn cache_size(&self) -> usize {
        self.baked.len()
    }
}
