//! The editing session: owns the document and every piece of transient
//! state around it (selection, crop in progress, filter edits, gestures).
//!
//! The `EditorContext` is the only place where element mutations, state
//! transitions and the caches that depend on them are kept in step. UI
//! collaborators call its operations and read the document back.
//!
//! # State Management
//!
//! - `start_crop` moves `Idle -> Cropping`
//! - `apply_crop` / `cancel_crop` move `Cropping -> Idle`
//!
//! Switching grid template, starting a new composition and clearing the
//! canvas drop all transient state synchronously.
//!
//! # Example
//!
//! ```rust,no_run
//! use collage_engine::{CanvasSize, EditorConfig, EditorContext};
//!
//! let mut context = EditorContext::with_canvas(CanvasSize::new(1080.0, 1080.0), EditorConfig::default());
//! let caption = context.add_text("Summer");
//! assert_eq!(context.selection(), Some(&caption));
//! ```
use egui::{Pos2, Rect, vec2};
use image::RgbaImage;
use std::time::Instant;

use super::{DocumentSnapshot, EditorState, PersistenceResult};
use crate::config::EditorConfig;
use crate::crop::{self, TempCropData};
use crate::document::{CanvasSize, Document};
use crate::element::{ElementPatch, ImagePatch, KindPatch};
use crate::error::{CollageError, Result, TransitionError};
use crate::export::{ExportMode, ExportOutput, export_document};
use crate::filter::{FilterBackend, FilterCache, FilterEditor, FilterField, FilterSettings, ImageFilterBackend};
use crate::grid::{GridMode, TEMPLATES, cover_fit, find_closest_zone, free_template};
use crate::id_generator::ElementId;
use crate::loader::{DecodedImage, decode_batch, partition_decoded};
use crate::renderer::{Frame, RasterCompositor, RenderSurface};
use crate::transform::{self, GestureTransform, HandleTransform, MultiTouchGesture, ZOrderOp};

pub struct EditorContext {
    document: Document,
    config: EditorConfig,
    /// Currently selected element, if any
    selection: Option<ElementId>,
    state: EditorState,
    filter_editor: FilterEditor,
    filter_cache: FilterCache,
    gesture: MultiTouchGesture,
    backend: Box<dyn FilterBackend>,
}

impl Default for EditorContext {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorContext {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_canvas(CanvasSize::default(), config)
    }

    pub fn with_canvas(canvas: CanvasSize, config: EditorConfig) -> Self {
        Self {
            document: Document::with_config(canvas, &config),
            selection: None,
            state: EditorState::Idle,
            filter_editor: FilterEditor::new(config.filter_commit_delay()),
            filter_cache: FilterCache::new(config.filter_cache_capacity, config.filter_cache_delay()),
            gesture: MultiTouchGesture::new(config.snap),
            backend: Box::new(ImageFilterBackend),
            config,
        }
    }

    /// Swap the filter kernels used for rendering and baking
    pub fn with_backend(mut self, backend: impl FilterBackend + 'static) -> Self {
        self.backend = Box::new(backend);
        self.filter_cache.clear();
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn selection(&self) -> Option<&ElementId> {
        self.selection.as_ref()
    }

    /// Gets a reference to the current state.
    pub fn current_state(&self) -> &EditorState {
        &self.state
    }

    pub fn filter_cache(&self) -> &FilterCache {
        &self.filter_cache
    }

    pub fn gesture(&self) -> &MultiTouchGesture {
        &self.gesture
    }

    pub fn grid_mode(&self) -> GridMode {
        if self.document.grid().is_active() {
            GridMode::Grid
        } else {
            GridMode::Free
        }
    }

    fn transition_error(&self, to: &'static str) -> TransitionError {
        TransitionError::InvalidStateTransition {
            from: self.state.name(),
            to,
            state: format!("{:?}", self.state),
        }
    }

    /// Attempts to transition to a new state, validating the transition first.
    pub fn transition_to(&mut self, new_state: EditorState) -> std::result::Result<(), TransitionError> {
        if !self.state.can_transition_to(&new_state) {
            return Err(self.transition_error(new_state.name()));
        }
        log::debug!("State {} -> {}", self.state.name(), new_state.name());
        self.state = new_state;
        Ok(())
    }

    // Selection

    /// Select an element, or clear the selection with `None`. Unknown ids
    /// clear it too. Pending filter edits of the previous image are
    /// committed first; a crop on another element is cancelled.
    pub fn select(&mut self, id: Option<ElementId>) {
        let id = id.filter(|id| {
            let exists = self.document.contains(id);
            if !exists {
                log::debug!("Ignoring selection of missing element {}", id);
            }
            exists
        });
        if id == self.selection {
            return;
        }

        if self.state.is_cropping() && self.state.cropping_element() != id.as_ref() {
            log::info!("Selection changed during crop, cancelling it");
            self.abandon_crop();
        }
        self.flush_filters(Instant::now());
        self.gesture.cancel();

        self.selection = id;
        self.filter_editor
            .load(self.selection.as_ref().and_then(|id| self.document.element(id)));
    }

    /// Select the top-most element under `point`
    pub fn select_at(&mut self, point: Pos2) -> Option<ElementId> {
        let hit = self.document.hit_test(point).map(|e| e.id.clone());
        self.select(hit.clone());
        hit
    }

    // Element model

    pub fn add_image(&mut self, image: DecodedImage) -> ElementId {
        let id = self.document.add_image(image);
        self.select(Some(id.clone()));
        id
    }

    /// Add a batch of decoded images; the last one ends up selected
    pub fn add_images(&mut self, images: Vec<DecodedImage>) -> Vec<ElementId> {
        let ids = self.document.add_images(images);
        if let Some(last) = ids.last() {
            self.select(Some(last.clone()));
        }
        ids
    }

    /// Decode and add a batch of files. Files that fail to decode are
    /// returned as errors and do not affect the others.
    pub async fn import_files(&mut self, files: Vec<(String, Vec<u8>)>) -> (Vec<ElementId>, Vec<CollageError>) {
        let (decoded, failed) = partition_decoded(decode_batch(files).await);
        for err in &failed {
            log::warn!("Skipped file: {}", err);
        }
        let ids = if decoded.is_empty() {
            Vec::new()
        } else {
            self.add_images(decoded)
        };
        (ids, failed)
    }

    pub fn add_text(&mut self, text: &str) -> ElementId {
        let id = self.document.add_text(text);
        self.select(Some(id.clone()));
        id
    }

    pub fn add_emoji(&mut self, emoji: &str) -> ElementId {
        let id = self.document.add_emoji(emoji);
        self.select(Some(id.clone()));
        id
    }

    pub fn add_sticker(&mut self, sticker_id: &str) -> Result<ElementId> {
        let id = self.document.add_sticker(sticker_id)?;
        self.select(Some(id.clone()));
        Ok(id)
    }

    /// Shallow-merge a patch into an element. Image payload changes
    /// invalidate the element's filtered bitmap.
    pub fn update_element(&mut self, id: &ElementId, patch: ElementPatch) -> bool {
        let touches_image = matches!(patch.kind, Some(KindPatch::Image(_)));
        let updated = self.document.update_element(id, patch);
        if updated && touches_image {
            self.filter_cache.invalidate(id, Instant::now());
            if self.filter_editor.target() == Some(id) {
                self.filter_editor.load(self.document.element(id));
            }
        }
        updated
    }

    pub fn delete_element(&mut self, id: &ElementId) -> bool {
        if !self.document.contains(id) {
            log::debug!("Delete for missing element {}", id);
            return false;
        }
        if self.state.cropping_element() == Some(id) {
            self.state = EditorState::Idle;
            log::debug!("Crop abandoned, element {} deleted", id);
        }
        if self.gesture.target() == Some(id) {
            self.gesture.cancel();
        }
        if self.filter_editor.target() == Some(id) {
            self.filter_editor.detach();
        }
        self.filter_cache.forget(id);
        self.document.delete_element(id, &mut self.selection)
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.selection.clone() {
            Some(id) => self.delete_element(&id),
            None => false,
        }
    }

    pub fn clear_all(&mut self) {
        self.reset_transient();
        self.filter_cache.clear();
        self.document.clear_all(&mut self.selection);
    }

    /// Start over with an empty document of the given size
    pub fn new_composition(&mut self, canvas: CanvasSize) {
        log::info!("New composition {}x{}", canvas.width, canvas.height);
        self.reset_transient();
        self.filter_cache.clear();
        self.selection = None;
        self.document = Document::with_config(canvas, &self.config);
    }

    pub fn set_canvas_size(&mut self, canvas: CanvasSize) {
        self.document.set_canvas_size(canvas);
    }

    /// Drop crop, filter edits in progress, gestures and the selection
    fn reset_transient(&mut self) {
        if self.state.is_cropping() {
            self.abandon_crop();
        }
        self.state = EditorState::Idle;
        self.filter_editor.detach();
        self.gesture.cancel();
        self.selection = None;
    }

    // Transforms

    pub fn reorder(&mut self, op: ZOrderOp) -> bool {
        self.document.apply_z_order(self.selection.as_ref(), op)
    }

    /// Drag end. In grid mode a dropped image snaps into the zone nearest
    /// its centre when that zone is free.
    pub fn end_drag(&mut self, id: &ElementId, position: Pos2) -> bool {
        if self.is_cropping_element(id) {
            log::debug!("Drag ignored, {} is being cropped", id);
            return false;
        }
        if !transform::commit_move(&mut self.document, id, position) {
            return false;
        }
        if self.grid_mode() == GridMode::Grid {
            let center = self.document.element(id).filter(|e| e.is_image()).map(|e| e.center());
            if let Some(center) = center {
                self.snap_to_grid(id, center);
            }
        }
        true
    }

    pub fn end_handle_transform(&mut self, id: &ElementId, transform: HandleTransform) -> bool {
        if self.is_cropping_element(id) {
            log::debug!("Handle transform ignored, {} is being cropped", id);
            return false;
        }
        transform::commit_handle_transform(&mut self.document, id, transform, &self.config)
    }

    /// Contacts changed. Two contacts on the selected element start a
    /// pinch; dropping below two while one runs abandons it.
    pub fn touch_start(&mut self, touches: &[Pos2]) {
        if self.state.is_cropping() {
            return;
        }
        match self.selection.as_ref().and_then(|id| self.document.element(id)) {
            Some(element) => self.gesture.touch_start(touches, element),
            None => self.gesture.cancel(),
        }
    }

    /// Live gesture preview; nothing is committed until the gesture ends
    pub fn touch_move(&mut self, touches: &[Pos2]) -> Option<GestureTransform> {
        self.gesture.touch_move(touches)
    }

    /// A contact lifted. Commits the snapped gesture once when fewer than
    /// two contacts remain.
    pub fn touch_end(&mut self, remaining: usize) -> bool {
        match self.gesture.touch_end(remaining) {
            Some((id, _)) if self.is_cropping_element(&id) => false,
            Some((id, transform)) => self.document.update_element(&id, transform.to_patch()),
            None => false,
        }
    }

    // Crop

    /// Enter crop mode on the selected image. `Ok(false)` without a
    /// selection.
    pub fn start_crop(&mut self) -> Result<bool> {
        match self.selection.clone() {
            Some(id) => self.start_crop_on(&id),
            None => Ok(false),
        }
    }

    /// Enter crop mode on `id`. Missing elements are a no-op, non-images
    /// and a crop already in progress are errors.
    pub fn start_crop_on(&mut self, id: &ElementId) -> Result<bool> {
        if !self.state.is_idle() {
            return Err(self.transition_error("Cropping").into());
        }
        if !self.document.contains(id) {
            log::debug!("Crop requested for missing element {}", id);
            return Ok(false);
        }

        if self.selection.as_ref() != Some(id) {
            self.select(Some(id.clone()));
        }
        self.flush_filters(Instant::now());
        self.gesture.cancel();
        let crop = crop::start_crop(&mut self.document, id)?;
        self.filter_cache.bypass(id);
        self.transition_to(EditorState::Cropping {
            element_id: id.clone(),
            crop,
        })?;
        Ok(true)
    }

    fn is_cropping_element(&self, id: &ElementId) -> bool {
        self.state.cropping_element() == Some(id)
    }

    /// Cancel the running crop outside the normal flow, restoring the element
    fn abandon_crop(&mut self) {
        if let Err(err) = self.cancel_crop() {
            log::warn!("Could not cancel crop: {}", err);
        }
    }

    pub fn crop_data(&self) -> Option<&TempCropData> {
        self.state.crop_data()
    }

    /// Display bounds the crop rectangle is kept inside
    fn crop_bounds(&self) -> Option<Rect> {
        let id = self.state.cropping_element()?;
        self.document.element(id).map(crop::display_rect)
    }

    /// Drag the crop rectangle so its top-left lands on `min`
    pub fn move_crop(&mut self, min: Pos2) -> bool {
        let Some(bounds) = self.crop_bounds() else { return false };
        match self.state.crop_data_mut() {
            Some(data) => {
                data.move_to(min, bounds);
                true
            }
            None => false,
        }
    }

    /// Replace the crop rectangle after a handle resize
    pub fn resize_crop(&mut self, rect: Rect) -> bool {
        let Some(bounds) = self.crop_bounds() else { return false };
        let min_size = self.config.min_crop_size;
        match self.state.crop_data_mut() {
            Some(data) => {
                data.resize(rect, bounds, min_size);
                true
            }
            None => false,
        }
    }

    fn finish_crop(&mut self) -> std::result::Result<(ElementId, TempCropData), TransitionError> {
        let (element_id, crop) = match &self.state {
            EditorState::Cropping { element_id, crop } => (element_id.clone(), crop.clone()),
            EditorState::Idle => return Err(self.transition_error("Idle")),
        };
        self.transition_to(EditorState::Idle)?;
        Ok((element_id, crop))
    }

    /// Bake the crop into the image and return to idle
    pub fn apply_crop(&mut self) -> std::result::Result<bool, TransitionError> {
        let (id, data) = self.finish_crop()?;
        let applied = crop::apply_crop(&mut self.document, &id, &data, self.config.min_crop_size);
        self.filter_cache.restore(&id, Instant::now());
        Ok(applied)
    }

    /// Leave crop mode and put the element back exactly as it was
    pub fn cancel_crop(&mut self) -> std::result::Result<bool, TransitionError> {
        let (id, data) = self.finish_crop()?;
        let restored = crop::cancel_crop(&mut self.document, &id, &data);
        self.filter_cache.restore(&id, Instant::now());
        Ok(restored)
    }

    // Filters

    /// Filter values shown by the controls
    pub fn live_filters(&self) -> Option<&FilterSettings> {
        self.filter_editor.live()
    }

    pub fn filter_commit_pending(&self) -> bool {
        self.filter_editor.is_pending()
    }

    pub fn set_filter(&mut self, field: FilterField, now: Instant) {
        if self.state.is_cropping() {
            log::debug!("Filter edit ignored during crop");
            return;
        }
        self.filter_editor.set_field(field, now);
    }

    pub fn reset_filters(&mut self, now: Instant) {
        if self.state.is_cropping() {
            return;
        }
        self.filter_editor.reset(now);
    }

    /// Drive the timers: commit settled filter edits, then bake idle
    /// filtered bitmaps. Returns how many bitmaps were baked.
    pub fn tick(&mut self, now: Instant) -> usize {
        if let Some((id, settings)) = self.filter_editor.poll(now) {
            self.commit_filters(&id, settings, now);
        }
        self.filter_cache.poll(now, self.document.elements(), self.backend.as_ref())
    }

    fn flush_filters(&mut self, now: Instant) {
        if let Some((id, settings)) = self.filter_editor.flush() {
            self.commit_filters(&id, settings, now);
        }
    }

    fn commit_filters(&mut self, id: &ElementId, settings: FilterSettings, now: Instant) {
        let patch = ElementPatch::image(ImagePatch {
            filters: Some(Some(settings)),
            ..Default::default()
        });
        if self.document.update_element(id, patch) {
            log::info!("Filters committed for {}", id);
            self.filter_cache.invalidate(id, now);
        }
    }

    // Grid

    /// Switch between free placement and grid layout. Entering grid mode
    /// without a template picks the first grid template.
    pub fn set_grid_mode(&mut self, mode: GridMode) -> Result<()> {
        if mode == self.grid_mode() {
            return Ok(());
        }
        let template = match mode {
            GridMode::Free => free_template().id,
            GridMode::Grid => TEMPLATES
                .iter()
                .find(|t| !t.is_free())
                .map(|t| t.id)
                .ok_or_else(|| CollageError::UnknownTemplate("grid".to_owned()))?,
        };
        self.select_template(template).map(|_| ())
    }

    pub fn toggle_grid_mode(&mut self) -> Result<()> {
        match self.grid_mode() {
            GridMode::Free => self.set_grid_mode(GridMode::Grid),
            GridMode::Grid => self.set_grid_mode(GridMode::Free),
        }
    }

    /// Switch template. Assignments whose zone id does not exist in the new
    /// template are dropped and returned; refilling is up to the caller.
    pub fn select_template(&mut self, template_id: &str) -> Result<Vec<ElementId>> {
        self.flush_filters(Instant::now());
        let dropped = self.document.grid_mut().select_template(template_id)?;
        self.reset_transient();
        if !dropped.is_empty() {
            log::info!("Template switch released {} element(s)", dropped.len());
        }
        Ok(dropped)
    }

    /// Put an image into a zone, cover-fitting it and zeroing its rotation.
    /// The zone's previous occupant is released.
    pub fn assign_image_to_zone(&mut self, image_id: &ElementId, zone_id: &str) -> bool {
        let Some(base) = self
            .document
            .element(image_id)
            .filter(|e| e.is_image())
            .map(|e| e.base_size())
        else {
            log::debug!("Zone assignment needs an existing image, got {}", image_id);
            return false;
        };
        let canvas = self.document.canvas().to_vec2();
        let Some(zone_rect) = self.document.grid().zone(zone_id).map(|z| z.absolute_rect(canvas)) else {
            log::warn!("Unknown zone {}", zone_id);
            return false;
        };
        if base.x <= 0.0 || base.y <= 0.0 {
            return false;
        }

        if let Some(Some(displaced)) = self.document.grid_mut().assign(zone_id, image_id) {
            log::info!("Zone {} released {}", zone_id, displaced);
        }
        let (origin, scale) = cover_fit(zone_rect, base);
        log::info!("Assigned {} to zone {} at scale {:.3}", image_id, zone_id, scale);
        self.document.update_element(
            image_id,
            ElementPatch::transform(vec2(scale, scale), 0.0).with_position(origin),
        )
    }

    /// Drop-to-snap: assign to the zone nearest `point` when it is empty or
    /// already holds the image
    pub fn snap_to_grid(&mut self, image_id: &ElementId, point: Pos2) -> bool {
        let canvas = self.document.canvas().to_vec2();
        let Some(zone) = find_closest_zone(point, self.document.grid().zones(), canvas) else {
            return false;
        };
        if zone.element_id.as_ref().is_some_and(|occupant| occupant != image_id) {
            log::debug!("Nearest zone {} is taken", zone.id());
            return false;
        }
        let zone_id = zone.id();
        self.assign_image_to_zone(image_id, zone_id)
    }

    /// Fill empty zones, in template order, with images that hold no zone,
    /// in paint order. Returns how many were placed.
    pub fn auto_fill(&mut self) -> usize {
        let grid = self.document.grid();
        let images: Vec<ElementId> = self
            .document
            .paint_order()
            .into_iter()
            .filter(|e| e.is_image() && !grid.is_assigned(&e.id))
            .map(|e| e.id.clone())
            .collect();
        let empty: Vec<&'static str> = grid.zones().iter().filter(|z| z.is_empty()).map(|z| z.id()).collect();

        let mut placed = 0;
        for (zone_id, image_id) in empty.into_iter().zip(images) {
            if self.assign_image_to_zone(&image_id, zone_id) {
                placed += 1;
            }
        }
        log::info!("Auto-filled {} zone(s)", placed);
        placed
    }

    pub fn remove_from_zone(&mut self, zone_id: &str) -> Option<ElementId> {
        let removed = self.document.grid_mut().remove_from_zone(zone_id);
        if let Some(id) = &removed {
            log::debug!("Removed {} from zone {}", id, zone_id);
        }
        removed
    }

    pub fn clear_grid(&mut self) {
        log::info!("Clearing zone assignments");
        self.document.grid_mut().clear_assignments();
    }

    // Rendering and export

    /// Paint the whole canvas at 1:1 with the selection outline
    pub fn render(&mut self) -> Result<RgbaImage> {
        let mut compositor =
            RasterCompositor::new(&mut self.filter_cache, self.backend.as_ref(), self.config.background_color());
        compositor.capture(&Frame::full(&self.document, self.selection.as_ref()))
    }

    /// Flatten the composition into a PNG at the export pixel ratio
    pub fn export(&mut self, mode: ExportMode) -> Result<ExportOutput> {
        self.flush_filters(Instant::now());
        let mut compositor =
            RasterCompositor::new(&mut self.filter_cache, self.backend.as_ref(), self.config.background_color());
        export_document(
            &self.document,
            &mut self.selection,
            &mut compositor,
            mode,
            self.config.export_pixel_ratio,
        )
    }

    // Persistence

    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot::capture(&self.document)
    }

    pub fn restore_snapshot(&mut self, snapshot: DocumentSnapshot) -> PersistenceResult<()> {
        let document = snapshot.restore()?;
        self.reset_transient();
        self.filter_cache.clear();
        self.document = document;
        Ok(())
    }
}
