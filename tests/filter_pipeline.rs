use collage_engine::element::{ImagePatch, Raster};
use collage_engine::filter::{FilterBackend, ImageFilterBackend, active_stack};
use collage_engine::renderer::{Frame, pixel_center, sample};
use collage_engine::{
    CanvasSize, DecodedImage, EditorConfig, EditorContext, ElementId, ElementPatch, FilterField, FilterSettings,
};
use egui::{pos2, vec2};
use image::{Rgba, RgbaImage};
use std::time::{Duration, Instant};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const RED: Rgba<u8> = Rgba([200, 40, 40, 255]);

/// A flat red image covering the middle of a 400x400 canvas, left selected
fn setup() -> (EditorContext, ElementId) {
    let mut ctx = EditorContext::with_canvas(CanvasSize::new(400.0, 400.0), EditorConfig::default());
    let id = ctx.add_image(DecodedImage {
        name: "red.png".to_owned(),
        raster: Raster::new(RgbaImage::from_pixel(200, 200, RED)),
    });
    ctx.update_element(&id, ElementPatch::transform(vec2(1.0, 1.0), 0.0).with_position(pos2(100.0, 100.0)));
    (ctx, id)
}

fn filters(ctx: &EditorContext, id: &ElementId) -> Option<FilterSettings> {
    ctx.document().element(id).unwrap().as_image().unwrap().filters
}

fn centre_pixel(ctx: &mut EditorContext) -> Rgba<u8> {
    let selection = ctx.selection().cloned();
    ctx.select(None);
    let bitmap = ctx.render().unwrap();
    let pixel = sample(&bitmap, &Frame::full(ctx.document(), None), pixel_center(200.0, 200.0)).unwrap();
    ctx.select(selection);
    pixel
}

fn ms(start: Instant, millis: u64) -> Instant {
    start + Duration::from_millis(millis)
}

#[test]
fn test_neutral_filters_render_like_no_filters() {
    init();
    let (mut ctx, id) = setup();
    assert!(active_stack(None).is_empty());
    assert!(active_stack(Some(&FilterSettings::default())).is_empty());

    let untouched = centre_pixel(&mut ctx);
    ctx.update_element(
        &id,
        ElementPatch::image(ImagePatch {
            filters: Some(Some(FilterSettings::default())),
            ..Default::default()
        }),
    );
    assert_eq!(centre_pixel(&mut ctx), untouched);
    assert_eq!(untouched, RED);
}

#[test]
fn test_live_edits_commit_once_they_settle() {
    init();
    let (mut ctx, id) = setup();
    let start = Instant::now();

    ctx.set_filter(FilterField::Brightness(130.0), ms(start, 0));
    ctx.set_filter(FilterField::Grayscale(true), ms(start, 200));
    assert_eq!(ctx.live_filters().unwrap().brightness, 130.0);
    assert!(ctx.live_filters().unwrap().grayscale);

    // The first edit's window has passed but the second restarted it
    ctx.tick(ms(start, 350));
    assert!(filters(&ctx, &id).is_none());
    assert!(ctx.filter_commit_pending());

    ctx.tick(ms(start, 500));
    let committed = filters(&ctx, &id).unwrap();
    assert_eq!(committed.brightness, 130.0);
    assert!(committed.grayscale);
    assert!(!ctx.filter_commit_pending());
}

#[test]
fn test_cache_bakes_after_the_idle_window() {
    init();
    let (mut ctx, id) = setup();
    let start = Instant::now();

    ctx.set_filter(FilterField::Sepia(true), start);
    ctx.tick(ms(start, 300));
    assert!(filters(&ctx, &id).unwrap().sepia);
    assert!(ctx.filter_cache().is_bake_pending(&id));
    assert!(!ctx.filter_cache().is_baked(&id));

    assert_eq!(ctx.tick(ms(start, 900)), 0);
    assert_eq!(ctx.tick(ms(start, 1100)), 1);
    assert!(ctx.filter_cache().is_baked(&id));
    assert_eq!(ctx.filter_cache().cache_size(), 1);

    // A new edit throws the baked bitmap away
    ctx.set_filter(FilterField::Sepia(false), ms(start, 1200));
    ctx.tick(ms(start, 1500));
    assert!(!ctx.filter_cache().is_baked(&id));
}

#[test]
fn test_grayscale_render_equalises_channels() {
    init();
    let (mut ctx, id) = setup();
    let start = Instant::now();
    ctx.set_filter(FilterField::Grayscale(true), start);
    ctx.tick(ms(start, 300));

    let uncached = centre_pixel(&mut ctx);
    assert_eq!(uncached[0], uncached[1]);
    assert_eq!(uncached[1], uncached[2]);
    assert_ne!(uncached, RED);

    ctx.tick(ms(start, 1100));
    assert!(ctx.filter_cache().is_baked(&id));
    assert_eq!(centre_pixel(&mut ctx), uncached);
}

#[test]
fn test_reset_goes_through_the_same_debounce() {
    init();
    let (mut ctx, id) = setup();
    let start = Instant::now();
    ctx.set_filter(FilterField::Contrast(160.0), start);
    ctx.tick(ms(start, 300));
    assert_ne!(centre_pixel(&mut ctx), RED);

    ctx.reset_filters(ms(start, 400));
    assert_eq!(ctx.live_filters(), Some(&FilterSettings::default()));
    assert_eq!(filters(&ctx, &id).unwrap().contrast, 160.0);

    ctx.tick(ms(start, 700));
    assert!(filters(&ctx, &id).unwrap().is_neutral());
    assert_eq!(centre_pixel(&mut ctx), RED);
}

#[test]
fn test_edits_without_an_image_selection_are_ignored() {
    init();
    let (mut ctx, id) = setup();
    let text = ctx.add_text("caption");
    assert_eq!(ctx.selection(), Some(&text));
    assert!(ctx.live_filters().is_none());

    let start = Instant::now();
    ctx.set_filter(FilterField::Blur(4.0), start);
    ctx.tick(ms(start, 1000));
    assert!(filters(&ctx, &id).is_none());
}

#[test]
fn test_blur_keeps_a_flat_image_flat() {
    init();
    let source = RgbaImage::from_pixel(32, 32, RED);
    let mut settings = FilterSettings::default();
    settings.set(FilterField::Blur(2.0));
    let blurred = ImageFilterBackend.apply(&source, &active_stack(Some(&settings)));
    assert_eq!(blurred.dimensions(), (32, 32));
    let centre = blurred.get_pixel(16, 16);
    for channel in 0..3 {
        assert!((i32::from(centre[channel]) - i32::from(RED[channel])).abs() <= 1);
    }
}
