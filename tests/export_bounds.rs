use collage_engine::element::Raster;
use collage_engine::export::{content_bounds, export_filename, export_region, save_export};
use collage_engine::{CanvasSize, DecodedImage, EditorConfig, EditorContext, ElementId, ElementPatch, ExportMode};
use egui::{Rect, pos2, vec2};
use image::{Rgba, RgbaImage};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn context() -> EditorContext {
    EditorContext::with_canvas(CanvasSize::new(1080.0, 1080.0), EditorConfig::default())
}

fn place(ctx: &mut EditorContext, w: u32, h: u32, at: (f32, f32), rotation: f32) -> ElementId {
    let id = ctx.add_image(DecodedImage {
        name: "tile.png".to_owned(),
        raster: Raster::new(RgbaImage::from_pixel(w, h, Rgba([0, 128, 0, 255]))),
    });
    ctx.update_element(&id, ElementPatch::transform(vec2(1.0, 1.0), rotation).with_position(pos2(at.0, at.1)));
    id
}

#[test]
fn test_region_always_stays_on_the_canvas() {
    init();
    let canvas = Rect::from_min_size(pos2(0.0, 0.0), vec2(1080.0, 1080.0));
    for step in 0..40 {
        let mut ctx = context();
        let offset = -600.0 + step as f32 * 45.0;
        place(&mut ctx, 300, 200, (offset, 1080.0 - offset), step as f32 * 9.0);
        place(&mut ctx, 120, 400, (offset * 0.5, offset), 0.0);

        let region = export_region(ctx.document(), ExportMode::ContentBounds);
        assert!(canvas.contains_rect(region), "step {}: {:?}", step, region);
        assert!(region.width() > 0.0 && region.height() > 0.0);
    }
}

#[test]
fn test_content_box_is_the_union_of_images() {
    init();
    let mut ctx = context();
    place(&mut ctx, 100, 100, (100.0, 200.0), 0.0);
    place(&mut ctx, 50, 300, (600.0, 50.0), 0.0);
    ctx.add_text("labels do not count");

    let expected = Rect::from_min_max(pos2(100.0, 50.0), pos2(650.0, 350.0));
    assert_eq!(content_bounds(ctx.document()), Some(expected));
    assert_eq!(export_region(ctx.document(), ExportMode::ContentBounds), expected);
}

#[test]
fn test_off_canvas_content_falls_back_to_full_canvas() {
    init();
    let mut ctx = context();
    place(&mut ctx, 100, 100, (2000.0, 2000.0), 0.0);
    let full = Rect::from_min_size(pos2(0.0, 0.0), vec2(1080.0, 1080.0));
    assert_eq!(export_region(ctx.document(), ExportMode::ContentBounds), full);

    let empty = context();
    assert_eq!(export_region(empty.document(), ExportMode::ContentBounds), full);
}

#[test]
fn test_full_canvas_mode_ignores_content() {
    init();
    let mut ctx = context();
    place(&mut ctx, 10, 10, (500.0, 500.0), 0.0);
    let output = ctx.export(ExportMode::FullCanvas).unwrap();
    assert_eq!(output.region, Rect::from_min_size(pos2(0.0, 0.0), vec2(1080.0, 1080.0)));
    assert_eq!((output.width, output.height), (2160, 2160));
    assert!(output.filename.starts_with("collage-") && output.filename.ends_with(".png"));

    let decoded = image::load_from_memory(&output.png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (2160, 2160));
    assert_eq!(decoded.get_pixel(1010, 1010), &Rgba([0, 128, 0, 255]));
}

#[test]
fn test_export_hides_then_restores_the_selection() {
    init();
    let mut ctx = context();
    let id = place(&mut ctx, 100, 100, (100.0, 100.0), 0.0);
    assert_eq!(ctx.selection(), Some(&id));

    let output = ctx.export(ExportMode::ContentBounds).unwrap();
    let decoded = image::load_from_memory(&output.png).unwrap().to_rgba8();
    // No selection outline at the border
    assert_eq!(decoded.get_pixel(0, 0), &Rgba([0, 128, 0, 255]));
    assert_eq!(decoded.get_pixel(199, 199), &Rgba([0, 128, 0, 255]));
    assert_eq!(ctx.selection(), Some(&id));
}

#[test]
fn test_saved_export_lands_in_the_primary_directory() {
    init();
    let mut ctx = context();
    place(&mut ctx, 20, 20, (0.0, 0.0), 0.0);
    let output = ctx.export(ExportMode::ContentBounds).unwrap();

    let dir = std::env::temp_dir().join(format!("collage-export-{}", uuid::Uuid::new_v4()));
    let path = save_export(&output, &dir, &dir.join("fallback")).unwrap();
    assert_eq!(path, dir.join(&output.filename));
    assert_eq!(std::fs::read(&path).unwrap(), output.png);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn test_filename_carries_the_timestamp() {
    assert_eq!(export_filename(1_700_000_000_123), "collage-1700000000123.png");
}
