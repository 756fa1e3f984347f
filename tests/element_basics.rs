use collage_engine::element::{EmojiPatch, ImagePatch, KindPatch, Raster, TextPatch};
use collage_engine::{
    CanvasSize, DecodedImage, EditorConfig, EditorContext, Element, ElementKind, ElementPatch, ZOrderOp,
};
use egui::{pos2, vec2};
use image::RgbaImage;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn decoded(w: u32, h: u32) -> DecodedImage {
    DecodedImage {
        name: format!("{}x{}.jpg", w, h),
        raster: Raster::new(RgbaImage::new(w, h)),
    }
}

fn context(w: f32, h: f32) -> EditorContext {
    EditorContext::with_canvas(CanvasSize::new(w, h), EditorConfig::default())
}

#[test]
fn test_add_select_delete_scenario() {
    init();
    let mut ctx = context(1080.0, 1080.0);
    let id = ctx.add_image(decoded(800, 600));

    let element = ctx.document().element(&id).unwrap();
    let expected = (1080.0_f32 / 3.0 / 800.0).min(1080.0 / 3.0 / 600.0);
    assert!((element.scale_x - 0.45).abs() < 1e-6);
    assert_eq!(element.scale_x, expected);
    assert_eq!(element.scale_y, expected);
    // Centred, no jitter for a single image
    assert_eq!(element.x, (1080.0 - 800.0 * expected) / 2.0);
    assert_eq!(element.y, (1080.0 - 600.0 * expected) / 2.0);
    assert_eq!(element.z_index, 1);

    ctx.select(Some(id.clone()));
    assert_eq!(ctx.selection(), Some(&id));
    assert!(ctx.delete_element(&id));
    assert!(ctx.document().is_empty());
    assert!(ctx.selection().is_none());
}

#[test]
fn test_new_elements_paint_above_everything() {
    init();
    let mut ctx = context(800.0, 600.0);
    let text = ctx.add_text("hello");
    ctx.update_element(&text, ElementPatch::z_index(40));
    let emoji = ctx.add_emoji("🌈");
    assert_eq!(ctx.document().element(&emoji).unwrap().z_index, 41);

    let sticker = ctx.add_sticker("hearts-1").unwrap();
    assert_eq!(ctx.document().element(&sticker).unwrap().z_index, 42);
    assert!(ctx.add_sticker("missing").is_err());
}

#[test]
fn test_update_never_crosses_variants() {
    init();
    let mut ctx = context(800.0, 600.0);
    let text = ctx.add_text("hello");

    let wrong = ElementPatch {
        x: Some(1.0),
        kind: Some(KindPatch::Emoji(EmojiPatch {
            emoji: Some("🔥".to_owned()),
            ..Default::default()
        })),
        ..Default::default()
    };
    assert!(!ctx.update_element(&text, wrong));
    let element = ctx.document().element(&text).unwrap();
    assert_eq!(element.element_type(), "text");
    assert_ne!(element.x, 1.0);

    let right = ElementPatch {
        kind: Some(KindPatch::Text(TextPatch {
            text: Some("bye".to_owned()),
            ..Default::default()
        })),
        ..Default::default()
    };
    assert!(ctx.update_element(&text, right));
    assert!(matches!(&ctx.document().element(&text).unwrap().kind, ElementKind::Text(t) if t.text == "bye"));
}

#[test]
fn test_crop_written_through_update_stays_inside_source() {
    init();
    let mut ctx = context(800.0, 600.0);
    let id = ctx.add_image(decoded(100, 80));
    let patch = ElementPatch::image(ImagePatch {
        crop: Some(Some(collage_engine::element::CropRect {
            x: 60.0,
            y: 50.0,
            width: 100.0,
            height: 100.0,
        })),
        ..Default::default()
    });
    assert!(ctx.update_element(&id, patch));
    let crop = ctx.document().element(&id).unwrap().as_image().unwrap().crop.unwrap();
    assert_eq!((crop.x, crop.y, crop.width, crop.height), (60.0, 50.0, 40.0, 30.0));
}

#[test]
fn test_hit_test_follows_rotation_and_z_order() {
    init();
    let mut ctx = context(800.0, 800.0);
    let below = ctx.add_image(decoded(100, 100));
    let above = ctx.add_image(decoded(100, 100));
    for id in [&below, &above] {
        ctx.update_element(id, ElementPatch::transform(vec2(1.0, 1.0), 0.0).with_position(pos2(100.0, 100.0)));
    }

    assert_eq!(ctx.select_at(pos2(150.0, 150.0)), Some(above.clone()));
    ctx.reorder(ZOrderOp::SendToBack);
    assert_eq!(ctx.select_at(pos2(150.0, 150.0)), Some(below.clone()));

    // Rotated 90 degrees about its top-left the box now spans x in [0, 100]
    ctx.update_element(&below, ElementPatch::transform(vec2(1.0, 1.0), 90.0));
    assert_eq!(ctx.select_at(pos2(50.0, 150.0)), Some(below));
    assert_eq!(ctx.select_at(pos2(700.0, 700.0)), None);
    assert!(ctx.selection().is_none());
}

#[test]
fn test_unknown_ids_are_no_ops() {
    init();
    let mut ctx = context(800.0, 600.0);
    let ghost = collage_engine::ElementId::from("ghost");
    assert!(!ctx.update_element(&ghost, ElementPatch::position(pos2(1.0, 1.0))));
    assert!(!ctx.delete_element(&ghost));
    assert!(!ctx.end_drag(&ghost, pos2(3.0, 3.0)));
    assert!(!ctx.start_crop_on(&ghost).unwrap());
    ctx.select(Some(ghost));
    assert!(ctx.selection().is_none());
}

#[test]
fn test_element_json_is_tagged_by_type() {
    init();
    let mut ctx = context(800.0, 600.0);
    let id = ctx.add_emoji("🎈");
    let json = serde_json::to_value(ctx.document().element(&id).unwrap()).unwrap();
    assert_eq!(json["type"], "emoji");
    assert_eq!(json["fontSize"], 64.0);
    assert_eq!(json["zIndex"], 1);
    assert_eq!(json["scaleX"], 1.0);
}
