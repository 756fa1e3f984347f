use collage_engine::element::Raster;
use collage_engine::transform::snap_rotation;
use collage_engine::{
    CanvasSize, DecodedImage, EditorConfig, EditorContext, ElementId, ElementPatch, HandleTransform, ZOrderOp,
};
use egui::{pos2, vec2};
use image::RgbaImage;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn context() -> EditorContext {
    EditorContext::with_canvas(CanvasSize::new(800.0, 800.0), EditorConfig::default())
}

fn z(ctx: &EditorContext, id: &ElementId) -> i64 {
    ctx.document().element(id).unwrap().z_index
}

fn image(ctx: &mut EditorContext) -> ElementId {
    let id = ctx.add_image(DecodedImage {
        name: "square.png".to_owned(),
        raster: Raster::new(RgbaImage::new(100, 100)),
    });
    ctx.update_element(&id, ElementPatch::transform(vec2(1.0, 1.0), 0.0).with_position(pos2(200.0, 200.0)));
    id
}

#[test]
fn test_front_and_back_leave_others_alone() {
    init();
    let mut ctx = context();
    let a = ctx.add_text("a");
    let b = ctx.add_text("b");
    let c = ctx.add_text("c");
    assert_eq!((z(&ctx, &a), z(&ctx, &b), z(&ctx, &c)), (1, 2, 3));

    ctx.select(Some(a.clone()));
    assert!(ctx.reorder(ZOrderOp::BringToFront));
    assert_eq!((z(&ctx, &a), z(&ctx, &b), z(&ctx, &c)), (4, 2, 3));

    ctx.select(Some(c.clone()));
    assert!(ctx.reorder(ZOrderOp::SendToBack));
    assert_eq!((z(&ctx, &a), z(&ctx, &b), z(&ctx, &c)), (4, 2, 1));
}

#[test]
fn test_forward_and_backward_swap_with_the_neighbour() {
    init();
    let mut ctx = context();
    let a = ctx.add_text("a");
    let b = ctx.add_text("b");
    let c = ctx.add_text("c");

    ctx.select(Some(a.clone()));
    assert!(ctx.reorder(ZOrderOp::BringForward));
    assert_eq!((z(&ctx, &a), z(&ctx, &b), z(&ctx, &c)), (2, 1, 3));

    ctx.select(Some(c.clone()));
    assert!(!ctx.reorder(ZOrderOp::BringForward));
    assert!(ctx.reorder(ZOrderOp::SendBackward));
    assert_eq!((z(&ctx, &a), z(&ctx, &b), z(&ctx, &c)), (3, 1, 2));

    ctx.select(None);
    assert!(!ctx.reorder(ZOrderOp::SendToBack));
}

#[test]
fn test_equal_neighbours_pick_the_earliest() {
    init();
    let mut ctx = context();
    let a = ctx.add_text("a");
    let b = ctx.add_text("b");
    let c = ctx.add_text("c");
    ctx.update_element(&b, ElementPatch::z_index(5));
    ctx.update_element(&c, ElementPatch::z_index(5));

    ctx.select(Some(a.clone()));
    ctx.reorder(ZOrderOp::BringForward);
    assert_eq!((z(&ctx, &a), z(&ctx, &b), z(&ctx, &c)), (5, 1, 5));
}

#[test]
fn test_handle_transform_snaps_with_its_own_threshold() {
    init();
    let mut ctx = context();
    let id = image(&mut ctx);

    // 12 degrees off is outside the handle threshold
    let loose = HandleTransform {
        position: pos2(210.0, 220.0),
        scale: vec2(1.5, 1.5),
        rotation: 78.0,
    };
    assert!(ctx.end_handle_transform(&id, loose));
    let el = ctx.document().element(&id).unwrap();
    assert_eq!(el.rotation, 78.0);
    assert_eq!(el.position(), pos2(210.0, 220.0));
    assert_eq!(el.scale(), vec2(1.5, 1.5));

    let close = HandleTransform {
        rotation: 352.0,
        ..loose
    };
    assert!(ctx.end_handle_transform(&id, close));
    assert_eq!(ctx.document().element(&id).unwrap().rotation, 0.0);
}

#[test]
fn test_handle_transform_below_minimum_box_is_dropped() {
    init();
    let mut ctx = context();
    let id = image(&mut ctx);
    let before = ctx.document().element(&id).unwrap().clone();

    let tiny = HandleTransform {
        position: pos2(0.0, 0.0),
        scale: vec2(0.1, 1.0),
        rotation: 0.0,
    };
    assert!(!ctx.end_handle_transform(&id, tiny));
    assert_eq!(ctx.document().element(&id).unwrap(), &before);
}

#[test]
fn test_pinch_commits_once_with_gesture_snapping() {
    init();
    let mut ctx = context();
    let id = image(&mut ctx);

    ctx.touch_start(&[pos2(100.0, 100.0), pos2(200.0, 100.0)]);
    assert!(ctx.gesture().is_active());

    // Twice the distance, rotated by 80 degrees
    let angle = 80.0_f32.to_radians();
    let far = pos2(100.0 + 200.0 * angle.cos(), 100.0 + 200.0 * angle.sin());
    let preview = ctx.touch_move(&[pos2(100.0, 100.0), far]).unwrap();
    assert!((preview.scale.x - 2.0).abs() < 1e-4);
    assert!((preview.rotation - 80.0).abs() < 1e-3);
    // Nothing written while the gesture runs
    assert_eq!(ctx.document().element(&id).unwrap().rotation, 0.0);

    assert!(ctx.touch_end(1));
    let el = ctx.document().element(&id).unwrap();
    assert_eq!(el.rotation, 90.0);
    assert!((el.scale_x - 2.0).abs() < 1e-4);
    assert_eq!(el.position(), pos2(200.0, 200.0));

    // The remaining finger never restarts or recommits
    assert!(!ctx.touch_end(0));
    assert!(!ctx.gesture().is_active());
}

#[test]
fn test_losing_a_finger_mid_gesture_abandons_it() {
    init();
    let mut ctx = context();
    let id = image(&mut ctx);
    ctx.touch_start(&[pos2(100.0, 100.0), pos2(200.0, 100.0)]);
    ctx.touch_move(&[pos2(100.0, 100.0), pos2(300.0, 100.0)]);
    ctx.touch_start(&[pos2(100.0, 100.0)]);

    assert!(!ctx.gesture().is_active());
    assert!(!ctx.touch_end(0));
    assert_eq!(ctx.document().element(&id).unwrap().scale_x, 1.0);
}

#[test]
fn test_snapping_is_idempotent_for_both_thresholds() {
    let config = EditorConfig::default();
    for tenth in -7200..=7200 {
        let angle = tenth as f32 / 10.0;
        for threshold in [config.snap.gesture_threshold, config.snap.handle_threshold] {
            let once = snap_rotation(angle, true, threshold);
            assert_eq!(snap_rotation(once, true, threshold), once);
        }
    }
}

#[test]
fn test_drag_end_writes_the_new_position() {
    init();
    let mut ctx = context();
    let id = image(&mut ctx);
    assert!(ctx.end_drag(&id, pos2(-40.0, 900.0)));
    // Off-canvas positions are kept
    assert_eq!(ctx.document().element(&id).unwrap().position(), pos2(-40.0, 900.0));
}
