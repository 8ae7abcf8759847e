use super::*;
use kurbo::Point;

fn state(x: f64, y: f64) -> FrameState {
    FrameState {
        x,
        y,
        scale_x: 1.0,
        scale_y: 1.0,
        rotation: 0.0,
        opacity: 1.0,
        anchor: Vec2::ZERO,
        in_viewport: true,
        visible_assets: Vec::new(),
    }
}

fn close(a: Point, b: (f64, f64)) -> bool {
    (a.x - b.0).abs() < 1e-9 && (a.y - b.1).abs() < 1e-9
}

#[test]
fn plain_translation_moves_the_origin() {
    let affine = state(10.0, 20.0).to_affine();
    assert!(close(affine * Point::new(0.0, 0.0), (10.0, 20.0)));
}

#[test]
fn anchor_point_is_invariant_under_scale() {
    let mut s = state(10.0, 20.0);
    s.scale_x = 2.0;
    s.scale_y = 2.0;
    s.anchor = Vec2::new(5.0, 0.0);
    let affine = s.to_affine();
    // the anchor itself only picks up the translation
    assert!(close(affine * Point::new(5.0, 0.0), (15.0, 20.0)));
    // a point 1 unit past the anchor lands 2 units past it
    assert!(close(affine * Point::new(6.0, 0.0), (17.0, 20.0)));
}

#[test]
fn rotation_pivots_around_the_anchor() {
    let mut s = state(0.0, 0.0);
    s.rotation = 90.0;
    s.anchor = Vec2::new(1.0, 1.0);
    let affine = s.to_affine();
    assert!(close(affine * Point::new(1.0, 1.0), (1.0, 1.0)));
    // (2, 1) is 1 unit right of the anchor; 90 degrees ccw-in-screen-space
    // sends it 1 unit below
    assert!(close(affine * Point::new(2.0, 1.0), (1.0, 2.0)));
}

#[test]
fn transform_order_is_scale_then_rotate_then_translate() {
    let mut s = state(100.0, 0.0);
    s.rotation = 90.0;
    s.scale_x = 2.0;
    s.scale_y = 2.0;
    let affine = s.to_affine();
    // local (1, 0): scaled to (2, 0), rotated to (0, 2), translated
    assert!(close(affine * Point::new(1.0, 0.0), (100.0, 2.0)));
}
