use bevy::math::Vec2;

use glyph_shatter::{PointerState, PointerTracker};

#[test]
fn fly_to_eases_ninety_ten() {
    let mut t = PointerTracker::default();
    t.track(Vec2::ZERO);
    t.fly_to(Vec2::new(300.0, 300.0));
    t.ease_step();
    // One step of 90/10 interpolation from the origin.
    assert_eq!(t.position(), Some(Vec2::new(30.0, 30.0)));
    assert!(t.is_animating());
}

#[test]
fn fly_to_converges_and_clears_target() {
    let target = Vec2::new(300.0, 300.0);
    let mut t = PointerTracker::default();
    t.track(Vec2::ZERO);
    t.fly_to(target);
    let mut steps = 0;
    while t.is_animating() {
        t.ease_step();
        steps += 1;
        assert!(steps < 1000, "fly-to never converged");
    }
    let final_pos = t.position().expect("still tracking");
    assert!((final_pos - target).length() < 1.0, "ended at {final_pos:?}");
    // Once the rounded positions matched, the animation target cleared.
    assert!(matches!(t.state(), PointerState::Tracking(_)));
    // Further steps are no-ops.
    let before = t.position();
    t.ease_step();
    assert_eq!(t.position(), before);
}

#[test]
fn touch_move_replaces_position_and_cancels_animation() {
    let mut t = PointerTracker::default();
    t.track(Vec2::new(10.0, 10.0));
    t.fly_to(Vec2::new(500.0, 0.0));
    t.ease_step();
    assert!(t.is_animating());
    t.track(Vec2::new(-4.0, 8.0));
    assert!(!t.is_animating());
    assert_eq!(t.position(), Some(Vec2::new(-4.0, 8.0)));
}

#[test]
fn touch_end_then_move_restarts_tracking() {
    let mut t = PointerTracker::default();
    t.track(Vec2::ONE);
    t.clear();
    assert_eq!(t.position(), None);
    // Clearing an already-empty tracker is a no-op, not an error.
    t.clear();
    t.track(Vec2::new(2.0, 3.0));
    assert_eq!(t.position(), Some(Vec2::new(2.0, 3.0)));
}

#[test]
fn fly_to_restarts_from_current_animated_position() {
    let mut t = PointerTracker::default();
    t.track(Vec2::ZERO);
    t.fly_to(Vec2::new(100.0, 0.0));
    t.ease_step();
    let mid = t.position().unwrap();
    // A second discrete touch retargets without snapping back.
    t.fly_to(Vec2::new(0.0, 100.0));
    t.ease_step();
    let next = t.position().unwrap();
    assert!(next.x < mid.x && next.y > 0.0);
}
