//! Pointer tracking: maps mouse/touch input into one authoritative target
//! position. Mouse moves and touch drags replace the position immediately;
//! a discrete touch-start records a fly-to destination the position eases
//! toward (90% old / 10% new per frame) until the rounded positions match.
//! Input handlers mutate only this tracker and the pointer collider's world
//! membership; fragment dynamics have a single writer elsewhere.

use bevy::prelude::*;
use bevy::window::CursorMoved;
use bevy_rapier2d::prelude::{Collider, RigidBody};

use crate::core::components::PointerBall;
use crate::core::config::EffectConfig;
use crate::core::system::system_order::PrePhysicsSet;

/// Old-position weight of the fly-to easing.
pub const EASE_KEEP: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PointerState {
    /// No pointer defined; the collider is out of the world.
    #[default]
    Empty,
    /// Immediate position from mouse or an active touch.
    Tracking(Vec2),
    /// Easing toward a recorded touch destination.
    Animating { pos: Vec2, target: Vec2 },
}

#[derive(Resource, Debug, Default)]
pub struct PointerTracker {
    state: PointerState,
}

impl PointerTracker {
    pub fn state(&self) -> PointerState {
        self.state
    }

    pub fn position(&self) -> Option<Vec2> {
        match self.state {
            PointerState::Empty => None,
            PointerState::Tracking(pos) | PointerState::Animating { pos, .. } => Some(pos),
        }
    }

    /// Immediate update; clears any in-flight animation target.
    pub fn track(&mut self, pos: Vec2) {
        self.state = PointerState::Tracking(pos);
    }

    /// Discrete touch-start: record a destination to ease toward. With no
    /// current position there is nothing to interpolate from, so the
    /// position snaps straight to the target.
    pub fn fly_to(&mut self, target: Vec2) {
        self.state = match self.state {
            PointerState::Empty => PointerState::Tracking(target),
            PointerState::Tracking(pos) | PointerState::Animating { pos, .. } => {
                PointerState::Animating { pos, target }
            }
        };
    }

    /// One easing step; switches to Tracking once the rounded position
    /// equals the rounded target.
    pub fn ease_step(&mut self) {
        if let PointerState::Animating { pos, target } = self.state {
            let next = pos * EASE_KEEP + target * (1.0 - EASE_KEEP);
            self.state = if next.round() == target.round() {
                PointerState::Tracking(next)
            } else {
                PointerState::Animating { pos: next, target }
            };
        }
    }

    /// Touch-end: position becomes undefined. Mouse-leave deliberately does
    /// NOT call this; a desktop cursor lingers as an attractor off-window.
    pub fn clear(&mut self) {
        self.state = PointerState::Empty;
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.state, PointerState::Animating { .. })
    }
}

/// Entity of the pointer collider currently in the world, if any.
#[derive(Resource, Debug, Default)]
pub struct PointerBallRef(pub Option<Entity>);

pub struct PointerPlugin;

impl Plugin for PointerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerTracker>()
            .init_resource::<PointerBallRef>()
            .add_systems(
                Update,
                (track_pointer_input, ease_pointer, sync_pointer_collider)
                    .chain()
                    .in_set(PrePhysicsSet),
            );
    }
}

fn cursor_world_pos(
    camera_q: &Query<(&Camera, &GlobalTransform)>,
    screen_pos: Vec2,
) -> Option<Vec2> {
    let (camera, cam_tf) = camera_q.iter().next()?;
    camera.viewport_to_world_2d(cam_tf, screen_pos).ok()
}

fn track_pointer_input(
    mut cursor_evr: EventReader<CursorMoved>,
    touches: Res<Touches>,
    camera_q: Query<(&Camera, &GlobalTransform)>,
    mut tracker: ResMut<PointerTracker>,
) {
    for ev in cursor_evr.read() {
        if let Some(world) = cursor_world_pos(&camera_q, ev.position) {
            tracker.track(world);
        }
    }
    for touch in touches.iter_just_pressed() {
        if let Some(world) = cursor_world_pos(&camera_q, touch.position()) {
            tracker.fly_to(world);
        }
    }
    // Touch drags replace the position immediately, like mouse moves.
    for touch in touches.iter() {
        if touches.just_pressed(touch.id()) {
            continue;
        }
        if touch.position() != touch.previous_position() {
            if let Some(world) = cursor_world_pos(&camera_q, touch.position()) {
                tracker.track(world);
            }
        }
    }
    if touches.iter_just_released().next().is_some()
        || touches.iter_just_canceled().next().is_some()
    {
        tracker.clear();
    }
}

fn ease_pointer(mut tracker: ResMut<PointerTracker>) {
    if tracker.is_animating() {
        tracker.ease_step();
    }
}

/// Keeps the kinematic pointer disc's world membership in sync with the
/// tracker. Add and remove are defensive: a missing entity is a no-op, an
/// existing one is repositioned rather than duplicated.
pub fn sync_pointer_collider(
    mut commands: Commands,
    cfg: Res<EffectConfig>,
    tracker: Res<PointerTracker>,
    mut ball: ResMut<PointerBallRef>,
    mut q: Query<&mut Transform, With<PointerBall>>,
) {
    match (tracker.position(), ball.0) {
        (Some(pos), Some(entity)) => {
            if let Ok(mut transform) = q.get_mut(entity) {
                transform.translation.x = pos.x;
                transform.translation.y = pos.y;
            } else {
                // Stale handle (e.g. world rebuild despawned it mid-frame).
                ball.0 = None;
            }
        }
        (Some(pos), None) => {
            if cfg.pointer.radius > 0.0 {
                let entity = commands
                    .spawn((
                        PointerBall,
                        RigidBody::KinematicPositionBased,
                        Collider::ball(cfg.pointer.radius),
                        Transform::from_xyz(pos.x, pos.y, 0.0),
                        GlobalTransform::default(),
                        Name::new("PointerBall"),
                    ))
                    .id();
                ball.0 = Some(entity);
            }
        }
        (None, Some(entity)) => {
            if let Ok(mut ec) = commands.get_entity(entity) {
                ec.despawn();
            }
            ball.0 = None;
        }
        (None, None) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_enters_tracking_immediately() {
        let mut t = PointerTracker::default();
        assert_eq!(t.position(), None);
        t.track(Vec2::new(5.0, 7.0));
        assert_eq!(t.position(), Some(Vec2::new(5.0, 7.0)));
        assert!(!t.is_animating());
    }

    #[test]
    fn move_cancels_inflight_animation() {
        let mut t = PointerTracker::default();
        t.track(Vec2::ZERO);
        t.fly_to(Vec2::new(100.0, 0.0));
        assert!(t.is_animating());
        t.track(Vec2::new(1.0, 1.0));
        assert!(!t.is_animating());
        assert_eq!(t.position(), Some(Vec2::new(1.0, 1.0)));
    }

    #[test]
    fn fly_to_from_empty_snaps() {
        let mut t = PointerTracker::default();
        t.fly_to(Vec2::new(40.0, -3.0));
        assert!(!t.is_animating());
        assert_eq!(t.position(), Some(Vec2::new(40.0, -3.0)));
    }

    #[test]
    fn clear_is_idempotent() {
        let mut t = PointerTracker::default();
        t.track(Vec2::ONE);
        t.clear();
        assert_eq!(t.position(), None);
        t.clear();
        assert_eq!(t.position(), None);
    }
}
