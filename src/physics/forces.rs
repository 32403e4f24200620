//! Per-frame force model. Each fragment gets four influences: a sharply local
//! pointer repulsion, a deliberately weak pull back to its rest position, a
//! drag term that only removes energy when the fragment is overshooting its
//! approach, and a time-boxed annealing lift that breaks stuck tilts. The
//! step is a pure function of (fragment state, pointer snapshot, scroll
//! offset); physics position/velocity are read here but only influenced via
//! `ExternalForce` and an orientation nudge.

use bevy::prelude::*;
use bevy_rapier2d::prelude::{ExternalForce, ReadMassProperties, Velocity};
use std::f32::consts::{FRAC_PI_4, PI, TAU};

use crate::core::components::Fragment;
use crate::core::config::EffectConfig;
use crate::core::system::system_order::PrePhysicsSet;
use crate::interaction::pointer::{sync_pointer_collider, PointerTracker};
use crate::interaction::scroll::{effect_running, ScrollSignal};

/// Distance clamp floor; avoids the inverse-cube singularity at contact.
pub const REPULSION_MIN_DISTANCE: f32 = 20.0;
pub const REPULSION_STRENGTH: f32 = 100.0;
/// Below this falloff magnitude the push is not worth applying.
pub const REPULSION_CUTOFF: f32 = 1.0 / 2_000_000.0;
/// Restoring force is displacement / this; weak on purpose so repulsion
/// dominates at short range.
pub const RESTORE_SOFTNESS: f32 = 100_000.0;
pub const DRAG_GAIN: f32 = 0.01;
/// Within this distance of home the drag term is skipped entirely.
pub const HOME_EPSILON: f32 = 0.01;
/// Per-frame cap on the upright correction angle (radians, pre-rate).
pub const UPRIGHT_MAX_CORRECTION: f32 = 10.0;
/// Correction rate cap; shrinks with distance so far fragments tumble freely.
pub const UPRIGHT_RATE_CAP: f32 = 0.1;
pub const SETTLE_TRAVEL_LIMIT: f32 = 5.0;
pub const SETTLE_DISTANCE_LIMIT: f32 = 5.0;
pub const ANNEAL_SECS: f64 = 2.0;
/// Constant lift applied at the travel-bounds top-left corner while annealing.
pub const ANNEAL_LIFT: f32 = 0.000_3;

pub struct ForceModelPlugin;

impl Plugin for ForceModelPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            apply_fragment_forces
                .in_set(PrePhysicsSet)
                .after(sync_pointer_collider)
                .run_if(effect_running),
        );
    }
}

/// Inverse-cube pointer push, applied at the fragment's own position.
/// `None` when the falloff is below the cutoff or direction is undefined.
pub fn pointer_repulsion(position: Vec2, pointer: Vec2) -> Option<Vec2> {
    let v = position - pointer;
    let dist = v.length().max(REPULSION_MIN_DISTANCE);
    let mag = 1.0 / (dist * dist * dist);
    if mag <= REPULSION_CUTOFF {
        return None;
    }
    let dir = v.normalize_or_zero();
    if dir == Vec2::ZERO {
        return None;
    }
    Some(dir * REPULSION_STRENGTH * mag)
}

/// Restoring pull toward `home` plus overshoot drag. Returns
/// (restore, drag, displacement magnitude).
pub fn restoration_and_drag(position: Vec2, velocity: Vec2, home: Vec2) -> (Vec2, Vec2, f32) {
    let p = position - home;
    let mag = p.length();
    if mag <= 0.0 {
        return (Vec2::ZERO, Vec2::ZERO, 0.0);
    }
    let dir = p / mag;
    let restore = dir * (-mag / RESTORE_SOFTNESS);
    let drag = if mag < HOME_EPSILON {
        Vec2::ZERO
    } else {
        let velocity_toward_target = velocity.dot(p) / mag;
        let drag_mag = (DRAG_GAIN * -velocity_toward_target / (2.0 * mag)).max(0.0);
        dir * drag_mag
    };
    (restore, drag, mag)
}

pub fn wrap_angle(angle: f32) -> f32 {
    angle.rem_euclid(TAU)
}

/// Orientation nudge toward upright, nearer-direction rule with 2pi == 0.
/// Strength shrinks with distance from home; only near-home fragments get
/// meaningfully straightened.
pub fn upright_correction(angle: f32, distance: f32) -> f32 {
    let a = wrap_angle(angle);
    let correction = if a > PI {
        (TAU - a).min(UPRIGHT_MAX_CORRECTION)
    } else {
        (-a).max(-UPRIGHT_MAX_CORRECTION)
    };
    let rate = if distance > 0.0 {
        (1.0 / distance).min(UPRIGHT_RATE_CAP)
    } else {
        UPRIGHT_RATE_CAP
    };
    rate * correction
}

/// Resting at an odd tilt: wrapped angle inside (pi/4, 3pi/4).
pub fn tilted_oddly(angle: f32) -> bool {
    let a = wrap_angle(angle);
    a > FRAC_PI_4 && a < 3.0 * FRAC_PI_4
}

/// Annealing lift applied at `corner` (the travel-bounds top-left), expressed
/// as a central force plus the torque of the off-center application about the
/// body's world center of mass. Zero at and past expiry.
pub fn anneal_lift(now: f64, anneal_until: f64, corner: Vec2, center_of_mass: Vec2) -> (Vec2, f32) {
    if now >= anneal_until {
        return (Vec2::ZERO, 0.0);
    }
    let lift = Vec2::new(0.0, ANNEAL_LIFT);
    (lift, (corner - center_of_mass).perp_dot(lift))
}

#[allow(clippy::type_complexity)]
fn apply_fragment_forces(
    time: Res<Time>,
    cfg: Res<EffectConfig>,
    tracker: Res<PointerTracker>,
    scroll: Res<ScrollSignal>,
    windows: Query<&Window>,
    mut q: Query<(
        &mut Fragment,
        &mut Transform,
        &Velocity,
        &ReadMassProperties,
        &mut ExternalForce,
    )>,
) {
    let now = time.elapsed_secs_f64();
    let pointer = tracker.position();
    let viewport_h = windows.single().map(|w| w.height()).unwrap_or(0.0);
    let drop = scroll.progress.clamp(0.0, 1.0) * viewport_h * cfg.scroll.drop_factor;

    for (mut frag, mut transform, velocity, mass_props, mut external) in q.iter_mut() {
        let position = transform.translation.truncate();
        let (_, _, angle) = transform.rotation.to_euler(EulerRot::XYZ);
        let home = frag.rest_position - Vec2::new(0.0, drop);

        let mut force = Vec2::ZERO;
        let mut torque = 0.0;

        // 1. Pointer repulsion (at the fragment's own position: no torque).
        if let Some(ptr) = pointer {
            if let Some(push) = pointer_repulsion(position, ptr) {
                force += push;
            }
        }

        // 2. Restoration + drag.
        let (restore, drag, mag) = restoration_and_drag(position, velocity.linvel, home);
        force += restore + drag;

        // 3. Upright nudge, directly on orientation (not a torque impulse).
        let delta = upright_correction(angle, mag);
        if delta != 0.0 {
            transform.rotate_z(delta);
        }

        // 4/5. History, bounds, EMA.
        frag.push_travel(position);
        let max_travel = frag.max_travel();
        frag.update_distance_ema(mag);
        let ema = frag.distance_ema.unwrap_or(mag);

        // 6. Annealing trigger: stopped translating but far from home or
        // resting at an odd tilt. The window only ever extends.
        if max_travel < SETTLE_TRAVEL_LIMIT && (ema > SETTLE_DISTANCE_LIMIT || tilted_oddly(angle))
        {
            frag.anneal_until = frag.anneal_until.max(now + ANNEAL_SECS);
        }

        // 7. Annealing lift at the travel-bounds top-left corner. Rapier
        // torques act about the center of mass, which for asymmetric pieces
        // is not the bbox center the body translation tracks.
        if let Some(bounds) = frag.travel_bounds {
            let com = position + Vec2::from_angle(angle).rotate(mass_props.get().local_center_of_mass);
            let (lift, lift_torque) = anneal_lift(now, frag.anneal_until, bounds.top_left(), com);
            force += lift;
            torque += lift_torque;
        }

        // 8. Settle classification (render-facing only).
        frag.settled = max_travel < SETTLE_TRAVEL_LIMIT && ema < SETTLE_DISTANCE_LIMIT;

        external.force = force;
        external.torque = torque;
    }
}
