use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::core::components::Fragment;
use crate::core::system::system_order::PrePhysicsSet;
use crate::interaction::pointer::{sync_pointer_collider, PointerTracker};
use crate::interaction::scroll::{running_state, EffectActivity, ScrollSignal};

/// Wrapper configuring Rapier for the effect. Gravity never moves fragments:
/// every body carries `GravityScale(0.0)`; instead the pointer's offset from
/// the viewport center is published as a normalized ambient bias each frame.
pub struct PhysicsSetupPlugin;

impl Plugin for PhysicsSetupPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
            .init_resource::<AmbientBias>()
            .add_systems(
                Update,
                (
                    gate_physics_pipeline,
                    update_ambient_bias.after(sync_pointer_collider),
                )
                    .in_set(PrePhysicsSet),
            );
    }
}

/// Mirrors the activity gate onto rapier itself. The force systems already
/// stop via their run condition, but `ExternalForce` is persistent: without
/// pausing the pipeline the last written force would keep accelerating
/// fragments while the effect is stopped. Runs unconditionally so both edges
/// of the gate are observed; on the falling edge pending forces are cleared,
/// so resumption starts from freshly computed inputs.
fn gate_physics_pipeline(
    scroll: Res<ScrollSignal>,
    activity: Res<EffectActivity>,
    fragments: Query<(), With<Fragment>>,
    mut rapier_cfg: Query<&mut RapierConfiguration>,
    mut forces: Query<&mut ExternalForce, With<Fragment>>,
    mut was_running: Local<bool>,
) {
    let running = running_state(&scroll, &activity, !fragments.is_empty());
    for mut cfg in rapier_cfg.iter_mut() {
        if cfg.physics_pipeline_active != running {
            cfg.physics_pipeline_active = running;
        }
    }
    if *was_running && !running {
        for mut force in forces.iter_mut() {
            *force = ExternalForce::default();
        }
    }
    *was_running = running;
}

/// Directional signal in [-1, 1] per axis; consumers may read it, it applies
/// no force by itself.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct AmbientBias(pub Vec2);

fn update_ambient_bias(
    tracker: Res<PointerTracker>,
    windows: Query<&Window>,
    mut bias: ResMut<AmbientBias>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let half = Vec2::new(window.width(), window.height()) * 0.5;
    // World origin sits at the viewport center, so the pointer's world
    // position is already its offset from center.
    bias.0 = match tracker.position() {
        Some(p) if half.x > 0.0 && half.y > 0.0 => {
            (p / half).clamp(Vec2::splat(-1.0), Vec2::splat(1.0))
        }
        _ => Vec2::ZERO,
    };
}
