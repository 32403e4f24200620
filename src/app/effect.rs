use bevy::prelude::*;

use crate::core::config::EffectConfig;
use crate::core::system::system_order::{PostPhysicsAdjustSet, PrePhysicsSet};
use crate::debug::DebugPlugin;
use crate::interaction::pointer::PointerPlugin;
use crate::interaction::scroll::ScrollPlugin;
use crate::physics::builder::WorldBuildPlugin;
use crate::physics::forces::ForceModelPlugin;
use crate::physics::setup::PhysicsSetupPlugin;
use crate::rendering::camera::CameraPlugin;
use crate::rendering::materials::FragmentMaterialsPlugin;
use crate::rendering::sync::RenderSyncPlugin;

/// Aggregate plugin for the whole shattered-text effect.
pub struct EffectPlugin;

impl Plugin for EffectPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EffectConfig>()
            .configure_sets(
                Update,
                (PrePhysicsSet, PostPhysicsAdjustSet.after(PrePhysicsSet)),
            )
            .add_plugins((
                CameraPlugin,
                FragmentMaterialsPlugin,
                PhysicsSetupPlugin,
                PointerPlugin,
                ScrollPlugin,
                WorldBuildPlugin,
                ForceModelPlugin,
                RenderSyncPlugin,
                DebugPlugin,
            ));
    }
}
