use bevy::prelude::*;

/// Default fill for moving fragments.
const ACTIVE_FILL: Color = Color::srgb(0.91, 0.91, 0.95);
/// Highlighted fill for settled fragments (the "glow").
const SETTLED_GLOW: Color = Color::srgb(1.0, 0.84, 0.35);

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct FragmentMaterialsInitSet;

/// Shared material handles; fragments swap between the two on settle changes.
#[derive(Resource)]
pub struct FragmentMaterials {
    pub active: Handle<ColorMaterial>,
    pub settled: Handle<ColorMaterial>,
}

pub struct FragmentMaterialsPlugin;

impl Plugin for FragmentMaterialsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            setup_fragment_materials.in_set(FragmentMaterialsInitSet),
        );
    }
}

fn setup_fragment_materials(mut materials: ResMut<Assets<ColorMaterial>>, mut commands: Commands) {
    commands.insert_resource(FragmentMaterials {
        active: materials.add(ACTIVE_FILL),
        settled: materials.add(SETTLED_GLOW),
    });
}
