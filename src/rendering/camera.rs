use bevy::prelude::*;

/// Backdrop behind the fragments; the letterform fills sit on top of this.
const BACKDROP: Color = Color::srgb(0.07, 0.07, 0.09);

/// Marker for the effect's single viewport camera.
#[derive(Component)]
pub struct EffectCamera;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_camera);
    }
}

fn setup_camera(mut commands: Commands) {
    commands.spawn((
        EffectCamera,
        Camera2d,
        Camera {
            clear_color: ClearColorConfig::Custom(BACKDROP),
            ..default()
        },
        Name::new("EffectCamera"),
    ));
}
