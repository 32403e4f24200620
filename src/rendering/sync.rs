//! Renderer sync boundary. The core never writes attributes on a surface it
//! does not own: each frame it refreshes `RenderRecords` (one plain
//! `{id, transform, fill}` record per fragment, keyed by stable id) for any
//! embedding layer, and swaps the built-in mesh materials between the active
//! fill and the settled glow.

use bevy::prelude::*;
use bevy::sprite::MeshMaterial2d;

use crate::core::components::Fragment;
use crate::core::system::system_order::PostPhysicsAdjustSet;
use crate::interaction::scroll::effect_running;
use crate::rendering::materials::FragmentMaterials;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStyle {
    Active,
    Settled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FragmentRenderRecord {
    pub id: u32,
    pub transform: String,
    pub fill: FillStyle,
}

/// Latest per-fragment render records, sorted by id. Rewritten every frame
/// the effect runs; stale records are never left behind.
#[derive(Resource, Debug, Default)]
pub struct RenderRecords(pub Vec<FragmentRenderRecord>);

pub struct RenderSyncPlugin;

impl Plugin for RenderSyncPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RenderRecords>().add_systems(
            Update,
            (emit_render_records, apply_fill_materials)
                .in_set(PostPhysicsAdjustSet)
                .run_if(effect_running),
        );
    }
}

/// translate-rotate-translate-back so rotation pivots on the fragment's own
/// geometric center rather than the world origin.
pub fn fragment_transform_string(position: Vec2, angle_rad: f32, pivot: Vec2) -> String {
    format!(
        "translate({:.2} {:.2}) rotate({:.2}) translate({:.2} {:.2})",
        position.x,
        position.y,
        angle_rad.to_degrees(),
        -pivot.x,
        -pivot.y
    )
}

fn emit_render_records(
    mut records: ResMut<RenderRecords>,
    q: Query<(&Fragment, &Transform)>,
) {
    records.0.clear();
    for (frag, transform) in q.iter() {
        let position = transform.translation.truncate();
        let (_, _, angle) = transform.rotation.to_euler(EulerRot::XYZ);
        records.0.push(FragmentRenderRecord {
            id: frag.id,
            transform: fragment_transform_string(position, angle, frag.pivot_offset),
            fill: if frag.settled {
                FillStyle::Settled
            } else {
                FillStyle::Active
            },
        });
    }
    records.0.sort_by_key(|r| r.id);
}

fn apply_fill_materials(
    materials: Res<FragmentMaterials>,
    mut q: Query<(&Fragment, &mut MeshMaterial2d<ColorMaterial>)>,
) {
    for (frag, mut material) in q.iter_mut() {
        let want = if frag.settled {
            &materials.settled
        } else {
            &materials.active
        };
        if material.0 != *want {
            material.0 = want.clone();
        }
    }
}
