//! Fragment body building and world lifecycle. The whole build pass
//! (outline extraction, splitting, collider construction) runs synchronously
//! in one uninterrupted pass; text or viewport changes tear the world down
//! completely and rebuild it, never mutate it incrementally.

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::sprite::MeshMaterial2d;
use bevy_rapier2d::prelude::{
    Collider, ColliderMassProperties, Damping, ExternalForce, Friction, GravityScale,
    ReadMassProperties, RigidBody, Velocity,
};
use geo::{BoundingRect, Polygon};

use crate::core::components::{BoundaryWall, Fragment, PointerBall};
use crate::core::config::EffectConfig;
use crate::core::system::system_order::PrePhysicsSet;
use crate::geometry::splitter::{split_outline, SplitOutcome};
use crate::interaction::pointer::PointerBallRef;
use crate::outline;
use crate::rendering::materials::{FragmentMaterials, FragmentMaterialsInitSet};

/// Boundary wall thickness; walls sit flush against the viewport edges.
const WALL_THICKNESS: f32 = 60.0;
/// Fragments render above the (empty) background.
const FRAGMENT_Z: f32 = 10.0;
/// String width when the config does not pin one: fraction of window width.
const DEFAULT_WIDTH_FRACTION: f32 = 0.8;

/// Layout the current world was built for; any divergence triggers a rebuild.
#[derive(Resource, Debug, Default)]
pub struct BuiltLayout {
    pub size: Vec2,
    pub text: String,
}

pub struct WorldBuildPlugin;

impl Plugin for WorldBuildPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BuiltLayout>()
            .add_systems(
                Startup,
                build_effect_world.after(FragmentMaterialsInitSet),
            )
            .add_systems(Update, rebuild_on_change.before(PrePhysicsSet));
    }
}

fn build_effect_world(
    mut commands: Commands,
    cfg: Res<EffectConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    materials: Res<FragmentMaterials>,
    windows: Query<&Window>,
    mut built: ResMut<BuiltLayout>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let size = Vec2::new(window.width(), window.height());
    build_world(&mut commands, &cfg, &mut meshes, &materials, size);
    built.size = size;
    built.text = cfg.text.content.clone();
}

/// Full teardown-and-rebuild on text or viewport change. In-flight
/// annealing/settled state is discarded, not migrated.
#[allow(clippy::too_many_arguments)]
fn rebuild_on_change(
    mut commands: Commands,
    cfg: Res<EffectConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    materials: Res<FragmentMaterials>,
    windows: Query<&Window>,
    mut built: ResMut<BuiltLayout>,
    teardown: Query<Entity, Or<(With<Fragment>, With<BoundaryWall>, With<PointerBall>)>>,
    mut pointer_ball: ResMut<PointerBallRef>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let size = Vec2::new(window.width(), window.height());
    if built.size == size && built.text == cfg.text.content {
        return;
    }
    info!(
        target: "builder",
        "Rebuilding world: viewport {}x{}, text {:?}",
        size.x, size.y, cfg.text.content
    );
    for entity in teardown.iter() {
        commands.entity(entity).despawn();
    }
    pointer_ball.0 = None;
    build_world(&mut commands, &cfg, &mut meshes, &materials, size);
    built.size = size;
    built.text = cfg.text.content.clone();
}

fn build_world(
    commands: &mut Commands,
    cfg: &EffectConfig,
    meshes: &mut Assets<Mesh>,
    materials: &FragmentMaterials,
    size: Vec2,
) {
    spawn_walls(commands, size);

    // Missing geometry inputs keep the effect idle; walls alone are inert.
    let Some(font_data) = outline::load_font_data(&cfg.fonts.search_paths) else {
        return;
    };
    let target_width = if cfg.text.target_width > 0.0 {
        cfg.text.target_width
    } else {
        size.x * DEFAULT_WIDTH_FRACTION
    };
    let origin = Vec2::new(-target_width * 0.5, cfg.text.baseline_y);
    let outlines = match outline::outlines(&font_data, &cfg.text.content, origin, target_width) {
        Ok(o) => o,
        Err(e) => {
            warn!(target: "builder", "Outline extraction failed: {e}");
            return;
        }
    };

    let mut rng = rand::thread_rng();
    let mut next_id = 0u32;
    let mut pairs = 0usize;
    let mut fallbacks = 0usize;
    let contour_count = outlines.len();
    for glyph_outline in outlines {
        let polygon = glyph_outline.polygon();
        let outcome = split_outline(&polygon, cfg.splitter.max_attempts, &mut rng);
        match &outcome {
            SplitOutcome::Pair(..) => pairs += 1,
            SplitOutcome::Unsplit(_) => {
                fallbacks += 1;
                warn!(
                    target: "builder",
                    "Contour of char {} exhausted split attempts; kept unsplit",
                    glyph_outline.char_index
                );
            }
        }
        for piece in outcome.pieces() {
            if spawn_fragment(commands, meshes, materials, &piece, next_id).is_some() {
                next_id += 1;
            }
        }
    }
    info!(
        target: "builder",
        "Built world: {contour_count} contours -> {next_id} fragments ({pairs} pairs, {fallbacks} unsplit)"
    );
}

/// Turn one split piece into a dynamics collider plus drawable. Mass is
/// pinned to 1 and friction to 0 so comparative force magnitudes stay
/// meaningful across all fragments; the body is placed at the piece's
/// bounds center, which doubles as rest position and render pivot.
fn spawn_fragment(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &FragmentMaterials,
    piece: &Polygon<f64>,
    id: u32,
) -> Option<Entity> {
    let bounds = piece.bounding_rect()?;
    let center = Vec2::new(
        ((bounds.min().x + bounds.max().x) * 0.5) as f32,
        ((bounds.min().y + bounds.max().y) * 0.5) as f32,
    );

    let exterior = piece.exterior();
    let mut ring: Vec<Vec2> = exterior
        .coords()
        .map(|c| Vec2::new(c.x as f32 - center.x, c.y as f32 - center.y))
        .collect();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    if ring.len() < 3 {
        return None;
    }

    let edges: Vec<[u32; 2]> = (0..ring.len() as u32)
        .map(|i| [i, (i + 1) % ring.len() as u32])
        .collect();
    let collider = Collider::convex_decomposition(&ring, &edges);
    let mesh = piece_mesh(&ring)?;
    let mesh_handle = meshes.add(mesh);

    let entity = commands
        .spawn((
            Fragment::new(id, center),
            RigidBody::Dynamic,
            collider,
            ColliderMassProperties::Mass(1.0),
            Friction::coefficient(0.0),
            Damping {
                linear_damping: 0.0,
                angular_damping: 0.0,
            },
            (
                GravityScale(0.0),
                Velocity::zero(),
                ExternalForce::default(),
                ReadMassProperties::default(),
            ),
            Mesh2d::from(mesh_handle),
            MeshMaterial2d(materials.active.clone()),
            Transform::from_xyz(center.x, center.y, FRAGMENT_Z),
            GlobalTransform::default(),
            Visibility::Visible,
            Name::new(format!("Fragment:{id}")),
        ))
        .id();
    Some(entity)
}

/// Triangulate the piece boundary for the 2D mesh pipeline.
fn piece_mesh(ring: &[Vec2]) -> Option<Mesh> {
    let flat: Vec<f64> = ring
        .iter()
        .flat_map(|p| [p.x as f64, p.y as f64])
        .collect();
    let indices = earcutr::earcut(&flat, &[], 2).ok()?;
    if indices.is_empty() {
        return None;
    }

    let mut min = Vec2::splat(f32::MAX);
    let mut max = Vec2::splat(f32::MIN);
    for p in ring {
        min = min.min(*p);
        max = max.max(*p);
    }
    let span = (max - min).max(Vec2::splat(1e-6));

    let positions: Vec<[f32; 3]> = ring.iter().map(|p| [p.x, p.y, 0.0]).collect();
    let normals: Vec<[f32; 3]> = ring.iter().map(|_| [0.0, 0.0, 1.0]).collect();
    let uvs: Vec<[f32; 2]> = ring
        .iter()
        .map(|p| [(p.x - min.x) / span.x, (p.y - min.y) / span.y])
        .collect();

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(
        indices.into_iter().map(|i| i as u32).collect(),
    ));
    Some(mesh)
}

fn spawn_walls(commands: &mut Commands, size: Vec2) {
    let hw = size.x * 0.5;
    let hh = size.y * 0.5;
    let t = WALL_THICKNESS;
    let walls = [
        ("Ground", Vec2::new(0.0, -hh - t * 0.5), Vec2::new(hw + t, t * 0.5)),
        ("Ceiling", Vec2::new(0.0, hh + t * 0.5), Vec2::new(hw + t, t * 0.5)),
        ("LeftWall", Vec2::new(-hw - t * 0.5, 0.0), Vec2::new(t * 0.5, hh)),
        ("RightWall", Vec2::new(hw + t * 0.5, 0.0), Vec2::new(t * 0.5, hh)),
    ];
    for (name, center, half) in walls {
        commands.spawn((
            BoundaryWall,
            RigidBody::Fixed,
            Collider::cuboid(half.x, half.y),
            Transform::from_xyz(center.x, center.y, 0.0),
            GlobalTransform::default(),
            Name::new(name),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Coord, LineString};

    fn square_piece() -> Polygon<f64> {
        Polygon::new(
            LineString::new(vec![
                Coord { x: 10.0, y: 10.0 },
                Coord { x: 30.0, y: 10.0 },
                Coord { x: 30.0, y: 40.0 },
                Coord { x: 10.0, y: 40.0 },
                Coord { x: 10.0, y: 10.0 },
            ]),
            vec![],
        )
    }

    #[test]
    fn piece_mesh_triangulates_boundary() {
        let piece = square_piece();
        let ring: Vec<Vec2> = piece
            .exterior()
            .coords()
            .take(4)
            .map(|c| Vec2::new(c.x as f32, c.y as f32))
            .collect();
        let mesh = piece_mesh(&ring).expect("mesh");
        // A quad triangulates to two triangles.
        match mesh.indices() {
            Some(Indices::U32(idx)) => assert_eq!(idx.len(), 6),
            other => panic!("unexpected indices: {other:?}"),
        }
    }

    #[test]
    fn bounds_center_is_rest_position() {
        let piece = square_piece();
        let bounds = piece.bounding_rect().unwrap();
        let center = Vec2::new(
            ((bounds.min().x + bounds.max().x) * 0.5) as f32,
            ((bounds.min().y + bounds.max().y) * 0.5) as f32,
        );
        assert_eq!(center, Vec2::new(20.0, 25.0));
        let frag = Fragment::new(3, center);
        assert_eq!(frag.rest_position, center);
        assert_eq!(frag.pivot_offset, center);
    }
}
