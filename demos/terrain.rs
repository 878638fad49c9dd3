//! A rolling heightfield terrain. The camera anchor stays glued to the ground while panning.
//!
//! Controls: left-drag to orbit, middle-drag (or left+right) to pan, right-drag to zoom, space to
//! return home.

use bevy::{
    prelude::*,
    render::{
        mesh::Indices, render_asset::RenderAssetUsages, render_resource::PrimitiveTopology,
    },
};
use bevy_terrain_cam::prelude::*;

const SPACING: f64 = 0.5;
const SAMPLES: usize = 161;

fn main() {
    App::new()
        .add_plugins((DefaultPlugins, DefaultTerrainCamPlugins))
        .add_systems(Startup, setup)
        .run();
}

fn hills(x: f64, y: f64) -> f64 {
    3.0 * (x * 0.15).sin() * (y * 0.1).cos() + 6.0 * (-(x * x + y * y) / 400.0).exp()
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let heightfield = match Heightfield::from_fn(SPACING, SAMPLES, SAMPLES, hills) {
        Ok(heightfield) => heightfield,
        Err(e) => {
            error!("Unable to build terrain: {e}");
            return;
        }
    };

    commands.spawn((
        Mesh3d(meshes.add(terrain_mesh(&heightfield))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.35, 0.55, 0.3),
            perceptual_roughness: 0.9,
            ..default()
        })),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(20.0, -10.0, 40.0).looking_at(Vec3::ZERO, Vec3::Z),
    ));

    commands.spawn((
        Camera3d::default(),
        TerrainCam::new(TerrainHandle::new(heightfield), FlatFrame),
    ));

    info!("Left drag: orbit, middle drag: pan, right drag: zoom, space: home");
}

/// Triangulate the heightfield on its own grid, so the mesh matches what the camera intersects.
fn terrain_mesh(heightfield: &Heightfield) -> Mesh {
    let half = (SAMPLES - 1) as f64 * SPACING / 2.0;
    let mut positions = Vec::with_capacity(SAMPLES * SAMPLES);
    let mut normals = Vec::with_capacity(SAMPLES * SAMPLES);
    for row in 0..SAMPLES {
        for column in 0..SAMPLES {
            let x = column as f64 * SPACING - half;
            let y = row as f64 * SPACING - half;
            let z = heightfield.height_at(x, y).unwrap_or_default();
            positions.push([x as f32, y as f32, z as f32]);
            normals.push(heightfield.normal_at(x, y).as_vec3().to_array());
        }
    }

    let mut indices = Vec::with_capacity((SAMPLES - 1) * (SAMPLES - 1) * 6);
    for row in 0..SAMPLES as u32 - 1 {
        for column in 0..SAMPLES as u32 - 1 {
            let i = row * SAMPLES as u32 + column;
            let above = i + SAMPLES as u32;
            indices.extend_from_slice(&[i, i + 1, above, i + 1, above + 1, above]);
        }
    }

    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_indices(Indices::U32(indices))
}
