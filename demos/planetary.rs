//! A spherical planet. Panning follows the curvature of the surface, and the camera stays upright
//! relative to the local horizon.
//!
//! Controls: left-drag to orbit, middle-drag (or left+right) to pan, right-drag to zoom, space to
//! return home.

use bevy::{math::DVec3, prelude::*};
use bevy_terrain_cam::prelude::*;
use rand::Rng;

const PLANET_RADIUS: f64 = 100.0;

fn main() {
    App::new()
        .add_plugins((DefaultPlugins, DefaultTerrainCamPlugins))
        .add_systems(Startup, setup)
        .run();
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Sphere::new(PLANET_RADIUS as f32).mesh().uv(128, 64))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.3, 0.45, 0.7),
            perceptual_roughness: 0.8,
            ..default()
        })),
    ));

    spawn_landmarks(&mut commands, &mut meshes, &mut materials);

    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            ..default()
        },
        Transform::from_xyz(300.0, -200.0, 200.0).looking_at(Vec3::ZERO, Vec3::Z),
    ));

    commands.spawn((
        Camera3d::default(),
        TerrainCam::new(
            TerrainHandle::new(SphereTerrain::new(DVec3::ZERO, PLANET_RADIUS)),
            EllipsoidFrame::sphere(PLANET_RADIUS),
        ),
    ));

    info!("Left drag: orbit, middle drag: pan, right drag: zoom, space: home");
}

/// Scatter pillars over the surface so there is something to look at while panning.
fn spawn_landmarks(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let frame = EllipsoidFrame::sphere(PLANET_RADIUS);
    let mesh = meshes.add(Cuboid::new(1.0, 1.0, 4.0));
    let material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.9, 0.8, 0.5),
        ..default()
    });
    let mut rng = rand::thread_rng();

    for _ in 0..300 {
        let latitude = rng.gen_range(-1.4..1.4);
        let longitude = rng.gen_range(-std::f64::consts::PI..std::f64::consts::PI);
        let position = frame.position_from_lat_long_height(latitude, longitude, 2.0);
        let local = frame.coordinate_frame(position).as_mat4();
        commands.spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_matrix(local),
        ));
    }
}
