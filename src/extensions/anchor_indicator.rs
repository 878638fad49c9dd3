//! A `bevy_terrain_cam` extension that draws an indicator in the scene at the location of the
//! anchor while the camera is being moved. This makes it obvious which point on the terrain the
//! camera is rotating around, and which way the local frame is oriented.

use bevy_app::prelude::*;
use bevy_color::Color;
use bevy_ecs::prelude::*;
use bevy_gizmos::prelude::*;
use bevy_math::{DMat3, DQuat, Isometry3d, Vec3};
use bevy_reflect::prelude::*;

use crate::controller::{component::TerrainCam, sync_camera_transforms};

/// See the [module](self) docs.
pub struct AnchorIndicatorPlugin;

impl Plugin for AnchorIndicatorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PostUpdate, draw_anchor.after(sync_camera_transforms))
            .register_type::<AnchorIndicator>();
    }
}

/// Optional. Configures whether or not a [`TerrainCam`] should show an anchor indicator when the
/// camera is moving. The indicator will be enabled if this component is not present.
#[derive(Debug, Component, Reflect)]
#[reflect(Component)]
pub struct AnchorIndicator {
    /// Should the indicator be visible on this camera?
    pub enabled: bool,
}

impl Default for AnchorIndicator {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Indicator size as a fraction of the distance from the camera to the anchor.
const INDICATOR_SCALE: f64 = 0.02;

/// Use gizmos to draw the camera anchor and its local frame in world space.
pub fn draw_anchor(
    cameras: Query<(&TerrainCam, Option<&AnchorIndicator>)>,
    mut gizmos: Gizmos,
) {
    for (cam, _) in cameras
        .iter()
        .filter(|(_, indicator)| indicator.map(|i| i.enabled).unwrap_or(true))
    {
        let motion = cam.current_motion();
        if !motion.is_dragging() && !motion.is_thrown() {
            continue;
        }

        let frame = cam.coordinate_frame();
        let anchor = cam.anchor();
        let scale = cam.distance() * INDICATOR_SCALE;
        if !anchor.is_finite() || !scale.is_finite() {
            continue;
        }

        // The circle lies in the screen plane, so orient it like the camera.
        let facing = DQuat::from_mat3(&DMat3::from_mat4(cam.inverse_view_matrix())).normalize();
        if facing.is_finite() {
            gizmos.circle(
                Isometry3d::new(anchor.as_vec3(), facing.as_quat()),
                scale as f32,
                Color::WHITE,
            );
        }

        let arm = |axis: Vec3| axis.normalize_or_zero() * (scale * 2.0) as f32;
        let origin = anchor.as_vec3();
        gizmos.ray(
            origin,
            arm(frame.x_axis.truncate().as_vec3()),
            Color::srgb(0.9, 0.2, 0.2),
        );
        gizmos.ray(
            origin,
            arm(frame.y_axis.truncate().as_vec3()),
            Color::srgb(0.2, 0.9, 0.2),
        );
        gizmos.ray(
            origin,
            arm(frame.z_axis.truncate().as_vec3()),
            Color::srgb(0.2, 0.4, 0.9),
        );
    }
}
