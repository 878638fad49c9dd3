//! Deformed-sphere trackball: turns two normalized pointer positions into a rotation.
//!
//! Points near the center of the screen are projected onto a sphere; points further out are
//! projected onto a hyperbolic sheet instead, which meets the sphere smoothly and avoids the
//! singularity at the sphere's rim.

use std::f64::consts::FRAC_1_SQRT_2;

use bevy_math::{DQuat, DVec2, DVec3};

/// Default radius of the virtual trackball, in normalized screen units.
pub const TRACKBALL_SIZE: f64 = 0.8;

/// Height of the point `(x, y)` above the screen plane, on a sphere of radius `r` or on the
/// hyperbolic sheet outside of it.
pub fn project_to_sphere(r: f64, x: f64, y: f64) -> f64 {
    let d = (x * x + y * y).sqrt();
    if d < r * FRAC_1_SQRT_2 {
        (r * r - d * d).sqrt()
    } else {
        let t = r * FRAC_1_SQRT_2;
        t * t / d
    }
}

/// Compute the rotation `(axis, angle)` that drags `p1` to `p2` on a trackball of radius
/// `size`, for a camera currently oriented by `rotation`.
///
/// The axis is expressed in the same space as `rotation`, so the result can be composed with it
/// directly. The angle is in radians and never exceeds pi/2.
pub fn trackball(p1: DVec2, p2: DVec2, rotation: DQuat, size: f64) -> (DVec3, f64) {
    let up = rotation * DVec3::Y;
    let side = rotation * DVec3::X;
    let look = rotation * DVec3::NEG_Z;

    let project =
        |p: DVec2| side * p.x + up * p.y - look * project_to_sphere(size, p.x, p.y);
    let p1 = project(p1);
    let p2 = project(p2);

    // p2 x p1 keeps orbiting consistent with right-handed quaternions. Swapping the operands
    // inverts every drag.
    let axis = p2.cross(p1).normalize_or(look);

    let t = ((p2 - p1).length() / (2.0 * size)).clamp(-1.0, 1.0);
    let angle = if t.is_nan() { 0.0 } else { t.asin() };
    (axis, angle)
}

/// [`trackball`] as a quaternion, ready to be composed with the current orientation.
pub fn trackball_rotation(p1: DVec2, p2: DVec2, rotation: DQuat, size: f64) -> DQuat {
    let (axis, angle) = trackball(p1, p2, rotation, size);
    DQuat::from_axis_angle(axis, angle)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn sphere_branch_inside_threshold() {
        let r = TRACKBALL_SIZE;
        for (x, y) in [(0.0, 0.0), (0.3, 0.1), (-0.2, -0.4), (0.0, 0.56)] {
            assert!(x * x + y * y <= r * r * 0.5);
            let d2: f64 = x * x + y * y;
            assert!((project_to_sphere(r, x, y) - (r * r - d2).sqrt()).abs() < 1e-12);
        }
    }

    #[test]
    fn hyperbolic_branch_outside_threshold() {
        let r = TRACKBALL_SIZE;
        for (x, y) in [(0.6_f64, 0.0_f64), (1.0, 1.0), (-0.9, 0.3), (5.0, -5.0)] {
            let d: f64 = (x * x + y * y).sqrt();
            let expected = (r * r / 2.0) / d;
            assert!((project_to_sphere(r, x, y) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn branches_meet_at_the_rim() {
        let r = TRACKBALL_SIZE;
        let rim = r * FRAC_1_SQRT_2;
        let inside = project_to_sphere(r, rim - 1e-9, 0.0);
        let outside = project_to_sphere(r, rim, 0.0);
        assert!((inside - outside).abs() < 1e-4);
        let outside = project_to_sphere(r, rim + 1e-9, 0.0);
        assert!((inside - outside).abs() < 1e-4);
    }

    #[test]
    fn identical_points_do_not_rotate() {
        for p in [DVec2::ZERO, DVec2::new(0.5, -0.5), DVec2::new(-1.0, 1.0)] {
            let (axis, angle) = trackball(p, p, DQuat::IDENTITY, TRACKBALL_SIZE);
            assert!(angle.abs() < 1e-12);
            assert!(axis.is_finite());
            assert!((axis.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn angle_grows_with_drag_length_and_is_bounded() {
        let mut last = 0.0;
        for i in 0..=100 {
            let x = i as f64 * 0.02;
            let (_, angle) = trackball(DVec2::ZERO, DVec2::new(x, 0.0), DQuat::IDENTITY, 0.8);
            assert!(angle >= last - 1e-12, "angle decreased at x = {x}");
            assert!(angle <= FRAC_PI_2);
            last = angle;
        }
        let (_, angle) = trackball(
            DVec2::new(-100.0, -100.0),
            DVec2::new(100.0, 100.0),
            DQuat::IDENTITY,
            0.8,
        );
        assert!((angle - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn horizontal_drag_rotates_about_screen_vertical() {
        let (axis, angle) = trackball(
            DVec2::ZERO,
            DVec2::new(0.5, 0.0),
            DQuat::IDENTITY,
            TRACKBALL_SIZE,
        );
        assert!(angle > 0.0);
        assert!((axis - DVec3::NEG_Y).length() < 1e-9, "{axis:?}");
    }

    #[test]
    fn axis_follows_current_orientation() {
        let rotation = DQuat::from_rotation_x(0.7);
        let (axis, _) = trackball(DVec2::ZERO, DVec2::new(0.5, 0.0), rotation, TRACKBALL_SIZE);
        assert!((axis - rotation * DVec3::NEG_Y).length() < 1e-9, "{axis:?}");
    }

    #[test]
    fn far_outside_unit_square_is_finite() {
        let (axis, angle) = trackball(
            DVec2::new(1e6, -1e6),
            DVec2::new(-3e5, 2.0),
            DQuat::IDENTITY,
            TRACKBALL_SIZE,
        );
        assert!(axis.is_finite());
        assert!(angle.is_finite());
    }
}
