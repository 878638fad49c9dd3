//! Strategies for deriving the local coordinate frame tangent to the terrain at a point.

use std::f64::consts::FRAC_PI_2;

use bevy_math::{DMat4, DVec3};

/// Equatorial radius of the WGS84 ellipsoid, in meters.
pub const WGS_84_RADIUS_EQUATOR: f64 = 6_378_137.0;
/// Polar radius of the WGS84 ellipsoid, in meters.
pub const WGS_84_RADIUS_POLAR: f64 = 6_356_752.314_2;

/// Computes the rigid transform the camera orientation and distance are expressed in.
///
/// The returned frame must be orthonormal, with its translation at `position` and its local Z
/// axis pointing "up" away from the surface.
pub trait CoordinateFrameProvider: Send + Sync + 'static {
    /// The frame tangent to the terrain at `position`.
    fn coordinate_frame(&self, position: DVec3) -> DMat4;
}

/// The "up" direction of a coordinate frame: its local Z axis in world space.
pub fn up_vector(frame: &DMat4) -> DVec3 {
    frame.z_axis.truncate()
}

/// World Z is up everywhere. Frames are pure translations.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatFrame;

impl CoordinateFrameProvider for FlatFrame {
    fn coordinate_frame(&self, position: DVec3) -> DMat4 {
        DMat4::from_translation(position)
    }
}

/// Geodetic frames on an ellipsoid of revolution centered on the world origin, with the polar
/// axis along world Z.
///
/// Frames are east (X), north (Y), geodetic up (Z).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipsoidFrame {
    /// Radius at the equator.
    pub radius_equator: f64,
    /// Radius at the poles.
    pub radius_polar: f64,
}

impl Default for EllipsoidFrame {
    fn default() -> Self {
        Self {
            radius_equator: WGS_84_RADIUS_EQUATOR,
            radius_polar: WGS_84_RADIUS_POLAR,
        }
    }
}

impl EllipsoidFrame {
    /// An ellipsoid with both radii equal.
    pub fn sphere(radius: f64) -> Self {
        Self {
            radius_equator: radius,
            radius_polar: radius,
        }
    }

    fn eccentricity_squared(&self) -> f64 {
        let a = self.radius_equator;
        let b = self.radius_polar;
        (a * a - b * b) / (a * a)
    }

    /// Convert a world position to `(latitude, longitude, height)`, angles in radians.
    pub fn lat_long_height(&self, position: DVec3) -> (f64, f64, f64) {
        let (a, b) = (self.radius_equator, self.radius_polar);
        let ecc2 = self.eccentricity_squared();
        let p = (position.x * position.x + position.y * position.y).sqrt();

        // On the polar axis the general formula divides by a vanishing, sign-unstable term.
        if p <= a * f64::EPSILON {
            let latitude = if position.z > 0.0 {
                FRAC_PI_2
            } else if position.z < 0.0 {
                -FRAC_PI_2
            } else {
                0.0
            };
            return (latitude, 0.0, position.z.abs() - b);
        }

        let theta = (position.z * a).atan2(p * b);
        let e_dash_squared = (a * a - b * b) / (b * b);
        let (sin_theta, cos_theta) = theta.sin_cos();

        let latitude = ((position.z + e_dash_squared * b * sin_theta.powi(3))
            / (p - ecc2 * a * cos_theta.powi(3)))
        .atan();
        let longitude = position.y.atan2(position.x);

        let sin_latitude = latitude.sin();
        let n = a / (1.0 - ecc2 * sin_latitude * sin_latitude).sqrt();
        let cos_latitude = latitude.cos();
        let height = if cos_latitude.abs() < 1e-9 {
            position.z.abs() - b
        } else {
            p / cos_latitude - n
        };

        (latitude, longitude, height)
    }

    /// Convert `(latitude, longitude, height)` back to a world position.
    pub fn position_from_lat_long_height(
        &self,
        latitude: f64,
        longitude: f64,
        height: f64,
    ) -> DVec3 {
        let ecc2 = self.eccentricity_squared();
        let (sin_latitude, cos_latitude) = latitude.sin_cos();
        let (sin_longitude, cos_longitude) = longitude.sin_cos();
        let n = self.radius_equator / (1.0 - ecc2 * sin_latitude * sin_latitude).sqrt();
        DVec3::new(
            (n + height) * cos_latitude * cos_longitude,
            (n + height) * cos_latitude * sin_longitude,
            (n * (1.0 - ecc2) + height) * sin_latitude,
        )
    }
}

impl CoordinateFrameProvider for EllipsoidFrame {
    fn coordinate_frame(&self, position: DVec3) -> DMat4 {
        if position.length_squared() < f64::EPSILON {
            return DMat4::from_translation(position);
        }
        let (latitude, longitude, _) = self.lat_long_height(position);
        let (sin_latitude, cos_latitude) = latitude.sin_cos();
        let (sin_longitude, cos_longitude) = longitude.sin_cos();

        let up = DVec3::new(
            cos_longitude * cos_latitude,
            sin_longitude * cos_latitude,
            sin_latitude,
        );
        let east = DVec3::new(-sin_longitude, cos_longitude, 0.0);
        let north = up.cross(east);

        DMat4::from_cols(
            east.extend(0.0),
            north.extend(0.0),
            up.extend(0.0),
            position.extend(1.0),
        )
    }
}
