//! Closed-form terrains, useful for flat maps, planets, and tests.

use bevy_math::{DVec2, DVec3};

use super::{BoundingSphere, RayHit, Terrain};

/// A horizontal square of ground at a fixed height, facing world +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatTerrain {
    /// Center of the square in the XY plane.
    pub center: DVec2,
    /// Height of the ground along world Z.
    pub height: f64,
    /// Half the side length of the square.
    pub half_extent: f64,
}

impl FlatTerrain {
    /// A square of ground centered on the origin at height zero.
    pub fn new(half_extent: f64) -> Self {
        Self {
            center: DVec2::ZERO,
            height: 0.0,
            half_extent,
        }
    }

    /// Move the ground to the given height.
    pub fn with_height(self, height: f64) -> Self {
        Self { height, ..self }
    }
}

impl Terrain for FlatTerrain {
    fn intersect(&self, start: DVec3, end: DVec3) -> Option<RayHit> {
        let dz = end.z - start.z;
        if dz == 0.0 {
            return None;
        }
        let t = (self.height - start.z) / dz;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }
        let point = start + (end - start) * t;
        let offset = (point.truncate() - self.center).abs();
        (offset.max_element() <= self.half_extent).then_some(RayHit {
            point,
            normal: DVec3::Z,
        })
    }

    fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::new(
            self.center.extend(self.height),
            self.half_extent * std::f64::consts::SQRT_2,
        )
    }
}

/// The surface of a sphere, e.g. a planet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereTerrain {
    /// Center of the sphere.
    pub center: DVec3,
    /// Radius of the sphere.
    pub radius: f64,
}

impl SphereTerrain {
    /// Create a new sphere.
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl Terrain for SphereTerrain {
    fn intersect(&self, start: DVec3, end: DVec3) -> Option<RayHit> {
        let direction = end - start;
        let a = direction.length_squared();
        if a == 0.0 {
            return None;
        }
        let offset = start - self.center;
        let half_b = offset.dot(direction);
        let c = offset.length_squared() - self.radius * self.radius;
        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        let near = (-half_b - root) / a;
        let far = (-half_b + root) / a;
        let t = [near, far]
            .into_iter()
            .find(|t| (0.0..=1.0).contains(t))?;
        let point = start + direction * t;
        Some(RayHit {
            point,
            normal: (point - self.center).normalize_or(DVec3::Z),
        })
    }

    fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::new(self.center, self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_hit_inside_bounds() {
        let ground = FlatTerrain::new(10.0).with_height(2.0);
        let hit = ground
            .intersect(DVec3::new(1.0, 1.0, 10.0), DVec3::new(1.0, 1.0, -10.0))
            .unwrap();
        assert!((hit.point - DVec3::new(1.0, 1.0, 2.0)).length() < 1e-12);
        assert_eq!(hit.normal, DVec3::Z);
    }

    #[test]
    fn flat_misses() {
        let ground = FlatTerrain::new(10.0);
        // Outside the square.
        assert!(ground
            .intersect(DVec3::new(20.0, 0.0, 1.0), DVec3::new(20.0, 0.0, -1.0))
            .is_none());
        // Segment stops short of the ground.
        assert!(ground
            .intersect(DVec3::new(0.0, 0.0, 5.0), DVec3::new(0.0, 0.0, 1.0))
            .is_none());
        // Parallel to the ground.
        assert!(ground
            .intersect(DVec3::new(0.0, -35.0, 0.0), DVec3::ZERO)
            .is_none());
    }

    #[test]
    fn sphere_reports_closest_hit() {
        let planet = SphereTerrain::new(DVec3::ZERO, 5.0);
        let hit = planet
            .intersect(DVec3::new(0.0, 0.0, 20.0), DVec3::new(0.0, 0.0, -20.0))
            .unwrap();
        assert!((hit.point - DVec3::new(0.0, 0.0, 5.0)).length() < 1e-9);
        assert!((hit.normal - DVec3::Z).length() < 1e-9);
    }

    #[test]
    fn sphere_hit_from_inside() {
        let planet = SphereTerrain::new(DVec3::ZERO, 5.0);
        let hit = planet.intersect(DVec3::ZERO, DVec3::X * 10.0).unwrap();
        assert!((hit.point - DVec3::X * 5.0).length() < 1e-9);
    }

    #[test]
    fn sphere_miss() {
        let planet = SphereTerrain::new(DVec3::ZERO, 5.0);
        assert!(planet
            .intersect(DVec3::new(10.0, 10.0, 0.0), DVec3::new(10.0, -10.0, 0.0))
            .is_none());
    }
}
