//! The scene the camera is glued to: ray intersection queries and local coordinate frames.
//!
//! The controller never traverses geometry itself. It only asks a [`Terrain`] for the closest
//! hit along a segment and for its bounding sphere, and asks a
//! [`CoordinateFrameProvider`](frame::CoordinateFrameProvider) for the frame tangent to the
//! surface at a point. Any scene representation can be plugged in by implementing these traits.

use std::sync::Arc;

use bevy_derive::Deref;
use bevy_math::DVec3;

pub mod analytic;
pub mod frame;
pub mod heightfield;

/// The closest intersection of a segment with a [`Terrain`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World space position of the hit.
    pub point: DVec3,
    /// World space surface normal at the hit, normalized.
    pub normal: DVec3,
}

/// A sphere enclosing the whole terrain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// Center of the sphere in world space.
    pub center: DVec3,
    /// Radius of the sphere. Also used as the unit-less scale of the model.
    pub radius: f64,
}

impl BoundingSphere {
    /// Create a new bounding sphere.
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// A surface the camera can be anchored to.
///
/// Implementations must report the hit closest to `start` when a segment crosses the surface
/// more than once.
pub trait Terrain: Send + Sync + 'static {
    /// Intersect the segment from `start` to `end` with the terrain.
    fn intersect(&self, start: DVec3, end: DVec3) -> Option<RayHit>;

    /// The sphere enclosing all of the terrain.
    fn bounding_sphere(&self) -> BoundingSphere;
}

/// Shared, read-only handle to the terrain a camera is bound to.
#[derive(Clone, Deref)]
pub struct TerrainHandle(pub Arc<dyn Terrain>);

impl TerrainHandle {
    /// Wrap a terrain so it can be shared between cameras.
    pub fn new(terrain: impl Terrain) -> Self {
        Self(Arc::new(terrain))
    }
}

impl<T: Terrain> From<Arc<T>> for TerrainHandle {
    fn from(terrain: Arc<T>) -> Self {
        Self(terrain)
    }
}

impl std::fmt::Debug for TerrainHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerrainHandle")
            .field("bounding_sphere", &self.0.bounding_sphere())
            .finish()
    }
}
