//! Settings for "throwing" the camera: motion that continues after the pointer is released.

use bevy_reflect::prelude::*;

/// Controls when a released drag keeps moving the camera.
///
/// If the pointer was still moving faster than [`Momentum::throw_threshold`] when every button
/// was released, the last computed movement is replayed every frame until the next press.
#[derive(Debug, Clone, Copy, Reflect)]
pub struct Momentum {
    /// Minimum pointer speed at release, in normalized viewport units per second, for the
    /// camera to be thrown. Set to `f64::INFINITY` to disable throwing.
    pub throw_threshold: f64,
}

impl Default for Momentum {
    fn default() -> Self {
        Self {
            throw_threshold: 0.1,
        }
    }
}

impl Momentum {
    /// Never throw the camera.
    pub fn disabled() -> Self {
        Self {
            throw_threshold: f64::INFINITY,
        }
    }
}
