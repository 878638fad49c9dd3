//! Provides [`ZoomLimits`] settings.

use bevy_reflect::Reflect;

/// Bound how close the camera may zoom towards its anchor on the terrain.
#[derive(Debug, Clone, Reflect)]
pub struct ZoomLimits {
    /// The closest the camera may get to its anchor, as a fraction of the model scale (the
    /// radius of the terrain's bounding sphere).
    ///
    /// With a terrain one kilometer across, the default of `5e-4` stops zooming at roughly a
    /// quarter of a meter from the surface.
    pub minimum_zoom_scale: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            minimum_zoom_scale: 0.0005,
        }
    }
}

impl ZoomLimits {
    /// The smallest distance allowed for a model of the given scale.
    pub fn minimum_distance(&self, model_scale: f64) -> f64 {
        model_scale * self.minimum_zoom_scale
    }

    /// The distance after zooming by a vertical pointer delta `dy`, or `None` if the zoom would
    /// take the camera to or past the minimum distance.
    ///
    /// Non-finite and non-positive results are always rejected, so repeated zooming can never
    /// collapse or invert the distance.
    pub fn zoomed_distance(&self, distance: f64, dy: f64, model_scale: f64) -> Option<f64> {
        let scaled = distance * (1.0 + dy);
        (scaled.is_finite() && scaled > self.minimum_distance(model_scale) && scaled > 0.0)
            .then_some(scaled)
    }
}
