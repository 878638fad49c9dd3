//! A terrain following trackball camera controller for bevy.
//!
//! The camera orbits, pans, and zooms around an anchor point that is always glued to the
//! surface of a terrain. Panning slides the anchor across the terrain and re-anchors it to the
//! ground, so the camera follows hills and valleys, or the curvature of a planet when paired with
//! an [`EllipsoidFrame`](crate::terrain::frame::EllipsoidFrame).
//!
//! ## Getting Started
//!
//! 1. Add the [`DefaultTerrainCamPlugins`] to your app.
//! 2. Implement [`Terrain`](crate::terrain::Terrain) for your scene, or use one of the provided
//!    terrains such as [`Heightfield`](crate::terrain::heightfield::Heightfield).
//! 3. Add a [`TerrainCam`](crate::prelude::TerrainCam) bound to that terrain to a camera entity.
//!
//! ## Controls
//!
//! - Primary button drag: orbit with a virtual trackball. Releasing while moving throws the
//!   camera, which keeps spinning until the next press.
//! - Middle button drag, or primary and secondary together: pan across the terrain.
//! - Secondary button drag: zoom towards or away from the anchor.
//! - Space: return to the home position.
//!
//! ## Driving the Controller Yourself
//!
//! The controller is a plain state machine. Feed it
//! [`ManipulatorEvent`](crate::controller::motion::ManipulatorEvent)s with
//! [`TerrainCam::handle`](crate::prelude::TerrainCam::handle), passing any
//! [`ActionAdapter`](crate::controller::host::ActionAdapter) to receive redraw requests, and read
//! the resulting [`TerrainCam::view_matrix`](crate::prelude::TerrainCam::view_matrix).

pub mod controller;
pub mod extensions;
pub mod terrain;

/// Common imports.
pub mod prelude {
    pub use crate::{
        controller::{
            component::{EnabledMotion, Sensitivity, TerrainCam},
            host::{ActionAdapter, HostRequests},
            inputs::{InputBindings, PointerButtons, PointerSample},
            momentum::Momentum,
            motion::{CurrentMotion, ManipulatorEvent},
            zoom::ZoomLimits,
            TerrainCamControllerPlugin,
        },
        terrain::{
            analytic::{FlatTerrain, SphereTerrain},
            frame::{CoordinateFrameProvider, EllipsoidFrame, FlatFrame},
            heightfield::Heightfield,
            BoundingSphere, RayHit, Terrain, TerrainHandle,
        },
        DefaultTerrainCamPlugins,
    };
}

/// Adds [`TerrainCam`](crate::prelude::TerrainCam) functionality with all extensions added.
pub struct DefaultTerrainCamPlugins;

impl bevy_app::PluginGroup for DefaultTerrainCamPlugins {
    #[allow(clippy::let_and_return)]
    fn build(self) -> bevy_app::PluginGroupBuilder {
        let group = bevy_app::PluginGroupBuilder::start::<Self>()
            .add(crate::controller::TerrainCamControllerPlugin);

        #[cfg(feature = "extension_anchor_indicator")]
        let group = group.add(crate::extensions::anchor_indicator::AnchorIndicatorPlugin);

        group
    }
}
