//! The seam through which the controller asks its host application for redraws.

use bevy_ecs::prelude::*;
use bevy_reflect::prelude::*;

/// Requests the controller makes of the application hosting it while handling an event.
pub trait ActionAdapter {
    /// Draw another frame, because the camera moved.
    fn request_redraw(&mut self);

    /// Start or stop drawing frames continuously, without waiting for input. Enabled while the
    /// camera is thrown.
    fn request_continuous_update(&mut self, enabled: bool);
}

/// Collects the requests made by a camera controller.
///
/// The plugin reads and clears [`HostRequests::redraw`] every frame, and keeps the app redrawing
/// while [`HostRequests::continuous_update`] is set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Component, Reflect)]
#[reflect(Component)]
pub struct HostRequests {
    /// A redraw was requested since the last frame.
    pub redraw: bool,
    /// Frames should be drawn continuously.
    pub continuous_update: bool,
}

impl HostRequests {
    /// Should a frame be drawn now? Clears the one-shot redraw request.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw) || self.continuous_update
    }
}

impl ActionAdapter for HostRequests {
    fn request_redraw(&mut self) {
        self.redraw = true;
    }

    fn request_continuous_update(&mut self, enabled: bool) {
        self.continuous_update = enabled;
    }
}
