//! The primary [`Component`] of the controller, [`TerrainCam`].

use std::sync::Arc;

use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_math::{DMat3, DMat4, DQuat, DVec2, DVec3};
use bevy_reflect::prelude::*;

use super::{
    host::{ActionAdapter, HostRequests},
    inputs::{InputBindings, PointerHistory, PointerSample},
    momentum::Momentum,
    motion::{CurrentMotion, ManipulatorEvent, Movement, Transition},
    trackball::{self, TRACKBALL_SIZE},
    zoom::ZoomLimits,
};
use crate::terrain::{
    frame::{up_vector, CoordinateFrameProvider, FlatFrame},
    TerrainHandle,
};

/// Tracks all state of a terrain camera's controller: its settings, the terrain it is glued to,
/// and where it is looking.
///
/// The camera pose is stored relative to a local coordinate frame sitting on the terrain
/// surface (the anchor):
///
/// - [`TerrainCam::coordinate_frame`] is the frame tangent to the terrain at the anchor,
/// - [`TerrainCam::rotation`] orients the camera relative to that frame,
/// - [`TerrainCam::distance`] is how far the camera sits back from the anchor.
///
/// The camera-to-world transform is `frame * rotation * translate(0, 0, distance)`.
///
/// # Moving the Camera
///
/// The [`TerrainCamControllerPlugin`](crate::controller::TerrainCamControllerPlugin) turns mouse
/// and keyboard input into [`ManipulatorEvent`]s and writes the resulting pose into the camera
/// [`Transform`](bevy_transform::prelude::Transform) every frame. To drive the controller from
/// your own input source, call [`TerrainCam::handle`] with your own events and read
/// [`TerrainCam::inverse_view_matrix`].
///
/// - Primary button: orbit with a virtual trackball.
/// - Middle button, or primary and secondary together: pan across the terrain.
/// - Secondary button: zoom.
/// - [`InputBindings::reset`]: return to the home position.
#[derive(Component, Clone)]
#[require(HostRequests)]
pub struct TerrainCam {
    /// What input motions are currently allowed?
    pub enabled_motion: EnabledMotion,
    /// Input sensitivity of the camera.
    pub sensitivity: Sensitivity,
    /// When a release throws the camera.
    pub momentum: Momentum,
    /// How close the camera may zoom to the terrain.
    pub zoom_limits: ZoomLimits,
    /// Keyboard bindings.
    pub bindings: InputBindings,
    /// How far from the terrain the home position is, in bounding sphere radii.
    pub home_distance: f64,
    terrain: Option<TerrainHandle>,
    frame_provider: Arc<dyn CoordinateFrameProvider>,
    model_scale: f64,
    distance: f64,
    rotation: DQuat,
    coordinate_frame: DMat4,
    history: PointerHistory,
    current_motion: CurrentMotion,
}

impl Default for TerrainCam {
    fn default() -> Self {
        TerrainCam {
            enabled_motion: Default::default(),
            sensitivity: Default::default(),
            momentum: Default::default(),
            zoom_limits: Default::default(),
            bindings: Default::default(),
            home_distance: 3.5,
            terrain: None,
            frame_provider: Arc::new(FlatFrame),
            model_scale: 0.01,
            distance: 1.0,
            rotation: DQuat::IDENTITY,
            coordinate_frame: DMat4::IDENTITY,
            history: Default::default(),
            current_motion: Default::default(),
        }
    }
}

impl std::fmt::Debug for TerrainCam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerrainCam")
            .field("enabled_motion", &self.enabled_motion)
            .field("sensitivity", &self.sensitivity)
            .field("momentum", &self.momentum)
            .field("zoom_limits", &self.zoom_limits)
            .field("bindings", &self.bindings)
            .field("home_distance", &self.home_distance)
            .field("terrain", &self.terrain)
            .field("frame_provider", &"<provider>")
            .field("model_scale", &self.model_scale)
            .field("distance", &self.distance)
            .field("rotation", &self.rotation)
            .field("coordinate_frame", &self.coordinate_frame)
            .field("history", &self.history)
            .field("current_motion", &self.current_motion)
            .finish()
    }
}

impl TerrainCam {
    /// Create a controller bound to `terrain`, deriving local frames with `frame_provider`.
    pub fn new(
        terrain: impl Into<TerrainHandle>,
        frame_provider: impl CoordinateFrameProvider,
    ) -> Self {
        let mut cam = Self::default().with_frame_provider(frame_provider);
        cam.bind(terrain.into());
        cam
    }

    /// Use a different strategy for deriving local coordinate frames.
    pub fn with_frame_provider(self, frame_provider: impl CoordinateFrameProvider) -> Self {
        Self {
            frame_provider: Arc::new(frame_provider),
            ..self
        }
    }

    /// Bind the camera to a terrain. The model scale is taken from the terrain's bounding
    /// sphere.
    pub fn bind(&mut self, terrain: TerrainHandle) {
        self.model_scale = terrain.bounding_sphere().radius;
        self.terrain = Some(terrain);
    }

    /// The terrain the camera is bound to.
    pub fn terrain(&self) -> Option<&TerrainHandle> {
        self.terrain.as_ref()
    }

    /// Radius of the bound terrain's bounding sphere.
    pub fn model_scale(&self) -> f64 {
        self.model_scale
    }

    /// Distance from the camera to its anchor on the terrain.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Orientation of the camera relative to [`TerrainCam::coordinate_frame`].
    pub fn rotation(&self) -> DQuat {
        self.rotation
    }

    /// The local frame on the terrain surface the camera is expressed in.
    pub fn coordinate_frame(&self) -> DMat4 {
        self.coordinate_frame
    }

    /// World space position of the anchor: the point on the terrain the camera orbits.
    pub fn anchor(&self) -> DVec3 {
        self.coordinate_frame.w_axis.truncate()
    }

    /// What the camera is currently doing.
    pub fn current_motion(&self) -> CurrentMotion {
        self.current_motion
    }

    /// The pointer samples motion is computed from.
    pub fn history(&self) -> &PointerHistory {
        &self.history
    }

    /// The camera-to-world transform.
    pub fn inverse_view_matrix(&self) -> DMat4 {
        self.coordinate_frame
            * DMat4::from_quat(self.rotation)
            * DMat4::from_translation(DVec3::new(0.0, 0.0, self.distance))
    }

    /// The world-to-camera transform.
    pub fn view_matrix(&self) -> DMat4 {
        DMat4::from_translation(DVec3::new(0.0, 0.0, -self.distance))
            * DMat4::from_quat(self.rotation.inverse())
            * self.coordinate_frame.inverse()
    }

    /// World space position of the camera.
    pub fn eye(&self) -> DVec3 {
        self.inverse_view_matrix().w_axis.truncate()
    }

    /// Forget any pointer history and come to rest.
    pub fn init(&mut self) {
        self.history.flush();
        self.current_motion = CurrentMotion::Idle;
    }

    /// Place the camera at its home position: behind the terrain's bounding sphere along -Y,
    /// looking at its center, with world Z up.
    pub fn home(&mut self, actions: &mut impl ActionAdapter) {
        let Some(terrain) = &self.terrain else {
            error!("TerrainCam::home called before a terrain was bound");
            return;
        };
        let sphere = terrain.bounding_sphere();
        let eye = sphere.center + DVec3::new(0.0, -self.home_distance * sphere.radius, 0.0);
        self.compute_position(eye, sphere.center, DVec3::Z);
        actions.request_redraw();
    }

    /// Handle an input event. Returns `true` if the event was consumed by the controller.
    pub fn handle(&mut self, event: &ManipulatorEvent, actions: &mut impl ActionAdapter) -> bool {
        let transition = self.current_motion.transition(
            event,
            &self.history,
            self.momentum.throw_threshold,
            &self.bindings,
        );
        match transition {
            Transition::Restart(sample) => {
                self.history.flush();
                self.track(sample, actions);
            }
            Transition::Track(sample) => self.track(sample, actions),
            Transition::Throw(sample) => {
                if self.calc_movement() {
                    actions.request_redraw();
                    actions.request_continuous_update(true);
                    self.current_motion = CurrentMotion::Thrown;
                } else {
                    self.settle(sample, actions);
                }
            }
            Transition::Settle(sample) => self.settle(sample, actions),
            Transition::Replay => {
                if self.calc_movement() {
                    actions.request_redraw();
                }
            }
            Transition::Home => {
                self.init();
                self.home(actions);
                actions.request_redraw();
                actions.request_continuous_update(false);
            }
            Transition::Ignore => (),
        }
        transition.consumes_event()
    }

    fn track(&mut self, sample: PointerSample, actions: &mut impl ActionAdapter) {
        self.history.record(sample);
        if self.calc_movement() {
            actions.request_redraw();
        }
        actions.request_continuous_update(false);
        self.current_motion = CurrentMotion::Dragging;
    }

    fn settle(&mut self, sample: PointerSample, actions: &mut impl ActionAdapter) {
        self.history.flush();
        self.history.record(sample);
        if self.calc_movement() {
            actions.request_redraw();
        }
        actions.request_continuous_update(false);
        self.current_motion = CurrentMotion::Idle;
    }

    /// Move the camera according to the last two pointer samples. Returns `true` if the camera
    /// moved.
    ///
    /// The movement is chosen by the buttons held during the older of the two samples.
    pub fn calc_movement(&mut self) -> bool {
        let Some((previous, newest)) = self.history.pair() else {
            return false;
        };
        let delta = newest.position - previous.position;
        if delta.x == 0.0 && delta.y == 0.0 {
            return false;
        }
        match Movement::from_buttons(previous.buttons) {
            Some(Movement::Orbit) if self.enabled_motion.orbit => {
                self.orbit(previous.position, newest.position)
            }
            Some(Movement::Pan) if self.enabled_motion.pan => self.pan(delta),
            Some(Movement::Zoom) if self.enabled_motion.zoom => self.zoom(delta.y),
            _ => false,
        }
    }

    /// Rotate the camera about its anchor with the trackball. Only the rotation changes.
    pub fn orbit(&mut self, from: DVec2, to: DVec2) -> bool {
        let delta = trackball::trackball_rotation(
            from,
            to,
            self.rotation,
            self.sensitivity.trackball_size,
        );
        if !delta.is_finite() {
            return false;
        }
        self.rotation = (delta * self.rotation).normalize();
        true
    }

    /// Slide the anchor across the terrain by a pointer delta, then re-anchor it to the surface.
    ///
    /// If the terrain cannot be found under the moved anchor, the anchor keeps its new,
    /// re-oriented frame without being snapped to the surface.
    pub fn pan(&mut self, delta: DVec2) -> bool {
        let Some(terrain) = self.terrain.clone() else {
            error_once!("TerrainCam cannot pan before a terrain was bound");
            return false;
        };
        let scale = -self.sensitivity.pan * self.distance;
        let translation = (delta * scale).extend(0.0);

        let moved = self.coordinate_frame
            * DMat4::from_quat(self.rotation)
            * DMat4::from_translation(translation)
            * DMat4::from_quat(self.rotation.inverse());
        let origin = moved.w_axis.truncate();
        if !origin.is_finite() {
            return false;
        }
        self.coordinate_frame = self.frame_provider.coordinate_frame(origin);

        let radius = terrain.bounding_sphere().radius;
        let up = up_vector(&self.coordinate_frame);
        let start = origin + up * radius;
        let end = start - up * (2.0 * radius);
        match terrain.intersect(start, end) {
            Some(hit) => {
                self.coordinate_frame = self.frame_provider.coordinate_frame(hit.point);
            }
            None => debug!("TerrainCam unable to intersect with terrain while panning"),
        }
        true
    }

    /// Scale the distance to the anchor by `1 + dy`, unless that would reach the zoom limit.
    pub fn zoom(&mut self, dy: f64) -> bool {
        match self
            .zoom_limits
            .zoomed_distance(self.distance, dy, self.model_scale)
        {
            Some(distance) => {
                self.distance = distance;
                true
            }
            None => false,
        }
    }

    fn minimum_distance(&self) -> f64 {
        self.zoom_limits.minimum_distance(self.model_scale)
    }

    /// The rotation that orients `camera_to_world` relative to the current coordinate frame.
    fn relative_rotation(&self, camera_to_world: &DMat4) -> DQuat {
        let relative = self.coordinate_frame.inverse() * *camera_to_world;
        let rotation = DQuat::from_mat3(&DMat3::from_mat4(relative)).normalize();
        if rotation.is_finite() {
            rotation
        } else {
            DQuat::IDENTITY
        }
    }

    /// Re-derive the camera state from an externally supplied camera-to-world transform.
    ///
    /// The anchor is found by casting along the camera's view direction. If that misses, a
    /// vertical probe through the eye is tried and the camera is made to look straight down.
    /// If both miss, the anchor is placed in front of the camera at the current distance.
    pub fn set_by_matrix(&mut self, camera_to_world: DMat4) {
        let Some(terrain) = self.terrain.clone() else {
            error!("TerrainCam::set_by_matrix called before a terrain was bound");
            return;
        };
        let eye = camera_to_world.w_axis.truncate();
        let look = (-camera_to_world.z_axis.truncate()).normalize_or(DVec3::NEG_Z);
        let sphere = terrain.bounding_sphere();
        let span = (eye - sphere.center).length() + sphere.radius;
        debug!("TerrainCam placing eye {eye} looking {look}");

        if let Some(hit) = terrain.intersect(eye, eye + look * span) {
            debug!("TerrainCam hit terrain at {}", hit.point);
            self.coordinate_frame = self.frame_provider.coordinate_frame(hit.point);
            self.distance = (eye - hit.point).length().max(self.minimum_distance());
            self.rotation = self.relative_rotation(&camera_to_world);
            return;
        }

        let up = up_vector(&self.frame_provider.coordinate_frame(eye));
        if let Some(hit) = terrain.intersect(eye + up * span, eye - up * span) {
            debug!("TerrainCam hit terrain below eye at {}", hit.point);
            self.coordinate_frame = self.frame_provider.coordinate_frame(hit.point);
            self.distance = (eye - hit.point).length().max(self.minimum_distance());
            self.rotation = DQuat::IDENTITY;
            return;
        }

        debug!("TerrainCam found no terrain around {eye}");
        self.coordinate_frame = self
            .frame_provider
            .coordinate_frame(eye + look * self.distance);
        self.rotation = self.relative_rotation(&camera_to_world);
    }

    /// Place the camera at `eye`, looking at `center`, with `up` towards the top of the screen.
    ///
    /// The anchor is the first terrain hit between `eye` and `center`, or `center` itself if
    /// there is none.
    pub fn compute_position(&mut self, eye: DVec3, center: DVec3, up: DVec3) {
        let Some(terrain) = self.terrain.clone() else {
            error!("TerrainCam::compute_position called before a terrain was bound");
            return;
        };
        match terrain.intersect(eye, center) {
            Some(hit) => {
                debug!("TerrainCam hit terrain at {}", hit.point);
                self.coordinate_frame = self.frame_provider.coordinate_frame(hit.point);
                self.distance = (hit.point - eye).length();
            }
            None => {
                self.coordinate_frame = self.frame_provider.coordinate_frame(center);
                self.distance = (center - eye).length();
            }
        }
        self.distance = self.distance.max(self.minimum_distance());

        // The view matrix is frame^-1 * rotation^-1 * translation^-1, so the rotation is the
        // inverse of the rotation part of view * frame.
        let relative = DMat4::look_at_rh(eye, center, up) * self.coordinate_frame;
        let rotation = DQuat::from_mat3(&DMat3::from_mat4(relative))
            .inverse()
            .normalize();
        self.rotation = if rotation.is_finite() {
            rotation
        } else {
            warn!("TerrainCam cannot look from {eye} to {center} with up {up}");
            DQuat::IDENTITY
        };
    }
}

/// The sensitivity of the camera controller to inputs.
#[derive(Debug, Clone, Copy, Reflect)]
pub struct Sensitivity {
    /// Radius of the virtual trackball used for orbiting, in normalized viewport units. Smaller
    /// values rotate further for the same drag.
    pub trackball_size: f64,
    /// Pan distance per normalized viewport unit, as a fraction of the distance to the anchor.
    pub pan: f64,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self {
            trackball_size: TRACKBALL_SIZE,
            pan: 0.5,
        }
    }
}

/// Controls what kinds of motions are allowed. Disabled motions are also not thrown.
#[derive(Debug, Clone, Reflect)]
pub struct EnabledMotion {
    /// Should pan be enabled?
    pub pan: bool,
    /// Should orbit be enabled?
    pub orbit: bool,
    /// Should zoom be enabled?
    pub zoom: bool,
}

impl Default for EnabledMotion {
    fn default() -> Self {
        Self {
            pan: true,
            orbit: true,
            zoom: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{controller::inputs::PointerButtons, terrain::analytic::FlatTerrain};

    fn cam() -> TerrainCam {
        let mut cam = TerrainCam::new(TerrainHandle::new(FlatTerrain::new(100.0)), FlatFrame);
        cam.home(&mut HostRequests::default());
        cam
    }

    fn drag(cam: &mut TerrainCam, buttons: PointerButtons, from: DVec2, to: DVec2) -> bool {
        let mut requests = HostRequests::default();
        cam.handle(
            &ManipulatorEvent::Press(PointerSample::new(from, buttons, 0.0)),
            &mut requests,
        );
        cam.handle(
            &ManipulatorEvent::Drag(PointerSample::new(to, buttons, 0.1)),
            &mut requests,
        );
        requests.redraw
    }

    #[test]
    fn unbound_camera_stays_put() {
        let mut cam = TerrainCam::default();
        let mut requests = HostRequests::default();
        cam.home(&mut requests);
        assert!(!requests.redraw);
        cam.set_by_matrix(DMat4::from_translation(DVec3::Z));
        assert_eq!(cam.coordinate_frame(), DMat4::IDENTITY);
        assert!(!cam.pan(DVec2::new(0.1, 0.0)));
    }

    #[test]
    fn disabled_motion_does_not_move() {
        let mut cam = cam();
        cam.enabled_motion.orbit = false;
        let before = cam.rotation();
        assert!(!drag(
            &mut cam,
            PointerButtons::PRIMARY,
            DVec2::ZERO,
            DVec2::new(0.3, 0.0)
        ));
        assert_eq!(cam.rotation(), before);
    }

    #[test]
    fn unbound_button_chord_does_not_move() {
        let mut cam = cam();
        let before = cam.inverse_view_matrix();
        assert!(!drag(
            &mut cam,
            PointerButtons::PRIMARY | PointerButtons::MIDDLE,
            DVec2::ZERO,
            DVec2::new(0.3, 0.2)
        ));
        assert_eq!(cam.inverse_view_matrix(), before);
    }

    #[test]
    fn press_alone_does_not_move() {
        let mut cam = cam();
        let mut requests = HostRequests::default();
        assert!(cam.handle(
            &ManipulatorEvent::Press(PointerSample::new(
                DVec2::ZERO,
                PointerButtons::PRIMARY,
                0.0
            )),
            &mut requests,
        ));
        assert!(!requests.redraw);
        assert_eq!(cam.history().len(), 1);
        assert!(cam.current_motion().is_dragging());
    }

    #[test]
    fn debug_does_not_print_provider() {
        let text = format!("{:?}", cam());
        assert!(text.contains("TerrainCam"));
        assert!(text.contains("<provider>"));
    }
}
