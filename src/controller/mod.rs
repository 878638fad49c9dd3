//! Camera controller implementation: the [`TerrainCam`](component::TerrainCam) state machine,
//! its motion math, and the systems that feed it bevy input.

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_input::{keyboard::KeyCode, mouse::MouseButton, ButtonInput, InputSystem};
use bevy_log::prelude::*;
use bevy_math::{DVec2, Rect, Vec2};
use bevy_render::prelude::*;
use bevy_time::prelude::*;
use bevy_transform::{prelude::*, TransformSystem};
use bevy_window::{PrimaryWindow, RequestRedraw, Window};

use self::{
    component::TerrainCam,
    host::HostRequests,
    inputs::{PointerButtons, PointerSample},
    motion::ManipulatorEvent,
};

pub mod component;
pub mod host;
pub mod inputs;
pub mod momentum;
pub mod motion;
pub mod trackball;
pub mod zoom;

/// Adds [`TerrainCam`] functionality with all extensions disabled.
pub struct TerrainCamControllerPlugin;

impl Plugin for TerrainCamControllerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<RequestRedraw>()
            .add_systems(
                PreUpdate,
                (home_new_cameras, send_input_events)
                    .chain()
                    .after(InputSystem),
            )
            .add_systems(
                PostUpdate,
                (sync_camera_transforms, request_redraws)
                    .before(TransformSystem::TransformPropagate),
            )
            .register_type::<HostRequests>();
    }
}

/// Send newly spawned cameras to their home position.
pub fn home_new_cameras(
    mut cameras: Query<(&mut TerrainCam, &mut HostRequests), Added<TerrainCam>>,
) {
    for (mut cam, mut requests) in &mut cameras {
        cam.init();
        cam.home(&mut *requests);
    }
}

/// Translate this frame's mouse and keyboard input into [`ManipulatorEvent`]s for every
/// [`TerrainCam`], followed by a [`ManipulatorEvent::Frame`].
pub fn send_input_events(
    mouse: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut cameras: Query<(&mut TerrainCam, &mut HostRequests, Option<&Camera>)>,
    mut last_cursor: Local<Option<Vec2>>,
) {
    let window = windows.get_single().ok();
    let cursor = window.and_then(Window::cursor_position);
    let cursor_moved = cursor.is_some() && cursor != *last_cursor;
    *last_cursor = cursor;

    let buttons = PointerButtons::from_input(&mouse);
    let pressed = !PointerButtons::from_mouse_buttons(mouse.get_just_pressed()).is_empty();
    let released = !PointerButtons::from_mouse_buttons(mouse.get_just_released()).is_empty();
    let now = time.elapsed_secs_f64();

    for (mut cam, mut requests, camera) in &mut cameras {
        let requests = &mut *requests;
        let viewport = camera
            .and_then(Camera::logical_viewport_rect)
            .or_else(|| window.map(|w| Rect::from_corners(Vec2::ZERO, w.size())));
        let sample = cursor
            .zip(viewport)
            .and_then(|(cursor, viewport)| normalize_cursor(cursor, viewport))
            .map(|position| PointerSample::new(position, buttons, now));

        if let (true, Some(sample)) = (pressed, sample) {
            cam.handle(&ManipulatorEvent::Press(sample), requests);
        }
        if released {
            // Outside the window there is no cursor: release where the pointer was last seen.
            let release = sample.or_else(|| {
                cam.history()
                    .newest()
                    .map(|last| PointerSample::new(last.position, buttons, now))
            });
            if let Some(release) = release {
                cam.handle(&ManipulatorEvent::Release(release), requests);
            }
        }
        if let Some(sample) = sample {
            if cursor_moved && !pressed && !released {
                let event = if buttons.is_empty() {
                    ManipulatorEvent::Move(sample)
                } else {
                    ManipulatorEvent::Drag(sample)
                };
                cam.handle(&event, requests);
            }
        }
        for key in keys.get_just_pressed() {
            cam.handle(&ManipulatorEvent::Key(*key), requests);
        }
        cam.handle(&ManipulatorEvent::Frame, requests);
    }
}

/// Map a logical cursor position to `[-1, 1]` across the viewport, Y up.
pub fn normalize_cursor(cursor: Vec2, viewport: Rect) -> Option<DVec2> {
    let size = viewport.size().as_dvec2();
    if size.x <= 0.0 || size.y <= 0.0 {
        return None;
    }
    let fraction = (cursor - viewport.min).as_dvec2() / size;
    Some(DVec2::new(fraction.x * 2.0 - 1.0, 1.0 - fraction.y * 2.0))
}

/// Write each controller's pose into its camera [`Transform`].
pub fn sync_camera_transforms(mut cameras: Query<(&TerrainCam, &mut Transform)>) {
    for (cam, mut transform) in &mut cameras {
        let camera_to_world = cam.inverse_view_matrix();
        if !camera_to_world.is_finite() {
            error_once!("TerrainCam produced a non-finite camera transform");
            continue;
        }
        transform.set_if_neq(Transform::from_matrix(camera_to_world.as_mat4()));
    }
}

/// Forward controller redraw requests to the window.
pub fn request_redraws(
    mut cameras: Query<&mut HostRequests>,
    mut redraw: EventWriter<RequestRedraw>,
) {
    let mut any = false;
    for mut requests in &mut cameras {
        any |= requests.take_redraw();
    }
    if any {
        redraw.send(RequestRedraw);
    }
}
