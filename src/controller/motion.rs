//! The controller's explicit state machine: which events move it between being idle, dragged,
//! and thrown.

use bevy_input::keyboard::KeyCode;
use bevy_reflect::prelude::*;

use super::inputs::{InputBindings, PointerButtons, PointerHistory, PointerSample};

/// An input event delivered to the controller by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ManipulatorEvent {
    /// A pointer button was pressed. The sample includes the new button.
    Press(PointerSample),
    /// A pointer button was released. The sample holds the buttons that are still down.
    Release(PointerSample),
    /// The pointer moved while at least one button was held.
    Drag(PointerSample),
    /// The pointer moved with no buttons held.
    Move(PointerSample),
    /// A key was pressed.
    Key(KeyCode),
    /// A new frame is about to be drawn.
    Frame,
}

/// What the controller is currently doing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum CurrentMotion {
    /// Not moving.
    #[default]
    Idle,
    /// A pointer button is held and pointer motion moves the camera.
    Dragging,
    /// The pointer was released while moving: the last movement is replayed every frame.
    Thrown,
}

/// The work to perform in response to an event, decided by [`CurrentMotion::transition`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Start a fresh drag from this sample.
    Restart(PointerSample),
    /// Continue the current drag with this sample.
    Track(PointerSample),
    /// The pointer was released while moving. Keep replaying the last movement, or settle at
    /// this sample if there is nothing to replay.
    Throw(PointerSample),
    /// The drag ended without enough speed to throw. Come to rest at this sample.
    Settle(PointerSample),
    /// Replay the frozen movement for a new frame.
    Replay,
    /// Fly back to the home position.
    Home,
    /// Not handled.
    Ignore,
}

impl Transition {
    /// Does the host consider the event handled by the controller?
    pub fn consumes_event(&self) -> bool {
        !matches!(self, Transition::Replay | Transition::Ignore)
    }
}

impl CurrentMotion {
    /// Decide how to react to `event`.
    ///
    /// `history` is the pointer history *before* the event is recorded; it decides whether a
    /// release throws the camera.
    pub fn transition(
        self,
        event: &ManipulatorEvent,
        history: &PointerHistory,
        throw_threshold: f64,
        bindings: &InputBindings,
    ) -> Transition {
        match *event {
            ManipulatorEvent::Press(sample) => Transition::Restart(sample),
            ManipulatorEvent::Drag(sample) => Transition::Track(sample),
            // Chorded release: another button is still down, so start over with it.
            ManipulatorEvent::Release(sample) if !sample.buttons.is_empty() => {
                Transition::Restart(sample)
            }
            ManipulatorEvent::Release(sample) => {
                if history.is_moving(throw_threshold) {
                    Transition::Throw(sample)
                } else {
                    Transition::Settle(sample)
                }
            }
            ManipulatorEvent::Move(_) => Transition::Ignore,
            ManipulatorEvent::Key(key) if key == bindings.reset => Transition::Home,
            ManipulatorEvent::Key(_) => Transition::Ignore,
            ManipulatorEvent::Frame => match self {
                CurrentMotion::Thrown => Transition::Replay,
                CurrentMotion::Idle | CurrentMotion::Dragging => Transition::Ignore,
            },
        }
    }

    /// Is the camera being moved by the user right now?
    pub fn is_dragging(&self) -> bool {
        matches!(self, CurrentMotion::Dragging)
    }

    /// Is the camera coasting after a release?
    pub fn is_thrown(&self) -> bool {
        matches!(self, CurrentMotion::Thrown)
    }
}

/// The camera motion driven by a combination of pointer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    /// Rotate about the anchor with the trackball.
    Orbit,
    /// Slide the anchor across the terrain.
    Pan,
    /// Move towards or away from the anchor.
    Zoom,
}

impl Movement {
    /// The movement bound to exactly this set of buttons, if any.
    pub fn from_buttons(buttons: PointerButtons) -> Option<Self> {
        if buttons == PointerButtons::PRIMARY {
            Some(Movement::Orbit)
        } else if buttons == PointerButtons::MIDDLE
            || buttons == PointerButtons::PRIMARY | PointerButtons::SECONDARY
        {
            Some(Movement::Pan)
        } else if buttons == PointerButtons::SECONDARY {
            Some(Movement::Zoom)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy_math::DVec2;

    use super::*;

    fn sample(x: f64, buttons: PointerButtons, time: f64) -> PointerSample {
        PointerSample::new(DVec2::new(x, 0.0), buttons, time)
    }

    fn moving_history() -> PointerHistory {
        let mut history = PointerHistory::default();
        history.record(sample(0.0, PointerButtons::PRIMARY, 0.0));
        history.record(sample(0.5, PointerButtons::PRIMARY, 0.1));
        history
    }

    #[test]
    fn transition_table() {
        let bindings = InputBindings::default();
        let still = PointerHistory::default();
        let moving = moving_history();
        let held = sample(0.5, PointerButtons::PRIMARY, 0.2);
        let released = sample(0.5, PointerButtons::NONE, 0.2);

        for state in [
            CurrentMotion::Idle,
            CurrentMotion::Dragging,
            CurrentMotion::Thrown,
        ] {
            let t = |event: ManipulatorEvent, history: &PointerHistory| {
                state.transition(&event, history, 0.1, &bindings)
            };
            assert_eq!(
                t(ManipulatorEvent::Press(held), &moving),
                Transition::Restart(held)
            );
            assert_eq!(
                t(ManipulatorEvent::Drag(held), &moving),
                Transition::Track(held)
            );
            assert_eq!(
                t(ManipulatorEvent::Release(held), &moving),
                Transition::Restart(held)
            );
            assert_eq!(
                t(ManipulatorEvent::Release(released), &moving),
                Transition::Throw(released)
            );
            assert_eq!(
                t(ManipulatorEvent::Release(released), &still),
                Transition::Settle(released)
            );
            assert_eq!(
                t(ManipulatorEvent::Move(released), &moving),
                Transition::Ignore
            );
            assert_eq!(
                t(ManipulatorEvent::Key(KeyCode::Space), &moving),
                Transition::Home
            );
            assert_eq!(
                t(ManipulatorEvent::Key(KeyCode::KeyA), &moving),
                Transition::Ignore
            );
        }

        let frame = |state: CurrentMotion| {
            state.transition(&ManipulatorEvent::Frame, &moving, 0.1, &bindings)
        };
        assert_eq!(frame(CurrentMotion::Thrown), Transition::Replay);
        assert_eq!(frame(CurrentMotion::Dragging), Transition::Ignore);
        assert_eq!(frame(CurrentMotion::Idle), Transition::Ignore);
    }

    #[test]
    fn rebound_reset_key() {
        let bindings = InputBindings {
            reset: KeyCode::KeyH,
        };
        let history = PointerHistory::default();
        let t = |key| {
            CurrentMotion::Idle.transition(&ManipulatorEvent::Key(key), &history, 0.1, &bindings)
        };
        assert_eq!(t(KeyCode::KeyH), Transition::Home);
        assert_eq!(t(KeyCode::Space), Transition::Ignore);
    }

    #[test]
    fn slow_release_settles() {
        let bindings = InputBindings::default();
        let mut history = PointerHistory::default();
        history.record(sample(0.0, PointerButtons::PRIMARY, 0.0));
        history.record(sample(0.01, PointerButtons::PRIMARY, 1.0));
        let released = sample(0.01, PointerButtons::NONE, 1.1);
        assert_eq!(
            CurrentMotion::Dragging.transition(
                &ManipulatorEvent::Release(released),
                &history,
                0.1,
                &bindings
            ),
            Transition::Settle(released)
        );
    }

    #[test]
    fn button_bindings() {
        use PointerButtons as B;
        assert_eq!(Movement::from_buttons(B::PRIMARY), Some(Movement::Orbit));
        assert_eq!(Movement::from_buttons(B::MIDDLE), Some(Movement::Pan));
        assert_eq!(
            Movement::from_buttons(B::PRIMARY | B::SECONDARY),
            Some(Movement::Pan)
        );
        assert_eq!(Movement::from_buttons(B::SECONDARY), Some(Movement::Zoom));
        assert_eq!(Movement::from_buttons(B::NONE), None);
        assert_eq!(Movement::from_buttons(B::PRIMARY | B::MIDDLE), None);
        assert_eq!(
            Movement::from_buttons(B::PRIMARY | B::MIDDLE | B::SECONDARY),
            None
        );
    }

    #[test]
    fn consumed_events() {
        assert!(Transition::Home.consumes_event());
        let released = sample(0.0, PointerButtons::NONE, 0.0);
        assert!(Transition::Throw(released).consumes_event());
        assert!(Transition::Settle(released).consumes_event());
        assert!(!Transition::Replay.consumes_event());
        assert!(!Transition::Ignore.consumes_event());
    }
}
