//! Pointer samples, the two-sample history used to compute motion, and key bindings.

use bevy_input::{keyboard::KeyCode, mouse::MouseButton, ButtonInput};
use bevy_math::DVec2;
use bevy_reflect::prelude::*;

/// The set of pointer buttons held when a sample was taken.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub struct PointerButtons(u8);

impl PointerButtons {
    /// No buttons held.
    pub const NONE: Self = Self(0);
    /// Primary (usually left) button.
    pub const PRIMARY: Self = Self(1);
    /// Middle button.
    pub const MIDDLE: Self = Self(1 << 1);
    /// Secondary (usually right) button.
    pub const SECONDARY: Self = Self(1 << 2);

    /// Are no buttons held?
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Are all of the buttons in `other` held?
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// The pointer button a mouse button maps to. Other mouse buttons are ignored.
    pub fn from_mouse_button(button: MouseButton) -> Self {
        match button {
            MouseButton::Left => Self::PRIMARY,
            MouseButton::Middle => Self::MIDDLE,
            MouseButton::Right => Self::SECONDARY,
            _ => Self::NONE,
        }
    }

    /// The set of pointer buttons among `buttons`.
    pub fn from_mouse_buttons<'a>(buttons: impl IntoIterator<Item = &'a MouseButton>) -> Self {
        buttons
            .into_iter()
            .fold(Self::NONE, |set, button| set | Self::from_mouse_button(*button))
    }

    /// Buttons currently held according to bevy's mouse input state.
    pub fn from_input(input: &ButtonInput<MouseButton>) -> Self {
        Self::from_mouse_buttons(input.get_pressed())
    }
}

impl std::ops::BitOr for PointerButtons {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A copy of the parts of a pointer event the controller needs.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct PointerSample {
    /// Pointer position normalized to the viewport, `[-1, 1]` on both axes, Y up.
    pub position: DVec2,
    /// Buttons held at the time of the sample.
    pub buttons: PointerButtons,
    /// Time of the sample, in seconds.
    pub time: f64,
}

impl PointerSample {
    /// Create a new sample.
    pub fn new(position: DVec2, buttons: PointerButtons, time: f64) -> Self {
        Self {
            position,
            buttons,
            time,
        }
    }
}

/// The two most recent pointer samples, in arrival order.
///
/// Motion is always computed from the previous sample to the newest one. After a
/// [`flush`](Self::flush), no motion can be computed until two new samples have arrived.
#[derive(Debug, Default, Clone, PartialEq, Reflect)]
pub struct PointerHistory {
    newest: Option<PointerSample>,
    previous: Option<PointerSample>,
}

impl PointerHistory {
    /// Forget all samples.
    pub fn flush(&mut self) {
        self.newest = None;
        self.previous = None;
    }

    /// Push a new sample, dropping the oldest.
    pub fn record(&mut self, sample: PointerSample) {
        self.previous = self.newest.replace(sample);
    }

    /// The `(previous, newest)` pair, if two samples are available.
    pub fn pair(&self) -> Option<(PointerSample, PointerSample)> {
        Some((self.previous?, self.newest?))
    }

    /// The most recent sample.
    pub fn newest(&self) -> Option<PointerSample> {
        self.newest
    }

    /// Number of samples held, at most two.
    pub fn len(&self) -> usize {
        self.newest.is_some() as usize + self.previous.is_some() as usize
    }

    /// Is the history empty?
    pub fn is_empty(&self) -> bool {
        self.newest.is_none()
    }

    /// Was the pointer moving faster than `threshold` normalized units per second between the
    /// last two samples?
    pub fn is_moving(&self, threshold: f64) -> bool {
        let Some((previous, newest)) = self.pair() else {
            return false;
        };
        let distance = (newest.position - previous.position).length();
        let elapsed = newest.time - previous.time;
        distance > elapsed * threshold
    }
}

/// Keyboard bindings.
#[derive(Debug, Clone, Reflect)]
pub struct InputBindings {
    /// Pressing this key flies the camera back to its home position.
    pub reset: KeyCode,
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            reset: KeyCode::Space,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f64, y: f64, time: f64) -> PointerSample {
        PointerSample::new(DVec2::new(x, y), PointerButtons::PRIMARY, time)
    }

    #[test]
    fn keeps_two_most_recent() {
        let mut history = PointerHistory::default();
        assert!(history.pair().is_none());
        history.record(sample(0.0, 0.0, 0.0));
        assert_eq!(history.len(), 1);
        assert!(history.pair().is_none());
        history.record(sample(0.1, 0.0, 0.1));
        history.record(sample(0.2, 0.0, 0.2));
        let (previous, newest) = history.pair().unwrap();
        assert_eq!(previous.position.x, 0.1);
        assert_eq!(newest.position.x, 0.2);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn flush_clears_everything() {
        let mut history = PointerHistory::default();
        history.record(sample(0.0, 0.0, 0.0));
        history.record(sample(0.1, 0.0, 0.1));
        history.flush();
        assert!(history.is_empty());
        assert!(!history.is_moving(0.1));
    }

    #[test]
    fn moving_threshold() {
        let mut history = PointerHistory::default();
        history.record(sample(0.0, 0.0, 0.0));
        history.record(sample(0.5, 0.0, 1.0));
        // 0.5 units over 1 second.
        assert!(history.is_moving(0.1));
        assert!(history.is_moving(0.49));
        assert!(!history.is_moving(0.5));
        assert!(!history.is_moving(1.0));
    }

    #[test]
    fn simultaneous_samples_with_movement_are_moving() {
        let mut history = PointerHistory::default();
        history.record(sample(0.0, 0.0, 1.0));
        history.record(sample(0.01, 0.0, 1.0));
        assert!(history.is_moving(0.1));
    }

    #[test]
    fn button_sets() {
        let chord = PointerButtons::PRIMARY | PointerButtons::SECONDARY;
        assert!(chord.contains(PointerButtons::PRIMARY));
        assert!(!chord.contains(PointerButtons::MIDDLE));
        assert_ne!(chord, PointerButtons::PRIMARY);
        assert!(PointerButtons::NONE.is_empty());

        let mut input = ButtonInput::<MouseButton>::default();
        input.press(MouseButton::Middle);
        input.press(MouseButton::Back);
        assert_eq!(PointerButtons::from_input(&input), PointerButtons::MIDDLE);
    }

    #[test]
    fn side_buttons_are_ignored() {
        let mut input = ButtonInput::<MouseButton>::default();
        input.press(MouseButton::Back);
        input.press(MouseButton::Forward);
        input.press(MouseButton::Other(7));
        assert!(PointerButtons::from_mouse_buttons(input.get_just_pressed()).is_empty());

        input.press(MouseButton::Right);
        assert_eq!(
            PointerButtons::from_mouse_buttons(input.get_just_pressed()),
            PointerButtons::SECONDARY
        );
    }
}
