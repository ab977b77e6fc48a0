//! Raw device state sampled from the host once per frame.

use std::{collections::BTreeSet, time::Duration};

use crate::geom::Point;

/// A physical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// A printable key, identified by its unshifted character.
    Char(char),
    /// Function key F1..F24.
    F(u8),
    /// Tab.
    Tab,
    /// Enter.
    Enter,
    /// Escape.
    Escape,
    /// Backspace.
    Backspace,
    /// Delete.
    Delete,
    /// Insert.
    Insert,
    /// Space bar.
    Space,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home.
    Home,
    /// End.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Left shift.
    LeftShift,
    /// Right shift.
    RightShift,
    /// Left control.
    LeftControl,
    /// Right control.
    RightControl,
    /// Left alt.
    LeftAlt,
    /// Right alt.
    RightAlt,
}

impl Key {
    /// Is this a modifier key? Modifiers never auto-repeat.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Self::LeftShift
                | Self::RightShift
                | Self::LeftControl
                | Self::RightControl
                | Self::LeftAlt
                | Self::RightAlt
        )
    }
}

/// Modifier state derived from the down-key set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    /// Either shift key is down.
    pub shift: bool,
    /// Either control key is down.
    pub ctrl: bool,
    /// Either alt key is down.
    pub alt: bool,
}

impl Modifiers {
    /// Derive modifier state from a set of down keys.
    pub fn from_keys(keys: &BTreeSet<Key>) -> Self {
        Self {
            shift: keys.contains(&Key::LeftShift) || keys.contains(&Key::RightShift),
            ctrl: keys.contains(&Key::LeftControl) || keys.contains(&Key::RightControl),
            alt: keys.contains(&Key::LeftAlt) || keys.contains(&Key::RightAlt),
        }
    }
}

/// A pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    /// Middle button.
    Middle,
}

impl MouseButton {
    /// Every button, in edge-detection order.
    pub const ALL: [Self; 3] = [Self::Left, Self::Right, Self::Middle];
}

/// Pressed state of each pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Buttons {
    /// Primary button down.
    pub left: bool,
    /// Secondary button down.
    pub right: bool,
    /// Middle button down.
    pub middle: bool,
}

impl Buttons {
    /// Is `button` down?
    pub fn is_down(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Right => self.right,
            MouseButton::Middle => self.middle,
        }
    }

    /// Set the state of `button`.
    pub fn set(&mut self, button: MouseButton, down: bool) {
        match button {
            MouseButton::Left => self.left = down,
            MouseButton::Right => self.right = down,
            MouseButton::Middle => self.middle = down,
        }
    }

    /// Is any button down?
    pub fn any(&self) -> bool {
        self.left || self.right || self.middle
    }
}

/// Device state at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputSnapshot {
    /// Host clock at the time of sampling.
    pub time: Duration,
    /// Pointer position in desktop coordinates.
    pub pointer: Point,
    /// Pointer buttons.
    pub buttons: Buttons,
    /// Wheel notches since the previous sample; positive scrolls up.
    pub wheel: i32,
    /// Every key currently held.
    pub keys: BTreeSet<Key>,
    /// Text produced since the previous sample.
    pub text: String,
}

/// The host's device sampler, injected into the desktop.
pub trait InputSource {
    /// Sample current device state.
    fn sample(&mut self) -> InputSnapshot;
}
