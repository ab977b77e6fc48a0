//! Events synthesized by the desktop and delivered to nodes.

use crate::{
    geom::Point,
    input::{Key, Modifiers, MouseButton},
};

/// An event delivered to a single node. Events do not bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The pointer moved. Delivered to the capture target, or the hit node.
    MouseMove {
        /// Pointer position in desktop coordinates.
        position: Point,
    },
    /// A button went down over the node.
    MouseDown {
        /// Button pressed.
        button: MouseButton,
        /// Pointer position.
        position: Point,
    },
    /// A button went up. Delivered to the capture target when one exists.
    MouseUp {
        /// Button released.
        button: MouseButton,
        /// Pointer position.
        position: Point,
    },
    /// Press and release landed on the same node within the click thresholds.
    Click {
        /// Button clicked.
        button: MouseButton,
        /// Pointer position at release.
        position: Point,
    },
    /// A second click on the same node within the double-click interval.
    DoubleClick {
        /// Button clicked.
        button: MouseButton,
        /// Pointer position at release.
        position: Point,
    },
    /// The pointer entered the node.
    MouseEnter,
    /// The pointer left the node.
    MouseLeave,
    /// The wheel turned over the node.
    Wheel {
        /// Notches; positive scrolls up.
        delta: i32,
        /// Pointer position.
        position: Point,
    },
    /// A key went down, or auto-repeated.
    KeyDown {
        /// Key.
        key: Key,
        /// Modifier state.
        modifiers: Modifiers,
        /// True for auto-repeat.
        repeat: bool,
    },
    /// A key went up.
    KeyUp {
        /// Key.
        key: Key,
        /// Modifier state.
        modifiers: Modifiers,
    },
    /// Text input.
    Char(char),
    /// The node received keyboard focus.
    FocusGained,
    /// The node lost keyboard focus.
    FocusLost,
    /// Escape was pressed with no consumer while the node topped the modal stack.
    Cancel,
}

/// Discriminant of [`Event`], used to register handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// See [`Event::MouseMove`].
    MouseMove,
    /// See [`Event::MouseDown`].
    MouseDown,
    /// See [`Event::MouseUp`].
    MouseUp,
    /// See [`Event::Click`].
    Click,
    /// See [`Event::DoubleClick`].
    DoubleClick,
    /// See [`Event::MouseEnter`].
    MouseEnter,
    /// See [`Event::MouseLeave`].
    MouseLeave,
    /// See [`Event::Wheel`].
    Wheel,
    /// See [`Event::KeyDown`].
    KeyDown,
    /// See [`Event::KeyUp`].
    KeyUp,
    /// See [`Event::Char`].
    Char,
    /// See [`Event::FocusGained`].
    FocusGained,
    /// See [`Event::FocusLost`].
    FocusLost,
    /// See [`Event::Cancel`].
    Cancel,
}

impl Event {
    /// The kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::MouseMove { .. } => EventKind::MouseMove,
            Self::MouseDown { .. } => EventKind::MouseDown,
            Self::MouseUp { .. } => EventKind::MouseUp,
            Self::Click { .. } => EventKind::Click,
            Self::DoubleClick { .. } => EventKind::DoubleClick,
            Self::MouseEnter => EventKind::MouseEnter,
            Self::MouseLeave => EventKind::MouseLeave,
            Self::Wheel { .. } => EventKind::Wheel,
            Self::KeyDown { .. } => EventKind::KeyDown,
            Self::KeyUp { .. } => EventKind::KeyUp,
            Self::Char(_) => EventKind::Char,
            Self::FocusGained => EventKind::FocusGained,
            Self::FocusLost => EventKind::FocusLost,
            Self::Cancel => EventKind::Cancel,
        }
    }

    /// Pointer position carried by the event, if any.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::MouseMove { position }
            | Self::MouseDown { position, .. }
            | Self::MouseUp { position, .. }
            | Self::Click { position, .. }
            | Self::DoubleClick { position, .. }
            | Self::Wheel { position, .. } => Some(*position),
            _ => None,
        }
    }
}
