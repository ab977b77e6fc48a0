//! Geometry primitives used across arbor.

/// Per-side thickness for margins and padding.
mod edges;
/// Width/height size type.
mod expanse;
/// Point helpers.
mod point;
/// Rectangle operations.
mod rect;

pub use edges::Edges;
pub use expanse::Expanse;
pub use point::Point;
pub use rect::Rect;

/// Available size meaning "no limit" along an axis.
pub const UNBOUNDED: u32 = u32::MAX;

/// A layout axis.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Axis {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    Vertical,
}

impl Axis {
    /// The perpendicular axis.
    pub fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// Add two lengths, keeping `UNBOUNDED` sticky.
pub fn add_len(a: u32, b: u32) -> u32 {
    if a == UNBOUNDED || b == UNBOUNDED {
        UNBOUNDED
    } else {
        a.saturating_add(b)
    }
}

/// Subtract from a length, keeping `UNBOUNDED` sticky and clamping at zero.
pub fn sub_len(a: u32, b: u32) -> u32 {
    if a == UNBOUNDED { a } else { a.saturating_sub(b) }
}
