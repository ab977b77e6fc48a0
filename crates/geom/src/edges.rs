/// Thickness on each side of a rectangle, used for margins and padding.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Edges {
    /// Left thickness.
    pub left: u32,
    /// Top thickness.
    pub top: u32,
    /// Right thickness.
    pub right: u32,
    /// Bottom thickness.
    pub bottom: u32,
}

impl Edges {
    /// Construct edges from individual sides.
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The same thickness on every side.
    pub fn all(v: u32) -> Self {
        Self::new(v, v, v, v)
    }

    /// Horizontal and vertical thickness.
    pub fn symmetric(h: u32, v: u32) -> Self {
        Self::new(h, v, h, v)
    }

    /// Combined left and right thickness.
    pub fn horizontal(&self) -> u32 {
        self.left.saturating_add(self.right)
    }

    /// Combined top and bottom thickness.
    pub fn vertical(&self) -> u32 {
        self.top.saturating_add(self.bottom)
    }

    /// Is every side zero?
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}
