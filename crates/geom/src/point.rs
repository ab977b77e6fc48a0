use std::ops::{Add, Sub};

use super::Rect;

/// A signed 2D point in pixel coordinates.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Point {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
}

impl Point {
    /// Construct a new point.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return the origin point.
    pub fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Return true when both coordinates are zero.
    pub fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Clamp a point, constraining it to fall within `rect`.
    pub fn clamp(&self, rect: Rect) -> Self {
        Self {
            x: self.x.clamp(rect.tl.x, rect.right().max(rect.tl.x)),
            y: self.y.clamp(rect.tl.y, rect.bottom().max(rect.tl.y)),
        }
    }

    /// Chebyshev distance between two points.
    pub fn distance(&self, other: Self) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x.saturating_add(other.x),
            y: self.y.saturating_add(other.y),
        }
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x.saturating_sub(other.x),
            y: self.y.saturating_sub(other.y),
        }
    }
}

impl From<(i32, i32)> for Point {
    #[inline]
    fn from(v: (i32, i32)) -> Self {
        Self { x: v.0, y: v.1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sub() {
        assert_eq!(Point::zero() + (1, 1).into(), (1, 1).into());
        assert_eq!(Point::new(5, 3) - Point::new(2, 4), Point::new(3, -1));
    }

    #[test]
    fn clamp_to_rect() {
        let r = Rect::new(10, 10, 5, 5);
        assert_eq!(Point::new(0, 30).clamp(r), Point::new(10, 15));
        assert_eq!(Point::new(12, 12).clamp(r), Point::new(12, 12));
    }

    #[test]
    fn chebyshev() {
        assert_eq!(Point::new(0, 0).distance(Point::new(-3, 7)), 7);
    }
}
