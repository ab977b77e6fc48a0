use super::{Axis, Edges, Expanse, Point};

/// A rectangle with a signed origin and unsigned size.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Rect {
    /// Top-left corner.
    pub tl: Point,
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

/// Saturating conversion from a 64-bit coordinate into the i32 space.
fn coord(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Saturating conversion from a 64-bit length into the u32 space.
fn length(v: i64) -> u32 {
    v.clamp(0, i64::from(u32::MAX)) as u32
}

impl Rect {
    /// Construct a rectangle from coordinates and size.
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self {
            tl: Point { x, y },
            w,
            h,
        }
    }

    /// Construct a rectangle from signed dimensions, treating negative sizes as zero.
    pub fn from_signed(x: i32, y: i32, w: i64, h: i64) -> Self {
        Self::new(x, y, length(w), length(h))
    }

    /// A zero-sized rect at the origin.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build a rect from an origin and a size.
    pub fn at(tl: Point, size: Expanse) -> Self {
        Self {
            tl,
            w: size.w,
            h: size.h,
        }
    }

    /// Does this rect have a zero size?
    pub fn is_zero(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// The size of the rect.
    pub fn expanse(&self) -> Expanse {
        Expanse::new(self.w, self.h)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        coord(i64::from(self.tl.x) + i64::from(self.w))
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        coord(i64::from(self.tl.y) + i64::from(self.h))
    }

    /// Does the rect contain the point? Edges on the right and bottom are exclusive.
    pub fn contains_point(&self, p: Point) -> bool {
        i64::from(p.x) >= i64::from(self.tl.x)
            && i64::from(p.x) < i64::from(self.tl.x) + i64::from(self.w)
            && i64::from(p.y) >= i64::from(self.tl.y)
            && i64::from(p.y) < i64::from(self.tl.y) + i64::from(self.h)
    }

    /// Does this rect completely enclose `other`? Zero-sized rects are enclosed
    /// when their origin lies within the closed bounds of this rect.
    pub fn contains_rect(&self, other: &Self) -> bool {
        i64::from(other.tl.x) >= i64::from(self.tl.x)
            && i64::from(other.tl.y) >= i64::from(self.tl.y)
            && i64::from(other.tl.x) + i64::from(other.w)
                <= i64::from(self.tl.x) + i64::from(self.w)
            && i64::from(other.tl.y) + i64::from(other.h)
                <= i64::from(self.tl.y) + i64::from(self.h)
    }

    /// Intersect two rects, returning `None` if they do not overlap.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let left = i64::from(self.tl.x).max(i64::from(other.tl.x));
        let top = i64::from(self.tl.y).max(i64::from(other.tl.y));
        let right = (i64::from(self.tl.x) + i64::from(self.w))
            .min(i64::from(other.tl.x) + i64::from(other.w));
        let bottom = (i64::from(self.tl.y) + i64::from(self.h))
            .min(i64::from(other.tl.y) + i64::from(other.h));
        if right <= left || bottom <= top {
            return None;
        }
        Some(Self::new(
            coord(left),
            coord(top),
            length(right - left),
            length(bottom - top),
        ))
    }

    /// Clip this rect to `other`, collapsing to a zero-sized rect at the clamped
    /// origin when there is no overlap.
    pub fn clip_to(&self, other: &Self) -> Self {
        self.intersect(other)
            .unwrap_or_else(|| Self::at(self.tl.clamp(*other), Expanse::default()))
    }

    /// Move the rect the least distance needed to lie inside `bounds`. A rect
    /// larger than `bounds` on an axis is aligned to the start edge on that axis.
    pub fn clamped_within(&self, bounds: Self) -> Self {
        let axis = |pos: i32, len: u32, start: i32, avail: u32| -> i32 {
            let end = i64::from(start) + i64::from(avail) - i64::from(len);
            coord(i64::from(pos).min(end).max(i64::from(start)))
        };
        Self {
            tl: Point::new(
                axis(self.tl.x, self.w, bounds.tl.x, bounds.w),
                axis(self.tl.y, self.h, bounds.tl.y, bounds.h),
            ),
            ..*self
        }
    }

    /// The smallest rect enclosing both.
    pub fn union(&self, other: &Self) -> Self {
        let left = i64::from(self.tl.x).min(i64::from(other.tl.x));
        let top = i64::from(self.tl.y).min(i64::from(other.tl.y));
        let right = (i64::from(self.tl.x) + i64::from(self.w))
            .max(i64::from(other.tl.x) + i64::from(other.w));
        let bottom = (i64::from(self.tl.y) + i64::from(self.h))
            .max(i64::from(other.tl.y) + i64::from(other.h));
        Self::new(
            coord(left),
            coord(top),
            length(right - left),
            length(bottom - top),
        )
    }

    /// Shift the rect by an offset.
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            tl: self.tl + Point::new(dx, dy),
            ..*self
        }
    }

    /// Shrink the rect by per-side thickness. Sides that cannot fit collapse to zero.
    pub fn shrink(&self, edges: Edges) -> Self {
        let w = self.w.saturating_sub(edges.horizontal());
        let h = self.h.saturating_sub(edges.vertical());
        let dx = edges.left.min(self.w);
        let dy = edges.top.min(self.h);
        Self::new(
            coord(i64::from(self.tl.x) + i64::from(dx)),
            coord(i64::from(self.tl.y) + i64::from(dy)),
            w,
            h,
        )
    }

    /// Start coordinate along an axis.
    pub fn start(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.tl.x,
            Axis::Vertical => self.tl.y,
        }
    }

    /// Length along an axis.
    pub fn extent(&self, axis: Axis) -> u32 {
        self.expanse().along(axis)
    }
}
