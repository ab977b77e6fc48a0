use crate::{
    geom::{Expanse, Point},
    layout::MeasureCtx,
    widget::Widget,
};

/// An empty leaf that takes up space and lets pointer input fall through.
///
/// Give it a size through its properties, or a `Fill` stack proportion to
/// push siblings apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spacer;

impl Widget for Spacer {
    fn measure(&self, _ctx: &mut MeasureCtx<'_>, _available: Expanse) -> Expanse {
        Expanse::default()
    }

    fn hit_test(&self, _local: Point, _size: Expanse) -> bool {
        false
    }
}
