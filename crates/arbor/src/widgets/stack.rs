use std::any::Any;

use crate::{
    error::{Error, Result},
    geom::{Axis, Expanse, Rect, UNBOUNDED},
    grid::{Proportion, TrackItem, solve_axis, total_extent, track_offsets},
    id::NodeId,
    layout::{ArrangeCtx, MeasureCtx},
    props::{Invalidate, Props},
    property::{PropKind, PropValue, WidgetProperty},
    widget::Widget,
};

/// Places visible children one after another along an axis.
///
/// Each child is one track of the grid solver, sized by its
/// `stack_proportion` (default `Auto`). On the cross axis every child gets
/// the full content extent.
#[derive(Debug, Clone, PartialEq)]
pub struct StackPanel {
    /// Stacking direction.
    axis: Axis,
    /// Gap between adjacent children.
    spacing: u32,
    /// Track sizes from the last arrange.
    sizes: Vec<u32>,
}

impl StackPanel {
    /// A stack along `axis`.
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            spacing: 0,
            sizes: Vec::new(),
        }
    }

    /// A top-to-bottom stack.
    pub fn vertical() -> Self {
        Self::new(Axis::Vertical)
    }

    /// A left-to-right stack.
    pub fn horizontal() -> Self {
        Self::new(Axis::Horizontal)
    }

    /// Builder form of [`set_spacing`](Self::set_spacing).
    pub fn with_spacing(mut self, spacing: u32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Stacking direction.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Change the stacking direction.
    pub fn set_axis(&mut self, axis: Axis) {
        self.axis = axis;
    }

    /// Gap between adjacent children.
    pub fn spacing(&self) -> u32 {
        self.spacing
    }

    /// Change the gap.
    pub fn set_spacing(&mut self, spacing: u32) {
        self.spacing = spacing;
    }

    /// Child extents along the stack axis from the last arrange.
    pub fn sizes(&self) -> &[u32] {
        &self.sizes
    }
}

/// Track proportion for each child.
fn proportions(children: &[NodeId], props: impl Fn(NodeId) -> Option<Proportion>) -> Vec<Proportion> {
    children
        .iter()
        .map(|c| props(*c).unwrap_or_default())
        .collect()
}

impl Widget for StackPanel {
    fn measure(&self, ctx: &mut MeasureCtx<'_>, available: Expanse) -> Expanse {
        let children = ctx.children();
        let props = proportions(&children, |c| ctx.props(c).map(Props::stack_proportion));
        let cross_avail = available.along(self.axis.cross());

        let mut items = Vec::with_capacity(children.len());
        let mut cross = 0;
        for (i, (child, prop)) in children.iter().zip(&props).enumerate() {
            let main_avail = match prop {
                Proportion::Pixels(px) => *px,
                _ => UNBOUNDED,
            };
            let size = ctx.measure_child(
                *child,
                Expanse::from_axis(self.axis, main_avail, cross_avail),
            );
            cross = cross.max(size.along(self.axis.cross()));
            items.push(TrackItem::new(i, 1, size.along(self.axis)));
        }
        if children.is_empty() {
            return Expanse::default();
        }
        let sizes = solve_axis(&props, self.spacing, None, &items);
        Expanse::from_axis(self.axis, total_extent(&sizes, self.spacing), cross)
    }

    fn arrange(&mut self, ctx: &mut ArrangeCtx<'_>, content: Rect) {
        let children = ctx.children();
        if children.is_empty() {
            self.sizes.clear();
            return;
        }
        let props = proportions(&children, |c| ctx.props(c).map(Props::stack_proportion));
        let items: Vec<TrackItem> = children
            .iter()
            .enumerate()
            .map(|(i, c)| TrackItem::new(i, 1, ctx.desired_size(*c).along(self.axis)))
            .collect();

        self.sizes = solve_axis(&props, self.spacing, Some(content.extent(self.axis)), &items);
        let offsets = track_offsets(&self.sizes, self.spacing);
        let cross = content.extent(self.axis.cross());
        for ((child, size), offset) in children.iter().zip(&self.sizes).zip(offsets) {
            let offset = i32::try_from(offset).unwrap_or(i32::MAX);
            let slot = match self.axis {
                Axis::Horizontal => Rect::new(
                    content.tl.x.saturating_add(offset),
                    content.tl.y,
                    *size,
                    cross,
                ),
                Axis::Vertical => Rect::new(
                    content.tl.x,
                    content.tl.y.saturating_add(offset),
                    cross,
                    *size,
                ),
            };
            ctx.arrange_child(*child, slot);
        }
    }

    fn properties(&self) -> &'static [WidgetProperty] {
        STACK_PROPERTIES
    }
}

/// Editable stack panel properties.
static STACK_PROPERTIES: &[WidgetProperty] = &[
    WidgetProperty {
        name: "spacing",
        kind: PropKind::Int,
        get: |w| {
            w.downcast_ref::<StackPanel>()
                .map(|s| PropValue::Int(i64::from(s.spacing)))
        },
        set: |w, v| {
            let px = v.into_pixels("spacing")?;
            stack_mut(w)?.spacing = px;
            Ok(Invalidate::Measure)
        },
    },
    WidgetProperty {
        name: "horizontal",
        kind: PropKind::Bool,
        get: |w| {
            w.downcast_ref::<StackPanel>()
                .map(|s| PropValue::Bool(s.axis == Axis::Horizontal))
        },
        set: |w, v| {
            let horizontal = v.into_bool("horizontal")?;
            stack_mut(w)?.axis = if horizontal {
                Axis::Horizontal
            } else {
                Axis::Vertical
            };
            Ok(Invalidate::Measure)
        },
    },
];

/// Mutable downcast for property setters.
fn stack_mut(w: &mut dyn Any) -> Result<&mut StackPanel> {
    w.downcast_mut::<StackPanel>()
        .ok_or_else(|| Error::Invalid("not a stack panel".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Core, testing::Probe};

    fn stack(core: &mut Core, panel: StackPanel, sizes: &[(u32, u32)]) -> Result<(NodeId, Vec<NodeId>)> {
        let s = core.add(panel).id();
        core.attach(core.root_id(), s)?;
        let mut kids = Vec::new();
        for (w, h) in sizes {
            let c = core.add(Probe::sized(*w, *h)).id();
            core.attach(s, c)?;
            kids.push(c);
        }
        Ok((s, kids))
    }

    #[test]
    fn vertical_accumulates() -> Result<()> {
        let mut core = Core::new();
        let (s, kids) = stack(
            &mut core,
            StackPanel::vertical().with_spacing(2),
            &[(10, 5), (30, 7)],
        )?;
        core.update_props(s, |p| {
            p.set_align(crate::Align::Start, crate::Align::Start);
        })?;
        core.update_layout(Rect::new(0, 0, 100, 100));
        assert_eq!(core.desired_size(s), Expanse::new(30, 14));
        assert_eq!(core.node(kids[1]).map(|n| n.rect()), Some(Rect::new(0, 7, 30, 7)));
        Ok(())
    }

    #[test]
    fn fill_child_takes_rest() -> Result<()> {
        let mut core = Core::new();
        let (_, kids) = stack(
            &mut core,
            StackPanel::horizontal(),
            &[(10, 5), (10, 5), (20, 5)],
        )?;
        core.try_update_props(kids[1], |p| p.set_stack_proportion(Proportion::Fill))?;
        core.update_layout(Rect::new(0, 0, 100, 10));
        assert_eq!(core.node(kids[1]).map(|n| n.rect()), Some(Rect::new(10, 0, 70, 10)));
        assert_eq!(core.node(kids[2]).map(|n| n.rect()), Some(Rect::new(80, 0, 20, 10)));
        Ok(())
    }

    #[test]
    fn hidden_children_take_no_space() -> Result<()> {
        let mut core = Core::new();
        let (s, kids) = stack(&mut core, StackPanel::vertical(), &[(5, 5), (5, 5), (5, 5)])?;
        core.update_props(kids[1], |p| {
            p.set_visible(false);
        })?;
        core.update_layout(Rect::new(0, 0, 20, 50));
        let sizes = core.with_widget(s, |s: &mut StackPanel, _| s.sizes().to_vec())?;
        assert_eq!(sizes, vec![5, 5]);
        assert_eq!(core.node(kids[2]).map(|n| n.rect().tl.y), Some(5));
        Ok(())
    }
}
