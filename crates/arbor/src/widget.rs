//! Widget trait and event outcome types.

use std::any::{Any, type_name};

use crate::{
    context::Context,
    error::Result,
    event::Event,
    geom::{Expanse, Point, Rect},
    id::NodeId,
    layout::{ArrangeCtx, MeasureCtx},
    property::WidgetProperty,
    render::Render,
    state::NodeName,
};

/// The result of an event handler.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum EventOutcome {
    /// The event was processed and changed state.
    Handle,
    /// The event was processed without a state change.
    Consume,
    /// The event was not handled.
    Ignore,
}

impl EventOutcome {
    /// Was the event handled or consumed?
    pub fn is_handled(self) -> bool {
        !matches!(self, Self::Ignore)
    }
}

/// Widgets are the behavior attached to nodes in the Core arena.
///
/// The framework owns sizing hints, margin, padding, alignment and clamping;
/// widgets only deal with their content box. The default implementation
/// stacks every visible child on top of each other, filling the content box.
pub trait Widget: Any + Send {
    /// Measure the content size given the content-box space available.
    ///
    /// Must be a pure function of `available`, the widget's own state and the
    /// children's measurements. `UNBOUNDED` on an axis means no limit.
    fn measure(&self, ctx: &mut MeasureCtx<'_>, available: Expanse) -> Expanse {
        let mut size = Expanse::default();
        for child in ctx.children() {
            size = size.max(ctx.measure_child(child, available));
        }
        size
    }

    /// Position children inside `content`, the arranged content rect.
    fn arrange(&mut self, ctx: &mut ArrangeCtx<'_>, content: Rect) {
        for child in ctx.children() {
            ctx.arrange_child(child, content);
        }
    }

    /// Draw this widget's own content. Children are drawn afterwards by the framework.
    fn render(&mut self, _r: &mut Render<'_>) -> Result<()> {
        Ok(())
    }

    /// Does a point, relative to the node's top-left corner, hit this node?
    fn hit_test(&self, local: Point, size: Expanse) -> bool {
        local.x >= 0 && local.y >= 0 && (local.x as u32) < size.w && (local.y as u32) < size.h
    }

    /// Should hit-testing descend into children?
    fn hit_children(&self) -> bool {
        true
    }

    /// Handle an event delivered to this node.
    fn on_event(&mut self, _event: &Event, _ctx: &mut dyn Context) -> Result<EventOutcome> {
        Ok(EventOutcome::Ignore)
    }

    /// Can this widget take keyboard focus?
    fn accept_focus(&self) -> bool {
        false
    }

    /// Asked before focus moves away from this widget. Returning false vetoes the change.
    fn can_lose_focus(&self, _next: Option<NodeId>) -> bool {
        true
    }

    /// Does this widget consume wheel input?
    fn accepts_wheel(&self) -> bool {
        false
    }

    /// Widget-specific editable properties.
    fn properties(&self) -> &'static [WidgetProperty] {
        &[]
    }

    /// Name used in dumps and paths.
    fn name(&self) -> NodeName {
        let name = type_name::<Self>();
        let short = name
            .split('<')
            .next()
            .unwrap_or(name)
            .rsplit("::")
            .next()
            .unwrap_or(name);
        NodeName::convert(short)
    }
}

/// Convert widgets into boxed trait objects.
impl<W> From<W> for Box<dyn Widget>
where
    W: Widget + 'static,
{
    fn from(widget: W) -> Self {
        Box::new(widget)
    }
}
