use std::any::Any;

use crate::{
    context::Context,
    error::{Error, Result},
    event::Event,
    geom::{Expanse, Point, Rect, UNBOUNDED},
    layout::{ArrangeCtx, MeasureCtx},
    props::Invalidate,
    property::{PropKind, PropValue, WidgetProperty},
    widget::{EventOutcome, Widget},
};

/// A viewport onto content that may be larger than itself.
///
/// Content is measured without a limit on each scrollable axis, arranged at
/// its natural size, and shown through the viewport translated by the node's
/// scroll offset. The offset lives on the node, so it is read and changed
/// through [`Core::scroll_to`](crate::Core::scroll_to) and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollViewer {
    /// Scroll along x.
    horizontal: bool,
    /// Scroll along y.
    vertical: bool,
}

impl Default for ScrollViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollViewer {
    /// A viewer scrolling on both axes.
    pub fn new() -> Self {
        Self {
            horizontal: true,
            vertical: true,
        }
    }

    /// A viewer scrolling only vertically.
    pub fn vertical() -> Self {
        Self {
            horizontal: false,
            vertical: true,
        }
    }

    /// A viewer scrolling only horizontally.
    pub fn horizontal() -> Self {
        Self {
            horizontal: true,
            vertical: false,
        }
    }

    /// Is horizontal scrolling enabled?
    pub fn scrolls_horizontally(&self) -> bool {
        self.horizontal
    }

    /// Is vertical scrolling enabled?
    pub fn scrolls_vertically(&self) -> bool {
        self.vertical
    }

    /// Enable or disable scrolling per axis.
    pub fn set_scrolling(&mut self, horizontal: bool, vertical: bool) {
        self.horizontal = horizontal;
        self.vertical = vertical;
    }
}

impl Widget for ScrollViewer {
    fn measure(&self, ctx: &mut MeasureCtx<'_>, available: Expanse) -> Expanse {
        let inner = Expanse::new(
            if self.horizontal { UNBOUNDED } else { available.w },
            if self.vertical { UNBOUNDED } else { available.h },
        );
        let mut content = Expanse::default();
        for child in ctx.children() {
            content = content.max(ctx.measure_child(child, inner));
        }
        content.min(available)
    }

    fn arrange(&mut self, ctx: &mut ArrangeCtx<'_>, content: Rect) {
        let children = ctx.children();
        let view = content.expanse();
        let mut canvas = view;
        for child in &children {
            let desired = ctx.desired_size(*child);
            if self.horizontal {
                canvas.w = canvas.w.max(desired.w);
            }
            if self.vertical {
                canvas.h = canvas.h.max(desired.h);
            }
        }
        ctx.set_canvas(canvas);
        let slot = Rect::at(content.tl, canvas);
        for child in children {
            ctx.arrange_child(child, slot);
        }
    }

    fn on_event(&mut self, event: &Event, ctx: &mut dyn Context) -> Result<EventOutcome> {
        let Event::Wheel { delta, .. } = event else {
            return Ok(EventOutcome::Ignore);
        };
        let step = i32::try_from(ctx.config().wheel_step).unwrap_or(i32::MAX);
        let amount = delta.saturating_mul(step).saturating_neg();
        let before = ctx.core().node(ctx.node_id()).map(|n| n.scroll()).unwrap_or_default();
        let after = if self.vertical {
            ctx.scroll_by(0, amount)
        } else {
            ctx.scroll_by(amount, 0)
        };
        Ok(if after == before {
            EventOutcome::Consume
        } else {
            EventOutcome::Handle
        })
    }

    fn accepts_wheel(&self) -> bool {
        self.horizontal || self.vertical
    }

    fn properties(&self) -> &'static [WidgetProperty] {
        SCROLL_PROPERTIES
    }
}

/// Mutable downcast for property setters.
fn viewer_mut(w: &mut dyn Any) -> Result<&mut ScrollViewer> {
    w.downcast_mut::<ScrollViewer>()
        .ok_or_else(|| Error::Invalid("not a scroll viewer".into()))
}

/// Editable scroll viewer properties.
static SCROLL_PROPERTIES: &[WidgetProperty] = &[
    WidgetProperty {
        name: "horizontal_scroll",
        kind: PropKind::Bool,
        get: |w| {
            w.downcast_ref::<ScrollViewer>()
                .map(|s| PropValue::Bool(s.horizontal))
        },
        set: |w, v| {
            viewer_mut(w)?.horizontal = v.into_bool("horizontal_scroll")?;
            Ok(Invalidate::Measure)
        },
    },
    WidgetProperty {
        name: "vertical_scroll",
        kind: PropKind::Bool,
        get: |w| {
            w.downcast_ref::<ScrollViewer>()
                .map(|s| PropValue::Bool(s.vertical))
        },
        set: |w, v| {
            viewer_mut(w)?.vertical = v.into_bool("vertical_scroll")?;
            Ok(Invalidate::Measure)
        },
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Core, id::NodeId, testing::Probe};

    fn viewer(core: &mut Core, content: (u32, u32)) -> Result<(NodeId, NodeId)> {
        let v = core.add(ScrollViewer::vertical()).id();
        core.attach(core.root_id(), v)?;
        let c = core.add(Probe::sized(content.0, content.1)).id();
        core.attach(v, c)?;
        Ok((v, c))
    }

    #[test]
    fn content_keeps_natural_height() -> Result<()> {
        let mut core = Core::new();
        let (v, c) = viewer(&mut core, (50, 500))?;
        core.update_layout(Rect::new(0, 0, 80, 100));
        assert_eq!(core.node(c).map(|n| n.rect()), Some(Rect::new(0, 0, 80, 500)));
        assert_eq!(core.scroll_maximum(v), Point::new(0, 400));
        assert_eq!(core.scroll_to(v, Point::new(10, 900)), Point::new(0, 400));
        assert_eq!(core.scroll_to(v, Point::new(0, -3)), Point::zero());
        Ok(())
    }

    #[test]
    fn scrolled_content_is_hit_translated() -> Result<()> {
        let mut core = Core::new();
        let (v, c) = viewer(&mut core, (50, 500))?;
        core.update_layout(Rect::new(0, 0, 80, 100));
        core.scroll_to(v, Point::new(0, 150));
        assert_eq!(core.screen_rect(c), Some(Rect::new(0, -150, 80, 500)));
        assert_eq!(core.locate(Point::new(5, 50)), Some(c));
        assert_eq!(core.to_layout(c, Point::new(5, 50)), Point::new(5, 200));
        assert_eq!(core.locate(Point::new(5, 150)), None);
        Ok(())
    }

    #[test]
    fn shrinking_content_reclamps_offset() -> Result<()> {
        let mut core = Core::new();
        let (v, c) = viewer(&mut core, (50, 500))?;
        core.update_layout(Rect::new(0, 0, 80, 100));
        core.scroll_to(v, Point::new(0, 400));
        core.with_widget(c, |p: &mut Probe, _| p.size = Expanse::new(50, 150))?;
        core.update_layout(Rect::new(0, 0, 80, 100));
        assert_eq!(core.node(v).map(|n| n.scroll()), Some(Point::new(0, 50)));
        Ok(())
    }
}
