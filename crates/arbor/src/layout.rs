//! The two-pass measure/arrange protocol.
//!
//! Measurement runs top-down from the root with the viewport as the available
//! size. Each node caches its desired size together with the available size it
//! was computed for, so clean subtrees are skipped. Arrangement follows, again
//! top-down, and skips nodes whose slot is unchanged and which are not dirty.

use tracing::{trace, trace_span, warn};

use crate::{
    config::DesktopConfig,
    geom::{Edges, Expanse, Point, Rect, UNBOUNDED, add_len, sub_len},
    id::NodeId,
    props::{Align, Props, Sizing},
    world::Core,
};

/// Context handed to [`Widget::measure`](crate::Widget::measure).
pub struct MeasureCtx<'a> {
    /// Core being laid out.
    core: &'a mut Core,
    /// Node being measured.
    node: NodeId,
}

impl<'a> MeasureCtx<'a> {
    /// Build a context for a node.
    pub(crate) fn new(core: &'a mut Core, node: NodeId) -> Self {
        Self { core, node }
    }

    /// The node being measured.
    pub fn node_id(&self) -> NodeId {
        self.node
    }

    /// Visible children in z-order.
    pub fn children(&self) -> Vec<NodeId> {
        visible_children(self.core, self.node)
    }

    /// Measure a child with the given available size, returning its desired
    /// size including margin. Clean children with an unchanged available size
    /// return their cached result.
    pub fn measure_child(&mut self, child: NodeId, available: Expanse) -> Expanse {
        measure_node(self.core, child, available)
    }

    /// Properties of a node, typically a child's attached grid or stack settings.
    pub fn props(&self, node: NodeId) -> Option<&Props> {
        self.core.nodes.get(node).map(|n| &n.props)
    }

    /// Desktop configuration.
    pub fn config(&self) -> &DesktopConfig {
        &self.core.config
    }
}

/// Context handed to [`Widget::arrange`](crate::Widget::arrange).
///
/// Arrangement may position children and record scroll extents, but cannot
/// invalidate measurement.
pub struct ArrangeCtx<'a> {
    /// Core being laid out.
    core: &'a mut Core,
    /// Node being arranged.
    node: NodeId,
    /// Content rect of the node being arranged.
    content: Rect,
}

impl<'a> ArrangeCtx<'a> {
    /// Build a context for a node.
    pub(crate) fn new(core: &'a mut Core, node: NodeId, content: Rect) -> Self {
        Self {
            core,
            node,
            content,
        }
    }

    /// The node being arranged.
    pub fn node_id(&self) -> NodeId {
        self.node
    }

    /// Visible children in z-order.
    pub fn children(&self) -> Vec<NodeId> {
        visible_children(self.core, self.node)
    }

    /// A node's desired size from the measure pass, including margin.
    pub fn desired_size(&self, node: NodeId) -> Expanse {
        self.core
            .nodes
            .get(node)
            .map(|n| n.desired)
            .unwrap_or_default()
    }

    /// Properties of a node.
    pub fn props(&self, node: NodeId) -> Option<&Props> {
        self.core.nodes.get(node).map(|n| &n.props)
    }

    /// Desktop configuration.
    pub fn config(&self) -> &DesktopConfig {
        &self.core.config
    }

    /// Give a child its slot. When this node clips and is not scrolling, the
    /// child's rect is clipped to this node's content rect.
    pub fn arrange_child(&mut self, child: NodeId, slot: Rect) {
        let clip = self
            .core
            .nodes
            .get(self.node)
            .filter(|n| n.props.clip() && n.canvas.is_none())
            .map(|_| self.content);
        arrange_node(self.core, child, slot, clip);
    }

    /// Declare this node a scroll host whose children span `canvas`. The
    /// scroll offset is clamped to the new extent and returned.
    pub fn set_canvas(&mut self, canvas: Expanse) -> Point {
        let view = self.content.expanse();
        match self.core.nodes.get_mut(self.node) {
            Some(node) => {
                node.canvas = Some(canvas);
                node.scroll = clamp_scroll(node.scroll, view, canvas);
                node.scroll
            }
            None => Point::zero(),
        }
    }

    /// Current scroll offset of this node.
    pub fn scroll(&self) -> Point {
        self.core
            .nodes
            .get(self.node)
            .map(|n| n.scroll)
            .unwrap_or_default()
    }
}

/// Visible children of a node in z-order.
fn visible_children(core: &Core, node: NodeId) -> Vec<NodeId> {
    let Some(n) = core.nodes.get(node) else {
        return Vec::new();
    };
    n.children
        .iter()
        .copied()
        .filter(|c| core.nodes.get(*c).is_some_and(|c| c.props.visible()))
        .collect()
}

/// Run a full layout pass over the tree rooted at the core's root.
pub(crate) fn run(core: &mut Core, bounds: Rect) {
    let _span = trace_span!("layout", w = bounds.w, h = bounds.h).entered();
    let root = core.root;
    let desired = measure_node(core, root, bounds.expanse());
    trace!(?desired, "measured root");
    arrange_node(core, root, bounds, None);
}

/// Measure a node, returning its desired size including margin.
pub(crate) fn measure_node(core: &mut Core, id: NodeId, available: Expanse) -> Expanse {
    let Some(node) = core.nodes.get(id) else {
        return Expanse::default();
    };
    if !node.props.visible() {
        return Expanse::default();
    }
    if !node.measure_dirty && node.last_available == Some(available) {
        return node.desired;
    }
    let sizing = node.props.sizing();
    let previous = node.desired;
    let inner = inner_available(available, &sizing);

    let content = match core.with_widget_mut(id, |w, core| {
        let mut ctx = MeasureCtx::new(core, id);
        w.measure(&mut ctx, inner)
    }) {
        Ok(content) => content,
        Err(e) => {
            warn!(?id, error = %e, "measure skipped");
            return previous;
        }
    };
    let desired = finish_measure(content, &sizing);

    if let Some(node) = core.nodes.get_mut(id) {
        if node.desired != desired {
            node.arrange_dirty = true;
        }
        node.desired = desired;
        node.last_available = Some(available);
        node.measure_dirty = false;
    }
    trace!(?id, ?available, ?desired, "measure");
    desired
}

/// Arrange a node into a slot allocated by its parent.
pub(crate) fn arrange_node(core: &mut Core, id: NodeId, slot: Rect, clip: Option<Rect>) {
    let Some(node) = core.nodes.get_mut(id) else {
        return;
    };
    if !node.props.visible() {
        return;
    }
    // A clipped slot depends on the parent's content rect too, so it is never cached.
    if !node.arrange_dirty && node.last_slot == Some(slot) && clip.is_none() {
        return;
    }
    let sizing = node.props.sizing();
    let natural = node.measured_size();
    let area = slot.shrink(sizing.margin);

    let (x, w) = place(
        area.tl.x,
        area.w,
        natural.w,
        sizing.width,
        (sizing.min.w, sizing.max.w),
        sizing.h_align,
        sizing.left,
    );
    let (y, h) = place(
        area.tl.y,
        area.h,
        natural.h,
        sizing.height,
        (sizing.min.h, sizing.max.h),
        sizing.v_align,
        sizing.top,
    );
    let mut rect = Rect::new(x, y, w, h);
    if let Some(clip) = clip {
        rect = rect.clip_to(&clip);
    }
    let content = rect.shrink(sizing.padding);
    node.rect = rect;
    node.content = content;
    node.last_slot = Some(slot);
    node.canvas = None;

    if let Err(e) = core.with_widget_mut(id, |w, core| {
        let mut ctx = ArrangeCtx::new(core, id, content);
        w.arrange(&mut ctx, content);
    }) {
        warn!(?id, error = %e, "arrange skipped");
    }
    if let Some(node) = core.nodes.get_mut(id) {
        node.arrange_dirty = false;
    }
    trace!(?id, ?rect, "arrange");
}

/// Space left for the content box after margin, explicit size, max clamp and padding.
fn inner_available(available: Expanse, s: &Sizing) -> Expanse {
    let axis = |avail: u32, margin: u32, padding: u32, explicit: Option<u32>, max: u32| {
        let outer = explicit.unwrap_or_else(|| sub_len(avail, margin)).min(max);
        sub_len(outer, padding)
    };
    Expanse::new(
        axis(
            available.w,
            s.margin.horizontal(),
            s.padding.horizontal(),
            s.width,
            s.max.w,
        ),
        axis(
            available.h,
            s.margin.vertical(),
            s.padding.vertical(),
            s.height,
            s.max.h,
        ),
    )
}

/// Turn a content size into a desired size: add padding, apply the explicit
/// size and clamps, then add margin.
fn finish_measure(content: Expanse, s: &Sizing) -> Expanse {
    let axis = |content: u32, padding: u32, explicit: Option<u32>, min: u32, max: u32| {
        let size = explicit
            .unwrap_or_else(|| add_len(content, padding))
            .clamp(min, max);
        // A content size that is still unbounded has no meaningful extent.
        if size == UNBOUNDED { min } else { size }
    };
    let m: Edges = s.margin;
    Expanse::new(
        axis(content.w, s.padding.horizontal(), s.width, s.min.w, s.max.w)
            .saturating_add(m.horizontal()),
        axis(content.h, s.padding.vertical(), s.height, s.min.h, s.max.h)
            .saturating_add(m.vertical()),
    )
}

/// Place a node along one axis of its slot. Returns the start coordinate and length.
fn place(
    start: i32,
    avail: u32,
    natural: u32,
    explicit: Option<u32>,
    (min, max): (u32, u32),
    align: Align,
    nudge: i32,
) -> (i32, u32) {
    let len = if align == Align::Stretch && explicit.is_none() {
        avail
    } else {
        natural.min(avail)
    };
    let len = len.clamp(min, max);
    let offset = align_offset(len, avail, align);
    let offset = i32::try_from(offset).unwrap_or(i32::MAX);
    (start.saturating_add(offset).saturating_add(nudge), len)
}

/// Calculate the offset for aligning a child within available space. A
/// stretched child that cannot fill the space is centered.
fn align_offset(child_size: u32, available: u32, align: Align) -> u32 {
    match align {
        Align::Start => 0,
        Align::Center | Align::Stretch => available.saturating_sub(child_size) / 2,
        Align::End => available.saturating_sub(child_size),
    }
}

/// Clamp a scroll offset so it stays within view/canvas bounds.
pub(crate) fn clamp_scroll(scroll: Point, view: Expanse, canvas: Expanse) -> Point {
    let max = |view: u32, canvas: u32| -> i32 {
        if view == 0 {
            0
        } else {
            i32::try_from(canvas.saturating_sub(view)).unwrap_or(i32::MAX)
        }
    };
    Point::new(
        scroll.x.clamp(0, max(view.w, canvas.w)),
        scroll.y.clamp(0, max(view.h, canvas.h)),
    )
}
