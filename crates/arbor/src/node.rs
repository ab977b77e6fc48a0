use crate::{
    context::Context,
    error::Result,
    event::{Event, EventKind},
    geom::{Expanse, Point, Rect},
    id::NodeId,
    props::Props,
    state::NodeName,
    widget::Widget,
};

/// A callback registered for one kind of event on one node.
pub type Handler = Box<dyn FnMut(&Event, &mut dyn Context) -> Result<()> + Send>;

/// Widget capabilities cached on the node so they can be queried while the
/// widget itself is borrowed for a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Caps {
    /// The widget accepts keyboard focus.
    pub focusable: bool,
    /// The widget consumes wheel input.
    pub wheel: bool,
    /// Hit-testing descends into children.
    pub hit_children: bool,
}

impl Caps {
    /// Read capabilities from a widget.
    pub fn of(widget: &dyn Widget) -> Self {
        Self {
            focusable: widget.accept_focus(),
            wheel: widget.accepts_wheel(),
            hit_children: widget.hit_children(),
        }
    }
}

/// A node in the arena: a widget plus tree links, properties and layout cache.
pub struct Node {
    /// Widget slot, empty while the widget is borrowed for a call.
    pub(crate) widget: Option<Box<dyn Widget>>,
    /// Display name.
    pub(crate) name: NodeName,
    /// Parent link.
    pub(crate) parent: Option<NodeId>,
    /// Children in z-order; later children are on top.
    pub(crate) children: Vec<NodeId>,
    /// Layout and input properties.
    pub(crate) props: Props,
    /// Cached widget capabilities.
    pub(crate) caps: Caps,
    /// Desired size from the last measure, including margin.
    pub(crate) desired: Expanse,
    /// Available size the cached desired size was computed for.
    pub(crate) last_available: Option<Expanse>,
    /// The cached desired size is stale.
    pub(crate) measure_dirty: bool,
    /// The arranged rect is stale.
    pub(crate) arrange_dirty: bool,
    /// Arranged rect in layout coordinates, excluding margin.
    pub(crate) rect: Rect,
    /// Arranged rect shrunk by padding.
    pub(crate) content: Rect,
    /// Slot the arranged rect was computed from.
    pub(crate) last_slot: Option<Rect>,
    /// Scroll offset applied to children.
    pub(crate) scroll: Point,
    /// Scrollable extent of the children, set by scroll hosts during arrange.
    pub(crate) canvas: Option<Expanse>,
    /// Event callbacks in registration order.
    pub(crate) handlers: Vec<(EventKind, Handler)>,
}

impl Node {
    /// Wrap a widget in a fresh, detached node.
    pub(crate) fn new(widget: Box<dyn Widget>) -> Self {
        Self {
            name: widget.name(),
            caps: Caps::of(widget.as_ref()),
            widget: Some(widget),
            parent: None,
            children: Vec::new(),
            props: Props::default(),
            desired: Expanse::default(),
            last_available: None,
            measure_dirty: true,
            arrange_dirty: true,
            rect: Rect::zero(),
            content: Rect::zero(),
            last_slot: None,
            scroll: Point::zero(),
            canvas: None,
            handlers: Vec::new(),
        }
    }

    /// Display name.
    pub fn name(&self) -> &NodeName {
        &self.name
    }

    /// Parent node.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in z-order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Layout and input properties.
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// Desired size from the last measure, including margin.
    pub fn desired_size(&self) -> Expanse {
        self.desired
    }

    /// Desired size without margin. Always within the node's min/max clamps
    /// once measured.
    pub fn measured_size(&self) -> Expanse {
        let m = self.props.margin();
        Expanse::new(
            self.desired.w.saturating_sub(m.horizontal()),
            self.desired.h.saturating_sub(m.vertical()),
        )
    }

    /// Arranged rect in layout coordinates.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Arranged rect shrunk by padding.
    pub fn content_rect(&self) -> Rect {
        self.content
    }

    /// Is the cached measurement stale?
    pub fn is_measure_dirty(&self) -> bool {
        self.measure_dirty
    }

    /// Is the arranged rect stale?
    pub fn is_arrange_dirty(&self) -> bool {
        self.arrange_dirty
    }

    /// Scroll offset applied to children.
    pub fn scroll(&self) -> Point {
        self.scroll
    }

    /// Scrollable extent, if this node hosts scrolling content.
    pub fn canvas(&self) -> Option<Expanse> {
        self.canvas
    }

    /// Does this node clip its children?
    pub fn clips(&self) -> bool {
        self.props.clip() || self.canvas.is_some()
    }
}
