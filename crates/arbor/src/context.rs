use tracing::debug;

use crate::{
    config::DesktopConfig,
    error::Result,
    focus::FocusManager,
    geom::{Point, Rect},
    id::NodeId,
    modal::ModalStack,
    world::Core,
};

/// Mutable access to the tree handed to event handlers.
///
/// Every operation acts on the node the context is bound to unless it takes
/// an explicit node. Changes follow the same rules as direct [`Core`] calls.
pub trait Context {
    /// The node this context is bound to.
    fn node_id(&self) -> NodeId;

    /// The core state.
    fn core(&self) -> &Core;

    /// The core state, mutably.
    fn core_mut(&mut self) -> &mut Core;

    /// The tree root.
    fn root_id(&self) -> NodeId {
        self.core().root_id()
    }

    /// This node's arranged rect in layout coordinates.
    fn rect(&self) -> Rect {
        self.core()
            .node(self.node_id())
            .map(|n| n.rect())
            .unwrap_or_default()
    }

    /// This node's content rect in layout coordinates.
    fn content_rect(&self) -> Rect {
        self.core()
            .node(self.node_id())
            .map(|n| n.content_rect())
            .unwrap_or_default()
    }

    /// This node's rect in desktop coordinates.
    fn screen_rect(&self) -> Rect {
        self.core().screen_rect(self.node_id()).unwrap_or_default()
    }

    /// Convert a desktop point to an offset from this node's top-left corner.
    fn to_local(&self, point: Point) -> Point {
        point - self.screen_rect().tl
    }

    /// Desktop configuration.
    fn config(&self) -> &DesktopConfig {
        self.core().config()
    }

    /// Does this node hold focus?
    fn is_focused(&self) -> bool {
        self.core().is_focused(self.node_id())
    }

    /// Ask for focus on this node. Returns `true` if focus moved here.
    fn request_focus(&mut self) -> bool {
        let id = self.node_id();
        self.core_mut().set_focus(Some(id))
    }

    /// Move focus to another node. Returns `true` if focus changed.
    fn focus(&mut self, node: NodeId) -> bool {
        self.core_mut().set_focus(Some(node))
    }

    /// Clear focus, subject to the holder's veto.
    fn clear_focus(&mut self) -> bool {
        self.core_mut().set_focus(None)
    }

    /// Move focus to the next focusable node in the active input subtree.
    fn focus_next(&mut self) -> bool {
        let root = self.core().input_root();
        self.core_mut().focus_next(root)
    }

    /// Move focus to the previous focusable node in the active input subtree.
    fn focus_prev(&mut self) -> bool {
        let root = self.core().input_root();
        self.core_mut().focus_prev(root)
    }

    /// Route pointer events to this node until released.
    fn capture_mouse(&mut self) {
        let id = self.node_id();
        debug!(?id, "capture set");
        self.core_mut().mouse_capture = Some(id);
    }

    /// Release pointer capture if this node holds it.
    fn release_mouse(&mut self) {
        let id = self.node_id();
        let core = self.core_mut();
        if core.mouse_capture == Some(id) {
            debug!(?id, "capture released");
            core.mouse_capture = None;
        }
    }

    /// Does this node hold pointer capture?
    fn has_capture(&self) -> bool {
        self.core().capture_id() == Some(self.node_id())
    }

    /// Is the pointer over this node or a descendant?
    fn is_mouse_over(&self) -> bool {
        self.core().is_mouse_over(self.node_id())
    }

    /// Mark this node's measurement stale.
    fn invalidate_measure(&mut self) {
        let id = self.node_id();
        self.core_mut().invalidate_measure(id);
    }

    /// Mark this node's arrangement stale.
    fn invalidate_arrange(&mut self) {
        let id = self.node_id();
        self.core_mut().invalidate_arrange(id);
    }

    /// Scroll this node's children by a delta. Returns the clamped offset.
    fn scroll_by(&mut self, dx: i32, dy: i32) -> Point {
        let id = self.node_id();
        self.core_mut().scroll_by(id, dx, dy)
    }

    /// Scroll this node's children to an offset. Returns the clamped offset.
    fn scroll_to(&mut self, offset: Point) -> Point {
        let id = self.node_id();
        self.core_mut().scroll_to(id, offset)
    }

    /// Is a modal open?
    fn has_modal_widget(&self) -> bool {
        self.core().has_modal_widget()
    }

    /// Push a modal.
    fn push_modal(&mut self, node: NodeId) -> Result<()> {
        self.core_mut().push_modal(node)
    }

    /// Pop the top modal.
    fn pop_modal(&mut self) -> Option<NodeId> {
        self.core_mut().pop_modal()
    }

    /// Show a context menu at a desktop point.
    fn show_context_menu(&mut self, menu: NodeId, position: Point) -> Result<()> {
        self.core_mut().show_context_menu(menu, position)
    }

    /// Close the open context menu.
    fn hide_context_menu(&mut self) -> bool {
        self.core_mut().hide_context_menu()
    }
}

/// A [`Context`] bound to one node of a [`Core`].
pub struct CoreContext<'a> {
    /// Core state reference.
    core: &'a mut Core,
    /// Node bound to this context.
    node_id: NodeId,
}

impl<'a> CoreContext<'a> {
    /// Create a new context for a node.
    pub fn new(core: &'a mut Core, node_id: NodeId) -> Self {
        Self { core, node_id }
    }
}

impl Context for CoreContext<'_> {
    fn node_id(&self) -> NodeId {
        self.node_id
    }

    fn core(&self) -> &Core {
        self.core
    }

    fn core_mut(&mut self) -> &mut Core {
        self.core
    }
}
