//! Modal stack and context menus.
//!
//! While the stack is non-empty, the top entry's subtree is the only part of
//! the tree that hit-testing, focus traversal and keyboard dispatch can reach.

use tracing::debug;

use crate::{
    error::{Error, Result},
    focus::FocusManager,
    geom::{Point, Rect},
    id::NodeId,
    layout,
    props::Align,
    world::Core,
};

/// One modal stack entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ModalEntry {
    /// The modal subtree root.
    pub node: NodeId,
    /// Focus to restore when this entry is popped.
    pub previous_focus: Option<NodeId>,
}

/// An open context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ContextMenu {
    /// The menu node.
    pub node: NodeId,
    /// The menu was attached to the root when shown and is detached again on hide.
    pub attached: bool,
}

/// Trait for the modal stack and the context menu overlay.
pub trait ModalStack {
    /// Make `node` the exclusive input target. It must be attached to the
    /// root. Focus moves to the first focusable node inside it, and the
    /// previous focus is remembered for [`pop_modal`](Self::pop_modal).
    fn push_modal(&mut self, node: NodeId) -> Result<()>;

    /// Remove the top modal and restore the focus it displaced.
    fn pop_modal(&mut self) -> Option<NodeId>;

    /// Remove `node` from anywhere in the stack. Returns `true` if it was present.
    fn remove_modal(&mut self, node: NodeId) -> bool;

    /// The top modal, if any.
    fn top_modal(&self) -> Option<NodeId>;

    /// Is any modal open?
    fn has_modal_widget(&self) -> bool;

    /// Modal stack from bottom to top.
    fn modal_ids(&self) -> Vec<NodeId>;

    /// Root of the subtree that may receive input: the top modal or the tree root.
    fn input_root(&self) -> NodeId;

    /// Is `node` inside the subtree that may receive input?
    fn accepts_input(&self, node: NodeId) -> bool;

    /// Show `menu` at `position` in desktop coordinates, clamped so the menu
    /// stays inside the desktop bounds. A detached menu is attached to the
    /// root for as long as it is shown. Any open menu is closed first.
    fn show_context_menu(&mut self, menu: NodeId, position: Point) -> Result<()>;

    /// Close the open context menu. Returns `true` if one was open.
    fn hide_context_menu(&mut self) -> bool;

    /// The open context menu.
    fn context_menu(&self) -> Option<NodeId>;

    /// Drop modal entries and menus that were detached, hidden or removed.
    fn ensure_modals_valid(&mut self);
}

impl ModalStack for Core {
    fn push_modal(&mut self, node: NodeId) -> Result<()> {
        if !self.nodes.contains_key(node) {
            return Err(Error::NodeNotFound(node));
        }
        if !self.is_attached_to_root(node) {
            return Err(Error::NotAttached(node));
        }
        let previous_focus = match self.modals.iter().position(|m| m.node == node) {
            Some(i) => self.modals.remove(i).previous_focus,
            None => self.focus,
        };
        self.modals.push(ModalEntry {
            node,
            previous_focus,
        });
        debug!(?node, depth = self.modals.len(), "modal pushed");

        if let Some(capture) = self.mouse_capture
            && !self.accepts_input(capture)
        {
            self.mouse_capture = None;
        }
        let target = self.first_focusable(node);
        self.replace_focus(target);
        Ok(())
    }

    fn pop_modal(&mut self) -> Option<NodeId> {
        let entry = self.modals.pop()?;
        debug!(node = ?entry.node, depth = self.modals.len(), "modal popped");
        if self.context_menu.is_some_and(|m| m.node == entry.node) {
            release_menu(self);
        }
        restore_focus(self, entry.previous_focus);
        Some(entry.node)
    }

    fn remove_modal(&mut self, node: NodeId) -> bool {
        if self.top_modal() == Some(node) {
            return self.pop_modal().is_some();
        }
        let Some(i) = self.modals.iter().position(|m| m.node == node) else {
            return false;
        };
        let removed = self.modals.remove(i);
        // The entry above inherits the focus this one displaced.
        if let Some(above) = self.modals.get_mut(i) {
            above.previous_focus = removed.previous_focus;
        }
        debug!(?node, "modal removed");
        true
    }

    fn top_modal(&self) -> Option<NodeId> {
        self.modals.last().map(|m| m.node)
    }

    fn has_modal_widget(&self) -> bool {
        !self.modals.is_empty()
    }

    fn modal_ids(&self) -> Vec<NodeId> {
        self.modals.iter().map(|m| m.node).collect()
    }

    fn input_root(&self) -> NodeId {
        self.top_modal().unwrap_or(self.root)
    }

    fn accepts_input(&self, node: NodeId) -> bool {
        let root = self.input_root();
        node == root || self.is_ancestor(root, node)
    }

    fn show_context_menu(&mut self, menu: NodeId, position: Point) -> Result<()> {
        if !self.nodes.contains_key(menu) {
            return Err(Error::NodeNotFound(menu));
        }
        self.hide_context_menu();
        let attached = if self.parent(menu).is_none() {
            self.attach(self.root, menu)?;
            true
        } else if self.is_attached_to_root(menu) {
            false
        } else {
            return Err(Error::NotAttached(menu));
        };

        let bounds = self.bounds;
        let size = layout::measure_node(self, menu, bounds.expanse());
        let placed = Rect::at(position, size).clamped_within(bounds);
        let left = placed.tl.x.saturating_sub(bounds.tl.x);
        let top = placed.tl.y.saturating_sub(bounds.tl.y);
        self.update_props(menu, |p| {
            p.set_visible(true)
                .set_align(Align::Start, Align::Start)
                .set_offset(left, top);
        })?;

        self.context_menu = Some(ContextMenu {
            node: menu,
            attached,
        });
        if let Err(e) = self.push_modal(menu) {
            release_menu(self);
            return Err(e);
        }
        debug!(?menu, ?placed, "context menu shown");
        Ok(())
    }

    fn hide_context_menu(&mut self) -> bool {
        let Some(menu) = self.context_menu else {
            return false;
        };
        self.remove_modal(menu.node);
        release_menu(self);
        debug!(node = ?menu.node, "context menu hidden");
        true
    }

    fn context_menu(&self) -> Option<NodeId> {
        self.context_menu.map(|m| m.node)
    }

    fn ensure_modals_valid(&mut self) {
        let live = |core: &Self, node: NodeId| core.is_attached_to_root(node) && core.is_visible(node);
        while let Some(top) = self.top_modal()
            && !live(self, top)
        {
            self.pop_modal();
        }
        let stale: Vec<NodeId> = self
            .modals
            .iter()
            .map(|m| m.node)
            .filter(|n| !live(self, *n))
            .collect();
        for node in stale {
            self.remove_modal(node);
        }
        if let Some(menu) = self.context_menu
            && !self.modals.iter().any(|m| m.node == menu.node)
        {
            release_menu(self);
        }
    }
}

/// Forget the open context menu, detaching it if it was attached on show.
fn release_menu(core: &mut Core) {
    let Some(menu) = core.context_menu.take() else {
        return;
    };
    if menu.attached
        && core.parent(menu.node) == Some(core.root)
        && let Err(e) = core.detach(menu.node)
    {
        debug!(node = ?menu.node, error = %e, "context menu detach failed");
    }
}

/// Restore focus after a modal closes, if the old holder can still take it.
fn restore_focus(core: &mut Core, previous: Option<NodeId>) {
    let usable = |core: &Core, n: NodeId| core.is_focusable(n) && core.accepts_input(n);
    let target = previous
        .filter(|p| usable(core, *p))
        .or_else(|| core.focus.filter(|f| usable(core, *f)));
    core.replace_focus(target);
}
