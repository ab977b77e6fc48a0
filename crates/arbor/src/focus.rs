use tracing::debug;

use crate::{
    error::{Error, Result},
    id::NodeId,
    modal::ModalStack,
    world::Core,
};

/// Trait for managing keyboard focus and mouse capture.
pub trait FocusManager {
    /// Does the node hold keyboard focus?
    fn is_focused(&self, node: NodeId) -> bool;

    /// Can the node take focus right now: it accepts focus, is attached, and
    /// is visible and enabled along with every ancestor.
    fn is_focusable(&self, node: NodeId) -> bool;

    /// Move focus to `node`, or clear it with `None`. The current holder may
    /// veto the change. Returns `true` if focus changed. `FocusLost` and
    /// `FocusGained` are queued for delivery after the current dispatch.
    ///
    /// A holder that moves focus away from inside its own
    /// [`Widget::on_event`](crate::Widget::on_event) is not asked: its widget
    /// is checked out for the dispatch, so
    /// [`Widget::can_lose_focus`](crate::Widget::can_lose_focus) is skipped.
    /// Callbacks registered with [`Core::on`] run after the widget is back and
    /// are subject to the veto.
    fn set_focus(&mut self, node: Option<NodeId>) -> bool;

    /// Host-facing focus request: like [`set_focus`](Self::set_focus), but
    /// fails for unknown nodes and delivers the focus events immediately.
    fn request_focus(&mut self, node: NodeId) -> Result<bool>;

    /// The first focusable node in the pre-order traversal of `root`.
    fn first_focusable(&self, root: NodeId) -> Option<NodeId>;

    /// Focus the first focusable node under `root`.
    fn focus_first(&mut self, root: NodeId) -> bool;

    /// Focus the next focusable node in the pre-order traversal of `root`,
    /// wrapping at the end.
    fn focus_next(&mut self, root: NodeId) -> bool;

    /// Focus the previous focusable node in the pre-order traversal of
    /// `root`, wrapping at the start.
    fn focus_prev(&mut self, root: NodeId) -> bool;

    /// Clear focus if it points at a node that can no longer hold it.
    fn ensure_focus_valid(&mut self);

    /// Drop mouse capture and hover if they point at detached or hidden nodes.
    fn ensure_mouse_valid(&mut self);

    /// Ensure focus, capture, hover and modal invariants after structural changes.
    fn ensure_invariants(&mut self);
}

impl FocusManager for Core {
    fn is_focused(&self, node: NodeId) -> bool {
        self.focus == Some(node)
    }

    fn is_focusable(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| n.caps.focusable)
            && self.is_attached_to_root(node)
            && self.is_visible(node)
            && self.is_enabled(node)
    }

    fn set_focus(&mut self, node: Option<NodeId>) -> bool {
        if self.focus == node {
            return false;
        }
        if let Some(target) = node
            && !self.is_focusable(target)
        {
            return false;
        }
        // A checked-out holder is the caller itself and gets no veto.
        if let Some(current) = self.focus
            && let Some(widget) = self.widget_ref(current)
            && !widget.can_lose_focus(node)
        {
            debug!(?current, next = ?node, "focus change vetoed");
            return false;
        }
        self.replace_focus(node);
        true
    }

    fn request_focus(&mut self, node: NodeId) -> Result<bool> {
        if !self.nodes.contains_key(node) {
            return Err(Error::NodeNotFound(node));
        }
        let changed = self.set_focus(Some(node));
        self.flush_pending();
        Ok(changed)
    }

    fn first_focusable(&self, root: NodeId) -> Option<NodeId> {
        focus_order(self, root).into_iter().next()
    }

    fn focus_first(&mut self, root: NodeId) -> bool {
        match self.first_focusable(root) {
            Some(target) => self.set_focus(Some(target)),
            None => false,
        }
    }

    fn focus_next(&mut self, root: NodeId) -> bool {
        let order = focus_order(self, root);
        let target = match self.focus.and_then(|f| order.iter().position(|id| *id == f)) {
            Some(i) => order.get((i + 1) % order.len()).copied(),
            None => order.first().copied(),
        };
        target.is_some_and(|t| self.set_focus(Some(t)))
    }

    fn focus_prev(&mut self, root: NodeId) -> bool {
        let order = focus_order(self, root);
        let target = match self.focus.and_then(|f| order.iter().position(|id| *id == f)) {
            Some(i) => order.get((i + order.len() - 1) % order.len()).copied(),
            None => order.last().copied(),
        };
        target.is_some_and(|t| self.set_focus(Some(t)))
    }

    fn ensure_focus_valid(&mut self) {
        if let Some(focus) = self.focus
            && !self.is_focusable(focus)
        {
            debug!(?focus, "focus dropped");
            self.replace_focus(None);
        }
    }

    fn ensure_mouse_valid(&mut self) {
        if let Some(capture) = self.mouse_capture
            && !(self.is_attached_to_root(capture) && self.is_visible(capture))
        {
            debug!(?capture, "capture dropped");
            self.mouse_capture = None;
        }
        if let Some(hover) = self.hover
            && !(self.is_attached_to_root(hover) && self.is_visible(hover))
        {
            self.hover = None;
        }
    }

    fn ensure_invariants(&mut self) {
        self.ensure_modals_valid();
        self.ensure_focus_valid();
        self.ensure_mouse_valid();
    }
}

/// Focusable nodes under `root` in pre-order, skipping hidden subtrees.
fn focus_order(core: &Core, root: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let Some(node) = core.nodes.get(id) else {
            continue;
        };
        if !node.props.visible() {
            continue;
        }
        if core.is_focusable(id) {
            out.push(id);
        }
        for child in node.children.iter().rev() {
            stack.push(*child);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Context, Event, EventOutcome, Widget,
        testing::Probe,
    };

    /// Refuses to give up focus, but hands it to `next` on `Cancel`.
    struct Sticky {
        next: Option<NodeId>,
    }

    impl Widget for Sticky {
        fn accept_focus(&self) -> bool {
            true
        }

        fn can_lose_focus(&self, _next: Option<NodeId>) -> bool {
            false
        }

        fn on_event(&mut self, event: &Event, ctx: &mut dyn Context) -> Result<EventOutcome> {
            if let (Event::Cancel, Some(next)) = (event, self.next) {
                ctx.focus(next);
                return Ok(EventOutcome::Handle);
            }
            Ok(EventOutcome::Ignore)
        }
    }

    fn tree() -> Result<(Core, Vec<NodeId>)> {
        let mut core = Core::new();
        let mut ids = Vec::new();
        for _ in 0..3 {
            let id = core.add(Probe::focusable()).id();
            core.attach(core.root_id(), id)?;
            ids.push(id);
        }
        Ok((core, ids))
    }

    #[test]
    fn tab_order_wraps() -> Result<()> {
        let (mut core, ids) = tree()?;
        let root = core.root_id();
        assert!(core.focus_next(root));
        assert_eq!(core.focus_id(), Some(ids[0]));
        core.focus_next(root);
        core.focus_next(root);
        core.focus_next(root);
        assert_eq!(core.focus_id(), Some(ids[0]));
        core.focus_prev(root);
        assert_eq!(core.focus_id(), Some(ids[2]));
        Ok(())
    }

    #[test]
    fn disabled_and_hidden_are_skipped() -> Result<()> {
        let (mut core, ids) = tree()?;
        core.update_props(ids[1], |p| {
            p.set_enabled(false);
        })?;
        core.update_props(ids[2], |p| {
            p.set_visible(false);
        })?;
        let root = core.root_id();
        core.focus_first(root);
        core.focus_next(root);
        assert_eq!(core.focus_id(), Some(ids[0]));
        assert!(!core.set_focus(Some(ids[1])));
        Ok(())
    }

    #[test]
    fn veto_blocks_change() -> Result<()> {
        let (mut core, ids) = tree()?;
        core.request_focus(ids[0])?;
        core.with_widget(ids[0], |p: &mut Probe, _| p.veto_blur = true)?;
        assert!(!core.request_focus(ids[1])?);
        assert_eq!(core.focus_id(), Some(ids[0]));
        Ok(())
    }

    #[test]
    fn holder_can_hand_off_from_its_own_handler() -> Result<()> {
        let mut core = Core::new();
        let other = core.add(Probe::focusable()).id();
        let sticky = core.add(Sticky { next: Some(other) }).id();
        core.attach(core.root_id(), sticky)?;
        core.attach(core.root_id(), other)?;
        core.request_focus(sticky)?;

        assert!(!core.request_focus(other)?);
        assert_eq!(core.focus_id(), Some(sticky));

        core.dispatch(sticky, &Event::Cancel)?;
        assert_eq!(core.focus_id(), Some(other));
        Ok(())
    }

    #[test]
    fn focus_events_are_delivered() -> Result<()> {
        let (mut core, ids) = tree()?;
        core.request_focus(ids[0])?;
        core.request_focus(ids[1])?;
        let seen = core.with_widget(ids[0], |p: &mut Probe, _| p.kinds())?;
        assert_eq!(
            seen,
            vec![
                crate::EventKind::FocusGained,
                crate::EventKind::FocusLost
            ]
        );
        Ok(())
    }

    #[test]
    fn detach_clears_focus() -> Result<()> {
        let (mut core, ids) = tree()?;
        core.request_focus(ids[2])?;
        let gen_before = core.focus_generation();
        core.detach(ids[2])?;
        assert_eq!(core.focus_id(), None);
        assert!(core.focus_generation() > gen_before);
        Ok(())
    }

    #[test]
    fn unknown_node_is_an_error() -> Result<()> {
        let (mut core, ids) = tree()?;
        core.remove(ids[0])?;
        assert_eq!(core.request_focus(ids[0]), Err(Error::NodeNotFound(ids[0])));
        Ok(())
    }
}
