use std::{
    any::{Any, type_name},
    collections::{HashSet, VecDeque},
    mem,
};

use slotmap::SlotMap;
use tracing::{debug, trace, warn};

use crate::{
    config::DesktopConfig,
    context::CoreContext,
    error::{Error, Result},
    event::{Event, EventKind},
    focus::FocusManager,
    geom::{Expanse, Point, Rect},
    id::{NodeId, TypedId},
    layout,
    modal::{ContextMenu, ModalEntry, ModalStack},
    node::{Caps, Handler, Node},
    property::{self, PropValue},
    props::{Invalidate, Props},
    widget::{EventOutcome, Widget},
    widgets::Panel,
};

/// Upper bound on queued follow-up events drained after one dispatch.
const MAX_PENDING: usize = 256;

/// Core state for the arena, layout, focus, capture and modality.
pub struct Core {
    /// Node storage arena.
    pub(crate) nodes: SlotMap<NodeId, Node>,
    /// Root node ID.
    pub(crate) root: NodeId,
    /// Currently focused node.
    pub(crate) focus: Option<NodeId>,
    /// Focus generation counter, bumped on every focus change.
    pub(crate) focus_gen: u64,
    /// Node that receives pointer events regardless of position.
    pub(crate) mouse_capture: Option<NodeId>,
    /// Node currently under the pointer.
    pub(crate) hover: Option<NodeId>,
    /// Modal stack; the last entry is the only one receiving input.
    pub(crate) modals: Vec<ModalEntry>,
    /// Open context menu, if any.
    pub(crate) context_menu: Option<ContextMenu>,
    /// Input tuning.
    pub(crate) config: DesktopConfig,
    /// Bounds of the most recent layout pass.
    pub(crate) bounds: Rect,
    /// Follow-up events queued during dispatch, such as focus notifications.
    pub(crate) pending: VecDeque<(NodeId, Event)>,
}

impl Default for Core {
    fn default() -> Self {
        Self::new()
    }
}

impl Core {
    /// Create a new Core with a [`Panel`] root.
    pub fn new() -> Self {
        Self::with_config(DesktopConfig::default())
    }

    /// Create a new Core with explicit configuration.
    pub fn with_config(config: DesktopConfig) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(Box::new(Panel::default())));
        Self {
            nodes,
            root,
            focus: None,
            focus_gen: 0,
            mouse_capture: None,
            hover: None,
            modals: Vec::new(),
            context_menu: None,
            config,
            bounds: Rect::zero(),
            pending: VecDeque::new(),
        }
    }

    /// The root node.
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// The focused node.
    pub fn focus_id(&self) -> Option<NodeId> {
        self.focus
    }

    /// Focus generation counter.
    pub fn focus_generation(&self) -> u64 {
        self.focus_gen
    }

    /// The node capturing the pointer.
    pub fn capture_id(&self) -> Option<NodeId> {
        self.mouse_capture
    }

    /// The node under the pointer.
    pub fn hover_id(&self) -> Option<NodeId> {
        self.hover
    }

    /// Is the pointer over `node` or one of its descendants?
    pub fn is_mouse_over(&self, node: impl Into<NodeId>) -> bool {
        let node = node.into();
        self.hover
            .is_some_and(|h| h == node || self.is_ancestor(node, h))
    }

    /// Input tuning.
    pub fn config(&self) -> &DesktopConfig {
        &self.config
    }

    /// Replace the input tuning.
    pub fn set_config(&mut self, config: DesktopConfig) {
        self.config = config;
    }

    /// Bounds of the most recent layout pass.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Borrow a node.
    pub fn node(&self, node_id: impl Into<NodeId>) -> Option<&Node> {
        self.nodes.get(node_id.into())
    }

    /// Does the node exist?
    pub fn contains(&self, node_id: impl Into<NodeId>) -> bool {
        self.nodes.contains_key(node_id.into())
    }

    /// Number of live nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Is the arena empty? Never true, since the root always exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a detached node holding `widget`.
    pub fn add<W>(&mut self, widget: W) -> TypedId<W>
    where
        W: Widget + 'static,
    {
        TypedId::new(self.add_boxed(Box::new(widget)))
    }

    /// Create a detached node from a boxed widget.
    pub fn add_boxed(&mut self, widget: Box<dyn Widget>) -> NodeId {
        let id = self.nodes.insert(Node::new(widget));
        trace!(?id, "node created");
        id
    }

    /// Borrow a widget by typed ID.
    pub fn widget<W>(&self, node: TypedId<W>) -> Option<&W>
    where
        W: Widget + 'static,
    {
        let widget = self.nodes.get(node.id())?.widget.as_deref()?;
        (widget as &dyn Any).downcast_ref::<W>()
    }

    /// Run a closure with mutable access to a widget of type `W` and the core.
    ///
    /// The closure may change any layout input, so the node's measurement is
    /// invalidated afterwards. Use [`widget`](Self::widget) for plain reads.
    pub fn with_widget<W, R>(
        &mut self,
        node: impl Into<NodeId>,
        f: impl FnOnce(&mut W, &mut Self) -> R,
    ) -> Result<R>
    where
        W: Widget + 'static,
    {
        let node_id = node.into();
        let out = self.with_widget_mut(node_id, |widget, core| {
            let any = widget as &mut dyn Any;
            match any.downcast_mut::<W>() {
                Some(widget) => Ok(f(widget, core)),
                None => Err(Error::Invalid(format!(
                    "expected widget type {}",
                    type_name::<W>()
                ))),
            }
        })??;
        self.invalidate_measure(node_id);
        Ok(out)
    }

    /// Take a widget out of its slot for a single call, restoring it afterwards
    /// if the node still exists.
    pub(crate) fn with_widget_mut<R>(
        &mut self,
        node_id: NodeId,
        f: impl FnOnce(&mut dyn Widget, &mut Self) -> R,
    ) -> Result<R> {
        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or(Error::NodeNotFound(node_id))?;
        let mut widget = node
            .widget
            .take()
            .ok_or(Error::ReentrantWidget(node_id))?;
        let out = f(widget.as_mut(), self);
        if let Some(node) = self.nodes.get_mut(node_id)
            && node.widget.is_none()
        {
            node.caps = Caps::of(widget.as_ref());
            node.widget = Some(widget);
        }
        Ok(out)
    }

    /// Borrow a widget immutably if it is not currently in use.
    pub(crate) fn widget_ref(&self, node_id: NodeId) -> Option<&dyn Widget> {
        self.nodes.get(node_id)?.widget.as_deref()
    }

    /// Parent of a node.
    pub fn parent(&self, node_id: impl Into<NodeId>) -> Option<NodeId> {
        self.nodes.get(node_id.into()).and_then(|n| n.parent)
    }

    /// Children of a node in z-order.
    pub fn children(&self, node_id: impl Into<NodeId>) -> &[NodeId] {
        self.nodes
            .get(node_id.into())
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Is `ancestor` a strict ancestor of `node`?
    pub fn is_ancestor(&self, ancestor: impl Into<NodeId>, node: impl Into<NodeId>) -> bool {
        let ancestor = ancestor.into();
        let mut current = self.parent(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Is `node` the root or a descendant of it?
    pub fn is_attached_to_root(&self, node: impl Into<NodeId>) -> bool {
        let node = node.into();
        self.nodes.contains_key(node) && (node == self.root || self.is_ancestor(self.root, node))
    }

    /// The top-most ancestor of a node, or the node itself.
    fn tree_root(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Collect a subtree in pre-order, including the root.
    pub(crate) fn subtree_pre_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(node_id) = stack.pop() {
            let Some(node) = self.nodes.get(node_id) else {
                continue;
            };
            out.push(node_id);
            for child in node.children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Identifiers used within a subtree.
    fn identifiers(&self, root: NodeId) -> Vec<String> {
        self.subtree_pre_order(root)
            .into_iter()
            .filter_map(|id| self.nodes.get(id)?.props.identifier().map(str::to_string))
            .collect()
    }

    /// Find a node in the root tree by identifier.
    pub fn find_by_id(&self, identifier: &str) -> Option<NodeId> {
        self.find_by_id_from(self.root, identifier)
    }

    /// Find a node by identifier within the subtree at `start`.
    pub fn find_by_id_from(&self, start: impl Into<NodeId>, identifier: &str) -> Option<NodeId> {
        self.subtree_pre_order(start.into()).into_iter().find(|id| {
            self.nodes
                .get(*id)
                .and_then(|n| n.props.identifier())
                .is_some_and(|i| i == identifier)
        })
    }

    /// Attach a detached child as the last child of `parent`.
    pub fn attach(&mut self, parent: impl Into<NodeId>, child: impl Into<NodeId>) -> Result<()> {
        self.insert_child(parent, usize::MAX, child)
    }

    /// Attach a detached child at `index` among `parent`'s children. Indices
    /// past the end append.
    ///
    /// Attaching a node that already has a parent is an error; use
    /// [`reparent`](Self::reparent) to move it.
    pub fn insert_child(
        &mut self,
        parent: impl Into<NodeId>,
        index: usize,
        child: impl Into<NodeId>,
    ) -> Result<()> {
        let parent = parent.into();
        let child = child.into();
        if !self.nodes.contains_key(parent) {
            return Err(Error::NodeNotFound(parent));
        }
        if !self.nodes.contains_key(child) {
            return Err(Error::NodeNotFound(child));
        }
        if child == self.root {
            return Err(Error::CannotDetachRoot);
        }
        if self.parent(child).is_some() {
            return Err(Error::AlreadyAttached(child));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(Error::WouldCreateCycle { parent, child });
        }
        let existing: HashSet<String> = self
            .identifiers(self.tree_root(parent))
            .into_iter()
            .collect();
        if let Some(dup) = self
            .identifiers(child)
            .into_iter()
            .find(|i| existing.contains(i))
        {
            return Err(Error::DuplicateIdentifier(dup));
        }

        if let Some(node) = self.nodes.get_mut(parent) {
            let index = index.min(node.children.len());
            node.children.insert(index, child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        self.invalidate_measure(child);
        debug!(?parent, ?child, "attached");
        Ok(())
    }

    /// Detach a child from its parent. The subtree stays alive, detached.
    pub fn detach(&mut self, child: impl Into<NodeId>) -> Result<()> {
        let child = child.into();
        if child == self.root {
            return Err(Error::CannotDetachRoot);
        }
        if !self.nodes.contains_key(child) {
            return Err(Error::NodeNotFound(child));
        }
        let Some(parent) = self.parent(child) else {
            return Ok(());
        };
        self.unlink(parent, child);
        debug!(?parent, ?child, "detached");
        self.ensure_invariants();
        Ok(())
    }

    /// Move a node under a new parent, appending it. On failure the node
    /// keeps its original position.
    pub fn reparent(&mut self, parent: impl Into<NodeId>, child: impl Into<NodeId>) -> Result<()> {
        let parent = parent.into();
        let child = child.into();
        if child == self.root {
            return Err(Error::CannotDetachRoot);
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(Error::WouldCreateCycle { parent, child });
        }
        let Some(old) = self.parent(child) else {
            return self.attach(parent, child);
        };
        let index = self
            .children(old)
            .iter()
            .position(|c| *c == child)
            .unwrap_or(usize::MAX);
        self.unlink(old, child);
        if let Err(e) = self.insert_child(parent, usize::MAX, child) {
            self.insert_child(old, index, child)?;
            return Err(e);
        }
        self.ensure_invariants();
        Ok(())
    }

    /// Remove a child link and invalidate the former parent.
    fn unlink(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|id| *id != child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
            node.last_slot = None;
        }
        self.invalidate_measure(parent);
    }

    /// Destroy a node and all its descendants.
    pub fn remove(&mut self, node_id: impl Into<NodeId>) -> Result<()> {
        let node_id = node_id.into();
        if node_id == self.root {
            return Err(Error::CannotDetachRoot);
        }
        if !self.nodes.contains_key(node_id) {
            return Err(Error::NodeNotFound(node_id));
        }
        if let Some(parent) = self.parent(node_id) {
            self.unlink(parent, node_id);
        }
        let doomed = self.subtree_pre_order(node_id);
        for id in &doomed {
            self.nodes.remove(*id);
        }
        self.pending.retain(|(id, _)| !doomed.contains(id));
        debug!(?node_id, count = doomed.len(), "removed subtree");
        self.ensure_invariants();
        Ok(())
    }

    /// Properties of a node.
    pub fn props(&self, node_id: impl Into<NodeId>) -> Option<&Props> {
        self.nodes.get(node_id.into()).map(|n| &n.props)
    }

    /// Change properties that cannot fail, then apply the required invalidation.
    pub fn update_props(
        &mut self,
        node_id: impl Into<NodeId>,
        f: impl FnOnce(&mut Props),
    ) -> Result<()> {
        self.try_update_props(node_id, |p| {
            f(p);
            Ok(())
        })
    }

    /// Change properties through a fallible closure. If the closure fails, or
    /// the new identifier clashes with another node in the same tree, the
    /// properties are left untouched.
    pub fn try_update_props(
        &mut self,
        node_id: impl Into<NodeId>,
        f: impl FnOnce(&mut Props) -> Result<()>,
    ) -> Result<()> {
        let node_id = node_id.into();
        let node = self
            .nodes
            .get(node_id)
            .ok_or(Error::NodeNotFound(node_id))?;
        let old = node.props.clone();
        let mut new = old.clone();
        f(&mut new)?;

        if new.identifier() != old.identifier()
            && let Some(ident) = new.identifier()
        {
            let tree = self.tree_root(node_id);
            if self
                .find_by_id_from(tree, ident)
                .is_some_and(|other| other != node_id)
            {
                return Err(Error::DuplicateIdentifier(ident.to_string()));
            }
        }

        let invalidate = new.invalidation_from(&old);
        let visibility_changed = new.visible() != old.visible();
        let input_changed = new.enabled() != old.enabled() || visibility_changed;
        if let Some(node) = self.nodes.get_mut(node_id) {
            node.props = new;
        }
        match invalidate {
            Invalidate::Measure => {
                self.invalidate_measure(node_id);
                if visibility_changed && let Some(parent) = self.parent(node_id) {
                    self.invalidate_measure(parent);
                }
            }
            Invalidate::Arrange => self.invalidate_arrange(node_id),
            Invalidate::None => {}
        }
        if input_changed {
            self.ensure_invariants();
        }
        Ok(())
    }

    /// Mark a node's measurement stale, propagating up until an ancestor that
    /// is already stale.
    pub fn invalidate_measure(&mut self, node_id: impl Into<NodeId>) {
        let node_id = node_id.into();
        let Some(node) = self.nodes.get_mut(node_id) else {
            return;
        };
        node.measure_dirty = true;
        node.arrange_dirty = true;
        let mut current = node.parent;
        while let Some(id) = current {
            let Some(node) = self.nodes.get_mut(id) else {
                break;
            };
            if node.measure_dirty {
                break;
            }
            node.measure_dirty = true;
            node.arrange_dirty = true;
            current = node.parent;
        }
    }

    /// Mark a node's arrangement stale, propagating up until an ancestor that
    /// is already stale. Measurements are kept.
    pub fn invalidate_arrange(&mut self, node_id: impl Into<NodeId>) {
        let node_id = node_id.into();
        let Some(node) = self.nodes.get_mut(node_id) else {
            return;
        };
        node.arrange_dirty = true;
        let mut current = node.parent;
        while let Some(id) = current {
            let Some(node) = self.nodes.get_mut(id) else {
                break;
            };
            if node.arrange_dirty {
                break;
            }
            node.arrange_dirty = true;
            current = node.parent;
        }
    }

    /// Is the node and every ancestor visible?
    pub fn is_visible(&self, node_id: impl Into<NodeId>) -> bool {
        let mut current = Some(node_id.into());
        while let Some(id) = current {
            let Some(node) = self.nodes.get(id) else {
                return false;
            };
            if !node.props.visible() {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// Is the node and every ancestor enabled?
    pub fn is_enabled(&self, node_id: impl Into<NodeId>) -> bool {
        let mut current = Some(node_id.into());
        while let Some(id) = current {
            let Some(node) = self.nodes.get(id) else {
                return false;
            };
            if !node.props.enabled() {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// Run the layout pass over the root tree within `bounds`.
    pub fn update_layout(&mut self, bounds: Rect) {
        if self.bounds != bounds {
            self.bounds = bounds;
            self.invalidate_arrange(self.root);
        }
        layout::run(self, bounds);
        self.ensure_invariants();
    }

    /// Register a callback for one kind of event on a node. Callbacks run in
    /// registration order, after the widget's own handler.
    pub fn on(
        &mut self,
        node_id: impl Into<NodeId>,
        kind: EventKind,
        handler: impl FnMut(&Event, &mut dyn crate::Context) -> Result<()> + Send + 'static,
    ) -> Result<()> {
        let node_id = node_id.into();
        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or(Error::NodeNotFound(node_id))?;
        let handler: Handler = Box::new(handler);
        node.handlers.push((kind, handler));
        Ok(())
    }

    /// Deliver an event to one node, then drain any follow-up events it caused.
    pub fn dispatch(&mut self, node_id: impl Into<NodeId>, event: &Event) -> Result<EventOutcome> {
        let outcome = self.dispatch_single(node_id.into(), event);
        self.flush_pending();
        outcome
    }

    /// Deliver an event to a node's widget and then its registered callbacks.
    fn dispatch_single(&mut self, node_id: NodeId, event: &Event) -> Result<EventOutcome> {
        trace!(?node_id, kind = ?event.kind(), "dispatch");
        let outcome = self.with_widget_mut(node_id, |w, core| {
            let mut ctx = CoreContext::new(core, node_id);
            w.on_event(event, &mut ctx)
        })??;
        let ran = self.run_handlers(node_id, event)?;
        Ok(if ran { EventOutcome::Handle } else { outcome })
    }

    /// Run callbacks registered for the event's kind. Returns true if any ran.
    fn run_handlers(&mut self, node_id: NodeId, event: &Event) -> Result<bool> {
        let kind = event.kind();
        let Some(node) = self.nodes.get_mut(node_id) else {
            return Ok(false);
        };
        if !node.handlers.iter().any(|(k, _)| *k == kind) {
            return Ok(false);
        }
        let mut handlers = mem::take(&mut node.handlers);
        let mut result = Ok(true);
        for (_, handler) in handlers.iter_mut().filter(|(k, _)| *k == kind) {
            let mut ctx = CoreContext::new(self, node_id);
            if let Err(e) = handler(event, &mut ctx) {
                result = Err(e);
                break;
            }
            if !self.nodes.contains_key(node_id) {
                break;
            }
        }
        if let Some(node) = self.nodes.get_mut(node_id) {
            handlers.append(&mut node.handlers);
            node.handlers = handlers;
        }
        result
    }

    /// Swap the focused node without consulting the current holder.
    pub(crate) fn replace_focus(&mut self, node: Option<NodeId>) {
        let old = mem::replace(&mut self.focus, node);
        if old == node {
            return;
        }
        self.focus_gen = self.focus_gen.saturating_add(1);
        debug!(from = ?old, to = ?node, "focus");
        if let Some(old) = old
            && self.nodes.contains_key(old)
        {
            self.queue_event(old, Event::FocusLost);
        }
        if let Some(new) = node {
            self.queue_event(new, Event::FocusGained);
        }
    }

    /// Queue an event for delivery after the current dispatch.
    pub(crate) fn queue_event(&mut self, node_id: NodeId, event: Event) {
        self.pending.push_back((node_id, event));
    }

    /// Deliver queued follow-up events.
    pub(crate) fn flush_pending(&mut self) {
        let mut budget = MAX_PENDING;
        while let Some((id, event)) = self.pending.pop_front() {
            if budget == 0 {
                warn!(dropped = self.pending.len() + 1, "pending event budget exhausted");
                self.pending.clear();
                break;
            }
            budget -= 1;
            if !self.nodes.contains_key(id) {
                continue;
            }
            if let Err(e) = self.dispatch_single(id, &event) {
                warn!(?id, error = %e, "queued event failed");
            }
        }
    }

    /// Set a node's scroll offset, clamped to its scrollable extent. Returns
    /// the applied offset.
    pub fn scroll_to(&mut self, node_id: impl Into<NodeId>, scroll: Point) -> Point {
        let Some(node) = self.nodes.get_mut(node_id.into()) else {
            return Point::zero();
        };
        let canvas = node.canvas.unwrap_or_else(|| node.content.expanse());
        node.scroll = layout::clamp_scroll(scroll, node.content.expanse(), canvas);
        node.scroll
    }

    /// Shift a node's scroll offset by a delta, clamped.
    pub fn scroll_by(&mut self, node_id: impl Into<NodeId>, dx: i32, dy: i32) -> Point {
        let node_id = node_id.into();
        let current = self
            .nodes
            .get(node_id)
            .map(|n| n.scroll)
            .unwrap_or_default();
        self.scroll_to(node_id, current + Point::new(dx, dy))
    }

    /// Largest scroll offset for a node: its scrollable extent minus its viewport.
    pub fn scroll_maximum(&self, node_id: impl Into<NodeId>) -> Point {
        let Some(node) = self.nodes.get(node_id.into()) else {
            return Point::zero();
        };
        let view = node.content.expanse();
        let canvas = node.canvas.unwrap_or(view);
        layout::clamp_scroll(Point::new(i32::MAX, i32::MAX), view, canvas)
    }

    /// Accumulated scroll offset and clip rect that apply to a node's own
    /// rect, both in desktop coordinates.
    pub(crate) fn screen_transform(&self, node_id: NodeId) -> Option<(Point, Rect)> {
        if !self.nodes.contains_key(node_id) {
            return None;
        }
        let mut chain = Vec::new();
        let mut current = self.parent(node_id);
        while let Some(id) = current {
            chain.push(id);
            current = self.parent(id);
        }
        let mut offset = Point::zero();
        let mut clip = self.bounds;
        for id in chain.into_iter().rev() {
            let node = self.nodes.get(id)?;
            if node.clips() {
                clip = clip.clip_to(&node.content.translate(-offset.x, -offset.y));
            }
            offset = offset + node.scroll;
        }
        Some((offset, clip))
    }

    /// A node's rect in desktop coordinates, with ancestor scrolling applied.
    pub fn screen_rect(&self, node_id: impl Into<NodeId>) -> Option<Rect> {
        let node_id = node_id.into();
        let (offset, _) = self.screen_transform(node_id)?;
        let rect = self.nodes.get(node_id)?.rect;
        Some(rect.translate(-offset.x, -offset.y))
    }

    /// Convert a desktop point into the layout coordinates of `node_id`'s rect.
    pub fn to_layout(&self, node_id: impl Into<NodeId>, point: Point) -> Point {
        self.screen_transform(node_id.into())
            .map(|(offset, _)| point + offset)
            .unwrap_or(point)
    }

    /// The deepest visible node under a desktop point, restricted to the
    /// active modal subtree. Later siblings win over earlier ones.
    pub fn locate(&self, point: Point) -> Option<NodeId> {
        let start = self.input_root();
        if !self.is_visible(start) {
            return None;
        }
        let (offset, clip) = self.screen_transform(start)?;
        let mut result = None;
        locate_recursive(self, start, point, offset, clip, &mut result);
        result
    }

    /// Names of every property the node exposes: the common table followed
    /// by the widget's own.
    pub fn property_names(&self, node_id: impl Into<NodeId>) -> Result<Vec<&'static str>> {
        let node_id = node_id.into();
        let widget = self.widget_entry(node_id)?;
        Ok(property::COMMON_PROPERTIES
            .iter()
            .map(|d| d.name)
            .chain(widget.properties().iter().map(|p| p.name))
            .collect())
    }

    /// Read a property by name.
    pub fn get_property(&self, node_id: impl Into<NodeId>, name: &str) -> Result<PropValue> {
        let node_id = node_id.into();
        let widget = self.widget_entry(node_id)?;
        if let Some(d) = property::common(name) {
            let props = &self.nodes.get(node_id).ok_or(Error::NodeNotFound(node_id))?.props;
            return Ok((d.get)(props));
        }
        let p = widget
            .properties()
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::UnknownProperty(name.to_string()))?;
        (p.get)(widget as &dyn Any).ok_or_else(|| Error::UnknownProperty(name.to_string()))
    }

    /// Write a property by name and apply the invalidation it requires.
    pub fn set_property(
        &mut self,
        node_id: impl Into<NodeId>,
        name: &str,
        value: PropValue,
    ) -> Result<()> {
        let node_id = node_id.into();
        let table = self.widget_entry(node_id)?.properties();
        if let Some(d) = property::common(name) {
            return self.try_update_props(node_id, |p| (d.set)(p, value));
        }
        let p = table
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::UnknownProperty(name.to_string()))?;
        let invalidate =
            self.with_widget_mut(node_id, |w, _| (p.set)(w as &mut dyn Any, value))??;
        match invalidate {
            Invalidate::Measure => self.invalidate_measure(node_id),
            Invalidate::Arrange => self.invalidate_arrange(node_id),
            Invalidate::None => {}
        }
        Ok(())
    }

    /// Every property of a node as a JSON object keyed by name.
    pub fn property_snapshot(&self, node_id: impl Into<NodeId>) -> Result<serde_json::Value> {
        let node_id = node_id.into();
        let mut map = serde_json::Map::new();
        for name in self.property_names(node_id)? {
            let value = serde_json::to_value(self.get_property(node_id, name)?)
                .map_err(|e| Error::Invalid(e.to_string()))?;
            map.insert(name.to_string(), value);
        }
        Ok(serde_json::Value::Object(map))
    }

    /// A node's widget, failing if the node is missing or the widget is in use.
    fn widget_entry(&self, node_id: NodeId) -> Result<&dyn Widget> {
        let node = self.nodes.get(node_id).ok_or(Error::NodeNotFound(node_id))?;
        node.widget
            .as_deref()
            .ok_or(Error::ReentrantWidget(node_id))
    }

    /// Desired size of a node including margin, from the last measure.
    pub fn desired_size(&self, node_id: impl Into<NodeId>) -> Expanse {
        self.nodes
            .get(node_id.into())
            .map(|n| n.desired)
            .unwrap_or_default()
    }
}

/// Depth-first search for the node under a point. Returns true if `node_id` was hit.
fn locate_recursive(
    core: &Core,
    node_id: NodeId,
    point: Point,
    offset: Point,
    clip: Rect,
    result: &mut Option<NodeId>,
) -> bool {
    let Some(node) = core.nodes.get(node_id) else {
        return false;
    };
    if !node.props.visible() {
        return false;
    }
    let screen = node.rect.translate(-offset.x, -offset.y);
    let Some(visible) = screen.intersect(&clip) else {
        return false;
    };
    if !visible.contains_point(point) {
        return false;
    }
    let hit = node
        .widget
        .as_deref()
        .is_none_or(|w| w.hit_test(point - screen.tl, screen.expanse()));
    if !hit {
        return false;
    }
    *result = Some(node_id);

    if node.caps.hit_children {
        let child_clip = if node.clips() {
            match node
                .content
                .translate(-offset.x, -offset.y)
                .intersect(&visible)
            {
                Some(c) => c,
                None => return true,
            }
        } else {
            clip
        };
        let child_offset = offset + node.scroll;
        for child in node.children.iter().rev() {
            if locate_recursive(core, *child, point, child_offset, child_clip, result) {
                break;
            }
        }
    }
    true
}
