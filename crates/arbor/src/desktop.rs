//! The per-frame input state machine.
//!
//! A [`Desktop`] owns the [`Core`], the injected render backend and the
//! injected input source. Each frame the host calls
//! [`update_input`](Desktop::update_input) and then
//! [`render`](Desktop::render). Input is edge-detected against the previous
//! snapshot and turned into [`Event`]s delivered to single nodes.

use std::{collections::HashMap, mem, time::Duration};

use tracing::{debug, trace, warn};

use crate::{
    config::DesktopConfig,
    error::Result,
    event::Event,
    focus::FocusManager,
    geom::{Point, Rect},
    id::NodeId,
    input::{InputSnapshot, InputSource, Key, Modifiers, MouseButton},
    modal::ModalStack,
    render::{RenderBackend, render_tree},
    widget::EventOutcome,
    world::Core,
};

/// A key handler that runs before focus dispatch.
pub type GlobalKeyHandler = Box<dyn FnMut(Key, Modifiers, &mut Core) -> Result<EventOutcome> + Send>;

/// A button press waiting for its release.
#[derive(Debug, Clone, Copy)]
struct Press {
    /// Node under the pointer at press time.
    node: Option<NodeId>,
    /// Press position.
    position: Point,
    /// Press time.
    time: Duration,
}

/// The most recent click, for double-click detection.
#[derive(Debug, Clone, Copy)]
struct LastClick {
    /// Clicked node.
    node: NodeId,
    /// Button.
    button: MouseButton,
    /// Release time.
    time: Duration,
}

/// Auto-repeat state for the most recently pressed key.
#[derive(Debug, Clone, Copy)]
struct Repeat {
    /// Key being held.
    key: Key,
    /// When the next repeat fires.
    next: Duration,
}

/// Whole milliseconds in a duration, saturating.
fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Owns the tree and turns sampled device state into node events.
pub struct Desktop<R: RenderBackend, I: InputSource> {
    /// Tree, layout and focus state.
    core: Core,
    /// Draw-call sink.
    backend: R,
    /// Device sampler.
    input: I,
    /// Snapshot from the previous frame.
    previous: InputSnapshot,
    /// Outstanding presses by button.
    presses: HashMap<MouseButton, Press>,
    /// Last completed click.
    last_click: Option<LastClick>,
    /// Held key awaiting auto-repeat.
    repeat: Option<Repeat>,
    /// Handlers run before a key reaches the focused node.
    global_keys: Vec<GlobalKeyHandler>,
}

impl<R: RenderBackend, I: InputSource> Desktop<R, I> {
    /// Create a desktop with default configuration.
    pub fn new(backend: R, input: I) -> Self {
        Self::with_config(backend, input, DesktopConfig::default())
    }

    /// Create a desktop with explicit configuration.
    pub fn with_config(backend: R, input: I, config: DesktopConfig) -> Self {
        Self {
            core: Core::with_config(config),
            backend,
            input,
            previous: InputSnapshot::default(),
            presses: HashMap::new(),
            last_click: None,
            repeat: None,
            global_keys: Vec::new(),
        }
    }

    /// The tree.
    pub fn core(&self) -> &Core {
        &self.core
    }

    /// The tree, mutably.
    pub fn core_mut(&mut self) -> &mut Core {
        &mut self.core
    }

    /// The render backend.
    pub fn backend(&self) -> &R {
        &self.backend
    }

    /// The render backend, mutably.
    pub fn backend_mut(&mut self) -> &mut R {
        &mut self.backend
    }

    /// The input source, mutably.
    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    /// Register a key handler that runs before focus dispatch. Handlers run in
    /// registration order until one handles the key. They should check
    /// [`has_modal_widget`](ModalStack::has_modal_widget) before acting.
    pub fn on_key_down_global(
        &mut self,
        handler: impl FnMut(Key, Modifiers, &mut Core) -> Result<EventOutcome> + Send + 'static,
    ) {
        self.global_keys.push(Box::new(handler));
    }

    /// Sample the input source and process the snapshot.
    pub fn update_input(&mut self) {
        let snapshot = self.input.sample();
        self.process_input(snapshot);
    }

    /// Process one snapshot of device state against the previous one.
    pub fn process_input(&mut self, snapshot: InputSnapshot) {
        let previous = mem::take(&mut self.previous);
        let modifiers = Modifiers::from_keys(&snapshot.keys);

        self.update_hover(snapshot.pointer);
        if snapshot.pointer != previous.pointer {
            self.pointer_moved(snapshot.pointer);
        }

        for button in MouseButton::ALL {
            let now = snapshot.buttons.is_down(button);
            let before = previous.buttons.is_down(button);
            if now && !before {
                self.pressed(button, snapshot.pointer, snapshot.time);
            } else if before && !now {
                self.released(button, snapshot.pointer, snapshot.time);
            }
        }
        if !snapshot.buttons.any() && self.core.mouse_capture.take().is_some() {
            debug!("capture cleared, no buttons down");
        }

        if snapshot.wheel != 0 {
            self.wheel(snapshot.wheel, snapshot.pointer);
        }

        for key in snapshot.keys.difference(&previous.keys) {
            self.key_down(*key, modifiers, false);
            if !key.is_modifier() {
                self.repeat = Some(Repeat {
                    key: *key,
                    next: snapshot.time + Duration::from_millis(self.core.config.key_repeat_delay_ms),
                });
            }
        }
        for key in previous.keys.difference(&snapshot.keys) {
            if self.repeat.is_some_and(|r| r.key == *key) {
                self.repeat = None;
            }
            self.key_up(*key, modifiers);
        }
        if let Some(r) = self.repeat
            && snapshot.time >= r.next
        {
            let interval = self.core.config.key_repeat_interval_ms.max(1);
            self.repeat = Some(Repeat {
                key: r.key,
                next: snapshot.time + Duration::from_millis(interval),
            });
            self.key_down(r.key, modifiers, true);
        }

        for c in snapshot.text.chars() {
            self.send_to_focus(&Event::Char(c));
        }

        self.previous = snapshot;
    }

    /// Lay out the tree within `bounds` and draw it through the backend.
    pub fn render(&mut self, bounds: Rect) -> Result<()> {
        self.core.update_layout(bounds);
        render_tree(&mut self.core, &mut self.backend)
    }

    /// Deliver an event, logging and swallowing handler errors.
    fn send(&mut self, node: NodeId, event: &Event) -> EventOutcome {
        trace!(?node, ?event, "input event");
        match self.core.dispatch(node, event) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(?node, error = %e, "event handler failed");
                EventOutcome::Ignore
            }
        }
    }

    /// Deliver an event to the focused node if it may receive input.
    fn send_to_focus(&mut self, event: &Event) -> EventOutcome {
        match self.core.focus {
            Some(f) if self.core.accepts_input(f) && self.core.is_enabled(f) => {
                self.send(f, event)
            }
            _ => EventOutcome::Ignore,
        }
    }

    /// The live capture target, dropping a stale one.
    fn capture_target(&mut self) -> Option<NodeId> {
        let capture = self.core.mouse_capture?;
        if self.core.is_attached_to_root(capture) {
            Some(capture)
        } else {
            debug!(?capture, "capture target gone");
            self.core.mouse_capture = None;
            None
        }
    }

    /// The enabled node under a point. A disabled node still occludes what
    /// lies beneath it.
    fn hit(&self, point: Point) -> Option<NodeId> {
        self.core.locate(point).filter(|id| self.core.is_enabled(*id))
    }

    /// Track the node under the pointer, emitting leave and enter.
    fn update_hover(&mut self, pointer: Point) {
        let hit = self.hit(pointer);
        let old = self.core.hover;
        if hit == old {
            return;
        }
        self.core.hover = hit;
        if let Some(old) = old
            && self.core.contains(old)
        {
            self.send(old, &Event::MouseLeave);
        }
        if let Some(new) = hit {
            self.send(new, &Event::MouseEnter);
        }
    }

    /// Route a move to the capture target, or the node under the pointer.
    fn pointer_moved(&mut self, position: Point) {
        let target = self.capture_target().or(self.core.hover);
        if let Some(node) = target {
            self.send(node, &Event::MouseMove { position });
        }
    }

    /// A button went down.
    fn pressed(&mut self, button: MouseButton, position: Point, time: Duration) {
        let located = self.core.locate(position);
        if let Some(menu) = self.core.context_menu()
            && !located.is_some_and(|h| h == menu || self.core.is_ancestor(menu, h))
        {
            self.core.hide_context_menu();
            self.core.flush_pending();
            self.presses.remove(&button);
            return;
        }

        let hit = located.filter(|id| self.core.is_enabled(*id));
        self.presses.insert(
            button,
            Press {
                node: hit,
                position,
                time,
            },
        );
        let Some(node) = hit else {
            return;
        };

        if self.core.config.focus_on_press {
            self.focus_under(node);
        }
        if self.capture_target().is_none() {
            debug!(?node, "capture set");
            self.core.mouse_capture = Some(node);
        }
        self.send(node, &Event::MouseDown { button, position });
    }

    /// Focus the deepest focusable node at or above `node`.
    fn focus_under(&mut self, node: NodeId) {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if !self.core.accepts_input(id) {
                return;
            }
            if self.core.is_focusable(id) {
                if let Err(e) = self.core.request_focus(id) {
                    warn!(?id, error = %e, "focus on press failed");
                }
                return;
            }
            cursor = self.core.parent(id);
        }
    }

    /// A button went up: deliver the release, then any click.
    fn released(&mut self, button: MouseButton, position: Point, time: Duration) {
        let target = self.capture_target().or_else(|| self.hit(position));
        if let Some(node) = target {
            self.send(node, &Event::MouseUp { button, position });
        }

        let Some(press) = self.presses.remove(&button) else {
            return;
        };
        let Some(origin) = press.node else {
            return;
        };
        let config = &self.core.config;
        let quick = millis(time.saturating_sub(press.time)) <= config.click_timeout_ms;
        let near = press.position.distance(position) <= config.click_distance;
        let over = self
            .hit(position)
            .is_some_and(|h| h == origin || self.core.is_ancestor(origin, h));
        if !(quick && near && over && self.core.accepts_input(origin)) {
            trace!(?origin, quick, near, over, "click abandoned");
            return;
        }

        self.send(origin, &Event::Click { button, position });
        let double = self.last_click.is_some_and(|c| {
            c.node == origin
                && c.button == button
                && millis(time.saturating_sub(c.time)) <= self.core.config.double_click_ms
        });
        if double {
            self.last_click = None;
            if self.core.contains(origin) {
                self.send(origin, &Event::DoubleClick { button, position });
            }
        } else {
            self.last_click = Some(LastClick {
                node: origin,
                button,
                time,
            });
        }
    }

    /// Route wheel notches to the nearest hovered node that accepts them.
    fn wheel(&mut self, delta: i32, position: Point) {
        let mut cursor = self.core.hover;
        while let Some(id) = cursor {
            if !self.core.accepts_input(id) {
                return;
            }
            let wants = self.core.nodes.get(id).is_some_and(|n| n.caps.wheel);
            if wants
                && self.core.is_enabled(id)
                && self.send(id, &Event::Wheel { delta, position }).is_handled()
            {
                return;
            }
            cursor = self.core.parent(id);
        }
    }

    /// A key went down or repeated.
    fn key_down(&mut self, key: Key, modifiers: Modifiers, repeat: bool) {
        for handler in &mut self.global_keys {
            match handler(key, modifiers, &mut self.core) {
                Ok(outcome) if outcome.is_handled() => {
                    self.core.flush_pending();
                    return;
                }
                Ok(_) => {}
                Err(e) => warn!(?key, error = %e, "global key handler failed"),
            }
        }
        self.core.flush_pending();

        let event = Event::KeyDown {
            key,
            modifiers,
            repeat,
        };
        if self.send_to_focus(&event).is_handled() {
            return;
        }

        match key {
            Key::Tab if self.core.config.tab_navigation => {
                let root = self.core.input_root();
                if modifiers.shift {
                    self.core.focus_prev(root);
                } else {
                    self.core.focus_next(root);
                }
                self.core.flush_pending();
            }
            Key::Escape if !repeat => {
                if let Some(top) = self.core.top_modal() {
                    let outcome = self.send(top, &Event::Cancel);
                    if !outcome.is_handled() && self.core.context_menu() == Some(top) {
                        self.core.hide_context_menu();
                        self.core.flush_pending();
                    }
                }
            }
            _ => {}
        }
    }

    /// A key went up.
    fn key_up(&mut self, key: Key, modifiers: Modifiers) {
        self.send_to_focus(&Event::KeyUp { key, modifiers });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{
        Align, EventKind,
        geom::Expanse,
        testing::{Harness, Probe},
        widgets::ScrollViewer,
    };

    fn probe_at(h: &mut Harness, rect: Rect, focusable: bool) -> Result<NodeId> {
        let probe = if focusable {
            Probe::sized(rect.w, rect.h).with_focus()
        } else {
            Probe::sized(rect.w, rect.h)
        };
        let id = h.core_mut().add(probe).id();
        let root = h.core().root_id();
        h.core_mut().attach(root, id)?;
        h.core_mut().update_props(id, |p| {
            p.set_align(Align::Start, Align::Start)
                .set_offset(rect.tl.x, rect.tl.y);
        })?;
        Ok(id)
    }

    fn kinds(h: &mut Harness, id: NodeId) -> Result<Vec<EventKind>> {
        h.core_mut().with_widget(id, |p: &mut Probe, _| p.kinds())
    }

    #[test]
    fn click_and_double_click() -> Result<()> {
        let mut h = Harness::new(Expanse::new(100, 100));
        let a = probe_at(&mut h, Rect::new(10, 10, 20, 20), false)?;
        h.click(Point::new(15, 15))?;
        h.advance(100)?;
        h.click(Point::new(16, 15))?;
        let seen = kinds(&mut h, a)?;
        assert_eq!(seen.iter().filter(|k| **k == EventKind::Click).count(), 2);
        assert_eq!(
            seen.iter().filter(|k| **k == EventKind::DoubleClick).count(),
            1
        );
        Ok(())
    }

    #[test]
    fn slow_release_is_not_a_click() -> Result<()> {
        let mut h = Harness::new(Expanse::new(100, 100));
        let a = probe_at(&mut h, Rect::new(0, 0, 50, 50), false)?;
        h.move_to(Point::new(5, 5))?;
        h.press(MouseButton::Left)?;
        h.advance(2000)?;
        h.release(MouseButton::Left)?;
        let seen = kinds(&mut h, a)?;
        assert!(seen.contains(&EventKind::MouseUp));
        assert!(!seen.contains(&EventKind::Click));
        Ok(())
    }

    #[test]
    fn hover_enter_and_leave() -> Result<()> {
        let mut h = Harness::new(Expanse::new(100, 100));
        let a = probe_at(&mut h, Rect::new(0, 0, 10, 10), false)?;
        h.move_to(Point::new(5, 5))?;
        assert!(h.core().is_mouse_over(a));
        h.move_to(Point::new(50, 50))?;
        assert!(!h.core().is_mouse_over(a));
        let seen = kinds(&mut h, a)?;
        assert!(seen.contains(&EventKind::MouseEnter));
        assert!(seen.contains(&EventKind::MouseLeave));
        Ok(())
    }

    #[test]
    fn press_focuses_and_tab_moves_on() -> Result<()> {
        let mut h = Harness::new(Expanse::new(100, 100));
        let a = probe_at(&mut h, Rect::new(0, 0, 10, 10), true)?;
        let b = probe_at(&mut h, Rect::new(20, 0, 10, 10), true)?;
        h.click(Point::new(5, 5))?;
        assert_eq!(h.core().focus_id(), Some(a));
        h.key(Key::Tab)?;
        assert_eq!(h.core().focus_id(), Some(b));
        h.key(Key::Tab)?;
        assert_eq!(h.core().focus_id(), Some(a));
        Ok(())
    }

    #[test]
    fn keys_and_text_reach_focus() -> Result<()> {
        let mut h = Harness::new(Expanse::new(100, 100));
        let a = probe_at(&mut h, Rect::new(0, 0, 10, 10), true)?;
        h.core_mut().request_focus(a)?;
        h.key(Key::Char('x'))?;
        h.type_text("hi")?;
        let seen = kinds(&mut h, a)?;
        assert!(seen.contains(&EventKind::KeyDown));
        assert!(seen.contains(&EventKind::KeyUp));
        assert_eq!(seen.iter().filter(|k| **k == EventKind::Char).count(), 2);
        Ok(())
    }

    #[test]
    fn held_key_repeats() -> Result<()> {
        let mut h = Harness::new(Expanse::new(100, 100));
        let a = probe_at(&mut h, Rect::new(0, 0, 10, 10), true)?;
        h.core_mut().request_focus(a)?;
        h.key_down(Key::Down)?;
        h.advance(100)?;
        h.advance(450)?;
        h.advance(60)?;
        h.key_up(Key::Down)?;
        let repeats = h.core_mut().with_widget(a, |p: &mut Probe, _| {
            p.events()
                .iter()
                .filter(|e| matches!(e, Event::KeyDown { repeat: true, .. }))
                .count()
        })?;
        assert_eq!(repeats, 2);
        Ok(())
    }

    #[test]
    fn global_handlers_run_first() -> Result<()> {
        let mut h = Harness::new(Expanse::new(100, 100));
        let a = probe_at(&mut h, Rect::new(0, 0, 10, 10), true)?;
        h.core_mut().request_focus(a)?;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        h.desktop_mut().on_key_down_global(move |key, _, core| {
            if let Ok(mut v) = sink.lock() {
                v.push((key, core.has_modal_widget()));
            }
            Ok(if key == Key::F(1) {
                EventOutcome::Handle
            } else {
                EventOutcome::Ignore
            })
        });
        h.key(Key::F(1))?;
        h.key(Key::F(2))?;
        let keys = kinds(&mut h, a)?
            .into_iter()
            .filter(|k| *k == EventKind::KeyDown)
            .count();
        assert_eq!(keys, 1);
        assert_eq!(seen.lock().map(|v| v.len()).unwrap_or(0), 2);
        Ok(())
    }

    #[test]
    fn disabled_nodes_occlude_without_input() -> Result<()> {
        let mut h = Harness::new(Expanse::new(100, 100));
        let below = probe_at(&mut h, Rect::new(0, 0, 100, 100), true)?;
        let lid = probe_at(&mut h, Rect::new(0, 0, 30, 30), true)?;
        h.core_mut().update_props(lid, |p| {
            p.set_enabled(false);
        })?;
        h.click(Point::new(5, 5))?;
        assert!(kinds(&mut h, lid)?.is_empty());
        assert!(kinds(&mut h, below)?.is_empty());
        assert_eq!(h.core().focus_id(), None);

        h.click(Point::new(50, 50))?;
        assert!(kinds(&mut h, below)?.contains(&EventKind::Click));
        Ok(())
    }

    #[test]
    fn escape_cancels_top_modal() -> Result<()> {
        let mut h = Harness::new(Expanse::new(100, 100));
        let dialog = probe_at(&mut h, Rect::new(10, 10, 50, 50), false)?;
        h.core_mut().push_modal(dialog)?;
        h.key(Key::Escape)?;
        assert!(kinds(&mut h, dialog)?.contains(&EventKind::Cancel));
        Ok(())
    }

    #[test]
    fn press_outside_closes_context_menu() -> Result<()> {
        let mut h = Harness::new(Expanse::new(100, 100));
        let below = probe_at(&mut h, Rect::new(0, 0, 100, 100), false)?;
        let menu = h.core_mut().add(Probe::sized(20, 20)).id();
        h.layout();
        h.core_mut().show_context_menu(menu, Point::new(10, 10))?;
        h.layout();
        assert_eq!(h.core().screen_rect(menu), Some(Rect::new(10, 10, 20, 20)));
        h.click(Point::new(80, 80))?;
        assert_eq!(h.core().context_menu(), None);
        assert!(!h.core().contains(menu) || h.core().parent(menu).is_none());
        assert!(!kinds(&mut h, below)?.contains(&EventKind::MouseDown));
        Ok(())
    }

    #[test]
    fn wheel_goes_to_nearest_scroller() -> Result<()> {
        let mut h = Harness::new(Expanse::new(100, 100));
        let viewer = h.core_mut().add(ScrollViewer::vertical()).id();
        let root = h.core().root_id();
        h.core_mut().attach(root, viewer)?;
        let content = h.core_mut().add(Probe::sized(50, 400)).id();
        h.core_mut().attach(viewer, content)?;
        h.move_to(Point::new(5, 5))?;
        h.wheel(-2)?;
        assert_eq!(h.core().node(viewer).map(|n| n.scroll()), Some(Point::new(0, 40)));
        h.wheel(5)?;
        assert_eq!(h.core().node(viewer).map(|n| n.scroll()), Some(Point::zero()));
        Ok(())
    }
}
