//! Integration tests for pointer routing, capture and modality.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use arbor::{
        Align, Core, Event, EventKind, FocusManager, ModalStack, NodeId, Result,
        geom::{Expanse, Point, Rect},
        input::{Key, MouseButton},
        testing::{Harness, Probe},
        widgets::{Panel, SplitPane},
    };

    fn placed(core: &mut Core, parent: NodeId, probe: Probe, rect: Rect) -> Result<NodeId> {
        let id = core.add(probe).id();
        core.attach(parent, id)?;
        core.update_props(id, |p| {
            p.set_align(Align::Start, Align::Start)
                .set_offset(rect.tl.x, rect.tl.y);
        })?;
        core.try_update_props(id, |p| p.set_size(i64::from(rect.w), i64::from(rect.h)))?;
        Ok(id)
    }

    fn events(core: &mut Core, id: NodeId) -> Result<Vec<Event>> {
        core.with_widget(id, |p: &mut Probe, _| p.events().to_vec())
    }

    #[test]
    fn capture_follows_drag_outside() -> Result<()> {
        let mut h = Harness::new(Expanse::new(100, 100));
        let root = h.core().root_id();
        let a = placed(h.core_mut(), root, Probe::default(), Rect::new(0, 0, 20, 20))?;
        let b = placed(h.core_mut(), root, Probe::default(), Rect::new(50, 50, 20, 20))?;

        h.drag(Point::new(5, 5), Point::new(60, 60))?;

        let seen = events(h.core_mut(), a)?;
        assert!(seen.contains(&Event::MouseMove {
            position: Point::new(60, 60)
        }));
        assert!(seen.contains(&Event::MouseUp {
            button: MouseButton::Left,
            position: Point::new(60, 60)
        }));
        assert!(!seen.iter().any(|e| e.kind() == EventKind::Click));

        let other = events(h.core_mut(), b)?;
        assert!(!other.iter().any(|e| matches!(
            e.kind(),
            EventKind::MouseMove | EventKind::MouseUp | EventKind::MouseDown
        )));
        assert_eq!(h.core().capture_id(), None);
        Ok(())
    }

    #[test]
    fn removed_capture_target_is_dropped() -> Result<()> {
        let mut h = Harness::new(Expanse::new(100, 100));
        let root = h.core().root_id();
        let a = placed(h.core_mut(), root, Probe::default(), Rect::new(0, 0, 20, 20))?;
        let b = placed(h.core_mut(), root, Probe::default(), Rect::new(50, 50, 20, 20))?;
        h.move_to(Point::new(5, 5))?;
        h.press(MouseButton::Left)?;
        assert_eq!(h.core().capture_id(), Some(a));

        h.core_mut().remove(a)?;
        assert_eq!(h.core().capture_id(), None);
        h.move_to(Point::new(55, 55))?;
        assert!(events(h.core_mut(), b)?.iter().any(|e| e.kind() == EventKind::MouseMove));
        h.release(MouseButton::Left)?;
        Ok(())
    }

    #[test]
    fn modal_excludes_every_outside_point() -> Result<()> {
        let mut h = Harness::new(Expanse::new(100, 100));
        let root = h.core().root_id();
        let below = placed(h.core_mut(), root, Probe::default(), Rect::new(0, 0, 100, 100))?;
        let dialog = placed(h.core_mut(), root, Probe::default(), Rect::new(40, 40, 20, 20))?;
        h.core_mut().push_modal(dialog)?;

        for y in (0..100).step_by(7) {
            for x in (0..100).step_by(7) {
                h.click(Point::new(x, y))?;
            }
        }
        assert!(events(h.core_mut(), below)?.is_empty());
        let clicks = events(h.core_mut(), dialog)?
            .iter()
            .filter(|e| e.kind() == EventKind::Click)
            .count();
        assert!(clicks > 0);

        assert_eq!(h.core_mut().pop_modal(), Some(dialog));
        h.click(Point::new(5, 5))?;
        assert!(events(h.core_mut(), below)?.iter().any(|e| e.kind() == EventKind::Click));
        Ok(())
    }

    #[test]
    fn modal_confines_tab_traversal() -> Result<()> {
        let mut h = Harness::new(Expanse::new(100, 100));
        let root = h.core().root_id();
        let outside = placed(h.core_mut(), root, Probe::focusable(), Rect::new(0, 0, 10, 10))?;

        let core = h.core_mut();
        let dialog = core.add(Panel::default()).id();
        core.attach(root, dialog)?;
        let first = placed(core, dialog, Probe::focusable(), Rect::new(0, 0, 10, 10))?;
        let second = placed(core, dialog, Probe::focusable(), Rect::new(20, 0, 10, 10))?;

        core.request_focus(outside)?;
        core.push_modal(dialog)?;
        assert_eq!(h.core().focus_id(), Some(first));
        h.key(Key::Tab)?;
        assert_eq!(h.core().focus_id(), Some(second));
        h.key(Key::Tab)?;
        assert_eq!(h.core().focus_id(), Some(first));

        h.core_mut().pop_modal();
        assert_eq!(h.core().focus_id(), Some(outside));
        Ok(())
    }

    #[test]
    fn splitter_drag_moves_panes() -> Result<()> {
        let mut h = Harness::new(Expanse::new(104, 20));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut pane = SplitPane::horizontal()
            .with_proportions(&[0.5, 0.5])?
            .with_splitter_size(4);
        pane.on_proportions_changed(move |p| {
            if let Ok(mut v) = sink.lock() {
                v.push(p.to_vec());
            }
        });

        let core = h.core_mut();
        let split = core.add(pane).id();
        core.attach(core.root_id(), split)?;
        let left = core.add(Probe::default()).id();
        let right = core.add(Probe::default()).id();
        core.attach(split, left)?;
        core.attach(split, right)?;
        h.layout();
        assert_eq!(h.core().node(left).map(|n| n.rect()), Some(Rect::new(0, 0, 50, 20)));

        h.drag(Point::new(51, 10), Point::new(71, 10))?;
        h.layout();
        assert_eq!(h.core().node(left).map(|n| n.rect()), Some(Rect::new(0, 0, 70, 20)));
        assert_eq!(h.core().node(right).map(|n| n.rect()), Some(Rect::new(74, 0, 30, 20)));
        let last = seen.lock().ok().and_then(|v| v.last().cloned()).unwrap_or_default();
        assert_eq!(last.len(), 2);
        assert!((last[0] - 0.7).abs() < 1e-4);
        assert_eq!(h.core().capture_id(), None);
        Ok(())
    }

    #[test]
    fn removing_a_pane_mid_drag_ends_the_drag() -> Result<()> {
        let mut h = Harness::new(Expanse::new(104, 20));
        let core = h.core_mut();
        let split = core
            .add(
                SplitPane::horizontal()
                    .with_proportions(&[0.5, 0.5])?
                    .with_splitter_size(4),
            )
            .id();
        core.attach(core.root_id(), split)?;
        let left = core.add(Probe::default()).id();
        let right = core.add(Probe::default()).id();
        core.attach(split, left)?;
        core.attach(split, right)?;
        h.layout();

        h.move_to(Point::new(51, 10))?;
        h.press(MouseButton::Left)?;
        h.core_mut().remove(right)?;
        h.layout();
        h.move_to(Point::new(60, 10))?;
        h.release(MouseButton::Left)?;
        h.layout();

        assert_eq!(h.core().node(left).map(|n| n.rect()), Some(Rect::new(0, 0, 104, 20)));
        let (dragging, proportions) = h.core_mut().with_widget(split, |s: &mut SplitPane, _| {
            (s.is_dragging(), s.proportions().to_vec())
        })?;
        assert!(!dragging);
        assert_eq!(proportions, vec![1.0]);
        assert_eq!(h.core().capture_id(), None);
        Ok(())
    }

    #[test]
    fn handler_errors_do_not_escape() -> Result<()> {
        let mut h = Harness::new(Expanse::new(100, 100));
        let root = h.core().root_id();
        let a = placed(h.core_mut(), root, Probe::default(), Rect::new(0, 0, 20, 20))?;
        h.core_mut().on(a, EventKind::Click, |_, _| {
            Err(arbor::Error::Invalid("boom".into()))
        })?;
        h.click(Point::new(5, 5))?;
        assert!(events(h.core_mut(), a)?.iter().any(|e| e.kind() == EventKind::Click));
        Ok(())
    }

    #[test]
    fn handlers_run_in_registration_order() -> Result<()> {
        let mut h = Harness::new(Expanse::new(100, 100));
        let root = h.core().root_id();
        let a = placed(h.core_mut(), root, Probe::default(), Rect::new(0, 0, 20, 20))?;
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let sink = Arc::clone(&order);
            h.core_mut().on(a, EventKind::Click, move |_, _| {
                if let Ok(mut v) = sink.lock() {
                    v.push(tag);
                }
                Ok(())
            })?;
        }
        h.click(Point::new(5, 5))?;
        assert_eq!(
            order.lock().map(|v| v.clone()).unwrap_or_default(),
            vec!["first", "second", "third"]
        );
        Ok(())
    }

    #[test]
    fn handler_can_close_its_own_dialog() -> Result<()> {
        let mut h = Harness::new(Expanse::new(100, 100));
        let root = h.core().root_id();
        let dialog = placed(h.core_mut(), root, Probe::default(), Rect::new(10, 10, 50, 50))?;
        let ok = placed(h.core_mut(), dialog, Probe::default(), Rect::new(0, 0, 10, 10))?;
        h.core_mut().push_modal(dialog)?;
        h.core_mut().on(ok, EventKind::Click, move |_, ctx| {
            ctx.pop_modal();
            ctx.core_mut().remove(dialog)?;
            Ok(())
        })?;
        h.click(Point::new(12, 12))?;
        assert!(!h.core().contains(dialog));
        assert!(!h.core().has_modal_widget());
        Ok(())
    }
}
