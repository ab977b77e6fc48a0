//! Integration tests for the render walk.

#[cfg(test)]
mod tests {
    use arbor::{
        Align, Result,
        geom::{Expanse, Point, Rect},
        render::{Color, TextureId},
        testing::{DrawCall, Harness, Probe},
        widgets::{Image, Panel, ScrollViewer},
    };

    const RED: Color = Color::rgb(255, 0, 0);

    fn fill(dest: Rect, tint: Color) -> DrawCall {
        DrawCall::Draw {
            texture: TextureId::SOLID,
            dest,
            source: None,
            tint,
        }
    }

    #[test]
    fn scrolled_content_draws_inside_scissor() -> Result<()> {
        let mut h = Harness::new(Expanse::new(100, 100));
        let core = h.core_mut();
        let viewer = core.add(ScrollViewer::vertical()).id();
        core.attach(core.root_id(), viewer)?;
        let content = core.add(Probe::sized(100, 500).with_fill(RED)).id();
        core.attach(viewer, content)?;
        h.layout();
        h.core_mut().scroll_to(viewer, Point::new(0, 150));

        let calls = h.render()?;
        assert_eq!(
            calls,
            vec![
                DrawCall::BeginScissor(Rect::new(0, 0, 100, 100)),
                fill(Rect::new(0, -150, 100, 500), RED),
                DrawCall::EndScissor,
            ]
        );
        Ok(())
    }

    #[test]
    fn hidden_and_offscreen_nodes_are_skipped() -> Result<()> {
        let mut h = Harness::new(Expanse::new(50, 50));
        let core = h.core_mut();
        let root = core.root_id();
        let hidden = core.add(Probe::sized(10, 10).with_fill(RED)).id();
        core.attach(root, hidden)?;
        core.update_props(hidden, |p| {
            p.set_visible(false);
        })?;
        let away = core.add(Probe::sized(10, 10).with_fill(Color::BLACK)).id();
        core.attach(root, away)?;
        core.update_props(away, |p| {
            p.set_align(Align::Start, Align::Start).set_offset(80, 80);
        })?;
        assert!(h.render()?.is_empty());
        Ok(())
    }

    #[test]
    fn later_siblings_draw_on_top() -> Result<()> {
        let mut h = Harness::new(Expanse::new(40, 40));
        let core = h.core_mut();
        let root = core.root_id();
        let back = core.add(Panel::with_background(Color::BLACK)).id();
        let front = core
            .add(Image::new(TextureId(9), Expanse::new(8, 8)).with_source(Rect::new(0, 0, 4, 4)))
            .id();
        core.attach(root, back)?;
        core.attach(root, front)?;
        core.update_props(front, |p| {
            p.set_align(Align::Center, Align::Center);
        })?;

        let calls = h.render()?;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], fill(Rect::new(0, 0, 40, 40), Color::BLACK));
        assert_eq!(
            calls[1],
            DrawCall::Draw {
                texture: TextureId(9),
                dest: Rect::new(16, 16, 8, 8),
                source: Some(Rect::new(0, 0, 4, 4)),
                tint: Color::WHITE,
            }
        );
        Ok(())
    }
}
