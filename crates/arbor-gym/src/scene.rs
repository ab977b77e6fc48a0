//! Sample trees for the gym.

use arbor::{
    Align, Core, EventKind, ModalStack, NodeId, Result,
    geom::{Edges, Expanse},
    grid::{Grid, Proportion},
    render::{Color, TextureId},
    testing::Probe,
    widgets::{Image, Panel, ScrollViewer, SplitPane, StackPanel},
};
use clap::ValueEnum;
use tracing::info;

/// A named sample tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scene {
    /// A three by three grid mixing fixed, auto and fill tracks.
    Grid,
    /// A split pane with a list on the left and a scrolled log on the right.
    Split,
    /// A button behind a modal dialog.
    Dialog,
}

/// Shades used to tell nodes apart in the draw table.
const PALETTE: [Color; 4] = [
    Color::rgb(200, 60, 60),
    Color::rgb(60, 200, 60),
    Color::rgb(60, 60, 200),
    Color::rgb(200, 200, 60),
];

impl Scene {
    /// Build the scene under the root of `core`.
    pub fn build(self, core: &mut Core) -> Result<()> {
        match self {
            Self::Grid => grid(core),
            Self::Split => split(core),
            Self::Dialog => dialog(core),
        }
    }
}

/// Add a probe that logs the pointer events it sees.
fn leaf(core: &mut Core, parent: NodeId, name: &str, probe: Probe) -> Result<NodeId> {
    let id = core.add(probe).id();
    core.attach(parent, id)?;
    core.update_props(id, |p| {
        p.set_identifier(name);
    })?;
    for kind in [EventKind::Click, EventKind::DoubleClick, EventKind::Wheel] {
        let name = name.to_string();
        core.on(id, kind, move |event, _| {
            info!(node = %name, ?event, "event");
            Ok(())
        })?;
    }
    Ok(id)
}

/// Grid scene.
fn grid(core: &mut Core) -> Result<()> {
    let grid = core
        .add(
            Grid::new()
                .with_columns(&[Proportion::Pixels(20), Proportion::Auto, Proportion::Fill])?
                .with_rows(&[Proportion::Auto, Proportion::part(1.0)?, Proportion::part(2.0)?])?
                .with_spacing(1, 1),
        )
        .id();
    core.attach(core.root_id(), grid)?;
    core.update_props(grid, |p| {
        p.set_identifier("grid").set_padding(Edges::all(2));
    })?;
    let cells = (0..3).flat_map(|row| (0..3).map(move |column| (column, row)));
    for (index, (column, row)) in cells.enumerate() {
        let probe = Probe::sized(6 + 2 * index as u32, 3).with_fill(PALETTE[index % PALETTE.len()]);
        let cell = leaf(core, grid, &format!("cell-{column}-{row}"), probe)?;
        core.try_update_props(cell, |p| p.set_grid(column, row))?;
    }
    let badge = core.add(Image::new(TextureId(1), Expanse::new(4, 4))).id();
    core.attach(grid, badge)?;
    core.update_props(badge, |p| {
        p.set_identifier("badge").set_align(Align::End, Align::End);
    })?;
    core.try_update_props(badge, |p| p.set_grid(2, 2))
}

/// Split scene.
fn split(core: &mut Core) -> Result<()> {
    let pane = core
        .add(SplitPane::horizontal().with_proportions(&[0.3, 0.7])?)
        .id();
    core.attach(core.root_id(), pane)?;
    core.update_props(pane, |p| {
        p.set_identifier("split");
    })?;

    let list = core.add(StackPanel::vertical().with_spacing(1)).id();
    core.attach(pane, list)?;
    for i in 0..6 {
        leaf(
            core,
            list,
            &format!("item-{i}"),
            Probe::sized(10, 2).with_focus().with_fill(PALETTE[i % PALETTE.len()]),
        )?;
    }

    let viewer = core.add(ScrollViewer::vertical()).id();
    core.attach(pane, viewer)?;
    core.update_props(viewer, |p| {
        p.set_identifier("log");
    })?;
    let lines = core.add(StackPanel::vertical()).id();
    core.attach(viewer, lines)?;
    for i in 0..40 {
        leaf(
            core,
            lines,
            &format!("line-{i}"),
            Probe::sized(30, 1).with_fill(PALETTE[i % PALETTE.len()]),
        )?;
    }
    Ok(())
}

/// Dialog scene.
fn dialog(core: &mut Core) -> Result<()> {
    let root = core.root_id();
    let button = leaf(core, root, "background", Probe::sized(12, 3).with_focus())?;
    core.update_props(button, |p| {
        p.set_align(Align::Start, Align::Start).set_offset(1, 1);
    })?;

    let dialog = core.add(Panel::with_background(Color::BLACK)).id();
    core.attach(root, dialog)?;
    core.update_props(dialog, |p| {
        p.set_identifier("dialog")
            .set_align(Align::Center, Align::Center)
            .set_padding(Edges::all(1));
    })?;
    core.try_update_props(dialog, |p| p.set_size(30, 8))?;
    let buttons = core.add(StackPanel::horizontal().with_spacing(2)).id();
    core.attach(dialog, buttons)?;
    let ok = leaf(core, buttons, "ok", Probe::sized(8, 3).with_focus().with_fill(PALETTE[1]))?;
    leaf(core, buttons, "cancel", Probe::sized(8, 3).with_focus().with_fill(PALETTE[0]))?;

    core.on(ok, EventKind::Click, move |_, ctx| {
        info!("dialog accepted");
        ctx.pop_modal();
        ctx.core_mut().detach(dialog)
    })?;
    core.on(dialog, EventKind::Cancel, move |_, ctx| {
        info!("dialog cancelled");
        ctx.pop_modal();
        ctx.core_mut().detach(dialog)
    })?;
    core.push_modal(dialog)
}
