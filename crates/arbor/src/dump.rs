use std::io::{self, Write};

use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use crate::{
    error::{Error, Result},
    focus::FocusManager,
    id::NodeId,
    modal::ModalStack,
    world::Core,
};

/// Render the subtree under `root` as an indented, colored listing of widget
/// name, identifier, arranged rect and state markers. This is a debug function.
pub fn dump(core: &Core, root: NodeId) -> Result<String> {
    render(core, root, Buffer::ansi())
}

/// Like [`dump`], without color codes.
pub fn dump_plain(core: &Core, root: NodeId) -> Result<String> {
    render(core, root, Buffer::no_color())
}

/// Write the listing into `buffer` and return it as a string.
fn render(core: &Core, root: NodeId, mut buffer: Buffer) -> Result<String> {
    if !core.contains(root) {
        return Err(Error::NodeNotFound(root));
    }
    dump_node(&mut buffer, core, root, 0).map_err(|e| Error::Invalid(format!("dump: {e}")))?;
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

/// State markers shown after a node's rect.
fn markers(core: &Core, id: NodeId) -> Vec<&'static str> {
    let Some(node) = core.node(id) else {
        return Vec::new();
    };
    let checks = [
        (!node.props().visible(), "hidden"),
        (!node.props().enabled(), "disabled"),
        (node.is_measure_dirty(), "measure-dirty"),
        (node.is_arrange_dirty(), "arrange-dirty"),
        (core.is_focused(id), "focus"),
        (core.capture_id() == Some(id), "capture"),
        (core.hover_id() == Some(id), "hover"),
        (core.modal_ids().contains(&id), "modal"),
    ];
    checks
        .into_iter()
        .filter_map(|(on, label)| on.then_some(label))
        .collect()
}

/// Write one node and its subtree.
fn dump_node(buffer: &mut Buffer, core: &Core, id: NodeId, level: usize) -> io::Result<()> {
    let Some(node) = core.node(id) else {
        return Ok(());
    };
    let indent = "    ".repeat(level);
    write!(buffer, "{indent}")?;

    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
    write!(buffer, "{}", node.name())?;
    buffer.reset()?;

    if let Some(ident) = node.props().identifier() {
        buffer.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(buffer, " #{ident}")?;
        buffer.reset()?;
    }

    let r = node.rect();
    write!(buffer, " ({}, {}) {}x{}", r.tl.x, r.tl.y, r.w, r.h)?;

    let scroll = node.scroll();
    if !scroll.is_zero() {
        write!(buffer, " scroll ({}, {})", scroll.x, scroll.y)?;
    }

    let marks = markers(core, id);
    if !marks.is_empty() {
        buffer.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        write!(buffer, " [{}]", marks.join(" "))?;
        buffer.reset()?;
    }
    writeln!(buffer)?;

    for child in node.children() {
        dump_node(buffer, core, *child, level + 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{geom::Rect, testing::Probe, widgets::StackPanel};

    #[test]
    fn plain_listing() -> Result<()> {
        let mut core = Core::new();
        let stack = core.add(StackPanel::vertical()).id();
        core.attach(core.root_id(), stack)?;
        let leaf = core.add(Probe::sized(10, 3).with_focus()).id();
        core.attach(stack, leaf)?;
        core.update_props(leaf, |p| {
            p.set_identifier("leaf");
        })?;
        core.update_layout(Rect::new(0, 0, 20, 10));
        core.request_focus(leaf)?;

        let out = dump_plain(&core, core.root_id())?;
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "panel (0, 0) 20x10",
                "    stack_panel (0, 0) 20x10",
                "        probe #leaf (0, 0) 20x3 [focus]",
            ]
        );
        Ok(())
    }

    #[test]
    fn missing_root_is_an_error() -> Result<()> {
        let mut core = Core::new();
        let gone = core.add(Probe::default()).id();
        core.remove(gone)?;
        assert_eq!(dump(&core, gone), Err(Error::NodeNotFound(gone)));
        Ok(())
    }
}
