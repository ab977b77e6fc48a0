//! Draw-call interface and the render walk.

use tracing::trace;

use crate::{
    error::Result,
    geom::{Point, Rect},
    id::NodeId,
    world::Core,
};

/// Opaque handle to a texture owned by the render backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

impl TextureId {
    /// Conventional handle for a solid white texture, used for fills.
    pub const SOLID: Self = Self(0);
}

/// An RGBA tint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Opaque white, the identity tint.
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);

    /// Construct a color from components.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Construct an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// The trait implemented by renderers.
///
/// All rects are in desktop coordinates.
pub trait RenderBackend {
    /// Draw `source` from `texture` (or the whole texture) into `dest`.
    fn draw(&mut self, texture: TextureId, dest: Rect, source: Option<Rect>, tint: Color)
    -> Result<()>;
    /// Restrict drawing to `rect` until the matching `end_scissor`. Scissors nest.
    fn begin_scissor(&mut self, rect: Rect) -> Result<()>;
    /// Pop the innermost scissor.
    fn end_scissor(&mut self) -> Result<()>;
}

/// A renderer bound to one node's rectangle during the render walk.
pub struct Render<'a> {
    /// Backend receiving draw calls.
    backend: &'a mut dyn RenderBackend,
    /// Node being drawn.
    node: NodeId,
    /// The node's rect in desktop coordinates.
    rect: Rect,
    /// The node's content rect in desktop coordinates.
    content: Rect,
    /// Visible region in desktop coordinates.
    clip: Rect,
}

impl<'a> Render<'a> {
    /// Construct a renderer for one node.
    pub(crate) fn new(
        backend: &'a mut dyn RenderBackend,
        node: NodeId,
        (rect, content): (Rect, Rect),
        clip: Rect,
    ) -> Self {
        Self {
            backend,
            node,
            rect,
            content,
            clip,
        }
    }

    /// The node being drawn.
    pub fn node_id(&self) -> NodeId {
        self.node
    }

    /// The node's rect in desktop coordinates.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// The node's rect shrunk by padding, in desktop coordinates.
    pub fn content(&self) -> Rect {
        self.content
    }

    /// The visible region in desktop coordinates.
    pub fn clip(&self) -> Rect {
        self.clip
    }

    /// Convert a point relative to the node's top-left corner into desktop coordinates.
    pub fn to_screen(&self, local: Point) -> Point {
        self.rect.tl + local
    }

    /// Issue a draw call. Calls that fall entirely outside the visible region are dropped.
    pub fn draw(
        &mut self,
        texture: TextureId,
        dest: Rect,
        source: Option<Rect>,
        tint: Color,
    ) -> Result<()> {
        if dest.intersect(&self.clip).is_none() {
            return Ok(());
        }
        self.backend.draw(texture, dest, source, tint)
    }

    /// Fill a rect with a solid color.
    pub fn fill(&mut self, dest: Rect, color: Color) -> Result<()> {
        self.draw(TextureId::SOLID, dest, None, color)
    }

    /// Fill the node's whole rect with a solid color.
    pub fn fill_all(&mut self, color: Color) -> Result<()> {
        self.fill(self.rect, color)
    }
}

/// Walk the tree from the root, drawing every visible node back to front.
pub(crate) fn render_tree(core: &mut Core, backend: &mut dyn RenderBackend) -> Result<()> {
    let root = core.root_id();
    let clip = core.bounds();
    render_node(core, backend, root, Point::zero(), clip)
}

/// Draw one node and then its children. `offset` is the scroll translation
/// accumulated from ancestors.
fn render_node(
    core: &mut Core,
    backend: &mut dyn RenderBackend,
    id: NodeId,
    offset: Point,
    clip: Rect,
) -> Result<()> {
    let Some(node) = core.node(id) else {
        return Ok(());
    };
    if !node.props().visible() {
        return Ok(());
    }
    let rect = node.rect().translate(-offset.x, -offset.y);
    let content = node.content_rect().translate(-offset.x, -offset.y);
    let clips = node.clips();
    let child_offset = offset + node.scroll();
    let children = node.children().to_vec();

    if rect.intersect(&clip).is_some() {
        trace!(?id, ?rect, "render");
        core.with_widget_mut(id, |w, _| {
            let mut r = Render::new(&mut *backend, id, (rect, content), clip);
            w.render(&mut r)
        })??;
    }

    if children.is_empty() {
        return Ok(());
    }
    if clips {
        let Some(child_clip) = content.intersect(&clip) else {
            return Ok(());
        };
        backend.begin_scissor(child_clip)?;
        let result = children
            .iter()
            .try_for_each(|child| render_node(core, backend, *child, child_offset, child_clip));
        backend.end_scissor()?;
        result
    } else {
        for child in children {
            render_node(core, backend, child, child_offset, clip)?;
        }
        Ok(())
    }
}
