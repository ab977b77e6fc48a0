use crate::{
    error::Result,
    geom::{Expanse, Rect},
    layout::MeasureCtx,
    render::{Color, Render, TextureId},
    widget::Widget,
};

/// A leaf that draws a texture region stretched over its content box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Image {
    /// Texture to draw.
    texture: TextureId,
    /// Natural size reported to layout.
    natural: Expanse,
    /// Region of the texture to draw; `None` draws all of it.
    source: Option<Rect>,
    /// Tint applied to the texture.
    tint: Color,
}

impl Image {
    /// An image of the whole texture with the given natural size.
    pub fn new(texture: TextureId, natural: Expanse) -> Self {
        Self {
            texture,
            natural,
            source: None,
            tint: Color::WHITE,
        }
    }

    /// Draw only `source` from the texture. Its size becomes the natural size.
    pub fn with_source(mut self, source: Rect) -> Self {
        self.source = Some(source);
        self.natural = source.expanse();
        self
    }

    /// Builder form of [`set_tint`](Self::set_tint).
    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    /// Texture handle.
    pub fn texture(&self) -> TextureId {
        self.texture
    }

    /// Change the tint.
    pub fn set_tint(&mut self, tint: Color) {
        self.tint = tint;
    }
}

impl Widget for Image {
    fn measure(&self, _ctx: &mut MeasureCtx<'_>, _available: Expanse) -> Expanse {
        self.natural
    }

    fn render(&mut self, r: &mut Render<'_>) -> Result<()> {
        let dest = r.content();
        if dest.is_zero() {
            return Ok(());
        }
        r.draw(self.texture, dest, self.source, self.tint)
    }
}
