use crate::{
    error::Result,
    render::{Color, Render},
    widget::Widget,
};

/// A plain container: every child is stretched over the content box, later
/// children on top. Optionally paints a background.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Panel {
    /// Background fill, drawn before children.
    background: Option<Color>,
}

impl Panel {
    /// A transparent panel.
    pub fn new() -> Self {
        Self::default()
    }

    /// A panel filled with `color`.
    pub fn with_background(color: Color) -> Self {
        Self {
            background: Some(color),
        }
    }

    /// Background fill.
    pub fn background(&self) -> Option<Color> {
        self.background
    }

    /// Change the background fill.
    pub fn set_background(&mut self, color: Option<Color>) {
        self.background = color;
    }
}

impl Widget for Panel {
    fn render(&mut self, r: &mut Render<'_>) -> Result<()> {
        match self.background {
            Some(color) => r.fill_all(color),
            None => Ok(()),
        }
    }
}
