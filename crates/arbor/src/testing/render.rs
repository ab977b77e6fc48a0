use std::{
    mem,
    sync::{Arc, Mutex},
};

use crate::{
    error::{Error, Result},
    geom::Rect,
    render::{Color, RenderBackend, TextureId},
};

/// One call received by a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCall {
    /// A textured draw.
    Draw {
        /// Texture handle.
        texture: TextureId,
        /// Destination in desktop coordinates.
        dest: Rect,
        /// Source region, if any.
        source: Option<Rect>,
        /// Tint.
        tint: Color,
    },
    /// A scissor push.
    BeginScissor(Rect),
    /// A scissor pop.
    EndScissor,
}

/// A render backend that records every call into a shared buffer.
///
/// Clones share the buffer, so a test can keep one handle while the desktop
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    /// Shared call log.
    calls: Arc<Mutex<Vec<DrawCall>>>,
}

impl RecordingBackend {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the calls recorded so far.
    pub fn calls(&self) -> Vec<DrawCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Remove and return the calls recorded so far.
    pub fn take(&self) -> Vec<DrawCall> {
        self.calls
            .lock()
            .map(|mut c| mem::take(&mut *c))
            .unwrap_or_default()
    }

    /// Destination rects of the draw calls recorded so far.
    pub fn draw_rects(&self) -> Vec<Rect> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DrawCall::Draw { dest, .. } => Some(dest),
                _ => None,
            })
            .collect()
    }

    /// Append a call.
    fn push(&self, call: DrawCall) -> Result<()> {
        self.calls
            .lock()
            .map_err(|e| Error::Render(e.to_string()))?
            .push(call);
        Ok(())
    }
}

impl RenderBackend for RecordingBackend {
    fn draw(
        &mut self,
        texture: TextureId,
        dest: Rect,
        source: Option<Rect>,
        tint: Color,
    ) -> Result<()> {
        self.push(DrawCall::Draw {
            texture,
            dest,
            source,
            tint,
        })
    }

    fn begin_scissor(&mut self, rect: Rect) -> Result<()> {
        self.push(DrawCall::BeginScissor(rect))
    }

    fn end_scissor(&mut self) -> Result<()> {
        self.push(DrawCall::EndScissor)
    }
}
