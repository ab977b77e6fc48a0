use crate::{
    context::Context,
    error::Result,
    event::{Event, EventKind},
    geom::{Expanse, Rect},
    id::NodeId,
    layout::{ArrangeCtx, MeasureCtx},
    render::{Color, Render},
    widget::{EventOutcome, Widget},
};

/// A leaf widget with a fixed natural size that records what it receives.
#[derive(Debug, Clone, Default)]
pub struct Probe {
    /// Natural size reported by measure.
    pub size: Expanse,
    /// Refuse to give up focus.
    pub veto_blur: bool,
    /// Accept keyboard focus.
    pub focusable: bool,
    /// Accept wheel input.
    pub wheel: bool,
    /// Outcome returned for every event.
    pub outcome: Option<EventOutcome>,
    /// Fill color drawn over the whole rect.
    pub fill: Option<Color>,
    /// Events received, in order.
    events: Vec<Event>,
    /// Last content rect handed to arrange.
    arranged: Option<Rect>,
}

impl Probe {
    /// A probe with natural size `w` x `h`.
    pub fn sized(w: u32, h: u32) -> Self {
        Self {
            size: Expanse::new(w, h),
            ..Self::default()
        }
    }

    /// A zero-sized focusable probe.
    pub fn focusable() -> Self {
        Self::default().with_focus()
    }

    /// Make the probe focusable.
    pub fn with_focus(mut self) -> Self {
        self.focusable = true;
        self
    }

    /// Draw a solid fill when rendered.
    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    /// Events received so far.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Kinds of the events received so far.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.iter().map(Event::kind).collect()
    }

    /// Forget recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Last content rect handed to arrange.
    pub fn arranged(&self) -> Option<Rect> {
        self.arranged
    }
}

impl Widget for Probe {
    fn measure(&self, _ctx: &mut MeasureCtx<'_>, _available: Expanse) -> Expanse {
        self.size
    }

    fn arrange(&mut self, ctx: &mut ArrangeCtx<'_>, content: Rect) {
        self.arranged = Some(content);
        for child in ctx.children() {
            ctx.arrange_child(child, content);
        }
    }

    fn render(&mut self, r: &mut Render<'_>) -> Result<()> {
        match self.fill {
            Some(color) => r.fill_all(color),
            None => Ok(()),
        }
    }

    fn on_event(&mut self, event: &Event, _ctx: &mut dyn Context) -> Result<EventOutcome> {
        self.events.push(event.clone());
        Ok(self.outcome.unwrap_or(EventOutcome::Ignore))
    }

    fn accept_focus(&self) -> bool {
        self.focusable
    }

    fn can_lose_focus(&self, _next: Option<NodeId>) -> bool {
        !self.veto_blur
    }

    fn accepts_wheel(&self) -> bool {
        self.wheel
    }
}
