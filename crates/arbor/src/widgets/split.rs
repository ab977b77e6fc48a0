use std::{any::Any, fmt};

use tracing::debug;

use crate::{
    context::Context,
    error::{Error, Result},
    event::Event,
    geom::{Axis, Expanse, Point, Rect, sub_len},
    grid::apportion,
    input::MouseButton,
    layout::{ArrangeCtx, MeasureCtx},
    props::Invalidate,
    property::{PropKind, PropValue, WidgetProperty},
    widget::{EventOutcome, Widget},
};

/// Tolerance when checking that proportions sum to one.
const SUM_TOLERANCE: f32 = 1e-3;

/// Fixed-point scale for turning fractions into apportion weights.
const FRACTION_SCALE: f32 = 1_000_000.0;

/// Callback fired when the pane proportions change.
pub type ProportionsListener = Box<dyn FnMut(&[f32]) + Send>;

/// An in-progress splitter drag.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    /// Splitter being dragged: between pane `index` and `index + 1`.
    index: usize,
    /// Pointer position along the split axis when the drag began.
    origin: i32,
    /// Pixel sizes of the two adjacent panes when the drag began.
    start: (u32, u32),
}

/// Two or more panes separated by draggable splitters.
///
/// The share of each pane is stored state, not derived from measurement.
/// Dragging a splitter only re-arranges.
pub struct SplitPane {
    /// Split direction: panes are laid out along this axis.
    axis: Axis,
    /// Pane fractions, summing to one.
    proportions: Vec<f32>,
    /// Splitter thickness; `None` uses the desktop default.
    splitter_size: Option<u32>,
    /// Splitter rects from the last arrange, in layout coordinates.
    splitters: Vec<Rect>,
    /// Pane extents along the axis from the last arrange.
    pane_sizes: Vec<u32>,
    /// Active drag.
    drag: Option<Drag>,
    /// Change listeners in registration order.
    listeners: Vec<ProportionsListener>,
}

impl fmt::Debug for SplitPane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitPane")
            .field("axis", &self.axis)
            .field("proportions", &self.proportions)
            .field("splitters", &self.splitters)
            .finish_non_exhaustive()
    }
}

impl SplitPane {
    /// A split along `axis` with no proportions yet; panes split evenly.
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            proportions: Vec::new(),
            splitter_size: None,
            splitters: Vec::new(),
            pane_sizes: Vec::new(),
            drag: None,
            listeners: Vec::new(),
        }
    }

    /// Panes side by side.
    pub fn horizontal() -> Self {
        Self::new(Axis::Horizontal)
    }

    /// Panes stacked top to bottom.
    pub fn vertical() -> Self {
        Self::new(Axis::Vertical)
    }

    /// Builder form of [`set_proportions`](Self::set_proportions).
    pub fn with_proportions(mut self, proportions: &[f32]) -> Result<Self> {
        self.set_proportions(proportions)?;
        Ok(self)
    }

    /// Use a fixed splitter thickness instead of the desktop default.
    pub fn with_splitter_size(mut self, size: u32) -> Self {
        self.splitter_size = Some(size);
        self
    }

    /// Split direction.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Current pane fractions.
    pub fn proportions(&self) -> &[f32] {
        &self.proportions
    }

    /// Replace the pane fractions. Each must lie in `[0, 1]` and together
    /// they must sum to one. A vector whose length does not match the pane
    /// count is replaced by an even split at the next arrange.
    pub fn set_proportions(&mut self, proportions: &[f32]) -> Result<()> {
        validate(proportions)?;
        self.proportions = proportions.to_vec();
        self.notify();
        Ok(())
    }

    /// Move splitter `index` (between pane `index` and `index + 1`) to
    /// `fraction` of the total pane extent, measured from the start edge.
    /// Only the two adjacent panes change.
    pub fn set_splitter_position(&mut self, index: usize, fraction: f32) -> Result<()> {
        if !(fraction.is_finite() && (0.0..=1.0).contains(&fraction)) {
            return Err(Error::InvalidProportions(format!(
                "splitter position {fraction}"
            )));
        }
        if index + 1 >= self.proportions.len() {
            return Err(Error::InvalidProportions(format!(
                "no splitter at index {index}"
            )));
        }
        let before: f32 = self.proportions[..index].iter().sum();
        let pair = self.proportions[index] + self.proportions[index + 1];
        let first = (fraction - before).clamp(0.0, pair);
        self.proportions[index] = first;
        self.proportions[index + 1] = pair - first;
        self.notify();
        Ok(())
    }

    /// Splitter rects from the last arrange, in layout coordinates.
    pub fn splitter_rects(&self) -> &[Rect] {
        &self.splitters
    }

    /// Register a callback fired whenever the proportions change.
    pub fn on_proportions_changed(&mut self, f: impl FnMut(&[f32]) + Send + 'static) {
        self.listeners.push(Box::new(f));
    }

    /// Is a splitter being dragged?
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Fire change listeners.
    fn notify(&mut self) {
        let Self {
            listeners,
            proportions,
            ..
        } = self;
        for l in listeners.iter_mut() {
            l(proportions);
        }
    }

    /// Make the proportions match `panes`, falling back to an even split.
    /// A drag whose splitter no longer exists is abandoned.
    fn normalize(&mut self, panes: usize) {
        if self.proportions.len() != panes {
            debug!(
                have = self.proportions.len(),
                panes, "split proportions reset to even"
            );
            self.proportions = even(panes);
            self.drag = None;
        }
        if self.drag.is_some_and(|d| d.index + 1 >= panes) {
            self.drag = None;
        }
    }

    /// Splitter thickness for a given desktop default.
    fn thickness(&self, default: u32) -> u32 {
        self.splitter_size.unwrap_or(default)
    }

    /// Rebuild a rect from main-axis and cross-axis spans.
    fn rect(&self, main: (i32, u32), cross: (i32, u32)) -> Rect {
        match self.axis {
            Axis::Horizontal => Rect::new(main.0, cross.0, main.1, cross.1),
            Axis::Vertical => Rect::new(cross.0, main.0, cross.1, main.1),
        }
    }

    /// Begin, continue or end a splitter drag.
    fn handle_pointer(&mut self, event: &Event, ctx: &mut dyn Context) -> Option<EventOutcome> {
        match *event {
            Event::MouseDown {
                button: MouseButton::Left,
                position,
            } => {
                let local = ctx.core().to_layout(ctx.node_id(), position);
                let index = self.splitters.iter().position(|s| s.contains_point(local))?;
                let start = (*self.pane_sizes.get(index)?, *self.pane_sizes.get(index + 1)?);
                self.drag = Some(Drag {
                    index,
                    origin: main_coord(self.axis, position),
                    start,
                });
                ctx.capture_mouse();
                Some(EventOutcome::Handle)
            }
            Event::MouseMove { position } => {
                let drag = self.drag?;
                let (a, b) = drag.start;
                let pair_px = a.saturating_add(b);
                if pair_px == 0 {
                    return Some(EventOutcome::Consume);
                }
                let delta = i64::from(main_coord(self.axis, position)) - i64::from(drag.origin);
                let first_px = (i64::from(a) + delta).clamp(0, i64::from(pair_px));
                let (Some(&p0), Some(&p1)) = (
                    self.proportions.get(drag.index),
                    self.proportions.get(drag.index + 1),
                ) else {
                    return None;
                };
                let pair = p0 + p1;
                let first = pair * first_px as f32 / pair_px as f32;
                if first == p0 {
                    return Some(EventOutcome::Consume);
                }
                self.proportions[drag.index] = first;
                self.proportions[drag.index + 1] = pair - first;
                self.notify();
                ctx.invalidate_arrange();
                Some(EventOutcome::Handle)
            }
            Event::MouseUp {
                button: MouseButton::Left,
                ..
            } => {
                self.drag.take()?;
                ctx.release_mouse();
                Some(EventOutcome::Handle)
            }
            _ => None,
        }
    }
}

/// Main-axis component of a point.
fn main_coord(axis: Axis, p: Point) -> i32 {
    match axis {
        Axis::Horizontal => p.x,
        Axis::Vertical => p.y,
    }
}

/// An even split over `panes`.
fn even(panes: usize) -> Vec<f32> {
    vec![1.0 / panes.max(1) as f32; panes]
}

/// Check that fractions are each in `[0, 1]` and sum to one.
fn validate(proportions: &[f32]) -> Result<()> {
    if let Some(bad) = proportions
        .iter()
        .find(|p| !(p.is_finite() && (0.0..=1.0).contains(*p)))
    {
        return Err(Error::InvalidProportions(format!("fraction {bad} out of range")));
    }
    let sum: f32 = proportions.iter().sum();
    if !proportions.is_empty() && (sum - 1.0).abs() > SUM_TOLERANCE {
        return Err(Error::InvalidProportions(format!("fractions sum to {sum}")));
    }
    Ok(())
}

impl Widget for SplitPane {
    fn measure(&self, ctx: &mut MeasureCtx<'_>, available: Expanse) -> Expanse {
        let children = ctx.children();
        let gaps = u32::try_from(children.len().saturating_sub(1)).unwrap_or(u32::MAX);
        let mut main = self.thickness(ctx.config().splitter_size).saturating_mul(gaps);
        let mut cross = 0u32;
        for child in children {
            let size = ctx.measure_child(child, available);
            main = main.saturating_add(size.along(self.axis));
            cross = cross.max(size.along(self.axis.cross()));
        }
        Expanse::from_axis(self.axis, main, cross)
    }

    fn arrange(&mut self, ctx: &mut ArrangeCtx<'_>, content: Rect) {
        let children = ctx.children();
        self.normalize(children.len());
        self.splitters.clear();
        if children.is_empty() {
            self.pane_sizes.clear();
            return;
        }
        let thickness = self.thickness(ctx.config().splitter_size);
        let gaps = u32::try_from(children.len() - 1).unwrap_or(u32::MAX);
        let extent = content.extent(self.axis);
        let thickness = thickness.min(extent / gaps.max(1));
        let total = sub_len(extent, thickness.saturating_mul(gaps));
        let weights: Vec<u64> = self
            .proportions
            .iter()
            .map(|p| (p * FRACTION_SCALE).round() as u64)
            .collect();
        self.pane_sizes = apportion(total, &weights);

        let cross = (
            content.start(self.axis.cross()),
            content.extent(self.axis.cross()),
        );
        let mut pos = content.start(self.axis);
        let last = children.len() - 1;
        for (i, (child, size)) in children.iter().zip(self.pane_sizes.clone()).enumerate() {
            ctx.arrange_child(*child, self.rect((pos, size), cross));
            pos = pos.saturating_add(i32::try_from(size).unwrap_or(i32::MAX));
            if i < last {
                self.splitters.push(self.rect((pos, thickness), cross));
                pos = pos.saturating_add(i32::try_from(thickness).unwrap_or(i32::MAX));
            }
        }
    }

    fn on_event(&mut self, event: &Event, ctx: &mut dyn Context) -> Result<EventOutcome> {
        Ok(self
            .handle_pointer(event, ctx)
            .unwrap_or(EventOutcome::Ignore))
    }

    fn properties(&self) -> &'static [WidgetProperty] {
        SPLIT_PROPERTIES
    }
}

/// Mutable downcast for property setters.
fn split_mut(w: &mut dyn Any) -> Result<&mut SplitPane> {
    w.downcast_mut::<SplitPane>()
        .ok_or_else(|| Error::Invalid("not a split pane".into()))
}

/// Editable split pane properties.
static SPLIT_PROPERTIES: &[WidgetProperty] = &[WidgetProperty {
    name: "proportions",
    kind: PropKind::Floats,
    get: |w| {
        w.downcast_ref::<SplitPane>()
            .map(|s| PropValue::Floats(s.proportions.clone()))
    },
    set: |w, v| {
        split_mut(w)?.set_proportions(&v.into_floats("proportions")?)?;
        Ok(Invalidate::Arrange)
    },
}];

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{Core, id::NodeId, testing::Probe};

    fn split(core: &mut Core, pane: SplitPane, panes: usize) -> Result<(NodeId, Vec<NodeId>)> {
        let s = core.add(pane).id();
        core.attach(core.root_id(), s)?;
        let mut kids = Vec::new();
        for _ in 0..panes {
            let c = core.add(Probe::sized(1, 1)).id();
            core.attach(s, c)?;
            kids.push(c);
        }
        Ok((s, kids))
    }

    #[test]
    fn proportions_are_validated() {
        let mut s = SplitPane::horizontal();
        assert!(s.set_proportions(&[0.5, 0.6]).is_err());
        assert!(s.set_proportions(&[1.5, -0.5]).is_err());
        assert!(s.set_proportions(&[0.25, 0.75]).is_ok());
        assert!(s.set_splitter_position(1, 0.5).is_err());
        assert!(s.set_splitter_position(0, 2.0).is_err());
    }

    #[test]
    fn panes_and_splitters() -> Result<()> {
        let mut core = Core::new();
        let (s, kids) = split(
            &mut core,
            SplitPane::horizontal()
                .with_proportions(&[0.25, 0.75])?
                .with_splitter_size(4),
            2,
        )?;
        core.update_layout(Rect::new(0, 0, 104, 20));
        assert_eq!(core.node(kids[0]).map(|n| n.rect()), Some(Rect::new(0, 0, 25, 20)));
        assert_eq!(core.node(kids[1]).map(|n| n.rect()), Some(Rect::new(29, 0, 75, 20)));
        let rects = core.with_widget(s, |s: &mut SplitPane, _| s.splitter_rects().to_vec())?;
        assert_eq!(rects, vec![Rect::new(25, 0, 4, 20)]);
        Ok(())
    }

    #[test]
    fn mismatched_length_resets_even() -> Result<()> {
        let mut core = Core::new();
        let (s, _) = split(
            &mut core,
            SplitPane::vertical().with_proportions(&[0.5, 0.5])?,
            4,
        )?;
        core.update_layout(Rect::new(0, 0, 10, 100));
        let props = core.with_widget(s, |s: &mut SplitPane, _| s.proportions().to_vec())?;
        assert_eq!(props, vec![0.25; 4]);
        Ok(())
    }

    #[test]
    fn splitter_position_moves_neighbours() -> Result<()> {
        let mut s = SplitPane::horizontal().with_proportions(&[0.2, 0.3, 0.5])?;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        s.on_proportions_changed(move |p| {
            if let Ok(mut v) = sink.lock() {
                v.push(p.to_vec());
            }
        });
        s.set_splitter_position(1, 0.9)?;
        let p = s.proportions();
        assert!((p[0] - 0.2).abs() < 1e-6);
        assert!((p[1] - 0.7).abs() < 1e-6);
        assert!(p[2].abs() < 1e-6);
        assert_eq!(seen.lock().map(|v| v.len()).unwrap_or(0), 1);
        Ok(())
    }
}
