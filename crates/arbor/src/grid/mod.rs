//! Grid container and the proportion-based track solver behind it.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    geom::{Expanse, Point, Rect},
    id::NodeId,
    layout::{ArrangeCtx, MeasureCtx},
    props::{GridPlacement, Invalidate, Props},
    property::{PropKind, PropValue, WidgetProperty},
    widget::Widget,
};

pub mod solver;

pub use solver::{TrackItem, apportion, solve_axis, total_extent, track_offsets};

/// The sizing rule for one grid track.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Proportion {
    /// Size to the largest content in the track.
    #[default]
    Auto,
    /// Fixed size in pixels.
    Pixels(u32),
    /// Weighted share of the space left after `Auto` and `Pixels` tracks.
    Part(f32),
    /// Equal share of whatever `Part` tracks leave over.
    Fill,
}

impl Proportion {
    /// A fixed track. Negative sizes are rejected.
    pub fn pixels(px: i64) -> Result<Self> {
        u32::try_from(px)
            .map(Self::Pixels)
            .map_err(|_| Error::InvalidProportion(format!("pixels {px}")))
    }

    /// A weighted track. The weight must be finite and positive.
    pub fn part(weight: f32) -> Result<Self> {
        Self::Part(weight).validate()
    }

    /// Check that a proportion built directly from its variant is usable.
    pub fn validate(self) -> Result<Self> {
        match self {
            Self::Part(w) if !(w.is_finite() && w > 0.0) => {
                Err(Error::InvalidProportion(format!("part weight {w}")))
            }
            p => Ok(p),
        }
    }
}

/// Upper bound on tracks created implicitly from child placements.
const MAX_IMPLICIT_TRACKS: usize = 1024;

/// Validate a sequence of proportions.
fn validate_all(props: &[Proportion]) -> Result<Vec<Proportion>> {
    props.iter().map(|p| p.validate()).collect()
}

/// A container that places children in cells of a row/column grid.
///
/// Each child picks its cell through the `grid` placement in its
/// [`Props`]. Tracks are sized per axis by [`solve_axis`].
#[derive(Debug, Clone, Default)]
pub struct Grid {
    /// Column proportions.
    columns: Vec<Proportion>,
    /// Row proportions.
    rows: Vec<Proportion>,
    /// Gap between adjacent columns.
    column_spacing: u32,
    /// Gap between adjacent rows.
    row_spacing: u32,
    /// Proportion for implicit columns when none are defined.
    default_column: Option<Proportion>,
    /// Proportion for implicit rows when none are defined.
    default_row: Option<Proportion>,
    /// Column widths from the last arrange.
    widths: Vec<u32>,
    /// Row heights from the last arrange.
    heights: Vec<u32>,
    /// Content origin from the last arrange.
    origin: Point,
}

impl Grid {
    /// An empty grid: a single implicit `Auto` cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set_columns`](Self::set_columns).
    pub fn with_columns(mut self, columns: &[Proportion]) -> Result<Self> {
        self.set_columns(columns)?;
        Ok(self)
    }

    /// Builder form of [`set_rows`](Self::set_rows).
    pub fn with_rows(mut self, rows: &[Proportion]) -> Result<Self> {
        self.set_rows(rows)?;
        Ok(self)
    }

    /// Builder form of [`set_spacing`](Self::set_spacing).
    pub fn with_spacing(mut self, column: u32, row: u32) -> Self {
        self.set_spacing(column, row);
        self
    }

    /// Column proportions.
    pub fn columns(&self) -> &[Proportion] {
        &self.columns
    }

    /// Row proportions.
    pub fn rows(&self) -> &[Proportion] {
        &self.rows
    }

    /// Replace the column proportions.
    pub fn set_columns(&mut self, columns: &[Proportion]) -> Result<()> {
        self.columns = validate_all(columns)?;
        Ok(())
    }

    /// Replace the row proportions.
    pub fn set_rows(&mut self, rows: &[Proportion]) -> Result<()> {
        self.rows = validate_all(rows)?;
        Ok(())
    }

    /// Column and row spacing.
    pub fn spacing(&self) -> (u32, u32) {
        (self.column_spacing, self.row_spacing)
    }

    /// Set the gaps between adjacent columns and rows.
    pub fn set_spacing(&mut self, column: u32, row: u32) {
        self.column_spacing = column;
        self.row_spacing = row;
    }

    /// Proportion given to implicit columns, if any.
    pub fn default_column_proportion(&self) -> Option<Proportion> {
        self.default_column
    }

    /// Proportion given to implicit rows, if any.
    pub fn default_row_proportion(&self) -> Option<Proportion> {
        self.default_row
    }

    /// When no columns are defined, create one implicit column of this
    /// proportion per index any child occupies. `None` restores the single
    /// implicit `Auto` column.
    pub fn set_default_column_proportion(&mut self, p: Option<Proportion>) -> Result<()> {
        self.default_column = p.map(Proportion::validate).transpose()?;
        Ok(())
    }

    /// Row counterpart of [`set_default_column_proportion`](Self::set_default_column_proportion).
    pub fn set_default_row_proportion(&mut self, p: Option<Proportion>) -> Result<()> {
        self.default_row = p.map(Proportion::validate).transpose()?;
        Ok(())
    }

    /// Column widths from the last arrange.
    pub fn column_widths(&self) -> &[u32] {
        &self.widths
    }

    /// Row heights from the last arrange.
    pub fn row_heights(&self) -> &[u32] {
        &self.heights
    }

    /// Start offset of every column relative to the content origin.
    pub fn grid_lines_x(&self) -> Vec<u32> {
        track_offsets(&self.widths, self.column_spacing)
    }

    /// Start offset of every row relative to the content origin.
    pub fn grid_lines_y(&self) -> Vec<u32> {
        track_offsets(&self.heights, self.row_spacing)
    }

    /// Layout rect of one cell from the last arrange.
    pub fn cell_rect(&self, column: usize, row: usize) -> Option<Rect> {
        let w = *self.widths.get(column)?;
        let h = *self.heights.get(row)?;
        let x = *self.grid_lines_x().get(column)?;
        let y = *self.grid_lines_y().get(row)?;
        Some(Rect::new(
            self.origin.x.saturating_add(to_i32(x)),
            self.origin.y.saturating_add(to_i32(y)),
            w,
            h,
        ))
    }

    /// Effective track proportions for one axis given where children sit.
    fn tracks(defined: &[Proportion], default: Option<Proportion>, extent: usize) -> Vec<Proportion> {
        match (defined.is_empty(), default) {
            (false, _) => defined.to_vec(),
            (true, Some(p)) => vec![p; extent.clamp(1, MAX_IMPLICIT_TRACKS)],
            (true, None) => vec![Proportion::Auto],
        }
    }

    /// Column and row tracks for a set of placements.
    fn resolve_tracks(&self, placements: &[GridPlacement]) -> (Vec<Proportion>, Vec<Proportion>) {
        let col_extent = placements
            .iter()
            .map(|p| p.column.saturating_add(p.column_span))
            .max()
            .unwrap_or(0);
        let row_extent = placements
            .iter()
            .map(|p| p.row.saturating_add(p.row_span))
            .max()
            .unwrap_or(0);
        (
            Self::tracks(&self.columns, self.default_column, col_extent),
            Self::tracks(&self.rows, self.default_row, row_extent),
        )
    }
}

/// Grid placement of each child.
fn placements(children: &[NodeId], props: impl Fn(NodeId) -> Option<GridPlacement>) -> Vec<GridPlacement> {
    children
        .iter()
        .map(|c| props(*c).unwrap_or_default())
        .collect()
}

/// Saturating conversion of a pixel offset.
fn to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Available extent for a child along one axis: the sum of the tracks it
/// spans when they are all fixed, otherwise whatever the grid has.
fn child_limit(tracks: &[Proportion], item: TrackItem, spacing: u32, available: u32) -> u32 {
    let item = solver::clamp_item(item, tracks.len());
    let spanned = &tracks[item.start..item.start + item.span];
    if spanned.iter().all(|p| matches!(p, Proportion::Pixels(_))) {
        let sizes: Vec<u32> = spanned
            .iter()
            .map(|p| match p {
                Proportion::Pixels(px) => *px,
                _ => 0,
            })
            .collect();
        total_extent(&sizes, spacing)
    } else {
        available
    }
}

impl Widget for Grid {
    fn measure(&self, ctx: &mut MeasureCtx<'_>, available: Expanse) -> Expanse {
        let children = ctx.children();
        let places = placements(&children, |c| ctx.props(c).map(Props::grid));
        let (cols, rows) = self.resolve_tracks(&places);

        let mut xs = Vec::with_capacity(children.len());
        let mut ys = Vec::with_capacity(children.len());
        for (child, place) in children.iter().zip(&places) {
            let x = TrackItem::new(place.column, place.column_span, 0);
            let y = TrackItem::new(place.row, place.row_span, 0);
            let limit = Expanse::new(
                child_limit(&cols, x, self.column_spacing, available.w),
                child_limit(&rows, y, self.row_spacing, available.h),
            );
            let size = ctx.measure_child(*child, limit);
            xs.push(TrackItem { size: size.w, ..x });
            ys.push(TrackItem { size: size.h, ..y });
        }

        let widths = solve_axis(&cols, self.column_spacing, None, &xs);
        let heights = solve_axis(&rows, self.row_spacing, None, &ys);
        Expanse::new(
            total_extent(&widths, self.column_spacing),
            total_extent(&heights, self.row_spacing),
        )
    }

    fn arrange(&mut self, ctx: &mut ArrangeCtx<'_>, content: Rect) {
        let children = ctx.children();
        let places = placements(&children, |c| ctx.props(c).map(Props::grid));
        let (cols, rows) = self.resolve_tracks(&places);

        let mut xs = Vec::with_capacity(children.len());
        let mut ys = Vec::with_capacity(children.len());
        for (child, place) in children.iter().zip(&places) {
            let size = ctx.desired_size(*child);
            xs.push(solver::clamp_item(
                TrackItem::new(place.column, place.column_span, size.w),
                cols.len(),
            ));
            ys.push(solver::clamp_item(
                TrackItem::new(place.row, place.row_span, size.h),
                rows.len(),
            ));
        }

        self.widths = solve_axis(&cols, self.column_spacing, Some(content.w), &xs);
        self.heights = solve_axis(&rows, self.row_spacing, Some(content.h), &ys);
        self.origin = content.tl;
        let lines_x = self.grid_lines_x();
        let lines_y = self.grid_lines_y();

        for ((child, x), y) in children.iter().zip(&xs).zip(&ys) {
            let span_w = total_extent(&self.widths[x.start..x.start + x.span], self.column_spacing);
            let span_h = total_extent(&self.heights[y.start..y.start + y.span], self.row_spacing);
            let cell = Rect::new(
                content.tl.x.saturating_add(to_i32(lines_x[x.start])),
                content.tl.y.saturating_add(to_i32(lines_y[y.start])),
                span_w,
                span_h,
            )
            .clip_to(&content);
            ctx.arrange_child(*child, cell);
        }
    }

    fn properties(&self) -> &'static [WidgetProperty] {
        GRID_PROPERTIES
    }
}

/// Downcast helper for grid property accessors.
fn grid(w: &dyn Any) -> Option<&Grid> {
    w.downcast_ref::<Grid>()
}

/// Mutable downcast helper for grid property accessors.
fn grid_mut(w: &mut dyn Any) -> Result<&mut Grid> {
    w.downcast_mut::<Grid>()
        .ok_or_else(|| Error::Invalid("not a grid".into()))
}

/// Editable grid properties.
static GRID_PROPERTIES: &[WidgetProperty] = &[
    WidgetProperty {
        name: "columns",
        kind: PropKind::Proportions,
        get: |w| grid(w).map(|g| PropValue::Proportions(g.columns.clone())),
        set: |w, v| {
            grid_mut(w)?.set_columns(&v.into_proportions("columns")?)?;
            Ok(Invalidate::Measure)
        },
    },
    WidgetProperty {
        name: "rows",
        kind: PropKind::Proportions,
        get: |w| grid(w).map(|g| PropValue::Proportions(g.rows.clone())),
        set: |w, v| {
            grid_mut(w)?.set_rows(&v.into_proportions("rows")?)?;
            Ok(Invalidate::Measure)
        },
    },
    WidgetProperty {
        name: "column_spacing",
        kind: PropKind::Int,
        get: |w| grid(w).map(|g| PropValue::Int(i64::from(g.column_spacing))),
        set: |w, v| {
            let px = v.into_pixels("column_spacing")?;
            let g = grid_mut(w)?;
            g.column_spacing = px;
            Ok(Invalidate::Measure)
        },
    },
    WidgetProperty {
        name: "row_spacing",
        kind: PropKind::Int,
        get: |w| grid(w).map(|g| PropValue::Int(i64::from(g.row_spacing))),
        set: |w, v| {
            let px = v.into_pixels("row_spacing")?;
            let g = grid_mut(w)?;
            g.row_spacing = px;
            Ok(Invalidate::Measure)
        },
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Core, geom::Rect, testing::Probe};

    fn grid_with(core: &mut Core, grid: Grid) -> NodeId {
        let g = core.add(grid).id();
        core.attach(core.root_id(), g).ok();
        g
    }

    #[test]
    fn proportion_validation() {
        assert!(Proportion::part(0.0).is_err());
        assert!(Proportion::part(f32::NAN).is_err());
        assert!(Proportion::pixels(-1).is_err());
        assert_eq!(Proportion::part(2.0), Ok(Proportion::Part(2.0)));
        assert!(Grid::new().with_columns(&[Proportion::Part(-1.0)]).is_err());
    }

    #[test]
    fn fixed_auto_fill_columns() -> Result<()> {
        let mut core = Core::new();
        let g = grid_with(
            &mut core,
            Grid::new().with_columns(&[
                Proportion::Pixels(50),
                Proportion::Auto,
                Proportion::Fill,
                Proportion::Fill,
            ])?,
        );
        let c = core.add(Probe::sized(30, 10)).id();
        core.attach(g, c)?;
        core.try_update_props(c, |p| p.set_grid(1, 0))?;
        core.update_layout(Rect::new(0, 0, 250, 40));

        let widths = core.with_widget(g, |g: &mut Grid, _| g.column_widths().to_vec())?;
        assert_eq!(widths, vec![50, 30, 85, 85]);
        assert_eq!(core.node(c).map(|n| n.rect()), Some(Rect::new(50, 0, 30, 40)));
        Ok(())
    }

    #[test]
    fn changing_columns_relayouts() -> Result<()> {
        let mut core = Core::new();
        let g = grid_with(
            &mut core,
            Grid::new().with_columns(&[Proportion::Fill, Proportion::Fill])?,
        );
        core.update_layout(Rect::new(0, 0, 100, 20));
        let widths = core.with_widget(g, |g: &mut Grid, _| g.column_widths().to_vec())?;
        assert_eq!(widths, vec![50, 50]);

        core.with_widget(g, |g: &mut Grid, _| {
            g.set_columns(&[Proportion::Pixels(10), Proportion::Fill, Proportion::Fill])
        })??;
        core.update_layout(Rect::new(0, 0, 100, 20));
        let widths = core.with_widget(g, |g: &mut Grid, _| g.column_widths().to_vec())?;
        assert_eq!(widths, vec![10, 45, 45]);
        Ok(())
    }

    #[test]
    fn spacing_and_cells() -> Result<()> {
        let mut core = Core::new();
        let g = grid_with(
            &mut core,
            Grid::new()
                .with_columns(&[Proportion::Fill, Proportion::Fill])?
                .with_rows(&[Proportion::Pixels(10), Proportion::Fill])?
                .with_spacing(4, 2),
        );
        let c = core.add(Probe::sized(1, 1)).id();
        core.attach(g, c)?;
        core.try_update_props(c, |p| {
            p.set_grid(0, 1)?;
            p.set_grid_span(2, 1)
        })?;
        core.update_layout(Rect::new(0, 0, 104, 52));

        core.with_widget(g, |g: &mut Grid, _| {
            assert_eq!(g.column_widths(), &[50, 50]);
            assert_eq!(g.row_heights(), &[10, 40]);
            assert_eq!(g.grid_lines_x(), vec![0, 54]);
            assert_eq!(g.cell_rect(1, 1), Some(Rect::new(54, 12, 50, 40)));
            assert_eq!(g.cell_rect(2, 0), None);
        })?;
        assert_eq!(core.node(c).map(|n| n.rect()), Some(Rect::new(0, 12, 104, 40)));
        Ok(())
    }

    #[test]
    fn natural_size_includes_spacing() -> Result<()> {
        let mut core = Core::new();
        let g = grid_with(
            &mut core,
            Grid::new()
                .with_columns(&[Proportion::Auto, Proportion::Pixels(7)])?
                .with_spacing(3, 0),
        );
        core.update_props(g, |p| {
            p.set_align(crate::Align::Start, crate::Align::Start);
        })?;
        let c = core.add(Probe::sized(20, 5)).id();
        core.attach(g, c)?;
        core.update_layout(Rect::new(0, 0, 200, 200));
        assert_eq!(core.desired_size(g), Expanse::new(30, 5));
        Ok(())
    }

    #[test]
    fn implicit_tracks_from_default() -> Result<()> {
        let mut core = Core::new();
        let mut grid = Grid::new();
        grid.set_default_column_proportion(Some(Proportion::Fill))?;
        let g = grid_with(&mut core, grid);
        for col in 0..3 {
            let c = core.add(Probe::sized(1, 1)).id();
            core.attach(g, c)?;
            core.try_update_props(c, |p| p.set_grid(col, 0))?;
        }
        core.update_layout(Rect::new(0, 0, 90, 10));
        let widths = core.with_widget(g, |g: &mut Grid, _| g.column_widths().to_vec())?;
        assert_eq!(widths, vec![30, 30, 30]);
        Ok(())
    }

    #[test]
    fn out_of_range_child_is_clamped() -> Result<()> {
        let mut core = Core::new();
        let g = grid_with(
            &mut core,
            Grid::new().with_columns(&[Proportion::Pixels(10), Proportion::Pixels(20)])?,
        );
        let c = core.add(Probe::sized(5, 5)).id();
        core.attach(g, c)?;
        core.try_update_props(c, |p| {
            p.set_grid(7, 0)?;
            p.set_grid_span(3, 1)
        })?;
        core.update_layout(Rect::new(0, 0, 100, 10));
        assert_eq!(core.node(c).map(|n| n.rect()), Some(Rect::new(10, 0, 20, 10)));
        Ok(())
    }

    #[test]
    fn property_table() -> Result<()> {
        let mut core = Core::new();
        let g = grid_with(&mut core, Grid::new());
        core.set_property(g, "column_spacing", PropValue::Int(6))?;
        assert_eq!(core.get_property(g, "column_spacing")?, PropValue::Int(6));
        assert!(core.set_property(g, "column_spacing", PropValue::Int(-6)).is_err());
        core.set_property(
            g,
            "rows",
            PropValue::Proportions(vec![Proportion::Auto, Proportion::Fill]),
        )?;
        let rows = core.with_widget(g, |g: &mut Grid, _| g.rows().to_vec())?;
        assert_eq!(rows, vec![Proportion::Auto, Proportion::Fill]);
        Ok(())
    }
}
