//! Per-node layout and input properties.
//!
//! Every setter that can reject its input validates eagerly and leaves the
//! properties untouched on failure. Callers change properties through
//! [`Core::update_props`](crate::Core::update_props), which works out which
//! invalidation the change requires.

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    geom::{Edges, Expanse, UNBOUNDED},
    grid::Proportion,
};

/// How a node positions itself inside the slot its parent allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Align {
    /// Align to the start edge.
    Start,
    /// Center within the slot.
    Center,
    /// Align to the end edge.
    End,
    /// Fill the slot.
    #[default]
    Stretch,
}

/// Grid cell occupied by a child, read by the grid container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPlacement {
    /// Column index.
    pub column: usize,
    /// Row index.
    pub row: usize,
    /// Number of columns spanned.
    pub column_span: usize,
    /// Number of rows spanned.
    pub row_span: usize,
}

impl Default for GridPlacement {
    fn default() -> Self {
        Self {
            column: 0,
            row: 0,
            column_span: 1,
            row_span: 1,
        }
    }
}

impl GridPlacement {
    /// Validate and build a placement. Indices must be non-negative and spans positive.
    pub fn new(column: i64, row: i64, column_span: i64, row_span: i64) -> Result<Self> {
        Ok(Self {
            column: index(column)?,
            row: index(row)?,
            column_span: span(column_span)?,
            row_span: span(row_span)?,
        })
    }
}

/// Validate a grid index.
fn index(v: i64) -> Result<usize> {
    usize::try_from(v).map_err(|_| Error::InvalidCell(v))
}

/// Validate a grid span.
fn span(v: i64) -> Result<usize> {
    match usize::try_from(v) {
        Ok(s) if s > 0 => Ok(s),
        _ => Err(Error::InvalidSpan(v)),
    }
}

/// Validate a size hint.
fn hint(field: &'static str, v: i64) -> Result<u32> {
    u32::try_from(v).map_err(|_| Error::InvalidSizeHint { field, value: v })
}

/// The subset of properties the layout pass reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Sizing {
    /// Explicit width.
    pub width: Option<u32>,
    /// Explicit height.
    pub height: Option<u32>,
    /// Minimum size.
    pub min: Expanse,
    /// Maximum size.
    pub max: Expanse,
    /// Outer spacing.
    pub margin: Edges,
    /// Inner spacing.
    pub padding: Edges,
    /// Horizontal alignment.
    pub h_align: Align,
    /// Vertical alignment.
    pub v_align: Align,
    /// Horizontal nudge.
    pub left: i32,
    /// Vertical nudge.
    pub top: i32,
}

/// Layout and input properties of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Props {
    /// Unique lookup name.
    identifier: Option<String>,
    /// Hidden nodes are skipped by layout, rendering and hit-testing.
    visible: bool,
    /// Disabled nodes lay out normally but reject input.
    enabled: bool,
    /// Horizontal alignment.
    h_align: Align,
    /// Vertical alignment.
    v_align: Align,
    /// Explicit width; `None` sizes to content.
    width: Option<u32>,
    /// Explicit height; `None` sizes to content.
    height: Option<u32>,
    /// Minimum size.
    min: Expanse,
    /// Maximum size.
    max: Expanse,
    /// Outer spacing.
    margin: Edges,
    /// Inner spacing.
    padding: Edges,
    /// Horizontal nudge inside the allocated slot.
    left: i32,
    /// Vertical nudge inside the allocated slot.
    top: i32,
    /// Clip children to the content rect.
    clip: bool,
    /// Grid cell.
    grid: GridPlacement,
    /// Track proportion inside a stack panel.
    stack_proportion: Proportion,
}

impl Default for Props {
    fn default() -> Self {
        Self {
            identifier: None,
            visible: true,
            enabled: true,
            h_align: Align::Stretch,
            v_align: Align::Stretch,
            width: None,
            height: None,
            min: Expanse::default(),
            max: Expanse::unbounded(),
            margin: Edges::default(),
            padding: Edges::default(),
            left: 0,
            top: 0,
            clip: false,
            grid: GridPlacement::default(),
            stack_proportion: Proportion::Auto,
        }
    }
}

/// What a property change requires of the layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Invalidate {
    /// Nothing to redo.
    None,
    /// Positions must be recomputed.
    Arrange,
    /// Sizes must be recomputed.
    Measure,
}

impl Props {
    /// Lookup name.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Set the lookup name. Uniqueness is checked by the core.
    pub fn set_identifier(&mut self, id: impl Into<String>) -> &mut Self {
        self.identifier = Some(id.into());
        self
    }

    /// Remove the lookup name.
    pub fn clear_identifier(&mut self) -> &mut Self {
        self.identifier = None;
        self
    }

    /// Is the node visible?
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the node.
    pub fn set_visible(&mut self, visible: bool) -> &mut Self {
        self.visible = visible;
        self
    }

    /// Is the node itself enabled? Ancestors are not consulted.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable input for the node.
    pub fn set_enabled(&mut self, enabled: bool) -> &mut Self {
        self.enabled = enabled;
        self
    }

    /// Horizontal alignment.
    pub fn h_align(&self) -> Align {
        self.h_align
    }

    /// Vertical alignment.
    pub fn v_align(&self) -> Align {
        self.v_align
    }

    /// Set both alignments.
    pub fn set_align(&mut self, h: Align, v: Align) -> &mut Self {
        self.h_align = h;
        self.v_align = v;
        self
    }

    /// Set horizontal alignment.
    pub fn set_h_align(&mut self, h: Align) -> &mut Self {
        self.h_align = h;
        self
    }

    /// Set vertical alignment.
    pub fn set_v_align(&mut self, v: Align) -> &mut Self {
        self.v_align = v;
        self
    }

    /// Explicit width.
    pub fn width(&self) -> Option<u32> {
        self.width
    }

    /// Explicit height.
    pub fn height(&self) -> Option<u32> {
        self.height
    }

    /// Set the explicit width. Negative values are rejected.
    pub fn set_width(&mut self, w: Option<i64>) -> Result<()> {
        self.width = w.map(|v| hint("width", v)).transpose()?;
        Ok(())
    }

    /// Set the explicit height. Negative values are rejected.
    pub fn set_height(&mut self, h: Option<i64>) -> Result<()> {
        self.height = h.map(|v| hint("height", v)).transpose()?;
        Ok(())
    }

    /// Set both explicit dimensions.
    pub fn set_size(&mut self, w: i64, h: i64) -> Result<()> {
        let w = hint("width", w)?;
        let h = hint("height", h)?;
        self.width = Some(w);
        self.height = Some(h);
        Ok(())
    }

    /// Minimum size.
    pub fn min_size(&self) -> Expanse {
        self.min
    }

    /// Maximum size. `UNBOUNDED` means no limit.
    pub fn max_size(&self) -> Expanse {
        self.max
    }

    /// Set the minimum size. Fails if negative or above the current maximum.
    pub fn set_min_size(&mut self, w: i64, h: i64) -> Result<()> {
        let min = Expanse::new(hint("min_width", w)?, hint("min_height", h)?);
        check_clamp(min, self.max)?;
        self.min = min;
        Ok(())
    }

    /// Set the maximum size; `None` removes the limit on that axis. Fails if
    /// negative or below the current minimum.
    pub fn set_max_size(&mut self, w: Option<i64>, h: Option<i64>) -> Result<()> {
        let max = Expanse::new(
            w.map(|v| hint("max_width", v))
                .transpose()?
                .unwrap_or(UNBOUNDED),
            h.map(|v| hint("max_height", v))
                .transpose()?
                .unwrap_or(UNBOUNDED),
        );
        check_clamp(self.min, max)?;
        self.max = max;
        Ok(())
    }

    /// Outer spacing.
    pub fn margin(&self) -> Edges {
        self.margin
    }

    /// Set outer spacing.
    pub fn set_margin(&mut self, margin: Edges) -> &mut Self {
        self.margin = margin;
        self
    }

    /// Inner spacing.
    pub fn padding(&self) -> Edges {
        self.padding
    }

    /// Set inner spacing.
    pub fn set_padding(&mut self, padding: Edges) -> &mut Self {
        self.padding = padding;
        self
    }

    /// Position nudge as (left, top).
    pub fn offset(&self) -> (i32, i32) {
        (self.left, self.top)
    }

    /// Nudge the node inside its slot.
    pub fn set_offset(&mut self, left: i32, top: i32) -> &mut Self {
        self.left = left;
        self.top = top;
        self
    }

    /// Does the node clip its children?
    pub fn clip(&self) -> bool {
        self.clip
    }

    /// Clip children to the content rect.
    pub fn set_clip(&mut self, clip: bool) -> &mut Self {
        self.clip = clip;
        self
    }

    /// Grid cell.
    pub fn grid(&self) -> GridPlacement {
        self.grid
    }

    /// Place the node in a grid cell. Negative indices and spans below one are rejected.
    pub fn set_grid(&mut self, column: i64, row: i64) -> Result<()> {
        let span = self.grid;
        self.grid = GridPlacement::new(
            column,
            row,
            span.column_span as i64,
            span.row_span as i64,
        )?;
        Ok(())
    }

    /// Set grid spans.
    pub fn set_grid_span(&mut self, column_span: i64, row_span: i64) -> Result<()> {
        let at = self.grid;
        self.grid = GridPlacement::new(at.column as i64, at.row as i64, column_span, row_span)?;
        Ok(())
    }

    /// Set a whole grid placement.
    pub fn set_grid_placement(&mut self, placement: GridPlacement) -> Result<()> {
        if placement.column_span == 0 {
            return Err(Error::InvalidSpan(0));
        }
        if placement.row_span == 0 {
            return Err(Error::InvalidSpan(0));
        }
        self.grid = placement;
        Ok(())
    }

    /// Track proportion inside a stack panel.
    pub fn stack_proportion(&self) -> Proportion {
        self.stack_proportion
    }

    /// Set the stack panel track proportion.
    pub fn set_stack_proportion(&mut self, p: Proportion) -> Result<()> {
        self.stack_proportion = p.validate()?;
        Ok(())
    }

    /// Layout inputs.
    pub(crate) fn sizing(&self) -> Sizing {
        Sizing {
            width: self.width,
            height: self.height,
            min: self.min,
            max: self.max,
            margin: self.margin,
            padding: self.padding,
            h_align: self.h_align,
            v_align: self.v_align,
            left: self.left,
            top: self.top,
        }
    }

    /// Work out which pass a change from `old` to `self` invalidates.
    pub(crate) fn invalidation_from(&self, old: &Self) -> Invalidate {
        let measure = self.visible != old.visible
            || self.width != old.width
            || self.height != old.height
            || self.min != old.min
            || self.max != old.max
            || self.margin != old.margin
            || self.padding != old.padding
            || self.grid != old.grid
            || self.stack_proportion != old.stack_proportion;
        if measure {
            return Invalidate::Measure;
        }
        let arrange = self.h_align != old.h_align
            || self.v_align != old.v_align
            || self.left != old.left
            || self.top != old.top
            || self.clip != old.clip;
        if arrange {
            Invalidate::Arrange
        } else {
            Invalidate::None
        }
    }
}

/// Reject a minimum that exceeds the maximum on either axis.
fn check_clamp(min: Expanse, max: Expanse) -> Result<()> {
    if min.w > max.w {
        return Err(Error::MinExceedsMax {
            field: "width",
            min: min.w,
            max: max.w,
        });
    }
    if min.h > max.h {
        return Err(Error::MinExceedsMax {
            field: "height",
            min: min.h,
            max: max.h,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_hints_fail_fast() {
        let mut p = Props::default();
        assert!(matches!(
            p.set_width(Some(-1)),
            Err(Error::InvalidSizeHint { field: "width", .. })
        ));
        assert_eq!(p.width(), None);
        assert!(p.set_size(10, -3).is_err());
        assert_eq!(p.height(), None);
    }

    #[test]
    fn min_above_max_fails() -> Result<()> {
        let mut p = Props::default();
        p.set_max_size(Some(20), None)?;
        assert!(matches!(
            p.set_min_size(30, 0),
            Err(Error::MinExceedsMax { field: "width", .. })
        ));
        p.set_min_size(10, 5)?;
        assert!(p.set_max_size(None, Some(4)).is_err());
        assert_eq!(p.max_size(), Expanse::new(20, UNBOUNDED));
        Ok(())
    }

    #[test]
    fn zero_span_fails() -> Result<()> {
        let mut p = Props::default();
        assert_eq!(p.set_grid_span(0, 1).err(), Some(Error::InvalidSpan(0)));
        assert_eq!(p.set_grid(-1, 0).err(), Some(Error::InvalidCell(-1)));
        p.set_grid(2, 3)?;
        p.set_grid_span(2, 1)?;
        assert_eq!(
            p.grid(),
            GridPlacement {
                column: 2,
                row: 3,
                column_span: 2,
                row_span: 1
            }
        );
        Ok(())
    }

    #[test]
    fn invalidation_kinds() -> Result<()> {
        let old = Props::default();
        let mut p = old.clone();
        p.set_offset(3, 0);
        assert_eq!(p.invalidation_from(&old), Invalidate::Arrange);
        p.set_width(Some(5))?;
        assert_eq!(p.invalidation_from(&old), Invalidate::Measure);
        let mut q = old.clone();
        q.set_enabled(false);
        assert_eq!(q.invalidation_from(&old), Invalidate::None);
        Ok(())
    }
}
