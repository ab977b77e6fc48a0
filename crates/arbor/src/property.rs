//! Named, typed property access for editors and content loaders.
//!
//! Every node exposes the common table below. Widgets add their own entries
//! through [`Widget::properties`](crate::Widget::properties). Both tables are
//! static lists of plain function pointers, so enumerating them is free and
//! lookups never go through reflection.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    geom::{Edges, UNBOUNDED},
    grid::Proportion,
    props::{Align, GridPlacement, Invalidate, Props},
};

/// A property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropValue {
    /// Flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Optional integer; `None` means unset or unbounded.
    OptInt(Option<i64>),
    /// Floating point number.
    Float(f32),
    /// Optional string.
    Text(Option<String>),
    /// Alignment.
    Align(Align),
    /// Left, top, right and bottom thickness.
    Edges([u32; 4]),
    /// Grid placement.
    Grid(GridPlacement),
    /// One track proportion.
    Proportion(Proportion),
    /// A list of track proportions.
    Proportions(Vec<Proportion>),
    /// A list of fractions.
    Floats(Vec<f32>),
}

/// The type tag of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropKind {
    /// See [`PropValue::Bool`].
    Bool,
    /// See [`PropValue::Int`].
    Int,
    /// See [`PropValue::OptInt`].
    OptInt,
    /// See [`PropValue::Float`].
    Float,
    /// See [`PropValue::Text`].
    Text,
    /// See [`PropValue::Align`].
    Align,
    /// See [`PropValue::Edges`].
    Edges,
    /// See [`PropValue::Grid`].
    Grid,
    /// See [`PropValue::Proportion`].
    Proportion,
    /// See [`PropValue::Proportions`].
    Proportions,
    /// See [`PropValue::Floats`].
    Floats,
}

impl PropValue {
    /// The type tag of this value.
    pub fn kind(&self) -> PropKind {
        match self {
            Self::Bool(_) => PropKind::Bool,
            Self::Int(_) => PropKind::Int,
            Self::OptInt(_) => PropKind::OptInt,
            Self::Float(_) => PropKind::Float,
            Self::Text(_) => PropKind::Text,
            Self::Align(_) => PropKind::Align,
            Self::Edges(_) => PropKind::Edges,
            Self::Grid(_) => PropKind::Grid,
            Self::Proportion(_) => PropKind::Proportion,
            Self::Proportions(_) => PropKind::Proportions,
            Self::Floats(_) => PropKind::Floats,
        }
    }

    /// Type error for the property `name`.
    fn mismatch(name: &str, expected: &'static str) -> Error {
        Error::PropertyType {
            name: name.to_string(),
            expected,
        }
    }

    /// Extract a flag.
    pub fn into_bool(self, name: &str) -> Result<bool> {
        match self {
            Self::Bool(b) => Ok(b),
            _ => Err(Self::mismatch(name, "bool")),
        }
    }

    /// Extract an integer.
    pub fn into_int(self, name: &str) -> Result<i64> {
        match self {
            Self::Int(v) => Ok(v),
            _ => Err(Self::mismatch(name, "int")),
        }
    }

    /// Extract a non-negative pixel count.
    pub fn into_pixels(self, name: &str) -> Result<u32> {
        let v = self.into_int(name)?;
        u32::try_from(v).map_err(|_| Error::InvalidSizeHint {
            field: "pixels",
            value: v,
        })
    }

    /// Extract an optional integer. A plain integer is accepted as `Some`.
    pub fn into_opt_int(self, name: &str) -> Result<Option<i64>> {
        match self {
            Self::OptInt(v) => Ok(v),
            Self::Int(v) => Ok(Some(v)),
            _ => Err(Self::mismatch(name, "optional int")),
        }
    }

    /// Extract an optional string.
    pub fn into_text(self, name: &str) -> Result<Option<String>> {
        match self {
            Self::Text(v) => Ok(v),
            _ => Err(Self::mismatch(name, "text")),
        }
    }

    /// Extract an alignment.
    pub fn into_align(self, name: &str) -> Result<Align> {
        match self {
            Self::Align(a) => Ok(a),
            _ => Err(Self::mismatch(name, "align")),
        }
    }

    /// Extract edge thicknesses.
    pub fn into_edges(self, name: &str) -> Result<Edges> {
        match self {
            Self::Edges([l, t, r, b]) => Ok(Edges::new(l, t, r, b)),
            _ => Err(Self::mismatch(name, "edges")),
        }
    }

    /// Extract a list of proportions.
    pub fn into_proportions(self, name: &str) -> Result<Vec<Proportion>> {
        match self {
            Self::Proportions(v) => Ok(v),
            _ => Err(Self::mismatch(name, "proportions")),
        }
    }

    /// Extract a list of fractions.
    pub fn into_floats(self, name: &str) -> Result<Vec<f32>> {
        match self {
            Self::Floats(v) => Ok(v),
            _ => Err(Self::mismatch(name, "floats")),
        }
    }
}

/// A property every node has, stored in its [`Props`].
pub struct PropertyDescriptor {
    /// Property name.
    pub name: &'static str,
    /// Value type.
    pub kind: PropKind,
    /// Read the value.
    pub get: fn(&Props) -> PropValue,
    /// Write the value, validating it. The core works out the invalidation.
    pub set: fn(&mut Props, PropValue) -> Result<()>,
}

/// A property defined by one widget type.
pub struct WidgetProperty {
    /// Property name.
    pub name: &'static str,
    /// Value type.
    pub kind: PropKind,
    /// Read the value. `None` if the widget is not of the expected type.
    pub get: fn(&dyn Any) -> Option<PropValue>,
    /// Write the value and report which layout pass it invalidates.
    pub set: fn(&mut dyn Any, PropValue) -> Result<Invalidate>,
}

/// Convert a stored extent to an optional integer, mapping unbounded to `None`.
fn opt_extent(v: u32) -> PropValue {
    PropValue::OptInt((v != UNBOUNDED).then_some(i64::from(v)))
}

/// Convert edges to the property encoding.
fn edges(e: Edges) -> PropValue {
    PropValue::Edges([e.left, e.top, e.right, e.bottom])
}

/// Properties shared by every node.
pub static COMMON_PROPERTIES: &[PropertyDescriptor] = &[
    PropertyDescriptor {
        name: "identifier",
        kind: PropKind::Text,
        get: |p| PropValue::Text(p.identifier().map(str::to_string)),
        set: |p, v| {
            match v.into_text("identifier")? {
                Some(id) => p.set_identifier(id),
                None => p.clear_identifier(),
            };
            Ok(())
        },
    },
    PropertyDescriptor {
        name: "visible",
        kind: PropKind::Bool,
        get: |p| PropValue::Bool(p.visible()),
        set: |p, v| {
            p.set_visible(v.into_bool("visible")?);
            Ok(())
        },
    },
    PropertyDescriptor {
        name: "enabled",
        kind: PropKind::Bool,
        get: |p| PropValue::Bool(p.enabled()),
        set: |p, v| {
            p.set_enabled(v.into_bool("enabled")?);
            Ok(())
        },
    },
    PropertyDescriptor {
        name: "width",
        kind: PropKind::OptInt,
        get: |p| PropValue::OptInt(p.width().map(i64::from)),
        set: |p, v| p.set_width(v.into_opt_int("width")?),
    },
    PropertyDescriptor {
        name: "height",
        kind: PropKind::OptInt,
        get: |p| PropValue::OptInt(p.height().map(i64::from)),
        set: |p, v| p.set_height(v.into_opt_int("height")?),
    },
    PropertyDescriptor {
        name: "min_width",
        kind: PropKind::Int,
        get: |p| PropValue::Int(i64::from(p.min_size().w)),
        set: |p, v| {
            let h = i64::from(p.min_size().h);
            p.set_min_size(v.into_int("min_width")?, h)
        },
    },
    PropertyDescriptor {
        name: "min_height",
        kind: PropKind::Int,
        get: |p| PropValue::Int(i64::from(p.min_size().h)),
        set: |p, v| {
            let w = i64::from(p.min_size().w);
            p.set_min_size(w, v.into_int("min_height")?)
        },
    },
    PropertyDescriptor {
        name: "max_width",
        kind: PropKind::OptInt,
        get: |p| opt_extent(p.max_size().w),
        set: |p, v| {
            let h = p.max_size().h;
            p.set_max_size(
                v.into_opt_int("max_width")?,
                (h != UNBOUNDED).then_some(i64::from(h)),
            )
        },
    },
    PropertyDescriptor {
        name: "max_height",
        kind: PropKind::OptInt,
        get: |p| opt_extent(p.max_size().h),
        set: |p, v| {
            let w = p.max_size().w;
            p.set_max_size(
                (w != UNBOUNDED).then_some(i64::from(w)),
                v.into_opt_int("max_height")?,
            )
        },
    },
    PropertyDescriptor {
        name: "margin",
        kind: PropKind::Edges,
        get: |p| edges(p.margin()),
        set: |p, v| {
            p.set_margin(v.into_edges("margin")?);
            Ok(())
        },
    },
    PropertyDescriptor {
        name: "padding",
        kind: PropKind::Edges,
        get: |p| edges(p.padding()),
        set: |p, v| {
            p.set_padding(v.into_edges("padding")?);
            Ok(())
        },
    },
    PropertyDescriptor {
        name: "h_align",
        kind: PropKind::Align,
        get: |p| PropValue::Align(p.h_align()),
        set: |p, v| {
            p.set_h_align(v.into_align("h_align")?);
            Ok(())
        },
    },
    PropertyDescriptor {
        name: "v_align",
        kind: PropKind::Align,
        get: |p| PropValue::Align(p.v_align()),
        set: |p, v| {
            p.set_v_align(v.into_align("v_align")?);
            Ok(())
        },
    },
    PropertyDescriptor {
        name: "left",
        kind: PropKind::Int,
        get: |p| PropValue::Int(i64::from(p.offset().0)),
        set: |p, v| {
            let left = offset("left", v.into_int("left")?)?;
            p.set_offset(left, p.offset().1);
            Ok(())
        },
    },
    PropertyDescriptor {
        name: "top",
        kind: PropKind::Int,
        get: |p| PropValue::Int(i64::from(p.offset().1)),
        set: |p, v| {
            let top = offset("top", v.into_int("top")?)?;
            p.set_offset(p.offset().0, top);
            Ok(())
        },
    },
    PropertyDescriptor {
        name: "grid",
        kind: PropKind::Grid,
        get: |p| PropValue::Grid(p.grid()),
        set: |p, v| match v {
            PropValue::Grid(g) => p.set_grid_placement(g),
            _ => Err(PropValue::mismatch("grid", "grid placement")),
        },
    },
    PropertyDescriptor {
        name: "stack_proportion",
        kind: PropKind::Proportion,
        get: |p| PropValue::Proportion(p.stack_proportion()),
        set: |p, v| match v {
            PropValue::Proportion(sp) => p.set_stack_proportion(sp),
            _ => Err(PropValue::mismatch("stack_proportion", "proportion")),
        },
    },
    PropertyDescriptor {
        name: "clip",
        kind: PropKind::Bool,
        get: |p| PropValue::Bool(p.clip()),
        set: |p, v| {
            p.set_clip(v.into_bool("clip")?);
            Ok(())
        },
    },
];

/// Narrow an offset to the stored range.
fn offset(name: &str, v: i64) -> Result<i32> {
    i32::try_from(v).map_err(|_| PropValue::mismatch(name, "32-bit offset"))
}

/// Look up a common property.
pub fn common(name: &str) -> Option<&'static PropertyDescriptor> {
    COMMON_PROPERTIES.iter().find(|d| d.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_roundtrip() -> Result<()> {
        let mut p = Props::default();
        let d = common("width").ok_or(Error::UnknownProperty("width".into()))?;
        (d.set)(&mut p, PropValue::Int(12))?;
        assert_eq!((d.get)(&p), PropValue::OptInt(Some(12)));
        (d.set)(&mut p, PropValue::OptInt(None))?;
        assert_eq!(p.width(), None);
        Ok(())
    }

    #[test]
    fn wrong_type_is_rejected() {
        let mut p = Props::default();
        let r = common("visible").map(|d| (d.set)(&mut p, PropValue::Int(1)));
        assert!(matches!(r, Some(Err(Error::PropertyType { .. }))));
    }

    #[test]
    fn max_keeps_other_axis() -> Result<()> {
        let mut p = Props::default();
        p.set_max_size(Some(40), Some(30))?;
        let d = common("max_width").ok_or(Error::UnknownProperty("max_width".into()))?;
        (d.set)(&mut p, PropValue::OptInt(None))?;
        assert_eq!(p.max_size().w, UNBOUNDED);
        assert_eq!(p.max_size().h, 30);
        Ok(())
    }

    #[test]
    fn values_serialize_tagged() {
        let v = serde_json::to_value(PropValue::Bool(true)).ok();
        assert_eq!(v, Some(serde_json::json!({"type": "bool", "value": true})));
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = COMMON_PROPERTIES.iter().map(|d| d.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), COMMON_PROPERTIES.len());
    }
}
