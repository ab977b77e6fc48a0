use std::result::Result as StdResult;

use thiserror::Error;

use crate::id::NodeId;

/// Result type for arbor operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type.
///
/// Configuration errors are reported at the point of assignment. Layout and
/// input anomalies are resolved internally and never surface here.
#[derive(PartialEq, Error, Debug, Clone)]
pub enum Error {
    /// A width, height, min or max hint was negative.
    #[error("invalid size hint for {field}: {value}")]
    InvalidSizeHint {
        /// Name of the offending hint.
        field: &'static str,
        /// Rejected value.
        value: i64,
    },
    /// A minimum clamp exceeded the matching maximum.
    #[error("min {min} exceeds max {max} for {field}")]
    MinExceedsMax {
        /// Axis the clamp applies to.
        field: &'static str,
        /// Minimum value.
        min: u32,
        /// Maximum value.
        max: u32,
    },
    /// A grid span was zero or negative.
    #[error("invalid span: {0}")]
    InvalidSpan(i64),
    /// A grid cell index was negative.
    #[error("invalid cell index: {0}")]
    InvalidCell(i64),
    /// A proportion value was not usable.
    #[error("invalid proportion: {0}")]
    InvalidProportion(String),
    /// A split pane proportion vector was not normalized.
    #[error("invalid split proportions: {0}")]
    InvalidProportions(String),
    /// No node exists with this ID.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),
    /// The child already has a parent.
    #[error("node already attached: {0:?}")]
    AlreadyAttached(NodeId),
    /// Attaching would make a node its own ancestor.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle {
        /// Requested parent.
        parent: NodeId,
        /// Requested child.
        child: NodeId,
    },
    /// The root node cannot be detached or removed.
    #[error("cannot detach or remove the root node")]
    CannotDetachRoot,
    /// Another node in the tree already uses this identifier.
    #[error("duplicate identifier: {0}")]
    DuplicateIdentifier(String),
    /// The operation needs a node attached to the root.
    #[error("node not attached to the tree: {0:?}")]
    NotAttached(NodeId),
    /// A widget was re-entered while already borrowed for a call.
    #[error("widget re-entered while in use: {0:?}")]
    ReentrantWidget(NodeId),
    /// A property value had the wrong type.
    #[error("property {name} expects {expected}")]
    PropertyType {
        /// Property name.
        name: String,
        /// Expected kind.
        expected: &'static str,
    },
    /// No property with this name exists on the node.
    #[error("unknown property: {0}")]
    UnknownProperty(String),
    /// Configuration could not be parsed.
    #[error("config: {0}")]
    Config(String),
    /// Rendering failure.
    #[error("render: {0}")]
    Render(String),
    /// Invalid input error.
    #[error("invalid: {0}")]
    Invalid(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}
