//! Arbor: a retained-mode widget layout and input runtime.
//!
//! Arbor keeps a tree of widgets in an arena, lays it out with a two-pass
//! measure/arrange protocol, and turns sampled device state into focused,
//! captured and modal-aware events. Pixels are left to the host: drawing goes
//! through an injected [`RenderBackend`](render::RenderBackend) and input comes
//! from an injected [`InputSource`](input::InputSource).
//!
//! # Quick Start
//!
//! The main entry points are:
//! - [`Desktop`] - Owns the tree and runs input dispatch each frame
//! - [`Core`] - The arena, layout state, focus and modal stack
//! - [`Widget`] - The trait implemented by all widgets
//!
//! # Module Organization
//!
//! - [`geom`] - Geometry primitives (Rect, Point, Expanse, etc.)
//! - [`grid`] - The proportion solver and the grid container
//! - [`widgets`] - Built-in containers and leaves

#![warn(missing_docs)]

pub use arbor_geom as geom;

pub mod config;
pub mod context;
pub mod desktop;
pub mod dump;
pub mod error;
pub mod event;
pub mod focus;
pub mod grid;
pub mod id;
pub mod input;
pub mod layout;
pub mod modal;
pub mod node;
pub mod property;
pub mod props;
pub mod render;
pub mod state;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod widget;
pub mod widgets;
mod world;

pub use config::DesktopConfig;
pub use context::{Context, CoreContext};
pub use desktop::Desktop;
pub use error::{Error, Result};
pub use event::{Event, EventKind};
pub use focus::FocusManager;
pub use id::{NodeId, TypedId};
pub use modal::ModalStack;
pub use props::{Align, GridPlacement, Invalidate, Props};
pub use widget::{EventOutcome, Widget};
pub use world::Core;

/// Commonly used items.
pub mod prelude {
    pub use crate::{
        Align, Context, Core, Desktop, DesktopConfig, Error, Event, EventKind, EventOutcome,
        FocusManager, ModalStack, NodeId, Result, TypedId, Widget,
        geom::{Axis, Edges, Expanse, Point, Rect},
        grid::{Grid, Proportion},
        input::{InputSnapshot, InputSource, Key, Modifiers, MouseButton},
        render::{Color, RenderBackend, TextureId},
        widgets::{Image, Panel, ScrollViewer, Spacer, SplitPane, StackPanel},
    };
}
