//! Test doubles for driving a desktop without a host.

/// Harness for scripted desktop tests.
pub mod harness;
/// Scripted input source.
pub mod input;
/// Event-recording widget.
pub mod probe;
/// Recording render backend.
pub mod render;

pub use harness::Harness;
pub use input::ScriptedInput;
pub use probe::Probe;
pub use render::{DrawCall, RecordingBackend};
