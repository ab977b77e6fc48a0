//! Built-in containers and leaves.

mod image;
mod panel;
mod scroll;
mod spacer;
mod split;
mod stack;

pub use image::Image;
pub use panel::Panel;
pub use scroll::ScrollViewer;
pub use spacer::Spacer;
pub use split::SplitPane;
pub use stack::StackPanel;
