use std::time::Duration;

use crate::{
    config::DesktopConfig,
    desktop::Desktop,
    error::Result,
    geom::{Expanse, Point, Rect},
    input::{InputSnapshot, Key, MouseButton},
    world::Core,
};

use super::{
    input::ScriptedInput,
    render::{DrawCall, RecordingBackend},
};

/// A desktop over a [`RecordingBackend`] and a [`ScriptedInput`], driven one
/// snapshot at a time.
///
/// Each step lays the tree out at the harness size, then feeds the current
/// device state to the desktop. Time only moves through
/// [`advance`](Self::advance).
pub struct Harness {
    /// The desktop under test.
    desktop: Desktop<RecordingBackend, ScriptedInput>,
    /// Handle onto the backend's call log.
    calls: RecordingBackend,
    /// Device state fed on the next step.
    state: InputSnapshot,
    /// Layout bounds.
    bounds: Rect,
}

impl Harness {
    /// A harness of the given size with default configuration.
    pub fn new(size: Expanse) -> Self {
        Self::with_config(size, DesktopConfig::default())
    }

    /// A harness with explicit configuration.
    pub fn with_config(size: Expanse, config: DesktopConfig) -> Self {
        let calls = RecordingBackend::new();
        let desktop = Desktop::with_config(calls.clone(), ScriptedInput::new(), config);
        Self {
            desktop,
            calls,
            state: InputSnapshot::default(),
            bounds: size.rect(),
        }
    }

    /// The tree.
    pub fn core(&self) -> &Core {
        self.desktop.core()
    }

    /// The tree, mutably.
    pub fn core_mut(&mut self) -> &mut Core {
        self.desktop.core_mut()
    }

    /// The desktop, mutably.
    pub fn desktop_mut(&mut self) -> &mut Desktop<RecordingBackend, ScriptedInput> {
        &mut self.desktop
    }

    /// Layout bounds.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Change the layout bounds.
    pub fn resize(&mut self, size: Expanse) {
        self.bounds = size.rect();
    }

    /// Run a layout pass without input.
    pub fn layout(&mut self) {
        let bounds = self.bounds;
        self.desktop.core_mut().update_layout(bounds);
    }

    /// Lay out, then feed the current device state to the desktop.
    pub fn step(&mut self) -> Result<()> {
        self.layout();
        self.desktop.input_mut().push(self.state.clone());
        self.desktop.update_input();
        self.state.wheel = 0;
        self.state.text.clear();
        Ok(())
    }

    /// Move the pointer.
    pub fn move_to(&mut self, point: Point) -> Result<()> {
        self.state.pointer = point;
        self.step()
    }

    /// Press a button at the current pointer position.
    pub fn press(&mut self, button: MouseButton) -> Result<()> {
        self.state.buttons.set(button, true);
        self.step()
    }

    /// Release a button at the current pointer position.
    pub fn release(&mut self, button: MouseButton) -> Result<()> {
        self.state.buttons.set(button, false);
        self.step()
    }

    /// Move to `point` and click the left button there.
    pub fn click(&mut self, point: Point) -> Result<()> {
        self.move_to(point)?;
        self.press(MouseButton::Left)?;
        self.release(MouseButton::Left)
    }

    /// Move to `from`, press, move to `to`, release.
    pub fn drag(&mut self, from: Point, to: Point) -> Result<()> {
        self.move_to(from)?;
        self.press(MouseButton::Left)?;
        self.move_to(to)?;
        self.release(MouseButton::Left)
    }

    /// Turn the wheel at the current pointer position.
    pub fn wheel(&mut self, delta: i32) -> Result<()> {
        self.state.wheel = delta;
        self.step()
    }

    /// Hold a key down.
    pub fn key_down(&mut self, key: Key) -> Result<()> {
        self.state.keys.insert(key);
        self.step()
    }

    /// Let a key up.
    pub fn key_up(&mut self, key: Key) -> Result<()> {
        self.state.keys.remove(&key);
        self.step()
    }

    /// Press and release a key.
    pub fn key(&mut self, key: Key) -> Result<()> {
        self.key_down(key)?;
        self.key_up(key)
    }

    /// Deliver text input.
    pub fn type_text(&mut self, text: &str) -> Result<()> {
        self.state.text.push_str(text);
        self.step()
    }

    /// Move the clock forward and step.
    pub fn advance(&mut self, ms: u64) -> Result<()> {
        self.state.time += Duration::from_millis(ms);
        self.step()
    }

    /// Render a frame and return the calls it produced.
    pub fn render(&mut self) -> Result<Vec<DrawCall>> {
        self.calls.take();
        let bounds = self.bounds;
        self.desktop.render(bounds)?;
        Ok(self.calls.take())
    }
}
