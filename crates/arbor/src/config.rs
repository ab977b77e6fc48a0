use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunable input behavior for a desktop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    /// Maximum gap between two clicks for a double click, in milliseconds.
    pub double_click_ms: u64,
    /// Maximum press duration for a click, in milliseconds.
    pub click_timeout_ms: u64,
    /// Maximum pointer travel between press and release for a click, in pixels.
    pub click_distance: u32,
    /// Delay before a held key starts repeating, in milliseconds.
    pub key_repeat_delay_ms: u64,
    /// Interval between repeats of a held key, in milliseconds.
    pub key_repeat_interval_ms: u64,
    /// Move focus with Tab and Shift+Tab.
    pub tab_navigation: bool,
    /// Focus the deepest focusable node under the pointer on press.
    pub focus_on_press: bool,
    /// Pixels scrolled per wheel notch.
    pub wheel_step: u32,
    /// Thickness of split pane splitters, in pixels.
    pub splitter_size: u32,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            double_click_ms: 500,
            click_timeout_ms: 1000,
            click_distance: 8,
            key_repeat_delay_ms: 500,
            key_repeat_interval_ms: 50,
            tab_navigation: true,
            focus_on_press: true,
            wheel_step: 20,
            splitter_size: 4,
        }
    }
}

impl DesktopConfig {
    /// Parse a config from TOML. Missing keys take their defaults.
    pub fn from_toml(src: &str) -> Result<Self> {
        Ok(toml::from_str(src)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn partial_toml() -> Result<()> {
        let c = DesktopConfig::from_toml("double_click_ms = 300\ntab_navigation = false\n")?;
        assert_eq!(c.double_click_ms, 300);
        assert!(!c.tab_navigation);
        assert_eq!(c.key_repeat_interval_ms, 50);
        Ok(())
    }

    #[test]
    fn bad_toml() {
        assert!(matches!(
            DesktopConfig::from_toml("wheel_step = \"lots\""),
            Err(Error::Config(_))
        ));
    }
}
