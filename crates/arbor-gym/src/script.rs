//! Input steps given on the command line.

use std::str::FromStr;

use anyhow::{Context as _, anyhow, bail};
use arbor::{
    Result,
    geom::Point,
    input::{Key, MouseButton},
    testing::Harness,
};

/// One scripted input action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// `move:X,Y`
    Move(Point),
    /// `click:X,Y`, or `rclick:X,Y` for the right button.
    Click(MouseButton, Point),
    /// `drag:X,Y:X,Y`
    Drag(Point, Point),
    /// `wheel:N`
    Wheel(i32),
    /// `key:NAME`
    Key(Key),
    /// `hold:NAME` keeps a key down until `release:NAME`.
    Hold(Key),
    /// `release:NAME`
    Release(Key),
    /// `type:TEXT`
    Type(String),
    /// `wait:MS`
    Wait(u64),
}

impl Step {
    /// Feed this step to the harness.
    pub fn apply(&self, h: &mut Harness) -> Result<()> {
        match self {
            Self::Move(p) => h.move_to(*p),
            Self::Click(button, p) => {
                h.move_to(*p)?;
                h.press(*button)?;
                h.release(*button)
            }
            Self::Drag(from, to) => h.drag(*from, *to),
            Self::Wheel(n) => h.wheel(*n),
            Self::Key(k) => h.key(*k),
            Self::Hold(k) => h.key_down(*k),
            Self::Release(k) => h.key_up(*k),
            Self::Type(text) => h.type_text(text),
            Self::Wait(ms) => h.advance(*ms),
        }
    }
}

/// Parse `X,Y`.
fn point(s: &str) -> anyhow::Result<Point> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| anyhow!("expected X,Y, got {s:?}"))?;
    Ok(Point::new(x.trim().parse()?, y.trim().parse()?))
}

/// Parse a key name.
fn key(s: &str) -> anyhow::Result<Key> {
    let lower = s.to_ascii_lowercase();
    let k = match lower.as_str() {
        "tab" => Key::Tab,
        "enter" | "return" => Key::Enter,
        "esc" | "escape" => Key::Escape,
        "space" => Key::Space,
        "backspace" => Key::Backspace,
        "delete" => Key::Delete,
        "up" => Key::Up,
        "down" => Key::Down,
        "left" => Key::Left,
        "right" => Key::Right,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        "shift" => Key::LeftShift,
        "ctrl" => Key::LeftControl,
        f if f.starts_with('f') && f.len() > 1 => {
            let n: u8 = f[1..].parse().with_context(|| format!("bad function key {s:?}"))?;
            if !(1..=24).contains(&n) {
                bail!("function key out of range: {s:?}");
            }
            Key::F(n)
        }
        _ => {
            let mut chars = lower.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c),
                _ => bail!("unknown key {s:?}"),
            }
        }
    };
    Ok(k)
}

impl FromStr for Step {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let (verb, rest) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("expected VERB:ARGS, got {s:?}"))?;
        let step = match verb {
            "move" => Self::Move(point(rest)?),
            "click" => Self::Click(MouseButton::Left, point(rest)?),
            "rclick" => Self::Click(MouseButton::Right, point(rest)?),
            "drag" => {
                let (from, to) = rest
                    .split_once(':')
                    .ok_or_else(|| anyhow!("expected drag:X,Y:X,Y, got {s:?}"))?;
                Self::Drag(point(from)?, point(to)?)
            }
            "wheel" => Self::Wheel(rest.parse()?),
            "key" => Self::Key(key(rest)?),
            "hold" => Self::Hold(key(rest)?),
            "release" => Self::Release(key(rest)?),
            "type" => Self::Type(rest.to_string()),
            "wait" => Self::Wait(rest.parse()?),
            _ => bail!("unknown step {verb:?}"),
        };
        Ok(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_steps() -> anyhow::Result<()> {
        assert_eq!("click:3,4".parse::<Step>()?, Step::Click(MouseButton::Left, Point::new(3, 4)));
        assert_eq!(
            "drag:1,1:20, 5".parse::<Step>()?,
            Step::Drag(Point::new(1, 1), Point::new(20, 5))
        );
        assert_eq!("key:Esc".parse::<Step>()?, Step::Key(Key::Escape));
        assert_eq!("key:f12".parse::<Step>()?, Step::Key(Key::F(12)));
        assert_eq!("key:q".parse::<Step>()?, Step::Key(Key::Char('q')));
        assert_eq!("type:a:b".parse::<Step>()?, Step::Type("a:b".into()));
        assert!("key:f30".parse::<Step>().is_err());
        assert!("jump:1,2".parse::<Step>().is_err());
        assert!("click:12".parse::<Step>().is_err());
        Ok(())
    }
}
