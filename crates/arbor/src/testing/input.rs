use std::collections::VecDeque;

use crate::input::{InputSnapshot, InputSource};

/// An input source fed from a queue of snapshots.
///
/// When the queue runs dry the last snapshot is repeated, minus its wheel
/// and text, so held buttons and keys stay held.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    /// Snapshots not yet sampled.
    queue: VecDeque<InputSnapshot>,
    /// Most recently sampled snapshot.
    last: InputSnapshot,
}

impl ScriptedInput {
    /// An empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a snapshot.
    pub fn push(&mut self, snapshot: InputSnapshot) {
        self.queue.push_back(snapshot);
    }

    /// Number of queued snapshots.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl InputSource for ScriptedInput {
    fn sample(&mut self) -> InputSnapshot {
        match self.queue.pop_front() {
            Some(next) => {
                self.last = next.clone();
                next
            }
            None => InputSnapshot {
                wheel: 0,
                text: String::new(),
                ..self.last.clone()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;

    #[test]
    fn repeats_last_without_transients() {
        let mut input = ScriptedInput::new();
        input.push(InputSnapshot {
            pointer: Point::new(3, 4),
            wheel: 2,
            text: "a".into(),
            ..Default::default()
        });
        assert_eq!(input.sample().wheel, 2);
        let again = input.sample();
        assert_eq!(again.pointer, Point::new(3, 4));
        assert_eq!(again.wheel, 0);
        assert!(again.text.is_empty());
    }
}
