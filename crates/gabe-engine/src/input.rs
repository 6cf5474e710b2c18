//! Abstract player input.
//!
//! The simulation never talks to a keyboard. It asks an [`InputSource`]
//! whether an [`Action`] is held this frame. [`InputFrame`] is the plain-data
//! implementation used by the headless driver, tests and replays.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Logical actions the game reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Action {
    Left,
    Right,
    Run,
    Jump,
    Up,
    Down,
    /// Reload the level after a game over.
    Restart,
    /// Continue to the next level after completing one.
    Advance,
    Quit,
}

/// Per-frame query for held actions.
pub trait InputSource {
    fn is_pressed(&self, action: Action) -> bool;
}

/// The set of actions held during one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    pressed: BTreeSet<Action>,
}

impl InputFrame {
    /// A frame with nothing held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: hold `action` as well.
    pub fn with(mut self, action: Action) -> Self {
        self.pressed.insert(action);
        self
    }

    pub fn press(&mut self, action: Action) {
        self.pressed.insert(action);
    }

    pub fn release(&mut self, action: Action) {
        self.pressed.remove(&action);
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }

    /// Held actions in a stable order.
    pub fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.pressed.iter().copied()
    }
}

impl FromIterator<Action> for InputFrame {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Self {
            pressed: iter.into_iter().collect(),
        }
    }
}

impl InputSource for InputFrame {
    fn is_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }
}

impl<T: InputSource + ?Sized> InputSource for &T {
    fn is_pressed(&self, action: Action) -> bool {
        (**self).is_pressed(action)
    }
}
