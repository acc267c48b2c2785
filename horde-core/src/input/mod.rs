//! Input state consumed by the simulation.
//!
//! Hosts feed key-down/key-up transitions (or a raw analog vector); the
//! simulation reads a normalized movement axis and edge-triggered presses.
//! `end_frame` clears the edges so a press is seen by exactly one frame.

use std::collections::BTreeSet;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::math::VecExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Choose1,
    Choose2,
    Choose3,
    /// Confirm, also restarts after game over.
    Confirm,
}

impl Action {
    /// Choice index bound to a numeric hotkey.
    pub fn choice_index(self) -> Option<usize> {
        match self {
            Action::Choose1 => Some(0),
            Action::Choose2 => Some(1),
            Action::Choose3 => Some(2),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    held: BTreeSet<Action>,
    just_pressed: BTreeSet<Action>,
    /// Gamepad-style direction that overrides the direction keys while set.
    analog: Option<Vec2>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, action: Action) {
        if self.held.insert(action) {
            self.just_pressed.insert(action);
        }
    }

    pub fn release(&mut self, action: Action) {
        self.held.remove(&action);
    }

    /// Replaces the held set wholesale, marking newly held actions as just pressed.
    pub fn sync_held(&mut self, now_held: impl IntoIterator<Item = Action>) {
        let now: BTreeSet<Action> = now_held.into_iter().collect();
        for action in now.difference(&self.held) {
            self.just_pressed.insert(*action);
        }
        self.held = now;
    }

    pub fn set_analog(&mut self, axis: Option<Vec2>) {
        self.analog = axis;
    }

    pub fn is_down(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    pub fn was_pressed(&self, action: Action) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Zero when idle, unit length otherwise. Screen coordinates: +y is down.
    pub fn move_axis(&self) -> Vec2 {
        if let Some(v) = self.analog {
            return v.safe_norm();
        }
        let axis = |neg: Action, pos: Action| {
            (self.is_down(pos) as i32 - self.is_down(neg) as i32) as f32
        };
        Vec2::new(axis(Action::Left, Action::Right), axis(Action::Up, Action::Down)).safe_norm()
    }

    /// First numeric choice pressed this frame.
    pub fn chosen_index(&self) -> Option<usize> {
        self.just_pressed.iter().find_map(|a| a.choice_index())
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
    }
}
