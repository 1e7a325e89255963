//! Per-tick input and edge detection
//!
//! The platform layer polls devices and fills a `TickInput`; the simulation
//! only ever sees these normalized values.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Input commands for a single tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickInput {
    /// Movement stick (magnitude ≤ 1)
    pub move_dir: Vec2,
    /// Aim stick; near-zero keeps the previous aim
    pub aim: Vec2,
    /// Fire signal level (held)
    pub fire: bool,
    /// Sprint modifier
    pub sprint: bool,
    /// Fire-mode cycle button level
    pub cycle_mode: bool,
    /// Menu confirm button level
    pub confirm: bool,
}

/// Rising/falling edge detector for one button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEdge {
    held: bool,
    rising: bool,
    falling: bool,
}

impl InputEdge {
    /// Feed this tick's level; call exactly once per tick
    pub fn update(&mut self, level: bool) {
        self.rising = level && !self.held;
        self.falling = !level && self.held;
        self.held = level;
    }

    /// Released last tick, held now
    #[inline]
    pub fn rising(&self) -> bool {
        self.rising
    }

    /// Held last tick, released now
    #[inline]
    pub fn falling(&self) -> bool {
        self.falling
    }

    #[inline]
    pub fn held(&self) -> bool {
        self.held
    }

    /// Forget history (a button held across a scene change won't edge-trigger)
    pub fn reset(&mut self, level: bool) {
        self.held = level;
        self.rising = false;
        self.falling = false;
    }
}

/// Edge state for every edge-triggered button
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct InputEdges {
    pub fire: InputEdge,
    pub cycle_mode: InputEdge,
    pub confirm: InputEdge,
}

impl InputEdges {
    pub fn update(&mut self, input: &TickInput) {
        self.fire.update(input.fire);
        self.cycle_mode.update(input.cycle_mode);
        self.confirm.update(input.confirm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_sequence() {
        let mut edge = InputEdge::default();
        edge.update(true);
        assert!(edge.rising());
        edge.update(true);
        assert!(!edge.rising());
        assert!(edge.held());
        edge.update(false);
        assert!(edge.falling());
        assert!(!edge.held());
        edge.update(false);
        assert!(!edge.falling());
        edge.update(true);
        assert!(edge.rising());
    }

    #[test]
    fn test_reset_suppresses_edge() {
        let mut edge = InputEdge::default();
        edge.reset(true);
        edge.update(true);
        assert!(!edge.rising());
    }
}
