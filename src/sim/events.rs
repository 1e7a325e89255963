//! Presentation events
//!
//! The simulation never draws or plays audio. It appends feedback events and
//! the renderer drains them once per frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One-shot presentation event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FeedbackEvent {
    /// Projectile struck a wall (sparks + debris decal)
    Impact { point: Vec2, normal: Vec2 },
    /// Projectile struck an enemy
    Blood { point: Vec2, direction: Vec2 },
    MuzzleFlash { point: Vec2, angle: f32 },
    /// Camera shake impulse
    ScreenShake { magnitude: f32 },
    DamageNumber { point: Vec2, amount: f32 },
    /// Enraged enemy blew up
    Detonation { point: Vec2, radius: f32 },
    /// Enemy died (mist burst + blood pool)
    DeathMist { point: Vec2, direction: Vec2 },
    /// Wounded enemy leaves a drop behind
    BleedDrop { point: Vec2 },
    /// Player took damage (hurt flash)
    PlayerHurt { amount: f32 },
}

/// Append-only event list, drained by the renderer
#[derive(Debug, Clone, Default)]
pub struct FeedbackSink {
    events: Vec<FeedbackEvent>,
    /// Shake events are dropped when disabled in settings
    pub shake_enabled: bool,
}

impl FeedbackSink {
    pub fn new(shake_enabled: bool) -> Self {
        Self {
            events: Vec::new(),
            shake_enabled,
        }
    }

    pub fn push(&mut self, event: FeedbackEvent) {
        if matches!(event, FeedbackEvent::ScreenShake { .. }) && !self.shake_enabled {
            return;
        }
        self.events.push(event);
    }

    pub fn events(&self) -> &[FeedbackEvent] {
        &self.events
    }

    /// Take every pending event, leaving the sink empty
    pub fn drain(&mut self) -> Vec<FeedbackEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
