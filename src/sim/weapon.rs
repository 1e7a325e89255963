//! Weapon fire-mode state machine
//!
//! Maps the fire signal (level + edge) to projectile directions according to
//! the active mode. Spawning, recoil and feedback are the caller's job; this
//! module only decides *when* and *which way*.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::input::InputEdge;
use crate::settings::TriggerFeel;
use crate::tuning::WeaponTuning;
use crate::{angle_of, direction};

/// Semi-auto taps that may wait out a cooldown; further taps are dropped
pub const MAX_PENDING_TAPS: u32 = 2;

/// Trigger-to-projectile mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FireMode {
    #[default]
    Auto,
    Semi,
    Burst,
    Shotgun,
}

impl FireMode {
    /// Next mode in the fixed cycle Auto → Semi → Burst → Shotgun → Auto
    pub fn next(self) -> Self {
        match self {
            FireMode::Auto => FireMode::Semi,
            FireMode::Semi => FireMode::Burst,
            FireMode::Burst => FireMode::Shotgun,
            FireMode::Shotgun => FireMode::Auto,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FireMode::Auto => "AUTO",
            FireMode::Semi => "SEMI",
            FireMode::Burst => "BURST",
            FireMode::Shotgun => "SHOTGUN",
        }
    }
}

/// What one `Weapon::update` fired
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Discharge {
    /// Unit direction of each projectile to spawn
    pub directions: Vec<Vec2>,
    /// Extra camera shake for this discharge
    pub shake: f32,
}

impl Discharge {
    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }
}

/// Per-player weapon state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weapon {
    pub mode: FireMode,
    /// Seconds until the next shot is allowed
    pub cooldown: f32,
    /// Trigger has been released since the last semi/burst shot
    pub semi_ready: bool,
    /// Semi-auto taps received while cooling down (at most `MAX_PENDING_TAPS`)
    pub pending_taps: u32,
    /// Rounds left in the current volley
    pub burst_remaining: u32,
    /// Seconds until the next volley round
    pub burst_timer: f32,
    /// Aim captured when the volley was armed
    pub burst_dir: Vec2,
}

impl Default for Weapon {
    fn default() -> Self {
        Self {
            mode: FireMode::Auto,
            cooldown: 0.0,
            semi_ready: true,
            pending_taps: 0,
            burst_remaining: 0,
            burst_timer: 0.0,
            burst_dir: Vec2::X,
        }
    }
}

impl Weapon {
    pub fn new(mode: FireMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Advance to the next fire mode; an armed volley still finishes
    pub fn cycle_mode(&mut self) {
        self.mode = self.mode.next();
        self.pending_taps = 0;
        log::debug!("Fire mode: {}", self.mode.as_str());
    }

    #[inline]
    pub fn is_bursting(&self) -> bool {
        self.burst_remaining > 0
    }

    /// Advance timers and fire according to the active mode
    ///
    /// `aim` must be a unit vector.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        trigger: &InputEdge,
        aim: Vec2,
        tuning: &WeaponTuning,
        shotgun_feel: TriggerFeel,
        rng: &mut R,
        dt: f32,
    ) -> Discharge {
        let mut out = Discharge::default();
        self.cooldown = (self.cooldown - dt).max(0.0);

        // Rounds of an armed volley ignore the trigger entirely
        if self.is_bursting() {
            self.burst_timer -= dt;
            if self.burst_timer <= 0.0 {
                out.directions.push(self.burst_dir);
                self.burst_remaining -= 1;
                self.burst_timer = tuning.burst_gap;
            }
        }

        if !trigger.held() && !self.is_bursting() {
            self.semi_ready = true;
        }

        match self.mode {
            FireMode::Auto => {
                if trigger.held() && self.cooldown <= 0.0 {
                    out.directions.push(aim);
                    self.cooldown = tuning.auto_interval();
                }
            }
            FireMode::Semi => {
                if trigger.rising() && self.semi_ready {
                    self.semi_ready = false;
                    self.pending_taps = (self.pending_taps + 1).min(MAX_PENDING_TAPS);
                }
                if self.pending_taps > 0 && self.cooldown <= 0.0 {
                    out.directions.push(aim);
                    self.pending_taps -= 1;
                    self.cooldown = tuning.semi_interval();
                }
            }
            FireMode::Burst => {
                if trigger.rising() && self.semi_ready && !self.is_bursting() && self.cooldown <= 0.0 {
                    self.semi_ready = false;
                    self.burst_remaining = tuning.burst_size;
                    self.burst_timer = 0.0;
                    self.burst_dir = aim;
                    self.cooldown = tuning.auto_interval();
                }
            }
            FireMode::Shotgun => {
                let pulled = match shotgun_feel {
                    TriggerFeel::Held => trigger.held(),
                    TriggerFeel::Edge => trigger.rising(),
                };
                if pulled && self.cooldown <= 0.0 {
                    let base = angle_of(aim);
                    for _ in 0..tuning.shotgun_pellets {
                        let offset = rng.random_range(-1.0f32..=1.0) * tuning.shotgun_spread;
                        out.directions.push(direction(base + offset));
                    }
                    out.shake = tuning.shotgun_shake;
                    self.cooldown = tuning.shotgun_pump;
                }
            }
        }

        out
    }
}
