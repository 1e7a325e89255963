//! Shared motion model for the player and enemies
//!
//! Velocity approaches a desired velocity at a bounded rate, decays
//! exponentially with friction, integrates into position, then gets resolved
//! against the world geometry and clamped to the playable bounds.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{clamp_to_bounds, resolve_circle};
use super::geometry::{Obstacle, Rect};
use crate::approach_factor;

/// A circle that moves under the shared motion model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Facing angle (radians)
    pub facing: f32,
}

impl Body {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
            facing: 0.0,
        }
    }

    /// Move velocity toward `desired` at `rate` per second
    pub fn steer(&mut self, desired: Vec2, rate: f32, dt: f32) {
        self.vel += (desired - self.vel) * approach_factor(rate, dt);
    }

    /// Exponential velocity decay
    pub fn apply_friction(&mut self, friction: f32, dt: f32) {
        self.vel *= (-friction * dt).exp();
    }

    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    /// Add an instantaneous velocity change (recoil, knockback)
    pub fn impulse(&mut self, dv: Vec2) {
        self.vel += dv;
    }

    /// Resolve against solid obstacles; returns the number of contacts
    pub fn resolve(&mut self, obstacles: &[Obstacle], passes: u32) -> u32 {
        resolve_circle(&mut self.pos, &mut self.vel, self.radius, obstacles, passes)
    }

    pub fn clamp_to(&mut self, bounds: &Rect) -> bool {
        clamp_to_bounds(&mut self.pos, &mut self.vel, self.radius, bounds)
    }

    /// Full per-tick motion step
    pub fn step(&mut self, motion: &Motion, obstacles: &[Obstacle], bounds: &Rect, dt: f32) {
        self.steer(motion.desired, motion.steer_rate, dt);
        self.apply_friction(motion.friction, dt);
        self.integrate(dt);
        self.resolve(obstacles, motion.passes);
        self.clamp_to(bounds);
    }

    #[inline]
    pub fn distance_to(&self, other: Vec2) -> f32 {
        (other - self.pos).length()
    }
}

/// Parameters for one `Body::step`
#[derive(Debug, Clone, Copy)]
pub struct Motion {
    pub desired: Vec2,
    pub steer_rate: f32,
    pub friction: f32,
    pub passes: u32,
}
