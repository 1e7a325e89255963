//! Hunter Core - real-time simulation core of a top-down arcade shooter
//!
//! Core modules:
//! - `sim`: Simulation (movement, collisions, weapons, projectiles, enemy AI)
//! - `settings`: Player preferences (shake, hit-pause, trigger feel)
//! - `tuning`: Data-driven game balance
//! - `error`: Configuration load/validation errors

pub mod error;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::ConfigError;
pub use settings::{Settings, TriggerFeel};
pub use tuning::Tuning;

use glam::Vec2;

/// Simulation constants that are not balance knobs
pub mod consts {
    /// Fixed step used by the headless driver (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;

    /// Max substeps per frame (spiral-of-death guard)
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Upper bound on a single tick's dt (prevents tunneling on frame hitches)
    pub const MAX_DT: f32 = 1.0 / 30.0;

    /// Vectors shorter than this are treated as "no input"
    pub const INPUT_EPSILON: f32 = 1e-3;

    /// Substitute denominator for coincident positions
    pub const MIN_DISTANCE: f32 = 1e-4;

    /// Allowed residual overlap after collision resolution
    pub const PENETRATION_SLOP: f32 = 0.01;

    /// Padding around the travelled segment for projectile vs enemy tests
    pub const PROJECTILE_HALF_SIZE: f32 = 2.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector pointing along `angle`
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of a vector (atan2), 0 for the zero vector
#[inline]
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Normalize `v`, or `None` if it is too short to carry a direction
#[inline]
pub fn input_direction(v: Vec2) -> Option<Vec2> {
    let len = v.length();
    if len < consts::INPUT_EPSILON {
        None
    } else {
        Some(v / len)
    }
}

/// Frame-rate independent lerp factor for "approach target at `rate` per second"
#[inline]
pub fn approach_factor(rate: f32, dt: f32) -> f32 {
    (rate * dt).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(3.0 * PI) - (-PI)).abs() < 1e-4);
        assert!((normalize_angle(-1.5 * PI) - 0.5 * PI).abs() < 1e-4);
        assert!((normalize_angle(0.25) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_input_direction_deadzone() {
        assert!(input_direction(Vec2::new(0.0001, 0.0)).is_none());
        let d = input_direction(Vec2::new(3.0, 4.0)).unwrap();
        assert!((d - Vec2::new(0.6, 0.8)).length() < 1e-6);
    }

    #[test]
    fn test_approach_factor_caps_at_one() {
        assert_eq!(approach_factor(10.0, 1.0), 1.0);
        assert!((approach_factor(10.0, 0.01) - 0.1).abs() < 1e-6);
    }
}
