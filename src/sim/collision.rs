//! Collision response for moving circles
//!
//! Actors are circles. Resolution displaces the actor out of each solid
//! obstacle along the contact normal and cancels the velocity component
//! driving into the surface, so actors slide along walls instead of bouncing.

use glam::Vec2;

use super::geometry::{Obstacle, Rect};
use crate::consts::MIN_DISTANCE;

/// Result of a push-out query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal from the surface toward the actor center
    pub normal: Vec2,
    /// How far the actor must move along `normal` to stop overlapping
    pub penetration: f32,
}

/// Remove the velocity component pointing into a surface
///
/// Slide, not bounce: v' = v - (v·n)n when v·n < 0
#[inline]
pub fn slide_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    let vn = velocity.dot(normal);
    if vn < 0.0 {
        velocity - vn * normal
    } else {
        velocity
    }
}

/// Resolve a circle against every solid obstacle
///
/// Runs `passes` sweeps so an actor wedged into a corner (two surfaces at
/// once) ends up clear of both. Returns the number of contacts resolved.
pub fn resolve_circle(
    pos: &mut Vec2,
    vel: &mut Vec2,
    radius: f32,
    obstacles: &[Obstacle],
    passes: u32,
) -> u32 {
    let mut contacts = 0;
    for _ in 0..passes.max(1) {
        let mut moved = false;
        for obstacle in obstacles {
            if let Some(contact) = obstacle.push_out(*pos, radius) {
                *pos += contact.normal * contact.penetration;
                *vel = slide_velocity(*vel, contact.normal);
                contacts += 1;
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }
    contacts
}

/// Separate two overlapping circles
///
/// `share_a` is the fraction of the overlap moved by `a` (the rest by `b`).
/// Returns the normal from `b` to `a` if they overlapped.
pub fn push_apart(a: &mut Vec2, radius_a: f32, b: &mut Vec2, radius_b: f32, share_a: f32) -> Option<Vec2> {
    let delta = *a - *b;
    let reach = radius_a + radius_b;
    let dist_sq = delta.length_squared();
    if dist_sq >= reach * reach {
        return None;
    }
    let dist = dist_sq.sqrt().max(MIN_DISTANCE);
    let normal = if dist_sq > MIN_DISTANCE * MIN_DISTANCE {
        delta / dist
    } else {
        Vec2::X
    };
    let overlap = reach - dist;
    *a += normal * overlap * share_a;
    *b -= normal * overlap * (1.0 - share_a);
    Some(normal)
}

/// Keep a circle fully inside the playable bounds
///
/// Zeroes the velocity component that pushed through the wall.
pub fn clamp_to_bounds(pos: &mut Vec2, vel: &mut Vec2, radius: f32, bounds: &Rect) -> bool {
    let lo = bounds.min() + Vec2::splat(radius);
    let hi = (bounds.max() - Vec2::splat(radius)).max(lo);
    let clamped = pos.clamp(lo, hi);
    if clamped == *pos {
        return false;
    }
    if clamped.x != pos.x {
        vel.x = 0.0;
    }
    if clamped.y != pos.y {
        vel.y = 0.0;
    }
    *pos = clamped;
    true
}

/// Deepest overlap of a circle with any solid obstacle (0 when clear)
#[cfg(test)]
pub(crate) fn max_penetration(pos: Vec2, radius: f32, obstacles: &[Obstacle]) -> f32 {
    obstacles
        .iter()
        .map(|o| -o.clearance(pos, radius))
        .fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PENETRATION_SLOP;
    use proptest::prelude::*;

    #[test]
    fn test_slide_velocity_cancels_normal_component() {
        let v = slide_velocity(Vec2::new(100.0, -50.0), Vec2::Y);
        assert_eq!(v, Vec2::new(100.0, 0.0));
        // Moving away from the surface is untouched
        let v = slide_velocity(Vec2::new(100.0, 50.0), Vec2::Y);
        assert_eq!(v, Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_resolve_against_wall() {
        let obstacles = [Obstacle::rect(100.0, 0.0, 50.0, 200.0)];
        let mut pos = Vec2::new(95.0, 100.0);
        let mut vel = Vec2::new(200.0, 30.0);
        let contacts = resolve_circle(&mut pos, &mut vel, 18.0, &obstacles, 2);
        assert_eq!(contacts, 1);
        assert!((pos.x - 82.0).abs() < 1e-3);
        assert_eq!(vel, Vec2::new(0.0, 30.0));
    }

    #[test]
    fn test_resolve_corner_two_passes() {
        // L-shaped corner: floor and wall meeting at (100, 100)
        let obstacles = [
            Obstacle::rect(0.0, 100.0, 200.0, 50.0),
            Obstacle::rect(100.0, 0.0, 50.0, 100.0),
        ];
        let mut pos = Vec2::new(95.0, 95.0);
        let mut vel = Vec2::new(50.0, 50.0);
        resolve_circle(&mut pos, &mut vel, 18.0, &obstacles, 2);
        assert!(max_penetration(pos, 18.0, &obstacles) <= PENETRATION_SLOP);
        assert!(vel.x <= 0.0 && vel.y <= 0.0);
    }

    #[test]
    fn test_push_apart_shares_overlap() {
        let mut a = Vec2::new(0.0, 0.0);
        let mut b = Vec2::new(30.0, 0.0);
        let n = push_apart(&mut a, 20.0, &mut b, 20.0, 0.6).unwrap();
        assert_eq!(n, Vec2::NEG_X);
        assert!((a.x - (-6.0)).abs() < 1e-4);
        assert!((b.x - 34.0).abs() < 1e-4);
        assert!(push_apart(&mut a, 20.0, &mut b, 20.0, 0.6).is_none());
    }

    #[test]
    fn test_clamp_to_bounds() {
        let bounds = Rect::new(0.0, 0.0, 500.0, 500.0);
        let mut pos = Vec2::new(-10.0, 250.0);
        let mut vel = Vec2::new(-100.0, 20.0);
        assert!(clamp_to_bounds(&mut pos, &mut vel, 18.0, &bounds));
        assert_eq!(pos, Vec2::new(18.0, 250.0));
        assert_eq!(vel, Vec2::new(0.0, 20.0));
    }

    proptest! {
        #[test]
        fn prop_single_obstacle_leaves_no_overlap(
            x in 0.0f32..400.0,
            y in 0.0f32..400.0,
            radius in 4.0f32..40.0,
            kind in 0u8..3,
        ) {
            let obstacle = match kind {
                0 => Obstacle::rect(150.0, 150.0, 100.0, 60.0),
                1 => Obstacle::circle(200.0, 200.0, 45.0),
                _ => Obstacle::corridor(80.0, 120.0, 260.0, 140.0, 16.0),
            };
            let obstacles = [obstacle];
            let mut pos = Vec2::new(x, y);
            let mut vel = Vec2::new(120.0, -80.0);
            resolve_circle(&mut pos, &mut vel, radius, &obstacles, 2);
            prop_assert!(max_penetration(pos, radius, &obstacles) <= PENETRATION_SLOP);
        }
    }
}
