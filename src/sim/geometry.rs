//! Static world geometry
//!
//! Obstacles are axis-aligned rectangles, circular pillars, and hollow
//! corridors (a solid frame around a walkable lane). Every shape answers two
//! questions: "how far is this circle pushed out of me?" and "where does this
//! segment first hit my surface?".

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Contact;
use crate::consts::MIN_DISTANCE;

/// Axis-aligned rectangle (top-left origin, y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle centered on `center` with the given half extents
    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self::new(center.x - half.x, center.y - half.y, half.x * 2.0, half.y * 2.0)
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.w, self.y + self.h)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    /// Strict overlap test (touching edges don't count)
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    /// Bounding box of a segment, padded on every side
    pub fn around_segment(a: Vec2, b: Vec2, pad: f32) -> Self {
        let lo = a.min(b) - Vec2::splat(pad);
        let hi = a.max(b) + Vec2::splat(pad);
        Self::new(lo.x, lo.y, hi.x - lo.x, hi.y - lo.y)
    }

    /// Shrink by `inset` on every side
    pub fn inset(&self, inset: f32) -> Self {
        Self::new(
            self.x + inset,
            self.y + inset,
            (self.w - 2.0 * inset).max(0.0),
            (self.h - 2.0 * inset).max(0.0),
        )
    }

    /// Outward normal of the face nearest to an interior point, and its distance
    fn nearest_face(&self, p: Vec2) -> (Vec2, f32) {
        let faces = [
            (Vec2::NEG_X, p.x - self.x),
            (Vec2::X, self.x + self.w - p.x),
            (Vec2::NEG_Y, p.y - self.y),
            (Vec2::Y, self.y + self.h - p.y),
        ];
        faces
            .into_iter()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap_or((Vec2::NEG_X, 0.0))
    }

    /// Push a circle out of this rectangle
    ///
    /// Clamps the circle center onto the rectangle to find the nearest surface
    /// point. A center inside the rectangle is pushed through the nearest face.
    pub fn push_circle(&self, center: Vec2, radius: f32) -> Option<Contact> {
        let closest = center.clamp(self.min(), self.max());
        let delta = center - closest;
        let dist_sq = delta.length_squared();

        if dist_sq >= radius * radius {
            return None;
        }

        if dist_sq > MIN_DISTANCE * MIN_DISTANCE {
            let dist = dist_sq.sqrt();
            return Some(Contact {
                normal: delta / dist,
                penetration: radius - dist,
            });
        }

        let (normal, depth) = self.nearest_face(center);
        Some(Contact {
            normal,
            penetration: depth + radius,
        })
    }

    /// Signed distance from a point to the rectangle surface (negative inside)
    pub fn signed_distance(&self, p: Vec2) -> f32 {
        if self.contains(p) {
            -self.nearest_face(p).1
        } else {
            (p - p.clamp(self.min(), self.max())).length()
        }
    }
}

/// Push a circle out of another (static) circle
pub fn push_circle_circle(center: Vec2, radius: f32, other: Vec2, other_radius: f32) -> Option<Contact> {
    let delta = center - other;
    let reach = radius + other_radius;
    let dist_sq = delta.length_squared();
    if dist_sq >= reach * reach {
        return None;
    }
    let dist = dist_sq.sqrt();
    // Coincident centers: pick an arbitrary but stable direction
    let normal = if dist > MIN_DISTANCE { delta / dist } else { Vec2::X };
    Some(Contact {
        normal,
        penetration: reach - dist,
    })
}

/// First intersection of a travelled segment with a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Fraction along the segment (0 = start, 1 = end)
    pub t: f32,
    /// Surface point
    pub point: Vec2,
    /// Outward surface normal
    pub normal: Vec2,
}

/// Segment vs rectangle (slab method)
///
/// Returns the first entry point and the outward normal of the face crossed.
/// A segment starting inside reports t = 0 and the nearest face normal.
pub fn segment_rect_hit(a: Vec2, b: Vec2, rect: &Rect) -> Option<SegmentHit> {
    let d = b - a;
    let mut t_min = 0.0_f32;
    let mut t_max = 1.0_f32;
    let mut normal = Vec2::ZERO;

    let slabs = [
        (a.x, d.x, rect.x, rect.x + rect.w, Vec2::X),
        (a.y, d.y, rect.y, rect.y + rect.h, Vec2::Y),
    ];

    for (p, dp, lo, hi, axis) in slabs {
        if dp.abs() < 1e-6 {
            if p < lo || p > hi {
                return None;
            }
            continue;
        }
        let mut t_enter = (lo - p) / dp;
        let mut t_exit = (hi - p) / dp;
        // Entering through the low face means the outward normal points -axis
        let mut enter_normal = -axis;
        if t_enter > t_exit {
            std::mem::swap(&mut t_enter, &mut t_exit);
            enter_normal = axis;
        }
        if t_enter > t_min {
            t_min = t_enter;
            normal = enter_normal;
        }
        t_max = t_max.min(t_exit);
        if t_min > t_max {
            return None;
        }
    }

    if normal == Vec2::ZERO {
        normal = rect.nearest_face(a).0;
    }

    Some(SegmentHit {
        t: t_min,
        point: a + d * t_min,
        normal,
    })
}

/// Segment vs circle
pub fn segment_circle_hit(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> Option<SegmentHit> {
    let to_start = a - center;
    if to_start.length_squared() <= radius * radius {
        let normal = to_start.try_normalize().unwrap_or(Vec2::X);
        return Some(SegmentHit {
            t: 0.0,
            point: a,
            normal,
        });
    }

    let d = b - a;
    let qa = d.length_squared();
    if qa < 1e-12 {
        return None;
    }
    let qb = 2.0 * to_start.dot(d);
    let qc = to_start.length_squared() - radius * radius;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return None;
    }
    let t = (-qb - disc.sqrt()) / (2.0 * qa);
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    let point = a + d * t;
    Some(SegmentHit {
        t,
        point,
        normal: (point - center) / radius,
    })
}

/// Obstacle shape variants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleShape {
    Rectangle(Rect),
    Circle { center: Vec2, radius: f32 },
    /// Hollow frame: solid border of `border` thickness, walkable interior
    Corridor { frame: Rect, border: f32 },
}

/// A static obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub shape: ObstacleShape,
    /// Non-solid obstacles are decoration only
    pub solid: bool,
}

impl Obstacle {
    pub fn rect(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            shape: ObstacleShape::Rectangle(Rect::new(x, y, w, h)),
            solid: true,
        }
    }

    pub fn circle(x: f32, y: f32, r: f32) -> Self {
        Self {
            shape: ObstacleShape::Circle {
                center: Vec2::new(x, y),
                radius: r,
            },
            solid: true,
        }
    }

    pub fn corridor(x: f32, y: f32, w: f32, h: f32, border: f32) -> Self {
        Self {
            shape: ObstacleShape::Corridor {
                frame: Rect::new(x, y, w, h),
                border,
            },
            solid: true,
        }
    }

    /// Mark as decoration (no collision)
    pub fn decorative(mut self) -> Self {
        self.solid = false;
        self
    }

    /// The four solid border strips of a corridor frame
    pub fn corridor_borders(frame: &Rect, border: f32) -> [Rect; 4] {
        let Rect { x, y, w, h } = *frame;
        let inner_h = (h - 2.0 * border).max(0.0);
        [
            Rect::new(x, y, w, border),
            Rect::new(x, y + h - border, w, border),
            Rect::new(x, y + border, border, inner_h),
            Rect::new(x + w - border, y + border, border, inner_h),
        ]
    }

    /// Call `f` for each solid rectangle making up this obstacle
    ///
    /// Circles contribute nothing; they are handled as circles.
    pub fn for_each_solid_rect(&self, mut f: impl FnMut(&Rect)) {
        if !self.solid {
            return;
        }
        match &self.shape {
            ObstacleShape::Rectangle(rect) => f(rect),
            ObstacleShape::Corridor { frame, border } => {
                for rect in Self::corridor_borders(frame, *border) {
                    f(&rect);
                }
            }
            ObstacleShape::Circle { .. } => {}
        }
    }

    /// Push-out of a circle; for corridors the deepest border contact wins
    pub fn push_out(&self, center: Vec2, radius: f32) -> Option<Contact> {
        if let ObstacleShape::Circle { center: c, radius: r } = self.shape {
            return self.solid.then(|| push_circle_circle(center, radius, c, r)).flatten();
        }
        let mut deepest: Option<Contact> = None;
        self.for_each_solid_rect(|rect| {
            if let Some(contact) = rect.push_circle(center, radius) {
                if deepest.is_none_or(|d| contact.penetration > d.penetration) {
                    deepest = Some(contact);
                }
            }
        });
        deepest
    }

    /// First surface hit of a travelled segment
    pub fn segment_hit(&self, a: Vec2, b: Vec2) -> Option<SegmentHit> {
        if let ObstacleShape::Circle { center, radius } = self.shape {
            return self.solid.then(|| segment_circle_hit(a, b, center, radius)).flatten();
        }
        let mut first: Option<SegmentHit> = None;
        self.for_each_solid_rect(|rect| {
            if let Some(hit) = segment_rect_hit(a, b, rect) {
                if first.is_none_or(|f| hit.t < f.t) {
                    first = Some(hit);
                }
            }
        });
        first
    }

    /// Signed distance from a circle's edge to the nearest solid surface
    ///
    /// Negative values mean overlap. `f32::MAX` for non-solid obstacles.
    pub fn clearance(&self, center: Vec2, radius: f32) -> f32 {
        if let ObstacleShape::Circle { center: c, radius: r } = self.shape {
            return if self.solid {
                (center - c).length() - r - radius
            } else {
                f32::MAX
            };
        }
        let mut nearest = f32::MAX;
        self.for_each_solid_rect(|rect| {
            nearest = nearest.min(rect.signed_distance(center) - radius);
        });
        nearest
    }
}

/// The stock level layout: blocks, pillars, corridors and a little decoration
pub fn default_layout() -> Vec<Obstacle> {
    vec![
        Obstacle::rect(900.0, 520.0, 260.0, 80.0),
        Obstacle::rect(1480.0, 380.0, 120.0, 360.0),
        Obstacle::rect(2100.0, 780.0, 360.0, 90.0),
        Obstacle::rect(2550.0, 400.0, 160.0, 120.0),
        Obstacle::rect(2900.0, 1200.0, 220.0, 100.0),
        Obstacle::rect(800.0, 1400.0, 300.0, 90.0),
        Obstacle::rect(1600.0, 1600.0, 500.0, 80.0),
        Obstacle::rect(2200.0, 1840.0, 160.0, 380.0),
        Obstacle::rect(400.0, 1900.0, 300.0, 120.0),
        Obstacle::rect(3000.0, 600.0, 90.0, 420.0),
        Obstacle::circle(1200.0, 1000.0, 36.0),
        Obstacle::circle(1750.0, 900.0, 42.0),
        Obstacle::circle(2450.0, 1350.0, 38.0),
        Obstacle::circle(3100.0, 1550.0, 46.0),
        Obstacle::circle(600.0, 600.0, 32.0),
        Obstacle::corridor(1100.0, 1150.0, 420.0, 120.0, 16.0),
        Obstacle::corridor(2100.0, 1200.0, 520.0, 120.0, 16.0),
        Obstacle::corridor(1400.0, 1800.0, 480.0, 100.0, 16.0),
        Obstacle::rect(1850.0, 1120.0, 220.0, 40.0).decorative(),
        Obstacle::circle(2600.0, 980.0, 28.0).decorative(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_push_from_outside() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        let contact = rect.push_circle(Vec2::new(110.0, 25.0), 15.0).unwrap();
        assert!((contact.normal - Vec2::X).length() < 1e-6);
        assert!((contact.penetration - 5.0).abs() < 1e-4);

        assert!(rect.push_circle(Vec2::new(120.0, 25.0), 15.0).is_none());
    }

    #[test]
    fn test_rect_push_from_inside_uses_nearest_face() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        let contact = rect.push_circle(Vec2::new(50.0, 45.0), 10.0).unwrap();
        assert_eq!(contact.normal, Vec2::Y);
        assert!((contact.penetration - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_circle_push_coincident_centers() {
        let contact = push_circle_circle(Vec2::new(5.0, 5.0), 10.0, Vec2::new(5.0, 5.0), 20.0).unwrap();
        assert_eq!(contact.normal, Vec2::X);
        assert!((contact.penetration - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_segment_rect_hit_left_face() {
        let rect = Rect::new(50.0, -10.0, 20.0, 20.0);
        let hit = segment_rect_hit(Vec2::ZERO, Vec2::new(60.0, 0.0), &rect).unwrap();
        assert!((hit.point - Vec2::new(50.0, 0.0)).length() < 1e-4);
        assert_eq!(hit.normal, Vec2::NEG_X);
        assert!((hit.t - 50.0 / 60.0).abs() < 1e-5);
    }

    #[test]
    fn test_segment_rect_hit_from_below_moving_up() {
        let rect = Rect::new(0.0, 0.0, 100.0, 20.0);
        let hit = segment_rect_hit(Vec2::new(30.0, 50.0), Vec2::new(40.0, 10.0), &rect).unwrap();
        assert_eq!(hit.normal, Vec2::Y);
        assert!((hit.point.y - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_segment_rect_miss() {
        let rect = Rect::new(50.0, -10.0, 20.0, 20.0);
        assert!(segment_rect_hit(Vec2::ZERO, Vec2::new(40.0, 0.0), &rect).is_none());
        assert!(segment_rect_hit(Vec2::new(0.0, 30.0), Vec2::new(100.0, 30.0), &rect).is_none());
    }

    #[test]
    fn test_segment_circle_hit() {
        let hit = segment_circle_hit(Vec2::ZERO, Vec2::new(100.0, 0.0), Vec2::new(60.0, 0.0), 10.0).unwrap();
        assert!((hit.point - Vec2::new(50.0, 0.0)).length() < 1e-3);
        assert!((hit.normal - Vec2::NEG_X).length() < 1e-4);
        assert!(segment_circle_hit(Vec2::ZERO, Vec2::new(100.0, 0.0), Vec2::new(60.0, 30.0), 10.0).is_none());
    }

    #[test]
    fn test_corridor_interior_is_walkable() {
        let corridor = Obstacle::corridor(0.0, 0.0, 400.0, 120.0, 16.0);
        // Lane is 88 tall; a radius-18 actor in the middle touches nothing
        assert!(corridor.push_out(Vec2::new(200.0, 60.0), 18.0).is_none());
        // Near the top border it gets pushed down
        let contact = corridor.push_out(Vec2::new(200.0, 25.0), 18.0).unwrap();
        assert!((contact.normal - Vec2::Y).length() < 1e-5);
        assert!((contact.penetration - 9.0).abs() < 1e-4);
    }

    #[test]
    fn test_corridor_segment_hits_nearest_border() {
        let corridor = Obstacle::corridor(0.0, 0.0, 400.0, 120.0, 16.0);
        let hit = corridor
            .segment_hit(Vec2::new(200.0, 60.0), Vec2::new(200.0, -40.0))
            .unwrap();
        assert!((hit.point.y - 16.0).abs() < 1e-4);
        assert_eq!(hit.normal, Vec2::Y);
    }

    #[test]
    fn test_decorative_obstacles_do_not_collide() {
        let deco = Obstacle::rect(0.0, 0.0, 100.0, 100.0).decorative();
        assert!(deco.push_out(Vec2::new(50.0, 50.0), 10.0).is_none());
        assert!(deco.segment_hit(Vec2::new(-10.0, 50.0), Vec2::new(50.0, 50.0)).is_none());
        let mut count = 0;
        deco.for_each_solid_rect(|_| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_for_each_solid_rect_corridor() {
        let corridor = Obstacle::corridor(10.0, 20.0, 200.0, 100.0, 10.0);
        let mut rects = Vec::new();
        corridor.for_each_solid_rect(|r| rects.push(*r));
        assert_eq!(rects.len(), 4);
        assert_eq!(rects[0], Rect::new(10.0, 20.0, 200.0, 10.0));
        assert_eq!(rects[3], Rect::new(200.0, 30.0, 10.0, 80.0));
    }

    #[test]
    fn test_corridor_push_out_picks_deepest_border() {
        let corridor = Obstacle::corridor(0.0, 0.0, 200.0, 100.0, 10.0);
        // Inner corner: 3px into the left strip, 5px into the top strip
        let contact = corridor.push_out(Vec2::new(13.0, 15.0), 10.0).unwrap();
        assert_eq!(contact.normal, Vec2::X);
        assert!((contact.penetration - 7.0).abs() < 1e-4);
        assert!((corridor.clearance(Vec2::new(13.0, 15.0), 10.0) + 7.0).abs() < 1e-4);
    }

    #[test]
    fn test_decorative_corridor_and_circle_are_inert() {
        for deco in [
            Obstacle::corridor(0.0, 0.0, 200.0, 100.0, 10.0).decorative(),
            Obstacle::circle(5.0, 50.0, 20.0).decorative(),
        ] {
            assert!(deco.push_out(Vec2::new(5.0, 50.0), 10.0).is_none());
            assert!(deco.segment_hit(Vec2::new(-50.0, 50.0), Vec2::new(50.0, 50.0)).is_none());
            assert_eq!(deco.clearance(Vec2::new(5.0, 50.0), 10.0), f32::MAX);
        }
    }

    #[test]
    fn test_clearance_sign() {
        let rect = Obstacle::rect(0.0, 0.0, 100.0, 100.0);
        assert!(rect.clearance(Vec2::new(130.0, 50.0), 10.0) > 0.0);
        assert!(rect.clearance(Vec2::new(105.0, 50.0), 10.0) < 0.0);
        assert!(rect.clearance(Vec2::new(50.0, 50.0), 10.0) < 0.0);
    }
}
