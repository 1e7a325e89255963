//! Projectile flight and hit resolution
//!
//! Each tick a projectile sweeps the segment from its previous to its new
//! position. Tests run in a fixed order (solid geometry, living enemies, world
//! bounds, lifetime) and the first hit removes it, so a projectile is removed
//! at most once and never damages two things.

use glam::Vec2;

use super::events::FeedbackEvent;
use super::geometry::{Obstacle, Rect, SegmentHit, segment_circle_hit};
use super::state::{Owner, Projectile, World};
use crate::consts::PROJECTILE_HALF_SIZE;

/// Why a projectile left the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetireReason {
    Obstacle,
    /// Hit the enemy with this ID
    Enemy(u32),
    Bounds,
    Expired,
}

/// A projectile removed during a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Retirement {
    pub id: u32,
    pub owner: Owner,
    pub reason: RetireReason,
    pub point: Vec2,
}

/// Spawn a player projectile at `origin` heading along unit `dir`
pub fn spawn_projectile(world: &mut World, origin: Vec2, dir: Vec2) -> u32 {
    let id = world.next_entity_id();
    let tuning = &world.tuning.projectile;
    world.projectiles.push(Projectile {
        id,
        pos: origin,
        prev: origin,
        vel: dir * tuning.speed,
        age: 0.0,
        lifetime: tuning.lifetime,
        damage: tuning.damage,
        owner: Owner::Player,
    });
    id
}

/// Nearest solid surface crossed by segment a→b
fn first_obstacle_hit(obstacles: &[Obstacle], a: Vec2, b: Vec2) -> Option<SegmentHit> {
    obstacles
        .iter()
        .filter_map(|o| o.segment_hit(a, b))
        .min_by(|x, y| x.t.total_cmp(&y.t))
}

/// Outward normal of the bounds edge(s) a point has crossed
fn bounds_normal(bounds: &Rect, p: Vec2) -> Vec2 {
    let (lo, hi) = (bounds.min(), bounds.max());
    let mut n = Vec2::ZERO;
    if p.x < lo.x {
        n.x = 1.0;
    } else if p.x > hi.x {
        n.x = -1.0;
    }
    if p.y < lo.y {
        n.y = 1.0;
    } else if p.y > hi.y {
        n.y = -1.0;
    }
    n.normalize_or_zero()
}

/// Advance every projectile one tick and resolve hits
///
/// Traverses in reverse and compacts with `swap_remove`; the element swapped
/// into a freed slot has already been stepped this tick.
pub fn step_projectiles(world: &mut World, dt: f32) -> Vec<Retirement> {
    let World {
        tuning,
        obstacles,
        bounds,
        enemies,
        projectiles,
        camera,
        hit_pause,
        events,
        stats,
        ..
    } = world;
    let max_shake = tuning.camera.max_shake;
    let mut retired = Vec::new();

    for i in (0..projectiles.len()).rev() {
        let p = &mut projectiles[i];
        p.prev = p.pos;
        p.pos += p.vel * dt;
        p.age += dt;
        let (a, b) = (p.prev, p.pos);

        let retirement = 'hit: {
            if let Some(hit) = first_obstacle_hit(obstacles, a, b) {
                events.push(FeedbackEvent::Impact {
                    point: hit.point,
                    normal: hit.normal,
                });
                camera.kick(tuning.projectile.impact_shake, max_shake, events);
                break 'hit Some((RetireReason::Obstacle, hit.point));
            }

            let sweep = Rect::around_segment(a, b, PROJECTILE_HALF_SIZE);
            let tip = Rect::from_center(b, Vec2::splat(PROJECTILE_HALF_SIZE));
            let target = enemies.iter_mut().find(|e| {
                if !e.alive {
                    return false;
                }
                let hit_box = e.hit_box();
                sweep.overlaps(&hit_box) && tip.overlaps(&hit_box)
            });
            if let Some(enemy) = target {
                let arch = tuning.archetype(enemy.kind);
                let dir = p.vel.normalize_or_zero();
                let outcome = enemy.take_hit(p.damage, p.vel * tuning.projectile.knockback, arch);
                events.push(FeedbackEvent::Blood {
                    point: b,
                    direction: dir,
                });
                events.push(FeedbackEvent::DamageNumber {
                    point: b,
                    amount: p.damage,
                });
                camera.kick(tuning.projectile.hit_shake, max_shake, events);
                enemy.bleed_timer = 0.0;
                if outcome.enraged {
                    log::debug!("Enemy #{} enraged, fuse {:.2}s", enemy.id, enemy.fuse);
                }
                if outcome.killed {
                    events.push(FeedbackEvent::DeathMist {
                        point: enemy.body.pos,
                        direction: enemy.last_hit_dir,
                    });
                    stats.kills += 1;
                    hit_pause.trigger(&tuning.hit_pause);
                    log::debug!("Enemy #{} killed", enemy.id);
                }
                break 'hit Some((RetireReason::Enemy(enemy.id), b));
            }

            if !bounds.contains(b) {
                let point = b.clamp(bounds.min(), bounds.max());
                events.push(FeedbackEvent::Impact {
                    point,
                    normal: bounds_normal(bounds, b),
                });
                break 'hit Some((RetireReason::Bounds, point));
            }

            if p.age >= p.lifetime {
                break 'hit Some((RetireReason::Expired, b));
            }
            None
        };

        if let Some((reason, point)) = retirement {
            let p = projectiles.swap_remove(i);
            retired.push(Retirement {
                id: p.id,
                owner: p.owner,
                reason,
                point,
            });
        }
    }
    retired
}

/// Advance spitter globs; they splat on geometry and hurt the player on touch
pub fn step_spits(world: &mut World, dt: f32) {
    let World {
        obstacles,
        bounds,
        player,
        spits,
        events,
        ..
    } = world;

    spits.retain_mut(|s| {
        s.prev = s.pos;
        s.pos += s.vel * dt;
        s.age += dt;

        if let Some(hit) = first_obstacle_hit(obstacles, s.prev, s.pos) {
            events.push(FeedbackEvent::Impact {
                point: hit.point,
                normal: hit.normal,
            });
            return false;
        }
        let reach = player.body.radius + s.radius;
        if segment_circle_hit(s.prev, s.pos, player.body.pos, reach).is_some() {
            let taken = player.take_damage(s.damage);
            if taken > 0.0 {
                events.push(FeedbackEvent::PlayerHurt { amount: taken });
                if let Owner::Enemy(id) = s.owner {
                    log::debug!("Spit from enemy #{id} hit the player for {taken:.0}");
                }
            }
            return false;
        }
        bounds.contains(s.pos) && s.age < s.lifetime
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::enemy::{AiState, EnemyKind};
    use crate::sim::state::Spit;
    use crate::tuning::Tuning;

    fn open_world(obstacles: Vec<Obstacle>) -> World {
        let mut tuning = Tuning::default();
        tuning.population.target = 0;
        let mut world = World::new(tuning, Settings::default(), obstacles, 1);
        world.bounds = Rect::new(-1000.0, -1000.0, 6000.0, 6000.0);
        world
    }

    fn fire(world: &mut World, from: Vec2, vel: Vec2) -> u32 {
        let id = spawn_projectile(world, from, vel.normalize());
        if let Some(p) = world.projectiles.iter_mut().find(|p| p.id == id) {
            p.vel = vel;
        }
        id
    }

    #[test]
    fn test_wall_impact_at_surface() {
        let mut world = open_world(vec![Obstacle::rect(50.0, -10.0, 20.0, 20.0)]);
        let id = fire(&mut world, Vec2::ZERO, Vec2::new(1000.0, 0.0));
        world.projectiles[0].lifetime = 1.0;
        let retired = step_projectiles(&mut world, 0.06);

        assert_eq!(retired.len(), 1);
        assert_eq!(retired[0].id, id);
        assert_eq!(retired[0].owner, Owner::Player);
        assert_eq!(retired[0].reason, RetireReason::Obstacle);
        assert!(world.projectiles.is_empty());

        let impacts: Vec<_> = world
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                FeedbackEvent::Impact { point, normal } => Some((point, normal)),
                _ => None,
            })
            .collect();
        assert_eq!(impacts.len(), 1);
        let (point, normal) = impacts[0];
        assert!((point - Vec2::new(50.0, 0.0)).length() < 1e-4);
        assert_eq!(normal, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_obstacle_blocks_before_enemy() {
        let mut world = open_world(vec![Obstacle::rect(50.0, -10.0, 20.0, 20.0)]);
        let id = world.spawn_enemy(EnemyKind::Grunt, Vec2::new(90.0, 0.0));
        fire(&mut world, Vec2::ZERO, Vec2::new(1800.0, 0.0));
        step_projectiles(&mut world, 1.0 / 20.0);
        let enemy = world.enemy(id).unwrap();
        assert_eq!(enemy.health, enemy.max_health);
    }

    #[test]
    fn test_enemy_hit_damages_once() {
        let mut world = open_world(Vec::new());
        let id = world.spawn_enemy(EnemyKind::Grunt, Vec2::new(40.0, 0.0));
        fire(&mut world, Vec2::ZERO, Vec2::new(1650.0, 0.0));
        fire(&mut world, Vec2::new(0.0, 5.0), Vec2::new(1650.0, 0.0));
        let retired = step_projectiles(&mut world, 1.0 / 60.0);

        assert_eq!(retired.len(), 2);
        assert!(retired.iter().all(|r| r.reason == RetireReason::Enemy(id)));
        let enemy = world.enemy(id).unwrap();
        assert_eq!(enemy.health, enemy.max_health - 28.0);
        assert!(enemy.body.vel.x > 0.0);

        let events = world.drain_events();
        let blood = events.iter().filter(|e| matches!(e, FeedbackEvent::Blood { .. })).count();
        let numbers = events
            .iter()
            .filter(|e| matches!(e, FeedbackEvent::DamageNumber { .. }))
            .count();
        assert_eq!(blood, 2);
        assert_eq!(numbers, 2);
    }

    #[test]
    fn test_lethal_hit_kills_and_pauses() {
        let mut world = open_world(Vec::new());
        let id = world.spawn_enemy(EnemyKind::Grunt, Vec2::new(40.0, 0.0));
        world.enemy_mut(id).unwrap().health = 10.0;
        fire(&mut world, Vec2::ZERO, Vec2::new(1650.0, 0.0));
        step_projectiles(&mut world, 1.0 / 60.0);

        let enemy = world.enemy(id).unwrap();
        assert!(!enemy.alive);
        assert_eq!(enemy.health, 0.0);
        assert_eq!(world.stats.kills, 1);
        assert!(world.hit_pause.remaining > 0.0);
        assert!(
            world
                .drain_events()
                .iter()
                .any(|e| matches!(e, FeedbackEvent::DeathMist { .. }))
        );
    }

    #[test]
    fn test_threshold_hit_enrages() {
        let mut world = open_world(Vec::new());
        let id = world.spawn_enemy(EnemyKind::Grunt, Vec2::new(40.0, 0.0));
        world.enemy_mut(id).unwrap().health = 85.0;
        fire(&mut world, Vec2::ZERO, Vec2::new(1650.0, 0.0));
        step_projectiles(&mut world, 1.0 / 60.0);
        let enemy = world.enemy(id).unwrap();
        assert!(enemy.enraged);
        assert_eq!(enemy.state, AiState::Enraged);
    }

    #[test]
    fn test_dead_enemies_do_not_absorb_shots() {
        let mut world = open_world(Vec::new());
        let id = world.spawn_enemy(EnemyKind::Grunt, Vec2::new(40.0, 0.0));
        world.enemy_mut(id).unwrap().kill();
        fire(&mut world, Vec2::ZERO, Vec2::new(1650.0, 0.0));
        let retired = step_projectiles(&mut world, 1.0 / 60.0);
        assert!(retired.is_empty());
        assert_eq!(world.projectiles.len(), 1);
    }

    #[test]
    fn test_bounds_exit_reports_impact() {
        let mut world = open_world(Vec::new());
        world.bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        fire(&mut world, Vec2::new(90.0, 50.0), Vec2::new(1200.0, 0.0));
        let retired = step_projectiles(&mut world, 1.0 / 60.0);
        assert_eq!(retired[0].reason, RetireReason::Bounds);
        assert!(world.drain_events().iter().any(|e| matches!(
            e,
            FeedbackEvent::Impact { normal, .. } if *normal == Vec2::new(-1.0, 0.0)
        )));
    }

    #[test]
    fn test_lifetime_expiry_is_silent() {
        let mut world = open_world(Vec::new());
        let id = fire(&mut world, Vec2::ZERO, Vec2::new(10.0, 0.0));
        let mut retired = Vec::new();
        for _ in 0..80 {
            retired.extend(step_projectiles(&mut world, 1.0 / 60.0));
            for p in &world.projectiles {
                assert!(p.age < p.lifetime);
            }
        }
        assert_eq!(retired.len(), 1);
        assert_eq!(retired[0].id, id);
        assert_eq!(retired[0].reason, RetireReason::Expired);
        assert!(world.drain_events().is_empty());
    }

    #[test]
    fn test_spit_hurts_player() {
        let mut world = open_world(Vec::new());
        let target = world.player.body.pos;
        let origin = target - Vec2::new(60.0, 0.0);
        world.spits.push(Spit {
            pos: origin,
            prev: origin,
            vel: Vec2::new(260.0, 0.0),
            radius: 10.0,
            age: 0.0,
            lifetime: 2.5,
            damage: 12.0,
            owner: Owner::Enemy(99),
        });
        for _ in 0..30 {
            step_spits(&mut world, 1.0 / 60.0);
        }
        assert!(world.spits.is_empty());
        assert_eq!(world.player.health, world.player.max_health - 12.0);
    }

    #[test]
    fn test_mixed_removals_keep_survivors() {
        let mut world = open_world(vec![Obstacle::rect(50.0, -500.0, 20.0, 1000.0)]);
        let mut blocked = Vec::new();
        let mut clear = Vec::new();
        for i in 0..6 {
            let y = i as f32 * 40.0;
            if i % 2 == 0 {
                blocked.push(fire(&mut world, Vec2::new(0.0, y), Vec2::new(1000.0, 0.0)));
            } else {
                clear.push(fire(&mut world, Vec2::new(0.0, y), Vec2::new(-1000.0, 0.0)));
            }
        }
        let retired = step_projectiles(&mut world, 0.06);

        let mut gone: Vec<u32> = retired.iter().map(|r| r.id).collect();
        gone.sort_unstable();
        assert_eq!(gone, blocked);
        let mut left: Vec<u32> = world.projectiles.iter().map(|p| p.id).collect();
        left.sort_unstable();
        assert_eq!(left, clear);
    }

    #[test]
    fn test_spit_splats_on_rect() {
        let mut world = open_world(vec![Obstacle::rect(150.0, 80.0, 20.0, 40.0)]);
        let origin = Vec2::new(100.0, 100.0);
        world.spits.push(Spit {
            pos: origin,
            prev: origin,
            vel: Vec2::new(260.0, 0.0),
            radius: 10.0,
            age: 0.0,
            lifetime: 2.5,
            damage: 12.0,
            owner: Owner::Enemy(5),
        });
        for _ in 0..30 {
            step_spits(&mut world, 1.0 / 60.0);
        }
        assert!(world.spits.is_empty());
        assert_eq!(world.player.health, world.player.max_health);

        let impacts: Vec<_> = world
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                FeedbackEvent::Impact { point, normal } => Some((point, normal)),
                _ => None,
            })
            .collect();
        assert_eq!(impacts.len(), 1);
        let (point, normal) = impacts[0];
        assert!((point - Vec2::new(150.0, 100.0)).length() < 1e-3);
        assert_eq!(normal, Vec2::new(-1.0, 0.0));
    }
}
