//! Enemy AI, contact damage, detonation and population upkeep
//!
//! Enemies wander until they see the player (or the camera shakes hard enough
//! to alert everyone), then chase. Once wounded past their archetype's
//! threshold they enrage, run faster and detonate when the fuse runs out.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::push_apart;
use super::events::FeedbackEvent;
use super::geometry::Rect;
use super::kinematics::{Body, Motion};
use super::state::{Owner, Spit, World};
use crate::consts::MIN_DISTANCE;
use crate::tuning::EnemyArchetype;
use crate::{angle_of, direction};

/// Player's share of an enemy/player overlap is the rest
const ENEMY_PUSH_SHARE: f32 = 0.6;

/// Lower bound of the contact timer while not touching
const CONTACT_REARM: f32 = 0.15;

/// Seconds between bleed drops (uniform range)
const BLEED_INTERVAL: (f32, f32) = (0.10, 0.24);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Grunt,
    /// Lobs spit globs at close range
    Spitter,
}

/// Behavior state; only moves forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiState {
    Wander,
    Chase,
    Enraged,
}

/// What a single hit did to an enemy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitOutcome {
    /// Crossed the enrage threshold on this hit
    pub enraged: bool,
    pub killed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub body: Body,
    pub half_extents: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub state: AiState,
    pub enraged: bool,
    /// Seconds until detonation (meaningful once enraged)
    pub fuse: f32,
    pub sight: f32,
    pub wander_vel: Vec2,
    pub wander_timer: f32,
    pub contact_timer: f32,
    pub spit_timer: f32,
    pub bleed_timer: f32,
    /// Direction of the last projectile that hit
    pub last_hit_dir: Vec2,
    pub alive: bool,
    /// Seconds since death (corpse fade)
    pub fade: f32,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2, arch: &EnemyArchetype) -> Self {
        Self {
            id,
            kind,
            body: Body::new(pos, arch.radius),
            half_extents: arch.half_extents,
            health: arch.max_health,
            max_health: arch.max_health,
            state: AiState::Wander,
            enraged: false,
            fuse: arch.fuse,
            sight: arch.sight,
            wander_vel: Vec2::ZERO,
            wander_timer: 0.0,
            contact_timer: 0.0,
            spit_timer: arch.spit.as_ref().map_or(0.0, |s| s.period),
            bleed_timer: 0.0,
            last_hit_dir: Vec2::X,
            alive: true,
            fade: 0.0,
        }
    }

    pub fn health_fraction(&self) -> f32 {
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    /// Projectile hit box
    pub fn hit_box(&self) -> Rect {
        Rect::from_center(self.body.pos, self.half_extents)
    }

    /// Movement target speed for the current state
    pub fn chase_speed(&self, arch: &EnemyArchetype) -> f32 {
        let wounded = (1.0 - self.health_fraction()) * arch.wounded_bonus;
        let rage = if self.enraged { arch.enraged_bonus } else { 0.0 };
        arch.chase_speed + wounded + rage
    }

    /// Apply projectile damage and knockback
    pub fn take_hit(&mut self, amount: f32, knockback: Vec2, arch: &EnemyArchetype) -> HitOutcome {
        let mut outcome = HitOutcome::default();
        if !self.alive {
            return outcome;
        }
        self.health = (self.health - amount.max(0.0)).clamp(0.0, self.max_health);
        self.body.impulse(knockback);
        if let Some(dir) = knockback.try_normalize() {
            self.last_hit_dir = dir;
        }
        if !self.enraged && self.health_fraction() <= arch.enrage_threshold {
            self.enraged = true;
            self.state = AiState::Enraged;
            self.fuse = arch.fuse;
            outcome.enraged = true;
        }
        if self.health <= 0.0 {
            self.kill();
            outcome.killed = true;
        }
        outcome
    }

    pub fn kill(&mut self) {
        self.alive = false;
        self.fade = 0.0;
        self.body.vel = Vec2::ZERO;
    }

    fn pick_wander<R: Rng + ?Sized>(&mut self, arch: &EnemyArchetype, rng: &mut R) {
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let (lo, hi) = arch.wander_speed;
        let speed = if hi > lo { rng.random_range(lo..hi) } else { lo };
        self.wander_vel = direction(angle) * speed;
        let (lo, hi) = arch.wander_time;
        self.wander_timer = if hi > lo { rng.random_range(lo..hi) } else { lo };
    }
}

/// Advance every enemy by one tick
pub fn update_enemies(world: &mut World, dt: f32) {
    let World {
        tuning,
        obstacles,
        bounds,
        player,
        enemies,
        spits,
        camera,
        hit_pause,
        events,
        stats,
        rng,
        ..
    } = world;
    let passes = tuning.world.collision_passes;
    let max_shake = tuning.camera.max_shake;
    let alert = camera.shake > tuning.camera.alert_threshold;

    for enemy in enemies.iter_mut() {
        if !enemy.alive {
            enemy.fade += dt;
            continue;
        }
        let arch = tuning.archetype(enemy.kind);

        let to_player = player.body.pos - enemy.body.pos;
        let dist = to_player.length().max(MIN_DISTANCE);
        let toward = to_player / dist;

        if enemy.state == AiState::Wander && (dist < enemy.sight || alert) {
            enemy.state = AiState::Chase;
            log::trace!("Enemy #{} chasing (dist {:.0}, alert {})", enemy.id, dist, alert);
        }

        let (desired, steer_rate) = match enemy.state {
            AiState::Wander => {
                enemy.wander_timer -= dt;
                if enemy.wander_timer <= 0.0 {
                    enemy.pick_wander(arch, rng);
                }
                (enemy.wander_vel, arch.wander_rate)
            }
            AiState::Chase | AiState::Enraged => (toward * enemy.chase_speed(arch), arch.chase_rate),
        };
        let motion = Motion {
            desired,
            steer_rate,
            friction: arch.friction,
            passes,
        };
        enemy.body.step(&motion, obstacles, bounds, dt);
        if enemy.body.vel.length_squared() > 1.0 {
            enemy.body.facing = angle_of(enemy.body.vel);
        }

        // Contact: separate, then pulse damage while touching
        let touching = push_apart(
            &mut enemy.body.pos,
            enemy.body.radius,
            &mut player.body.pos,
            player.body.radius,
            ENEMY_PUSH_SHARE,
        );
        if let Some(normal) = touching {
            enemy.body.resolve(obstacles, passes);
            enemy.body.clamp_to(bounds);
            let contact_point = player.body.pos + normal * player.body.radius;
            let visible = !arch.on_screen_only || camera.on_screen(contact_point, 0.0);
            if visible {
                enemy.contact_timer -= dt;
                if enemy.contact_timer <= 0.0 {
                    enemy.contact_timer = arch.contact_period;
                    let taken = player.take_damage(arch.contact_damage);
                    if taken > 0.0 {
                        events.push(FeedbackEvent::PlayerHurt { amount: taken });
                    }
                    camera.kick(arch.contact_shake, max_shake, events);
                }
            }
        } else {
            let floor = CONTACT_REARM.min(arch.contact_period);
            enemy.contact_timer = enemy.contact_timer.clamp(floor, arch.contact_period);
        }

        // Wounded enemies leave a trail
        if enemy.health < enemy.max_health {
            enemy.bleed_timer -= dt;
            if enemy.bleed_timer <= 0.0 {
                enemy.bleed_timer = rng.random_range(BLEED_INTERVAL.0..BLEED_INTERVAL.1);
                events.push(FeedbackEvent::BleedDrop {
                    point: enemy.body.pos,
                });
            }
        }

        if let Some(spit) = &arch.spit {
            enemy.spit_timer = (enemy.spit_timer - dt).max(0.0);
            if enemy.spit_timer <= 0.0 && dist < spit.range && camera.on_screen(enemy.body.pos, 0.0) {
                enemy.spit_timer = spit.period;
                let origin = enemy.body.pos + toward * (enemy.body.radius + spit.radius);
                spits.push(Spit {
                    pos: origin,
                    prev: origin,
                    vel: toward * spit.speed,
                    radius: spit.radius,
                    age: 0.0,
                    lifetime: spit.lifetime,
                    damage: spit.damage,
                    owner: Owner::Enemy(enemy.id),
                });
            }
        }

        if enemy.enraged {
            enemy.fuse -= dt;
            if enemy.fuse <= 0.0 {
                let point = enemy.body.pos;
                events.push(FeedbackEvent::Detonation {
                    point,
                    radius: arch.blast_radius,
                });
                events.push(FeedbackEvent::DeathMist {
                    point,
                    direction: enemy.last_hit_dir,
                });
                camera.kick(arch.blast_shake, max_shake, events);

                if !arch.on_screen_only || camera.on_screen(point, 0.0) {
                    let offset = player.body.pos - point;
                    let d = offset.length().max(MIN_DISTANCE);
                    let falloff = (1.0 - d / arch.blast_radius).max(0.0);
                    if falloff > 0.0 {
                        let push = offset.try_normalize().unwrap_or(Vec2::X);
                        player.body.impulse(push * arch.blast_knockback * falloff);
                        let taken = player.take_damage(arch.blast_damage * falloff);
                        if taken > 0.0 {
                            events.push(FeedbackEvent::PlayerHurt { amount: taken });
                        }
                    }
                }

                enemy.kill();
                stats.detonations += 1;
                hit_pause.trigger(&tuning.hit_pause);
                log::debug!("Enemy #{} detonated at ({:.0}, {:.0})", enemy.id, point.x, point.y);
            }
        }
    }

    // Enemies may have shoved the player into geometry
    player.body.resolve(obstacles, passes);
    player.body.clamp_to(bounds);

    enemies.retain(|e| e.alive || e.fade < tuning.archetype(e.kind).dead_fade);
}

/// Top the alive population back up to its target
///
/// Never spawns when already at or above target. Returns the number spawned;
/// placement that fails this tick is retried on the next.
pub fn maintain_population(world: &mut World) -> usize {
    let target = world.tuning.population.target;
    let mut alive = world.alive_enemies();
    let mut spawned = 0;
    while alive < target {
        let kind = if world.rng.random::<f32>() < world.tuning.population.spitter_chance {
            EnemyKind::Spitter
        } else {
            EnemyKind::Grunt
        };
        let Some(pos) = find_spawn_point(world, kind) else {
            log::debug!("No valid spawn point this tick ({alive}/{target} alive)");
            break;
        };
        world.spawn_enemy(kind, pos);
        alive += 1;
        spawned += 1;
    }
    spawned
}

/// Random clear point at a safe distance from the player
fn find_spawn_point(world: &mut World, kind: EnemyKind) -> Option<Vec2> {
    let pop = &world.tuning.population;
    let radius = world.tuning.archetype(kind).radius;
    let mut area = world.extent.inset(pop.spawn_inset);
    if area.w <= 0.0 || area.h <= 0.0 {
        area = world.bounds.inset(radius);
    }
    let area = Rect::new(area.x, area.y, area.w.max(0.0), area.h.max(0.0));

    for _ in 0..pop.spawn_attempts {
        let pos = Vec2::new(
            area.x + world.rng.random::<f32>() * area.w,
            area.y + world.rng.random::<f32>() * area.h,
        );
        if pos.distance(world.player.body.pos) < pop.safe_distance {
            continue;
        }
        if world.obstacles.iter().any(|o| o.push_out(pos, radius).is_some()) {
            continue;
        }
        return Some(pos);
    }
    None
}
