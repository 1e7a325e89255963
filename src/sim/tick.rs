//! Per-tick simulation pipeline
//!
//! Advances the world deterministically: given the same seed, tuning and input
//! sequence, every run produces the same states and the same event stream.

use glam::Vec2;

use super::enemy::{maintain_population, update_enemies};
use super::events::FeedbackEvent;
use super::input::TickInput;
use super::kinematics::Motion;
use super::projectile::{spawn_projectile, step_projectiles, step_spits};
use super::state::{GAME_OVER_DURATION, Game, MenuItem, Scene, World};
use crate::consts::MAX_DT;
use crate::{angle_of, input_direction, normalize_angle};

/// Stick deflection needed to move the menu highlight
const MENU_DEADZONE: f32 = 0.5;

/// Advance the world by one tick
pub fn step(world: &mut World, input: &TickInput, dt: f32) {
    let raw_dt = dt.clamp(0.0, MAX_DT);
    let dt = world.hit_pause.scale(raw_dt, &world.tuning.hit_pause);
    world.time += dt;
    world.ticks += 1;

    world.edges.update(input);
    if world.edges.cycle_mode.rising() {
        world.player.weapon.cycle_mode();
    }

    update_player(world, input, dt);

    let cam = &world.tuning.camera;
    let (decay, max_shake) = (cam.shake_decay, cam.max_shake);
    world.camera.follow(world.player.body.pos, world.extent.max());
    world.camera.decay(decay, max_shake, dt);

    fire_weapon(world, dt);
    step_projectiles(world, dt);
    step_spits(world, dt);
    update_enemies(world, dt);
    maintain_population(world);
}

/// Aim smoothing and movement
fn update_player(world: &mut World, input: &TickInput, dt: f32) {
    let tuning = &world.tuning.player;
    let player = &mut world.player;

    if let Some(aim) = input_direction(input.aim) {
        player.aim = aim;
    }
    let delta = normalize_angle(angle_of(player.aim) - player.body.facing);
    player.body.facing = normalize_angle(player.body.facing + delta * tuning.aim_smoothing);

    let speed = if input.sprint {
        tuning.base_speed * tuning.sprint
    } else {
        tuning.base_speed
    };
    let desired = input_direction(input.move_dir).map_or(Vec2::ZERO, |d| d * speed);
    let motion = Motion {
        desired,
        steer_rate: tuning.steer_rate,
        friction: tuning.friction,
        passes: world.tuning.world.collision_passes,
    };
    player.body.step(&motion, &world.obstacles, &world.bounds, dt);
}

/// Run the weapon state machine and spawn whatever it fired
fn fire_weapon(world: &mut World, dt: f32) {
    let aim = world.player.aim;
    let discharge = world.player.weapon.update(
        &world.edges.fire,
        aim,
        &world.tuning.weapon,
        world.settings.shotgun_trigger,
        &mut world.rng,
        dt,
    );
    if discharge.is_empty() {
        return;
    }

    let muzzle = world.player.muzzle();
    let recoil = world.tuning.recoil();
    for &dir in &discharge.directions {
        spawn_projectile(world, muzzle, dir);
        world.player.body.impulse(-dir * recoil);
    }
    world.stats.shots_fired += discharge.directions.len() as u64;

    world.events.push(FeedbackEvent::MuzzleFlash {
        point: muzzle,
        angle: world.player.body.facing,
    });
    if discharge.shake > 0.0 {
        let max_shake = world.tuning.camera.max_shake;
        world.camera.kick(discharge.shake, max_shake, &mut world.events);
    }
}

/// Advance the scene switch (and the world while in a level)
pub fn tick(game: &mut Game, input: &TickInput, dt: f32) {
    let dt = dt.clamp(0.0, MAX_DT);
    game.edges.update(input);
    let confirm = game.edges.confirm.rising();

    game.scene = match game.scene {
        Scene::Menu { selection } => {
            let selection = if input.move_dir.y < -MENU_DEADZONE {
                MenuItem::Start
            } else if input.move_dir.y > MENU_DEADZONE {
                MenuItem::Tutorial
            } else {
                selection
            };
            match (confirm, selection) {
                (true, MenuItem::Start) => {
                    game.world.reset();
                    // A trigger held through the menu must not fire on entry
                    game.world.edges = game.edges;
                    game.world.edges.fire.reset(input.fire);
                    log::info!("Level started (seed {})", game.world.seed);
                    Scene::Level
                }
                (true, MenuItem::Tutorial) => Scene::Tutorial,
                (false, _) => Scene::Menu { selection },
            }
        }
        Scene::Tutorial => {
            if confirm || game.edges.cycle_mode.rising() {
                Scene::Menu {
                    selection: MenuItem::Start,
                }
            } else {
                Scene::Tutorial
            }
        }
        Scene::Level => {
            step(&mut game.world, input, dt);
            if game.world.player.is_dead() {
                let stats = &game.world.stats;
                log::info!(
                    "Game over after {:.1}s: {} kills, {} detonations, {} shots",
                    game.world.time,
                    stats.kills,
                    stats.detonations,
                    stats.shots_fired
                );
                Scene::GameOver { timer: 0.0 }
            } else {
                Scene::Level
            }
        }
        Scene::GameOver { timer } => {
            let timer = timer + dt;
            if timer >= GAME_OVER_DURATION || confirm {
                Scene::Menu {
                    selection: MenuItem::Start,
                }
            } else {
                Scene::GameOver { timer }
            }
        }
    };
}
