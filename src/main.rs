//! Hunter headless driver
//!
//! Runs the simulation without a renderer: an autopilot plays a session at a
//! fixed step and the feedback stream is summarized in the log.
//!
//! Usage: `hunter-core [seed] [seconds] [tuning.json] [settings.json]`

use std::collections::HashMap;
use std::path::Path;

use glam::Vec2;

use hunter_core::consts::{MAX_SUBSTEPS, SIM_DT};
use hunter_core::sim::{FeedbackEvent, Game, Scene, TickInput, World, default_layout};
use hunter_core::{Settings, Tuning};

/// Simulated display refresh
const FRAME_DT: f32 = 1.0 / 60.0;

/// Seconds between autopilot fire-mode switches
const MODE_SWITCH_PERIOD: f32 = 6.0;

/// Idle-mode AI: kite the nearest enemy and shoot at it
fn autopilot(world: &World, frame: u64) -> TickInput {
    let me = world.player.body.pos;
    let nearest = world
        .enemies
        .iter()
        .filter(|e| e.alive)
        .min_by(|a, b| {
            a.body
                .pos
                .distance_squared(me)
                .total_cmp(&b.body.pos.distance_squared(me))
        });

    let mut input = TickInput::default();
    let switch_every = (MODE_SWITCH_PERIOD / FRAME_DT) as u64;
    input.cycle_mode = frame % switch_every == 0 && frame > 0;

    let Some(target) = nearest else {
        input.move_dir = Vec2::new((frame as f32 * 0.01).cos(), (frame as f32 * 0.01).sin());
        return input;
    };

    let offset = target.body.pos - me;
    let dist = offset.length();
    input.aim = offset;
    // Toggle every few frames so semi/burst see fresh presses
    input.fire = dist < target.sight && frame % 6 < 3;
    input.move_dir = if dist < 260.0 {
        -offset
    } else {
        offset.perp()
    };
    input.sprint = dist < 160.0 || target.enraged;
    input
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    let seed = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(0xC0FFEE_u64);
    let seconds: f32 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(60.0);
    let tuning = args
        .get(3)
        .map_or_else(Tuning::default, |p| Tuning::load(Path::new(p)));
    let settings = args
        .get(4)
        .map_or_else(Settings::default, |p| Settings::load(Path::new(p)));

    log::info!("Hunter (headless) starting, seed {seed:#x}, {seconds}s");

    let world = World::new(tuning, settings, default_layout(), seed);
    let mut game = Game::new(world);
    let mut accumulator = 0.0_f32;
    let mut counts: HashMap<&'static str, u64> = HashMap::new();
    let frames = (seconds / FRAME_DT) as u64;

    for frame in 0..frames {
        let input = match game.scene {
            Scene::Level => autopilot(&game.world, frame),
            // Press confirm on alternating frames to leave menus
            _ => TickInput {
                confirm: frame % 2 == 0,
                ..Default::default()
            },
        };

        let was_playing = game.scene == Scene::Level;
        accumulator += FRAME_DT;
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            game.tick(&input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;
        }

        for event in game.world.drain_events() {
            *counts.entry(event_name(&event)).or_default() += 1;
        }

        if was_playing && matches!(game.scene, Scene::GameOver { .. }) {
            log::info!("Player down at frame {frame}");
        }
    }

    let stats = &game.world.stats;
    log::info!(
        "Session: {:.1}s simulated, {} shots, {} kills, {} detonations, {} spawned, health {:.0}/{:.0}",
        game.world.time,
        stats.shots_fired,
        stats.kills,
        stats.detonations,
        stats.enemies_spawned,
        game.world.player.health,
        game.world.player.max_health
    );
    let mut names: Vec<_> = counts.into_iter().collect();
    names.sort_unstable();
    for (name, count) in names {
        log::info!("  {name}: {count}");
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Headless driver is native-only
}

fn event_name(event: &FeedbackEvent) -> &'static str {
    match event {
        FeedbackEvent::Impact { .. } => "impact",
        FeedbackEvent::Blood { .. } => "blood",
        FeedbackEvent::MuzzleFlash { .. } => "muzzle_flash",
        FeedbackEvent::ScreenShake { .. } => "screen_shake",
        FeedbackEvent::DamageNumber { .. } => "damage_number",
        FeedbackEvent::Detonation { .. } => "detonation",
        FeedbackEvent::DeathMist { .. } => "death_mist",
        FeedbackEvent::BleedDrop { .. } => "bleed_drop",
        FeedbackEvent::PlayerHurt { .. } => "player_hurt",
    }
}
