//! World state and core simulation types
//!
//! Everything one simulation step reads or writes lives in `World`, which is
//! passed explicitly through the update pipeline.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, EnemyKind, maintain_population};
use super::events::{FeedbackEvent, FeedbackSink};
use super::geometry::{Obstacle, Rect};
use super::input::{InputEdges, TickInput};
use super::kinematics::Body;
use super::weapon::Weapon;
use crate::direction;
use crate::settings::Settings;
use crate::tuning::{HitPauseTuning, Tuning};

/// Top-level scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Scene {
    /// Title menu with the highlighted entry
    Menu { selection: MenuItem },
    /// Instructions screen
    Tutorial,
    /// Active gameplay
    Level,
    /// Run ended; returns to the menu after a short beat
    GameOver { timer: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MenuItem {
    #[default]
    Start,
    Tutorial,
}

/// Seconds the game-over screen holds before returning to the menu
pub const GAME_OVER_DURATION: f32 = 2.2;

/// The player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub health: f32,
    pub max_health: f32,
    pub weapon: Weapon,
    /// Last non-zero aim direction (unit)
    pub aim: Vec2,
}

impl Player {
    pub fn new(pos: Vec2, tuning: &Tuning) -> Self {
        Self {
            body: Body::new(pos, tuning.player.radius),
            health: tuning.player.max_health,
            max_health: tuning.player.max_health,
            weapon: Weapon::default(),
            aim: Vec2::X,
        }
    }

    /// Barrel tip, where projectiles leave
    pub fn muzzle(&self) -> Vec2 {
        self.body.pos + direction(self.body.facing) * self.body.radius
    }

    /// Apply damage, clamped; returns the amount actually taken
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let before = self.health;
        self.health = (self.health - amount.max(0.0)).clamp(0.0, self.max_health);
        before - self.health
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy(u32),
}

/// A player bullet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    /// Position at the start of the tick (segment start for hit tests)
    pub prev: Vec2,
    pub vel: Vec2,
    pub age: f32,
    pub lifetime: f32,
    pub damage: f32,
    pub owner: Owner,
}

/// Slow area-damage glob thrown by spitters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spit {
    pub pos: Vec2,
    pub prev: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub age: f32,
    pub lifetime: f32,
    pub damage: f32,
    pub owner: Owner,
}

/// Camera: follows the player and owns the shake level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Top-left corner in world space
    pub pos: Vec2,
    pub viewport: Vec2,
    /// Current shake (0..max), decays linearly
    pub shake: f32,
}

impl Camera {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            pos: Vec2::ZERO,
            viewport,
            shake: 0.0,
        }
    }

    /// Center on `target`, clamped to the world
    pub fn follow(&mut self, target: Vec2, world_size: Vec2) {
        let max = (world_size - self.viewport).max(Vec2::ZERO);
        self.pos = (target - self.viewport * 0.5).clamp(Vec2::ZERO, max);
    }

    /// Add a shake impulse and report it to the renderer
    pub fn kick(&mut self, amount: f32, max: f32, events: &mut FeedbackSink) {
        self.shake = (self.shake + amount).min(max);
        events.push(FeedbackEvent::ScreenShake { magnitude: amount });
    }

    pub fn decay(&mut self, rate: f32, max: f32, dt: f32) {
        self.shake = (self.shake - rate * dt).clamp(0.0, max.max(0.0));
    }

    /// Is a world point inside the visible region (grown by `pad`)?
    pub fn on_screen(&self, p: Vec2, pad: f32) -> bool {
        let lo = self.pos - Vec2::splat(pad);
        let hi = self.pos + self.viewport + Vec2::splat(pad);
        p.x >= lo.x && p.x <= hi.x && p.y >= lo.y && p.y <= hi.y
    }
}

/// Freeze-frame on big impacts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HitPause {
    pub enabled: bool,
    /// Wall-clock seconds of freeze left
    pub remaining: f32,
}

impl HitPause {
    pub fn trigger(&mut self, tuning: &HitPauseTuning) {
        if self.enabled {
            self.remaining = self.remaining.max(tuning.duration);
        }
    }

    /// Effective dt for this tick; counts the freeze down in real time
    pub fn scale(&mut self, raw_dt: f32, tuning: &HitPauseTuning) -> f32 {
        if self.remaining > 0.0 {
            self.remaining = (self.remaining - raw_dt).max(0.0);
            raw_dt * tuning.time_scale
        } else {
            raw_dt
        }
    }
}

/// Running counters for the current session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub shots_fired: u64,
    pub kills: u64,
    pub detonations: u64,
    pub enemies_spawned: u64,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    pub tuning: Tuning,
    pub settings: Settings,
    /// Static geometry, never mutated after construction
    pub obstacles: Vec<Obstacle>,
    /// Full world rectangle
    pub extent: Rect,
    /// Playable area (world minus margin)
    pub bounds: Rect,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub spits: Vec<Spit>,
    pub camera: Camera,
    pub hit_pause: HitPause,
    pub edges: InputEdges,
    pub events: FeedbackSink,
    pub stats: SessionStats,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Simulated seconds since reset
    pub time: f32,
    pub ticks: u64,
    next_id: u32,
}

impl World {
    /// Create a world and seed the enemy population
    pub fn new(tuning: Tuning, settings: Settings, obstacles: Vec<Obstacle>, seed: u64) -> Self {
        let extent = Rect::new(0.0, 0.0, tuning.world.width, tuning.world.height);
        let bounds = tuning.bounds();
        let player = Player::new(extent.center(), &tuning);
        let camera = Camera::new(tuning.camera.viewport);
        let hit_pause = HitPause {
            enabled: settings.effective_hit_pause(),
            remaining: 0.0,
        };
        let events = FeedbackSink::new(settings.effective_screen_shake());

        let mut world = Self {
            tuning,
            settings,
            obstacles,
            extent,
            bounds,
            player,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            spits: Vec::new(),
            camera,
            hit_pause,
            edges: InputEdges::default(),
            events,
            stats: SessionStats::default(),
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time: 0.0,
            ticks: 0,
            next_id: 1,
        };
        world.reset();
        world
    }

    /// Start a fresh session: clear entities, restore the player, re-seed enemies
    pub fn reset(&mut self) {
        self.projectiles.clear();
        self.spits.clear();
        self.enemies.clear();
        self.events.clear();
        self.player = Player::new(self.extent.center(), &self.tuning);
        self.camera.shake = 0.0;
        self.camera.follow(self.player.body.pos, self.extent.max());
        self.hit_pause.remaining = 0.0;
        self.stats = SessionStats::default();
        self.time = 0.0;
        self.ticks = 0;
        let spawned = maintain_population(self);
        log::info!("World reset: {} enemies, {} obstacles", spawned, self.obstacles.len());
    }

    /// Swap preferences mid-session
    pub fn apply_settings(&mut self, settings: Settings) {
        self.hit_pause.enabled = settings.effective_hit_pause();
        self.events.shake_enabled = settings.effective_screen_shake();
        self.settings = settings;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Place an enemy directly (population maintenance uses this too)
    pub fn spawn_enemy(&mut self, kind: EnemyKind, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        let enemy = Enemy::new(id, kind, pos, self.tuning.archetype(kind));
        self.enemies.push(enemy);
        self.stats.enemies_spawned += 1;
        log::debug!("Spawned {:?} #{} at ({:.0}, {:.0})", kind, id, pos.x, pos.y);
        id
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn enemy_mut(&mut self, id: u32) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn alive_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| e.alive).count()
    }

    /// Take this tick's feedback events
    pub fn drain_events(&mut self) -> Vec<FeedbackEvent> {
        self.events.drain()
    }

    /// Advance one tick (see `tick::step`)
    pub fn step(&mut self, input: &TickInput, dt: f32) {
        super::tick::step(self, input, dt);
    }
}

/// Scene switch plus the world it drives
#[derive(Debug, Clone)]
pub struct Game {
    pub scene: Scene,
    pub world: World,
    /// Edge state for menu navigation
    pub edges: InputEdges,
}

impl Game {
    pub fn new(world: World) -> Self {
        Self {
            scene: Scene::Menu {
                selection: MenuItem::Start,
            },
            world,
            edges: InputEdges::default(),
        }
    }

    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        super::tick::tick(self, input, dt);
    }
}
