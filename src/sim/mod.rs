//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - dt clamped per tick
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or audio; presentation is driven by drained events

pub mod collision;
pub mod enemy;
pub mod events;
pub mod geometry;
pub mod input;
pub mod kinematics;
pub mod projectile;
pub mod state;
pub mod tick;
pub mod weapon;

pub use collision::{Contact, clamp_to_bounds, push_apart, resolve_circle, slide_velocity};
pub use enemy::{AiState, Enemy, EnemyKind, HitOutcome, maintain_population, update_enemies};
pub use events::{FeedbackEvent, FeedbackSink};
pub use geometry::{Obstacle, ObstacleShape, Rect, SegmentHit, default_layout, segment_rect_hit};
pub use input::{InputEdge, InputEdges, TickInput};
pub use kinematics::{Body, Motion};
pub use projectile::{RetireReason, Retirement, spawn_projectile, step_projectiles, step_spits};
pub use state::{
    Camera, GAME_OVER_DURATION, Game, HitPause, MenuItem, Owner, Player, Projectile, Scene,
    SessionStats, Spit, World,
};
pub use tick::{step, tick};
pub use weapon::{Discharge, FireMode, Weapon};
