//! Data-driven game balance
//!
//! Every gameplay number the simulation reads lives here so balance passes
//! don't touch code. Defaults are the shipped values; JSON overrides may be
//! partial.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::sim::{EnemyKind, Rect};

/// Arena dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub width: f32,
    pub height: f32,
    /// Playable area is inset by this much on every side
    pub margin: f32,
    /// Obstacle resolution passes per actor per tick
    pub collision_passes: u32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            width: 3600.0,
            height: 2400.0,
            margin: 64.0,
            collision_passes: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub radius: f32,
    pub max_health: f32,
    /// Top running speed (pixels/s)
    pub base_speed: f32,
    /// Speed multiplier while sprint is held
    pub sprint: f32,
    /// Base acceleration (pixels/s²), also caps recoil
    pub accel: f32,
    /// How fast velocity approaches the desired velocity (1/s)
    pub steer_rate: f32,
    /// Exponential velocity decay (1/s)
    pub friction: f32,
    /// Fraction of the remaining aim angle closed per tick
    pub aim_smoothing: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            radius: 18.0,
            max_health: 120.0,
            base_speed: 480.0,
            sprint: 1.55,
            accel: 1000.0,
            steer_rate: 10.0,
            friction: 8.0,
            aim_smoothing: 0.18,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTuning {
    pub rpm_auto: f32,
    /// Semi-auto cadence cap, keeps tapping at or below auto cadence
    pub rpm_semi_cap: f32,
    /// Absolute floor between semi-auto shots (seconds)
    pub semi_min_gap: f32,
    pub burst_size: u32,
    /// Gap between rounds of one volley (seconds)
    pub burst_gap: f32,
    pub shotgun_pellets: u32,
    /// Max random offset from the aim angle per pellet (radians)
    pub shotgun_spread: f32,
    /// Pump-action cooldown (seconds)
    pub shotgun_pump: f32,
    pub shotgun_shake: f32,
    /// Velocity kick per projectile, before capping
    pub recoil: f32,
    /// Recoil never exceeds `player.accel * recoil_cap_fraction`
    pub recoil_cap_fraction: f32,
}

impl Default for WeaponTuning {
    fn default() -> Self {
        Self {
            rpm_auto: 780.0,
            rpm_semi_cap: 720.0,
            semi_min_gap: 0.06,
            burst_size: 3,
            burst_gap: 0.07,
            shotgun_pellets: 7,
            shotgun_spread: 0.13,
            shotgun_pump: 0.22,
            shotgun_shake: 0.20,
            recoil: 110.0,
            recoil_cap_fraction: 0.14,
        }
    }
}

impl WeaponTuning {
    pub fn auto_interval(&self) -> f32 {
        60.0 / self.rpm_auto
    }

    pub fn semi_interval(&self) -> f32 {
        self.semi_min_gap.max(60.0 / self.rpm_semi_cap)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub speed: f32,
    pub lifetime: f32,
    pub damage: f32,
    /// Enemy velocity gained per unit of projectile velocity on hit
    pub knockback: f32,
    pub impact_shake: f32,
    pub hit_shake: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: 1650.0,
            lifetime: 1.2,
            damage: 14.0,
            knockback: 0.02,
            impact_shake: 0.08,
            hit_shake: 0.06,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    pub viewport: Vec2,
    pub max_shake: f32,
    /// Linear shake decay per second
    pub shake_decay: f32,
    /// Shake above this alerts every enemy
    pub alert_threshold: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            viewport: Vec2::new(1280.0, 720.0),
            max_shake: 0.6,
            shake_decay: 2.3,
            alert_threshold: 0.35,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationTuning {
    /// Alive-enemy count kept topped up to this
    pub target: usize,
    /// Minimum spawn distance from the player
    pub safe_distance: f32,
    /// Spawns stay this far inside the world edge
    pub spawn_inset: f32,
    pub spawn_attempts: u32,
    /// Probability that a new enemy is a spitter
    pub spitter_chance: f32,
}

impl Default for PopulationTuning {
    fn default() -> Self {
        Self {
            target: 10,
            safe_distance: 600.0,
            spawn_inset: 200.0,
            spawn_attempts: 32,
            spitter_chance: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HitPauseTuning {
    /// Wall-clock length of the freeze-frame (seconds)
    pub duration: f32,
    /// dt multiplier while frozen
    pub time_scale: f32,
}

impl Default for HitPauseTuning {
    fn default() -> Self {
        Self {
            duration: 0.06,
            time_scale: 0.05,
        }
    }
}

/// Ranged attack of the spitter subtype
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpitTuning {
    /// Spits only while the player is this close
    pub range: f32,
    pub period: f32,
    pub speed: f32,
    pub radius: f32,
    pub damage: f32,
    pub lifetime: f32,
}

impl Default for SpitTuning {
    fn default() -> Self {
        Self {
            range: 340.0,
            period: 1.6,
            speed: 260.0,
            radius: 10.0,
            damage: 12.0,
            lifetime: 2.5,
        }
    }
}

/// Per-kind enemy parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyArchetype {
    pub max_health: f32,
    /// Movement collision radius
    pub radius: f32,
    /// Hit box for projectiles
    pub half_extents: Vec2,
    pub sight: f32,
    pub wander_speed: (f32, f32),
    pub wander_time: (f32, f32),
    pub wander_rate: f32,
    pub chase_rate: f32,
    pub friction: f32,
    pub chase_speed: f32,
    /// Extra chase speed at zero health, scaled by damage taken
    pub wounded_bonus: f32,
    pub enraged_bonus: f32,
    /// Health fraction at or below which the enemy enrages
    pub enrage_threshold: f32,
    /// Seconds from enrage to detonation
    pub fuse: f32,
    pub blast_radius: f32,
    pub blast_damage: f32,
    pub blast_knockback: f32,
    pub blast_shake: f32,
    pub contact_damage: f32,
    pub contact_period: f32,
    pub contact_shake: f32,
    /// Contact pulses and blasts only hurt while on screen
    pub on_screen_only: bool,
    /// Corpse fade before removal
    pub dead_fade: f32,
    pub spit: Option<SpitTuning>,
}

impl Default for EnemyArchetype {
    fn default() -> Self {
        Self {
            max_health: 210.0,
            radius: 23.0,
            half_extents: Vec2::new(29.0, 25.0),
            sight: 620.0,
            wander_speed: (80.0, 160.0),
            wander_time: (0.8, 2.0),
            wander_rate: 2.1,
            chase_rate: 3.0,
            friction: 11.0,
            chase_speed: 170.0,
            wounded_bonus: 90.0,
            enraged_bonus: 110.0,
            enrage_threshold: 0.38,
            fuse: 1.2,
            blast_radius: 260.0,
            blast_damage: 38.0,
            blast_knockback: 290.0,
            blast_shake: 0.55,
            contact_damage: 16.0,
            contact_period: 0.5,
            contact_shake: 0.05,
            on_screen_only: true,
            dead_fade: 0.9,
            spit: None,
        }
    }
}

impl EnemyArchetype {
    pub fn spitter() -> Self {
        Self {
            max_health: 150.0,
            radius: 20.0,
            half_extents: Vec2::new(24.0, 22.0),
            sight: 560.0,
            wander_speed: (70.0, 140.0),
            chase_speed: 150.0,
            enraged_bonus: 90.0,
            enrage_threshold: 1.0 / 3.0,
            fuse: 1.5,
            blast_radius: 200.0,
            blast_damage: 30.0,
            contact_damage: 10.0,
            spit: Some(SpitTuning::default()),
            ..Self::default()
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub world: WorldTuning,
    pub player: PlayerTuning,
    pub weapon: WeaponTuning,
    pub projectile: ProjectileTuning,
    pub camera: CameraTuning,
    pub population: PopulationTuning,
    pub hit_pause: HitPauseTuning,
    pub grunt: EnemyArchetype,
    /// Partial overrides layer onto the spitter table, not the grunt defaults
    #[serde(default = "EnemyArchetype::spitter", deserialize_with = "spitter_overrides")]
    pub spitter: EnemyArchetype,
}

fn spitter_overrides<'de, D: Deserializer<'de>>(de: D) -> Result<EnemyArchetype, D::Error> {
    use serde::de::Error;

    let overrides = Map::<String, Value>::deserialize(de)?;
    let mut table = serde_json::to_value(EnemyArchetype::spitter()).map_err(D::Error::custom)?;
    merge_json(&mut table, Value::Object(overrides));
    serde_json::from_value(table).map_err(D::Error::custom)
}

/// Overlay `over` onto `base`, recursing into objects present in both
fn merge_json(base: &mut Value, over: Value) {
    match (base, over) {
        (Value::Object(base), Value::Object(over)) => {
            for (key, value) in over {
                match base.get_mut(&key) {
                    Some(slot) if slot.is_object() && value.is_object() => merge_json(slot, value),
                    _ => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, over) => *base = over,
    }
}

/// Accepted range for a tuning number
#[derive(Debug, Clone, Copy)]
enum Range {
    Positive,
    NonNegative,
    Unit,
}

fn check(field: &'static str, name: &str, value: f32, range: Range) -> Result<(), ConfigError> {
    let (ok, rule) = match range {
        Range::Positive => (value > 0.0, "> 0"),
        Range::NonNegative => (value >= 0.0, ">= 0"),
        Range::Unit => ((0.0..=1.0).contains(&value), "in [0, 1]"),
    };
    if ok && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{name} = {value} must be {rule}")))
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world: WorldTuning::default(),
            player: PlayerTuning::default(),
            weapon: WeaponTuning::default(),
            projectile: ProjectileTuning::default(),
            camera: CameraTuning::default(),
            population: PopulationTuning::default(),
            hit_pause: HitPauseTuning::default(),
            grunt: EnemyArchetype::default(),
            spitter: EnemyArchetype::spitter(),
        }
    }
}

impl Tuning {
    /// Parameters for an enemy kind
    pub fn archetype(&self, kind: EnemyKind) -> &EnemyArchetype {
        match kind {
            EnemyKind::Grunt => &self.grunt,
            EnemyKind::Spitter => &self.spitter,
        }
    }

    /// Playable rectangle (world minus margin)
    pub fn bounds(&self) -> Rect {
        let m = self.world.margin;
        Rect::new(m, m, self.world.width - 2.0 * m, self.world.height - 2.0 * m)
    }

    /// Recoil applied per projectile, capped against player control
    pub fn recoil(&self) -> f32 {
        self.weapon
            .recoil
            .min(self.player.accel * self.weapon.recoil_cap_fraction)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from disk, falling back to defaults
    pub fn load(path: &Path) -> Self {
        let result = std::fs::read_to_string(path)
            .map_err(ConfigError::from)
            .and_then(|json| Self::from_json(&json));
        match result {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                log::warn!("Using default tuning ({e})");
                Self::default()
            }
        }
    }

    /// Reject tables the simulation cannot run on
    pub fn validate(&self) -> Result<(), ConfigError> {
        use Range::{NonNegative, Positive, Unit};

        let w = &self.world;
        check("world", "width", w.width, Positive)?;
        check("world", "height", w.height, Positive)?;
        check("world", "margin", w.margin, NonNegative)?;
        if w.width <= 2.0 * w.margin || w.height <= 2.0 * w.margin {
            return Err(ConfigError::invalid("world", "margin leaves no playable area"));
        }
        if !(1..=8).contains(&w.collision_passes) {
            return Err(ConfigError::invalid("world.collision_passes", "must be 1-8"));
        }

        let p = &self.player;
        check("player", "radius", p.radius, Positive)?;
        check("player", "max_health", p.max_health, Positive)?;
        check("player", "base_speed", p.base_speed, NonNegative)?;
        check("player", "sprint", p.sprint, Positive)?;
        check("player", "accel", p.accel, NonNegative)?;
        check("player", "steer_rate", p.steer_rate, NonNegative)?;
        check("player", "friction", p.friction, NonNegative)?;
        check("player", "aim_smoothing", p.aim_smoothing, Unit)?;

        let wt = &self.weapon;
        check("weapon", "rpm_auto", wt.rpm_auto, Positive)?;
        check("weapon", "rpm_semi_cap", wt.rpm_semi_cap, Positive)?;
        if wt.rpm_semi_cap > wt.rpm_auto {
            return Err(ConfigError::invalid(
                "weapon.rpm_semi_cap",
                "semi cap cannot exceed auto cadence",
            ));
        }
        if wt.burst_size == 0 || wt.shotgun_pellets == 0 {
            return Err(ConfigError::invalid("weapon", "burst_size and shotgun_pellets must be >= 1"));
        }
        for (name, value) in [
            ("semi_min_gap", wt.semi_min_gap),
            ("burst_gap", wt.burst_gap),
            ("shotgun_spread", wt.shotgun_spread),
            ("shotgun_pump", wt.shotgun_pump),
            ("shotgun_shake", wt.shotgun_shake),
            ("recoil", wt.recoil),
            ("recoil_cap_fraction", wt.recoil_cap_fraction),
        ] {
            check("weapon", name, value, NonNegative)?;
        }

        let pr = &self.projectile;
        check("projectile", "speed", pr.speed, Positive)?;
        check("projectile", "lifetime", pr.lifetime, Positive)?;
        for (name, value) in [
            ("damage", pr.damage),
            ("knockback", pr.knockback),
            ("impact_shake", pr.impact_shake),
            ("hit_shake", pr.hit_shake),
        ] {
            check("projectile", name, value, NonNegative)?;
        }

        let cam = &self.camera;
        check("camera", "viewport.x", cam.viewport.x, Positive)?;
        check("camera", "viewport.y", cam.viewport.y, Positive)?;
        check("camera", "max_shake", cam.max_shake, NonNegative)?;
        check("camera", "shake_decay", cam.shake_decay, NonNegative)?;
        check("camera", "alert_threshold", cam.alert_threshold, NonNegative)?;

        let pop = &self.population;
        check("population", "safe_distance", pop.safe_distance, NonNegative)?;
        check("population", "spawn_inset", pop.spawn_inset, NonNegative)?;
        check("population", "spitter_chance", pop.spitter_chance, Unit)?;

        check("hit_pause", "duration", self.hit_pause.duration, NonNegative)?;
        check("hit_pause", "time_scale", self.hit_pause.time_scale, Unit)?;

        for (field, arch) in [("grunt", &self.grunt), ("spitter", &self.spitter)] {
            Self::validate_archetype(field, arch)?;
        }
        Ok(())
    }

    fn validate_archetype(field: &'static str, arch: &EnemyArchetype) -> Result<(), ConfigError> {
        use Range::{NonNegative, Positive};

        for (name, value) in [
            ("max_health", arch.max_health),
            ("radius", arch.radius),
            ("half_extents.x", arch.half_extents.x),
            ("half_extents.y", arch.half_extents.y),
            ("wander_time.0", arch.wander_time.0),
            ("chase_speed", arch.chase_speed),
            ("fuse", arch.fuse),
            ("blast_radius", arch.blast_radius),
            ("contact_period", arch.contact_period),
        ] {
            check(field, name, value, Positive)?;
        }
        for (name, value) in [
            ("sight", arch.sight),
            ("wander_speed.0", arch.wander_speed.0),
            ("wander_rate", arch.wander_rate),
            ("chase_rate", arch.chase_rate),
            ("friction", arch.friction),
            ("wounded_bonus", arch.wounded_bonus),
            ("enraged_bonus", arch.enraged_bonus),
            ("blast_damage", arch.blast_damage),
            ("blast_knockback", arch.blast_knockback),
            ("blast_shake", arch.blast_shake),
            ("contact_damage", arch.contact_damage),
            ("contact_shake", arch.contact_shake),
            ("dead_fade", arch.dead_fade),
        ] {
            check(field, name, value, NonNegative)?;
        }
        if !(arch.enrage_threshold > 0.0 && arch.enrage_threshold <= 1.0) {
            return Err(ConfigError::invalid(field, "enrage_threshold must be in (0, 1]"));
        }
        if !(arch.wander_speed.0 <= arch.wander_speed.1 && arch.wander_time.0 <= arch.wander_time.1) {
            return Err(ConfigError::invalid(field, "wander ranges must be ordered"));
        }
        if arch.chase_speed <= arch.wander_speed.1 {
            return Err(ConfigError::invalid(field, "chase_speed must exceed wander speed"));
        }
        if let Some(spit) = &arch.spit {
            check(field, "spit.range", spit.range, NonNegative)?;
            check(field, "spit.damage", spit.damage, NonNegative)?;
            for (name, value) in [
                ("spit.period", spit.period),
                ("spit.speed", spit.speed),
                ("spit.radius", spit.radius),
                ("spit.lifetime", spit.lifetime),
            ] {
                check(field, name, value, Positive)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_semi_interval_respects_cap() {
        let weapon = WeaponTuning::default();
        assert!((weapon.semi_interval() - 60.0 / 720.0).abs() < 1e-6);
        assert!(weapon.semi_interval() >= weapon.auto_interval());
    }

    #[test]
    fn test_recoil_is_capped() {
        let mut tuning = Tuning::default();
        assert_eq!(tuning.recoil(), 110.0);
        tuning.weapon.recoil = 500.0;
        assert!((tuning.recoil() - 140.0).abs() < 1e-4);
    }

    #[test]
    fn test_partial_json_override() {
        let tuning = Tuning::from_json(r#"{"population":{"target":4},"grunt":{"fuse":1.5}}"#).unwrap();
        assert_eq!(tuning.population.target, 4);
        assert_eq!(tuning.grunt.fuse, 1.5);
        assert_eq!(tuning.weapon.burst_size, 3);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Tuning::from_json(r#"{"weapon":{"burst_size":0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = Tuning::from_json(r#"{"weapon":{"rpm_semi_cap":900}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "weapon.rpm_semi_cap", .. }));

        let err = Tuning::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_bounds_inset_by_margin() {
        let bounds = Tuning::default().bounds();
        assert_eq!(bounds.min(), Vec2::new(64.0, 64.0));
        assert_eq!(bounds.max(), Vec2::new(3536.0, 2336.0));
    }

    #[test]
    fn test_partial_spitter_override_keeps_spitter_table() {
        let tuning = Tuning::from_json(r#"{"spitter":{"fuse":2.0}}"#).unwrap();
        let spitter = &tuning.spitter;
        assert_eq!(spitter.fuse, 2.0);
        assert_eq!(spitter.max_health, 150.0);
        assert!((spitter.enrage_threshold - 1.0 / 3.0).abs() < 1e-6);
        assert!(spitter.spit.is_some());
        assert_eq!(tuning.grunt.max_health, 210.0);
        assert!(tuning.grunt.spit.is_none());
    }

    #[test]
    fn test_nested_spit_override_merges() {
        let tuning = Tuning::from_json(r#"{"spitter":{"spit":{"range":400.0}}}"#).unwrap();
        let spit = tuning.spitter.spit.unwrap();
        assert_eq!(spit.range, 400.0);
        assert_eq!(spit.period, SpitTuning::default().period);

        let tuning = Tuning::from_json(r#"{"spitter":{"spit":null}}"#).unwrap();
        assert!(tuning.spitter.spit.is_none());
    }

    #[test]
    fn test_out_of_range_numbers_rejected() {
        let cases = [
            (r#"{"camera":{"max_shake":-0.1}}"#, "camera"),
            (r#"{"hit_pause":{"time_scale":2.0}}"#, "hit_pause"),
            (r#"{"spitter":{"spit":{"period":0.0}}}"#, "spitter"),
            (r#"{"spitter":{"spit":{"range":-1.0}}}"#, "spitter"),
            (r#"{"grunt":{"contact_period":0.0}}"#, "grunt"),
            (r#"{"player":{"aim_smoothing":1.5}}"#, "player"),
            (r#"{"projectile":{"speed":0.0}}"#, "projectile"),
        ];
        for (json, expected) in cases {
            match Tuning::from_json(json) {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected, "{json}"),
                other => panic!("{json} should be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut tuning = Tuning::default();
        tuning.camera.max_shake = f32::NAN;
        assert!(matches!(tuning.validate(), Err(ConfigError::Invalid { field: "camera", .. })));

        let mut tuning = Tuning::default();
        tuning.grunt.fuse = f32::INFINITY;
        assert!(matches!(tuning.validate(), Err(ConfigError::Invalid { field: "grunt", .. })));
    }
}
