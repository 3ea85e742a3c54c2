/// Tunables for one game session.
///
/// `GameConfig::default()` is the canonical ruleset.  A TOML file may
/// override any subset of fields; missing tables and keys keep their
/// defaults.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub player: PlayerConfig,
    pub render: RenderConfig,
    pub rules: RulesConfig,
    pub enemies: EnemyConfig,
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Cells per tick.
    pub move_speed: f64,
    /// Radians per tick.
    pub rot_speed: f64,
    /// Minimum milliseconds between footstep cues.
    pub footstep_interval_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            move_speed: 0.1,
            rot_speed: 0.05,
            footstep_interval_ms: 300,
        }
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    pub fov_degrees: f64,
    pub max_depth: f64,
    pub ray_step: f64,
    pub max_rays: usize,
    pub sprite_radius: f64,
    pub target_fps: u32,
}

impl RenderConfig {
    pub fn fov(&self) -> f64 {
        self.fov_degrees.to_radians()
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            fov_degrees: 60.0,
            max_depth: 20.0,
            ray_step: 0.15,
            max_rays: 240,
            sprite_radius: 15.0,
            target_fps: 50,
        }
    }
}

// ── Phase rules ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RulesConfig {
    pub pumpkin_count: usize,
    pub max_hp: i32,
    pub invincible_ms: u64,
    pub escape_duration_ms: u64,
    pub betrayal_ms: u64,
    pub guide_radius: f64,
    pub pickup_radius: f64,
    pub bat_radius: f64,
    pub contact_radius: f64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            pumpkin_count: 5,
            max_hp: 3,
            invincible_ms: 1000,
            escape_duration_ms: 60_000,
            betrayal_ms: 3000,
            guide_radius: 1.5,
            pickup_radius: 0.5,
            bat_radius: 1.0,
            contact_radius: 0.5,
        }
    }
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnemyConfig {
    pub ghost_speed: f64,
    pub witch_speed: f64,
    pub skeleton_speed: f64,
    pub cat_speed: f64,
    pub guide_speed: f64,
    /// Escape-time thresholds (ms) and the multiplier that applies from each.
    pub speed_tiers: Vec<(u64, f64)>,
    /// Cats turn once this much escape time (ms) or less remains.
    pub cats_turn_remaining_ms: u64,
    /// The guide turns hostile this long (ms) after the escape begins.
    pub guide_turns_after_ms: u64,
    pub magic_range: f64,
    pub magic_interval_ms: u64,
    pub magic_speed: f64,
    pub magic_lifetime_ms: u64,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        EnemyConfig {
            ghost_speed: 0.015,
            witch_speed: 0.015,
            skeleton_speed: 0.012,
            cat_speed: 0.018,
            guide_speed: 0.025,
            speed_tiers: vec![(30_000, 1.5), (45_000, 2.0)],
            cats_turn_remaining_ms: 30_000,
            guide_turns_after_ms: 10_000,
            magic_range: 3.0,
            magic_interval_ms: 3000,
            magic_speed: 0.05,
            magic_lifetime_ms: 5000,
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl GameConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.rules.max_hp <= 0 {
            return Err(ConfigError::Invalid("rules.max_hp must be positive".into()));
        }
        let positive = [
            ("player.move_speed", self.player.move_speed),
            ("render.ray_step", self.render.ray_step),
            ("render.max_depth", self.render.max_depth),
            ("render.sprite_radius", self.render.sprite_radius),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
        }
        if self.render.target_fps == 0 {
            return Err(ConfigError::Invalid("render.target_fps must be non-zero".into()));
        }
        if !(self.render.fov_degrees > 0.0 && self.render.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(
                "render.fov_degrees must be between 0 and 180".into(),
            ));
        }
        Ok(())
    }
}
