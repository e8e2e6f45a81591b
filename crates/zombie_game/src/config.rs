// crates/zombie_game/src/config.rs
//! Gameplay tuning. Every field has a default, so a config file only needs
//! the values it changes.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub(crate) fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Longest frame delta handed to the level, in seconds.
    pub max_dt: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { max_dt: 0.25 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub speed: f32,
    pub health: i32,
    pub immunity_ms: u64,
    /// Player positions stay strictly inside `(-bound, bound)` on X and Z.
    pub bound: f32,
    /// Yaw speed of the look keys, radians per second.
    pub look_speed: f32,
    /// Radians of yaw per pixel of pointer drag.
    pub drag_sensitivity: f32,
    pub box_reach: f32,
    pub box_cost: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 4.0,
            health: 3,
            immunity_ms: 1000,
            bound: 75.0,
            look_speed: 2.0,
            drag_sensitivity: 0.01,
            box_reach: 1.3,
            box_cost: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GunConfig {
    pub capacity: u32,
    pub reload_ms: u64,
    pub shoot_delay_ms: u64,
    pub hit_delay_ms: u64,
    pub range: f32,
    pub damage: i32,
    pub hit_score: u32,
    pub kill_bonus: u32,
    pub hitmarker_ms: u64,
}

impl Default for GunConfig {
    fn default() -> Self {
        Self {
            capacity: 20,
            reload_ms: 1500,
            shoot_delay_ms: 200,
            hit_delay_ms: 50,
            range: 30.0,
            damage: 1,
            hit_score: 10,
            kill_bonus: 50,
            hitmarker_ms: 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZombieConfig {
    pub speed: f32,
    pub speed_per_round: f32,
    pub max_speed: f32,
    pub health: i32,
    /// Sense refreshes per second.
    pub sense_hz: f32,
    pub contact_radius: f32,
    pub contact_damage: i32,
}

impl Default for ZombieConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            speed_per_round: 0.05,
            max_speed: 2.0,
            health: 2,
            sense_hz: 60.0,
            contact_radius: 0.5,
            contact_damage: 1,
        }
    }
}

impl ZombieConfig {
    /// Falls back to the default rate when `sense_hz` gives no usable period.
    pub fn sense_period(&self) -> Duration {
        Duration::try_from_secs_f32(1.0 / self.sense_hz)
            .or_else(|_| Duration::try_from_secs_f32(1.0 / Self::default().sense_hz))
            .unwrap_or_default()
    }

    /// Health for a zombie of round `round`: one extra point every two rounds.
    pub fn health_for(&self, round: u32) -> i32 {
        let extra = round.saturating_sub(1) / 2;
        self.health + extra as i32
    }

    pub fn speed_for(&self, round: u32) -> f32 {
        let extra = self.speed_per_round * round.saturating_sub(1) as f32;
        (self.speed + extra).min(self.max_speed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    pub first_delay_ms: u64,
    pub later_delay_ms: u64,
    pub stagger_min_ms: u64,
    pub stagger_max_ms: u64,
    pub base_budget: u32,
    pub budget_step: u32,
    pub pace_ms: u64,
    pub poll_ms: u64,
    pub jitter: f32,
    pub spawn_height: f32,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            first_delay_ms: 2000,
            later_delay_ms: 8000,
            stagger_min_ms: 1000,
            stagger_max_ms: 2500,
            base_budget: 3,
            budget_step: 2,
            pace_ms: 5000,
            poll_ms: 200,
            jitter: 2.0,
            spawn_height: 1.5,
        }
    }
}

impl RoundConfig {
    pub fn pre_round_delay(&self, round: u32) -> Duration {
        if round == 1 {
            ms(self.first_delay_ms)
        } else {
            ms(self.later_delay_ms)
        }
    }

    /// Zombies each spawner emits during `round`.
    pub fn wave_budget(&self, round: u32) -> u32 {
        self.base_budget + self.budget_step * round.saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootConfig {
    /// Loot names with their weights, in selection order.
    pub entries: Vec<(String, f64)>,
    pub show_ms: u64,
    pub bomb_delay_ms: u64,
    pub bomb_duration_ms: u64,
    pub bomb_bonus: u32,
}

impl Default for LootConfig {
    fn default() -> Self {
        let entries = [("gun", 0.35), ("rifle", 0.25), ("rpg", 0.20), ("laser", 0.10), ("danceBomb", 0.10)];
        Self {
            entries: entries.iter().map(|(n, w)| (n.to_string(), *w)).collect(),
            show_ms: 2500,
            bomb_delay_ms: 350,
            bomb_duration_ms: 18_000,
            bomb_bonus: 1000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub frame: FrameConfig,
    pub player: PlayerConfig,
    pub gun: GunConfig,
    pub zombie: ZombieConfig,
    pub rounds: RoundConfig,
    pub loot: LootConfig,
    pub seed: Option<u64>,
}

impl GameConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron_str(&text)?;
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Loads `path` when given, falling back to defaults on any error.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        Self::load(path).unwrap_or_else(|err| {
            warn!(%err, "using default config");
            Self::default()
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.loot.entries.is_empty() {
            return Err(ConfigError::Invalid("loot table is empty".into()));
        }
        let total: f64 = self.loot.entries.iter().map(|(_, w)| w).sum();
        if (total - 1.0).abs() > 1e-6 || self.loot.entries.iter().any(|(_, w)| *w < 0.0) {
            return Err(ConfigError::Invalid(format!("loot weights sum to {total}, expected 1")));
        }
        if self.rounds.stagger_min_ms > self.rounds.stagger_max_ms {
            return Err(ConfigError::Invalid("stagger_min_ms is above stagger_max_ms".into()));
        }
        if self.gun.capacity == 0 {
            return Err(ConfigError::Invalid("gun capacity must be positive".into()));
        }
        if !(self.zombie.sense_hz.is_finite() && self.zombie.sense_hz >= 1.0) {
            return Err(ConfigError::Invalid("sense_hz must be at least 1".into()));
        }
        if !(self.frame.max_dt.is_finite() && self.frame.max_dt > 0.0) {
            return Err(ConfigError::Invalid("max_dt must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = GameConfig::from_ron_str("(gun: (capacity: 8), seed: Some(7))").unwrap();
        assert_eq!(config.gun.capacity, 8);
        assert_eq!(config.gun.reload_ms, 1500);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.player, PlayerConfig::default());
    }

    #[test]
    fn unusable_sense_rates_are_rejected() {
        for hz in ["0.0", "0.5", "1e-40"] {
            let text = format!("(zombie: (sense_hz: {hz}))");
            let err = GameConfig::from_ron_str(&text).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{hz}");
        }
        for sense_hz in [f32::INFINITY, f32::NAN] {
            let mut config = GameConfig::default();
            config.zombie.sense_hz = sense_hz;
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn sense_period_survives_degenerate_rates() {
        let default = ZombieConfig::default().sense_period();
        for sense_hz in [0.0, 1e-40, -3.0, f32::NAN] {
            let zombie = ZombieConfig { sense_hz, ..ZombieConfig::default() };
            assert_eq!(zombie.sense_period(), default);
        }
        let fast = ZombieConfig { sense_hz: 4.0, ..ZombieConfig::default() };
        assert_eq!(fast.sense_period(), Duration::from_millis(250));
    }

    #[test]
    fn bad_loot_weights_are_rejected() {
        let err = GameConfig::from_ron_str(r#"(loot: (entries: [("gun", 0.5)]))"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.ron");
        assert!(matches!(GameConfig::load(&path), Err(ConfigError::Io { .. })));
        assert_eq!(GameConfig::load_or_default(Some(&path)), GameConfig::default());
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.ron");
        fs::write(&path, "(rounds: (pace_ms: 100))").unwrap();
        assert_eq!(GameConfig::load(&path).unwrap().rounds.pace_ms, 100);
    }

    #[test]
    fn round_scaling() {
        let rounds = RoundConfig::default();
        assert_eq!(rounds.wave_budget(1), 3);
        assert_eq!(rounds.wave_budget(3), 7);
        assert_eq!(rounds.pre_round_delay(1), ms(2000));
        assert_eq!(rounds.pre_round_delay(2), ms(8000));

        let zombie = ZombieConfig::default();
        assert_eq!(zombie.health_for(1), 2);
        assert_eq!(zombie.health_for(3), 3);
        assert_eq!(zombie.speed_for(1), 1.0);
        assert_eq!(zombie.speed_for(100), 2.0);
    }
}
