//! Battle configuration
//!
//! Layered with figment: built-in defaults, then an optional TOML file, then
//! `DICEBATTLE_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::{DiceError, EnemyAttack, ModifierKind, PipelineMode, MAX_DICE, MIN_DICE};

/// Default dice per roll
pub const DEFAULT_DICE_COUNT: usize = 3;

/// Default max HP for both sides
pub const DEFAULT_MAX_HP: i32 = 100;

/// Default flat enemy damage
pub const DEFAULT_ENEMY_DAMAGE: i32 = 33;

/// Default "enemy thinking" delay in milliseconds
pub const DEFAULT_ENEMY_DELAY_MS: u64 = 1000;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "DICEBATTLE_";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("config error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("dice_count {0} outside [{min}, {max}]", min = MIN_DICE, max = MAX_DICE)]
    DiceCount(usize),

    #[error("{0} max HP must be positive, got {1}")]
    MaxHp(&'static str, i32),

    #[error("at least one encounter tier is required")]
    NoTiers,

    #[error("tier {tier} enemy attack: {source}")]
    EnemyAttack { tier: usize, source: DiceError },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Figment(Box::new(err))
    }
}

/// Enemy stats for one encounter tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterTier {
    pub enemy_max_hp: i32,
    pub enemy_attack: EnemyAttack,
}

impl Default for EncounterTier {
    fn default() -> Self {
        Self {
            enemy_max_hp: DEFAULT_MAX_HP,
            enemy_attack: EnemyAttack::Flat(DEFAULT_ENEMY_DAMAGE),
        }
    }
}

/// Battle configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Dice rolled per roll intent
    pub dice_count: usize,
    /// Player max HP
    pub player_max_hp: i32,
    /// Delay before the enemy acts, in milliseconds
    pub enemy_delay_ms: u64,
    /// Where modifiers are applied to a roll
    pub pipeline_mode: PipelineMode,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
    /// Modifiers the player starts with
    pub starting_skills: Vec<ModifierKind>,
    /// Modifiers that can be won
    pub reward_pool: Vec<ModifierKind>,
    /// Enemy stats by level; the last tier repeats
    pub tiers: Vec<EncounterTier>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            dice_count: DEFAULT_DICE_COUNT,
            player_max_hp: DEFAULT_MAX_HP,
            enemy_delay_ms: DEFAULT_ENEMY_DELAY_MS,
            pipeline_mode: PipelineMode::Aggregate,
            seed: None,
            starting_skills: Vec::new(),
            reward_pool: vec![
                ModifierKind::Double,
                ModifierKind::AddOne,
                ModifierKind::Add(3),
                ModifierKind::Add(5),
                ModifierKind::Multiply(3),
                ModifierKind::Square,
            ],
            tiers: vec![EncounterTier::default()],
        }
    }
}

impl BattleConfig {
    /// The layered figment used by [`BattleConfig::load`]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(BattleConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load and validate configuration
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
        }

        let config: BattleConfig = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Check bounds that the type system cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_DICE..=MAX_DICE).contains(&self.dice_count) {
            return Err(ConfigError::DiceCount(self.dice_count));
        }
        if self.player_max_hp <= 0 {
            return Err(ConfigError::MaxHp("player", self.player_max_hp));
        }
        if self.tiers.is_empty() {
            return Err(ConfigError::NoTiers);
        }
        for (idx, tier) in self.tiers.iter().enumerate() {
            if tier.enemy_max_hp <= 0 {
                return Err(ConfigError::MaxHp("enemy", tier.enemy_max_hp));
            }
            tier.enemy_attack.check().map_err(|source| ConfigError::EnemyAttack {
                tier: idx + 1,
                source,
            })?;
        }
        Ok(())
    }

    /// Tier for a 1-based level
    pub fn tier(&self, level: u32) -> EncounterTier {
        let idx = (level.saturating_sub(1) as usize).min(self.tiers.len().saturating_sub(1));
        self.tiers.get(idx).copied().unwrap_or_default()
    }

    pub fn enemy_delay(&self) -> Duration {
        Duration::from_millis(self.enemy_delay_ms)
    }
}
