//! dicebattle - turn-based dice combat engine
//!
//! Roll dice, run the total through a pipeline of modifiers, hit the enemy,
//! survive its answer, and pick a new modifier after every win.

pub mod battle;
pub mod combat;
pub mod config;

pub use battle::{BattleController, BattleError, BattleEvent, BattleSnapshot, Phase};
pub use config::{BattleConfig, ConfigError, EncounterTier};
