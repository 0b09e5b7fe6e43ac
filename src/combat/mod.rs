//! Combat system module
//!
//! Implements dice combat with:
//! - Dice rolling (d6 sets for the player, "1d6+30" notation for enemies)
//! - Named roll modifiers and the ordered modifier pipeline
//! - Hit point tracking with clamping
//! - Damage resolution for both sides
//! - Victory reward offers

mod damage;
mod dice;
mod modifier;
mod pipeline;
mod reward;
mod state;

pub use damage::{CombatResolver, EnemyAttack, StrikeResult};
pub use dice::{
    parse_dice, roll_faces, DiceError, DiceRoll, DiceSet, DiceSource, RandomDice, ScriptedDice,
    DIE_SIDES, MAX_DICE, MAX_NOTATION_DICE, MIN_DICE,
};
pub use modifier::{Modifier, ModifierEffect, ModifierError, ModifierKind};
pub use pipeline::{ModifierPipeline, ModifierSlot, PipelineMode, SkillInventory};
pub use reward::{RewardOffer, RewardPool, OFFER_SIZE};
pub use state::{weakness_threshold, CombatantState};
