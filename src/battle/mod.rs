//! Battle state machine
//!
//! Turns player intents (roll, commit, toggle, pick reward) into phase
//! transitions and notifies subscribers of every state change.

mod controller;
mod event;
mod phase;

pub use controller::{BattleController, BattleError, BattleSnapshot, SkillView};
pub use event::{BattleEvent, Side};
pub use phase::{InputAffordances, Intent, Phase};
