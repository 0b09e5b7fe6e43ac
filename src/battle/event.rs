//! Notifications for the presentation layer

use serde::Serialize;

use super::phase::Phase;

/// Which side of the battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Player,
    Enemy,
}

/// A state change the presentation layer may want to show
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BattleEvent {
    /// A new encounter began
    LevelStarted {
        level: u32,
        player_hp: i32,
        enemy_hp: i32,
        weakness_threshold: i32,
    },
    PhaseChanged {
        from: Phase,
        to: Phase,
    },
    DiceRolled {
        faces: Vec<u32>,
        raw_total: i32,
        preview_damage: i32,
    },
    /// Preview damage changed after a toggle
    PreviewUpdated {
        preview_damage: i32,
    },
    SkillToggled {
        slot: usize,
        name: String,
        enabled: bool,
    },
    DamageDealt {
        target: Side,
        damage: i32,
        dealt: i32,
        remaining_hp: i32,
    },
    RewardOffered {
        choices: Vec<String>,
    },
    RewardAccepted {
        name: String,
    },
}
