//! Battle Test Harness
//!
//! - `BattleBuilder` - Controller with scripted dice, no enemy delay and a
//!   fixed seed, so scenarios are reproducible
//!
//! # Example
//!
//! ```rust,ignore
//! let mut battle = BattleBuilder::new().enemy(50, 5).faces(&[3, 3, 4]).build();
//! battle.on_roll_intent().unwrap();
//! ```

#![allow(dead_code)]

use dicebattle::combat::{EnemyAttack, ModifierKind, ScriptedDice, StrikeResult};
use dicebattle::{BattleConfig, BattleController, EncounterTier};

/// Builds controllers for scenario tests
pub struct BattleBuilder {
    config: BattleConfig,
    faces: Vec<u32>,
}

impl BattleBuilder {
    /// 50 HP on both sides, flat 5 enemy damage, dice always 3+3+4
    pub fn new() -> Self {
        Self {
            config: BattleConfig {
                player_max_hp: 50,
                enemy_delay_ms: 0,
                seed: Some(7),
                reward_pool: Vec::new(),
                tiers: vec![EncounterTier {
                    enemy_max_hp: 50,
                    enemy_attack: EnemyAttack::Flat(5),
                }],
                ..Default::default()
            },
            faces: vec![3, 3, 4],
        }
    }

    pub fn player_hp(mut self, hp: i32) -> Self {
        self.config.player_max_hp = hp;
        self
    }

    /// Replace all tiers with a single one
    pub fn enemy(mut self, hp: i32, damage: i32) -> Self {
        self.config.tiers = vec![tier(hp, damage)];
        self
    }

    pub fn tiers(mut self, tiers: Vec<EncounterTier>) -> Self {
        self.config.tiers = tiers;
        self
    }

    pub fn faces(mut self, faces: &[u32]) -> Self {
        self.faces = faces.to_vec();
        self
    }

    pub fn dice_count(mut self, count: usize) -> Self {
        self.config.dice_count = count;
        self
    }

    pub fn skills(mut self, skills: &[ModifierKind]) -> Self {
        self.config.starting_skills = skills.to_vec();
        self
    }

    pub fn rewards(mut self, pool: &[ModifierKind]) -> Self {
        self.config.reward_pool = pool.to_vec();
        self
    }

    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.config.enemy_delay_ms = ms;
        self
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn build(self) -> BattleController {
        BattleController::with_dice(self.config, ScriptedDice::new(&self.faces))
            .expect("test config should be valid")
    }
}

pub fn tier(hp: i32, damage: i32) -> EncounterTier {
    EncounterTier {
        enemy_max_hp: hp,
        enemy_attack: EnemyAttack::Flat(damage),
    }
}

/// Roll, then commit right away
pub fn roll_and_commit(battle: &mut BattleController) -> StrikeResult {
    battle.on_roll_intent().expect("roll failed");
    battle.on_commit_intent().expect("commit failed")
}
