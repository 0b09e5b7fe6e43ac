//! Battle phase controller
//!
//! Owns one run of encounters and drives it through its phases:
//! - Roll and commit intents from the player
//! - The delayed enemy turn
//! - Victory rewards and the move to the next encounter
//!
//! Intents run one at a time to completion. An intent that arrives in the
//! wrong phase is rejected without touching any state.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::event::{BattleEvent, Side};
use super::phase::{InputAffordances, Intent, Phase};
use crate::combat::{
    weakness_threshold, CombatResolver, CombatantState, DiceSet, DiceSource, EnemyAttack,
    Modifier, ModifierPipeline, RandomDice, RewardOffer, RewardPool, SkillInventory, StrikeResult,
};
use crate::config::{BattleConfig, ConfigError};

/// Buffered events per subscriber before old ones are dropped
const EVENT_CAPACITY: usize = 64;

/// Errors returned by intent methods
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    #[error("{intent} is not allowed during {phase}")]
    IllegalTransition { intent: Intent, phase: Phase },

    #[error("no skill in slot {0}")]
    UnknownSlot(usize),

    #[error("{0} is not in the reward offer")]
    UnknownReward(String),

    #[error("enemy is still thinking ({0:?} left)")]
    TimerPending(Duration),
}

/// One-shot deadline for the enemy's action
#[derive(Debug, Clone, Copy)]
struct EnemyTimer {
    fire_at: Instant,
}

impl EnemyTimer {
    fn start(delay: Duration) -> Self {
        Self {
            fire_at: Instant::now() + delay,
        }
    }

    /// Time remaining until fire (zero if already due)
    fn remaining(&self) -> Duration {
        self.fire_at.saturating_duration_since(Instant::now())
    }
}

/// A skill as shown to the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillView {
    pub name: String,
    pub enabled: bool,
}

/// Read-only summary of the whole battle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BattleSnapshot {
    pub level: u32,
    pub phase: Phase,
    pub affordances: InputAffordances,
    pub player: CombatantState,
    pub enemy: CombatantState,
    pub weakness_threshold: i32,
    pub dice: Vec<u32>,
    pub raw_total: i32,
    pub preview_damage: Option<i32>,
    pub last_damage: Option<i32>,
    pub skills: Vec<SkillView>,
    pub reward_offer: Option<Vec<String>>,
}

/// The battle state machine
pub struct BattleController {
    config: BattleConfig,
    rng: StdRng,
    dice: Box<dyn DiceSource>,
    phase: Phase,
    level: u32,
    player: CombatantState,
    enemy: CombatantState,
    enemy_attack: EnemyAttack,
    weakness_threshold: i32,
    inventory: SkillInventory,
    reward_pool: RewardPool,
    reward_offer: Option<RewardOffer>,
    current_roll: DiceSet,
    preview_damage: Option<i32>,
    last_damage: Option<i32>,
    enemy_timer: Option<EnemyTimer>,
    events: broadcast::Sender<BattleEvent>,
}

impl std::fmt::Debug for BattleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleController")
            .field("phase", &self.phase)
            .field("level", &self.level)
            .field("player", &self.player)
            .field("enemy", &self.enemy)
            .finish()
    }
}

impl BattleController {
    /// Create a controller with random dice, seeded from the config if set
    pub fn new(config: BattleConfig) -> Result<Self, ConfigError> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let dice = RandomDice::new(StdRng::from_rng(&mut rng));
        Self::build(config, rng, Box::new(dice))
    }

    /// Create a controller with a specific dice source
    pub fn with_dice(
        config: BattleConfig,
        dice: impl DiceSource + 'static,
    ) -> Result<Self, ConfigError> {
        let rng = StdRng::seed_from_u64(config.seed.unwrap_or_default());
        Self::build(config, rng, Box::new(dice))
    }

    fn build(
        config: BattleConfig,
        rng: StdRng,
        dice: Box<dyn DiceSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let tier = config.tier(1);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let mut controller = Self {
            rng,
            dice,
            phase: Phase::PlayerTurn,
            level: 1,
            player: CombatantState::new(config.player_max_hp),
            enemy: CombatantState::new(tier.enemy_max_hp),
            enemy_attack: tier.enemy_attack,
            weakness_threshold: 0,
            inventory: SkillInventory::from_modifiers(
                config.starting_skills.iter().copied().map(Modifier::builtin),
            ),
            reward_pool: RewardPool::new(config.reward_pool.iter().copied().map(Modifier::builtin)),
            reward_offer: None,
            current_roll: DiceSet::default(),
            preview_damage: None,
            last_damage: None,
            enemy_timer: None,
            events,
            config,
        };
        controller.restart_level();
        Ok(controller)
    }

    /// Receive state-change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<BattleEvent> {
        self.events.subscribe()
    }

    /// Start the current level over: both sides at full HP, player to act.
    /// Refused while the enemy is acting or a victory is being resolved.
    pub fn start_new_level(&mut self) -> Result<(), BattleError> {
        self.guard(Intent::Restart)?;
        self.restart_level();
        Ok(())
    }

    /// Roll a fresh set of dice and preview the damage they would deal
    pub fn on_roll_intent(&mut self) -> Result<&DiceSet, BattleError> {
        self.guard(Intent::Roll)?;
        self.set_phase(Phase::Processing);

        self.current_roll = self.dice.roll(self.config.dice_count);
        debug_assert_eq!(self.current_roll.len(), self.config.dice_count);

        let preview = self.compute_damage();
        self.preview_damage = Some(preview);
        debug!(
            "Rolled {:?} (raw {}, preview {})",
            self.current_roll.faces(),
            self.current_roll.total(),
            preview
        );
        self.emit(BattleEvent::DiceRolled {
            faces: self.current_roll.faces().to_vec(),
            raw_total: self.current_roll.total(),
            preview_damage: preview,
        });

        self.set_phase(Phase::PlayerThinking);
        Ok(&self.current_roll)
    }

    /// Deal the current roll's damage to the enemy
    pub fn on_commit_intent(&mut self) -> Result<StrikeResult, BattleError> {
        self.guard(Intent::Commit)?;
        self.set_phase(Phase::Processing);

        let damage = self.compute_damage();
        self.preview_damage = None;
        self.last_damage = Some(damage);

        let result = CombatResolver::player_strike(&mut self.enemy, damage);
        self.emit(BattleEvent::DamageDealt {
            target: Side::Enemy,
            damage: result.damage,
            dealt: result.dealt,
            remaining_hp: result.remaining_hp,
        });

        if result.defeated {
            self.enter_victory();
        } else {
            self.enemy_timer = Some(EnemyTimer::start(self.config.enemy_delay()));
            self.set_phase(Phase::EnemyTurn);
        }
        Ok(result)
    }

    /// Flip a skill on or off, returning its new state
    pub fn on_toggle_modifier(&mut self, slot: usize) -> Result<bool, BattleError> {
        self.guard(Intent::Toggle)?;
        let enabled = self
            .inventory
            .toggle(slot)
            .ok_or(BattleError::UnknownSlot(slot))?;

        let name = self
            .inventory
            .get(slot)
            .map(|s| s.modifier().name().to_string())
            .unwrap_or_default();
        info!("Skill {} ({}) {}", slot, name, if enabled { "on" } else { "off" });
        self.emit(BattleEvent::SkillToggled {
            slot,
            name,
            enabled,
        });

        if self.phase == Phase::PlayerThinking {
            let preview = self.compute_damage();
            self.preview_damage = Some(preview);
            self.emit(BattleEvent::PreviewUpdated {
                preview_damage: preview,
            });
        }
        Ok(enabled)
    }

    /// Accept a modifier from the reward offer and move to the next encounter
    pub fn on_reward_pick(&mut self, name: &str) -> Result<Modifier, BattleError> {
        self.guard(Intent::PickReward)?;
        let modifier = self
            .reward_offer
            .as_ref()
            .and_then(|offer| offer.find(name))
            .cloned()
            .ok_or_else(|| BattleError::UnknownReward(name.to_string()))?;

        let slot = self.inventory.acquire(modifier.clone());
        info!("Acquired {} in slot {}", modifier.name(), slot);
        self.emit(BattleEvent::RewardAccepted {
            name: modifier.name().to_string(),
        });

        self.advance_level();
        Ok(modifier)
    }

    /// Resume after the enemy delay. Rejected while the delay is running.
    pub fn on_enemy_timer_elapsed(&mut self) -> Result<StrikeResult, BattleError> {
        self.guard(Intent::EnemyTimer)?;
        if let Some(remaining) = self.enemy_timer_remaining().filter(|r| !r.is_zero()) {
            return Err(BattleError::TimerPending(remaining));
        }
        Ok(self.resolve_enemy_turn())
    }

    /// Wait out the enemy delay, then let the enemy act
    pub async fn run_enemy_turn(&mut self) -> Result<StrikeResult, BattleError> {
        self.guard(Intent::EnemyTimer)?;
        if let Some(timer) = self.enemy_timer {
            tokio::time::sleep_until(timer.fire_at).await;
        }
        Ok(self.resolve_enemy_turn())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn affordances(&self) -> InputAffordances {
        self.phase.affordances(self.reward_offer.is_some())
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn player(&self) -> &CombatantState {
        &self.player
    }

    pub fn enemy(&self) -> &CombatantState {
        &self.enemy
    }

    pub fn enemy_attack(&self) -> EnemyAttack {
        self.enemy_attack
    }

    pub fn weakness_threshold(&self) -> i32 {
        self.weakness_threshold
    }

    /// Dice from the most recent roll
    pub fn dice(&self) -> &DiceSet {
        &self.current_roll
    }

    /// Unmodified sum of the most recent roll
    pub fn raw_total(&self) -> i32 {
        self.current_roll.total()
    }

    /// Damage the current roll would deal, while a commit is pending
    pub fn preview_damage(&self) -> Option<i32> {
        self.preview_damage
    }

    /// Damage carried by the last commit
    pub fn last_damage(&self) -> Option<i32> {
        self.last_damage
    }

    /// Enabled skills, in inventory order
    pub fn active_modifiers(&self) -> Vec<Modifier> {
        self.inventory.active_set()
    }

    pub fn inventory(&self) -> &SkillInventory {
        &self.inventory
    }

    pub fn reward_pool(&self) -> &RewardPool {
        &self.reward_pool
    }

    pub fn reward_offer(&self) -> Option<&RewardOffer> {
        self.reward_offer.as_ref()
    }

    /// Time until the enemy acts, while it is the enemy's turn
    pub fn enemy_timer_remaining(&self) -> Option<Duration> {
        self.enemy_timer.map(|t| t.remaining())
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            level: self.level,
            phase: self.phase,
            affordances: self.affordances(),
            player: self.player,
            enemy: self.enemy,
            weakness_threshold: self.weakness_threshold,
            dice: self.current_roll.faces().to_vec(),
            raw_total: self.raw_total(),
            preview_damage: self.preview_damage,
            last_damage: self.last_damage,
            skills: self
                .inventory
                .slots()
                .iter()
                .map(|s| SkillView {
                    name: s.modifier().name().to_string(),
                    enabled: s.is_enabled(),
                })
                .collect(),
            reward_offer: self.reward_offer.as_ref().map(RewardOffer::names),
        }
    }

    fn guard(&self, intent: Intent) -> Result<(), BattleError> {
        if intent.allowed_in(self.phase, self.reward_offer.is_some()) {
            Ok(())
        } else {
            warn!("Rejected {} during {}", intent, self.phase);
            Err(BattleError::IllegalTransition {
                intent,
                phase: self.phase,
            })
        }
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.phase;
        self.phase = to;
        debug!("Phase {} -> {}", from, to);
        self.emit(BattleEvent::PhaseChanged { from, to });
    }

    fn emit(&self, event: BattleEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Run the current roll through the enabled skills, scanned fresh
    fn compute_damage(&self) -> i32 {
        let active = self.inventory.active_set();
        ModifierPipeline::resolve(self.config.pipeline_mode, &self.current_roll, &active)
    }

    fn restart_level(&mut self) {
        self.player.reset(self.config.player_max_hp);
        self.begin_encounter();
    }

    fn begin_encounter(&mut self) {
        let tier = self.config.tier(self.level);
        self.enemy.reset(tier.enemy_max_hp);
        self.enemy_attack = tier.enemy_attack;
        self.weakness_threshold = weakness_threshold(&mut self.rng, tier.enemy_max_hp);
        self.reward_offer = None;
        self.current_roll = DiceSet::default();
        self.preview_damage = None;
        self.enemy_timer = None;

        info!(
            "Level {} begins: player {}/{}, enemy {}/{} (attack {}, weakness {})",
            self.level,
            self.player.hp(),
            self.player.max_hp(),
            self.enemy.hp(),
            self.enemy.max_hp(),
            self.enemy_attack,
            self.weakness_threshold
        );
        self.emit(BattleEvent::LevelStarted {
            level: self.level,
            player_hp: self.player.hp(),
            enemy_hp: self.enemy.hp(),
            weakness_threshold: self.weakness_threshold,
        });
        self.set_phase(Phase::PlayerTurn);
    }

    fn enter_victory(&mut self) {
        self.set_phase(Phase::Victory);
        info!("Victory! Enemy defeated at level {}", self.level);

        let offer = self.reward_pool.draw_offer(&mut self.rng);
        if offer.is_empty() {
            info!("Reward pool is empty, moving on");
            self.advance_level();
            return;
        }

        self.emit(BattleEvent::RewardOffered {
            choices: offer.names(),
        });
        self.reward_offer = Some(offer);
    }

    fn advance_level(&mut self) {
        self.level += 1;
        self.begin_encounter();
    }

    fn resolve_enemy_turn(&mut self) -> StrikeResult {
        self.enemy_timer = None;
        let result =
            CombatResolver::enemy_strike(&mut self.player, &self.enemy_attack, &mut self.rng);
        info!(
            "Player took {} damage. Current HP: {}",
            result.dealt,
            self.player.hp()
        );
        self.emit(BattleEvent::DamageDealt {
            target: Side::Player,
            damage: result.damage,
            dealt: result.dealt,
            remaining_hp: result.remaining_hp,
        });

        if result.defeated {
            info!("Defeat... the enemy was too strong");
            self.set_phase(Phase::Defeat);
        } else {
            self.set_phase(Phase::PlayerTurn);
        }
        result
    }
}
