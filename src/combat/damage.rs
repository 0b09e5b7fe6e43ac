//! Damage resolution
//!
//! Applies damage between the two sides:
//! - Player strikes deal the pipeline output to the enemy
//! - Enemy strikes deal the tier's attack (flat or dice notation) to the player

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dice::{parse_dice, DiceError, DiceRoll};
use super::state::CombatantState;

/// How hard the enemy hits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EnemyAttack {
    /// Same damage every turn
    Flat(i32),
    /// Rolled every turn, e.g. "1d6+30"
    Dice(DiceRoll),
}

impl EnemyAttack {
    /// Damage for one enemy turn
    pub fn roll<R: Rng>(&self, rng: &mut R) -> i32 {
        match self {
            EnemyAttack::Flat(n) => *n,
            EnemyAttack::Dice(roll) => roll.roll(rng),
        }
    }

    /// Dice attacks must stay within the notation bounds
    pub fn check(&self) -> Result<(), DiceError> {
        match self {
            EnemyAttack::Flat(_) => Ok(()),
            EnemyAttack::Dice(roll) => roll.check(),
        }
    }
}

impl FromStr for EnemyAttack {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<i32>() {
            Ok(n) => Ok(EnemyAttack::Flat(n)),
            Err(_) => parse_dice(s).map(EnemyAttack::Dice),
        }
    }
}

impl TryFrom<String> for EnemyAttack {
    type Error = DiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EnemyAttack> for String {
    fn from(attack: EnemyAttack) -> Self {
        attack.to_string()
    }
}

impl fmt::Display for EnemyAttack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnemyAttack::Flat(n) => write!(f, "{}", n),
            EnemyAttack::Dice(roll) => write!(f, "{}", roll),
        }
    }
}

/// Result of one strike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StrikeResult {
    /// Damage the strike carried
    pub damage: i32,
    /// HP actually removed after clamping
    pub dealt: i32,
    /// Target HP after the strike
    pub remaining_hp: i32,
    /// Whether the target reached zero
    pub defeated: bool,
}

/// Applies damage to combatants
pub struct CombatResolver;

impl CombatResolver {
    /// Apply a player strike to the enemy
    pub fn player_strike(enemy: &mut CombatantState, damage: i32) -> StrikeResult {
        let result = Self::strike(enemy, damage);
        debug!(
            "Enemy took {} damage ({} carried), HP {}/{}",
            result.dealt,
            damage,
            enemy.hp(),
            enemy.max_hp()
        );
        result
    }

    /// Roll the enemy's attack and apply it to the player
    pub fn enemy_strike<R: Rng>(
        player: &mut CombatantState,
        attack: &EnemyAttack,
        rng: &mut R,
    ) -> StrikeResult {
        let damage = attack.roll(rng);
        let result = Self::strike(player, damage);
        debug!(
            "Player took {} damage ({}), HP {}/{}",
            result.dealt,
            attack,
            player.hp(),
            player.max_hp()
        );
        result
    }

    fn strike(target: &mut CombatantState, damage: i32) -> StrikeResult {
        let dealt = target.take_damage(damage);
        StrikeResult {
            damage,
            dealt,
            remaining_hp: target.hp(),
            defeated: target.is_dead(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_player_strike() {
        let mut enemy = CombatantState::new(50);
        let result = CombatResolver::player_strike(&mut enemy, 10);
        assert_eq!(result.dealt, 10);
        assert_eq!(result.remaining_hp, 40);
        assert!(!result.defeated);
    }

    #[test]
    fn test_overkill_clamps() {
        let mut enemy = CombatantState::new(50);
        enemy.set_hp(3);
        let result = CombatResolver::player_strike(&mut enemy, 10);
        assert_eq!(result.damage, 10);
        assert_eq!(result.dealt, 3);
        assert_eq!(result.remaining_hp, 0);
        assert!(result.defeated);
    }

    #[test]
    fn test_negative_strike_never_heals() {
        let mut enemy = CombatantState::new(50);
        enemy.set_hp(30);
        let result = CombatResolver::player_strike(&mut enemy, -8);
        assert_eq!(result.dealt, 0);
        assert_eq!(enemy.hp(), 30);
    }

    #[test]
    fn test_enemy_flat_strike() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut player = CombatantState::new(100);
        player.set_hp(4);

        let result = CombatResolver::enemy_strike(&mut player, &EnemyAttack::Flat(5), &mut rng);
        assert_eq!(result.damage, 5);
        assert_eq!(result.dealt, 4);
        assert!(result.defeated);
        assert_eq!(player.hp(), 0);
    }

    #[test]
    fn test_enemy_dice_strike_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let attack: EnemyAttack = "1d6+30".parse().unwrap();
        for _ in 0..50 {
            let mut player = CombatantState::new(100);
            let result = CombatResolver::enemy_strike(&mut player, &attack, &mut rng);
            assert!((31..=36).contains(&result.damage));
            assert_eq!(player.hp(), 100 - result.damage);
        }
    }

    #[test]
    fn test_attack_parsing() {
        assert_eq!("33".parse::<EnemyAttack>(), Ok(EnemyAttack::Flat(33)));
        assert_eq!(
            "2d4-1".parse::<EnemyAttack>(),
            Ok(EnemyAttack::Dice(DiceRoll::new(2, 4, -1)))
        );
        assert!("lots".parse::<EnemyAttack>().is_err());
        assert!("1d6+2147483647".parse::<EnemyAttack>().is_err());
        assert!(EnemyAttack::Dice(DiceRoll::new(1, 6, i32::MAX)).check().is_err());
        assert!(EnemyAttack::Flat(i32::MAX).check().is_ok());
        assert_eq!(EnemyAttack::Flat(33).to_string(), "33");
        assert_eq!(
            EnemyAttack::Dice(DiceRoll::new(1, 6, 30)).to_string(),
            "1d6+30"
        );
    }
}
