//! Combatant state tracking
//!
//! Hit points for one side of a battle. Every mutation clamps to
//! `0..=max_hp`.

use rand::Rng;
use serde::Serialize;

/// Current and maximum hit points for one combatant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CombatantState {
    hp: i32,
    max_hp: i32,
}

impl CombatantState {
    /// Create a combatant at full health
    pub fn new(max_hp: i32) -> Self {
        debug_assert!(max_hp > 0, "max_hp must be positive, got {}", max_hp);
        Self { hp: max_hp, max_hp }
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    /// Check if the combatant is dead
    pub fn is_dead(&self) -> bool {
        self.hp == 0
    }

    /// Set hit points directly, clamped into range
    pub fn set_hp(&mut self, hp: i32) {
        self.hp = hp.clamp(0, self.max_hp);
        self.check_invariant();
    }

    /// Take damage. Negative amounts count as zero. Returns HP actually lost.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let actual = amount.max(0).min(self.hp);
        self.hp -= actual;
        self.check_invariant();
        actual
    }

    /// Replace max HP and restore to full
    pub fn reset(&mut self, max_hp: i32) {
        *self = Self::new(max_hp);
    }

    fn check_invariant(&self) {
        debug_assert!(
            (0..=self.max_hp).contains(&self.hp),
            "hp {} outside [0, {}]",
            self.hp,
            self.max_hp
        );
    }
}

/// Draw a weakness threshold in `[max_hp/4, max_hp/2)`.
/// Collapses to `max_hp/4` when that range is empty.
pub fn weakness_threshold<R: Rng>(rng: &mut R, max_hp: i32) -> i32 {
    let low = max_hp / 4;
    let high = max_hp / 2;
    if high > low {
        rng.random_range(low..high)
    } else {
        low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_combatant_state() {
        let mut state = CombatantState::new(100);
        assert!(!state.is_dead());
        assert_eq!(state.hp(), 100);

        assert_eq!(state.take_damage(30), 30);
        assert_eq!(state.hp(), 70);
        assert_eq!(state.max_hp(), 100);
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut state = CombatantState::new(50);
        assert_eq!(state.take_damage(500), 50);
        assert_eq!(state.hp(), 0);
        assert!(state.is_dead());

        let mut exact = CombatantState::new(50);
        exact.take_damage(50);
        assert!(exact.is_dead());
    }

    #[test]
    fn test_zero_and_negative_damage() {
        let mut state = CombatantState::new(50);
        state.set_hp(20);
        assert_eq!(state.take_damage(0), 0);
        assert_eq!(state.take_damage(-15), 0);
        assert_eq!(state.hp(), 20);
    }

    #[test]
    fn test_set_hp_clamps() {
        let mut state = CombatantState::new(10);
        state.set_hp(25);
        assert_eq!(state.hp(), 10);
        state.set_hp(-3);
        assert_eq!(state.hp(), 0);

        state.reset(40);
        assert_eq!((state.hp(), state.max_hp()), (40, 40));
    }

    #[test]
    fn test_weakness_threshold_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let t = weakness_threshold(&mut rng, 100);
            assert!((25..50).contains(&t), "threshold {} out of range", t);
        }
        assert_eq!(weakness_threshold(&mut rng, 3), 0);
        assert_eq!(weakness_threshold(&mut rng, 5), 1);
    }
}
