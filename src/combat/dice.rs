//! Dice rolling system
//!
//! Two concerns live here:
//! - Player dice: a `DiceSet` of d6 faces produced by a `DiceSource`
//! - Dice notation like "2d6+3" used for enemy attack strength

use std::str::FromStr;

use rand::rngs::StdRng;
use rand::Rng;
use thiserror::Error;
use tracing::debug;

/// Faces on every player die
pub const DIE_SIDES: u32 = 6;

/// Smallest allowed dice count per roll
pub const MIN_DICE: usize = 1;

/// Largest allowed dice count per roll
pub const MAX_DICE: usize = 10;

/// Largest dice count accepted in notation
pub const MAX_NOTATION_DICE: u32 = 100;

/// Errors produced while parsing dice notation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("missing 'd' in dice notation: {0}")]
    MissingSeparator(String),

    #[error("invalid dice count: {0}")]
    InvalidCount(String),

    #[error("invalid die sides: {0}")]
    InvalidSides(String),

    #[error("invalid modifier: {0}")]
    InvalidModifier(String),

    #[error("too many dice: {0} (max {max})", max = MAX_NOTATION_DICE)]
    TooManyDice(u32),

    #[error("{0} can total outside the i32 range")]
    OutOfRange(String),
}

/// The faces produced by one roll intent, in roll order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiceSet {
    faces: Vec<u32>,
}

impl DiceSet {
    /// Wrap already-rolled faces
    pub fn new(faces: Vec<u32>) -> Self {
        debug_assert!(
            faces.iter().all(|f| (1..=DIE_SIDES).contains(f)),
            "die face out of range: {:?}",
            faces
        );
        Self { faces }
    }

    pub fn faces(&self) -> &[u32] {
        &self.faces
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Sum of all faces
    pub fn total(&self) -> i32 {
        self.faces.iter().sum::<u32>() as i32
    }
}

/// Anything that can produce a fresh set of d6 faces
pub trait DiceSource: Send {
    fn roll(&mut self, count: usize) -> DiceSet;
}

/// Roll `count` independent d6 using the given generator
pub fn roll_faces<R: Rng>(rng: &mut R, count: usize) -> DiceSet {
    debug_assert!(
        (MIN_DICE..=MAX_DICE).contains(&count),
        "dice count {} outside [{}, {}]",
        count,
        MIN_DICE,
        MAX_DICE
    );

    let faces = (0..count)
        .map(|_| rng.random_range(1..=DIE_SIDES))
        .collect::<Vec<_>>();
    debug!("Rolled {:?}", faces);
    DiceSet::new(faces)
}

/// Uniform dice backed by a seedable generator
#[derive(Debug, Clone)]
pub struct RandomDice {
    rng: StdRng,
}

impl RandomDice {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }
}

impl DiceSource for RandomDice {
    fn roll(&mut self, count: usize) -> DiceSet {
        roll_faces(&mut self.rng, count)
    }
}

/// Dice that replay a fixed face sequence, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    faces: Vec<u32>,
    cursor: usize,
}

impl ScriptedDice {
    /// Replay `faces` in order.
    ///
    /// # Panics
    ///
    /// Panics if `faces` is empty or holds a value outside `1..=6`.
    pub fn new(faces: &[u32]) -> Self {
        let faces = faces.to_vec();
        assert!(!faces.is_empty(), "scripted dice need at least one face");
        assert!(
            faces.iter().all(|f| (1..=DIE_SIDES).contains(f)),
            "scripted face out of range: {:?}",
            faces
        );
        Self { faces, cursor: 0 }
    }
}

impl DiceSource for ScriptedDice {
    fn roll(&mut self, count: usize) -> DiceSet {
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.faces[self.cursor % self.faces.len()]);
            self.cursor += 1;
        }
        DiceSet::new(out)
    }
}

/// A parsed dice roll specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceRoll {
    /// Number of dice to roll
    pub count: u32,
    /// Number of sides per die
    pub sides: u32,
    /// Modifier to add/subtract
    pub modifier: i32,
}

impl DiceRoll {
    pub fn new(count: u32, sides: u32, modifier: i32) -> Self {
        Self {
            count,
            sides,
            modifier,
        }
    }

    /// Roll the dice and return the total, saturating at the i32 bounds
    pub fn roll<R: Rng>(&self, rng: &mut R) -> i32 {
        let sum = (0..self.count).fold(0i32, |acc, _| {
            let face = rng.random_range(1..=self.sides);
            acc.saturating_add(i32::try_from(face).unwrap_or(i32::MAX))
        });
        sum.saturating_add(self.modifier)
    }

    /// Get the minimum possible result, if it fits in an i32
    pub fn min(&self) -> Option<i32> {
        self.bound(1)
    }

    /// Get the maximum possible result, if it fits in an i32
    pub fn max(&self) -> Option<i32> {
        self.bound(self.sides)
    }

    fn bound(&self, per_die: u32) -> Option<i32> {
        let dice = i64::from(self.count).checked_mul(i64::from(per_die))?;
        let total = dice.checked_add(i64::from(self.modifier))?;
        i32::try_from(total).ok()
    }

    /// Reject rolls with too many dice or a total that cannot fit an i32
    pub fn check(&self) -> Result<(), DiceError> {
        if self.count > MAX_NOTATION_DICE {
            return Err(DiceError::TooManyDice(self.count));
        }
        if self.min().is_none() || self.max().is_none() {
            return Err(DiceError::OutOfRange(self.to_string()));
        }
        Ok(())
    }
}

impl FromStr for DiceRoll {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dice(s)
    }
}

impl std::fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifier > 0 {
            write!(f, "{}d{}+{}", self.count, self.sides, self.modifier)
        } else if self.modifier < 0 {
            write!(f, "{}d{}{}", self.count, self.sides, self.modifier)
        } else {
            write!(f, "{}d{}", self.count, self.sides)
        }
    }
}

/// Parse a dice notation string like "2d6+3"
pub fn parse_dice(notation: &str) -> Result<DiceRoll, DiceError> {
    let notation = notation.trim().to_lowercase();

    let d_pos = notation
        .find('d')
        .ok_or_else(|| DiceError::MissingSeparator(notation.clone()))?;

    // "d6" means "1d6"
    let count_str = &notation[..d_pos];
    let count: u32 = if count_str.is_empty() {
        1
    } else {
        count_str
            .parse()
            .map_err(|_| DiceError::InvalidCount(count_str.to_string()))?
    };
    if count == 0 {
        return Err(DiceError::InvalidCount(count_str.to_string()));
    }

    let rest = &notation[d_pos + 1..];
    let (sides_str, modifier) = if let Some(plus_pos) = rest.find('+') {
        let mod_str = &rest[plus_pos + 1..];
        let modifier: i32 = mod_str
            .parse()
            .map_err(|_| DiceError::InvalidModifier(mod_str.to_string()))?;
        (&rest[..plus_pos], modifier)
    } else if let Some(minus_pos) = rest.rfind('-').filter(|&p| p > 0) {
        // keep the sign with the modifier
        let mod_str = &rest[minus_pos..];
        let modifier: i32 = mod_str
            .parse()
            .map_err(|_| DiceError::InvalidModifier(mod_str.to_string()))?;
        (&rest[..minus_pos], modifier)
    } else {
        (rest, 0)
    };

    let sides: u32 = sides_str
        .parse()
        .map_err(|_| DiceError::InvalidSides(sides_str.to_string()))?;
    if sides == 0 {
        return Err(DiceError::InvalidSides(sides_str.to_string()));
    }

    let roll = DiceRoll {
        count,
        sides,
        modifier,
    };
    roll.check()?;
    Ok(roll)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_roll_faces_count_and_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for count in MIN_DICE..=MAX_DICE {
            for _ in 0..50 {
                let set = roll_faces(&mut rng, count);
                assert_eq!(set.len(), count);
                assert!(set.faces().iter().all(|f| (1..=6).contains(f)));
            }
        }
    }

    #[test]
    fn test_seeded_dice_are_reproducible() {
        let mut a = RandomDice::new(StdRng::seed_from_u64(42));
        let mut b = RandomDice::new(StdRng::seed_from_u64(42));
        for _ in 0..10 {
            assert_eq!(a.roll(5), b.roll(5));
        }
    }

    #[test]
    fn test_scripted_dice_cycle() {
        let mut dice = ScriptedDice::new(&[3, 3, 4]);
        let first = dice.roll(3);
        assert_eq!(first.faces(), &[3, 3, 4]);
        assert_eq!(first.total(), 10);

        let second = dice.roll(4);
        assert_eq!(second.faces(), &[3, 3, 4, 3]);
    }

    #[test]
    fn test_empty_set_total() {
        assert_eq!(DiceSet::default().total(), 0);
        assert!(DiceSet::default().is_empty());
    }

    #[test]
    fn test_parse_basic() {
        let roll = parse_dice("2d6").unwrap();
        assert_eq!(roll, DiceRoll::new(2, 6, 0));
    }

    #[test]
    fn test_parse_with_modifiers() {
        assert_eq!(parse_dice("1d6+30").unwrap(), DiceRoll::new(1, 6, 30));
        assert_eq!(parse_dice("3d8-2").unwrap(), DiceRoll::new(3, 8, -2));
        assert_eq!(parse_dice("  D4 ").unwrap(), DiceRoll::new(1, 4, 0));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            parse_dice("abc"),
            Err(DiceError::MissingSeparator(_))
        ));
        assert!(matches!(parse_dice("2d"), Err(DiceError::InvalidSides(_))));
        assert!(matches!(parse_dice("0d6"), Err(DiceError::InvalidCount(_))));
        assert!(matches!(parse_dice("2d0"), Err(DiceError::InvalidSides(_))));
        assert!(matches!(
            parse_dice("1d6+x"),
            Err(DiceError::InvalidModifier(_))
        ));
    }

    #[test]
    fn test_notation_roll_bounds() {
        let roll = DiceRoll::new(1, 6, 30);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let value = roll.roll(&mut rng);
            assert!((31..=36).contains(&value));
        }
        assert_eq!(roll.min(), Some(31));
        assert_eq!(roll.max(), Some(36));
    }

    #[test]
    fn test_notation_rejects_overflowing_totals() {
        assert!(matches!(
            parse_dice("1d6+2147483647"),
            Err(DiceError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_dice("4294967295d6"),
            Err(DiceError::TooManyDice(4294967295))
        ));
        assert!(matches!(
            parse_dice("2d4294967295"),
            Err(DiceError::OutOfRange(_))
        ));
        assert!(parse_dice("100d6-2147483648").is_ok());
        assert_eq!(DiceRoll::new(1, 6, i32::MAX).max(), None);
    }

    #[test]
    fn test_unchecked_roll_saturates() {
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(DiceRoll::new(1, 6, i32::MAX).roll(&mut rng), i32::MAX);
        assert!(DiceRoll::new(3, u32::MAX, 0).roll(&mut rng) > 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(DiceRoll::new(2, 6, 0).to_string(), "2d6");
        assert_eq!(DiceRoll::new(1, 20, 5).to_string(), "1d20+5");
        assert_eq!(DiceRoll::new(3, 8, -2).to_string(), "3d8-2");
    }
}
