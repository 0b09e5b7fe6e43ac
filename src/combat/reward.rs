//! Victory rewards
//!
//! After a win the player is offered up to three distinct modifiers drawn
//! from the reward pool. Offered entries leave the pool whether or not they
//! are picked.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::modifier::Modifier;

/// Maximum number of modifiers in one offer
pub const OFFER_SIZE: usize = 3;

/// Modifiers still available as rewards
#[derive(Debug, Clone, Default)]
pub struct RewardPool {
    entries: Vec<Modifier>,
}

impl RewardPool {
    pub fn new(entries: impl IntoIterator<Item = Modifier>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn entries(&self) -> &[Modifier] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Draw up to [`OFFER_SIZE`] modifiers with distinct names, uniformly
    /// without replacement. Drawn entries are removed from the pool.
    pub fn draw_offer<R: Rng>(&mut self, rng: &mut R) -> RewardOffer {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.shuffle(rng);

        let mut picked: Vec<usize> = Vec::with_capacity(OFFER_SIZE);
        for idx in order {
            if picked.len() == OFFER_SIZE {
                break;
            }
            let name = self.entries[idx].name();
            if picked.iter().all(|&p| self.entries[p].name() != name) {
                picked.push(idx);
            }
        }

        // Remove from the back so earlier indices stay valid
        let mut removal = picked.clone();
        removal.sort_unstable_by(|a, b| b.cmp(a));
        let mut drawn: Vec<(usize, Modifier)> = removal
            .into_iter()
            .map(|idx| (idx, self.entries.remove(idx)))
            .collect();

        // Keep the shuffled order for presentation
        drawn.sort_by_key(|(idx, _)| picked.iter().position(|p| p == idx));
        let choices: Vec<Modifier> = drawn.into_iter().map(|(_, m)| m).collect();

        debug!(
            "Reward offer: {:?} ({} left in pool)",
            choices.iter().map(Modifier::name).collect::<Vec<_>>(),
            self.entries.len()
        );
        RewardOffer { choices }
    }
}

/// The modifiers presented after a victory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewardOffer {
    choices: Vec<Modifier>,
}

impl RewardOffer {
    pub fn choices(&self) -> &[Modifier] {
        &self.choices
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Find an offered modifier by name
    pub fn find(&self, name: &str) -> Option<&Modifier> {
        self.choices.iter().find(|m| m.name() == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.choices.iter().map(|m| m.name().to_string()).collect()
    }
}
