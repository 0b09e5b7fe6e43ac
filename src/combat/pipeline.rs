//! Modifier pipeline
//!
//! Handles the path from dice to damage:
//! - Modifier slots with an enabled flag
//! - The player's permanent skill inventory
//! - Left-fold application of the enabled modifiers, in container order

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dice::DiceSet;
use super::modifier::Modifier;

/// Where the pipeline is applied to a roll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineMode {
    /// Once, to the sum of all dice
    #[default]
    Aggregate,
    /// To every die separately, then summed
    PerDie,
}

/// A modifier plus its enabled flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifierSlot {
    modifier: Modifier,
    enabled: bool,
}

impl ModifierSlot {
    /// Create an enabled slot
    pub fn new(modifier: Modifier) -> Self {
        Self {
            modifier,
            enabled: true,
        }
    }

    pub fn modifier(&self) -> &Modifier {
        &self.modifier
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Flip the enabled flag, returning the new value
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }
}

/// The player's permanent modifiers, in acquisition order
#[derive(Debug, Clone, Default)]
pub struct SkillInventory {
    slots: Vec<ModifierSlot>,
}

impl SkillInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given modifiers, all enabled
    pub fn from_modifiers(modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        Self {
            slots: modifiers.into_iter().map(ModifierSlot::new).collect(),
        }
    }

    /// Append a newly acquired modifier as an enabled slot, returning its index
    pub fn acquire(&mut self, modifier: Modifier) -> usize {
        self.slots.push(ModifierSlot::new(modifier));
        self.slots.len() - 1
    }

    /// Toggle a slot. Returns the new flag, or None if the slot does not exist.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        self.slots.get_mut(index).map(ModifierSlot::toggle)
    }

    pub fn get(&self, index: usize) -> Option<&ModifierSlot> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[ModifierSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Scan for enabled slots. Always computed fresh, never cached.
    pub fn active_set(&self) -> Vec<Modifier> {
        self.slots
            .iter()
            .filter(|s| s.is_enabled())
            .map(|s| s.modifier().clone())
            .collect()
    }
}

/// Stateless modifier application
pub struct ModifierPipeline;

impl ModifierPipeline {
    /// Fold `base` through the modifiers in order
    pub fn apply(base: i32, modifiers: &[Modifier]) -> i32 {
        modifiers.iter().fold(base, |value, modifier| {
            let after = modifier.apply(value);
            debug!("[pipeline] {}: {} -> {}", modifier.name(), value, after);
            after
        })
    }

    /// Turn a roll into damage according to the mode
    pub fn resolve(mode: PipelineMode, dice: &DiceSet, modifiers: &[Modifier]) -> i32 {
        match mode {
            PipelineMode::Aggregate => Self::apply(dice.total(), modifiers),
            PipelineMode::PerDie => dice
                .faces()
                .iter()
                .map(|&face| Self::apply(face as i32, modifiers))
                .fold(0i32, |acc, v| acc.saturating_add(v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::modifier::ModifierKind;

    #[test]
    fn test_empty_pipeline_is_identity() {
        for value in [-1000, -1, 0, 1, 7, 42, i32::MAX, i32::MIN] {
            assert_eq!(ModifierPipeline::apply(value, &[]), value);
        }
    }

    #[test]
    fn test_pipeline_is_order_sensitive() {
        let double_then_add = [Modifier::double(), Modifier::add_one()];
        let add_then_double = [Modifier::add_one(), Modifier::double()];

        assert_eq!(ModifierPipeline::apply(3, &double_then_add), 7);
        assert_eq!(ModifierPipeline::apply(3, &add_then_double), 8);
    }

    #[test]
    fn test_disabled_slots_are_skipped() {
        let mut inventory =
            SkillInventory::from_modifiers([Modifier::double(), Modifier::add_one()]);
        assert_eq!(ModifierPipeline::apply(3, &inventory.active_set()), 7);

        assert_eq!(inventory.toggle(0), Some(false));
        assert_eq!(ModifierPipeline::apply(3, &inventory.active_set()), 4);
        assert_eq!(inventory.len(), 2);
    }

    #[test]
    fn test_active_set_follows_toggles() {
        let mut inventory = SkillInventory::new();
        inventory.acquire(Modifier::double());
        inventory.acquire(Modifier::builtin(ModifierKind::Add(3)));
        inventory.acquire(Modifier::add_one());

        inventory.toggle(1);
        let names: Vec<_> = inventory
            .active_set()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(names, vec!["double", "add one"]);

        inventory.toggle(1);
        assert_eq!(inventory.active_set().len(), 3);
        assert_eq!(inventory.toggle(9), None);
    }

    #[test]
    fn test_resolve_modes() {
        let dice = DiceSet::new(vec![1, 2, 3]);
        let mods = [Modifier::double(), Modifier::add_one()];

        // (1+2+3)*2+1
        assert_eq!(
            ModifierPipeline::resolve(PipelineMode::Aggregate, &dice, &mods),
            13
        );
        // (1*2+1)+(2*2+1)+(3*2+1)
        assert_eq!(
            ModifierPipeline::resolve(PipelineMode::PerDie, &dice, &mods),
            15
        );
        assert_eq!(
            ModifierPipeline::resolve(PipelineMode::PerDie, &dice, &[]),
            dice.total()
        );
    }
}
