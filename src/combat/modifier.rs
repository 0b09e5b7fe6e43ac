//! Roll modifiers
//!
//! A modifier is a named, pure integer transform. Built-in kinds cover the
//! common effects (double, add one, add N, multiply N, halve, square); any
//! other effect plugs in through [`ModifierEffect`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while parsing a modifier spec
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModifierError {
    #[error("unknown modifier: {0}")]
    Unknown(String),
}

/// Capability shared by every modifier effect
pub trait ModifierEffect: Send + Sync + fmt::Debug {
    fn apply(&self, value: i32) -> i32;
}

/// Built-in modifier effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ModifierKind {
    /// Multiply by two
    Double,
    /// Add one
    AddOne,
    /// Add a constant (may be negative)
    Add(i32),
    /// Multiply by a constant
    Multiply(i32),
    /// Divide by two, truncating toward zero
    Halve,
    /// Multiply the value by itself
    Square,
}

impl ModifierKind {
    /// Apply this effect to a value. Arithmetic saturates at the i32 bounds.
    pub fn apply(&self, value: i32) -> i32 {
        match self {
            ModifierKind::Double => value.saturating_mul(2),
            ModifierKind::AddOne => value.saturating_add(1),
            ModifierKind::Add(n) => value.saturating_add(*n),
            ModifierKind::Multiply(n) => value.saturating_mul(*n),
            ModifierKind::Halve => value / 2,
            ModifierKind::Square => value.saturating_mul(value),
        }
    }
}

impl ModifierEffect for ModifierKind {
    fn apply(&self, value: i32) -> i32 {
        ModifierKind::apply(self, value)
    }
}

fn strip_number(spec: &str, prefixes: &[&str]) -> Option<i32> {
    prefixes
        .iter()
        .find_map(|p| spec.strip_prefix(p))
        .and_then(|rest| rest.trim().parse().ok())
}

impl FromStr for ModifierKind {
    type Err = ModifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.trim().to_lowercase().replace('_', " ");

        match spec.as_str() {
            "double" | "x2" => return Ok(ModifierKind::Double),
            "add one" | "plus one" | "+1" => return Ok(ModifierKind::AddOne),
            "halve" | "half" => return Ok(ModifierKind::Halve),
            "square" => return Ok(ModifierKind::Square),
            _ => {}
        }

        if let Some(n) = strip_number(&spec, &["add ", "plus ", "+"]) {
            return Ok(match n {
                1 => ModifierKind::AddOne,
                n => ModifierKind::Add(n),
            });
        }
        if let Some(n) = strip_number(&spec, &["multiply ", "times ", "x"]) {
            return Ok(match n {
                2 => ModifierKind::Double,
                n => ModifierKind::Multiply(n),
            });
        }

        Err(ModifierError::Unknown(s.trim().to_string()))
    }
}

impl TryFrom<String> for ModifierKind {
    type Error = ModifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ModifierKind> for String {
    fn from(kind: ModifierKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifierKind::Double => write!(f, "double"),
            ModifierKind::AddOne => write!(f, "add one"),
            ModifierKind::Add(n) => write!(f, "add {}", n),
            ModifierKind::Multiply(n) => write!(f, "multiply {}", n),
            ModifierKind::Halve => write!(f, "halve"),
            ModifierKind::Square => write!(f, "square"),
        }
    }
}

/// A named modifier. Identity is the name.
#[derive(Clone)]
pub struct Modifier {
    name: String,
    effect: Arc<dyn ModifierEffect>,
}

impl Modifier {
    /// Create a modifier from any effect
    pub fn new(name: impl Into<String>, effect: impl ModifierEffect + 'static) -> Self {
        Self {
            name: name.into(),
            effect: Arc::new(effect),
        }
    }

    /// Create a built-in modifier named after its kind
    pub fn builtin(kind: ModifierKind) -> Self {
        Self::new(kind.to_string(), kind)
    }

    pub fn double() -> Self {
        Self::builtin(ModifierKind::Double)
    }

    pub fn add_one() -> Self {
        Self::builtin(ModifierKind::AddOne)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, value: i32) -> i32 {
        self.effect.apply(value)
    }
}

impl From<ModifierKind> for Modifier {
    fn from(kind: ModifierKind) -> Self {
        Modifier::builtin(kind)
    }
}

impl FromStr for Modifier {
    type Err = ModifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<ModifierKind>().map(Modifier::builtin)
    }
}

impl PartialEq for Modifier {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Modifier {}

impl fmt::Debug for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modifier")
            .field("name", &self.name)
            .field("effect", &self.effect)
            .finish()
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
