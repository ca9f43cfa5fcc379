//! Status effects: time-boxed modifiers on the player or an enemy.

pub mod effect;
pub mod target;

pub use effect::{StatusEffect, StatusEffectType, StatusKind, StatusLifetime};
pub use target::StatusEffectTarget;
