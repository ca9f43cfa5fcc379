//! Card damage modifiers.
//!
//! A modifier is a `(delta, label, validity)` triple attached to a card.
//! The owner re-evaluates validity each pass and removes modifiers whose
//! condition no longer holds. Validity is a closed enum rather than a
//! predicate closure so the owner can audit it against current state.

use serde::{Deserialize, Serialize};

use crate::core::CardInstanceId;

/// When a modifier stays attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierValidity {
    /// Valid while the source card is in the revolver ("buff").
    WhileSourceInPlay(CardInstanceId),
    /// Always valid, survives the source leaving play ("gift").
    Always,
}

/// A damage modifier attached to a card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardModifier {
    /// Damage delta, may be negative.
    pub delta: i32,

    /// Human-readable origin, e.g. the title of the card that granted it.
    pub source: String,

    /// Condition under which the modifier stays attached.
    pub validity: ModifierValidity,

    /// Marks the modified card as non-replaceable in its revolver slot.
    pub protects: bool,

    /// The delta shrinks by the rotation amount on every revolver rotation.
    pub decays_with_rotation: bool,
}

impl CardModifier {
    /// A plain damage buff or debuff.
    #[must_use]
    pub fn new(delta: i32, source: impl Into<String>, validity: ModifierValidity) -> Self {
        Self {
            delta,
            source: source.into(),
            validity,
            protects: false,
            decays_with_rotation: false,
        }
    }

    /// A zero-delta modifier that protects the card from being replaced.
    #[must_use]
    pub fn protection(source: impl Into<String>, validity: ModifierValidity) -> Self {
        Self {
            delta: 0,
            source: source.into(),
            validity,
            protects: true,
            decays_with_rotation: false,
        }
    }

    /// Mark the modifier as decaying with revolver rotations.
    #[must_use]
    pub fn decaying(mut self) -> Self {
        self.decays_with_rotation = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buff_modifier() {
        let modifier = CardModifier::new(
            3,
            "Winchester",
            ModifierValidity::WhileSourceInPlay(CardInstanceId::new(1)),
        );
        assert_eq!(modifier.delta, 3);
        assert!(!modifier.protects);
        assert!(!modifier.decays_with_rotation);
    }

    #[test]
    fn test_protection_has_no_delta() {
        let modifier = CardModifier::protection("Guardian", ModifierValidity::Always);
        assert_eq!(modifier.delta, 0);
        assert!(modifier.protects);
    }

    #[test]
    fn test_decaying() {
        let modifier = CardModifier::new(0, "moist modifier", ModifierValidity::Always).decaying();
        assert!(modifier.decays_with_rotation);
    }
}
