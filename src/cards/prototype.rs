//! Card prototypes.
//!
//! Prototypes are the already-parsed, already-validated templates supplied
//! by the config layer; the encounter creates live [`Card`](super::Card)
//! instances from them.

use serde::{Deserialize, Serialize};

use crate::core::RevolverRotation;
use crate::effects::Effect;

/// A card template as supplied by the config layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardPrototype {
    /// Internal name, unique among prototypes.
    pub name: String,

    /// Display title.
    pub title: String,

    /// Damage dealt when shot, before modifiers.
    pub base_damage: i32,

    /// Reserves spent to load the card into the revolver.
    pub cost: i32,

    /// Rotation performed after this card is shot.
    pub rotation: RevolverRotation,

    /// Returns to the hand instead of the discard when it leaves the
    /// revolver after a shot.
    pub is_undead: bool,

    /// Stays in the revolver after being shot.
    pub is_everlasting: bool,

    /// Hits every enemy instead of only the targeted one.
    pub is_spray: bool,

    /// The card's trigger-bound effects.
    pub effects: Vec<Effect>,
}

impl CardPrototype {
    /// A minimal bullet prototype; effects and flags are added afterwards.
    #[must_use]
    pub fn bullet(name: impl Into<String>, damage: i32, cost: i32) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            base_damage: damage,
            cost,
            rotation: RevolverRotation::Right(1),
            is_undead: false,
            is_everlasting: false,
            is_spray: false,
            effects: Vec::new(),
        }
    }

    /// Set the display title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the rotation performed after shooting.
    #[must_use]
    pub fn with_rotation(mut self, rotation: RevolverRotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Mark the card as undead.
    #[must_use]
    pub fn undead(mut self) -> Self {
        self.is_undead = true;
        self
    }

    /// Mark the card as everlasting.
    #[must_use]
    pub fn everlasting(mut self) -> Self {
        self.is_everlasting = true;
        self
    }

    /// Mark the card as spray.
    #[must_use]
    pub fn spray(mut self) -> Self {
        self.is_spray = true;
        self
    }

    /// Add an effect (builder pattern).
    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}
