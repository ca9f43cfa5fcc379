//! Live card instances.

use smallvec::SmallVec;

use crate::core::{CardInstanceId, RevolverRotation};
use crate::effects::{Effect, Trigger};

use super::modifier::CardModifier;
use super::prototype::CardPrototype;

/// One created card, alive for the duration of an encounter.
///
/// A card exists in exactly one place at a time (stack, hand, or a revolver
/// slot); `in_game` is true while it sits in the revolver. Damage is the
/// prototype's base plus the deltas of all currently valid modifiers;
/// validity itself is judged by the encounter state, which owns the
/// referenced cards.
#[derive(Clone, Debug)]
pub struct Card {
    /// Identity of this instance.
    pub id: CardInstanceId,

    /// Prototype name this card was created from.
    pub name: String,

    /// Display title.
    pub title: String,

    /// Damage before modifiers.
    pub base_damage: i32,

    /// Reserves spent to load it.
    pub cost: i32,

    /// Rotation performed after this card is shot.
    pub rotation: RevolverRotation,

    /// Returns to the hand instead of the stack after a shot.
    pub is_undead: bool,

    /// Stays in the revolver after a shot.
    pub is_everlasting: bool,

    /// Hits every enemy.
    pub is_spray: bool,

    /// Trigger-bound effects.
    pub effects: Vec<Effect>,

    /// Attached damage modifiers.
    pub modifiers: SmallVec<[CardModifier; 2]>,

    /// True while the card sits in a revolver slot.
    pub in_game: bool,

    /// The slot the card entered the revolver in, while in game.
    pub entered_in_slot: Option<usize>,
}

impl Card {
    /// Instantiate a prototype.
    #[must_use]
    pub fn from_prototype(id: CardInstanceId, prototype: &CardPrototype) -> Self {
        Self {
            id,
            name: prototype.name.clone(),
            title: prototype.title.clone(),
            base_damage: prototype.base_damage,
            cost: prototype.cost,
            rotation: prototype.rotation,
            is_undead: prototype.is_undead,
            is_everlasting: prototype.is_everlasting,
            is_spray: prototype.is_spray,
            effects: prototype.effects.clone(),
            modifiers: SmallVec::new(),
            in_game: false,
            entered_in_slot: None,
        }
    }

    /// Attach a modifier.
    pub fn add_modifier(&mut self, modifier: CardModifier) {
        log::debug!(
            "card {} gained modifier from {:?} (delta {})",
            self.id,
            modifier.source,
            modifier.delta
        );
        self.modifiers.push(modifier);
    }

    /// Called when the card enters the revolver.
    pub fn on_enter(&mut self, slot: usize) {
        self.in_game = true;
        self.entered_in_slot = Some(slot);
    }

    /// Called when the card leaves the revolver for any reason.
    pub fn leave_game(&mut self) {
        self.in_game = false;
        self.entered_in_slot = None;
    }

    /// Called after every physical revolver rotation; decaying modifiers
    /// lose the rotation amount.
    pub fn on_revolver_rotation(&mut self, rotation: RevolverRotation) {
        let amount = rotation.amount() as i32;
        if amount == 0 {
            return;
        }
        for modifier in self.modifiers.iter_mut() {
            if modifier.decays_with_rotation {
                modifier.delta -= amount;
            }
        }
    }

    /// True if any effect listening on `trigger` currently vetoes the
    /// prospective action. Pure query.
    #[must_use]
    pub fn blocks_on(&self, trigger: Trigger, state: &crate::controller::EncounterState) -> bool {
        self.effects
            .iter()
            .filter(|effect| effect.trigger == trigger)
            .any(|effect| effect.blocks(self.id, state))
    }

    /// Whether the card leaves the revolver after being shot.
    ///
    /// Everlasting cards stay, unless an active encounter modifier disables
    /// everlasting.
    #[must_use]
    pub fn should_remove_after_shot(&self, everlasting_disabled: bool) -> bool {
        !(self.is_everlasting && !everlasting_disabled)
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.id.raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::ModifierValidity;

    fn card() -> Card {
        Card::from_prototype(
            CardInstanceId::new(1),
            &CardPrototype::bullet("standardBullet", 4, 1),
        )
    }

    #[test]
    fn test_enter_and_leave() {
        let mut card = card();
        assert!(!card.in_game);

        card.on_enter(2);
        assert!(card.in_game);
        assert_eq!(card.entered_in_slot, Some(2));

        card.leave_game();
        assert!(!card.in_game);
        assert_eq!(card.entered_in_slot, None);
    }

    #[test]
    fn test_decaying_modifier_loses_delta_on_rotation() {
        let mut card = card();
        card.add_modifier(CardModifier::new(0, "moist modifier", ModifierValidity::Always).decaying());
        card.add_modifier(CardModifier::new(3, "buff", ModifierValidity::Always));

        card.on_revolver_rotation(RevolverRotation::Right(2));

        assert_eq!(card.modifiers[0].delta, -2);
        assert_eq!(card.modifiers[1].delta, 3);
    }

    #[test]
    fn test_rotation_without_amount_does_not_decay() {
        let mut card = card();
        card.add_modifier(CardModifier::new(0, "moist modifier", ModifierValidity::Always).decaying());

        card.on_revolver_rotation(RevolverRotation::None);

        assert_eq!(card.modifiers[0].delta, 0);
    }

    #[test]
    fn test_should_remove_after_shot() {
        let mut card = card();
        assert!(card.should_remove_after_shot(false));

        card.is_everlasting = true;
        assert!(!card.should_remove_after_shot(false));
        assert!(card.should_remove_after_shot(true));
    }
}
