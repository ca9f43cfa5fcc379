//! Bullet selectors: how an effect picks its target cards.

use serde::{Deserialize, Serialize};

use crate::controller::EncounterState;
use crate::core::CardInstanceId;

/// A predicate over occupied revolver slots.
///
/// A closed enum instead of an arbitrary closure, so target selection stays
/// auditable data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetPredicate {
    /// Every occupied slot.
    AllOccupied,
    /// Every occupied slot except the effect's own card.
    Others,
    /// Only the effect's own card.
    OnlySelf,
    /// The slots adjacent to the effect's own card.
    Neighbors,
    /// Exactly the given slot.
    InSlot(usize),
}

impl TargetPredicate {
    /// Whether the card in `slot` is admitted, judged against the effect
    /// owner's position.
    #[must_use]
    pub fn admits(
        self,
        owner: CardInstanceId,
        owner_slot: Option<usize>,
        candidate: CardInstanceId,
        slot: usize,
    ) -> bool {
        match self {
            Self::AllOccupied => true,
            Self::Others => candidate != owner,
            Self::OnlySelf => candidate == owner,
            Self::Neighbors => match owner_slot {
                Some(own) => {
                    let slots = crate::controller::REVOLVER_SLOTS;
                    slot == (own + 1) % slots || slot == (own + slots - 1) % slots
                }
                None => false,
            },
            Self::InSlot(wanted) => slot == wanted,
        }
    }
}

/// Strategy for picking the bullets an effect applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletSelector {
    /// Synchronously collects every occupied slot admitted by the predicate.
    ByPredicate(TargetPredicate),

    /// Opens an interactive popup and suspends until the player picks a
    /// slot. The one intentional blocking point of effect resolution.
    ByPopup {
        /// Whether the effect's own card is a legal pick.
        include_self: bool,
        /// Optional popups never block the triggering action.
        optional: bool,
    },
}

impl BulletSelector {
    /// Whether this selector currently vetoes the prospective action
    /// because no legal target could be picked. Pure query.
    #[must_use]
    pub fn blocks(&self, state: &EncounterState, owner: CardInstanceId) -> bool {
        match *self {
            Self::ByPredicate(_) => false,
            Self::ByPopup { include_self, optional } => {
                if optional {
                    return false;
                }
                let bullets: Vec<CardInstanceId> =
                    state.revolver().occupied().map(|(_, card)| card).collect();
                if bullets.len() >= 2 {
                    return false;
                }
                if bullets.is_empty() {
                    return true;
                }
                !include_self && bullets[0] == owner
            }
        }
    }
}
