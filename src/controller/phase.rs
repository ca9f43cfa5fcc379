//! The turn/shoot phase machine.
//!
//! Exactly one phase is active at a time. Transitioning runs the old
//! phase's leave hook and the new phase's enter hook (both live in
//! [`EncounterState::change_phase`](super::EncounterState::change_phase) so
//! they can mutate state); permissions are phase-local pure predicates
//! consulted by input handling before anything mutates.

use serde::{Deserialize, Serialize};

/// The orchestrator's global phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// The player may act freely: shoot, load bullets, end the turn.
    Free,

    /// The draw sub-phase at the start of a turn.
    InitialDraw { remaining: u32 },

    /// A draw sub-phase opened by a card effect.
    SpecialDraw { remaining: u32 },

    /// The player must pick a bullet to destroy.
    CardDestroy,

    /// Enemies are taking their actions.
    EnemyAction,
}

impl GamePhase {
    /// Whether shooting is allowed in this phase.
    #[must_use]
    pub fn allows_shooting(self) -> bool {
        matches!(self, Self::Free)
    }

    /// Whether drawing cards is allowed in this phase.
    #[must_use]
    pub fn allows_drawing_cards(self) -> bool {
        matches!(self, Self::InitialDraw { .. } | Self::SpecialDraw { .. })
    }

    /// Whether this is a draw sub-phase, and if so whether it is special.
    #[must_use]
    pub fn draw_kind(self) -> Option<bool> {
        match self {
            Self::InitialDraw { .. } => Some(false),
            Self::SpecialDraw { .. } => Some(true),
            _ => None,
        }
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "Free"),
            Self::InitialDraw { remaining } => write!(f, "InitialDraw({remaining})"),
            Self::SpecialDraw { remaining } => write!(f, "SpecialDraw({remaining})"),
            Self::CardDestroy => write!(f, "CardDestroy"),
            Self::EnemyAction => write!(f, "EnemyAction"),
        }
    }
}
