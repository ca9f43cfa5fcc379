//! Triggers: the game moments effects can listen for.

use serde::{Deserialize, Serialize};

use crate::core::{CardInstanceId, EnemyId};

/// A named game moment.
///
/// Triggers are matched by equality only; there is no hierarchy and no
/// cascading between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// The card entered the revolver.
    OnEnter,
    /// The card was shot.
    OnShot,
    /// The card leaves the revolver after being shot or parried.
    OnLeave,
    /// A new turn began.
    OnRoundStart,
    /// The current turn is ending.
    OnRoundEnd,
    /// The card was destroyed.
    OnDestroy,
    /// Cards were drawn.
    OnCardsDrawn,
    /// Cards were drawn by a special draw (an effect, not the turn start).
    OnSpecialCardsDrawn,
    /// The revolver physically rotated.
    OnRevolverRotation,
    /// The card bounced out of the revolver.
    OnBounce,
}

/// Context threaded through a trigger resolution pass.
#[derive(Clone, Debug, Default)]
pub struct TriggerInformation {
    /// Scales effect amounts (e.g. number of cards drawn, rotation amount).
    pub multiplier: Option<i32>,

    /// The card that caused the trigger, if any.
    pub source_card: Option<CardInstanceId>,

    /// The enemies targeted by the shot, for on-shot resolution.
    pub targeted_enemies: Vec<EnemyId>,

    /// True while resolving the consequences of a shot.
    pub is_on_shot: bool,
}

impl TriggerInformation {
    /// Information with only a multiplier set.
    #[must_use]
    pub fn with_multiplier(multiplier: i32) -> Self {
        Self {
            multiplier: Some(multiplier),
            ..Self::default()
        }
    }

    /// Information with only the source card set.
    #[must_use]
    pub fn from_source(source: CardInstanceId) -> Self {
        Self {
            source_card: Some(source),
            ..Self::default()
        }
    }

    /// The effective amount multiplier (defaults to 1).
    #[must_use]
    pub fn effective_multiplier(&self) -> i32 {
        self.multiplier.unwrap_or(1)
    }
}
