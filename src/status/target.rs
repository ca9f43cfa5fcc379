//! Damage-target abstraction for status effects.
//!
//! Status-effect code never branches on what it is attached to; the target
//! knows how to build a damage timeline for itself and whether a new effect
//! is blocked by the statuses already on it.

use serde::{Deserialize, Serialize};

use crate::controller::{timelines, EncounterState, GameTimeline};
use crate::core::EnemyId;

use super::effect::StatusEffect;

/// The carrier of a status effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusEffectTarget {
    /// The player.
    Player,
    /// One enemy.
    Enemy(EnemyId),
}

impl StatusEffectTarget {
    /// A timeline dealing `damage` to this target, flagged as
    /// status-inflicted so it does not re-trigger after-damage hooks.
    #[must_use]
    pub fn damage_timeline(self, damage: i32) -> GameTimeline {
        match self {
            Self::Player => timelines::damage_player(damage, true, false),
            Self::Enemy(enemy) => timelines::damage_enemy(enemy, damage, true),
        }
    }

    /// Whether `effect` is blocked by a status already on this target.
    #[must_use]
    pub fn is_blocked(self, effect: &StatusEffect, state: &EncounterState) -> bool {
        let effect_type = effect.effect_type();
        let statuses: &[StatusEffect] = match self {
            Self::Player => state.player_status_effects(),
            Self::Enemy(enemy) => &state.enemy(enemy).status_effects,
        };
        statuses
            .iter()
            .any(|status| status.blocked_types().contains(&effect_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_serialization() {
        let target = StatusEffectTarget::Enemy(EnemyId::new(1));
        let json = serde_json::to_string(&target).unwrap();
        let deserialized: StatusEffectTarget = serde_json::from_str(&json).unwrap();
        assert_eq!(target, deserialized);
    }
}
