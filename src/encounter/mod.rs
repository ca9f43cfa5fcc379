//! Encounter modifiers: pluggable rule hooks active for one encounter.
//!
//! The list of active modifiers is folded left-to-right over each decision
//! point (rotation transform, status-effect applicability, shootability,
//! draw scaling). Modifiers never see each other's intermediate state except
//! through the value being folded.

use serde::{Deserialize, Serialize};

use crate::controller::{timelines, EncounterState, GameTimeline};
use crate::core::{CardInstanceId, RevolverRotation};

/// A rule hook that can transform or veto core decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterModifier {
    /// Status effects cannot be applied.
    Rain,

    /// The revolver never rotates, and everlasting is disabled.
    Frost,

    /// Rotation directions are swapped.
    BewitchedMist,

    /// Placing a bullet puts a copy of it into the hand.
    Lookalike,

    /// Placed bullets grow soggy: their damage decays with every rotation.
    Moist,

    /// Every draw yields one card more.
    DrawOneMoreCard,
}

impl EncounterModifier {
    /// Transform a requested revolver rotation.
    #[must_use]
    pub fn modify_revolver_rotation(self, rotation: RevolverRotation) -> RevolverRotation {
        match self {
            Self::Frost => RevolverRotation::None,
            Self::BewitchedMist => rotation.reversed(),
            _ => rotation,
        }
    }

    /// Whether status effects may currently be applied.
    #[must_use]
    pub fn should_apply_status_effects(self) -> bool {
        !matches!(self, Self::Rain)
    }

    /// Whether the revolver may be shot at all.
    #[must_use]
    pub fn can_shoot_revolver(self, _state: &EncounterState) -> bool {
        true
    }

    /// Whether everlasting cards lose their stay-in-revolver property.
    #[must_use]
    pub fn disables_everlasting(self) -> bool {
        matches!(self, Self::Frost)
    }

    /// Multiplier applied to the number of cards drawn.
    #[must_use]
    pub fn draw_multiplier(self, _special: bool) -> f32 {
        1.0
    }

    /// Flat addition to the number of cards drawn.
    #[must_use]
    pub fn additional_cards_to_draw(self, _special: bool) -> u32 {
        match self {
            Self::DrawOneMoreCard => 1,
            _ => 0,
        }
    }

    /// Consequences after a bullet was placed in the revolver.
    #[must_use]
    pub fn execute_after_bullet_placed(
        self,
        card: CardInstanceId,
        state: &EncounterState,
    ) -> Option<GameTimeline> {
        match self {
            Self::Lookalike => Some(timelines::put_cards_in_hand(
                state.card(card).name.clone(),
                1,
            )),
            Self::Moist => Some(timelines::moisten_card(card)),
            _ => None,
        }
    }

    /// Consequences after the revolver was shot.
    #[must_use]
    pub fn execute_after_revolver_shot(
        self,
        _card: Option<CardInstanceId>,
        _state: &EncounterState,
    ) -> Option<GameTimeline> {
        None
    }

    /// Consequences after the revolver physically rotated.
    #[must_use]
    pub fn execute_after_revolver_rotated(
        self,
        _rotation: RevolverRotation,
        _state: &EncounterState,
    ) -> Option<GameTimeline> {
        None
    }

    /// Consequences when the player ends their turn.
    #[must_use]
    pub fn execute_on_end_turn(self, _state: &EncounterState) -> Option<GameTimeline> {
        None
    }

    /// Consequences when the player's new turn starts.
    #[must_use]
    pub fn execute_on_turn_start(self, _state: &EncounterState) -> Option<GameTimeline> {
        None
    }

    /// Look up a modifier by its config-file name.
    ///
    /// # Panics
    ///
    /// Panics on an unknown name; the config layer validates names, so an
    /// unknown one here is a construction bug.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "rain" => Self::Rain,
            "frost" => Self::Frost,
            "bewitchedmist" => Self::BewitchedMist,
            "lookalike" => Self::Lookalike,
            "moist" => Self::Moist,
            "drawonemorecard" => Self::DrawOneMoreCard,
            _ => panic!("unknown encounter modifier: {name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frost_forces_none() {
        assert_eq!(
            EncounterModifier::Frost.modify_revolver_rotation(RevolverRotation::Right(2)),
            RevolverRotation::None
        );
        assert_eq!(
            EncounterModifier::Frost.modify_revolver_rotation(RevolverRotation::Left(1)),
            RevolverRotation::None
        );
    }

    #[test]
    fn test_bewitched_mist_swaps_directions() {
        assert_eq!(
            EncounterModifier::BewitchedMist.modify_revolver_rotation(RevolverRotation::Right(2)),
            RevolverRotation::Left(2)
        );
        assert_eq!(
            EncounterModifier::BewitchedMist.modify_revolver_rotation(RevolverRotation::None),
            RevolverRotation::None
        );
    }

    #[test]
    fn test_rain_blocks_status_effects() {
        assert!(!EncounterModifier::Rain.should_apply_status_effects());
        assert!(EncounterModifier::Frost.should_apply_status_effects());
    }

    #[test]
    fn test_frost_disables_everlasting() {
        assert!(EncounterModifier::Frost.disables_everlasting());
        assert!(!EncounterModifier::Rain.disables_everlasting());
    }

    #[test]
    fn test_draw_one_more_card() {
        assert_eq!(EncounterModifier::DrawOneMoreCard.additional_cards_to_draw(false), 1);
        assert_eq!(EncounterModifier::DrawOneMoreCard.additional_cards_to_draw(true), 1);
        assert_eq!(EncounterModifier::Rain.additional_cards_to_draw(false), 0);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(EncounterModifier::from_name("Frost"), EncounterModifier::Frost);
        assert_eq!(
            EncounterModifier::from_name("bewitchedMist"),
            EncounterModifier::BewitchedMist
        );
    }

    #[test]
    #[should_panic(expected = "unknown encounter modifier")]
    fn test_from_unknown_name_panics() {
        let _ = EncounterModifier::from_name("tornado");
    }
}
