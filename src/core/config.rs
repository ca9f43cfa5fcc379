//! Encounter configuration.
//!
//! The config/data layer hands the engine already-parsed, already-validated
//! values; this struct is the rule-relevant subset of the encounter screen's
//! configuration file.

use serde::{Deserialize, Serialize};

/// Tunable rule knobs for one encounter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncounterConfig {
    /// Cards drawn at the start of the very first turn.
    pub cards_to_draw_in_first_round: u32,

    /// Cards drawn at the start of every later turn.
    pub cards_to_draw: u32,

    /// Reserves the player is reset to at the beginning of each turn.
    pub base_reserves: i32,

    /// Hand size the end-turn pipeline collapses down to.
    pub soft_max_cards: usize,

    /// Absolute hand size cap; draws and put-in-hand effects never exceed it.
    pub hard_max_cards: usize,

    /// Damage the player takes when shooting an empty chamber.
    pub shot_empty_damage: i32,

    /// Lives the player starts the encounter with.
    pub player_lives: i32,

    /// Cosmetic buffer inserted by some effects before they resolve,
    /// in scheduler ticks.
    pub buffer_ticks: u32,
}

impl EncounterConfig {
    /// Set the per-turn draw counts.
    #[must_use]
    pub fn with_draws(mut self, first_round: u32, later_rounds: u32) -> Self {
        self.cards_to_draw_in_first_round = first_round;
        self.cards_to_draw = later_rounds;
        self
    }

    /// Set the base reserves.
    #[must_use]
    pub fn with_base_reserves(mut self, reserves: i32) -> Self {
        self.base_reserves = reserves;
        self
    }

    /// Set the hand size limits.
    #[must_use]
    pub fn with_hand_limits(mut self, soft: usize, hard: usize) -> Self {
        assert!(soft <= hard, "soft hand limit above hard limit");
        self.soft_max_cards = soft;
        self.hard_max_cards = hard;
        self
    }

    /// Set the empty-chamber damage.
    #[must_use]
    pub fn with_shot_empty_damage(mut self, damage: i32) -> Self {
        self.shot_empty_damage = damage;
        self
    }

    /// Set the player's starting lives.
    #[must_use]
    pub fn with_player_lives(mut self, lives: i32) -> Self {
        self.player_lives = lives;
        self
    }
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            cards_to_draw_in_first_round: 6,
            cards_to_draw: 2,
            base_reserves: 4,
            soft_max_cards: 9,
            hard_max_cards: 12,
            shot_empty_damage: 4,
            player_lives: 30,
            buffer_ticks: 2,
        }
    }
}
