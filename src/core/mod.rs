//! Core types: identifiers, revolver rotation, deterministic RNG,
//! encounter configuration, counters, and the input-event vocabulary.

pub mod config;
pub mod events;
pub mod ids;
pub mod rng;
pub mod rotation;

pub use config::EncounterConfig;
pub use events::{InputEvent, PopupEvent};
pub use ids::{CardInstanceId, EnemyId};
pub use rng::GameRng;
pub use rotation::RevolverRotation;

use serde::{Deserialize, Serialize};

/// The monotone per-encounter counters.
///
/// Both counters start at zero when an encounter is constructed and never
/// decrease or reset for its lifetime; a fresh encounter means a fresh
/// instance of this struct.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    /// Counts up every turn; incremented by the end-turn pipeline.
    pub turn: u32,

    /// Counts up by the amount of every physical revolver rotation
    /// (a `None` rotation contributes nothing).
    pub rotation: u32,
}
