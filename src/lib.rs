//! # sixshooter
//!
//! The rules engine of a turn-based, revolver-themed card battler: it
//! decides what happens and in what order when the player shoots, draws,
//! ends a turn, or a card/status effect fires, independent of how any of
//! it is drawn on screen.
//!
//! ## Design Principles
//!
//! 1. **Cooperative scheduling**: every consequence is a step on a
//!    [`Timeline`]; one `update()` per logical tick drains everything that
//!    completes in zero time, and only genuine suspensions (delays,
//!    predicates, the popup mailbox) carry over ticks.
//!
//! 2. **Explicit context**: there is no global "current game". The
//!    [`EncounterState`] context object is passed into every step, effect,
//!    and hook.
//!
//! 3. **Closed variant sets**: effects, status effects, encounter
//!    modifiers, phases, and steps are tagged unions with exhaustive
//!    matching, not open class hierarchies.
//!
//! ## Architecture
//!
//! - The **main schedule** is authoritative: the UI is frozen exactly while
//!   it is non-empty. **Animation schedules** run independently, are purely
//!   cosmetic, and never gate rule correctness.
//!
//! - Rule resolution is data-driven: cards carry [`Effect`]s listening for
//!   [`Trigger`]s; firing a trigger produces timelines of consequences that
//!   splice into the pipeline that caused them.
//!
//! ## Modules
//!
//! - `timeline`: generic cooperative step sequencer
//! - `core`: ids, rotation, RNG, configuration, counters, input events
//! - `cards`: card prototypes, instances, damage modifiers
//! - `effects`: trigger/effect resolution and bullet selectors
//! - `status`: status-effect state machine and damage targets
//! - `encounter`: pluggable encounter modifiers
//! - `enemy`: enemies and their actions
//! - `controller`: encounter state, phase machine, pipelines, orchestrator

pub mod cards;
pub mod controller;
pub mod core;
pub mod effects;
pub mod encounter;
pub mod enemy;
pub mod status;
pub mod timeline;

// Re-export commonly used types
pub use crate::core::{
    CardInstanceId, Counters, EncounterConfig, EnemyId, GameRng, InputEvent, PopupEvent,
    RevolverRotation,
};

pub use crate::timeline::{collect_timelines, Step, Timeline, TimelineBuilder};

pub use crate::cards::{Card, CardModifier, CardPrototype, ModifierValidity};

pub use crate::effects::{BulletSelector, Effect, EffectKind, EffectValue, TargetPredicate, Trigger, TriggerInformation};

pub use crate::status::{StatusEffect, StatusEffectTarget, StatusEffectType, StatusKind, StatusLifetime};

pub use crate::encounter::EncounterModifier;

pub use crate::enemy::{Enemy, EnemyAction, EnemyPrototype};

pub use crate::controller::{
    timelines, AnimationRequest, EncounterState, EncounterStats, GameAnimation, GameController,
    GamePhase, GameTimeline, Revolver, UiFlags, FIRING_SLOT, REVOLVER_SLOTS,
};
