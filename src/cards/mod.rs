//! Cards: prototypes, live instances, and damage modifiers.

pub mod instance;
pub mod modifier;
pub mod prototype;

pub use instance::Card;
pub use modifier::{CardModifier, ModifierValidity};
pub use prototype::CardPrototype;
