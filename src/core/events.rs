//! Input events posted by the UI layer.
//!
//! The engine never reads input devices; the UI posts opaque events into the
//! orchestrator's dispatch. Popup-shaped events land in the single-slot
//! mailbox that suspended timelines wait on.

use serde::{Deserialize, Serialize};

/// An opaque input event from the UI layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    /// The player pressed the shoot button.
    ShootRevolver,
    /// The player ended their turn.
    EndTurn,
    /// The player drew a card (clicked the deck) during a draw phase.
    DrawCard,
    /// The player confirmed the current popup.
    PopupConfirmation,
    /// The player picked a revolver slot in the selection popup.
    PopupSelection(usize),
    /// The player chose to parry an incoming attack.
    Parry,
}

/// An event consumed by a suspended timeline through the mailbox.
///
/// The mailbox is a single `Option<PopupEvent>` slot: the UI sets it, the
/// waiting step reads and clears it. At most one request may be outstanding
/// at a time; there is no timeout: a request that is never answered
/// suspends its schedule forever, deliberately.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopupEvent {
    /// Generic confirmation (Ok button, or declining a parry).
    Confirmation,
    /// A revolver slot was selected.
    Selection(usize),
    /// The parry slot card is used against the incoming attack.
    Parry,
}
