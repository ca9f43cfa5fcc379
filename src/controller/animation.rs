//! The cosmetic animation boundary.
//!
//! The engine never draws anything; it drives animation objects through the
//! [`GameAnimation`] contract once per tick and emits [`AnimationRequest`]s
//! the rendering layer turns into visuals. Neither gates rule correctness.

use serde::{Deserialize, Serialize};

use crate::core::CardInstanceId;

/// Contract for a cosmetic animation driven by the orchestrator.
///
/// The orchestrator polls registered animations once per tick and ends them
/// when they report finished. An animation whose resources are not ready yet
/// is skipped for that tick and retried later; it never blocks the main
/// schedule.
pub trait GameAnimation {
    /// Whether the animation's resources are loaded. Defaults to ready.
    fn is_ready(&self) -> bool {
        true
    }

    /// Starts the animation.
    fn start(&mut self) {}

    /// Advances the animation by one tick.
    fn update(&mut self);

    /// Whether the animation has finished.
    fn is_finished(&self) -> bool;

    /// Called once after the animation finished.
    fn end(&mut self) {}
}

/// A cosmetic request emitted by rule resolution for the rendering layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationRequest {
    /// Briefly highlight a card whose effect fired.
    CardHighlight(CardInstanceId),
    /// Shake the screen after the player took a hit.
    ScreenShake,
    /// Flash the damage overlay.
    DamageOverlay,
    /// Flash the shield icon after absorption.
    ShieldFlash,
    /// Show the turn banner; true for the player's banner.
    TurnBanner { player: bool },
    /// Fly a card orb between the board and the deck icon.
    OrbAnimation { card: CardInstanceId, to_deck: bool },
    /// Spin the revolver cylinder.
    RevolverSpin,
    /// Muzzle flash and post-processing for a shot.
    MuzzleFlash,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountdownAnimation {
        remaining: u32,
        started: bool,
        ended: bool,
    }

    impl GameAnimation for CountdownAnimation {
        fn start(&mut self) {
            self.started = true;
        }

        fn update(&mut self) {
            self.remaining = self.remaining.saturating_sub(1);
        }

        fn is_finished(&self) -> bool {
            self.remaining == 0
        }

        fn end(&mut self) {
            self.ended = true;
        }
    }

    #[test]
    fn test_animation_contract() {
        let mut anim = CountdownAnimation {
            remaining: 2,
            started: false,
            ended: false,
        };
        assert!(anim.is_ready());

        anim.start();
        assert!(anim.started);

        anim.update();
        assert!(!anim.is_finished());
        anim.update();
        assert!(anim.is_finished());

        anim.end();
        assert!(anim.ended);
    }
}
