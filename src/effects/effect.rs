//! Effect definitions and trigger resolution.
//!
//! An [`Effect`] belongs to exactly one card, listens for one [`Trigger`],
//! and produces a timeline of consequences when that trigger fires. Effects
//! are pure data; every game read they need happens either when the timeline
//! is built (amount resolution) or inside the scheduled steps themselves.

use serde::{Deserialize, Serialize};

use crate::cards::{CardModifier, ModifierValidity};
use crate::controller::{timelines, EncounterState, GameTimeline};
use crate::core::CardInstanceId;
use crate::status::StatusEffect;
use crate::timeline::{collect_timelines, Step, Timeline};

use super::selector::BulletSelector;
use super::trigger::{Trigger, TriggerInformation};

/// An amount that is resolved against the encounter state when the effect
/// fires, not when the card is configured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectValue {
    /// A fixed amount.
    Const(i32),
    /// The current turn counter.
    TurnCount,
    /// The player's current reserves.
    CurrentReserves,
}

impl EffectValue {
    /// Resolve the value against current state.
    #[must_use]
    pub fn resolve(self, state: &EncounterState) -> i32 {
        match self {
            Self::Const(value) => value,
            Self::TurnCount => state.counters().turn as i32,
            Self::CurrentReserves => state.reserves(),
        }
    }
}

/// What an effect does when its trigger fires.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    /// The player gains reserves after a short visual buffer.
    ReserveGain { amount: EffectValue },

    /// Buffs (or debuffs) the damage of selected bullets; only valid while
    /// the granting card stays in the revolver.
    BuffDamage {
        amount: EffectValue,
        selector: BulletSelector,
    },

    /// Gifts selected bullets a damage change that outlives the granting
    /// card.
    GiftDamage {
        amount: EffectValue,
        selector: BulletSelector,
    },

    /// The player draws cards through a special draw phase.
    Draw { amount: EffectValue },

    /// Applies a status effect to the targeted enemy, unless an active
    /// encounter modifier disallows status-effect application.
    GiveStatus { effect: StatusEffect },

    /// Puts copies of a named card into the player's hand, capped by the
    /// remaining hand capacity.
    PutCardInHand { name: String, amount: EffectValue },

    /// Marks selected bullets as non-replaceable.
    Protect { selector: BulletSelector },

    /// Destroys selected bullets.
    Destroy { selector: BulletSelector },

    /// Damages the targeted enemy directly.
    DamageDirectly { damage: EffectValue },

    /// Damages the player.
    DamagePlayer { damage: EffectValue },

    /// Bounces selected bullets out of the revolver and returns copies to
    /// the hand.
    Bounce { selector: BulletSelector },
}

/// A card-owned rule reacting to a trigger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    /// The moment this effect fires on.
    pub trigger: Trigger,

    /// What happens when it fires.
    pub kind: EffectKind,

    /// Whether the effect also fires while its card is in the hand.
    pub trigger_in_hand: bool,
}

impl Effect {
    /// Create an effect firing on `trigger`.
    #[must_use]
    pub fn new(trigger: Trigger, kind: EffectKind) -> Self {
        Self {
            trigger,
            kind,
            trigger_in_hand: false,
        }
    }

    /// Also fire while the card is in the hand (builder pattern).
    #[must_use]
    pub fn in_hand(mut self) -> Self {
        self.trigger_in_hand = true;
        self
    }

    /// Returns the effect's consequences iff `fired` matches this effect's
    /// trigger. `None` means "no effect", distinct from an empty timeline.
    #[must_use]
    pub fn check_trigger(
        &self,
        fired: Trigger,
        owner: CardInstanceId,
        info: &TriggerInformation,
        state: &EncounterState,
    ) -> Option<GameTimeline> {
        if fired != self.trigger {
            return None;
        }
        log::debug!("effect {:?} of card {} triggered", self.kind, owner);
        Some(self.on_trigger(owner, info, state))
    }

    /// Whether the effect currently vetoes a prospective action. Pure query.
    #[must_use]
    pub fn blocks(&self, owner: CardInstanceId, state: &EncounterState) -> bool {
        match &self.kind {
            EffectKind::BuffDamage { selector, .. }
            | EffectKind::GiftDamage { selector, .. }
            | EffectKind::Protect { selector }
            | EffectKind::Destroy { selector }
            | EffectKind::Bounce { selector } => selector.blocks(state, owner),
            _ => false,
        }
    }

    fn on_trigger(
        &self,
        owner: CardInstanceId,
        info: &TriggerInformation,
        state: &EncounterState,
    ) -> GameTimeline {
        let multiplier = info.effective_multiplier();
        let buffer = state.config().buffer_ticks;
        match &self.kind {
            EffectKind::ReserveGain { amount } => {
                let amount = amount.resolve(state) * multiplier;
                Timeline::build(move |b| {
                    b.delay(buffer);
                    b.step_later(highlight_step(owner), move |st: &EncounterState| {
                        st.card(owner).in_game
                    });
                    b.action(move |st: &mut EncounterState| st.gain_reserves(amount));
                })
            }

            EffectKind::BuffDamage { amount, selector } => {
                let amount = amount.resolve(state) * multiplier;
                let modifier = CardModifier::new(
                    amount,
                    state.card(owner).title.clone(),
                    ModifierValidity::WhileSourceInPlay(owner),
                );
                attach_modifier_timeline(*selector, owner, modifier)
            }

            EffectKind::GiftDamage { amount, selector } => {
                let amount = amount.resolve(state) * multiplier;
                let modifier = CardModifier::new(
                    amount,
                    state.card(owner).title.clone(),
                    ModifierValidity::Always,
                );
                attach_modifier_timeline(*selector, owner, modifier)
            }

            EffectKind::Draw { amount } => {
                let amount = (amount.resolve(state) * multiplier).max(0) as u32;
                Timeline::build(move |b| {
                    b.delay(buffer);
                    b.step_later(highlight_step(owner), move |st: &EncounterState| {
                        st.card(owner).in_game
                    });
                    b.include(timelines::draw_cards(amount, true));
                })
            }

            EffectKind::GiveStatus { effect } => {
                let effect = effect.clone();
                Timeline::build(move |b| {
                    b.include_later(
                        move |st: &mut EncounterState| {
                            timelines::try_apply_status_to_enemy(effect, st.targeted_enemy_id())
                        },
                        |_| true,
                    );
                })
            }

            EffectKind::PutCardInHand { name, amount } => {
                let amount = (amount.resolve(state) * multiplier).max(0) as u32;
                let name = name.clone();
                Timeline::build(move |b| {
                    b.step(highlight_step(owner));
                    b.include(timelines::put_cards_in_hand(name, amount));
                })
            }

            EffectKind::Protect { selector } => {
                let modifier = CardModifier::protection(
                    state.card(owner).title.clone(),
                    ModifierValidity::WhileSourceInPlay(owner),
                );
                attach_modifier_timeline(*selector, owner, modifier)
            }

            EffectKind::Destroy { selector } => {
                let selector = *selector;
                Timeline::build(move |b| {
                    b.include(timelines::selector_resolution(selector, owner));
                    b.include_later(
                        |st: &mut EncounterState| {
                            collect_timelines(
                                st.take_selected_cards()
                                    .into_iter()
                                    .map(timelines::destroy_card),
                            )
                        },
                        |_| true,
                    );
                })
            }

            EffectKind::DamageDirectly { damage } => {
                let damage = damage.resolve(state) * multiplier;
                Timeline::build(move |b| {
                    b.include_later(
                        move |st: &mut EncounterState| {
                            timelines::damage_enemy(st.targeted_enemy_id(), damage, false)
                        },
                        |_| true,
                    );
                })
            }

            EffectKind::DamagePlayer { damage } => {
                let damage = damage.resolve(state) * multiplier;
                timelines::damage_player(damage, false, false)
            }

            EffectKind::Bounce { selector } => {
                let selector = *selector;
                Timeline::build(move |b| {
                    b.include(timelines::selector_resolution(selector, owner));
                    b.include_later(
                        |st: &mut EncounterState| {
                            collect_timelines(
                                st.take_selected_cards()
                                    .into_iter()
                                    .map(timelines::bounce_bullet),
                            )
                        },
                        |_| true,
                    );
                })
            }
        }
    }
}

/// Resolve the selector, then attach `modifier` to every selected card.
fn attach_modifier_timeline(
    selector: BulletSelector,
    owner: CardInstanceId,
    modifier: CardModifier,
) -> GameTimeline {
    Timeline::build(move |b| {
        b.include(timelines::selector_resolution(selector, owner));
        b.action(move |st: &mut EncounterState| {
            for card in st.take_selected_cards() {
                st.card_mut(card).add_modifier(modifier.clone());
            }
        });
    })
}

/// Cosmetic highlight of the granting card.
fn highlight_step(card: CardInstanceId) -> Step<EncounterState> {
    Step::instant(move |st: &mut EncounterState| st.request_card_highlight(card))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_value_const() {
        assert_eq!(EffectValue::Const(4), EffectValue::Const(4));
    }

    #[test]
    fn test_effect_serialization() {
        let effect = Effect::new(
            Trigger::OnEnter,
            EffectKind::ReserveGain {
                amount: EffectValue::Const(2),
            },
        );
        let json = serde_json::to_string(&effect).unwrap();
        let deserialized: Effect = serde_json::from_str(&json).unwrap();
        assert_eq!(effect, deserialized);
    }

    #[test]
    fn test_in_hand_builder() {
        let effect = Effect::new(
            Trigger::OnCardsDrawn,
            EffectKind::DamagePlayer {
                damage: EffectValue::Const(1),
            },
        )
        .in_hand();
        assert!(effect.trigger_in_hand);
    }
}
