//! Timeline factories for every rule pipeline.
//!
//! Each function builds (but does not run) the authoritative sequence of
//! steps for one pipeline: shooting, rotating, dealing damage, drawing,
//! destroying, the parry window, and the end-of-turn procession. Factories
//! defer every game read either into the steps themselves or into
//! `include_later` conditions, so a pipeline queued behind other work still
//! sees the state as it is at execution time.

use crate::core::{CardInstanceId, EnemyId, PopupEvent, RevolverRotation};
use crate::effects::{BulletSelector, Trigger, TriggerInformation};
use crate::enemy::EnemyAction;
use crate::status::{StatusEffect, StatusEffectTarget};
use crate::timeline::{collect_timelines, Step, Timeline};

use super::animation::AnimationRequest;
use super::phase::GamePhase;
use super::state::{EncounterState, FIRING_SLOT};
use super::GameTimeline;

// === Popups ===

/// A confirmation popup: shows `text`, suspends on the mailbox until any
/// event arrives, then closes. No timeout.
#[must_use]
pub fn confirmation_popup(text: String) -> GameTimeline {
    Timeline::build(move |b| {
        b.action(move |st: &mut EncounterState| {
            st.begin_popup_request();
            st.ui.show_popup = true;
            st.ui.popup_text = text;
        });
        b.delay_until(|st: &EncounterState| st.popup_event().is_some());
        b.action(|st: &mut EncounterState| {
            let _ = st.take_popup_event();
            st.ui.show_popup = false;
            st.ui.popup_text.clear();
            st.end_popup_request();
        });
    })
}

/// The bullet-selection popup: puts the UI into selecting state, suspends
/// until a slot selection arrives, stores the picked card, and cleans up.
///
/// # Panics
///
/// Panics when the UI reports a selection for an empty slot; the UI layer
/// only offers occupied slots.
#[must_use]
pub fn card_selection_popup(exclude: Option<CardInstanceId>) -> GameTimeline {
    Timeline::build(move |b| {
        b.action(move |st: &mut EncounterState| {
            st.begin_popup_request();
            st.ui.show_selection_popup = true;
            st.ui.selection_exclude = exclude;
        });
        b.delay_until(|st: &EncounterState| {
            matches!(st.popup_event(), Some(PopupEvent::Selection(_)))
        });
        b.action(|st: &mut EncounterState| {
            let Some(PopupEvent::Selection(slot)) = st.take_popup_event() else {
                unreachable!("selection wait resumed without a selection event");
            };
            let card = st
                .revolver()
                .card_in_slot(slot)
                .unwrap_or_else(|| panic!("selection event for empty revolver slot {slot}"));
            st.set_selected_cards(vec![card]);
            st.ui.show_selection_popup = false;
            st.ui.selection_exclude = None;
            st.end_popup_request();
        });
    })
}

/// Resolve a bullet selector into `selected_cards`.
#[must_use]
pub fn selector_resolution(selector: BulletSelector, owner: CardInstanceId) -> GameTimeline {
    match selector {
        BulletSelector::ByPredicate(predicate) => Timeline::build(move |b| {
            b.action(move |st: &mut EncounterState| {
                let owner_slot = st.revolver().slot_of(owner);
                let selected: Vec<CardInstanceId> = st
                    .revolver()
                    .occupied()
                    .filter(|&(slot, candidate)| {
                        predicate.admits(owner, owner_slot, candidate, slot)
                    })
                    .map(|(_, candidate)| candidate)
                    .collect();
                st.set_selected_cards(selected);
            });
        }),
        BulletSelector::ByPopup { include_self, .. } => {
            card_selection_popup(if include_self { None } else { Some(owner) })
        }
    }
}

// === Drawing and hand manipulation ===

/// Open a draw sub-phase for `amount` cards and wait until it completes,
/// then run the cards-drawn trigger resolutions.
///
/// The phase enter hook applies modifier scaling and the hand capacity cap;
/// a draw that caps to zero shows the hand-full notification instead.
#[must_use]
pub fn draw_cards(amount: u32, special: bool) -> GameTimeline {
    Timeline::build(move |b| {
        b.action(move |st: &mut EncounterState| {
            let phase = if special {
                GamePhase::SpecialDraw { remaining: amount }
            } else {
                GamePhase::InitialDraw { remaining: amount }
            };
            st.change_phase(phase);
        });
        b.include_later(
            |st: &mut EncounterState| {
                confirmation_popup(format!(
                    "hand reached maximum of {} cards",
                    st.config().hard_max_cards
                ))
            },
            move |st: &EncounterState| amount > 0 && st.last_draw_amount() == 0,
        );
        b.delay_until(|st: &EncounterState| matches!(st.phase(), GamePhase::Free));
        b.include_later(
            |st: &mut EncounterState| {
                let info = TriggerInformation::with_multiplier(st.last_draw_amount() as i32);
                check_effects_active_cards(st, Trigger::OnCardsDrawn, &info, None)
            },
            |st: &EncounterState| st.last_draw_amount() > 0,
        );
        b.include_later(
            |st: &mut EncounterState| {
                let info = TriggerInformation::with_multiplier(st.last_draw_amount() as i32);
                check_effects_active_cards(st, Trigger::OnSpecialCardsDrawn, &info, None)
            },
            move |st: &EncounterState| special && st.last_draw_amount() > 0,
        );
    })
}

/// Create up to `amount` instances of the named card directly in the hand,
/// capped by hand capacity; a full hand shows the notification instead.
#[must_use]
pub fn put_cards_in_hand(name: String, amount: u32) -> GameTimeline {
    Timeline::build(move |b| {
        b.include_later(
            move |st: &mut EncounterState| {
                let capacity = st.hand_capacity();
                if capacity == 0 {
                    return confirmation_popup(format!(
                        "hand reached maximum of {} cards",
                        st.config().hard_max_cards
                    ));
                }
                let count = capacity.min(amount as usize);
                Timeline::build(move |b| {
                    b.action(move |st: &mut EncounterState| {
                        for _ in 0..count {
                            let card = st.create_card(&name);
                            st.add_card_to_hand(card);
                        }
                    });
                })
            },
            |_| true,
        );
    })
}

/// Attach the soggy-card decay modifier (the moist encounter's doing).
#[must_use]
pub fn moisten_card(card: CardInstanceId) -> GameTimeline {
    use crate::cards::{CardModifier, ModifierValidity};
    Timeline::build(move |b| {
        b.action(move |st: &mut EncounterState| {
            let modifier = CardModifier::new(
                0,
                "moist modifier",
                ModifierValidity::WhileSourceInPlay(card),
            )
            .decaying();
            st.card_mut(card).add_modifier(modifier);
        });
    })
}

// === Card removal ===

/// Destroy a card in the revolver: clear its slot, run its on-destroy
/// resolution, then retire it.
#[must_use]
pub fn destroy_card(card: CardInstanceId) -> GameTimeline {
    Timeline::build(move |b| {
        b.action(move |st: &mut EncounterState| {
            st.clear_revolver_slot_of(card);
            st.request_card_highlight(card);
            log::debug!("destroyed card {}", st.card(card));
        });
        b.include_later(
            move |st: &mut EncounterState| {
                check_effects_single_card(
                    st,
                    Trigger::OnDestroy,
                    card,
                    &TriggerInformation::from_source(card),
                )
            },
            |_| true,
        );
        b.action(move |st: &mut EncounterState| st.card_mut(card).leave_game());
    })
}

/// Bounce a bullet out of the revolver; a copy of it returns to the hand.
///
/// # Panics
///
/// Panics when the card is not in the revolver.
#[must_use]
pub fn bounce_bullet(card: CardInstanceId) -> GameTimeline {
    Timeline::build(move |b| {
        b.action(move |st: &mut EncounterState| {
            assert!(
                st.revolver().slot_of(card).is_some(),
                "cannot bounce card {card} because it is not in the revolver"
            );
            st.clear_revolver_slot_of(card);
        });
        b.include_later(
            move |st: &mut EncounterState| {
                check_effects_single_card(
                    st,
                    Trigger::OnBounce,
                    card,
                    &TriggerInformation::from_source(card),
                )
            },
            |_| true,
        );
        b.action(move |st: &mut EncounterState| st.card_mut(card).leave_game());
        b.include_later(
            move |st: &mut EncounterState| put_cards_in_hand(st.card(card).name.clone(), 1),
            |_| true,
        );
    })
}

// === Damage ===

/// Damage the player.
///
/// Unless piercing, the amount is first amplified by burning-on-player and
/// then folded through shield absorption. Status-inflicted damage skips the
/// cosmetic feedback and the after-damage status hooks.
#[must_use]
pub fn damage_player(damage: i32, triggered_by_status: bool, piercing: bool) -> GameTimeline {
    Timeline::build(move |b| {
        b.action(move |st: &mut EncounterState| {
            let modified = if piercing {
                damage
            } else {
                let extra: i32 = st
                    .player_status_effects()
                    .iter()
                    .map(|status| status.additional_incoming_damage(damage))
                    .sum();
                st.fold_player_damage(damage + extra)
            };
            st.set_last_player_damage(modified);
        });
        b.step_later(
            Step::instant(|st: &mut EncounterState| {
                st.request_animation(AnimationRequest::ShieldFlash);
            }),
            move |st: &EncounterState| st.last_player_damage() < damage,
        );
        b.step_later(
            Step::instant(|st: &mut EncounterState| {
                st.dispatch_anim_timeline(Timeline::build(|b| {
                    b.action(|st: &mut EncounterState| {
                        st.request_animation(AnimationRequest::ScreenShake);
                    });
                    b.delay(2);
                    b.action(|st: &mut EncounterState| {
                        st.request_animation(AnimationRequest::DamageOverlay);
                    });
                }));
            }),
            move |st: &EncounterState| !triggered_by_status && st.last_player_damage() > 0,
        );
        b.action(|st: &mut EncounterState| {
            let damage = st.last_player_damage();
            st.damage_player_lives(damage);
        });
        b.include_later(
            |_| player_death(),
            |st: &EncounterState| st.player_lives() <= 0,
        );
        b.include_later(
            |st: &mut EncounterState| {
                let damage = st.last_player_damage();
                player_statuses_after_damage(st, damage)
            },
            move |st: &EncounterState| !triggered_by_status && st.last_player_damage() > 0,
        );
    })
}

/// Damage one enemy: fold through its shields, apply, then run its
/// after-damage status hooks (burning echo) against the raw amount.
#[must_use]
pub fn damage_enemy(enemy: EnemyId, damage: i32, triggered_by_status: bool) -> GameTimeline {
    Timeline::build(move |b| {
        b.action(move |st: &mut EncounterState| {
            let modified = st.fold_enemy_damage(enemy, damage);
            st.apply_enemy_damage(enemy, modified);
        });
        b.include_later(
            move |st: &mut EncounterState| enemy_statuses_after_damage(st, enemy, damage),
            move |_: &EncounterState| !triggered_by_status,
        );
    })
}

/// The hard stop: marks the player dead. The orchestrator abandons every
/// in-flight schedule when it sees the flag.
#[must_use]
pub fn player_death() -> GameTimeline {
    Timeline::build(|b| {
        b.action(|st: &mut EncounterState| st.mark_player_lost());
    })
}

// === Status application ===

/// Apply a status effect to an enemy, unless an active encounter modifier
/// currently disallows status-effect application.
#[must_use]
pub fn try_apply_status_to_enemy(effect: StatusEffect, enemy: EnemyId) -> GameTimeline {
    Timeline::build(move |b| {
        b.include_later(
            move |st: &mut EncounterState| {
                if !st.should_apply_status_effects() {
                    return Timeline::new();
                }
                Timeline::build(move |b| {
                    b.action(move |st: &mut EncounterState| {
                        st.apply_status_to_enemy(enemy, effect);
                    });
                })
            },
            |_| true,
        );
    })
}

/// Apply a status effect to the player, behind the same modifier gate.
#[must_use]
pub fn try_apply_status_to_player(effect: StatusEffect) -> GameTimeline {
    Timeline::build(move |b| {
        b.include_later(
            move |st: &mut EncounterState| {
                if !st.should_apply_status_effects() {
                    return Timeline::new();
                }
                Timeline::build(move |b| {
                    b.action(move |st: &mut EncounterState| st.apply_status_to_player(effect));
                })
            },
            |_| true,
        );
    })
}

// === Rotation ===

/// Rotate the revolver.
///
/// The requested rotation is folded through the encounter modifiers (in
/// registration order) and then through the player's status effects; the
/// resulting rotation physically moves the cylinder, advances the rotation
/// counter by its amount, notifies every card, and runs the post-rotation
/// resolutions.
#[must_use]
pub fn rotate_revolver(rotation: RevolverRotation, ignore_modifiers: bool) -> GameTimeline {
    Timeline::build(move |b| {
        b.action(move |st: &mut EncounterState| {
            let folded = if ignore_modifiers {
                rotation
            } else {
                st.fold_rotation(rotation)
            };
            let final_rotation = st
                .player_status_effects()
                .iter()
                .fold(folded, |current, status| {
                    status.modify_revolver_rotation(current)
                });
            st.apply_rotation(final_rotation);
        });
        b.include_later(
            |st: &mut EncounterState| {
                let rotation = st.last_rotation();
                collect_timelines(
                    st.encounter_modifiers()
                        .iter()
                        .filter_map(|modifier| {
                            modifier.execute_after_revolver_rotated(rotation, st)
                        })
                        .collect::<Vec<_>>(),
                )
            },
            |_| true,
        );
        b.include_later(
            |st: &mut EncounterState| {
                let info =
                    TriggerInformation::with_multiplier(st.last_rotation().amount() as i32);
                check_effects_active_cards(st, Trigger::OnRevolverRotation, &info, None)
            },
            |st: &EncounterState| st.last_rotation().amount() != 0,
        );
        b.include_later(
            |st: &mut EncounterState| enemy_statuses_after_rotation(st),
            |_| true,
        );
        b.include_later(
            |st: &mut EncounterState| player_statuses_after_rotation(st),
            |_| true,
        );
    })
}

// === Shooting ===

/// The shoot pipeline. The caller resolved the firing-slot card, its base
/// rotation, and the targeted enemies at the moment the trigger was pulled.
#[must_use]
pub fn shoot(
    card: Option<CardInstanceId>,
    rotation: RevolverRotation,
    targets: Vec<EnemyId>,
) -> GameTimeline {
    Timeline::build(move |b| {
        b.action(|st: &mut EncounterState| {
            st.request_animation(AnimationRequest::MuzzleFlash);
        });
        // Empty chamber: the player takes the configured damage and the
        // card-trigger resolution is skipped entirely.
        if card.is_none() {
            b.include_later(
                |st: &mut EncounterState| {
                    damage_player(st.config().shot_empty_damage, false, false)
                },
                |_| true,
            );
        }
        if let Some(card) = card {
            b.action(move |st: &mut EncounterState| {
                st.stats_mut().bullets_shot += 1;
                log::debug!("revolver is shooting card {}", st.card(card));
            });
            let damage_targets = targets.clone();
            b.include_later(
                move |st: &mut EncounterState| {
                    let damage = st.card_damage(card);
                    collect_timelines(
                        damage_targets
                            .iter()
                            .map(|&enemy| damage_enemy(enemy, damage, false))
                            .collect::<Vec<_>>(),
                    )
                },
                |_| true,
            );
            let info = TriggerInformation {
                targeted_enemies: targets,
                is_on_shot: true,
                ..TriggerInformation::default()
            };
            let leave_info = info.clone();
            b.include_later(
                move |st: &mut EncounterState| {
                    check_effects_single_card(st, Trigger::OnShot, card, &info)
                },
                |_| true,
            );
            b.include_later(
                move |st: &mut EncounterState| {
                    check_effects_single_card(st, Trigger::OnLeave, card, &leave_info)
                },
                move |st: &EncounterState| {
                    st.card(card)
                        .should_remove_after_shot(st.everlasting_disabled())
                },
            );
            b.action(move |st: &mut EncounterState| {
                if !st
                    .card(card)
                    .should_remove_after_shot(st.everlasting_disabled())
                {
                    return;
                }
                st.clear_revolver_slot_of(card);
                st.card_mut(card).leave_game();
                if st.card(card).is_undead {
                    st.add_card_to_hand(card);
                } else {
                    st.request_animation(AnimationRequest::OrbAnimation { card, to_deck: true });
                    st.put_card_at_bottom_of_stack(card);
                }
            });
        }
        b.include(rotate_revolver(rotation, false));
        b.include_later(
            move |st: &mut EncounterState| {
                collect_timelines(
                    st.encounter_modifiers()
                        .iter()
                        .filter_map(|modifier| modifier.execute_after_revolver_shot(card, st))
                        .collect::<Vec<_>>(),
                )
            },
            |_| true,
        );
    })
}

// === Enemy attacks and parrying ===

/// An enemy attack with the parry window.
///
/// When a card sits in the parry slot, the attack suspends on the mailbox:
/// a `Parry` event resolves the card against the attack (its damage is
/// subtracted, it leaves the revolver as after a shot, and its rotation
/// runs), a `Confirmation` lets the attack through. No timeout.
#[must_use]
pub fn enemy_attack(enemy: EnemyId, damage: i32, piercing: bool) -> GameTimeline {
    Timeline::build(move |b| {
        b.action(move |st: &mut EncounterState| {
            let parry_card = st.revolver().card_in_slot(FIRING_SLOT);
            st.set_parry_card(parry_card);
            if parry_card.is_some() {
                st.begin_popup_request();
                st.ui.show_parry_popup = true;
            }
            log::debug!(
                "enemy {enemy} attacking, damage = {damage}, parry card = {parry_card:?}"
            );
        });
        b.delay_until(|st: &EncounterState| {
            st.popup_event().is_some() || st.parry_card().is_none()
        });
        b.include_later(
            move |st: &mut EncounterState| {
                let card = st.parry_card().expect("parry branch without a parry card");
                let remaining = damage - st.card_damage(card);
                let rotation = st.card(card).rotation;
                Timeline::build(move |b| {
                    b.action(move |st: &mut EncounterState| {
                        let _ = st.take_popup_event();
                        log::debug!("player parried, remaining damage = {remaining}");
                    });
                    b.include_later(
                        move |st: &mut EncounterState| {
                            check_effects_single_card(
                                st,
                                Trigger::OnLeave,
                                card,
                                &TriggerInformation {
                                    is_on_shot: true,
                                    ..TriggerInformation::default()
                                },
                            )
                        },
                        move |st: &EncounterState| {
                            st.card(card)
                                .should_remove_after_shot(st.everlasting_disabled())
                        },
                    );
                    b.action(move |st: &mut EncounterState| {
                        st.ui.show_parry_popup = false;
                        st.end_popup_request();
                        if st
                            .card(card)
                            .should_remove_after_shot(st.everlasting_disabled())
                        {
                            st.clear_revolver_slot_of(card);
                            st.card_mut(card).leave_game();
                            if st.card(card).is_undead {
                                st.add_card_to_hand(card);
                            } else {
                                st.request_animation(AnimationRequest::OrbAnimation {
                                    card,
                                    to_deck: true,
                                });
                                st.put_card_at_bottom_of_stack(card);
                            }
                        }
                    });
                    b.include(rotate_revolver(rotation, false));
                    if remaining > 0 {
                        b.include(damage_player(remaining, false, piercing));
                    }
                })
            },
            |st: &EncounterState| {
                matches!(st.popup_event(), Some(PopupEvent::Parry)) && st.parry_card().is_some()
            },
        );
        b.include_later(
            move |_st: &mut EncounterState| {
                Timeline::build(move |b| {
                    b.action(|st: &mut EncounterState| {
                        let _ = st.take_popup_event();
                        st.ui.show_parry_popup = false;
                        st.end_popup_request();
                        log::debug!("player didn't parry");
                    });
                    b.include(damage_player(damage, false, piercing));
                })
            },
            |st: &EncounterState| {
                matches!(st.popup_event(), Some(PopupEvent::Confirmation))
                    || st.parry_card().is_none()
            },
        );
        b.action(|st: &mut EncounterState| st.set_parry_card(None));
    })
}

/// Run every living enemy's chosen action, then clear the choices.
#[must_use]
pub fn enemy_actions(state: &EncounterState) -> GameTimeline {
    let mut timeline = collect_timelines(
        state
            .enemies()
            .iter()
            .filter(|enemy| !enemy.is_defeated())
            .filter_map(|enemy| enemy.next_action.map(|action| (enemy.id, action)))
            .map(|(enemy, EnemyAction::Attack { damage })| enemy_attack(enemy, damage, false))
            .collect::<Vec<_>>(),
    );
    timeline.append(Step::instant(|st: &mut EncounterState| {
        st.reset_enemy_actions();
    }));
    timeline
}

// === Turn pipeline ===

/// The end-turn procession: end-of-turn hooks, hand collapse, turn counter,
/// enemy phase (with parry windows), new-turn status hooks, reserves reset,
/// the turn draw, turn-start hooks, and the closing trigger resolutions.
#[must_use]
pub fn end_turn() -> GameTimeline {
    Timeline::build(|b| {
        b.include_later(
            |st: &mut EncounterState| {
                collect_timelines(
                    st.encounter_modifiers()
                        .iter()
                        .filter_map(|modifier| modifier.execute_on_end_turn(st))
                        .collect::<Vec<_>>(),
                )
            },
            |_| true,
        );
        b.include_later(
            |st: &mut EncounterState| {
                check_effects_active_cards(
                    st,
                    Trigger::OnRoundEnd,
                    &TriggerInformation::default(),
                    None,
                )
            },
            |_| true,
        );
        b.action(|st: &mut EncounterState| st.collapse_hand_to_soft_max());
        b.action(|st: &mut EncounterState| st.advance_turn_counter());
        b.action(|st: &mut EncounterState| {
            st.request_animation(AnimationRequest::TurnBanner { player: false });
            st.change_phase(GamePhase::EnemyAction);
        });
        b.include_later(|st: &mut EncounterState| enemy_actions(st), |_| true);
        b.include_later(
            |st: &mut EncounterState| player_statuses_on_new_turn(st),
            |_| true,
        );
        b.action(|st: &mut EncounterState| {
            st.choose_enemy_actions();
            st.request_animation(AnimationRequest::TurnBanner { player: true });
            st.change_phase(GamePhase::Free);
        });
        b.action(|st: &mut EncounterState| st.reset_reserves());
        b.include_later(
            |st: &mut EncounterState| draw_cards(st.config().cards_to_draw, false),
            |_| true,
        );
        b.include_later(
            |st: &mut EncounterState| {
                collect_timelines(
                    st.encounter_modifiers()
                        .iter()
                        .filter_map(|modifier| modifier.execute_on_turn_start(st))
                        .collect::<Vec<_>>(),
                )
            },
            |_| true,
        );
        b.include_later(
            |st: &mut EncounterState| enemy_statuses_on_new_turn(st),
            |_| true,
        );
        b.action(|st: &mut EncounterState| st.update_status_validity());
        b.include_later(
            |st: &mut EncounterState| {
                check_effects_active_cards(
                    st,
                    Trigger::OnRoundStart,
                    &TriggerInformation::default(),
                    None,
                )
            },
            |_| true,
        );
    })
}

// === Trigger resolution ===

/// Check one card's effects against a fired trigger.
///
/// Effects participate while their card is in the revolver, or from the
/// hand when flagged for it.
#[must_use]
pub fn check_effects_single_card(
    state: &EncounterState,
    trigger: Trigger,
    card: CardInstanceId,
    info: &TriggerInformation,
) -> GameTimeline {
    log::debug!(
        "checking effects of card {} for trigger {trigger:?}",
        state.card(card)
    );
    let card_ref = state.card(card);
    let in_hand = state.hand().contains(&card);
    let in_game = card_ref.in_game;
    collect_timelines(
        card_ref
            .effects
            .iter()
            .filter(|effect| in_game || (in_hand && effect.trigger_in_hand))
            .filter_map(|effect| effect.check_trigger(trigger, card, info, state))
            .collect::<Vec<_>>(),
    )
}

/// Check every active card (in the revolver or, for hand-triggered effects,
/// in the hand) against a fired trigger, in id order.
#[must_use]
pub fn check_effects_active_cards(
    state: &EncounterState,
    trigger: Trigger,
    info: &TriggerInformation,
    exclude: Option<CardInstanceId>,
) -> GameTimeline {
    log::debug!("checking all active cards for trigger {trigger:?}");
    let mut cards: Vec<CardInstanceId> = state
        .created_cards()
        .filter(|card| card.in_game || state.hand().contains(&card.id))
        .map(|card| card.id)
        .filter(|&id| Some(id) != exclude)
        .collect();
    cards.sort_by_key(|card| card.raw());
    collect_timelines(
        cards
            .into_iter()
            .map(|card| check_effects_single_card(state, trigger, card, info))
            .collect::<Vec<_>>(),
    )
}

// === Status hook collectors ===

fn player_statuses_after_rotation(state: &EncounterState) -> GameTimeline {
    let rotation = state.last_rotation();
    collect_timelines(
        state
            .player_status_effects()
            .iter()
            .filter_map(|status| {
                status.execute_after_rotation(rotation, StatusEffectTarget::Player, state)
            })
            .collect::<Vec<_>>(),
    )
}

fn enemy_statuses_after_rotation(state: &EncounterState) -> GameTimeline {
    let rotation = state.last_rotation();
    collect_timelines(
        state
            .enemies()
            .iter()
            .filter(|enemy| !enemy.is_defeated())
            .flat_map(|enemy| {
                enemy.status_effects.iter().filter_map(move |status| {
                    status.execute_after_rotation(
                        rotation,
                        StatusEffectTarget::Enemy(enemy.id),
                        state,
                    )
                })
            })
            .collect::<Vec<_>>(),
    )
}

fn player_statuses_after_damage(state: &EncounterState, damage: i32) -> GameTimeline {
    collect_timelines(
        state
            .player_status_effects()
            .iter()
            .filter_map(|status| {
                status.execute_after_damage(damage, StatusEffectTarget::Player, state)
            })
            .collect::<Vec<_>>(),
    )
}

fn enemy_statuses_after_damage(
    state: &EncounterState,
    enemy: EnemyId,
    damage: i32,
) -> GameTimeline {
    collect_timelines(
        state
            .enemy(enemy)
            .status_effects
            .iter()
            .filter_map(|status| {
                status.execute_after_damage(damage, StatusEffectTarget::Enemy(enemy), state)
            })
            .collect::<Vec<_>>(),
    )
}

fn player_statuses_on_new_turn(state: &EncounterState) -> GameTimeline {
    collect_timelines(
        state
            .player_status_effects()
            .iter()
            .filter_map(|status| status.execute_on_new_turn(StatusEffectTarget::Player, state))
            .collect::<Vec<_>>(),
    )
}

fn enemy_statuses_on_new_turn(state: &EncounterState) -> GameTimeline {
    collect_timelines(
        state
            .enemies()
            .iter()
            .filter(|enemy| !enemy.is_defeated())
            .flat_map(|enemy| {
                enemy.status_effects.iter().filter_map(move |status| {
                    status.execute_on_new_turn(StatusEffectTarget::Enemy(enemy.id), state)
                })
            })
            .collect::<Vec<_>>(),
    )
}
