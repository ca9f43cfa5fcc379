//! The turn/shoot orchestrator.
//!
//! [`GameController`] composes the scheduler, the trigger/effect resolution,
//! and the status-effect machinery: it owns the authoritative **main
//! schedule** (the UI is frozen exactly while it is non-empty), the
//! independent cosmetic **animation schedules**, the registered
//! [`GameAnimation`]s, and the input dispatch. All rule state lives in
//! [`EncounterState`]; the controller decides *when* pipelines run, the
//! factories in [`timelines`] decide *what* they do.

pub mod animation;
pub mod phase;
pub mod state;
pub mod timelines;

pub use animation::{AnimationRequest, GameAnimation};
pub use phase::GamePhase;
pub use state::{
    EncounterState, EncounterStats, Revolver, UiFlags, FIRING_SLOT, REVOLVER_SLOTS,
};

use crate::cards::CardPrototype;
use crate::core::{
    CardInstanceId, EncounterConfig, EnemyId, InputEvent, PopupEvent, RevolverRotation,
};
use crate::effects::{Trigger, TriggerInformation};
use crate::encounter::EncounterModifier;
use crate::enemy::EnemyPrototype;
use crate::timeline::{collect_timelines, Timeline};

/// A timeline over the encounter state.
pub type GameTimeline = Timeline<EncounterState>;

/// The orchestrator of one encounter.
pub struct GameController {
    state: EncounterState,
    main: GameTimeline,
    anim_timelines: Vec<GameTimeline>,
    pending_game_anims: Vec<Box<dyn GameAnimation>>,
    active_game_anims: Vec<Box<dyn GameAnimation>>,
    animation_requests: Vec<AnimationRequest>,
    frozen: bool,
    stopped: bool,
}

impl GameController {
    /// Set up a fresh encounter and queue the opening draw.
    #[must_use]
    pub fn new(
        config: EncounterConfig,
        prototypes: Vec<CardPrototype>,
        default_bullet: impl Into<String>,
        deck: &[String],
        enemies: &[EnemyPrototype],
        modifiers: Vec<EncounterModifier>,
        seed: u64,
    ) -> Self {
        log::info!("encounter starting");
        let mut state = EncounterState::new(
            config,
            prototypes,
            default_bullet,
            deck,
            enemies,
            modifiers,
            seed,
        );
        state.advance_turn_counter();
        state.choose_enemy_actions();

        let mut main = Timeline::new();
        main.start(&mut state);

        let first_draw = state.config().cards_to_draw_in_first_round;
        let opening = Timeline::build(move |b| {
            b.include(timelines::draw_cards(first_draw, false));
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
        });
        main.append(opening.into_step());

        Self {
            state,
            main,
            anim_timelines: Vec::new(),
            pending_game_anims: Vec::new(),
            active_game_anims: Vec::new(),
            animation_requests: Vec::new(),
            frozen: false,
            stopped: false,
        }
    }

    /// The encounter's authoritative state.
    #[must_use]
    pub fn state(&self) -> &EncounterState {
        &self.state
    }

    /// Mutable state access for the config/scripting boundary (e.g.
    /// targeting an enemy, adding a temporary modifier).
    pub fn state_mut(&mut self) -> &mut EncounterState {
        &mut self.state
    }

    /// True while the main schedule is non-empty and inputs are rejected.
    #[must_use]
    pub fn is_ui_frozen(&self) -> bool {
        self.frozen
    }

    /// True once the encounter was hard-stopped by player death.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    // === Tick ===

    /// Advance the encounter by one logical tick.
    ///
    /// Drives the main schedule, then the animation schedules and registered
    /// animations (cosmetic, never gating rules), then the validity passes.
    pub fn update(&mut self) {
        if self.stopped {
            return;
        }
        if self.state.player_lost() {
            self.stop();
            return;
        }

        if self.main.is_finished() && self.frozen {
            self.unfreeze_ui();
        }
        if !self.main.is_finished() && !self.frozen {
            self.freeze_ui();
        }

        self.main.update(&mut self.state);
        if self.state.player_lost() {
            self.stop();
            return;
        }

        for timeline in self.state.drain_anim_timelines() {
            self.anim_timelines.push(timeline);
        }
        let Self {
            anim_timelines,
            state,
            ..
        } = self;
        for timeline in anim_timelines.iter_mut() {
            if !timeline.has_been_started() {
                timeline.start(state);
            }
            timeline.update(state);
        }
        anim_timelines.retain(|timeline| !timeline.is_finished());

        self.update_game_animations();
        self.animation_requests
            .extend(self.state.drain_animation_requests());

        self.state.check_modifier_validity();
        self.state.update_status_validity();
    }

    /// Hard stop: abandon every in-flight schedule without running its
    /// remaining steps.
    pub fn stop(&mut self) {
        log::info!("encounter stopped, abandoning all schedules");
        self.stopped = true;
        self.main = Timeline::new();
        self.anim_timelines.clear();
        self.pending_game_anims.clear();
        self.active_game_anims.clear();
    }

    // === Input dispatch ===

    /// Dispatch an input event posted by the UI layer.
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::ShootRevolver => {
                let _ = self.shoot();
            }
            InputEvent::EndTurn => {
                let _ = self.end_turn();
            }
            InputEvent::DrawCard => {
                if self.state.phase().allows_drawing_cards() {
                    let _ = self.state.draw_one_card();
                }
            }
            InputEvent::PopupConfirmation => {
                self.state.post_popup_event(PopupEvent::Confirmation);
            }
            InputEvent::PopupSelection(slot) => {
                self.state.post_popup_event(PopupEvent::Selection(slot));
            }
            InputEvent::Parry => self.state.post_popup_event(PopupEvent::Parry),
        }
    }

    // === Player actions ===

    /// Shoot the revolver. Refused while the UI is frozen, outside the free
    /// phase, when a modifier vetoes shooting, or when the firing card's
    /// on-shot effects block.
    pub fn shoot(&mut self) -> bool {
        if self.stopped || self.frozen || !self.state.phase().allows_shooting() {
            return false;
        }
        if !self.state.can_shoot() {
            return false;
        }

        let card = self.state.revolver().card_in_slot(FIRING_SLOT);
        if let Some(card_id) = card {
            if self.state.card(card_id).blocks_on(Trigger::OnShot, &self.state) {
                log::debug!("card can't be shot because one of its effects blocks");
                return false;
            }
        }
        log::debug!("revolver is shooting, card = {card:?}");

        let rotation = card.map_or(RevolverRotation::Right(1), |card_id| {
            self.state.card(card_id).rotation
        });
        let targets: Vec<EnemyId> = if card.is_some_and(|card_id| self.state.card(card_id).is_spray)
        {
            self.state
                .enemies()
                .iter()
                .filter(|enemy| !enemy.is_defeated())
                .map(|enemy| enemy.id)
                .collect()
        } else {
            vec![self.state.targeted_enemy_id()]
        };

        // The shot's post-processing runs alongside the rule pipeline; both
        // must finish before the main schedule drains.
        let buffer = self.state.config().buffer_ticks;
        let cosmetic = Timeline::build(move |b| b.delay(buffer));
        let combined = Timeline::build(move |b| {
            b.parallel(vec![
                timelines::shoot(card, rotation, targets).into_step(),
                cosmetic.into_step(),
            ]);
        });
        self.append_main_timeline(combined);
        true
    }

    /// End the turn. Refused while frozen, outside the free phase, or after
    /// the encounter was already won.
    pub fn end_turn(&mut self) -> bool {
        if self.stopped || self.frozen || !matches!(self.state.phase(), GamePhase::Free) {
            return false;
        }
        if self.state.has_won() {
            log::debug!("encounter already won, end turn ignored");
            return false;
        }
        self.append_main_timeline(timelines::end_turn());
        true
    }

    /// Load a bullet from the hand into a revolver slot.
    ///
    /// Refused while frozen, when the card is not in the hand, when the
    /// occupant is protected, or when the reserves do not cover the cost.
    pub fn load_bullet(&mut self, card: CardInstanceId, slot: usize) -> bool {
        if self.stopped || self.frozen || !matches!(self.state.phase(), GamePhase::Free) {
            return false;
        }
        if !self.state.hand().contains(&card) {
            return false;
        }
        let occupant = self.state.revolver().card_in_slot(slot);
        if let Some(occupant) = occupant {
            if self.state.is_card_protected(occupant) {
                return false;
            }
        }
        let cost = self.state.card(card).cost;
        if !self.state.spend_reserves(cost) {
            return false;
        }
        log::debug!("loading bullet {} into revolver slot {slot}", self.state.card(card));
        self.state.remove_from_hand(card);

        let timeline = Timeline::build(move |b| {
            if let Some(occupant) = occupant {
                b.include(timelines::destroy_card(occupant));
            }
            b.action(move |st: &mut EncounterState| st.place_card_in_revolver(card, slot));
            b.include_later(
                move |st: &mut EncounterState| {
                    collect_timelines(
                        st.encounter_modifiers()
                            .iter()
                            .filter_map(|modifier| modifier.execute_after_bullet_placed(card, st))
                            .collect::<Vec<_>>(),
                    )
                },
                |_| true,
            );
            b.include_later(
                move |st: &mut EncounterState| {
                    timelines::check_effects_single_card(
                        st,
                        Trigger::OnEnter,
                        card,
                        &TriggerInformation::from_source(card),
                    )
                },
                |_| true,
            );
        });
        self.append_main_timeline(timeline);
        true
    }

    /// Enter the destroy-a-bullet phase. Refused outside the free phase.
    pub fn begin_card_destroy(&mut self) -> bool {
        if self.stopped || self.frozen || !matches!(self.state.phase(), GamePhase::Free) {
            return false;
        }
        self.state.change_phase(GamePhase::CardDestroy);
        true
    }

    /// Destroy the bullet in `slot` while in the destroy phase.
    pub fn destroy_bullet(&mut self, slot: usize) -> bool {
        if self.stopped || !matches!(self.state.phase(), GamePhase::CardDestroy) {
            return false;
        }
        let Some(card) = self.state.revolver().card_in_slot(slot) else {
            return false;
        };
        self.state.change_phase(GamePhase::Free);
        self.append_main_timeline(timelines::destroy_card(card));
        true
    }

    // === Schedules and animations ===

    /// Append a timeline to the authoritative main schedule.
    pub fn append_main_timeline(&mut self, timeline: GameTimeline) {
        self.main.append(timeline.into_step());
    }

    /// Register a cosmetic timeline, started on the next tick.
    pub fn dispatch_anim_timeline(&mut self, timeline: GameTimeline) {
        self.state.dispatch_anim_timeline(timeline);
    }

    /// Register a cosmetic animation driven once per tick. Animations whose
    /// resources are not ready are retried later and never block anything.
    pub fn play_animation(&mut self, mut anim: Box<dyn GameAnimation>) {
        if anim.is_ready() {
            anim.start();
            self.active_game_anims.push(anim);
        } else {
            self.pending_game_anims.push(anim);
        }
    }

    /// Drain the cosmetic requests rule resolution emitted for the
    /// rendering layer.
    #[must_use]
    pub fn take_animation_requests(&mut self) -> Vec<AnimationRequest> {
        std::mem::take(&mut self.animation_requests)
    }

    fn update_game_animations(&mut self) {
        let mut still_pending = Vec::new();
        for mut anim in self.pending_game_anims.drain(..) {
            if anim.is_ready() {
                anim.start();
                self.active_game_anims.push(anim);
            } else {
                still_pending.push(anim);
            }
        }
        self.pending_game_anims = still_pending;

        let mut still_active = Vec::new();
        for mut anim in self.active_game_anims.drain(..) {
            anim.update();
            if anim.is_finished() {
                anim.end();
            } else {
                still_active.push(anim);
            }
        }
        self.active_game_anims = still_active;
    }

    fn freeze_ui(&mut self) {
        self.frozen = true;
        log::debug!("froze UI");
    }

    fn unfreeze_ui(&mut self) {
        self.frozen = false;
        log::debug!("unfroze UI");
    }
}
