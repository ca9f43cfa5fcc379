//! The encounter's authoritative state.
//!
//! [`EncounterState`] is the explicit context object threaded through every
//! timeline step, effect, and hook; there is no ambient "current game"
//! anywhere. It owns the counters, the hand and card stack, the revolver,
//! the enemies, the status effects, the active encounter modifiers, the
//! phase machine, the single-slot popup mailbox, and the cosmetic animation
//! request queue.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardPrototype, ModifierValidity};
use crate::core::{
    CardInstanceId, Counters, EncounterConfig, EnemyId, GameRng, PopupEvent, RevolverRotation,
};
use crate::encounter::EncounterModifier;
use crate::enemy::{Enemy, EnemyPrototype};
use crate::status::StatusEffect;

use super::animation::AnimationRequest;
use super::phase::GamePhase;

/// Number of revolver slots.
pub const REVOLVER_SLOTS: usize = 5;

/// The slot that is fired, and the slot consulted for parrying.
pub const FIRING_SLOT: usize = 4;

/// The revolver cylinder: five slots, each holding at most one card.
#[derive(Clone, Debug, Default)]
pub struct Revolver {
    slots: [Option<CardInstanceId>; REVOLVER_SLOTS],
}

impl Revolver {
    /// The card in `slot`, if any.
    ///
    /// # Panics
    ///
    /// Panics on an out-of-range slot index.
    #[must_use]
    pub fn card_in_slot(&self, slot: usize) -> Option<CardInstanceId> {
        assert!(slot < REVOLVER_SLOTS, "invalid revolver slot: {slot}");
        self.slots[slot]
    }

    /// The slot `card` currently sits in.
    #[must_use]
    pub fn slot_of(&self, card: CardInstanceId) -> Option<usize> {
        self.slots.iter().position(|&slot| slot == Some(card))
    }

    /// Iterate over occupied slots as `(slot, card)` pairs.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, CardInstanceId)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|card| (index, card)))
    }

    fn set_card(&mut self, slot: usize, card: CardInstanceId) {
        assert!(slot < REVOLVER_SLOTS, "invalid revolver slot: {slot}");
        self.slots[slot] = Some(card);
    }

    fn clear_slot(&mut self, slot: usize) -> Option<CardInstanceId> {
        self.slots[slot].take()
    }

    fn remove_card(&mut self, card: CardInstanceId) -> Option<usize> {
        let slot = self.slot_of(card)?;
        self.slots[slot] = None;
        Some(slot)
    }

    fn rotate(&mut self, rotation: RevolverRotation) {
        let amount = rotation.amount() as usize % REVOLVER_SLOTS;
        match rotation {
            RevolverRotation::Right(_) => self.slots.rotate_right(amount),
            RevolverRotation::Left(_) => self.slots.rotate_left(amount),
            RevolverRotation::None => {}
        }
    }
}

/// Pure-state UI signals read by the rendering layer.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UiFlags {
    /// A confirmation popup is open.
    pub show_popup: bool,
    /// Text of the open confirmation popup.
    pub popup_text: String,
    /// The bullet-selection popup is open.
    pub show_selection_popup: bool,
    /// Card that must not be offered in the selection popup.
    pub selection_exclude: Option<CardInstanceId>,
    /// The draw indicator is visible.
    pub show_card_draw: bool,
    /// The destroy-a-bullet mode is active.
    pub destroy_mode: bool,
    /// The parry window is open.
    pub show_parry_popup: bool,
}

/// Counters reported to the persistence layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterStats {
    /// Bullets shot this encounter.
    pub bullets_shot: u32,
    /// Cards drawn this encounter.
    pub cards_drawn: u32,
    /// Total reserves spent.
    pub reserves_spent: i32,
    /// Enemies defeated.
    pub enemies_defeated: u32,
}

/// The authoritative state of one encounter.
pub struct EncounterState {
    config: EncounterConfig,

    prototypes: FxHashMap<String, CardPrototype>,
    default_bullet: String,
    cards: FxHashMap<CardInstanceId, Card>,
    next_card_id: u32,

    hand: Vec<CardInstanceId>,
    card_stack: VecDeque<CardInstanceId>,
    revolver: Revolver,

    enemies: Vec<Enemy>,
    targeted_enemy: usize,

    player_status_effects: Vec<StatusEffect>,
    encounter_modifiers: Vec<EncounterModifier>,

    phase: GamePhase,
    counters: Counters,
    stats: EncounterStats,

    cur_reserves: i32,
    player_lives: i32,
    player_lost: bool,
    has_won: bool,

    popup_event: Option<PopupEvent>,
    popup_request_open: bool,
    selected_cards: Vec<CardInstanceId>,
    parry_card: Option<CardInstanceId>,

    last_rotation: RevolverRotation,
    last_player_damage: i32,
    last_draw_amount: u32,

    pending_animations: Vec<AnimationRequest>,
    pending_anim_timelines: Vec<super::GameTimeline>,

    /// UI signals, freely readable by the rendering layer.
    pub ui: UiFlags,

    rng: GameRng,
}

impl EncounterState {
    /// Build the state for a fresh encounter.
    ///
    /// `deck` lists prototype names; each entry becomes one card on the
    /// (shuffled) stack.
    ///
    /// # Panics
    ///
    /// Panics when `deck` or `default_bullet` name a prototype that does not
    /// exist, or when no enemy is supplied; the config layer validates its
    /// data, so these are construction bugs.
    #[must_use]
    pub fn new(
        config: EncounterConfig,
        prototypes: Vec<CardPrototype>,
        default_bullet: impl Into<String>,
        deck: &[String],
        enemy_prototypes: &[EnemyPrototype],
        encounter_modifiers: Vec<EncounterModifier>,
        seed: u64,
    ) -> Self {
        assert!(!enemy_prototypes.is_empty(), "encounter needs at least one enemy");
        let default_bullet = default_bullet.into();
        assert!(
            prototypes.iter().any(|proto| proto.name == default_bullet),
            "unknown default bullet: {default_bullet}"
        );

        let prototypes: FxHashMap<String, CardPrototype> = prototypes
            .into_iter()
            .map(|proto| (proto.name.clone(), proto))
            .collect();

        let enemies: Vec<Enemy> = enemy_prototypes
            .iter()
            .enumerate()
            .map(|(index, proto)| Enemy::from_prototype(EnemyId::new(index as u32), proto))
            .collect();

        let player_lives = config.player_lives;
        let base_reserves = config.base_reserves;

        let mut state = Self {
            config,
            prototypes,
            default_bullet,
            cards: FxHashMap::default(),
            next_card_id: 0,
            hand: Vec::new(),
            card_stack: VecDeque::new(),
            revolver: Revolver::default(),
            enemies,
            targeted_enemy: 0,
            player_status_effects: Vec::new(),
            encounter_modifiers,
            phase: GamePhase::Free,
            counters: Counters::default(),
            stats: EncounterStats::default(),
            cur_reserves: base_reserves,
            player_lives,
            player_lost: false,
            has_won: false,
            popup_event: None,
            popup_request_open: false,
            selected_cards: Vec::new(),
            parry_card: None,
            last_rotation: RevolverRotation::None,
            last_player_damage: 0,
            last_draw_amount: 0,
            pending_animations: Vec::new(),
            pending_anim_timelines: Vec::new(),
            ui: UiFlags::default(),
            rng: GameRng::new(seed),
        };

        let mut stack: Vec<CardInstanceId> = deck
            .iter()
            .map(|name| state.create_card(name))
            .collect();
        state.rng.shuffle(&mut stack);
        state.card_stack = stack.into();
        log::debug!("card stack built with {} cards", state.card_stack.len());

        state
    }

    // === Configuration and counters ===

    /// The encounter's configuration.
    #[must_use]
    pub fn config(&self) -> &EncounterConfig {
        &self.config
    }

    /// The monotone turn/rotation counters.
    #[must_use]
    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// The persistence-boundary counters.
    #[must_use]
    pub fn stats(&self) -> &EncounterStats {
        &self.stats
    }

    /// Mutable access to the persistence-boundary counters.
    pub fn stats_mut(&mut self) -> &mut EncounterStats {
        &mut self.stats
    }

    /// Advance the turn counter by one.
    pub fn advance_turn_counter(&mut self) {
        self.counters.turn += 1;
        log::info!("turn: {}", self.counters.turn);
    }

    // === Cards ===

    /// Create a card instance from the named prototype.
    ///
    /// # Panics
    ///
    /// Panics on an unknown prototype name.
    pub fn create_card(&mut self, name: &str) -> CardInstanceId {
        let prototype = self
            .prototypes
            .get(name)
            .unwrap_or_else(|| panic!("unknown card: {name}"));
        let id = CardInstanceId::new(self.next_card_id);
        self.next_card_id += 1;
        self.cards.insert(id, Card::from_prototype(id, prototype));
        id
    }

    /// The card with the given id.
    ///
    /// # Panics
    ///
    /// Panics on an unknown id.
    #[must_use]
    pub fn card(&self, id: CardInstanceId) -> &Card {
        self.cards
            .get(&id)
            .unwrap_or_else(|| panic!("unknown card instance: {id}"))
    }

    /// Mutable access to the card with the given id.
    pub fn card_mut(&mut self, id: CardInstanceId) -> &mut Card {
        self.cards
            .get_mut(&id)
            .unwrap_or_else(|| panic!("unknown card instance: {id}"))
    }

    /// Every card instance created this encounter, in no particular order.
    pub fn created_cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    /// The card's current damage: base plus all valid modifier deltas,
    /// never below zero.
    #[must_use]
    pub fn card_damage(&self, id: CardInstanceId) -> i32 {
        let card = self.card(id);
        let delta: i32 = card
            .modifiers
            .iter()
            .filter(|modifier| self.modifier_valid(modifier))
            .map(|modifier| modifier.delta)
            .sum();
        (card.base_damage + delta).max(0)
    }

    /// Whether the modifier's validity condition currently holds.
    #[must_use]
    pub fn modifier_valid(&self, modifier: &crate::cards::CardModifier) -> bool {
        match modifier.validity {
            ModifierValidity::WhileSourceInPlay(source) => {
                self.cards.get(&source).is_some_and(|card| card.in_game)
            }
            ModifierValidity::Always => true,
        }
    }

    /// Whether a valid modifier marks the card as non-replaceable.
    #[must_use]
    pub fn is_card_protected(&self, id: CardInstanceId) -> bool {
        self.card(id)
            .modifiers
            .iter()
            .any(|modifier| modifier.protects && self.modifier_valid(modifier))
    }

    /// Validity pass: drop every modifier whose condition turned false.
    pub fn check_modifier_validity(&mut self) {
        let in_play: Vec<CardInstanceId> = self
            .cards
            .values()
            .filter(|card| card.in_game)
            .map(|card| card.id)
            .collect();
        for card in self.cards.values_mut() {
            card.modifiers.retain(|modifier| match modifier.validity {
                ModifierValidity::WhileSourceInPlay(source) => in_play.contains(&source),
                ModifierValidity::Always => true,
            });
        }
    }

    // === Hand and card stack ===

    /// The player's hand.
    #[must_use]
    pub fn hand(&self) -> &[CardInstanceId] {
        &self.hand
    }

    /// Cards that still fit into the hand.
    #[must_use]
    pub fn hand_capacity(&self) -> usize {
        self.config.hard_max_cards.saturating_sub(self.hand.len())
    }

    /// Add a card to the hand.
    pub fn add_card_to_hand(&mut self, id: CardInstanceId) {
        debug_assert!(self.hand.len() < self.config.hard_max_cards);
        log::debug!("card {} entered hand", self.card(id));
        self.hand.push(id);
    }

    /// Remove a card from the hand. Returns false if it was not there.
    pub fn remove_from_hand(&mut self, id: CardInstanceId) -> bool {
        match self.hand.iter().position(|&card| card == id) {
            Some(index) => {
                self.hand.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of cards left on the stack.
    #[must_use]
    pub fn stack_size(&self) -> usize {
        self.card_stack.len()
    }

    /// Put a card at the bottom of the stack.
    pub fn put_card_at_bottom_of_stack(&mut self, id: CardInstanceId) {
        self.card_stack.push_back(id);
    }

    /// Draw one card from the stack into the hand, materializing the
    /// default bullet when the stack is empty. Refused (returns false)
    /// outside a draw phase.
    pub fn draw_one_card(&mut self) -> bool {
        if self.phase.draw_kind().is_none() {
            return false;
        }
        let card = match self.card_stack.pop_front() {
            Some(card) => card,
            None => {
                let name = self.default_bullet.clone();
                log::debug!("card stack empty, materializing default bullet");
                self.create_card(&name)
            }
        };
        self.add_card_to_hand(card);
        self.stats.cards_drawn += 1;
        self.request_animation(AnimationRequest::OrbAnimation {
            card,
            to_deck: false,
        });
        match &mut self.phase {
            GamePhase::InitialDraw { remaining } | GamePhase::SpecialDraw { remaining } => {
                *remaining -= 1;
                if *remaining == 0 {
                    self.change_phase(GamePhase::Free);
                }
            }
            _ => unreachable!(),
        }
        true
    }

    /// Collapse the hand to the soft maximum; excess cards go to the bottom
    /// of the stack.
    pub fn collapse_hand_to_soft_max(&mut self) {
        while self.hand.len() > self.config.soft_max_cards {
            let card = self.hand.pop().expect("hand cannot be empty here");
            log::debug!("putting excess card {} under the deck", self.card(card));
            self.put_card_at_bottom_of_stack(card);
            self.request_animation(AnimationRequest::OrbAnimation { card, to_deck: true });
        }
    }

    // === Revolver ===

    /// The revolver cylinder.
    #[must_use]
    pub fn revolver(&self) -> &Revolver {
        &self.revolver
    }

    /// Put a card into a revolver slot and mark it in game.
    pub fn place_card_in_revolver(&mut self, id: CardInstanceId, slot: usize) {
        self.revolver.set_card(slot, id);
        self.card_mut(id).on_enter(slot);
        log::debug!("card {} entered revolver in slot {slot}", self.card(id));
    }

    /// Clear the card's revolver slot without touching its in-game flag.
    /// Returns the slot it occupied.
    pub fn clear_revolver_slot_of(&mut self, id: CardInstanceId) -> Option<usize> {
        self.revolver.remove_card(id)
    }

    /// Clear a slot by index, returning its occupant.
    pub fn clear_revolver_slot(&mut self, slot: usize) -> Option<CardInstanceId> {
        self.revolver.clear_slot(slot)
    }

    /// Physically rotate the revolver, advance the rotation counter, and
    /// notify every card in the cylinder.
    pub fn apply_rotation(&mut self, rotation: RevolverRotation) {
        self.last_rotation = rotation;
        self.revolver.rotate(rotation);
        self.counters.rotation += rotation.amount();
        if rotation.amount() > 0 {
            self.request_animation(AnimationRequest::RevolverSpin);
        }
        let occupants: Vec<CardInstanceId> = self.revolver.occupied().map(|(_, id)| id).collect();
        for card in occupants {
            self.card_mut(card).on_revolver_rotation(rotation);
        }
        log::debug!(
            "revolver rotated {rotation}, rotation counter now {}",
            self.counters.rotation
        );
    }

    /// The most recent physical rotation.
    #[must_use]
    pub fn last_rotation(&self) -> RevolverRotation {
        self.last_rotation
    }

    // === Enemies ===

    /// All enemies, defeated ones included.
    #[must_use]
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// The enemy with the given id.
    ///
    /// # Panics
    ///
    /// Panics on an unknown id.
    #[must_use]
    pub fn enemy(&self, id: EnemyId) -> &Enemy {
        self.enemies
            .iter()
            .find(|enemy| enemy.id == id)
            .unwrap_or_else(|| panic!("unknown enemy: {id}"))
    }

    /// Mutable access to the enemy with the given id.
    pub fn enemy_mut(&mut self, id: EnemyId) -> &mut Enemy {
        self.enemies
            .iter_mut()
            .find(|enemy| enemy.id == id)
            .unwrap_or_else(|| panic!("unknown enemy: {id}"))
    }

    /// The currently targeted enemy, falling back to the first one still
    /// standing when the target fell.
    #[must_use]
    pub fn targeted_enemy_id(&self) -> EnemyId {
        let targeted = &self.enemies[self.targeted_enemy];
        if !targeted.is_defeated() {
            return targeted.id;
        }
        self.enemies
            .iter()
            .find(|enemy| !enemy.is_defeated())
            .map_or(targeted.id, |enemy| enemy.id)
    }

    /// Select the enemy the player attacks. Refused for defeated enemies.
    pub fn target_enemy(&mut self, id: EnemyId) -> bool {
        match self
            .enemies
            .iter()
            .position(|enemy| enemy.id == id && !enemy.is_defeated())
        {
            Some(index) => {
                self.targeted_enemy = index;
                true
            }
            None => false,
        }
    }

    /// Fold an incoming damage amount through the enemy's status effects
    /// (shield absorption).
    pub fn fold_enemy_damage(&mut self, id: EnemyId, damage: i32) -> i32 {
        let enemy = self.enemy_mut(id);
        let mut damage = damage;
        for status in enemy.status_effects.iter_mut() {
            damage = status.modify_damage(damage);
        }
        damage
    }

    /// Deal already-modified damage to an enemy, tracking defeat and win.
    pub fn apply_enemy_damage(&mut self, id: EnemyId, damage: i32) {
        let enemy = self.enemy_mut(id);
        if enemy.is_defeated() {
            return;
        }
        enemy.health = (enemy.health - damage).max(0);
        let defeated = enemy.is_defeated();
        log::debug!(
            "enemy {} took {damage} damage, health now {}",
            self.enemy(id),
            self.enemy(id).health
        );
        if defeated {
            self.stats.enemies_defeated += 1;
            log::info!("enemy {} defeated", self.enemy(id));
            if self.enemies.iter().all(Enemy::is_defeated) {
                self.has_won = true;
                log::info!("all enemies defeated, player won");
            }
        }
    }

    /// Let every living enemy pick its action for the upcoming enemy phase.
    pub fn choose_enemy_actions(&mut self) {
        let Self { enemies, rng, .. } = self;
        for enemy in enemies.iter_mut().filter(|enemy| !enemy.is_defeated()) {
            enemy.choose_action(rng);
        }
    }

    /// Clear every enemy's chosen action after the enemy phase ran.
    pub fn reset_enemy_actions(&mut self) {
        for enemy in &mut self.enemies {
            enemy.reset_action();
        }
    }

    // === Status effects ===

    /// Status effects currently on the player.
    #[must_use]
    pub fn player_status_effects(&self) -> &[StatusEffect] {
        &self.player_status_effects
    }

    /// Apply a status effect to the player, stacking into an equivalent
    /// instance when possible.
    pub fn apply_status_to_player(&mut self, effect: StatusEffect) {
        log::debug!("status effect {} applied to player", effect.name());
        if let Some(existing) = self
            .player_status_effects
            .iter_mut()
            .find(|existing| existing.can_stack_with(&effect))
        {
            log::debug!("stacked with existing {}", existing.name());
            existing.stack(effect);
            return;
        }
        let mut effect = effect;
        effect.start(&self.counters);
        self.player_status_effects.push(effect);
    }

    /// Apply a status effect to an enemy, stacking into an equivalent
    /// instance when possible. No-op for defeated enemies.
    pub fn apply_status_to_enemy(&mut self, id: EnemyId, effect: StatusEffect) {
        let counters = self.counters;
        let enemy = self.enemy_mut(id);
        if enemy.is_defeated() {
            return;
        }
        log::debug!("status effect {} applied to enemy {id}", effect.name());
        if let Some(existing) = enemy
            .status_effects
            .iter_mut()
            .find(|existing| existing.can_stack_with(&effect))
        {
            log::debug!("stacked with existing {}", existing.name());
            existing.stack(effect);
            return;
        }
        let mut effect = effect;
        effect.start(&counters);
        enemy.status_effects.push(effect);
    }

    /// Validity pass: remove every expired status effect from the player
    /// and all enemies.
    pub fn update_status_validity(&mut self) {
        let counters = self.counters;
        self.player_status_effects.retain(|effect| {
            let valid = effect.is_still_valid(&counters);
            if !valid {
                log::debug!("player status effect {} expired", effect.name());
            }
            valid
        });
        for enemy in &mut self.enemies {
            enemy.status_effects.retain(|effect| {
                let valid = effect.is_still_valid(&counters);
                if !valid {
                    log::debug!("enemy status effect {} expired", effect.name());
                }
                valid
            });
        }
    }

    /// Fold an incoming damage amount through the player's status effects
    /// (shield absorption).
    pub fn fold_player_damage(&mut self, damage: i32) -> i32 {
        let mut damage = damage;
        for status in self.player_status_effects.iter_mut() {
            damage = status.modify_damage(damage);
        }
        damage
    }

    // === Encounter modifier folds ===

    /// The active encounter modifiers, in registration order.
    #[must_use]
    pub fn encounter_modifiers(&self) -> &[EncounterModifier] {
        &self.encounter_modifiers
    }

    /// Fold a requested rotation through all modifiers.
    #[must_use]
    pub fn fold_rotation(&self, rotation: RevolverRotation) -> RevolverRotation {
        self.encounter_modifiers
            .iter()
            .fold(rotation, |current, modifier| {
                modifier.modify_revolver_rotation(current)
            })
    }

    /// Whether status effects may currently be applied.
    #[must_use]
    pub fn should_apply_status_effects(&self) -> bool {
        self.encounter_modifiers
            .iter()
            .all(|modifier| modifier.should_apply_status_effects())
    }

    /// Whether any modifier disables everlasting cards.
    #[must_use]
    pub fn everlasting_disabled(&self) -> bool {
        self.encounter_modifiers
            .iter()
            .any(|modifier| modifier.disables_everlasting())
    }

    /// Whether the revolver may be shot at all.
    #[must_use]
    pub fn can_shoot(&self) -> bool {
        self.encounter_modifiers
            .iter()
            .all(|modifier| modifier.can_shoot_revolver(self))
    }

    /// The number of cards a draw of `base` cards actually yields, after
    /// modifier additions, multipliers, and the hand capacity cap.
    #[must_use]
    pub fn effective_draw_amount(&self, base: u32, special: bool) -> u32 {
        let additions: u32 = self
            .encounter_modifiers
            .iter()
            .map(|modifier| modifier.additional_cards_to_draw(special))
            .sum();
        let multiplier = self
            .encounter_modifiers
            .iter()
            .fold(1.0_f32, |acc, modifier| acc * modifier.draw_multiplier(special));
        let amount = ((base + additions) as f32 * multiplier).floor() as u32;
        amount.min(self.hand_capacity() as u32)
    }

    // === Phase machine ===

    /// The active phase.
    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Transition to a new phase, running the old phase's leave hook and
    /// the new phase's enter hook.
    ///
    /// Entering a draw phase resolves the requested amount against modifier
    /// scaling and the hand capacity; an empty draw falls through to `Free`
    /// immediately.
    pub fn change_phase(&mut self, new_phase: GamePhase) {
        let old = self.phase;
        if old == new_phase {
            return;
        }
        log::debug!("phase transition: {old} -> {new_phase}");

        match old {
            GamePhase::InitialDraw { .. } | GamePhase::SpecialDraw { .. } => {
                self.ui.show_card_draw = false;
            }
            GamePhase::CardDestroy => self.ui.destroy_mode = false,
            GamePhase::Free | GamePhase::EnemyAction => {}
        }

        match new_phase {
            GamePhase::InitialDraw { remaining } => self.enter_draw_phase(remaining, false),
            GamePhase::SpecialDraw { remaining } => self.enter_draw_phase(remaining, true),
            GamePhase::CardDestroy => {
                self.phase = GamePhase::CardDestroy;
                self.ui.destroy_mode = true;
            }
            GamePhase::Free | GamePhase::EnemyAction => self.phase = new_phase,
        }
    }

    fn enter_draw_phase(&mut self, requested: u32, special: bool) {
        let effective = self.effective_draw_amount(requested, special);
        self.last_draw_amount = effective;
        log::debug!("drawing cards: effective = {effective}, special = {special}");
        if effective == 0 {
            self.phase = GamePhase::Free;
            return;
        }
        self.phase = if special {
            GamePhase::SpecialDraw { remaining: effective }
        } else {
            GamePhase::InitialDraw { remaining: effective }
        };
        self.ui.show_card_draw = true;
    }

    /// How many cards the most recent draw phase actually drew.
    #[must_use]
    pub fn last_draw_amount(&self) -> u32 {
        self.last_draw_amount
    }

    // === Reserves and lives ===

    /// The player's current reserves.
    #[must_use]
    pub fn reserves(&self) -> i32 {
        self.cur_reserves
    }

    /// Grant reserves.
    pub fn gain_reserves(&mut self, amount: i32) {
        self.cur_reserves += amount;
        log::debug!("player gained reserves, amount = {amount}, now {}", self.cur_reserves);
    }

    /// Spend reserves; refused (returns false) when they do not suffice.
    pub fn spend_reserves(&mut self, cost: i32) -> bool {
        if cost > self.cur_reserves {
            return false;
        }
        self.cur_reserves -= cost;
        self.stats.reserves_spent += cost;
        log::debug!("player spent reserves, cost = {cost}, now {}", self.cur_reserves);
        true
    }

    /// Reset reserves to the configured base amount.
    pub fn reset_reserves(&mut self) {
        self.cur_reserves = self.config.base_reserves;
    }

    /// The player's remaining lives.
    #[must_use]
    pub fn player_lives(&self) -> i32 {
        self.player_lives
    }

    /// Deduct lives, never below zero.
    pub fn damage_player_lives(&mut self, damage: i32) {
        self.player_lives = (self.player_lives - damage).max(0);
        log::debug!(
            "player got damaged, damage = {damage}, lives now {}",
            self.player_lives
        );
    }

    /// The most recent player damage after status modification.
    #[must_use]
    pub fn last_player_damage(&self) -> i32 {
        self.last_player_damage
    }

    /// Record the player damage computed by the damage pipeline.
    pub fn set_last_player_damage(&mut self, damage: i32) {
        self.last_player_damage = damage;
    }

    /// Whether the player died; set by the death pipeline.
    #[must_use]
    pub fn player_lost(&self) -> bool {
        self.player_lost
    }

    /// Mark the player as dead. The orchestrator hard-stops all schedules.
    pub fn mark_player_lost(&mut self) {
        self.player_lost = true;
        log::info!("player lost the encounter");
    }

    /// Whether every enemy has been defeated.
    #[must_use]
    pub fn has_won(&self) -> bool {
        self.has_won
    }

    // === Popup mailbox ===

    /// The pending mailbox event, if any.
    #[must_use]
    pub fn popup_event(&self) -> Option<PopupEvent> {
        self.popup_event
    }

    /// Post an event into the mailbox (called by the input dispatch).
    pub fn post_popup_event(&mut self, event: PopupEvent) {
        self.popup_event = Some(event);
    }

    /// Consume the pending mailbox event.
    pub fn take_popup_event(&mut self) -> Option<PopupEvent> {
        self.popup_event.take()
    }

    /// Opens a popup request. At most one may be outstanding at a time.
    pub fn begin_popup_request(&mut self) {
        debug_assert!(
            !self.popup_request_open,
            "two popup requests outstanding at once"
        );
        self.popup_request_open = true;
    }

    /// Closes the current popup request.
    pub fn end_popup_request(&mut self) {
        self.popup_request_open = false;
    }

    /// The card available for parrying the current enemy attack.
    #[must_use]
    pub fn parry_card(&self) -> Option<CardInstanceId> {
        self.parry_card
    }

    /// Record the parry candidate for the current enemy attack.
    pub fn set_parry_card(&mut self, card: Option<CardInstanceId>) {
        self.parry_card = card;
    }

    // === Selection storage ===

    /// Store the result of a bullet-selector resolution.
    pub fn set_selected_cards(&mut self, cards: Vec<CardInstanceId>) {
        self.selected_cards = cards;
    }

    /// Take the stored selector result.
    #[must_use]
    pub fn take_selected_cards(&mut self) -> Vec<CardInstanceId> {
        std::mem::take(&mut self.selected_cards)
    }

    // === Animation requests ===

    /// Queue a cosmetic request for the rendering layer.
    pub fn request_animation(&mut self, request: AnimationRequest) {
        self.pending_animations.push(request);
    }

    /// Queue a card-highlight request.
    pub fn request_card_highlight(&mut self, card: CardInstanceId) {
        self.request_animation(AnimationRequest::CardHighlight(card));
    }

    /// Drain the queued cosmetic requests (called by the orchestrator).
    #[must_use]
    pub fn drain_animation_requests(&mut self) -> Vec<AnimationRequest> {
        std::mem::take(&mut self.pending_animations)
    }

    /// Dispatch a cosmetic timeline. It is started by the orchestrator on
    /// the next tick and runs independently of the main schedule.
    pub fn dispatch_anim_timeline(&mut self, timeline: super::GameTimeline) {
        self.pending_anim_timelines.push(timeline);
    }

    /// Drain the dispatched cosmetic timelines (called by the orchestrator).
    #[must_use]
    pub fn drain_anim_timelines(&mut self) -> Vec<super::GameTimeline> {
        std::mem::take(&mut self.pending_anim_timelines)
    }
}

impl std::fmt::Debug for EncounterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncounterState")
            .field("phase", &self.phase)
            .field("counters", &self.counters)
            .field("reserves", &self.cur_reserves)
            .field("player_lives", &self.player_lives)
            .field("hand", &self.hand.len())
            .field("stack", &self.card_stack.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> EncounterState {
        let prototypes = vec![
            CardPrototype::bullet("standardBullet", 4, 1),
            CardPrototype::bullet("heavyBullet", 7, 3),
        ];
        let deck: Vec<String> = (0..6).map(|_| "standardBullet".to_string()).collect();
        EncounterState::new(
            EncounterConfig::default(),
            prototypes,
            "standardBullet",
            &deck,
            &[EnemyPrototype::new("Outlaw", 20, 4)],
            Vec::new(),
            42,
        )
    }

    #[test]
    fn test_new_state() {
        let state = state();
        assert_eq!(state.stack_size(), 6);
        assert_eq!(state.hand().len(), 0);
        assert_eq!(state.phase(), GamePhase::Free);
        assert_eq!(state.reserves(), EncounterConfig::default().base_reserves);
    }

    #[test]
    #[should_panic(expected = "unknown card")]
    fn test_unknown_prototype_panics() {
        let mut state = state();
        let _ = state.create_card("nonexistent");
    }

    #[test]
    fn test_draw_phase_counts_down_to_free() {
        let mut state = state();
        state.change_phase(GamePhase::InitialDraw { remaining: 2 });
        assert!(state.ui.show_card_draw);

        assert!(state.draw_one_card());
        assert_eq!(state.phase(), GamePhase::InitialDraw { remaining: 1 });

        assert!(state.draw_one_card());
        assert_eq!(state.phase(), GamePhase::Free);
        assert!(!state.ui.show_card_draw);
        assert_eq!(state.hand().len(), 2);
        assert_eq!(state.stats().cards_drawn, 2);
    }

    #[test]
    fn test_draw_refused_outside_draw_phase() {
        let mut state = state();
        assert!(!state.draw_one_card());
        assert!(state.hand().is_empty());
    }

    #[test]
    fn test_empty_stack_materializes_default_bullet() {
        let mut state = state();
        state.change_phase(GamePhase::SpecialDraw { remaining: 8 });
        for _ in 0..7 {
            assert!(state.draw_one_card());
        }
        // Six stack cards plus one materialized default bullet.
        assert_eq!(state.hand().len(), 7);
        assert_eq!(state.stack_size(), 0);
        let last = *state.hand().last().unwrap();
        assert_eq!(state.card(last).name, "standardBullet");
    }

    #[test]
    fn test_draw_capped_by_hand_capacity() {
        let mut state = state();
        let capacity = state.hand_capacity() as u32;
        state.change_phase(GamePhase::SpecialDraw {
            remaining: capacity + 10,
        });
        assert_eq!(state.last_draw_amount(), capacity);
    }

    #[test]
    fn test_collapse_hand_to_soft_max() {
        let mut state = state();
        for _ in 0..state.config().soft_max_cards + 2 {
            let card = state.create_card("standardBullet");
            state.add_card_to_hand(card);
        }
        let stack_before = state.stack_size();

        state.collapse_hand_to_soft_max();

        assert_eq!(state.hand().len(), state.config().soft_max_cards);
        assert_eq!(state.stack_size(), stack_before + 2);
    }

    #[test]
    fn test_revolver_rotation_moves_cards_and_counter() {
        let mut state = state();
        let card = state.create_card("standardBullet");
        state.place_card_in_revolver(card, 0);

        state.apply_rotation(RevolverRotation::Right(1));

        assert_eq!(state.revolver().card_in_slot(1), Some(card));
        assert_eq!(state.counters().rotation, 1);

        state.apply_rotation(RevolverRotation::Left(1));
        assert_eq!(state.revolver().card_in_slot(0), Some(card));
        assert_eq!(state.counters().rotation, 2);
    }

    #[test]
    fn test_none_rotation_leaves_counter_unchanged() {
        let mut state = state();
        state.apply_rotation(RevolverRotation::None);
        assert_eq!(state.counters().rotation, 0);
    }

    #[test]
    fn test_card_damage_with_modifiers() {
        use crate::cards::CardModifier;

        let mut state = state();
        let source = state.create_card("standardBullet");
        let target = state.create_card("standardBullet");
        state.place_card_in_revolver(source, 0);
        state.place_card_in_revolver(target, 1);

        state.card_mut(target).add_modifier(CardModifier::new(
            3,
            "buff",
            ModifierValidity::WhileSourceInPlay(source),
        ));
        assert_eq!(state.card_damage(target), 7);

        // Source leaves play: the buff stops counting and the validity
        // pass removes it.
        state.clear_revolver_slot_of(source);
        state.card_mut(source).leave_game();
        assert_eq!(state.card_damage(target), 4);

        state.check_modifier_validity();
        assert!(state.card(target).modifiers.is_empty());
    }

    #[test]
    fn test_gift_modifier_survives_source_leaving() {
        use crate::cards::CardModifier;

        let mut state = state();
        let source = state.create_card("standardBullet");
        let target = state.create_card("standardBullet");
        state.place_card_in_revolver(target, 1);

        state
            .card_mut(target)
            .add_modifier(CardModifier::new(2, "gift", ModifierValidity::Always));
        state.check_modifier_validity();

        assert_eq!(state.card_damage(target), 6);
        let _ = source;
    }

    #[test]
    fn test_spend_reserves_refusal() {
        let mut state = state();
        let reserves = state.reserves();

        assert!(!state.spend_reserves(reserves + 1));
        assert_eq!(state.reserves(), reserves);

        assert!(state.spend_reserves(reserves));
        assert_eq!(state.reserves(), 0);
        assert_eq!(state.stats().reserves_spent, reserves);
    }

    #[test]
    fn test_status_stacking_on_player_keeps_one_instance() {
        let mut state = state();
        state.apply_status_to_player(StatusEffect::burning(2, 0.5));
        state.apply_status_to_player(StatusEffect::burning(3, 0.5));

        assert_eq!(state.player_status_effects().len(), 1);
    }

    #[test]
    fn test_status_expiry_pass() {
        let mut state = state();
        state.apply_status_to_player(StatusEffect::burning(2, 0.5));

        state.counters.rotation = 2;
        state.update_status_validity();

        assert!(state.player_status_effects().is_empty());
    }

    #[test]
    fn test_enemy_defeat_sets_win() {
        let mut state = state();
        let enemy = state.targeted_enemy_id();

        state.apply_enemy_damage(enemy, 20);

        assert!(state.enemy(enemy).is_defeated());
        assert!(state.has_won());
        assert_eq!(state.stats().enemies_defeated, 1);
    }

    #[test]
    fn test_frost_fold_forces_none() {
        let prototypes = vec![CardPrototype::bullet("standardBullet", 4, 1)];
        let state = EncounterState::new(
            EncounterConfig::default(),
            prototypes,
            "standardBullet",
            &[],
            &[EnemyPrototype::new("Outlaw", 20, 4)],
            vec![EncounterModifier::Frost],
            42,
        );

        assert_eq!(
            state.fold_rotation(RevolverRotation::Right(2)),
            RevolverRotation::None
        );
        assert!(state.everlasting_disabled());
    }

    #[test]
    fn test_modifier_fold_is_left_to_right() {
        // Frost forces None, BewitchedMist then leaves None alone; in the
        // opposite order the mist flips first and frost still wins.
        let prototypes = vec![CardPrototype::bullet("standardBullet", 4, 1)];
        let state = EncounterState::new(
            EncounterConfig::default(),
            prototypes,
            "standardBullet",
            &[],
            &[EnemyPrototype::new("Outlaw", 20, 4)],
            vec![EncounterModifier::BewitchedMist, EncounterModifier::Frost],
            42,
        );

        assert_eq!(
            state.fold_rotation(RevolverRotation::Right(2)),
            RevolverRotation::None
        );
    }

    #[test]
    fn test_popup_mailbox_single_slot() {
        let mut state = state();
        state.begin_popup_request();
        state.post_popup_event(PopupEvent::Confirmation);

        assert_eq!(state.take_popup_event(), Some(PopupEvent::Confirmation));
        assert_eq!(state.take_popup_event(), None);
        state.end_popup_request();
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "two popup requests")]
    fn test_second_popup_request_asserts() {
        let mut state = state();
        state.begin_popup_request();
        state.begin_popup_request();
    }
}
