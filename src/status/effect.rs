//! Status-effect state machine.
//!
//! A status effect moves through `Applied → Valid* → Expired`: applying it
//! snapshots the relevant global counter, the owner polls
//! [`StatusEffect::is_still_valid`] every tick, and the first `false` removes
//! it. Same-kind effects stack into one instance instead of coexisting.

use serde::{Deserialize, Serialize};

use crate::controller::{EncounterState, GameTimeline};
use crate::core::{Counters, RevolverRotation};
use crate::timeline::Timeline;

use super::target::StatusEffectTarget;

/// Classification used for blocking between status effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusEffectType {
    Fire,
    Poison,
    Witch,
    Blocking,
    Other,
}

/// What the effect does.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StatusKind {
    /// After the carrier takes damage, it takes `floor(damage * percent)`
    /// additional damage. Meant for enemies.
    Burning { percent: f32 },

    /// Incoming enemy attacks against the carrier are increased by
    /// `floor(damage * percent)`. The player-side counterpart of burning.
    BurningPlayer { percent: f32 },

    /// The carrier takes `damage` at the start of every new turn.
    Poison { damage: i32 },

    /// Blocks fire effects on the carrier.
    FireResistance,

    /// Inverts the carrier's revolver rotations.
    Bewitched,

    /// Absorbs incoming damage until its pool is spent.
    Shield { amount: i32 },
}

/// How long the effect lives.
///
/// Rotation- and turn-based lifetimes snapshot the corresponding global
/// counter when the effect starts; the effect is valid while
/// `counter < snapshot + duration`. `forever` suspends expiry entirely.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StatusLifetime {
    /// Expires after `duration` revolver rotations.
    Rotations {
        duration: u32,
        started_at: Option<u32>,
        forever: bool,
        /// Snapshot one rotation late, ignoring the rotation of the shot
        /// that applied the effect.
        skip_first: bool,
    },

    /// Expires after `duration` turns.
    Turns {
        duration: u32,
        started_at: Option<u32>,
        forever: bool,
    },

    /// Expires when either window closes (turns or rotations).
    TurnsAndRotations {
        turns: u32,
        rotations: u32,
        turn_started_at: Option<u32>,
        rotation_started_at: Option<u32>,
        skip_first: bool,
    },

    /// Valid while the effect's own pool is positive (shield).
    WhileCharged,
}

impl StatusLifetime {
    /// A rotation-based lifetime.
    #[must_use]
    pub fn rotations(duration: u32) -> Self {
        Self::Rotations {
            duration,
            started_at: None,
            forever: false,
            skip_first: false,
        }
    }

    /// A turn-based lifetime.
    #[must_use]
    pub fn turns(duration: u32) -> Self {
        Self::Turns {
            duration,
            started_at: None,
            forever: false,
        }
    }

    fn start(&mut self, counters: &Counters) {
        match self {
            Self::Rotations {
                started_at, skip_first, ..
            } => {
                let skip = u32::from(*skip_first);
                *started_at = Some(counters.rotation + skip);
            }
            Self::Turns { started_at, .. } => *started_at = Some(counters.turn),
            Self::TurnsAndRotations {
                turn_started_at,
                rotation_started_at,
                skip_first,
                ..
            } => {
                let skip = u32::from(*skip_first);
                *turn_started_at = Some(counters.turn);
                *rotation_started_at = Some(counters.rotation + skip);
            }
            Self::WhileCharged => {}
        }
    }

    fn is_still_valid(&self, counters: &Counters) -> bool {
        match *self {
            Self::Rotations {
                duration,
                started_at,
                forever,
                ..
            } => match started_at {
                Some(start) => forever || counters.rotation < start + duration,
                None => true,
            },
            Self::Turns {
                duration,
                started_at,
                forever,
            } => match started_at {
                Some(start) => forever || counters.turn < start + duration,
                None => true,
            },
            Self::TurnsAndRotations {
                turns,
                rotations,
                turn_started_at,
                rotation_started_at,
                ..
            } => {
                let turns_open = match turn_started_at {
                    Some(start) => counters.turn < start + turns,
                    None => true,
                };
                let rotations_open = match rotation_started_at {
                    Some(start) => counters.rotation < start + rotations,
                    None => true,
                };
                turns_open && rotations_open
            }
            Self::WhileCharged => true,
        }
    }

    fn stack(&mut self, other: &StatusLifetime) {
        match (self, other) {
            (
                Self::Rotations {
                    duration, forever, ..
                },
                Self::Rotations {
                    duration: other_duration,
                    forever: other_forever,
                    ..
                },
            ) => {
                *duration += other_duration;
                *forever |= other_forever;
            }
            (
                Self::Turns {
                    duration, forever, ..
                },
                Self::Turns {
                    duration: other_duration,
                    forever: other_forever,
                    ..
                },
            ) => {
                *duration += other_duration;
                *forever |= other_forever;
            }
            (
                Self::TurnsAndRotations { turns, rotations, .. },
                Self::TurnsAndRotations {
                    turns: other_turns,
                    rotations: other_rotations,
                    ..
                },
            ) => {
                *turns += other_turns;
                *rotations += other_rotations;
            }
            (Self::WhileCharged, Self::WhileCharged) => {}
            _ => unreachable!("stacked status effects with mismatched lifetimes"),
        }
    }
}

/// A time-boxed modifier applied to the player or an enemy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    /// What the effect does.
    pub kind: StatusKind,

    /// How long it lives.
    pub lifetime: StatusLifetime,
}

impl StatusEffect {
    /// Burning: echoes a percentage of every damage instance.
    #[must_use]
    pub fn burning(rotations: u32, percent: f32) -> Self {
        Self {
            kind: StatusKind::Burning { percent },
            lifetime: StatusLifetime::rotations(rotations),
        }
    }

    /// Burning on the player: incoming attacks hit harder.
    #[must_use]
    pub fn burning_player(rotations: u32, percent: f32) -> Self {
        Self {
            kind: StatusKind::BurningPlayer { percent },
            lifetime: StatusLifetime::rotations(rotations),
        }
    }

    /// Poison: damage at the start of each new turn.
    #[must_use]
    pub fn poison(turns: u32, damage: i32) -> Self {
        Self {
            kind: StatusKind::Poison { damage },
            lifetime: StatusLifetime::turns(turns),
        }
    }

    /// Fire resistance: blocks fire effects on the carrier.
    #[must_use]
    pub fn fire_resistance(turns: u32) -> Self {
        Self {
            kind: StatusKind::FireResistance,
            lifetime: StatusLifetime::turns(turns),
        }
    }

    /// Bewitched: the carrier's rotations turn left.
    #[must_use]
    pub fn bewitched(turns: u32, rotations: u32) -> Self {
        Self {
            kind: StatusKind::Bewitched,
            lifetime: StatusLifetime::TurnsAndRotations {
                turns,
                rotations,
                turn_started_at: None,
                rotation_started_at: None,
                skip_first: false,
            },
        }
    }

    /// Shield: absorbs incoming damage.
    #[must_use]
    pub fn shield(amount: i32) -> Self {
        Self {
            kind: StatusKind::Shield { amount },
            lifetime: StatusLifetime::WhileCharged,
        }
    }

    /// Snapshot the counter state before expiry, ignoring the first
    /// rotation (for effects applied by the shot itself).
    #[must_use]
    pub fn skipping_first_rotation(mut self) -> Self {
        match &mut self.lifetime {
            StatusLifetime::Rotations { skip_first, .. }
            | StatusLifetime::TurnsAndRotations { skip_first, .. } => *skip_first = true,
            _ => {}
        }
        self
    }

    /// Suspend expiry entirely.
    #[must_use]
    pub fn lasting_forever(mut self) -> Self {
        match &mut self.lifetime {
            StatusLifetime::Rotations { forever, .. } | StatusLifetime::Turns { forever, .. } => {
                *forever = true;
            }
            _ => {}
        }
        self
    }

    /// Short identifier used for logging and icon lookup.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self.kind {
            StatusKind::Burning { .. } | StatusKind::BurningPlayer { .. } => "burning",
            StatusKind::Poison { .. } => "poison",
            StatusKind::FireResistance => "fireresistance",
            StatusKind::Bewitched => "bewitched",
            StatusKind::Shield { .. } => "shield",
        }
    }

    /// Classification for blocking.
    #[must_use]
    pub fn effect_type(&self) -> StatusEffectType {
        match self.kind {
            StatusKind::Burning { .. } | StatusKind::BurningPlayer { .. } => StatusEffectType::Fire,
            StatusKind::Poison { .. } => StatusEffectType::Poison,
            StatusKind::FireResistance => StatusEffectType::Blocking,
            StatusKind::Bewitched => StatusEffectType::Witch,
            StatusKind::Shield { .. } => StatusEffectType::Other,
        }
    }

    /// Status types this effect blocks on its carrier.
    #[must_use]
    pub fn blocked_types(&self) -> &'static [StatusEffectType] {
        match self.kind {
            StatusKind::FireResistance => &[StatusEffectType::Fire],
            _ => &[],
        }
    }

    /// Applied → Valid: snapshot the relevant counters.
    pub fn start(&mut self, counters: &Counters) {
        self.lifetime.start(counters);
    }

    /// Polled by the owner each tick; the first `false` removes the effect.
    #[must_use]
    pub fn is_still_valid(&self, counters: &Counters) -> bool {
        match self.kind {
            StatusKind::Shield { amount } => amount > 0,
            _ => self.lifetime.is_still_valid(counters),
        }
    }

    /// Whether `other` merges into this instance instead of coexisting.
    #[must_use]
    pub fn can_stack_with(&self, other: &StatusEffect) -> bool {
        match (&self.kind, &other.kind) {
            (StatusKind::Burning { percent }, StatusKind::Burning { percent: other_percent })
            | (
                StatusKind::BurningPlayer { percent },
                StatusKind::BurningPlayer {
                    percent: other_percent,
                },
            ) => percent == other_percent,
            (StatusKind::Poison { .. }, StatusKind::Poison { .. })
            | (StatusKind::FireResistance, StatusKind::FireResistance)
            | (StatusKind::Bewitched, StatusKind::Bewitched)
            | (StatusKind::Shield { .. }, StatusKind::Shield { .. }) => true,
            _ => false,
        }
    }

    /// Merge `other` into this instance. Must only be called after
    /// [`StatusEffect::can_stack_with`] returned true.
    pub fn stack(&mut self, other: StatusEffect) {
        debug_assert!(self.can_stack_with(&other));
        self.lifetime.stack(&other.lifetime);
        match (&mut self.kind, other.kind) {
            (StatusKind::Poison { damage }, StatusKind::Poison { damage: other_damage }) => {
                *damage += other_damage;
            }
            (StatusKind::Shield { amount }, StatusKind::Shield { amount: other_amount }) => {
                *amount += other_amount;
            }
            _ => {}
        }
    }

    /// Lets the effect absorb or amplify damage dealt to its carrier.
    /// Returns the damage that remains.
    pub fn modify_damage(&mut self, damage: i32) -> i32 {
        match &mut self.kind {
            StatusKind::Shield { amount } => {
                let leftover = *amount - damage;
                *amount = leftover.max(0);
                if leftover < 0 {
                    -leftover
                } else {
                    0
                }
            }
            _ => damage,
        }
    }

    /// Lets the effect transform a rotation performed by its carrier.
    #[must_use]
    pub fn modify_revolver_rotation(&self, rotation: RevolverRotation) -> RevolverRotation {
        match self.kind {
            StatusKind::Bewitched => match rotation {
                RevolverRotation::Right(amount) | RevolverRotation::Left(amount) => {
                    RevolverRotation::Left(amount)
                }
                RevolverRotation::None => RevolverRotation::None,
            },
            _ => rotation,
        }
    }

    /// Extra damage an enemy attack deals to the carrier.
    #[must_use]
    pub fn additional_incoming_damage(&self, damage: i32) -> i32 {
        match self.kind {
            StatusKind::BurningPlayer { percent } => floor_fraction(damage, percent),
            _ => 0,
        }
    }

    /// Consequences after the carrier's revolver rotated. `None` means no
    /// consequence.
    #[must_use]
    pub fn execute_after_rotation(
        &self,
        _rotation: RevolverRotation,
        _target: StatusEffectTarget,
        _state: &EncounterState,
    ) -> Option<GameTimeline> {
        None
    }

    /// Consequences at the start of a new turn.
    #[must_use]
    pub fn execute_on_new_turn(
        &self,
        target: StatusEffectTarget,
        state: &EncounterState,
    ) -> Option<GameTimeline> {
        match self.kind {
            StatusKind::Poison { damage } => {
                if target.is_blocked(self, state) {
                    return Some(Timeline::new());
                }
                Some(target.damage_timeline(damage))
            }
            _ => None,
        }
    }

    /// Consequences after the carrier took damage.
    #[must_use]
    pub fn execute_after_damage(
        &self,
        damage: i32,
        target: StatusEffectTarget,
        state: &EncounterState,
    ) -> Option<GameTimeline> {
        match self.kind {
            StatusKind::Burning { percent } => {
                if matches!(target, StatusEffectTarget::Player) {
                    log::warn!(
                        "burning should only be used on enemies, consider burning_player instead"
                    );
                }
                if target.is_blocked(self, state) {
                    return Some(Timeline::new());
                }
                Some(target.damage_timeline(floor_fraction(damage, percent)))
            }
            _ => None,
        }
    }

    /// Text for the status icon, e.g. remaining duration.
    #[must_use]
    pub fn display_text(&self, counters: &Counters) -> String {
        match (&self.kind, &self.lifetime) {
            (StatusKind::Shield { amount }, _) => amount.to_string(),
            (
                StatusKind::Poison { damage },
                StatusLifetime::Turns {
                    duration,
                    started_at,
                    forever,
                },
            ) => {
                let turns = if *forever {
                    "inf".to_string()
                } else {
                    remaining(counters.turn, *started_at, *duration).to_string()
                };
                format!("{damage}, {turns}")
            }
            (
                _,
                StatusLifetime::Rotations {
                    duration,
                    started_at,
                    forever,
                    ..
                },
            ) => {
                if *forever {
                    "inf".to_string()
                } else {
                    remaining(counters.rotation, *started_at, *duration)
                        .min(*duration)
                        .to_string()
                }
            }
            (
                _,
                StatusLifetime::Turns {
                    duration,
                    started_at,
                    forever,
                },
            ) => {
                if *forever {
                    "inf".to_string()
                } else {
                    remaining(counters.turn, *started_at, *duration).to_string()
                }
            }
            (
                _,
                StatusLifetime::TurnsAndRotations {
                    turns,
                    rotations,
                    turn_started_at,
                    rotation_started_at,
                    ..
                },
            ) => {
                let t = remaining(counters.turn, *turn_started_at, *turns);
                let r = remaining(counters.rotation, *rotation_started_at, *rotations).min(*rotations);
                format!("{t}, {r}")
            }
            (_, StatusLifetime::WhileCharged) => String::new(),
        }
    }
}

fn remaining(counter: u32, started_at: Option<u32>, duration: u32) -> u32 {
    match started_at {
        Some(start) => (start + duration).saturating_sub(counter),
        None => duration,
    }
}

fn floor_fraction(damage: i32, percent: f32) -> i32 {
    (damage as f32 * percent).floor() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_lifetime_window() {
        let mut effect = StatusEffect::burning(3, 0.5);
        let mut counters = Counters { turn: 1, rotation: 7 };

        effect.start(&counters);

        for rotation in 7..10 {
            counters.rotation = rotation;
            assert!(effect.is_still_valid(&counters), "rotation {rotation}");
        }
        counters.rotation = 10;
        assert!(!effect.is_still_valid(&counters));
    }

    #[test]
    fn test_skip_first_rotation_extends_window() {
        let mut effect = StatusEffect::burning(2, 0.5).skipping_first_rotation();
        let mut counters = Counters { turn: 0, rotation: 4 };

        effect.start(&counters);

        counters.rotation = 6;
        assert!(effect.is_still_valid(&counters));
        counters.rotation = 7;
        assert!(!effect.is_still_valid(&counters));
    }

    #[test]
    fn test_forever_never_expires() {
        let mut effect = StatusEffect::burning(1, 0.5).lasting_forever();
        let mut counters = Counters::default();

        effect.start(&counters);
        counters.rotation = 1000;

        assert!(effect.is_still_valid(&counters));
    }

    #[test]
    fn test_turn_lifetime_window() {
        let mut effect = StatusEffect::poison(2, 3);
        let mut counters = Counters { turn: 5, rotation: 0 };

        effect.start(&counters);

        counters.turn = 6;
        assert!(effect.is_still_valid(&counters));
        counters.turn = 7;
        assert!(!effect.is_still_valid(&counters));
    }

    #[test]
    fn test_burning_stacks_duration() {
        let counters = Counters::default();
        let mut first = StatusEffect::burning(2, 0.5);
        first.start(&counters);
        let second = StatusEffect::burning(3, 0.5);

        assert!(first.can_stack_with(&second));
        first.stack(second);

        let mut counters = counters;
        counters.rotation = 4;
        assert!(first.is_still_valid(&counters));
        counters.rotation = 5;
        assert!(!first.is_still_valid(&counters));
    }

    #[test]
    fn test_burning_different_percent_does_not_stack() {
        let first = StatusEffect::burning(2, 0.5);
        let second = StatusEffect::burning(2, 0.25);
        assert!(!first.can_stack_with(&second));
    }

    #[test]
    fn test_poison_stacks_damage_and_duration() {
        let counters = Counters::default();
        let mut first = StatusEffect::poison(2, 3);
        first.start(&counters);
        first.stack(StatusEffect::poison(1, 4));

        match first.kind {
            StatusKind::Poison { damage } => assert_eq!(damage, 7),
            _ => unreachable!(),
        }
        let mut counters = counters;
        counters.turn = 2;
        assert!(first.is_still_valid(&counters));
        counters.turn = 3;
        assert!(!first.is_still_valid(&counters));
    }

    #[test]
    fn test_shield_absorbs_and_overflows() {
        let mut shield = StatusEffect::shield(5);

        assert_eq!(shield.modify_damage(3), 0);
        assert_eq!(shield.modify_damage(4), 2);

        let counters = Counters::default();
        assert!(!shield.is_still_valid(&counters));
    }

    #[test]
    fn test_shield_stacks_pool() {
        let mut shield = StatusEffect::shield(2);
        shield.stack(StatusEffect::shield(3));
        assert_eq!(shield.modify_damage(5), 0);
    }

    #[test]
    fn test_bewitched_turns_rotations_left() {
        let effect = StatusEffect::bewitched(2, 2);

        assert_eq!(
            effect.modify_revolver_rotation(RevolverRotation::Right(2)),
            RevolverRotation::Left(2)
        );
        assert_eq!(
            effect.modify_revolver_rotation(RevolverRotation::Left(1)),
            RevolverRotation::Left(1)
        );
        assert_eq!(
            effect.modify_revolver_rotation(RevolverRotation::None),
            RevolverRotation::None
        );
    }

    #[test]
    fn test_bewitched_expires_on_either_window() {
        let mut effect = StatusEffect::bewitched(2, 3);
        let mut counters = Counters { turn: 1, rotation: 1 };
        effect.start(&counters);

        counters.turn = 2;
        counters.rotation = 2;
        assert!(effect.is_still_valid(&counters));

        // Turn window closes first.
        counters.turn = 3;
        assert!(!effect.is_still_valid(&counters));
    }

    #[test]
    fn test_burning_player_amplifies_incoming_damage() {
        let effect = StatusEffect::burning_player(2, 0.5);
        assert_eq!(effect.additional_incoming_damage(10), 5);
        assert_eq!(effect.additional_incoming_damage(5), 2);
    }

    #[test]
    fn test_fire_resistance_blocks_fire() {
        let resistance = StatusEffect::fire_resistance(2);
        assert_eq!(resistance.blocked_types(), &[StatusEffectType::Fire]);
        assert_eq!(resistance.effect_type(), StatusEffectType::Blocking);
    }

    #[test]
    fn test_display_text_rotation_remaining() {
        let mut effect = StatusEffect::burning(3, 0.5);
        let mut counters = Counters { turn: 0, rotation: 2 };
        effect.start(&counters);

        counters.rotation = 3;
        assert_eq!(effect.display_text(&counters), "2");
    }

    #[test]
    fn test_serialization_round_trip() {
        let effect = StatusEffect::poison(3, 2);
        let json = serde_json::to_string(&effect).unwrap();
        let deserialized: StatusEffect = serde_json::from_str(&json).unwrap();
        assert_eq!(effect, deserialized);
    }
}
