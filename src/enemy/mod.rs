//! Enemies: prototypes, live state, and their per-turn actions.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{EnemyId, GameRng};
use crate::status::StatusEffect;

/// An action an enemy can take on its turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyAction {
    /// Attack the player for `damage`, opening the parry window.
    Attack { damage: i32 },
}

/// An enemy template as supplied by the config layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyPrototype {
    /// Display name.
    pub name: String,

    /// Starting health.
    pub health: i32,

    /// The pool its per-turn actions are chosen from.
    pub actions: Vec<EnemyAction>,
}

impl EnemyPrototype {
    /// A prototype with one fixed attack.
    #[must_use]
    pub fn new(name: impl Into<String>, health: i32, attack_damage: i32) -> Self {
        Self {
            name: name.into(),
            health,
            actions: vec![EnemyAction::Attack {
                damage: attack_damage,
            }],
        }
    }
}

/// One live enemy.
#[derive(Clone, Debug)]
pub struct Enemy {
    /// Identity of this enemy.
    pub id: EnemyId,

    /// Display name.
    pub name: String,

    /// Starting health.
    pub max_health: i32,

    /// Current health; the enemy is defeated at zero.
    pub health: i32,

    /// The action pool this enemy chooses from.
    pub actions: Vec<EnemyAction>,

    /// The action chosen for the upcoming enemy phase.
    pub next_action: Option<EnemyAction>,

    /// Status effects currently on this enemy.
    pub status_effects: SmallVec<[StatusEffect; 2]>,
}

impl Enemy {
    /// Instantiate a prototype.
    #[must_use]
    pub fn from_prototype(id: EnemyId, prototype: &EnemyPrototype) -> Self {
        Self {
            id,
            name: prototype.name.clone(),
            max_health: prototype.health,
            health: prototype.health,
            actions: prototype.actions.clone(),
            next_action: None,
            status_effects: SmallVec::new(),
        }
    }

    /// Whether this enemy is out of the fight.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.health <= 0
    }

    /// Pick the action for the upcoming enemy phase.
    pub fn choose_action(&mut self, rng: &mut GameRng) {
        self.next_action = rng.choose(&self.actions).copied();
    }

    /// Clear the chosen action after the enemy phase ran.
    pub fn reset_action(&mut self) {
        self.next_action = None;
    }
}

impl std::fmt::Display for Enemy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.id.raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy() -> Enemy {
        Enemy::from_prototype(EnemyId::new(0), &EnemyPrototype::new("Outlaw", 20, 4))
    }

    #[test]
    fn test_from_prototype() {
        let enemy = enemy();
        assert_eq!(enemy.health, 20);
        assert_eq!(enemy.max_health, 20);
        assert!(!enemy.is_defeated());
        assert!(enemy.status_effects.is_empty());
    }

    #[test]
    fn test_defeated_at_zero() {
        let mut enemy = enemy();
        enemy.health = 0;
        assert!(enemy.is_defeated());
    }

    #[test]
    fn test_choose_and_reset_action() {
        let mut enemy = enemy();
        let mut rng = GameRng::new(3);

        enemy.choose_action(&mut rng);
        assert_eq!(enemy.next_action, Some(EnemyAction::Attack { damage: 4 }));

        enemy.reset_action();
        assert_eq!(enemy.next_action, None);
    }
}
