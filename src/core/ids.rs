//! Identifier newtypes for card instances and enemies.
//!
//! Ids are opaque handles allocated by the encounter state; they carry no
//! meaning beyond identity.

use serde::{Deserialize, Serialize};

/// Identifies one created card instance for the lifetime of an encounter.
///
/// Multiple instances of the same prototype get distinct ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardInstanceId(pub u32);

impl CardInstanceId {
    /// Create a new card instance ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardInstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Identifies one enemy in the encounter's enemy area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

impl EnemyId {
    /// Create a new enemy ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EnemyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Enemy({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_instance_id() {
        let id = CardInstanceId::new(7);
        assert_eq!(id.raw(), 7);
        assert_eq!(format!("{}", id), "Card(7)");
    }

    #[test]
    fn test_enemy_id() {
        let id = EnemyId::new(2);
        assert_eq!(id.raw(), 2);
        assert_eq!(format!("{}", id), "Enemy(2)");
    }
}
