//! Revolver rotation directions.

use serde::{Deserialize, Serialize};

/// A requested or applied rotation of the revolver cylinder.
///
/// The amount is always non-negative; `None` is the explicit "don't rotate"
/// value (distinct from `Right(0)` only in intent, both rotate nothing).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevolverRotation {
    /// Rotate `amount` slots toward the firing slot.
    Right(u32),
    /// Rotate `amount` slots away from the firing slot.
    Left(u32),
    /// No rotation.
    None,
}

impl RevolverRotation {
    /// The number of slots this rotation moves.
    #[must_use]
    pub fn amount(self) -> u32 {
        match self {
            Self::Right(amount) | Self::Left(amount) => amount,
            Self::None => 0,
        }
    }

    /// The same direction with a different amount. `None` stays `None`.
    #[must_use]
    pub fn with_amount(self, amount: u32) -> Self {
        match self {
            Self::Right(_) => Self::Right(amount),
            Self::Left(_) => Self::Left(amount),
            Self::None => Self::None,
        }
    }

    /// The mirrored direction with the same amount.
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Self::Right(amount) => Self::Left(amount),
            Self::Left(amount) => Self::Right(amount),
            Self::None => Self::None,
        }
    }
}

impl std::fmt::Display for RevolverRotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Right(amount) => write!(f, "Right({amount})"),
            Self::Left(amount) => write!(f, "Left({amount})"),
            Self::None => write!(f, "None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount() {
        assert_eq!(RevolverRotation::Right(2).amount(), 2);
        assert_eq!(RevolverRotation::Left(1).amount(), 1);
        assert_eq!(RevolverRotation::None.amount(), 0);
    }

    #[test]
    fn test_with_amount_keeps_direction() {
        assert_eq!(
            RevolverRotation::Left(1).with_amount(3),
            RevolverRotation::Left(3)
        );
        assert_eq!(RevolverRotation::None.with_amount(3), RevolverRotation::None);
    }

    #[test]
    fn test_reversed() {
        assert_eq!(
            RevolverRotation::Right(2).reversed(),
            RevolverRotation::Left(2)
        );
        assert_eq!(RevolverRotation::None.reversed(), RevolverRotation::None);
    }
}
