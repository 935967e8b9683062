//! Burgers vector classification.
//!
//! Each component is bucketed independently, then the bucket triple is
//! matched against the three "100" axis patterns and the four "111" sign
//! patterns (a vector and its negation are the same line type).

use super::constants::{
    BURGERS_100_MAX, BURGERS_100_MIN, BURGERS_111_MAX, BURGERS_111_MIN, BURGERS_MAX_100,
    BURGERS_UNKNOWN, BURGERS_ZERO_TOL,
};
use crate::geometry::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Component {
    Zero,
    /// Full lattice step along one axis (either sign).
    Full,
    Plus,
    Minus,
}

fn categorize(c: f64) -> Option<Component> {
    let mag = c.abs();
    if mag < BURGERS_ZERO_TOL {
        Some(Component::Zero)
    } else if (BURGERS_111_MIN..BURGERS_111_MAX).contains(&mag) {
        Some(if c > 0.0 {
            Component::Plus
        } else {
            Component::Minus
        })
    } else if (BURGERS_100_MIN..=BURGERS_100_MAX).contains(&mag) {
        Some(Component::Full)
    } else {
        None
    }
}

/// Classify a Burgers vector into type 1..=8.
///
/// - 1..=3: "100" along x, y, z
/// - 4..=7: "111" sign patterns `+++`, `++-`, `+-+`, `+--` (up to negation)
/// - 8: anything else
pub fn burgers_type(b: Vec3) -> u8 {
    use Component::*;

    let (Some(x), Some(y), Some(z)) = (categorize(b.x), categorize(b.y), categorize(b.z)) else {
        return BURGERS_UNKNOWN;
    };

    match (x, y, z) {
        (Full, Zero, Zero) => 1,
        (Zero, Full, Zero) => 2,
        (Zero, Zero, Full) => 3,
        _ => {
            let is_111 = |c: Component| matches!(c, Plus | Minus);
            if !(is_111(x) && is_111(y) && is_111(z)) {
                return BURGERS_UNKNOWN;
            }
            // Fold the negated half onto a leading plus.
            let flip = |c: Component| match c {
                Plus => Minus,
                _ => Plus,
            };
            let (y, z) = if x == Minus { (flip(y), flip(z)) } else { (y, z) };
            match (y, z) {
                (Plus, Plus) => 4,
                (Plus, Minus) => 5,
                (Minus, Plus) => 6,
                _ => 7,
            }
        }
    }
}

pub fn is_100(burgers_type: u8) -> bool {
    (1..=BURGERS_MAX_100).contains(&burgers_type)
}

pub fn is_111(burgers_type: u8) -> bool {
    (BURGERS_MAX_100 + 1..BURGERS_UNKNOWN).contains(&burgers_type)
}

/// True if all types are classifiable and no two are equal.
pub fn all_distinct_known(types: &[u8]) -> bool {
    types.iter().all(|&t| t != BURGERS_UNKNOWN && t != 0)
        && types
            .iter()
            .enumerate()
            .all(|(i, t)| !types[i + 1..].contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: f64 = 0.577_350_269;

    #[test]
    fn test_100_axes() {
        assert_eq!(burgers_type(Vec3::new(1.0, 0.0, 0.0)), 1);
        assert_eq!(burgers_type(Vec3::new(0.0, -1.1547, 0.0)), 2);
        assert_eq!(burgers_type(Vec3::new(0.0, 0.0, 1.1547)), 3);
    }

    #[test]
    fn test_111_sign_patterns() {
        assert_eq!(burgers_type(Vec3::new(0.57, 0.57, 0.57)), 4);
        assert_eq!(burgers_type(Vec3::new(-S, -S, -S)), 4);
        assert_eq!(burgers_type(Vec3::new(S, S, -S)), 5);
        assert_eq!(burgers_type(Vec3::new(-S, -S, S)), 5);
        assert_eq!(burgers_type(Vec3::new(S, -S, S)), 6);
        assert_eq!(burgers_type(Vec3::new(-S, S, -S)), 6);
        assert_eq!(burgers_type(Vec3::new(S, -S, -S)), 7);
        assert_eq!(burgers_type(Vec3::new(-S, S, S)), 7);
    }

    #[test]
    fn test_unmatched_is_unknown() {
        assert_eq!(burgers_type(Vec3::new(1.0, 1.0, 0.0)), BURGERS_UNKNOWN);
        assert_eq!(burgers_type(Vec3::new(S, S, 0.0)), BURGERS_UNKNOWN);
        assert_eq!(burgers_type(Vec3::ZERO), BURGERS_UNKNOWN);
        assert_eq!(burgers_type(Vec3::new(2.5, 0.0, 0.0)), BURGERS_UNKNOWN);
    }

    #[test]
    fn test_distinct_known() {
        assert!(all_distinct_known(&[4, 5, 6, 7]));
        assert!(!all_distinct_known(&[4, 5, 4, 6]));
        assert!(!all_distinct_known(&[4, 5, 6, 8]));
        assert!(is_100(3) && !is_100(4));
        assert!(is_111(7) && !is_111(8));
    }
}
