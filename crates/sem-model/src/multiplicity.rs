//! Bounded multiplicity algebra
//!
//! Multiplicity is typed everywhere inside the pipeline; the CSV
//! spellings ("1", "1..1", "0..*", "0", ...) exist only at the I/O
//! boundary. Widening is the merge operation used when duplicate
//! property declarations meet: the result admits every instance either
//! operand admits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lower occurrence bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MinOccur {
    Zero,
    One,
}

/// Upper occurrence bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaxOccur {
    Bounded(u32),
    Unbounded,
}

/// Occurrence constraint on a property or association.
///
/// `Deleted` is the "0" / "0..0" form: the property is suppressed in
/// the containing class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Multiplicity {
    Deleted,
    Range { min: MinOccur, max: MaxOccur },
}

impl Multiplicity {
    /// The `1..1` constraint.
    pub fn one() -> Self {
        Self::Range {
            min: MinOccur::One,
            max: MaxOccur::Bounded(1),
        }
    }

    /// The `0..1` constraint.
    pub fn optional() -> Self {
        Self::Range {
            min: MinOccur::Zero,
            max: MaxOccur::Bounded(1),
        }
    }

    /// The `0..*` constraint.
    pub fn many() -> Self {
        Self::Range {
            min: MinOccur::Zero,
            max: MaxOccur::Unbounded,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted)
    }

    /// True when at least one occurrence is required.
    pub fn is_mandatory(&self) -> bool {
        matches!(
            self,
            Self::Range {
                min: MinOccur::One,
                ..
            }
        )
    }

    /// True when more than one occurrence is allowed.
    pub fn is_repeatable(&self) -> bool {
        match self {
            Self::Deleted => false,
            Self::Range { max, .. } => !matches!(max, MaxOccur::Bounded(0) | MaxOccur::Bounded(1)),
        }
    }

    /// True when the upper bound is `*`.
    pub fn is_unbounded(&self) -> bool {
        matches!(
            self,
            Self::Range {
                max: MaxOccur::Unbounded,
                ..
            }
        )
    }

    fn min_bound(&self) -> MinOccur {
        match self {
            Self::Deleted => MinOccur::Zero,
            Self::Range { min, .. } => *min,
        }
    }

    fn max_bound(&self) -> MaxOccur {
        match self {
            Self::Deleted => MaxOccur::Bounded(0),
            Self::Range { max, .. } => *max,
        }
    }

    /// Widen this constraint to also admit everything `other` admits.
    ///
    /// Idempotent and commutative: min is 0 if either bound is 0, max
    /// is `*` if either is `*`, otherwise the numeric maximum.
    pub fn widen(self, other: Multiplicity) -> Multiplicity {
        let min = match (self.min_bound(), other.min_bound()) {
            (MinOccur::One, MinOccur::One) => MinOccur::One,
            _ => MinOccur::Zero,
        };
        let max = match (self.max_bound(), other.max_bound()) {
            (MaxOccur::Unbounded, _) | (_, MaxOccur::Unbounded) => MaxOccur::Unbounded,
            (MaxOccur::Bounded(a), MaxOccur::Bounded(b)) => MaxOccur::Bounded(a.max(b)),
        };
        if min == MinOccur::Zero && max == MaxOccur::Bounded(0) {
            Multiplicity::Deleted
        } else {
            Multiplicity::Range { min, max }
        }
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deleted => write!(f, "0"),
            Self::Range { min, max } => {
                let lo = match min {
                    MinOccur::Zero => "0",
                    MinOccur::One => "1",
                };
                match max {
                    MaxOccur::Unbounded => write!(f, "{}..*", lo),
                    MaxOccur::Bounded(n) => write!(f, "{}..{}", lo, n),
                }
            }
        }
    }
}

/// Error for a multiplicity spelling outside the accepted set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("multiplicity '{0}' is not valid")]
pub struct ParseMultiplicityError(pub String);

impl FromStr for Multiplicity {
    type Err = ParseMultiplicityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (lo, hi) = match s.split_once("..") {
            Some((lo, hi)) => (lo, hi),
            None => (s, s),
        };
        let min = match lo {
            "0" => MinOccur::Zero,
            "1" => MinOccur::One,
            _ => return Err(ParseMultiplicityError(s.to_string())),
        };
        let max = match hi {
            "*" | "n" | "unbounded" => MaxOccur::Unbounded,
            digits => match digits.parse::<u32>() {
                Ok(n) => MaxOccur::Bounded(n),
                Err(_) => return Err(ParseMultiplicityError(s.to_string())),
            },
        };
        if min == MinOccur::One && max == MaxOccur::Bounded(0) {
            return Err(ParseMultiplicityError(s.to_string()));
        }
        if max == MaxOccur::Bounded(0) {
            Ok(Multiplicity::Deleted)
        } else {
            Ok(Multiplicity::Range { min, max })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(s: &str) -> Multiplicity {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_accepted_spellings() {
        assert_eq!(m("1"), Multiplicity::one());
        assert_eq!(m("1..1"), Multiplicity::one());
        assert_eq!(m("0..1"), Multiplicity::optional());
        assert_eq!(m("0..*"), Multiplicity::many());
        assert_eq!(
            m("1..*"),
            Multiplicity::Range {
                min: MinOccur::One,
                max: MaxOccur::Unbounded
            }
        );
        assert_eq!(
            m("0..2"),
            Multiplicity::Range {
                min: MinOccur::Zero,
                max: MaxOccur::Bounded(2)
            }
        );
        assert_eq!(m("0"), Multiplicity::Deleted);
        assert_eq!(m("0..0"), Multiplicity::Deleted);
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!("2..1".parse::<Multiplicity>().is_err());
        assert!("".parse::<Multiplicity>().is_err());
        assert!("one".parse::<Multiplicity>().is_err());
        assert!("1..0".parse::<Multiplicity>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(m("1").to_string(), "1..1");
        assert_eq!(m("0..1").to_string(), "0..1");
        assert_eq!(m("0..*").to_string(), "0..*");
        assert_eq!(m("0..2").to_string(), "0..2");
        assert_eq!(Multiplicity::Deleted.to_string(), "0");
    }

    #[test]
    fn test_widen_idempotent() {
        for s in ["1..1", "0..1", "0..*", "1..*", "0..2", "0"] {
            assert_eq!(m(s).widen(m(s)), m(s), "widen not idempotent for {}", s);
        }
    }

    #[test]
    fn test_widen_commutative() {
        let cases = [
            ("1..1", "0..1", "0..1"),
            ("1..1", "0..*", "0..*"),
            ("0..1", "1..*", "0..*"),
            ("0..2", "1..1", "0..2"),
            ("0", "1..1", "0..1"),
        ];
        for (a, b, want) in cases {
            assert_eq!(m(a).widen(m(b)), m(want), "{} widen {}", a, b);
            assert_eq!(m(b).widen(m(a)), m(want), "{} widen {}", b, a);
        }
    }

    #[test]
    fn test_widen_associative() {
        let xs = ["1..1", "0..1", "1..*", "0..2"];
        for a in xs {
            for b in xs {
                for c in xs {
                    assert_eq!(
                        m(a).widen(m(b)).widen(m(c)),
                        m(a).widen(m(b).widen(m(c)))
                    );
                }
            }
        }
    }

    #[test]
    fn test_predicates() {
        assert!(m("1..1").is_mandatory());
        assert!(!m("0..1").is_mandatory());
        assert!(m("0..*").is_repeatable());
        assert!(m("0..2").is_repeatable());
        assert!(!m("0..1").is_repeatable());
        assert!(m("1..*").is_unbounded());
        assert!(!m("0..2").is_unbounded());
        assert!(Multiplicity::Deleted.is_deleted());
    }
}
