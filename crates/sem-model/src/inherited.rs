//! Inheritance status tags assigned during FSM flattening

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a flattened property relates to its superclass counterpart.
///
/// Abstract-class properties carry `Shared` or `AlignedPool`; concrete
/// subclass properties carry one of the remaining tags. `Modified`
/// remembers the superclass multiplicity it overrode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InheritanceTag {
    /// Property not related to any pool (accepted on input only)
    Distinct,
    /// Pooled property inherited by more classes than the threshold
    Shared,
    /// Pooled property below the sharing threshold
    AlignedPool,
    /// Same multiplicity as the superclass property
    Inheritance,
    /// Different multiplicity; payload is the superclass spelling
    Modified(String),
    /// New property that joined an abstract pool
    Aligned,
    /// New property with no superclass counterpart
    Extension,
    /// Superclass property suppressed in the subclass
    Prohibited,
}

impl InheritanceTag {
    /// Ordering rank for abstract-class property flattening.
    pub fn pool_rank(&self) -> u8 {
        match self {
            Self::Shared => 1,
            Self::AlignedPool => 2,
            _ => 99,
        }
    }

    /// Ordering rank for concrete-class property flattening.
    pub fn concrete_rank(&self) -> u8 {
        match self {
            Self::Inheritance | Self::Modified(_) => 1,
            Self::Aligned => 2,
            Self::Extension => 3,
            Self::Prohibited => 4,
            _ => 99,
        }
    }
}

impl fmt::Display for InheritanceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Distinct => write!(f, "Distinct"),
            Self::Shared => write!(f, "Shared"),
            Self::AlignedPool => write!(f, "Aligned Pool"),
            Self::Inheritance => write!(f, "Inheritance"),
            Self::Modified(orig) => write!(f, "Modified [{}]", orig),
            Self::Aligned => write!(f, "Aligned"),
            Self::Extension => write!(f, "Extension"),
            Self::Prohibited => write!(f, "Prohibited"),
        }
    }
}

/// Error for an unrecognised inheritance tag spelling
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown inheritance tag: '{0}'")]
pub struct ParseTagError(pub String);

impl FromStr for InheritanceTag {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix("Modified") {
            let orig = rest
                .trim()
                .strip_prefix('[')
                .and_then(|r| r.strip_suffix(']'))
                .unwrap_or("")
                .to_string();
            return Ok(Self::Modified(orig));
        }
        match s {
            "Distinct" => Ok(Self::Distinct),
            "Shared" => Ok(Self::Shared),
            "Aligned Pool" => Ok(Self::AlignedPool),
            "Inheritance" => Ok(Self::Inheritance),
            "Aligned" => Ok(Self::Aligned),
            "Extension" => Ok(Self::Extension),
            "Prohibited" => Ok(Self::Prohibited),
            other => Err(ParseTagError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trip() {
        let tags = [
            InheritanceTag::Distinct,
            InheritanceTag::Shared,
            InheritanceTag::AlignedPool,
            InheritanceTag::Inheritance,
            InheritanceTag::Modified("0..1".to_string()),
            InheritanceTag::Aligned,
            InheritanceTag::Extension,
            InheritanceTag::Prohibited,
        ];
        for tag in tags {
            let parsed: InheritanceTag = tag.to_string().parse().unwrap();
            assert_eq!(parsed, tag);
        }
    }

    #[test]
    fn test_spellings() {
        assert_eq!(InheritanceTag::AlignedPool.to_string(), "Aligned Pool");
        assert_eq!(
            InheritanceTag::Modified("1..*".to_string()).to_string(),
            "Modified [1..*]"
        );
        assert_eq!(
            "Modified [1..*]".parse::<InheritanceTag>().unwrap(),
            InheritanceTag::Modified("1..*".to_string())
        );
    }

    #[test]
    fn test_ranks() {
        assert!(InheritanceTag::Shared.pool_rank() < InheritanceTag::AlignedPool.pool_rank());
        assert_eq!(
            InheritanceTag::Inheritance.concrete_rank(),
            InheritanceTag::Modified("1".into()).concrete_rank()
        );
        assert!(
            InheritanceTag::Aligned.concrete_rank() < InheritanceTag::Extension.concrete_rank()
        );
        assert!(
            InheritanceTag::Extension.concrete_rank() < InheritanceTag::Prohibited.concrete_rank()
        );
    }
}
