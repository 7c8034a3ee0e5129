//! Sub-language dialect keywords
//!
//! The script grammar reserves exactly three words, each introducing a
//! `<dialect> { ... }` block. Every other name in a script is resolved
//! against the model registry at scan time, so the fixed keyword set stays
//! deliberately small.

use serde::{Deserialize, Serialize};

/// Sub-language selector introducing a dialect block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    /// Component-model statements wired through exchange items.
    Jgrass,
    /// Native command statements executed against the external toolchain.
    Grass,
    /// Embedded R code, captured verbatim and handed to the runtime.
    R,
}

impl Dialect {
    /// Exact lowercase spelling as it appears in script source.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jgrass => "jgrass",
            Self::Grass => "grass",
            Self::R => "r",
        }
    }

    /// Parse a dialect word with exact case matching.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "jgrass" => Some(Self::Jgrass),
            "grass" => Some(Self::Grass),
            "r" => Some(Self::R),
            _ => None,
        }
    }

    /// Block bodies in this dialect are captured verbatim instead of being
    /// split into statements.
    pub const fn is_raw(self) -> bool {
        matches!(self, Self::R)
    }

    pub const fn all() -> [Dialect; 3] {
        [Self::Jgrass, Self::Grass, Self::R]
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_round_trip() {
        for dialect in Dialect::all() {
            assert_eq!(Dialect::from_str(dialect.as_str()), Some(dialect));
        }
    }

    #[test]
    fn dialect_matching_is_case_exact() {
        assert_eq!(Dialect::from_str("jgrass"), Some(Dialect::Jgrass));
        assert_eq!(Dialect::from_str("JGRASS"), None);
        assert_eq!(Dialect::from_str("jgras"), None);
    }

    #[test]
    fn only_r_blocks_are_raw() {
        assert!(Dialect::R.is_raw());
        assert!(!Dialect::Jgrass.is_raw());
        assert!(!Dialect::Grass.is_raw());
    }
}
