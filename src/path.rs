//! Dotted path parsing for item addressing.
//!
//! Splits strings like `config.database.host` into ordered segments.
//! Paths are the only addressing mechanism in the store: every
//! non-terminal segment names a branch, and the final segment names the
//! item itself.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// A parsed dotted path: one or more non-empty segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemPath {
    segments: Vec<String>,
}

impl ItemPath {
    /// Parse a dotted string like `config.database.host`.
    ///
    /// The string must hold at least one segment; empty segments
    /// (leading, trailing, or doubled dots) are rejected.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(StoreError::InvalidPath {
                raw: input.to_string(),
            });
        }

        let mut segments = Vec::new();
        for part in input.split('.') {
            if part.is_empty() {
                return Err(StoreError::InvalidPath {
                    raw: input.to_string(),
                });
            }
            segments.push(part.to_string());
        }

        Ok(ItemPath { segments })
    }

    /// The ordered segments of this path.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The final segment: the key the path addresses on its parent branch.
    pub fn last(&self) -> &str {
        // segments is non-empty by construction
        &self.segments[self.segments.len() - 1]
    }

    /// All segments before the final one (empty for single-segment paths).
    pub fn parent_segments(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    /// Format back to the dotted string form.
    pub fn to_dotted(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dotted())
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // --- Parsing ---

    #[test]
    fn parse_single_segment() {
        let p = ItemPath::parse("config").unwrap();
        assert_eq!(p.segments(), ["config"]);
        assert_eq!(p.last(), "config");
        assert!(p.parent_segments().is_empty());
    }

    #[test]
    fn parse_nested_path() {
        let p = ItemPath::parse("config.database.host").unwrap();
        assert_eq!(p.segments(), ["config", "database", "host"]);
        assert_eq!(p.last(), "host");
        assert_eq!(p.parent_segments(), ["config", "database"]);
    }

    #[test]
    fn parse_trims_whitespace() {
        let p = ItemPath::parse("  one.two  ").unwrap();
        assert_eq!(p.segments(), ["one", "two"]);
    }

    // --- Parse errors ---

    #[test]
    fn parse_empty_path() {
        assert!(matches!(
            ItemPath::parse(""),
            Err(StoreError::InvalidPath { .. })
        ));
    }

    #[test]
    fn parse_leading_dot() {
        assert!(ItemPath::parse(".one").is_err());
    }

    #[test]
    fn parse_trailing_dot() {
        assert!(ItemPath::parse("one.").is_err());
    }

    #[test]
    fn parse_doubled_dot() {
        assert!(ItemPath::parse("one..two").is_err());
    }

    #[test]
    fn parse_only_dots() {
        assert!(ItemPath::parse("...").is_err());
    }

    // --- Formatting ---

    #[test]
    fn to_dotted_round_trip() {
        let input = "one.two.three";
        let p = ItemPath::parse(input).unwrap();
        assert_eq!(p.to_dotted(), input);
    }

    #[test]
    fn display_trait() {
        let p = ItemPath::parse("a.b.c").unwrap();
        assert_eq!(format!("{}", p), "a.b.c");
    }
}
