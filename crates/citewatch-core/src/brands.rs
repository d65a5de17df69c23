use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A brand to track: its canonical name plus any aliases it is commonly
/// written as. Immutable once a session has been accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandSpec {
    pub canonical_name: String,
    #[serde(default)]
    pub aliases: BTreeSet<String>,
}

impl BrandSpec {
    /// Build a spec with no aliases.
    #[must_use]
    pub fn new(canonical_name: impl Into<String>) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            aliases: BTreeSet::new(),
        }
    }

    /// Build a spec with aliases. Aliases equal to the canonical name
    /// (case-insensitively) are dropped.
    #[must_use]
    pub fn with_aliases<I, S>(canonical_name: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let canonical_name = canonical_name.into();
        let lower = canonical_name.to_lowercase();
        let aliases = aliases
            .into_iter()
            .map(Into::into)
            .filter(|a| !a.trim().is_empty() && a.to_lowercase() != lower)
            .collect();
        Self {
            canonical_name,
            aliases,
        }
    }

    /// Generate a URL-safe slug from the canonical name.
    #[must_use]
    pub fn slug(&self) -> String {
        self.canonical_name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_simple_name() {
        assert_eq!(BrandSpec::new("Acme Corp").slug(), "acme-corp");
    }

    #[test]
    fn slug_special_characters() {
        assert_eq!(BrandSpec::new("Uncle Arnie's").slug(), "uncle-arnies");
    }

    #[test]
    fn with_aliases_drops_duplicates_of_canonical() {
        let brand = BrandSpec::with_aliases("Acme Corp", ["acme corp", "Acme", ""]);
        assert_eq!(brand.aliases.len(), 1);
        assert!(brand.aliases.contains("Acme"));
    }

    #[test]
    fn aliases_serialize_deterministically() {
        let brand = BrandSpec::with_aliases("Acme Corp", ["Zeta", "Acme"]);
        let json = serde_json::to_string(&brand).expect("serialize");
        // BTreeSet keeps alias order stable across runs.
        assert_eq!(
            json,
            "{\"canonical_name\":\"Acme Corp\",\"aliases\":[\"Acme\",\"Zeta\"]}"
        );
    }
}
