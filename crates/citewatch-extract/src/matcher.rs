//! Brand term matching: canonical names, aliases, and spacing/punctuation
//! variants, matched case-insensitively on word boundaries.

use regex::RegexBuilder;

use citewatch_core::BrandSpec;

use crate::error::ExtractError;

/// How a match was produced, ordered strongest-first. Drives the
/// confidence score and overlap deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum MatchKind {
    /// The canonical name itself (case-insensitive, whole word).
    Canonical,
    /// A configured alias.
    Alias,
    /// A generated spacing/punctuation variant of the name or an alias.
    Variant,
}

impl MatchKind {
    pub(crate) fn confidence(self) -> f64 {
        match self {
            MatchKind::Canonical => 1.0,
            MatchKind::Alias => 0.85,
            MatchKind::Variant => 0.7,
        }
    }
}

/// One occurrence of a brand term in the response text.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BrandMatch {
    pub start: usize,
    pub end: usize,
    pub kind: MatchKind,
}

/// Compiled matcher for one brand's full term set.
pub(crate) struct BrandMatcher {
    terms: Vec<(regex::Regex, MatchKind)>,
}

impl BrandMatcher {
    /// Compile patterns for the canonical name, each alias, and the
    /// spacing/punctuation variants of all of them.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Pattern`] if a term produces an invalid
    /// pattern (not expected for escaped input; guards regex size limits).
    pub(crate) fn compile(brand: &BrandSpec) -> Result<Self, ExtractError> {
        let mut seen: Vec<String> = Vec::new();
        let mut terms = Vec::new();

        let mut push = |term: &str, kind: MatchKind| -> Result<(), ExtractError> {
            let lower = term.to_lowercase();
            if term.trim().is_empty() || seen.contains(&lower) {
                // First registration wins; kinds are pushed strongest-first.
                return Ok(());
            }
            seen.push(lower);
            let pattern = format!(r"\b{}\b", regex::escape(term));
            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| ExtractError::Pattern {
                    brand: brand.canonical_name.clone(),
                    source,
                })?;
            terms.push((regex, kind));
            Ok(())
        };

        push(&brand.canonical_name, MatchKind::Canonical)?;
        for alias in &brand.aliases {
            push(alias, MatchKind::Alias)?;
        }
        for variant in spacing_variants(&brand.canonical_name) {
            push(&variant, MatchKind::Variant)?;
        }
        for alias in &brand.aliases {
            for variant in spacing_variants(alias) {
                push(&variant, MatchKind::Variant)?;
            }
        }

        Ok(Self { terms })
    }

    /// All non-overlapping occurrences in `text`, sorted by offset.
    ///
    /// When terms overlap at the same span (e.g. a variant inside the
    /// canonical form), the strongest kind wins.
    pub(crate) fn find_matches(&self, text: &str) -> Vec<BrandMatch> {
        let mut raw: Vec<BrandMatch> = Vec::new();
        for (regex, kind) in &self.terms {
            for m in regex.find_iter(text) {
                raw.push(BrandMatch {
                    start: m.start(),
                    end: m.end(),
                    kind: *kind,
                });
            }
        }
        // Strongest kind first within equal offsets, then greedy
        // non-overlap selection left to right.
        raw.sort_by(|a, b| a.start.cmp(&b.start).then(a.kind.cmp(&b.kind)));

        let mut matches: Vec<BrandMatch> = Vec::new();
        for candidate in raw {
            match matches.last() {
                Some(last) if candidate.start < last.end => {}
                _ => matches.push(candidate),
            }
        }
        matches
    }
}

/// Spacing/punctuation variants of a multi-word term: `Acme Corp` →
/// `AcmeCorp`, `Acme-Corp`, `Acme_Corp`. Single-word terms have none.
fn spacing_variants(term: &str) -> Vec<String> {
    if !term.contains(' ') {
        return Vec::new();
    }
    vec![
        term.replace(' ', ""),
        term.replace(' ', "-"),
        term.replace(' ', "_"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(brand: &BrandSpec) -> BrandMatcher {
        BrandMatcher::compile(brand).expect("compile matcher")
    }

    #[test]
    fn canonical_match_is_found_with_offset() {
        let m = matcher(&BrandSpec::new("Acme Corp"));
        let text = "The best companies are Acme Corp and Beta Inc.";
        let matches = m.find_matches(text);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].start, 23);
        assert_eq!(matches[0].kind, MatchKind::Canonical);
    }

    #[test]
    fn match_is_case_insensitive() {
        let m = matcher(&BrandSpec::new("Acme Corp"));
        let matches = m.find_matches("Try ACME CORP for invoicing.");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].kind, MatchKind::Canonical);
    }

    #[test]
    fn partial_word_does_not_match() {
        let m = matcher(&BrandSpec::new("Acme"));
        assert!(m.find_matches("Acmeify your workflow").is_empty());
    }

    #[test]
    fn alias_matches_with_alias_kind() {
        let brand = BrandSpec::with_aliases("Acme Corporation", ["Acme"]);
        let m = matcher(&brand);
        let matches = m.find_matches("People just call it Acme.");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].kind, MatchKind::Alias);
    }

    #[test]
    fn spacing_variant_matches_with_variant_kind() {
        let m = matcher(&BrandSpec::new("Acme Corp"));
        for text in ["Use AcmeCorp.", "Use Acme-Corp.", "Use Acme_Corp."] {
            let matches = m.find_matches(text);
            assert_eq!(matches.len(), 1, "no match in {text:?}");
            assert_eq!(matches[0].kind, MatchKind::Variant, "wrong kind in {text:?}");
        }
    }

    #[test]
    fn overlapping_terms_keep_strongest() {
        // Alias "Acme" is a prefix of the canonical name; the canonical
        // span must win where both match.
        let brand = BrandSpec::with_aliases("Acme Corp", ["Acme"]);
        let m = matcher(&brand);
        let matches = m.find_matches("Acme Corp is solid.");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].kind, MatchKind::Canonical);
    }

    #[test]
    fn multiple_occurrences_all_found() {
        let m = matcher(&BrandSpec::new("Acme"));
        let matches = m.find_matches("Acme is fast. Acme is cheap. Acme wins.");
        assert_eq!(matches.len(), 3);
        assert!(matches.windows(2).all(|w| w[0].start < w[1].start));
    }

    #[test]
    fn confidence_ordering() {
        assert!(MatchKind::Canonical.confidence() > MatchKind::Alias.confidence());
        assert!(MatchKind::Alias.confidence() > MatchKind::Variant.confidence());
    }
}
