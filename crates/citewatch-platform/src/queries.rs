//! Monitoring query rendering.
//!
//! A session fans one logical query out across its platforms. The query is
//! rendered from the template families that reliably surface brand
//! mentions: category recommendations, head-to-head comparisons, and
//! direct brand inquiries.

use citewatch_core::SessionSpec;

/// Render the session's monitoring query from its brands, category, and
/// competitors. Pure function of the spec, so repeated sessions over the
/// same spec are comparable.
#[must_use]
pub fn monitoring_query(spec: &SessionSpec) -> String {
    let primary = spec
        .brands
        .first()
        .map(|b| b.canonical_name.as_str())
        .unwrap_or_default();

    let mut query = format!(
        "What are the best {} tools for businesses, and what do you think of {}?",
        spec.category, primary
    );

    let competitors: Vec<&str> = spec
        .competitors
        .iter()
        .map(|c| c.canonical_name.as_str())
        .collect();
    if !competitors.is_empty() {
        query.push_str(&format!(
            " How does {} compare to {}?",
            primary,
            join_names(&competitors)
        ));
    }

    let others: Vec<&str> = spec
        .brands
        .iter()
        .skip(1)
        .map(|b| b.canonical_name.as_str())
        .collect();
    if !others.is_empty() {
        query.push_str(&format!(
            " Please also cover {} if relevant.",
            join_names(&others)
        ));
    }

    query
}

fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use citewatch_core::{BrandSpec, PlatformId, TimeRange};

    use super::*;

    fn spec(brands: &[&str], competitors: &[&str]) -> SessionSpec {
        SessionSpec {
            brands: brands.iter().map(|n| BrandSpec::new(*n)).collect(),
            competitors: competitors.iter().map(|n| BrandSpec::new(*n)).collect(),
            category: "crm".to_string(),
            platforms: BTreeSet::from([PlatformId::ChatGpt]),
            time_range: TimeRange::Week,
        }
    }

    #[test]
    fn query_names_category_and_primary_brand() {
        let query = monitoring_query(&spec(&["Acme Corp"], &[]));
        assert!(query.contains("crm"));
        assert!(query.contains("Acme Corp"));
        assert!(!query.contains("compare"));
    }

    #[test]
    fn competitors_add_a_comparison_clause() {
        let query = monitoring_query(&spec(&["Acme Corp"], &["Beta Inc", "Gamma LLC"]));
        assert!(query.contains("How does Acme Corp compare to Beta Inc and Gamma LLC?"));
    }

    #[test]
    fn secondary_brands_are_requested_too() {
        let query = monitoring_query(&spec(&["Acme Corp", "Delta Co"], &[]));
        assert!(query.contains("Please also cover Delta Co"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let s = spec(&["Acme Corp"], &["Beta Inc"]);
        assert_eq!(monitoring_query(&s), monitoring_query(&s));
    }
}
