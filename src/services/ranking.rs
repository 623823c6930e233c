//! Scores and orders a bounded candidate set against a query.
//!
//! Runs to completion synchronously over a single consistent snapshot; no
//! data fetches happen mid-scoring. The base score is tiered (only the
//! highest matching rule applies), while every applicable boost stacks on
//! top. That mix means a lower-tier record with heavy boosts can outrank a
//! bare higher-tier one; the arithmetic is deliberate and tested as such.

use crate::constants::scoring;
use crate::entities::profile;

/// A profile snapshot entering the ranking pass, plus the native relevance
/// score when the indexed retrieval path produced it. Ephemeral: scoring
/// internals are stripped before the result leaves this module.
#[derive(Debug, Clone)]
pub struct SearchCandidate {
    pub profile: profile::Model,
    pub index_score: Option<f64>,
}

/// Orders `candidates` by relevance to the normalized (trimmed, lowercased)
/// query. The output is a permutation of the input; ties keep the supplied
/// order.
#[must_use]
pub fn rank(query: &str, candidates: Vec<SearchCandidate>) -> Vec<profile::Model> {
    let terms: Vec<&str> = query.split_whitespace().collect();

    let mut scored: Vec<(f64, profile::Model)> = candidates
        .into_iter()
        .map(|candidate| {
            let total = score(query, &terms, &candidate);
            (total, candidate.profile)
        })
        .collect();

    // Stable sort: equal scores preserve the candidate supply order.
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    scored.into_iter().map(|(_, profile)| profile).collect()
}

fn score(query: &str, terms: &[&str], candidate: &SearchCandidate) -> f64 {
    let record = &candidate.profile;
    let name = record.name.to_lowercase();

    let base = base_score(query, terms, &name);
    let mut total = base as f64;

    if let Some(description) = &record.description {
        let window: String = description
            .chars()
            .take(scoring::DESCRIPTION_WINDOW)
            .collect();
        if window.to_lowercase().contains(query) {
            total += scoring::DESCRIPTION_BOOST as f64;
        }
    }

    if record
        .occupation_list()
        .iter()
        .any(|occupation| occupation.to_lowercase().contains(query))
    {
        total += scoring::OCCUPATION_BOOST as f64;
    }

    if record
        .category
        .as_ref()
        .is_some_and(|category| category.to_lowercase().contains(query))
    {
        total += scoring::CATEGORY_BOOST as f64;
    }

    if record
        .tag_list()
        .iter()
        .any(|tag| tag.to_lowercase().contains(query))
    {
        total += scoring::TAG_BOOST as f64;
    }

    total += i64::from(record.likes.max(0)).min(scoring::LIKES_CAP) as f64;

    if let Some(index_score) = candidate.index_score {
        total += scoring::INDEX_WEIGHT * index_score;
    }

    total
}

/// Only the single highest-priority rule that matches applies.
fn base_score(query: &str, terms: &[&str], name: &str) -> i64 {
    if name == query {
        scoring::EXACT_NAME
    } else if name.starts_with(query) {
        scoring::NAME_PREFIX
    } else if name.contains(query) {
        scoring::NAME_SUBSTRING
    } else if !terms.is_empty() && terms.iter().all(|term| name.contains(term)) {
        scoring::ALL_TERMS
    } else {
        let matched = terms.iter().filter(|term| name.contains(*term)).count();
        scoring::PER_TERM * matched as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: i32, name: &str) -> profile::Model {
        profile::Model {
            id,
            name: name.to_string(),
            description: None,
            tags: None,
            occupations: None,
            category: None,
            years: None,
            likes: 0,
            liked_by: None,
            views: 0,
            search_hits: 0,
            is_featured: false,
            featured_rank: None,
            featured_since: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn candidate(model: profile::Model) -> SearchCandidate {
        SearchCandidate {
            profile: model,
            index_score: None,
        }
    }

    #[test]
    fn ranking_is_a_permutation() {
        let candidates = vec![
            candidate(profile(1, "Marie Curie")),
            candidate(profile(2, "Pierre Curie")),
            candidate(profile(3, "Irene Joliot-Curie")),
        ];

        let ranked = rank("curie", candidates);

        let mut ids: Vec<i32> = ranked.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn exact_match_ranks_first() {
        let candidates = vec![
            candidate(profile(1, "Harriet Tubman Jr")),
            candidate(profile(2, "Harriet Beecher Stowe")),
            candidate(profile(3, "Harriet Tubman")),
            candidate(profile(4, "John Tubman")),
        ];

        let ranked = rank("harriet tubman", candidates);
        assert_eq!(ranked[0].id, 3);
    }

    #[test]
    fn base_tiers_are_mutually_exclusive() {
        assert_eq!(base_score("ada", &["ada"], "ada"), scoring::EXACT_NAME);
        assert_eq!(
            base_score("ada", &["ada"], "ada lovelace"),
            scoring::NAME_PREFIX
        );
        assert_eq!(base_score("ada", &["ada"], "saadat"), scoring::NAME_SUBSTRING);
        assert_eq!(
            base_score("lovelace ada", &["lovelace", "ada"], "ada lovelace"),
            scoring::ALL_TERMS
        );
        assert_eq!(
            base_score("ada hopper", &["ada", "hopper"], "grace hopper"),
            scoring::PER_TERM
        );
        assert_eq!(base_score("xyz", &["xyz"], "grace hopper"), 0);
    }

    #[test]
    fn popularity_contribution_is_capped() {
        let mut plain = profile(1, "Nikola Tesla");
        plain.likes = 0;
        let mut popular = profile(2, "Nikola Tesla");
        popular.likes = 200;

        let ranked = rank(
            "nikola tesla",
            vec![candidate(plain.clone()), candidate(popular.clone())],
        );
        assert_eq!(ranked[0].id, 2);

        // Capped at 50: the gap is exactly the cap, not the raw count.
        let terms = ["nikola", "tesla"];
        let plain_score = score(
            "nikola tesla",
            &terms,
            &candidate(plain),
        );
        let popular_score = score(
            "nikola tesla",
            &terms,
            &candidate(popular),
        );
        assert!((popular_score - plain_score - scoring::LIKES_CAP as f64).abs() < f64::EPSILON);
    }

    #[test]
    fn boosts_stack_on_top_of_the_tier() {
        // A: exact-name tier, nothing else.
        let a = profile(1, "Frida Kahlo");

        // B: same exact-name tier plus every secondary boost at maximum.
        let mut b = profile(2, "Frida Kahlo");
        b.description = Some("Frida Kahlo was a painter.".to_string());
        b.occupations = Some(r#"["frida kahlo scholar"]"#.to_string());
        b.category = Some("frida kahlo studies".to_string());
        b.tags = Some(r#"["frida kahlo"]"#.to_string());
        b.likes = 500;

        let terms = ["frida", "kahlo"];
        let a_score = score("frida kahlo", &terms, &candidate(a));
        let b_score = score("frida kahlo", &terms, &candidate(b));

        let expected_gap = (scoring::DESCRIPTION_BOOST
            + scoring::OCCUPATION_BOOST
            + scoring::CATEGORY_BOOST
            + scoring::TAG_BOOST
            + scoring::LIKES_CAP) as f64;
        assert!((b_score - a_score - expected_gap).abs() < f64::EPSILON);
    }

    #[test]
    fn boosted_lower_tier_can_outrank_bare_higher_tier() {
        // All-terms tier (100) plus every boost (250) beats a bare
        // substring tier (250). The anomaly is part of the contract.
        let query = "lovelace ada";
        let terms = ["lovelace", "ada"];

        // Substring tier: contains the query but neither exactly nor as a
        // prefix. No boosts.
        let bare_substring = profile(1, "Miss Lovelace Ada Society");

        // All-terms tier: both terms present, query never contiguous.
        let mut boosted = profile(2, "Ada Lovelace");
        boosted.description = Some("The lovelace ada correspondence archive.".to_string());
        boosted.occupations = Some(r#"["lovelace ada historian"]"#.to_string());
        boosted.category = Some("lovelace ada".to_string());
        boosted.tags = Some(r#"["lovelace ada"]"#.to_string());
        boosted.likes = 50;

        let higher_tier = score(query, &terms, &candidate(bare_substring));
        let lower_tier = score(query, &terms, &candidate(boosted));
        assert!((higher_tier - scoring::NAME_SUBSTRING as f64).abs() < f64::EPSILON);
        assert!(lower_tier > higher_tier);
    }

    #[test]
    fn index_score_contributes_ten_fold() {
        let plain = SearchCandidate {
            profile: profile(1, "Alan Turing"),
            index_score: None,
        };
        let indexed = SearchCandidate {
            profile: profile(2, "Alan Turing"),
            index_score: Some(2.5),
        };

        let terms = ["alan", "turing"];
        let plain_score = score("alan turing", &terms, &plain);
        let indexed_score = score("alan turing", &terms, &indexed);
        assert!((indexed_score - plain_score - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_optional_fields_contribute_nothing() {
        let bare = candidate(profile(1, "Unrelated Name"));
        let total = score("socrates", &["socrates"], &bare);
        assert!((total - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ties_keep_supplied_order() {
        let candidates = vec![
            candidate(profile(7, "Plato")),
            candidate(profile(3, "Plato")),
            candidate(profile(9, "Plato")),
        ];
        let ranked = rank("plato", candidates);
        let ids: Vec<i32> = ranked.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![7, 3, 9]);
    }
}
