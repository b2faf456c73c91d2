//! Table-driven transaction categorization.
//!
//! The matcher is pure and order-dependent: pass 1 scans every category's
//! keyword list for a literal substring hit, pass 2 falls back to the
//! regex lists, and the first category in table order wins either pass.
//! User-defined tables go through the identical code path as the built-in
//! set: the taxonomy is injected at construction, not hardcoded here.

use std::collections::BTreeMap;

use bahi_core::Taxonomy;
use regex::{Regex, RegexBuilder};

const FALLBACK_CATEGORY: &str = "Other";

struct CompiledCategory {
    name: String,
    keywords: Vec<String>,
    patterns: Vec<Regex>,
}

pub struct Categorizer {
    categories: Vec<CompiledCategory>,
}

impl Categorizer {
    /// Compile a taxonomy once. Keywords are lowercased; empty keywords and
    /// invalid regex patterns are dropped rather than failing the table.
    pub fn new(taxonomy: &Taxonomy) -> Self {
        let categories = taxonomy
            .categories
            .iter()
            .map(|c| CompiledCategory {
                name: c.name.clone(),
                keywords: c
                    .keywords
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect(),
                patterns: c
                    .patterns
                    .iter()
                    .filter_map(|p| {
                        RegexBuilder::new(p).case_insensitive(true).build().ok()
                    })
                    .collect(),
            })
            .collect();
        Categorizer { categories }
    }

    pub fn builtin() -> Self {
        Self::new(&Taxonomy::builtin())
    }

    /// Classify narration text to a category name. Deterministic: for a
    /// fixed table and input the answer never changes, and earlier table
    /// entries beat later ones when both match.
    pub fn categorize(&self, text: &str) -> &str {
        let lowered = text.to_lowercase();

        for category in &self.categories {
            if category.keywords.iter().any(|k| lowered.contains(k.as_str())) {
                return &category.name;
            }
        }

        for category in &self.categories {
            if category.patterns.iter().any(|p| p.is_match(&lowered)) {
                return &category.name;
            }
        }

        FALLBACK_CATEGORY
    }

    /// Diagnostic aid: bucket every description that resolves to `Other` by
    /// each of its words longer than 4 characters, so recurring unclassified
    /// merchants stand out. Advisory tooling only, never on the
    /// transactional path.
    pub fn suggest(&self, descriptions: &[String]) -> BTreeMap<String, Vec<String>> {
        let mut suggestions: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for desc in descriptions {
            if self.categorize(desc) != FALLBACK_CATEGORY {
                continue;
            }
            for word in desc.to_lowercase().split_whitespace() {
                if word.chars().count() > 4 {
                    suggestions
                        .entry(word.to_string())
                        .or_default()
                        .push(desc.clone());
                }
            }
        }

        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bahi_core::{Category, CategoryKind};

    fn builtin() -> Categorizer {
        Categorizer::builtin()
    }

    // ── keyword pass ──────────────────────────────────────────────────────────

    #[test]
    fn keyword_match_case_insensitive() {
        let c = builtin();
        assert_eq!(c.categorize("UPI/SWIGGY/1234/order"), "Food & Dining");
        assert_eq!(c.categorize("payment to ZERODHA broking"), "Investments");
        assert_eq!(c.categorize("IRCTC ticket 8821"), "Transportation");
    }

    #[test]
    fn every_builtin_category_reachable_by_first_keyword() {
        let taxonomy = Taxonomy::builtin();
        let c = Categorizer::new(&taxonomy);
        for category in &taxonomy.categories {
            let Some(keyword) = category.keywords.first() else { continue };
            // A keyword is only guaranteed to resolve to its own category if
            // no earlier category also matches it; find the true winner.
            let winner = taxonomy
                .categories
                .iter()
                .find(|other| {
                    other.keywords.iter().any(|k| {
                        keyword.to_lowercase().contains(&k.to_lowercase())
                    })
                })
                .map(|other| other.name.as_str())
                .unwrap_or("Other");
            assert_eq!(c.categorize(keyword), winner, "keyword {keyword:?}");
        }
    }

    #[test]
    fn ordering_earlier_category_wins_on_overlap() {
        // "restaurant" (Food & Dining) and "mart" (Groceries pattern /
        // Shopping keyword family) in one string: table order decides.
        let c = builtin();
        assert_eq!(c.categorize("restaurant near dmart"), "Food & Dining");
    }

    #[test]
    fn ordering_transfer_keyword_beats_atm_regex() {
        // "neft" keyword (Transfer) fires in pass 1; ATM's regex would only
        // be consulted in pass 2.
        let c = builtin();
        assert_eq!(c.categorize("neft to atm services desk"), "Transfer");
    }

    // ── regex fallback pass ───────────────────────────────────────────────────

    #[test]
    fn regex_catches_morphological_variant() {
        // "bistro" and "railway" appear only in the pattern lists, not the
        // keyword lists.
        let c = builtin();
        assert_eq!(c.categorize("team bistro outing"), "Food & Dining");
        assert_eq!(c.categorize("railway reservation 123"), "Transportation");
    }

    #[test]
    fn keywords_checked_for_all_categories_before_any_regex() {
        // "challan" is a Taxes keyword; "railway" appears in Transportation's
        // regex list. The keyword pass must win even though Transportation
        // sits earlier in the table.
        let c = builtin();
        assert_eq!(c.categorize("railway challan"), "Taxes");
    }

    // ── fallback ──────────────────────────────────────────────────────────────

    #[test]
    fn empty_and_garbage_resolve_to_other() {
        let c = builtin();
        assert_eq!(c.categorize(""), "Other");
        assert_eq!(c.categorize("xyzxyz000"), "Other");
    }

    // ── injected tables ───────────────────────────────────────────────────────

    #[test]
    fn user_table_shares_the_matching_path() {
        let taxonomy = Taxonomy {
            categories: vec![
                Category {
                    name: "Chai".to_string(),
                    keywords: vec!["chaayos".to_string()],
                    patterns: vec!["masala chai".to_string()],
                    kind: CategoryKind::Expense,
                    icon: String::new(),
                    color: String::new(),
                },
            ],
        };
        let c = Categorizer::new(&taxonomy);
        assert_eq!(c.categorize("CHAAYOS CAFE CP"), "Chai");
        assert_eq!(c.categorize("order: Masala Chai x2"), "Chai");
        assert_eq!(c.categorize("coffee"), "Other");
    }

    #[test]
    fn invalid_user_regex_is_dropped_not_fatal() {
        let taxonomy = Taxonomy {
            categories: vec![Category {
                name: "Broken".to_string(),
                keywords: vec![],
                patterns: vec!["(unclosed".to_string()],
                kind: CategoryKind::Expense,
                icon: String::new(),
                color: String::new(),
            }],
        };
        let c = Categorizer::new(&taxonomy);
        assert_eq!(c.categorize("anything"), "Other");
    }

    // ── suggestions ───────────────────────────────────────────────────────────

    #[test]
    fn suggest_buckets_uncategorized_by_long_words() {
        let c = builtin();
        let descs = vec![
            "VENDING kiosk 12".to_string(),
            "VENDING kiosk 99".to_string(),
            "UPI/SWIGGY/1".to_string(), // categorized; must not appear
        ];
        let suggestions = c.suggest(&descs);
        assert_eq!(suggestions.get("vending").map(Vec::len), Some(2));
        assert_eq!(suggestions.get("kiosk").map(Vec::len), Some(2));
        assert!(!suggestions.values().flatten().any(|d| d.contains("SWIGGY")));
    }

    #[test]
    fn suggest_skips_short_words() {
        let c = builtin();
        let suggestions = c.suggest(&["odd tiny kiosk".to_string()]);
        assert!(suggestions.contains_key("kiosk"));
        assert!(!suggestions.contains_key("odd"));
        assert!(!suggestions.contains_key("tiny"));
    }
}
