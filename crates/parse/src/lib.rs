//! Statement extraction and normalization: issuer detection, line-level
//! regex table parsing for flattened PDF text, heuristic column mapping
//! for CSV exports, and the merchant/category enrichment pass.
//!
//! Everything here is synchronous and stateless between invocations; the
//! compiled regex and taxonomy tables are read-only, so independent
//! statements can be parsed concurrently with no coordination.

pub mod bank;
pub mod card;
pub mod categorize;
pub mod csv;
pub mod merchant;
pub mod mode;
pub mod normalize;
pub(crate) mod util;

pub use bank::{parse_statement, BankStatement, Issuer};
pub use card::{CardParser, CardStatement, CardSummary, CardTransaction, MerchantSpend};
pub use categorize::Categorizer;
pub use csv::{parse_csv, ColumnMap, CsvError};
pub use merchant::{extract_card_merchant, extract_merchant};
pub use mode::detect_mode;
pub use normalize::{looks_like_date, normalize_date, parse_amount, parse_amount_signed, parse_date};

use bahi_core::{EnrichedTransaction, RawTransaction};

/// Derive display fields for one raw transaction. Deterministic: the same
/// narration always yields the same merchant and category.
pub fn enrich(raw: RawTransaction, categorizer: &Categorizer) -> EnrichedTransaction {
    let merchant = merchant::extract_merchant(&raw.description);
    let category = categorizer
        .categorize(&format!("{} {}", raw.description, raw.remarks))
        .to_string();
    EnrichedTransaction::from_raw(raw, merchant, category)
}

/// Enrich a whole parse output, preserving order.
pub fn enrich_all(
    raw: Vec<RawTransaction>,
    categorizer: &Categorizer,
) -> Vec<EnrichedTransaction> {
    raw.into_iter().map(|t| enrich(t, categorizer)).collect()
}
