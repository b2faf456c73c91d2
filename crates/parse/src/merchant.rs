//! Merchant-name extraction and cleanup from transaction narration.

use crate::util::re;

// Rail-prefixed narration shapes, most specific first.
re!(re_upi_seg, r"(?i)upi[/-]([^/-]+)[/-]");
re!(re_paid_to, r"(?i)paid to ([^/@-]+)");
re!(re_received_from, r"(?i)received from ([^/@-]+)");
re!(re_neft_seg, r"(?i)neft[/-]([^/-]+)[/-]");
re!(re_imps_seg, r"(?i)imps[/-]([^/-]+)[/-]");
re!(re_pos_seg, r"(?i)pos[/-]([^/-]+)");
re!(re_to_clause, r"(?i)to\s+([a-z\s]+?)(?:\s+on|\s+ref|\s+\d)");
re!(re_from_clause, r"(?i)from\s+([a-z\s]+?)(?:\s+on|\s+ref|\s+\d)");

re!(re_legal_suffix, r"(?i)\s*\b(pvt|ltd|limited|private|llp|inc|corp|co)\b\.?\s*");
re!(re_card_prefix, r"(?i)^(pos|ecom|online|intl|int'l)\b\s*");
re!(re_trailing_ref, r"\s*\d{4,}.*$");

/// Tokens that are rail/reference noise, never a merchant.
const STOPWORDS: &[&str] = &["upi", "neft", "imps", "rtgs", "pos", "ref", "txn"];

/// Plausible merchant-name length window; anything outside is more likely
/// a whole sentence or a noise token.
const MIN_LEN: usize = 4;
const MAX_LEN: usize = 49;

/// Derive a display merchant name from bank narration. Returns an empty
/// string when no plausible candidate is found; callers treat that as
/// "unknown", not an error.
pub fn extract_merchant(description: &str) -> String {
    let patterns = [
        re_upi_seg(),
        re_paid_to(),
        re_received_from(),
        re_neft_seg(),
        re_imps_seg(),
        re_pos_seg(),
        re_to_clause(),
        re_from_clause(),
    ];

    for pattern in patterns {
        if let Some(c) = pattern.captures(description) {
            if let Some(m) = c.get(1) {
                let candidate = m.as_str().trim();
                if (MIN_LEN..=MAX_LEN).contains(&candidate.chars().count()) {
                    return clean_merchant_name(candidate);
                }
            }
        }
    }

    // No structured shape matched: fall back to the first significant token.
    for part in description.split(|c: char| c == '/' || c == '-' || c.is_whitespace()) {
        if part.chars().count() >= MIN_LEN
            && !part.chars().all(|c| c.is_ascii_digit())
            && !STOPWORDS.contains(&part.to_lowercase().as_str())
        {
            return clean_merchant_name(part);
        }
    }

    String::new()
}

/// Credit-card narration variant: card statements prefix the channel and
/// append reference/card digits rather than using slash-delimited rails.
pub fn extract_card_merchant(description: &str) -> String {
    let stripped = re_card_prefix().replace(description, "");
    let stripped = re_trailing_ref().replace(&stripped, "");
    title_case(stripped.trim())
}

/// Strip legal-entity suffixes, collapse whitespace, title-case.
fn clean_merchant_name(name: &str) -> String {
    let cleaned = re_legal_suffix().replace_all(name, " ");
    title_case(cleaned.trim())
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── structured rail prefixes ──────────────────────────────────────────────

    #[test]
    fn upi_segment() {
        assert_eq!(extract_merchant("UPI/SWIGGY/401234567890/Payment"), "Swiggy");
    }

    #[test]
    fn neft_and_imps_segments() {
        assert_eq!(extract_merchant("NEFT/ACME CORP/N012345678"), "Acme");
        assert_eq!(extract_merchant("IMPS/RELIANCE RETAIL/P2A"), "Reliance Retail");
    }

    #[test]
    fn pos_segment() {
        assert_eq!(extract_merchant("POS/BIGBASKET MUMBAI"), "Bigbasket Mumbai");
    }

    #[test]
    fn paid_to_clause() {
        assert_eq!(extract_merchant("paid to Sharma Stores via wallet"), "Sharma Stores Via Wallet");
    }

    #[test]
    fn to_clause_stops_at_ref() {
        assert_eq!(extract_merchant("transfer to landlord rent ref 99231"), "Landlord Rent");
    }

    // ── fallback token scan ───────────────────────────────────────────────────

    #[test]
    fn fallback_skips_rail_stopwords_and_numbers() {
        assert_eq!(extract_merchant("UPI 401234567890 ZOMATO order"), "Zomato");
    }

    #[test]
    fn fallback_first_significant_token() {
        assert_eq!(extract_merchant("STARBUCKS COFFEE 1203"), "Starbucks");
    }

    #[test]
    fn no_candidate_gives_empty() {
        assert_eq!(extract_merchant("123 456 789"), "");
        assert_eq!(extract_merchant(""), "");
        assert_eq!(extract_merchant("upi/ref/txn"), "");
    }

    // ── cleanup ───────────────────────────────────────────────────────────────

    #[test]
    fn strips_legal_suffixes() {
        assert_eq!(extract_merchant("UPI/ACME TRADERS PVT LTD/123/x"), "Acme Traders");
    }

    #[test]
    fn title_cases_words() {
        assert_eq!(extract_merchant("UPI/blue tokai coffee/99/x"), "Blue Tokai Coffee");
    }

    // ── card variant ──────────────────────────────────────────────────────────

    #[test]
    fn card_strips_channel_prefix() {
        assert_eq!(extract_card_merchant("POS AMAZON RETAIL"), "Amazon Retail");
        assert_eq!(extract_card_merchant("ECOM SWIGGY BANGALORE"), "Swiggy Bangalore");
    }

    #[test]
    fn card_strips_trailing_reference_digits() {
        assert_eq!(extract_card_merchant("DOMINOS PIZZA 413245678901"), "Dominos Pizza");
    }

    #[test]
    fn card_plain_description_title_cased() {
        assert_eq!(extract_card_merchant("makemytrip india"), "Makemytrip India");
    }
}
