//! Credit-card statement parsing: the same detect-then-extract strategy as
//! the bank parser, with a categorizer scoped to spend-relevant categories
//! and a derived per-statement summary.

use std::collections::BTreeMap;
use std::fmt;

use bahi_core::{Direction, Taxonomy};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::categorize::Categorizer;
use crate::merchant::extract_card_merchant;
use crate::normalize::{parse_amount, parse_date};
use crate::util::re;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardIssuer {
    Hdfc,
    Icici,
    Sbi,
    Axis,
    Generic,
}

impl fmt::Display for CardIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CardIssuer::Hdfc => "HDFC Credit Card",
            CardIssuer::Icici => "ICICI Credit Card",
            CardIssuer::Sbi => "SBI Card",
            CardIssuer::Axis => "Axis Credit Card",
            CardIssuer::Generic => "Generic Credit Card",
        };
        write!(f, "{name}")
    }
}

/// A card statement row. Card statements carry no running balance column;
/// merchant and category are derived during extraction because the card
/// path owns its spend-scoped categorizer.
#[derive(Debug, Clone)]
pub struct CardTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub direction: Direction,
    pub reference: String,
    pub merchant: String,
    pub category: String,
}

#[derive(Debug)]
pub struct CardStatement {
    pub issuer: CardIssuer,
    pub transactions: Vec<CardTransaction>,
    pub lines_scanned: usize,
}

impl CardStatement {
    pub fn low_confidence(&self) -> bool {
        self.transactions.is_empty() && self.lines_scanned > 0
    }
}

// Card statements classify against the spend side of the table only;
// income-style categories would be noise on a card.
const SPEND_CATEGORIES: &[&str] = &[
    "Food & Dining",
    "Groceries",
    "Shopping",
    "Transportation",
    "Entertainment",
    "Travel",
    "Utilities",
    "Healthcare",
    "Subscriptions",
    "Refund",
];

static CARD_FINGERPRINTS: &[(CardIssuer, fn(&str) -> bool)] = &[
    (CardIssuer::Hdfc, detect_hdfc_card),
    (CardIssuer::Icici, detect_icici_card),
    (CardIssuer::Sbi, detect_sbi_card),
    (CardIssuer::Axis, detect_axis_card),
    (CardIssuer::Generic, detect_any_card),
];

fn detect_hdfc_card(text: &str) -> bool {
    text.contains("HDFC Bank") && (text.contains("Credit Card") || text.contains("CC Statement"))
}

fn detect_icici_card(text: &str) -> bool {
    text.contains("ICICI Bank") && text.contains("Card Statement")
}

fn detect_sbi_card(text: &str) -> bool {
    text.contains("SBI Card") || (text.contains("SBI") && text.contains("Credit Card"))
}

fn detect_axis_card(text: &str) -> bool {
    text.contains("Axis Bank") && text.contains("Card Statement")
}

fn detect_any_card(_text: &str) -> bool {
    true
}

fn detect_card_issuer(text: &str) -> CardIssuer {
    CARD_FINGERPRINTS
        .iter()
        .find(|(_, detect)| detect(text))
        .map(|(issuer, _)| *issuer)
        .unwrap_or(CardIssuer::Generic)
}

// HDFC card rows: date | description | amount | Cr/Dr marker.
re!(
    re_hdfc_card_row,
    r"(?i)(\d{2}[/-][a-z]{3}[/-]\d{4})\s+(.+?)\s+([\d,]+\.?\d*)\s*(cr|dr)?"
);
re!(
    re_card_date,
    r"\d{2}[/-]\d{2}[/-]\d{2,4}|\d{2}[/-][A-Za-z]{3}[/-]\d{2,4}"
);
re!(re_card_amount, r"[\d,]+\.\d{2}");
re!(re_card_credit_words, r"(?i)cr|credit|refund|cashback");

pub struct CardParser {
    categorizer: Categorizer,
}

impl CardParser {
    /// Build a parser whose categorizer sees only the spend-relevant slice
    /// of the supplied taxonomy, order preserved.
    pub fn new(taxonomy: &Taxonomy) -> Self {
        let scoped = Taxonomy {
            categories: taxonomy
                .categories
                .iter()
                .filter(|c| SPEND_CATEGORIES.contains(&c.name.as_str()))
                .cloned()
                .collect(),
        };
        CardParser { categorizer: Categorizer::new(&scoped) }
    }

    pub fn parse(&self, text: &str) -> CardStatement {
        let lines_scanned = text.lines().filter(|l| !l.trim().is_empty()).count();
        let issuer = detect_card_issuer(text);
        tracing::debug!(issuer = %issuer, "detected card issuer");

        let transactions = match issuer {
            CardIssuer::Hdfc => self.parse_hdfc(text),
            _ => self.parse_generic(text),
        };

        CardStatement { issuer, transactions, lines_scanned }
    }

    fn parse_hdfc(&self, text: &str) -> Vec<CardTransaction> {
        let mut transactions = Vec::new();

        for line in text.lines() {
            let Some(c) = re_hdfc_card_row().captures(line.trim_end()) else { continue };

            let amount = parse_amount(&c[3]);
            if amount <= Decimal::ZERO {
                continue;
            }
            let Some(date) = parse_date(&c[1]) else { continue };

            let is_credit = c.get(4).is_some_and(|m| m.as_str().eq_ignore_ascii_case("cr"));
            let description = c[2].trim().to_string();
            transactions.push(self.build(date, description, amount, is_credit));
        }

        transactions
    }

    fn parse_generic(&self, text: &str) -> Vec<CardTransaction> {
        let mut transactions = Vec::new();

        for line in text.lines() {
            let Some(date_match) = re_card_date().find(line) else { continue };
            let Some(amount_match) = re_card_amount().find(line) else { continue };

            let amount = parse_amount(amount_match.as_str());
            // Plausibility window filters page numbers and card digits that
            // sneak through the amount shape.
            if amount < Decimal::ONE || amount > Decimal::from(10_000_000u32) {
                continue;
            }
            let Some(date) = parse_date(date_match.as_str()) else { continue };

            let description = line
                .get(date_match.end()..amount_match.start())
                .map(str::trim)
                .unwrap_or("")
                .to_string();
            if description.chars().count() < 3 {
                continue;
            }

            let is_credit = re_card_credit_words().is_match(line);
            transactions.push(self.build(date, description, amount, is_credit));
        }

        transactions
    }

    fn build(
        &self,
        date: NaiveDate,
        description: String,
        amount: Decimal,
        is_credit: bool,
    ) -> CardTransaction {
        let category = if is_credit {
            "Refund".to_string()
        } else {
            self.categorizer.categorize(&description).to_string()
        };
        CardTransaction {
            date,
            merchant: extract_card_merchant(&description),
            description,
            amount,
            direction: if is_credit { Direction::Credit } else { Direction::Debit },
            reference: String::new(),
            category,
        }
    }
}

// ── Statement summary ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantSpend {
    pub merchant: String,
    pub amount: Decimal,
    pub count: usize,
}

/// Pure reduction over an extracted statement: totals, category breakdown,
/// and the top merchants by spend. Carries no state of its own.
#[derive(Debug, Clone)]
pub struct CardSummary {
    pub total_spend: Decimal,
    pub total_payments: Decimal,
    pub cashback: Decimal,
    pub transaction_count: usize,
    pub category_breakdown: BTreeMap<String, Decimal>,
    pub top_merchants: Vec<MerchantSpend>,
}

impl CardSummary {
    pub fn generate(transactions: &[CardTransaction]) -> Self {
        let mut total_spend = Decimal::ZERO;
        let mut total_payments = Decimal::ZERO;
        let mut cashback = Decimal::ZERO;
        let mut category_breakdown: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut merchants: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();

        for t in transactions {
            match t.direction {
                Direction::Debit => {
                    total_spend += t.amount;
                    *category_breakdown.entry(t.category.clone()).or_default() += t.amount;
                    let entry = merchants.entry(t.merchant.clone()).or_default();
                    entry.0 += t.amount;
                    entry.1 += 1;
                }
                Direction::Credit if t.category == "Refund" => cashback += t.amount,
                Direction::Credit => total_payments += t.amount,
            }
        }

        let mut top_merchants: Vec<MerchantSpend> = merchants
            .into_iter()
            .map(|(merchant, (amount, count))| MerchantSpend { merchant, amount, count })
            .collect();
        top_merchants.sort_by(|a, b| b.amount.cmp(&a.amount));
        top_merchants.truncate(10);

        CardSummary {
            total_spend,
            total_payments,
            cashback,
            transaction_count: transactions.len(),
            category_breakdown,
            top_merchants,
        }
    }
}
