//! Issuer detection and line-level extraction for flattened statement text.
//!
//! Input is newline-segmented text as produced by any PDF-text-extraction
//! layer; table structure is gone, only line order survives. Extraction is
//! a two-stage strategy: an ordered fingerprint table picks the issuer,
//! then that issuer's row regex runs line by line. Lines that match no
//! pattern are silently skipped; a partially unreadable document degrades
//! to a partial transaction list instead of failing.
//!
//! The per-issuer brittleness is intentional: bank layouts drift issuer by
//! issuer and sometimes month by month, so each issuer keeps its own
//! pattern with documented capture-group semantics rather than one "smart"
//! regex shared by all.

use std::fmt;
use std::str::FromStr;

use bahi_core::{Direction, RawTransaction, TxnMode};
use rust_decimal::Decimal;

use crate::mode::detect_mode;
use crate::normalize::{parse_amount, parse_date};
use crate::util::re;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Issuer {
    Sbi,
    Hdfc,
    Icici,
    Axis,
    Kotak,
    Pnb,
    Bob,
    Canara,
    Generic,
}

impl fmt::Display for Issuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Issuer::Sbi => "SBI",
            Issuer::Hdfc => "HDFC",
            Issuer::Icici => "ICICI",
            Issuer::Axis => "Axis",
            Issuer::Kotak => "Kotak",
            Issuer::Pnb => "PNB",
            Issuer::Bob => "BOB",
            Issuer::Canara => "Canara",
            Issuer::Generic => "Generic",
        };
        write!(f, "{name}")
    }
}

/// Result of one document parse. `lines_scanned` counts non-empty input
/// lines so callers can distinguish "empty document" from "nothing we
/// could read".
#[derive(Debug)]
pub struct BankStatement {
    pub issuer: Issuer,
    pub transactions: Vec<RawTransaction>,
    pub lines_scanned: usize,
}

impl BankStatement {
    /// A non-empty document that yielded zero transactions. Not an error;
    /// the caller should suggest a CSV export instead.
    pub fn low_confidence(&self) -> bool {
        self.transactions.is_empty() && self.lines_scanned > 0
    }
}

struct IssuerRule {
    issuer: Issuer,
    detect: fn(&str) -> bool,
    parse: fn(&str) -> Vec<RawTransaction>,
}

// First matching fingerprint in table order wins; the always-true generic
// entry last guarantees some parser runs.
static RULES: &[IssuerRule] = &[
    IssuerRule { issuer: Issuer::Sbi, detect: detect_sbi, parse: parse_sbi },
    IssuerRule { issuer: Issuer::Hdfc, detect: detect_hdfc, parse: parse_hdfc },
    IssuerRule { issuer: Issuer::Icici, detect: detect_icici, parse: parse_icici },
    IssuerRule { issuer: Issuer::Axis, detect: detect_axis, parse: parse_axis },
    IssuerRule { issuer: Issuer::Kotak, detect: detect_kotak, parse: parse_generic },
    IssuerRule { issuer: Issuer::Pnb, detect: detect_pnb, parse: parse_generic },
    IssuerRule { issuer: Issuer::Bob, detect: detect_bob, parse: parse_generic },
    IssuerRule { issuer: Issuer::Canara, detect: detect_canara, parse: parse_generic },
    IssuerRule { issuer: Issuer::Generic, detect: detect_any, parse: parse_generic },
];

fn detect_sbi(text: &str) -> bool {
    text.contains("State Bank of India") || text.contains("SBI")
}

fn detect_hdfc(text: &str) -> bool {
    text.contains("HDFC Bank") || text.contains("HDFC BANK")
}

fn detect_icici(text: &str) -> bool {
    text.contains("ICICI Bank") || text.contains("ICICI BANK")
}

fn detect_axis(text: &str) -> bool {
    text.contains("Axis Bank") || text.contains("AXIS BANK")
}

fn detect_kotak(text: &str) -> bool {
    text.contains("Kotak Mahindra") || text.contains("KOTAK")
}

fn detect_pnb(text: &str) -> bool {
    text.contains("Punjab National Bank") || text.contains("PNB")
}

fn detect_bob(text: &str) -> bool {
    text.contains("Bank of Baroda") || text.contains("BOB")
}

fn detect_canara(text: &str) -> bool {
    text.contains("Canara Bank")
}

fn detect_any(_text: &str) -> bool {
    true
}

/// Detect the issuer and run its extractor over the whole document.
pub fn parse_statement(text: &str) -> BankStatement {
    let lines_scanned = text.lines().filter(|l| !l.trim().is_empty()).count();

    for rule in RULES {
        if (rule.detect)(text) {
            tracing::debug!(issuer = %rule.issuer, "detected statement issuer");
            let transactions = (rule.parse)(text);
            tracing::debug!(
                issuer = %rule.issuer,
                extracted = transactions.len(),
                lines_scanned,
                "statement extraction finished"
            );
            return BankStatement { issuer: rule.issuer, transactions, lines_scanned };
        }
    }

    // The generic rule's detector is always true; this is unreachable.
    BankStatement { issuer: Issuer::Generic, transactions: Vec::new(), lines_scanned }
}

// ── SBI ───────────────────────────────────────────────────────────────────────
// Columns: date | description | ref no | debit | credit | balance

re!(
    re_sbi_row,
    r"(\d{2}[/-]\d{2}[/-]\d{4})\s+(.+?)\s+(\d+)\s+([\d,]+\.?\d*|-)?\s+([\d,]+\.?\d*|-)?\s+([\d,]+\.?\d*)"
);

fn parse_sbi(text: &str) -> Vec<RawTransaction> {
    let mut transactions = Vec::new();

    for line in text.lines() {
        let Some(c) = re_sbi_row().captures(line) else { continue };

        let debit = optional_amount(c.get(4).map(|m| m.as_str()));
        let credit = optional_amount(c.get(5).map(|m| m.as_str()));
        if debit <= Decimal::ZERO && credit <= Decimal::ZERO {
            continue;
        }
        let Some(date) = parse_date(&c[1]) else { continue };

        let description = c[2].trim().to_string();
        let (amount, direction) = pick_direction(debit, credit);
        transactions.push(RawTransaction {
            date,
            mode: detect_mode(&description),
            description,
            remarks: String::new(),
            amount,
            direction,
            balance: Some(parse_amount(&c[6])),
            reference: c[3].to_string(),
        });
    }

    transactions
}

// ── HDFC ──────────────────────────────────────────────────────────────────────
// Full table: date | narration | chq/ref no | value date | withdrawal |
// deposit | closing balance. Short form: date | narration | amount |
// Dr/Cr | balance, where direction follows the marker.

re!(
    re_hdfc_full_row,
    r"(\d{2}/\d{2}/\d{2,4})\s+(.+?)\s+(\S+)\s+\d{2}/\d{2}/\d{2,4}\s+([\d,]+\.?\d*|0\.00)\s+([\d,]+\.?\d*|0\.00)\s+([\d,]+\.?\d*)"
);
re!(
    re_hdfc_drcr_row,
    r"(?i)(\d{2}[/-]\d{2}[/-]\d{2,4})\s+(.+?)\s+([\d,]+\.?\d*)\s+(Dr|Cr)\s+([\d,]+\.?\d*)"
);

fn parse_hdfc(text: &str) -> Vec<RawTransaction> {
    let mut transactions = Vec::new();

    for line in text.lines() {
        if let Some(c) = re_hdfc_full_row().captures(line) {
            let debit = parse_amount(&c[4]);
            let credit = parse_amount(&c[5]);
            if debit <= Decimal::ZERO && credit <= Decimal::ZERO {
                continue;
            }
            let Some(date) = parse_date(&c[1]) else { continue };

            let description = c[2].trim().to_string();
            let (amount, direction) = pick_direction(debit, credit);
            transactions.push(RawTransaction {
                date,
                mode: detect_mode(&description),
                description,
                remarks: String::new(),
                amount,
                direction,
                balance: Some(parse_amount(&c[6])),
                reference: c[3].to_string(),
            });
        } else if let Some(c) = re_hdfc_drcr_row().captures(line) {
            let amount = parse_amount(&c[3]);
            if amount <= Decimal::ZERO {
                continue;
            }
            let Some(date) = parse_date(&c[1]) else { continue };

            let direction = if c[4].eq_ignore_ascii_case("cr") {
                Direction::Credit
            } else {
                Direction::Debit
            };
            let description = c[2].trim().to_string();
            transactions.push(RawTransaction {
                date,
                mode: detect_mode(&description),
                description,
                remarks: String::new(),
                amount,
                direction,
                balance: Some(parse_amount(&c[5])),
                reference: String::new(),
            });
        }
    }

    transactions
}

// ── ICICI ─────────────────────────────────────────────────────────────────────
// Columns: date | mode | particulars | deposits | withdrawals | balance

re!(
    re_icici_row,
    r"(\d{2}[/-]\d{2}[/-]\d{4})\s+(\w+)\s+(.+?)\s+([\d,]+\.?\d*|-)?\s+([\d,]+\.?\d*|-)?\s+([\d,]+\.?\d*)"
);

fn parse_icici(text: &str) -> Vec<RawTransaction> {
    let mut transactions = Vec::new();

    for line in text.lines() {
        let Some(c) = re_icici_row().captures(line) else { continue };

        let deposit = optional_amount(c.get(4).map(|m| m.as_str()));
        let withdrawal = optional_amount(c.get(5).map(|m| m.as_str()));
        if deposit <= Decimal::ZERO && withdrawal <= Decimal::ZERO {
            continue;
        }
        let Some(date) = parse_date(&c[1]) else { continue };

        let description = c[3].trim().to_string();
        let (amount, direction) = if withdrawal > Decimal::ZERO {
            (withdrawal, Direction::Debit)
        } else {
            (deposit, Direction::Credit)
        };
        // ICICI prints the rail in its own column; fall back to narration
        // sniffing when the token is not a known rail.
        let mode = TxnMode::from_str(&c[2]).unwrap_or_else(|_| detect_mode(&description));
        transactions.push(RawTransaction {
            date,
            description,
            remarks: String::new(),
            amount,
            direction,
            balance: Some(parse_amount(&c[6])),
            reference: String::new(),
            mode,
        });
    }

    transactions
}

// ── Axis ──────────────────────────────────────────────────────────────────────
// Columns: date | description | debit | credit | balance

re!(
    re_axis_row,
    r"(\d{2}[/-]\d{2}[/-]\d{4})\s+(.+?)\s+([\d,]+\.?\d*)\s+([\d,]+\.?\d*)\s+([\d,]+\.?\d*)"
);

fn parse_axis(text: &str) -> Vec<RawTransaction> {
    let mut transactions = Vec::new();

    for line in text.lines() {
        let Some(c) = re_axis_row().captures(line) else { continue };

        let debit = parse_amount(&c[3]);
        let credit = parse_amount(&c[4]);
        if debit <= Decimal::ZERO && credit <= Decimal::ZERO {
            continue;
        }
        let Some(date) = parse_date(&c[1]) else { continue };

        let description = c[2].trim().to_string();
        let (amount, direction) = pick_direction(debit, credit);
        transactions.push(RawTransaction {
            date,
            mode: detect_mode(&description),
            description,
            remarks: String::new(),
            amount,
            direction,
            balance: Some(parse_amount(&c[5])),
            reference: String::new(),
        });
    }

    transactions
}

// ── Generic fallback ──────────────────────────────────────────────────────────
// Three line shapes: a numeric-date row with an optional Dr/Cr marker, a
// DD-MMM row with three amount columns, and a rail-prefixed row. Direction
// comes from free-text heuristics when no structured marker is present,
// defaulting to debit.

re!(
    re_generic_numeric_row,
    r"(?i)(\d{2}[/-]\d{2}[/-]\d{2,4})\s+(.{10,50}?)\s+([\d,]+\.?\d*)\s*(dr|cr|d|c)?\s*([\d,]+\.?\d*)?"
);
re!(
    re_generic_month_row,
    r"(\d{2}[/-][A-Za-z]{3}[/-]\d{2,4})\s+(.+?)\s+([\d,]+\.?\d*)\s+([\d,]+\.?\d*)\s+([\d,]+\.?\d*)"
);
re!(re_generic_rail_row, r"(?i)(upi|neft|imps|rtgs)[/-](.+?)\s+([\d,]+\.?\d*)");
re!(
    re_any_date,
    r"\d{2}[/-]\d{2}[/-]\d{2,4}|\d{2}[/-][A-Za-z]{3}[/-]\d{2,4}"
);
re!(re_paise_amount, r"[\d,]+\.\d{2}");
re!(re_debit_words, r"(?i)dr|debit|withdrawal|paid|transferred");
re!(re_credit_words, r"(?i)cr|credit|deposit|received|credited");

fn parse_generic(text: &str) -> Vec<RawTransaction> {
    let mut transactions = Vec::new();

    for line in text.lines() {
        let shape_matched = re_generic_numeric_row().is_match(line)
            || re_generic_month_row().is_match(line)
            || re_generic_rail_row().is_match(line);
        if !shape_matched {
            continue;
        }

        let Some(date_match) = re_any_date().find(line) else { continue };
        let Some(date) = parse_date(date_match.as_str()) else { continue };

        let amounts: Vec<regex::Match<'_>> = re_paise_amount().find_iter(line).collect();
        let Some(first_amount) = amounts.first() else { continue };
        let amount = parse_amount(first_amount.as_str());
        if amount <= Decimal::ZERO {
            continue;
        }

        let direction = if re_debit_words().is_match(line) {
            Direction::Debit
        } else if re_credit_words().is_match(line) {
            Direction::Credit
        } else {
            Direction::Debit
        };

        let description = line
            .get(date_match.end()..first_amount.start())
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| line.chars().take(50).collect::<String>().trim().to_string());

        let balance = if amounts.len() > 1 {
            amounts.last().map(|m| parse_amount(m.as_str()))
        } else {
            None
        };

        transactions.push(RawTransaction {
            date,
            description,
            remarks: String::new(),
            amount,
            direction,
            balance,
            reference: String::new(),
            mode: detect_mode(line),
        });
    }

    transactions
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Parse an optional amount column where banks print `-` for "no entry".
fn optional_amount(cell: Option<&str>) -> Decimal {
    match cell {
        Some(s) if s != "-" => parse_amount(s),
        _ => Decimal::ZERO,
    }
}

fn pick_direction(debit: Decimal, credit: Decimal) -> (Decimal, Direction) {
    if debit > Decimal::ZERO {
        (debit, Direction::Debit)
    } else {
        (credit, Direction::Credit)
    }
}
