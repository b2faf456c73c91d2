//! Column-mapping CSV statement parser.
//!
//! Bank CSV exports agree on nothing, least of all header names. Columns
//! are discovered by scanning the header row for the first column whose
//! lowercased name contains any candidate from a ranked synonym list. The
//! date column is mandatory; everything else degrades gracefully.

use std::io::Read;

use bahi_core::{Direction, RawTransaction};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::mode::detect_mode;
use crate::normalize::{looks_like_date, parse_amount_signed, parse_date};

const DATE_COLUMNS: &[&str] = &[
    "date", "txn date", "transaction date", "value date", "posting date", "trans date",
    "tran date", "dt",
];
const DESCRIPTION_COLUMNS: &[&str] = &[
    "description", "narration", "particulars", "transaction details", "remarks", "details",
    "desc", "transaction description", "txn details",
];
const REMARKS_COLUMNS: &[&str] = &["remarks", "notes", "memo", "additional info", "comment"];
const DEBIT_COLUMNS: &[&str] = &[
    "debit", "withdrawal", "withdrawals", "debit amount", "dr", "amount debited",
    "debit(rs)", "withdrawn",
];
const CREDIT_COLUMNS: &[&str] = &[
    "credit", "deposit", "deposits", "credit amount", "cr", "amount credited",
    "credit(rs)", "deposited",
];
const AMOUNT_COLUMNS: &[&str] = &["amount", "transaction amount", "txn amount", "value", "amt"];
const BALANCE_COLUMNS: &[&str] = &[
    "balance", "closing balance", "available balance", "running balance", "bal", "closing bal",
];
const REFERENCE_COLUMNS: &[&str] = &[
    "reference", "ref no", "reference number", "ref", "transaction id", "txn id", "chq no",
    "cheque no", "utr",
];
const TYPE_COLUMNS: &[&str] = &["type", "transaction type", "txn type", "cr/dr", "dr/cr"];

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Could not find a date column in the CSV header")]
    MissingDateColumn,
}

/// Resolved header positions for the semantic fields of a statement row.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub date: usize,
    pub description: Option<usize>,
    pub remarks: Option<usize>,
    pub debit: Option<usize>,
    pub credit: Option<usize>,
    pub amount: Option<usize>,
    pub balance: Option<usize>,
    pub reference: Option<usize>,
    pub kind: Option<usize>,
}

impl ColumnMap {
    /// `headers` must already be lowercased and trimmed.
    pub fn discover(headers: &[String]) -> Result<Self, CsvError> {
        let date = find_column(headers, DATE_COLUMNS).ok_or(CsvError::MissingDateColumn)?;
        Ok(ColumnMap {
            date,
            description: find_column(headers, DESCRIPTION_COLUMNS),
            remarks: find_column(headers, REMARKS_COLUMNS),
            debit: find_column(headers, DEBIT_COLUMNS),
            credit: find_column(headers, CREDIT_COLUMNS),
            amount: find_column(headers, AMOUNT_COLUMNS),
            balance: find_column(headers, BALANCE_COLUMNS),
            reference: find_column(headers, REFERENCE_COLUMNS),
            kind: find_column(headers, TYPE_COLUMNS),
        })
    }
}

fn find_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|candidate| headers.iter().position(|h| h.contains(candidate)))
}

/// Parse a delimited export with a header row into raw transactions,
/// preserving source row order. A row that cannot be read is skipped, not
/// fatal; only a missing date column fails the whole file.
pub fn parse_csv<R: Read>(data: R) -> Result<Vec<RawTransaction>, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let map = ColumnMap::discover(&headers)?;

    let mut transactions = Vec::new();
    let mut skipped = 0usize;

    for record in reader.records() {
        let Ok(record) = record else {
            skipped += 1;
            continue;
        };

        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("").trim();

        let date_cell = cell(Some(map.date));
        if !looks_like_date(date_cell) {
            skipped += 1;
            continue;
        }
        let Some(date) = parse_date(date_cell) else {
            skipped += 1;
            continue;
        };

        // Amount + direction cascade: dedicated debit/credit columns beat a
        // combined amount+type pair, which beats a lone signed amount column.
        let (amount, direction) = if let (Some(d), Some(c)) = (map.debit, map.credit) {
            let debit = parse_amount_signed(cell(Some(d)));
            let credit = parse_amount_signed(cell(Some(c)));
            if debit > Decimal::ZERO {
                (debit, Direction::Debit)
            } else if credit > Decimal::ZERO {
                (credit, Direction::Credit)
            } else {
                (Decimal::ZERO, Direction::Debit)
            }
        } else if let (Some(a), Some(t)) = (map.amount, map.kind) {
            let amount = parse_amount_signed(cell(Some(a)));
            let kind_cell = cell(Some(t)).to_lowercase();
            let direction = if kind_cell.contains("cr") || kind_cell.contains("credit") || kind_cell == "c" {
                Direction::Credit
            } else {
                Direction::Debit
            };
            (amount, direction)
        } else if let Some(a) = map.amount {
            let raw_cell = cell(Some(a));
            let direction = if raw_cell.contains('-') || raw_cell.contains('(') {
                Direction::Debit
            } else {
                Direction::Credit
            };
            (parse_amount_signed(raw_cell).abs(), direction)
        } else {
            (Decimal::ZERO, Direction::Debit)
        };

        if amount <= Decimal::ZERO {
            skipped += 1;
            continue;
        }

        let description = cell(map.description).to_string();
        let remarks = cell(map.remarks).to_string();
        let reference = cell(map.reference).to_string();
        let balance = map.balance.map(|i| parse_amount_signed(cell(Some(i)))).filter(|b| !b.is_zero());
        let mode = detect_mode(&format!("{description} {remarks}"));

        transactions.push(RawTransaction {
            date,
            description,
            remarks,
            amount,
            direction,
            balance,
            reference,
            mode,
        });
    }

    tracing::debug!(
        extracted = transactions.len(),
        skipped,
        "csv statement parsed"
    );

    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bahi_core::TxnMode;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    // ── column discovery ──────────────────────────────────────────────────────

    #[test]
    fn discovers_fuzzy_header_names() {
        let headers: Vec<String> = ["txn date", "narration", "withdrawal amt", "deposit amt", "balance"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let map = ColumnMap::discover(&headers).unwrap();
        assert_eq!(map.date, 0);
        assert_eq!(map.description, Some(1));
        assert_eq!(map.debit, Some(2));
        assert_eq!(map.credit, Some(3));
        assert_eq!(map.balance, Some(4));
        // The "amt" synonym also hits "withdrawal amt"; harmless because the
        // dedicated debit/credit pair takes precedence in the row cascade.
        assert_eq!(map.amount, Some(2));
    }

    #[test]
    fn missing_date_column_is_fatal() {
        let headers: Vec<String> = ["narration", "amount"].iter().map(|s| s.to_string()).collect();
        assert!(matches!(
            ColumnMap::discover(&headers),
            Err(CsvError::MissingDateColumn)
        ));
    }

    #[test]
    fn candidate_ranking_prefers_earlier_synonym() {
        // "date" matches "value date" too; the first header containing the
        // highest-ranked candidate wins.
        let headers: Vec<String> = ["value date", "date", "amount"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let map = ColumnMap::discover(&headers).unwrap();
        assert_eq!(map.date, 0);
    }

    // ── row parsing ───────────────────────────────────────────────────────────

    #[test]
    fn debit_credit_columns_set_direction() {
        let data = "\
Txn Date,Narration,Withdrawal Amt,Deposit Amt,Balance
05/01/2024,UPI/SWIGGY/1234,500.00,0.00,12000.00
06/01/2024,SALARY JAN,0.00,50000.00,62000.00
";
        let txs = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].amount, dec("500.00"));
        assert_eq!(txs[0].direction, Direction::Debit);
        assert_eq!(txs[0].date, date(2024, 1, 5));
        assert_eq!(txs[0].balance, Some(dec("12000.00")));
        assert_eq!(txs[1].direction, Direction::Credit);
        assert_eq!(txs[1].amount, dec("50000.00"));
    }

    #[test]
    fn debit_takes_priority_when_both_populated() {
        let data = "\
Date,Description,Debit,Credit
05/01/2024,WEIRD ROW,250.00,250.00
";
        let txs = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(txs[0].direction, Direction::Debit);
        assert_eq!(txs[0].amount, dec("250.00"));
    }

    #[test]
    fn amount_with_type_column() {
        let data = "\
Date,Particulars,Amount,Type
05/01/2024,NEFT FROM EMPLOYER,45000.00,CR
06/01/2024,ATM WDL,2000.00,DR
";
        let txs = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(txs[0].direction, Direction::Credit);
        assert_eq!(txs[1].direction, Direction::Debit);
    }

    #[test]
    fn lone_amount_column_sign_heuristic() {
        let data = "\
Date,Description,Amount
05/01/2024,COFFEE SHOP,-450.00
06/01/2024,REFUND CREDIT,450.00
07/01/2024,PAREN STYLE,(120.00)
";
        let txs = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(txs.len(), 3);
        assert_eq!(txs[0].direction, Direction::Debit);
        assert_eq!(txs[0].amount, dec("450.00"));
        assert_eq!(txs[1].direction, Direction::Credit);
        assert_eq!(txs[2].direction, Direction::Debit);
        assert_eq!(txs[2].amount, dec("120.00"));
    }

    #[test]
    fn non_date_rows_are_skipped_not_fatal() {
        let data = "\
Date,Description,Amount
Opening Balance,,,
05/01/2024,LUNCH,-300.00
Closing Balance,,,
";
        let txs = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].description, "LUNCH");
    }

    #[test]
    fn zero_amount_rows_are_dropped() {
        let data = "\
Date,Description,Debit,Credit
05/01/2024,NO MOVEMENT,0.00,0.00
06/01/2024,REAL SPEND,100.00,0.00
";
        let txs = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].description, "REAL SPEND");
    }

    #[test]
    fn source_row_order_is_preserved() {
        let data = "\
Date,Description,Amount
07/01/2024,THIRD,-3.00
05/01/2024,FIRST,-1.00
06/01/2024,SECOND,-2.00
";
        let txs = parse_csv(data.as_bytes()).unwrap();
        let order: Vec<&str> = txs.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(order, ["THIRD", "FIRST", "SECOND"]);
    }

    #[test]
    fn mode_derived_from_description_and_remarks() {
        let data = "\
Date,Description,Remarks,Amount
05/01/2024,MONTHLY PAYMENT,via NEFT transfer,-999.00
";
        let txs = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(txs[0].mode, TxnMode::Neft);
        assert_eq!(txs[0].remarks, "via NEFT transfer");
    }

    #[test]
    fn reference_column_is_carried() {
        let data = "\
Date,Description,Ref No,Amount
05/01/2024,CHQ PAID,000123,-5000.00
";
        let txs = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(txs[0].reference, "000123");
        assert_eq!(txs[0].mode, TxnMode::Cheque);
    }
}
