use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sign semantics for a transaction. Amounts are stored as magnitudes;
/// the direction carries the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Credit,
    Debit,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Credit => write!(f, "credit"),
            Direction::Debit => write!(f, "debit"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "credit" | "cr" => Ok(Direction::Credit),
            "debit" | "dr" => Ok(Direction::Debit),
            other => Err(format!("Unknown direction: '{other}'")),
        }
    }
}

/// Payment rail a transaction travelled on, as inferred from narration text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxnMode {
    Upi,
    Neft,
    Rtgs,
    Imps,
    Atm,
    Cheque,
    Card,
    AutoDebit,
    Interest,
    Transfer,
    Emi,
    Other,
}

impl fmt::Display for TxnMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TxnMode::Upi => "UPI",
            TxnMode::Neft => "NEFT",
            TxnMode::Rtgs => "RTGS",
            TxnMode::Imps => "IMPS",
            TxnMode::Atm => "ATM",
            TxnMode::Cheque => "Cheque",
            TxnMode::Card => "Card",
            TxnMode::AutoDebit => "Auto Debit",
            TxnMode::Interest => "Interest",
            TxnMode::Transfer => "Transfer",
            TxnMode::Emi => "EMI",
            TxnMode::Other => "Other",
        };
        write!(f, "{label}")
    }
}

impl std::str::FromStr for TxnMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upi" => Ok(TxnMode::Upi),
            "neft" => Ok(TxnMode::Neft),
            "rtgs" => Ok(TxnMode::Rtgs),
            "imps" => Ok(TxnMode::Imps),
            "atm" => Ok(TxnMode::Atm),
            "cheque" | "chq" => Ok(TxnMode::Cheque),
            "card" => Ok(TxnMode::Card),
            "auto debit" | "ecs" | "nach" => Ok(TxnMode::AutoDebit),
            "interest" => Ok(TxnMode::Interest),
            "transfer" | "trf" => Ok(TxnMode::Transfer),
            "emi" => Ok(TxnMode::Emi),
            "other" => Ok(TxnMode::Other),
            other => Err(format!("Unknown transaction mode: '{other}'")),
        }
    }
}

/// One extracted statement row, before merchant/category enrichment.
///
/// `balance` is the running balance exactly as printed in the source
/// document; parsers must never recompute it from running sums.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub remarks: String,
    /// Magnitude only; `direction` carries the sign.
    pub amount: Decimal,
    pub direction: Direction,
    pub balance: Option<Decimal>,
    pub reference: String,
    pub mode: TxnMode,
}

/// A raw transaction plus derived display fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub remarks: String,
    pub amount: Decimal,
    pub direction: Direction,
    pub balance: Option<Decimal>,
    pub reference: String,
    pub mode: TxnMode,
    /// Empty string means extraction found no plausible merchant.
    pub merchant: String,
    /// Name from the taxonomy; `Other` when nothing matched.
    pub category: String,
}

impl EnrichedTransaction {
    pub fn from_raw(raw: RawTransaction, merchant: String, category: String) -> Self {
        EnrichedTransaction {
            date: raw.date,
            description: raw.description,
            remarks: raw.remarks,
            amount: raw.amount,
            direction: raw.direction,
            balance: raw.balance,
            reference: raw.reference,
            mode: raw.mode,
            merchant,
            category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn direction_display_roundtrip() {
        assert_eq!(Direction::from_str(&Direction::Debit.to_string()).unwrap(), Direction::Debit);
        assert_eq!(Direction::from_str("CR").unwrap(), Direction::Credit);
    }

    #[test]
    fn mode_display_roundtrip() {
        assert_eq!(TxnMode::from_str(&TxnMode::AutoDebit.to_string()).unwrap(), TxnMode::AutoDebit);
        assert_eq!(TxnMode::from_str("NEFT").unwrap(), TxnMode::Neft);
    }

    #[test]
    fn mode_unknown_errors() {
        assert!(TxnMode::from_str("wire").is_err());
    }
}
