//! Payment-rail detection from free narration text.

use bahi_core::TxnMode;

use crate::util::re;

re!(re_upi, r"(?i)upi|phonepe|gpay|google pay|paytm|bhim");
re!(re_neft, r"(?i)neft");
re!(re_rtgs, r"(?i)rtgs");
re!(re_imps, r"(?i)imps");
re!(re_atm, r"(?i)atm|cash withdrawal");
re!(re_cheque, r"(?i)chq|cheque|check");
re!(re_card, r"(?i)debit card|credit card|pos|ecom");
re!(re_auto_debit, r"(?i)auto|ecs|nach|mandate|standing instruction|si/");
re!(re_interest, r"(?i)interest|int\.cred");
re!(re_transfer, r"(?i)transfer|trf");
re!(re_emi, r"(?i)\bemi\b|loan");

/// First matching rail in table order wins; `Other` when nothing fires.
/// Pure function over the narration text, no state.
pub fn detect_mode(text: &str) -> TxnMode {
    let rails: [(TxnMode, &regex::Regex); 11] = [
        (TxnMode::Upi, re_upi()),
        (TxnMode::Neft, re_neft()),
        (TxnMode::Rtgs, re_rtgs()),
        (TxnMode::Imps, re_imps()),
        (TxnMode::Atm, re_atm()),
        (TxnMode::Cheque, re_cheque()),
        (TxnMode::Card, re_card()),
        (TxnMode::AutoDebit, re_auto_debit()),
        (TxnMode::Interest, re_interest()),
        (TxnMode::Transfer, re_transfer()),
        (TxnMode::Emi, re_emi()),
    ];

    for (mode, pattern) in rails {
        if pattern.is_match(text) {
            return mode;
        }
    }
    TxnMode::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upi_by_keyword_and_wallet_brands() {
        assert_eq!(detect_mode("UPI/merchant/12345"), TxnMode::Upi);
        assert_eq!(detect_mode("payment via PhonePe"), TxnMode::Upi);
        assert_eq!(detect_mode("GPAY-9876543210"), TxnMode::Upi);
        assert_eq!(detect_mode("PAYTM QR payment"), TxnMode::Upi);
    }

    #[test]
    fn bank_rails() {
        assert_eq!(detect_mode("NEFT CR HDFC0001234"), TxnMode::Neft);
        assert_eq!(detect_mode("RTGS UTR SBIN1234"), TxnMode::Rtgs);
        assert_eq!(detect_mode("IMPS-P2A-1234"), TxnMode::Imps);
    }

    #[test]
    fn atm_and_cheque() {
        assert_eq!(detect_mode("ATM WDL TXN 1234"), TxnMode::Atm);
        assert_eq!(detect_mode("CASH WITHDRAWAL SELF"), TxnMode::Atm);
        assert_eq!(detect_mode("CHQ PAID 000123"), TxnMode::Cheque);
    }

    #[test]
    fn card_pos_and_ecom() {
        assert_eq!(detect_mode("POS 412345XXXXXX RELIANCE"), TxnMode::Card);
        assert_eq!(detect_mode("ECOM PUR AMZN"), TxnMode::Card);
    }

    #[test]
    fn auto_debit_variants() {
        assert_eq!(detect_mode("NACH-DR-SIP"), TxnMode::AutoDebit);
        assert_eq!(detect_mode("ECS MANDATE 0042"), TxnMode::AutoDebit);
        assert_eq!(detect_mode("SI/NETFLIX RENEWAL"), TxnMode::AutoDebit);
    }

    #[test]
    fn interest_transfer_emi() {
        assert_eq!(detect_mode("INT.CRED quarterly"), TxnMode::Interest);
        assert_eq!(detect_mode("FUND TRF TO SAVINGS"), TxnMode::Transfer);
        assert_eq!(detect_mode("EMI 04 OF 12"), TxnMode::Emi);
    }

    #[test]
    fn ordering_upi_beats_transfer() {
        // "UPI" appears in the Transfer keyword family too; the earlier rail
        // in table order must win.
        assert_eq!(detect_mode("UPI fund transfer"), TxnMode::Upi);
    }

    #[test]
    fn unknown_is_other() {
        assert_eq!(detect_mode("MISC CHARGES JAN"), TxnMode::Other);
        assert_eq!(detect_mode(""), TxnMode::Other);
    }
}
