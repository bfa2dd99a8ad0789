//! Bank statement file parsing.
//!
//! Statements arrive as OFX documents or FEBRABAN CNAB return files. Parsers
//! produce [`ParsedEntry`] values with signed amounts; classification into
//! credits and debits happens on import.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::money;
use crate::domain::reconciliation::{ParsedEntry, StatementFormat};

pub mod cnab;
pub mod ofx;

#[derive(Debug, Error)]
pub enum StatementError {
    #[error("statement pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),

    #[error("transaction amount out of range on {date}: {amount}")]
    AmountOutOfRange { date: NaiveDate, amount: Decimal },
}

/// Guesses the format from the file name and the first non-empty line.
///
/// An `.ofx` extension always wins. Otherwise a first line of exactly 240 or
/// 400 bytes marks CNAB 240 or CNAB 400, and `.ret`/`.rem` files fall back
/// on the line length. Anything else is read as OFX.
pub fn detect_format(content: &str, filename: Option<&str>) -> StatementFormat {
    let extension = filename
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if extension == "ofx" {
        return StatementFormat::Ofx;
    }

    let Some(first_line) = content
        .split('\n')
        .map(str::trim)
        .find(|line| !line.is_empty())
    else {
        return StatementFormat::Ofx;
    };

    match first_line.len() {
        240 => return StatementFormat::Cnab240,
        400 => return StatementFormat::Cnab400,
        _ => {}
    }

    if extension == "ret" || extension == "rem" {
        return if first_line.len() > 250 {
            StatementFormat::Cnab400
        } else {
            StatementFormat::Cnab240
        };
    }

    StatementFormat::Ofx
}

/// Parses `content` in the given format. OFX transactions without a posting
/// date are dated `today`.
///
/// Fails when any amount exceeds [`money::MAX_AMOUNT_CENTS`].
pub fn parse(
    format: StatementFormat,
    content: &str,
    today: NaiveDate,
) -> Result<Vec<ParsedEntry>, StatementError> {
    let entries = match format {
        StatementFormat::Ofx => ofx::parse(content, today)?,
        StatementFormat::Cnab240 => cnab::parse_240(content),
        StatementFormat::Cnab400 => cnab::parse_400(content),
    };

    if let Some(entry) = entries
        .iter()
        .find(|entry| money::ensure_amount(entry.amount).is_err())
    {
        return Err(StatementError::AmountOutOfRange {
            date: entry.date,
            amount: entry.amount,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_and_line_length_decide_format() {
        let line240 = "0".repeat(240);
        let line400 = "1".repeat(400);
        let line300 = "1".repeat(300);

        assert_eq!(detect_format(&line240, Some("x.OFX")), StatementFormat::Ofx);
        assert_eq!(detect_format(&format!("\n\n{line240}\n"), None), StatementFormat::Cnab240);
        assert_eq!(detect_format(&line400, Some("retorno.txt")), StatementFormat::Cnab400);
        assert_eq!(detect_format(&line300, Some("retorno.RET")), StatementFormat::Cnab400);
        assert_eq!(detect_format("short", Some("retorno.rem")), StatementFormat::Cnab240);
        assert_eq!(detect_format("<OFX>", Some("extrato.txt")), StatementFormat::Ofx);
        assert_eq!(detect_format("", None), StatementFormat::Ofx);
    }

    #[test]
    fn oversized_amounts_are_rejected() {
        let today = NaiveDate::from_ymd_opt(2026, 4, 30).expect("valid date");
        let ofx = "<OFX><STMTTRN><DTPOSTED>20260410\
            <TRNAMT>79228162514264337593543950335</STMTTRN></OFX>";

        assert!(matches!(
            parse(StatementFormat::Ofx, ofx, today),
            Err(StatementError::AmountOutOfRange { .. })
        ));

        let fine = "<OFX><STMTTRN><DTPOSTED>20260410<TRNAMT>-12.90</STMTTRN></OFX>";
        assert_eq!(parse(StatementFormat::Ofx, fine, today).expect("parses").len(), 1);
    }
}
