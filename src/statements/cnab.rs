//! FEBRABAN CNAB 240 and CNAB 400 return files.
//!
//! Offsets below are zero-based byte positions. Amounts are integer cents
//! and every parsed entry is a credit.

use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;

use crate::domain::reconciliation::ParsedEntry;

fn field(line: &str, start: usize, len: usize) -> String {
    let bytes = line.as_bytes();
    let end = (start + len).min(bytes.len());
    bytes
        .get(start..end)
        .map(|slice| String::from_utf8_lossy(slice).into_owned())
        .unwrap_or_default()
}

/// Parses integer cents; blank or malformed values are zero.
pub fn parse_amount(raw: &str) -> Decimal {
    raw.trim()
        .parse::<i64>()
        .map(|cents| Decimal::new(cents, 2))
        .unwrap_or_default()
}

/// Parses `ddmmyyyy`, or `ddmmyy` when `short` is set (`yy > 50` is 19yy).
/// All-zero and blank dates are absent.
pub fn parse_date(raw: &str, short: bool) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() || raw.bytes().all(|b| b == b'0') {
        return None;
    }

    let (day, month, year) = match (short, raw.len()) {
        (true, 6) => {
            let yy: i32 = raw.get(4..6)?.parse().ok()?;
            let year = if yy > 50 { 1900 + yy } else { 2000 + yy };
            (raw.get(0..2)?, raw.get(2..4)?, year)
        }
        (_, 8) => (raw.get(0..2)?, raw.get(2..4)?, raw.get(4..8)?.parse().ok()?),
        _ => return None,
    };

    let parsed = NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?);
    if parsed.is_none() {
        warn!("CNAB date could not be parsed: {raw}");
    }
    parsed
}

fn lines(content: &str) -> impl Iterator<Item = &str> {
    content.split('\n').map(|line| line.trim_end_matches('\r'))
}

fn describe(description: &str, document: &str) -> String {
    format!("{} Doc:{}", description.trim(), document.trim())
        .trim()
        .to_string()
}

struct SegmentT {
    document: String,
    due_date: Option<NaiveDate>,
    amount: Decimal,
    description: String,
}

/// Pairs each detail segment T with the following segment U.
pub fn parse_240(content: &str) -> Vec<ParsedEntry> {
    let mut entries = Vec::new();
    let mut segment_t: Option<SegmentT> = None;

    for line in lines(content) {
        if line.len() < 240 || field(line, 7, 1) != "3" {
            continue;
        }

        match field(line, 13, 1).to_ascii_uppercase().as_str() {
            "T" => {
                segment_t = Some(SegmentT {
                    document: field(line, 58, 15),
                    due_date: parse_date(&field(line, 73, 8), false),
                    amount: parse_amount(&field(line, 81, 15)),
                    description: field(line, 105, 25),
                });
            }
            "U" => {
                let Some(t) = segment_t.take() else {
                    continue;
                };
                let paid = parse_amount(&field(line, 77, 15));
                let paid_on = parse_date(&field(line, 137, 8), false);
                let credited_on = parse_date(&field(line, 145, 8), false);

                let Some(date) = credited_on.or(paid_on).or(t.due_date) else {
                    warn!("CNAB 240 entry without any date skipped: {}", t.document.trim());
                    continue;
                };

                entries.push(ParsedEntry {
                    date,
                    description: describe(&t.description, &t.document),
                    amount: if paid.is_zero() { t.amount } else { paid },
                });
            }
            _ => {}
        }
    }

    entries
}

/// Reads type `1` detail records.
pub fn parse_400(content: &str) -> Vec<ParsedEntry> {
    let mut entries = Vec::new();

    for line in lines(content) {
        if line.len() < 400 || field(line, 0, 1) != "1" {
            continue;
        }

        let amount = parse_amount(&field(line, 152, 13));
        let paid = parse_amount(&field(line, 253, 13));
        let credited_on = parse_date(&field(line, 295, 6), true);
        let due_on = parse_date(&field(line, 110, 6), true);
        let document = field(line, 116, 10);
        let description = field(line, 31, 12);

        let Some(date) = credited_on.or(due_on) else {
            warn!("CNAB 400 entry without any date skipped: {}", document.trim());
            continue;
        };

        entries.push(ParsedEntry {
            date,
            description: describe(&description, &document),
            amount: if paid.is_zero() { amount } else { paid },
        });
    }

    entries
}
