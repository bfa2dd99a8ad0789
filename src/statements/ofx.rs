use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;

use crate::domain::reconciliation::ParsedEntry;
use crate::statements::StatementError;

/// Reads every `<STMTTRN>` block. Missing amounts are zero, missing memos are
/// empty, and missing or malformed posting dates fall back to `today`.
pub fn parse(content: &str, today: NaiveDate) -> Result<Vec<ParsedEntry>, StatementError> {
    let block = Regex::new(r"(?s)<STMTTRN>(.*?)</STMTTRN>")?;
    let amount = Regex::new(r"<TRNAMT>([-\d.]+)")?;
    let posted = Regex::new(r"<DTPOSTED>(\d{8})")?;
    let memo = Regex::new(r"<MEMO>([^<\r\n]+)")?;

    let entries = block
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|trn| {
            let trn = trn.as_str();

            let amount = amount
                .captures(trn)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<Decimal>().ok())
                .unwrap_or_default();

            let date = posted
                .captures(trn)
                .and_then(|c| c.get(1))
                .and_then(|m| NaiveDate::parse_from_str(m.as_str(), "%Y%m%d").ok())
                .unwrap_or(today);

            let description = memo
                .captures(trn)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();

            ParsedEntry {
                date,
                description,
                amount,
            }
        })
        .collect();

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "OFXHEADER:100\r\n<OFX><BANKMSGSRSV1><STMTTRNRS><STMTRS><BANKTRANLIST>\r\n\
        <STMTTRN>\r\n<TRNTYPE>CREDIT\r\n<DTPOSTED>20260405120000[-3:BRT]\r\n<TRNAMT>1500.50\r\n<MEMO>PIX RECEBIDO CLIENTE ALFA\r\n</STMTTRN>\r\n\
        <STMTTRN>\r\n<TRNTYPE>DEBIT\r\n<DTPOSTED>20260406\r\n<TRNAMT>-12.90\r\n<MEMO>TARIFA PACOTE</MEMO>\r\n</STMTTRN>\r\n\
        <STMTTRN>\r\n<TRNTYPE>OTHER\r\n</STMTTRN>\r\n\
        </BANKTRANLIST></STMTRS></STMTTRNRS></BANKMSGSRSV1></OFX>";

    #[test]
    fn parses_transactions() {
        let today = NaiveDate::from_ymd_opt(2026, 4, 30).expect("valid date");

        let entries = parse(SAMPLE, today).expect("parses");

        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[0].date,
            NaiveDate::from_ymd_opt(2026, 4, 5).expect("valid date")
        );
        assert_eq!(entries[0].amount, "1500.50".parse::<Decimal>().expect("decimal"));
        assert_eq!(entries[0].description, "PIX RECEBIDO CLIENTE ALFA");
        assert_eq!(entries[1].amount, "-12.90".parse::<Decimal>().expect("decimal"));
        assert_eq!(entries[1].description, "TARIFA PACOTE");
        assert_eq!(entries[2].date, today);
        assert_eq!(entries[2].amount, Decimal::ZERO);
        assert_eq!(entries[2].description, "");
    }
}
