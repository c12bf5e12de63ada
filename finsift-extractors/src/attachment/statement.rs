use csv::ReaderBuilder;
use tracing::debug;
use uuid::Uuid;

use finsift_types::StatementRow;

use crate::scanners::parse_amount_token;

const DATE_HEADERS: &[&str] = &["date", "transaction date", "posted", "posting date"];
const AMOUNT_HEADERS: &[&str] = &["amount", "value", "total", "debit"];
const DESCRIPTION_HEADERS: &[&str] = &["description", "details", "memo", "narrative"];
const REFERENCE_HEADERS: &[&str] = &["reference", "ref", "transaction id", "id"];

fn find_column(headers: &[String], names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| names.contains(&h.as_str()))
}

/// Parse a tabular attachment whose header row maps onto
/// (date, amount, description, reference) into one transaction-shaped
/// record per data row. Rows with an unparseable amount or an empty date
/// are skipped; a file without date and amount columns yields nothing.
pub fn parse_statement_rows(bytes: &[u8], delimiter: u8) -> Vec<StatementRow> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = match reader.headers() {
        Ok(h) => h.iter().map(|s| s.trim().to_lowercase()).collect(),
        Err(e) => {
            debug!("statement attachment has no readable header row: {e}");
            return Vec::new();
        }
    };

    let (Some(date_col), Some(amount_col)) = (
        find_column(&headers, DATE_HEADERS),
        find_column(&headers, AMOUNT_HEADERS),
    ) else {
        return Vec::new();
    };
    let description_col = find_column(&headers, DESCRIPTION_HEADERS);
    let reference_col = find_column(&headers, REFERENCE_HEADERS);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                debug!("skipping malformed statement row: {e}");
                continue;
            }
        };

        let date = record.get(date_col).unwrap_or("").trim();
        if date.is_empty() {
            continue;
        }
        let amount_raw = record
            .get(amount_col)
            .unwrap_or("")
            .trim_matches(|c: char| c.is_whitespace() || "$€£¥-".contains(c));
        let Some(amount) = parse_amount_token(amount_raw) else {
            continue;
        };

        rows.push(StatementRow {
            transaction_id: Uuid::new_v4().to_string(),
            date: date.to_string(),
            amount,
            description: description_col
                .and_then(|c| record.get(c))
                .unwrap_or("")
                .trim()
                .to_string(),
            reference: reference_col
                .and_then(|c| record.get(c))
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
        });
    }
    rows
}
