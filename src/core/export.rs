use std::io::Write;

use super::compare::ResultRow;
use super::error::InvestmentError;

pub const CSV_HEADER: [&str; 5] = ["Name", "Type", "Invested", "Returns", "Maturity"];

pub fn write_csv<W: Write>(rows: &[ResultRow], writer: W) -> Result<W, InvestmentError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for row in rows {
        wtr.write_record([
            row.name.as_str(),
            row.instrument.tag(),
            format_amount(row.total_invested).as_str(),
            format_amount(row.total_interest).as_str(),
            format_amount(row.maturity_amount).as_str(),
        ])?;
    }
    wtr.into_inner().map_err(|e| InvestmentError::Io(e.into_error()))
}

pub fn export_csv(rows: &[ResultRow]) -> Result<String, InvestmentError> {
    let bytes = write_csv(rows, Vec::new())?;
    Ok(String::from_utf8(bytes)?)
}

fn format_amount(value: f64) -> String {
    format!("{value:.2}")
}
