use crate::error::{PacingError, Result};
use crate::schema::{CampaignBudgetRecord, PacingConfig, SpendRecord};
use crate::utils::{first_day_of_month, parse_amount_cell, parse_date_cell, reference_offset};
use chrono::{FixedOffset, NaiveDate};
use log::debug;

/// Borrowed view of one raw row, carrying enough context to name it in errors.
struct RowCursor<'a> {
    table: &'a str,
    /// 1-based, header rows included, as shown by the host spreadsheet
    number: usize,
    cells: &'a [String],
}

impl<'a> RowCursor<'a> {
    fn malformed(&self, details: String) -> PacingError {
        PacingError::MalformedRow {
            table: self.table.to_string(),
            row: self.number,
            details,
        }
    }

    fn cell(&self, column: usize, label: &str) -> Result<&'a str> {
        self.cells.get(column).map(String::as_str).ok_or_else(|| {
            self.malformed(format!(
                "missing {} column {} (row has {} cells)",
                label,
                column,
                self.cells.len()
            ))
        })
    }

    fn text(&self, column: usize, label: &str) -> Result<String> {
        let value = self.cell(column, label)?.trim();
        if value.is_empty() {
            return Err(self.malformed(format!("{} is blank", label)));
        }
        Ok(value.to_string())
    }

    fn date(&self, column: usize, label: &str, reference: FixedOffset) -> Result<NaiveDate> {
        let raw = self.cell(column, label)?;
        parse_date_cell(raw, reference)
            .ok_or_else(|| self.malformed(format!("{} '{}' is not a date", label, raw)))
    }

    fn amount(&self, column: usize, label: &str) -> Result<f64> {
        let raw = self.cell(column, label)?;
        parse_amount_cell(raw)
            .ok_or_else(|| self.malformed(format!("{} '{}' is not a number", label, raw)))
    }
}

fn data_rows<'a>(
    table: &'a str,
    rows: &'a [Vec<String>],
    header_rows: usize,
) -> impl Iterator<Item = RowCursor<'a>> {
    rows.iter()
        .enumerate()
        .skip(header_rows)
        .filter(|(_, cells)| cells.iter().any(|c| !c.trim().is_empty()))
        .map(move |(idx, cells)| RowCursor {
            table,
            number: idx + 1,
            cells,
        })
}

pub fn parse_budget_rows(
    rows: &[Vec<String>],
    config: &PacingConfig,
) -> Result<Vec<CampaignBudgetRecord>> {
    let reference = reference_offset(config.reference_utc_offset_minutes)?;
    let columns = &config.budget_columns;

    let records = data_rows(&config.budget_table, rows, config.header_rows)
        .map(|row| -> Result<CampaignBudgetRecord> {
            Ok(CampaignBudgetRecord {
                campaign: row.text(columns.campaign, "campaign")?,
                effective_month: first_day_of_month(row.date(
                    columns.effective_month,
                    "effective month",
                    reference,
                )?),
                monthly_budget: row.amount(columns.monthly_budget, "monthly budget")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "Parsed {} budget records from '{}'",
        records.len(),
        config.budget_table
    );
    Ok(records)
}

pub fn parse_spend_rows(rows: &[Vec<String>], config: &PacingConfig) -> Result<Vec<SpendRecord>> {
    let reference = reference_offset(config.reference_utc_offset_minutes)?;
    let columns = &config.spend_columns;

    let records = data_rows(&config.spend_table, rows, config.header_rows)
        .map(|row| -> Result<SpendRecord> {
            Ok(SpendRecord {
                date: row.date(columns.date, "date", reference)?,
                campaign: row.text(columns.campaign, "campaign")?,
                amount: row.amount(columns.amount, "spend")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "Parsed {} spend records from '{}'",
        records.len(),
        config.spend_table
    );
    Ok(records)
}
