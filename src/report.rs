use crate::aggregator::SpendIndex;
use crate::error::Result;
use crate::filter::DEFAULT_WINDOW_MONTHS;
use crate::pacing::PacingCalculator;
use crate::schema::{CampaignBudgetRecord, ReportRow};
use crate::utils::{days_of_month, same_month, trailing_month_starts};
use chrono::NaiveDate;
use log::debug;
use std::io::Write;

pub const REPORT_HEADER: [&str; 10] = [
    "date",
    "Campaign / Program",
    "Monthly Spend To Date",
    "Daily Spend",
    "Monthly Spend (To End of Day)",
    "Budget (dynamic)",
    "Daily Underspend (Overspend)",
    "Budget (simple)",
    "underspend_crude",
    "Monthly Budget",
];

pub struct ReportBuilder<'a> {
    calculator: PacingCalculator<'a>,
    window_months: u32,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(index: &'a SpendIndex, today: NaiveDate) -> Self {
        Self {
            calculator: PacingCalculator::new(index, today),
            window_months: DEFAULT_WINDOW_MONTHS,
        }
    }

    pub fn with_window_months(mut self, window_months: u32) -> Self {
        self.window_months = window_months;
        self
    }

    /// One row per (day, budget record) for every day of every month in the
    /// window that has at least one budget record.
    ///
    /// Months run newest to oldest, days ascend within a month, and records
    /// keep their input order within a day.
    pub fn build(&self, campaigns: &[CampaignBudgetRecord]) -> Result<Vec<ReportRow>> {
        let today = self.calculator.today();
        let mut rows = Vec::new();

        for month_start in trailing_month_starts(today, self.window_months)? {
            let budgeted: Vec<&CampaignBudgetRecord> = campaigns
                .iter()
                .filter(|c| same_month(c.effective_month, month_start))
                .collect();

            if budgeted.is_empty() {
                debug!("No budgeted campaigns for {}", month_start.format("%Y-%m"));
                continue;
            }

            for date in days_of_month(month_start) {
                rows.extend(
                    budgeted
                        .iter()
                        .map(|record| self.calculator.row_for(record, date)),
                );
            }
        }

        Ok(rows)
    }
}

pub fn build_report(
    campaigns: &[CampaignBudgetRecord],
    index: &SpendIndex,
    today: NaiveDate,
) -> Result<Vec<ReportRow>> {
    ReportBuilder::new(index, today).build(campaigns)
}

impl ReportRow {
    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.date.format("%Y-%m-%d").to_string(),
            self.campaign.clone(),
            self.monthly_spend_to_date.to_string(),
            self.daily_spend.to_string(),
            self.monthly_spend_through_end_of_day.to_string(),
            self.dynamic_budget.to_string(),
            self.dynamic_underspend.to_string(),
            self.crude_budget.to_string(),
            self.crude_underspend.to_string(),
            self.monthly_budget.to_string(),
        ]
    }
}

/// The full output table: header followed by one line per row.
pub fn render_table(rows: &[ReportRow]) -> Vec<Vec<String>> {
    std::iter::once(REPORT_HEADER.iter().map(|h| h.to_string()).collect::<Vec<String>>())
        .chain(rows.iter().map(ReportRow::to_cells))
        .collect()
}

pub fn write_report_json<W: Write>(rows: &[ReportRow], writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, rows)?;
    Ok(())
}
