//! # Campaign Pacing
//!
//! A library for turning per-campaign monthly budgets and per-day spend into a
//! daily budget-vs-actual report with pacing metrics.
//!
//! ## Core Concepts
//!
//! - **Spend Index**: spend summed per (day, campaign), built once per run
//! - **Running Total**: month-to-date spend, either before or through a given day
//! - **Crude Budget**: monthly budget divided evenly over the days of the month
//! - **Dynamic Budget**: what is left of the monthly budget spread over the days that remain.
//!   Past days are recomputed individually; today and later share a single pace.
//! - **Anchor Date**: the one "today" a run is computed against
//!
//! ## Example
//!
//! ```rust,ignore
//! use campaign_pacing::*;
//! use chrono::NaiveDate;
//!
//! let mut workbook = CsvWorkbook::new("./sheets");
//! let clock = FixedClock(NaiveDate::from_ymd_opt(2023, 4, 10).unwrap());
//!
//! let summary = PacingReportProcessor::new(PacingConfig::default())?
//!     .run(&mut workbook, &clock)?;
//! println!("{} rows written", summary.rows);
//! ```

pub mod aggregator;
pub mod clock;
pub mod error;
pub mod filter;
pub mod ingestion;
pub mod pacing;
pub mod report;
pub mod schema;
pub mod table;
pub mod utils;

pub use aggregator::{aggregate, SpendIndex};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{PacingError, Result};
pub use filter::{filter_campaigns, filter_campaigns_in_window, DEFAULT_WINDOW_MONTHS};
pub use ingestion::{parse_budget_rows, parse_spend_rows};
pub use pacing::{
    crude_budget, dynamic_budget, running_total, underspend, PacingCalculator,
};
pub use report::{build_report, render_table, write_report_json, ReportBuilder, REPORT_HEADER};
pub use schema::*;
pub use table::{CsvWorkbook, MemoryWorkbook, Table, Workbook};
pub use utils::{days_in_month, days_left};

use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub anchor_date: NaiveDate,
    pub rows: usize,
    pub campaign_records: usize,
    pub spend_records: usize,
}

pub struct PacingReportProcessor {
    config: PacingConfig,
}

impl PacingReportProcessor {
    pub fn new(config: PacingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn system_clock(&self) -> Result<SystemClock> {
        let offset = utils::reference_offset(self.config.reference_utc_offset_minutes)?;
        Ok(SystemClock::new(offset))
    }

    /// Reads both input tables, builds the report, then replaces the output table.
    ///
    /// The output table is only touched once everything else has succeeded.
    pub fn run<W: Workbook, C: Clock>(&self, workbook: &mut W, clock: &C) -> Result<ReportSummary> {
        let today = clock.today();
        info!("Building pacing report anchored on {}", today);

        let budget_rows = workbook.read_table(&self.config.budget_table)?;
        let spend_rows = workbook.read_table(&self.config.spend_table)?;
        debug!(
            "Loaded {} budget rows and {} spend rows",
            budget_rows.len(),
            spend_rows.len()
        );

        let (rows, summary) = self.build(&budget_rows, &spend_rows, today)?;

        workbook.write_table(&self.config.output_table, &render_table(&rows))?;
        info!(
            "Wrote {} rows to '{}'",
            summary.rows, self.config.output_table
        );

        Ok(summary)
    }

    /// The I/O-free part of [`run`](Self::run).
    pub fn build(
        &self,
        budget_rows: &[Vec<String>],
        spend_rows: &[Vec<String>],
        today: NaiveDate,
    ) -> Result<(Vec<ReportRow>, ReportSummary)> {
        let budgets = parse_budget_rows(budget_rows, &self.config)?;
        let spend = parse_spend_rows(spend_rows, &self.config)?;

        let index = SpendIndex::aggregate(&spend)?;
        let campaigns = filter_campaigns_in_window(&budgets, today, self.config.window_months)?;

        if campaigns.is_empty() {
            warn!(
                "No budget records fall within {} months of {}; the report will be empty",
                self.config.window_months, today
            );
        }

        let rows = ReportBuilder::new(&index, today)
            .with_window_months(self.config.window_months)
            .build(&campaigns)?;

        let summary = ReportSummary {
            anchor_date: today,
            rows: rows.len(),
            campaign_records: campaigns.len(),
            spend_records: spend.len(),
        };

        Ok((rows, summary))
    }
}

pub fn build_pacing_report(
    budget_rows: &[Vec<String>],
    spend_rows: &[Vec<String>],
    config: &PacingConfig,
    today: NaiveDate,
) -> Result<Vec<ReportRow>> {
    let processor = PacingReportProcessor::new(config.clone())?;
    let (rows, _) = processor.build(budget_rows, spend_rows, today)?;
    Ok(rows)
}

pub fn run_pacing_report<W: Workbook>(workbook: &mut W, config: PacingConfig) -> Result<ReportSummary> {
    let processor = PacingReportProcessor::new(config)?;
    let clock = processor.system_clock()?;
    processor.run(workbook, &clock)
}
