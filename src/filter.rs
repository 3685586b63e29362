use crate::error::Result;
use crate::schema::CampaignBudgetRecord;
use crate::utils::trailing_month_starts;
use chrono::{Datelike, NaiveDate};
use log::debug;
use std::collections::HashSet;

pub const DEFAULT_WINDOW_MONTHS: u32 = 9;

/// Keeps the budget records whose effective month lies in the `window_months`
/// calendar months ending at `anchor`'s month.
///
/// Input order is preserved and duplicates pass through untouched.
pub fn filter_campaigns_in_window(
    records: &[CampaignBudgetRecord],
    anchor: NaiveDate,
    window_months: u32,
) -> Result<Vec<CampaignBudgetRecord>> {
    let window: HashSet<(i32, u32)> = trailing_month_starts(anchor, window_months)?
        .into_iter()
        .map(|month| (month.year(), month.month()))
        .collect();

    let retained: Vec<CampaignBudgetRecord> = records
        .iter()
        .filter(|r| window.contains(&(r.effective_month.year(), r.effective_month.month())))
        .cloned()
        .collect();

    debug!(
        "Kept {} of {} budget records within {} months of {}",
        retained.len(),
        records.len(),
        window_months,
        anchor
    );

    Ok(retained)
}

pub fn filter_campaigns(
    records: &[CampaignBudgetRecord],
    anchor: NaiveDate,
) -> Result<Vec<CampaignBudgetRecord>> {
    filter_campaigns_in_window(records, anchor, DEFAULT_WINDOW_MONTHS)
}
