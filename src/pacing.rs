//! Budget pacing arithmetic.
//!
//! Every function here is pure: spend comes from a borrowed [`SpendIndex`] and
//! "today" is always passed in by the caller, never read from a clock.

use crate::aggregator::SpendIndex;
use crate::schema::{CampaignBudgetRecord, ReportRow};
use crate::utils::first_day_of_month;
use chrono::NaiveDate;

pub use crate::utils::{days_in_month, days_left};

/// Month-to-date spend for `campaign`, reset at every month boundary.
///
/// Covers the days of `date`'s month strictly before `date`, or up to and
/// including it when `inclusive` is set.
pub fn running_total(index: &SpendIndex, campaign: &str, date: NaiveDate, inclusive: bool) -> f64 {
    let start = first_day_of_month(date);
    let end = if inclusive {
        Some(date)
    } else {
        date.pred_opt()
    };

    end.map(|end| index.spend_between(campaign, start, end))
        .unwrap_or(0.0)
}

/// Static daily allocation: the monthly budget spread evenly over the month.
pub fn crude_budget(monthly_budget: f64, date: NaiveDate) -> f64 {
    monthly_budget / f64::from(days_in_month(date))
}

/// Remaining-budget daily allocation.
///
/// Dates on or after `today` all share one forward-looking pace: what is left
/// after today's spend, spread over the days still to come after today. On the
/// last day of a month there are none left, so the whole remainder is the pace.
///
/// Dates before `today` are recomputed against their own situation: what was
/// left before that day's spend, spread over that day and the rest of its month.
pub fn dynamic_budget(
    monthly_budget: f64,
    index: &SpendIndex,
    campaign: &str,
    date: NaiveDate,
    today: NaiveDate,
) -> f64 {
    if date >= today {
        let remaining = monthly_budget - running_total(index, campaign, today, true);
        let days_after_today = days_left(today).saturating_sub(1).max(1);
        remaining / f64::from(days_after_today)
    } else {
        let remaining = monthly_budget - running_total(index, campaign, date, false);
        remaining / f64::from(days_left(date))
    }
}

/// Budget minus actual spend. Negative means overspend.
pub fn underspend(budget: f64, actual: f64) -> f64 {
    budget - actual
}

/// Computes report rows against a fixed spend index and a fixed "today".
pub struct PacingCalculator<'a> {
    index: &'a SpendIndex,
    today: NaiveDate,
}

impl<'a> PacingCalculator<'a> {
    pub fn new(index: &'a SpendIndex, today: NaiveDate) -> Self {
        Self { index, today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn row_for(&self, record: &CampaignBudgetRecord, date: NaiveDate) -> ReportRow {
        let campaign = record.campaign.as_str();
        let budget = record.monthly_budget;

        let daily_spend = self.index.daily_spend(date, campaign);
        let dynamic = dynamic_budget(budget, self.index, campaign, date, self.today);
        let crude = crude_budget(budget, date);

        ReportRow {
            date,
            campaign: record.campaign.clone(),
            monthly_spend_to_date: running_total(self.index, campaign, date, false),
            daily_spend,
            monthly_spend_through_end_of_day: running_total(self.index, campaign, date, true),
            dynamic_budget: dynamic,
            dynamic_underspend: underspend(dynamic, daily_spend),
            crude_budget: crude,
            crude_underspend: underspend(crude, daily_spend),
            monthly_budget: budget,
        }
    }
}
