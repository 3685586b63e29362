use crate::error::{PacingError, Result};
use crate::schema::SpendRecord;
use chrono::NaiveDate;
use log::debug;
use std::collections::BTreeMap;

/// Summed spend per day and campaign.
///
/// Built once per run and only read afterwards. Every entry equals the sum of
/// all spend records sharing its (date, campaign) pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpendIndex {
    by_date: BTreeMap<NaiveDate, BTreeMap<String, f64>>,
}

impl SpendIndex {
    pub fn aggregate(records: &[SpendRecord]) -> Result<Self> {
        let mut by_date: BTreeMap<NaiveDate, BTreeMap<String, f64>> = BTreeMap::new();

        for record in records {
            if !record.amount.is_finite() {
                return Err(PacingError::InvalidAmount {
                    campaign: record.campaign.clone(),
                    date: record.date.to_string(),
                    amount: record.amount,
                });
            }

            *by_date
                .entry(record.date)
                .or_default()
                .entry(record.campaign.clone())
                .or_insert(0.0) += record.amount;
        }

        debug!(
            "Aggregated {} spend records into {} days",
            records.len(),
            by_date.len()
        );

        Ok(Self { by_date })
    }

    /// Spend for `campaign` on `date`; zero when nothing was recorded.
    pub fn daily_spend(&self, date: NaiveDate, campaign: &str) -> f64 {
        self.by_date
            .get(&date)
            .and_then(|campaigns| campaigns.get(campaign))
            .copied()
            .unwrap_or(0.0)
    }

    /// Total spend for `campaign` over `start..=end`.
    pub fn spend_between(&self, campaign: &str, start: NaiveDate, end: NaiveDate) -> f64 {
        if end < start {
            return 0.0;
        }

        self.by_date
            .range(start..=end)
            .filter_map(|(_, campaigns)| campaigns.get(campaign))
            .sum()
    }
}

pub fn aggregate(records: &[SpendRecord]) -> Result<SpendIndex> {
    SpendIndex::aggregate(records)
}
