use crate::error::{PacingError, Result};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One campaign's budget for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignBudgetRecord {
    pub campaign: String,
    /// Always the first day of the budgeted month.
    pub effective_month: NaiveDate,
    pub monthly_budget: f64,
}

/// A single spend entry. Several entries may share a (date, campaign) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendRecord {
    pub date: NaiveDate,
    pub campaign: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub date: NaiveDate,
    pub campaign: String,
    /// Month-to-date spend before this day.
    pub monthly_spend_to_date: f64,
    pub daily_spend: f64,
    /// Month-to-date spend including this day.
    pub monthly_spend_through_end_of_day: f64,
    pub dynamic_budget: f64,
    pub dynamic_underspend: f64,
    pub crude_budget: f64,
    pub crude_underspend: f64,
    pub monthly_budget: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BudgetColumns {
    #[schemars(description = "0-based column holding the campaign name")]
    pub campaign: usize,

    #[schemars(
        description = "0-based column holding a date inside the budgeted month. Only year and month are used."
    )]
    pub effective_month: usize,

    #[schemars(description = "0-based column holding the monthly budget amount")]
    pub monthly_budget: usize,
}

impl Default for BudgetColumns {
    fn default() -> Self {
        Self {
            campaign: 1,
            effective_month: 3,
            monthly_budget: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SpendColumns {
    #[schemars(description = "0-based column holding the spend date")]
    pub date: usize,

    #[schemars(description = "0-based column holding the campaign name")]
    pub campaign: usize,

    #[schemars(description = "0-based column holding the spend amount")]
    pub amount: usize,
}

impl Default for SpendColumns {
    fn default() -> Self {
        Self {
            date: 3,
            campaign: 4,
            amount: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PacingConfig {
    #[schemars(description = "Name of the table holding per-campaign monthly budgets")]
    pub budget_table: String,

    #[schemars(description = "Name of the table holding per-day, per-campaign spend")]
    pub spend_table: String,

    #[schemars(
        description = "Name of the destination table. Its previous content is replaced on every run."
    )]
    pub output_table: String,

    pub budget_columns: BudgetColumns,

    pub spend_columns: SpendColumns,

    #[schemars(description = "Number of leading header rows skipped in both input tables")]
    pub header_rows: usize,

    #[schemars(
        description = "Length of the trailing month window, counting the current month. Must be at least 1."
    )]
    pub window_months: u32,

    #[schemars(
        description = "Offset from UTC, in minutes, of the single reference zone used to turn timestamps into days"
    )]
    pub reference_utc_offset_minutes: i32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            budget_table: "campaign budgets".to_string(),
            spend_table: "campaign spend".to_string(),
            output_table: "Budget vs Actual".to_string(),
            budget_columns: BudgetColumns::default(),
            spend_columns: SpendColumns::default(),
            header_rows: 1,
            window_months: 9,
            reference_utc_offset_minutes: 0,
        }
    }
}

impl PacingConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_months == 0 {
            return Err(PacingError::InvalidConfig(
                "window_months must be at least 1".to_string(),
            ));
        }

        // chrono rejects offsets of a full day or more
        if self.reference_utc_offset_minutes.unsigned_abs() >= 24 * 60 {
            return Err(PacingError::InvalidConfig(format!(
                "reference_utc_offset_minutes {} is outside (-1440, 1440)",
                self.reference_utc_offset_minutes
            )));
        }

        for (label, name) in [
            ("budget_table", &self.budget_table),
            ("spend_table", &self.spend_table),
            ("output_table", &self.output_table),
        ] {
            if name.trim().is_empty() {
                return Err(PacingError::InvalidConfig(format!("{} is empty", label)));
            }
        }

        if self.output_table == self.budget_table || self.output_table == self.spend_table {
            return Err(PacingError::InvalidConfig(format!(
                "output_table '{}' would overwrite an input table",
                self.output_table
            )));
        }

        Ok(())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(PacingConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
