use campaign_pacing::*;
use chrono::NaiveDate;

/// Yesterday, today and tomorrow relative to the demo clock.
const HIGHLIGHT_DATES: [&str; 3] = ["2023-04-09", "2023-04-10", "2023-04-11"];

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

fn main() -> anyhow::Result<()> {
    let budgets = vec![
        row(&["id", "Campaign", "Owner", "Month", "Budget"]),
        row(&["1", "Brand Search", "ana", "2023-04-01", "3000"]),
        row(&["2", "Prospecting", "ben", "2023-04-01", "1200"]),
        row(&["3", "Brand Search", "ana", "2023-03-01", "3100"]),
    ];

    let mut spend = vec![row(&["Account", "Platform", "Type", "Date", "Campaign", "Spend"])];
    for day in 1..=10 {
        let date = format!("2023-04-{:02}", day);
        spend.push(row(&["acct", "google", "cpc", date.as_str(), "Brand Search", "110"]));
        spend.push(row(&["acct", "meta", "cpm", date.as_str(), "Prospecting", "35.5"]));
    }

    let mut workbook = MemoryWorkbook::new()
        .with_table("campaign budgets", budgets)
        .with_table("campaign spend", spend);

    let today = NaiveDate::from_ymd_opt(2023, 4, 10).expect("valid date");
    let summary = PacingReportProcessor::new(PacingConfig::default())?
        .run(&mut workbook, &FixedClock(today))?;

    println!(
        "Anchored on {}: {} rows from {} budget records and {} spend records",
        summary.anchor_date, summary.rows, summary.campaign_records, summary.spend_records
    );

    if let Some(table) = workbook.table("Budget vs Actual") {
        println!("{}", table[0].join(" | "));
        for cells in table
            .iter()
            .skip(1)
            .filter(|cells| HIGHLIGHT_DATES.contains(&cells[0].as_str()))
        {
            println!("{}", cells.join(" | "));
        }
    }

    Ok(())
}
