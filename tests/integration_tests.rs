use campaign_pacing::*;
use chrono::{Datelike, NaiveDate};
use std::fs;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

fn budget_table(entries: &[(&str, &str, &str)]) -> Table {
    let mut rows = vec![row(&["id", "Campaign", "Owner", "Month", "Budget"])];
    for (idx, &(campaign, month, amount)) in entries.iter().enumerate() {
        let id = idx.to_string();
        rows.push(row(&[id.as_str(), campaign, "ops", month, amount]));
    }
    rows
}

fn spend_table(entries: &[(&str, &str, &str)]) -> Table {
    let mut rows = vec![row(&["Account", "Platform", "Type", "Date", "Campaign", "Spend"])];
    for &(date, campaign, amount) in entries {
        rows.push(row(&["acct", "search", "cpc", date, campaign, amount]));
    }
    rows
}

/// Campaign "A", 3000 for April 2023, 100 spent on each of the first ten days.
fn ten_day_workbook() -> MemoryWorkbook {
    let dates: Vec<String> = (1..=10).map(|day| format!("2023-04-{:02}", day)).collect();
    let spend: Vec<(&str, &str, &str)> = dates
        .iter()
        .map(|date| (date.as_str(), "A", "100"))
        .collect();

    MemoryWorkbook::new()
        .with_table("campaign budgets", budget_table(&[("A", "2023-04-01", "3000")]))
        .with_table("campaign spend", spend_table(&spend))
}

fn run_at(workbook: &mut MemoryWorkbook, today: NaiveDate) -> Result<ReportSummary> {
    PacingReportProcessor::new(PacingConfig::default())?.run(workbook, &FixedClock(today))
}

fn output_row<'a>(workbook: &'a MemoryWorkbook, date: &str, campaign: &str) -> &'a Vec<String> {
    workbook
        .table("Budget vs Actual")
        .unwrap()
        .iter()
        .find(|r| r[0] == date && r[1] == campaign)
        .unwrap_or_else(|| panic!("no row for {} / {}", campaign, date))
}

fn num(cell: &str) -> f64 {
    cell.parse().unwrap()
}

#[test]
fn test_day_ten_is_on_pace() {
    let mut workbook = ten_day_workbook();
    let summary = run_at(&mut workbook, d(2023, 4, 10)).unwrap();
    assert_eq!(summary.rows, 30);
    assert_eq!(summary.anchor_date, d(2023, 4, 10));

    let today = output_row(&workbook, "2023-04-10", "A");
    assert!((num(&today[2]) - 900.0).abs() < 1e-9);
    assert!((num(&today[3]) - 100.0).abs() < 1e-9);
    assert!((num(&today[4]) - 1000.0).abs() < 1e-9);
    assert!((num(&today[5]) - 100.0).abs() < 1e-9);
    assert!((num(&today[6])).abs() < 1e-9);
    assert!((num(&today[7]) - 100.0).abs() < 1e-9);
    assert!((num(&today[8])).abs() < 1e-9);
    assert!((num(&today[9]) - 3000.0).abs() < 1e-9);

    // later days share today's pace and have no spend yet
    let future = output_row(&workbook, "2023-04-25", "A");
    assert!((num(&future[3])).abs() < 1e-9);
    assert!((num(&future[5]) - 100.0).abs() < 1e-9);
    assert!((num(&future[6]) - 100.0).abs() < 1e-9);
}

#[test]
fn test_unspent_past_day_still_reported() {
    let mut workbook = ten_day_workbook();
    run_at(&mut workbook, d(2023, 4, 20)).unwrap();

    let day15 = output_row(&workbook, "2023-04-15", "A");
    assert_eq!(num(&day15[3]), 0.0);
    assert!((num(&day15[8]) - num(&day15[7])).abs() < 1e-9);
    // 2000 left before the 15th, spread over the 16 days from the 15th on
    assert!((num(&day15[5]) - 125.0).abs() < 1e-9);
}

#[test]
fn test_duplicate_spend_rows_accumulate() {
    let mut workbook = MemoryWorkbook::new()
        .with_table("campaign budgets", budget_table(&[("A", "2023-04-01", "3000")]))
        .with_table(
            "campaign spend",
            spend_table(&[
                ("2023-04-03", "A", "10"),
                ("2023-04-03", "A", "15"),
                ("2023-04-03", "A", "25"),
            ]),
        );
    run_at(&mut workbook, d(2023, 4, 12)).unwrap();

    let day3 = output_row(&workbook, "2023-04-03", "A");
    assert!((num(&day3[3]) - 50.0).abs() < 1e-9);
    let day4 = output_row(&workbook, "2023-04-04", "A");
    assert!((num(&day4[2]) - 50.0).abs() < 1e-9);
}

#[test]
fn test_trailing_window_and_row_order() {
    let mut workbook = MemoryWorkbook::new()
        .with_table(
            "campaign budgets",
            budget_table(&[
                ("Old", "2023-06-15", "900"),
                ("Edge", "2023-07-01", "930"),
                ("B", "2024-03-01", "310"),
                ("A", "2024-03-01", "620"),
                ("Later", "2024-04-01", "300"),
            ]),
        )
        .with_table("campaign spend", spend_table(&[]));
    let summary = run_at(&mut workbook, d(2024, 3, 20)).unwrap();

    assert_eq!(summary.campaign_records, 3);

    let table = workbook.table("Budget vs Actual").unwrap();
    assert_eq!(table[0], REPORT_HEADER.to_vec());
    assert_eq!(table.len(), 1 + 31 * 2 + 31);

    assert_eq!((table[1][0].as_str(), table[1][1].as_str()), ("2024-03-01", "B"));
    assert_eq!((table[2][0].as_str(), table[2][1].as_str()), ("2024-03-01", "A"));
    assert_eq!(table[62][0], "2024-03-31");
    assert_eq!((table[63][0].as_str(), table[63][1].as_str()), ("2023-07-01", "Edge"));
    assert!(table.iter().all(|r| r[1] != "Old" && r[1] != "Later"));
}

#[test]
fn test_output_is_fully_replaced() {
    let mut workbook = ten_day_workbook().with_table(
        "Budget vs Actual",
        vec![row(&["stale"]); 500],
    );
    run_at(&mut workbook, d(2023, 4, 10)).unwrap();

    let table = workbook.table("Budget vs Actual").unwrap();
    assert_eq!(table.len(), 31);
    assert!(table.iter().all(|r| r[0] != "stale"));
}

#[test]
fn test_repeat_runs_are_identical() {
    let mut first = ten_day_workbook();
    let mut second = ten_day_workbook();
    run_at(&mut first, d(2023, 4, 10)).unwrap();
    run_at(&mut second, d(2023, 4, 10)).unwrap();
    run_at(&mut second, d(2023, 4, 10)).unwrap();

    assert_eq!(
        first.table("Budget vs Actual"),
        second.table("Budget vs Actual")
    );
}

#[test]
fn test_missing_table_aborts_before_writing() {
    let mut workbook = MemoryWorkbook::new()
        .with_table("campaign budgets", budget_table(&[("A", "2023-04-01", "3000")]))
        .with_table("Budget vs Actual", vec![row(&["previous"])]);

    let err = run_at(&mut workbook, d(2023, 4, 10)).unwrap_err();
    assert!(matches!(err, PacingError::MissingTable(ref name) if name == "campaign spend"));
    assert_eq!(
        workbook.table("Budget vs Actual").unwrap(),
        &vec![row(&["previous"])]
    );
}

#[test]
fn test_malformed_spend_aborts_before_writing() {
    let mut workbook = MemoryWorkbook::new()
        .with_table("campaign budgets", budget_table(&[("A", "2023-04-01", "3000")]))
        .with_table(
            "campaign spend",
            spend_table(&[("2023-04-01", "A", "100"), ("2023-04-02", "A", "#VALUE!")]),
        );

    let err = run_at(&mut workbook, d(2023, 4, 10)).unwrap_err();
    match err {
        PacingError::MalformedRow { table, row, .. } => {
            assert_eq!(table, "campaign spend");
            assert_eq!(row, 3);
        }
        other => panic!("expected MalformedRow, got {}", other),
    }
    assert!(workbook.table("Budget vs Actual").is_none());
}

#[test]
fn test_short_year_budget_fails_instead_of_dropping() {
    let budgets = budget_table(&[("A", "4/1/23", "3000")]);
    let spend = spend_table(&[("2023-04-02", "A", "100")]);

    let result = build_pacing_report(&budgets, &spend, &PacingConfig::default(), d(2023, 4, 10));
    assert!(matches!(
        result,
        Err(PacingError::MalformedRow { row: 2, .. })
    ));
}

#[test]
fn test_misgrouped_spend_amount_aborts_before_writing() {
    let mut workbook = MemoryWorkbook::new()
        .with_table("campaign budgets", budget_table(&[("A", "2023-04-01", "3000")]))
        .with_table("campaign spend", spend_table(&[("2023-04-02", "A", "1,5")]));

    let err = run_at(&mut workbook, d(2023, 4, 10)).unwrap_err();
    assert!(matches!(err, PacingError::MalformedRow { row: 2, .. }));
    assert!(workbook.table("Budget vs Actual").is_none());
}

#[test]
fn test_empty_inputs_produce_header_only() {
    let mut workbook = MemoryWorkbook::new()
        .with_table("campaign budgets", budget_table(&[]))
        .with_table("campaign spend", spend_table(&[]));

    let summary = run_at(&mut workbook, d(2023, 4, 10)).unwrap();
    assert_eq!(summary.rows, 0);
    assert_eq!(workbook.table("Budget vs Actual").unwrap().len(), 1);
}

#[test]
fn test_budget_without_spend_still_reports() {
    let mut workbook = MemoryWorkbook::new()
        .with_table("campaign budgets", budget_table(&[("A", "2024-02-01", "2900")]))
        .with_table("campaign spend", spend_table(&[]));

    run_at(&mut workbook, d(2024, 3, 5)).unwrap();

    let table = workbook.table("Budget vs Actual").unwrap();
    assert_eq!(table.len(), 1 + 29);
    let leap_day = output_row(&workbook, "2024-02-29", "A");
    assert!((num(&leap_day[7]) - 100.0).abs() < 1e-9);
    assert!((num(&leap_day[5]) - 2900.0).abs() < 1e-9);
}

#[test]
fn test_csv_workbook_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("campaign budgets.csv"),
        "id,Campaign,Owner,Month,Budget\n\
         1,Search,ops,2023-04-01,\"3,000\"\n\
         2,Social,ops,04/01/2023,$600\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("campaign spend.csv"),
        "Account,Platform,Type,Date,Campaign,Spend\n\
         acct,g,cpc,2023-04-01T10:00:00Z,Search,100\n\
         acct,g,cpc,2023-04-02T23:30:00-05:00,Search,50\n\
         acct,m,cpm,2023-04-02,Social,20\n",
    )
    .unwrap();

    let mut workbook = CsvWorkbook::new(dir.path());
    let summary = PacingReportProcessor::new(PacingConfig::default())
        .unwrap()
        .run(&mut workbook, &FixedClock(d(2023, 4, 5)))
        .unwrap();
    assert_eq!(summary.rows, 60);
    assert_eq!(summary.spend_records, 3);

    let output = workbook.read_table("Budget vs Actual").unwrap();
    assert_eq!(output.len(), 61);
    assert_eq!(output[0][1], "Campaign / Program");

    // the late-evening timestamp falls on April 3rd in UTC
    let search_day3 = output
        .iter()
        .find(|r| r[0] == "2023-04-03" && r[1] == "Search")
        .unwrap();
    assert!((num(&search_day3[3]) - 50.0).abs() < 1e-9);
    assert!((num(&search_day3[4]) - 150.0).abs() < 1e-9);

    let social_day2 = output
        .iter()
        .find(|r| r[0] == "2023-04-02" && r[1] == "Social")
        .unwrap();
    assert!((num(&social_day2[8]) - 0.0).abs() < 1e-9);
}

#[test]
fn test_reference_offset_shifts_spend_day() {
    let config = PacingConfig {
        reference_utc_offset_minutes: -5 * 60,
        ..PacingConfig::default()
    };
    let budgets = budget_table(&[("Search", "2023-04-01", "3000")]);
    let spend = spend_table(&[("2023-04-02T23:30:00-05:00", "Search", "50")]);

    let rows = build_pacing_report(&budgets, &spend, &config, d(2023, 4, 5)).unwrap();
    let spent: Vec<u32> = rows
        .iter()
        .filter(|r| r.daily_spend > 0.0)
        .map(|r| r.date.day())
        .collect();
    assert_eq!(spent, vec![2]);
}

#[test]
fn test_custom_layout_from_json_config() {
    let config = PacingConfig::from_json_str(
        r#"{
            "budget_table": "budgets",
            "spend_table": "spend",
            "output_table": "pacing",
            "budget_columns": { "campaign": 0, "effective_month": 1, "monthly_budget": 2 },
            "spend_columns": { "date": 0, "campaign": 1, "amount": 2 },
            "window_months": 2
        }"#,
    )
    .unwrap();

    let mut workbook = MemoryWorkbook::new()
        .with_table(
            "budgets",
            vec![
                row(&["campaign", "month", "budget"]),
                row(&["A", "2023-03-01", "310"]),
                row(&["A", "2023-02-01", "280"]),
            ],
        )
        .with_table(
            "spend",
            vec![row(&["date", "campaign", "amount"]), row(&["2023-03-02", "A", "7"])],
        );

    let summary = PacingReportProcessor::new(config)
        .unwrap()
        .run(&mut workbook, &FixedClock(d(2023, 3, 10)))
        .unwrap();

    assert_eq!(summary.rows, 31 + 28);
    let pacing = workbook.table("pacing").unwrap();
    assert_eq!(pacing[2][0], "2023-03-02");
    assert_eq!(pacing[2][3], "7");
}
