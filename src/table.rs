//! Tabular storage the pipeline reads from and writes to.

use crate::error::{PacingError, Result};
use log::debug;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

pub type Table = Vec<Vec<String>>;

pub trait Workbook {
    /// Every row of the named table, header included.
    fn read_table(&self, name: &str) -> Result<Table>;

    /// Replaces the named table's content, creating it when absent.
    fn write_table(&mut self, name: &str, rows: &[Vec<String>]) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    tables: BTreeMap<String, Table>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: &str, rows: Table) -> Self {
        self.tables.insert(name.to_string(), rows);
        self
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }
}

impl Workbook for MemoryWorkbook {
    fn read_table(&self, name: &str) -> Result<Table> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| PacingError::MissingTable(name.to_string()))
    }

    fn write_table(&mut self, name: &str, rows: &[Vec<String>]) -> Result<()> {
        self.tables.insert(name.to_string(), rows.to_vec());
        Ok(())
    }
}

/// A directory holding one `<table name>.csv` file per table.
#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    root: PathBuf,
}

impl CsvWorkbook {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn table_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.csv", name))
    }
}

impl Workbook for CsvWorkbook {
    fn read_table(&self, name: &str) -> Result<Table> {
        let path = self.table_path(name);
        if !path.is_file() {
            return Err(PacingError::MissingTable(name.to_string()));
        }

        let file = File::open(&path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let rows = reader
            .records()
            .map(|record| -> Result<Vec<String>> {
                Ok(record?.iter().map(str::to_string).collect())
            })
            .collect::<Result<Table>>()?;

        debug!("Read {} rows from {}", rows.len(), path.display());
        Ok(rows)
    }

    fn write_table(&mut self, name: &str, rows: &[Vec<String>]) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.table_path(name);

        // File::create truncates, so earlier content never survives a rewrite
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&path)?;
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush()?;

        debug!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(())
    }
}
