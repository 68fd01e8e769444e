use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context;
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};

use crate::{error::ConvertError, Result};

static EMPTY: Data = Data::Empty;

/// Source of named tabular sheets.
pub trait Workbook {
    /// Sheet names in file order.
    fn sheet_names(&self) -> Vec<String>;

    fn sheet(&mut self, name: &str) -> Result<Sheet>;
}

/// Spreadsheet file on disk, any format calamine detects from the extension.
pub struct SpreadsheetFile {
    sheets: Sheets<BufReader<File>>,
}

impl SpreadsheetFile {
    pub fn open<P: AsRef<Path>>(file_path: P) -> Result<Self> {
        let path = file_path.as_ref();
        let sheets = open_workbook_auto(path)
            .with_context(|| format!("failed to open workbook {}", path.display()))?;
        Ok(Self { sheets })
    }
}

impl Workbook for SpreadsheetFile {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    fn sheet(&mut self, name: &str) -> Result<Sheet> {
        if !self.sheets.sheet_names().iter().any(|n| n == name) {
            return Err(ConvertError::MissingSheet(name.to_string()).into());
        }
        let range = self
            .sheets
            .worksheet_range(name)
            .with_context(|| format!("failed to read sheet `{name}`"))?;
        Ok(Sheet::new(name, range))
    }
}

/// One sheet: the first row holds column names, the rest are data rows.
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    headers: Vec<String>,
    range: Range<Data>,
}

impl Sheet {
    pub fn new(name: &str, range: Range<Data>) -> Self {
        let headers = range
            .headers()
            .unwrap_or_default()
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();
        Self {
            name: name.to_string(),
            headers,
            range,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Position of a named column.
    pub fn column(&self, column: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| {
                ConvertError::MissingColumn {
                    sheet: self.name.clone(),
                    column: column.to_string(),
                }
                .into()
            })
    }

    /// Value of a named column in `row`.
    pub fn value<'r>(&self, row: Row<'r>, column: &str) -> Result<&'r Data> {
        Ok(row.cell(self.column(column)?))
    }

    /// Data rows, header excluded, in source order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.range.rows().skip(1).map(|cells| Row { cells })
    }

    /// First data row. Sheets that carry per-sheet constants keep them here.
    pub fn first_row(&self) -> Result<Row<'_>> {
        self.rows()
            .next()
            .ok_or_else(|| ConvertError::EmptySheet(self.name.clone()).into())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    cells: &'a [Data],
}

impl<'a> Row<'a> {
    /// Cell at `index`; short rows read as empty.
    pub fn cell(&self, index: usize) -> &'a Data {
        self.cells.get(index).unwrap_or(&EMPTY)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Builds a sheet from literal rows, the first being the header row.
    pub fn sheet(name: &str, rows: &[Vec<Data>]) -> Sheet {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let mut range = Range::new((0, 0), (rows.len() as u32 - 1, width as u32 - 1));
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), cell.clone());
            }
        }
        Sheet::new(name, range)
    }

    pub fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    /// Workbook held in memory, sheets kept in insertion order.
    #[derive(Default)]
    pub struct MemoryWorkbook {
        sheets: Vec<Sheet>,
    }

    impl MemoryWorkbook {
        pub fn with(mut self, sheet: Sheet) -> Self {
            self.sheets.push(sheet);
            self
        }
    }

    impl Workbook for MemoryWorkbook {
        fn sheet_names(&self) -> Vec<String> {
            self.sheets.iter().map(|s| s.name().to_string()).collect()
        }

        fn sheet(&mut self, name: &str) -> Result<Sheet> {
            self.sheets
                .iter()
                .find(|s| s.name() == name)
                .cloned()
                .ok_or_else(|| ConvertError::MissingSheet(name.to_string()).into())
        }
    }
}
