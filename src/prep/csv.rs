//! Minimal CSV reading for the source tallies: comma separated, double quotes
//! group a field (`"Smith, Jr."` stays one field), no escaped quotes.

use crate::error::{DataError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Split one line into fields, dropping the quote characters
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Header-indexed rows of one file
pub struct CsvTable {
    path: PathBuf,
    header: Vec<String>,
    /// (1-based line number, fields)
    rows: Vec<(usize, Vec<String>)>,
}

impl CsvTable {
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
        Ok(Self::parse(path, &text))
    }

    /// Blank lines are skipped; a trailing `\r` is tolerated
    pub fn parse(path: &Path, text: &str) -> Self {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
            .filter(|(_, l)| !l.trim().is_empty());

        let header = lines
            .next()
            .map(|(_, l)| split_line(l).into_iter().map(|h| h.trim().to_string()).collect())
            .unwrap_or_default();
        let rows = lines.map(|(n, l)| (n, split_line(l))).collect();

        Self {
            path: path.to_path_buf(),
            header,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a named column
    pub fn column(&self, name: &str) -> Result<usize> {
        self.header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |(line, fields)| Row {
            table: self,
            line: *line,
            fields,
        })
    }
}

pub struct Row<'a> {
    table: &'a CsvTable,
    line: usize,
    fields: &'a [String],
}

impl<'a> Row<'a> {
    pub fn line(&self) -> usize {
        self.line
    }

    /// Trimmed cell; short rows read as empty
    pub fn get(&self, column: usize) -> &'a str {
        self.fields.get(column).map(|f| f.trim()).unwrap_or("")
    }

    /// Vote count cell. Empty reads as 0; decimals like "1234.0" are rounded.
    pub fn count(&self, column: usize) -> Result<u64> {
        let cell = self.get(column);
        if cell.is_empty() {
            return Ok(0);
        }
        if let Ok(n) = cell.parse::<u64>() {
            return Ok(n);
        }
        match cell.parse::<f64>() {
            Ok(x) if x.is_finite() && x >= 0.0 => Ok(x.round() as u64),
            _ => Err(self.bad_cell(column)),
        }
    }

    pub fn bad_cell(&self, column: usize) -> DataError {
        DataError::BadCell {
            path: self.table.path.clone(),
            line: self.line,
            column: self.table.header.get(column).cloned().unwrap_or_default(),
            value: self.get(column).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_fields() {
        assert_eq!(
            split_line(r#"NV,"Smith, Jr.",DEMOCRAT,100"#),
            vec!["NV", "Smith, Jr.", "DEMOCRAT", "100"]
        );
        assert_eq!(split_line("a,,b"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_header_lookup_and_blank_lines() {
        let table = CsvTable::parse(
            Path::new("t.csv"),
            "fips_code,county,total_2016\r\n\n01001,Autauga,24973\n\n01003,Baldwin,\n",
        );
        assert_eq!(table.len(), 2);
        let total = table.column("total_2016").unwrap();
        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows[0].get(1), "Autauga");
        assert_eq!(rows[0].count(total).unwrap(), 24973);
        assert_eq!(rows[1].count(total).unwrap(), 0);
        assert_eq!(rows[1].line(), 5);
        assert!(matches!(
            table.column("dem_2016"),
            Err(DataError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_bad_numeric_cell() {
        let table = CsvTable::parse(Path::new("t.csv"), "votes\n12.6\nabc\n");
        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows[0].count(0).unwrap(), 13);
        let err = rows[1].count(0).unwrap_err();
        assert!(matches!(err, DataError::BadCell { line: 3, .. }), "{err}");
    }
}
