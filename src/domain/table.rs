// In-memory tabular dataset
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const SPECIES_COLUMN: &str = "species";

/// One typed column. Every cell is optional; a missing cell is `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Time(Vec<Option<DateTime<Utc>>>),
    Number(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Time(cells) => cells.len(),
            Column::Number(cells) => cells.len(),
            Column::Text(cells) => cells.len(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Column::Time(_) => "time",
            Column::Number(_) => "number",
            Column::Text(_) => "text",
        }
    }
}

/// Column name to ordered values; row `i` of every column is one record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: BTreeMap<String, Column>,
    rows: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a column. The first column fixes the row count; later
    /// columns are padded with missing cells or truncated to match it.
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Self {
        if self.columns.is_empty() {
            self.rows = column.len();
        }
        let column = fit_column(column, self.rows);
        self.columns.insert(name.into(), column);
        self
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn numbers(&self, name: &str) -> Option<&[Option<f64>]> {
        match self.columns.get(name) {
            Some(Column::Number(cells)) => Some(cells),
            _ => None,
        }
    }

    pub fn times(&self, name: &str) -> Option<&[Option<DateTime<Utc>>]> {
        match self.columns.get(name) {
            Some(Column::Time(cells)) => Some(cells),
            _ => None,
        }
    }

    pub fn texts(&self, name: &str) -> Option<&[Option<String>]> {
        match self.columns.get(name) {
            Some(Column::Text(cells)) => Some(cells),
            _ => None,
        }
    }

    /// New table holding only the given rows, in the given order
    pub fn select_rows(&self, rows: &[usize]) -> Table {
        fn pick<T: Clone>(cells: &[Option<T>], rows: &[usize]) -> Vec<Option<T>> {
            rows.iter().map(|&row| cells.get(row).cloned().flatten()).collect()
        }

        let columns = self
            .columns
            .iter()
            .map(|(name, column)| {
                let selected = match column {
                    Column::Time(cells) => Column::Time(pick(cells, rows)),
                    Column::Number(cells) => Column::Number(pick(cells, rows)),
                    Column::Text(cells) => Column::Text(pick(cells, rows)),
                };
                (name.clone(), selected)
            })
            .collect();

        Table {
            columns,
            rows: rows.len(),
        }
    }

    /// The timestamp column, accepting `time` as an alias
    pub fn timestamps(&self) -> Option<&[Option<DateTime<Utc>>]> {
        self.times(TIMESTAMP_COLUMN).or_else(|| self.times("time"))
    }
}

fn fit_column(column: Column, rows: usize) -> Column {
    fn fit<T>(mut cells: Vec<Option<T>>, rows: usize) -> Vec<Option<T>> {
        cells.truncate(rows);
        cells.resize_with(rows, || None);
        cells
    }

    match column {
        Column::Time(cells) => Column::Time(fit(cells, rows)),
        Column::Number(cells) => Column::Number(fit(cells, rows)),
        Column::Text(cells) => Column::Text(fit(cells, rows)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_column_fits_row_count() {
        let table = Table::new()
            .with_column("ph", Column::Number(vec![Some(7.2), Some(7.5)]))
            .with_column("oxygen", Column::Number(vec![Some(6.1)]))
            .with_column("temperature", Column::Number(vec![Some(1.0), Some(2.0), Some(3.0)]));

        assert_eq!(table.len(), 2);
        assert_eq!(table.numbers("oxygen").unwrap(), &[Some(6.1), None]);
        assert_eq!(table.numbers("temperature").unwrap(), &[Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_select_rows() {
        let table = Table::new()
            .with_column("ph", Column::Number(vec![Some(7.2), Some(7.5), None]))
            .with_column("site", Column::Text(vec![Some("a".to_string()), None, Some("c".to_string())]));
        let picked = table.select_rows(&[2, 0]);

        assert_eq!(picked.len(), 2);
        assert_eq!(picked.numbers("ph").unwrap(), &[None, Some(7.2)]);
        assert_eq!(picked.texts("site").unwrap(), &[Some("c".to_string()), Some("a".to_string())]);
    }

    #[test]
    fn test_typed_accessors() {
        let table = Table::new()
            .with_column("species", Column::Text(vec![Some("Humpback".to_string())]));

        assert!(table.texts("species").is_some());
        assert!(table.numbers("species").is_none());
        assert!(table.timestamps().is_none());
        assert!(table.has_column("species"));
    }
}
