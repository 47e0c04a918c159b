use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One spreadsheet value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Float(f64),
    Int(i64),
    Bool(bool),
    /// Date or date-time cell.
    DateTime(NaiveDateTime),
    /// Spreadsheet error value such as `#DIV/0!`, kept as text.
    Error(String),
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
    /// Textual form used when a cell is fed into a prompt.
    ///
    /// Integral floats drop the decimal part so `3.0` reads as `3`; dates
    /// read as `YYYY-MM-DD HH:MM:SS`.
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) | Cell::Error(s) => s.clone(),
            Cell::Float(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Cell::Int(n) => n.to_string(),
            Cell::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Cell::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

/// First sheet of a workbook: a header row plus data rows.
///
/// Rows may be shorter than `headers`; absent trailing cells read as empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub sheet_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(sheet_name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<Vec<Cell>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of the first header equal to `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Requested column names that are not in the header, in request order.
    pub fn missing_columns<'a>(&self, names: &'a [String]) -> Vec<&'a str> {
        names
            .iter()
            .filter(|n| self.column_index(n).is_none())
            .map(String::as_str)
            .collect()
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Write `values` into column `name`, one per row.
    ///
    /// Replaces the column when the header already exists, appends it
    /// otherwise. Short rows are padded so the value lands under its header.
    pub fn set_column(&mut self, name: &str, values: Vec<Cell>) {
        let col = match self.column_index(name) {
            Some(i) => i,
            None => {
                self.headers.push(name.to_string());
                self.headers.len() - 1
            }
        };

        for (row, value) in self.rows.iter_mut().zip(values) {
            if row.len() <= col {
                row.resize(col + 1, Cell::Empty);
            }
            row[col] = value;
        }
    }
}

/// Configured content columns of one row, in configuration order.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    /// Pull `columns` out of row `index`. Unknown columns and empty cells
    /// become empty strings.
    pub fn from_table(table: &Table, index: usize, columns: &[String]) -> Self {
        let fields = columns
            .iter()
            .map(|name| {
                let value = table
                    .column_index(name)
                    .map(|col| table.cell(index, col).text())
                    .unwrap_or_default();
                (name.clone(), value)
            })
            .collect();
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Values in column order, ready for prompt building.
    pub fn contents(&self) -> Vec<String> {
        self.fields.iter().map(|(_, v)| v.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new("Sheet1", vec!["id".into(), "title".into(), "body".into()]).with_rows(vec![
            vec![Cell::Int(1), "Great".into(), "Loved it".into()],
            vec![Cell::Float(2.0), Cell::Empty],
        ])
    }

    #[test]
    fn cell_text_formats_numbers_like_a_spreadsheet() {
        assert_eq!(Cell::Float(3.0).text(), "3");
        assert_eq!(Cell::Float(2.5).text(), "2.5");
        assert_eq!(Cell::Int(-7).text(), "-7");
        assert_eq!(Cell::Bool(true).text(), "TRUE");
        assert_eq!(Cell::Empty.text(), "");
    }

    #[test]
    fn date_cells_read_as_timestamps() {
        let dt = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(Cell::DateTime(dt).text(), "2024-01-01 00:00:00");
    }

    #[test]
    fn row_reads_configured_columns_in_order() {
        let t = sample();
        let row = Row::from_table(&t, 0, &["body".into(), "title".into()]);
        assert_eq!(row.contents(), vec!["Loved it", "Great"]);
        assert_eq!(row.get("title"), Some("Great"));
    }

    #[test]
    fn short_rows_and_unknown_columns_read_as_empty() {
        let t = sample();
        let row = Row::from_table(&t, 1, &["body".into(), "nope".into(), "id".into()]);
        assert_eq!(row.contents(), vec!["", "", "2"]);
    }

    #[test]
    fn missing_columns_keeps_request_order() {
        let t = sample();
        let wanted = vec!["x".to_string(), "title".to_string(), "y".to_string()];
        assert_eq!(t.missing_columns(&wanted), vec!["x", "y"]);
    }

    #[test]
    fn set_column_appends_and_pads_short_rows() {
        let mut t = sample();
        t.set_column("sentiment", vec!["positive".into(), "negative".into()]);
        assert_eq!(t.headers.len(), 4);
        assert_eq!(t.cell(0, 3), &Cell::from("positive"));
        assert_eq!(t.cell(1, 3), &Cell::from("negative"));
        assert_eq!(t.rows[1].len(), 4);
    }

    #[test]
    fn set_column_replaces_existing_header() {
        let mut t = sample();
        t.set_column("title", vec!["a".into(), "b".into()]);
        assert_eq!(t.headers.len(), 3);
        assert_eq!(t.cell(1, 1), &Cell::from("b"));
    }

    #[test]
    fn row_without_columns_is_empty() {
        let row = Row::from_table(&sample(), 0, &[]);
        assert!(row.is_empty());
        assert_eq!(row.len(), 0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        const HEADERS: [&str; 3] = ["a", "b", "c"];

        fn cell() -> impl Strategy<Value = Cell> {
            prop_oneof![
                Just(Cell::Empty),
                "[a-z ]{0,8}".prop_map(Cell::Text),
                any::<i32>().prop_map(|n| Cell::Int(i64::from(n))),
                any::<bool>().prop_map(Cell::Bool),
            ]
        }

        fn table() -> impl Strategy<Value = Table> {
            prop::collection::vec(prop::collection::vec(cell(), 0..=HEADERS.len()), 0..6)
                .prop_map(|rows| {
                    Table::new("Sheet1", HEADERS.iter().map(|h| h.to_string()).collect())
                        .with_rows(rows)
                })
        }

        fn columns() -> impl Strategy<Value = Vec<String>> {
            prop::collection::vec(
                prop::sample::select(vec!["a", "b", "c", "x", "y"]).prop_map(String::from),
                0..5,
            )
        }

        proptest! {
            #[test]
            fn prop_row_has_one_field_per_column(t in table(), cols in columns(), index in 0usize..8) {
                let row = Row::from_table(&t, index, &cols);

                prop_assert_eq!(row.len(), cols.len());
                prop_assert_eq!(row.is_empty(), cols.is_empty());
                for (name, value) in cols.iter().zip(row.contents()) {
                    let expected = match t.column_index(name) {
                        Some(col) => t.cell(index, col).text(),
                        None => String::new(),
                    };
                    prop_assert_eq!(value, expected);
                }
            }

            #[test]
            fn prop_set_column_keeps_rows_and_earlier_cells(t in table(), name in "[a-e]") {
                let labels: Vec<Cell> = (0..t.row_count()).map(|i| Cell::Int(i as i64)).collect();
                let mut updated = t.clone();
                updated.set_column(&name, labels);

                prop_assert_eq!(updated.row_count(), t.row_count());
                let col = updated.column_index(&name).unwrap();
                for r in 0..t.row_count() {
                    prop_assert_eq!(updated.cell(r, col), &Cell::Int(r as i64));
                    for c in (0..t.headers.len()).filter(|&c| c != col) {
                        prop_assert_eq!(updated.cell(r, c), t.cell(r, c));
                    }
                }
            }
        }
    }
}
