//! Column table loading from CSV files.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV input has no header row")]
    MissingHeader,
    #[error("Duplicate column name '{0}' in header")]
    DuplicateColumn(String),
    #[error("Line {line}: expected {expected} fields, found {found}")]
    RowLength {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("Column '{column}' mixes numbers and text (first text cell on line {line})")]
    MixedColumn { column: String, line: u64 },
    #[error("CSV input has a header but no data rows")]
    NoRows,
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// How cell types are inferred across a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeMode {
    /// Each cell is coerced on its own; a column may mix numbers and text
    #[default]
    Permissive,
    /// A column holding numbers must not also hold text
    Strict,
}

/// A single coerced cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Coerce a raw cell: integer unless it carries a `.` or an exponent
    /// marker, float otherwise, text when neither parse succeeds.
    pub fn parse(cell: &str) -> Self {
        let trimmed = cell.trim();
        let looks_float = trimmed.contains(['.', 'e', 'E']);
        let parsed = if looks_float {
            trimmed.parse::<f64>().ok().map(Value::Float)
        } else {
            trimmed
                .parse::<i64>()
                .ok()
                .map(Value::Int)
                .or_else(|| wide_integer(trimmed).map(Value::Float))
        };
        parsed.unwrap_or_else(|| Value::Text(cell.to_string()))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Value::Text(_))
    }
}

/// Whole number past the `i64` range, kept numeric at float precision
fn wide_integer(cell: &str) -> Option<f64> {
    let digits = cell.strip_prefix(['-', '+']).unwrap_or(cell);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    cell.parse::<f64>().ok()
}

/// A named column of coerced values
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    /// Numeric values in row order, text cells skipped
    pub fn numbers(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(Value::as_f64)
    }
}

/// Ordered, immutable mapping from column name to values.
///
/// Every column holds exactly `row_count()` values.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnTable {
    columns: Vec<Column>,
    rows: usize,
}

impl ColumnTable {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }
}

/// Load a column table from a CSV file on disk
pub fn load_table<P: AsRef<Path>>(path: P, mode: TypeMode) -> Result<ColumnTable, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_table(file, mode)?;
    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.row_count(),
        table.column_count(),
        path.display()
    );
    Ok(table)
}

/// Load a column table from any CSV byte stream
pub fn read_table<R: Read>(input: R, mode: TypeMode) -> Result<ColumnTable, LoadError> {
    // Field counts are checked here rather than by the reader so the error
    // names the offending line.
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(LoadError::MissingHeader);
    }

    let mut seen = HashSet::new();
    let mut columns: Vec<Column> = Vec::with_capacity(headers.len());
    for name in headers.iter() {
        if !seen.insert(name) {
            return Err(LoadError::DuplicateColumn(name.to_string()));
        }
        columns.push(Column {
            name: name.to_string(),
            values: Vec::new(),
        });
    }

    // Line of the first text cell and whether any number was seen, per column
    let mut first_text: Vec<Option<u64>> = vec![None; columns.len()];
    let mut has_number = vec![false; columns.len()];

    let mut rows = 0usize;
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(rows as u64 + 2);
        if record.len() != columns.len() {
            return Err(LoadError::RowLength {
                line,
                expected: columns.len(),
                found: record.len(),
            });
        }

        for (idx, cell) in record.iter().enumerate() {
            let value = Value::parse(cell);
            if value.is_numeric() {
                has_number[idx] = true;
            } else if first_text[idx].is_none() {
                first_text[idx] = Some(line);
            }
            columns[idx].values.push(value);
        }
        rows += 1;
    }

    if rows == 0 {
        return Err(LoadError::NoRows);
    }

    for (idx, column) in columns.iter().enumerate() {
        let Some(line) = first_text[idx] else { continue };
        if !has_number[idx] {
            continue;
        }
        if mode == TypeMode::Strict {
            return Err(LoadError::MixedColumn {
                column: column.name.clone(),
                line,
            });
        }
        log::warn!(
            "Column '{}' mixes numbers and text (first text cell on line {})",
            column.name,
            line
        );
    }

    Ok(ColumnTable { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(text: &str) -> Result<ColumnTable, LoadError> {
        read_table(text.as_bytes(), TypeMode::Permissive)
    }

    #[test]
    fn coerces_cells_by_shape() {
        assert_eq!(Value::parse("3"), Value::Int(3));
        assert_eq!(Value::parse("3.0"), Value::Float(3.0));
        assert_eq!(Value::parse("3e1"), Value::Float(30.0));
        assert_eq!(Value::parse("2E-3"), Value::Float(0.002));
        assert_eq!(Value::parse("-7"), Value::Int(-7));
        assert_eq!(Value::parse("abc"), Value::Text("abc".to_string()));
        // Has an 'e' but is not a float
        assert_eq!(Value::parse("edge"), Value::Text("edge".to_string()));
        assert_eq!(Value::parse(""), Value::Text(String::new()));
    }

    #[test]
    fn integers_past_i64_stay_numeric() {
        let value = Value::parse("12345678901234567890");
        assert!(value.is_numeric());
        assert_eq!(value.as_f64(), Some(12345678901234567890.0));
        assert_eq!(
            Value::parse("-99999999999999999999").as_f64(),
            Some(-99999999999999999999.0)
        );
        // Only digit runs widen; words the float parser accepts stay text
        assert_eq!(Value::parse("inf"), Value::Text("inf".to_string()));
        assert_eq!(Value::parse("NaN"), Value::Text("NaN".to_string()));
        assert_eq!(Value::parse("12a"), Value::Text("12a".to_string()));
    }

    #[test]
    fn loads_columns_in_header_order() {
        let table = load("iter,vertices\n0,10\n1,12\n").unwrap();
        let names: Vec<&str> = table.names().collect();
        assert_eq!(names, vec!["iter", "vertices"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.column("iter").unwrap().values,
            vec![Value::Int(0), Value::Int(1)]
        );
        assert_eq!(
            table.column("vertices").unwrap().values,
            vec![Value::Int(10), Value::Int(12)]
        );
    }

    #[test]
    fn every_column_has_one_value_per_row() {
        let text = "iter,vertices,num_edges,iter_time,mem\n\
                    0,100,450,1.25,2048\n\
                    1,90,400,1.5,2100\n\
                    2,75,310,0.75,2200\n";
        let table = load(text).unwrap();
        assert_eq!(table.column_count(), 5);
        for column in table.columns() {
            assert_eq!(column.values.len(), 3, "column {}", column.name);
        }
        assert_eq!(table.column("iter_time").unwrap().values[0], Value::Float(1.25));
    }

    #[test]
    fn short_row_aborts_load() {
        let err = load("iter,vertices,mem\n0,10,5\n1,12\n").unwrap_err();
        match err {
            LoadError::RowLength { line, expected, found } => {
                assert_eq!(line, 3);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn long_row_aborts_load() {
        let err = load("a,b\n1,2,3\n").unwrap_err();
        assert!(matches!(err, LoadError::RowLength { found: 3, .. }));
    }

    #[test]
    fn rejects_empty_input_and_header_only() {
        assert!(matches!(load("").unwrap_err(), LoadError::MissingHeader));
        assert!(matches!(load("iter,mem\n").unwrap_err(), LoadError::NoRows));
    }

    #[test]
    fn rejects_duplicate_header_names() {
        let err = load("iter,mem,mem\n0,1,2\n").unwrap_err();
        assert!(matches!(err, LoadError::DuplicateColumn(name) if name == "mem"));
    }

    #[test]
    fn mixed_columns_depend_on_type_mode() {
        let text = "iter,status\n0,1\n1,failed\n";
        let table = load(text).unwrap();
        assert_eq!(
            table.column("status").unwrap().values,
            vec![Value::Int(1), Value::Text("failed".to_string())]
        );

        let err = read_table(text.as_bytes(), TypeMode::Strict).unwrap_err();
        assert!(matches!(err, LoadError::MixedColumn { ref column, line: 3 } if column == "status"));
    }

    #[test]
    fn strict_mode_accepts_all_text_and_int_float_mix() {
        let text = "iter,label,time\n0,warmup,1\n1,steady,1.5\n";
        let table = read_table(text.as_bytes(), TypeMode::Strict).unwrap();
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn loading_twice_gives_equal_tables() {
        let text = "iter,time\n0,0.5\n1,0.25\n";
        assert_eq!(load(text).unwrap(), load(text).unwrap());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_table("does/not/exist.csv", TypeMode::Permissive).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
        assert!(err.to_string().contains("does/not/exist.csv"));
    }
}
