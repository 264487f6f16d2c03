//! Tabular query result extraction and formatting

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cap on rendered rows; anything beyond shows up in the footer count
pub const MAX_ROWS: usize = 20;
/// Cap on rendered characters per string cell
pub const MAX_CELL_CHARS: usize = 100;

/// Paths tried in order to locate the row data inside a query result.
/// The service returns either a nested `statement_response` object or a
/// flat result; the order below is load-bearing and must not be changed.
const DATA_ARRAY_PATHS: &[&[&str]] = &[
    &["statement_response", "result", "data_array"],
    &["result", "data_array"],
    &["data_array"],
];

/// Paths tried in order to locate the column descriptors
const COLUMN_PATHS: &[&[&str]] = &[
    &["manifest", "schema", "columns"],
    &["schema", "columns"],
    &["columns"],
];

/// One formatted table cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cell {
    /// Null or absent value, shown as a visually distinct empty marker
    Null,
    /// Formatted display text
    Text { text: String },
}

impl Cell {
    fn text(value: impl Into<String>) -> Self {
        Cell::Text { text: value.into() }
    }

    /// The display text, if this cell has one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text { text } => Some(text),
            Cell::Null => None,
        }
    }
}

/// A display-ready table extracted from a query result payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableView {
    /// Human-readable column labels
    pub columns: Vec<String>,
    /// Formatted cells, capped at `MAX_ROWS` rows
    pub rows: Vec<Vec<Cell>>,
    /// Row count before capping
    pub total_rows: usize,
}

impl TableView {
    /// Footer line describing how much of the result is shown
    pub fn footer(&self) -> String {
        if self.total_rows > self.rows.len() {
            format!("Showing {} of {} rows", self.rows.len(), self.total_rows)
        } else {
            format!("{} row(s)", self.total_rows)
        }
    }
}

/// Build a display table from a query result payload.
///
/// Returns `None` when the payload carries no row data, in which case
/// nothing is rendered.
pub fn build_table(result: &Value) -> Option<TableView> {
    let data = locate(result, DATA_ARRAY_PATHS)?.as_array()?;
    if data.is_empty() {
        return None;
    }

    let columns = match locate(result, COLUMN_PATHS).and_then(Value::as_array) {
        Some(descriptors) if !descriptors.is_empty() => descriptors
            .iter()
            .enumerate()
            .map(|(i, d)| column_label(&column_name(d, i)))
            .collect(),
        _ => {
            // No schema anywhere: synthesize names sized to the first row
            let width = data[0].as_array().map_or(1, Vec::len);
            (1..=width).map(|i| format!("Column {}", i)).collect()
        }
    };

    let rows = data.iter().take(MAX_ROWS).map(row_cells).collect();

    Some(TableView {
        columns,
        rows,
        total_rows: data.len(),
    })
}

/// First path that resolves inside `value`
fn locate<'a>(value: &'a Value, paths: &[&[&str]]) -> Option<&'a Value> {
    paths.iter().find_map(|path| lookup(value, path))
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(key))
}

/// Raw column name from a descriptor: a bare string or an object with `name`
fn column_name(descriptor: &Value, index: usize) -> String {
    match descriptor {
        Value::String(name) => name.clone(),
        Value::Object(fields) => fields
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("column_{}", index + 1)),
        _ => format!("column_{}", index + 1),
    }
}

/// Turn `unit_price` into `Unit Price`
fn column_label(name: &str) -> String {
    name.split('_')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn row_cells(row: &Value) -> Vec<Cell> {
    match row.as_array() {
        Some(cells) => cells.iter().map(format_cell).collect(),
        // Tolerate a bare value where a row array was expected
        None => vec![format_cell(row)],
    }
}

fn format_cell(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Null,
        Value::Number(n) => Cell::text(format_number(n)),
        Value::String(s) => Cell::text(truncate_cell(s)),
        other => Cell::text(other.to_string()),
    }
}

/// Group a numeric value with thousands separators, keeping any fraction
fn format_number(n: &serde_json::Number) -> String {
    let raw = n.to_string();
    // ryu can emit exponent notation for extreme floats; leave those alone
    if raw.contains(['e', 'E']) {
        return raw;
    }
    match raw.split_once('.') {
        Some((int_part, frac_part)) => format!("{}.{}", group_signed(int_part), frac_part),
        None => group_signed(&raw),
    }
}

fn group_signed(digits: &str) -> String {
    match digits.strip_prefix('-') {
        Some(rest) => format!("-{}", group_digits(rest)),
        None => group_digits(digits),
    }
}

fn group_digits(digits: &str) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn truncate_cell(s: &str) -> String {
    if s.chars().count() > MAX_CELL_CHARS {
        let mut out: String = s.chars().take(MAX_CELL_CHARS).collect();
        out.push('…');
        out
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // --- Shape tolerance ---

    #[test]
    fn test_nested_statement_response_shape() {
        let result = json!({
            "statement_response": {
                "result": {"data_array": [[1, "a"]]}
            }
        });
        let table = build_table(&result).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.total_rows, 1);
    }

    #[test]
    fn test_flat_result_shape() {
        let result = json!({"result": {"data_array": [[1]]}});
        assert!(build_table(&result).is_some());
    }

    #[test]
    fn test_bare_data_array_shape() {
        let result = json!({"data_array": [[1]]});
        assert!(build_table(&result).is_some());
    }

    #[test]
    fn test_missing_or_empty_data_renders_nothing() {
        assert!(build_table(&json!({})).is_none());
        assert!(build_table(&json!({"data_array": []})).is_none());
        assert!(build_table(&json!({"result": {}})).is_none());
    }

    // --- Column labels ---

    #[test]
    fn test_column_label_from_descriptor_object() {
        let result = json!({
            "manifest": {"schema": {"columns": [{"name": "product_id"}]}},
            "result": {"data_array": [[42]]}
        });
        let table = build_table(&result).unwrap();
        assert_eq!(table.columns, vec!["Product Id"]);
        assert_eq!(table.rows[0][0].as_str(), Some("42"));
    }

    #[test]
    fn test_column_label_from_bare_string() {
        let result = json!({
            "columns": ["store_region", "total_sales"],
            "data_array": [["EMEA", 10]]
        });
        let table = build_table(&result).unwrap();
        assert_eq!(table.columns, vec!["Store Region", "Total Sales"]);
    }

    #[test]
    fn test_column_lookup_precedence() {
        // manifest.schema.columns must win over a sibling flat columns field
        let result = json!({
            "manifest": {"schema": {"columns": [{"name": "right"}]}},
            "columns": ["wrong"],
            "data_array": [[1]]
        });
        let table = build_table(&result).unwrap();
        assert_eq!(table.columns, vec!["Right"]);
    }

    #[test]
    fn test_placeholder_columns_sized_to_first_row() {
        let result = json!({"data_array": [[1, 2, 3]]});
        let table = build_table(&result).unwrap();
        assert_eq!(table.columns, vec!["Column 1", "Column 2", "Column 3"]);
    }

    // --- Row capping ---

    #[test]
    fn test_rows_capped_at_twenty_with_footer() {
        let rows: Vec<Value> = (0..25).map(|i| json!([i])).collect();
        let result = json!({"data_array": rows});
        let table = build_table(&result).unwrap();
        assert_eq!(table.rows.len(), 20);
        assert_eq!(table.total_rows, 25);
        assert_eq!(table.footer(), "Showing 20 of 25 rows");
    }

    #[test]
    fn test_small_result_footer_counts_rows() {
        let result = json!({"data_array": [[1], [2], [3]]});
        let table = build_table(&result).unwrap();
        assert_eq!(table.footer(), "3 row(s)");
    }

    // --- Cell formatting ---

    #[test]
    fn test_null_cells_are_distinct() {
        let result = json!({"data_array": [[null, "x"]]});
        let table = build_table(&result).unwrap();
        assert_eq!(table.rows[0][0], Cell::Null);
        assert_eq!(table.rows[0][1].as_str(), Some("x"));
    }

    #[test]
    fn test_numbers_grouped_with_thousands_separators() {
        let result = json!({"data_array": [[1234567, -9876543, 12, 1234.5]]});
        let table = build_table(&result).unwrap();
        let texts: Vec<_> = table.rows[0].iter().map(|c| c.as_str().unwrap()).collect();
        assert_eq!(texts, vec!["1,234,567", "-9,876,543", "12", "1,234.5"]);
    }

    #[test]
    fn test_long_strings_truncated_with_ellipsis() {
        let long = "x".repeat(150);
        let result = json!({"data_array": [[long]]});
        let table = build_table(&result).unwrap();
        let text = table.rows[0][0].as_str().unwrap();
        assert_eq!(text.chars().count(), MAX_CELL_CHARS + 1);
        assert!(text.ends_with('…'));
    }

    #[test]
    fn test_exact_limit_string_not_truncated() {
        let exact = "y".repeat(MAX_CELL_CHARS);
        let result = json!({"data_array": [[exact.clone()]]});
        let table = build_table(&result).unwrap();
        assert_eq!(table.rows[0][0].as_str(), Some(exact.as_str()));
    }

    #[test]
    fn test_other_values_rendered_as_is() {
        let result = json!({"data_array": [[true, {"k": 1}]]});
        let table = build_table(&result).unwrap();
        assert_eq!(table.rows[0][0].as_str(), Some("true"));
        assert_eq!(table.rows[0][1].as_str(), Some(r#"{"k":1}"#));
    }
}
