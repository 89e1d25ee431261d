//! Tabular query results.
//!
//! Every endpoint reshapes its response into a [`Table`]: an ordered column
//! list plus rows of typed [`Value`]s. All rows share the table's column set;
//! fields missing from a source record are stored as [`Value::Null`].

use crate::error::ResponseError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// CELL VALUES
// ============================================================================

/// A single typed cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Convert a JSON scalar into a cell. Objects and arrays return `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Value::Null),
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => Some(match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            }),
            serde_json::Value::String(s) => Some(Value::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    /// Infer a cell from CSV text.
    ///
    /// Only finite numbers become `Float`; words such as `NaN` or `inf` stay
    /// `Text`.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Value::Float(f);
            }
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
        Value::Text(raw.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of integer and float cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, ""),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

// ============================================================================
// TABLE
// ============================================================================

/// Ordered rows sharing one column set.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> Row<'a> {
    /// Look up a cell by column name.
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.values.get(idx))
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    /// Iterate `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

impl Table {
    /// Create an empty table with a fixed column set.
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are null-padded, long rows are truncated.
    pub fn push_row(&mut self, mut values: Vec<Value>) {
        values.resize(self.columns.len(), Value::Null);
        self.rows.push(values);
    }

    /// Build a table from keyed records.
    ///
    /// Columns appear in first-seen order across all records; a record that
    /// lacks a column gets `Null` in that position.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Vec<(String, Value)>>,
    {
        let records: Vec<Vec<(String, Value)>> = records.into_iter().collect();

        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for record in &records {
            for (name, _) in record {
                if !index.contains_key(name) {
                    index.insert(name.clone(), columns.len());
                    columns.push(name.clone());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|record| {
                let mut row = vec![Value::Null; columns.len()];
                for (name, value) in record {
                    if let Some(&idx) = index.get(&name) {
                        row[idx] = value;
                    }
                }
                row
            })
            .collect();

        Self { columns, rows }
    }

    /// Build a table from JSON objects whose values are all scalars.
    ///
    /// Returns `NotTabular` if any item is not an object or holds a nested
    /// object/array.
    pub fn from_json_records(items: &[serde_json::Value]) -> Result<Self, ResponseError> {
        let mut records = Vec::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            let object = item.as_object().ok_or_else(|| ResponseError::NotTabular {
                reason: format!("record {} is not an object", position),
            })?;
            let mut record = Vec::with_capacity(object.len());
            for (key, value) in object {
                let cell = Value::from_json(value).ok_or_else(|| ResponseError::NotTabular {
                    reason: format!("record {} field {} is nested", position, key),
                })?;
                record.push((key.clone(), cell));
            }
            records.push(record);
        }
        Ok(Self::from_records(records))
    }

    /// Build a table from JSON objects, flattening nested objects into
    /// dotted column names. Nested arrays are stored as JSON text.
    pub fn from_json_records_flattened(items: &[serde_json::Value]) -> Result<Self, ResponseError> {
        let mut records = Vec::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            let object = item.as_object().ok_or_else(|| ResponseError::NotTabular {
                reason: format!("record {} is not an object", position),
            })?;
            let mut record = Vec::new();
            flatten_object(None, object, &mut record);
            records.push(record);
        }
        Ok(Self::from_records(records))
    }

    /// Parse CSV text with a header row. A body without a header is an
    /// error.
    pub fn from_csv(text: &str) -> Result<Self, ResponseError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| ResponseError::Csv {
                reason: e.to_string(),
            })?
            .clone();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(ResponseError::Csv {
                reason: "missing header row".to_string(),
            });
        }
        let mut table = Self::with_columns(headers.iter());

        for record in reader.records() {
            let record = record.map_err(|e| ResponseError::Csv {
                reason: e.to_string(),
            })?;
            table.push_row(record.iter().map(Value::infer).collect());
        }

        Ok(table)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|values| Row {
            columns: &self.columns,
            values,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.rows.iter().map(move |values| Row {
            columns: &self.columns,
            values,
        })
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Convenience lookup of a single cell.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        self.row(row).and_then(|r| r.get(column))
    }

    /// Render rows as JSON objects keyed by column name.
    pub fn to_json_records(&self) -> Vec<serde_json::Value> {
        self.rows()
            .map(|row| {
                let object: serde_json::Map<String, serde_json::Value> = row
                    .iter()
                    .map(|(name, value)| (name.to_string(), value_to_json(value)))
                    .collect();
                serde_json::Value::Object(object)
            })
            .collect()
    }
}

// ============================================================================
// QUERY OUTPUT
// ============================================================================

/// Result of a query: a table, or the decoded body when it is not tabular.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum QueryOutput {
    Table(Table),
    Raw(serde_json::Value),
}

impl QueryOutput {
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            QueryOutput::Table(t) => Some(t),
            QueryOutput::Raw(_) => None,
        }
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            QueryOutput::Table(t) => Some(t),
            QueryOutput::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&serde_json::Value> {
        match self {
            QueryOutput::Raw(v) => Some(v),
            QueryOutput::Table(_) => None,
        }
    }
}

impl From<Table> for QueryOutput {
    fn from(table: Table) -> Self {
        QueryOutput::Table(table)
    }
}

fn flatten_object(
    prefix: Option<&str>,
    object: &serde_json::Map<String, serde_json::Value>,
    out: &mut Vec<(String, Value)>,
) {
    for (key, value) in object {
        let name = match prefix {
            Some(p) => format!("{}.{}", p, key),
            None => key.clone(),
        };
        match value {
            serde_json::Value::Object(inner) if !inner.is_empty() => {
                flatten_object(Some(&name), inner, out);
            }
            serde_json::Value::Object(_) => out.push((name, Value::Null)),
            serde_json::Value::Array(_) => out.push((name, Value::Text(value.to_string()))),
            scalar => out.push((name, Value::from_json(scalar).unwrap_or_default())),
        }
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::String(s.clone()),
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
