//! In-memory tabular datasets
//!
//! A [`Dataset`] is an ordered collection of equally long, named columns.
//! Every column is either numeric or categorical and represents a missing
//! cell as `None`. Datasets are values: every transform in the workspace
//! takes a `&Dataset` and returns a new one.

use crate::matrix::FeatureMatrix;
use crate::{Error, Result};
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::borrow::Cow;

/// Values of a single column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum ColumnData {
    /// Numeric values, `None` for missing cells
    Numeric(Vec<Option<f64>>),
    /// Category labels, `None` for missing cells
    Categorical(Vec<Option<String>>),
}

impl ColumnData {
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Categorical(values) => values.len(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnData::Numeric(_) => "numeric",
            ColumnData::Categorical(_) => "categorical",
        }
    }

    /// Number of missing cells (NaN counts as missing)
    pub fn missing_count(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values
                .iter()
                .filter(|v| v.map_or(true, f64::is_nan))
                .count(),
            ColumnData::Categorical(values) => values.iter().filter(|v| v.is_none()).count(),
        }
    }

    /// View the column as category labels
    ///
    /// Numeric cells are rendered with `f64`'s `Display`, so `3.0` becomes `"3"`.
    pub fn to_categorical(&self) -> Cow<'_, [Option<String>]> {
        match self {
            ColumnData::Categorical(values) => Cow::Borrowed(values.as_slice()),
            ColumnData::Numeric(values) => Cow::Owned(
                values
                    .iter()
                    .map(|v| v.filter(|x| !x.is_nan()).map(render_number))
                    .collect(),
            ),
        }
    }
}

/// Render a number the way it is used as a category label
pub fn render_number(value: f64) -> String {
    value.to_string()
}

/// A named column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self::new(name, ColumnData::Numeric(values))
    }

    pub fn categorical(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self::new(name, ColumnData::Categorical(values))
    }
}

/// Ordered set of equally long named columns
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    index: AHashMap<String, usize>,
}

impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}

impl Dataset {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from columns, checking lengths and name uniqueness
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let mut dataset = Self::new();
        for column in columns {
            if dataset.has_column(&column.name) {
                return Err(Error::InvalidInput(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
            dataset.insert_column(column.name, column.data)?;
        }
        Ok(dataset)
    }

    /// Builder-style [`Dataset::insert_column`]
    pub fn with_column(mut self, name: impl Into<String>, data: ColumnData) -> Result<Self> {
        self.insert_column(name, data)?;
        Ok(self)
    }

    /// Append a column, or replace an existing column of the same name in place
    pub fn insert_column(&mut self, name: impl Into<String>, data: ColumnData) -> Result<()> {
        let name = name.into();
        if !self.columns.is_empty() && data.len() != self.num_rows() {
            return Err(Error::InvalidInput(format!(
                "column '{}' has {} rows, dataset has {}",
                name,
                data.len(),
                self.num_rows()
            )));
        }

        match self.index.get(&name) {
            Some(&position) => self.columns[position].data = data,
            None => {
                self.index.insert(name.clone(), self.columns.len());
                self.columns.push(Column { name, data });
            }
        }
        Ok(())
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.data.len())
    }

    #[inline]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.index
            .get(name)
            .map(|&i| &self.columns[i])
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    /// Numeric values of a column; categorical columns are a type error
    pub fn numeric(&self, name: &str) -> Result<&[Option<f64>]> {
        match &self.column(name)?.data {
            ColumnData::Numeric(values) => Ok(values),
            other => Err(Error::ColumnType {
                column: name.to_string(),
                expected: "numeric",
                actual: other.type_name(),
            }),
        }
    }

    /// Category labels of a column, rendering numeric columns as labels
    pub fn categorical(&self, name: &str) -> Result<Cow<'_, [Option<String>]>> {
        Ok(self.column(name)?.data.to_categorical())
    }

    /// New dataset with only the given columns, in the given order
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Dataset> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            columns.push(self.column(name.as_ref())?.clone());
        }
        Dataset::from_columns(columns)
    }

    /// New dataset without the given columns; unknown names are ignored
    pub fn drop_columns<S: AsRef<str>>(&self, names: &[S]) -> Dataset {
        let columns = self
            .columns
            .iter()
            .filter(|c| !names.iter().any(|n| n.as_ref() == c.name))
            .cloned()
            .collect::<Vec<_>>();
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        Dataset { columns, index }
    }

    /// Dense row-major matrix of the given numeric columns
    ///
    /// Every cell must be present: models consume preprocessed data only.
    pub fn feature_matrix<S: AsRef<str>>(&self, names: &[S]) -> Result<FeatureMatrix> {
        let n_rows = self.num_rows();
        let mut sources = Vec::with_capacity(names.len());
        for name in names {
            sources.push(self.numeric(name.as_ref())?);
        }

        let mut data = Vec::with_capacity(n_rows * names.len());
        for row in 0..n_rows {
            for (col, values) in sources.iter().enumerate() {
                match values[row] {
                    Some(v) if !v.is_nan() => data.push(v),
                    _ => {
                        return Err(Error::InvalidInput(format!(
                            "missing value in column '{}' at row {}",
                            names[col].as_ref(),
                            row
                        )))
                    }
                }
            }
        }

        FeatureMatrix::new(
            names.iter().map(|n| n.as_ref().to_string()).collect(),
            n_rows,
            data,
        )
    }

    /// Parse a JSON array of row objects
    pub fn from_json_str(json: &str) -> Result<Dataset> {
        match serde_json::from_str::<Value>(json)? {
            Value::Array(records) => Dataset::from_records(&records),
            _ => Err(Error::InvalidInput(
                "expected a JSON array of records".to_string(),
            )),
        }
    }

    /// Build a dataset from row objects
    ///
    /// Columns appear in first-seen order. A column holding any string is
    /// categorical, otherwise numeric; `null` and absent keys are missing.
    pub fn from_records(records: &[Value]) -> Result<Dataset> {
        let mut names: Vec<String> = Vec::new();
        let mut seen: AHashSet<String> = AHashSet::new();
        for (row, record) in records.iter().enumerate() {
            let object = record.as_object().ok_or_else(|| {
                Error::InvalidInput(format!("record {} is not a JSON object", row))
            })?;
            for key in object.keys() {
                if seen.insert(key.clone()) {
                    names.push(key.clone());
                }
            }
        }

        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let cells: Vec<Option<&Value>> = records
                .iter()
                .map(|r| r.get(&name).filter(|v| !v.is_null()))
                .collect();
            columns.push(Column::new(name.clone(), infer_column(&name, &cells)?));
        }
        Dataset::from_columns(columns)
    }

    /// Rows as JSON objects, missing cells as `null`
    pub fn to_records(&self) -> Vec<Value> {
        (0..self.num_rows())
            .map(|row| {
                let mut object = Map::new();
                for column in &self.columns {
                    let value = match &column.data {
                        ColumnData::Numeric(values) => values[row]
                            .and_then(Number::from_f64)
                            .map_or(Value::Null, Value::Number),
                        ColumnData::Categorical(values) => values[row]
                            .as_ref()
                            .map_or(Value::Null, |s| Value::String(s.clone())),
                    };
                    object.insert(column.name.clone(), value);
                }
                Value::Object(object)
            })
            .collect()
    }
}

fn infer_column(name: &str, cells: &[Option<&Value>]) -> Result<ColumnData> {
    for cell in cells.iter().flatten() {
        if cell.is_array() || cell.is_object() {
            return Err(Error::InvalidInput(format!(
                "column '{}' holds a nested value",
                name
            )));
        }
    }

    if cells.iter().flatten().any(|v| v.is_string()) {
        let values = cells
            .iter()
            .map(|cell| {
                cell.map(|v| match v {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), render_number),
                    other => other.to_string(),
                })
            })
            .collect();
        return Ok(ColumnData::Categorical(values));
    }

    let values = cells
        .iter()
        .map(|cell| {
            cell.and_then(|v| match v {
                Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
                other => other.as_f64(),
            })
        })
        .collect();
    Ok(ColumnData::Numeric(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Dataset {
        Dataset::from_records(&[
            json!({"query_id": "q1", "price": 10.0, "brand": "acme", "clicked": true}),
            json!({"query_id": "q1", "price": null, "brand": "zeta", "clicked": false}),
            json!({"query_id": "q2", "price": 3, "clicked": false}),
        ])
        .unwrap()
    }

    #[test]
    fn test_from_records_infers_types() {
        let ds = sample();
        assert_eq!(ds.num_rows(), 3);
        assert_eq!(ds.column_names(), vec!["query_id", "price", "brand", "clicked"]);
        assert_eq!(ds.numeric("price").unwrap(), &[Some(10.0), None, Some(3.0)]);
        assert_eq!(ds.numeric("clicked").unwrap(), &[Some(1.0), Some(0.0), Some(0.0)]);
        assert_eq!(
            ds.categorical("brand").unwrap().as_ref(),
            &[Some("acme".to_string()), Some("zeta".to_string()), None]
        );
    }

    #[test]
    fn test_numeric_column_rendered_as_categories() {
        let ds = sample();
        assert_eq!(
            ds.categorical("price").unwrap().as_ref(),
            &[Some("10".to_string()), None, Some("3".to_string())]
        );
    }

    #[test]
    fn test_numeric_on_categorical_is_type_error() {
        let ds = sample();
        assert!(matches!(ds.numeric("brand"), Err(Error::ColumnType { .. })));
        assert!(matches!(ds.numeric("nope"), Err(Error::MissingColumn(_))));
    }

    #[test]
    fn test_insert_column_checks_length() {
        let mut ds = sample();
        let result = ds.insert_column("short", ColumnData::Numeric(vec![Some(1.0)]));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_insert_column_replaces_in_place() {
        let mut ds = sample();
        ds.insert_column("price", ColumnData::Numeric(vec![Some(1.0); 3]))
            .unwrap();
        assert_eq!(ds.column_names()[1], "price");
        assert_eq!(ds.numeric("price").unwrap(), &[Some(1.0); 3]);
    }

    #[test]
    fn test_select_and_drop() {
        let ds = sample();
        let selected = ds.select(&["brand", "query_id"]).unwrap();
        assert_eq!(selected.column_names(), vec!["brand", "query_id"]);

        let dropped = ds.drop_columns(&["brand", "missing"]);
        assert_eq!(dropped.column_names(), vec!["query_id", "price", "clicked"]);
        assert!(dropped.column("clicked").is_ok());
    }

    #[test]
    fn test_feature_matrix_rejects_missing() {
        let ds = sample();
        assert!(ds.feature_matrix(&["price"]).is_err());

        let matrix = ds.feature_matrix(&["clicked"]).unwrap();
        assert_eq!(matrix.n_rows(), 3);
        assert_eq!(matrix.row(0), &[1.0]);
    }

    #[test]
    fn test_records_roundtrip_keeps_nulls() {
        let ds = sample();
        let records = ds.to_records();
        assert_eq!(records[1]["price"], Value::Null);
        assert_eq!(records[2]["brand"], Value::Null);
        let parsed = Dataset::from_records(&records).unwrap();
        assert_eq!(parsed, ds);
    }

    #[test]
    fn test_from_json_str_requires_array() {
        assert!(Dataset::from_json_str("{\"a\": 1}").is_err());
        let ds = Dataset::from_json_str("[{\"a\": 1}, {\"a\": 2}]").unwrap();
        assert_eq!(ds.num_rows(), 2);
    }
}
