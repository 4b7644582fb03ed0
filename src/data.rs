use crate::error::{ChartError, ChartResult};
use crate::value::Value;

/// Rows of coerced cells with optional column headers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub headers: Option<Vec<String>>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(headers: Option<Vec<String>>, rows: Vec<Vec<Value>>) -> Self {
        Self { headers, rows }
    }

    /// Number of columns: the header count, or the widest row.
    pub fn width(&self) -> usize {
        match &self.headers {
            Some(headers) => headers.len(),
            None => self.rows.iter().map(Vec::len).max().unwrap_or(0),
        }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.width() == 0
    }

    pub fn header(&self, idx: usize) -> Option<&str> {
        self.headers.as_ref()?.get(idx).map(String::as_str)
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.headers.as_ref()?.iter().position(|h| h == label)
    }

    /// Cell values of one column; short rows read as `null`.
    pub fn column(&self, idx: usize) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| row.get(idx).cloned().unwrap_or_default())
            .collect()
    }
}

/// A small column-oriented frame: named columns of equal length plus an
/// optional row index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    columns: Vec<(String, Vec<Value>)>,
    index: Option<(String, Vec<Value>)>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.columns
            .first()
            .map(|(_, values)| values.len())
            .or_else(|| self.index.as_ref().map(|(_, values)| values.len()))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_len(&self, name: &str, len: usize) -> ChartResult<()> {
        if (self.columns.is_empty() && self.index.is_none()) || self.len() == len {
            Ok(())
        } else {
            Err(ChartError::Deserialization(format!(
                "column '{name}' has {len} values, frame has {}",
                self.len()
            )))
        }
    }

    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Value>) -> ChartResult<Self> {
        let name = name.into();
        self.check_len(&name, values.len())?;
        self.columns.push((name, values));
        Ok(self)
    }

    pub fn with_index(mut self, name: impl Into<String>, values: Vec<Value>) -> ChartResult<Self> {
        let name = name.into();
        self.check_len(&name, values.len())?;
        self.index = Some((name, values));
        Ok(self)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Create a Frame from a JSON array of objects
    pub fn from_json(value: &serde_json::Value) -> ChartResult<Self> {
        let array = value.as_array().ok_or_else(|| {
            ChartError::Deserialization("input data must be a JSON array of objects".into())
        })?;

        // Column names come from the first object
        let first_obj = array
            .first()
            .and_then(serde_json::Value::as_object)
            .ok_or_else(|| ChartError::Deserialization("input data array is empty".into()))?;
        let headers: Vec<String> = first_obj.keys().cloned().collect();

        let mut columns: Vec<Vec<Value>> = vec![Vec::with_capacity(array.len()); headers.len()];
        for item in array {
            let obj = item.as_object().ok_or_else(|| {
                ChartError::Deserialization("items in array must be objects".into())
            })?;
            for (header, column) in headers.iter().zip(columns.iter_mut()) {
                let cell = match obj.get(header) {
                    Some(v @ (serde_json::Value::String(_)
                    | serde_json::Value::Number(_)
                    | serde_json::Value::Bool(_))) => Value::from(v.clone()),
                    Some(serde_json::Value::Null) | None => Value::Null,
                    Some(_) => {
                        return Err(ChartError::Deserialization(format!(
                            "unsupported value type for field '{header}'"
                        )))
                    }
                };
                column.push(cell);
            }
        }

        let mut frame = Frame::new();
        for (header, values) in headers.into_iter().zip(columns) {
            frame = frame.with_column(header, values)?;
        }
        Ok(frame)
    }

    pub fn from_json_str(text: &str) -> ChartResult<Self> {
        Self::from_json(&serde_json::from_str(text)?)
    }

    /// Headed table; the index, when present, becomes the first column.
    pub fn to_table(&self) -> Table {
        let mut headers = Vec::with_capacity(self.columns.len() + 1);
        let mut sources: Vec<&[Value]> = Vec::with_capacity(self.columns.len() + 1);
        if let Some((name, values)) = &self.index {
            headers.push(name.clone());
            sources.push(values);
        }
        for (name, values) in &self.columns {
            headers.push(name.clone());
            sources.push(values);
        }
        let rows = (0..self.len())
            .map(|row| sources.iter().map(|column| column[row].clone()).collect())
            .collect();
        Table::new(Some(headers), rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_frame_from_json() {
        let frame = Frame::from_json(&json!([
            { "year": 2020, "sales": 10.5, "region": "north" },
            { "year": 2021, "sales": null, "region": "south" },
        ]))
        .unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.column_names().collect::<Vec<_>>(), vec!["year", "sales", "region"]);
        assert_eq!(frame.column("sales").unwrap()[1], Value::Null);
    }

    #[test]
    fn test_frame_from_json_rejects_nested() {
        assert!(Frame::from_json(&json!([{ "a": [1] }])).is_err());
        assert!(Frame::from_json(&json!([])).is_err());
        assert!(Frame::from_json(&json!({ "a": 1 })).is_err());
    }

    #[test]
    fn test_frame_to_table_puts_index_first() {
        let frame = Frame::new()
            .with_column("y", vec![Value::from(1), Value::from(2)])
            .unwrap()
            .with_index("label", vec![Value::from("a"), Value::from("b")])
            .unwrap();
        let table = frame.to_table();
        assert_eq!(table.headers, Some(vec!["label".to_string(), "y".to_string()]));
        assert_eq!(table.rows[1], vec![Value::from("b"), Value::from(2)]);
    }

    #[test]
    fn test_frame_rejects_ragged_columns() {
        let result = Frame::new()
            .with_column("a", vec![Value::from(1)])
            .unwrap()
            .with_column("b", vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn test_table_column_pads_short_rows() {
        let table = Table::new(None, vec![vec![Value::from(1), Value::from(2)], vec![Value::from(3)]]);
        assert_eq!(table.width(), 2);
        assert_eq!(table.column(1), vec![Value::from(2), Value::Null]);
    }
}
