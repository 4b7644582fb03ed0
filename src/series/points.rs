//! Data-point node types and their positional layouts.

use crate::coerce;
use crate::color::Color;
use crate::error::{ChartError, ChartResult};
use crate::node::Node;
use crate::value::{Map, Value};

/// A single observation in a series.
///
/// `DIMENSIONS` lists the positional array layouts the point accepts, by
/// internal field name, shortest first. `[1, 2]` for a cartesian point is
/// `x = 1, y = 2`.
pub trait DataPoint: Node {
    const DIMENSIONS: &'static [&'static [&'static str]];

    /// Number of values in each supported layout.
    fn widths() -> Vec<usize> {
        Self::DIMENSIONS.iter().map(|layout| layout.len()).collect()
    }

    fn layout_for_width(width: usize) -> Option<&'static [&'static str]> {
        Self::DIMENSIONS.iter().copied().find(|layout| layout.len() == width)
    }

    fn from_positional(row: &[Value]) -> ChartResult<Self> {
        let layout = Self::layout_for_width(row.len()).ok_or_else(|| {
            ChartError::invalid(
                "data",
                format!(
                    "{} accepts arrays of length {:?}, received {}",
                    Self::NODE_NAME,
                    Self::widths(),
                    row.len()
                ),
            )
        })?;
        let mut point = Self::default();
        for (name, value) in layout.iter().zip(row) {
            point.set_field(name, value.clone())?;
        }
        Ok(point)
    }

    /// Builds a point from one item of a `data` array: a bare value, a
    /// positional array or a mapping.
    fn from_item(item: Value) -> ChartResult<Self> {
        match item {
            Value::Null => Ok(Self::default()),
            Value::Array(row) => Self::from_positional(&row),
            Value::Object(map) => Self::from_map(map),
            scalar => Self::from_positional(std::slice::from_ref(&scalar)),
        }
    }

    /// Shortest form of this point: a bare `y`, a positional array when the
    /// set fields match a layout exactly, otherwise the trimmed mapping.
    fn compact(&self) -> Value {
        let mapping = self.to_mapping();
        if mapping.is_empty() {
            return Value::Null;
        }
        for layout in Self::DIMENSIONS {
            if !layout_matches::<Self>(layout, &mapping) {
                continue;
            }
            let mut values: Vec<Value> = layout
                .iter()
                .filter_map(|name| Self::wire_name(name))
                .map(|wire| mapping.get(wire).cloned().unwrap_or_default())
                .collect();
            return if values.len() == 1 {
                values.remove(0)
            } else {
                Value::Array(values)
            };
        }
        Value::Object(mapping)
    }
}

fn layout_matches<P: Node>(layout: &[&str], mapping: &Map) -> bool {
    layout.len() == mapping.len()
        && layout
            .iter()
            .all(|name| P::wire_name(name).is_some_and(|wire| mapping.contains_key(wire)))
}

crate::define_node! {
    /// Point of a cartesian series (line, spline, area, column, bar, scatter).
    pub struct CartesianPoint("series.line.data") {
        x: Value => "x", check coerce::number_or_string;
        y: f64 => "y";
        name: String => "name";
        id: String => "id";
        color: Color => "color";
        class_name: String => "className";
        description: String => "description";
        selected: bool => "selected" = false;
        marker: Value => "marker";
        data_labels: Value => "dataLabels";
        custom: Value => "custom";
    }
}

impl DataPoint for CartesianPoint {
    const DIMENSIONS: &'static [&'static [&'static str]] = &[&["y"], &["x", "y"]];
}

crate::define_node! {
    /// Point with a low and high value (arearange, columnrange).
    pub struct RangePoint("series.arearange.data") {
        x: Value => "x", check coerce::number_or_string;
        low: f64 => "low";
        high: f64 => "high";
        name: String => "name";
        id: String => "id";
        color: Color => "color";
        description: String => "description";
        data_labels: Value => "dataLabels";
        custom: Value => "custom";
    }
}

impl DataPoint for RangePoint {
    const DIMENSIONS: &'static [&'static [&'static str]] = &[&["low", "high"], &["x", "low", "high"]];
}

crate::define_node! {
    /// Slice of a pie.
    pub struct SinglePoint("series.pie.data") {
        y: f64 => "y", check coerce::non_negative;
        name: String => "name";
        id: String => "id";
        color: Color => "color";
        sliced: bool => "sliced" = false;
        selected: bool => "selected" = false;
        description: String => "description";
        data_labels: Value => "dataLabels";
        custom: Value => "custom";
    }
}

impl DataPoint for SinglePoint {
    const DIMENSIONS: &'static [&'static [&'static str]] = &[&["y"], &["name", "y"]];
}

crate::define_node! {
    pub struct BubblePoint("series.bubble.data") {
        x: Value => "x", check coerce::number_or_string;
        y: f64 => "y";
        z: f64 => "z";
        name: String => "name";
        id: String => "id";
        color: Color => "color";
        description: String => "description";
        marker: Value => "marker";
        data_labels: Value => "dataLabels";
        custom: Value => "custom";
    }
}

impl DataPoint for BubblePoint {
    const DIMENSIONS: &'static [&'static [&'static str]] = &[&["y", "z"], &["x", "y", "z"]];
}

crate::define_node! {
    /// Box-and-whisker point.
    pub struct BoxPoint("series.boxplot.data") {
        x: Value => "x", check coerce::number_or_string;
        low: f64 => "low";
        q1: f64 => "q1";
        median: f64 => "median";
        q3: f64 => "q3";
        high: f64 => "high";
        name: String => "name";
        id: String => "id";
        color: Color => "color";
        description: String => "description";
        custom: Value => "custom";
    }
}

impl DataPoint for BoxPoint {
    const DIMENSIONS: &'static [&'static [&'static str]] = &[
        &["low", "q1", "median", "q3", "high"],
        &["x", "low", "q1", "median", "q3", "high"],
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object;

    #[test]
    fn test_from_item_shapes() {
        let bare = CartesianPoint::from_item(Value::from(4)).unwrap();
        assert_eq!(bare.y, Some(4.0));
        assert!(bare.x.is_none());

        let pair = CartesianPoint::from_item(Value::Array(vec![Value::from(1), Value::from(2)])).unwrap();
        assert_eq!(pair.x, Some(Value::from(1)));
        assert_eq!(pair.y, Some(2.0));

        let mapped = CartesianPoint::from_item(object! { "y" => 3, "name" => "n" }).unwrap();
        assert_eq!(mapped.name.as_deref(), Some("n"));
    }

    #[test]
    fn test_wrong_width_is_rejected() {
        let row = vec![Value::from(1), Value::from(2), Value::from(3)];
        let err = CartesianPoint::from_positional(&row).unwrap_err();
        assert!(err.is_value_error());
        assert!(RangePoint::from_positional(&row).is_ok());
    }

    #[test]
    fn test_compact_forms() {
        let y_only = CartesianPoint { y: Some(5.0), ..Default::default() };
        assert_eq!(y_only.compact(), Value::from(5));

        let xy = CartesianPoint { x: Some(Value::from(1)), y: Some(2.0), ..Default::default() };
        assert_eq!(xy.compact(), Value::Array(vec![Value::from(1), Value::from(2)]));

        let named = CartesianPoint { y: Some(2.0), name: Some("a".into()), ..Default::default() };
        assert_eq!(named.compact(), object! { "y" => 2, "name" => "a" });

        let slice = SinglePoint { y: Some(2.0), name: Some("a".into()), ..Default::default() };
        assert_eq!(slice.compact(), Value::Array(vec![Value::from("a"), Value::from(2)]));

        assert_eq!(CartesianPoint::default().compact(), Value::Null);
    }

    #[test]
    fn test_compact_round_trip() {
        let point = BoxPoint::from_item(Value::Array(
            [1, 2, 3, 4, 5].into_iter().map(Value::from).collect(),
        ))
        .unwrap();
        assert_eq!(point.median, Some(3.0));
        assert_eq!(BoxPoint::from_item(point.compact()).unwrap(), point);
    }
}
