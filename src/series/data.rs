//! Series data: a point sequence or a columnar collection.
//!
//! Both representations implement [`DataAccessor`], so per-point attribute
//! reads and writes behave identically whichever one a series holds.

use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexMap;

use super::points::DataPoint;
use crate::coerce::FieldValue;
use crate::error::{ChartError, ChartResult};
use crate::value::Value;

/// How a value is written to every point of a series.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldAssignment {
    /// The same value for every point.
    Broadcast(Value),
    /// One value per point, by position.
    PerPoint(Vec<Value>),
}

impl From<Value> for FieldAssignment {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => FieldAssignment::PerPoint(items),
            other => FieldAssignment::Broadcast(other),
        }
    }
}

/// Per-point attribute access shared by both data representations.
///
/// Writing obeys one set of rules:
/// - a broadcast onto empty data creates a single point;
/// - a per-point array longer than the data appends blank points;
/// - a per-point array shorter than the data sets the rest to `null`.
pub trait DataAccessor {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The field's value for every point, `null` where unset.
    fn get_field(&self, name: &str) -> ChartResult<Vec<Value>>;

    fn set_field(&mut self, name: &str, values: FieldAssignment) -> ChartResult<()>;
}

fn check_point_field<P: DataPoint>(name: &str) -> ChartResult<()> {
    if P::has_field(name) {
        Ok(())
    } else {
        Err(ChartError::MissingAttribute {
            node: P::NODE_NAME,
            name: name.to_owned(),
        })
    }
}

/// Target length and per-position values for an assignment.
fn expand(values: FieldAssignment, current: usize) -> Vec<Value> {
    match values {
        FieldAssignment::Broadcast(value) => vec![value; current.max(1)],
        FieldAssignment::PerPoint(mut items) => {
            if items.len() < current {
                items.resize(current, Value::Null);
            }
            items
        }
    }
}

impl<P: DataPoint> DataAccessor for Vec<P> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get_field(&self, name: &str) -> ChartResult<Vec<Value>> {
        check_point_field::<P>(name)?;
        self.iter().map(|point| point.get_field(name)).collect()
    }

    fn set_field(&mut self, name: &str, values: FieldAssignment) -> ChartResult<()> {
        check_point_field::<P>(name)?;
        let values = expand(values, Vec::len(self));

        // Work on a copy; the points stay untouched if any value is rejected.
        let mut points = self.clone();
        if values.len() > points.len() {
            points.resize_with(values.len(), P::default);
        }
        for (point, value) in points.iter_mut().zip(values) {
            point.set_field(name, value)?;
        }
        *self = points;
        Ok(())
    }
}

/// Columnar storage: one coerced value vector per point field.
#[derive(Clone)]
pub struct PointCollection<P> {
    columns: IndexMap<&'static str, Vec<Value>>,
    len: usize,
    _point: PhantomData<P>,
}

impl<P> Default for PointCollection<P> {
    fn default() -> Self {
        Self {
            columns: IndexMap::new(),
            len: 0,
            _point: PhantomData,
        }
    }
}

impl<P: DataPoint> PointCollection<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns of `array` map onto the point layout of matching width.
    pub fn from_array(array: &NumericArray) -> ChartResult<Self> {
        let layout = P::layout_for_width(array.width()).ok_or_else(|| {
            ChartError::invalid(
                "data",
                format!(
                    "{} accepts arrays of width {:?}, received width {}",
                    P::NODE_NAME,
                    P::widths(),
                    array.width()
                ),
            )
        })?;
        let mut collection = Self::new();
        for (idx, name) in layout.iter().enumerate() {
            let column = array.column(idx).map(Value::Number).collect();
            collection.set_field(name, FieldAssignment::PerPoint(column))?;
        }
        Ok(collection)
    }

    /// Canonical internal name for a point field.
    fn field_key(name: &str) -> ChartResult<&'static str> {
        P::FIELDS
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.name)
            .ok_or_else(|| ChartError::MissingAttribute {
                node: P::NODE_NAME,
                name: name.to_owned(),
            })
    }

    /// Materializes the collection as point nodes.
    pub fn to_points(&self) -> ChartResult<Vec<P>> {
        let mut points = vec![P::default(); self.len];
        for (name, column) in &self.columns {
            for (point, value) in points.iter_mut().zip(column) {
                point.set_field(name, value.clone())?;
            }
        }
        Ok(points)
    }
}

impl<P: DataPoint> DataAccessor for PointCollection<P> {
    fn len(&self) -> usize {
        self.len
    }

    fn get_field(&self, name: &str) -> ChartResult<Vec<Value>> {
        let key = Self::field_key(name)?;
        Ok(self
            .columns
            .get(key)
            .cloned()
            .unwrap_or_else(|| vec![Value::Null; self.len]))
    }

    fn set_field(&mut self, name: &str, values: FieldAssignment) -> ChartResult<()> {
        let key = Self::field_key(name)?;
        let values = expand(values, self.len);

        // Coerce through a scratch point so stored values match what a
        // point sequence would hold.
        let mut scratch = P::default();
        let mut column = Vec::with_capacity(values.len());
        for value in values {
            scratch.set_field(key, value)?;
            column.push(scratch.get_field(key)?);
        }

        if column.len() > self.len {
            self.len = column.len();
            for existing in self.columns.values_mut() {
                existing.resize(self.len, Value::Null);
            }
        }
        self.columns.insert(key, column);
        Ok(())
    }
}

/// A rectangular block of numbers, one row per point.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    width: usize,
    values: Vec<f64>,
}

impl NumericArray {
    pub fn from_rows(rows: Vec<Vec<f64>>) -> ChartResult<Self> {
        let width = rows.first().map_or(0, Vec::len);
        let mut values = Vec::with_capacity(width * rows.len());
        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(ChartError::invalid(
                    "data",
                    format!("row {idx} has {} values, expected {width}", row.len()),
                ));
            }
            values.extend(row);
        }
        Ok(Self { width, values })
    }

    /// Single-column array.
    pub fn from_column(values: Vec<f64>) -> Self {
        Self { width: 1, values }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn rows(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.values.len() / self.width
        }
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().skip(idx).step_by(self.width.max(1)).copied()
    }
}

/// Input accepted by `SeriesNode::set_data`.
#[derive(Debug, Clone)]
pub enum DataInput<P> {
    /// Bare values, positional arrays or per-point mappings.
    Values(Vec<Value>),
    Points(Vec<P>),
    Array(NumericArray),
}

impl<P> DataInput<P> {
    pub fn values<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        DataInput::Values(items.into_iter().map(Into::into).collect())
    }
}

/// The data a series holds. Exactly one representation is active.
#[derive(Clone)]
pub enum SeriesData<P> {
    Points(Vec<P>),
    Columns(PointCollection<P>),
}

impl<P: DataPoint> SeriesData<P> {
    /// Empty data in the representation lazily created by attribute writes.
    pub fn empty() -> Self {
        if cfg!(feature = "columnar") {
            SeriesData::Columns(PointCollection::new())
        } else {
            SeriesData::Points(Vec::new())
        }
    }

    pub fn from_values(items: Vec<Value>) -> ChartResult<Self> {
        items
            .into_iter()
            .map(P::from_item)
            .collect::<ChartResult<Vec<_>>>()
            .map(SeriesData::Points)
    }

    pub fn from_array(array: &NumericArray) -> ChartResult<Self> {
        if !cfg!(feature = "columnar") {
            return Err(ChartError::Dependency("columnar"));
        }
        PointCollection::from_array(array).map(SeriesData::Columns)
    }

    pub fn from_input(input: DataInput<P>) -> ChartResult<Self> {
        match input {
            DataInput::Values(items) => Self::from_values(items),
            DataInput::Points(points) => Ok(SeriesData::Points(points)),
            DataInput::Array(array) => Self::from_array(&array),
        }
    }

    pub fn is_columnar(&self) -> bool {
        matches!(self, SeriesData::Columns(_))
    }

    pub fn to_points(&self) -> ChartResult<Vec<P>> {
        match self {
            SeriesData::Points(points) => Ok(points.clone()),
            SeriesData::Columns(collection) => collection.to_points(),
        }
    }

    /// Compact per-point values, built by the same rule for both
    /// representations.
    pub fn compact_rows(&self) -> Vec<Value> {
        match self {
            SeriesData::Points(points) => points.iter().map(DataPoint::compact).collect(),
            SeriesData::Columns(collection) => collection
                .to_points()
                .map(|points| points.iter().map(DataPoint::compact).collect())
                .unwrap_or_default(),
        }
    }
}

impl<P: DataPoint> DataAccessor for SeriesData<P> {
    fn len(&self) -> usize {
        match self {
            SeriesData::Points(points) => points.len(),
            SeriesData::Columns(collection) => collection.len(),
        }
    }

    fn get_field(&self, name: &str) -> ChartResult<Vec<Value>> {
        match self {
            SeriesData::Points(points) => points.get_field(name),
            SeriesData::Columns(collection) => collection.get_field(name),
        }
    }

    fn set_field(&mut self, name: &str, values: FieldAssignment) -> ChartResult<()> {
        match self {
            SeriesData::Points(points) => points.set_field(name, values),
            SeriesData::Columns(collection) => collection.set_field(name, values),
        }
    }
}

impl<P: DataPoint> fmt::Debug for SeriesData<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_columnar() { "Columns" } else { "Points" };
        write!(f, "{kind}({} points)", self.len())
    }
}

impl<P: DataPoint> FieldValue for SeriesData<P> {
    fn from_value(value: Value, field: &str) -> ChartResult<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::Array(items) => Self::from_values(items).map(Some),
            other => Err(ChartError::invalid(
                field,
                format!("expected an array of points, received {}", other.type_name()),
            )),
        }
    }

    fn to_value(&self, _trimmed: bool) -> Value {
        Value::Array(self.compact_rows())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::points::CartesianPoint;

    fn points(ys: &[f64]) -> Vec<CartesianPoint> {
        ys.iter()
            .map(|y| CartesianPoint { y: Some(*y), ..Default::default() })
            .collect()
    }

    #[test]
    fn test_broadcast_and_zip_on_points() {
        let mut data = points(&[1.0, 2.0, 3.0]);
        data.set_field("name", FieldAssignment::Broadcast(Value::from("s"))).unwrap();
        assert_eq!(data.get_field("name").unwrap(), vec![Value::from("s"); 3]);

        data.set_field("x", FieldAssignment::PerPoint(vec![Value::from(10)])).unwrap();
        assert_eq!(
            data.get_field("x").unwrap(),
            vec![Value::from(10), Value::Null, Value::Null]
        );

        data.set_field("y", FieldAssignment::PerPoint((0..5).map(Value::from).collect()))
            .unwrap();
        assert_eq!(DataAccessor::len(&data), 5);
    }

    #[test]
    fn test_collection_matches_points() {
        let mut seq = points(&[1.0, 2.0]);
        let mut cols = PointCollection::<CartesianPoint>::new();
        cols.set_field("y", FieldAssignment::PerPoint(vec![Value::from(1), Value::from(2)]))
            .unwrap();

        for data in [&mut seq as &mut dyn DataAccessor, &mut cols] {
            data.set_field("x", FieldAssignment::PerPoint(vec![Value::from(5)])).unwrap();
            data.set_field("name", FieldAssignment::Broadcast(Value::from("n"))).unwrap();
        }

        assert_eq!(seq.get_field("x").unwrap(), cols.get_field("x").unwrap());
        assert_eq!(seq.get_field("y").unwrap(), cols.get_field("y").unwrap());
        assert_eq!(
            SeriesData::Points(seq).compact_rows(),
            SeriesData::Columns(cols).compact_rows()
        );
    }

    #[test]
    fn test_collection_coerces_values() {
        let mut cols = PointCollection::<CartesianPoint>::new();
        cols.set_field("y", FieldAssignment::PerPoint(vec![Value::from("1,500")]))
            .unwrap();
        assert_eq!(cols.get_field("y").unwrap(), vec![Value::from(1500)]);
        assert!(cols
            .set_field("y", FieldAssignment::Broadcast(Value::from("abc")))
            .is_err());
    }

    #[test]
    fn test_rejected_assignment_leaves_both_representations_unchanged() {
        let mut seq = points(&[1.0, 2.0]);
        let mut cols = PointCollection::<CartesianPoint>::new();
        cols.set_field("y", FieldAssignment::PerPoint(vec![Value::from(1), Value::from(2)]))
            .unwrap();

        let bad = vec![Value::from(7), Value::from(8), Value::from("abc")];
        for data in [&mut seq as &mut dyn DataAccessor, &mut cols] {
            let err = data.set_field("y", FieldAssignment::PerPoint(bad.clone())).unwrap_err();
            assert!(err.is_value_error());
            assert_eq!(data.len(), 2);
            assert_eq!(data.get_field("y").unwrap(), vec![Value::from(1), Value::from(2)]);
        }
        assert_eq!(seq, points(&[1.0, 2.0]));
    }

    #[test]
    fn test_unknown_point_field() {
        let mut data = points(&[1.0]);
        let err = data.set_field("low", FieldAssignment::Broadcast(Value::from(1))).unwrap_err();
        assert!(matches!(err, ChartError::MissingAttribute { .. }));
    }

    #[test]
    fn test_broadcast_onto_empty_creates_one_point() {
        let mut cols = PointCollection::<CartesianPoint>::new();
        cols.set_field("y", FieldAssignment::Broadcast(Value::from(3))).unwrap();
        assert_eq!(cols.len(), 1);
        let mut seq: Vec<CartesianPoint> = Vec::new();
        seq.set_field("y", FieldAssignment::Broadcast(Value::from(3))).unwrap();
        assert_eq!(DataAccessor::len(&seq), 1);
    }

    #[test]
    fn test_numeric_array() {
        let array = NumericArray::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(array.rows(), 2);
        assert_eq!(array.column(1).collect::<Vec<_>>(), vec![2.0, 4.0]);
        assert!(NumericArray::from_rows(vec![vec![1.0], vec![1.0, 2.0]]).is_err());
    }

    #[cfg(feature = "columnar")]
    #[test]
    fn test_series_data_from_array() {
        let array = NumericArray::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let data = SeriesData::<CartesianPoint>::from_array(&array).unwrap();
        assert!(data.is_columnar());
        assert_eq!(data.get_field("x").unwrap(), vec![Value::from(1), Value::from(3)]);
        assert_eq!(format!("{data:?}"), "Columns(2 points)");
    }

    #[test]
    fn test_debug_omits_points() {
        let data = SeriesData::Points(points(&[1.0, 2.0, 3.0]));
        assert_eq!(format!("{data:?}"), "Points(3 points)");
    }
}
