//! Series nodes, their data points and the type-keyed series factory.

pub mod data;
pub mod points;
pub mod types;

use std::io::Read;
use std::path::Path;

use tracing::debug;

pub use data::{DataAccessor, DataInput, FieldAssignment, NumericArray, PointCollection, SeriesData};
pub use points::{BoxPoint, BubblePoint, CartesianPoint, DataPoint, RangePoint, SinglePoint};
pub use types::*;

use crate::coerce::FieldValue;
use crate::csv_reader::{self, CsvOptions};
use crate::data::{Frame, Table};
use crate::error::{ChartError, ChartResult};
use crate::ingest::{self, IngestOptions};
use crate::node::Node;
use crate::value::{Map, Value};

/// A node with a data collection and per-point attribute proxying.
pub trait SeriesNode: Node {
    type Point: DataPoint;

    fn data(&self) -> Option<&SeriesData<Self::Point>>;

    fn data_mut(&mut self) -> &mut Option<SeriesData<Self::Point>>;

    fn set_data(&mut self, input: DataInput<Self::Point>) -> ChartResult<()> {
        *self.data_mut() = Some(SeriesData::from_input(input)?);
        Ok(())
    }

    fn point_count(&self) -> usize {
        self.data().map_or(0, DataAccessor::len)
    }

    fn points(&self) -> ChartResult<Vec<Self::Point>> {
        self.data().map_or(Ok(Vec::new()), SeriesData::to_points)
    }

    /// Declared series fields first, then the per-point values of a point
    /// field.
    fn get_attr(&self, name: &str) -> ChartResult<Value> {
        if Self::has_field(name) {
            return self.get_field(name);
        }
        match self.data() {
            Some(data) => data.get_field(name).map(Value::Array),
            None => Err(ChartError::MissingAttribute {
                node: Self::NODE_NAME,
                name: name.to_owned(),
            }),
        }
    }

    /// Declared series fields go through their setter. Anything else is a
    /// point field: scalars broadcast, arrays zip by position.
    fn set_attr(&mut self, name: &str, value: Value) -> ChartResult<()> {
        if Self::has_field(name) {
            return self.set_field(name, value);
        }
        if !<Self::Point as Node>::has_field(name) {
            return Err(ChartError::UnknownField {
                node: Self::NODE_NAME,
                name: name.to_owned(),
            });
        }
        if let Some(data) = self.data_mut() {
            return data.set_field(name, FieldAssignment::from(value));
        }
        debug!(series = Self::NODE_NAME, field = name, "creating data for attribute write");
        let mut data = SeriesData::empty();
        data.set_field(name, FieldAssignment::from(value))?;
        *self.data_mut() = Some(data);
        Ok(())
    }

    fn from_table(table: &Table, options: &IngestOptions) -> ChartResult<Loaded<Self>> {
        ingest::load_series(table, options)
    }

    fn from_csv_str(text: &str, csv: &CsvOptions, options: &IngestOptions) -> ChartResult<Loaded<Self>> {
        Self::from_table(&csv_reader::read_str(text, csv)?, options)
    }

    fn from_csv_reader<R: Read>(
        reader: R,
        csv: &CsvOptions,
        options: &IngestOptions,
    ) -> ChartResult<Loaded<Self>> {
        Self::from_table(&csv_reader::read_table(reader, csv)?, options)
    }

    fn from_csv_path<P: AsRef<Path>>(
        path: P,
        csv: &CsvOptions,
        options: &IngestOptions,
    ) -> ChartResult<Loaded<Self>> {
        Self::from_table(&csv_reader::read_path(path, csv)?, options)
    }

    fn from_frame(frame: &Frame, options: &IngestOptions) -> ChartResult<Loaded<Self>> {
        Self::from_table(&frame.to_table(), options)
    }
}

/// Result of loading series from a table: one series or several.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<S> {
    Single(S),
    Many(Vec<S>),
}

impl<S> Loaded<S> {
    pub fn from_vec(mut series: Vec<S>) -> Self {
        if series.len() == 1 {
            if let Some(single) = series.pop() {
                return Loaded::Single(single);
            }
        }
        Loaded::Many(series)
    }

    pub fn len(&self) -> usize {
        match self {
            Loaded::Single(_) => 1,
            Loaded::Many(series) => series.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_vec(self) -> Vec<S> {
        match self {
            Loaded::Single(series) => vec![series],
            Loaded::Many(series) => series,
        }
    }

    pub fn map<T>(self, mut f: impl FnMut(S) -> T) -> Loaded<T> {
        match self {
            Loaded::Single(series) => Loaded::Single(f(series)),
            Loaded::Many(series) => Loaded::Many(series.into_iter().map(f).collect()),
        }
    }
}

/// Conversion into a typed series through the type-keyed factory.
pub trait IntoSeries {
    fn into_series(self) -> ChartResult<AnySeries>;
}

impl IntoSeries for AnySeries {
    fn into_series(self) -> ChartResult<AnySeries> {
        Ok(self)
    }
}

impl IntoSeries for Map {
    fn into_series(self) -> ChartResult<AnySeries> {
        AnySeries::from_map(self)
    }
}

impl IntoSeries for Value {
    fn into_series(self) -> ChartResult<AnySeries> {
        match self {
            Value::Object(map) => AnySeries::from_map(map),
            other => Err(ChartError::invalid(
                "series",
                format!("expected a series mapping, received {}", other.type_name()),
            )),
        }
    }
}

macro_rules! series_registry {
    ($($variant:ident($ty:ident) => $tag:literal),+ $(,)?) => {
        /// Any concrete series, keyed by its `type` discriminator.
        #[derive(Debug, Clone, PartialEq)]
        pub enum AnySeries {
            $($variant($ty)),+
        }

        /// Every series type the factory recognizes.
        pub const SERIES_TYPES: &[&str] = &[$($tag),+];

        $(
            impl From<$ty> for AnySeries {
                fn from(series: $ty) -> Self {
                    AnySeries::$variant(series)
                }
            }

            impl IntoSeries for $ty {
                fn into_series(self) -> ChartResult<AnySeries> {
                    Ok(AnySeries::$variant(self))
                }
            }
        )+

        impl AnySeries {
            pub fn series_type(&self) -> &'static str {
                match self {
                    $(AnySeries::$variant(_) => $tag),+
                }
            }

            /// Builds the series named by the mapping's `type` key.
            pub fn from_map(mapping: Map) -> ChartResult<Self> {
                let tag = match mapping.get("type") {
                    Some(Value::String(s)) => s.trim().to_ascii_lowercase(),
                    Some(other) => {
                        return Err(ChartError::invalid(
                            "type",
                            format!("expected a series type name, received {}", other.type_name()),
                        ))
                    }
                    None => {
                        return Err(ChartError::MissingDiscriminator {
                            field: "type",
                            context: "series mapping".to_owned(),
                        })
                    }
                };
                match tag.as_str() {
                    $($tag => $ty::from_map(mapping).map(AnySeries::$variant),)+
                    _ => Err(ChartError::UnknownSeriesType(tag.clone())),
                }
            }

            /// Empty series of the given type.
            pub fn of_type(series_type: &str) -> ChartResult<Self> {
                match series_type.trim().to_ascii_lowercase().as_str() {
                    $($tag => Ok(AnySeries::$variant($ty::default())),)+
                    other => Err(ChartError::UnknownSeriesType(other.to_owned())),
                }
            }

            /// Loads series of `series_type` from a table.
            pub fn load(
                series_type: &str,
                table: &Table,
                options: &IngestOptions,
            ) -> ChartResult<Loaded<Self>> {
                match series_type.trim().to_ascii_lowercase().as_str() {
                    $($tag => Ok($ty::from_table(table, options)?.map(AnySeries::$variant)),)+
                    other => Err(ChartError::UnknownSeriesType(other.to_owned())),
                }
            }

            pub fn to_mapping(&self) -> Map {
                match self {
                    $(AnySeries::$variant(s) => s.to_mapping()),+
                }
            }

            pub fn to_untrimmed(&self) -> Map {
                match self {
                    $(AnySeries::$variant(s) => s.to_untrimmed()),+
                }
            }

            pub fn to_literal_text(&self, careful_validation: bool) -> ChartResult<String> {
                match self {
                    $(AnySeries::$variant(s) => s.to_literal_text(careful_validation)),+
                }
            }

            pub fn to_json(&self) -> ChartResult<String> {
                match self {
                    $(AnySeries::$variant(s) => Node::to_json(s)),+
                }
            }

            pub fn get_field(&self, name: &str) -> ChartResult<Value> {
                match self {
                    $(AnySeries::$variant(s) => s.get_field(name)),+
                }
            }

            pub fn get_attr(&self, name: &str) -> ChartResult<Value> {
                match self {
                    $(AnySeries::$variant(s) => s.get_attr(name)),+
                }
            }

            pub fn set_attr(&mut self, name: &str, value: Value) -> ChartResult<()> {
                match self {
                    $(AnySeries::$variant(s) => s.set_attr(name, value)),+
                }
            }

            /// Replaces the data with `values`, one item per point.
            pub fn set_data(&mut self, values: Vec<Value>) -> ChartResult<()> {
                match self {
                    $(AnySeries::$variant(s) => s.set_data(DataInput::Values(values))),+
                }
            }

            pub fn point_count(&self) -> usize {
                match self {
                    $(AnySeries::$variant(s) => s.point_count()),+
                }
            }

            pub fn id(&self) -> Option<&str> {
                match self {
                    $(AnySeries::$variant(s) => s.id.as_deref()),+
                }
            }

            pub fn name(&self) -> Option<&str> {
                match self {
                    $(AnySeries::$variant(s) => s.name.as_deref()),+
                }
            }
        }
    };
}

series_registry! {
    Line(LineSeries) => "line",
    Spline(SplineSeries) => "spline",
    Area(AreaSeries) => "area",
    Column(ColumnSeries) => "column",
    Bar(BarSeries) => "bar",
    Scatter(ScatterSeries) => "scatter",
    AreaRange(AreaRangeSeries) => "arearange",
    ColumnRange(ColumnRangeSeries) => "columnrange",
    Pie(PieSeries) => "pie",
    Bubble(BubbleSeries) => "bubble",
    BoxPlot(BoxPlotSeries) => "boxplot",
}

impl FieldValue for AnySeries {
    fn from_value(value: Value, field: &str) -> ChartResult<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::Object(map) => AnySeries::from_map(map).map(Some),
            other => Err(ChartError::invalid(
                field,
                format!("expected a series mapping, received {}", other.type_name()),
            )),
        }
    }

    fn to_value(&self, trimmed: bool) -> Value {
        if trimmed {
            Value::Object(self.to_mapping())
        } else {
            Value::Object(self.to_untrimmed())
        }
    }
}
