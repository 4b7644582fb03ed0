//! Reshapes tables into series.
//!
//! Three strategies, chosen from [`IngestOptions`]:
//!
//! - an explicit property map from point fields to columns;
//! - series in rows, one series per row;
//! - otherwise a column-count heuristic:
//!   1. a column count matching one of the point's positional layouts gives
//!      one series;
//!   2. otherwise column 0 is an index column, and the remaining `R` columns
//!      either match a layout (one series, index values become point names)
//!      or are split into `R / k` series sharing `x` from the index, using the
//!      widest `x`-leading layout whose `k` value fields divide `R`;
//!   3. otherwise the columns are split into contiguous blocks of the widest
//!      layout that divides the column count;
//!   4. otherwise loading fails and a property map is required.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::data::Table;
use crate::error::{ChartError, ChartResult};
use crate::node::Node;
use crate::series::{DataInput, DataPoint, Loaded, SeriesNode};
use crate::value::{format_number, Value};

/// A column, by position or by header label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnRef {
    Index(usize),
    Label(String),
}

impl ColumnRef {
    /// Digits are a position, anything else a label.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text.parse::<usize>() {
            Ok(idx) => ColumnRef::Index(idx),
            Err(_) => ColumnRef::Label(text.to_owned()),
        }
    }

    fn resolve(&self, table: &Table) -> ChartResult<usize> {
        match self {
            ColumnRef::Index(idx) if *idx < table.width() => Ok(*idx),
            ColumnRef::Index(idx) => Err(ChartError::Deserialization(format!(
                "column {idx} is out of range for a table of {} columns",
                table.width()
            ))),
            ColumnRef::Label(label) => {
                if table.headers.is_none() {
                    return Err(ChartError::Deserialization(format!(
                        "column label '{label}' needs a header row"
                    )));
                }
                table.column_index(label).ok_or_else(|| {
                    ChartError::Deserialization(format!("no column labelled '{label}'"))
                })
            }
        }
    }
}

impl From<usize> for ColumnRef {
    fn from(idx: usize) -> Self {
        ColumnRef::Index(idx)
    }
}

impl From<&str> for ColumnRef {
    fn from(label: &str) -> Self {
        ColumnRef::Label(label.to_owned())
    }
}

/// Columns feeding one point property. A list of N > 1 columns produces N
/// series.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnMapping {
    One(ColumnRef),
    Many(Vec<ColumnRef>),
}

impl ColumnMapping {
    /// Comma-separated column references, e.g. `1,2,3` or `Year`.
    pub fn parse(text: &str) -> Self {
        let mut refs: Vec<ColumnRef> = text.split(',').map(ColumnRef::parse).collect();
        if refs.len() == 1 {
            ColumnMapping::One(refs.remove(0))
        } else {
            ColumnMapping::Many(refs)
        }
    }

    fn refs(&self) -> &[ColumnRef] {
        match self {
            ColumnMapping::One(r) => std::slice::from_ref(r),
            ColumnMapping::Many(refs) => refs,
        }
    }
}

impl From<ColumnRef> for ColumnMapping {
    fn from(r: ColumnRef) -> Self {
        ColumnMapping::One(r)
    }
}

impl From<usize> for ColumnMapping {
    fn from(idx: usize) -> Self {
        ColumnMapping::One(ColumnRef::Index(idx))
    }
}

impl From<&str> for ColumnMapping {
    fn from(label: &str) -> Self {
        ColumnMapping::One(ColumnRef::from(label))
    }
}

impl From<Vec<ColumnRef>> for ColumnMapping {
    fn from(refs: Vec<ColumnRef>) -> Self {
        ColumnMapping::Many(refs)
    }
}

impl From<Vec<usize>> for ColumnMapping {
    fn from(refs: Vec<usize>) -> Self {
        ColumnMapping::Many(refs.into_iter().map(ColumnRef::Index).collect())
    }
}

impl From<Vec<&str>> for ColumnMapping {
    fn from(refs: Vec<&str>) -> Self {
        ColumnMapping::Many(refs.into_iter().map(ColumnRef::from).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IngestOptions {
    /// Point property to column(s).
    pub property_map: Option<IndexMap<String, ColumnMapping>>,
    /// Each row is a series instead of each column group.
    pub series_in_rows: bool,
    /// Names applied to the resulting series in order.
    pub series_names: Option<Vec<String>>,
}

impl IngestOptions {
    pub fn with_property(mut self, property: impl Into<String>, columns: impl Into<ColumnMapping>) -> Self {
        self.property_map
            .get_or_insert_with(IndexMap::new)
            .insert(property.into(), columns.into());
        self
    }

    /// Parses `property=columns`, e.g. `y=1,2,3`.
    pub fn parse_property(spec: &str) -> ChartResult<(String, ColumnMapping)> {
        let (property, columns) = spec.split_once('=').ok_or_else(|| {
            ChartError::invalid("map", format!("expected property=columns, received '{spec}'"))
        })?;
        let property = property.trim();
        if property.is_empty() || columns.trim().is_empty() {
            return Err(ChartError::invalid(
                "map",
                format!("expected property=columns, received '{spec}'"),
            ));
        }
        Ok((property.to_owned(), ColumnMapping::parse(columns)))
    }
}

/// How one series is cut from the table.
#[derive(Debug, Clone, PartialEq)]
struct SeriesPlan {
    name: Option<String>,
    fields: Vec<(&'static str, usize)>,
    /// Column whose values become point names.
    point_names: Option<usize>,
}

/// Loads series of type `S` from `table`.
pub fn load_series<S: SeriesNode>(table: &Table, options: &IngestOptions) -> ChartResult<Loaded<S>> {
    if table.is_empty() {
        return Err(ChartError::Deserialization("table has no data".into()));
    }

    let series = if options.series_in_rows {
        series_from_rows::<S>(table)?
    } else {
        let plans = match &options.property_map {
            Some(map) => plan_from_property_map::<S::Point>(table, map)?,
            None => plan_from_heuristic::<S::Point>(table)?,
        };
        plans
            .iter()
            .map(|plan| build_series::<S>(table, plan))
            .collect::<ChartResult<Vec<_>>>()?
    };

    let series = apply_names(series, options.series_names.as_deref())?;
    Ok(Loaded::from_vec(series))
}

fn apply_names<S: SeriesNode>(mut series: Vec<S>, names: Option<&[String]>) -> ChartResult<Vec<S>> {
    let Some(names) = names else {
        return Ok(series);
    };
    if names.len() != series.len() {
        warn!(
            names = names.len(),
            series = series.len(),
            "series name count does not match series count"
        );
    }
    for (s, name) in series.iter_mut().zip(names) {
        s.set_field("name", Value::from(name.as_str()))?;
    }
    Ok(series)
}

/// Internal name of a point property, accepting its wire key too.
fn point_field<P: DataPoint>(property: &str) -> ChartResult<&'static str> {
    P::FIELDS
        .iter()
        .find(|spec| spec.name == property)
        .map(|spec| spec.name)
        .or_else(|| P::internal_name(property))
        .ok_or_else(|| ChartError::UnknownField {
            node: P::NODE_NAME,
            name: property.to_owned(),
        })
}

fn plan_from_property_map<P: DataPoint>(
    table: &Table,
    map: &IndexMap<String, ColumnMapping>,
) -> ChartResult<Vec<SeriesPlan>> {
    let mut resolved: Vec<(&'static str, Vec<usize>)> = Vec::with_capacity(map.len());
    let mut count: Option<(usize, &str)> = None;

    for (property, mapping) in map {
        let field = point_field::<P>(property)?;
        let refs = mapping.refs();
        if refs.is_empty() {
            return Err(ChartError::Deserialization(format!(
                "property '{property}' maps to no columns"
            )));
        }
        if refs.len() > 1 {
            match count {
                None => count = Some((refs.len(), property.as_str())),
                Some((n, first)) if n != refs.len() => {
                    return Err(ChartError::Deserialization(format!(
                        "column lists differ in length: '{first}' has {n}, '{property}' has {}",
                        refs.len()
                    )))
                }
                Some(_) => {}
            }
        }
        let columns = refs
            .iter()
            .map(|r| r.resolve(table))
            .collect::<ChartResult<Vec<_>>>()?;
        resolved.push((field, columns));
    }

    let series_count = count.map_or(1, |(n, _)| n);
    let plans = (0..series_count)
        .map(|i| {
            let fields: Vec<(&'static str, usize)> = resolved
                .iter()
                .map(|(field, columns)| (*field, if columns.len() > 1 { columns[i] } else { columns[0] }))
                .collect();
            let name = resolved
                .iter()
                .find(|(_, columns)| columns.len() > 1)
                .and_then(|(_, columns)| table.header(columns[i]))
                .map(str::to_owned);
            SeriesPlan {
                name,
                fields,
                point_names: None,
            }
        })
        .collect();
    Ok(plans)
}

fn positional(layout: &[&'static str], first_column: usize) -> Vec<(&'static str, usize)> {
    layout
        .iter()
        .enumerate()
        .map(|(offset, field)| (*field, first_column + offset))
        .collect()
}

fn plan_from_heuristic<P: DataPoint>(table: &Table) -> ChartResult<Vec<SeriesPlan>> {
    let columns = table.width();

    // 1. every column is positional
    if let Some(layout) = P::layout_for_width(columns) {
        debug!(columns, "columns match a point layout, loading one series");
        return Ok(vec![SeriesPlan {
            name: table.header(0).map(str::to_owned),
            fields: positional(layout, 0),
            point_names: None,
        }]);
    }

    // 2. column 0 is the index
    if columns >= 2 {
        let remaining = columns - 1;
        if let Some(layout) = P::layout_for_width(remaining) {
            debug!(columns, "index column plus one point layout, loading one series");
            return Ok(vec![SeriesPlan {
                name: table.header(1).map(str::to_owned),
                fields: positional(layout, 1),
                point_names: P::has_field("name").then_some(0),
            }]);
        }

        let shared_x = P::DIMENSIONS
            .iter()
            .filter(|layout| layout.len() >= 2 && layout[0] == "x")
            .filter(|layout| remaining % (layout.len() - 1) == 0)
            .max_by_key(|layout| layout.len());
        if let Some(layout) = shared_x {
            let k = layout.len() - 1;
            debug!(columns, per_series = k, "splitting columns into series sharing the index as x");
            return Ok((0..remaining / k)
                .map(|s| {
                    let first = 1 + s * k;
                    let mut fields = vec![("x", 0)];
                    fields.extend(positional(&layout[1..], first));
                    SeriesPlan {
                        name: table.header(first).map(str::to_owned),
                        fields,
                        point_names: None,
                    }
                })
                .collect());
        }
    }

    // 3. contiguous blocks
    let block = P::DIMENSIONS
        .iter()
        .filter(|layout| layout.len() >= 2 && columns % layout.len() == 0)
        .max_by_key(|layout| layout.len());
    if let Some(layout) = block {
        let d = layout.len();
        debug!(columns, block = d, "splitting columns into contiguous blocks");
        return Ok((0..columns / d)
            .map(|s| SeriesPlan {
                name: table.header(s * d).map(str::to_owned),
                fields: positional(layout, s * d),
                point_names: None,
            })
            .collect());
    }

    Err(ChartError::Deserialization(format!(
        "cannot split {columns} columns into {} points (layouts of width {:?}); supply a property map",
        P::NODE_NAME,
        P::widths()
    )))
}

fn cell_text(cell: Option<&Value>) -> Option<String> {
    match cell? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(format_number(*n)),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn build_series<S: SeriesNode>(table: &Table, plan: &SeriesPlan) -> ChartResult<S> {
    let mut points = Vec::with_capacity(table.height());
    for row in &table.rows {
        let mut point = S::Point::default();
        for (field, column) in &plan.fields {
            point.set_field(field, row.get(*column).cloned().unwrap_or_default())?;
        }
        if let Some(name) = plan.point_names.and_then(|column| cell_text(row.get(column))) {
            point.set_field("name", Value::String(name))?;
        }
        points.push(point);
    }

    let mut series = S::default();
    series.set_data(DataInput::Points(points))?;
    if let Some(name) = &plan.name {
        series.set_field("name", Value::from(name.as_str()))?;
    }
    Ok(series)
}

/// Each row is a series named by its first cell; header cells after the
/// first are the shared x values (or point names for types without x).
/// Every cell is one point, so the point type needs a single-value layout.
fn series_from_rows<S: SeriesNode>(table: &Table) -> ChartResult<Vec<S>> {
    let Some(&[value_field]) = <S::Point as DataPoint>::layout_for_width(1) else {
        return Err(ChartError::Deserialization(format!(
            "{} points need {:?} values each, so a row of cells cannot hold its series; use a property map",
            S::TYPE_TAG.unwrap_or(S::NODE_NAME),
            <S::Point as DataPoint>::widths(),
        )));
    };
    let categories: Option<Vec<Value>> = table
        .headers
        .as_ref()
        .map(|headers| headers.iter().skip(1).map(|h| crate::csv_reader::parse_cell(h, None)).collect());
    let category_field = if <S::Point as Node>::has_field("x") {
        Some("x")
    } else if <S::Point as Node>::has_field("name") {
        Some("name")
    } else {
        None
    };

    table
        .rows
        .iter()
        .map(|row| {
            let mut points = Vec::with_capacity(row.len().saturating_sub(1));
            for (idx, cell) in row.iter().skip(1).enumerate() {
                let mut point = S::Point::default();
                if let (Some(field), Some(categories)) = (category_field, &categories) {
                    if let Some(category) = categories.get(idx) {
                        point.set_field(field, category.clone())?;
                    }
                }
                point.set_field(value_field, cell.clone())?;
                points.push(point);
            }
            let mut series = S::default();
            series.set_data(DataInput::Points(points))?;
            if let Some(name) = cell_text(row.first()) {
                series.set_field("name", Value::String(name))?;
            }
            Ok(series)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_reader::{read_str, CsvOptions};
    use crate::series::{AreaRangeSeries, BoxPlotSeries, LineSeries, PieSeries};

    fn headerless(text: &str) -> Table {
        let options = CsvOptions {
            has_header: false,
            ..Default::default()
        };
        read_str(text, &options).unwrap()
    }

    fn headed(text: &str) -> Table {
        read_str(text, &CsvOptions::default()).unwrap()
    }

    #[test]
    fn test_index_column_becomes_point_names() {
        let table = headerless("A,1,2\nB,3,4\n");
        let loaded = load_series::<LineSeries>(&table, &IngestOptions::default()).unwrap();
        let Loaded::Single(series) = loaded else {
            panic!("Expected a single series");
        };
        assert_eq!(series.point_count(), 2);
        assert_eq!(
            series.get_attr("x").unwrap(),
            Value::Array(vec![Value::from(1), Value::from(3)])
        );
        assert_eq!(
            series.get_attr("y").unwrap(),
            Value::Array(vec![Value::from(2), Value::from(4)])
        );
        assert_eq!(
            series.get_attr("name").unwrap(),
            Value::Null,
            "series name comes from a header, and there is none"
        );
        let names: Vec<_> = series.points().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec![Some("A".to_string()), Some("B".to_string())]);
    }

    #[test]
    fn test_columns_matching_layout_load_one_series() {
        let table = headed("x,y\n1,2\n3,4\n");
        let loaded = load_series::<LineSeries>(&table, &IngestOptions::default()).unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_shared_index_split() {
        let table = headed("year,north,south,east\n2020,1,2,3\n2021,4,5,6\n");
        let loaded = load_series::<LineSeries>(&table, &IngestOptions::default()).unwrap();
        let series = loaded.into_vec();
        assert_eq!(series.len(), 3);
        assert_eq!(series[1].name.as_deref(), Some("south"));
        for s in &series {
            assert_eq!(
                s.get_attr("x").unwrap(),
                Value::Array(vec![Value::from(2020), Value::from(2021)])
            );
        }
    }

    #[test]
    fn test_contiguous_blocks() {
        // Index column plus [x, low, high]
        let table = headerless("1,2,3,4\n5,6,7,8\n");
        let loaded = load_series::<AreaRangeSeries>(&table, &IngestOptions::default()).unwrap();
        assert!(matches!(loaded, Loaded::Single(_)));

        let table = headerless("1,2,3,4,5,6,7,8,9,10,11,12\n");
        let loaded = load_series::<BoxPlotSeries>(&table, &IngestOptions::default()).unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_unsplittable_columns() {
        let table = headerless("1,2,3,4\n");
        let err = load_series::<BoxPlotSeries>(&table, &IngestOptions::default()).unwrap_err();
        assert!(matches!(err, ChartError::Deserialization(_)));
    }

    #[test]
    fn test_property_map_one_series_per_column() {
        let table = headerless("0,1,2,3\n1,4,5,6\n");
        let options = IngestOptions::default()
            .with_property("x", 0usize)
            .with_property("y", vec![1usize, 2, 3]);
        let series = load_series::<LineSeries>(&table, &options).unwrap().into_vec();
        assert_eq!(series.len(), 3);
        let xs: Vec<_> = series.iter().map(|s| s.get_attr("x").unwrap()).collect();
        assert!(xs.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(
            series[2].get_attr("y").unwrap(),
            Value::Array(vec![Value::from(3), Value::from(6)])
        );
    }

    #[test]
    fn test_property_map_length_mismatch() {
        let table = headerless("0,1,2,3\n");
        let options = IngestOptions::default()
            .with_property("low", vec![0usize, 1])
            .with_property("high", vec![1usize, 2, 3]);
        let err = load_series::<AreaRangeSeries>(&table, &options).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("low") && message.contains("high"), "{message}");
    }

    #[test]
    fn test_label_without_header() {
        let table = headerless("1,2\n");
        let options = IngestOptions::default().with_property("y", "value");
        let err = load_series::<LineSeries>(&table, &options).unwrap_err();
        assert!(matches!(err, ChartError::Deserialization(_)));
    }

    #[test]
    fn test_property_map_labels_and_unknown_property() {
        let table = headed("when,value\n1,10\n2,20\n");
        let options = IngestOptions::default()
            .with_property("x", "when")
            .with_property("y", "value");
        let Loaded::Single(series) = load_series::<LineSeries>(&table, &options).unwrap() else {
            panic!("Expected a single series");
        };
        assert_eq!(series.point_count(), 2);

        let options = IngestOptions::default().with_property("radius", 1usize);
        let err = load_series::<LineSeries>(&table, &options).unwrap_err();
        assert!(err.is_value_error());
    }

    #[test]
    fn test_series_in_rows() {
        let table = headed("fruit,2020,2021\napples,1,2\npears,3,4\n");
        let options = IngestOptions {
            series_in_rows: true,
            ..Default::default()
        };
        let series = load_series::<LineSeries>(&table, &options).unwrap().into_vec();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name.as_deref(), Some("apples"));
        assert_eq!(
            series[1].get_attr("x").unwrap(),
            Value::Array(vec![Value::from(2020), Value::from(2021)])
        );

        let pies = load_series::<PieSeries>(&table, &options).unwrap().into_vec();
        assert_eq!(
            pies[0].get_attr("name").unwrap(),
            Value::from("apples"),
            "declared series field wins over point field"
        );
    }

    #[test]
    fn test_series_in_rows_needs_single_value_points() {
        let table = headed("station,jan,feb\nnorth,1,2\n");
        let options = IngestOptions {
            series_in_rows: true,
            ..Default::default()
        };
        let err = load_series::<AreaRangeSeries>(&table, &options).unwrap_err();
        assert!(matches!(&err, ChartError::Deserialization(msg) if msg.contains("arearange")));
        let err = load_series::<BoxPlotSeries>(&table, &options).unwrap_err();
        assert!(matches!(&err, ChartError::Deserialization(msg) if msg.contains("boxplot")));
    }

    #[test]
    fn test_series_names_override() {
        let table = headed("year,a,b,c\n1,2,3,4\n");
        let options = IngestOptions {
            series_names: Some(vec!["first".into(), "second".into(), "third".into()]),
            ..Default::default()
        };
        let series = load_series::<LineSeries>(&table, &options).unwrap().into_vec();
        assert_eq!(series[0].name.as_deref(), Some("first"));
        assert_eq!(series[1].name.as_deref(), Some("second"));
    }

    #[test]
    fn test_parse_property() {
        let (prop, mapping) = IngestOptions::parse_property("y=1,Sales, 3").unwrap();
        assert_eq!(prop, "y");
        assert_eq!(
            mapping,
            ColumnMapping::Many(vec![
                ColumnRef::Index(1),
                ColumnRef::Label("Sales".into()),
                ColumnRef::Index(3),
            ])
        );
        assert!(IngestOptions::parse_property("y").is_err());
    }
}
