//! Concrete series types.

use super::data::SeriesData;
use super::points::{BoxPoint, BubblePoint, CartesianPoint, RangePoint, SinglePoint};
use super::SeriesNode;
use crate::callback::CallbackFunction;
use crate::coerce::{self, DashStyle};
use crate::color::Color;
use crate::value::Value;

crate::string_enum! {
    pub enum Stacking {
        Normal => "normal",
        Percent => "percent",
        Stream => "stream",
        Overlap => "overlap",
    }
}

crate::string_enum! {
    pub enum SizeBy { Area => "area", Width => "width" }
}

crate::define_node! {
    pub struct SeriesEvents("plotOptions.series.events") {
        click: CallbackFunction => "click";
        hide: CallbackFunction => "hide";
        show: CallbackFunction => "show";
        legend_item_click: CallbackFunction => "legendItemClick";
        mouse_over: CallbackFunction => "mouseOver";
        mouse_out: CallbackFunction => "mouseOut";
        after_animate: CallbackFunction => "afterAnimate";
    }
}

/// Declares a series type: the fields every series shares, the type's own
/// fields, and a `data` field holding points of `$point`.
macro_rules! series_node {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($path:literal, $tag:literal, $point:ident) { $($fields:tt)* }
    ) => {
        crate::define_node! {
            $(#[$meta])*
            pub struct $name($path) tagged $tag {
                id: String => "id";
                name: String => "name";
                index: i64 => "index";
                legend_index: i64 => "legendIndex";
                x_axis: Value => "xAxis", check coerce::number_or_string;
                y_axis: Value => "yAxis", check coerce::number_or_string;
                z_index: i64 => "zIndex";
                stacking: Stacking => "stacking";
                color: Color => "color";
                visible: bool => "visible" = true;
                show_in_legend: bool => "showInLegend";
                class_name: String => "className";
                description: String => "description";
                opacity: f64 => "opacity" = 1, check coerce::unit_interval;
                cursor: String => "cursor";
                enable_mouse_tracking: bool => "enableMouseTracking" = true;
                animation: Value => "animation";
                marker: Value => "marker";
                data_labels: Value => "dataLabels";
                tooltip: Value => "tooltip";
                events: SeriesEvents => "events";
                custom: Value => "custom";
                $($fields)*
                data: SeriesData<$point> => "data";
            }
        }

        impl SeriesNode for $name {
            type Point = $point;

            fn data(&self) -> Option<&SeriesData<$point>> {
                self.data.as_ref()
            }

            fn data_mut(&mut self) -> &mut Option<SeriesData<$point>> {
                &mut self.data
            }
        }
    };
}

series_node! {
    pub struct LineSeries("series.line", "line", CartesianPoint) {
        dash_style: DashStyle => "dashStyle";
        line_width: f64 => "lineWidth" = 2, check coerce::non_negative;
        step: Value => "step";
        connect_nulls: bool => "connectNulls" = false;
    }
}

series_node! {
    pub struct SplineSeries("series.spline", "spline", CartesianPoint) {
        dash_style: DashStyle => "dashStyle";
        line_width: f64 => "lineWidth" = 2, check coerce::non_negative;
        connect_nulls: bool => "connectNulls" = false;
    }
}

series_node! {
    pub struct AreaSeries("series.area", "area", CartesianPoint) {
        dash_style: DashStyle => "dashStyle";
        line_width: f64 => "lineWidth" = 2, check coerce::non_negative;
        fill_color: Color => "fillColor";
        fill_opacity: f64 => "fillOpacity", check coerce::unit_interval;
        threshold: f64 => "threshold" = 0;
        connect_nulls: bool => "connectNulls" = false;
    }
}

series_node! {
    pub struct ColumnSeries("series.column", "column", CartesianPoint) {
        point_padding: f64 => "pointPadding", check coerce::unit_interval;
        group_padding: f64 => "groupPadding", check coerce::unit_interval;
        border_radius: f64 => "borderRadius", check coerce::non_negative;
        border_width: f64 => "borderWidth", check coerce::non_negative;
        border_color: Color => "borderColor";
        color_by_point: bool => "colorByPoint" = false;
        point_width: f64 => "pointWidth", check coerce::non_negative;
    }
}

series_node! {
    pub struct BarSeries("series.bar", "bar", CartesianPoint) {
        point_padding: f64 => "pointPadding", check coerce::unit_interval;
        group_padding: f64 => "groupPadding", check coerce::unit_interval;
        border_radius: f64 => "borderRadius", check coerce::non_negative;
        border_width: f64 => "borderWidth", check coerce::non_negative;
        border_color: Color => "borderColor";
        color_by_point: bool => "colorByPoint" = false;
        point_width: f64 => "pointWidth", check coerce::non_negative;
    }
}

series_node! {
    pub struct ScatterSeries("series.scatter", "scatter", CartesianPoint) {
        line_width: f64 => "lineWidth" = 0, check coerce::non_negative;
        jitter: Value => "jitter";
    }
}

series_node! {
    pub struct AreaRangeSeries("series.arearange", "arearange", RangePoint) {
        line_width: f64 => "lineWidth", check coerce::non_negative;
        fill_color: Color => "fillColor";
        fill_opacity: f64 => "fillOpacity", check coerce::unit_interval;
        connect_nulls: bool => "connectNulls" = false;
    }
}

series_node! {
    pub struct ColumnRangeSeries("series.columnrange", "columnrange", RangePoint) {
        point_padding: f64 => "pointPadding", check coerce::unit_interval;
        group_padding: f64 => "groupPadding", check coerce::unit_interval;
        border_radius: f64 => "borderRadius", check coerce::non_negative;
        border_width: f64 => "borderWidth", check coerce::non_negative;
    }
}

series_node! {
    /// Pie series. `center`, `size` and `innerSize` take pixels or
    /// percentage strings.
    pub struct PieSeries("series.pie", "pie", SinglePoint) {
        center: Vec<Value> => "center";
        size: Value => "size", check coerce::number_or_string;
        inner_size: Value => "innerSize", check coerce::number_or_string;
        start_angle: f64 => "startAngle" = 0;
        end_angle: f64 => "endAngle";
        allow_point_select: bool => "allowPointSelect" = false;
        sliced_offset: f64 => "slicedOffset" = 10, check coerce::non_negative;
        border_width: f64 => "borderWidth", check coerce::non_negative;
    }
}

series_node! {
    pub struct BubbleSeries("series.bubble", "bubble", BubblePoint) {
        min_size: Value => "minSize", check coerce::number_or_string;
        max_size: Value => "maxSize", check coerce::number_or_string;
        size_by: SizeBy => "sizeBy";
        z_min: f64 => "zMin";
        z_max: f64 => "zMax";
    }
}

series_node! {
    pub struct BoxPlotSeries("series.boxplot", "boxplot", BoxPoint) {
        fill_color: Color => "fillColor";
        median_width: f64 => "medianWidth", check coerce::non_negative;
        whisker_length: Value => "whiskerLength", check coerce::number_or_string;
        whisker_width: f64 => "whiskerWidth", check coerce::non_negative;
        stem_dash_style: DashStyle => "stemDashStyle";
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::object;
    use crate::series::{DataInput, Loaded};

    #[test]
    fn test_type_tag_is_emitted_first() {
        let series = LineSeries { name: Some("a".into()), ..Default::default() };
        let mapping = series.to_mapping();
        assert_eq!(mapping.keys().collect::<Vec<_>>(), vec!["type", "name"]);
        assert_eq!(mapping["type"], Value::from("line"));
    }

    #[test]
    fn test_mismatched_type_tag_is_rejected() {
        assert!(LineSeries::from_mapping(object! { "type" => "pie" }).is_err());
        assert!(LineSeries::from_mapping(object! { "type" => "LINE" }).is_ok());
    }

    #[test]
    fn test_data_is_compact_in_mapping() {
        let mut series = PieSeries::default();
        series
            .set_data(DataInput::Values(vec![
                Value::Array(vec![Value::from("a"), Value::from(1)]),
                Value::from(2),
            ]))
            .unwrap();
        let mapping = series.to_mapping();
        assert_eq!(
            mapping["data"],
            Value::Array(vec![
                Value::Array(vec![Value::from("a"), Value::from(1)]),
                Value::from(2),
            ])
        );
    }

    #[test]
    fn test_debug_omits_points() {
        let mut series = LineSeries::default();
        series.set_data(DataInput::values(0..100)).unwrap();
        let debug = format!("{series:?}");
        assert!(debug.contains("Points(100 points)"));
        assert!(!debug.contains("99"));
    }

    #[test]
    fn test_defaults_are_trimmed() {
        let series = ColumnSeries {
            visible: Some(true),
            color_by_point: Some(false),
            ..Default::default()
        };
        assert_eq!(series.to_mapping().len(), 1);
    }

    #[test]
    fn test_points_and_collection_equivalence() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let mut by_points = LineSeries::default();
        by_points
            .set_data(DataInput::Values(
                rows.iter()
                    .map(|r| Value::Array(r.iter().copied().map(Value::from).collect()))
                    .collect(),
            ))
            .unwrap();

        let mut by_columns = LineSeries::default();
        by_columns.set_attr("x", Value::Array(vec![Value::from(1), Value::from(3)])).unwrap();
        by_columns.set_attr("y", Value::Array(vec![Value::from(2), Value::from(4)])).unwrap();

        assert_eq!(by_points.to_mapping(), by_columns.to_mapping());
        assert_eq!(by_points.get_attr("x").unwrap(), by_columns.get_attr("x").unwrap());
        assert!(matches!(Loaded::from_vec(vec![by_points]), Loaded::Single(_)));
    }

    #[test]
    fn test_events_hold_callbacks() {
        let series = LineSeries::from_literal_text(
            "{ type: 'line', events: { click: function (e) { return false; } } }",
        )
        .unwrap();
        let text = series.to_literal_text(true).unwrap();
        assert!(text.contains("click: function (e) { return false; }"));
    }
}
