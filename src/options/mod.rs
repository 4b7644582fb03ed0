//! The options tree passed to `Highcharts.chart` and `Highcharts.setOptions`.

pub mod axis;
pub mod chart;
pub mod exporting;
pub mod lang;
pub mod legend;
pub mod title;
pub mod tooltip;

pub use axis::{Axis, AxisLabels, AxisTitle, AxisType, PlotBand, PlotLine};
pub use chart::{ChartEvents, ChartOptions, ZoomType};
pub use exporting::{ExportType, Exporting};
pub use lang::Language;
pub use legend::{Legend, LegendLayout, LegendTitle};
pub use title::{Caption, Credits, Subtitle, Title};
pub use tooltip::Tooltip;

use crate::coerce;
use crate::color::Color;
use crate::error::ChartResult;
use crate::node::Node;
use crate::series::AnySeries;
use crate::value::Value;

crate::define_node! {
    /// Root of a chart's options.
    pub struct HighchartsOptions("") {
        accessibility: Value => "accessibility", check coerce::object;
        caption: Caption => "caption";
        chart: ChartOptions => "chart";
        colors: Vec<Color> => "colors";
        credits: Credits => "credits";
        exporting: Exporting => "exporting";
        language: Language => "lang" | "language";
        legend: Legend => "legend";
        loading: Value => "loading", check coerce::object;
        plot_options: Value => "plotOptions", check coerce::object;
        responsive: Value => "responsive", check coerce::object;
        subtitle: Subtitle => "subtitle";
        time: Value => "time", check coerce::object;
        title: Title => "title";
        tooltip: Tooltip => "tooltip";
        x_axis: Vec<Axis> => "xAxis";
        y_axis: Vec<Axis> => "yAxis";
        series: Vec<AnySeries> => "series";
    }
}

impl HighchartsOptions {
    pub fn series_list(&self) -> &[AnySeries] {
        self.series.as_deref().unwrap_or_default()
    }

    pub fn series_mut(&mut self) -> &mut Vec<AnySeries> {
        self.series.get_or_insert_with(Vec::new)
    }
}

crate::define_node! {
    /// Options applied to every chart on a page through
    /// `Highcharts.setOptions`. Carries no series.
    pub struct SharedOptions("") {
        accessibility: Value => "accessibility", check coerce::object;
        chart: ChartOptions => "chart";
        colors: Vec<Color> => "colors";
        credits: Credits => "credits";
        exporting: Exporting => "exporting";
        language: Language => "lang" | "language";
        legend: Legend => "legend";
        loading: Value => "loading", check coerce::object;
        plot_options: Value => "plotOptions", check coerce::object;
        subtitle: Subtitle => "subtitle";
        time: Value => "time", check coerce::object;
        title: Title => "title";
        tooltip: Tooltip => "tooltip";
        x_axis: Vec<Axis> => "xAxis";
        y_axis: Vec<Axis> => "yAxis";
    }
}

impl SharedOptions {
    /// `Highcharts.setOptions({...});`
    pub fn to_js_literal(&self, careful_validation: bool) -> ChartResult<String> {
        let body = self.to_literal_text(false)?;
        let script = format!("Highcharts.setOptions({body});");
        if careful_validation {
            crate::parser::parse_program(&script)?;
        }
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChartError;
    use crate::object;

    #[test]
    fn test_language_alias() {
        let options = HighchartsOptions::from_mapping(object! {
            "language" => object! { "decimalPoint" => "," },
        })
        .unwrap();
        assert_eq!(options.language.as_ref().unwrap().decimal_point.as_deref(), Some(","));
        assert!(options.to_mapping().contains_key("lang"));
    }

    #[test]
    fn test_series_need_type() {
        let err = HighchartsOptions::from_mapping(object! {
            "series" => Value::Array(vec![object! { "data" => Value::Array(vec![Value::from(1)]) }]),
        })
        .unwrap_err();
        assert!(matches!(err, ChartError::MissingDiscriminator { .. }));
    }

    #[test]
    fn test_single_axis_becomes_list() {
        let options = HighchartsOptions::from_mapping(object! {
            "xAxis" => object! { "type" => "category" },
        })
        .unwrap();
        assert_eq!(options.x_axis.as_ref().map(Vec::len), Some(1));
        assert!(matches!(options.to_mapping()["xAxis"], Value::Array(_)));
    }

    #[test]
    fn test_options_round_trip_untrimmed() {
        let options = HighchartsOptions::from_literal_text(
            "{ title: { text: 'T' }, series: [{ type: 'line', data: [1, [2, 3]] }], colors: ['#000'] }",
        )
        .unwrap();
        let rebuilt = HighchartsOptions::from_mapping(Value::Object(options.to_untrimmed())).unwrap();
        assert_eq!(rebuilt, options);
        assert_eq!(rebuilt.series_list()[0].point_count(), 2);
    }

    #[test]
    fn test_shared_options_script() {
        let shared = SharedOptions::from_mapping(object! {
            "lang" => object! { "thousandsSep" => "." },
        })
        .unwrap();
        let script = shared.to_js_literal(true).unwrap();
        assert!(script.starts_with("Highcharts.setOptions({"));
        assert!(script.contains("thousandsSep: \".\""));
    }
}
