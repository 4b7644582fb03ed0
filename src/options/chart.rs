//! `chart` options.

use crate::callback::CallbackFunction;
use crate::coerce::{self, unsupported};
use crate::color::Color;
use crate::error::ChartResult;
use crate::series::SERIES_TYPES;
use crate::value::Value;

crate::string_enum! {
    pub enum ZoomType { X => "x", Y => "y", Xy => "xy" }
}

crate::define_node! {
    pub struct ChartEvents("chart.events") {
        load: CallbackFunction => "load";
        render: CallbackFunction => "render";
        redraw: CallbackFunction => "redraw";
        click: CallbackFunction => "click";
        selection: CallbackFunction => "selection";
        add_series: CallbackFunction => "addSeries";
        before_print: CallbackFunction => "beforePrint";
        after_print: CallbackFunction => "afterPrint";
    }
}

crate::define_node! {
    /// General chart options. `chart_type` is the default series type.
    pub struct ChartOptions("chart") {
        chart_type: String => "type", check known_series_type;
        render_to: String => "renderTo";
        width: Value => "width", check coerce::number_or_string;
        height: Value => "height", check coerce::number_or_string;
        background_color: Color => "backgroundColor";
        plot_background_color: Color => "plotBackgroundColor";
        border_color: Color => "borderColor";
        border_width: f64 => "borderWidth", check coerce::non_negative;
        border_radius: f64 => "borderRadius", check coerce::non_negative;
        class_name: String => "className";
        inverted: bool => "inverted" = false;
        polar: bool => "polar" = false;
        zoom_type: ZoomType => "zoomType";
        margin: Value => "margin";
        spacing: Vec<f64> => "spacing";
        style: Value => "style", check coerce::object;
        animation: Value => "animation";
        styled_mode: bool => "styledMode" = false;
        reflow: bool => "reflow" = true;
        events: ChartEvents => "events";
    }
}

fn known_series_type(value: &String, field: &str) -> ChartResult<()> {
    if SERIES_TYPES.contains(&value.to_ascii_lowercase().as_str()) {
        Ok(())
    } else {
        Err(unsupported(field, value, SERIES_TYPES))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChartError;
    use crate::node::Node;
    use crate::object;

    #[test]
    fn test_chart_type_uses_type_key() {
        let chart = ChartOptions::from_mapping(object! { "type" => "column", "inverted" => true })
            .unwrap();
        assert_eq!(chart.chart_type.as_deref(), Some("column"));
        assert_eq!(chart.to_mapping()["type"], Value::from("column"));
    }

    #[test]
    fn test_unknown_chart_type() {
        let err = ChartOptions::from_mapping(object! { "type" => "radar" }).unwrap_err();
        assert!(matches!(err, ChartError::UnsupportedValue { .. }));
    }

    #[test]
    fn test_events_and_style() {
        let chart = ChartOptions::from_mapping(object! {
            "events" => object! { "load" => Value::Code("function () {}".into()) },
        })
        .unwrap();
        assert!(chart.events.unwrap().load.is_some());
        assert!(ChartOptions::from_mapping(object! { "style" => "bold" }).is_err());
    }
}
