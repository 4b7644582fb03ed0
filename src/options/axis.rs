//! Axis options shared by `xAxis` and `yAxis`.

use crate::callback::CallbackFunction;
use crate::coerce::{self, Align, DashStyle};
use crate::color::Color;
use crate::value::Value;

crate::string_enum! {
    pub enum AxisType {
        Linear => "linear",
        Logarithmic => "logarithmic",
        Datetime => "datetime",
        Category => "category",
    }
}

crate::string_enum! {
    pub enum AxisTitleAlign { Low => "low", Middle => "middle", High => "high" }
}

crate::define_node! {
    pub struct AxisTitle("xAxis.title") {
        text: String => "text";
        align: AxisTitleAlign => "align";
        margin: f64 => "margin";
        offset: f64 => "offset";
        rotation: f64 => "rotation";
        style: Value => "style", check coerce::object;
        use_html: bool => "useHTML" = false;
        x: f64 => "x";
        y: f64 => "y";
    }
}

crate::define_node! {
    pub struct AxisLabels("xAxis.labels") {
        enabled: bool => "enabled" = true;
        format: String => "format";
        formatter: CallbackFunction => "formatter";
        align: Align => "align";
        rotation: f64 => "rotation";
        step: i64 => "step";
        style: Value => "style", check coerce::object;
        use_html: bool => "useHTML" = false;
        x: f64 => "x";
        y: f64 => "y";
    }
}

crate::define_node! {
    pub struct PlotLine("xAxis.plotLines") {
        id: String => "id";
        value: f64 => "value";
        color: Color => "color";
        width: f64 => "width", check coerce::non_negative;
        dash_style: DashStyle => "dashStyle";
        z_index: i64 => "zIndex";
        label: Value => "label", check coerce::object;
        class_name: String => "className";
    }
}

crate::define_node! {
    pub struct PlotBand("xAxis.plotBands") {
        id: String => "id";
        from: f64 => "from";
        to: f64 => "to";
        color: Color => "color";
        border_color: Color => "borderColor";
        border_width: f64 => "borderWidth", check coerce::non_negative;
        z_index: i64 => "zIndex";
        label: Value => "label", check coerce::object;
        class_name: String => "className";
    }
}

crate::define_node! {
    /// One axis. Charts hold lists of these under `xAxis` and `yAxis`.
    pub struct Axis("xAxis") {
        id: String => "id";
        axis_type: AxisType => "type";
        title: AxisTitle => "title";
        labels: AxisLabels => "labels";
        categories: Vec<String> => "categories";
        min: f64 => "min";
        max: f64 => "max";
        soft_min: f64 => "softMin";
        soft_max: f64 => "softMax";
        tick_interval: f64 => "tickInterval", check coerce::non_negative;
        tick_amount: i64 => "tickAmount";
        allow_decimals: bool => "allowDecimals" = true;
        start_on_tick: bool => "startOnTick";
        end_on_tick: bool => "endOnTick";
        opposite: bool => "opposite" = false;
        reversed: bool => "reversed";
        visible: bool => "visible" = true;
        offset: f64 => "offset";
        linked_to: i64 => "linkedTo";
        line_width: f64 => "lineWidth", check coerce::non_negative;
        line_color: Color => "lineColor";
        grid_line_width: f64 => "gridLineWidth", check coerce::non_negative;
        grid_line_color: Color => "gridLineColor";
        grid_line_dash_style: DashStyle => "gridLineDashStyle";
        plot_lines: Vec<PlotLine> => "plotLines";
        plot_bands: Vec<PlotBand> => "plotBands";
        crosshair: Value => "crosshair";
        date_time_label_formats: Value => "dateTimeLabelFormats", check coerce::object;
    }
}
