//! `legend` options.

use crate::callback::CallbackFunction;
use crate::coerce::{self, Align, VerticalAlign};
use crate::color::Color;
use crate::value::Value;

crate::string_enum! {
    pub enum LegendLayout {
        Horizontal => "horizontal",
        Vertical => "vertical",
        Proximate => "proximate",
    }
}

crate::define_node! {
    pub struct LegendTitle("legend.title") {
        text: String => "text";
        style: Value => "style", check coerce::object;
    }
}

crate::define_node! {
    pub struct Legend("legend") {
        enabled: bool => "enabled" = true;
        layout: LegendLayout => "layout";
        align: Align => "align";
        vertical_align: VerticalAlign => "verticalAlign";
        floating: bool => "floating" = false;
        reversed: bool => "reversed" = false;
        background_color: Color => "backgroundColor";
        border_color: Color => "borderColor";
        border_width: f64 => "borderWidth", check coerce::non_negative;
        border_radius: f64 => "borderRadius", check coerce::non_negative;
        item_style: Value => "itemStyle", check coerce::object;
        item_hidden_style: Value => "itemHiddenStyle", check coerce::object;
        label_format: String => "labelFormat";
        label_formatter: CallbackFunction => "labelFormatter";
        max_height: f64 => "maxHeight", check coerce::non_negative;
        title: LegendTitle => "title";
        use_html: bool => "useHTML" = false;
        x: f64 => "x";
        y: f64 => "y";
    }
}
