//! `tooltip` options.

use crate::callback::CallbackFunction;
use crate::coerce::{self, validate_bounded};
use crate::color::Color;
use crate::error::ChartResult;
use crate::value::Value;

crate::define_node! {
    pub struct Tooltip("tooltip") {
        enabled: bool => "enabled" = true;
        shared: bool => "shared" = false;
        split: bool => "split";
        outside: bool => "outside";
        use_html: bool => "useHTML" = false;
        value_decimals: i64 => "valueDecimals", check decimals;
        value_prefix: String => "valuePrefix";
        value_suffix: String => "valueSuffix";
        header_format: String => "headerFormat";
        point_format: String => "pointFormat";
        footer_format: String => "footerFormat";
        x_date_format: String => "xDateFormat";
        formatter: CallbackFunction => "formatter";
        point_formatter: CallbackFunction => "pointFormatter";
        positioner: CallbackFunction => "positioner";
        background_color: Color => "backgroundColor";
        border_color: Color => "borderColor";
        border_radius: f64 => "borderRadius", check coerce::non_negative;
        border_width: f64 => "borderWidth", check coerce::non_negative;
        shadow: Value => "shadow";
        style: Value => "style", check coerce::object;
    }
}

fn decimals(value: &i64, field: &str) -> ChartResult<()> {
    validate_bounded(*value as f64, field, Some(0.0), Some(20.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::object;

    #[test]
    fn test_value_decimals_bounds() {
        assert!(Tooltip::from_mapping(object! { "valueDecimals" => 2 }).is_ok());
        assert!(Tooltip::from_mapping(object! { "valueDecimals" => -1 }).is_err());
        assert!(Tooltip::from_mapping(object! { "valueDecimals" => 1.5 }).is_err());
    }

    #[test]
    fn test_formatter_must_be_a_function() {
        assert!(Tooltip::from_mapping(object! { "formatter" => "not a function" }).is_err());
        let tooltip = Tooltip::from_mapping(object! {
            "formatter" => "function () { return '<b>' + this.x + '</b>'; }",
        })
        .unwrap();
        assert_eq!(
            tooltip.formatter.unwrap().body(),
            Some("return '<b>' + this.x + '</b>';")
        );
    }
}
