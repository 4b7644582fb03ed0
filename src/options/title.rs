//! Title, subtitle, caption and credits.

use crate::coerce::{self, Align, VerticalAlign};
use crate::value::Value;

crate::define_node! {
    pub struct Title("title") {
        text: String => "text";
        align: Align => "align";
        vertical_align: VerticalAlign => "verticalAlign";
        floating: bool => "floating" = false;
        margin: f64 => "margin", check coerce::non_negative;
        style: Value => "style", check coerce::object;
        use_html: bool => "useHTML" = false;
        x: f64 => "x";
        y: f64 => "y";
    }
}

crate::define_node! {
    pub struct Subtitle("subtitle") {
        text: String => "text";
        align: Align => "align";
        vertical_align: VerticalAlign => "verticalAlign";
        floating: bool => "floating" = false;
        style: Value => "style", check coerce::object;
        use_html: bool => "useHTML" = false;
        x: f64 => "x";
        y: f64 => "y";
    }
}

crate::define_node! {
    /// Text below the plot area.
    pub struct Caption("caption") {
        text: String => "text";
        align: Align => "align";
        vertical_align: VerticalAlign => "verticalAlign";
        floating: bool => "floating" = false;
        margin: f64 => "margin", check coerce::non_negative;
        style: Value => "style", check coerce::object;
        use_html: bool => "useHTML" = false;
        x: f64 => "x";
        y: f64 => "y";
    }
}

crate::define_node! {
    pub struct Credits("credits") {
        enabled: bool => "enabled" = true;
        text: String => "text";
        href: String => "href", check coerce::url_or_path;
        position: Value => "position", check coerce::object;
        style: Value => "style", check coerce::object;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::object;

    #[test]
    fn test_title_round_trip() {
        let title = Title::from_mapping(object! {
            "text" => "Sales",
            "align" => "LEFT",
            "useHTML" => false,
        })
        .unwrap();
        assert_eq!(title.align, Some(Align::Left));
        assert_eq!(title.to_mapping().len(), 2);
        assert_eq!(Title::from_mapping(title.to_value()).unwrap(), title);
    }

    #[test]
    fn test_bad_alignment() {
        let err = Subtitle::from_mapping(object! { "align" => "justify" }).unwrap_err();
        assert!(err.to_string().contains("left, center, right"));
    }

    #[test]
    fn test_credits_href() {
        assert!(Credits::from_mapping(object! { "href" => "https://www.highcharts.com" }).is_ok());
        assert!(Credits::from_mapping(object! { "href" => "" }).is_err());
    }
}
