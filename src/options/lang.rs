//! Language strings (`lang`), applied through shared options.

use crate::error::{ChartError, ChartResult};
use crate::value::Value;

crate::define_node! {
    pub struct Language("lang") {
        decimal_point: String => "decimalPoint";
        thousands_sep: String => "thousandsSep";
        loading: String => "loading";
        no_data: String => "noData";
        reset_zoom: String => "resetZoom";
        months: Vec<String> => "months", check twelve;
        short_months: Vec<String> => "shortMonths", check twelve;
        weekdays: Vec<String> => "weekdays", check seven;
        short_weekdays: Vec<String> => "shortWeekdays", check seven;
        numeric_symbols: Vec<Value> => "numericSymbols";
        context_button_title: String => "contextButtonTitle";
        download_png: String => "downloadPNG";
        download_jpeg: String => "downloadJPEG";
        download_pdf: String => "downloadPDF";
        download_svg: String => "downloadSVG";
        print_chart: String => "printChart";
        view_fullscreen: String => "viewFullscreen";
    }
}

fn exact_len(values: &[String], field: &str, expected: usize) -> ChartResult<()> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(ChartError::invalid(
            field,
            format!("expected {expected} names, received {}", values.len()),
        ))
    }
}

fn twelve(values: &[String], field: &str) -> ChartResult<()> {
    exact_len(values, field, 12)
}

fn seven(values: &[String], field: &str) -> ChartResult<()> {
    exact_len(values, field, 7)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::object;

    #[test]
    fn test_weekday_count() {
        let days: Vec<Value> = ["Mo", "Di", "Mi", "Do", "Fr", "Sa", "So"]
            .into_iter()
            .map(Value::from)
            .collect();
        let lang = Language::from_mapping(object! { "shortWeekdays" => days.clone() }).unwrap();
        assert_eq!(lang.short_weekdays.unwrap().len(), 7);
        assert!(Language::from_mapping(object! { "months" => days }).is_err());
    }
}
