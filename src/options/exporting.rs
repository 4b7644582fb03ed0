//! `exporting` options and the export formats they name.

use crate::callback::CallbackFunction;
use crate::coerce;
use crate::error::ChartResult;
use crate::value::Value;

crate::string_enum! {
    /// MIME type of an exported chart.
    pub enum ExportType {
        Png => "image/png",
        Jpeg => "image/jpeg",
        Pdf => "application/pdf",
        Svg => "image/svg+xml",
    }
}

impl ExportType {
    /// Accepts a short name (`png`, `jpg`, `svg`, `pdf`) or a MIME type.
    pub fn from_name(name: &str) -> ChartResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportType::Png),
            "jpg" | "jpeg" => Ok(ExportType::Jpeg),
            "pdf" => Ok(ExportType::Pdf),
            "svg" => Ok(ExportType::Svg),
            _ => Self::parse(name, "type"),
        }
    }

    /// Short name the export server expects in its `type` field.
    pub fn short_name(&self) -> &'static str {
        match self {
            ExportType::Png => "png",
            ExportType::Jpeg => "jpeg",
            ExportType::Pdf => "pdf",
            ExportType::Svg => "svg",
        }
    }

    pub fn is_raster(&self) -> bool {
        matches!(self, ExportType::Png | ExportType::Jpeg)
    }
}

crate::define_node! {
    pub struct Exporting("exporting") {
        enabled: bool => "enabled" = true;
        filename: String => "filename";
        export_type: ExportType => "type";
        url: String => "url", check coerce::url_or_path;
        scale: f64 => "scale" = 2, check coerce::non_negative;
        width: f64 => "width", check coerce::non_negative;
        source_width: f64 => "sourceWidth", check coerce::non_negative;
        source_height: f64 => "sourceHeight", check coerce::non_negative;
        print_max_width: f64 => "printMaxWidth", check coerce::non_negative;
        fallback_to_export_server: bool => "fallbackToExportServer" = true;
        allow_html: bool => "allowHTML" = false;
        buttons: Value => "buttons", check coerce::object;
        chart_options: Value => "chartOptions", check coerce::object;
        menu_item_definitions: Value => "menuItemDefinitions", check coerce::object;
        error: CallbackFunction => "error";
    }
}
