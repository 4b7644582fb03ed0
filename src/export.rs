//! Client for a Highcharts export server, which renders an options tree to
//! PNG, JPEG, PDF or SVG.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, info};

use crate::callback::CallbackFunction;
use crate::coerce;
use crate::config::Settings;
use crate::error::{ChartError, ChartResult};
use crate::literal;
use crate::node::Node;
use crate::options::{ExportType, HighchartsOptions, SharedOptions};
use crate::value::Value;

/// Constructors the export server can call on the page.
pub const CONSTRUCTORS: &[&str] = &["chart", "stockChart", "mapChart", "ganttChart"];

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Endpoint, credentials and limits of one export server.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportClient {
    pub protocol: String,
    pub domain: String,
    pub port: Option<u16>,
    pub path: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
    /// Series types this server cannot render.
    pub unsupported_series_types: Vec<String>,
}

impl Default for ExportClient {
    fn default() -> Self {
        Self::from_settings(Settings::global())
    }
}

impl ExportClient {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            protocol: settings.export.protocol.clone(),
            domain: settings.export.domain.clone(),
            port: settings.export.port,
            path: settings.export.path.clone(),
            username: None,
            password: None,
            timeout: DEFAULT_TIMEOUT,
            unsupported_series_types: Vec::new(),
        }
    }

    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `protocol://domain[:port]/path`
    pub fn url(&self) -> ChartResult<String> {
        let protocol = self.protocol.trim().to_ascii_lowercase();
        if protocol != "http" && protocol != "https" {
            return Err(coerce::unsupported("protocol", &protocol, &["http", "https"]));
        }
        let domain = self.domain.trim().trim_end_matches('/');
        if domain.is_empty() || domain.contains(['/', ' ', '?', '#']) {
            return Err(ChartError::invalid("domain", format!("'{domain}' is not a host name")));
        }
        let port = self.port.map(|p| format!(":{p}")).unwrap_or_default();
        let path = self.path.trim();
        let slash = if path.starts_with('/') { "" } else { "/" };
        Ok(format!("{protocol}://{domain}{port}{slash}{path}"))
    }

    /// Rejects options holding a series type this server cannot render.
    pub fn check_series(&self, options: &HighchartsOptions) -> ChartResult<()> {
        for series in options.series_list() {
            let series_type = series.series_type();
            if self
                .unsupported_series_types
                .iter()
                .any(|t| t.eq_ignore_ascii_case(series_type))
            {
                return Err(ChartError::UnsupportedExport(series_type.to_owned()));
            }
        }
        Ok(())
    }

    /// Renders `options` and returns the server's bytes (base64 text when
    /// `request.use_base64` is set). Writes them to `request.filename` too.
    pub fn export(&self, options: &HighchartsOptions, request: &ExportRequest) -> ChartResult<Vec<u8>> {
        self.check_series(options)?;
        let body = request.body(options)?;
        let url = self.url()?;
        info!(url = %url, format = request.format.short_name(), "exporting chart");
        let bytes = self.post(url, &body)?;
        check_payload(request.format, request.use_base64, &bytes)?;
        if let Some(path) = &request.filename {
            std::fs::write(path, &bytes)?;
            debug!(path = %path.display(), bytes = bytes.len(), "wrote exported chart");
        }
        Ok(bytes)
    }

    #[cfg(feature = "export")]
    fn post(&self, url: String, body: &serde_json::Value) -> ChartResult<Vec<u8>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        let mut builder = client.post(&url).json(body);
        if let Some(username) = &self.username {
            builder = builder.basic_auth(username, self.password.as_ref());
        }
        let response = builder.send()?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(ChartError::Export(format!(
                "server returned {status}: {}",
                message.trim()
            )));
        }
        Ok(response.bytes()?.to_vec())
    }

    #[cfg(not(feature = "export"))]
    fn post(&self, _url: String, _body: &serde_json::Value) -> ChartResult<Vec<u8>> {
        Err(ChartError::Dependency("export"))
    }
}

/// What to render and how.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub format: ExportType,
    pub scale: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub use_base64: bool,
    /// Runs after the chart is created on the server.
    pub callback: Option<CallbackFunction>,
    pub global_options: Option<SharedOptions>,
    pub data_options: Option<Value>,
    pub custom_code: Option<CallbackFunction>,
    /// One of `CONSTRUCTORS`.
    pub constructor: String,
    pub filename: Option<PathBuf>,
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self {
            format: ExportType::Png,
            scale: None,
            width: None,
            height: None,
            use_base64: false,
            callback: None,
            global_options: None,
            data_options: None,
            custom_code: None,
            constructor: "chart".to_owned(),
            filename: None,
        }
    }
}

impl ExportRequest {
    pub fn new(format: ExportType) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }

    /// JSON body posted to the server. Options and code travel as literal
    /// text so callbacks survive.
    pub fn body(&self, options: &HighchartsOptions) -> ChartResult<serde_json::Value> {
        if !CONSTRUCTORS.contains(&self.constructor.as_str()) {
            return Err(coerce::unsupported("constr", &self.constructor, CONSTRUCTORS));
        }
        for (field, value) in [("scale", self.scale), ("width", self.width), ("height", self.height)] {
            if let Some(value) = value {
                coerce::validate_bounded(value, field, Some(0.0), None)?;
            }
        }
        let global_options = match &self.global_options {
            Some(shared) => Some(shared.to_literal_text(false)?),
            None => None,
        };
        Ok(json!({
            "infile": options.to_literal_text(false)?,
            "type": self.format.short_name(),
            "scale": self.scale,
            "width": self.width,
            "height": self.height,
            "b64": self.use_base64,
            "callback": self.callback.as_ref().map(CallbackFunction::source),
            "globalOptions": global_options,
            "dataOptions": self.data_options.as_ref().map(literal::to_literal),
            "customCode": self.custom_code.as_ref().map(CallbackFunction::source),
            "constr": self.constructor,
        }))
    }
}

/// Confirms the server answered with the requested format rather than an
/// error page.
fn check_payload(format: ExportType, base64: bool, bytes: &[u8]) -> ChartResult<()> {
    if base64 {
        return Ok(());
    }
    let matches = match format {
        ExportType::Pdf => bytes.starts_with(b"%PDF"),
        ExportType::Svg => {
            let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]);
            head.contains("<svg") || head.trim_start().starts_with("<?xml")
        }
        ExportType::Png | ExportType::Jpeg => raster_matches(format, bytes),
    };
    if matches {
        Ok(())
    } else {
        Err(ChartError::Export(format!(
            "response is not {}",
            format.as_str()
        )))
    }
}

#[cfg(feature = "export")]
fn raster_matches(format: ExportType, bytes: &[u8]) -> bool {
    use image::ImageFormat;
    matches!(
        (format, image::guess_format(bytes)),
        (ExportType::Png, Ok(ImageFormat::Png)) | (ExportType::Jpeg, Ok(ImageFormat::Jpeg))
    )
}

#[cfg(not(feature = "export"))]
fn raster_matches(_format: ExportType, _bytes: &[u8]) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object;

    fn client() -> ExportClient {
        ExportClient::from_settings(&Settings::default())
    }

    #[test]
    fn test_url() {
        let mut client = client();
        assert_eq!(client.url().unwrap(), "https://export.highcharts.com/");
        client.protocol = "http".into();
        client.domain = "localhost".into();
        client.port = Some(7801);
        client.path = "/export".into();
        assert_eq!(client.url().unwrap(), "http://localhost:7801/export");
        client.domain = "localhost/x".into();
        assert!(client.url().is_err());
    }

    #[test]
    fn test_unsupported_series_type() {
        let mut client = client();
        client.unsupported_series_types = vec!["boxplot".into()];
        let options = HighchartsOptions::from_mapping(object! {
            "series" => Value::Array(vec![object! { "type" => "boxplot" }]),
        })
        .unwrap();
        let err = client.export(&options, &ExportRequest::default()).unwrap_err();
        assert!(matches!(err, ChartError::UnsupportedExport(t) if t == "boxplot"));
    }

    #[test]
    fn test_request_body() {
        let options = HighchartsOptions::from_literal_text("{ title: { text: 'Sales' } }").unwrap();
        let request = ExportRequest {
            scale: Some(2.0),
            callback: Some(CallbackFunction::new("function (chart) { chart.redraw(); }").unwrap()),
            data_options: Some(object! { "csv" => "a,b\n1,2" }),
            ..ExportRequest::new(ExportType::Svg)
        };
        let body = request.body(&options).unwrap();
        assert_eq!(body["type"], "svg");
        assert_eq!(body["constr"], "chart");
        assert_eq!(body["b64"], false);
        assert!(body["infile"].as_str().unwrap().contains("text: \"Sales\""));
        assert!(body["callback"].as_str().unwrap().starts_with("function (chart)"));
        assert!(body["width"].is_null());
    }

    #[test]
    fn test_request_rejects_bad_constructor() {
        let request = ExportRequest {
            constructor: "sparkline".into(),
            ..Default::default()
        };
        assert!(request.body(&HighchartsOptions::default()).unwrap_err().is_value_error());
    }

    #[test]
    fn test_check_payload() {
        assert!(check_payload(ExportType::Pdf, false, b"%PDF-1.4").is_ok());
        assert!(check_payload(ExportType::Svg, false, b"<svg xmlns=\"\"></svg>").is_ok());
        assert!(check_payload(ExportType::Png, false, b"<html>error</html>").is_err());
        assert!(check_payload(ExportType::Png, true, b"iVBORw0KGgo=").is_ok());
    }

    #[cfg(feature = "export")]
    #[test]
    fn test_png_signature_is_recognized() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert!(check_payload(ExportType::Png, false, &png).is_ok());
        assert!(check_payload(ExportType::Jpeg, false, &png).is_err());
    }
}
