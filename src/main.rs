use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::debug;

use chartopts::csv_reader::{self, CsvOptions};
use chartopts::ingest::{ColumnMapping, IngestOptions};
use chartopts::options::{ExportType, Title};
use chartopts::{Chart, ExportClient, ExportRequest, LiteralOptions, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Script creating the chart on page load
    Js,
    /// Options as JSON
    Json,
    /// Standalone page loading Highcharts
    Html,
    Png,
    Jpeg,
    Svg,
    Pdf,
}

impl Format {
    fn export_type(self) -> Option<ExportType> {
        match self {
            Format::Png => Some(ExportType::Png),
            Format::Jpeg => Some(ExportType::Jpeg),
            Format::Svg => Some(ExportType::Svg),
            Format::Pdf => Some(ExportType::Pdf),
            Format::Js | Format::Json | Format::Html => None,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "chartopts")]
#[command(about = "Build Highcharts charts from CSV data", long_about = None)]
struct Args {
    /// CSV file to read instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Series type for the loaded columns (line, column, pie, ...)
    #[arg(short = 't', long, default_value = "line")]
    series_type: String,

    /// Point property to column(s), e.g. `x=0` or `y=1,2,3`. Repeatable.
    #[arg(short, long = "map", value_parser = parse_map)]
    map: Vec<(String, ColumnMapping)>,

    /// The first row is data, not headers
    #[arg(long)]
    no_header: bool,

    /// Each row is one series
    #[arg(long)]
    series_in_rows: bool,

    /// Series names, in order. Repeatable.
    #[arg(long = "series-name")]
    series_names: Vec<String>,

    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Cell text read as null
    #[arg(long)]
    null_text: Option<String>,

    #[arg(long)]
    title: Option<String>,

    /// Id of the element the chart renders into
    #[arg(long)]
    container: Option<String>,

    /// Global the chart is assigned to
    #[arg(long)]
    variable_name: Option<String>,

    #[arg(short, long, value_enum, default_value_t = Format::Js)]
    format: Format,

    /// Parse generated scripts back before printing them
    #[arg(long)]
    validate: bool,

    /// JSON settings file; environment and flags override it
    #[arg(long)]
    settings: Option<PathBuf>,

    #[arg(long, env = "CHARTOPTS_MODULE_URL")]
    module_url: Option<String>,

    #[arg(long, env = "CHARTOPTS_EXPORT_PROTOCOL")]
    export_protocol: Option<String>,

    #[arg(long, env = "CHARTOPTS_EXPORT_DOMAIN")]
    export_domain: Option<String>,

    #[arg(long, env = "CHARTOPTS_EXPORT_PORT")]
    export_port: Option<u16>,

    #[arg(long, env = "CHARTOPTS_EXPORT_PATH")]
    export_path: Option<String>,

    /// Export request timeout in seconds
    #[arg(long, default_value_t = 3)]
    timeout: u64,

    #[arg(long)]
    scale: Option<f64>,

    #[arg(long)]
    width: Option<f64>,

    #[arg(long)]
    height: Option<f64>,
}

fn parse_map(spec: &str) -> Result<(String, ColumnMapping), String> {
    IngestOptions::parse_property(spec).map_err(|e| e.to_string())
}

impl Args {
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.settings {
            Some(path) => Settings::from_json_file(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => Settings::default(),
        };
        if let Some(url) = &self.module_url {
            settings.module_url = url.clone();
        }
        if let Some(protocol) = &self.export_protocol {
            settings.export.protocol = protocol.clone();
        }
        if let Some(domain) = &self.export_domain {
            settings.export.domain = domain.clone();
        }
        if self.export_port.is_some() {
            settings.export.port = self.export_port;
        }
        if let Some(path) = &self.export_path {
            settings.export.path = path.clone();
        }
        Ok(settings)
    }

    fn csv_options(&self) -> Result<CsvOptions> {
        let Ok(delimiter) = u8::try_from(self.delimiter) else {
            bail!("delimiter must be a single-byte character, got '{}'", self.delimiter);
        };
        Ok(CsvOptions {
            delimiter,
            has_header: !self.no_header,
            null_text: self.null_text.clone(),
            ..Default::default()
        })
    }

    fn ingest_options(&self) -> IngestOptions {
        let mut ingest = IngestOptions {
            series_in_rows: self.series_in_rows,
            series_names: (!self.series_names.is_empty()).then(|| self.series_names.clone()),
            ..Default::default()
        };
        for (property, columns) in &self.map {
            ingest = ingest.with_property(property.clone(), columns.clone());
        }
        ingest
    }
}

fn render_html(chart: &Chart, script: &str, module_url: &str) -> String {
    let tags = chart.script_tags(module_url).join("\n");
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n{tags}\n</head>\n<body>\n<div id=\"{}\"></div>\n<script>\n{script}\n</script>\n</body>\n</html>\n",
        chart.container()
    )
}

fn main() -> Result<()> {
    let subscriber_installed = chartopts::telemetry::init_default_tracing();
    let args = Args::parse();
    debug!(subscriber_installed, "parsed arguments");
    let settings = args.settings()?;
    let csv_options = args.csv_options()?;

    // Read CSV from the input file or stdin
    let table = match &args.input {
        Some(path) => csv_reader::read_path(path, &csv_options)
            .with_context(|| format!("Failed to read CSV from {}", path.display()))?,
        None => csv_reader::read_stdin(&csv_options).context("Failed to read CSV from stdin")?,
    };
    debug!(rows = table.height(), columns = table.width(), "loaded table");

    let mut builder = Chart::builder()
        .data(table)
        .series_type(args.series_type.as_str())
        .ingest(args.ingest_options());
    if let Some(container) = &args.container {
        builder = builder.container(container.as_str());
    }
    if let Some(name) = &args.variable_name {
        builder = builder.variable_name(name.as_str());
    }
    let mut chart = builder.build().context("Failed to build chart")?;

    if let Some(title) = &args.title {
        let options = chart.options.get_or_insert_with(Default::default);
        options.title = Some(Title {
            text: Some(title.clone()),
            ..Default::default()
        });
    }

    let literal_options = LiteralOptions {
        careful_validation: args.validate,
        filename: None,
    };
    let output = match args.format {
        Format::Js => chart
            .to_js_literal(&literal_options)
            .context("Failed to render chart script")?
            .into_bytes(),
        Format::Json => chart.to_json().context("Failed to render options JSON")?.into_bytes(),
        Format::Html => {
            let script = chart
                .to_js_literal(&literal_options)
                .context("Failed to render chart script")?;
            render_html(&chart, &script, &settings.module_url).into_bytes()
        }
        format => {
            let Some(export_type) = format.export_type() else {
                bail!("{format:?} is not an export format");
            };
            let client = ExportClient::from_settings(&settings)
                .with_timeout(Duration::from_secs(args.timeout));
            let request = ExportRequest {
                scale: args.scale,
                width: args.width,
                height: args.height,
                ..ExportRequest::new(export_type)
            };
            chart
                .export(&client, &request)
                .context("Failed to export chart")?
        }
    };

    // Write output to stdout
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(&output)
        .context("Failed to write output to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}
