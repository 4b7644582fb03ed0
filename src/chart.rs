//! The chart aggregate: one options tree plus the page-level details needed
//! to render it as a script.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::callback::CallbackFunction;
use crate::data::{Frame, Table};
use crate::error::{ChartError, ChartResult};
use crate::export::{ExportClient, ExportRequest};
use crate::ingest::IngestOptions;
use crate::literal;
use crate::node::Node;
use crate::options::HighchartsOptions;
use crate::parser::{self, Expr, Program, Statement};
use crate::series::{AnySeries, IntoSeries};
use crate::value::Value;

pub const DEFAULT_CONTAINER: &str = "container";

/// Series types drawn by `highcharts-more.js` rather than the core bundle.
const MORE_SERIES: &[&str] = &["arearange", "columnrange", "bubble", "boxplot"];

/// How `Chart::to_js_literal` finishes its output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiteralOptions {
    /// Parse the script back before returning it.
    pub careful_validation: bool,
    /// Also write the script here.
    pub filename: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chart {
    pub options: Option<HighchartsOptions>,
    /// Id of the element the chart renders into.
    pub container: Option<String>,
    /// Global the created chart is assigned to.
    pub variable_name: Option<String>,
    /// Runs once the chart has loaded.
    pub callback: Option<CallbackFunction>,
}

/// Raw data handed to `ChartBuilder::data`.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    /// One item per point of a single series.
    Values(Vec<Value>),
    /// Split into series by the ingestion adapter.
    Table(Table),
}

impl From<Vec<Value>> for ChartData {
    fn from(values: Vec<Value>) -> Self {
        ChartData::Values(values)
    }
}

impl From<Table> for ChartData {
    fn from(table: Table) -> Self {
        ChartData::Table(table)
    }
}

impl From<&Frame> for ChartData {
    fn from(frame: &Frame) -> Self {
        ChartData::Table(frame.to_table())
    }
}

impl From<Frame> for ChartData {
    fn from(frame: Frame) -> Self {
        ChartData::Table(frame.to_table())
    }
}

#[derive(Debug, Default)]
pub struct ChartBuilder {
    options: Option<HighchartsOptions>,
    series: Option<ChartResult<Vec<AnySeries>>>,
    data: Option<ChartData>,
    series_type: Option<String>,
    ingest: IngestOptions,
    container: Option<String>,
    variable_name: Option<String>,
    callback: Option<CallbackFunction>,
}

fn collect_series<I>(items: I) -> ChartResult<Vec<AnySeries>>
where
    I: IntoIterator,
    I::Item: IntoSeries,
{
    items.into_iter().map(IntoSeries::into_series).collect()
}

/// Where `update_series` puts an item.
enum Slot {
    Replace(usize),
    Append,
}

impl ChartBuilder {
    pub fn options(mut self, options: HighchartsOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Series to plot. Takes precedence over `data` and replaces any series
    /// already in `options`.
    pub fn series<I>(mut self, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoSeries,
    {
        self.series = Some(collect_series(items));
        self
    }

    /// Data for series of `series_type`.
    pub fn data(mut self, data: impl Into<ChartData>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn series_type(mut self, series_type: impl Into<String>) -> Self {
        self.series_type = Some(series_type.into());
        self
    }

    /// How table data is split into series.
    pub fn ingest(mut self, ingest: IngestOptions) -> Self {
        self.ingest = ingest;
        self
    }

    pub fn container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn variable_name(mut self, name: impl Into<String>) -> Self {
        self.variable_name = Some(name.into());
        self
    }

    pub fn callback(mut self, callback: CallbackFunction) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn build(self) -> ChartResult<Chart> {
        if let Some(name) = &self.variable_name {
            check_variable_name(name)?;
        }
        let mut options = self.options;
        let series = match (self.series, self.data) {
            (Some(series), data) => {
                if data.is_some() {
                    warn!("ignoring data because series were supplied");
                }
                Some(series?)
            }
            (None, Some(data)) => {
                let series_type = self.series_type.ok_or_else(|| {
                    ChartError::invalid("series_type", "data was supplied without a series type")
                })?;
                Some(load_data(&series_type, data, &self.ingest)?)
            }
            (None, None) => None,
        };
        if let Some(series) = series {
            options.get_or_insert_with(HighchartsOptions::default).series = Some(series);
        }
        Ok(Chart {
            options,
            container: self.container,
            variable_name: self.variable_name,
            callback: self.callback,
        })
    }
}

fn load_data(series_type: &str, data: ChartData, ingest: &IngestOptions) -> ChartResult<Vec<AnySeries>> {
    match data {
        ChartData::Values(values) => {
            let mut series = AnySeries::of_type(series_type)?;
            series.set_data(values)?;
            Ok(vec![series])
        }
        ChartData::Table(table) => Ok(AnySeries::load(series_type, &table, ingest)?.into_vec()),
    }
}

fn check_variable_name(name: &str) -> ChartResult<()> {
    if literal::is_identifier(name) {
        Ok(())
    } else {
        Err(ChartError::invalid(
            "variable_name",
            format!("'{name}' is not a JavaScript identifier"),
        ))
    }
}

fn is_chart_constructor(callee: &str) -> bool {
    callee == "Highcharts.chart"
}

impl Chart {
    pub fn new(options: HighchartsOptions) -> Self {
        Self {
            options: Some(options),
            ..Default::default()
        }
    }

    pub fn builder() -> ChartBuilder {
        ChartBuilder::default()
    }

    pub fn container(&self) -> &str {
        self.container.as_deref().unwrap_or(DEFAULT_CONTAINER)
    }

    pub fn series(&self) -> &[AnySeries] {
        match &self.options {
            Some(options) => options.series_list(),
            None => &[],
        }
    }

    pub fn series_count(&self) -> usize {
        self.series().len()
    }

    pub fn get_series(&self, id: &str) -> Option<&AnySeries> {
        self.series().iter().find(|s| s.id() == Some(id))
    }

    /// Appends series, creating the options tree if needed. Nothing is
    /// appended if any item fails to convert.
    pub fn add_series<I>(&mut self, items: I) -> ChartResult<()>
    where
        I: IntoIterator,
        I::Item: IntoSeries,
    {
        let items = collect_series(items)?;
        self.options
            .get_or_insert_with(HighchartsOptions::default)
            .series_mut()
            .extend(items);
        Ok(())
    }

    /// Replaces each existing series whose `id` matches an item's. Items
    /// without a match are appended when `add_if_unmatched` is set, and are
    /// a `MissingSeries` error otherwise. On error no series is changed.
    pub fn update_series<I>(&mut self, items: I, add_if_unmatched: bool) -> ChartResult<()>
    where
        I: IntoIterator,
        I::Item: IntoSeries,
    {
        let items = collect_series(items)?;
        let mut plan = Vec::with_capacity(items.len());
        for item in items {
            let position = item
                .id()
                .and_then(|id| self.series().iter().position(|s| s.id() == Some(id)));
            let slot = match position {
                Some(idx) => Slot::Replace(idx),
                None if add_if_unmatched => Slot::Append,
                None => return Err(ChartError::MissingSeries(item.id().map(str::to_owned))),
            };
            plan.push((slot, item));
        }

        let existing = self
            .options
            .get_or_insert_with(HighchartsOptions::default)
            .series_mut();
        for (slot, item) in plan {
            match slot {
                Slot::Replace(idx) => existing[idx] = item,
                Slot::Append => existing.push(item),
            }
        }
        Ok(())
    }

    /// Options as JSON. Callbacks become strings.
    pub fn to_json(&self) -> ChartResult<String> {
        match &self.options {
            Some(options) => options.to_json(),
            None => Ok("{}".to_owned()),
        }
    }

    /// Script creating the chart once the page has loaded:
    ///
    /// ```text
    /// document.addEventListener('DOMContentLoaded', function() {
    /// var chart = Highcharts.chart('container', {...}, callback);
    /// });
    /// ```
    pub fn to_js_literal(&self, literal_options: &LiteralOptions) -> ChartResult<String> {
        let body = match &self.options {
            Some(options) => options.to_literal_text(false)?,
            None => "{}".to_owned(),
        };
        let mut call = format!(
            "Highcharts.chart({}, {body}",
            literal::quote_string(self.container())
        );
        if let Some(callback) = &self.callback {
            call.push_str(",\n");
            call.push_str(callback.source());
        }
        call.push(')');
        let statement = match &self.variable_name {
            Some(name) => {
                check_variable_name(name)?;
                format!("var {name} = {call};")
            }
            None => format!("{call};"),
        };
        let script = format!(
            "document.addEventListener('DOMContentLoaded', function() {{\n{statement}\n}});"
        );

        if literal_options.careful_validation {
            Self::from_js_literal(&script)?;
        }
        if let Some(path) = &literal_options.filename {
            std::fs::write(path, &script)?;
            debug!(path = %path.display(), "wrote chart script");
        }
        Ok(script)
    }

    /// Reads a chart back from a script holding a `Highcharts.chart` call,
    /// either at the top level or inside a `DOMContentLoaded` listener.
    pub fn from_js_literal(text: &str) -> ChartResult<Chart> {
        let program = parser::parse_program(text)?;
        let inner = match program.find_call(|callee| callee == "document.addEventListener") {
            Some((_, args)) => {
                let source = match args.get(1) {
                    Some(Expr::Function(source)) => source,
                    _ => {
                        return Err(ChartError::Parse(
                            "event listener is not a function expression".into(),
                        ))
                    }
                };
                let body = parser::function_body(source).ok_or_else(|| {
                    ChartError::Parse("event listener has no function body".into())
                })?;
                parser::parse_program(body)?
            }
            None => program,
        };
        Self::from_program(&inner)
    }

    fn from_program(program: &Program) -> ChartResult<Chart> {
        let (variable_name, args) = program
            .statements
            .iter()
            .find_map(|statement| match statement {
                Statement::Declaration {
                    name,
                    init: Some(Expr::Call { callee, args, .. }),
                    ..
                } if is_chart_constructor(callee) => Some((Some(name.clone()), args)),
                Statement::Expression(Expr::Call { callee, args, .. })
                    if is_chart_constructor(callee) =>
                {
                    Some((None, args))
                }
                _ => None,
            })
            .ok_or_else(|| ChartError::Parse("no Highcharts.chart call found".into()))?;

        // `Highcharts.chart(options)` is allowed when options name the target.
        let (container, rest) = match args.split_first() {
            Some((Expr::Str(container), rest)) => (Some(container.clone()), rest),
            _ => (None, args.as_slice()),
        };
        let options = match rest.first() {
            Some(expr @ Expr::Object(_)) => Some(HighchartsOptions::from_mapping(expr.clone().into_value())?),
            Some(_) => {
                return Err(ChartError::Parse(
                    "Highcharts.chart options must be an object literal".into(),
                ))
            }
            None => None,
        };
        let callback = match rest.get(1) {
            Some(Expr::Function(source)) => Some(CallbackFunction::new(source)?),
            Some(_) => return Err(ChartError::Parse("chart callback must be a function".into())),
            None => None,
        };
        Ok(Chart {
            options,
            container,
            variable_name,
            callback,
        })
    }

    /// `<script>` tags loading Highcharts and the modules this chart needs.
    pub fn script_tags(&self, module_url: &str) -> Vec<String> {
        let base = module_url.trim_end_matches('/');
        let mut modules = vec!["highcharts"];
        if self
            .series()
            .iter()
            .any(|s| MORE_SERIES.contains(&s.series_type()))
        {
            modules.push("highcharts-more");
        }
        let exporting = self
            .options
            .as_ref()
            .and_then(|o| o.exporting.as_ref())
            .is_some_and(|e| e.enabled != Some(false));
        if exporting {
            modules.push("modules/exporting");
        }
        modules
            .into_iter()
            .map(|module| format!("<script src=\"{base}/{module}.js\"></script>"))
            .collect()
    }

    /// Renders the chart on an export server.
    pub fn export(&self, client: &ExportClient, request: &ExportRequest) -> ChartResult<Vec<u8>> {
        match &self.options {
            Some(options) => client.export(options, request),
            None => client.export(&HighchartsOptions::default(), request),
        }
    }
}
