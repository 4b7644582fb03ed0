// Library exports for chartopts

pub mod callback;
pub mod chart;
pub mod coerce;
pub mod color;
pub mod config;
pub mod csv_reader;
pub mod data;
pub mod error;
pub mod export;
pub mod ingest;
pub mod literal;
pub mod node;
pub mod options;
pub mod parser;
pub mod series;
pub mod telemetry;
pub mod value;

pub use callback::CallbackFunction;
pub use chart::{Chart, ChartBuilder, ChartData, LiteralOptions};
pub use color::Color;
pub use config::Settings;
pub use csv_reader::CsvOptions;
pub use data::{Frame, Table};
pub use error::{ChartError, ChartResult};
pub use export::{ExportClient, ExportRequest};
pub use ingest::{ColumnMapping, ColumnRef, IngestOptions};
pub use node::Node;
pub use options::{ExportType, HighchartsOptions, SharedOptions};
pub use series::{AnySeries, DataInput, IntoSeries, Loaded, SeriesNode};
pub use value::{Map, Value};
