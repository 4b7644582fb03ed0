use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid value for `{field}`: {message}")]
    InvalidValue { field: String, message: String },

    #[error("unsupported value for `{field}`: '{value}' (expected one of: {allowed})")]
    UnsupportedValue {
        field: String,
        value: String,
        allowed: String,
    },

    #[error("`{node}` has no field named `{name}`")]
    UnknownField { node: &'static str, name: String },

    #[error("`{node}` has no attribute `{name}`")]
    MissingAttribute { node: &'static str, name: String },

    #[error("unrecognized series type '{0}'")]
    UnknownSeriesType(String),

    #[error("missing required discriminator `{field}` in {context}")]
    MissingDiscriminator { field: &'static str, context: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("optional capability `{0}` is not enabled in this build")]
    Dependency(&'static str),

    #[error("export error: {0}")]
    Export(String),

    #[error("series type '{0}' is not supported by the export server")]
    UnsupportedExport(String),

    #[error("no existing series matches id {0:?}")]
    MissingSeries(Option<String>),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "export")]
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ChartError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_owned(),
            message: message.into(),
        }
    }

    /// True for the value-error family: bad field input, unknown names,
    /// unrecognized series types and argument misuse.
    pub fn is_value_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidValue { .. }
                | Self::UnsupportedValue { .. }
                | Self::UnknownField { .. }
                | Self::MissingAttribute { .. }
                | Self::UnknownSeriesType(_)
                | Self::MissingDiscriminator { .. }
        )
    }
}
