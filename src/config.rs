//! Process-wide defaults for the module URL and the export endpoint.

use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ChartError, ChartResult};

pub const MODULE_URL_VAR: &str = "CHARTOPTS_MODULE_URL";
pub const EXPORT_PROTOCOL_VAR: &str = "CHARTOPTS_EXPORT_PROTOCOL";
pub const EXPORT_DOMAIN_VAR: &str = "CHARTOPTS_EXPORT_DOMAIN";
pub const EXPORT_PORT_VAR: &str = "CHARTOPTS_EXPORT_PORT";
pub const EXPORT_PATH_VAR: &str = "CHARTOPTS_EXPORT_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default = "default_domain")]
    pub domain: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default = "default_path")]
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_module_url")]
    pub module_url: String,
    #[serde(default)]
    pub export: ExportSettings,
}

fn default_module_url() -> String {
    "https://code.highcharts.com/".to_owned()
}
fn default_protocol() -> String {
    "https".to_owned()
}
fn default_domain() -> String {
    "export.highcharts.com".to_owned()
}
fn default_path() -> String {
    "/".to_owned()
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            protocol: default_protocol(),
            domain: default_domain(),
            port: None,
            path: default_path(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            module_url: default_module_url(),
            export: ExportSettings::default(),
        }
    }
}

impl Settings {
    /// Defaults overridden by whatever `lookup` returns for each
    /// `CHARTOPTS_*` variable. Blank values are ignored.
    pub fn from_lookup<F>(lookup: F) -> ChartResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Settings::default();
        if let Some(url) = get(MODULE_URL_VAR) {
            settings.module_url = url;
        }
        if let Some(protocol) = get(EXPORT_PROTOCOL_VAR) {
            let protocol = protocol.trim().to_ascii_lowercase();
            if protocol != "http" && protocol != "https" {
                return Err(crate::coerce::unsupported(
                    EXPORT_PROTOCOL_VAR,
                    &protocol,
                    &["http", "https"],
                ));
            }
            settings.export.protocol = protocol;
        }
        if let Some(domain) = get(EXPORT_DOMAIN_VAR) {
            settings.export.domain = domain.trim().to_owned();
        }
        if let Some(port) = get(EXPORT_PORT_VAR) {
            let port = port.trim().parse::<u16>().map_err(|e| {
                ChartError::invalid(EXPORT_PORT_VAR, format!("'{port}' is not a port: {e}"))
            })?;
            settings.export.port = Some(port);
        }
        if let Some(path) = get(EXPORT_PATH_VAR) {
            settings.export.path = path;
        }
        Ok(settings)
    }

    pub fn from_env() -> ChartResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Environment settings, read once per process. A malformed
    /// environment falls back to the built-in defaults.
    pub fn global() -> &'static Settings {
        static SETTINGS: OnceLock<Settings> = OnceLock::new();
        SETTINGS.get_or_init(|| {
            Self::from_env().unwrap_or_else(|err| {
                warn!(error = %err, "ignoring malformed environment settings");
                Settings::default()
            })
        })
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ChartResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
