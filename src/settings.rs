use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::parser::sections::DEFAULT_MARGIN;

/// Startup settings: an optional `resume_parser.toml` next to the binary's
/// working directory, overridden by `RESUME_*` environment variables.
///
/// Paths left unset fall back to the resources embedded in the binary.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    #[serde(default)]
    pub taxonomy_path: Option<PathBuf>,
    #[serde(default)]
    pub gazetteer_path: Option<PathBuf>,
    #[serde(default = "default_margin")]
    pub header_footer_margin: f32,
}

fn default_margin() -> f32 {
    DEFAULT_MARGIN
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            catalog_path: None,
            taxonomy_path: None,
            gazetteer_path: None,
            header_footer_margin: DEFAULT_MARGIN,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("resume_parser").required(false))
            .add_source(Environment::with_prefix("RESUME"))
            .build()?
            .try_deserialize()
    }
}
