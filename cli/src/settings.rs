//! Resolution of the scheme and chain id from flags, environment and an
//! optional JSON config file.
//!
//! ```json
//! { "scheme": { "name": "Jesserc", "offset": 29 }, "chain_id": 1 }
//! ```
//!
//! Either key may be omitted. Within `scheme`, both fields are required.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use stamp_protocol::config::{DEFAULT_CHAIN_ID, DEFAULT_SCHEME_NAME, DEFAULT_SCHEME_OFFSET};
use stamp_protocol::SchemeConfig;

use crate::cli::GlobalArgs;

/// Contents of a `--config` file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub scheme: Option<SchemeConfig>,
    pub chain_id: Option<u16>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub scheme: SchemeConfig,
    pub chain_id: u16,
}

impl Settings {
    /// Merges flags (and their env vars) over the config file over defaults.
    pub fn resolve(args: &GlobalArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    fn merge(args: &GlobalArgs, file: FileConfig) -> Result<Self> {
        let (file_name, file_offset) = match file.scheme {
            Some(scheme) => (Some(scheme.name().to_string()), Some(scheme.offset())),
            None => (None, None),
        };

        let name = args
            .scheme_name
            .clone()
            .or(file_name)
            .unwrap_or_else(|| DEFAULT_SCHEME_NAME.to_string());
        let offset = args
            .scheme_offset
            .or(file_offset)
            .unwrap_or(DEFAULT_SCHEME_OFFSET);

        let scheme = SchemeConfig::new(name, offset).context("invalid scheme settings")?;
        let chain_id = args.chain_id.or(file.chain_id).unwrap_or(DEFAULT_CHAIN_ID);

        Ok(Self { scheme, chain_id })
    }
}
