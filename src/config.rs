use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Server configuration, read from a JSON file.
///
/// The file location comes from the `CONFIG` environment variable and
/// defaults to `config.json` in the working directory.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Host the listener binds (together with `port`).
    pub host: String,
    /// TCP port to listen on.
    pub port: u16,
    /// Directory static files are served from.
    pub document_root: PathBuf,
    /// File served when the request path is "/".
    pub welcome_file: String,
    /// Upper bound on a declared POST body; requests above it get a 413.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG").unwrap_or_else(|_| "config.json".to_string());
        Self::from_file(&path)
    }

    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path))?;
        Ok(config)
    }

    /// Address the listener binds, `host:port`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
