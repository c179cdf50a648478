use crate::error::{MyqueryError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Location of the myquery service and its endpoints.
///
/// Defaults point at the production deployment. A config can be built in
/// code, loaded from YAML with [`load_config`], and is handed to
/// [`crate::Client`] at construction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct MyqueryConfig {
    /// "http" or "https"
    pub protocol: String,
    /// Fully qualified host of the myquery server, optionally with a port.
    pub server: String,
    pub mysampler_path: String,
    pub interval_path: String,
    pub point_path: String,
    pub channel_path: String,
    pub mystats_path: String,
}

impl Default for MyqueryConfig {
    fn default() -> Self {
        Self {
            protocol: "https".to_string(),
            server: "epicsweb.jlab.org".to_string(),
            mysampler_path: "/myquery/mysampler".to_string(),
            interval_path: "/myquery/interval".to_string(),
            point_path: "/myquery/point".to_string(),
            channel_path: "/myquery/channel".to_string(),
            mystats_path: "/myquery/mystats".to_string(),
        }
    }
}

impl MyqueryConfig {
    fn endpoint_url(&self, path: &str) -> String {
        format!("{}://{}{}", self.protocol, self.server, path)
    }

    pub fn mysampler_url(&self) -> String {
        self.endpoint_url(&self.mysampler_path)
    }

    pub fn interval_url(&self) -> String {
        self.endpoint_url(&self.interval_path)
    }

    pub fn point_url(&self) -> String {
        self.endpoint_url(&self.point_path)
    }

    pub fn channel_url(&self) -> String {
        self.endpoint_url(&self.channel_path)
    }

    pub fn mystats_url(&self) -> String {
        self.endpoint_url(&self.mystats_path)
    }
}

/// Load configuration from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<MyqueryConfig> {
    let content = std::fs::read_to_string(&path)?;
    let config: MyqueryConfig = serde_yaml_ng::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate configuration
pub(crate) fn validate_config(config: &MyqueryConfig) -> Result<()> {
    if config.server.is_empty() {
        return Err(MyqueryError::Config("server cannot be empty".to_string()));
    }

    if config.protocol != "http" && config.protocol != "https" {
        return Err(MyqueryError::Config(format!(
            "unsupported protocol: {}",
            config.protocol
        )));
    }

    for (name, path) in [
        ("mysampler_path", &config.mysampler_path),
        ("interval_path", &config.interval_path),
        ("point_path", &config.point_path),
        ("channel_path", &config.channel_path),
        ("mystats_path", &config.mystats_path),
    ] {
        if !path.starts_with('/') {
            return Err(MyqueryError::Config(format!(
                "{name} must start with '/': {path}"
            )));
        }

        // Catch malformed hosts/ports before the first request does.
        let url = config.endpoint_url(path);
        Url::parse(&url)
            .map_err(|e| MyqueryError::Config(format!("invalid endpoint URL {url}: {e}")))?;
    }

    Ok(())
}
