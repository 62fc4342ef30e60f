use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

const DEFAULT_ENDPOINT: &str = "http://192.168.1.1";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint: Url,
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("static URL is known to be good"),
            timeout_secs: None,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&raw).context("parsing config JSON")
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_to_access_point_address() {
        let config = Config::default();
        assert_eq!(config.endpoint.as_str(), "http://192.168.1.1/");
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn reads_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "timeout_secs": 15 }}"#).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.endpoint, Config::default().endpoint);
        assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn reads_endpoint() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "endpoint": "http://10.0.0.7:8080" }}"#).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.endpoint.as_str(), "http://10.0.0.7:8080/");
    }

    #[test]
    fn rejects_bad_endpoint() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "endpoint": "not a url" }}"#).unwrap();

        assert!(Config::from_file(file.path()).is_err());
    }
}
