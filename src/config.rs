use std::{
    fs,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_CODEFORCES_API_URL: &str = "https://codeforces.com/api/contest.list";
pub const DEFAULT_LEETCODE_URL: &str = "https://leetcode.com/contest/";
pub const DEFAULT_CODECHEF_URL: &str = "https://www.codechef.com/contests";

/// Startup configuration. Built once and handed to the sources and the router.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub static_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub codeforces_api_url: String,
    pub leetcode_url: String,
    pub codechef_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 8000,
            static_dir: PathBuf::from("static"),
            request_timeout_secs: 10,
            codeforces_api_url: DEFAULT_CODEFORCES_API_URL.to_string(),
            leetcode_url: DEFAULT_LEETCODE_URL.to_string(),
            codechef_url: DEFAULT_CODECHEF_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the optional JSON file, then `CONTESTS_*` style environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => read_config(path)?,
            None => AppConfig::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("CONTESTS_HOST") {
            self.host = parse_value("CONTESTS_HOST", value)?;
        }
        if let Some(value) = lookup("CONTESTS_PORT") {
            self.port = parse_value("CONTESTS_PORT", value)?;
        }
        if let Some(value) = lookup("CONTESTS_STATIC_DIR") {
            self.static_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("CONTESTS_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_value("CONTESTS_TIMEOUT_SECS", value)?;
        }
        if let Some(value) = lookup("CODEFORCES_API_URL") {
            self.codeforces_api_url = value;
        }
        if let Some(value) = lookup("LEETCODE_URL") {
            self.leetcode_url = value;
        }
        if let Some(value) = lookup("CODECHEF_URL") {
            self.codechef_url = value;
        }
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_file_keeps_defaults() {
        let path = std::env::temp_dir().join(format!("contest-scrape-{}.json", std::process::id()));
        fs::write(&path, r#"{"port": 9100, "request_timeout_secs": 3}"#).unwrap();

        let config = read_config(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.port, 9100);
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.leetcode_url, DEFAULT_LEETCODE_URL);
        assert_eq!(config.static_dir, PathBuf::from("static"));
    }

    #[test]
    fn overrides_replace_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("CONTESTS_HOST", "127.0.0.1"),
            ("CONTESTS_PORT", "8080"),
            ("CODECHEF_URL", "http://localhost:9000/contests"),
        ]);
        let config = AppConfig::default()
            .with_overrides(|key| env.get(key).map(|value| value.to_string()))
            .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.codechef_url, "http://localhost:9000/contests");
        assert_eq!(config.codeforces_api_url, DEFAULT_CODEFORCES_API_URL);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let err = AppConfig::default()
            .with_overrides(|key| (key == "CONTESTS_PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "CONTESTS_PORT",
                ..
            }
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/contest-scrape.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
