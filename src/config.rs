use std::env;

use crate::board::STALE_AFTER_MINUTES;
use crate::http_client::DEFAULT_TIMEOUT_SECS;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_RECORDS_PATH: &str = "/Records";
pub const DEFAULT_REFERENCE_PATH: &str = "/Reference_Key";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub records_path: String,
    pub reference_path: String,
    pub viewer_tz: Option<String>,
    pub stale_after_minutes: i64,
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            records_path: DEFAULT_RECORDS_PATH.to_string(),
            reference_path: DEFAULT_REFERENCE_PATH.to_string(),
            viewer_tz: None,
            stale_after_minutes: STALE_AFTER_MINUTES,
            http_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Reads `NEBULA_*` variables from the process environment. Call after
    /// `dotenvy` has had a chance to populate it.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str, default: String| {
            lookup(key)
                .map(|val| val.trim().to_string())
                .filter(|val| !val.is_empty())
                .unwrap_or(default)
        };

        Self {
            base_url: text("NEBULA_BASE_URL", defaults.base_url),
            records_path: text("NEBULA_RECORDS_PATH", defaults.records_path),
            reference_path: text("NEBULA_REFERENCE_PATH", defaults.reference_path),
            viewer_tz: lookup("NEBULA_VIEWER_TZ")
                .map(|val| val.trim().to_string())
                .filter(|val| !val.is_empty()),
            stale_after_minutes: lookup("NEBULA_STALE_MINUTES")
                .and_then(|val| val.trim().parse::<i64>().ok())
                .unwrap_or(defaults.stale_after_minutes)
                .clamp(1, 1440),
            http_timeout_secs: lookup("NEBULA_HTTP_TIMEOUT_SECS")
                .and_then(|val| val.trim().parse::<u64>().ok())
                .unwrap_or(defaults.http_timeout_secs)
                .clamp(1, 120),
        }
    }

    pub fn records_url(&self) -> String {
        join_url(&self.base_url, &self.records_path)
    }

    pub fn reference_url(&self) -> String {
        join_url(&self.base_url, &self.reference_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.records_url(), "http://localhost:3000/Records");
        assert_eq!(config.reference_url(), "http://localhost:3000/Reference_Key");
    }

    #[test]
    fn overrides_are_trimmed_and_joined() {
        let config = Config::from_lookup(lookup_from(&[
            ("NEBULA_BASE_URL", " https://feeds.example.com/ "),
            ("NEBULA_RECORDS_PATH", "api/Records"),
            ("NEBULA_VIEWER_TZ", "Europe/Berlin"),
        ]));
        assert_eq!(config.records_url(), "https://feeds.example.com/api/Records");
        assert_eq!(config.viewer_tz.as_deref(), Some("Europe/Berlin"));
    }

    #[test]
    fn absolute_path_bypasses_base() {
        let config = Config::from_lookup(lookup_from(&[(
            "NEBULA_REFERENCE_PATH",
            "https://mirror.example.com/Reference_Key",
        )]));
        assert_eq!(
            config.reference_url(),
            "https://mirror.example.com/Reference_Key"
        );
    }

    #[test]
    fn numeric_values_fall_back_and_clamp() {
        let config = Config::from_lookup(lookup_from(&[
            ("NEBULA_STALE_MINUTES", "soon"),
            ("NEBULA_HTTP_TIMEOUT_SECS", "9000"),
        ]));
        assert_eq!(config.stale_after_minutes, STALE_AFTER_MINUTES);
        assert_eq!(config.http_timeout_secs, 120);

        let config = Config::from_lookup(lookup_from(&[("NEBULA_STALE_MINUTES", "0")]));
        assert_eq!(config.stale_after_minutes, 1);
    }
}
