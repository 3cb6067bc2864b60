//! Runtime configuration
//!
//! Every setting comes from an environment variable with a default suited to
//! local development:
//!
//! | Variable             | Default                                           |
//! |----------------------|---------------------------------------------------|
//! | `QEDU_BASE_URL`      | `https://qedu.org.br/api/v1`                      |
//! | `DATA_DIR`           | `dados`                                           |
//! | `IDEB_MUN_CSV`       | `$DATA_DIR/ideb_saeb_municipios_28_07_final 1.csv`|
//! | `IDEB_UF_CSV`        | `$DATA_DIR/ideb_saeb_estados_28_07_final 1.csv`   |
//! | `OUTPUT_DIR`         | unset (reports are not written to disk)           |
//! | `PORT`               | `8000`                                            |
//! | `FETCH_TIMEOUT_SECS` | `30`                                              |
//! | `FETCH_ATTEMPTS`     | `3`                                               |
//! | `FETCH_BACKOFF_MS`   | `500`                                             |
//! | `REPORT_YEAR`        | current calendar year                             |

use chrono::Datelike;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://qedu.org.br/api/v1";
pub const DEFAULT_MUN_CSV: &str = "ideb_saeb_municipios_28_07_final 1.csv";
pub const DEFAULT_UF_CSV: &str = "ideb_saeb_estados_28_07_final 1.csv";

/// Retry behaviour for remote fetches: fixed backoff between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { attempts: 3, backoff: Duration::from_millis(500) }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub municipal_table: PathBuf,
    pub state_table: PathBuf,
    /// When set, each run writes its text reports to `<output_dir>/<code>/`.
    pub output_dir: Option<PathBuf>,
    pub port: u16,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// Newest year tried by the year-fallback resolvers.
    pub reference_year: i32,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = PathBuf::from("dados");
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            municipal_table: data_dir.join(DEFAULT_MUN_CSV),
            state_table: data_dir.join(DEFAULT_UF_CSV),
            output_dir: None,
            port: 8000,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            reference_year: chrono::Local::now().year(),
        }
    }
}

impl Settings {
    /// Build settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let data_dir = lookup("DATA_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("dados"));

        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        Self {
            base_url: lookup("QEDU_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            municipal_table: lookup("IDEB_MUN_CSV")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join(DEFAULT_MUN_CSV)),
            state_table: lookup("IDEB_UF_CSV")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join(DEFAULT_UF_CSV)),
            output_dir: lookup("OUTPUT_DIR").filter(|s| !s.trim().is_empty()).map(PathBuf::from),
            port: lookup("PORT").and_then(|p| p.trim().parse().ok()).unwrap_or(defaults.port),
            timeout: parsed("FETCH_TIMEOUT_SECS").map(Duration::from_secs).unwrap_or(defaults.timeout),
            retry: RetryPolicy {
                attempts: parsed("FETCH_ATTEMPTS")
                    .map(|n| n.max(1) as u32)
                    .unwrap_or(defaults.retry.attempts),
                backoff: parsed("FETCH_BACKOFF_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.retry.backoff),
            },
            reference_year: lookup("REPORT_YEAR")
                .and_then(|y| y.trim().parse().ok())
                .unwrap_or(defaults.reference_year),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.retry.attempts, 3);
        assert_eq!(settings.retry.backoff, Duration::from_millis(500));
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert!(settings.output_dir.is_none());
        assert!(settings.municipal_table.ends_with(DEFAULT_MUN_CSV));
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("QEDU_BASE_URL", "http://localhost:9000/api/"),
            ("DATA_DIR", "/srv/data"),
            ("OUTPUT_DIR", "/tmp/out"),
            ("PORT", "3000"),
            ("FETCH_ATTEMPTS", "0"),
            ("FETCH_BACKOFF_MS", "0"),
            ("REPORT_YEAR", "2025"),
        ]));
        assert_eq!(settings.base_url, "http://localhost:9000/api");
        assert_eq!(settings.state_table, PathBuf::from("/srv/data").join(DEFAULT_UF_CSV));
        assert_eq!(settings.output_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(settings.port, 3000);
        assert_eq!(settings.retry.attempts, 1);
        assert_eq!(settings.retry.backoff, Duration::ZERO);
        assert_eq!(settings.reference_year, 2025);
    }
}
