// src/config.rs

use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info};

use crate::error::{FlowError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "etf_flows.yaml";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36";

/// Run settings. Every field has a default, so an empty YAML file is valid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where the CSVs are written.
    pub out_dir: PathBuf,
    /// Docs copy target; `None` disables publishing.
    pub docs_dir: Option<PathBuf>,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Insert every calendar day between the first and last date.
    pub fill_calendar_gaps: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("Data"),
            docs_dir: Some(PathBuf::from("docs").join("Data")),
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fill_calendar_gaps: false,
        }
    }
}

impl Config {
    /// YAML file (if present) followed by `ETF_FLOWS_*` environment overrides.
    pub fn load() -> Result<Self> {
        let path = env::var("ETF_FLOWS_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut cfg = if path.exists() {
            info!(path = %path.display(), "loading config");
            Self::from_yaml_file(&path)?
        } else {
            debug!(path = %path.display(), "no config file; using defaults");
            Self::default()
        };
        cfg.apply_overrides(|key| env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| FlowError::io(path, e))?;
        Self::from_yaml_str(&text)
            .map_err(|e| FlowError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| FlowError::Config(e.to_string()))
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ETF_FLOWS_OUT_DIR") {
            self.out_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("ETF_FLOWS_DOCS_DIR") {
            // empty string switches publishing off
            self.docs_dir = if v.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(v))
            };
        }
        if let Some(v) = lookup("ETF_FLOWS_TIMEOUT_SECS") {
            self.timeout_secs = v.trim().parse().map_err(|_| {
                FlowError::Config(format!("ETF_FLOWS_TIMEOUT_SECS: not a number: {:?}", v))
            })?;
        }
        if let Some(v) = lookup("ETF_FLOWS_USER_AGENT") {
            self.user_agent = v;
        }
        if let Some(v) = lookup("ETF_FLOWS_FILL_GAPS") {
            self.fill_calendar_gaps = parse_bool(&v).ok_or_else(|| {
                FlowError::Config(format!("ETF_FLOWS_FILL_GAPS: not a boolean: {:?}", v))
            })?;
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_from_empty_yaml() -> Result<()> {
        let cfg = Config::from_yaml_str("")?;
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.out_dir, PathBuf::from("Data"));
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
        Ok(())
    }

    #[test]
    fn test_yaml_file_partial() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(tmp, "out_dir: out\ntimeout_secs: 5\ndocs_dir: null")?;
        let cfg = Config::from_yaml_file(tmp.path())?;
        assert_eq!(cfg.out_dir, PathBuf::from("out"));
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.docs_dir, None);
        assert!(!cfg.fill_calendar_gaps);
        Ok(())
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Config::from_yaml_str("out_dirr: x").unwrap_err();
        assert!(matches!(err, FlowError::Config(_)));
    }

    #[test]
    fn test_env_overrides() -> Result<()> {
        let vars: HashMap<&str, &str> = [
            ("ETF_FLOWS_OUT_DIR", "/tmp/flows"),
            ("ETF_FLOWS_DOCS_DIR", ""),
            ("ETF_FLOWS_TIMEOUT_SECS", "12"),
            ("ETF_FLOWS_FILL_GAPS", "yes"),
        ]
        .into_iter()
        .collect();

        let mut cfg = Config::default();
        cfg.apply_overrides(|k| vars.get(k).map(|v| v.to_string()))?;
        assert_eq!(cfg.out_dir, PathBuf::from("/tmp/flows"));
        assert_eq!(cfg.docs_dir, None);
        assert_eq!(cfg.timeout_secs, 12);
        assert!(cfg.fill_calendar_gaps);
        Ok(())
    }

    #[test]
    fn test_bad_timeout_override() {
        let mut cfg = Config::default();
        let err = cfg
            .apply_overrides(|k| (k == "ETF_FLOWS_TIMEOUT_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("ETF_FLOWS_TIMEOUT_SECS"));
    }
}
