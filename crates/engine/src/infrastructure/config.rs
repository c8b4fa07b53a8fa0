//! Engine configuration loaded from the environment.

use atlas_domain::{MaxDepth, DEFAULT_MAX_DEPTH};

pub const DATABASE_PATH_KEY: &str = "ATLAS_DATABASE_PATH";
pub const MAX_DEPTH_KEY: &str = "ATLAS_MAX_DEPTH";
pub const MAX_BATCH_ITEMS_KEY: &str = "ATLAS_MAX_BATCH_ITEMS";
pub const LOG_FILTER_KEY: &str = "ATLAS_LOG";

const DEFAULT_DATABASE_PATH: &str = "atlas.db";
const DEFAULT_MAX_BATCH_ITEMS: usize = 50;
const DEFAULT_LOG_FILTER: &str = "atlas_engine=info";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings for the location engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// SQLite file backing the location store
    pub database_path: String,
    pub max_depth: MaxDepth,
    /// Largest accepted bulk request; `None` means no cap
    pub max_batch_items: Option<usize>,
    /// Log filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            max_depth: MaxDepth::default(),
            max_batch_items: Some(DEFAULT_MAX_BATCH_ITEMS),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl EngineConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let database_path = lookup(DATABASE_PATH_KEY)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.database_path);

        let max_depth = match lookup(MAX_DEPTH_KEY) {
            Some(raw) => parse_max_depth(&raw)?,
            None => defaults.max_depth,
        };

        let max_batch_items = match lookup(MAX_BATCH_ITEMS_KEY) {
            Some(raw) => parse_batch_cap(&raw)?,
            None => defaults.max_batch_items,
        };

        let log_filter = lookup(LOG_FILTER_KEY)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.log_filter);

        Ok(Self {
            database_path,
            max_depth,
            max_batch_items,
            log_filter,
        })
    }
}

fn parse_max_depth(raw: &str) -> Result<MaxDepth, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: MAX_DEPTH_KEY,
        value: raw.to_string(),
        reason,
    };
    let levels: u8 = raw
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| invalid(e.to_string()))?;
    MaxDepth::new(levels).map_err(|e| invalid(e.to_string()))
}

fn parse_batch_cap(raw: &str) -> Result<Option<usize>, ConfigError> {
    let cap: usize = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
        ConfigError::Invalid {
            key: MAX_BATCH_ITEMS_KEY,
            value: raw.to_string(),
            reason: e.to_string(),
        }
    })?;
    Ok((cap > 0).then_some(cap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.database_path, "atlas.db");
        assert_eq!(config.max_depth.levels(), usize::from(DEFAULT_MAX_DEPTH));
        assert_eq!(config.max_batch_items, Some(50));
        assert_eq!(config.log_filter, "atlas_engine=info");
    }

    #[test]
    fn reads_every_key() {
        let config = EngineConfig::from_lookup(lookup(&[
            (DATABASE_PATH_KEY, "/tmp/campaigns.db"),
            (MAX_DEPTH_KEY, "6"),
            (MAX_BATCH_ITEMS_KEY, "20"),
            (LOG_FILTER_KEY, "atlas_engine=debug"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, "/tmp/campaigns.db");
        assert_eq!(config.max_depth.levels(), 6);
        assert_eq!(config.max_batch_items, Some(20));
        assert_eq!(config.log_filter, "atlas_engine=debug");
    }

    #[test]
    fn zero_batch_cap_disables_the_limit() {
        let config = EngineConfig::from_lookup(lookup(&[(MAX_BATCH_ITEMS_KEY, "0")])).unwrap();
        assert_eq!(config.max_batch_items, None);
    }

    #[test]
    fn rejects_bad_depths() {
        for bad in ["0", "-1", "ten", "300"] {
            let err = EngineConfig::from_lookup(lookup(&[(MAX_DEPTH_KEY, bad)])).unwrap_err();
            assert!(matches!(
                err,
                ConfigError::Invalid {
                    key: MAX_DEPTH_KEY,
                    ..
                }
            ));
        }
    }

    #[test]
    fn rejects_bad_batch_cap() {
        let err =
            EngineConfig::from_lookup(lookup(&[(MAX_BATCH_ITEMS_KEY, "lots")])).unwrap_err();
        assert!(err.to_string().contains(MAX_BATCH_ITEMS_KEY));
    }
}
