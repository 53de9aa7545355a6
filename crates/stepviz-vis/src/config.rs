//! Service configuration, read from `STEPVIZ_*` environment variables.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use stepviz_algo::DEFAULT_BUCKETS;
use stepviz_layout::DEFAULT_VIEWPORT_WIDTH;

use crate::{Error, Result};

/// Per-family pause between two replayed steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDelays {
    pub tree: Duration,
    pub graph: Duration,
    pub hash: Duration,
    pub heap: Duration,
}

impl Default for StepDelays {
    fn default() -> Self {
        Self {
            tree: Duration::from_millis(500),
            graph: Duration::from_millis(700),
            hash: Duration::from_millis(600),
            heap: Duration::from_millis(800),
        }
    }
}

/// Visualization service configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct VisConfig {
    /// HTTP bind address
    pub addr: SocketAddr,
    /// Width the layout engine centers trees in
    pub viewport_width: f64,
    /// Bucket count of the hash table
    pub hash_buckets: usize,
    /// Seed for graph spawn positions
    pub seed: u64,
    /// Step pacing
    pub delays: StepDelays,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            hash_buckets: DEFAULT_BUCKETS,
            seed: 42,
            delays: StepDelays::default(),
        }
    }
}

impl VisConfig {
    /// Create config from environment variables, falling back to defaults for
    /// unset ones.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let delays = StepDelays {
            tree: millis(&lookup, "STEPVIZ_TREE_DELAY_MS", defaults.delays.tree)?,
            graph: millis(&lookup, "STEPVIZ_GRAPH_DELAY_MS", defaults.delays.graph)?,
            hash: millis(&lookup, "STEPVIZ_HASH_DELAY_MS", defaults.delays.hash)?,
            heap: millis(&lookup, "STEPVIZ_HEAP_DELAY_MS", defaults.delays.heap)?,
        };

        let config = Self {
            addr: parsed(&lookup, "STEPVIZ_ADDR", defaults.addr)?,
            viewport_width: parsed(&lookup, "STEPVIZ_VIEWPORT_WIDTH", defaults.viewport_width)?,
            hash_buckets: parsed(&lookup, "STEPVIZ_HASH_BUCKETS", defaults.hash_buckets)?,
            seed: parsed(&lookup, "STEPVIZ_SEED", defaults.seed)?,
            delays,
        };

        if config.hash_buckets == 0 {
            return Err(Error::Config {
                key: "STEPVIZ_HASH_BUCKETS",
                value: "0".into(),
            });
        }
        if !(config.viewport_width.is_finite() && config.viewport_width > 0.0) {
            return Err(Error::Config {
                key: "STEPVIZ_VIEWPORT_WIDTH",
                value: config.viewport_width.to_string(),
            });
        }
        Ok(config)
    }
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| Error::Config { key, value }),
    }
}

fn millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: Duration,
) -> Result<Duration> {
    let default_ms = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
    parsed(lookup, key, default_ms).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = VisConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, VisConfig::default());
        assert_eq!(config.delays.heap, Duration::from_millis(800));
        assert_eq!(config.addr.port(), 3000);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = VisConfig::from_lookup(lookup(&[
            ("STEPVIZ_ADDR", "127.0.0.1:8080"),
            ("STEPVIZ_HASH_BUCKETS", "7"),
            ("STEPVIZ_GRAPH_DELAY_MS", " 50 "),
        ]))
        .unwrap();
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.hash_buckets, 7);
        assert_eq!(config.delays.graph, Duration::from_millis(50));
        assert_eq!(config.delays.tree, Duration::from_millis(500));
    }

    #[test]
    fn bad_values_name_the_variable() {
        let err = VisConfig::from_lookup(lookup(&[("STEPVIZ_SEED", "lots")])).unwrap_err();
        assert!(matches!(err, Error::Config { key: "STEPVIZ_SEED", .. }));

        let err = VisConfig::from_lookup(lookup(&[("STEPVIZ_HASH_BUCKETS", "0")])).unwrap_err();
        assert!(matches!(err, Error::Config { key: "STEPVIZ_HASH_BUCKETS", .. }));
    }
}
