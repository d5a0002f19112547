use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of eager peers requested from the sampler at startup.
pub const DEFAULT_FANOUT: usize = 10;

/// Environment variable overriding the default fanout.
pub const FANOUT_ENV: &str = "TOM_PLUMTREE_FANOUT";

/// Configuration for a [`PeerRoleTracker`](crate::PeerRoleTracker).
///
/// All fields have sensible defaults. Use the builder pattern:
///
/// ```rust
/// use tom_plumtree::TrackerConfig;
///
/// let config = TrackerConfig::new().fanout(6);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Upper bound on peers seeded into the eager set by `initialize`.
    pub(crate) fanout: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerConfig {
    /// Create a new config with defaults.
    ///
    /// If `TOM_PLUMTREE_FANOUT` is set to a positive integer it replaces the
    /// default fanout. Invalid values are ignored; use [`from_env`](Self::from_env)
    /// to surface them.
    pub fn new() -> Self {
        let raw = std::env::var(FANOUT_ENV).ok();
        let fanout = resolve_fanout(raw.as_deref()).unwrap_or(DEFAULT_FANOUT);

        Self { fanout }
    }

    /// Like [`new`](Self::new), but fails on a malformed environment value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var(FANOUT_ENV).ok();
        Ok(Self {
            fanout: resolve_fanout(raw.as_deref())?,
        })
    }

    /// Set the initialization fanout (default: 10).
    pub fn fanout(mut self, fanout: usize) -> Self {
        self.fanout = fanout;
        self
    }

    /// Reject configurations the tracker cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fanout == 0 {
            return Err(ConfigError::ZeroFanout);
        }
        Ok(())
    }
}

/// Fanout from an optional `TOM_PLUMTREE_FANOUT` value; unset means default.
fn resolve_fanout(raw: Option<&str>) -> Result<usize, ConfigError> {
    match raw {
        Some(raw) => parse_fanout(raw),
        None => Ok(DEFAULT_FANOUT),
    }
}

fn parse_fanout(raw: &str) -> Result<usize, ConfigError> {
    let fanout = raw
        .trim()
        .parse::<usize>()
        .map_err(|source| ConfigError::InvalidEnv {
            var: FANOUT_ENV,
            value: raw.to_string(),
            source,
        })?;
    if fanout == 0 {
        return Err(ConfigError::ZeroFanout);
    }
    Ok(fanout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_fanout() {
        let config = TrackerConfig::new().fanout(3);
        assert_eq!(config.fanout, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_fanout_is_invalid() {
        let config = TrackerConfig::new().fanout(0);
        assert!(matches!(config.validate(), Err(ConfigError::ZeroFanout)));
    }

    #[test]
    fn parse_fanout_values() {
        assert_eq!(parse_fanout("12").unwrap(), 12);
        assert_eq!(parse_fanout(" 4\n").unwrap(), 4);
        assert!(matches!(parse_fanout("0"), Err(ConfigError::ZeroFanout)));
        assert!(matches!(
            parse_fanout("many"),
            Err(ConfigError::InvalidEnv { var: FANOUT_ENV, .. })
        ));
    }

    #[test]
    fn deserialize_fills_missing_fields() {
        let config: TrackerConfig = serde_json::from_str(r#"{"fanout": 5}"#).unwrap();
        assert_eq!(config.fanout, 5);

        // Missing field falls back to whatever `new()` resolves
        let config: TrackerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, TrackerConfig::new());
    }

    #[test]
    fn resolve_fanout_defaults_when_unset() {
        assert_eq!(DEFAULT_FANOUT, 10);
        assert_eq!(resolve_fanout(None).unwrap(), DEFAULT_FANOUT);
        assert_eq!(resolve_fanout(Some("3")).unwrap(), 3);
        assert!(matches!(
            resolve_fanout(Some("lots")),
            Err(ConfigError::InvalidEnv { var: FANOUT_ENV, .. })
        ));
        assert!(matches!(resolve_fanout(Some("0")), Err(ConfigError::ZeroFanout)));
    }
}
