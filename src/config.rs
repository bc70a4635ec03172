//! Runtime configuration: defaults, environment overrides and validation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;

/// Top-level settings for the server and the engine policies.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP bind address.
    pub bind_addr: SocketAddr,
    /// JSON file holding the block array.
    pub chain_file: PathBuf,
    pub activity: ActivityConfig,
    pub tally: TallyConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            chain_file: PathBuf::from("blockchain.json"),
            activity: ActivityConfig::default(),
            tally: TallyConfig::default(),
        }
    }
}

/// Recent-activity feed bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityConfig {
    /// Blocks older than this are left out.
    pub window_minutes: i64,
    /// Maximum entries returned.
    pub max_results: usize,
    /// Number of trailing blocks inspected.
    pub scan_depth: usize,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            window_minutes: 5,
            max_results: 5,
            scan_depth: 10,
        }
    }
}

/// Participation and voting-period policy for statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TallyConfig {
    /// Registered voters; enables a real participation percentage.
    pub eligible_voters: Option<u64>,
    /// Display ceiling used when no voter roll is known.
    pub participation_cap: u64,
    /// Voting window bounds, unix seconds.
    pub voting_start: Option<i64>,
    pub voting_end: Option<i64>,
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            eligible_voters: None,
            participation_cap: 89,
            voting_start: None,
            voting_end: None,
        }
    }
}

impl AppConfig {
    /// Defaults overridden from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `VOTECHAIN_*` key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = parsed(&lookup, "VOTECHAIN_ADDR")? {
            config.bind_addr = addr;
        }
        if let Some(path) = lookup("VOTECHAIN_CHAIN_FILE") {
            config.chain_file = PathBuf::from(path);
        }
        if let Some(v) = parsed(&lookup, "VOTECHAIN_ACTIVITY_WINDOW_MINUTES")? {
            config.activity.window_minutes = v;
        }
        if let Some(v) = parsed(&lookup, "VOTECHAIN_ACTIVITY_LIMIT")? {
            config.activity.max_results = v;
        }
        if let Some(v) = parsed(&lookup, "VOTECHAIN_ACTIVITY_SCAN_DEPTH")? {
            config.activity.scan_depth = v;
        }
        if let Some(v) = parsed(&lookup, "VOTECHAIN_ELIGIBLE_VOTERS")? {
            config.tally.eligible_voters = Some(v);
        }
        if let Some(v) = parsed(&lookup, "VOTECHAIN_PARTICIPATION_CAP")? {
            config.tally.participation_cap = v;
        }
        if let Some(v) = parsed(&lookup, "VOTECHAIN_VOTING_START")? {
            config.tally.voting_start = Some(v);
        }
        if let Some(v) = parsed(&lookup, "VOTECHAIN_VOTING_END")? {
            config.tally.voting_end = Some(v);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.activity.window_minutes < 0 {
            return Err(ConfigError::NegativeActivityWindow(
                self.activity.window_minutes,
            ));
        }
        if self.activity.scan_depth == 0 {
            return Err(ConfigError::ZeroScanDepth);
        }
        if self.tally.eligible_voters == Some(0) {
            return Err(ConfigError::ZeroEligibleVoters);
        }
        match (self.tally.voting_start, self.tally.voting_end) {
            (Some(start), Some(end)) if end < start => {
                Err(ConfigError::VotingWindowInverted { start, end })
            }
            (Some(_), None) | (None, Some(_)) => Err(ConfigError::VotingWindowIncomplete),
            _ => Ok(()),
        }
    }
}

fn parsed<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
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
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.chain_file, PathBuf::from("blockchain.json"));
        assert_eq!(config.activity, ActivityConfig::default());
        assert_eq!(config.tally.participation_cap, 89);
        assert_eq!(config.tally.eligible_voters, None);
    }

    #[test]
    fn env_values_override_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("VOTECHAIN_ADDR", "0.0.0.0:8080"),
            ("VOTECHAIN_CHAIN_FILE", "/var/lib/votes/chain.json"),
            ("VOTECHAIN_ACTIVITY_SCAN_DEPTH", "25"),
            ("VOTECHAIN_ELIGIBLE_VOTERS", "1200"),
            ("VOTECHAIN_VOTING_START", "1760000000"),
            ("VOTECHAIN_VOTING_END", "1760050000"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.chain_file, PathBuf::from("/var/lib/votes/chain.json"));
        assert_eq!(config.activity.scan_depth, 25);
        assert_eq!(config.tally.eligible_voters, Some(1200));
        assert_eq!(config.tally.voting_end, Some(1_760_050_000));
    }

    #[test]
    fn unparseable_value_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("VOTECHAIN_ACTIVITY_LIMIT", "five")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "VOTECHAIN_ACTIVITY_LIMIT",
                value: "five".into()
            }
        );
    }

    #[test]
    fn inconsistent_settings_fail_validation() {
        assert_eq!(
            AppConfig::from_lookup(lookup(&[("VOTECHAIN_ACTIVITY_SCAN_DEPTH", "0")])).unwrap_err(),
            ConfigError::ZeroScanDepth
        );
        assert_eq!(
            AppConfig::from_lookup(lookup(&[("VOTECHAIN_ACTIVITY_WINDOW_MINUTES", "-5")]))
                .unwrap_err(),
            ConfigError::NegativeActivityWindow(-5)
        );
        assert_eq!(
            AppConfig::from_lookup(lookup(&[("VOTECHAIN_ELIGIBLE_VOTERS", "0")])).unwrap_err(),
            ConfigError::ZeroEligibleVoters
        );
        assert_eq!(
            AppConfig::from_lookup(lookup(&[("VOTECHAIN_VOTING_START", "10")])).unwrap_err(),
            ConfigError::VotingWindowIncomplete
        );
        assert_eq!(
            AppConfig::from_lookup(lookup(&[
                ("VOTECHAIN_VOTING_START", "10"),
                ("VOTECHAIN_VOTING_END", "5"),
            ]))
            .unwrap_err(),
            ConfigError::VotingWindowInverted { start: 10, end: 5 }
        );
    }
}
