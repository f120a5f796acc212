//! Controller configuration from environment variables.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ControllerError;
use crate::poller::{DEFAULT_OPERATION_TIMEOUT, DEFAULT_POLL_INTERVAL, PollConfig};

pub const DEFAULT_FLEET_URL: &str = "http://fleet-api:8080";
pub const DEFAULT_MANIFEST_PATH: &str = "/etc/nodepool/manifest.yaml";
pub const DEFAULT_RECONCILE_INTERVAL: Duration = Duration::from_secs(300);

/// What a controller run does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// One reconciliation pass
    #[default]
    Reconcile,
    /// One best-effort provisioning pass
    Provision,
    /// Create the cluster with its node pools
    BringUp,
    /// Apply cluster changes, then reconcile
    Update,
    /// Reconcile periodically until stopped
    Watch,
    /// Delete the cluster
    TearDown,
}

impl FromStr for Mode {
    type Err = ControllerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reconcile" => Ok(Mode::Reconcile),
            "provision" => Ok(Mode::Provision),
            "bring-up" | "bringup" => Ok(Mode::BringUp),
            "update" => Ok(Mode::Update),
            "watch" => Ok(Mode::Watch),
            "tear-down" | "teardown" => Ok(Mode::TearDown),
            other => Err(ControllerError::Configuration(format!(
                "unknown CONTROLLER_MODE '{}' (expected reconcile, provision, bring-up, update, watch or tear-down)",
                other
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Reconcile => "reconcile",
            Mode::Provision => "provision",
            Mode::BringUp => "bring-up",
            Mode::Update => "update",
            Mode::Watch => "watch",
            Mode::TearDown => "tear-down",
        };
        f.write_str(s)
    }
}

/// Settings for one controller process
#[derive(Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub fleet_url: String,
    pub fleet_token: String,
    pub manifest_path: String,
    pub mode: Mode,
    pub poll: PollConfig,
    pub reconcile_interval: Duration,
}

// Keeps the token out of logs
impl fmt::Debug for ControllerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerConfig")
            .field("fleet_url", &self.fleet_url)
            .field("fleet_token", &"<redacted>")
            .field("manifest_path", &self.manifest_path)
            .field("mode", &self.mode)
            .field("poll", &self.poll)
            .field("reconcile_interval", &self.reconcile_interval)
            .finish()
    }
}

impl ControllerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value if set
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fleet_token = lookup("FLEET_TOKEN")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ControllerError::Configuration(
                    "FLEET_TOKEN environment variable is required".to_string(),
                )
            })?;

        let mode = match lookup("CONTROLLER_MODE") {
            Some(raw) => raw.parse()?,
            None => Mode::default(),
        };

        let poll = PollConfig::new(
            seconds(&lookup, "POLL_INTERVAL_SECONDS", DEFAULT_POLL_INTERVAL)?,
            seconds(&lookup, "OPERATION_TIMEOUT_SECONDS", DEFAULT_OPERATION_TIMEOUT)?,
        );

        Ok(Self {
            fleet_url: lookup("FLEET_URL").unwrap_or_else(|| DEFAULT_FLEET_URL.to_string()),
            fleet_token,
            manifest_path: lookup("NODEPOOL_MANIFEST")
                .unwrap_or_else(|| DEFAULT_MANIFEST_PATH.to_string()),
            mode,
            poll,
            reconcile_interval: seconds(
                &lookup,
                "RECONCILE_INTERVAL_SECONDS",
                DEFAULT_RECONCILE_INTERVAL,
            )?,
        })
    }
}

/// Positive whole seconds from `key`, or `default` when unset
fn seconds<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration, ControllerError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ControllerError::Configuration(format!("{} must be greater than zero", key))),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ControllerError::Configuration(format!(
            "{} must be a whole number of seconds, got '{}': {}",
            key, raw, e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ControllerConfig, ControllerError> {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ControllerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("FLEET_TOKEN", "secret")]).unwrap();

        assert_eq!(config.fleet_url, DEFAULT_FLEET_URL);
        assert_eq!(config.manifest_path, DEFAULT_MANIFEST_PATH);
        assert_eq!(config.mode, Mode::Reconcile);
        assert_eq!(config.poll, PollConfig::default());
        assert_eq!(config.reconcile_interval, Duration::from_secs(300));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("FLEET_TOKEN", "secret"),
            ("FLEET_URL", "https://fleet.example.com"),
            ("NODEPOOL_MANIFEST", "./manifest.yaml"),
            ("CONTROLLER_MODE", "Bring-Up"),
            ("POLL_INTERVAL_SECONDS", "2"),
            ("OPERATION_TIMEOUT_SECONDS", "600"),
            ("RECONCILE_INTERVAL_SECONDS", "60"),
        ])
        .unwrap();

        assert_eq!(config.fleet_url, "https://fleet.example.com");
        assert_eq!(config.mode, Mode::BringUp);
        assert_eq!(
            config.poll,
            PollConfig::new(Duration::from_secs(2), Duration::from_secs(600))
        );
        assert_eq!(config.reconcile_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("FLEET_TOKEN"), "{}", err);
        assert!(load(&[("FLEET_TOKEN", "")]).is_err());
    }

    #[test]
    fn test_bad_values_are_configuration_errors() {
        for vars in [
            vec![("FLEET_TOKEN", "t"), ("POLL_INTERVAL_SECONDS", "ten")],
            vec![("FLEET_TOKEN", "t"), ("OPERATION_TIMEOUT_SECONDS", "0")],
            vec![("FLEET_TOKEN", "t"), ("CONTROLLER_MODE", "destroy")],
        ] {
            match load(&vars) {
                Err(ControllerError::Configuration(_)) => {}
                other => panic!("Expected configuration error for {:?}, got {:?}", vars, other),
            }
        }
    }

    #[test]
    fn test_token_not_in_debug_output() {
        let config = load(&[("FLEET_TOKEN", "super-secret")]).unwrap();
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
