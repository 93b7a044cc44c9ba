use std::time::Duration;

/// Environment variable holding the per-task timeout in seconds (0 disables it).
pub const TASK_TIMEOUT_ENV: &str = "SKILL_NODES_TASK_TIMEOUT_SECS";
/// Environment variable holding the shutdown grace period in seconds.
pub const SHUTDOWN_GRACE_ENV: &str = "SKILL_NODES_SHUTDOWN_GRACE_SECS";

/// Knobs for running tasks through the bridge.
#[derive(Clone, Debug, PartialEq)]
pub struct BridgeSettings {
    /// Upper bound on one node invocation, covering every call of its script.
    pub task_timeout: Option<Duration>,
    /// How long shutdown waits for in-flight work before abandoning it.
    pub shutdown_grace: Duration,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            task_timeout: Some(Duration::from_secs(300)),
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

impl BridgeSettings {
    pub fn with_task_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.task_timeout = timeout;
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Defaults overridden by whatever the environment sets.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        if let Some(secs) = parse_secs(lookup(TASK_TIMEOUT_ENV), TASK_TIMEOUT_ENV) {
            settings.task_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(secs) = parse_secs(lookup(SHUTDOWN_GRACE_ENV), SHUTDOWN_GRACE_ENV) {
            settings.shutdown_grace = Duration::from_secs(secs);
        }
        settings
    }
}

pub(crate) fn parse_secs(raw: Option<String>, key: &str) -> Option<u64> {
    let raw = raw?;
    match raw.trim().parse::<u64>() {
        Ok(secs) => Some(secs),
        Err(_) => {
            log::warn!("Ignoring {key}={raw:?}: expected a whole number of seconds");
            None
        }
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = BridgeSettings::default();
        assert_eq!(settings.task_timeout, Some(Duration::from_secs(300)));
        assert_eq!(settings.shutdown_grace, Duration::from_secs(5));
    }

    #[test]
    fn test_env_overrides() {
        let settings =
            BridgeSettings::from_lookup(lookup(&[(TASK_TIMEOUT_ENV, "12"), (SHUTDOWN_GRACE_ENV, "1")]));
        assert_eq!(settings.task_timeout, Some(Duration::from_secs(12)));
        assert_eq!(settings.shutdown_grace, Duration::from_secs(1));
    }

    #[test]
    fn test_zero_disables_timeout_and_garbage_is_ignored() {
        let settings = BridgeSettings::from_lookup(lookup(&[(TASK_TIMEOUT_ENV, "0")]));
        assert_eq!(settings.task_timeout, None);

        let settings = BridgeSettings::from_lookup(lookup(&[(SHUTDOWN_GRACE_ENV, "soon")]));
        assert_eq!(settings.shutdown_grace, Duration::from_secs(5));
    }
}
