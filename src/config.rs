use std::time::Duration;

use crate::error::ConfigError;

pub const SERVER_URL_VAR: &str = "NEUROUI_SERVER_URL";
pub const TIMEOUT_VAR: &str = "NEUROUI_TIMEOUT_SECS";
pub const LOG_VAR: &str = "NEUROUI_LOG";

#[derive(Clone, Debug, PartialEq)]
pub struct WorkbenchConfig {
    /// Base URL of the simulation/assistant server, without a trailing slash.
    pub server_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub log_filter: String,
    pub title: String,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_owned(),
            request_timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(2),
            log_filter: "info".to_owned(),
            title: "NeuroUI: Microcircuit Workbench".to_owned(),
        }
    }
}

impl WorkbenchConfig {
    /// Read the process environment. The first CLI argument overrides the server URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_sources(std::env::args().nth(1), |key| std::env::var(key).ok())
    }

    pub fn from_sources(
        server_arg: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = server_arg.or_else(|| lookup(SERVER_URL_VAR)) {
            let url = url.trim().trim_end_matches('/');
            if url.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: SERVER_URL_VAR,
                    value: url.to_owned(),
                });
            }
            config.server_url = url.to_owned();
        }

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: TIMEOUT_VAR,
                    value: raw.clone(),
                })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(filter) = lookup(LOG_VAR) {
            config.log_filter = filter;
        }

        Ok(config)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.server_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let config = WorkbenchConfig::from_sources(None, env(&[])).unwrap();
        assert_eq!(config, WorkbenchConfig::default());
        assert_eq!(
            config.endpoint("run_simulation"),
            "http://127.0.0.1:5000/run_simulation"
        );
    }

    #[test]
    fn argument_beats_environment() {
        let config = WorkbenchConfig::from_sources(
            Some("http://lab:9000/".to_owned()),
            env(&[(SERVER_URL_VAR, "http://other:1")]),
        )
        .unwrap();
        assert_eq!(config.server_url, "http://lab:9000");
        assert_eq!(config.endpoint("/chat"), "http://lab:9000/chat");
    }

    #[test]
    fn environment_overrides() {
        let config = WorkbenchConfig::from_sources(
            None,
            env(&[
                (SERVER_URL_VAR, "http://sim.local//"),
                (TIMEOUT_VAR, "30"),
                (LOG_VAR, "neuroui=debug"),
            ]),
        )
        .unwrap();
        assert_eq!(config.server_url, "http://sim.local");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.log_filter, "neuroui=debug");
    }

    #[test]
    fn malformed_values_are_rejected() {
        let error = WorkbenchConfig::from_sources(None, env(&[(TIMEOUT_VAR, "soon")])).unwrap_err();
        assert_eq!(
            error,
            ConfigError::InvalidValue {
                key: TIMEOUT_VAR,
                value: "soon".to_owned()
            }
        );
        assert!(WorkbenchConfig::from_sources(Some("/".to_owned()), env(&[])).is_err());
    }
}
