//! Tunables for sessions and trace runs
//!
//! Defaults live in [`crate::session::constants`]. [`TraceConfig::from_env`]
//! overlays these environment variables:
//!
//! | Variable                 | Field         |
//! |--------------------------|---------------|
//! | `JDBTRACE_JDB`           | `jdb`         |
//! | `JDBTRACE_JAVA`          | `java`        |
//! | `JDBTRACE_JAVAC`         | `javac`       |
//! | `JDBTRACE_PORT`          | `debug_port`  |
//! | `JDBTRACE_TIMEOUT_SECS`  | `timeout`     |
//! | `JDBTRACE_NO_COMPILE`    | `compile`     |

use crate::session::constants::{
    DEFAULT_DEBUG_PORT, DEFAULT_ENTRY_METHOD, DEFAULT_TIMEOUT, JAVAC_NAME, JAVA_NAME, JDB_NAME,
};
use crate::trace::history::DEFAULT_TRACE_CAPACITY;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct TraceConfig {
    pub jdb: String,
    pub java: String,
    pub javac: String,
    /// Port the debuggee listens on in attach mode
    pub debug_port: u16,
    /// Upper bound for every blocking expect
    pub timeout: Duration,
    /// History kept by a session outside of a full trace; `None` is unbounded
    pub trace_capacity: Option<usize>,
    /// Method the initial breakpoint is set in
    pub entry_method: String,
    /// Class patterns excluded on top of the standard library
    pub excluded: Vec<String>,
    /// Run javac before tracing
    pub compile: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        TraceConfig {
            jdb: JDB_NAME.to_string(),
            java: JAVA_NAME.to_string(),
            javac: JAVAC_NAME.to_string(),
            debug_port: DEFAULT_DEBUG_PORT,
            timeout: DEFAULT_TIMEOUT,
            trace_capacity: Some(DEFAULT_TRACE_CAPACITY),
            entry_method: DEFAULT_ENTRY_METHOD.to_string(),
            excluded: Vec::new(),
            compile: true,
        }
    }
}

impl TraceConfig {
    /// Defaults overridden by `JDBTRACE_*` environment variables
    pub fn from_env() -> Self {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`; malformed numbers are ignored with a warning
    pub fn overlay<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(jdb) = lookup("JDBTRACE_JDB") {
            self.jdb = jdb;
        }
        if let Some(java) = lookup("JDBTRACE_JAVA") {
            self.java = java;
        }
        if let Some(javac) = lookup("JDBTRACE_JAVAC") {
            self.javac = javac;
        }
        if let Some(port) = lookup("JDBTRACE_PORT") {
            match port.trim().parse() {
                Ok(port) => self.debug_port = port,
                Err(_) => warn!(value = %port, "ignoring invalid JDBTRACE_PORT"),
            }
        }
        if let Some(secs) = lookup("JDBTRACE_TIMEOUT_SECS") {
            match secs
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|secs| *secs > 0.0)
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            {
                Some(timeout) => self.timeout = timeout,
                None => warn!(value = %secs, "ignoring invalid JDBTRACE_TIMEOUT_SECS"),
            }
        }
        if let Some(flag) = lookup("JDBTRACE_NO_COMPILE") {
            self.compile = matches!(flag.trim(), "" | "0" | "false");
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: FxHashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = TraceConfig::default();
        assert_eq!(config.jdb, "jdb");
        assert_eq!(config.debug_port, 8899);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.trace_capacity, Some(10_000));
        assert!(config.compile);
    }

    #[test]
    fn test_overlay() {
        let config = TraceConfig::default().overlay(lookup_from(&[
            ("JDBTRACE_JDB", "/opt/jdk/bin/jdb"),
            ("JDBTRACE_PORT", "9000"),
            ("JDBTRACE_TIMEOUT_SECS", "2.5"),
            ("JDBTRACE_NO_COMPILE", "1"),
        ]));
        assert_eq!(config.jdb, "/opt/jdk/bin/jdb");
        assert_eq!(config.debug_port, 9000);
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert!(!config.compile);
    }

    #[test]
    fn test_overlay_ignores_garbage() {
        let config = TraceConfig::default().overlay(lookup_from(&[
            ("JDBTRACE_PORT", "not-a-port"),
            ("JDBTRACE_TIMEOUT_SECS", "-1"),
            ("JDBTRACE_NO_COMPILE", "0"),
        ]));
        assert_eq!(config.debug_port, 8899);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.compile);
    }

    #[test]
    fn test_overlay_rejects_unrepresentable_timeouts() {
        for value in ["1e300", "inf", "NaN", "0"] {
            let config = TraceConfig::default()
                .overlay(lookup_from(&[("JDBTRACE_TIMEOUT_SECS", value)]));
            assert_eq!(config.timeout, Duration::from_secs(30), "{}", value);
        }
    }
}
