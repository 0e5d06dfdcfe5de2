//! Sandbox configuration

use std::time::Duration;

/// Default wall-clock budget for one execution
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default script size cap (bytes)
pub const DEFAULT_MAX_SCRIPT_BYTES: usize = 1024 * 1024;

/// Configuration for script execution
#[derive(Debug, Clone, PartialEq)]
pub struct SandboxConfig {
    /// Wall-clock budget. Only suspension points can be interrupted.
    pub timeout: Duration,
    /// Remove globals outside the allow-list before the script runs
    pub isolate_globals: bool,
    /// Engine loop iteration limit; `None` leaves non-yielding loops unbounded
    pub loop_iteration_limit: Option<u64>,
    /// Scripts larger than this are rejected without running
    pub max_script_bytes: usize,
    /// Capture `console.*` output (re-emitted at debug level)
    pub capture_console: bool,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            isolate_globals: true,
            loop_iteration_limit: None,
            max_script_bytes: DEFAULT_MAX_SCRIPT_BYTES,
            capture_console: true,
        }
    }
}

impl SandboxConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the execution timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable global isolation
    #[must_use]
    pub fn with_isolation(mut self, isolate: bool) -> Self {
        self.isolate_globals = isolate;
        self
    }

    /// Bound loop iterations inside the engine
    #[must_use]
    pub fn with_loop_iteration_limit(mut self, limit: Option<u64>) -> Self {
        self.loop_iteration_limit = limit;
        self
    }

    /// Set the script size cap
    #[must_use]
    pub fn with_max_script_bytes(mut self, bytes: usize) -> Self {
        self.max_script_bytes = bytes;
        self
    }

    /// Enable or disable console capture
    #[must_use]
    pub fn with_console_capture(mut self, capture: bool) -> Self {
        self.capture_console = capture;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SandboxConfig::default();
        assert_eq!(config.timeout, Duration::from_millis(5000));
        assert!(config.isolate_globals);
        assert!(config.loop_iteration_limit.is_none());
    }

    #[test]
    fn test_builders() {
        let config = SandboxConfig::new()
            .with_timeout(Duration::from_millis(250))
            .with_isolation(false)
            .with_loop_iteration_limit(Some(10_000))
            .with_max_script_bytes(64)
            .with_console_capture(false);
        assert_eq!(config.timeout.as_millis(), 250);
        assert!(!config.isolate_globals);
        assert_eq!(config.loop_iteration_limit, Some(10_000));
        assert_eq!(config.max_script_bytes, 64);
        assert!(!config.capture_console);
    }
}
