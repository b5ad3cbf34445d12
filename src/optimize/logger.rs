//! Progress logging for optimizer runs.
//!
//! Lines go to the sink installed with
//! [`OptimizerParameters::with_logger`](super::OptimizerParameters::with_logger).
//! Without one, setting `SYMDESCENT_TRACE=1` prints them to stderr.

use super::params::OptimizerParameters;
use std::sync::{Arc, OnceLock};

/// Receives one formatted progress line at a time.
pub type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Check if tracing is enabled via environment variable (cached)
fn trace_enabled() -> bool {
    static TRACE: OnceLock<bool> = OnceLock::new();
    *TRACE.get_or_init(|| {
        std::env::var("SYMDESCENT_TRACE")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false)
    })
}

fn stderr_sink() -> LogSink {
    Arc::new(|line: &str| eprintln!("{}", line))
}

#[derive(Clone)]
pub(crate) struct Logger {
    sink: Option<LogSink>,
}

impl Logger {
    pub(crate) fn new(params: &OptimizerParameters) -> Self {
        let sink = params
            .logger()
            .cloned()
            .or_else(|| trace_enabled().then(stderr_sink));
        Self { sink }
    }

    #[cfg(test)]
    pub(crate) fn disabled() -> Self {
        Self { sink: None }
    }

    /// Messages are only formatted when a sink is listening.
    pub(crate) fn log(&self, message: impl FnOnce() -> String) {
        if let Some(sink) = &self.sink {
            sink(&message());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_installed_sink_receives_lines() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&lines);
        let params = OptimizerParameters::new()
            .with_logger(move |line| captured.lock().unwrap().push(line.to_string()));
        let logger = Logger::new(&params);
        logger.log(|| "first".to_string());
        logger.log(|| format!("second {}", 2));
        assert_eq!(*lines.lock().unwrap(), vec!["first", "second 2"]);
    }

    #[test]
    fn test_disabled_logger_does_not_format() {
        let logger = Logger::disabled();
        logger.log(|| panic!("message must not be built"));
    }
}
