use std::time::Duration;

/// Failures talking to the wireless subsystem. All of them are recoverable:
/// inspector calls degrade to empty results and scans retry on the next tick.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` timed out after {timeout:?}")]
    TimedOut { command: String, timeout: Duration },

    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

impl ScanError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScanError::TimedOut { .. })
    }
}
