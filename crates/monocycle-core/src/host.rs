//! Host services reachable from the syscall instruction.

use std::time::Duration;

/// Embedder-supplied output, suspension and clock services.
///
/// The engine never touches stdout or the wall clock directly; every
/// syscall side effect is routed through this trait.
pub trait SyscallHost {
    /// Writes program output text.
    fn emit(&mut self, text: &str);
    /// Blocks execution for `duration`.
    fn suspend(&mut self, duration: Duration);
    /// Wall-clock seconds since the Unix epoch.
    fn epoch_seconds(&self) -> u64;
}

/// Deterministic host that captures output and advances a virtual clock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingHost {
    output: String,
    suspended: Duration,
    clock_start: u64,
}

impl RecordingHost {
    /// Creates a host whose clock starts at epoch second 0.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_clock(0)
    }

    /// Creates a host whose clock starts at `epoch_seconds`.
    #[must_use]
    pub const fn with_clock(epoch_seconds: u64) -> Self {
        Self {
            output: String::new(),
            suspended: Duration::ZERO,
            clock_start: epoch_seconds,
        }
    }

    /// Everything emitted so far.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Total virtual time spent suspended.
    #[must_use]
    pub const fn suspended(&self) -> Duration {
        self.suspended
    }

    /// Drains captured output.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

impl SyscallHost for RecordingHost {
    fn emit(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn suspend(&mut self, duration: Duration) {
        self.suspended += duration;
    }

    fn epoch_seconds(&self) -> u64 {
        self.clock_start + self.suspended.as_secs()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{RecordingHost, SyscallHost};

    #[test]
    fn recording_host_accumulates_output() {
        let mut host = RecordingHost::new();
        host.emit("65");
        host.emit("\n");
        assert_eq!(host.output(), "65\n");
        assert_eq!(host.take_output(), "65\n");
        assert_eq!(host.output(), "");
    }

    #[test]
    fn suspension_advances_virtual_clock() {
        let mut host = RecordingHost::with_clock(1_000);
        host.suspend(Duration::from_secs(3));
        host.suspend(Duration::from_secs(2));
        assert_eq!(host.suspended(), Duration::from_secs(5));
        assert_eq!(host.epoch_seconds(), 1_005);
    }
}
