//! Public host-facing configuration and outcome types.

use crate::CycleFault;

/// Default cycle ceiling before a run is declared a likely infinite loop.
pub const DEFAULT_MAX_CYCLES: u32 = 100_000;

/// Default number of cycles between progress diagnostics.
pub const DEFAULT_PROGRESS_INTERVAL: u32 = 1_000;

/// Top-level immutable configuration for an engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct EngineConfig {
    /// Cycle ceiling; reaching it stops the run without an error.
    pub max_cycles: u32,
    /// Cycles between progress events; `0` disables them.
    pub progress_interval: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_cycles: DEFAULT_MAX_CYCLES,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Result of a single [`crate::Engine::step`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum StepOutcome {
    /// Instruction completed; execution continues at `pc`.
    Retired {
        /// Program counter for the next cycle.
        pc: u16,
    },
    /// Program requested termination.
    Terminated,
    /// A fatal fault stopped the run.
    Faulted(CycleFault),
    /// Cycle ceiling reached.
    CycleLimitReached,
}

/// Result of running an engine until it stops.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunOutcome {
    /// Program requested termination.
    Terminated {
        /// Cycles executed.
        cycles: u32,
    },
    /// A fatal fault stopped the run.
    Faulted {
        /// Cycles executed, including the faulting one.
        cycles: u32,
        /// The fault and where it happened.
        fault: CycleFault,
    },
    /// Cycle ceiling reached; likely an infinite loop.
    CycleLimitReached {
        /// Cycles executed.
        cycles: u32,
    },
}

impl RunOutcome {
    /// Number of executed cycles.
    #[must_use]
    pub const fn cycles(&self) -> u32 {
        match self {
            Self::Terminated { cycles }
            | Self::Faulted { cycles, .. }
            | Self::CycleLimitReached { cycles } => *cycles,
        }
    }

    /// Returns `true` for a clean termination.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        matches!(self, Self::Terminated { .. })
    }
}
