use crate::FaultCode;

/// Execution state machine for host-observable engine control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Ready to execute the next cycle.
    #[default]
    Running,
    /// Program requested termination through the syscall interface.
    Terminated,
    /// A cycle raised a fatal fault.
    Faulted(FaultCode),
    /// The cycle ceiling was reached before the program stopped.
    CycleLimit,
}
