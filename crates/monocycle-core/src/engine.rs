//! Monocycle execution engine: owns the architectural state and drives the
//! per-cycle pipeline.

use tracing::{debug, debug_span, info, trace};

use crate::execute::{
    execute_instruction, fetch, memory_access, next_pc, validate, write_back, HostEffect,
};
use crate::{
    CycleFault, Decoder, EngineConfig, Fault, LoadError, Memory, RegisterFile, RunOutcome,
    RunState, StepOutcome, SyscallHost,
};

/// Single-cycle processor with exclusive ownership of registers and memory.
#[derive(Debug, Clone)]
pub struct Engine {
    registers: RegisterFile,
    memory: Memory,
    pc: u16,
    cycle: u32,
    run_state: RunState,
    config: EngineConfig,
    last_fault: Option<CycleFault>,
}

impl Engine {
    /// Creates an engine over already-loaded memory.
    #[must_use]
    pub fn new(memory: Memory, config: EngineConfig) -> Self {
        Self {
            registers: RegisterFile::new(),
            memory,
            pc: 0,
            cycle: 0,
            run_state: RunState::Running,
            config,
            last_fault: None,
        }
    }

    /// Creates an engine with `program` loaded at address 0.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::TooLarge`] when the program does not fit.
    pub fn from_program(program: &[u16], config: EngineConfig) -> Result<Self, LoadError> {
        Ok(Self::new(Memory::with_program(program)?, config))
    }

    /// Register file.
    #[must_use]
    pub const fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Memory.
    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Program counter of the next instruction.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }

    /// Cycles executed so far.
    #[must_use]
    pub const fn cycle(&self) -> u32 {
        self.cycle
    }

    /// Current run state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fault that stopped the run, if any.
    #[must_use]
    pub const fn last_fault(&self) -> Option<&CycleFault> {
        self.last_fault.as_ref()
    }

    /// Zeroes registers, pc and cycle counter and resumes `Running`.
    ///
    /// The loaded program and data memory are kept.
    pub fn reset(&mut self) {
        self.registers.reset();
        self.pc = 0;
        self.cycle = 0;
        self.run_state = RunState::Running;
        self.last_fault = None;
    }

    /// Runs cycles until termination, a fatal fault or the cycle ceiling.
    pub fn run(&mut self, host: &mut dyn SyscallHost) -> RunOutcome {
        loop {
            match self.step(host) {
                StepOutcome::Retired { .. } => {}
                StepOutcome::Terminated => {
                    return RunOutcome::Terminated { cycles: self.cycle };
                }
                StepOutcome::Faulted(fault) => {
                    return RunOutcome::Faulted {
                        cycles: self.cycle,
                        fault,
                    };
                }
                StepOutcome::CycleLimitReached => {
                    return RunOutcome::CycleLimitReached { cycles: self.cycle };
                }
            }
        }
    }

    /// Executes one cycle.
    ///
    /// A stopped engine returns its stop reason again without executing.
    pub fn step(&mut self, host: &mut dyn SyscallHost) -> StepOutcome {
        if let Some(outcome) = self.stopped_outcome() {
            return outcome;
        }
        if self.cycle >= self.config.max_cycles {
            debug!(cycles = self.cycle, "cycle limit reached");
            self.run_state = RunState::CycleLimit;
            return StepOutcome::CycleLimitReached;
        }

        self.cycle += 1;
        let pc = self.pc;
        let span = debug_span!("cycle", n = self.cycle, pc);
        let _enter = span.enter();

        let interval = self.config.progress_interval;
        if interval != 0 && self.cycle % interval == 0 {
            debug!(cycle = self.cycle, "progress");
        }

        match self.run_cycle(pc, host) {
            Ok(true) => {
                debug!(cycles = self.cycle, "run terminated");
                self.run_state = RunState::Terminated;
                StepOutcome::Terminated
            }
            Ok(false) => StepOutcome::Retired { pc: self.pc },
            Err(fault) => {
                let fault = CycleFault {
                    cycle: self.cycle,
                    pc,
                    fault,
                };
                debug!(code = fault.fault.code().as_u8(), "{fault}");
                self.run_state = RunState::Faulted(fault.fault.code());
                self.last_fault = Some(fault.clone());
                StepOutcome::Faulted(fault)
            }
        }
    }

    fn stopped_outcome(&self) -> Option<StepOutcome> {
        match self.run_state {
            RunState::Running => None,
            RunState::Terminated => Some(StepOutcome::Terminated),
            RunState::CycleLimit => Some(StepOutcome::CycleLimitReached),
            RunState::Faulted(_) => self.last_fault.clone().map(StepOutcome::Faulted),
        }
    }

    /// Runs the pipeline stages for the instruction at `pc`; returns whether
    /// the program asked to terminate.
    fn run_cycle(&mut self, pc: u16, host: &mut dyn SyscallHost) -> Result<bool, Fault> {
        let raw = fetch(&self.memory, pc)?;
        debug!(stage = "fetch", raw = %format_args!("0x{raw:04X}"));

        let instruction = Decoder::decode(raw);
        debug!(stage = "decode", %instruction);

        validate(&instruction, &self.registers)?;

        let result = execute_instruction(&instruction, &self.registers, &self.memory, &*host);
        debug!(stage = "execute", ?result);

        match &result.host_effect {
            Some(HostEffect::Emit(text)) => host.emit(text),
            Some(HostEffect::Suspend(duration)) => {
                info!(seconds = duration.as_secs(), "suspending");
                host.suspend(*duration);
            }
            None => {}
        }

        let mut fault = result.fault.clone();
        if fault.is_none() {
            let applied = memory_access(&result, &mut self.memory).and_then(|write| {
                debug!(stage = "memory", ?write);
                write_back(write, &mut self.registers)
            });
            if let Err(stage_fault) = applied {
                fault = Some(stage_fault);
            }
        }

        match next_pc(pc, result.pc_update, &self.registers) {
            Ok(next) => {
                debug!(stage = "pc", next);
                self.pc = next;
            }
            Err(pc_fault) => {
                fault.get_or_insert(pc_fault);
            }
        }
        trace!(registers = ?self.registers.values());

        match fault {
            Some(fault) => Err(fault),
            None => Ok(result.terminate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Engine;
    use crate::{
        EngineConfig, Fault, FaultCode, RecordingHost, RunOutcome, RunState, StepOutcome,
    };

    const fn r(opcode: u16, rd: u16, rs1: u16, rs2: u16) -> u16 {
        (opcode << 9) | (rd << 6) | (rs1 << 3) | rs2
    }

    const fn mov(rd: u16, immediate: u16) -> u16 {
        0xE000 | (rd << 10) | (immediate & 0x3FF)
    }

    const SYSCALL: u16 = 63 << 9;

    fn engine(program: &[u16]) -> Engine {
        Engine::from_program(program, EngineConfig::default()).expect("program fits")
    }

    #[test]
    fn step_reports_next_pc() {
        let mut engine = engine(&[mov(1, 5), mov(2, 6)]);
        let mut host = RecordingHost::new();
        assert_eq!(engine.step(&mut host), StepOutcome::Retired { pc: 1 });
        assert_eq!(engine.registers().get(1), Ok(5));
        assert_eq!(engine.cycle(), 1);
    }

    #[test]
    fn terminate_syscall_stops_cleanly() {
        let mut engine = engine(&[mov(0, 0), SYSCALL, mov(1, 1)]);
        let mut host = RecordingHost::new();
        assert_eq!(engine.run(&mut host), RunOutcome::Terminated { cycles: 2 });
        assert_eq!(engine.run_state(), RunState::Terminated);
        assert_eq!(engine.registers().get(1), Ok(0));
        assert_eq!(engine.pc(), 2);
    }

    #[test]
    fn stopped_engine_does_not_execute_again() {
        let mut engine = engine(&[mov(0, 0), SYSCALL]);
        let mut host = RecordingHost::new();
        let first = engine.run(&mut host);
        assert_eq!(engine.step(&mut host), StepOutcome::Terminated);
        assert_eq!(engine.run(&mut host), first);
        assert_eq!(engine.cycle(), 2);
    }

    #[test]
    fn running_past_program_end_faults_without_pc_change() {
        let mut engine = engine(&[mov(1, 1)]);
        let mut host = RecordingHost::new();
        let outcome = engine.run(&mut host);
        let RunOutcome::Faulted { cycles, fault } = outcome else {
            panic!("expected fault, got {outcome:?}");
        };
        assert_eq!(cycles, 2);
        assert_eq!(fault.cycle, 2);
        assert_eq!(fault.pc, 1);
        assert_eq!(
            fault.fault,
            Fault::InvalidInstructionAddress { addr: 1, loaded: 1 }
        );
        assert_eq!(engine.pc(), 1);
        assert_eq!(
            engine.run_state(),
            RunState::Faulted(FaultCode::InvalidInstructionAddress)
        );
        assert_eq!(engine.last_fault(), Some(&fault));
    }

    #[test]
    fn failed_load_writes_nothing_but_cycle_completes() {
        // mov r2, -1 ; mov r1, 9 ; load r1, [r2]
        let mut engine = engine(&[mov(2, 0x3FF), mov(1, 9), r(15, 1, 2, 0)]);
        let mut host = RecordingHost::new();
        let RunOutcome::Faulted { fault, .. } = engine.run(&mut host) else {
            panic!("expected fault");
        };
        assert_eq!(fault.fault, Fault::InvalidDataAddress { addr: -1 });
        assert_eq!(engine.registers().get(1), Ok(9));
        assert_eq!(engine.pc(), 3);
    }

    #[test]
    fn cycle_ceiling_is_a_diagnostic_stop() {
        let config = EngineConfig {
            max_cycles: 10,
            progress_interval: 0,
        };
        let mut engine = Engine::from_program(&[0x8000], config).expect("fits");
        let mut host = RecordingHost::new();
        assert_eq!(
            engine.run(&mut host),
            RunOutcome::CycleLimitReached { cycles: 10 }
        );
        assert_eq!(engine.run_state(), RunState::CycleLimit);
        assert_eq!(engine.last_fault(), None);
    }

    #[test]
    fn terminate_on_last_allowed_cycle_wins_over_ceiling() {
        let config = EngineConfig {
            max_cycles: 2,
            progress_interval: 0,
        };
        let mut engine = Engine::from_program(&[mov(0, 0), SYSCALL], config).expect("fits");
        let mut host = RecordingHost::new();
        assert_eq!(engine.run(&mut host), RunOutcome::Terminated { cycles: 2 });
    }

    #[test]
    fn reset_keeps_program_and_data() {
        // mov r1, 4 ; store [r0], r1 ; mov r0, 0 ; syscall
        let mut engine = engine(&[mov(1, 4), r(16, 0, 0, 1), mov(0, 0), SYSCALL]);
        let mut host = RecordingHost::new();
        engine.run(&mut host);

        engine.reset();
        assert_eq!(engine.pc(), 0);
        assert_eq!(engine.cycle(), 0);
        assert_eq!(engine.run_state(), RunState::Running);
        assert_eq!(engine.registers().get(1), Ok(0));
        assert_eq!(engine.memory().read_data(0), Ok(4));
        assert_eq!(engine.run(&mut host), RunOutcome::Terminated { cycles: 4 });
    }
}
