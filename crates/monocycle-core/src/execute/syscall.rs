//! Syscall service dispatch. The service selector lives in `R0`, the
//! argument and result in `R1`.

use std::time::Duration;

use tracing::{info, warn};

use super::{ExecutionResult, HostEffect};
use crate::{Fault, Memory, RegisterFile, SyscallHost, ARGUMENT_REGISTER, SERVICE_REGISTER};

/// Request termination.
pub const SERVICE_TERMINATE: i16 = 0;
/// Print a zero-terminated UTF-16 string from data memory.
pub const SERVICE_PRINT_STRING: i16 = 1;
/// Print a newline.
pub const SERVICE_PRINT_NEWLINE: i16 = 2;
/// Print `R1` as a decimal integer followed by a newline.
pub const SERVICE_PRINT_INT: i16 = 3;
/// Suspend for `R1` seconds.
pub const SERVICE_SLEEP: i16 = 6;
/// Store the low 16 bits of the epoch seconds into `R1`.
pub const SERVICE_TIME: i16 = 7;

pub(super) fn dispatch(
    registers: &RegisterFile,
    memory: &Memory,
    host: &dyn SyscallHost,
) -> Result<ExecutionResult, Fault> {
    let service = registers.get(SERVICE_REGISTER)?;
    let argument = registers.get(ARGUMENT_REGISTER)?;

    let result = match service {
        SERVICE_TERMINATE => {
            info!("program terminated via syscall");
            ExecutionResult {
                terminate: true,
                ..ExecutionResult::default()
            }
        }
        SERVICE_PRINT_STRING => {
            let text = read_string(memory, argument).map_err(|source| Fault::Syscall {
                service,
                source: Box::new(source),
            })?;
            emit(text)
        }
        SERVICE_PRINT_NEWLINE => emit("\n".to_string()),
        SERVICE_PRINT_INT => emit(format!("{argument}\n")),
        SERVICE_SLEEP => {
            let seconds =
                u64::try_from(argument).map_err(|_| Fault::SyscallArgument { service, argument })?;
            ExecutionResult {
                host_effect: Some(HostEffect::Suspend(Duration::from_secs(seconds))),
                ..ExecutionResult::default()
            }
        }
        SERVICE_TIME => {
            ExecutionResult::write(ARGUMENT_REGISTER, truncate_seconds(host.epoch_seconds()))
        }
        other => {
            warn!(service = other, "unimplemented syscall service {other}");
            ExecutionResult::sequential()
        }
    };
    Ok(result)
}

fn emit(text: String) -> ExecutionResult {
    ExecutionResult {
        host_effect: Some(HostEffect::Emit(text)),
        ..ExecutionResult::default()
    }
}

/// Reads code units from `start` up to, not including, the first zero word.
fn read_string(memory: &Memory, start: i16) -> Result<String, Fault> {
    let mut units = Vec::new();
    let mut addr = i32::from(start);
    loop {
        let unit = memory.read_data(addr)?;
        if unit == 0 {
            break;
        }
        units.push(u16::from_ne_bytes(unit.to_ne_bytes()));
        addr += 1;
    }
    Ok(char::decode_utf16(units)
        .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const fn truncate_seconds(seconds: u64) -> i16 {
    seconds as u16 as i16
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{
        truncate_seconds, SERVICE_PRINT_INT, SERVICE_PRINT_NEWLINE, SERVICE_PRINT_STRING,
        SERVICE_SLEEP, SERVICE_TERMINATE, SERVICE_TIME,
    };
    use crate::execute::{execute_instruction, ExecutionResult, HostEffect, RegisterWrite};
    use crate::{Decoder, Fault, Memory, RecordingHost, RegisterFile};

    const SYSCALL: u16 = 63 << 9;

    fn call(service: i16, argument: i16, memory: &Memory, host: &RecordingHost) -> ExecutionResult {
        let mut registers = RegisterFile::new();
        registers.set(0, service).expect("in range");
        registers.set(1, argument).expect("in range");
        execute_instruction(&Decoder::decode(SYSCALL), &registers, memory, host)
    }

    fn store_str(memory: &mut Memory, at: i32, text: &str) {
        for (offset, unit) in (0..).zip(text.encode_utf16()) {
            memory
                .write_data(at + offset, i16::from_ne_bytes(unit.to_ne_bytes()))
                .expect("in range");
        }
    }

    #[test]
    fn terminate_sets_flag_only() {
        let result = call(SERVICE_TERMINATE, 0, &Memory::new(), &RecordingHost::new());
        assert!(result.terminate);
        assert_eq!(result.host_effect, None);
        assert_eq!(result.fault, None);
    }

    #[test]
    fn print_string_stops_at_zero_word() {
        let mut memory = Memory::new();
        store_str(&mut memory, 10, "Hi é");
        let result = call(SERVICE_PRINT_STRING, 10, &memory, &RecordingHost::new());
        assert_eq!(result.host_effect, Some(HostEffect::Emit("Hi é".to_string())));
    }

    #[test]
    fn print_string_replaces_unpaired_surrogates() {
        let mut memory = Memory::new();
        memory.write_data(0, 0x41).expect("in range");
        memory
            .write_data(1, i16::from_ne_bytes(0xD800_u16.to_ne_bytes()))
            .expect("in range");
        let result = call(SERVICE_PRINT_STRING, 0, &memory, &RecordingHost::new());
        assert_eq!(
            result.host_effect,
            Some(HostEffect::Emit("A\u{FFFD}".to_string()))
        );
    }

    #[test]
    fn print_string_outside_data_region_is_a_syscall_fault() {
        let result = call(SERVICE_PRINT_STRING, -1, &Memory::new(), &RecordingHost::new());
        assert_eq!(
            result.fault,
            Some(Fault::Syscall {
                service: SERVICE_PRINT_STRING,
                source: Box::new(Fault::InvalidDataAddress { addr: -1 }),
            })
        );
        assert_eq!(result.host_effect, None);
    }

    #[test]
    fn print_newline_and_int() {
        let memory = Memory::new();
        let host = RecordingHost::new();
        assert_eq!(
            call(SERVICE_PRINT_NEWLINE, 0, &memory, &host).host_effect,
            Some(HostEffect::Emit("\n".to_string()))
        );
        assert_eq!(
            call(SERVICE_PRINT_INT, -42, &memory, &host).host_effect,
            Some(HostEffect::Emit("-42\n".to_string()))
        );
    }

    #[test]
    fn sleep_requests_suspension() {
        let result = call(SERVICE_SLEEP, 3, &Memory::new(), &RecordingHost::new());
        assert_eq!(
            result.host_effect,
            Some(HostEffect::Suspend(Duration::from_secs(3)))
        );
    }

    #[test]
    fn negative_sleep_is_rejected() {
        let result = call(SERVICE_SLEEP, -1, &Memory::new(), &RecordingHost::new());
        assert_eq!(
            result.fault,
            Some(Fault::SyscallArgument {
                service: SERVICE_SLEEP,
                argument: -1
            })
        );
    }

    #[test]
    fn time_writes_truncated_seconds_to_r1() {
        let host = RecordingHost::with_clock(0x1_2345_8001);
        let result = call(SERVICE_TIME, 0, &Memory::new(), &host);
        assert_eq!(
            result.register_write,
            Some(RegisterWrite {
                index: 1,
                value: truncate_seconds(0x1_2345_8001)
            })
        );
        assert_eq!(truncate_seconds(0x1_2345_8001), -32767);
        assert_eq!(truncate_seconds(65), 65);
    }

    #[test]
    fn unknown_services_are_no_ops() {
        for service in [4, 5, 8, -1, i16::MAX] {
            let result = call(service, 0, &Memory::new(), &RecordingHost::new());
            assert_eq!(result, ExecutionResult::sequential());
        }
    }
}
