#![no_main]

use libfuzzer_sys::fuzz_target;
use monocycle_core::{
    decode_words, disassemble_program, Decoder, Engine, EngineConfig, RecordingHost,
};

fuzz_target!(|data: &[u8]| {
    let even = &data[..data.len() & !1];
    let Ok(program) = decode_words(even) else {
        return;
    };

    for word in &program {
        assert_eq!(Decoder::decode(*word).encode(), *word);
    }
    let _ = disassemble_program(&program);

    let config = EngineConfig {
        max_cycles: 4_096,
        progress_interval: 0,
    };
    let Ok(mut engine) = Engine::from_program(&program, config) else {
        return;
    };
    let mut host = RecordingHost::new();
    let outcome = engine.run(&mut host);
    assert!(outcome.cycles() <= config.max_cycles);
});
