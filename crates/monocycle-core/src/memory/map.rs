//! Fixed two-region word address map.

/// Inclusive start address of the instruction region.
pub const INSTRUCTION_START: u16 = 0x0000;
/// Inclusive end address of the instruction region.
pub const INSTRUCTION_END: u16 = 0x03FF;
/// Inclusive start address of the data region.
pub const DATA_START: u16 = 0x0400;
/// Inclusive end address of the data region.
pub const DATA_END: u16 = 0xFFFF;

const _: () = assert_fixed_region_layout();

const fn assert_fixed_region_layout() {
    assert!(
        INSTRUCTION_END.wrapping_add(1) == DATA_START,
        "regions must be contiguous"
    );
    assert!(
        INSTRUCTION_START == 0x0000 && DATA_END == u16::MAX,
        "regions must cover the full word address space"
    );
}
