//! Routes a fetched opcode to its handler.
//!
//! The table is keyed by the opcode class (`T000`) and a class specific selector, so every
//! supported instruction is a single entry:
//!
//! - `0x0`, `0x8`, `0xE`, `0xF` - selected by `N`
//! - `0xF` with `N = 5` - selected by `Y` as well, which tells `FX15`, `FX55` and `FX65` apart
//! - everything else has no selector
use hashbrown::HashMap;
use once_cell::sync::Lazy;

use crate::{
    opcode::{Opcode, OpcodeTrait, Operation, ProgramCounterStep},
    OpcodeError, ProcessError,
};

use super::ChipSet;

/// What a handler hands back to the cycle, the step is only applied on success.
pub(super) type Outcome = Result<(ProgramCounterStep, Operation), ProcessError>;

/// A single instruction implementation
pub(super) type Handler = fn(&mut ChipSet, Opcode) -> Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Key {
    class: u8,
    selector: u16,
}

impl Key {
    const fn new(class: u8, selector: u16) -> Self {
        Self { class, selector }
    }

    fn from_opcode(opcode: Opcode) -> Self {
        let class = (opcode.t() >> 12) as u8;
        let n = opcode.n() as u16;
        let selector = match (class, n) {
            (0xF, 0x5) => (opcode.y() as u16) << 4 | n,
            (0x0, _) | (0x8, _) | (0xE, _) | (0xF, _) => n,
            _ => 0,
        };
        Self::new(class, selector)
    }
}

struct Entry {
    mnemonic: &'static str,
    handler: Handler,
}

static TABLE: Lazy<HashMap<Key, Entry>> = Lazy::new(|| {
    let entries: [(u8, u16, &'static str, Handler); 34] = [
        (0x0, 0x0, "CLS", ChipSet::clear_display),
        (0x0, 0xE, "RET", ChipSet::return_subroutine),
        (0x1, 0x0, "JP addr", ChipSet::jump),
        (0x2, 0x0, "CALL addr", ChipSet::call_subroutine),
        (0x3, 0x0, "SE Vx, byte", ChipSet::skip_equals_const),
        (0x4, 0x0, "SNE Vx, byte", ChipSet::skip_not_equals_const),
        (0x5, 0x0, "SE Vx, Vy", ChipSet::skip_equals_register),
        (0x6, 0x0, "LD Vx, byte", ChipSet::set_const),
        (0x7, 0x0, "ADD Vx, byte", ChipSet::add_const),
        (0x8, 0x0, "LD Vx, Vy", ChipSet::set_register),
        (0x8, 0x1, "OR Vx, Vy", ChipSet::or),
        (0x8, 0x2, "AND Vx, Vy", ChipSet::and),
        (0x8, 0x3, "XOR Vx, Vy", ChipSet::xor),
        (0x8, 0x4, "ADD Vx, Vy", ChipSet::add_with_carry),
        (0x8, 0x5, "SUB Vx, Vy", ChipSet::sub_with_borrow),
        (0x8, 0x6, "SHR Vx", ChipSet::shift_right),
        (0x8, 0x7, "SUBN Vx, Vy", ChipSet::sub_reverse),
        (0x8, 0xE, "SHL Vx", ChipSet::shift_left),
        (0x9, 0x0, "SNE Vx, Vy", ChipSet::skip_not_equals_register),
        (0xA, 0x0, "LD I, addr", ChipSet::set_index),
        (0xB, 0x0, "JP V0, addr", ChipSet::jump_offset),
        (0xC, 0x0, "RND Vx, byte", ChipSet::random),
        (0xD, 0x0, "DRW Vx, Vy, nibble", ChipSet::draw),
        (0xE, 0xE, "SKP Vx", ChipSet::skip_key_pressed),
        (0xE, 0x1, "SKNP Vx", ChipSet::skip_key_not_pressed),
        (0xF, 0x7, "LD Vx, DT", ChipSet::get_delay_timer_into),
        (0xF, 0xA, "LD Vx, K", ChipSet::await_key_press),
        (0xF, 0x15, "LD DT, Vx", ChipSet::set_delay_timer),
        (0xF, 0x8, "LD ST, Vx", ChipSet::set_sound_timer),
        (0xF, 0xE, "ADD I, Vx", ChipSet::add_index),
        (0xF, 0x9, "LD F, Vx", ChipSet::set_index_to_sprite),
        (0xF, 0x3, "LD B, Vx", ChipSet::store_bcd),
        (0xF, 0x55, "LD [I], Vx", ChipSet::store_registers),
        (0xF, 0x65, "LD Vx, [I]", ChipSet::load_registers),
    ];

    let mut table = HashMap::with_capacity(entries.len());
    for &(class, selector, mnemonic, handler) in entries.iter() {
        table.insert(Key::new(class, selector), Entry { mnemonic, handler });
    }
    table
});

fn lookup(opcode: Opcode) -> Option<&'static Entry> {
    TABLE.get(&Key::from_opcode(opcode))
}

/// Will run the handler matching the opcode, or fail with an invalid opcode error.
pub(super) fn execute(chip: &mut ChipSet, opcode: Opcode) -> Outcome {
    let entry = lookup(opcode).ok_or(OpcodeError::InvalidOpcode(opcode))?;
    log::trace!(
        "{:#06X}: {:#06X} {}",
        chip.program_counter,
        opcode,
        entry.mnemonic
    );
    (entry.handler)(chip, opcode)
}

/// The mnemonic of the instruction the opcode decodes to.
///
/// # Example
/// ```rust
/// # use chip::chip8::mnemonic;
/// assert_eq!(Some("LD Vx, byte"), mnemonic(0x6A07));
/// assert_eq!(Some("LD [I], Vx"), mnemonic(0xF355));
/// assert_eq!(Some("LD DT, Vx"), mnemonic(0xF315));
/// assert_eq!(None, mnemonic(0x8128));
/// ```
pub fn mnemonic(opcode: Opcode) -> Option<&'static str> {
    lookup(opcode).map(|entry| entry.mnemonic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_instruction_set() {
        assert_eq!(34, TABLE.len());
    }

    #[test]
    fn test_lookup() {
        let tests = [
            (0x00E0, Some("CLS")),
            (0x00EE, Some("RET")),
            // only the low nibble selects inside of class 0
            (0x0000, Some("CLS")),
            (0x0EEE, Some("RET")),
            (0x00E1, None),
            (0x0123, None),
            (0x1919, Some("JP addr")),
            (0x5120, Some("SE Vx, Vy")),
            (0x5121, Some("SE Vx, Vy")),
            (0x812E, Some("SHL Vx")),
            (0x8128, None),
            (0x9120, Some("SNE Vx, Vy")),
            (0x912F, Some("SNE Vx, Vy")),
            (0xD123, Some("DRW Vx, Vy, nibble")),
            (0xE19E, Some("SKP Vx")),
            (0xE19F, None),
            (0xE1AE, Some("SKP Vx")),
            (0xE1A1, Some("SKNP Vx")),
            (0xE111, Some("SKNP Vx")),
            (0xE112, None),
            (0xF007, Some("LD Vx, DT")),
            (0xF017, Some("LD Vx, DT")),
            (0xF015, Some("LD DT, Vx")),
            (0xF055, Some("LD [I], Vx")),
            (0xF065, Some("LD Vx, [I]")),
            (0xF075, None),
            (0xF025, None),
            (0xF0AA, Some("LD Vx, K")),
            (0xF0A1, None),
        ];
        for &(opcode, expected) in tests.iter() {
            assert_eq!(expected, mnemonic(opcode), "opcode {:#06X}", opcode);
        }
    }

    #[test]
    fn test_every_class_dispatches() {
        // every class has at least one opcode that decodes
        for class in 0x0..=0xFu16 {
            let found = (0..=0x0FFFu16).any(|rest| mnemonic(class << 12 | rest).is_some());
            assert!(found, "class {:#X}", class);
        }
    }
}
