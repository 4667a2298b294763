//! Opcode abstractions, functionality and constants.
use crate::{definitions::memory, OpcodeError, ProcessError};

/// the base mask used for generating all the other sub masks
pub(crate) const OPCODE_MASK_FFFF: u16 = u16::MAX;

/// the mask for the first twelve bits
pub(crate) const OPCODE_MASK_FFF0: u16 = OPCODE_MASK_FFFF << 4;

/// the mask for the first eight bits
pub(crate) const OPCODE_MASK_FF00: u16 = OPCODE_MASK_FFFF << 8;

/// the mask for the first four bits
pub(crate) const OPCODE_MASK_F000: u16 = OPCODE_MASK_FFFF << 12;

/// the mask for the last four bits
pub(crate) const OPCODE_MASK_000F: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FFF0;

/// the mask for the last eight bits
pub(crate) const OPCODE_MASK_00FF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FF00;

/// the mask for the last twelve bits
pub(crate) const OPCODE_MASK_0FFF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_F000;

/// the size of a single byte
const BYTE_SIZE: u16 = 0x8;

/// the size of a single nibble
const NIBBLE_SIZE: u16 = BYTE_SIZE / 2;

/// a wrapper type for u16 to make it clear what is meant to be used
pub type Opcode = u16;

/// will build an opcode from data and the given point
/// # Arguments
///
/// - `data` - A slice of u8 data entries used to generate the opcodes
/// - `pointer` - Where in the data the opcode shall be extracted, so `pointer` and `pointer + 1` make
/// the opcode up
///
/// # Example
/// ```rust
/// # use chip::opcode::*;
/// # use chip::OpcodeError;
///  const OPCODES: [Opcode; 2] = [0x00EE, 0x1EDA];
///  const SPLIT_OPCODE: [u8; 4] = [0x00, 0xEE, 0x1E, 0xDA];
///  for (i, val) in OPCODES.iter().enumerate() {
///      let opcode = build_opcode(&SPLIT_OPCODE, i * 2).expect("This will work.");
///      assert_eq!(opcode, *val);
///  }
/// # let pointer = 3;
/// # let err = OpcodeError::MemoryInvalid {pointer, len: SPLIT_OPCODE.len() };
/// # assert_eq!(
/// #    Err(err),
/// #    build_opcode(&SPLIT_OPCODE, pointer)
/// # );
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, OpcodeError> {
    // controlling that there is no illegal access here
    match (data.get(pointer), pointer.checked_add(1).and_then(|p| data.get(p))) {
        (Some(&high), Some(&low)) => Ok(Opcode::from_be_bytes([high, low])),
        _ => Err(OpcodeError::MemoryInvalid {
            pointer,
            len: data.len(),
        }),
    }
}

/// These are special traits used to filter out information
/// from opcodes
pub trait OpcodeTrait {
    /// this is an opcode extractor that will return the
    /// opcode class `T000` form any opcode
    fn t(&self) -> Opcode;

    /// this is an opcode extractor for the opcode type `TNNN`
    /// - `NNN` is an address
    fn nnn(&self) -> u16;

    /// this is an opcode extractor for the opcode type `TXNN`
    /// - `NN` is a constant
    fn nn(&self) -> u8;

    /// the last nibble of the opcode `TXYN`
    fn n(&self) -> usize;

    /// this is an opcode extractor for the opcode type `TXTT`
    /// - `X` is a register index
    fn x(&self) -> usize;

    /// this is an opcode extractor for the opcode type `TTYT`
    /// - `Y` is a register index
    fn y(&self) -> usize;

    /// this is an opcode extractor for the opcode type `TXNN`
    fn xnn(&self) -> (usize, u8) {
        (self.x(), self.nn())
    }

    /// this is an opcode extractor for the opcode type `TXYT`
    fn xy(&self) -> (usize, usize) {
        (self.x(), self.y())
    }

    /// this is an opcode extractor for the opcode type `TXYN`
    /// - `N` is either a opcode subtype or a constant
    fn xyn(&self) -> (usize, usize, usize) {
        (self.x(), self.y(), self.n())
    }
}

impl OpcodeTrait for Opcode {
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.t(), 0x1000);
    /// ```
    fn t(&self) -> Opcode {
        self & OPCODE_MASK_F000
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.nnn(), 0xEDA)
    /// ```
    fn nnn(&self) -> u16 {
        self & OPCODE_MASK_0FFF
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.xnn(), (0xE, 0xDA));
    /// ```
    fn nn(&self) -> u8 {
        (self & OPCODE_MASK_00FF) as u8
    }

    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xyn(), (0xE, 0xD, 0xA));
    /// ```
    fn n(&self) -> usize {
        (self & OPCODE_MASK_000F) as usize
    }

    fn x(&self) -> usize {
        ((self & OPCODE_MASK_0FFF & OPCODE_MASK_FF00) >> BYTE_SIZE) as usize
    }

    fn y(&self) -> usize {
        const MASK: u16 = OPCODE_MASK_00FF ^ OPCODE_MASK_000F;
        ((self & MASK) >> NIBBLE_SIZE) as usize
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents the program steps that the chip
/// can take.
pub enum ProgramCounterStep {
    /// Will not change the program counter
    None,
    /// Will move the program counter to the next opcode
    Next,
    /// Will skip the next opcode
    Skip,
    /// Will simply move the program counter to the given location.
    Jump(u16),
}

impl ProgramCounterStep {
    /// Will return a Skip if the condition is true.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next, ProgramCounterStep::cond(false));
    /// assert_eq!(ProgramCounterStep::Skip, ProgramCounterStep::cond(true));
    /// ```
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }

    /// Will apply the step to the given program counter.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(0x202, ProgramCounterStep::Next.apply(0x200));
    /// assert_eq!(0x204, ProgramCounterStep::Skip.apply(0x200));
    /// assert_eq!(0x200, ProgramCounterStep::None.apply(0x200));
    /// assert_eq!(0x345, ProgramCounterStep::Jump(0x345).apply(0x200));
    /// ```
    #[inline]
    pub fn apply(&self, pc: u16) -> u16 {
        match *self {
            ProgramCounterStep::None => pc,
            ProgramCounterStep::Next => pc.wrapping_add(memory::opcodes::SIZE),
            ProgramCounterStep::Skip => pc.wrapping_add(2 * memory::opcodes::SIZE),
            ProgramCounterStep::Jump(pointer) => pointer,
        }
    }
}

/// Represents a step of the program counter
/// this requires the enum ProgramCounterStep
/// to work.
pub trait ProgramCounter {
    /// will move the program counter forward by a step.
    fn step(&mut self, step: ProgramCounterStep);
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents a command from the interpreter up to the host.
pub enum Operation {
    /// If no action has to be taken.
    None,
    /// The instruction is waiting for a key press, the host
    /// shall keep polling and run the cycle again.
    Wait,
    /// The framebuffer was changed and should be redrawn.
    Draw,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// The coarse outcome of a single cycle.
pub enum Status {
    /// The instruction was fully executed.
    Completed,
    /// The instruction waits for a key press.
    Waiting,
    /// The opcode could not be decoded, it was skipped.
    DecodeError,
    /// The instruction failed, the state was left untouched.
    Fatal,
}

impl From<&Result<Operation, ProcessError>> for Status {
    fn from(result: &Result<Operation, ProcessError>) -> Self {
        match result {
            Ok(Operation::Wait) => Status::Waiting,
            Ok(_) => Status::Completed,
            Err(err) if err.is_recoverable() => Status::DecodeError,
            Err(_) => Status::Fatal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StackError;

    #[test]
    fn test_build_opcode_big_endian() {
        let tests = [
            ([0xFF, 0xAA], 0xFFAA),
            ([0xD9, 0x2B], 0xD92B),
            ([0x1A, 0x2B], 0x1A2B),
        ];
        for (data, res) in tests.iter() {
            assert_eq!(Ok(*res), build_opcode(data, 0));
        }
    }

    #[test]
    fn test_build_opcode_out_of_bounds() {
        let data = [0x00, 0xE0];
        assert!(build_opcode(&data, 1).is_err());
        assert!(build_opcode(&data, usize::MAX).is_err());
    }

    #[test]
    fn test_fields() {
        let tests = [
            (0xFFAA, 0xF000, 0xF, 0xA, 0xA, 0xAA, 0xFAA),
            (0xD92B, 0xD000, 0x9, 0x2, 0xB, 0x2B, 0x92B),
            (0xA05E, 0xA000, 0x0, 0x5, 0xE, 0x5E, 0x05E),
        ];
        for &(opcode, t, x, y, n, nn, nnn) in tests.iter() {
            let opcode: Opcode = opcode;
            assert_eq!(t, opcode.t());
            assert_eq!((x, y, n), opcode.xyn());
            assert_eq!(nn, opcode.nn());
            assert_eq!(nnn, opcode.nnn());
        }
    }

    #[test]
    /// all the fields recompose to the original opcode
    fn test_fields_recompose() {
        for opcode in 0..=u16::MAX {
            let (x, y, n) = opcode.xyn();
            let composed = opcode.t() | (x as u16) << 8 | (y as u16) << 4 | n as u16;
            assert_eq!(opcode, composed);
            assert_eq!(opcode, opcode.t() | opcode.nnn());
            assert_eq!(opcode.nnn(), (x as u16) << 8 | opcode.nn() as u16);
            assert_eq!(opcode.nn(), ((y << 4) | n) as u8);
        }
    }

    #[test]
    fn test_status() {
        assert_eq!(Status::Completed, Status::from(&Ok(Operation::None)));
        assert_eq!(Status::Completed, Status::from(&Ok(Operation::Draw)));
        assert_eq!(Status::Waiting, Status::from(&Ok(Operation::Wait)));
        assert_eq!(
            Status::DecodeError,
            Status::from(&Err(OpcodeError::InvalidOpcode(0x8128).into()))
        );
        assert_eq!(
            Status::Fatal,
            Status::from(&Err(StackError::Full.into()))
        );
    }
}
