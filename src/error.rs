use thiserror::Error;

use crate::opcode::Opcode;

#[derive(Error, Debug, PartialEq, Clone)]
pub enum ProcessError {
    #[error("Invalid opcode state '{0}'.")]
    Opcode(#[from] OpcodeError),
    #[error("Invalid stack state '{0}'.")]
    Stack(#[from] StackError),
    #[error("Invalid memory access '{0}'.")]
    Memory(#[from] MemoryError),
}

impl ProcessError {
    /// Only an undecodable opcode can be stepped over, everything else has to be handled
    /// by the host (halt or reset).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProcessError::Opcode(OpcodeError::InvalidOpcode(_)))
    }
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum OpcodeError {
    #[error("An unsupported opcode was used {0:#06X?}.")]
    InvalidOpcode(Opcode),
    #[error("Pointer location invalid there can not be an opcode at {pointer:#06X}, if data len is {len:#06X}")]
    MemoryInvalid { pointer: usize, len: usize },
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum StackError {
    #[error("Stack is full!")]
    Full,
    #[error("Stack is empty!")]
    Empty,
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum MemoryError {
    #[error("Memory access at {address:#06X} with a length of {len} is out of bounds.")]
    OutOfRange { address: usize, len: usize },
    #[error("The program of size {size} does not fit into the {capacity} available bytes.")]
    ProgramTooLarge { size: usize, capacity: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_decode_errors_are_recoverable() {
        assert!(ProcessError::from(OpcodeError::InvalidOpcode(0xFFFF)).is_recoverable());

        let fatal = [
            ProcessError::from(OpcodeError::MemoryInvalid {
                pointer: 0xFFF,
                len: 0x1000,
            }),
            ProcessError::from(StackError::Full),
            ProcessError::from(StackError::Empty),
            ProcessError::from(MemoryError::OutOfRange {
                address: 0x1000,
                len: 1,
            }),
        ];
        for err in fatal.iter() {
            assert!(!err.is_recoverable(), "{} should be fatal", err);
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            "Invalid opcode state 'An unsupported opcode was used 0xFFFF.'.",
            format!("{}", ProcessError::from(OpcodeError::InvalidOpcode(0xFFFF)))
        );
        assert_eq!(
            "Invalid stack state 'Stack is empty!'.",
            format!("{}", ProcessError::from(StackError::Empty))
        );
    }
}
