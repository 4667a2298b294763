//! The flat ram of the chip.
//!
//! - `0x000-0x1FF` - Chip 8 interpreter (contains font set in emu)
//! - `0x050-0x0A0` - Used for the built in `4x5` pixel font set (`0-F`)
//! - `0x200-0xFFF` - Program ROM and work RAM
use crate::{
    definitions::{cpu, display, memory},
    MemoryError,
};

/// A byte addressable store of [`memory::SIZE`] bytes, every access is bounds checked.
#[derive(Clone, PartialEq)]
pub struct Memory {
    data: Box<[u8; memory::SIZE]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            data: Box::new([0; memory::SIZE]),
        }
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory")
            .field("size", &self.data.len())
            .finish()
    }
}

impl Memory {
    /// will create zeroed memory
    pub fn new() -> Self {
        Self::default()
    }

    /// Will read a single byte.
    ///
    /// # Example
    /// ```rust
    /// # use chip::memory::Memory;
    /// let memory = Memory::new();
    /// assert_eq!(memory.read8(0x200), Ok(0));
    /// assert!(memory.read8(0x1000).is_err());
    /// ```
    pub fn read8(&self, address: usize) -> Result<u8, MemoryError> {
        self.data
            .get(address)
            .copied()
            .ok_or(MemoryError::OutOfRange { address, len: 1 })
    }

    /// Will write a single byte.
    pub fn write8(&mut self, address: usize, value: u8) -> Result<(), MemoryError> {
        let cell = self
            .data
            .get_mut(address)
            .ok_or(MemoryError::OutOfRange { address, len: 1 })?;
        *cell = value;
        Ok(())
    }

    /// Will return `len` bytes starting at `address`, or an error if any of them is out of range.
    pub fn slice(&self, address: usize, len: usize) -> Result<&[u8], MemoryError> {
        let end = Self::end(address, len)?;
        Ok(&self.data[address..end])
    }

    /// The mutable version of [`slice`](Memory::slice).
    pub fn slice_mut(&mut self, address: usize, len: usize) -> Result<&mut [u8], MemoryError> {
        let end = Self::end(address, len)?;
        Ok(&mut self.data[address..end])
    }

    /// The full content of the ram.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..]
    }

    /// Will copy the program into memory starting at the program counter start location.
    ///
    /// The load is rejected as a whole if the program does not fit.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), MemoryError> {
        let capacity = memory::SIZE - cpu::PROGRAM_COUNTER;
        if program.len() > capacity {
            return Err(MemoryError::ProgramTooLarge {
                size: program.len(),
                capacity,
            });
        }
        self.slice_mut(cpu::PROGRAM_COUNTER, program.len())?
            .copy_from_slice(program);
        log::debug!(
            "loaded program of {} bytes at {:#06X}",
            program.len(),
            cpu::PROGRAM_COUNTER
        );
        Ok(())
    }

    /// Will copy the font glyphs into memory, starting at `location`.
    pub fn load_fontset(&mut self, location: usize) -> Result<(), MemoryError> {
        let fontset = &display::fontset::FONTSET;
        if location.saturating_add(fontset.len()) > cpu::PROGRAM_COUNTER {
            return Err(MemoryError::OutOfRange {
                address: location,
                len: fontset.len(),
            });
        }
        self.slice_mut(location, fontset.len())?
            .copy_from_slice(fontset);
        Ok(())
    }

    /// Will zero the whole ram.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    fn end(address: usize, len: usize) -> Result<usize, MemoryError> {
        match address.checked_add(len) {
            Some(end) if end <= memory::SIZE => Ok(end),
            _ => Err(MemoryError::OutOfRange { address, len }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write_bounds() {
        let mut memory = Memory::new();

        assert_eq!(Ok(()), memory.write8(memory::LAST_ADDRESS, 0x42));
        assert_eq!(Ok(0x42), memory.read8(memory::LAST_ADDRESS));

        let err = MemoryError::OutOfRange {
            address: memory::SIZE,
            len: 1,
        };
        assert_eq!(Err(err), memory.write8(memory::SIZE, 0x42));
        assert_eq!(Err(err), memory.read8(memory::SIZE));
    }

    #[test]
    fn test_slice_bounds() {
        let memory = Memory::new();
        assert_eq!(memory.slice(0xFFD, 3).map(|s| s.len()), Ok(3));
        assert_eq!(
            memory.slice(0xFFE, 3),
            Err(MemoryError::OutOfRange {
                address: 0xFFE,
                len: 3
            })
        );
        assert!(memory.slice(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_load_program() {
        let mut memory = Memory::new();
        let program = [0x6A, 0x07, 0x00, 0xE0];
        assert_eq!(Ok(()), memory.load_program(&program));
        assert_eq!(
            Ok(&program[..]),
            memory.slice(cpu::PROGRAM_COUNTER, program.len())
        );
    }

    #[test]
    fn test_load_program_exact_fit() {
        let mut memory = Memory::new();
        let program = vec![0xAB; memory::SIZE - cpu::PROGRAM_COUNTER];
        assert_eq!(Ok(()), memory.load_program(&program));
        assert_eq!(Ok(0xAB), memory.read8(memory::LAST_ADDRESS));
    }

    #[test]
    fn test_load_program_too_large() {
        let mut memory = Memory::new();
        let program = vec![0xAB; memory::SIZE - cpu::PROGRAM_COUNTER + 1];
        assert_eq!(
            Err(MemoryError::ProgramTooLarge {
                size: program.len(),
                capacity: memory::SIZE - cpu::PROGRAM_COUNTER,
            }),
            memory.load_program(&program)
        );
        // nothing was written
        assert!(memory.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_load_fontset() {
        let mut memory = Memory::new();
        let location = display::fontset::LOCATION;
        assert_eq!(Ok(()), memory.load_fontset(location));
        assert_eq!(
            Ok(&display::fontset::FONTSET[..]),
            memory.slice(location, display::fontset::FONTSET.len())
        );
        // the glyph for `F` starts at `location + 0xF * 5`
        assert_eq!(Ok(0xF0), memory.read8(location + 0xF * 5));
        assert_eq!(Ok(0x80), memory.read8(location + 0xF * 5 + 4));
    }

    #[test]
    fn test_load_fontset_into_program_area() {
        let mut memory = Memory::new();
        assert!(memory.load_fontset(cpu::PROGRAM_COUNTER - 10).is_err());
        assert!(memory.load_fontset(usize::MAX).is_err());
    }

    #[test]
    fn test_clear() {
        let mut memory = Memory::new();
        assert_eq!(Ok(()), memory.load_program(&[0x12, 0x00]));
        memory.clear();
        assert_eq!(Memory::new(), memory);
    }
}
