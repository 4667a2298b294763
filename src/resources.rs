//! The program images the host hands over to the chip.
use crate::{
    definitions::{cpu, memory},
    opcode::Opcode,
    MemoryError,
};

#[derive(Clone, Debug, PartialEq)]
/// Represents a single rom with it's information
pub struct Rom {
    /// The rom name
    name: String,
    /// The program data stored as a u8 slice on the heap
    data: Box<[u8]>,
}

impl Rom {
    /// Will generate a new rom based of the given data.
    ///
    /// Fails if the data would not fit into the program area of the memory.
    ///
    /// # Example
    /// ```rust
    /// # use chip::resources::Rom;
    /// assert!(Rom::new("tiny", vec![0x00, 0xE0]).is_ok());
    /// assert!(Rom::new("huge", vec![0; 0x1000]).is_err());
    /// ```
    pub fn new(name: &str, data: impl Into<Box<[u8]>>) -> Result<Self, MemoryError> {
        let data = data.into();
        let capacity = memory::SIZE - cpu::PROGRAM_COUNTER;
        if data.len() > capacity {
            return Err(MemoryError::ProgramTooLarge {
                size: data.len(),
                capacity,
            });
        }
        Ok(Rom {
            name: name.to_string(),
            data,
        })
    }

    /// Will generate a rom from opcodes, storing them big-endian.
    ///
    /// # Example
    /// ```rust
    /// # use chip::resources::Rom;
    /// let rom = Rom::from_opcodes("clear", &[0x00E0, 0x1200]).unwrap();
    /// assert_eq!(rom.get_data(), &[0x00, 0xE0, 0x12, 0x00]);
    /// ```
    pub fn from_opcodes(name: &str, opcodes: &[Opcode]) -> Result<Self, MemoryError> {
        let data: Vec<u8> = opcodes.iter().flat_map(|op| op.to_be_bytes()).collect();
        Self::new(name, data)
    }

    /// Will return a slice internal values of the given data
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    /// Will return the name of the rom.
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::build_opcode;

    const RAW_ROM_DATA: [Opcode; 16] = [
        0x00E0, 0x6C00, 0x4C00, 0x6E0F, 0xA203, 0x6020, 0xF055, 0x00E0, 0x22BE, 0x2276, 0x228E,
        0x225E, 0x2246, 0x1210, 0x6100, 0x6217,
    ];

    #[test]
    fn test_rom_from_opcodes() {
        let rom = Rom::from_opcodes("15PUZZLE", &RAW_ROM_DATA).expect("rom fits");
        let data = rom.get_data();
        assert_eq!(RAW_ROM_DATA.len() * 2, data.len());
        assert_eq!("15PUZZLE", rom.get_name());

        for i in (0..data.len()).step_by(2) {
            assert_eq!(Ok(RAW_ROM_DATA[i / 2]), build_opcode(data, i));
        }
    }

    #[test]
    fn test_rom_too_large() {
        let size = memory::SIZE - cpu::PROGRAM_COUNTER + 1;
        assert_eq!(
            Err(MemoryError::ProgramTooLarge {
                size,
                capacity: size - 1
            }),
            Rom::new("huge", vec![0; size])
        );
    }
}
