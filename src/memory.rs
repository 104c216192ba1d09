//! The flat byte addressable ram of the chip.
use crate::{
    definitions::{cpu, display::fontset, memory},
    opcode::{self, Opcode},
    MemoryError,
};

/// - `0x000-0x1FF` - Chip 8 interpreter (contains font set in emu)
/// - `0x050-0x0A0` - Used for the built in `4x5` pixel font set (`0-F`)
/// - `0x200-0xFFF` - Program ROM and work RAM
#[derive(Clone)]
pub struct Memory {
    ram: Box<[u8; memory::SIZE]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    /// Will create zeroed memory with the font set already written into the
    /// reserved region.
    pub fn new() -> Self {
        let mut ram = Box::new([0; memory::SIZE]);

        // load fonts
        ram[fontset::LOCATION..(fontset::LOCATION + fontset::FONTSET.len())]
            .copy_from_slice(&fontset::FONTSET);

        Self { ram }
    }

    /// The amount of bytes a program can take up.
    pub const fn capacity() -> usize {
        memory::SIZE - cpu::PROGRAM_COUNTER
    }

    /// Will write the program into the program region, clearing what ever was
    /// there before. If the program is too large the memory stays untouched.
    pub fn load(&mut self, program: &[u8]) -> Result<(), MemoryError> {
        let max = Self::capacity();
        if program.len() > max {
            return Err(MemoryError::ProgramTooLarge {
                size: program.len(),
                max,
            });
        }

        self.ram[cpu::PROGRAM_COUNTER..].fill(0);
        self.ram[cpu::PROGRAM_COUNTER..(cpu::PROGRAM_COUNTER + program.len())]
            .copy_from_slice(program);
        Ok(())
    }

    pub fn read(&self, address: usize) -> Result<u8, MemoryError> {
        self.ram
            .get(address)
            .copied()
            .ok_or(MemoryError::AddressOutOfRange { address })
    }

    pub fn write(&mut self, address: usize, value: u8) -> Result<(), MemoryError> {
        let cell = self
            .ram
            .get_mut(address)
            .ok_or(MemoryError::AddressOutOfRange { address })?;
        *cell = value;
        Ok(())
    }

    /// Will return `len` bytes starting at `from`, the full range is checked
    /// before anything is accessed.
    pub fn slice(&self, from: usize, len: usize) -> Result<&[u8], MemoryError> {
        let end = Self::end(from, len)?;
        Ok(&self.ram[from..end])
    }

    /// The mutable version of [`slice`](Memory::slice).
    pub fn slice_mut(&mut self, from: usize, len: usize) -> Result<&mut [u8], MemoryError> {
        let end = Self::end(from, len)?;
        Ok(&mut self.ram[from..end])
    }

    /// Will read the big-endian opcode at the given location.
    pub fn opcode(&self, pointer: usize) -> Result<Opcode, MemoryError> {
        opcode::build_opcode(&self.ram[..], pointer)
    }

    /// The full content of the ram.
    pub fn get_data(&self) -> &[u8] {
        &self.ram[..]
    }

    fn end(from: usize, len: usize) -> Result<usize, MemoryError> {
        match from.checked_add(len) {
            Some(end) if end <= memory::SIZE => Ok(end),
            _ => Err(MemoryError::AddressOutOfRange {
                address: from.max(memory::SIZE),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_loaded_on_creation() {
        let mem = Memory::new();
        let font = mem
            .slice(fontset::LOCATION, fontset::FONTSET.len())
            .unwrap();
        assert_eq!(font, &fontset::FONTSET[..]);

        // everything else is zeroed
        assert!(mem.get_data()[..fontset::LOCATION].iter().all(|b| *b == 0));
        assert!(mem.get_data()[cpu::PROGRAM_COUNTER..]
            .iter()
            .all(|b| *b == 0));
    }

    #[test]
    fn test_load_program() {
        let mut mem = Memory::new();
        let program = [0x60, 0x05, 0x61, 0x0A];
        assert_eq!(Ok(()), mem.load(&program));
        assert_eq!(mem.slice(cpu::PROGRAM_COUNTER, 4).unwrap(), &program[..]);

        // a second load clears the remains of the first one
        assert_eq!(Ok(()), mem.load(&[0x12]));
        assert_eq!(mem.read(cpu::PROGRAM_COUNTER), Ok(0x12));
        assert_eq!(mem.read(cpu::PROGRAM_COUNTER + 1), Ok(0x00));
        assert_eq!(mem.read(cpu::PROGRAM_COUNTER + 3), Ok(0x00));
    }

    #[test]
    fn test_load_full_program() {
        let mut mem = Memory::new();
        let program = vec![0xAB; Memory::capacity()];
        assert_eq!(Ok(()), mem.load(&program));
        assert_eq!(mem.read(memory::SIZE - 1), Ok(0xAB));
    }

    #[test]
    fn test_load_too_large() {
        let mut mem = Memory::new();
        let before = mem.get_data().to_vec();
        let program = vec![0xAB; Memory::capacity() + 1];

        assert_eq!(
            Err(MemoryError::ProgramTooLarge {
                size: Memory::capacity() + 1,
                max: Memory::capacity()
            }),
            mem.load(&program)
        );
        assert_eq!(&before[..], mem.get_data());
    }

    #[test]
    fn test_read_write_bounds() {
        let mut mem = Memory::new();
        assert_eq!(Ok(()), mem.write(0xFFF, 0x42));
        assert_eq!(Ok(0x42), mem.read(0xFFF));

        let err = MemoryError::AddressOutOfRange { address: 0x1000 };
        assert_eq!(Err(err), mem.read(0x1000));
        assert_eq!(Err(err), mem.write(0x1000, 0x1));
    }

    #[test]
    fn test_slice_bounds() {
        let mut mem = Memory::new();
        assert!(mem.slice(0xFFD, 3).is_ok());
        assert_eq!(
            Err(MemoryError::AddressOutOfRange { address: 0x1000 }),
            mem.slice(0xFFE, 3)
        );
        assert_eq!(
            Err(MemoryError::AddressOutOfRange { address: 0x10FE }),
            mem.slice_mut(0x10FE, 1).map(|_| ())
        );
        assert!(mem.slice(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_opcode_read() {
        let mut mem = Memory::new();
        mem.load(&[0x00, 0xEE, 0x1E, 0xDA]).unwrap();
        assert_eq!(Ok(0x00EE), mem.opcode(cpu::PROGRAM_COUNTER));
        assert_eq!(Ok(0x1EDA), mem.opcode(cpu::PROGRAM_COUNTER + 2));
        assert_eq!(
            Err(MemoryError::AddressOutOfRange { address: 0x1000 }),
            mem.opcode(0xFFF)
        );
    }
}
