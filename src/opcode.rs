//! Opcode abstractions, functionality and constants.
use std::fmt;

use crate::{MemoryError, ProcessError, UnknownOpcode};

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
/// # use chip::MemoryError;
///  const OPCODES: [Opcode; 2] = [0x00EE, 0x1EDA];
///  const SPLIT_OPCODE: [u8; 4] = [0x00, 0xEE, 0x1E, 0xDA];
///  for (i, val) in OPCODES.iter().enumerate() {
///      let opcode = build_opcode(&SPLIT_OPCODE, i * 2).expect("This will work.");
///      assert_eq!(opcode, *val);
///  }
/// # let err = MemoryError::AddressOutOfRange { address: 4 };
/// # assert_eq!(Err(err), build_opcode(&SPLIT_OPCODE, 3));
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, MemoryError> {
    // controlling that there is no illegal access here
    match (data.get(pointer), pointer.checked_add(1).and_then(|p| data.get(p))) {
        (Some(high), Some(low)) => Ok(Opcode::from_be_bytes([*high, *low])),
        (Some(_), None) => Err(MemoryError::AddressOutOfRange {
            address: pointer + 1,
        }),
        _ => Err(MemoryError::AddressOutOfRange { address: pointer }),
    }
}

/// These are special traits used to filter out information
/// from opcodes
pub trait OpcodeTrait {
    /// this is an opcode extractor that will return the
    /// opcode family (the top nibble)
    fn t(&self) -> u8;

    /// this is an opcode extractor for the opcode type `TNNN`
    /// - `T` is the opcode type
    /// - `NNN` is an address or a 12 bit constant
    fn nnn(&self) -> u16;

    /// this is an opcode extractor for the opcode type `TXNN`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `NN` is a constant
    fn xnn(&self) -> (usize, u8);

    /// this is an opcode extractor for the opcode type `TXYN`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `Y` is a register index
    /// - `N` is a 4 bit constant or opcode subtype
    fn xyn(&self) -> (usize, usize, u8);

    /// this is an opcode extractor for the opcode type `TXYT`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `Y` is a register index
    fn xy(&self) -> (usize, usize);

    /// this is an opcode extractor for the opcode type `TXTT`
    /// - `T` is the opcode type
    /// - `X` is a register index
    fn x(&self) -> usize;
}

impl OpcodeTrait for Opcode {
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.t(), 0x1);
    /// ```
    fn t(&self) -> u8 {
        ((self & OPCODE_MASK_F000) >> (3 * BYTE_SIZE / 2)) as u8
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
    fn xnn(&self) -> (usize, u8) {
        let x = self.x();
        let nn = (self & OPCODE_MASK_00FF) as u8;
        (x, nn)
    }

    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xyn(), (0xE, 0xD, 0xA));
    /// ```
    fn xyn(&self) -> (usize, usize, u8) {
        let (x, y) = self.xy();
        let n = (self & OPCODE_MASK_000F) as u8;
        (x, y, n)
    }

    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xy(), (0xE, 0xD));
    /// ```
    fn xy(&self) -> (usize, usize) {
        let x = self.x();
        const MASK: u16 = OPCODE_MASK_00FF ^ OPCODE_MASK_000F;
        const NIBBLE: u16 = BYTE_SIZE / 2;
        let y = ((self & MASK) >> NIBBLE) as usize;
        (x, y)
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.x(), 0xE);
    /// ```
    fn x(&self) -> usize {
        ((self & OPCODE_MASK_0FFF & OPCODE_MASK_FF00) >> BYTE_SIZE) as usize
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents the program steps that the chip
/// can take.
pub enum ProgramCounterStep {
    /// Will not change the program counter
    None,
    /// Will move the program counter to the next instruction
    Next,
    /// Will skip the next instruction
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

    /// Maps the relative steps to the amount of instructions moved over.
    /// A [`Jump`](ProgramCounterStep::Jump) is absolute and so has no distance.
    #[inline]
    pub fn distance(&self) -> usize {
        match *self {
            ProgramCounterStep::None | ProgramCounterStep::Jump(_) => 0,
            ProgramCounterStep::Next => 1,
            ProgramCounterStep::Skip => 2,
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
    /// The chip is stalled until the next key press
    Wait,
    /// The display buffer changed and should be redrawn
    Draw,
}

/// A single decoded instruction, only carrying the operands it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `00E0` - Clears the screen.
    ClearScreen,
    /// `00EE` - Returns from a subroutine.
    Return,
    /// `1NNN` - Jumps to address `NNN`.
    Jump { nnn: u16 },
    /// `2NNN` - Calls subroutine at `NNN`.
    Call { nnn: u16 },
    /// `3XNN` - Skips the next instruction if `VX` equals `NN`.
    SkipEqImm { x: usize, nn: u8 },
    /// `4XNN` - Skips the next instruction if `VX` doesn't equal `NN`.
    SkipNeImm { x: usize, nn: u8 },
    /// `5XY0` - Skips the next instruction if `VX` equals `VY`.
    SkipEqReg { x: usize, y: usize },
    /// `6XNN` - Sets `VX` to `NN`.
    LoadImm { x: usize, nn: u8 },
    /// `7XNN` - Adds `NN` to `VX`. (Carry flag is not changed)
    AddImm { x: usize, nn: u8 },
    /// `8XY0` - Sets `VX` to the value of `VY`.
    LoadReg { x: usize, y: usize },
    /// `8XY1` - Sets `VX` to `VX` or `VY`.
    Or { x: usize, y: usize },
    /// `8XY2` - Sets `VX` to `VX` and `VY`.
    And { x: usize, y: usize },
    /// `8XY3` - Sets `VX` to `VX` xor `VY`.
    Xor { x: usize, y: usize },
    /// `8XY4` - Adds `VY` to `VX`. `VF` is set to `1` when there's a carry.
    AddReg { x: usize, y: usize },
    /// `8XY5` - `VY` is subtracted from `VX`. `VF` is set to `1` when `VX > VY`.
    SubReg { x: usize, y: usize },
    /// `8XY6` - Stores the least significant bit of `VX` in `VF` and shifts `VX` right by `1`.
    ShiftRight { x: usize },
    /// `8XY7` - Sets `VX` to `VY` minus `VX`. `VF` is set to `1` when `VY > VX`.
    SubNReg { x: usize, y: usize },
    /// `8XYE` - Stores the most significant bit of `VX` in `VF` and shifts `VX` left by `1`.
    ShiftLeft { x: usize },
    /// `9XY0` - Skips the next instruction if `VX` doesn't equal `VY`.
    SkipNeReg { x: usize, y: usize },
    /// `ANNN` - Sets `I` to the address `NNN`.
    LoadIndex { nnn: u16 },
    /// `BNNN` - Jumps to the address `NNN` plus `V0`.
    JumpIndexed { nnn: u16 },
    /// `CXNN` - Sets `VX` to a random byte and `NN`.
    Rand { x: usize, nn: u8 },
    /// `DXYN` - Draws the `N` byte high sprite at `I` to `(VX, VY)`.
    Draw { x: usize, y: usize, n: u8 },
    /// `EX9E` - Skips the next instruction if the key stored in `VX` is pressed.
    SkipIfKey { x: usize },
    /// `EXA1` - Skips the next instruction if the key stored in `VX` isn't pressed.
    SkipIfNotKey { x: usize },
    /// `FX07` - Sets `VX` to the value of the delay timer.
    LoadDelay { x: usize },
    /// `FX0A` - A key press is awaited, and then stored in `VX`.
    WaitKey { x: usize },
    /// `FX15` - Sets the delay timer to `VX`.
    SetDelay { x: usize },
    /// `FX18` - Sets the sound timer to `VX`.
    SetSound { x: usize },
    /// `FX1E` - Adds `VX` to `I`. `VF` is not affected.
    AddIndex { x: usize },
    /// `FX29` - Sets `I` to the location of the font glyph for `VX`.
    LoadFontAddr { x: usize },
    /// `FX33` - Stores the binary-coded decimal representation of `VX` at `I`, `I+1` and `I+2`.
    StoreBcd { x: usize },
    /// `FX55` - Stores `V0` to `VX` (including `VX`) in memory starting at address `I`.
    StoreRegs { x: usize },
    /// `FX65` - Fills `V0` to `VX` (including `VX`) from memory starting at address `I`.
    LoadRegs { x: usize },
}

impl TryFrom<Opcode> for Instruction {
    type Error = UnknownOpcode;

    fn try_from(value: Opcode) -> Result<Self, Self::Error> {
        let (x, y, n) = value.xyn();
        let nn = value.xnn().1;
        let nnn = value.nnn();

        let res = match (value.t(), n) {
            (0x0, _) => match value {
                0x00E0 => Instruction::ClearScreen,
                0x00EE => Instruction::Return,
                _ => return Err(UnknownOpcode(value)),
            },
            (0x1, _) => Instruction::Jump { nnn },
            (0x2, _) => Instruction::Call { nnn },
            (0x3, _) => Instruction::SkipEqImm { x, nn },
            (0x4, _) => Instruction::SkipNeImm { x, nn },
            (0x5, 0x0) => Instruction::SkipEqReg { x, y },
            (0x6, _) => Instruction::LoadImm { x, nn },
            (0x7, _) => Instruction::AddImm { x, nn },
            (0x8, 0x0) => Instruction::LoadReg { x, y },
            (0x8, 0x1) => Instruction::Or { x, y },
            (0x8, 0x2) => Instruction::And { x, y },
            (0x8, 0x3) => Instruction::Xor { x, y },
            (0x8, 0x4) => Instruction::AddReg { x, y },
            (0x8, 0x5) => Instruction::SubReg { x, y },
            (0x8, 0x6) => Instruction::ShiftRight { x },
            (0x8, 0x7) => Instruction::SubNReg { x, y },
            (0x8, 0xE) => Instruction::ShiftLeft { x },
            (0x9, 0x0) => Instruction::SkipNeReg { x, y },
            (0xA, _) => Instruction::LoadIndex { nnn },
            (0xB, _) => Instruction::JumpIndexed { nnn },
            (0xC, _) => Instruction::Rand { x, nn },
            (0xD, _) => Instruction::Draw { x, y, n },
            (0xE, _) => match nn {
                0x9E => Instruction::SkipIfKey { x },
                0xA1 => Instruction::SkipIfNotKey { x },
                _ => return Err(UnknownOpcode(value)),
            },
            (0xF, _) => match nn {
                0x07 => Instruction::LoadDelay { x },
                0x0A => Instruction::WaitKey { x },
                0x15 => Instruction::SetDelay { x },
                0x18 => Instruction::SetSound { x },
                0x1E => Instruction::AddIndex { x },
                0x29 => Instruction::LoadFontAddr { x },
                0x33 => Instruction::StoreBcd { x },
                0x55 => Instruction::StoreRegs { x },
                0x65 => Instruction::LoadRegs { x },
                _ => return Err(UnknownOpcode(value)),
            },
            _ => return Err(UnknownOpcode(value)),
        };
        Ok(res)
    }
}

/// The classic assembler mnemonics.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump { nnn } => write!(f, "JP {:03X}", nnn),
            Call { nnn } => write!(f, "CALL {:03X}", nnn),
            SkipEqImm { x, nn } => write!(f, "SE V{:X}, {:02X}", x, nn),
            SkipNeImm { x, nn } => write!(f, "SNE V{:X}, {:02X}", x, nn),
            SkipEqReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadImm { x, nn } => write!(f, "LD V{:X}, {:02X}", x, nn),
            AddImm { x, nn } => write!(f, "ADD V{:X}, {:02X}", x, nn),
            LoadReg { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            SubReg { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight { x } => write!(f, "SHR V{:X}", x),
            SubNReg { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft { x } => write!(f, "SHL V{:X}", x),
            SkipNeReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex { nnn } => write!(f, "LD I, {:03X}", nnn),
            JumpIndexed { nnn } => write!(f, "JP V0, {:03X}", nnn),
            Rand { x, nn } => write!(f, "RND V{:X}, {:02X}", x, nn),
            Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {:X}", x, y, n),
            SkipIfKey { x } => write!(f, "SKP V{:X}", x),
            SkipIfNotKey { x } => write!(f, "SKNP V{:X}", x),
            LoadDelay { x } => write!(f, "LD V{:X}, DT", x),
            WaitKey { x } => write!(f, "LD V{:X}, K", x),
            SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            SetSound { x } => write!(f, "LD ST, V{:X}", x),
            AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            LoadFontAddr { x } => write!(f, "LD F, V{:X}", x),
            StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            StoreRegs { x } => write!(f, "LD [I], V{:X}", x),
            LoadRegs { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}

/// These are the traits that have to be full filled for a working opcode
/// table.
///
/// This trait requires the implementation of the [`ProgramCounter`](ProgramCounter) trait, as
/// every executed instruction moves the program counter by the returned step.
pub trait ChipOpcodes: ProgramCounter {
    /// will calculate the programs step by a single step
    fn calc(&mut self, instruction: Instruction) -> Result<Operation, ProcessError> {
        let (step, operation) = self.execute(instruction)?;
        self.step(step);
        Ok(operation)
    }

    /// Will run the given instruction and return how the program counter
    /// shall move afterwards. No state may be touched if an error is returned.
    fn execute(
        &mut self,
        instruction: Instruction,
    ) -> Result<(ProgramCounterStep, Operation), ProcessError>;
}
