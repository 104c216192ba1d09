//! The register file with the program counter and the call stack.
use tinyvec::ArrayVec;

use crate::{
    definitions::{cpu, memory},
    opcode::{ProgramCounter, ProgramCounterStep},
    StackError,
};

/// The call stack, it's fixed sized and the stack pointer is simply its length.
pub type Stack = ArrayVec<[u16; cpu::stack::SIZE]>;

#[derive(Debug, Clone)]
pub struct Registers {
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions; thus, it should be avoided. In an addition operation, `VF` is the carry flag,
    /// while in subtraction, it is the "no borrow" flag. In the draw instruction `VF` is set upon
    /// pixel collision.
    pub(crate) v: [u8; cpu::register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`
    pub(crate) index: u16,
    /// The program counter is a CPU register in the computer processor which has the address of the
    /// next instruction to be executed from memory.
    pub(crate) program_counter: u16,
    /// The stack is only used to store return addresses when subroutines are called. The original
    /// [RCA 1802](https://de.wikipedia.org/wiki/RCA1802) version allocated `48` bytes for up to
    /// `12` levels of nesting; modern implementations usually have more.
    /// (here we are using `16`)
    pub(crate) stack: Stack,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    pub fn new() -> Self {
        Self {
            v: [0; cpu::register::SIZE],
            index: 0,
            program_counter: cpu::PROGRAM_COUNTER as u16,
            stack: Stack::new(),
        }
    }

    /// Will put everything back into the state after creation.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Will return the value of `V{register}`.
    ///
    /// # Panics
    /// If the register is bigger than `0xF`, the interpreter only ever passes
    /// an opcode nibble.
    pub fn get(&self, register: usize) -> u8 {
        self.v[register]
    }

    /// Will write the value into `V{register}`.
    ///
    /// # Panics
    /// If the register is bigger than `0xF`.
    pub fn set(&mut self, register: usize, value: u8) {
        self.v[register] = value;
    }

    /// Will write the `VF` flag register.
    pub fn set_flag(&mut self, flag: bool) {
        self.v[cpu::register::LAST] = flag as u8;
    }

    pub fn flag(&self) -> u8 {
        self.v[cpu::register::LAST]
    }

    pub fn get_registers(&self) -> &[u8] {
        &self.v
    }

    pub fn get_index(&self) -> u16 {
        self.index
    }

    pub fn get_program_counter(&self) -> u16 {
        self.program_counter
    }

    /// The stack pointer, always one bigger then the entry it points to.
    pub fn get_stack_pointer(&self) -> usize {
        self.stack.len()
    }

    pub fn get_stack(&self) -> &[u16] {
        &self.stack
    }

    /// Will push the current program counter and jump to the target.
    pub fn call(&mut self, target: u16) -> Result<(), StackError> {
        if self.stack.try_push(self.program_counter).is_some() {
            return Err(StackError::Full);
        }
        self.program_counter = target;
        Ok(())
    }

    /// Will pop the program counter from the stack and move past the call
    /// instruction that put it there.
    pub fn ret(&mut self) -> Result<(), StackError> {
        let pointer = self.stack.pop().ok_or(StackError::Empty)?;
        self.program_counter = pointer;
        self.step(ProgramCounterStep::Next);
        Ok(())
    }
}

impl ProgramCounter for Registers {
    fn step(&mut self, step: ProgramCounterStep) {
        self.program_counter = match step {
            ProgramCounterStep::Jump(pointer) => pointer,
            step => self
                .program_counter
                .wrapping_add((step.distance() * memory::opcodes::SIZE) as u16),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let reg = Registers::new();
        assert_eq!(reg.get_registers(), &[0; cpu::register::SIZE]);
        assert_eq!(reg.get_index(), 0);
        assert_eq!(reg.get_program_counter(), 0x200);
        assert_eq!(reg.get_stack_pointer(), 0);
    }

    #[test]
    /// testing internal functionality of popping and pushing into the stack
    fn test_call_ret() {
        let mut reg = Registers::new();

        let base = 0x0333;
        for i in 0..cpu::stack::SIZE {
            let pc = reg.get_program_counter();
            assert_eq!(Ok(()), reg.call(base + (i as u16) * 8));
            assert_eq!(reg.get_stack()[i], pc);
        }
        assert_eq!(cpu::stack::SIZE, reg.get_stack_pointer());

        // check for the correct error and that nothing moved
        let pc = reg.get_program_counter();
        assert_eq!(Err(StackError::Full), reg.call(0x0400));
        assert_eq!(pc, reg.get_program_counter());
        assert_eq!(cpu::stack::SIZE, reg.get_stack_pointer());

        for i in (0..cpu::stack::SIZE).rev() {
            let pushed = reg.get_stack()[i];
            assert_eq!(Ok(()), reg.ret());
            assert_eq!(pushed + 2, reg.get_program_counter());
        }
        assert_eq!(0x202, reg.get_program_counter());

        assert_eq!(Err(StackError::Empty), reg.ret());
        assert_eq!(0x202, reg.get_program_counter());
    }

    #[test]
    fn test_step() {
        let mut reg = Registers::new();
        let mut pc = reg.get_program_counter();

        let data = [
            (ProgramCounterStep::Next, 1),
            (ProgramCounterStep::Skip, 2),
            (ProgramCounterStep::None, 0),
        ];

        for (pcs, by) in data {
            pc += by * memory::opcodes::SIZE as u16;
            reg.step(pcs);
            assert_eq!(reg.get_program_counter(), pc);
        }

        reg.step(ProgramCounterStep::Jump(0x0ABC));
        assert_eq!(reg.get_program_counter(), 0x0ABC);
    }

    #[test]
    fn test_flag() {
        let mut reg = Registers::new();
        reg.set_flag(true);
        assert_eq!(reg.flag(), 1);
        assert_eq!(reg.get(0xF), 1);
        reg.set_flag(false);
        assert_eq!(reg.flag(), 0);
    }

    #[test]
    fn test_reset() {
        let mut reg = Registers::new();
        reg.set(0x3, 0x33);
        reg.index = 0x123;
        reg.call(0x300).unwrap();
        reg.reset();

        assert_eq!(reg.get(0x3), 0);
        assert_eq!(reg.get_index(), 0);
        assert_eq!(reg.get_program_counter(), 0x200);
        assert!(reg.get_stack().is_empty());
    }

    #[test]
    #[should_panic]
    fn test_get_out_of_range() {
        Registers::new().get(cpu::register::SIZE);
    }
}
