use crate::{
    definitions::display,
    opcode::{ChipOpcodes, Instruction, Operation, ProgramCounterStep},
    timer::Timed,
    ProcessError,
};

use super::{chipset::KeyWait, ChipSet};

impl ChipOpcodes for ChipSet {
    fn execute(
        &mut self,
        instruction: Instruction,
    ) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        let mut operation = Operation::None;

        let step = match instruction {
            Instruction::ClearScreen => {
                // 00E0
                // clear display
                self.display.clear();
                operation = Operation::Draw;
                ProgramCounterStep::Next
            }
            Instruction::Return => {
                // 00EE
                // Return from sub routine => pop from stack, the call itself is skipped
                self.registers.ret()?;
                log::debug!("returned to {:#06X}", self.registers.program_counter);
                ProgramCounterStep::None
            }
            Instruction::Jump { nnn } => {
                // 1NNN
                // Jumps to address NNN.
                ProgramCounterStep::Jump(nnn)
            }
            Instruction::Call { nnn } => {
                // 2NNN
                // Calls subroutine at NNN, the address of the call itself is pushed
                self.registers.call(nnn)?;
                ProgramCounterStep::None
            }
            Instruction::SkipEqImm { x, nn } => {
                // 3XNN
                // Skips the next instruction if VX equals NN. (Usually the next instruction is a
                // jump to skip a code block)
                ProgramCounterStep::cond(self.registers.get(x) == nn)
            }
            Instruction::SkipNeImm { x, nn } => {
                // 4XNN
                // Skips the next instruction if VX doesn't equal NN.
                ProgramCounterStep::cond(self.registers.get(x) != nn)
            }
            Instruction::SkipEqReg { x, y } => {
                // 5XY0
                // Skips the next instruction if VX equals VY.
                ProgramCounterStep::cond(self.registers.get(x) == self.registers.get(y))
            }
            Instruction::LoadImm { x, nn } => {
                // 6XNN
                // Sets VX to NN.
                self.registers.set(x, nn);
                ProgramCounterStep::Next
            }
            Instruction::AddImm { x, nn } => {
                // 7XNN
                // Adds NN to VX. (Carry flag is not changed)
                let res = self.registers.get(x).wrapping_add(nn);
                self.registers.set(x, res);
                ProgramCounterStep::Next
            }
            Instruction::LoadReg { x, y } => {
                // 8XY0
                // Sets VX to the value of VY.
                self.registers.set(x, self.registers.get(y));
                ProgramCounterStep::Next
            }
            Instruction::Or { x, y } => {
                // 8XY1
                // Sets VX to VX or VY. (Bitwise OR operation)
                self.registers
                    .set(x, self.registers.get(x) | self.registers.get(y));
                ProgramCounterStep::Next
            }
            Instruction::And { x, y } => {
                // 8XY2
                // Sets VX to VX and VY. (Bitwise AND operation)
                self.registers
                    .set(x, self.registers.get(x) & self.registers.get(y));
                ProgramCounterStep::Next
            }
            Instruction::Xor { x, y } => {
                // 8XY3
                // Sets VX to VX xor VY.
                self.registers
                    .set(x, self.registers.get(x) ^ self.registers.get(y));
                ProgramCounterStep::Next
            }
            Instruction::AddReg { x, y } => {
                // 8XY4
                // Adds VY to VX. VF is set to 1 when there's a carry, and to 0 when there isn't.
                let (res, carry) = self.registers.get(x).overflowing_add(self.registers.get(y));
                self.registers.set(x, res);
                self.registers.set_flag(carry);
                ProgramCounterStep::Next
            }
            Instruction::SubReg { x, y } => {
                // 8XY5
                // VY is subtracted from VX. VF is set to 1 when VX is strictly bigger.
                let (left, right) = (self.registers.get(x), self.registers.get(y));
                self.registers.set(x, left.wrapping_sub(right));
                self.registers.set_flag(left > right);
                ProgramCounterStep::Next
            }
            Instruction::ShiftRight { x } => {
                // 8XY6
                // Stores the least significant bit of VX in VF and then shifts VX to the right
                // by 1.
                let value = self.registers.get(x);
                self.registers.set(x, value >> 1);
                self.registers.set_flag(value & 0x01 == 0x01);
                ProgramCounterStep::Next
            }
            Instruction::SubNReg { x, y } => {
                // 8XY7
                // Sets VX to VY minus VX. VF is set to 1 when VY is strictly bigger.
                let (left, right) = (self.registers.get(y), self.registers.get(x));
                self.registers.set(x, left.wrapping_sub(right));
                self.registers.set_flag(left > right);
                ProgramCounterStep::Next
            }
            Instruction::ShiftLeft { x } => {
                // 8XYE
                // Stores the most significant bit of VX in VF and then shifts VX to the left by 1.
                const AND_SIGNIFICANT: u8 = 1 << 7;
                let value = self.registers.get(x);
                self.registers.set(x, value << 1);
                self.registers
                    .set_flag(value & AND_SIGNIFICANT == AND_SIGNIFICANT);
                ProgramCounterStep::Next
            }
            Instruction::SkipNeReg { x, y } => {
                // 9XY0
                // Skips the next instruction if VX doesn't equal VY.
                ProgramCounterStep::cond(self.registers.get(x) != self.registers.get(y))
            }
            Instruction::LoadIndex { nnn } => {
                // ANNN
                // Sets I to the address NNN.
                self.registers.index = nnn;
                ProgramCounterStep::Next
            }
            Instruction::JumpIndexed { nnn } => {
                // BNNN
                // Jumps to the address NNN plus V0.
                ProgramCounterStep::Jump(nnn + self.registers.get(0) as u16)
            }
            Instruction::Rand { x, nn } => {
                // CXNN
                // Sets VX to the result of a bitwise and operation on a random number and NN.

                // using a fill bytes call here, as the trait RngCore does not
                // support random u8.
                let mut rand: [u8; 1] = [0];
                self.rng.fill_bytes(&mut rand);
                self.registers.set(x, nn & rand[0]);
                ProgramCounterStep::Next
            }
            Instruction::Draw { x, y, n } => {
                // DXYN
                // Draws a sprite at coordinate (VX, VY) that has a width of 8 pixels and a height
                // of N pixels. Each row of 8 pixels is read as bit-coded starting from memory
                // location I. VF is set to 1 if any screen pixels are flipped from set to unset.
                let index = self.registers.index as usize;
                let sprite = self.memory.slice(index, n as usize)?;

                let coorx = self.registers.get(x) as usize;
                let coory = self.registers.get(y) as usize;

                let collision = self.display.draw(coorx, coory, sprite);
                self.registers.set_flag(collision);

                operation = Operation::Draw;
                ProgramCounterStep::Next
            }
            Instruction::SkipIfKey { x } => {
                // EX9E
                // Skips the next instruction if the key stored in VX is pressed.
                let key = self.registers.get(x) as usize;
                ProgramCounterStep::cond(self.keyboard.is_pressed(key))
            }
            Instruction::SkipIfNotKey { x } => {
                // EXA1
                // Skips the next instruction if the key stored in VX isn't pressed.
                let key = self.registers.get(x) as usize;
                ProgramCounterStep::cond(!self.keyboard.is_pressed(key))
            }
            Instruction::LoadDelay { x } => {
                // FX07
                // Sets VX to the value of the delay timer.
                self.registers.set(x, self.delay_timer.get_value());
                ProgramCounterStep::Next
            }
            Instruction::WaitKey { x } => {
                // FX0A
                // A key press is awaited, and then stored in VX. Only keys that are pressed
                // after this point count.
                log::debug!("waiting for a key press into V{:X}", x);
                self.waiting = Some(KeyWait {
                    register: x,
                    previous: *self.keyboard.get_keys(),
                });
                operation = Operation::Wait;
                // the counter is moved once the key arrives
                ProgramCounterStep::None
            }
            Instruction::SetDelay { x } => {
                // FX15
                // Sets the delay timer to VX.
                self.delay_timer.set_value(self.registers.get(x));
                ProgramCounterStep::Next
            }
            Instruction::SetSound { x } => {
                // FX18
                // Sets the sound timer to VX.
                self.sound_timer.set_value(self.registers.get(x));
                ProgramCounterStep::Next
            }
            Instruction::AddIndex { x } => {
                // FX1E
                // Adds VX to I. VF is not affected.
                let xi = self.registers.get(x) as u16;
                self.registers.index = self.registers.index.wrapping_add(xi);
                ProgramCounterStep::Next
            }
            Instruction::LoadFontAddr { x } => {
                // FX29
                // Sets I to the location of the sprite for the character in VX. Characters 0-F (in
                // hexadecimal) are represented by a 4x5 font. Larger values are not masked.
                let val = self.registers.get(x) as u16;
                self.registers.index = display::fontset::LOCATION as u16
                    + display::fontset::GLYPH_SIZE as u16 * val;
                ProgramCounterStep::Next
            }
            Instruction::StoreBcd { x } => {
                // FX33
                // Stores the binary-coded decimal representation of VX, with the hundreds digit
                // at I, the tens digit at I+1 and the ones digit at I+2.
                let r = self.registers.get(x);
                let target = self.memory.slice_mut(self.registers.index as usize, 3)?;

                target[0] = r / 100; // 246u8 / 100 => 2
                target[1] = r / 10 % 10; // 246u8 / 10 => 24 % 10 => 4
                target[2] = r % 10; // 246u8 % 10 => 6
                ProgramCounterStep::Next
            }
            Instruction::StoreRegs { x } => {
                // FX55
                // Stores V0 to VX (including VX) in memory starting at address I. I itself is
                // left unmodified.
                let target = self
                    .memory
                    .slice_mut(self.registers.index as usize, x + 1)?;
                target.copy_from_slice(&self.registers.v[..=x]);
                ProgramCounterStep::Next
            }
            Instruction::LoadRegs { x } => {
                // FX65
                // Fills V0 to VX (including VX) with values from memory starting at address I.
                // I itself is left unmodified.
                let source = self.memory.slice(self.registers.index as usize, x + 1)?;
                self.registers.v[..=x].copy_from_slice(source);
                ProgramCounterStep::Next
            }
        };

        Ok((step, operation))
    }
}
