//! The pretty print implementation written for the [`chipset`](super::ChipSet) and a small
//! disassembler for raw programs.
//! This implementation was split up into this file for smaller file sizes and higher
//! cohesion.

use super::ChipSet;
use crate::{
    definitions::{cpu, memory},
    opcode::{Instruction, Opcode},
    timer::Timed,
};
use once_cell::sync::Lazy;
use std::fmt::{self, Write};

/// The length of the pretty print data
/// as a single instruction is u16 the octa
/// size will show how often the block shall
/// be repeated has to be bigger then 0
const HEX_PRINT_STEP: usize = 8;

const END_OF_LINE: char = '\n';
const INDENT_FILLAMENT: char = '\t';
const INDENT_SIZE: usize = 2;

/// Will add an indent post processing
fn indent_helper(text: &mut String, indent: usize) {
    for _ in 0..indent {
        text.push(INDENT_FILLAMENT);
    }
}

macro_rules! intsize {
    () => {
        6
    };
}

macro_rules! intformat {
    () => {
        // The formatted string will be 2 sysbols for the prefix (0x)
        // and 4 for the rest long.
        concat!("{:#0", intsize!(), "X}")
    };
}

const INTSIZE: usize = intsize!();

static POINTER_LEN: Lazy<usize> = Lazy::new(|| {
    // create a string that is big enough
    let mut line = String::with_capacity(20);
    pointer_print::formatter(&mut line, 0, 0).expect("writing into a string never fails");
    line.len()
});

static INTEGER_LEN: Lazy<usize> = Lazy::new(|| {
    let mut string = String::new();
    integer_print::formatter(&mut string, 0u8).expect("writing into a string never fails");
    string.len()
});

/// calculate a line lenght (This is a bit bigger then the actual line will be)
static LENLINE: Lazy<usize> =
    Lazy::new(|| INDENT_SIZE + HEX_PRINT_STEP * (*INTEGER_LEN + 1) + 1 + *POINTER_LEN);

/// Handles all the printing of the pointer values.
mod pointer_print {
    use std::fmt::Write;
    /// will formatt the pointers according to definition
    pub(super) fn formatter(
        line: &mut String,
        from: usize,
        to: usize,
    ) -> Result<(), std::fmt::Error> {
        write!(
            line,
            concat!(intformat!(), " - ", intformat!(), " :"),
            from, to
        )
    }
}

/// Handles all the opcode prints
mod opcode_print {
    use super::{integer_print, pointer_print, HEX_PRINT_STEP};
    use crate::{
        definitions::memory,
        opcode::{self, Opcode},
    };
    use once_cell::sync::Lazy;
    use std::fmt::{self, Write};

    /// The internal length of the given data
    /// as the data is stored as u8 and an opcode
    /// is u16 long
    const POINTER_INCREMENT: usize = HEX_PRINT_STEP * memory::opcodes::SIZE;
    /// The values that are used when there are at lease two rows of zeros.
    const FILLER_BASE: &str = "...";

    /// Prepares the line that will be used, in the case that a row holds only zeros.
    static ZERO_FILLER: Lazy<String> = Lazy::new(|| {
        let mut formatted = String::new();
        integer_print::formatter(&mut formatted, 0u16)
            .expect("writing into a string never fails");
        match HEX_PRINT_STEP {
            1 => formatted,
            2 => format!("{} {}", formatted, formatted),
            _ => {
                let lenght = formatted.len() * (HEX_PRINT_STEP - 2) + (HEX_PRINT_STEP - 1)
                    - FILLER_BASE.len();
                let filler = " ".repeat(lenght / 2);

                format!(
                    "{}{}{}{}{}",
                    formatted, filler, FILLER_BASE, filler, formatted
                )
            }
        }
    });

    /// this struct will simulate a single row of opcodes (only in this context)
    struct Row {
        from: usize,
        to: usize,
        data: [Opcode; HEX_PRINT_STEP],
        only_null: bool,
    }

    /// using the fmt::Display` for simple printing of the data later on
    impl fmt::Display for Row {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let mut res = String::with_capacity(*super::LENLINE);
            pointer_print::formatter(&mut res, self.from, self.to)?;
            res.push(' ');

            if !self.only_null {
                for entry in self.data.iter() {
                    integer_print::formatter(&mut res, *entry)?;
                    res.push(' ');
                }
                if let Some(index) = res.rfind(' ') {
                    res.truncate(index);
                }
            } else {
                res.push_str(&ZERO_FILLER)
            }
            write!(f, "{}", res)
        }
    }

    /// will pretty print the content of the raw memory
    /// this functions assumes the full data to be passed
    /// as the offset is calculated from the beginning of the
    /// memory block
    pub(super) fn printer(memory: &[u8], indent: usize) -> Result<String, fmt::Error> {
        let data_last_index = memory.len().saturating_sub(1);
        let mut rows: Vec<Row> = Vec::with_capacity(memory.len() / HEX_PRINT_STEP);

        for from in (0..memory.len()).step_by(POINTER_INCREMENT) {
            // precalculate the end location
            let to = (from + POINTER_INCREMENT - 1).min(data_last_index);

            let mut data = [0; HEX_PRINT_STEP];
            let mut only_null = true;

            // loop over all the opcodes u8 pairs, a trailing odd byte is shown as zero
            for (entry, index) in data
                .iter_mut()
                .zip((from..=to).step_by(memory::opcodes::SIZE))
            {
                *entry = opcode::build_opcode(memory, index).unwrap_or_default();

                if *entry > 0 {
                    only_null = false;
                }
            }

            // create the row that shall be used later on
            let mut row = Row {
                from,
                to,
                data,
                only_null,
            };

            if only_null {
                if let Some(last_row) = rows.last() {
                    if last_row.only_null {
                        row.from = last_row.from;
                        rows.pop();
                    }
                }
            }
            rows.push(row)
        }

        // create the end structure to be used for calculations
        let mut string = String::with_capacity((*super::LENLINE + 1) * rows.len());
        for row in rows {
            super::indent_helper(&mut string, indent);
            write!(string, "{}{}", row, super::END_OF_LINE)?;
        }
        if let Some(index) = string.rfind(super::END_OF_LINE) {
            string.truncate(index);
        }
        Ok(string)
    }
}

/// handles printting of any and all of intergers.
mod integer_print {
    use super::{pointer_print, HEX_PRINT_STEP};
    use num_traits::Unsigned;
    use std::fmt::{self, Write};

    /// will format all integer types
    pub(super) fn formatter<T>(line: &mut String, data: T) -> Result<(), fmt::Error>
    where
        T: fmt::Display + fmt::UpperHex + Unsigned + Copy,
    {
        write!(line, intformat!(), data)
    }

    /// will pretty print all the integer data given
    pub(super) fn printer<T>(data: &[T], indent: usize) -> Result<String, fmt::Error>
    where
        T: fmt::Display + fmt::UpperHex + Unsigned + Copy,
    {
        let result_size = *super::LENLINE * (data.len() / HEX_PRINT_STEP + 1);

        let mut res = String::with_capacity(result_size);
        for i in (0..data.len()).step_by(HEX_PRINT_STEP) {
            let n = (i + HEX_PRINT_STEP - 1).min(data.len() - 1);

            super::indent_helper(&mut res, indent);
            // Copy into the string
            pointer_print::formatter(&mut res, i, n)?;

            for entry in &data[i..=n] {
                res.push(' ');
                formatter(&mut res, *entry)?;
            }
            res.push(super::END_OF_LINE);
        }

        // Remove unneded new line
        if let Some(index) = res.rfind(super::END_OF_LINE) {
            res.truncate(index);
        }

        Ok(res)
    }
}

/// Handles all the boolean data types.
mod bool_print {
    use super::{pointer_print, END_OF_LINE, HEX_PRINT_STEP};
    use once_cell::sync::Lazy;

    /// the prepared true string
    static TRUE: Lazy<String> = Lazy::new(|| formatter("true"));
    /// the prepared false string
    static FALSE: Lazy<String> = Lazy::new(|| formatter("false"));

    /// a function to keep the correct format length
    fn formatter(message: &str) -> String {
        format!("{:width$}", message, width = *super::INTEGER_LEN)
    }

    /// will pretty print all the boolean data given
    /// the offset will be calculated automatically from
    /// the data block
    pub(super) fn printer(data: &[bool], indent: usize) -> Result<String, std::fmt::Error> {
        let result_size = *super::LENLINE * (data.len() / HEX_PRINT_STEP + 1);

        let mut res = String::with_capacity(result_size);

        let check_type = |val: bool| if val { &*TRUE } else { &*FALSE };

        for i in (0..data.len()).step_by(HEX_PRINT_STEP) {
            let n = (i + HEX_PRINT_STEP - 1).min(data.len() - 1);
            super::indent_helper(&mut res, indent);

            pointer_print::formatter(&mut res, i, n)?;
            res.push(' ');

            for value in &data[i..n] {
                res.push_str(check_type(*value));
                res.push(' ');
            }
            // Append the last missing entry
            res.push_str(check_type(data[n]).trim_end());
            res.push(END_OF_LINE);
        }
        // Remove unneeded new line
        if let Some(index) = res.rfind(END_OF_LINE) {
            res.truncate(index);
        }

        Ok(res)
    }
}

/// Will format a single value on its own indented line.
fn single_print<T>(data: T) -> Result<String, fmt::Error>
where
    T: fmt::Display + fmt::UpperHex + num_traits::Unsigned + Copy,
{
    let mut res = String::with_capacity(INTSIZE + INDENT_SIZE);
    indent_helper(&mut res, INDENT_SIZE);
    integer_print::formatter(&mut res, data)?;
    Ok(res)
}

impl fmt::Display for ChipSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // prepate the rom name
        let mut nam = String::with_capacity(INDENT_SIZE + self.name.len());
        indent_helper(&mut nam, INDENT_SIZE);
        nam.push_str(&self.name);

        let mem = opcode_print::printer(self.memory.get_data(), INDENT_SIZE)?;
        let reg = integer_print::printer(self.registers.get_registers(), INDENT_SIZE)?;

        // handle stack specially as it needes to be filled up if empty
        let mut stack = [0u16; cpu::stack::SIZE];
        let used = self.registers.get_stack();
        stack[..used.len()].copy_from_slice(used);

        let sta = integer_print::printer(&stack, INDENT_SIZE)?;
        let key = bool_print::printer(self.keyboard.get_keys(), INDENT_SIZE)?;

        let opc = single_print(self.opcode)?;
        let prc = single_print(self.registers.get_program_counter())?;
        let idx = single_print(self.registers.get_index())?;
        let dly = single_print(self.delay_timer.get_value())?;
        let snd = single_print(self.sound_timer.get_value())?;

        write!(
            f,
            "Chipset {{\n\
                \tProgram Name :\n{}\n\
                \tOpcode :\n{}\n\
                \tProgram Counter :\n{}\n\
                \tIndex Register :\n{}\n\
                \tDelay Timer :\n{}\n\
                \tSound Timer :\n{}\n\
                \tMemory :\n{}\n\
                \tKeybord :\n{}\n\
                \tStack :\n{}\n\
                \tRegister :\n{}\n\
                }}",
            nam, opc, prc, idx, dly, snd, mem, key, sta, reg
        )
    }
}

/// Will disassemble the given program into one line per instruction, the
/// first instruction is assumed to be located at `origin`.
///
/// Each line holds the address, the raw word and the mnemonic, words that
/// don't decode are shown as `UNKN`. A trailing odd byte is padded with zero.
///
/// # Example
/// ```rust
/// # use chip::chip8::disassemble;
/// let listing = disassemble(&[0x60, 0x05, 0x12, 0x00], 0x200).unwrap();
/// assert_eq!(listing, "0200 6005\tLD V0, 05\n0202 1200\tJP 200");
/// ```
pub fn disassemble(program: &[u8], origin: usize) -> Result<String, fmt::Error> {
    const LINE_SIZE: usize = 24;

    let mut res =
        String::with_capacity(program.len() / memory::opcodes::SIZE * LINE_SIZE + LINE_SIZE);

    for (i, chunk) in program.chunks(memory::opcodes::SIZE).enumerate() {
        let high = chunk[0];
        let low = chunk.get(1).copied().unwrap_or_default();
        let opcode = Opcode::from_be_bytes([high, low]);
        let address = origin + i * memory::opcodes::SIZE;

        write!(res, "{:04X} {:04X}\t", address, opcode)?;
        match Instruction::try_from(opcode) {
            Ok(instruction) => write!(res, "{}", instruction)?,
            Err(_) => write!(res, "UNKN {:04X}", opcode)?,
        }
        res.push(END_OF_LINE);
    }

    // Remove unneeded new line
    if let Some(index) = res.rfind(END_OF_LINE) {
        res.truncate(index);
    }

    Ok(res)
}
