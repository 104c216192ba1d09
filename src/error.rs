use thiserror::Error;

use crate::opcode::Opcode;

/// Every error the interpreter can run into. All of them are fatal for the
/// currently loaded program.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum ProcessError {
    #[error("An unsupported opcode {opcode:#06X} was found at {pointer:#06X}.")]
    UnknownOpcode { opcode: Opcode, pointer: usize },
    #[error("Invalid stack state '{0}'")]
    Stack(#[from] StackError),
    #[error("Invalid memory access '{0}'")]
    Memory(#[from] MemoryError),
}

/// Returned by the decoder, if the given word is not part of the instruction set.
#[derive(Error, Debug, PartialEq, Clone, Copy)]
#[error("An unsupported opcode was used {0:#06X?}.")]
pub struct UnknownOpcode(pub Opcode);

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum StackError {
    #[error("Stack is full!")]
    Full,
    #[error("Stack is empty!")]
    Empty,
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum MemoryError {
    #[error("The program with {size} bytes is too large, there is only space for {max} bytes.")]
    ProgramTooLarge { size: usize, max: usize },
    #[error("Memory address {address:#06X} is out of range.")]
    AddressOutOfRange { address: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ProcessError::UnknownOpcode {
            opcode: 0x5121,
            pointer: 0x200,
        };
        assert_eq!(
            "An unsupported opcode 0x5121 was found at 0x0200.",
            err.to_string()
        );

        let err: ProcessError = StackError::Full.into();
        assert_eq!("Invalid stack state 'Stack is full!'", err.to_string());

        let err: ProcessError = MemoryError::AddressOutOfRange { address: 0x1000 }.into();
        assert_eq!(
            "Invalid memory access 'Memory address 0x1000 is out of range.'",
            err.to_string()
        );
    }
}
