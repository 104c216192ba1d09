use {
    crate::{
        definitions::{cpu, keyboard},
        devices::{DisplayBuffer, Keyboard, Pixels},
        memory::Memory,
        opcode::{
            ChipOpcodes, Instruction, Opcode, Operation, ProgramCounter, ProgramCounterStep,
        },
        registers::Registers,
        resources::Rom,
        timer::{Timed, Timer},
        ProcessError, UnknownOpcode,
    },
    rand::RngCore,
};

/// The state of a running `FX0A`, the chip stalls until a key goes from
/// released to pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct KeyWait {
    /// The register the key will be written into.
    pub(super) register: usize,
    /// The keyboard as it was seen on the last cycle.
    pub(super) previous: [bool; keyboard::SIZE],
}

/// The ChipSet struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instant on the
/// Chip8 CPU.
pub struct ChipSet {
    /// name of the loaded rom
    pub(super) name: String,
    /// the last opcode that was executed, all two bytes long and stored big-endian
    pub(super) opcode: Opcode,
    /// The ram with the font set and the loaded program
    pub(super) memory: Memory,
    /// `V0` to `VF`, the index register `I`, the program counter and the stack
    pub(super) registers: Registers,
    /// Delay timer: This timer is intended to be used for timing the events of games. Its value
    /// can be set and read.
    /// Counts down at 60 hertz, until it reaches 0.
    pub(super) delay_timer: Timer,
    /// Sound timer: This timer is used for sound effects. When its value is nonzero, a beeping
    /// sound is made.
    /// Counts down at 60 hertz, until it reaches 0.
    pub(super) sound_timer: Timer,
    /// The `64 x 32` monochrome display
    pub(super) display: DisplayBuffer,
    /// The hex keyboard, written by the host only
    pub(super) keyboard: Keyboard,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
    /// Set while an `FX0A` waits for a key press.
    pub(super) waiting: Option<KeyWait>,
    /// The error that halted the chip, if any.
    pub(super) fault: Option<ProcessError>,
}

impl Default for ChipSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ChipSet {
    /// will create a new chipset object without any program loaded
    pub fn new() -> Self {
        Self {
            name: String::new(),
            opcode: 0,
            memory: Memory::new(),
            registers: Registers::new(),
            delay_timer: Timer::default(),
            sound_timer: Timer::default(),
            display: DisplayBuffer::new(),
            keyboard: Keyboard::new(),
            rng: Box::new(rand::rngs::OsRng),
            waiting: None,
            fault: None,
        }
    }

    /// will create a new chipset with the rom already loaded
    pub fn with_rom(rom: &Rom) -> Result<Self, ProcessError> {
        let mut chip = Self::new();
        chip.load(rom)?;
        Ok(chip)
    }

    /// Will replace the random number generator used by `CXNN`.
    pub fn with_rng<R>(mut self, rng: R) -> Self
    where
        R: RngCore + Send + 'static,
    {
        self.rng = Box::new(rng);
        self
    }

    /// Will load the rom into memory and reset the registers, display and
    /// timers. The font set is kept as is. If the rom doesn't fit nothing
    /// changes.
    pub fn load(&mut self, rom: &Rom) -> Result<(), ProcessError> {
        self.memory.load(rom.get_data())?;
        self.name = rom.get_name().to_string();
        self.reset();

        log::debug!("loaded rom '{}' with {} bytes", self.name, rom.len());
        Ok(())
    }

    fn reset(&mut self) {
        self.opcode = 0;
        self.registers.reset();
        self.display.clear();
        self.delay_timer = Timer::default();
        self.sound_timer = Timer::default();
        self.waiting = None;
        self.fault = None;
    }

    /// will advance the program by a single step
    ///
    /// Any error will halt the chip, every following call will return the
    /// same error until a new rom is loaded.
    pub fn next(&mut self) -> Result<Operation, ProcessError> {
        if let Some(err) = &self.fault {
            return Err(err.clone());
        }

        self.cycle().map_err(|err| {
            log::warn!("halting the chip: {}", err);
            self.fault = Some(err.clone());
            err
        })
    }

    fn cycle(&mut self) -> Result<Operation, ProcessError> {
        if let Some(wait) = self.waiting {
            return Ok(self.resume_wait(wait));
        }

        let pointer = self.registers.get_program_counter() as usize;
        let opcode = self.memory.opcode(pointer)?;
        let instruction = Instruction::try_from(opcode)
            .map_err(|UnknownOpcode(opcode)| ProcessError::UnknownOpcode { opcode, pointer })?;

        log::trace!("{:#06X}: {:#06X} {}", pointer, opcode, instruction);

        self.opcode = opcode;
        self.calc(instruction)
    }

    /// Will finish the `FX0A` once a key got pressed since the last cycle.
    fn resume_wait(&mut self, wait: KeyWait) -> Operation {
        match self.keyboard.newly_pressed(&wait.previous) {
            Some(key) => {
                log::debug!("key {:#X} pressed, resuming", key);
                self.registers.set(wait.register, key as u8);
                self.waiting = None;
                self.step(ProgramCounterStep::Next);
                Operation::None
            }
            None => {
                self.waiting = Some(KeyWait {
                    previous: *self.keyboard.get_keys(),
                    ..wait
                });
                Operation::Wait
            }
        }
    }

    /// Will count down both timers by one, this has to be called by the host
    /// at `60Hz`.
    pub fn tick_timers(&mut self) {
        self.delay_timer.tick();
        self.sound_timer.tick();
    }

    /// Will write keyboard data into interncal keyboard representation.
    pub fn set_keyboard(&mut self, keys: &[bool; keyboard::SIZE]) {
        self.keyboard.set_mult(keys);
    }

    /// Will set the value of the given key
    pub fn set_key(&mut self, key: usize, to: bool) {
        self.keyboard.set_key(key, to)
    }

    /// Will toggle the given key
    pub fn toggle_key(&mut self, key: usize) {
        self.keyboard.toggle_key(key)
    }

    /// Will get the current state of the keyboard
    pub fn get_keyboard(&self) -> &[bool; keyboard::SIZE] {
        self.keyboard.get_keys()
    }

    /// will return the sound timer, as long as it's not zero a tone should be played
    pub fn get_sound_timer(&self) -> u8 {
        self.sound_timer.get_value()
    }

    /// will return the delay timer
    pub fn get_delay_timer(&self) -> u8 {
        self.delay_timer.get_value()
    }

    /// Will return a immutable view of the current display configuration
    pub fn get_display(&self) -> &Pixels {
        self.display.get_pixels()
    }

    pub fn get_registers(&self) -> &Registers {
        &self.registers
    }

    pub fn get_memory(&self) -> &Memory {
        &self.memory
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Is the chip currently stalled by a `FX0A`.
    pub fn is_waiting(&self) -> bool {
        self.waiting.is_some()
    }

    /// The error the chip was halted with.
    pub fn get_fault(&self) -> Option<&ProcessError> {
        self.fault.as_ref()
    }

    /// The address the program starts at.
    pub const fn program_start() -> usize {
        cpu::PROGRAM_COUNTER
    }
}

impl ProgramCounter for ChipSet {
    fn step(&mut self, step: ProgramCounterStep) {
        self.registers.step(step)
    }
}
