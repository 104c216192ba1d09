//! Drives a [`ChipSet`] from the host loop, the cpu and the timers are
//! advanced by the time that passed since the last call.
use std::time::Duration;

use crate::{
    chip8::ChipSet,
    definitions::{cpu, timer},
    devices::{DisplayCommands, KeyboardCommands},
    opcode::Operation,
    ProcessError,
};

/// The speeds the chip is run at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// instructions per second
    pub cpu_hertz: u64,
    /// timer ticks per second
    pub timer_hertz: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            cpu_hertz: cpu::HERTZ,
            timer_hertz: timer::HERZ,
        }
    }
}

/// What happened during a single [`advance`](Runner::advance).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// the amount of cycles run
    pub cycles: u64,
    /// the amount of times the timers were ticked
    pub ticks: u64,
    /// if the chip is stalled waiting on a key
    pub waiting: bool,
}

pub struct Runner {
    chip: ChipSet,
    cycle_interval: Duration,
    timer_interval: Duration,
    cycle_budget: Duration,
    timer_budget: Duration,
}

/// Will convert the frequency into the time between two events, a frequency of
/// zero is treated as one. The interval never drops below a nanosecond, as
/// anything faster would never drain the budget.
fn interval(hertz: u64) -> Duration {
    Duration::from_nanos((1_000_000_000 / hertz.max(1)).max(1))
}

impl Runner {
    /// Will run the chip at the default speeds.
    pub fn new(chip: ChipSet) -> Self {
        Self::with_config(chip, RunnerConfig::default())
    }

    pub fn with_config(chip: ChipSet, config: RunnerConfig) -> Self {
        log::debug!(
            "running the chip at {}Hz with timers at {}Hz",
            config.cpu_hertz,
            config.timer_hertz
        );

        Self {
            chip,
            cycle_interval: interval(config.cpu_hertz),
            timer_interval: interval(config.timer_hertz),
            cycle_budget: Duration::ZERO,
            timer_budget: Duration::ZERO,
        }
    }

    pub fn get_chip(&self) -> &ChipSet {
        &self.chip
    }

    pub fn get_chip_mut(&mut self) -> &mut ChipSet {
        &mut self.chip
    }

    pub fn into_chip(self) -> ChipSet {
        self.chip
    }

    /// Will run all the cycles and timer ticks that fit into the elapsed time,
    /// what doesn't fit is kept for the next call.
    ///
    /// Before every cycle the keyboard is read, after a cycle that changed the
    /// display it is handed to the display. The timers are ticked after the
    /// cycles. An error halts the chip and is returned as is.
    pub fn advance<D, K>(
        &mut self,
        elapsed: Duration,
        display: &mut D,
        keyboard: &K,
    ) -> Result<Progress, ProcessError>
    where
        D: DisplayCommands,
        K: KeyboardCommands,
    {
        self.cycle_budget += elapsed;
        self.timer_budget += elapsed;

        let mut progress = Progress::default();

        while self.cycle_budget >= self.cycle_interval {
            self.cycle_budget -= self.cycle_interval;

            self.chip.set_keyboard(&keyboard.get_keyboard());
            let operation = self.chip.next()?;
            progress.cycles += 1;

            match operation {
                Operation::Draw => display.display(self.chip.get_display()),
                Operation::Wait => progress.waiting = true,
                Operation::None => progress.waiting = false,
            }
        }

        while self.timer_budget >= self.timer_interval {
            self.timer_budget -= self.timer_interval;
            self.chip.tick_timers();
            progress.ticks += 1;
        }

        Ok(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        definitions::keyboard,
        devices::{MockDisplayCommands, MockKeyboardCommands},
        resources::Rom,
    };
    use mockall::predicate::always;

    fn get_runner(program: &[u8]) -> Runner {
        let chip = ChipSet::with_rom(&Rom::new("TEST", program)).unwrap();
        Runner::new(chip)
    }

    fn idle_keyboard() -> MockKeyboardCommands {
        let mut keyboard = MockKeyboardCommands::new();
        keyboard
            .expect_get_keyboard()
            .return_const([false; keyboard::SIZE]);
        keyboard
    }

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::default();
        assert_eq!(500, config.cpu_hertz);
        assert_eq!(60, config.timer_hertz);
    }

    #[test]
    fn test_draw_reaches_display() {
        // CLS, then jump onto itself
        let mut runner = get_runner(&[0x00, 0xE0, 0x12, 0x02]);
        let keyboard = idle_keyboard();
        let mut display = MockDisplayCommands::new();
        display.expect_display().with(always()).times(1).return_const(());

        let progress = runner
            .advance(Duration::from_millis(10), &mut display, &keyboard)
            .unwrap();

        assert_eq!(5, progress.cycles);
        assert_eq!(0, progress.ticks);
        assert_eq!(0x202, runner.get_chip().get_registers().get_program_counter());
    }

    #[test]
    fn test_budget_is_kept() {
        let mut runner = get_runner(&[0x12, 0x00]);
        let keyboard = idle_keyboard();
        let mut display = MockDisplayCommands::new();
        display.expect_display().never();

        // a single cycle takes 2ms
        let progress = runner
            .advance(Duration::from_millis(1), &mut display, &keyboard)
            .unwrap();
        assert_eq!(0, progress.cycles);

        let progress = runner
            .advance(Duration::from_millis(1), &mut display, &keyboard)
            .unwrap();
        assert_eq!(1, progress.cycles);
    }

    #[test]
    fn test_timers_tick_after_cycles() {
        // LD V0, 03; LD ST, V0; JP 204
        let mut runner = get_runner(&[0x60, 0x03, 0xF0, 0x18, 0x12, 0x04]);
        let keyboard = idle_keyboard();
        let mut display = MockDisplayCommands::new();
        display.expect_display().never();

        let progress = runner
            .advance(Duration::from_millis(6), &mut display, &keyboard)
            .unwrap();
        assert_eq!(3, progress.cycles);
        assert_eq!(0, progress.ticks);
        assert_eq!(3, runner.get_chip().get_sound_timer());

        let progress = runner
            .advance(Duration::from_millis(30), &mut display, &keyboard)
            .unwrap();
        assert_eq!(2, progress.ticks);
        assert_eq!(1, runner.get_chip().get_sound_timer());

        let progress = runner
            .advance(Duration::from_secs(1), &mut display, &keyboard)
            .unwrap();
        assert_eq!(60, progress.ticks);
        assert_eq!(0, runner.get_chip().get_sound_timer());
    }

    #[test]
    fn test_keyboard_is_read_every_cycle() {
        // LD V1, K; JP 202
        let mut runner = get_runner(&[0xF1, 0x0A, 0x12, 0x02]);
        let mut display = MockDisplayCommands::new();
        display.expect_display().never();

        let mut keyboard = MockKeyboardCommands::new();
        let mut pressed = [false; keyboard::SIZE];
        pressed[0x7] = true;

        // the key goes down on the third read
        let mut reads = 0;
        keyboard.expect_get_keyboard().times(3).returning(move || {
            reads += 1;
            if reads > 2 {
                pressed
            } else {
                [false; keyboard::SIZE]
            }
        });

        let progress = runner
            .advance(Duration::from_millis(4), &mut display, &keyboard)
            .unwrap();
        assert_eq!(2, progress.cycles);
        assert!(progress.waiting);

        let progress = runner
            .advance(Duration::from_millis(2), &mut display, &keyboard)
            .unwrap();
        assert!(!progress.waiting);
        assert_eq!(0x7, runner.get_chip().get_registers().get(0x1));
    }

    #[test]
    fn test_error_halts() {
        let mut runner = get_runner(&[0xFF, 0xFF]);
        let keyboard = idle_keyboard();
        let mut display = MockDisplayCommands::new();
        display.expect_display().never();

        let err = ProcessError::UnknownOpcode {
            opcode: 0xFFFF,
            pointer: 0x200,
        };
        assert_eq!(
            Err(err.clone()),
            runner.advance(Duration::from_millis(10), &mut display, &keyboard)
        );
        assert_eq!(
            Err(err),
            runner.advance(Duration::from_millis(10), &mut display, &keyboard)
        );
    }

    #[test]
    fn test_zero_hertz() {
        let chip = ChipSet::with_rom(&Rom::new("TEST", &[0x12, 0x00])).unwrap();
        let config = RunnerConfig {
            cpu_hertz: 0,
            timer_hertz: 0,
        };
        let mut runner = Runner::with_config(chip, config);
        let keyboard = idle_keyboard();
        let mut display = MockDisplayCommands::new();

        let progress = runner
            .advance(Duration::from_secs(2), &mut display, &keyboard)
            .unwrap();
        assert_eq!(2, progress.cycles);
        assert_eq!(2, progress.ticks);
    }

    #[test]
    fn test_huge_hertz() {
        assert_eq!(Duration::from_nanos(1), interval(2_000_000_000));
        assert_eq!(Duration::from_nanos(1), interval(u64::MAX));

        let chip = ChipSet::with_rom(&Rom::new("TEST", &[0x12, 0x00])).unwrap();
        let config = RunnerConfig {
            cpu_hertz: 500,
            timer_hertz: 2_000_000_000,
        };
        let mut runner = Runner::with_config(chip, config);
        let keyboard = idle_keyboard();
        let mut display = MockDisplayCommands::new();
        display.expect_display().never();

        let progress = runner
            .advance(Duration::from_millis(1), &mut display, &keyboard)
            .unwrap();
        assert_eq!(0, progress.cycles);
        assert_eq!(1_000_000, progress.ticks);
    }
}
