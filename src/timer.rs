/// The functionality every countdown timer of the chip has to offer.
pub trait Timed {
    /// Will set the value from which the timer shall count down from.
    fn set_value(&mut self, value: u8);

    /// Will get the value that the counter is currently at.
    fn get_value(&self) -> u8;

    /// Will move the timer one step closer to zero.
    fn tick(&mut self);
}

/// Represents a timer inside of the chip infrastruture, it will count down to
/// zero from what ever number given and then stay there. The ticking itself is
/// driven by the host at `60Hz`, independent of the cpu speed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    value: u8,
}

impl Timer {
    /// Will create a new timer with the given value.
    pub fn new(value: u8) -> Self {
        Self { value }
    }

    /// A running timer is one that is not yet at zero, for the sound timer
    /// this means a tone should be played.
    pub fn is_active(&self) -> bool {
        self.value > 0
    }
}

impl Timed for Timer {
    fn set_value(&mut self, value: u8) {
        self.value = value;
    }

    fn get_value(&self) -> u8 {
        self.value
    }

    fn tick(&mut self) {
        self.value = self.value.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::timer;

    #[test]
    fn test_timer() {
        let mut timer = Timer::new(timer::HERZ as u8);
        assert!(timer.is_active());

        // a second worth of ticks
        for _ in 0..timer::HERZ {
            timer.tick();
        }
        assert_eq!(timer.get_value(), 0);
        assert!(!timer.is_active());
    }

    #[test]
    fn test_timer_holds_at_zero() {
        let mut timer = Timer::default();
        timer.set_value(3);

        for expected in [2, 1, 0, 0, 0] {
            timer.tick();
            assert_eq!(timer.get_value(), expected);
        }
    }
}
