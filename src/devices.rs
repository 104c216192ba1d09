//! The devices of the chip, which are shared with the host.
use crate::definitions::{display, keyboard};

/// A single row of pixels of the display.
pub type Row = [bool; display::WIDTH];
/// All the pixels of the display, row by row.
pub type Pixels = [Row; display::HEIGHT];

#[cfg_attr(test, mockall::automock)]
/// The traits responsible for the display based code
pub trait DisplayCommands {
    /// Will display all from the pixels
    fn display(&mut self, pixels: &Pixels);
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for reading the host keyboard, already mapped to
/// the logical keys `0x0-0xF`.
pub trait KeyboardCommands {
    fn get_keyboard(&self) -> [bool; keyboard::SIZE];
}

/// Will store the last change to the given keybord
/// and represent the internal keyboard as well
///
/// Input is done with a hex keyboard that has 16 keys ranging `0-F`. The `8`, `4`, `6`, and
/// `2` keys are typically used for directional input. Three opcodes are used to detect input.
/// One skips an instruction if a specific key is pressed, while another does the same if a
/// specific key is not pressed. The third waits for a key press, and then stores it in one of
/// the data registers.
#[derive(Default, Debug, Clone)]
pub struct Keyboard {
    keys: [bool; keyboard::SIZE],
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    pub fn toggle_key(&mut self, key: usize) {
        self.set_key(key, !self.is_pressed(key))
    }

    /// Keys outside of `0x0-0xF` are ignored.
    pub fn set_key(&mut self, key: usize, to: bool) {
        if let Some(state) = self.keys.get_mut(key) {
            *state = to;
        }
    }

    pub fn set_mult(&mut self, keys: &[bool; keyboard::SIZE]) {
        self.keys = *keys;
    }

    pub fn get_keys(&self) -> &[bool; keyboard::SIZE] {
        &self.keys
    }

    /// Keys outside of `0x0-0xF` are never pressed.
    pub fn is_pressed(&self, key: usize) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }

    /// Will return the lowest key that is pressed now, but was not in the
    /// given previous state.
    pub fn newly_pressed(&self, previous: &[bool; keyboard::SIZE]) -> Option<usize> {
        self.keys
            .iter()
            .zip(previous.iter())
            .position(|(current, last)| *current && !*last)
    }
}

/// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
/// `(64 x 32)`. This can easily be implemented using an array that hold the pixel state `(1 or 0)`
#[derive(Debug, Clone)]
pub struct DisplayBuffer {
    pixels: Pixels,
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self {
            pixels: [[false; display::WIDTH]; display::HEIGHT],
        }
    }
}

impl DisplayBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        for row in self.pixels.iter_mut() {
            row.fill(false);
        }
    }

    pub fn get_pixels(&self) -> &Pixels {
        &self.pixels
    }

    /// Coordinates outside of the display are never set.
    pub fn get_pixel(&self, x: usize, y: usize) -> bool {
        self.pixels
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(false)
    }

    /// Draws a sprite at the given coordinate, one byte per row with the most
    /// significant bit on the left. The origin wraps around the display, but the
    /// sprite itself is clipped at the edges.
    ///
    /// Returns if any pixel was flipped from set to unset.
    pub fn draw(&mut self, x: usize, y: usize, sprite: &[u8]) -> bool {
        const BYTE: usize = 8;

        let coorx = x % display::WIDTH;
        let coory = y % display::HEIGHT;

        let mut collision = false;

        for (i, row) in sprite.iter().enumerate() {
            let y = coory + i;

            if y >= display::HEIGHT {
                break;
            }

            // - If the current pixel in the sprite row is 'on' and the pixel at coordinates X,Y
            //   on the screen is also 'on', turn 'off' the pixel and set the collision.
            // - Or if the current pixel in the sprite row is 'on' and the screen pixel is 'not',
            //  draw the pixel at the X and Y coordinates.
            for (m, j) in (0..BYTE).rev().zip(0..BYTE) {
                let x = coorx + j;

                if x >= display::WIDTH {
                    break;
                }

                let mask = 1 << m;
                if (*row & mask) != mask {
                    continue;
                }

                let spixel = self.pixels[y][x];
                self.pixels[y][x] = !spixel;
                collision |= spixel;
            }
        }

        collision
    }

    /// The amount of pixels currently set.
    pub fn count(&self) -> usize {
        self.pixels.iter().flatten().filter(|p| **p).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_set_and_toggle() {
        let mut keyboard = Keyboard::new();
        assert_eq!(&[false; keyboard::SIZE], keyboard.get_keys());

        keyboard.set_key(0xA, true);
        assert!(keyboard.is_pressed(0xA));

        keyboard.toggle_key(0xA);
        keyboard.toggle_key(0x3);
        assert!(!keyboard.is_pressed(0xA));
        assert!(keyboard.is_pressed(0x3));

        // ignored silently
        keyboard.set_key(0x10, true);
        assert!(!keyboard.is_pressed(0x10));
        assert!(!keyboard.is_pressed(0xFF));
    }

    #[test]
    fn test_keyboard_newly_pressed() {
        let mut keyboard = Keyboard::new();
        let mut previous = [false; keyboard::SIZE];
        previous[0x2] = true;

        keyboard.set_mult(&previous);
        assert_eq!(None, keyboard.newly_pressed(&previous));

        keyboard.set_key(0x9, true);
        keyboard.set_key(0x5, true);
        assert_eq!(Some(0x5), keyboard.newly_pressed(&previous));
    }

    #[test]
    fn test_layout_contains_every_key() {
        let mut keys: Vec<usize> = keyboard::LAYOUT.iter().flatten().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, (0..keyboard::SIZE).collect::<Vec<_>>());
    }

    #[test]
    fn test_draw_sprite() {
        let mut buffer = DisplayBuffer::new();
        assert!(!buffer.draw(2, 1, &[0b1010_0001]));

        assert!(buffer.get_pixel(2, 1));
        assert!(!buffer.get_pixel(3, 1));
        assert!(buffer.get_pixel(4, 1));
        assert!(buffer.get_pixel(9, 1));
        assert_eq!(buffer.count(), 3);
    }

    #[test]
    fn test_draw_twice_erases() {
        let mut buffer = DisplayBuffer::new();
        let sprite = [0xF0, 0x90, 0x90, 0x90, 0xF0];

        assert!(!buffer.draw(10, 10, &sprite));
        assert_eq!(buffer.count(), 14);

        assert!(buffer.draw(10, 10, &sprite));
        assert_eq!(buffer.count(), 0);
    }

    #[test]
    fn test_draw_partial_collision() {
        let mut buffer = DisplayBuffer::new();
        assert!(!buffer.draw(0, 0, &[0b1000_0000]));
        // only a single pixel overlaps
        assert!(buffer.draw(0, 0, &[0b1100_0000]));
        assert!(!buffer.get_pixel(0, 0));
        assert!(buffer.get_pixel(1, 0));
    }

    #[test]
    fn test_draw_wraps_origin_and_clips() {
        let mut buffer = DisplayBuffer::new();
        // origin (66, 33) wraps to (2, 1)
        buffer.draw(66, 33, &[0x80]);
        assert!(buffer.get_pixel(2, 1));

        buffer.clear();
        // at the right edge everything past the display is dropped
        buffer.draw(60, 30, &[0xFF, 0xFF, 0xFF]);
        assert_eq!(buffer.count(), 4 * 2);
        assert!(buffer.get_pixel(63, 31));
        assert!(!buffer.get_pixel(0, 30));
        assert!(!buffer.get_pixel(60, 0));
    }

    #[test]
    fn test_clear() {
        let mut buffer = DisplayBuffer::new();
        buffer.draw(0, 0, &[0xFF; 15]);
        assert_eq!(buffer.count(), 8 * 15);
        buffer.clear();
        assert_eq!(buffer.count(), 0);
    }
}
