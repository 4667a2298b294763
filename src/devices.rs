use crate::definitions::{display, keyboard};

/// A single row of pixels
pub type Row = [bool; display::WIDTH];

#[cfg_attr(test, mockall::automock)]
/// The traits responsible for the display based code
pub trait DisplayCommands {
    /// Will clear the display
    fn clear_display(&mut self);
    /// Will display all from the pixels
    fn display(&mut self, pixels: &[Row]);
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for reading the keyboard data
pub trait KeyboardCommands {
    /// Will return a snapshot of the currently pressed keys
    fn get_keyboard(&mut self) -> [bool; keyboard::SIZE];
}

/// Will store the pressed keys, as given by the host.
///
/// Input is done with a hex keyboard that has 16 keys ranging `0-F`. The `8`, `4`, `6`, and
/// `2` keys are typically used for directional input. Three opcodes are used to detect input.
/// One skips an instruction if a specific key is pressed, while another does the same if a
/// specific key is not pressed. The third waits for a key press, and then stores it in one of
/// the data registers.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Keyboard {
    keys: [bool; keyboard::SIZE],
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    pub fn reset(&mut self) {
        self.keys = [false; keyboard::SIZE];
    }

    pub fn toggle_key(&mut self, key: usize) {
        if let Some(state) = self.keys.get(key) {
            self.set_key(key, !*state)
        }
    }

    /// Will set a single key, keys outside of `0-F` are ignored.
    pub fn set_key(&mut self, key: usize, to: bool) {
        debug_assert!(key < keyboard::SIZE);
        if let Some(state) = self.keys.get_mut(key) {
            *state = to;
        }
    }

    /// Will replace the whole snapshot.
    pub fn set_mult(&mut self, keys: &[bool; keyboard::SIZE]) {
        self.keys = *keys;
    }

    pub fn get_keys(&self) -> &[bool] {
        &self.keys
    }

    /// Is the key pressed, only the lowest nibble of the key is used.
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys[(key & 0xF) as usize]
    }

    /// The lowest key that is currently pressed.
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|&k| k).map(|k| k as u8)
    }
}

/// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
/// `(64 x 32)`.
#[derive(Clone, PartialEq)]
pub struct FrameBuffer {
    rows: Box<[Row; display::HEIGHT]>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self {
            rows: Box::new([[false; display::WIDTH]; display::HEIGHT]),
        }
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.rows.iter() {
            let line: String = row.iter().map(|&p| if p { '#' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Will turn all pixels off
    pub fn clear(&mut self) {
        for row in self.rows.iter_mut() {
            *row = [false; display::WIDTH];
        }
    }

    /// Will get the pixel, the coordinates wrap around the screen edges.
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.rows[y % display::HEIGHT][x % display::WIDTH]
    }

    /// Will flip the pixel, the coordinates wrap around the screen edges.
    ///
    /// Returns true if the pixel was turned from on to off.
    pub fn flip(&mut self, x: usize, y: usize) -> bool {
        let pixel = &mut self.rows[y % display::HEIGHT][x % display::WIDTH];
        let was_set = *pixel;
        *pixel = !was_set;
        was_set
    }

    /// Will return all the rows
    pub fn rows(&self) -> &[Row] {
        &self.rows[..]
    }

    /// The amount of pixels turned on
    pub fn count_set(&self) -> usize {
        self.rows.iter().flatten().filter(|&&p| p).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard() {
        let mut keyboard = Keyboard::new();
        assert_eq!(None, keyboard.first_pressed());

        keyboard.set_key(0xA, true);
        keyboard.set_key(0x3, true);
        assert!(keyboard.is_pressed(0xA));
        assert!(keyboard.is_pressed(0x1A));
        assert_eq!(Some(0x3), keyboard.first_pressed());

        keyboard.toggle_key(0x3);
        assert_eq!(Some(0xA), keyboard.first_pressed());

        keyboard.reset();
        assert!(keyboard.get_keys().iter().all(|&k| !k));
    }

    #[test]
    fn test_keyboard_set_mult() {
        let mut keyboard = Keyboard::new();
        let mut keys = [false; keyboard::SIZE];
        keys[0xF] = true;
        keyboard.set_mult(&keys);
        assert_eq!(&keys[..], keyboard.get_keys());
    }

    #[test]
    fn test_framebuffer_flip_wraps() {
        let mut fb = FrameBuffer::new();
        assert!(!fb.flip(display::WIDTH, display::HEIGHT + 1));
        assert!(fb.get(0, 1));
        assert!(fb.flip(0, 1));
        assert!(!fb.get(0, 1));
    }

    #[test]
    fn test_framebuffer_clear() {
        let mut fb = FrameBuffer::new();
        fb.flip(3, 4);
        fb.flip(63, 31);
        assert_eq!(2, fb.count_set());
        fb.clear();
        assert_eq!(0, fb.count_set());
        assert_eq!(display::HEIGHT, fb.rows().len());

        for y in 0..display::HEIGHT {
            for x in 0..display::WIDTH {
                fb.flip(x, y);
            }
        }
        assert_eq!(display::RESOLUTION, fb.count_set());
    }
}
