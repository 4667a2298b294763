//! Optional settings for a [`ChipSet`](crate::chip8::ChipSet).
use crate::definitions::{display, timer};

/// The run configuration of a chip.
///
/// # Example
/// ```rust
/// # use chip::config::Config;
/// let config = Config::default().with_timer_divider(8);
/// assert_eq!(config.timer_divider(), 8);
/// assert_eq!(config.font_location(), 0x50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    font_location: usize,
    timer_divider: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            font_location: display::fontset::LOCATION,
            timer_divider: timer::DIVIDER,
        }
    }
}

impl Config {
    /// Where the font glyphs are stored, has to leave room for all glyphs below `0x200`.
    pub fn with_font_location(mut self, location: usize) -> Self {
        self.font_location = location;
        self
    }

    /// The amount of cycles between two timer ticks, a divider of `0` is treated as `1`.
    pub fn with_timer_divider(mut self, divider: u32) -> Self {
        self.timer_divider = divider.max(1);
        self
    }

    pub fn font_location(&self) -> usize {
        self.font_location
    }

    pub fn timer_divider(&self) -> u32 {
        self.timer_divider
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_divider() {
        assert_eq!(1, Config::default().with_timer_divider(0).timer_divider());
    }
}
