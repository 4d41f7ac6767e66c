//! Board peripherals used by the diagnostic commands

use alloc::vec::Vec;

use crate::config::{DEFAULT_HIGH_PINS, I2C_DEVICES, PIN_COUNT};

/// GPIO and I2C access for the diagnostic commands
pub trait Board {
    /// Number of addressable GPIO lines
    fn pin_count(&self) -> u8;

    /// Digital level of `pin`, `None` if the pin does not exist
    fn digital_read(&self, pin: u8) -> Option<bool>;

    /// Address `addr` on the I2C bus; `true` if a device acknowledged
    fn i2c_probe(&mut self, addr: u8) -> bool;
}

/// In-memory board with fixed pin levels and a fixed device list
pub struct SimBoard {
    levels: Vec<bool>,
    devices: Vec<u8>,
}

impl SimBoard {
    pub fn new(high_pins: &[u8], devices: &[u8]) -> Self {
        let mut levels = alloc::vec![false; PIN_COUNT as usize];
        for &pin in high_pins {
            if let Some(level) = levels.get_mut(pin as usize) {
                *level = true;
            }
        }
        Self {
            levels,
            devices: devices.to_vec(),
        }
    }

    pub fn set_level(&mut self, pin: u8, high: bool) {
        if let Some(level) = self.levels.get_mut(pin as usize) {
            *level = high;
        }
    }
}

impl Default for SimBoard {
    fn default() -> Self {
        Self::new(DEFAULT_HIGH_PINS, I2C_DEVICES)
    }
}

impl Board for SimBoard {
    fn pin_count(&self) -> u8 {
        self.levels.len() as u8
    }

    fn digital_read(&self, pin: u8) -> Option<bool> {
        self.levels.get(pin as usize).copied()
    }

    fn i2c_probe(&mut self, addr: u8) -> bool {
        self.devices.contains(&addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_board() {
        let board = SimBoard::default();
        assert_eq!(board.pin_count(), PIN_COUNT);
        assert_eq!(board.digital_read(0), Some(true));
        assert_eq!(board.digital_read(2), Some(false));
        assert_eq!(board.digital_read(PIN_COUNT), None);
    }

    #[test]
    fn test_set_level_and_probe() {
        let mut board = SimBoard::new(&[], &[0x50]);
        board.set_level(4, true);
        assert_eq!(board.digital_read(4), Some(true));
        assert!(board.i2c_probe(0x50));
        assert!(!board.i2c_probe(0x51));
    }
}
