// Input module - Controller state and the $4016/$4017 serial ports
//
// Each port shifts out 24 bits after a strobe:
// - reads 0-7: buttons A, B, Select, Start, Up, Down, Left, Right
// - reads 8-15: zero (the unused second pad of the pair)
// - reads 16-23: the 4-bit adapter signature, a single 1 at read 19 on
//   port 1 and at read 18 on port 2
// Past read 24 the counter saturates and every read returns 0.

use serde::{Deserialize, Serialize};

/// Button bit positions in the serial order
pub mod buttons {
    pub const A: u8 = 0b0000_0001;
    pub const B: u8 = 0b0000_0010;
    pub const SELECT: u8 = 0b0000_0100;
    pub const START: u8 = 0b0000_1000;
    pub const UP: u8 = 0b0001_0000;
    pub const DOWN: u8 = 0b0010_0000;
    pub const LEFT: u8 = 0b0100_0000;
    pub const RIGHT: u8 = 0b1000_0000;
}

/// Number of reads a port shifts out before saturating
pub const SERIAL_LENGTH: u8 = 24;

/// Signature bit position per port
const SIGNATURE_READ: [u8; 2] = [19, 18];

/// Controller structure representing NES controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Controller {
    // Button states
    pub button_a: bool,
    pub button_b: bool,
    pub select: bool,
    pub start: bool,
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Controller {
    /// Create a new controller instance with all buttons released
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a controller from a `buttons` bit mask
    pub fn from_bits(bits: u8) -> Self {
        Controller {
            button_a: bits & buttons::A != 0,
            button_b: bits & buttons::B != 0,
            select: bits & buttons::SELECT != 0,
            start: bits & buttons::START != 0,
            up: bits & buttons::UP != 0,
            down: bits & buttons::DOWN != 0,
            left: bits & buttons::LEFT != 0,
            right: bits & buttons::RIGHT != 0,
        }
    }

    /// Buttons packed in serial order, bit 0 = A
    pub fn bits(&self) -> u8 {
        [
            self.button_a,
            self.button_b,
            self.select,
            self.start,
            self.up,
            self.down,
            self.left,
            self.right,
        ]
        .iter()
        .enumerate()
        .fold(0, |bits, (i, &pressed)| bits | ((pressed as u8) << i))
    }
}

/// Both controller ports with their shift counters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControllerIO {
    controllers: [Controller; 2],
    read_counts: [u8; 2],
    strobe: bool,
}

impl ControllerIO {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a write to $4016
    ///
    /// Bit 0 high restarts both ports at the first button; while it stays
    /// high every read returns button A.
    pub fn write_strobe(&mut self, value: u8) {
        self.strobe = value & 0x01 != 0;
        if self.strobe {
            self.read_counts = [0; 2];
        }
    }

    /// Shift one bit out of `port` (0 = $4016, 1 = $4017)
    pub fn read(&mut self, port: usize) -> u8 {
        let port = port & 1;
        let index = self.read_counts[port];
        let bit = self.bit_at(port, index);

        if !self.strobe && index < SERIAL_LENGTH {
            self.read_counts[port] = index + 1;
        }
        bit
    }

    fn bit_at(&self, port: usize, index: u8) -> u8 {
        match index {
            0..=7 => (self.controllers[port].bits() >> index) & 1,
            _ if index == SIGNATURE_READ[port] => 1,
            _ => 0,
        }
    }

    pub fn controller(&self, port: usize) -> &Controller {
        &self.controllers[port & 1]
    }

    pub fn controller_mut(&mut self, port: usize) -> &mut Controller {
        &mut self.controllers[port & 1]
    }

    /// Replace the button state of one port
    pub fn set_buttons(&mut self, port: usize, controller: Controller) {
        self.controllers[port & 1] = controller;
    }

    /// Reads taken from each port since the last strobe
    pub fn read_counts(&self) -> [u8; 2] {
        self.read_counts
    }
}
