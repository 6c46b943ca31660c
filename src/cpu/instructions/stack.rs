// Stack instructions for 6502 CPU

use crate::bus::Bus;
use crate::cpu::{flags, Cpu};

impl Cpu {
    /// PHA - Push Accumulator
    pub fn pha(&mut self, bus: &mut Bus) {
        self.stack_push(bus, self.a);
    }

    /// PHP - Push Processor Status
    ///
    /// The pushed copy always has B and bit 5 set.
    pub fn php(&mut self, bus: &mut Bus) {
        self.stack_push(bus, self.status | flags::BREAK | flags::UNUSED);
    }

    /// PLA - Pull Accumulator
    ///
    /// Flags affected: Z, N
    pub fn pla(&mut self, bus: &mut Bus) {
        self.a = self.stack_pop(bus);
        self.update_zero_and_negative_flags(self.a);
    }

    /// PLP - Pull Processor Status
    ///
    /// B is ignored and bit 5 stays set.
    pub fn plp(&mut self, bus: &mut Bus) {
        let value = self.stack_pop(bus);
        self.status = (value & !flags::BREAK) | flags::UNUSED;
    }
}
