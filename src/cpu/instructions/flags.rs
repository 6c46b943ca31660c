// Flag instructions for 6502 CPU

use crate::cpu::{flags, Cpu};

impl Cpu {
    /// CLC - Clear Carry
    pub fn clc(&mut self) {
        self.clear_flag(flags::CARRY);
    }

    /// CLD - Clear Decimal
    pub fn cld(&mut self) {
        self.clear_flag(flags::DECIMAL);
    }

    /// CLI - Clear Interrupt Disable
    pub fn cli(&mut self) {
        self.clear_flag(flags::INTERRUPT_DISABLE);
    }

    /// CLV - Clear Overflow
    pub fn clv(&mut self) {
        self.clear_flag(flags::OVERFLOW);
    }

    /// SEC - Set Carry
    pub fn sec(&mut self) {
        self.set_flag(flags::CARRY);
    }

    /// SED - Set Decimal (stored, no effect on arithmetic)
    pub fn sed(&mut self) {
        self.set_flag(flags::DECIMAL);
    }

    /// SEI - Set Interrupt Disable
    pub fn sei(&mut self) {
        self.set_flag(flags::INTERRUPT_DISABLE);
    }
}
