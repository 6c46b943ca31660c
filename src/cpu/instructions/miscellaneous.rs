// Miscellaneous instructions for 6502 CPU

use crate::bus::Bus;
use crate::cpu::addressing::{AddressingResult, Operand};
use crate::cpu::{flags, vectors, Cpu};

impl Cpu {
    /// BRK - Force Interrupt
    ///
    /// The descriptor is two bytes long, so PC already points past the
    /// padding byte. Pushes PC and P with B set, sets I and jumps through
    /// the IRQ vector. BRK is not masked by I.
    pub fn brk(&mut self, bus: &mut Bus) {
        self.stack_push_u16(bus, self.pc);
        self.stack_push(bus, self.status | flags::BREAK | flags::UNUSED);
        self.set_interrupt_disable(true);
        self.pc = bus.read_u16(vectors::IRQ);
    }

    /// NOP - No Operation
    ///
    /// The undocumented multi-byte forms still perform their dummy read,
    /// which matters when the operand is a register with read effects.
    pub fn nop(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        if let Operand::Address(address) = addr_result.operand {
            bus.read(address);
        }
    }
}
