// Jump and Subroutine instructions for 6502 CPU

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::{flags, Cpu};

impl Cpu {
    /// JMP - Jump
    ///
    /// Absolute and indirect forms both resolve to the target address;
    /// the indirect page-wrap quirk is handled by the resolver.
    pub fn jmp(&mut self, addr_result: &AddressingResult) {
        self.pc = addr_result.address();
    }

    /// JSR - Jump to Subroutine
    ///
    /// Pushes the address of the last byte of the JSR instruction
    /// (return address - 1), then jumps.
    ///
    /// # Arguments
    /// * `bus` - The memory bus holding the stack
    /// * `addr_result` - The resolved subroutine address
    pub fn jsr(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let return_addr = self.pc.wrapping_sub(1);
        self.stack_push_u16(bus, return_addr);
        self.pc = addr_result.address();
    }

    /// RTS - Return from Subroutine
    ///
    /// Pulls the return address and adds 1.
    pub fn rts(&mut self, bus: &mut Bus) {
        self.pc = self.stack_pop_u16(bus).wrapping_add(1);
    }

    /// RTI - Return from Interrupt
    ///
    /// Pulls P (B dropped, bit 5 forced) and then PC. Unlike RTS the
    /// pulled PC is used as is.
    pub fn rti(&mut self, bus: &mut Bus) {
        let status = self.stack_pop(bus);
        self.status = (status & !flags::BREAK) | flags::UNUSED;
        self.pc = self.stack_pop_u16(bus);
    }
}

#[cfg(test)]
mod tests {
    use crate::cpu::instructions::test_support::{run, setup};

    #[test]
    fn test_jsr_rts_round_trip() {
        // JSR $0610; ...; $0610: RTS
        let (mut cpu, mut bus) = setup(&[0x20, 0x10, 0x06]);
        bus.load_memory(0x0610, &[0x60]);

        assert_eq!(run(&mut cpu, &mut bus, 1), 6);
        assert_eq!(cpu.pc, 0x0610);
        assert_eq!(bus.peek(0x01FD), 0x06);
        assert_eq!(bus.peek(0x01FC), 0x02, "JSR pushes return address - 1");

        assert_eq!(run(&mut cpu, &mut bus, 1), 6);
        assert_eq!(cpu.pc, 0x0603);
        assert_eq!(cpu.sp, 0xFD);
    }

    #[test]
    fn test_jmp_indirect_page_wrap() {
        let (mut cpu, mut bus) = setup(&[0x6C, 0xFF, 0x30]);
        bus.load_memory(0x30FF, &[0x00]);
        bus.load_memory(0x3000, &[0x07]);
        bus.load_memory(0x3100, &[0x09]);

        assert_eq!(run(&mut cpu, &mut bus, 1), 5);
        assert_eq!(cpu.pc, 0x0700);
    }

    #[test]
    fn test_rti_restores_status_and_pc() {
        let (mut cpu, mut bus) = setup(&[0x40]);
        cpu.sp = 0xFA;
        bus.load_memory(0x01FB, &[0xFF, 0x34, 0x12]);

        run(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.pc, 0x1234);
        assert_eq!(cpu.status, 0xEF, "B is not a real flag");
        assert_eq!(cpu.sp, 0xFD);
    }
}
