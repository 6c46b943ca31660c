// Branch instructions for 6502 CPU
//
// Branches return the extra cycles they consume:
// - 0 when not taken
// - 1 when taken to a target on the same page
// - 2 when taken to a target on another page

use crate::cpu::addressing::AddressingResult;
use crate::cpu::flags;
use crate::cpu::Cpu;

impl Cpu {
    /// Jump to the resolved target when `condition` holds
    ///
    /// PC has already been moved past the branch, so the page comparison
    /// in the addressing result is against the next instruction.
    #[inline]
    fn branch(&mut self, condition: bool, addr_result: &AddressingResult) -> u32 {
        if !condition {
            return 0;
        }
        self.pc = addr_result.address();
        if addr_result.page_crossed {
            2
        } else {
            1
        }
    }

    /// BCC - Branch if Carry Clear
    pub fn bcc(&mut self, addr_result: &AddressingResult) -> u32 {
        self.branch(!self.get_flag(flags::CARRY), addr_result)
    }

    /// BCS - Branch if Carry Set
    pub fn bcs(&mut self, addr_result: &AddressingResult) -> u32 {
        self.branch(self.get_flag(flags::CARRY), addr_result)
    }

    /// BEQ - Branch if Equal (Z set)
    pub fn beq(&mut self, addr_result: &AddressingResult) -> u32 {
        self.branch(self.get_flag(flags::ZERO), addr_result)
    }

    /// BNE - Branch if Not Equal (Z clear)
    pub fn bne(&mut self, addr_result: &AddressingResult) -> u32 {
        self.branch(!self.get_flag(flags::ZERO), addr_result)
    }

    /// BMI - Branch if Minus (N set)
    pub fn bmi(&mut self, addr_result: &AddressingResult) -> u32 {
        self.branch(self.get_flag(flags::NEGATIVE), addr_result)
    }

    /// BPL - Branch if Positive (N clear)
    pub fn bpl(&mut self, addr_result: &AddressingResult) -> u32 {
        self.branch(!self.get_flag(flags::NEGATIVE), addr_result)
    }

    /// BVC - Branch if Overflow Clear
    pub fn bvc(&mut self, addr_result: &AddressingResult) -> u32 {
        self.branch(!self.get_flag(flags::OVERFLOW), addr_result)
    }

    /// BVS - Branch if Overflow Set
    pub fn bvs(&mut self, addr_result: &AddressingResult) -> u32 {
        self.branch(self.get_flag(flags::OVERFLOW), addr_result)
    }
}

#[cfg(test)]
mod tests {
    use crate::cpu::instructions::test_support::{run, setup};

    #[test]
    fn test_backward_loop() {
        // LDX #3; loop: DEX; BNE loop
        let (mut cpu, mut bus) = setup(&[0xA2, 0x03, 0xCA, 0xD0, 0xFD]);

        let cycles = run(&mut cpu, &mut bus, 7);
        assert_eq!(cpu.x, 0);
        assert_eq!(cpu.pc, 0x0605);
        // LDX 2 + 3 * DEX 2 + 2 taken BNE 3 + final BNE 2
        assert_eq!(cycles, 2 + 6 + 6 + 2);
    }

    #[test]
    fn test_each_condition() {
        // BCS, BMI, BVS, BCC, BPL, BVC all skip a 0-byte offset
        let (mut cpu, mut bus) = setup(&[0xB0, 0x00, 0x30, 0x00, 0x70, 0x00, 0x90, 0x00, 0x10, 0x00, 0x50, 0x00]);
        let taken = run(&mut cpu, &mut bus, 6);
        // Only BCC, BPL, BVC are taken from the power-on flags
        assert_eq!(taken, 6 * 2 + 3);
        assert_eq!(cpu.pc, 0x060C);
    }
}
