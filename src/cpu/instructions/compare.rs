// Compare instructions for 6502 CPU

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    /// Shared compare: C = register >= value, Z/N from the difference
    #[inline]
    pub(crate) fn compare(&mut self, register: u8, value: u8) {
        let result = register.wrapping_sub(value);
        self.set_carry(register >= value);
        self.update_zero_and_negative_flags(result);
    }

    /// CMP - Compare Accumulator
    ///
    /// Flags affected: C, Z, N
    pub fn cmp(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.compare(self.a, value);
    }

    /// CPX - Compare X Register
    pub fn cpx(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.compare(self.x, value);
    }

    /// CPY - Compare Y Register
    pub fn cpy(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.compare(self.y, value);
    }
}

#[cfg(test)]
mod tests {
    use crate::cpu::instructions::test_support::{run, setup};

    #[test]
    fn test_cmp_equal_greater_less() {
        let (mut cpu, mut bus) = setup(&[0xC9, 0x40, 0xC9, 0x30, 0xC9, 0x50]);
        cpu.a = 0x40;

        run(&mut cpu, &mut bus, 1);
        assert!(cpu.get_zero() && cpu.get_carry());

        run(&mut cpu, &mut bus, 1);
        assert!(!cpu.get_zero() && cpu.get_carry());

        run(&mut cpu, &mut bus, 1);
        assert!(!cpu.get_carry());
        assert!(cpu.get_negative(), "0x40 - 0x50 = 0xF0");
    }

    #[test]
    fn test_cpx_cpy() {
        let (mut cpu, mut bus) = setup(&[0xE0, 0x05, 0xC0, 0x06]);
        cpu.x = 0x05;
        cpu.y = 0x05;

        run(&mut cpu, &mut bus, 1);
        assert!(cpu.get_zero());
        run(&mut cpu, &mut bus, 1);
        assert!(!cpu.get_carry());
    }
}
