// Stable undocumented instructions for 6502 CPU
//
// Most of these combine a read-modify-write with an accumulator
// operation, executing both halves with the usual flag rules. Several
// commercial games and the nestest suite depend on them.

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    // ========================================
    // Load / Store Combinations
    // ========================================

    /// LAX - LDA and LDX with the same operand
    ///
    /// Flags affected: Z, N
    pub fn lax(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.a = value;
        self.x = value;
        self.update_zero_and_negative_flags(value);
    }

    /// SAX - Store A & X
    ///
    /// Flags affected: None
    pub fn sax(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        bus.write(addr_result.address(), self.a & self.x);
    }

    /// LAS - A, X and S = M & S
    ///
    /// Flags affected: Z, N
    pub fn las(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result) & self.sp;
        self.a = value;
        self.x = value;
        self.sp = value;
        self.update_zero_and_negative_flags(value);
    }

    // ========================================
    // Read-Modify-Write Combinations
    // ========================================

    /// DCP - DEC then CMP
    pub fn dcp(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let result = self.read_modify_write(bus, addr_result, |_, value| value.wrapping_sub(1));
        self.compare(self.a, result);
    }

    /// ISB - INC then SBC
    pub fn isb(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let result = self.read_modify_write(bus, addr_result, |_, value| value.wrapping_add(1));
        self.add_with_carry(!result);
    }

    /// SLO - ASL then ORA
    pub fn slo(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let result = self.asl(bus, addr_result);
        self.a |= result;
        self.update_zero_and_negative_flags(self.a);
    }

    /// RLA - ROL then AND
    pub fn rla(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let result = self.rol(bus, addr_result);
        self.a &= result;
        self.update_zero_and_negative_flags(self.a);
    }

    /// SRE - LSR then EOR
    pub fn sre(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let result = self.lsr(bus, addr_result);
        self.a ^= result;
        self.update_zero_and_negative_flags(self.a);
    }

    /// RRA - ROR then ADC (the carry out of ROR feeds the addition)
    pub fn rra(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let result = self.ror(bus, addr_result);
        self.add_with_carry(result);
    }

    // ========================================
    // Immediate Combinations
    // ========================================

    /// ANC - AND, then copy N into C
    pub fn anc(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        self.and(bus, addr_result);
        self.set_carry(self.get_negative());
    }

    /// ALR - AND, then LSR A
    pub fn alr(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        let masked = self.a & value;
        self.set_carry(masked & 0x01 != 0);
        self.a = masked >> 1;
        self.update_zero_and_negative_flags(self.a);
    }

    /// ARR - AND, then ROR A with odd flag rules
    ///
    /// C comes from bit 6 of the result, V from bit 6 xor bit 5.
    pub fn arr(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        let carry_in = (self.get_carry() as u8) << 7;
        let result = ((self.a & value) >> 1) | carry_in;
        self.a = result;
        self.update_zero_and_negative_flags(result);
        self.set_carry(result & 0x40 != 0);
        self.set_overflow(((result >> 6) ^ (result >> 5)) & 0x01 != 0);
    }

    /// AXS - X = (A & X) - M, compare-style carry, no borrow in
    pub fn axs(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        let masked = self.a & self.x;
        self.set_carry(masked >= value);
        self.x = masked.wrapping_sub(value);
        self.update_zero_and_negative_flags(self.x);
    }
}

#[cfg(test)]
mod tests {
    use crate::cpu::instructions::test_support::{run, setup};

    #[test]
    fn test_lax_loads_both_registers() {
        let (mut cpu, mut bus) = setup(&[0xA7, 0x10]);
        bus.load_memory(0x0010, &[0x8F]);
        assert_eq!(run(&mut cpu, &mut bus, 1), 3);
        assert_eq!((cpu.a, cpu.x), (0x8F, 0x8F));
        assert!(cpu.get_negative());
    }

    #[test]
    fn test_sax_stores_and() {
        let (mut cpu, mut bus) = setup(&[0x87, 0x10]);
        cpu.a = 0xF0;
        cpu.x = 0x3C;
        run(&mut cpu, &mut bus, 1);
        assert_eq!(bus.peek(0x0010), 0x30);
    }

    #[test]
    fn test_dcp_decrements_then_compares() {
        let (mut cpu, mut bus) = setup(&[0xC7, 0x10]);
        bus.load_memory(0x0010, &[0x41]);
        cpu.a = 0x40;
        assert_eq!(run(&mut cpu, &mut bus, 1), 5);
        assert_eq!(bus.peek(0x0010), 0x40);
        assert!(cpu.get_zero());
        assert!(cpu.get_carry());
    }

    #[test]
    fn test_isb_increments_then_subtracts() {
        let (mut cpu, mut bus) = setup(&[0xE7, 0x10]);
        bus.load_memory(0x0010, &[0x0F]);
        cpu.a = 0x20;
        cpu.set_carry(true);
        run(&mut cpu, &mut bus, 1);
        assert_eq!(bus.peek(0x0010), 0x10);
        assert_eq!(cpu.a, 0x10);
        assert!(cpu.get_carry());
    }

    #[test]
    fn test_slo_rla_sre() {
        let (mut cpu, mut bus) = setup(&[0x07, 0x10, 0x27, 0x11, 0x47, 0x12]);
        bus.load_memory(0x0010, &[0x81, 0x01, 0x03]);

        cpu.a = 0x01;
        run(&mut cpu, &mut bus, 1);
        assert_eq!(bus.peek(0x0010), 0x02);
        assert_eq!(cpu.a, 0x03);
        assert!(cpu.get_carry());

        run(&mut cpu, &mut bus, 1);
        assert_eq!(bus.peek(0x0011), 0x03, "carry rotated in");
        assert_eq!(cpu.a, 0x03);

        run(&mut cpu, &mut bus, 1);
        assert_eq!(bus.peek(0x0012), 0x01);
        assert_eq!(cpu.a, 0x02);
        assert!(cpu.get_carry());
    }

    #[test]
    fn test_rra_adds_rotated_value_with_carry() {
        let (mut cpu, mut bus) = setup(&[0x67, 0x10]);
        bus.load_memory(0x0010, &[0x03]);
        cpu.a = 0x10;

        run(&mut cpu, &mut bus, 1);
        assert_eq!(bus.peek(0x0010), 0x01);
        assert_eq!(cpu.a, 0x12, "0x10 + 0x01 + carry out of ROR");
    }

    #[test]
    fn test_immediate_combinations() {
        let (mut cpu, mut bus) = setup(&[0x0B, 0x80, 0x4B, 0x03, 0xCB, 0x02]);

        cpu.a = 0xFF;
        run(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.a, 0x80);
        assert!(cpu.get_carry(), "ANC copies N into C");

        cpu.a = 0x07;
        run(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.a, 0x01);
        assert!(cpu.get_carry());

        cpu.a = 0x0F;
        cpu.x = 0x05;
        run(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.x, 0x03);
        assert!(cpu.get_carry());
    }

    #[test]
    fn test_arr_flags() {
        let (mut cpu, mut bus) = setup(&[0x6B, 0xFF]);
        cpu.a = 0xC0;
        cpu.set_carry(false);
        run(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.a, 0x60);
        assert!(cpu.get_carry(), "bit 6 of the result");
        assert!(!cpu.get_overflow(), "bit 6 == bit 5");
    }

    #[test]
    fn test_las() {
        let (mut cpu, mut bus) = setup(&[0xBB, 0x00, 0x02]);
        bus.load_memory(0x0200, &[0xF3]);
        cpu.sp = 0x3F;
        run(&mut cpu, &mut bus, 1);
        assert_eq!((cpu.a, cpu.x, cpu.sp), (0x33, 0x33, 0x33));
    }
}
