// Arithmetic instructions for 6502 CPU
// ADC/SBC operate in binary only: the 2A03 has no decimal mode

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    // ========================================
    // Addition and Subtraction
    // ========================================

    /// Add `value` and the carry to A, updating C, V, Z and N
    ///
    /// Overflow is set when both inputs share a sign that differs from the
    /// sign of the result.
    pub(crate) fn add_with_carry(&mut self, value: u8) {
        let carry = self.get_carry() as u16;
        let sum = self.a as u16 + value as u16 + carry;
        let result = sum as u8;

        self.set_carry(sum > 0xFF);
        self.set_overflow((self.a ^ result) & (value ^ result) & 0x80 != 0);

        self.a = result;
        self.update_zero_and_negative_flags(result);
    }

    /// ADC - Add with Carry
    ///
    /// A = A + M + C
    ///
    /// Flags affected: C, V, Z, N
    ///
    /// # Arguments
    /// * `bus` - The memory bus to read from
    /// * `addr_result` - The resolved operand
    pub fn adc(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.add_with_carry(value);
    }

    /// SBC - Subtract with Carry
    ///
    /// A = A - M - (1 - C), computed as A + !M + C.
    ///
    /// Flags affected: C, V, Z, N
    pub fn sbc(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.add_with_carry(!value);
    }

    // ========================================
    // Increment and Decrement
    // ========================================

    /// INC - Increment Memory
    ///
    /// Flags affected: Z, N
    pub fn inc(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        self.read_modify_write(bus, addr_result, |cpu, value| {
            let result = value.wrapping_add(1);
            cpu.update_zero_and_negative_flags(result);
            result
        });
    }

    /// DEC - Decrement Memory
    ///
    /// Flags affected: Z, N
    pub fn dec(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        self.read_modify_write(bus, addr_result, |cpu, value| {
            let result = value.wrapping_sub(1);
            cpu.update_zero_and_negative_flags(result);
            result
        });
    }

    /// INX - Increment X Register
    pub fn inx(&mut self) {
        self.x = self.x.wrapping_add(1);
        self.update_zero_and_negative_flags(self.x);
    }

    /// INY - Increment Y Register
    pub fn iny(&mut self) {
        self.y = self.y.wrapping_add(1);
        self.update_zero_and_negative_flags(self.y);
    }

    /// DEX - Decrement X Register
    pub fn dex(&mut self) {
        self.x = self.x.wrapping_sub(1);
        self.update_zero_and_negative_flags(self.x);
    }

    /// DEY - Decrement Y Register
    pub fn dey(&mut self) {
        self.y = self.y.wrapping_sub(1);
        self.update_zero_and_negative_flags(self.y);
    }
}
