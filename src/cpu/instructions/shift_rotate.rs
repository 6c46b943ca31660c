// Shift and Rotate instructions for 6502 CPU
// Each works on A in accumulator mode and on memory otherwise

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    /// ASL - Arithmetic Shift Left
    ///
    /// Bit 7 goes to C, bit 0 becomes 0.
    ///
    /// Flags affected: C, Z, N
    ///
    /// # Returns
    /// The shifted value (reused by SLO)
    pub fn asl(&mut self, bus: &mut Bus, addr_result: &AddressingResult) -> u8 {
        self.read_modify_write(bus, addr_result, |cpu, value| {
            cpu.set_carry(value & 0x80 != 0);
            let result = value << 1;
            cpu.update_zero_and_negative_flags(result);
            result
        })
    }

    /// LSR - Logical Shift Right
    ///
    /// Bit 0 goes to C, bit 7 becomes 0.
    ///
    /// Flags affected: C, Z, N
    pub fn lsr(&mut self, bus: &mut Bus, addr_result: &AddressingResult) -> u8 {
        self.read_modify_write(bus, addr_result, |cpu, value| {
            cpu.set_carry(value & 0x01 != 0);
            let result = value >> 1;
            cpu.update_zero_and_negative_flags(result);
            result
        })
    }

    /// ROL - Rotate Left through carry
    ///
    /// Flags affected: C, Z, N
    pub fn rol(&mut self, bus: &mut Bus, addr_result: &AddressingResult) -> u8 {
        self.read_modify_write(bus, addr_result, |cpu, value| {
            let carry_in = cpu.get_carry() as u8;
            cpu.set_carry(value & 0x80 != 0);
            let result = (value << 1) | carry_in;
            cpu.update_zero_and_negative_flags(result);
            result
        })
    }

    /// ROR - Rotate Right through carry
    ///
    /// Flags affected: C, Z, N
    pub fn ror(&mut self, bus: &mut Bus, addr_result: &AddressingResult) -> u8 {
        self.read_modify_write(bus, addr_result, |cpu, value| {
            let carry_in = (cpu.get_carry() as u8) << 7;
            cpu.set_carry(value & 0x01 != 0);
            let result = (value >> 1) | carry_in;
            cpu.update_zero_and_negative_flags(result);
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::cpu::instructions::test_support::{run, setup};

    #[test]
    fn test_asl_accumulator() {
        let (mut cpu, mut bus) = setup(&[0x0A]);
        cpu.a = 0x81;
        run(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.a, 0x02);
        assert!(cpu.get_carry());
    }

    #[test]
    fn test_lsr_memory() {
        let (mut cpu, mut bus) = setup(&[0x46, 0x20]);
        bus.load_memory(0x0020, &[0x01]);
        assert_eq!(run(&mut cpu, &mut bus, 1), 5);
        assert_eq!(bus.peek(0x0020), 0x00);
        assert!(cpu.get_carry());
        assert!(cpu.get_zero());
    }

    #[test]
    fn test_rol_ror_through_carry() {
        let (mut cpu, mut bus) = setup(&[0x2A, 0x6A, 0x6A]);
        cpu.a = 0x80;

        run(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.a, 0x00);
        assert!(cpu.get_carry());

        run(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.a, 0x80, "carry rotates into bit 7");
        assert!(!cpu.get_carry());

        run(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.a, 0x40);
    }

    #[test]
    fn test_asl_absolute_x_fixed_cost() {
        let (mut cpu, mut bus) = setup(&[0x1E, 0xFF, 0x02]);
        cpu.x = 1;
        bus.load_memory(0x0300, &[0x40]);
        assert_eq!(run(&mut cpu, &mut bus, 1), 7);
        assert_eq!(bus.peek(0x0300), 0x80);
    }
}
