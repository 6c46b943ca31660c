// Disassembler - 6502 instruction disassembly
//
// Converts raw bytes into human-readable 6502 assembly instructions.

use std::fmt;

use crate::bus::Bus;
use crate::cpu::addressing::AddressingMode;
use crate::cpu::opcodes::{self, Instruction, Mnemonic};
use crate::cpu::Cpu;

/// Disassembled instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisassembledInstruction {
    /// Address where the instruction is located
    pub address: u16,

    /// Descriptor of the opcode byte
    pub instruction: &'static Instruction,

    /// Operand bytes (0-2)
    pub operands: Vec<u8>,
}

impl DisassembledInstruction {
    /// Total instruction length in bytes
    pub fn length(&self) -> u8 {
        self.instruction.bytes
    }

    fn operand_u8(&self) -> u8 {
        self.operands.first().copied().unwrap_or(0)
    }

    fn operand_u16(&self) -> u16 {
        let lo = self.operands.first().copied().unwrap_or(0) as u16;
        let hi = self.operands.get(1).copied().unwrap_or(0) as u16;
        (hi << 8) | lo
    }

    /// Branch destination for relative instructions
    pub fn branch_target(&self) -> u16 {
        let offset = self.operand_u8() as i8;
        self.address.wrapping_add(2).wrapping_add(offset as u16)
    }

    /// Format the instruction as assembly code
    ///
    /// # Returns
    ///
    /// A string like "LDA #$42" or "JMP $8000"
    pub fn format_assembly(&self) -> String {
        let mnemonic = self.instruction.mnemonic.name();
        let operand = match self.instruction.mode {
            AddressingMode::Implied => return mnemonic.to_string(),
            AddressingMode::Accumulator => "A".to_string(),
            AddressingMode::Immediate => format!("#${:02X}", self.operand_u8()),
            AddressingMode::ZeroPage => format!("${:02X}", self.operand_u8()),
            AddressingMode::ZeroPageX => format!("${:02X},X", self.operand_u8()),
            AddressingMode::ZeroPageY => format!("${:02X},Y", self.operand_u8()),
            AddressingMode::Absolute => format!("${:04X}", self.operand_u16()),
            AddressingMode::AbsoluteX => format!("${:04X},X", self.operand_u16()),
            AddressingMode::AbsoluteY => format!("${:04X},Y", self.operand_u16()),
            AddressingMode::Indirect => format!("(${:04X})", self.operand_u16()),
            AddressingMode::IndexedIndirect => format!("(${:02X},X)", self.operand_u8()),
            AddressingMode::IndirectIndexed => format!("(${:02X}),Y", self.operand_u8()),
            AddressingMode::Relative => format!("${:04X}", self.branch_target()),
        };
        format!("{} {}", mnemonic, operand)
    }

    /// Format the instruction bytes as hex
    ///
    /// # Returns
    ///
    /// A string like "A9 42" or "4C 00 80"
    pub fn format_bytes(&self) -> String {
        std::iter::once(self.instruction.opcode)
            .chain(self.operands.iter().copied())
            .map(|byte| format!("{:02X}", byte))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for DisassembledInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${:04X}  {:8}  {}",
            self.address,
            self.format_bytes(),
            self.format_assembly()
        )
    }
}

/// Disassemble the instruction at `addr`
///
/// Every opcode disassembles, including the slots the CPU refuses to
/// execute.
pub fn disassemble(bus: &Bus, addr: u16) -> DisassembledInstruction {
    let instruction = opcodes::lookup(bus.peek(addr));
    let operands = (1..instruction.bytes as u16)
        .map(|i| bus.peek(addr.wrapping_add(i)))
        .collect();

    DisassembledInstruction {
        address: addr,
        instruction,
        operands,
    }
}

/// Disassemble `count` consecutive instructions starting at `start`
pub fn disassemble_count(bus: &Bus, start: u16, count: usize) -> Vec<DisassembledInstruction> {
    let mut addr = start;
    (0..count)
        .map(|_| {
            let instruction = disassemble(bus, addr);
            addr = addr.wrapping_add(instruction.length() as u16);
            instruction
        })
        .collect()
}

/// Instruction text with the effective address and memory contents as
/// the CPU is about to see them (nestest log format)
///
/// ```text
/// LDA $0200 = 5A
/// STA $33,X @ 34 = 00
/// LDA ($80,X) @ 80 = 0200 = 5A
/// LDA ($89),Y = 0300 @ 0300 = 89
/// JMP ($02FF) = 0300
/// ```
pub fn annotate(cpu: &Cpu, bus: &Bus, pc: u16) -> String {
    let decoded = disassemble(bus, pc);
    let text = decoded.format_assembly();
    let is_jump = matches!(decoded.instruction.mnemonic, Mnemonic::Jmp | Mnemonic::Jsr);

    let zero_page_word = |ptr: u8| -> u16 {
        let lo = bus.peek(ptr as u16) as u16;
        let hi = bus.peek(ptr.wrapping_add(1) as u16) as u16;
        (hi << 8) | lo
    };

    match decoded.instruction.mode {
        AddressingMode::ZeroPage => {
            let addr = decoded.operand_u8() as u16;
            format!("{} = {:02X}", text, bus.peek(addr))
        }
        AddressingMode::ZeroPageX | AddressingMode::ZeroPageY => {
            let index = if decoded.instruction.mode == AddressingMode::ZeroPageX {
                cpu.x
            } else {
                cpu.y
            };
            let addr = decoded.operand_u8().wrapping_add(index);
            format!("{} @ {:02X} = {:02X}", text, addr, bus.peek(addr as u16))
        }
        AddressingMode::Absolute if !is_jump => {
            let addr = decoded.operand_u16();
            format!("{} = {:02X}", text, bus.peek(addr))
        }
        AddressingMode::AbsoluteX | AddressingMode::AbsoluteY => {
            let index = if decoded.instruction.mode == AddressingMode::AbsoluteX {
                cpu.x
            } else {
                cpu.y
            };
            let addr = decoded.operand_u16().wrapping_add(index as u16);
            format!("{} @ {:04X} = {:02X}", text, addr, bus.peek(addr))
        }
        AddressingMode::Indirect => {
            // Same page-wrap bug the CPU reproduces
            let ptr = decoded.operand_u16();
            let lo = bus.peek(ptr) as u16;
            let hi = bus.peek((ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF)) as u16;
            format!("{} = {:04X}", text, (hi << 8) | lo)
        }
        AddressingMode::IndexedIndirect => {
            let ptr = decoded.operand_u8().wrapping_add(cpu.x);
            let addr = zero_page_word(ptr);
            format!("{} @ {:02X} = {:04X} = {:02X}", text, ptr, addr, bus.peek(addr))
        }
        AddressingMode::IndirectIndexed => {
            let base = zero_page_word(decoded.operand_u8());
            let addr = base.wrapping_add(cpu.y as u16);
            format!("{} = {:04X} @ {:04X} = {:02X}", text, base, addr, bus.peek(addr))
        }
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus_with(addr: u16, bytes: &[u8]) -> Bus {
        let mut bus = Bus::new();
        bus.load_memory(addr, bytes);
        bus
    }

    #[test]
    fn test_disassemble_nop() {
        let bus = bus_with(0x8000, &[0xEA]);
        let instr = disassemble(&bus, 0x8000);

        assert_eq!(instr.instruction.opcode, 0xEA);
        assert_eq!(instr.format_assembly(), "NOP");
        assert_eq!(instr.length(), 1);
        assert!(instr.operands.is_empty());
    }

    #[test]
    fn test_disassemble_operand_formats() {
        let cases: [(&[u8], &str); 8] = [
            (&[0xA9, 0x42], "LDA #$42"),
            (&[0x4C, 0x34, 0x12], "JMP $1234"),
            (&[0x0A], "ASL A"),
            (&[0xB5, 0x10], "LDA $10,X"),
            (&[0xB6, 0x10], "LDX $10,Y"),
            (&[0x6C, 0xFF, 0x30], "JMP ($30FF)"),
            (&[0xA1, 0x80], "LDA ($80,X)"),
            (&[0xB1, 0x80], "LDA ($80),Y"),
        ];

        for (bytes, expected) in cases {
            let bus = bus_with(0x8000, bytes);
            assert_eq!(disassemble(&bus, 0x8000).format_assembly(), expected);
        }
    }

    #[test]
    fn test_branch_target() {
        let bus = bus_with(0x8000, &[0xD0, 0xFE]);
        assert_eq!(disassemble(&bus, 0x8000).format_assembly(), "BNE $8000");
    }

    #[test]
    fn test_unexecutable_opcode_still_disassembles() {
        let bus = bus_with(0x8000, &[0x02]);
        let instr = disassemble(&bus, 0x8000);
        assert_eq!(instr.format_assembly(), "JAM");
        assert!(!instr.instruction.official);
    }

    #[test]
    fn test_format_bytes_and_display() {
        let bus = bus_with(0x8000, &[0x4C, 0x34, 0x12]);
        let instr = disassemble(&bus, 0x8000);

        assert_eq!(instr.format_bytes(), "4C 34 12");
        assert_eq!(instr.to_string(), "$8000  4C 34 12  JMP $1234");
    }

    #[test]
    fn test_disassemble_count() {
        let bus = bus_with(0x8000, &[0xEA, 0xEA, 0xA9, 0x42]);
        let instructions = disassemble_count(&bus, 0x8000, 3);

        assert_eq!(instructions.len(), 3);
        assert_eq!(instructions[2].address, 0x8002);
        assert_eq!(instructions[2].format_assembly(), "LDA #$42");
    }

    #[test]
    fn test_annotate_memory_operands() {
        let mut bus = Bus::new();
        let mut cpu = Cpu::new();
        cpu.x = 0x01;
        cpu.y = 0x05;
        bus.load_memory(0x0034, &[0x77]);
        bus.load_memory(0x0081, &[0x00, 0x02]);
        bus.load_memory(0x0089, &[0x00, 0x03]);
        bus.load_memory(0x0200, &[0x5A]);
        bus.load_memory(0x0305, &[0x89]);

        let check = |bus: &mut Bus, bytes: &[u8], expected: &str| {
            bus.load_memory(0x0600, bytes);
            assert_eq!(annotate(&cpu, bus, 0x0600), expected);
        };

        check(&mut bus, &[0xA5, 0x34], "LDA $34 = 77");
        check(&mut bus, &[0xB5, 0x33], "LDA $33,X @ 34 = 77");
        check(&mut bus, &[0xAD, 0x00, 0x02], "LDA $0200 = 5A");
        check(&mut bus, &[0xBD, 0xFF, 0x01], "LDA $01FF,X @ 0200 = 5A");
        check(&mut bus, &[0xA1, 0x80], "LDA ($80,X) @ 81 = 0200 = 5A");
        check(&mut bus, &[0xB1, 0x89], "LDA ($89),Y = 0300 @ 0305 = 89");
        check(&mut bus, &[0x20, 0x00, 0x02], "JSR $0200");
    }

    #[test]
    fn test_annotate_indirect_jump_page_wrap() {
        let mut bus = Bus::new();
        bus.load_memory(0x02FF, &[0x00]);
        bus.load_memory(0x0200, &[0x03]);
        bus.load_memory(0x0300, &[0x99]);
        bus.load_memory(0x0600, &[0x6C, 0xFF, 0x02]);

        assert_eq!(annotate(&Cpu::new(), &bus, 0x0600), "JMP ($02FF) = 0300");
    }
}
