// Addressing modes module for 6502 CPU
// Resolves the operand of an instruction for all 13 addressing modes

use super::opcodes::Instruction;
use crate::bus::Bus;

/// The operand an instruction works on after addressing is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Implied and accumulator modes
    None,
    /// Constant byte from the instruction stream
    Immediate(u8),
    /// Effective memory address (also the branch / jump target)
    Address(u16),
}

/// Result of an addressing mode calculation
///
/// Contains the resolved operand and whether a page boundary was crossed
/// while indexing (which adds an extra cycle for some instructions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressingResult {
    pub operand: Operand,

    /// Whether a page boundary was crossed during address calculation
    pub page_crossed: bool,
}

impl AddressingResult {
    /// Result for modes without an operand
    pub fn none() -> Self {
        Self {
            operand: Operand::None,
            page_crossed: false,
        }
    }

    /// Result carrying an immediate byte
    pub fn immediate(value: u8) -> Self {
        Self {
            operand: Operand::Immediate(value),
            page_crossed: false,
        }
    }

    /// Result carrying an effective address
    pub fn new(address: u16) -> Self {
        Self {
            operand: Operand::Address(address),
            page_crossed: false,
        }
    }

    /// Set the page_crossed flag
    pub fn with_page_cross(mut self, crossed: bool) -> Self {
        self.page_crossed = crossed;
        self
    }

    /// Effective address, or 0 for operand-less modes
    #[inline]
    pub fn address(&self) -> u16 {
        match self.operand {
            Operand::Address(address) => address,
            _ => 0,
        }
    }
}

/// Addressing modes supported by the 6502
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    /// Implied - No operand (e.g., CLC, NOP)
    Implied,

    /// Accumulator - Operate on accumulator (e.g., LSR A)
    Accumulator,

    /// Immediate - 8-bit constant (e.g., LDA #$01)
    Immediate,

    /// Zero Page - Address in zero page $00-$FF (e.g., LDA $80)
    ZeroPage,

    /// Zero Page,X - Zero page address + X register (e.g., LDA $80,X)
    ZeroPageX,

    /// Zero Page,Y - Zero page address + Y register (e.g., LDX $80,Y)
    ZeroPageY,

    /// Relative - Signed 8-bit offset for branches (e.g., BNE label)
    Relative,

    /// Absolute - 16-bit address (e.g., LDA $8000)
    Absolute,

    /// Absolute,X - 16-bit address + X register (e.g., LDA $8000,X)
    AbsoluteX,

    /// Absolute,Y - 16-bit address + Y register (e.g., LDA $8000,Y)
    AbsoluteY,

    /// Indirect - 16-bit pointer (JMP only) (e.g., JMP ($FFFC))
    Indirect,

    /// Indexed Indirect - Zero page pointer + X (e.g., LDA ($40,X))
    IndexedIndirect,

    /// Indirect Indexed - Zero page pointer + Y (e.g., LDA ($40),Y)
    IndirectIndexed,
}

impl AddressingMode {
    /// Instruction size in bytes for this mode, opcode included
    pub const fn size(self) -> u8 {
        match self {
            AddressingMode::Implied | AddressingMode::Accumulator => 1,
            AddressingMode::Immediate
            | AddressingMode::ZeroPage
            | AddressingMode::ZeroPageX
            | AddressingMode::ZeroPageY
            | AddressingMode::Relative
            | AddressingMode::IndexedIndirect
            | AddressingMode::IndirectIndexed => 2,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 3,
        }
    }
}

/// Helper function to check if a page boundary was crossed
///
/// A page boundary is crossed when adding an offset to a base address
/// causes the high byte of the address to change.
#[inline]
fn page_crossed(base: u16, offset: u8) -> bool {
    let addr = base.wrapping_add(offset as u16);
    (base & 0xFF00) != (addr & 0xFF00)
}

impl super::Cpu {
    /// Resolve the operand of `instruction` located at `pc`
    ///
    /// Operand bytes are read from `pc + 1` and `pc + 2`; the program
    /// counter itself is not moved.
    ///
    /// # Arguments
    ///
    /// * `instruction` - Descriptor of the opcode at `pc`
    /// * `pc` - Address of the opcode byte
    /// * `bus` - Memory bus used for operand and pointer reads
    ///
    /// # Returns
    ///
    /// The resolved operand together with the page-cross flag
    pub fn resolve(&self, instruction: &Instruction, pc: u16, bus: &mut Bus) -> AddressingResult {
        let operand_addr = pc.wrapping_add(1);

        match instruction.mode {
            AddressingMode::Implied | AddressingMode::Accumulator => AddressingResult::none(),

            AddressingMode::Immediate => AddressingResult::immediate(bus.read(operand_addr)),

            AddressingMode::ZeroPage => AddressingResult::new(bus.read(operand_addr) as u16),

            // Zero page indexing wraps within page zero
            AddressingMode::ZeroPageX => {
                AddressingResult::new(bus.read(operand_addr).wrapping_add(self.x) as u16)
            }
            AddressingMode::ZeroPageY => {
                AddressingResult::new(bus.read(operand_addr).wrapping_add(self.y) as u16)
            }

            AddressingMode::Relative => {
                let offset = bus.read(operand_addr) as i8;
                let next = pc.wrapping_add(instruction.bytes as u16);
                let target = next.wrapping_add(offset as i16 as u16);
                AddressingResult::new(target).with_page_cross((next & 0xFF00) != (target & 0xFF00))
            }

            AddressingMode::Absolute => AddressingResult::new(bus.read_u16(operand_addr)),

            AddressingMode::AbsoluteX => {
                let base = bus.read_u16(operand_addr);
                AddressingResult::new(base.wrapping_add(self.x as u16))
                    .with_page_cross(page_crossed(base, self.x))
            }

            AddressingMode::AbsoluteY => {
                let base = bus.read_u16(operand_addr);
                AddressingResult::new(base.wrapping_add(self.y as u16))
                    .with_page_cross(page_crossed(base, self.y))
            }

            AddressingMode::Indirect => {
                let pointer = bus.read_u16(operand_addr);
                AddressingResult::new(Self::read_u16_page_wrapped(bus, pointer))
            }

            AddressingMode::IndexedIndirect => {
                let zp = bus.read(operand_addr).wrapping_add(self.x);
                AddressingResult::new(Self::read_zero_page_u16(bus, zp))
            }

            AddressingMode::IndirectIndexed => {
                let zp = bus.read(operand_addr);
                let base = Self::read_zero_page_u16(bus, zp);
                AddressingResult::new(base.wrapping_add(self.y as u16))
                    .with_page_cross(page_crossed(base, self.y))
            }
        }
    }

    /// Read a 16-bit pointer from zero page, wrapping $FF -> $00
    #[inline]
    fn read_zero_page_u16(bus: &mut Bus, zp: u8) -> u16 {
        let lo = bus.read(zp as u16) as u16;
        let hi = bus.read(zp.wrapping_add(1) as u16) as u16;
        (hi << 8) | lo
    }

    /// Read a 16-bit pointer the way JMP ($xxxx) does
    ///
    /// The high byte is fetched without carrying into the page, so
    /// `JMP ($30FF)` reads $30FF and $3000.
    #[inline]
    fn read_u16_page_wrapped(bus: &mut Bus, pointer: u16) -> u16 {
        let lo = bus.read(pointer) as u16;
        let hi_addr = (pointer & 0xFF00) | (pointer.wrapping_add(1) & 0x00FF);
        let hi = bus.read(hi_addr) as u16;
        (hi << 8) | lo
    }
}
