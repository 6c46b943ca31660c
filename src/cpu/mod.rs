// CPU module - 2A03 (6502 without decimal mode) processor core
//
// The CPU is split across several files that all extend `impl Cpu`:
// - opcodes.rs: the static 256-entry instruction table
// - addressing.rs: operand resolution for the 13 addressing modes
// - execute.rs: the fetch / resolve / execute step and the trace line
// - instructions/: one file per instruction family

pub mod addressing;
pub mod execute;
pub mod instructions;
pub mod opcodes;

use crate::bus::Bus;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use addressing::{AddressingMode, AddressingResult, Operand};
pub use opcodes::{describe, lookup, ExtraCycles, Instruction, Mnemonic, OPCODE_TABLE};

/// Processor Status Flags (P register)
///
/// Bit layout:
/// ```text
/// 7  6  5  4  3  2  1  0
/// N  V  -  B  D  I  Z  C
/// ```
///
/// - N: Negative flag (bit 7)
/// - V: Overflow flag (bit 6)
/// - -: Unused flag (bit 5, always 1)
/// - B: Break command flag (bit 4, only exists on the stack copy)
/// - D: Decimal mode flag (bit 3, stored but ignored by the 2A03)
/// - I: Interrupt disable flag (bit 2)
/// - Z: Zero flag (bit 1)
/// - C: Carry flag (bit 0)
pub mod flags {
    pub const CARRY: u8 = 0b0000_0001; // Bit 0: C
    pub const ZERO: u8 = 0b0000_0010; // Bit 1: Z
    pub const INTERRUPT_DISABLE: u8 = 0b0000_0100; // Bit 2: I
    pub const DECIMAL: u8 = 0b0000_1000; // Bit 3: D
    pub const BREAK: u8 = 0b0001_0000; // Bit 4: B
    pub const UNUSED: u8 = 0b0010_0000; // Bit 5: - (always 1)
    pub const OVERFLOW: u8 = 0b0100_0000; // Bit 6: V
    pub const NEGATIVE: u8 = 0b1000_0000; // Bit 7: N
}

/// Interrupt vector addresses
pub mod vectors {
    /// Non-maskable interrupt vector ($FFFA-$FFFB)
    pub const NMI: u16 = 0xFFFA;
    /// Reset vector ($FFFC-$FFFD)
    pub const RESET: u16 = 0xFFFC;
    /// IRQ / BRK vector ($FFFE-$FFFF)
    pub const IRQ: u16 = 0xFFFE;
}

/// Base address of the hardware stack (page 1)
pub const STACK_BASE: u16 = 0x0100;

/// Stack pointer value after RESET
pub const RESET_STACK_POINTER: u8 = 0xFD;

/// Status register value after RESET (UNUSED | INTERRUPT_DISABLE)
pub const RESET_STATUS: u8 = flags::UNUSED | flags::INTERRUPT_DISABLE;

/// Cycles taken by NMI, IRQ and RESET entry
pub const INTERRUPT_CYCLES: u32 = 7;

/// Fatal CPU conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpuError {
    /// The opcode at `pc` has a table slot but no implemented semantics
    /// (JAM and the unstable undocumented opcodes).
    #[error("unimplemented opcode ${opcode:02X} at ${pc:04X}")]
    UnimplementedOpcode { opcode: u8, pc: u16 },
}

/// CPU structure representing the 6502 processor state
///
/// Registers are public so the debugger, tests and snapshots can reach
/// them. The interrupt inputs are private: NMI is an edge latched by
/// [`Cpu::request_nmi`], IRQ is a level driven by [`Cpu::set_irq_line`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cpu {
    // Registers
    pub a: u8,      // Accumulator
    pub x: u8,      // Index Register X
    pub y: u8,      // Index Register Y
    pub sp: u8,     // Stack Pointer
    pub pc: u16,    // Program Counter
    pub status: u8, // Processor Status flags

    /// Total cycles executed since power-on
    pub cycles: u64,

    nmi_pending: bool,
    irq_line: bool,

    /// Emit a nestest-format trace line per instruction at `trace` level
    #[serde(skip)]
    pub trace: bool,
}

impl Cpu {
    /// Create a new CPU instance with power-on register values
    ///
    /// A, X, Y are zero, S is 0xFD and P is 0x24. PC stays 0 until
    /// [`Cpu::reset`] loads the reset vector.
    pub fn new() -> Self {
        Cpu {
            a: 0,
            x: 0,
            y: 0,
            sp: RESET_STACK_POINTER,
            pc: 0,
            status: RESET_STATUS,
            cycles: 0,
            nmi_pending: false,
            irq_line: false,
            trace: false,
        }
    }

    /// Reset the CPU and the cartridge mapper
    ///
    /// Reinitialises A, X, Y, S and P, returns the mapper to its power-on
    /// banks, then loads PC from the reset vector at $FFFC.
    ///
    /// # Returns
    ///
    /// The cycles the reset sequence takes (always 7)
    pub fn reset(&mut self, bus: &mut Bus) -> u32 {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = RESET_STACK_POINTER;
        self.status = RESET_STATUS;
        self.nmi_pending = false;
        self.irq_line = false;

        bus.reset_cartridge();
        self.pc = bus.read_u16(vectors::RESET);
        self.cycles = INTERRUPT_CYCLES as u64;

        log::info!("CPU reset, PC=${:04X}", self.pc);
        INTERRUPT_CYCLES
    }

    // ========================================
    // Interrupt Inputs
    // ========================================

    /// Latch an NMI edge; it is serviced at the start of the next step
    pub fn request_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Whether an NMI edge is waiting to be serviced
    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    /// Drive the IRQ level line (mapper IRQ output)
    pub fn set_irq_line(&mut self, asserted: bool) {
        self.irq_line = asserted;
    }

    /// Current level of the IRQ line
    pub fn irq_line(&self) -> bool {
        self.irq_line
    }

    /// Enter the NMI handler immediately
    ///
    /// Pushes PC and P (B clear, bit 5 set), sets I and jumps through
    /// $FFFA.
    ///
    /// # Returns
    ///
    /// The cycles taken (always 7)
    pub fn nmi(&mut self, bus: &mut Bus) -> u32 {
        self.nmi_pending = false;
        self.enter_interrupt(bus, vectors::NMI)
    }

    /// Enter the IRQ handler if interrupts are enabled
    ///
    /// # Returns
    ///
    /// 7 when the interrupt was taken, 0 when I masked it
    pub fn irq(&mut self, bus: &mut Bus) -> u32 {
        if self.get_interrupt_disable() {
            return 0;
        }
        self.enter_interrupt(bus, vectors::IRQ)
    }

    /// Shared hardware interrupt sequence for NMI and IRQ
    fn enter_interrupt(&mut self, bus: &mut Bus, vector: u16) -> u32 {
        self.stack_push_u16(bus, self.pc);
        self.stack_push(bus, (self.status & !flags::BREAK) | flags::UNUSED);
        self.set_interrupt_disable(true);
        self.pc = bus.read_u16(vector);
        self.cycles += INTERRUPT_CYCLES as u64;
        INTERRUPT_CYCLES
    }

    // ========================================
    // Stack Operations
    // ========================================

    /// Push a byte onto the stack at $0100 | S, then decrement S
    #[inline]
    pub fn stack_push(&mut self, bus: &mut Bus, value: u8) {
        bus.write(STACK_BASE | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    /// Increment S, then pull the byte at $0100 | S
    #[inline]
    pub fn stack_pop(&mut self, bus: &mut Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(STACK_BASE | self.sp as u16)
    }

    /// Push a 16-bit value, high byte first
    pub fn stack_push_u16(&mut self, bus: &mut Bus, value: u16) {
        self.stack_push(bus, (value >> 8) as u8);
        self.stack_push(bus, value as u8);
    }

    /// Pull a 16-bit value, low byte first
    pub fn stack_pop_u16(&mut self, bus: &mut Bus) -> u16 {
        let lo = self.stack_pop(bus) as u16;
        let hi = self.stack_pop(bus) as u16;
        (hi << 8) | lo
    }

    // ========================================
    // Status Flag Manipulation Methods
    // ========================================

    /// Get the value of a specific flag
    #[inline]
    pub fn get_flag(&self, flag: u8) -> bool {
        (self.status & flag) != 0
    }

    /// Set a specific flag to 1
    #[inline]
    pub fn set_flag(&mut self, flag: u8) {
        self.status |= flag;
    }

    /// Clear a specific flag (set to 0)
    #[inline]
    pub fn clear_flag(&mut self, flag: u8) {
        self.status &= !flag;
    }

    /// Update a flag based on a condition
    #[inline]
    pub fn update_flag(&mut self, flag: u8, condition: bool) {
        if condition {
            self.set_flag(flag);
        } else {
            self.clear_flag(flag);
        }
    }

    #[inline]
    pub fn get_carry(&self) -> bool {
        self.get_flag(flags::CARRY)
    }

    #[inline]
    pub fn get_zero(&self) -> bool {
        self.get_flag(flags::ZERO)
    }

    #[inline]
    pub fn get_interrupt_disable(&self) -> bool {
        self.get_flag(flags::INTERRUPT_DISABLE)
    }

    #[inline]
    pub fn get_decimal(&self) -> bool {
        self.get_flag(flags::DECIMAL)
    }

    #[inline]
    pub fn get_overflow(&self) -> bool {
        self.get_flag(flags::OVERFLOW)
    }

    #[inline]
    pub fn get_negative(&self) -> bool {
        self.get_flag(flags::NEGATIVE)
    }

    #[inline]
    pub fn set_carry(&mut self, value: bool) {
        self.update_flag(flags::CARRY, value);
    }

    #[inline]
    pub fn set_zero(&mut self, value: bool) {
        self.update_flag(flags::ZERO, value);
    }

    #[inline]
    pub fn set_interrupt_disable(&mut self, value: bool) {
        self.update_flag(flags::INTERRUPT_DISABLE, value);
    }

    #[inline]
    pub fn set_decimal(&mut self, value: bool) {
        self.update_flag(flags::DECIMAL, value);
    }

    #[inline]
    pub fn set_overflow(&mut self, value: bool) {
        self.update_flag(flags::OVERFLOW, value);
    }

    #[inline]
    pub fn set_negative(&mut self, value: bool) {
        self.update_flag(flags::NEGATIVE, value);
    }

    /// Update Zero and Negative flags based on a value
    /// This is a common pattern after load and arithmetic operations
    #[inline]
    pub fn update_zero_and_negative_flags(&mut self, value: u8) {
        self.set_zero(value == 0);
        self.set_negative((value & 0x80) != 0);
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
