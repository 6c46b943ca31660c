// Instructions module for 6502 CPU
// This module organizes CPU instructions by semantic grouping

pub mod arithmetic;
pub mod branch;
pub mod compare;
pub mod flags;
pub mod jump_subroutine;
pub mod load_store;
pub mod logic;
pub mod miscellaneous;
pub mod shift_rotate;
pub mod stack;
pub mod transfer;
pub mod unofficial;

use crate::bus::Bus;
use crate::cpu::addressing::{AddressingResult, Operand};

impl crate::cpu::Cpu {
    // ========================================
    // Helper Functions
    // ========================================

    /// Read the value an instruction operates on
    ///
    /// Immediate operands come straight from the instruction stream,
    /// memory operands are read through the bus and operand-less modes
    /// (accumulator) yield A.
    #[inline]
    pub(crate) fn read_operand(&self, bus: &mut Bus, addr_result: &AddressingResult) -> u8 {
        match addr_result.operand {
            Operand::Immediate(value) => value,
            Operand::Address(address) => bus.read(address),
            Operand::None => self.a,
        }
    }

    /// Read-modify-write helper shared by shifts, INC/DEC and the
    /// undocumented combined opcodes
    ///
    /// In accumulator mode the result goes back into A, otherwise it is
    /// written to the effective address.
    ///
    /// # Returns
    /// The value that was stored
    #[inline]
    pub(crate) fn read_modify_write<F>(
        &mut self,
        bus: &mut Bus,
        addr_result: &AddressingResult,
        modify: F,
    ) -> u8
    where
        F: FnOnce(&mut Self, u8) -> u8,
    {
        match addr_result.operand {
            Operand::Address(address) => {
                let value = bus.read(address);
                let result = modify(self, value);
                bus.write(address, result);
                result
            }
            _ => {
                let value = self.a;
                let result = modify(self, value);
                self.a = result;
                result
            }
        }
    }
}
