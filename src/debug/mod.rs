// Debug module - Disassembly and CPU trace support
//
// The trace line itself is built by `Cpu::trace_line`; this module
// supplies the instruction text with its nestest-style operand
// annotations. All reads go through `Bus::peek`, so disassembling never
// disturbs device state.

pub mod disassembler;

pub use disassembler::{annotate, disassemble, disassemble_count, DisassembledInstruction};
