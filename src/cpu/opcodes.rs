// Opcodes - static instruction descriptor table
//
// Every one of the 256 opcode slots carries a descriptor. Slots whose
// behaviour is unstable on real hardware (JAM, XAA, LXA, AHX, TAS, SHX,
// SHY) are present for disassembly but report `is_implemented() == false`.

use super::addressing::AddressingMode;
use super::CpuError;

/// Instruction mnemonics, official and undocumented
#[rustfmt::skip]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    // Official
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,

    // Stable undocumented
    Lax, Sax, Dcp, Isb, Slo, Rla, Sre, Rra, Anc, Alr, Arr, Axs, Las,

    // Unstable undocumented (no semantics)
    Jam, Xaa, Lxa, Ahx, Tas, Shx, Shy,
}

impl Mnemonic {
    /// Whether the core can execute this mnemonic
    pub const fn is_implemented(self) -> bool {
        !matches!(
            self,
            Mnemonic::Jam
                | Mnemonic::Xaa
                | Mnemonic::Lxa
                | Mnemonic::Ahx
                | Mnemonic::Tas
                | Mnemonic::Shx
                | Mnemonic::Shy
        )
    }

    /// Upper-case assembler name
    pub const fn name(self) -> &'static str {
        match self {
            Mnemonic::Adc => "ADC",
            Mnemonic::And => "AND",
            Mnemonic::Asl => "ASL",
            Mnemonic::Bcc => "BCC",
            Mnemonic::Bcs => "BCS",
            Mnemonic::Beq => "BEQ",
            Mnemonic::Bit => "BIT",
            Mnemonic::Bmi => "BMI",
            Mnemonic::Bne => "BNE",
            Mnemonic::Bpl => "BPL",
            Mnemonic::Brk => "BRK",
            Mnemonic::Bvc => "BVC",
            Mnemonic::Bvs => "BVS",
            Mnemonic::Clc => "CLC",
            Mnemonic::Cld => "CLD",
            Mnemonic::Cli => "CLI",
            Mnemonic::Clv => "CLV",
            Mnemonic::Cmp => "CMP",
            Mnemonic::Cpx => "CPX",
            Mnemonic::Cpy => "CPY",
            Mnemonic::Dec => "DEC",
            Mnemonic::Dex => "DEX",
            Mnemonic::Dey => "DEY",
            Mnemonic::Eor => "EOR",
            Mnemonic::Inc => "INC",
            Mnemonic::Inx => "INX",
            Mnemonic::Iny => "INY",
            Mnemonic::Jmp => "JMP",
            Mnemonic::Jsr => "JSR",
            Mnemonic::Lda => "LDA",
            Mnemonic::Ldx => "LDX",
            Mnemonic::Ldy => "LDY",
            Mnemonic::Lsr => "LSR",
            Mnemonic::Nop => "NOP",
            Mnemonic::Ora => "ORA",
            Mnemonic::Pha => "PHA",
            Mnemonic::Php => "PHP",
            Mnemonic::Pla => "PLA",
            Mnemonic::Plp => "PLP",
            Mnemonic::Rol => "ROL",
            Mnemonic::Ror => "ROR",
            Mnemonic::Rti => "RTI",
            Mnemonic::Rts => "RTS",
            Mnemonic::Sbc => "SBC",
            Mnemonic::Sec => "SEC",
            Mnemonic::Sed => "SED",
            Mnemonic::Sei => "SEI",
            Mnemonic::Sta => "STA",
            Mnemonic::Stx => "STX",
            Mnemonic::Sty => "STY",
            Mnemonic::Tax => "TAX",
            Mnemonic::Tay => "TAY",
            Mnemonic::Tsx => "TSX",
            Mnemonic::Txa => "TXA",
            Mnemonic::Txs => "TXS",
            Mnemonic::Tya => "TYA",
            Mnemonic::Lax => "LAX",
            Mnemonic::Sax => "SAX",
            Mnemonic::Dcp => "DCP",
            Mnemonic::Isb => "ISB",
            Mnemonic::Slo => "SLO",
            Mnemonic::Rla => "RLA",
            Mnemonic::Sre => "SRE",
            Mnemonic::Rra => "RRA",
            Mnemonic::Anc => "ANC",
            Mnemonic::Alr => "ALR",
            Mnemonic::Arr => "ARR",
            Mnemonic::Axs => "AXS",
            Mnemonic::Las => "LAS",
            Mnemonic::Jam => "JAM",
            Mnemonic::Xaa => "XAA",
            Mnemonic::Lxa => "LXA",
            Mnemonic::Ahx => "AHX",
            Mnemonic::Tas => "TAS",
            Mnemonic::Shx => "SHX",
            Mnemonic::Shy => "SHY",
        }
    }
}

/// Rule for cycles added on top of the base count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraCycles {
    /// Fixed cost
    None,
    /// +1 when indexing crosses a page
    PageCross,
    /// +1 when taken, +2 when the target is on another page
    Branch,
}

/// Immutable descriptor for one opcode slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: u8,
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
    /// Total size including the opcode byte
    pub bytes: u8,
    /// Base cycle count
    pub cycles: u8,
    pub extra: ExtraCycles,
    /// False for undocumented opcodes (shown with a `*` prefix in traces)
    pub official: bool,
}

/// Look up the raw descriptor for an opcode, implemented or not
#[inline]
pub fn lookup(opcode: u8) -> &'static Instruction {
    &OPCODE_TABLE[opcode as usize]
}

/// Look up an executable descriptor
///
/// # Errors
///
/// Returns `CpuError::UnimplementedOpcode` for slots without semantics.
/// The `pc` field is 0 because the table has no notion of location;
/// [`crate::cpu::Cpu::step`] fills in the real address.
pub fn describe(opcode: u8) -> Result<&'static Instruction, CpuError> {
    let instruction = lookup(opcode);
    if instruction.mnemonic.is_implemented() {
        Ok(instruction)
    } else {
        Err(CpuError::UnimplementedOpcode { opcode, pc: 0 })
    }
}

// ========================================
// Table Construction
// ========================================

use AddressingMode::{
    Absolute as Abs, AbsoluteX as Abx, AbsoluteY as Aby, Accumulator as Acc, Immediate as Imm,
    Implied as Imp, IndexedIndirect as Izx, Indirect as Ind, IndirectIndexed as Izy,
    Relative as Rel, ZeroPage as Zp, ZeroPageX as Zpx, ZeroPageY as Zpy,
};
use ExtraCycles::{Branch as B, None as N, PageCross as P};
use Mnemonic::*;

const fn op(opcode: u8, mnemonic: Mnemonic, mode: AddressingMode, cycles: u8, extra: ExtraCycles) -> Instruction {
    Instruction {
        opcode,
        mnemonic,
        mode,
        bytes: mode.size(),
        cycles,
        extra,
        official: true,
    }
}

const fn un(opcode: u8, mnemonic: Mnemonic, mode: AddressingMode, cycles: u8, extra: ExtraCycles) -> Instruction {
    Instruction {
        official: false,
        ..op(opcode, mnemonic, mode, cycles, extra)
    }
}

/// BRK skips a padding byte, so its descriptor is two bytes long
const BRK: Instruction = Instruction {
    bytes: 2,
    ..op(0x00, Brk, Imp, 7, N)
};

/// Descriptor table indexed by opcode
#[rustfmt::skip]
pub static OPCODE_TABLE: [Instruction; 256] = [
    // 0x00
    BRK,                      op(0x01, Ora, Izx, 6, N), un(0x02, Jam, Imp, 2, N), un(0x03, Slo, Izx, 8, N),
    un(0x04, Nop, Zp, 3, N),  op(0x05, Ora, Zp, 3, N),  op(0x06, Asl, Zp, 5, N),  un(0x07, Slo, Zp, 5, N),
    op(0x08, Php, Imp, 3, N), op(0x09, Ora, Imm, 2, N), op(0x0A, Asl, Acc, 2, N), un(0x0B, Anc, Imm, 2, N),
    un(0x0C, Nop, Abs, 4, N), op(0x0D, Ora, Abs, 4, N), op(0x0E, Asl, Abs, 6, N), un(0x0F, Slo, Abs, 6, N),
    // 0x10
    op(0x10, Bpl, Rel, 2, B), op(0x11, Ora, Izy, 5, P), un(0x12, Jam, Imp, 2, N), un(0x13, Slo, Izy, 8, N),
    un(0x14, Nop, Zpx, 4, N), op(0x15, Ora, Zpx, 4, N), op(0x16, Asl, Zpx, 6, N), un(0x17, Slo, Zpx, 6, N),
    op(0x18, Clc, Imp, 2, N), op(0x19, Ora, Aby, 4, P), un(0x1A, Nop, Imp, 2, N), un(0x1B, Slo, Aby, 7, N),
    un(0x1C, Nop, Abx, 4, P), op(0x1D, Ora, Abx, 4, P), op(0x1E, Asl, Abx, 7, N), un(0x1F, Slo, Abx, 7, N),
    // 0x20
    op(0x20, Jsr, Abs, 6, N), op(0x21, And, Izx, 6, N), un(0x22, Jam, Imp, 2, N), un(0x23, Rla, Izx, 8, N),
    op(0x24, Bit, Zp, 3, N),  op(0x25, And, Zp, 3, N),  op(0x26, Rol, Zp, 5, N),  un(0x27, Rla, Zp, 5, N),
    op(0x28, Plp, Imp, 4, N), op(0x29, And, Imm, 2, N), op(0x2A, Rol, Acc, 2, N), un(0x2B, Anc, Imm, 2, N),
    op(0x2C, Bit, Abs, 4, N), op(0x2D, And, Abs, 4, N), op(0x2E, Rol, Abs, 6, N), un(0x2F, Rla, Abs, 6, N),
    // 0x30
    op(0x30, Bmi, Rel, 2, B), op(0x31, And, Izy, 5, P), un(0x32, Jam, Imp, 2, N), un(0x33, Rla, Izy, 8, N),
    un(0x34, Nop, Zpx, 4, N), op(0x35, And, Zpx, 4, N), op(0x36, Rol, Zpx, 6, N), un(0x37, Rla, Zpx, 6, N),
    op(0x38, Sec, Imp, 2, N), op(0x39, And, Aby, 4, P), un(0x3A, Nop, Imp, 2, N), un(0x3B, Rla, Aby, 7, N),
    un(0x3C, Nop, Abx, 4, P), op(0x3D, And, Abx, 4, P), op(0x3E, Rol, Abx, 7, N), un(0x3F, Rla, Abx, 7, N),
    // 0x40
    op(0x40, Rti, Imp, 6, N), op(0x41, Eor, Izx, 6, N), un(0x42, Jam, Imp, 2, N), un(0x43, Sre, Izx, 8, N),
    un(0x44, Nop, Zp, 3, N),  op(0x45, Eor, Zp, 3, N),  op(0x46, Lsr, Zp, 5, N),  un(0x47, Sre, Zp, 5, N),
    op(0x48, Pha, Imp, 3, N), op(0x49, Eor, Imm, 2, N), op(0x4A, Lsr, Acc, 2, N), un(0x4B, Alr, Imm, 2, N),
    op(0x4C, Jmp, Abs, 3, N), op(0x4D, Eor, Abs, 4, N), op(0x4E, Lsr, Abs, 6, N), un(0x4F, Sre, Abs, 6, N),
    // 0x50
    op(0x50, Bvc, Rel, 2, B), op(0x51, Eor, Izy, 5, P), un(0x52, Jam, Imp, 2, N), un(0x53, Sre, Izy, 8, N),
    un(0x54, Nop, Zpx, 4, N), op(0x55, Eor, Zpx, 4, N), op(0x56, Lsr, Zpx, 6, N), un(0x57, Sre, Zpx, 6, N),
    op(0x58, Cli, Imp, 2, N), op(0x59, Eor, Aby, 4, P), un(0x5A, Nop, Imp, 2, N), un(0x5B, Sre, Aby, 7, N),
    un(0x5C, Nop, Abx, 4, P), op(0x5D, Eor, Abx, 4, P), op(0x5E, Lsr, Abx, 7, N), un(0x5F, Sre, Abx, 7, N),
    // 0x60
    op(0x60, Rts, Imp, 6, N), op(0x61, Adc, Izx, 6, N), un(0x62, Jam, Imp, 2, N), un(0x63, Rra, Izx, 8, N),
    un(0x64, Nop, Zp, 3, N),  op(0x65, Adc, Zp, 3, N),  op(0x66, Ror, Zp, 5, N),  un(0x67, Rra, Zp, 5, N),
    op(0x68, Pla, Imp, 4, N), op(0x69, Adc, Imm, 2, N), op(0x6A, Ror, Acc, 2, N), un(0x6B, Arr, Imm, 2, N),
    op(0x6C, Jmp, Ind, 5, N), op(0x6D, Adc, Abs, 4, N), op(0x6E, Ror, Abs, 6, N), un(0x6F, Rra, Abs, 6, N),
    // 0x70
    op(0x70, Bvs, Rel, 2, B), op(0x71, Adc, Izy, 5, P), un(0x72, Jam, Imp, 2, N), un(0x73, Rra, Izy, 8, N),
    un(0x74, Nop, Zpx, 4, N), op(0x75, Adc, Zpx, 4, N), op(0x76, Ror, Zpx, 6, N), un(0x77, Rra, Zpx, 6, N),
    op(0x78, Sei, Imp, 2, N), op(0x79, Adc, Aby, 4, P), un(0x7A, Nop, Imp, 2, N), un(0x7B, Rra, Aby, 7, N),
    un(0x7C, Nop, Abx, 4, P), op(0x7D, Adc, Abx, 4, P), op(0x7E, Ror, Abx, 7, N), un(0x7F, Rra, Abx, 7, N),
    // 0x80
    un(0x80, Nop, Imm, 2, N), op(0x81, Sta, Izx, 6, N), un(0x82, Nop, Imm, 2, N), un(0x83, Sax, Izx, 6, N),
    op(0x84, Sty, Zp, 3, N),  op(0x85, Sta, Zp, 3, N),  op(0x86, Stx, Zp, 3, N),  un(0x87, Sax, Zp, 3, N),
    op(0x88, Dey, Imp, 2, N), un(0x89, Nop, Imm, 2, N), op(0x8A, Txa, Imp, 2, N), un(0x8B, Xaa, Imm, 2, N),
    op(0x8C, Sty, Abs, 4, N), op(0x8D, Sta, Abs, 4, N), op(0x8E, Stx, Abs, 4, N), un(0x8F, Sax, Abs, 4, N),
    // 0x90
    op(0x90, Bcc, Rel, 2, B), op(0x91, Sta, Izy, 6, N), un(0x92, Jam, Imp, 2, N), un(0x93, Ahx, Izy, 6, N),
    op(0x94, Sty, Zpx, 4, N), op(0x95, Sta, Zpx, 4, N), op(0x96, Stx, Zpy, 4, N), un(0x97, Sax, Zpy, 4, N),
    op(0x98, Tya, Imp, 2, N), op(0x99, Sta, Aby, 5, N), op(0x9A, Txs, Imp, 2, N), un(0x9B, Tas, Aby, 5, N),
    un(0x9C, Shy, Abx, 5, N), op(0x9D, Sta, Abx, 5, N), un(0x9E, Shx, Aby, 5, N), un(0x9F, Ahx, Aby, 5, N),
    // 0xA0
    op(0xA0, Ldy, Imm, 2, N), op(0xA1, Lda, Izx, 6, N), op(0xA2, Ldx, Imm, 2, N), un(0xA3, Lax, Izx, 6, N),
    op(0xA4, Ldy, Zp, 3, N),  op(0xA5, Lda, Zp, 3, N),  op(0xA6, Ldx, Zp, 3, N),  un(0xA7, Lax, Zp, 3, N),
    op(0xA8, Tay, Imp, 2, N), op(0xA9, Lda, Imm, 2, N), op(0xAA, Tax, Imp, 2, N), un(0xAB, Lxa, Imm, 2, N),
    op(0xAC, Ldy, Abs, 4, N), op(0xAD, Lda, Abs, 4, N), op(0xAE, Ldx, Abs, 4, N), un(0xAF, Lax, Abs, 4, N),
    // 0xB0
    op(0xB0, Bcs, Rel, 2, B), op(0xB1, Lda, Izy, 5, P), un(0xB2, Jam, Imp, 2, N), un(0xB3, Lax, Izy, 5, P),
    op(0xB4, Ldy, Zpx, 4, N), op(0xB5, Lda, Zpx, 4, N), op(0xB6, Ldx, Zpy, 4, N), un(0xB7, Lax, Zpy, 4, N),
    op(0xB8, Clv, Imp, 2, N), op(0xB9, Lda, Aby, 4, P), op(0xBA, Tsx, Imp, 2, N), un(0xBB, Las, Aby, 4, P),
    op(0xBC, Ldy, Abx, 4, P), op(0xBD, Lda, Abx, 4, P), op(0xBE, Ldx, Aby, 4, P), un(0xBF, Lax, Aby, 4, P),
    // 0xC0
    op(0xC0, Cpy, Imm, 2, N), op(0xC1, Cmp, Izx, 6, N), un(0xC2, Nop, Imm, 2, N), un(0xC3, Dcp, Izx, 8, N),
    op(0xC4, Cpy, Zp, 3, N),  op(0xC5, Cmp, Zp, 3, N),  op(0xC6, Dec, Zp, 5, N),  un(0xC7, Dcp, Zp, 5, N),
    op(0xC8, Iny, Imp, 2, N), op(0xC9, Cmp, Imm, 2, N), op(0xCA, Dex, Imp, 2, N), un(0xCB, Axs, Imm, 2, N),
    op(0xCC, Cpy, Abs, 4, N), op(0xCD, Cmp, Abs, 4, N), op(0xCE, Dec, Abs, 6, N), un(0xCF, Dcp, Abs, 6, N),
    // 0xD0
    op(0xD0, Bne, Rel, 2, B), op(0xD1, Cmp, Izy, 5, P), un(0xD2, Jam, Imp, 2, N), un(0xD3, Dcp, Izy, 8, N),
    un(0xD4, Nop, Zpx, 4, N), op(0xD5, Cmp, Zpx, 4, N), op(0xD6, Dec, Zpx, 6, N), un(0xD7, Dcp, Zpx, 6, N),
    op(0xD8, Cld, Imp, 2, N), op(0xD9, Cmp, Aby, 4, P), un(0xDA, Nop, Imp, 2, N), un(0xDB, Dcp, Aby, 7, N),
    un(0xDC, Nop, Abx, 4, P), op(0xDD, Cmp, Abx, 4, P), op(0xDE, Dec, Abx, 7, N), un(0xDF, Dcp, Abx, 7, N),
    // 0xE0
    op(0xE0, Cpx, Imm, 2, N), op(0xE1, Sbc, Izx, 6, N), un(0xE2, Nop, Imm, 2, N), un(0xE3, Isb, Izx, 8, N),
    op(0xE4, Cpx, Zp, 3, N),  op(0xE5, Sbc, Zp, 3, N),  op(0xE6, Inc, Zp, 5, N),  un(0xE7, Isb, Zp, 5, N),
    op(0xE8, Inx, Imp, 2, N), op(0xE9, Sbc, Imm, 2, N), op(0xEA, Nop, Imp, 2, N), un(0xEB, Sbc, Imm, 2, N),
    op(0xEC, Cpx, Abs, 4, N), op(0xED, Sbc, Abs, 4, N), op(0xEE, Inc, Abs, 6, N), un(0xEF, Isb, Abs, 6, N),
    // 0xF0
    op(0xF0, Beq, Rel, 2, B), op(0xF1, Sbc, Izy, 5, P), un(0xF2, Jam, Imp, 2, N), un(0xF3, Isb, Izy, 8, N),
    un(0xF4, Nop, Zpx, 4, N), op(0xF5, Sbc, Zpx, 4, N), op(0xF6, Inc, Zpx, 6, N), un(0xF7, Isb, Zpx, 6, N),
    op(0xF8, Sed, Imp, 2, N), op(0xF9, Sbc, Aby, 4, P), un(0xFA, Nop, Imp, 2, N), un(0xFB, Isb, Aby, 7, N),
    un(0xFC, Nop, Abx, 4, P), op(0xFD, Sbc, Abx, 4, P), op(0xFE, Inc, Abx, 7, N), un(0xFF, Isb, Abx, 7, N),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_slot_matches_its_index() {
        for (index, instruction) in OPCODE_TABLE.iter().enumerate() {
            assert_eq!(
                instruction.opcode as usize, index,
                "slot {:#04X} holds descriptor for {:#04X}",
                index, instruction.opcode
            );
        }
    }

    #[test]
    fn test_every_slot_has_sane_size_and_cycles() {
        for instruction in OPCODE_TABLE.iter() {
            assert!(
                (1..=3).contains(&instruction.bytes),
                "{:#04X} has size {}",
                instruction.opcode,
                instruction.bytes
            );
            assert!(
                (2..=8).contains(&instruction.cycles),
                "{:#04X} has {} cycles",
                instruction.opcode,
                instruction.cycles
            );
        }
    }

    #[test]
    fn test_official_opcode_count() {
        let official = OPCODE_TABLE.iter().filter(|i| i.official).count();
        assert_eq!(official, 151);
    }

    #[test]
    fn test_unimplemented_slots_are_enumerable() {
        let missing: Vec<u8> = OPCODE_TABLE
            .iter()
            .filter(|i| !i.mnemonic.is_implemented())
            .map(|i| i.opcode)
            .collect();

        // 12 JAM slots plus XAA, LXA, 2x AHX, TAS, SHX, SHY
        assert_eq!(missing.len(), 19);
        assert!(missing.contains(&0x02));
        assert!(missing.contains(&0x8B));
        assert!(missing.contains(&0x9C));
        assert!(missing.iter().all(|&op| describe(op).is_err()));
    }

    #[test]
    fn test_describe_known_slots() {
        let lda = describe(0xA9).unwrap();
        assert_eq!(lda.mnemonic, Mnemonic::Lda);
        assert_eq!(lda.mode, AddressingMode::Immediate);
        assert_eq!(lda.bytes, 2);
        assert_eq!(lda.cycles, 2);

        let jmp = describe(0x6C).unwrap();
        assert_eq!(jmp.mode, AddressingMode::Indirect);
        assert_eq!(jmp.bytes, 3);
        assert_eq!(jmp.cycles, 5);

        let brk = describe(0x00).unwrap();
        assert_eq!(brk.bytes, 2, "BRK carries a padding byte");

        let sbc_alias = describe(0xEB).unwrap();
        assert_eq!(sbc_alias.mnemonic, Mnemonic::Sbc);
        assert!(!sbc_alias.official);
    }

    #[test]
    fn test_extra_cycle_rules() {
        assert_eq!(lookup(0xBD).extra, ExtraCycles::PageCross, "LDA abs,X");
        assert_eq!(lookup(0x9D).extra, ExtraCycles::None, "STA abs,X is fixed");
        assert_eq!(lookup(0xD0).extra, ExtraCycles::Branch, "BNE");
        assert_eq!(lookup(0x1E).extra, ExtraCycles::None, "ASL abs,X is fixed");
    }

    #[test]
    fn test_unimplemented_error_carries_opcode() {
        assert_eq!(
            describe(0x02),
            Err(CpuError::UnimplementedOpcode { opcode: 0x02, pc: 0 })
        );
    }
}
