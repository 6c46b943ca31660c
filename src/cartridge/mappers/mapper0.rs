// Mapper 0 (NROM) - no bank switching
//
// Memory Layout:
// - CPU $8000-$BFFF: First 16KB of PRG-ROM
// - CPU $C000-$FFFF: Last 16KB of PRG-ROM (or mirror of first 16KB if only 16KB total)
// - PPU $0000-$1FFF: 8KB CHR-ROM or CHR-RAM
//
// Variants:
// - NROM-128: 16KB PRG-ROM (mirrored to fill 32KB space)
// - NROM-256: 32KB PRG-ROM (no mirroring)

use super::{BankTarget, Board};
use crate::cartridge::{CHR_BANK_SIZE, PRG_BANK_SIZE};
use serde::{Deserialize, Serialize};

/// Mapper 0 implementation (NROM)
///
/// Used by Super Mario Bros., Donkey Kong and Balloon Fight. The banks are
/// mapped once on reset and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Nrom;

impl Board for Nrom {
    fn initialize(&mut self) {}

    fn check_address(&mut self, _addr: u16, _value: u8) -> bool {
        false
    }

    fn switch_banks(&mut self, target: &mut BankTarget) {
        let last = target.prg_bank_count(PRG_BANK_SIZE).saturating_sub(1);
        target.map_prg(0x8000, PRG_BANK_SIZE, 0);
        target.map_prg(0xC000, PRG_BANK_SIZE, last);
        target.map_chr(0x0000, CHR_BANK_SIZE, 0);
    }

    fn reset(&mut self, target: &mut BankTarget) {
        self.switch_banks(target);
    }
}
