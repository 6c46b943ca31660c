// Mapper 3 (CNROM) - Fixed PRG-ROM with switchable CHR-ROM
//
// Memory Layout:
// - CPU $8000-$BFFF: First 16KB of PRG-ROM
// - CPU $C000-$FFFF: Last 16KB of PRG-ROM (or mirror if only 16KB total)
// - PPU $0000-$1FFF: 8KB switchable CHR-ROM bank
//
// Bank Switching:
// - Any write to $8000-$FFFF selects the CHR-ROM bank for $0000-$1FFF
//
// Games using Mapper 3:
// - Arkanoid
// - Paperboy
// - Q*bert

use super::{BankTarget, Board};
use crate::cartridge::{CHR_BANK_SIZE, PRG_BANK_SIZE};
use serde::{Deserialize, Serialize};

/// Mapper 3 implementation (CNROM)
///
/// The inverse of UNROM: fixed PRG and switchable CHR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cnrom {
    /// Currently selected CHR-ROM bank (for $0000-$1FFF)
    chr_bank: u8,
}

impl Cnrom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chr_bank(&self) -> u8 {
        self.chr_bank
    }
}

impl Board for Cnrom {
    fn initialize(&mut self) {
        self.chr_bank = 0;
    }

    fn check_address(&mut self, addr: u16, value: u8) -> bool {
        if addr < 0x8000 {
            return false;
        }
        self.chr_bank = value;
        true
    }

    fn switch_banks(&mut self, target: &mut BankTarget) {
        log::debug!("CNROM: CHR bank {}", self.chr_bank);
        target.map_chr(0x0000, CHR_BANK_SIZE, self.chr_bank as usize);
    }

    fn reset(&mut self, target: &mut BankTarget) {
        let last = target.prg_bank_count(PRG_BANK_SIZE).saturating_sub(1);
        target.map_prg(0x8000, PRG_BANK_SIZE, 0);
        target.map_prg(0xC000, PRG_BANK_SIZE, last);
        self.switch_banks(target);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{cartridge, Harness};
    use super::*;

    #[test]
    fn test_cnrom_reset() {
        let mut harness = Harness::new(cartridge(3, 1, 4));
        harness.reset(&mut Cnrom::new());

        assert_eq!(harness.prg_at(0x8000), 0);
        assert_eq!(harness.prg_at(0xC000), 0, "16KB PRG mirrored");
        assert_eq!(harness.chr_at(0x0000), 0);
        assert_eq!(harness.chr_at(0x1C00), 7);
    }

    #[test]
    fn test_cnrom_switches_chr() {
        let mut harness = Harness::new(cartridge(3, 2, 4));
        let mut board = Cnrom::new();
        harness.reset(&mut board);

        harness.write(&mut board, 0x8000, 2);
        assert_eq!(board.chr_bank(), 2);
        // 8KB bank 2 = 1KB banks 16..=23
        assert_eq!(harness.chr_at(0x0000), 16);
        assert_eq!(harness.chr_at(0x1FFF), 23);
        assert_eq!(harness.prg_at(0xC000), 2, "PRG untouched");
    }

    #[test]
    fn test_cnrom_bank_wraps() {
        let mut harness = Harness::new(cartridge(3, 2, 2));
        let mut board = Cnrom::new();
        harness.reset(&mut board);

        harness.write(&mut board, 0xC000, 3);
        assert_eq!(harness.chr_at(0x0000), 8);
    }
}
