// Mapper 2 (UNROM) - Switchable PRG-ROM with fixed CHR-RAM
//
// Memory Layout:
// - CPU $8000-$BFFF: 16KB switchable PRG-ROM bank
// - CPU $C000-$FFFF: 16KB fixed PRG-ROM bank (last bank)
// - PPU $0000-$1FFF: 8KB CHR-RAM
//
// Bank Switching:
// - Any write to $8000-$FFFF selects the PRG-ROM bank for $8000-$BFFF
// - Bank numbers past the end wrap
//
// Games using Mapper 2:
// - Mega Man
// - Castlevania
// - Contra

use super::{BankTarget, Board};
use crate::cartridge::{CHR_BANK_SIZE, PRG_BANK_SIZE};
use serde::{Deserialize, Serialize};

/// Mapper 2 implementation (UNROM)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Unrom {
    /// Currently selected PRG-ROM bank (for $8000-$BFFF)
    prg_bank: u8,
}

impl Unrom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prg_bank(&self) -> u8 {
        self.prg_bank
    }
}

impl Board for Unrom {
    fn initialize(&mut self) {
        self.prg_bank = 0;
    }

    fn check_address(&mut self, addr: u16, value: u8) -> bool {
        if addr < 0x8000 {
            return false;
        }
        self.prg_bank = value;
        true
    }

    fn switch_banks(&mut self, target: &mut BankTarget) {
        log::debug!("UNROM: PRG bank {} at $8000", self.prg_bank);
        target.map_prg(0x8000, PRG_BANK_SIZE, self.prg_bank as usize);
    }

    fn reset(&mut self, target: &mut BankTarget) {
        let last = target.prg_bank_count(PRG_BANK_SIZE).saturating_sub(1);
        target.map_prg(0x8000, PRG_BANK_SIZE, self.prg_bank as usize);
        target.map_prg(0xC000, PRG_BANK_SIZE, last);
        target.map_chr(0x0000, CHR_BANK_SIZE, 0);
    }
}
