// Mapper 1 (MMC1) - Serial-loaded banking registers
//
// Memory Layout:
// - CPU $6000-$7FFF: 8KB PRG-RAM (optional, battery-backed)
// - CPU $8000-$BFFF: 16KB PRG-ROM bank (switchable or fixed depending on mode)
// - CPU $C000-$FFFF: 16KB PRG-ROM bank (switchable or fixed depending on mode)
// - PPU $0000-$0FFF: 4KB CHR bank 0 (switchable)
// - PPU $1000-$1FFF: 4KB CHR bank 1 (switchable)
//
// Register Interface:
// All writes to $8000-$FFFF use a serial shift register:
// - Bit 7 set: Reset shift register and write counter, force PRG mode 3
// - Bit 0: Data bit to shift in (LSB first)
// - The fifth write copies the accumulated value to register (addr >> 13) & 3
//
// Control Register ($8000-$9FFF):
//   Bits 0-1: Mirroring (0=one-screen lower, 1=one-screen upper, 2=vertical, 3=horizontal)
//   Bits 2-3: PRG-ROM bank mode
//   Bit 4: CHR-ROM bank mode
//
// CHR Bank 0 ($A000-$BFFF):
//   Bits 0-4: CHR bank for PPU $0000-$0FFF (or $0000-$1FFF in 8KB mode)
//   Bit 4: Outer 256KB PRG bank on 512KB boards
//
// CHR Bank 1 ($C000-$DFFF):
//   Bits 0-4: CHR bank for PPU $1000-$1FFF (ignored in 8KB mode)
//
// PRG Bank ($E000-$FFFF):
//   Bits 0-3: PRG-ROM bank
//   Bit 4: PRG-RAM disable

use super::{BankTarget, Board};
use crate::cartridge::{Mirroring, PRG_BANK_SIZE};
use serde::{Deserialize, Serialize};

/// CHR bank size in 4KB mode
const CHR_BANK_SIZE: usize = 4 * 1024;

/// 16KB banks in one 256KB PRG segment
const PRG_SEGMENT_BANKS: usize = 16;

/// Control register value at power-on and after a reset write
const CONTROL_POWER_ON: u8 = 0x0C;

/// PRG-ROM banking mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrgBankMode {
    /// Switch 32KB at $8000, ignoring low bit of bank number
    Switch32KB,
    /// Fix first bank at $8000, switch 16KB bank at $C000
    FixFirst,
    /// Fix last bank at $C000, switch 16KB bank at $8000
    FixLast,
}

impl From<u8> for PrgBankMode {
    fn from(control: u8) -> Self {
        match (control >> 2) & 0b11 {
            0 | 1 => PrgBankMode::Switch32KB,
            2 => PrgBankMode::FixFirst,
            _ => PrgBankMode::FixLast,
        }
    }
}

/// CHR-ROM banking mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChrBankMode {
    /// Switch 8KB at a time
    Switch8KB,
    /// Switch two separate 4KB banks
    Switch4KB,
}

impl From<u8> for ChrBankMode {
    fn from(control: u8) -> Self {
        if control & 0x10 == 0 {
            ChrBankMode::Switch8KB
        } else {
            ChrBankMode::Switch4KB
        }
    }
}

/// Mapper 1 implementation (MMC1)
///
/// Used by The Legend of Zelda, Metroid and Mega Man 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mmc1 {
    /// Shift register for serial writes (5 bits)
    shift_register: u8,
    /// Bits shifted in so far (0-4)
    write_count: u8,
    /// Control, CHR bank 0, CHR bank 1, PRG bank
    registers: [u8; 4],
}

impl Mmc1 {
    pub fn new() -> Self {
        Mmc1 {
            shift_register: 0,
            write_count: 0,
            registers: [CONTROL_POWER_ON, 0, 0, 0],
        }
    }

    /// Internal registers: control, CHR bank 0, CHR bank 1, PRG bank
    pub fn registers(&self) -> [u8; 4] {
        self.registers
    }

    /// Reset the shift register (called when bit 7 of write value is set)
    fn reset_shift_register(&mut self) {
        self.shift_register = 0;
        self.write_count = 0;
        self.registers[0] |= CONTROL_POWER_ON;
    }

    /// Shift in bit 0 of `value`
    ///
    /// # Returns
    ///
    /// The five accumulated bits once the fifth write arrives
    fn write_shift_register(&mut self, value: u8) -> Option<u8> {
        self.shift_register >>= 1;
        self.shift_register |= (value & 1) << 4;
        self.write_count += 1;

        if self.write_count < 5 {
            return None;
        }

        let loaded = self.shift_register;
        self.shift_register = 0;
        self.write_count = 0;
        Some(loaded)
    }

    fn mirroring(&self) -> Mirroring {
        match self.registers[0] & 0b11 {
            0 => Mirroring::SingleScreenA,
            1 => Mirroring::SingleScreenB,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        }
    }

    fn map_prg(&self, target: &mut BankTarget) {
        let total = target.prg_bank_count(PRG_BANK_SIZE);
        let segment_banks = total.clamp(1, PRG_SEGMENT_BANKS);

        // 512KB boards take the outer 256KB segment from CHR bank 0 bit 4
        let outer = if total > PRG_SEGMENT_BANKS {
            (self.registers[1] as usize & 0x10) / 0x10 * PRG_SEGMENT_BANKS
        } else {
            0
        };

        let bank = (self.registers[3] & 0x0F) as usize;
        let (low, high) = match PrgBankMode::from(self.registers[0]) {
            PrgBankMode::Switch32KB => (bank & !1, bank | 1),
            PrgBankMode::FixFirst => (0, bank),
            PrgBankMode::FixLast => (bank, segment_banks - 1),
        };

        target.map_prg(0x8000, PRG_BANK_SIZE, outer + low % segment_banks);
        target.map_prg(0xC000, PRG_BANK_SIZE, outer + high % segment_banks);
    }

    fn map_chr(&self, target: &mut BankTarget) {
        match ChrBankMode::from(self.registers[0]) {
            ChrBankMode::Switch8KB => {
                let bank = (self.registers[1] >> 1) as usize;
                target.map_chr(0x0000, CHR_BANK_SIZE * 2, bank);
            }
            ChrBankMode::Switch4KB => {
                target.map_chr(0x0000, CHR_BANK_SIZE, self.registers[1] as usize);
                target.map_chr(0x1000, CHR_BANK_SIZE, self.registers[2] as usize);
            }
        }
    }
}

impl Default for Mmc1 {
    fn default() -> Self {
        Self::new()
    }
}

impl Board for Mmc1 {
    fn initialize(&mut self) {
        *self = Self::new();
    }

    fn check_address(&mut self, addr: u16, value: u8) -> bool {
        if addr < 0x8000 {
            return false;
        }

        if value & 0x80 != 0 {
            self.reset_shift_register();
            return true;
        }

        match self.write_shift_register(value) {
            Some(loaded) => {
                self.registers[((addr >> 13) & 0b11) as usize] = loaded;
                true
            }
            None => false,
        }
    }

    fn switch_banks(&mut self, target: &mut BankTarget) {
        log::debug!(
            "MMC1: control={:05b} chr0={:02X} chr1={:02X} prg={:02X}",
            self.registers[0],
            self.registers[1],
            self.registers[2],
            self.registers[3]
        );

        target.set_mirroring(self.mirroring());
        self.map_prg(target);
        self.map_chr(target);
        target.set_sram(self.registers[3] & 0x10 == 0, false);
    }

    fn reset(&mut self, target: &mut BankTarget) {
        self.switch_banks(target);
    }
}
