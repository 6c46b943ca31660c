// Mapper 4 (MMC3) - 8KB PRG / 1KB CHR banking with a scanline IRQ
//
// Memory Layout:
// - CPU $6000-$7FFF: 8KB PRG-RAM (optional, battery-backed in some games)
// - CPU $8000-$9FFF: 8KB PRG-ROM bank (R6 or second-to-last bank)
// - CPU $A000-$BFFF: 8KB PRG-ROM bank (R7)
// - CPU $C000-$DFFF: 8KB PRG-ROM bank (second-to-last bank or R6)
// - CPU $E000-$FFFF: 8KB PRG-ROM bank (fixed to last bank)
// - PPU $0000-$0FFF: two 2KB banks (R0, R1) or four 1KB banks (R2-R5)
// - PPU $1000-$1FFF: the other group
//
// Register Interface (decoded by addr & $E001):
// - $8000: Bank select
//   Bit 7: CHR A12 inversion (0 = 2KB banks at $0000, 1 = 2KB banks at $1000)
//   Bit 6: PRG-ROM bank mode (0 = $8000 switchable, 1 = $C000 switchable)
//   Bits 0-2: Bank register to update (R0-R7)
// - $8001: Bank data for the selected register
// - $A000: Mirroring (bit 0: 0 = vertical, 1 = horizontal)
// - $A001: PRG-RAM protect (bit 7: enable, bit 6: write protect)
// - $C000: IRQ latch (counter reload value)
// - $C001: IRQ reload (counter reloads on the next clock)
// - $E000: IRQ disable, also acknowledges a pending IRQ
// - $E001: IRQ enable

use super::{BankTarget, Board, Mmc3IrqMode, ScanlineEvent};
use crate::cartridge::Mirroring;
use serde::{Deserialize, Serialize};

/// PRG-ROM bank size (8KB)
const PRG_BANK_SIZE: usize = 8 * 1024;

/// CHR bank size (1KB)
const CHR_BANK_SIZE: usize = 1024;

/// Bank registers R0-R7 at power-on
const POWER_ON_BANKS: [u8; 8] = [0, 2, 4, 5, 6, 7, 0, 1];

/// Register written by a claimed CPU write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mmc3Action {
    BankSelect,
    BankData,
    Mirroring,
    SramProtect,
    IrqLatch,
    IrqReload,
    IrqDisable,
    IrqEnable,
}

impl Mmc3Action {
    /// Decode a register address ($8000-$FFFF)
    pub fn decode(addr: u16) -> Self {
        match addr & 0xE001 {
            0x8000 => Mmc3Action::BankSelect,
            0x8001 => Mmc3Action::BankData,
            0xA000 => Mmc3Action::Mirroring,
            0xA001 => Mmc3Action::SramProtect,
            0xC000 => Mmc3Action::IrqLatch,
            0xC001 => Mmc3Action::IrqReload,
            0xE000 => Mmc3Action::IrqDisable,
            _ => Mmc3Action::IrqEnable,
        }
    }
}

/// Mapper 4 implementation (MMC3)
///
/// Used by Super Mario Bros. 3, Mega Man 3-6 and Kirby's Adventure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mmc3 {
    /// Last register write awaiting `switch_banks`
    action: Option<(Mmc3Action, u8)>,

    /// Bank select register (which bank register to update)
    bank_select: u8,
    /// Bank data registers R0-R7
    bank_registers: [u8; 8],
    /// PRG-RAM protection (bit 7: enable, bit 6: write protect)
    sram_protect: u8,

    /// IRQ latch value (reload value for counter)
    irq_latch: u8,
    /// IRQ counter (decrements each clock)
    irq_counter: u8,
    /// Reload counter on next clock
    irq_reload: bool,
    irq_enabled: bool,
    /// IRQ output level, held until $E000 is written
    irq_pending: bool,
    irq_mode: Mmc3IrqMode,
}

impl Mmc3 {
    pub fn new(irq_mode: Mmc3IrqMode) -> Self {
        Mmc3 {
            action: None,
            bank_select: 0,
            bank_registers: POWER_ON_BANKS,
            sram_protect: 0,
            irq_latch: 0,
            irq_counter: 0,
            irq_reload: false,
            irq_enabled: false,
            irq_pending: false,
            irq_mode,
        }
    }

    pub fn bank_registers(&self) -> [u8; 8] {
        self.bank_registers
    }

    pub fn irq_counter(&self) -> u8 {
        self.irq_counter
    }

    pub fn irq_mode(&self) -> Mmc3IrqMode {
        self.irq_mode
    }

    /// PRG-ROM bank mode: true if $C000 is switchable
    fn prg_swap(&self) -> bool {
        self.bank_select & 0x40 != 0
    }

    /// CHR A12 inversion: true if the 2KB banks sit at $1000
    fn chr_inversion(&self) -> bool {
        self.bank_select & 0x80 != 0
    }

    fn map_prg(&self, target: &mut BankTarget) {
        let count = target.prg_bank_count(PRG_BANK_SIZE);
        let second_last = count.saturating_sub(2);
        let last = count.saturating_sub(1);
        let r6 = (self.bank_registers[6] & 0x3F) as usize;
        let r7 = (self.bank_registers[7] & 0x3F) as usize;

        let (low, high) = if self.prg_swap() {
            (second_last, r6)
        } else {
            (r6, second_last)
        };

        target.map_prg(0x8000, PRG_BANK_SIZE, low);
        target.map_prg(0xA000, PRG_BANK_SIZE, r7);
        target.map_prg(0xC000, PRG_BANK_SIZE, high);
        target.map_prg(0xE000, PRG_BANK_SIZE, last);
    }

    fn map_chr(&self, target: &mut BankTarget) {
        let (two_kb, one_kb) = if self.chr_inversion() {
            (0x1000, 0x0000)
        } else {
            (0x0000, 0x1000)
        };
        let r = self.bank_registers.map(|bank| bank as usize);

        // R0/R1: 2KB banks, low bit ignored
        target.map_chr(two_kb, CHR_BANK_SIZE, r[0] & !1);
        target.map_chr(two_kb + 0x0400, CHR_BANK_SIZE, r[0] | 1);
        target.map_chr(two_kb + 0x0800, CHR_BANK_SIZE, r[1] & !1);
        target.map_chr(two_kb + 0x0C00, CHR_BANK_SIZE, r[1] | 1);

        // R2-R5: 1KB banks
        for (slot, &bank) in r[2..6].iter().enumerate() {
            target.map_chr(one_kb + slot as u16 * 0x0400, CHR_BANK_SIZE, bank);
        }
    }

    /// Clock the IRQ counter once
    ///
    /// # Returns
    ///
    /// Whether this clock raised the IRQ
    fn clock_irq_counter(&mut self) -> bool {
        if self.irq_counter == 0 || self.irq_reload {
            self.irq_counter = self.irq_latch;
            self.irq_reload = false;
        } else {
            self.irq_counter -= 1;
        }

        if self.irq_counter == 0 && self.irq_enabled {
            self.irq_pending = true;
            return true;
        }
        false
    }
}

impl Board for Mmc3 {
    fn initialize(&mut self) {
        *self = Self::new(self.irq_mode);
    }

    fn check_address(&mut self, addr: u16, value: u8) -> bool {
        if addr < 0x8000 {
            return false;
        }
        self.action = Some((Mmc3Action::decode(addr), value));
        true
    }

    fn switch_banks(&mut self, target: &mut BankTarget) {
        let Some((action, value)) = self.action.take() else {
            return;
        };

        match action {
            Mmc3Action::BankSelect => {
                self.bank_select = value;
                self.map_prg(target);
                self.map_chr(target);
            }
            Mmc3Action::BankData => {
                let register = (self.bank_select & 0x07) as usize;
                self.bank_registers[register] = value;
                log::debug!("MMC3: R{} = {:02X}", register, value);
                if register >= 6 {
                    self.map_prg(target);
                } else {
                    self.map_chr(target);
                }
            }
            Mmc3Action::Mirroring => {
                let mirroring = if value & 0x01 != 0 {
                    Mirroring::Horizontal
                } else {
                    Mirroring::Vertical
                };
                target.set_mirroring(mirroring);
            }
            Mmc3Action::SramProtect => {
                self.sram_protect = value;
                target.set_sram(value & 0x80 != 0, value & 0x40 != 0);
            }
            Mmc3Action::IrqLatch => self.irq_latch = value,
            Mmc3Action::IrqReload => {
                self.irq_counter = 0;
                self.irq_reload = true;
            }
            Mmc3Action::IrqDisable => {
                self.irq_enabled = false;
                self.irq_pending = false;
            }
            Mmc3Action::IrqEnable => self.irq_enabled = true,
        }
    }

    fn reset(&mut self, target: &mut BankTarget) {
        self.map_prg(target);
        self.map_chr(target);
    }

    fn update(&mut self, event: &ScanlineEvent) -> bool {
        let clocks = match self.irq_mode {
            Mmc3IrqMode::Scanline => {
                let counted = (-1..=239).contains(&event.line) && event.rendering_enabled;
                counted as u32
            }
            Mmc3IrqMode::AddressLine => event.address_line_rises,
        };

        let mut raised = false;
        for _ in 0..clocks {
            raised |= self.clock_irq_counter();
        }
        if raised {
            log::debug!("MMC3: IRQ after line {}", event.line);
        }
        raised
    }

    fn irq_pending(&self) -> bool {
        self.irq_pending
    }
}
