// Mappers module - cartridge banking hardware
//
// A mapper watches CPU writes. When it claims one (`check_address`), the bus
// lends it a `BankTarget` and the mapper copies the selected PRG banks into
// CPU memory and CHR banks into the PPU pattern tables (`switch_banks`).
//
// Supported boards:
// - mapper0.rs: NROM (0)
// - mapper1.rs: MMC1 (1)
// - mapper2.rs: UNROM (2)
// - mapper3.rs: CNROM (3)
// - mapper4.rs: MMC3 (4)

mod mapper0;
mod mapper1;
mod mapper2;
mod mapper3;
mod mapper4;

pub use mapper0::Nrom;
pub use mapper1::Mmc1;
pub use mapper2::Unrom;
pub use mapper3::Cnrom;
pub use mapper4::{Mmc3, Mmc3Action};

use super::{Cartridge, Mirroring};
use crate::bus::SramControl;
use crate::ppu::Ppu;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for mapper creation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapperError {
    /// The requested mapper number is not supported
    #[error("mapper {0} is not supported")]
    UnsupportedMapper(u8),

    /// The cartridge cannot work on this board
    #[error("invalid mapper configuration: {0}")]
    InvalidConfiguration(String),
}

/// How the MMC3 scanline counter is clocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mmc3IrqMode {
    /// Once per rendered scanline
    #[default]
    Scanline,
    /// On every rising edge of PPU address line A12
    AddressLine,
}

/// What the scheduler tells the mapper at the end of each scanline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanlineEvent {
    /// Scanline that just finished (-1 is the pre-render line)
    pub line: i16,
    /// Whether background or sprite rendering was on
    pub rendering_enabled: bool,
    /// A12 rising edges seen while the line was drawn
    pub address_line_rises: u32,
}

/// Everything a mapper may touch while switching banks
///
/// Built by the bus from disjoint borrows of its fields for the duration
/// of one `switch_banks` or `reset` call.
pub struct BankTarget<'a> {
    pub cartridge: &'a Cartridge,
    pub memory: &'a mut [u8],
    pub ppu: &'a mut Ppu,
    pub sram: &'a mut SramControl,
}

impl BankTarget<'_> {
    /// Number of `size`-byte PRG banks on the cartridge
    pub fn prg_bank_count(&self, size: usize) -> usize {
        self.cartridge.prg_rom.len() / size
    }

    /// Number of `size`-byte CHR banks on the cartridge (0 for CHR-RAM)
    pub fn chr_bank_count(&self, size: usize) -> usize {
        self.cartridge.chr_rom.len() / size
    }

    /// Copy PRG bank `bank` into CPU memory at `cpu_addr`
    ///
    /// The bank number wraps at the number of banks on the cartridge.
    pub fn map_prg(&mut self, cpu_addr: u16, size: usize, bank: usize) {
        let count = self.prg_bank_count(size);
        if count == 0 {
            return;
        }

        let start = (bank % count) * size;
        let dst = cpu_addr as usize;
        self.memory[dst..dst + size].copy_from_slice(&self.cartridge.prg_rom[start..start + size]);
    }

    /// Copy CHR bank `bank` into the pattern tables at `ppu_addr`
    ///
    /// Does nothing on CHR-RAM boards; their pattern data lives in VRAM.
    pub fn map_chr(&mut self, ppu_addr: u16, size: usize, bank: usize) {
        let count = self.chr_bank_count(size);
        if count == 0 {
            return;
        }

        let start = (bank % count) * size;
        self.ppu.load_chr(ppu_addr, &self.cartridge.chr_rom[start..start + size]);
    }

    /// Change nametable mirroring; four-screen boards ignore this
    pub fn set_mirroring(&mut self, mirroring: Mirroring) {
        if !self.cartridge.four_screen {
            self.ppu.force_mirroring(mirroring);
        }
    }

    /// Update the SRAM access flags
    pub fn set_sram(&mut self, enabled: bool, read_only: bool) {
        self.sram.enabled = enabled;
        self.sram.read_only = read_only;
    }
}

/// Behavior shared by every board
pub trait Board {
    /// Put the registers in their power-on state
    fn initialize(&mut self);

    /// Inspect a CPU write
    ///
    /// # Returns
    ///
    /// `true` when the write changed banking state and `switch_banks`
    /// must run before the write completes
    fn check_address(&mut self, addr: u16, value: u8) -> bool;

    /// Apply the banking state recorded by the last claimed write
    fn switch_banks(&mut self, target: &mut BankTarget);

    /// Map the initial banks (console reset)
    fn reset(&mut self, target: &mut BankTarget);

    /// Scanline notification from the scheduler
    ///
    /// # Returns
    ///
    /// Whether the board raised its IRQ line
    fn update(&mut self, _event: &ScanlineEvent) -> bool {
        false
    }

    /// Level of the board's IRQ output
    fn irq_pending(&self) -> bool {
        false
    }
}

/// The supported boards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mapper {
    Nrom(Nrom),
    Mmc1(Mmc1),
    Unrom(Unrom),
    Cnrom(Cnrom),
    Mmc3(Mmc3),
}

impl Mapper {
    /// Create the mapper for a cartridge
    ///
    /// # Arguments
    ///
    /// * `cartridge` - The cartridge to create a mapper for
    /// * `irq_mode` - How an MMC3 clocks its scanline counter
    ///
    /// # Errors
    ///
    /// Returns `MapperError::UnsupportedMapper` if the mapper number is not
    /// implemented, `MapperError::InvalidConfiguration` if the board cannot
    /// hold the cartridge data.
    pub fn new(cartridge: &Cartridge, irq_mode: Mmc3IrqMode) -> Result<Self, MapperError> {
        let mapper = match cartridge.mapper_id {
            0 => {
                if cartridge.prg_banks > 2 {
                    return Err(MapperError::InvalidConfiguration(format!(
                        "NROM holds at most 32KB of PRG-ROM, cartridge has {} banks",
                        cartridge.prg_banks
                    )));
                }
                Mapper::Nrom(Nrom)
            }
            1 => Mapper::Mmc1(Mmc1::new()),
            2 => Mapper::Unrom(Unrom::new()),
            3 => {
                if cartridge.has_chr_ram() {
                    return Err(MapperError::InvalidConfiguration(
                        "CNROM requires CHR-ROM".to_string(),
                    ));
                }
                Mapper::Cnrom(Cnrom::new())
            }
            4 => Mapper::Mmc3(Mmc3::new(irq_mode)),
            id => {
                log::error!("Unsupported mapper {}", id);
                return Err(MapperError::UnsupportedMapper(id));
            }
        };
        Ok(mapper)
    }

    /// iNES mapper number
    pub fn id(&self) -> u8 {
        match self {
            Mapper::Nrom(_) => 0,
            Mapper::Mmc1(_) => 1,
            Mapper::Unrom(_) => 2,
            Mapper::Cnrom(_) => 3,
            Mapper::Mmc3(_) => 4,
        }
    }

    /// Board name
    pub fn name(&self) -> &'static str {
        match self {
            Mapper::Nrom(_) => "NROM",
            Mapper::Mmc1(_) => "MMC1",
            Mapper::Unrom(_) => "UNROM",
            Mapper::Cnrom(_) => "CNROM",
            Mapper::Mmc3(_) => "MMC3",
        }
    }

    fn board(&self) -> &dyn Board {
        match self {
            Mapper::Nrom(board) => board,
            Mapper::Mmc1(board) => board,
            Mapper::Unrom(board) => board,
            Mapper::Cnrom(board) => board,
            Mapper::Mmc3(board) => board,
        }
    }

    fn board_mut(&mut self) -> &mut dyn Board {
        match self {
            Mapper::Nrom(board) => board,
            Mapper::Mmc1(board) => board,
            Mapper::Unrom(board) => board,
            Mapper::Cnrom(board) => board,
            Mapper::Mmc3(board) => board,
        }
    }
}

impl Board for Mapper {
    fn initialize(&mut self) {
        self.board_mut().initialize();
    }

    fn check_address(&mut self, addr: u16, value: u8) -> bool {
        self.board_mut().check_address(addr, value)
    }

    fn switch_banks(&mut self, target: &mut BankTarget) {
        self.board_mut().switch_banks(target);
    }

    fn reset(&mut self, target: &mut BankTarget) {
        self.board_mut().reset(target);
    }

    fn update(&mut self, event: &ScanlineEvent) -> bool {
        self.board_mut().update(event)
    }

    fn irq_pending(&self) -> bool {
        self.board().irq_pending()
    }
}
