// Cartridge module - cartridge image and mapper implementations
//
// A `Cartridge` is the parsed contents of a ROM file: header fields, PRG
// and CHR data and an optional trainer. Parsing files is left to the
// caller; `Cartridge::new` only validates that the pieces agree.

pub mod mappers;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// PRG-ROM bank size as counted by the header (16KB)
pub const PRG_BANK_SIZE: usize = 16 * 1024;

/// CHR-ROM bank size as counted by the header (8KB)
pub const CHR_BANK_SIZE: usize = 8 * 1024;

/// Trainer size
pub const TRAINER_SIZE: usize = 512;

/// Nametable mirroring modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mirroring {
    /// $2000=$2400 and $2800=$2C00 (vertical scrolling games)
    Horizontal,
    /// $2000=$2800 and $2400=$2C00 (horizontal scrolling games)
    Vertical,
    /// All four nametables use the first physical table
    SingleScreenA,
    /// All four nametables use the second physical table
    SingleScreenB,
    /// Four independent nametables (extra VRAM on the cartridge)
    FourScreen,
}

/// Errors for malformed cartridge images
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartridgeError {
    #[error("cartridge has no PRG-ROM")]
    NoPrgRom,

    #[error("PRG-ROM is {actual} bytes but the header declares {expected}")]
    PrgSizeMismatch { expected: usize, actual: usize },

    #[error("CHR-ROM is {actual} bytes but the header declares {expected}")]
    ChrSizeMismatch { expected: usize, actual: usize },

    #[error("trainer must be {TRAINER_SIZE} bytes, got {0}")]
    TrainerSize(usize),

    #[error("header declares a trainer but none was supplied")]
    MissingTrainer,
}

/// Header fields of a cartridge image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartridgeHeader {
    /// Number of 16KB PRG-ROM banks
    pub prg_banks: u8,
    /// Number of 8KB CHR-ROM banks (0 means the board has CHR-RAM)
    pub chr_banks: u8,
    /// iNES mapper number
    pub mapper_id: u8,
    pub vertical_mirroring: bool,
    pub four_screen: bool,
    pub trainer: bool,
    /// Battery-backed SRAM present
    pub battery: bool,
}

impl CartridgeHeader {
    /// Mirroring the board starts with
    pub fn mirroring(&self) -> Mirroring {
        if self.four_screen {
            Mirroring::FourScreen
        } else if self.vertical_mirroring {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        }
    }
}

/// Cartridge image handed to the core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cartridge {
    /// Number of 16KB PRG-ROM banks
    pub prg_banks: usize,
    /// Number of 8KB CHR-ROM banks
    pub chr_banks: usize,
    /// iNES mapper number
    pub mapper_id: u8,
    pub vertical_mirroring: bool,
    pub four_screen: bool,
    pub battery: bool,
    /// 512-byte trainer, copied to $7000 on reset
    pub trainer: Option<Vec<u8>>,
    pub prg_rom: Vec<u8>,
    /// Empty on CHR-RAM boards
    pub chr_rom: Vec<u8>,
}

impl Cartridge {
    /// Build a cartridge from header fields and data
    ///
    /// # Errors
    ///
    /// Returns a `CartridgeError` when the data sizes disagree with the
    /// header, so a malformed image never reaches the core.
    pub fn new(
        header: CartridgeHeader,
        prg_rom: Vec<u8>,
        chr_rom: Vec<u8>,
        trainer: Option<Vec<u8>>,
    ) -> Result<Self, CartridgeError> {
        if header.prg_banks == 0 || prg_rom.is_empty() {
            return Err(CartridgeError::NoPrgRom);
        }

        let expected = header.prg_banks as usize * PRG_BANK_SIZE;
        if prg_rom.len() != expected {
            return Err(CartridgeError::PrgSizeMismatch {
                expected,
                actual: prg_rom.len(),
            });
        }

        let expected = header.chr_banks as usize * CHR_BANK_SIZE;
        if chr_rom.len() != expected {
            return Err(CartridgeError::ChrSizeMismatch {
                expected,
                actual: chr_rom.len(),
            });
        }

        match (&trainer, header.trainer) {
            (Some(data), _) if data.len() != TRAINER_SIZE => {
                return Err(CartridgeError::TrainerSize(data.len()));
            }
            (None, true) => return Err(CartridgeError::MissingTrainer),
            _ => {}
        }

        Ok(Cartridge {
            prg_banks: header.prg_banks as usize,
            chr_banks: header.chr_banks as usize,
            mapper_id: header.mapper_id,
            vertical_mirroring: header.vertical_mirroring,
            four_screen: header.four_screen,
            battery: header.battery,
            trainer,
            prg_rom,
            chr_rom,
        })
    }

    /// Mirroring the board starts with
    pub fn mirroring(&self) -> Mirroring {
        if self.four_screen {
            Mirroring::FourScreen
        } else if self.vertical_mirroring {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        }
    }

    /// Whether pattern tables are RAM on this board
    pub fn has_chr_ram(&self) -> bool {
        self.chr_rom.is_empty()
    }
}
