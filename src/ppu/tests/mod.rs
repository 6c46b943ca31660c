//! PPU unit tests
//!
//! Organized by functionality: registers, memory, rendering, timing.

use super::*;
use crate::cartridge::Mirroring;

// ========================================
// Test Constants (PPU Register Addresses)
// ========================================

/// PPU Control Register ($2000) - Write only
pub(crate) const PPUCTRL: u16 = 0x2000;
/// PPU Mask Register ($2001) - Write only
pub(crate) const PPUMASK: u16 = 0x2001;
/// PPU Status Register ($2002) - Read only
pub(crate) const PPUSTATUS: u16 = 0x2002;
/// OAM Address Port ($2003) - Write only
pub(crate) const OAMADDR: u16 = 0x2003;
/// OAM Data Port ($2004) - Read/Write
pub(crate) const OAMDATA: u16 = 0x2004;
/// Scroll Position Register ($2005) - Write×2
pub(crate) const PPUSCROLL: u16 = 0x2005;
/// PPU Address Register ($2006) - Write×2
pub(crate) const PPUADDR: u16 = 0x2006;
/// PPU Data Port ($2007) - Read/Write
pub(crate) const PPUDATA: u16 = 0x2007;

// ========================================
// Test Helper Functions
// ========================================

/// Point v at `addr` through PPUADDR
pub(crate) fn set_address(ppu: &mut Ppu, addr: u16) {
    ppu.write_register(PPUADDR, (addr >> 8) as u8);
    ppu.write_register(PPUADDR, addr as u8);
}

/// Write a run of bytes through PPUDATA starting at `addr`
pub(crate) fn write_bytes(ppu: &mut Ppu, addr: u16, data: &[u8]) {
    set_address(ppu, addr);
    for &byte in data {
        ppu.write_register(PPUDATA, byte);
    }
}

/// Fill one 8x8 tile of the pattern table with a solid color (1-3)
pub(crate) fn solid_tile(ppu: &mut Ppu, table: u16, tile: u8, color: u8) {
    let low = if color & 1 != 0 { 0xFF } else { 0x00 };
    let high = if color & 2 != 0 { 0xFF } else { 0x00 };
    let base = table + tile as u16 * 16;
    let mut bytes = [low; 16];
    bytes[8..].fill(high);
    ppu.load_chr(base, &bytes);
}

/// Run the PPU through whole lines until it reaches `line`
pub(crate) fn advance_to(ppu: &mut Ppu, line: i16) {
    while ppu.scanline() != line {
        ppu.advance_line();
    }
}

// ========================================
// Test Modules
// ========================================

mod registers;
