// PPU memory access methods
//
// PPU Memory Map:
// $0000-$1FFF: Pattern tables (filled by mapper CHR bank copies)
// $2000-$2FFF: Nametables (folded by the mirroring mode)
// $3000-$3EFF: Mirror of $2000-$2EFF
// $3F00-$3F1F: Palette RAM (6-bit entries)
// $3F20-$3FFF: Mirrors of $3F00-$3F1F

use super::constants::NAMETABLE_SIZE;
use super::Ppu;
use crate::cartridge::Mirroring;

impl Ppu {
    /// Mirror nametable address based on mirroring mode
    ///
    /// The four logical nametables at $2000/$2400/$2800/$2C00 are folded
    /// onto physical tables. Four-screen boards use all four.
    ///
    /// # Arguments
    ///
    /// * `addr` - Nametable address ($2000-$3EFF)
    ///
    /// # Returns
    ///
    /// Index into VRAM ($2000-$2FFF)
    pub(super) fn mirror_nametable_addr(&self, addr: u16) -> usize {
        let addr = addr & 0x0FFF;
        let table = addr / NAMETABLE_SIZE;
        let offset = addr % NAMETABLE_SIZE;

        let physical = match self.mirroring {
            // $2000=$2400, $2800=$2C00
            Mirroring::Horizontal => table >> 1,
            // $2000=$2800, $2400=$2C00
            Mirroring::Vertical => table & 1,
            Mirroring::SingleScreenA => 0,
            Mirroring::SingleScreenB => 1,
            Mirroring::FourScreen => table,
        };

        (0x2000 + physical * NAMETABLE_SIZE + offset) as usize
    }

    /// Mirror palette address
    ///
    /// $3F10/$3F14/$3F18/$3F1C alias $3F00/$3F04/$3F08/$3F0C: sprite
    /// palette entry 0 is the shared background color.
    pub(super) fn mirror_palette_addr(&self, addr: u16) -> usize {
        let mut index = addr & 0x001F;
        if index >= 0x10 && index % 4 == 0 {
            index -= 0x10;
        }
        (0x3F00 + index) as usize
    }

    /// Read from PPU memory
    ///
    /// # Arguments
    ///
    /// * `addr` - PPU address; bits above $3FFF are ignored
    pub fn read_vram(&self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => self.vram[addr as usize],
            0x2000..=0x3EFF => self.vram[self.mirror_nametable_addr(addr)],
            _ => self.vram[self.mirror_palette_addr(addr)],
        }
    }

    /// Write to PPU memory
    ///
    /// Palette entries keep only their low 6 bits. Pattern-table writes
    /// land in VRAM, so CHR-RAM boards work without extra handling; on
    /// CHR-ROM boards they are overwritten by the next bank copy.
    pub fn write_vram(&mut self, addr: u16, value: u8) {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => self.vram[addr as usize] = value,
            0x2000..=0x3EFF => {
                let index = self.mirror_nametable_addr(addr);
                self.vram[index] = value;
            }
            _ => {
                let index = self.mirror_palette_addr(addr);
                self.vram[index] = value & 0x3F;
            }
        }
    }
}
