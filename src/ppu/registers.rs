// PPU register access methods
//
// $2000 PPUCTRL   (write)
// $2001 PPUMASK   (write)
// $2002 PPUSTATUS (read)
// $2003 OAMADDR   (write)
// $2004 OAMDATA   (read/write)
// $2005 PPUSCROLL (write x2)
// $2006 PPUADDR   (write x2)
// $2007 PPUDATA   (read/write)
//
// Register numbers are taken from the low three bits of the address, so
// callers may pass either 0-7 or a full $2000-$3FFF CPU address.

use super::constants::*;
use super::Ppu;

impl Ppu {
    /// Read from a PPU register (with side effects)
    ///
    /// # Arguments
    ///
    /// * `addr` - Register number or CPU address ($2000-$3FFF)
    pub fn read_register(&mut self, addr: u16) -> u8 {
        match addr & 0x0007 {
            // PPUSTATUS
            2 => {
                let status = self.status_value();
                if !self.in_exempt_window() {
                    self.ppustatus &= !STATUS_VBLANK;
                    self.write_latch = false;
                }
                status
            }
            // OAMDATA
            4 => self.oam[self.oam_addr as usize],
            // PPUDATA
            7 => {
                let addr = self.v;
                let value = if addr & 0x3FFF >= 0x3F00 {
                    // Palette reads bypass the buffer; the buffer picks up
                    // the nametable byte underneath
                    self.read_buffer = self.read_vram(addr & 0x2FFF);
                    self.read_vram(addr)
                } else {
                    let buffered = self.read_buffer;
                    self.read_buffer = self.read_vram(addr);
                    buffered
                };
                self.increment_vram_address();
                value
            }
            // Write-only registers read back the last value on the bus
            _ => self.open_bus,
        }
    }

    /// Read a register without side effects
    ///
    /// Used by tracing and the disassembler.
    pub fn peek_register(&self, addr: u16) -> u8 {
        match addr & 0x0007 {
            2 => self.status_value(),
            4 => self.oam[self.oam_addr as usize],
            7 => {
                if self.v & 0x3FFF >= 0x3F00 {
                    self.read_vram(self.v)
                } else {
                    self.read_buffer
                }
            }
            _ => self.open_bus,
        }
    }

    /// Write to a PPU register
    ///
    /// # Arguments
    ///
    /// * `addr` - Register number or CPU address ($2000-$3FFF)
    /// * `value` - Value to write
    pub fn write_register(&mut self, addr: u16, value: u8) {
        self.open_bus = value;

        match addr & 0x0007 {
            // PPUCTRL
            0 => {
                let was_enabled = self.ppuctrl & CTRL_NMI_ENABLE != 0;
                self.ppuctrl = value;
                // t: ...GH.. ........ <- d: ......GH
                self.t = (self.t & 0xF3FF) | (((value & CTRL_NAMETABLE) as u16) << 10);

                if !was_enabled && value & CTRL_NMI_ENABLE != 0 && self.in_vblank() {
                    self.nmi_pending = true;
                }
            }
            // PPUMASK
            1 => self.ppumask = value,
            // PPUSTATUS is read-only
            2 => {}
            // OAMADDR
            3 => self.oam_addr = value,
            // OAMDATA
            4 => {
                self.oam[self.oam_addr as usize] = value;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            // PPUSCROLL
            5 => {
                if !self.write_latch {
                    // t: ....... ...ABCDE <- d: ABCDE...
                    // x:              FGH <- d: .....FGH
                    self.t = (self.t & 0xFFE0) | ((value >> 3) as u16);
                    self.fine_x = value & 0x07;
                } else {
                    // t: FGH..AB CDE..... <- d: ABCDEFGH
                    self.t = (self.t & 0x8FFF) | (((value & 0x07) as u16) << 12);
                    self.t = (self.t & 0xFC1F) | (((value & 0xF8) as u16) << 2);
                }
                self.write_latch = !self.write_latch;
            }
            // PPUADDR
            6 => {
                if !self.write_latch {
                    // t: .CDEFGH ........ <- d: ..CDEFGH (bit 14 cleared)
                    self.t = (self.t & 0x80FF) | (((value & 0x3F) as u16) << 8);
                } else {
                    // t: ....... ABCDEFGH <- d: ABCDEFGH, then v = t
                    self.t = (self.t & 0xFF00) | value as u16;
                    self.v = self.t;
                }
                self.write_latch = !self.write_latch;
            }
            // PPUDATA
            _ => {
                self.write_vram(self.v, value);
                self.increment_vram_address();
            }
        }
    }

    /// One byte of an OAM DMA transfer
    ///
    /// Bytes land at OAMADDR, which wraps, so a full 256-byte transfer
    /// leaves OAMADDR where it started.
    pub fn write_oam_dma(&mut self, value: u8) {
        self.oam[self.oam_addr as usize] = value;
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }

    /// Take and clear an NMI raised by enabling it during vblank
    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi_pending)
    }

    // ========================================
    // Helpers
    // ========================================

    fn status_value(&self) -> u8 {
        (self.ppustatus & 0xE0) | (self.open_bus & 0x1F)
    }

    /// Advance v by 1 or 32 after a PPUDATA access
    fn increment_vram_address(&mut self) {
        let step = if self.ppuctrl & CTRL_INCREMENT_32 != 0 {
            32
        } else {
            1
        };
        self.v = self.v.wrapping_add(step) & 0x7FFF;
    }
}
