// PPU module - Picture Processing Unit (2C02) implementation
//
// The PPU is driven a whole scanline at a time by the scheduler:
// - registers.rs: CPU-visible registers $2000-$2007
// - memory.rs: VRAM access with nametable mirroring and palette aliasing
// - rendering.rs: the per-scanline compositor
// - timing.rs: scanline budget, vblank and frame bookkeeping

pub mod constants;
mod memory;
mod registers;
mod rendering;
mod timing;

#[cfg(test)]
mod tests;

use crate::cartridge::Mirroring;
use constants::*;
use serde::{Deserialize, Serialize};

/// Per-line scratch buffers used by the compositor
#[derive(Debug, Clone)]
struct LineBuffers {
    /// Palette index of each pixel on the line being drawn
    pixels: [u8; SCREEN_WIDTH],
    /// Whether the background drew an opaque pixel at X
    background_opaque: [bool; SCREEN_WIDTH],
    /// Whether sprite 0 drew an opaque behind-background pixel at X
    sprite_zero_behind: [bool; SCREEN_WIDTH],
}

impl LineBuffers {
    fn new() -> Self {
        Self {
            pixels: [0; SCREEN_WIDTH],
            background_opaque: [false; SCREEN_WIDTH],
            sprite_zero_behind: [false; SCREEN_WIDTH],
        }
    }

    fn clear(&mut self, backdrop: u8) {
        self.pixels.fill(backdrop);
        self.background_opaque.fill(false);
        self.sprite_zero_behind.fill(false);
    }
}

/// PPU structure representing the Picture Processing Unit state
pub struct Ppu {
    // Memory
    vram: Vec<u8>,
    oam: [u8; OAM_SIZE],
    mirroring: Mirroring,

    // Registers
    ppuctrl: u8,
    ppumask: u8,
    ppustatus: u8,
    oam_addr: u8,

    // Internal scroll registers (loopy v/t/x/w)
    v: u16,
    t: u16,
    fine_x: u8,
    write_latch: bool,

    /// PPUDATA read buffer
    read_buffer: u8,
    /// Last value written to any register; fills PPUSTATUS bits 0-4
    open_bus: u8,
    /// NMI raised by enabling it in PPUCTRL during vblank
    nmi_pending: bool,

    // Timing
    scanline: i16,
    dot_budget: i32,
    frame: u64,
    cycles_since_vblank: u32,
    dots_per_scanline: u32,
    dots_per_cpu_cycle: u32,

    // Pattern-table address line A12, watched by MMC3
    address_line_high: bool,
    address_line_rises: u32,

    // Output
    frame_buffer: Vec<u8>,
    line: LineBuffers,
}

impl Ppu {
    /// Create a new PPU instance with NTSC timing
    pub fn new() -> Self {
        Self::with_timing(DOTS_PER_SCANLINE, DOTS_PER_CPU_CYCLE)
    }

    /// Create a PPU with custom scanline length and clock ratio
    ///
    /// # Arguments
    ///
    /// * `dots_per_scanline` - PPU dots per scanline (341 on NTSC)
    /// * `dots_per_cpu_cycle` - PPU dots per CPU cycle (3 on NTSC)
    pub fn with_timing(dots_per_scanline: u32, dots_per_cpu_cycle: u32) -> Self {
        Ppu {
            vram: vec![0; VRAM_SIZE],
            oam: [0; OAM_SIZE],
            mirroring: Mirroring::Horizontal,
            ppuctrl: 0,
            ppumask: 0,
            ppustatus: 0,
            oam_addr: 0,
            v: 0,
            t: 0,
            fine_x: 0,
            write_latch: false,
            read_buffer: 0,
            open_bus: 0,
            nmi_pending: false,
            scanline: PRERENDER_SCANLINE,
            dot_budget: dots_per_scanline as i32,
            frame: 0,
            cycles_since_vblank: 0,
            dots_per_scanline,
            dots_per_cpu_cycle,
            address_line_high: false,
            address_line_rises: 0,
            frame_buffer: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT],
            line: LineBuffers::new(),
        }
    }

    /// Reset the CPU-visible registers (console RESET)
    ///
    /// VRAM, OAM and the timing state are kept.
    pub fn reset(&mut self) {
        self.ppuctrl = 0;
        self.ppumask = 0;
        self.write_latch = false;
        self.read_buffer = 0;
        self.nmi_pending = false;
        self.t = 0;
        self.fine_x = 0;
    }

    /// Return to the power-on state, timing included
    pub fn power_on(&mut self) {
        let (dots, ratio) = (self.dots_per_scanline, self.dots_per_cpu_cycle);
        let mirroring = self.mirroring;
        let pattern_tables = self.vram[..0x2000].to_vec();
        *self = Self::with_timing(dots, ratio);
        self.mirroring = mirroring;
        self.vram[..0x2000].copy_from_slice(&pattern_tables);
    }

    // ========================================
    // Mapper-facing API
    // ========================================

    /// Change the nametable mirroring
    pub fn force_mirroring(&mut self, mirroring: Mirroring) {
        if self.mirroring != mirroring {
            log::debug!("Nametable mirroring {:?} -> {:?}", self.mirroring, mirroring);
            self.mirroring = mirroring;
        }
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    /// Copy a bank of pattern data into VRAM at `addr`
    ///
    /// Bytes past $1FFF are dropped.
    pub fn load_chr(&mut self, addr: u16, data: &[u8]) {
        let start = (addr & 0x1FFF) as usize;
        let end = (start + data.len()).min(0x2000);
        self.vram[start..end].copy_from_slice(&data[..end - start]);
    }

    /// Report a pattern-table address put on the PPU bus
    ///
    /// Counts low-to-high transitions of A12 ($1000), which MMC3 boards
    /// can use to clock their scanline counter.
    pub fn signal_address_line(&mut self, addr: u16) {
        let high = addr & 0x1000 != 0;
        if high && !self.address_line_high {
            self.address_line_rises += 1;
        }
        self.address_line_high = high;
    }

    /// Take and clear the number of A12 rises seen since the last call
    pub fn take_address_line_rises(&mut self) -> u32 {
        std::mem::take(&mut self.address_line_rises)
    }

    // ========================================
    // Inspection
    // ========================================

    /// Sprite memory
    pub fn oam(&self) -> &[u8; OAM_SIZE] {
        &self.oam
    }

    /// Rendered picture as 256x240 palette indices
    pub fn frame_buffer(&self) -> &[u8] {
        &self.frame_buffer
    }

    /// Palette indices of one rendered line
    pub fn line_pixels(&self, line: usize) -> &[u8] {
        &self.frame_buffer[line * SCREEN_WIDTH..(line + 1) * SCREEN_WIDTH]
    }

    pub fn ctrl(&self) -> u8 {
        self.ppuctrl
    }

    pub fn mask(&self) -> u8 {
        self.ppumask
    }

    pub fn status(&self) -> u8 {
        self.ppustatus
    }

    /// Current VRAM address (loopy v)
    pub fn vram_address(&self) -> u16 {
        self.v
    }

    /// Whether background or sprite rendering is on
    pub fn rendering_enabled(&self) -> bool {
        self.ppumask & (MASK_BACKGROUND | MASK_SPRITES) != 0
    }

    // ========================================
    // Snapshots
    // ========================================

    /// Capture everything needed to resume emulation
    pub fn state(&self) -> PpuState {
        PpuState {
            vram: self.vram.clone(),
            oam: self.oam.to_vec(),
            mirroring: self.mirroring,
            ppuctrl: self.ppuctrl,
            ppumask: self.ppumask,
            ppustatus: self.ppustatus,
            oam_addr: self.oam_addr,
            v: self.v,
            t: self.t,
            fine_x: self.fine_x,
            write_latch: self.write_latch,
            read_buffer: self.read_buffer,
            open_bus: self.open_bus,
            nmi_pending: self.nmi_pending,
            scanline: self.scanline,
            dot_budget: self.dot_budget,
            frame: self.frame,
            cycles_since_vblank: self.cycles_since_vblank,
            address_line_high: self.address_line_high,
        }
    }

    /// Restore a captured state
    ///
    /// Buffers of the wrong length are ignored field by field so a
    /// truncated snapshot cannot cause an out-of-bounds write.
    pub fn restore_state(&mut self, state: &PpuState) {
        if state.vram.len() == VRAM_SIZE {
            self.vram.copy_from_slice(&state.vram);
        }
        if state.oam.len() == OAM_SIZE {
            self.oam.copy_from_slice(&state.oam);
        }
        self.mirroring = state.mirroring;
        self.ppuctrl = state.ppuctrl;
        self.ppumask = state.ppumask;
        self.ppustatus = state.ppustatus;
        self.oam_addr = state.oam_addr;
        self.v = state.v;
        self.t = state.t;
        self.fine_x = state.fine_x;
        self.write_latch = state.write_latch;
        self.read_buffer = state.read_buffer;
        self.open_bus = state.open_bus;
        self.nmi_pending = state.nmi_pending;
        self.scanline = state.scanline;
        self.dot_budget = state.dot_budget;
        self.frame = state.frame;
        self.cycles_since_vblank = state.cycles_since_vblank;
        self.address_line_high = state.address_line_high;
        self.address_line_rises = 0;
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable PPU state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PpuState {
    pub vram: Vec<u8>,
    pub oam: Vec<u8>,
    pub mirroring: Mirroring,
    pub ppuctrl: u8,
    pub ppumask: u8,
    pub ppustatus: u8,
    pub oam_addr: u8,
    pub v: u16,
    pub t: u16,
    pub fine_x: u8,
    pub write_latch: bool,
    pub read_buffer: u8,
    pub open_bus: u8,
    pub nmi_pending: bool,
    pub scanline: i16,
    pub dot_budget: i32,
    pub frame: u64,
    pub cycles_since_vblank: u32,
    pub address_line_high: bool,
}
