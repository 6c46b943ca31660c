// PPU timing - scanline budget, vblank and frame bookkeeping
//
// The CPU side hands over elapsed cycles; each line owns a budget of
// `dots_per_scanline` PPU dots. When the budget runs out the scheduler
// calls `advance_line` and renders the new line if it is visible.

use super::constants::*;
use super::Ppu;

impl Ppu {
    /// Charge elapsed CPU cycles against the current line
    pub fn add_cpu_cycles(&mut self, cycles: u32) {
        self.dot_budget -= (cycles * self.dots_per_cpu_cycle) as i32;
        if self.in_vblank() {
            self.cycles_since_vblank += cycles;
        }
    }

    /// Whether the current line's budget is used up
    pub fn line_due(&self) -> bool {
        self.dot_budget <= 0
    }

    /// Dots already consumed on the current line
    pub fn dots_into_line(&self) -> u32 {
        (self.dots_per_scanline as i32 - self.dot_budget) as u32
    }

    pub fn dots_per_scanline(&self) -> u32 {
        self.dots_per_scanline
    }

    pub fn dots_per_cpu_cycle(&self) -> u32 {
        self.dots_per_cpu_cycle
    }

    /// Move to the next scanline and refill its budget
    ///
    /// Leaving the last vblank line clears vblank, sprite-0 hit and
    /// overflow, bumps the frame counter and enters the pre-render line.
    ///
    /// # Returns
    ///
    /// The new scanline number
    pub fn advance_line(&mut self) -> i16 {
        self.dot_budget += self.dots_per_scanline as i32;
        self.scanline += 1;

        if self.scanline > LAST_VBLANK_SCANLINE {
            self.scanline = PRERENDER_SCANLINE;
            self.ppustatus &= !(STATUS_VBLANK | STATUS_SPRITE_ZERO_HIT | STATUS_OVERFLOW);
            self.frame += 1;

            if self.rendering_enabled() {
                // v: GHIA.BC DEF..... <- t: GHIA.BC DEF.....
                self.v = (self.v & 0x841F) | (self.t & 0x7BE0);
                self.signal_pattern_fetches();
            }
        }

        self.scanline
    }

    /// Enter vertical blank
    ///
    /// # Returns
    ///
    /// Whether PPUCTRL asks for an NMI
    pub fn start_vblank(&mut self) -> bool {
        self.ppustatus |= STATUS_VBLANK;
        self.cycles_since_vblank = 0;
        self.ppuctrl & CTRL_NMI_ENABLE != 0
    }

    pub fn in_vblank(&self) -> bool {
        self.ppustatus & STATUS_VBLANK != 0
    }

    pub fn scanline(&self) -> i16 {
        self.scanline
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn cycles_since_vblank(&self) -> u32 {
        self.cycles_since_vblank
    }

    /// Whether a PPUSTATUS read falls in the last stretch of vblank, where
    /// it leaves the flag and the write toggle alone
    pub(super) fn in_exempt_window(&self) -> bool {
        let vblank_cycles = VBLANK_SCANLINES * self.dots_per_scanline / self.dots_per_cpu_cycle;
        self.in_vblank() && self.cycles_since_vblank + VBLANK_EXEMPT_CYCLES >= vblank_cycles
    }
}
