// Scheduler - keeps the PPU and mapper in step with the CPU
//
// Each CPU step charges its cycles against the current scanline's dot
// budget. Every exhausted budget finishes one line:
// 1. advance the PPU to the next line (frame wrap happens here)
// 2. tell the mapper which line finished (MMC3 IRQ counter)
// 3. render and deliver visible lines, present the frame at 240
// 4. raise vblank (and NMI when enabled) at 241

use super::Emulator;
use crate::cartridge::mappers::ScanlineEvent;
use crate::display::palette_to_rgb;
use crate::ppu::constants::{
    FIRST_VBLANK_SCANLINE, LAST_VISIBLE_SCANLINE, OVERSCAN_LINES, POSTRENDER_SCANLINE,
    PRERENDER_SCANLINE, SCREEN_HEIGHT,
};

impl Emulator {
    /// Hand `cycles` CPU cycles to the PPU and finish every due scanline
    ///
    /// Afterwards the CPU's interrupt inputs reflect the PPU's NMI request
    /// and the mapper's IRQ level.
    ///
    /// # Returns
    ///
    /// Whether a frame was completed (the PPU re-entered pre-render)
    pub(super) fn run_cycles(&mut self, cycles: u32) -> bool {
        self.total_cycles += cycles as u64;
        self.bus.ppu_mut().add_cpu_cycles(cycles);

        let mut frame_completed = false;
        while self.bus.ppu().line_due() {
            frame_completed |= self.finish_line();
        }

        if self.bus.ppu_mut().take_nmi() {
            self.cpu.request_nmi();
        }
        self.cpu.set_irq_line(self.bus.irq_asserted());

        self.check_timing();
        frame_completed
    }

    /// Close the current scanline and enter the next one
    fn finish_line(&mut self) -> bool {
        let event = ScanlineEvent {
            line: self.bus.ppu().scanline(),
            rendering_enabled: self.bus.ppu().rendering_enabled(),
            address_line_rises: self.bus.ppu_mut().take_address_line_rises(),
        };

        let line = self.bus.ppu_mut().advance_line();
        self.lines_done += 1;

        // The IRQ level is read back through `irq_asserted` once the step
        // has been charged
        self.bus.clock_mapper(&event);

        match line {
            0..=LAST_VISIBLE_SCANLINE => self.render_line(line as usize),
            POSTRENDER_SCANLINE => self.sink.present_frame(),
            FIRST_VBLANK_SCANLINE => {
                if self.bus.ppu_mut().start_vblank() {
                    self.cpu.request_nmi();
                }
            }
            PRERENDER_SCANLINE => return true,
            _ => {}
        }
        false
    }

    /// Render a visible line and push it to the video sink
    ///
    /// With overscan cropping the bottom lines are still rendered, so
    /// sprite-0 hits keep firing, but never delivered.
    fn render_line(&mut self, line: usize) {
        let frame = self.bus.ppu().frame_count();
        self.bus.ppu_mut().render_line(line, frame);

        if self.config.video.crop_overscan && line >= SCREEN_HEIGHT - OVERSCAN_LINES {
            return;
        }

        for (x, &index) in self.bus.ppu().line_pixels(line).iter().enumerate() {
            self.sink.draw_pixel(x, line, palette_to_rgb(index));
        }
    }

    /// CPU and PPU clocks must agree:
    /// `cycles * dots_per_cpu_cycle == lines * dots_per_scanline + dots into the line`
    pub(super) fn check_timing(&self) {
        let ppu = self.bus.ppu();
        debug_assert_eq!(
            self.total_cycles * ppu.dots_per_cpu_cycle() as u64,
            self.lines_done * ppu.dots_per_scanline() as u64 + ppu.dots_into_line() as u64,
            "CPU and PPU clocks drifted apart"
        );
    }
}
