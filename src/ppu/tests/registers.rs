//! PPU Register Tests
//!
//! Tests for PPU register behavior including:
//! - Register initialization and reset
//! - PPUSTATUS side effects and the end-of-vblank exemption
//! - PPUSCROLL / PPUADDR write latch
//! - PPUDATA buffering and increments
//! - OAMADDR / OAMDATA / DMA

use super::*;

// Initialization Tests
// ========================================

#[test]
fn test_ppu_initialization() {
    let ppu = Ppu::new();
    assert_eq!(ppu.ppuctrl, 0x00);
    assert_eq!(ppu.ppumask, 0x00);
    assert_eq!(ppu.ppustatus, 0x00);
    assert_eq!(ppu.oam_addr, 0x00);
    assert!(!ppu.write_latch);
    assert_eq!(ppu.scanline(), -1, "PPU starts on the pre-render line");
}

#[test]
fn test_ppu_reset() {
    let mut ppu = Ppu::new();
    ppu.write_register(PPUCTRL, 0x80);
    ppu.write_register(PPUMASK, 0x1E);
    ppu.write_register(PPUADDR, 0x21);

    ppu.reset();

    assert_eq!(ppu.ppuctrl, 0x00);
    assert_eq!(ppu.ppumask, 0x00);
    assert!(!ppu.write_latch);
}

#[test]
fn test_register_number_uses_low_three_bits() {
    let mut ppu = Ppu::new();
    ppu.write_register(0x3FF9, 0x1E);
    assert_eq!(ppu.mask(), 0x1E, "$3FF9 is PPUMASK");
    ppu.write_register(1, 0x08);
    assert_eq!(ppu.mask(), 0x08);
}

// ========================================
// PPUCTRL Tests
// ========================================

#[test]
fn test_ppuctrl_sets_nametable_bits_of_t() {
    let mut ppu = Ppu::new();
    ppu.write_register(PPUCTRL, 0x03);
    assert_eq!(ppu.t & 0x0C00, 0x0C00);
    ppu.write_register(PPUCTRL, 0x01);
    assert_eq!(ppu.t & 0x0C00, 0x0400);
}

#[test]
fn test_enabling_nmi_during_vblank_raises_nmi() {
    let mut ppu = Ppu::new();
    ppu.start_vblank();
    assert!(!ppu.take_nmi());

    ppu.write_register(PPUCTRL, 0x80);
    assert!(ppu.take_nmi());
    assert!(!ppu.take_nmi(), "taken once");

    // Already enabled: rewriting does not raise another
    ppu.write_register(PPUCTRL, 0x80);
    assert!(!ppu.take_nmi());
}

#[test]
fn test_enabling_nmi_outside_vblank_is_silent() {
    let mut ppu = Ppu::new();
    ppu.write_register(PPUCTRL, 0x80);
    assert!(!ppu.take_nmi());
}

// ========================================
// PPUSTATUS Tests
// ========================================

#[test]
fn test_status_read_clears_vblank_and_latch() {
    let mut ppu = Ppu::new();
    ppu.start_vblank();
    ppu.write_register(PPUSCROLL, 0x10);
    assert!(ppu.write_latch);

    let status = ppu.read_register(PPUSTATUS);
    assert_eq!(status & 0x80, 0x80);
    assert!(!ppu.in_vblank());
    assert!(!ppu.write_latch);

    assert_eq!(ppu.read_register(PPUSTATUS) & 0x80, 0);
}

#[test]
fn test_status_low_bits_come_from_open_bus() {
    let mut ppu = Ppu::new();
    ppu.write_register(PPUMASK, 0x1F);
    assert_eq!(ppu.read_register(PPUSTATUS), 0x1F);

    ppu.ppustatus |= 0x40;
    ppu.write_register(OAMADDR, 0xE3);
    assert_eq!(ppu.read_register(PPUSTATUS), 0x43);
}

#[test]
fn test_status_read_in_exempt_window_keeps_flag() {
    let mut ppu = Ppu::new();
    ppu.start_vblank();

    let vblank_cycles = VBLANK_SCANLINES * DOTS_PER_SCANLINE / DOTS_PER_CPU_CYCLE;
    ppu.add_cpu_cycles(vblank_cycles - VBLANK_EXEMPT_CYCLES);
    ppu.write_register(PPUADDR, 0x20);

    let status = ppu.read_register(PPUSTATUS);
    assert_eq!(status & 0x80, 0x80);
    assert!(ppu.in_vblank(), "flag survives inside the window");
    assert!(ppu.write_latch, "latch survives inside the window");
}

#[test]
fn test_status_read_just_before_exempt_window_clears() {
    let mut ppu = Ppu::new();
    ppu.start_vblank();

    let vblank_cycles = VBLANK_SCANLINES * DOTS_PER_SCANLINE / DOTS_PER_CPU_CYCLE;
    ppu.add_cpu_cycles(vblank_cycles - VBLANK_EXEMPT_CYCLES - 1);
    ppu.read_register(PPUSTATUS);
    assert!(!ppu.in_vblank());
}

#[test]
fn test_peek_status_has_no_side_effects() {
    let mut ppu = Ppu::new();
    ppu.start_vblank();
    ppu.write_register(PPUADDR, 0x20);

    assert_eq!(ppu.peek_register(PPUSTATUS) & 0x80, 0x80);
    assert!(ppu.in_vblank());
    assert!(ppu.write_latch);
}

// ========================================
// PPUSCROLL / PPUADDR Tests
// ========================================

#[test]
fn test_ppuscroll_writes() {
    let mut ppu = Ppu::new();
    ppu.write_register(PPUSCROLL, 0x7D); // coarse X 15, fine X 5
    assert_eq!(ppu.t & 0x001F, 0x0F);
    assert_eq!(ppu.fine_x, 5);

    ppu.write_register(PPUSCROLL, 0x5E); // coarse Y 11, fine Y 6
    assert_eq!((ppu.t >> 5) & 0x1F, 11);
    assert_eq!((ppu.t >> 12) & 0x07, 6);
    assert!(!ppu.write_latch);
}

#[test]
fn test_ppuaddr_writes_set_v_on_second_write() {
    let mut ppu = Ppu::new();
    ppu.write_register(PPUADDR, 0x23);
    assert_eq!(ppu.vram_address(), 0x0000, "v changes on the second write");
    ppu.write_register(PPUADDR, 0xC5);
    assert_eq!(ppu.vram_address(), 0x23C5);
}

#[test]
fn test_ppuaddr_masks_high_byte() {
    let mut ppu = Ppu::new();
    set_address(&mut ppu, 0xFFFF);
    assert_eq!(ppu.vram_address(), 0x3FFF);
}

#[test]
fn test_ppuscroll_and_ppuaddr_share_latch() {
    let mut ppu = Ppu::new();
    ppu.write_register(PPUSCROLL, 0x00);
    ppu.write_register(PPUADDR, 0x00);
    assert!(!ppu.write_latch);
}

// ========================================
// PPUDATA Tests
// ========================================

#[test]
fn test_ppudata_read_is_buffered() {
    let mut ppu = Ppu::new();
    write_bytes(&mut ppu, 0x2000, &[0x11, 0x22]);

    set_address(&mut ppu, 0x2000);
    assert_eq!(ppu.read_register(PPUDATA), 0x00, "first read returns stale buffer");
    assert_eq!(ppu.read_register(PPUDATA), 0x11);
    assert_eq!(ppu.read_register(PPUDATA), 0x22);
}

#[test]
fn test_ppudata_palette_read_is_immediate() {
    let mut ppu = Ppu::new();
    ppu.write_vram(0x2F05, 0x66);
    ppu.write_vram(0x3F05, 0x2C);

    set_address(&mut ppu, 0x3F05);
    assert_eq!(ppu.read_register(PPUDATA), 0x2C);
    assert_eq!(ppu.read_buffer, 0x66, "buffer gets the nametable byte below");
}

#[test]
fn test_ppudata_increment_modes() {
    let mut ppu = Ppu::new();
    set_address(&mut ppu, 0x2000);
    ppu.write_register(PPUDATA, 0x01);
    assert_eq!(ppu.vram_address(), 0x2001);

    ppu.write_register(PPUCTRL, 0x04);
    ppu.write_register(PPUDATA, 0x02);
    assert_eq!(ppu.vram_address(), 0x2021);
    assert_eq!(ppu.read_vram(0x2001), 0x02);
}

// ========================================
// OAM Tests
// ========================================

#[test]
fn test_oamdata_write_increments_address() {
    let mut ppu = Ppu::new();
    ppu.write_register(OAMADDR, 0x10);
    ppu.write_register(OAMDATA, 0xAA);
    ppu.write_register(OAMDATA, 0xBB);

    assert_eq!(ppu.oam()[0x10], 0xAA);
    assert_eq!(ppu.oam()[0x11], 0xBB);
    assert_eq!(ppu.oam_addr, 0x12);
}

#[test]
fn test_oamdata_read_does_not_increment() {
    let mut ppu = Ppu::new();
    ppu.write_register(OAMADDR, 0x05);
    ppu.write_register(OAMDATA, 0x42);
    ppu.write_register(OAMADDR, 0x05);

    assert_eq!(ppu.read_register(OAMDATA), 0x42);
    assert_eq!(ppu.read_register(OAMDATA), 0x42);
}

#[test]
fn test_oam_dma_starts_at_oamaddr_and_wraps() {
    let mut ppu = Ppu::new();
    ppu.write_register(OAMADDR, 0xFE);
    for value in 0..4u8 {
        ppu.write_oam_dma(value);
    }

    assert_eq!(ppu.oam()[0xFE], 0);
    assert_eq!(ppu.oam()[0xFF], 1);
    assert_eq!(ppu.oam()[0x00], 2);
    assert_eq!(ppu.oam()[0x01], 3);
}
