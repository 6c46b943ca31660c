// PPU constants

/// VRAM size (the whole 14-bit PPU address space)
pub const VRAM_SIZE: usize = 0x4000;

/// OAM size: 64 sprites x 4 bytes
pub const OAM_SIZE: usize = 256;

/// Size of nametable in bytes (1KB)
pub(super) const NAMETABLE_SIZE: u16 = 0x0400;

/// Screen width in pixels
pub const SCREEN_WIDTH: usize = 256;

/// Screen height in pixels
pub const SCREEN_HEIGHT: usize = 240;

/// Lines at the bottom of the picture hidden by overscan cropping
pub const OVERSCAN_LINES: usize = 16;

/// Sprites the hardware can show on one line
pub(super) const MAX_SPRITES_PER_LINE: usize = 8;

/// Palette index of black, used as backdrop when the background is off
pub(super) const BLACK: u8 = 0x0F;

// ========================================
// PPUCTRL ($2000) bits
// ========================================

pub(super) const CTRL_NAMETABLE: u8 = 0x03;
pub(super) const CTRL_INCREMENT_32: u8 = 0x04;
pub(super) const CTRL_SPRITE_TABLE: u8 = 0x08;
pub(super) const CTRL_BACKGROUND_TABLE: u8 = 0x10;
pub(super) const CTRL_SPRITE_8X16: u8 = 0x20;
pub(super) const CTRL_NMI_ENABLE: u8 = 0x80;

// ========================================
// PPUMASK ($2001) bits
// ========================================

pub(super) const MASK_GREYSCALE: u8 = 0x01;
pub(super) const MASK_BACKGROUND_LEFT: u8 = 0x02;
pub(super) const MASK_SPRITES_LEFT: u8 = 0x04;
pub(super) const MASK_BACKGROUND: u8 = 0x08;
pub(super) const MASK_SPRITES: u8 = 0x10;

// ========================================
// PPUSTATUS ($2002) bits
// ========================================

pub(super) const STATUS_OVERFLOW: u8 = 0x20;
pub(super) const STATUS_SPRITE_ZERO_HIT: u8 = 0x40;
pub(super) const STATUS_VBLANK: u8 = 0x80;

// ========================================
// PPU Timing Constants (NTSC)
// ========================================

/// Number of PPU dots per scanline
pub const DOTS_PER_SCANLINE: u32 = 341;

/// PPU dots per CPU cycle
pub const DOTS_PER_CPU_CYCLE: u32 = 3;

/// Number of scanlines per frame (NTSC), pre-render included
pub const SCANLINES_PER_FRAME: u32 = 262;

/// Pre-render scanline number
pub const PRERENDER_SCANLINE: i16 = -1;

/// Last visible scanline
pub const LAST_VISIBLE_SCANLINE: i16 = 239;

/// Post-render scanline
pub const POSTRENDER_SCANLINE: i16 = 240;

/// First VBlank scanline
pub const FIRST_VBLANK_SCANLINE: i16 = 241;

/// Last VBlank scanline
pub const LAST_VBLANK_SCANLINE: i16 = 260;

/// Scanlines spent in vblank (241..=260)
pub const VBLANK_SCANLINES: u32 = 20;

/// Length of the window at the end of vblank, in CPU cycles, during which
/// a $2002 read leaves the vblank flag and the write toggle alone
///
/// Roughly one scanline (341 dots at 3 dots per CPU cycle).
pub const VBLANK_EXEMPT_CYCLES: u32 = 114;
