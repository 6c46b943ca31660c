// PPU rendering logic - one scanline at a time
//
// Pixels are palette indices ($00-$3F); the display layer maps them to
// RGB through the system palette.

use super::constants::*;
use super::Ppu;

/// A sprite selected for the current line
#[derive(Debug, Clone, Copy)]
struct Sprite {
    /// Row of the sprite covered by the line (before flipping)
    row: u16,
    /// Tile index (or tile bank for 8x16 mode)
    tile_index: u8,
    /// Attribute byte
    attributes: u8,
    /// X position (left edge)
    x: u8,
    /// Original OAM index (for sprite 0 detection)
    oam_index: usize,
}

impl Sprite {
    /// Check if sprite has vertical flip enabled
    fn is_vflip(&self) -> bool {
        (self.attributes & 0x80) != 0
    }

    /// Check if sprite has horizontal flip enabled
    fn is_hflip(&self) -> bool {
        (self.attributes & 0x40) != 0
    }

    /// Check if sprite is behind background
    fn is_behind_background(&self) -> bool {
        (self.attributes & 0x20) != 0
    }

    /// Get sprite palette index (0-3, for sprite palettes 4-7)
    fn palette(&self) -> u8 {
        self.attributes & 0x03
    }

    fn is_sprite_zero(&self) -> bool {
        self.oam_index == 0
    }
}

/// Sprites chosen for one line, split by priority
struct LineSprites {
    behind: Vec<Sprite>,
    front: Vec<Sprite>,
}

impl Ppu {
    /// Render one visible scanline into the frame buffer
    ///
    /// Lines outside 0..=239 are ignored. The background scroll is taken
    /// from `v`, which is advanced to the next line afterwards.
    ///
    /// # Arguments
    ///
    /// * `line` - Visible scanline (0-239)
    /// * `frame` - Frame the line belongs to
    pub fn render_line(&mut self, line: usize, frame: u64) {
        if line >= SCREEN_HEIGHT {
            return;
        }
        debug_assert_eq!(frame, self.frame, "rendering a line of another frame");

        let rendering = self.rendering_enabled();
        let show_background = self.ppumask & MASK_BACKGROUND != 0;
        let show_sprites = self.ppumask & MASK_SPRITES != 0;

        if rendering {
            // v: ....A.. ...BCDEF <- t: ....A.. ...BCDEF
            self.v = (self.v & !0x041F) | (self.t & 0x041F);
        }

        // Step 1: pattern tables and sprite size
        let background_table: u16 = if self.ppuctrl & CTRL_BACKGROUND_TABLE != 0 {
            0x1000
        } else {
            0x0000
        };
        let sprite_table: u16 = if self.ppuctrl & CTRL_SPRITE_TABLE != 0 {
            0x1000
        } else {
            0x0000
        };
        let sprite_height: u16 = if self.ppuctrl & CTRL_SPRITE_8X16 != 0 {
            16
        } else {
            8
        };

        // Step 2: sprite evaluation
        let sprites = self.evaluate_sprites(line, sprite_height);

        // Step 3: backdrop
        let backdrop = if show_background {
            self.read_vram(0x3F00)
        } else {
            BLACK
        };
        self.line.clear(backdrop);

        // Step 4: sprites behind the background
        if show_sprites {
            self.draw_sprites(&sprites.behind, sprite_table, sprite_height);
        }

        // Step 5: background
        if show_background {
            self.draw_background(background_table);
        }

        // Step 6: scroll advance
        if rendering {
            self.increment_fine_y();
        }

        // Step 7: sprites in front of the background
        if show_sprites {
            self.draw_sprites(&sprites.front, sprite_table, sprite_height);
        }

        if rendering {
            self.signal_address_line(background_table);
            self.signal_sprite_fetch(sprite_table, sprite_height);
        }

        let greyscale = self.ppumask & MASK_GREYSCALE != 0;
        let start = line * SCREEN_WIDTH;
        for (dst, &src) in self.frame_buffer[start..start + SCREEN_WIDTH]
            .iter_mut()
            .zip(self.line.pixels.iter())
        {
            *dst = if greyscale { src & 0x30 } else { src };
        }
    }

    /// Pre-render line pattern fetches, as seen on A12
    pub(super) fn signal_pattern_fetches(&mut self) {
        let background_table = if self.ppuctrl & CTRL_BACKGROUND_TABLE != 0 {
            0x1000
        } else {
            0x0000
        };
        let sprite_table = if self.ppuctrl & CTRL_SPRITE_TABLE != 0 {
            0x1000
        } else {
            0x0000
        };
        let sprite_height = if self.ppuctrl & CTRL_SPRITE_8X16 != 0 {
            16
        } else {
            8
        };
        self.signal_address_line(background_table);
        self.signal_sprite_fetch(sprite_table, sprite_height);
    }

    /// Sprite fetches at the end of a line; unused slots fetch tile $FF
    fn signal_sprite_fetch(&mut self, sprite_table: u16, sprite_height: u16) {
        let table = if sprite_height == 16 { 0x1000 } else { sprite_table };
        self.signal_address_line(table);
    }

    /// Select up to eight sprites covering `line`
    ///
    /// Sprite Y in OAM is one less than the first line the sprite covers.
    /// Finding a ninth sprite sets the overflow flag.
    fn evaluate_sprites(&mut self, line: usize, sprite_height: u16) -> LineSprites {
        let mut selected = LineSprites {
            behind: Vec::with_capacity(MAX_SPRITES_PER_LINE),
            front: Vec::with_capacity(MAX_SPRITES_PER_LINE),
        };
        let mut count = 0;

        for (oam_index, entry) in self.oam.chunks_exact(4).enumerate() {
            let top = entry[0] as usize + 1;
            if line < top || line >= top + sprite_height as usize {
                continue;
            }

            count += 1;
            if count > MAX_SPRITES_PER_LINE {
                self.ppustatus |= STATUS_OVERFLOW;
                break;
            }

            let sprite = Sprite {
                row: (line - top) as u16,
                tile_index: entry[1],
                attributes: entry[2],
                x: entry[3],
                oam_index,
            };
            if sprite.is_behind_background() {
                selected.behind.push(sprite);
            } else {
                selected.front.push(sprite);
            }
        }

        selected
    }

    /// Draw sprites back to front so lower OAM indices win
    fn draw_sprites(&mut self, sprites: &[Sprite], sprite_table: u16, sprite_height: u16) {
        let clip_left = self.ppumask & MASK_SPRITES_LEFT == 0;

        for sprite in sprites.iter().rev() {
            let (low, high) = self.fetch_sprite_row(sprite, sprite_table, sprite_height);

            for col in 0..8u8 {
                let x = sprite.x as usize + col as usize;
                if x >= SCREEN_WIDTH || (clip_left && x < 8) {
                    continue;
                }

                let bit = if sprite.is_hflip() { col } else { 7 - col };
                let color = (((high >> bit) & 1) << 1) | ((low >> bit) & 1);
                if color == 0 {
                    continue;
                }

                if sprite.is_sprite_zero() {
                    if sprite.is_behind_background() {
                        self.line.sprite_zero_behind[x] = true;
                    } else if self.line.background_opaque[x] && x != SCREEN_WIDTH - 1 {
                        self.ppustatus |= STATUS_SPRITE_ZERO_HIT;
                    }
                }

                let palette_addr = 0x3F10 + (sprite.palette() as u16) * 4 + color as u16;
                self.line.pixels[x] = self.read_vram(palette_addr);
            }
        }
    }

    /// Fetch the two pattern bytes of a sprite's row
    fn fetch_sprite_row(&self, sprite: &Sprite, sprite_table: u16, sprite_height: u16) -> (u8, u8) {
        let row = if sprite.is_vflip() {
            sprite_height - 1 - sprite.row
        } else {
            sprite.row
        };

        let addr = if sprite_height == 16 {
            // 8x16: bit 0 picks the table, the top tile is even
            let table = (sprite.tile_index as u16 & 0x01) * 0x1000;
            let tile = (sprite.tile_index & 0xFE) as u16 + row / 8;
            table + tile * 16 + row % 8
        } else {
            sprite_table + sprite.tile_index as u16 * 16 + row
        };

        (self.read_vram(addr), self.read_vram(addr + 8))
    }

    /// Draw the background row addressed by `v` and fine X
    ///
    /// Coarse X of `v` advances every eight pixels, wrapping at 32 into
    /// the horizontally adjacent nametable.
    fn draw_background(&mut self, background_table: u16) {
        let clip_left = self.ppumask & MASK_BACKGROUND_LEFT == 0;
        let mut fine_x = self.fine_x;
        let (mut low, mut high, mut palette) = self.fetch_background_tile(background_table);

        for x in 0..SCREEN_WIDTH {
            let bit = 7 - fine_x;
            let color = (((high >> bit) & 1) << 1) | ((low >> bit) & 1);

            if color != 0 && !(clip_left && x < 8) {
                let palette_addr = 0x3F00 + (palette as u16) * 4 + color as u16;
                self.line.pixels[x] = self.read_vram(palette_addr);
                self.line.background_opaque[x] = true;

                if self.line.sprite_zero_behind[x] && x != SCREEN_WIDTH - 1 {
                    self.ppustatus |= STATUS_SPRITE_ZERO_HIT;
                }
            }

            fine_x += 1;
            if fine_x == 8 {
                fine_x = 0;
                self.increment_coarse_x();
                (low, high, palette) = self.fetch_background_tile(background_table);
            }
        }
    }

    /// Fetch pattern bytes and palette number of the tile under `v`
    fn fetch_background_tile(&self, background_table: u16) -> (u8, u8, u8) {
        let v = self.v;
        let tile = self.read_vram(0x2000 | (v & 0x0FFF)) as u16;
        let fine_y = (v >> 12) & 0x07;
        let pattern_addr = background_table + tile * 16 + fine_y;

        let attribute_addr = 0x23C0 | (v & 0x0C00) | ((v >> 4) & 0x38) | ((v >> 2) & 0x07);
        let shift = ((v >> 4) & 0x04) | (v & 0x02);
        let palette = (self.read_vram(attribute_addr) >> shift) & 0x03;

        (
            self.read_vram(pattern_addr),
            self.read_vram(pattern_addr + 8),
            palette,
        )
    }

    /// Coarse X increment; wrapping past 31 switches horizontal nametable
    pub(super) fn increment_coarse_x(&mut self) {
        if self.v & 0x001F == 31 {
            self.v &= !0x001F;
            self.v ^= 0x0400;
        } else {
            self.v += 1;
        }
    }

    /// Fine Y increment with carry into coarse Y
    ///
    /// Coarse Y 29 wraps to 0 and switches vertical nametable; 31 (reached
    /// only by scrolling into attribute rows) wraps to 0 without switching.
    pub(super) fn increment_fine_y(&mut self) {
        if self.v & 0x7000 != 0x7000 {
            self.v += 0x1000;
            return;
        }

        self.v &= !0x7000;
        let mut coarse_y = (self.v & 0x03E0) >> 5;
        if coarse_y == 29 {
            coarse_y = 0;
            self.v ^= 0x0800;
        } else if coarse_y == 31 {
            coarse_y = 0;
        } else {
            coarse_y += 1;
        }
        self.v = (self.v & !0x03E0) | (coarse_y << 5);
    }
}
