// Bus module - CPU address space and device dispatch
//
// CPU Memory Map:
// $0000-$07FF: 2KB internal RAM
// $0800-$1FFF: Mirrors of $0000-$07FF (3 times)
// $2000-$2007: PPU registers
// $2008-$3FFF: Mirrors of $2000-$2007 (repeats every 8 bytes)
// $4000-$4013: APU registers
// $4014: OAM DMA
// $4015: APU status
// $4016: Controller 1 (and strobe)
// $4017: Controller 2 / APU frame counter
// $4018-$5FFF: Expansion area
// $6000-$7FFF: Cartridge SRAM
// $8000-$FFFF: Cartridge PRG ROM (filled by mapper bank copies)

use crate::apu::ApuPort;
use crate::cartridge::mappers::{BankTarget, Board, Mapper, MapperError, Mmc3IrqMode, ScanlineEvent};
use crate::cartridge::{Cartridge, TRAINER_SIZE};
use crate::input::ControllerIO;
use crate::ppu::Ppu;
use serde::{Deserialize, Serialize};

/// Size of the flat CPU address space backing store
pub const MEMORY_SIZE: usize = 0x10000;

/// Internal RAM size; everything below $2000 folds onto it
const RAM_MASK: u16 = 0x07FF;

/// Extra CPU cycles taken by an OAM DMA transfer
pub const DMA_STALL_CYCLES: u32 = 512;

/// SRAM window
const SRAM_START: u16 = 0x6000;
const SRAM_END: u16 = 0x7FFF;

/// Where a 512-byte trainer is placed on reset
const TRAINER_ADDR: usize = 0x7000;

/// Cartridge SRAM access flags, driven by the mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SramControl {
    /// Reads return 0 and writes are dropped when false
    pub enabled: bool,
    /// Writes are dropped when true
    pub read_only: bool,
}

impl Default for SramControl {
    fn default() -> Self {
        Self {
            enabled: true,
            read_only: false,
        }
    }
}

/// Main system bus
///
/// Owns the flat 64 KiB memory, the PPU, controllers, the APU register
/// port and the inserted cartridge with its mapper.
pub struct Bus {
    memory: Vec<u8>,
    ppu: Ppu,
    controllers: ControllerIO,
    apu: ApuPort,
    cartridge: Option<Cartridge>,
    mapper: Option<Mapper>,
    sram: SramControl,
    stall_cycles: u32,
    sram_write_warned: bool,
}

impl Bus {
    /// Create a bus with cleared memory and no cartridge
    pub fn new() -> Self {
        Self::with_ppu(Ppu::new())
    }

    /// Create a bus around a pre-configured PPU
    pub fn with_ppu(ppu: Ppu) -> Self {
        Bus {
            memory: vec![0; MEMORY_SIZE],
            ppu,
            controllers: ControllerIO::new(),
            apu: ApuPort::new(),
            cartridge: None,
            mapper: None,
            sram: SramControl::default(),
            stall_cycles: 0,
            sram_write_warned: false,
        }
    }

    // ========================================
    // Cartridge Management
    // ========================================

    /// Insert a cartridge and build its mapper
    ///
    /// The banks are not mapped until [`Bus::reset_cartridge`] runs (the CPU
    /// calls it from its reset sequence).
    ///
    /// # Errors
    ///
    /// `MapperError::UnsupportedMapper` for mapper ids outside 0-4.
    pub fn insert_cartridge(&mut self, cartridge: Cartridge, irq_mode: Mmc3IrqMode) -> Result<(), MapperError> {
        let mapper = Mapper::new(&cartridge, irq_mode)?;
        log::info!(
            "Cartridge inserted: mapper {} ({}), {} x 16KB PRG, {} x 8KB CHR, {:?} mirroring",
            cartridge.mapper_id,
            mapper.name(),
            cartridge.prg_banks,
            cartridge.chr_banks,
            cartridge.mirroring()
        );

        self.ppu.force_mirroring(cartridge.mirroring());
        self.mapper = Some(mapper);
        self.cartridge = Some(cartridge);
        Ok(())
    }

    /// Remove the cartridge, returning it
    pub fn eject_cartridge(&mut self) -> Option<Cartridge> {
        self.mapper = None;
        self.cartridge.take()
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    pub fn mapper(&self) -> Option<&Mapper> {
        self.mapper.as_ref()
    }

    /// Replace the mapper registers (snapshot restore)
    pub(crate) fn set_mapper(&mut self, mapper: Mapper) {
        self.mapper = Some(mapper);
    }

    /// Return the cartridge to its power-on banking
    ///
    /// Restores SRAM access, copies the trainer to $7000, resets the
    /// nametable mirroring to the cartridge default and lets the mapper
    /// map its initial banks.
    pub fn reset_cartridge(&mut self) {
        self.sram = SramControl::default();
        self.stall_cycles = 0;

        let (Some(mapper), Some(cartridge)) = (self.mapper.as_mut(), self.cartridge.as_ref()) else {
            return;
        };

        if let Some(trainer) = cartridge.trainer.as_deref() {
            // A hand-built cartridge can carry more than the trainer window holds
            let len = trainer.len().min(TRAINER_SIZE);
            self.memory[TRAINER_ADDR..TRAINER_ADDR + len].copy_from_slice(&trainer[..len]);
        }

        self.ppu.force_mirroring(cartridge.mirroring());
        mapper.initialize();
        let mut target = BankTarget {
            cartridge,
            memory: &mut self.memory,
            ppu: &mut self.ppu,
            sram: &mut self.sram,
        };
        mapper.reset(&mut target);
    }

    /// Feed a scanline to the mapper
    ///
    /// # Returns
    ///
    /// Whether the mapper asked for an IRQ
    pub fn clock_mapper(&mut self, event: &ScanlineEvent) -> bool {
        self.mapper.as_mut().is_some_and(|mapper| mapper.update(event))
    }

    /// Level of the cartridge IRQ output
    pub fn irq_asserted(&self) -> bool {
        self.mapper.as_ref().is_some_and(|mapper| mapper.irq_pending())
    }

    // ========================================
    // CPU Access
    // ========================================

    /// Read a byte from the CPU address space
    ///
    /// Register reads have side effects ($2002 clears vblank, $2007
    /// advances the VRAM address, $4016/$4017 shift the controllers).
    pub fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.memory[(addr & RAM_MASK) as usize],
            0x2000..=0x3FFF => self.ppu.read_register(addr & 0x0007),
            0x4015 => self.apu.read_status(),
            0x4016 => self.controllers.read(0),
            0x4017 => self.controllers.read(1),
            0x4000..=0x401F => 0,
            SRAM_START..=SRAM_END => {
                if self.sram.enabled {
                    self.memory[addr as usize]
                } else {
                    0
                }
            }
            _ => self.memory[addr as usize],
        }
    }

    /// Opcode fetch
    ///
    /// PRG ROM has no mirroring or side effects, so $8000-$FFFF bypasses
    /// the dispatch.
    #[inline]
    pub fn fetch(&mut self, addr: u16) -> u8 {
        if addr >= 0x8000 {
            self.memory[addr as usize]
        } else {
            self.read(addr)
        }
    }

    /// Side-effect-free read for tracing, disassembly and tests
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.memory[(addr & RAM_MASK) as usize],
            0x2000..=0x3FFF => self.ppu.peek_register(addr & 0x0007),
            0x4000..=0x401F => 0,
            SRAM_START..=SRAM_END if !self.sram.enabled => 0,
            _ => self.memory[addr as usize],
        }
    }

    /// Read a little-endian 16-bit value
    pub fn read_u16(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Write a byte to the CPU address space
    ///
    /// The primary effect happens first; afterwards the mapper inspects
    /// the write and, when it claims it, switches banks before this call
    /// returns.
    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.memory[(addr & RAM_MASK) as usize] = value,
            0x2000..=0x3FFF => self.ppu.write_register(addr & 0x0007, value),
            0x4014 => self.oam_dma(value),
            0x4016 => self.controllers.write_strobe(value),
            0x4000..=0x4017 => self.apu.write_register(addr, value),
            0x4018..=0x401F => {}
            SRAM_START..=SRAM_END => self.write_sram(addr, value),
            0x8000..=0xFFFF => {}
            _ => self.memory[addr as usize] = value,
        }

        self.notify_mapper(addr, value);
    }

    fn write_sram(&mut self, addr: u16, value: u8) {
        if self.sram.enabled && !self.sram.read_only {
            self.memory[addr as usize] = value;
        } else if !self.sram_write_warned {
            self.sram_write_warned = true;
            log::warn!(
                "Dropped SRAM write ${:02X} to ${:04X} (enabled={}, read_only={})",
                value,
                addr,
                self.sram.enabled,
                self.sram.read_only
            );
        }
    }

    fn notify_mapper(&mut self, addr: u16, value: u8) {
        let (Some(mapper), Some(cartridge)) = (self.mapper.as_mut(), self.cartridge.as_ref()) else {
            return;
        };

        if mapper.check_address(addr, value) {
            let mut target = BankTarget {
                cartridge,
                memory: &mut self.memory,
                ppu: &mut self.ppu,
                sram: &mut self.sram,
            };
            mapper.switch_banks(&mut target);
        }
    }

    /// OAM DMA: copy page `page` ($XX00-$XXFF) into sprite memory
    ///
    /// Bytes land at OAMADDR onwards, wrapping inside OAM. The 512-cycle
    /// stall is collected by the CPU step through
    /// [`Bus::take_stall_cycles`].
    fn oam_dma(&mut self, page: u8) {
        let base = (page as u16) << 8;
        for offset in 0..=0xFFu16 {
            let value = self.read(base | offset);
            self.ppu.write_oam_dma(value);
        }
        self.stall_cycles += DMA_STALL_CYCLES;
    }

    /// Take and clear the stall cycles accumulated since the last call
    pub fn take_stall_cycles(&mut self) -> u32 {
        std::mem::take(&mut self.stall_cycles)
    }

    // ========================================
    // Raw Memory Access
    // ========================================

    /// Copy bytes straight into the backing store, bypassing dispatch
    ///
    /// Used by tests, debuggers and snapshot restore. Mirrors are not
    /// applied, so addresses are taken literally.
    pub fn load_memory(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        let end = (start + data.len()).min(MEMORY_SIZE);
        self.memory[start..end].copy_from_slice(&data[..end - start]);
    }

    /// The full 64 KiB backing store
    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// Current SRAM contents ($6000-$7FFF), for battery saves
    pub fn sram(&self) -> &[u8] {
        &self.memory[SRAM_START as usize..=SRAM_END as usize]
    }

    /// Load SRAM contents from a battery save
    pub fn load_sram(&mut self, data: &[u8]) {
        let len = data.len().min(0x2000);
        self.memory[SRAM_START as usize..SRAM_START as usize + len].copy_from_slice(&data[..len]);
    }

    pub fn sram_control(&self) -> SramControl {
        self.sram
    }

    pub(crate) fn set_sram_control(&mut self, sram: SramControl) {
        self.sram = sram;
    }

    /// Clear internal RAM (power-on)
    pub fn clear_ram(&mut self) {
        self.memory[..=RAM_MASK as usize].fill(0);
    }

    // ========================================
    // Device Access
    // ========================================

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    pub fn controllers(&self) -> &ControllerIO {
        &self.controllers
    }

    pub fn controllers_mut(&mut self) -> &mut ControllerIO {
        &mut self.controllers
    }

    pub fn apu(&self) -> &ApuPort {
        &self.apu
    }

    pub fn apu_mut(&mut self) -> &mut ApuPort {
        &mut self.apu
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
