// Emulator module - Main emulator coordinator
//
// `Emulator` owns the CPU and the bus (and through it the PPU, mapper and
// controllers) and keeps them in lock-step:
// - mod.rs: construction, cartridge loading, reset/quit, snapshots
// - timing.rs: the scanline scheduler driven by CPU cycles
// - config.rs: TOML configuration
// - save_state.rs: serializable machine snapshots

mod config;
mod save_state;
mod timing;

pub use config::{ConfigError, CoreConfig, DebugConfig, MapperConfig, TimingConfig, VideoConfig};
pub use save_state::{SaveState, SaveStateError, SAVE_STATE_VERSION};

use thiserror::Error;

use crate::bus::Bus;
use crate::cartridge::mappers::MapperError;
use crate::cartridge::{Cartridge, CartridgeError};
use crate::cpu::{Cpu, CpuError};
use crate::display::{NullSink, VideoSink};
use crate::input::Controller;
use crate::ppu::Ppu;

/// Anything that stops the emulator
#[derive(Debug, Error)]
pub enum EmulatorError {
    #[error(transparent)]
    Cpu(#[from] CpuError),

    #[error(transparent)]
    Mapper(#[from] MapperError),

    #[error(transparent)]
    Cartridge(#[from] CartridgeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    SaveState(#[from] SaveStateError),
}

/// Result of one scheduler iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// One CPU step (instruction or interrupt entry) ran
    Ran {
        cycles: u32,
        /// The PPU wrapped back to the pre-render line during this step
        frame_completed: bool,
    },

    /// A requested reset was performed instead of a step
    Reset,

    /// Quit was requested; nothing ran
    Quit,
}

/// Main emulator structure
///
/// Coordinates all NES components. The video collaborator is attached as
/// a [`VideoSink`]; without one, rendered lines are dropped.
pub struct Emulator {
    cpu: Cpu,
    bus: Bus,
    config: CoreConfig,
    sink: Box<dyn VideoSink>,

    /// CPU cycles since power-on, as charged to the PPU
    total_cycles: u64,
    /// Scanlines completed since power-on
    lines_done: u64,

    reset_requested: bool,
    quit_requested: bool,
}

impl Emulator {
    /// Create a new emulator instance
    ///
    /// # Errors
    ///
    /// `EmulatorError::Config` when the timing values are unusable.
    pub fn new(config: CoreConfig) -> Result<Self, EmulatorError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: CoreConfig) -> Self {
        let ppu = Ppu::with_timing(config.timing.dots_per_scanline, config.timing.dots_per_cpu_cycle);
        let mut cpu = Cpu::new();
        cpu.trace = config.debug.trace_cpu;

        Emulator {
            cpu,
            bus: Bus::with_ppu(ppu),
            config,
            sink: Box::new(NullSink),
            total_cycles: 0,
            lines_done: 0,
            reset_requested: false,
            quit_requested: false,
        }
    }

    /// Attach the video collaborator
    ///
    /// # Returns
    ///
    /// The sink that was attached before
    pub fn set_video_sink(&mut self, sink: Box<dyn VideoSink>) -> Box<dyn VideoSink> {
        std::mem::replace(&mut self.sink, sink)
    }

    /// Insert a cartridge and power the console on
    ///
    /// # Errors
    ///
    /// `EmulatorError::Mapper` for boards the core does not emulate. The
    /// emulator is then flagged to quit.
    pub fn load_cartridge(&mut self, cartridge: Cartridge) -> Result<(), EmulatorError> {
        if let Err(e) = self.bus.insert_cartridge(cartridge, self.config.mappers.mmc3_irq) {
            self.quit_requested = true;
            return Err(e.into());
        }
        self.power_on();
        Ok(())
    }

    /// Cold start: clear RAM, reset the PPU timing and run the reset
    /// sequence
    pub fn power_on(&mut self) {
        log::info!("Power on");
        self.bus.clear_ram();
        self.bus.ppu_mut().power_on();

        let trace = self.cpu.trace;
        self.cpu = Cpu::new();
        self.cpu.trace = trace;

        self.total_cycles = 0;
        self.lines_done = 0;
        self.reset_requested = false;

        let cycles = self.cpu.reset(&mut self.bus);
        self.run_cycles(cycles);
    }

    /// Press the reset button
    ///
    /// Memory and the PPU's timing are kept. The reset sequence's cycles
    /// are charged like any other step.
    pub fn reset(&mut self) {
        log::info!("Reset");
        self.reset_requested = false;
        self.bus.ppu_mut().reset();
        let cycles = self.cpu.reset(&mut self.bus);
        self.run_cycles(cycles);
    }

    /// Ask for a reset at the next step boundary
    pub fn request_reset(&mut self) {
        self.reset_requested = true;
    }

    /// Ask the run loop to stop at the next step boundary
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    pub fn is_quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Run one scheduler iteration
    ///
    /// Pending quit and reset requests are honoured first. Otherwise the CPU
    /// executes one step and the elapsed cycles are handed to the PPU,
    /// finishing every scanline whose budget ran out.
    ///
    /// # Errors
    ///
    /// `EmulatorError::Cpu` when the CPU hits an opcode it cannot run.
    pub fn step(&mut self) -> Result<StepOutcome, EmulatorError> {
        if self.quit_requested {
            return Ok(StepOutcome::Quit);
        }
        if self.reset_requested {
            self.reset();
            return Ok(StepOutcome::Reset);
        }

        let cycles = self.cpu.step(&mut self.bus)?;
        let frame_completed = self.run_cycles(cycles);
        Ok(StepOutcome::Ran {
            cycles,
            frame_completed,
        })
    }

    /// Step until a frame completes, or a reset or quit interrupts it
    ///
    /// # Returns
    ///
    /// The outcome that ended the run
    pub fn run_frame(&mut self) -> Result<StepOutcome, EmulatorError> {
        loop {
            match self.step()? {
                StepOutcome::Ran {
                    frame_completed: false,
                    ..
                } => continue,
                outcome => return Ok(outcome),
            }
        }
    }

    // ========================================
    // Controllers
    // ========================================

    /// Replace the buttons held on a controller port (0 or 1)
    pub fn set_buttons(&mut self, port: usize, controller: Controller) {
        self.bus.controllers_mut().set_buttons(port, controller);
    }

    /// Buttons currently held on a controller port
    pub fn controller_mut(&mut self, port: usize) -> &mut Controller {
        self.bus.controllers_mut().controller_mut(port)
    }

    // ========================================
    // Snapshots
    // ========================================

    /// Capture the machine between two steps
    pub fn snapshot(&self) -> SaveState {
        SaveState::new(
            self.cpu.clone(),
            self.bus.memory().to_vec(),
            self.bus.sram_control(),
            self.bus.ppu().state(),
            self.bus.mapper().cloned(),
            self.bus.controllers().clone(),
            self.total_cycles,
            self.lines_done,
        )
    }

    /// Restore a snapshot taken with the same cartridge inserted
    ///
    /// # Errors
    ///
    /// `SaveStateError` when the snapshot is from another format version,
    /// another board or has damaged buffers. Nothing is changed then.
    pub fn restore(&mut self, state: &SaveState) -> Result<(), EmulatorError> {
        state.validate()?;

        let loaded = self.bus.mapper().map(|mapper| mapper.id());
        if state.mapper_id() != loaded {
            return Err(SaveStateError::MapperMismatch {
                expected: loaded,
                found: state.mapper_id(),
            }
            .into());
        }

        self.bus.load_memory(0, &state.memory);
        self.bus.set_sram_control(state.sram);
        if let Some(mapper) = &state.mapper {
            self.bus.set_mapper(mapper.clone());
        }
        self.bus.ppu_mut().restore_state(&state.ppu);
        *self.bus.controllers_mut() = state.controllers.clone();

        let trace = self.cpu.trace;
        self.cpu = state.cpu.clone();
        self.cpu.trace = trace;

        self.total_cycles = state.total_cycles;
        self.lines_done = state.lines_done;
        self.reset_requested = false;
        self.check_timing();
        Ok(())
    }

    // ========================================
    // Accessors
    // ========================================

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// CPU cycles since power-on
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Scanlines completed since power-on
    pub fn lines_done(&self) -> u64 {
        self.lines_done
    }

    pub fn frame_count(&self) -> u64 {
        self.bus.ppu().frame_count()
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::build(CoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::CartridgeHeader;
    use crate::input::buttons;

    /// NROM-128 image whose reset vector points at `program`
    fn cartridge(mapper_id: u8, program: &[u8]) -> Cartridge {
        let mut prg = vec![0xEA; 0x4000];
        prg[..program.len()].copy_from_slice(program);
        prg[0x3FFC] = 0x00;
        prg[0x3FFD] = 0xC0;
        let header = CartridgeHeader {
            prg_banks: 1,
            chr_banks: 1,
            mapper_id,
            ..Default::default()
        };
        Cartridge::new(header, prg, vec![0; 0x2000], None).unwrap()
    }

    fn running(program: &[u8]) -> Emulator {
        let mut emulator = Emulator::default();
        emulator.load_cartridge(cartridge(0, program)).unwrap();
        emulator
    }

    #[test]
    fn test_emulator_default() {
        let emulator = Emulator::default();
        assert_eq!(emulator.total_cycles(), 0);
        assert_eq!(emulator.lines_done(), 0);
        assert!(!emulator.is_quit_requested());
        assert_eq!(emulator.config(), &CoreConfig::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = CoreConfig::default();
        config.timing.dots_per_cpu_cycle = 0;
        assert!(matches!(Emulator::new(config), Err(EmulatorError::Config(_))));
    }

    #[test]
    fn test_load_cartridge_runs_reset() {
        let emulator = running(&[]);
        assert_eq!(emulator.cpu().pc, 0xC000, "PC from the reset vector");
        assert_eq!(emulator.total_cycles(), 7);
    }

    #[test]
    fn test_unsupported_mapper_requests_quit() {
        let mut emulator = Emulator::default();
        let result = emulator.load_cartridge(cartridge(5, &[]));

        assert!(matches!(
            result,
            Err(EmulatorError::Mapper(MapperError::UnsupportedMapper(5)))
        ));
        assert!(emulator.is_quit_requested());
        assert_eq!(emulator.step().unwrap(), StepOutcome::Quit);
    }

    #[test]
    fn test_step_reports_cycles() {
        let mut emulator = running(&[0xA9, 0x01, 0x8D, 0x00, 0x02]);

        assert_eq!(
            emulator.step().unwrap(),
            StepOutcome::Ran {
                cycles: 2,
                frame_completed: false
            }
        );
        assert_eq!(emulator.step().unwrap(), StepOutcome::Ran { cycles: 4, frame_completed: false });
        assert_eq!(emulator.bus().peek(0x0200), 0x01);
        assert_eq!(emulator.total_cycles(), 13);
    }

    #[test]
    fn test_reset_request_honoured_at_boundary() {
        let mut emulator = running(&[0xA9, 0x55]);
        emulator.step().unwrap();
        assert_eq!(emulator.cpu().a, 0x55);

        emulator.request_reset();
        assert_eq!(emulator.step().unwrap(), StepOutcome::Reset);
        assert_eq!(emulator.cpu().a, 0);
        assert_eq!(emulator.cpu().pc, 0xC000);
        assert!(matches!(emulator.step().unwrap(), StepOutcome::Ran { .. }));
    }

    #[test]
    fn test_quit_request_stops_stepping() {
        let mut emulator = running(&[]);
        emulator.request_quit();

        let cycles = emulator.total_cycles();
        assert_eq!(emulator.step().unwrap(), StepOutcome::Quit);
        assert_eq!(emulator.run_frame().unwrap(), StepOutcome::Quit);
        assert_eq!(emulator.total_cycles(), cycles);
    }

    #[test]
    fn test_cpu_error_propagates() {
        let mut emulator = running(&[0x02]);
        assert!(matches!(
            emulator.step(),
            Err(EmulatorError::Cpu(CpuError::UnimplementedOpcode {
                opcode: 0x02,
                pc: 0xC000
            }))
        ));
    }

    #[test]
    fn test_controller_setters_reach_port() {
        let mut emulator = running(&[]);
        emulator.set_buttons(0, Controller::from_bits(buttons::START));
        emulator.controller_mut(1).button_a = true;

        let io = emulator.bus_mut().controllers_mut();
        io.write_strobe(1);
        io.write_strobe(0);
        let port0: Vec<u8> = (0..4).map(|_| io.read(0)).collect();
        assert_eq!(port0, vec![0, 0, 0, 1]);
        assert_eq!(io.read(1), 1);
    }

    #[test]
    fn test_snapshot_restore() {
        // LDA #$00; loop: CLC; ADC #$01; STA $10; JMP loop
        let mut emulator = running(&[0xA9, 0x00, 0x18, 0x69, 0x01, 0x85, 0x10, 0x4C, 0x02, 0xC0]);
        for _ in 0..1000 {
            emulator.step().unwrap();
        }

        let state = emulator.snapshot();
        let json = state.to_json().unwrap();
        let pc = emulator.cpu().pc;
        let counter = emulator.bus().peek(0x0010);
        let cycles = emulator.total_cycles();

        for _ in 0..500 {
            emulator.step().unwrap();
        }
        assert_ne!(emulator.total_cycles(), cycles);

        emulator.restore(&SaveState::from_json(&json).unwrap()).unwrap();
        assert_eq!(emulator.cpu().pc, pc);
        assert_eq!(emulator.bus().peek(0x0010), counter);
        assert_eq!(emulator.total_cycles(), cycles);
        assert_eq!(emulator.snapshot().memory, state.memory);
    }

    #[test]
    fn test_restore_rejects_other_board() {
        let mut emulator = running(&[]);
        let state = Emulator::default().snapshot();

        assert!(matches!(
            emulator.restore(&state),
            Err(EmulatorError::SaveState(SaveStateError::MapperMismatch {
                expected: Some(0),
                found: None
            }))
        ));
    }
}
