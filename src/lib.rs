// NES Core Library
// Cycle-counted NES emulation: CPU, PPU, cartridge mappers and the
// scheduler that keeps them in step. Audio, video and input devices are
// collaborators reached through the `AudioSink`, `VideoSink` and
// controller APIs.

// Public modules
pub mod apu;
pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod debug;
pub mod display;
pub mod emulator;
pub mod input;
pub mod ppu;

// Re-export main types for convenience
pub use apu::{ApuPort, AudioSink};
pub use bus::{Bus, SramControl};
pub use cartridge::mappers::{Mapper, MapperError, Mmc3IrqMode};
pub use cartridge::{Cartridge, CartridgeError, CartridgeHeader, Mirroring};
pub use cpu::{Cpu, CpuError};
pub use debug::{disassemble, DisassembledInstruction};
pub use display::{FrameBuffer, NullSink, Rgb, VideoSink};
pub use emulator::{
    ConfigError, CoreConfig, Emulator, EmulatorError, SaveState, SaveStateError, StepOutcome,
};
pub use input::{Controller, ControllerIO};
pub use ppu::Ppu;
