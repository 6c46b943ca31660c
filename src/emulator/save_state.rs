// Save state functionality
//
// A snapshot of the whole machine between two scheduler steps, serialized
// with serde_json. Writing it somewhere is the caller's business.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bus::{SramControl, MEMORY_SIZE};
use crate::cartridge::mappers::Mapper;
use crate::cpu::Cpu;
use crate::input::ControllerIO;
use crate::ppu::PpuState;

/// Errors that can occur during save state operations
#[derive(Debug, Error)]
pub enum SaveStateError {
    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Save state version mismatch
    #[error("version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    /// The snapshot was taken with a different board inserted
    #[error("snapshot is for mapper {found:?}, but mapper {expected:?} is loaded")]
    MapperMismatch {
        expected: Option<u8>,
        found: Option<u8>,
    },

    /// A buffer has the wrong size
    #[error("corrupt save state: {0}")]
    Corrupt(String),
}

/// Current save state format version
pub const SAVE_STATE_VERSION: u32 = 1;

/// Complete emulator save state
///
/// Contains all the state needed to restore the emulator to an exact point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveState {
    /// Version number for compatibility checking
    pub version: u32,

    /// Timestamp when the save state was created (RFC 3339)
    pub timestamp: String,

    /// CPU registers, interrupt inputs and cycle count
    pub cpu: Cpu,

    /// Full 64 KiB CPU address space backing store
    pub memory: Vec<u8>,

    pub sram: SramControl,

    /// VRAM, OAM, registers and timing
    pub ppu: PpuState,

    /// Mapper registers, `None` without a cartridge
    pub mapper: Option<Mapper>,

    pub controllers: ControllerIO,

    /// Scheduler counters
    pub total_cycles: u64,
    pub lines_done: u64,
}

impl SaveState {
    /// Stamp a new state with the current version and local time
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        cpu: Cpu,
        memory: Vec<u8>,
        sram: SramControl,
        ppu: PpuState,
        mapper: Option<Mapper>,
        controllers: ControllerIO,
        total_cycles: u64,
        lines_done: u64,
    ) -> Self {
        SaveState {
            version: SAVE_STATE_VERSION,
            timestamp: chrono::Local::now().to_rfc3339(),
            cpu,
            memory,
            sram,
            ppu,
            mapper,
            controllers,
            total_cycles,
            lines_done,
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, SaveStateError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON and check the format version
    pub fn from_json(json: &str) -> Result<Self, SaveStateError> {
        let state: SaveState = serde_json::from_str(json)?;
        state.check_version()?;
        Ok(state)
    }

    /// Mapper id the snapshot was taken with
    pub fn mapper_id(&self) -> Option<u8> {
        self.mapper.as_ref().map(Mapper::id)
    }

    /// Reject states from another format version or with damaged buffers
    pub fn validate(&self) -> Result<(), SaveStateError> {
        self.check_version()?;
        if self.memory.len() != MEMORY_SIZE {
            return Err(SaveStateError::Corrupt(format!(
                "memory is {} bytes, expected {}",
                self.memory.len(),
                MEMORY_SIZE
            )));
        }
        Ok(())
    }

    fn check_version(&self) -> Result<(), SaveStateError> {
        if self.version != SAVE_STATE_VERSION {
            return Err(SaveStateError::VersionMismatch {
                expected: SAVE_STATE_VERSION,
                found: self.version,
            });
        }
        Ok(())
    }
}
