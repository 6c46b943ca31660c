// APU module - Audio register port
//
// Sound synthesis lives outside the core. The bus forwards APU register
// writes ($4000-$4013, $4015, $4017) and $4015 status reads to an
// `AudioSink` when one is attached, and keeps the last written values so
// the port can be inspected and snapshotted.

use std::fmt;

/// First APU register address
pub const APU_REGISTER_START: u16 = 0x4000;

/// Number of register slots covered by the port ($4000-$4017)
const REGISTER_COUNT: usize = 0x18;

/// Consumer of APU register traffic
pub trait AudioSink {
    /// Receive a register write
    ///
    /// # Arguments
    /// * `addr` - Register address ($4000-$4013, $4015 or $4017)
    /// * `value` - Value written by the CPU
    fn write_register(&mut self, addr: u16, value: u8);

    /// Value of the $4015 status register
    fn read_status(&mut self) -> u8;
}

/// APU register port owned by the bus
#[derive(Default)]
pub struct ApuPort {
    registers: [u8; REGISTER_COUNT],
    sink: Option<Box<dyn AudioSink>>,
}

impl ApuPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the audio collaborator, replacing any previous one
    pub fn attach_sink(&mut self, sink: Box<dyn AudioSink>) {
        self.sink = Some(sink);
    }

    /// Detach and return the audio collaborator
    pub fn detach_sink(&mut self) -> Option<Box<dyn AudioSink>> {
        self.sink.take()
    }

    /// Handle a CPU write in $4000-$4017
    ///
    /// $4014 (OAM DMA) and $4016 (controller strobe) belong to other
    /// devices and are ignored here.
    pub fn write_register(&mut self, addr: u16, value: u8) {
        if !Self::is_audio_register(addr) {
            return;
        }

        self.registers[(addr - APU_REGISTER_START) as usize] = value;
        if let Some(sink) = self.sink.as_mut() {
            sink.write_register(addr, value);
        }
    }

    /// Handle a CPU read of $4015
    ///
    /// Without a sink no channel is ever active, so the status reads 0.
    pub fn read_status(&mut self) -> u8 {
        self.sink.as_mut().map_or(0, |sink| sink.read_status())
    }

    /// Last value written to an APU register
    pub fn register(&self, addr: u16) -> Option<u8> {
        Self::is_audio_register(addr).then(|| self.registers[(addr - APU_REGISTER_START) as usize])
    }

    fn is_audio_register(addr: u16) -> bool {
        matches!(addr, 0x4000..=0x4013 | 0x4015 | 0x4017)
    }
}

impl fmt::Debug for ApuPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApuPort")
            .field("registers", &self.registers)
            .field("sink_attached", &self.sink.is_some())
            .finish()
    }
}
