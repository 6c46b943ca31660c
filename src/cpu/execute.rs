// CPU execution and trace logging module

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::opcodes::{self, ExtraCycles, Instruction, Mnemonic};
use crate::cpu::{Cpu, CpuError};
use crate::debug::disassembler;

impl Cpu {
    /// Execute one CPU step
    ///
    /// A step is either the entry into a pending interrupt (NMI first, then
    /// IRQ when the line is asserted and I is clear) or one instruction:
    /// fetch the opcode, look up its descriptor, resolve the operand, move
    /// PC past the instruction and run it.
    ///
    /// # Returns
    ///
    /// Cycles consumed: base cost, +1 for page-crossing reads, branch
    /// penalties and any stall cycles the bus accumulated (OAM DMA).
    ///
    /// # Errors
    ///
    /// `CpuError::UnimplementedOpcode` when PC points at a slot without
    /// semantics. Registers and memory are left untouched in that case.
    pub fn step(&mut self, bus: &mut Bus) -> Result<u32, CpuError> {
        if self.nmi_pending() {
            return Ok(self.nmi(bus));
        }
        if self.irq_line() && !self.get_interrupt_disable() {
            return Ok(self.irq(bus));
        }

        let pc = self.pc;
        let opcode = bus.fetch(pc);
        let instruction = opcodes::describe(opcode).map_err(|_| {
            log::warn!("Halting on opcode ${:02X} at ${:04X}", opcode, pc);
            CpuError::UnimplementedOpcode { opcode, pc }
        })?;

        if self.trace && log::log_enabled!(log::Level::Trace) {
            log::trace!("{}", self.trace_line(bus));
        }

        let operand = self.resolve(instruction, pc, bus);
        self.pc = pc.wrapping_add(instruction.bytes as u16);

        let extra = self.execute_instruction(instruction, &operand, bus, pc)?;

        let mut cycles = instruction.cycles as u32 + extra;
        if instruction.extra == ExtraCycles::PageCross && operand.page_crossed {
            cycles += 1;
        }
        cycles += bus.take_stall_cycles();

        self.cycles = self.cycles.wrapping_add(cycles as u64);
        Ok(cycles)
    }

    /// Dispatch on the mnemonic
    ///
    /// Returns the extra cycles consumed by taken branches.
    #[allow(clippy::too_many_lines)]
    fn execute_instruction(
        &mut self,
        instruction: &Instruction,
        operand: &AddressingResult,
        bus: &mut Bus,
        pc: u16,
    ) -> Result<u32, CpuError> {
        match instruction.mnemonic {
            // Load/Store
            Mnemonic::Lda => self.lda(bus, operand),
            Mnemonic::Ldx => self.ldx(bus, operand),
            Mnemonic::Ldy => self.ldy(bus, operand),
            Mnemonic::Sta => self.sta(bus, operand),
            Mnemonic::Stx => self.stx(bus, operand),
            Mnemonic::Sty => self.sty(bus, operand),

            // Arithmetic
            Mnemonic::Adc => self.adc(bus, operand),
            Mnemonic::Sbc => self.sbc(bus, operand),
            Mnemonic::Inc => self.inc(bus, operand),
            Mnemonic::Inx => self.inx(),
            Mnemonic::Iny => self.iny(),
            Mnemonic::Dec => self.dec(bus, operand),
            Mnemonic::Dex => self.dex(),
            Mnemonic::Dey => self.dey(),

            // Logic
            Mnemonic::And => self.and(bus, operand),
            Mnemonic::Ora => self.ora(bus, operand),
            Mnemonic::Eor => self.eor(bus, operand),
            Mnemonic::Bit => self.bit(bus, operand),

            // Shift/Rotate
            Mnemonic::Asl => {
                self.asl(bus, operand);
            }
            Mnemonic::Lsr => {
                self.lsr(bus, operand);
            }
            Mnemonic::Rol => {
                self.rol(bus, operand);
            }
            Mnemonic::Ror => {
                self.ror(bus, operand);
            }

            // Compare
            Mnemonic::Cmp => self.cmp(bus, operand),
            Mnemonic::Cpx => self.cpx(bus, operand),
            Mnemonic::Cpy => self.cpy(bus, operand),

            // Branches
            Mnemonic::Bcc => return Ok(self.bcc(operand)),
            Mnemonic::Bcs => return Ok(self.bcs(operand)),
            Mnemonic::Beq => return Ok(self.beq(operand)),
            Mnemonic::Bmi => return Ok(self.bmi(operand)),
            Mnemonic::Bne => return Ok(self.bne(operand)),
            Mnemonic::Bpl => return Ok(self.bpl(operand)),
            Mnemonic::Bvc => return Ok(self.bvc(operand)),
            Mnemonic::Bvs => return Ok(self.bvs(operand)),

            // Jump/Subroutine
            Mnemonic::Jmp => self.jmp(operand),
            Mnemonic::Jsr => self.jsr(bus, operand),
            Mnemonic::Rts => self.rts(bus),
            Mnemonic::Rti => self.rti(bus),

            // Stack
            Mnemonic::Pha => self.pha(bus),
            Mnemonic::Php => self.php(bus),
            Mnemonic::Pla => self.pla(bus),
            Mnemonic::Plp => self.plp(bus),

            // Flags
            Mnemonic::Clc => self.clc(),
            Mnemonic::Cld => self.cld(),
            Mnemonic::Cli => self.cli(),
            Mnemonic::Clv => self.clv(),
            Mnemonic::Sec => self.sec(),
            Mnemonic::Sed => self.sed(),
            Mnemonic::Sei => self.sei(),

            // Transfer
            Mnemonic::Tax => self.tax(),
            Mnemonic::Tay => self.tay(),
            Mnemonic::Tsx => self.tsx(),
            Mnemonic::Txa => self.txa(),
            Mnemonic::Txs => self.txs(),
            Mnemonic::Tya => self.tya(),

            // Miscellaneous
            Mnemonic::Brk => self.brk(bus),
            Mnemonic::Nop => self.nop(bus, operand),

            // Stable undocumented
            Mnemonic::Lax => self.lax(bus, operand),
            Mnemonic::Sax => self.sax(bus, operand),
            Mnemonic::Dcp => self.dcp(bus, operand),
            Mnemonic::Isb => self.isb(bus, operand),
            Mnemonic::Slo => self.slo(bus, operand),
            Mnemonic::Rla => self.rla(bus, operand),
            Mnemonic::Sre => self.sre(bus, operand),
            Mnemonic::Rra => self.rra(bus, operand),
            Mnemonic::Anc => self.anc(bus, operand),
            Mnemonic::Alr => self.alr(bus, operand),
            Mnemonic::Arr => self.arr(bus, operand),
            Mnemonic::Axs => self.axs(bus, operand),
            Mnemonic::Las => self.las(bus, operand),

            Mnemonic::Jam
            | Mnemonic::Xaa
            | Mnemonic::Lxa
            | Mnemonic::Ahx
            | Mnemonic::Tas
            | Mnemonic::Shx
            | Mnemonic::Shy => {
                return Err(CpuError::UnimplementedOpcode {
                    opcode: instruction.opcode,
                    pc,
                })
            }
        }

        Ok(0)
    }

    /// Generate a trace log line in nestest format
    ///
    /// Format: PC  OP OP OP  MNEMONIC OPERAND   A:XX X:XX Y:XX P:XX SP:XX CYC:N
    /// Example: C000  4C F5 C5  JMP $C5F5       A:00 X:00 Y:00 P:24 SP:FD CYC:7
    ///
    /// Uses side-effect-free reads so tracing never disturbs PPU or
    /// controller state.
    pub fn trace_line(&self, bus: &Bus) -> String {
        let pc = self.pc;
        let instruction = opcodes::lookup(bus.peek(pc));

        let hex_bytes = (0..3u16)
            .map(|i| {
                if i < instruction.bytes as u16 {
                    format!("{:02X}", bus.peek(pc.wrapping_add(i)))
                } else {
                    "  ".to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");

        let prefix = if instruction.official { ' ' } else { '*' };
        let disassembly = disassembler::annotate(self, bus, pc);

        format!(
            "{:04X}  {} {}{:<32}A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            pc, hex_bytes, prefix, disassembly, self.a, self.x, self.y, self.status, self.sp, self.cycles
        )
    }
}
