// Register transfer instructions for 6502 CPU

use crate::cpu::Cpu;

impl Cpu {
    /// TAX - Transfer A to X
    pub fn tax(&mut self) {
        self.x = self.a;
        self.update_zero_and_negative_flags(self.x);
    }

    /// TAY - Transfer A to Y
    pub fn tay(&mut self) {
        self.y = self.a;
        self.update_zero_and_negative_flags(self.y);
    }

    /// TSX - Transfer S to X
    pub fn tsx(&mut self) {
        self.x = self.sp;
        self.update_zero_and_negative_flags(self.x);
    }

    /// TXA - Transfer X to A
    pub fn txa(&mut self) {
        self.a = self.x;
        self.update_zero_and_negative_flags(self.a);
    }

    /// TXS - Transfer X to S
    ///
    /// The only transfer that leaves the flags alone.
    pub fn txs(&mut self) {
        self.sp = self.x;
    }

    /// TYA - Transfer Y to A
    pub fn tya(&mut self) {
        self.a = self.y;
        self.update_zero_and_negative_flags(self.a);
    }
}
