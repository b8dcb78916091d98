use super::status_register::{ApuStatusRegister, FrameCounterRegister};

pub const APU_BASE: u16 = 0x4000;
pub const REGISTER_COUNT: usize = 0x20;

pub const STATUS_REG: usize = 0x15;
pub const PAD1_REG: usize = 0x16;
pub const PAD2_REG: usize = 0x17;
pub const FRAME_COUNTER_REG: usize = 0x17;

/// Raw mirror of $4000-$401F as last written by the CPU
#[derive(Debug, Clone)]
pub struct ApuRegisters {
    regs: [u8; REGISTER_COUNT],
}

impl ApuRegisters {
    pub fn new() -> Self {
        let mut registers = ApuRegisters {
            regs: [0; REGISTER_COUNT],
        };
        registers.reset();
        registers
    }

    pub fn reset(&mut self) {
        self.regs.fill(0);
        self.regs[FRAME_COUNTER_REG] = FrameCounterRegister::IRQ_INHIBIT.bits();
    }

    /// Register index for a CPU address, if it falls inside the window
    pub fn index(addr: u16) -> Option<usize> {
        let reg = addr.checked_sub(APU_BASE)? as usize;
        (reg < REGISTER_COUNT).then_some(reg)
    }

    pub fn get(&self, reg: usize) -> u8 {
        self.regs[reg]
    }

    pub fn set(&mut self, reg: usize, value: u8) {
        self.regs[reg] = value;
    }

    pub fn status(&self) -> ApuStatusRegister {
        ApuStatusRegister::from_bits_truncate(self.regs[STATUS_REG]) & ApuStatusRegister::channels()
    }

    pub fn frame_counter(&self) -> FrameCounterRegister {
        FrameCounterRegister::from_bits_truncate(self.regs[FRAME_COUNTER_REG])
    }

    pub fn pad_strobe(&self) -> bool {
        self.regs[PAD1_REG] & 1 != 0
    }

    pub fn as_bytes(&self) -> &[u8; REGISTER_COUNT] {
        &self.regs
    }

    pub fn load(&mut self, bytes: &[u8; REGISTER_COUNT]) {
        self.regs = *bytes;
    }
}

impl Default for ApuRegisters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_inhibits_frame_irq() {
        let mut regs = ApuRegisters::new();
        regs.set(FRAME_COUNTER_REG, 0);
        regs.set(0x03, 0xFF);
        regs.reset();
        assert_eq!(regs.get(0x03), 0);
        assert!(!regs.frame_counter().irq_enabled());
    }

    #[test]
    fn window_index() {
        assert_eq!(ApuRegisters::index(0x4000), Some(0));
        assert_eq!(ApuRegisters::index(0x401F), Some(0x1F));
        assert_eq!(ApuRegisters::index(0x4020), None);
        assert_eq!(ApuRegisters::index(0x3FFF), None);
    }
}
