use super::channel::{
    kind_mismatch, ChannelState, ChannelType, SoundChannel, REG_STATUS, REG_TIMER_H, REG_TIMER_L,
};
use super::units::LengthCounter;
use super::{CPU_CLOCK, LENGTH_COUNTER_HALT_TRI};
use crate::nes::save_state::SaveStateError;

const LENGTH_STEP: u8 = 4;

pub struct TriangleChannel {
    regs: [u8; 4],
    stopped: bool,
    length_counter: LengthCounter,
}

impl TriangleChannel {
    pub fn new() -> Self {
        TriangleChannel {
            regs: [0; 4],
            stopped: true,
            length_counter: LengthCounter::new(),
        }
    }

    pub fn length(&self) -> u8 {
        self.length_counter.output()
    }

    // The length comes straight from the low 7 bits of the first register
    fn reload_length(&mut self) {
        let status = self.regs[REG_STATUS];
        self.length_counter.load(status & 0x7F);
        self.length_counter.set_halt(status & LENGTH_COUNTER_HALT_TRI != 0);
        self.stopped = self.length_counter.output() == 0;
    }
}

impl Default for TriangleChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundChannel for TriangleChannel {
    fn reset(&mut self) {
        *self = TriangleChannel::new();
    }

    fn write(&mut self, reg: usize, value: u8) {
        self.regs[reg] = value;
        if reg == REG_STATUS || reg == REG_TIMER_H {
            self.reload_length();
        }
    }

    fn volume(&self) -> f32 {
        if self.stopped { 0.0 } else { 1.0 }
    }

    fn frequency(&self) -> u32 {
        let timer = self.regs[REG_TIMER_L] as u32 | ((self.regs[REG_TIMER_H] as u32 & 0x07) << 8);
        CPU_CLOCK / 32 / (timer + 1)
    }

    fn set_enable(&mut self, enabled: bool) {
        if !enabled {
            self.stopped = true;
        }
    }

    fn update(&mut self) {
        if self.stopped {
            return;
        }
        if self.length_counter.clock(LENGTH_STEP) {
            self.stopped = true;
        }
    }

    fn is_playing(&self) -> bool {
        !self.stopped
    }

    fn save(&self) -> ChannelState {
        ChannelState::Triangle {
            regs: self.regs,
            stopped: self.stopped,
            length: self.length_counter.output(),
        }
    }

    fn load(&mut self, state: &ChannelState) -> Result<(), SaveStateError> {
        let ChannelState::Triangle {
            regs,
            stopped,
            length,
        } = state
        else {
            return Err(kind_mismatch(ChannelType::Triangle, state));
        };
        self.regs = *regs;
        self.stopped = *stopped;
        self.length_counter.load(*length);
        self.length_counter
            .set_halt(regs[REG_STATUS] & LENGTH_COUNTER_HALT_TRI != 0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_length_write_stops() {
        let mut tri = TriangleChannel::new();
        tri.write(REG_STATUS, 0x00);
        assert!(!tri.is_playing());
        tri.write(REG_STATUS, 0x09);
        assert!(tri.is_playing());
        assert_eq!(tri.length(), 9);
    }

    #[test]
    fn timer_high_write_reloads_from_status() {
        let mut tri = TriangleChannel::new();
        tri.write(REG_STATUS, 0x05);
        tri.update();
        assert_eq!(tri.length(), 1);
        tri.write(REG_TIMER_H, 0x00);
        assert_eq!(tri.length(), 5);
    }

    #[test]
    fn halt_bit_is_bit_seven() {
        let mut tri = TriangleChannel::new();
        tri.write(REG_STATUS, LENGTH_COUNTER_HALT_TRI | 0x04);
        for _ in 0..50 {
            tri.update();
        }
        assert_eq!(tri.length(), 4);
        assert!(tri.is_playing());
    }

    #[test]
    fn runs_out_after_length_expires() {
        let mut tri = TriangleChannel::new();
        tri.write(REG_STATUS, 0x08);
        tri.update(); // 4
        tri.update(); // 0
        assert!(tri.is_playing());
        tri.update();
        assert!(!tri.is_playing());
        assert_eq!(tri.volume(), 0.0);
    }

    #[test]
    fn frequency_uses_divide_by_32() {
        let mut tri = TriangleChannel::new();
        tri.write(REG_TIMER_L, 0x3F);
        assert_eq!(tri.frequency(), CPU_CLOCK / 32 / 0x40);
    }
}
