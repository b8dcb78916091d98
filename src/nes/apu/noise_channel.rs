use super::channel::{
    kind_mismatch, ChannelState, ChannelType, SoundChannel, REG_STATUS, REG_TIMER_H, REG_TIMER_L,
};
use super::units::LengthCounter;
use super::{CONSTANT_VOLUME, LENGTH_COUNTER_HALT, NOISE_FREQUENCIES};
use crate::nes::save_state::SaveStateError;

const LENGTH_STEP: u8 = 1;
// Bit 7 of the period register; keeps the channel alive with an exhausted counter
const NOISE_MODE: u8 = 0x80;

pub struct NoiseChannel {
    regs: [u8; 4],
    stopped: bool,
    length_counter: LengthCounter,
}

impl NoiseChannel {
    pub fn new() -> Self {
        NoiseChannel {
            regs: [0; 4],
            stopped: true,
            length_counter: LengthCounter::new(),
        }
    }

    pub fn length(&self) -> u8 {
        self.length_counter.output()
    }
}

impl Default for NoiseChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundChannel for NoiseChannel {
    fn reset(&mut self) {
        *self = NoiseChannel::new();
    }

    fn write(&mut self, reg: usize, value: u8) {
        self.regs[reg] = value;
        match reg {
            REG_STATUS => self.length_counter.set_halt(value & LENGTH_COUNTER_HALT != 0),
            REG_TIMER_H => {
                self.length_counter.load_index(value >> 3);
                self.stopped = false;
            }
            _ => {}
        }
    }

    fn volume(&self) -> f32 {
        if self.stopped {
            return 0.0;
        }
        let status = self.regs[REG_STATUS];
        if status & CONSTANT_VOLUME != 0 {
            (status & 0x0F) as f32 / 15.0
        } else {
            1.0
        }
    }

    fn frequency(&self) -> u32 {
        NOISE_FREQUENCIES[(self.regs[REG_TIMER_L] & 0x0F) as usize]
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
        if self.length_counter.clock(LENGTH_STEP) && self.regs[REG_TIMER_L] & NOISE_MODE == 0 {
            self.stopped = true;
        }
    }

    fn is_playing(&self) -> bool {
        !self.stopped
    }

    fn save(&self) -> ChannelState {
        ChannelState::Noise {
            regs: self.regs,
            stopped: self.stopped,
            length: self.length_counter.output(),
        }
    }

    fn load(&mut self, state: &ChannelState) -> Result<(), SaveStateError> {
        let ChannelState::Noise {
            regs,
            stopped,
            length,
        } = state
        else {
            return Err(kind_mismatch(ChannelType::Noise, state));
        };
        self.regs = *regs;
        self.stopped = *stopped;
        self.length_counter.load(*length);
        self.length_counter
            .set_halt(regs[REG_STATUS] & LENGTH_COUNTER_HALT != 0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_steps_by_one() {
        let mut noise = NoiseChannel::new();
        noise.write(REG_TIMER_H, 0x18); // index 3 -> 2
        noise.update();
        assert_eq!(noise.length(), 1);
        noise.update();
        assert_eq!(noise.length(), 0);
        assert!(noise.is_playing());
        noise.update();
        assert!(!noise.is_playing());
    }

    #[test]
    fn mode_bit_keeps_exhausted_channel_alive() {
        let mut noise = NoiseChannel::new();
        noise.write(REG_TIMER_L, NOISE_MODE);
        noise.write(REG_TIMER_H, 0x18);
        for _ in 0..10 {
            noise.update();
        }
        assert_eq!(noise.length(), 0);
        assert!(noise.is_playing());
    }

    #[test]
    fn halt_is_bit_five() {
        let mut noise = NoiseChannel::new();
        noise.write(REG_STATUS, LENGTH_COUNTER_HALT);
        noise.write(REG_TIMER_H, 0x18);
        for _ in 0..10 {
            noise.update();
        }
        assert_eq!(noise.length(), 2);
    }

    #[test]
    fn volume_and_frequency() {
        let mut noise = NoiseChannel::new();
        noise.write(REG_TIMER_H, 0x08);
        assert_eq!(noise.volume(), 1.0);
        noise.write(REG_STATUS, CONSTANT_VOLUME | 0x03);
        assert_eq!(noise.volume(), 3.0 / 15.0);
        noise.write(REG_TIMER_L, 0x0F);
        assert_eq!(noise.frequency(), 4068);
    }
}
