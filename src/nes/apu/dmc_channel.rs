use super::channel::{
    kind_mismatch, ChannelState, ChannelType, SoundChannel, REG_STATUS, REG_TIMER_H, REG_TIMER_L,
};
use super::{CONSTANT_VOLUME, NOISE_FREQUENCIES};
use crate::nes::save_state::SaveStateError;

/// $4010 bits
const DMC_IRQ_ENABLE: u8 = 0x80;
const DMC_LOOP: u8 = 0x40;

/// Longest sample, `$4013 = $F0`
pub const MAX_SAMPLE_LENGTH: u16 = 128;

/// Power-on value of the sample length register
const INITIAL_SAMPLE_LENGTH: u16 = 1;

/// True for lengths a `$4013` write (or power-on) can produce
pub fn is_sample_length(length: u16) -> bool {
    length == INITIAL_SAMPLE_LENGTH
        || (length % 8 == 0 && (8..=MAX_SAMPLE_LENGTH).contains(&length))
}

/// Delta modulation channel, modelled as a DMA byte countdown ticked per scanline
pub struct DmcChannel {
    regs: [u8; 4],
    stopped: bool,
    regs_length: u16,
    dma_length: u16,
}

impl DmcChannel {
    pub fn new() -> Self {
        DmcChannel {
            regs: [0; 4],
            stopped: true,
            regs_length: INITIAL_SAMPLE_LENGTH,
            dma_length: 0,
        }
    }

    pub fn dma_length(&self) -> u16 {
        self.dma_length
    }

    pub fn regs_length(&self) -> u16 {
        self.regs_length
    }

    /// Per-scanline tick. Returns true when the sample ran out with IRQ enabled.
    pub fn on_hblank(&mut self) -> bool {
        if self.stopped {
            return false;
        }

        if self.dma_length == 0 {
            if self.regs[REG_STATUS] & DMC_LOOP != 0 {
                self.dma_length = self.regs_length;
            } else {
                self.stopped = true;
                return self.regs[REG_STATUS] & DMC_IRQ_ENABLE != 0;
            }
        } else {
            self.dma_length -= 1;
        }
        false
    }
}

impl Default for DmcChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundChannel for DmcChannel {
    fn reset(&mut self) {
        *self = DmcChannel::new();
    }

    fn write(&mut self, reg: usize, value: u8) {
        self.regs[reg] = value;
        if reg == REG_TIMER_H {
            self.regs_length = ((value as u16 >> 4) + 1) * 8;
            self.stopped = false;
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
        self.stopped = !enabled;
        if enabled {
            if self.dma_length == 0 {
                self.dma_length = self.regs_length;
            }
        } else {
            self.dma_length = 0;
        }
    }

    // Counting happens per scanline in `on_hblank`
    fn update(&mut self) {}

    fn is_playing(&self) -> bool {
        !self.stopped
    }

    fn save(&self) -> ChannelState {
        ChannelState::Dmc {
            regs: self.regs,
            stopped: self.stopped,
            regs_length: self.regs_length,
            dma_length: self.dma_length,
        }
    }

    fn load(&mut self, state: &ChannelState) -> Result<(), SaveStateError> {
        let ChannelState::Dmc {
            regs,
            stopped,
            regs_length,
            dma_length,
        } = state
        else {
            return Err(kind_mismatch(ChannelType::Dmc, state));
        };
        self.regs = *regs;
        self.stopped = *stopped;
        self.regs_length = *regs_length;
        self.dma_length = *dma_length;
        Ok(())
    }
}
