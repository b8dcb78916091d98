use serde::{Deserialize, Serialize};

use super::dmc_channel::{is_sample_length, DmcChannel, MAX_SAMPLE_LENGTH};
use super::noise_channel::NoiseChannel;
use super::pulse_channel::PulseChannel;
use super::triangle_channel::TriangleChannel;
use super::units::envelope::ENVELOPE_DIVIDER_RANGE;
use super::units::sweep::SWEEP_COUNTER_RANGE;
use crate::nes::save_state::SaveStateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelType {
    Pulse,
    Triangle,
    Noise,
    Dmc,
}

/// Per-register index within a channel's 4-byte block
pub const REG_STATUS: usize = 0;
pub const REG_SWEEP: usize = 1;
pub const REG_TIMER_L: usize = 2;
pub const REG_TIMER_H: usize = 3;

pub trait SoundChannel {
    fn reset(&mut self);
    fn write(&mut self, reg: usize, value: u8);
    /// 0.0 ..= 1.0
    fn volume(&self) -> f32;
    /// Hz
    fn frequency(&self) -> u32;
    fn duty_ratio(&self) -> f32 {
        0.5
    }
    fn set_enable(&mut self, enabled: bool);
    /// Once-per-frame tick at vblank start
    fn update(&mut self);
    fn is_playing(&self) -> bool;

    fn save(&self) -> ChannelState;
    fn load(&mut self, state: &ChannelState) -> Result<(), SaveStateError>;
}

pub enum Channel {
    Pulse(PulseChannel),
    Triangle(TriangleChannel),
    Noise(NoiseChannel),
    Dmc(DmcChannel),
}

impl Channel {
    pub fn channel_type(&self) -> ChannelType {
        match self {
            Channel::Pulse(_) => ChannelType::Pulse,
            Channel::Triangle(_) => ChannelType::Triangle,
            Channel::Noise(_) => ChannelType::Noise,
            Channel::Dmc(_) => ChannelType::Dmc,
        }
    }

    pub fn sound(&self) -> &dyn SoundChannel {
        match self {
            Channel::Pulse(ch) => ch,
            Channel::Triangle(ch) => ch,
            Channel::Noise(ch) => ch,
            Channel::Dmc(ch) => ch,
        }
    }

    pub fn sound_mut(&mut self) -> &mut dyn SoundChannel {
        match self {
            Channel::Pulse(ch) => ch,
            Channel::Triangle(ch) => ch,
            Channel::Noise(ch) => ch,
            Channel::Dmc(ch) => ch,
        }
    }
}

/// Snapshot of one channel: raw registers plus running counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ChannelState {
    Pulse {
        regs: [u8; 4],
        stopped: bool,
        length: u8,
        envelope_divider: i16,
        envelope_decay: u8,
        envelope_restart: bool,
        sweep_counter: i16,
    },
    Triangle {
        regs: [u8; 4],
        stopped: bool,
        length: u8,
    },
    Noise {
        regs: [u8; 4],
        stopped: bool,
        length: u8,
    },
    Dmc {
        regs: [u8; 4],
        stopped: bool,
        regs_length: u16,
        dma_length: u16,
    },
}

impl ChannelState {
    pub fn channel_type(&self) -> ChannelType {
        match self {
            ChannelState::Pulse { .. } => ChannelType::Pulse,
            ChannelState::Triangle { .. } => ChannelType::Triangle,
            ChannelState::Noise { .. } => ChannelType::Noise,
            ChannelState::Dmc { .. } => ChannelType::Dmc,
        }
    }

    /// Rejects counters no sequence of register writes and ticks can produce
    pub fn validate(&self) -> Result<(), SaveStateError> {
        match self {
            ChannelState::Pulse {
                envelope_divider,
                envelope_decay,
                sweep_counter,
                ..
            } => {
                if !ENVELOPE_DIVIDER_RANGE.contains(envelope_divider) {
                    return Err(out_of_range("pulse envelope divider", *envelope_divider));
                }
                if *envelope_decay > 15 {
                    return Err(out_of_range("pulse envelope decay", *envelope_decay));
                }
                if !SWEEP_COUNTER_RANGE.contains(sweep_counter) {
                    return Err(out_of_range("pulse sweep counter", *sweep_counter));
                }
            }
            ChannelState::Dmc {
                regs_length,
                dma_length,
                ..
            } => {
                if !is_sample_length(*regs_length) {
                    return Err(out_of_range("dmc sample length", *regs_length));
                }
                if *dma_length > MAX_SAMPLE_LENGTH {
                    return Err(out_of_range("dmc dma length", *dma_length));
                }
            }
            ChannelState::Triangle { .. } | ChannelState::Noise { .. } => {}
        }
        Ok(())
    }
}

fn out_of_range(field: &str, value: impl std::fmt::Display) -> SaveStateError {
    SaveStateError::Corrupt(format!("{} {} out of range", field, value))
}

pub(super) fn kind_mismatch(expected: ChannelType, state: &ChannelState) -> SaveStateError {
    SaveStateError::Corrupt(format!(
        "expected {:?} channel state, found {:?}",
        expected,
        state.channel_type()
    ))
}
