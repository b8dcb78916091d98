use serde::{Deserialize, Serialize};

use crate::nes::controller::{GamePad, PadButtons};
use crate::nes::cpu::interrupts::IrqCallback;
use crate::nes::save_state::SaveStateError;
use channel::Channel;
use dmc_channel::DmcChannel;
use noise_channel::NoiseChannel;
use pulse_channel::PulseChannel;
use registers::{ApuRegisters, PAD1_REG, PAD2_REG, REGISTER_COUNT, STATUS_REG};
use status_register::ApuStatusRegister;
use triangle_channel::TriangleChannel;

pub mod channel;
pub mod dmc_channel;
pub mod noise_channel;
pub mod pulse_channel;
pub mod registers;
pub mod status_register;
pub mod triangle_channel;
pub mod units;

pub use channel::{ChannelState, ChannelType};

pub const CPU_CLOCK: u32 = 1_789_773; // Hz
pub const CHANNEL_COUNT: usize = 5;
pub const VBLANK_START: u16 = 241;

pub(crate) const CONSTANT_VOLUME: u8 = 0x10;
pub(crate) const LENGTH_COUNTER_HALT: u8 = 0x20;
pub(crate) const LENGTH_COUNTER_HALT_TRI: u8 = 0x80;

pub(crate) const NOISE_FREQUENCIES: [u32; 16] = [
    4, 8, 16, 32, 64, 96, 128, 160, 202, 254, 380, 508, 762, 1016, 2034, 4068,
];

pub const CHANNEL_TYPES: [ChannelType; CHANNEL_COUNT] = [
    ChannelType::Pulse,
    ChannelType::Pulse,
    ChannelType::Triangle,
    ChannelType::Noise,
    ChannelType::Dmc,
];

const DMC_CHANNEL: usize = 4;

/// Serializable APU snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApuState {
    pub regs: Vec<u8>,
    pub frame_interrupt: bool,
    pub dmc_interrupt: bool,
    pub channels: Vec<ChannelState>,
}

/// Register-driven sound unit at $4000-$401F, plus the pad ports at $4016/$4017.
///
/// Channels are advanced per scanline by [`Apu::on_hblank`]; sample synthesis is
/// left to the host, which polls `volume`/`frequency`/`duty_ratio`.
pub struct Apu {
    registers: ApuRegisters,
    channels: [Channel; CHANNEL_COUNT],
    frame_interrupt: bool,
    dmc_interrupt: bool,
    gamepad: GamePad,
    trigger_irq: IrqCallback,
}

impl Apu {
    pub fn new(trigger_irq: IrqCallback) -> Apu {
        Apu {
            registers: ApuRegisters::new(),
            channels: [
                Channel::Pulse(PulseChannel::new()),
                Channel::Pulse(PulseChannel::new()),
                Channel::Triangle(TriangleChannel::new()),
                Channel::Noise(NoiseChannel::new()),
                Channel::Dmc(DmcChannel::new()),
            ],
            frame_interrupt: false,
            dmc_interrupt: false,
            gamepad: GamePad::new(),
            trigger_irq,
        }
    }

    pub fn channel_types(&self) -> &'static [ChannelType; CHANNEL_COUNT] {
        &CHANNEL_TYPES
    }

    pub fn reset(&mut self) {
        self.registers.reset();
        self.frame_interrupt = false;
        self.dmc_interrupt = false;
        for channel in self.channels.iter_mut() {
            channel.sound_mut().reset();
        }
    }

    pub fn read(&mut self, addr: u16) -> u8 {
        let Some(reg) = ApuRegisters::index(addr) else {
            return 0;
        };
        match reg {
            STATUS_REG => {
                let mut result = ApuStatusRegister::empty();
                result.set(ApuStatusRegister::DMC_INTERRUPT, self.dmc_interrupt);
                result.set(ApuStatusRegister::FRAME_INTERRUPT, self.frame_interrupt);
                let enabled = self.registers.status();
                for (ch, channel) in self.channels.iter().enumerate() {
                    let bit = ApuStatusRegister::channel(ch);
                    if enabled.contains(bit) && channel.sound().is_playing() {
                        result.insert(bit);
                    }
                }

                // Reading clears the frame interrupt flag but not the DMC one
                self.frame_interrupt = false;
                result.bits()
            }
            PAD1_REG | PAD2_REG => self.gamepad.shift(reg - PAD1_REG),
            _ => 0,
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        let Some(reg) = ApuRegisters::index(addr) else {
            return;
        };
        let strobe_was_high = self.registers.pad_strobe();
        self.registers.set(reg, value);

        if reg < 0x14 {
            let ch = reg >> 2;
            self.channels[ch].sound_mut().write(reg & 3, value);
        }

        match reg {
            STATUS_REG => {
                self.dmc_interrupt = false;
                for (ch, channel) in self.channels.iter_mut().enumerate() {
                    channel.sound_mut().set_enable(value & (1 << ch) != 0);
                }
            }
            PAD1_REG => {
                // Controller strobe: bit0 1 -> 0 latches both pads
                if strobe_was_high && !self.registers.pad_strobe() {
                    self.gamepad.latch();
                }
            }
            _ => {}
        }
    }

    /// Called once per scanline by the frame driver
    pub fn on_hblank(&mut self, scanline: u16) {
        let dmc_irq = match &mut self.channels[DMC_CHANNEL] {
            Channel::Dmc(dmc) => dmc.on_hblank(),
            _ => false,
        };
        if dmc_irq {
            self.dmc_interrupt = true;
            (self.trigger_irq)();
        }

        if scanline == VBLANK_START {
            for channel in self.channels.iter_mut() {
                channel.sound_mut().update();
            }
            if self.registers.frame_counter().irq_enabled() {
                self.frame_interrupt = true;
                (self.trigger_irq)();
            }
        }
    }

    /// 0.0 ..= 1.0; silent while the channel's $4015 enable bit is clear
    pub fn volume(&self, ch: usize) -> f32 {
        if ch >= CHANNEL_COUNT || !self.registers.status().contains(ApuStatusRegister::channel(ch))
        {
            return 0.0;
        }
        self.channels[ch].sound().volume()
    }

    pub fn frequency(&self, ch: usize) -> u32 {
        self.channels
            .get(ch)
            .map_or(0, |channel| channel.sound().frequency())
    }

    /// Pulse duty; a negative value is the inverted 25% wave
    pub fn duty_ratio(&self, ch: usize) -> f32 {
        self.channels
            .get(ch)
            .map_or(0.5, |channel| channel.sound().duty_ratio())
    }

    pub fn is_playing(&self, ch: usize) -> bool {
        self.channels
            .get(ch)
            .is_some_and(|channel| channel.sound().is_playing())
    }

    pub fn channel(&self, ch: usize) -> Option<&Channel> {
        self.channels.get(ch)
    }

    pub fn set_pad_status(&mut self, no: usize, status: PadButtons) {
        self.gamepad.set_status(no, status);
    }

    pub fn is_frame_interrupt_pending(&self) -> bool {
        self.frame_interrupt
    }

    pub fn is_dmc_interrupt_pending(&self) -> bool {
        self.dmc_interrupt
    }

    pub fn register(&self, addr: u16) -> Option<u8> {
        ApuRegisters::index(addr).map(|reg| self.registers.get(reg))
    }

    pub fn save(&self) -> ApuState {
        ApuState {
            regs: self.registers.as_bytes().to_vec(),
            frame_interrupt: self.frame_interrupt,
            dmc_interrupt: self.dmc_interrupt,
            channels: self
                .channels
                .iter()
                .map(|channel| channel.sound().save())
                .collect(),
        }
    }

    /// Restores a snapshot. Nothing is modified when it is rejected.
    pub fn load(&mut self, state: &ApuState) -> Result<(), SaveStateError> {
        let regs: &[u8; REGISTER_COUNT] = state.regs.as_slice().try_into().map_err(|_| {
            SaveStateError::Corrupt(format!(
                "apu register image is {} bytes, expected {}",
                state.regs.len(),
                REGISTER_COUNT
            ))
        })?;
        if state.channels.len() != CHANNEL_COUNT {
            return Err(SaveStateError::Corrupt(format!(
                "apu has {} channels, expected {}",
                state.channels.len(),
                CHANNEL_COUNT
            )));
        }
        for (ch, channel_state) in state.channels.iter().enumerate() {
            if channel_state.channel_type() != CHANNEL_TYPES[ch] {
                return Err(SaveStateError::Corrupt(format!(
                    "apu channel {} is {:?}, expected {:?}",
                    ch,
                    channel_state.channel_type(),
                    CHANNEL_TYPES[ch]
                )));
            }
            channel_state.validate()?;
        }

        self.registers.load(regs);
        self.frame_interrupt = state.frame_interrupt;
        self.dmc_interrupt = state.dmc_interrupt;
        for (channel, channel_state) in self.channels.iter_mut().zip(state.channels.iter()) {
            channel.sound_mut().load(channel_state)?;
        }
        Ok(())
    }
}
