use super::channel::{
    kind_mismatch, ChannelState, ChannelType, SoundChannel, REG_STATUS, REG_SWEEP, REG_TIMER_H,
    REG_TIMER_L,
};
use super::units::{Envelope, LengthCounter, Sweep};
use super::{CPU_CLOCK, LENGTH_COUNTER_HALT};
use crate::nes::save_state::SaveStateError;

const PULSE_DUTY_RATIO: [f32; 4] = [0.125, 0.25, 0.5, -0.25];

// Length counter steps per frame tick
const LENGTH_STEP: u8 = 4;

pub struct PulseChannel {
    regs: [u8; 4],
    stopped: bool,
    length_counter: LengthCounter,
    envelope: Envelope,
    sweep: Sweep,
}

impl PulseChannel {
    pub fn new() -> Self {
        PulseChannel {
            regs: [0; 4],
            stopped: true,
            length_counter: LengthCounter::new(),
            envelope: Envelope::new(),
            sweep: Sweep::new(),
        }
    }

    /// 11-bit timer period from the low register and bits 2-0 of the high one
    pub fn timer(&self) -> u16 {
        self.regs[REG_TIMER_L] as u16 | ((self.regs[REG_TIMER_H] as u16 & 0x07) << 8)
    }

    fn set_timer(&mut self, timer: u16) {
        self.regs[REG_TIMER_L] = (timer & 0xFF) as u8;
        self.regs[REG_TIMER_H] = (self.regs[REG_TIMER_H] & !0x07) | ((timer >> 8) as u8 & 0x07);
    }

    pub fn length(&self) -> u8 {
        self.length_counter.output()
    }
}

impl Default for PulseChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundChannel for PulseChannel {
    fn reset(&mut self) {
        *self = PulseChannel::new();
    }

    fn write(&mut self, reg: usize, value: u8) {
        self.regs[reg] = value;
        match reg {
            REG_STATUS => {
                self.stopped = false;
                self.envelope.set(value);
                self.length_counter.set_halt(value & LENGTH_COUNTER_HALT != 0);
            }
            REG_SWEEP => self.sweep.set(value),
            REG_TIMER_H => {
                self.length_counter.load_index(value >> 3);
                self.stopped = false;
                self.envelope.restart();
            }
            _ => {}
        }
    }

    fn volume(&self) -> f32 {
        if self.stopped {
            return 0.0;
        }
        self.envelope.volume()
    }

    fn frequency(&self) -> u32 {
        CPU_CLOCK / 16 / (self.timer() as u32 + 1)
    }

    fn duty_ratio(&self) -> f32 {
        PULSE_DUTY_RATIO[((self.regs[REG_STATUS] >> 6) & 3) as usize]
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
        self.envelope.clock();

        let mut timer = self.timer();
        if self.sweep.clock(&mut timer) {
            self.stopped = true;
        }
        self.set_timer(timer);
    }

    fn is_playing(&self) -> bool {
        !self.stopped
    }

    fn save(&self) -> ChannelState {
        let (envelope_divider, envelope_decay, envelope_restart) = self.envelope.counters();
        ChannelState::Pulse {
            regs: self.regs,
            stopped: self.stopped,
            length: self.length_counter.output(),
            envelope_divider,
            envelope_decay,
            envelope_restart,
            sweep_counter: self.sweep.counter(),
        }
    }

    fn load(&mut self, state: &ChannelState) -> Result<(), SaveStateError> {
        let ChannelState::Pulse {
            regs,
            stopped,
            length,
            envelope_divider,
            envelope_decay,
            envelope_restart,
            sweep_counter,
        } = state
        else {
            return Err(kind_mismatch(ChannelType::Pulse, state));
        };

        self.regs = *regs;
        self.stopped = *stopped;
        self.length_counter.load(*length);
        self.length_counter.set_halt(regs[REG_STATUS] & LENGTH_COUNTER_HALT != 0);
        self.envelope.decode(regs[REG_STATUS]);
        self.envelope
            .restore_counters(*envelope_divider, *envelope_decay, *envelope_restart);
        self.sweep.decode(regs[REG_SWEEP]);
        self.sweep.restore_counter(*sweep_counter);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nes::apu::CONSTANT_VOLUME;

    #[test]
    fn length_steps_by_four_per_frame() {
        let mut pulse = PulseChannel::new();
        pulse.write(REG_STATUS, 0x0F);
        pulse.write(REG_TIMER_H, 0x00); // index 0 -> 10
        assert_eq!(pulse.length(), 0x0A);

        pulse.update();
        assert_eq!(pulse.length(), 0x06);
        assert!(pulse.is_playing());
    }

    #[test]
    fn stops_on_the_tick_after_reaching_zero() {
        let mut pulse = PulseChannel::new();
        pulse.write(REG_STATUS, 0x00);
        pulse.write(REG_TIMER_H, 0x18); // index 3 -> 2
        pulse.update();
        assert_eq!(pulse.length(), 0);
        assert!(pulse.is_playing());
        pulse.update();
        assert!(!pulse.is_playing());
        assert_eq!(pulse.volume(), 0.0);
    }

    #[test]
    fn halt_keeps_length_forever() {
        let mut pulse = PulseChannel::new();
        pulse.write(REG_STATUS, LENGTH_COUNTER_HALT | CONSTANT_VOLUME | 0x0F);
        pulse.write(REG_TIMER_H, 0x18);
        for _ in 0..1000 {
            pulse.update();
        }
        assert_eq!(pulse.length(), 2);
        assert!(pulse.is_playing());
        assert_eq!(pulse.volume(), 1.0);
    }

    #[test]
    fn frequency_and_duty() {
        let mut pulse = PulseChannel::new();
        pulse.write(REG_STATUS, 0b1100_0000);
        pulse.write(REG_TIMER_L, 0xFD);
        pulse.write(REG_TIMER_H, 0x00);
        assert_eq!(pulse.timer(), 0x0FD);
        assert_eq!(pulse.frequency(), CPU_CLOCK / 16 / 0xFE);
        assert_eq!(pulse.duty_ratio(), -0.25);
    }

    #[test]
    fn sweep_rewrites_timer_registers() {
        let mut pulse = PulseChannel::new();
        pulse.write(REG_STATUS, LENGTH_COUNTER_HALT);
        pulse.write(REG_TIMER_L, 0x00);
        pulse.write(REG_TIMER_H, 0x01); // timer 0x100
        pulse.write(REG_SWEEP, 0b1000_0001); // enabled, period 0, add, shift 1
        pulse.update();
        assert_eq!(pulse.timer(), 0x180);
        assert!(pulse.is_playing());
    }

    #[test]
    fn sweep_overflow_stops_channel() {
        let mut pulse = PulseChannel::new();
        pulse.write(REG_STATUS, LENGTH_COUNTER_HALT);
        pulse.write(REG_TIMER_L, 0x00);
        pulse.write(REG_TIMER_H, 0x06); // timer 0x600
        pulse.write(REG_SWEEP, 0b1000_0001);
        pulse.update();
        assert!(!pulse.is_playing());
    }

    #[test]
    fn disable_stops_channel() {
        let mut pulse = PulseChannel::new();
        pulse.write(REG_TIMER_H, 0x08);
        assert!(pulse.is_playing());
        pulse.set_enable(true);
        assert!(pulse.is_playing());
        pulse.set_enable(false);
        assert!(!pulse.is_playing());
    }

    #[test]
    fn save_load_keeps_counters() {
        let mut pulse = PulseChannel::new();
        pulse.write(REG_STATUS, 0x03);
        pulse.write(REG_SWEEP, 0b1011_0001);
        pulse.write(REG_TIMER_H, 0x08);
        pulse.update();
        pulse.update();
        let state = pulse.save();

        let mut restored = PulseChannel::new();
        restored.load(&state).unwrap();
        assert_eq!(restored.save(), state);
        pulse.update();
        restored.update();
        assert_eq!(restored.save(), pulse.save());
    }
}
