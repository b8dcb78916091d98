use std::ops::RangeInclusive;

const ENV_LOOP: u8 = 0b0010_0000;
const ENV_CONST: u8 = 0b0001_0000;
const ENV_VOLUME: u8 = 0b0000_1111;

// Divider steps per frame tick
const DIVIDER_STEP: i16 = 4;

pub const ENVELOPE_DIVIDER_RANGE: RangeInclusive<i16> = -DIVIDER_STEP..=ENV_VOLUME as i16;

/// Frame-stepped decay divider shared by the pulse channels
#[derive(Debug, Clone, Default)]
pub struct Envelope {
    start: bool,
    divider: i16,
    decay: u8,
    period: u8,
    constant: bool,
    loop_flag: bool,
}

#[derive(Debug, PartialEq, Clone)]
pub enum VolumeMode {
    Envelope,
    Constant,
}

impl Envelope {
    pub fn new() -> Envelope {
        Envelope::default()
    }

    /// Decodes a `--LC VVVV` register value.
    /// Outside constant mode the divider and decay level are re-armed.
    pub fn set(&mut self, value: u8) {
        self.decode(value);
        if !self.constant {
            self.divider = self.period as i16;
            self.decay = 15;
        }
    }

    /// Decodes the register without touching the running counters
    pub fn decode(&mut self, value: u8) {
        self.period = value & ENV_VOLUME;
        self.constant = value & ENV_CONST != 0;
        self.loop_flag = value & ENV_LOOP != 0;
    }

    pub fn volume_mode(&self) -> VolumeMode {
        if self.constant {
            VolumeMode::Constant
        } else {
            VolumeMode::Envelope
        }
    }

    /// Requests a full reload on the next clock
    pub fn restart(&mut self) {
        self.start = true;
    }

    /// Called once per frame; the divider moves 4 steps per frame
    pub fn clock(&mut self) {
        if self.constant {
            return;
        }

        // A pending restart only reloads
        if self.start {
            self.start = false;
            self.decay = 15;
            self.divider = self.period as i16;
            return;
        }

        self.divider -= DIVIDER_STEP;
        if self.divider <= 0 {
            // Periods below the step underflow on every clock
            self.divider = (self.divider + self.period as i16).max(-DIVIDER_STEP);
            if self.decay > 0 {
                self.decay -= 1;
            } else if self.loop_flag {
                self.decay = 15;
            }
        }
    }

    /// 0.0 ..= 1.0
    pub fn volume(&self) -> f32 {
        let level = match self.volume_mode() {
            VolumeMode::Constant => self.period,
            VolumeMode::Envelope => self.decay,
        };
        level as f32 / 15.0
    }

    pub fn counters(&self) -> (i16, u8, bool) {
        (self.divider, self.decay, self.start)
    }

    pub fn restore_counters(&mut self, divider: i16, decay: u8, start: bool) {
        self.divider = divider;
        self.decay = decay.min(15);
        self.start = start;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_without_constant_arms_full_volume() {
        let mut env = Envelope::new();
        env.set(0x03);
        assert_eq!(env.volume_mode(), VolumeMode::Envelope);
        assert_eq!(env.volume(), 1.0);
        assert_eq!(env.counters(), (3, 15, false));
    }

    #[test]
    fn constant_volume_reads_the_nibble() {
        let mut env = Envelope::new();
        env.set(ENV_CONST | 0x05);
        env.clock();
        assert_eq!(env.volume(), 5.0 / 15.0);
    }

    #[test]
    fn divider_underflow_steps_decay() {
        let mut env = Envelope::new();
        env.set(0x02); // period 2: every clock underflows
        env.clock();
        assert_eq!(env.counters(), (0, 14, false));
        env.clock();
        assert_eq!(env.counters(), (-2, 13, false));
    }

    #[test]
    fn decay_holds_at_zero_without_loop() {
        let mut env = Envelope::new();
        env.set(0x00);
        for _ in 0..20 {
            env.clock();
        }
        assert_eq!(env.volume(), 0.0);
    }

    #[test]
    fn decay_loops_back_to_fifteen() {
        let mut env = Envelope::new();
        env.set(ENV_LOOP);
        for _ in 0..15 {
            env.clock();
        }
        assert_eq!(env.counters().1, 0);
        env.clock();
        assert_eq!(env.counters().1, 15);
    }

    #[test]
    fn short_period_divider_does_not_drift() {
        let mut env = Envelope::new();
        env.set(ENV_LOOP); // period 0
        for _ in 0..20_000 {
            env.clock();
            assert!(ENVELOPE_DIVIDER_RANGE.contains(&env.counters().0));
        }
    }

    #[test]
    fn restart_reloads_instead_of_stepping() {
        let mut env = Envelope::new();
        env.set(0x01);
        env.clock();
        env.clock();
        env.restart();
        env.clock();
        assert_eq!(env.counters(), (1, 15, false));
    }
}
