use std::ops::RangeInclusive;

/// Pulse frequency sweep, clocked once per frame (two sweep sequences per frame)
#[derive(Debug, Clone, Default)]
pub struct Sweep {
    enabled: bool,
    negate: bool,
    period: u8, // 0-7
    shift: u8,  // 0-7
    counter: i16,
}

const SEQUENCES_PER_FRAME: i16 = 2;

/// Counter values reachable between clocks
pub const SWEEP_COUNTER_RANGE: RangeInclusive<i16> =
    -SEQUENCES_PER_FRAME..=7 + SEQUENCES_PER_FRAME;

impl Sweep {
    pub fn new() -> Sweep {
        Sweep::default()
    }

    /// value: 0bEPPP_NSSS. Reloads the counter from the period.
    pub fn set(&mut self, value: u8) {
        self.decode(value);
        self.counter = self.period as i16;
    }

    pub fn decode(&mut self, value: u8) {
        self.enabled = value & 0b1000_0000 != 0;
        self.period = (value >> 4) & 0b111;
        self.negate = value & 0b0000_1000 != 0;
        self.shift = value & 0b0000_0111;
    }

    pub fn compute_target(&self, timer: u16) -> u16 {
        let change = timer >> self.shift;
        if self.negate {
            timer.wrapping_sub(change)
        } else {
            timer.wrapping_add(change)
        }
    }

    /// Advances the sweep and rewrites `timer` (11 bits) when the period elapses.
    /// Returns true when the new frequency falls outside 8..=0x7FF, silencing the channel.
    pub fn clock(&mut self, timer: &mut u16) -> bool {
        if !self.enabled {
            return false;
        }

        let mut silenced = false;
        let mut c = self.counter + SEQUENCES_PER_FRAME;
        let count = self.period as i16;
        if c >= count {
            c -= count;
            if self.shift > 0 {
                let target = self.compute_target(*timer);
                silenced = if self.negate {
                    target < 8
                } else {
                    target > 0x7FF
                };
                *timer = target & 0x7FF;
            }
            c -= SEQUENCES_PER_FRAME;
        }
        self.counter = c;
        silenced
    }

    pub fn counter(&self) -> i16 {
        self.counter
    }

    pub fn restore_counter(&mut self, counter: i16) {
        self.counter = counter;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_sweep_leaves_timer() {
        let mut sweep = Sweep::new();
        sweep.set(0x01);
        let mut timer = 0x100;
        assert!(!sweep.clock(&mut timer));
        assert_eq!(timer, 0x100);
    }

    #[test]
    fn add_mode_raises_period() {
        let mut sweep = Sweep::new();
        sweep.set(0b1000_0001); // enabled, period 0, add, shift 1
        let mut timer = 0x100;
        assert!(!sweep.clock(&mut timer));
        assert_eq!(timer, 0x180);
    }

    #[test]
    fn add_overflow_silences() {
        let mut sweep = Sweep::new();
        sweep.set(0b1000_0001);
        let mut timer = 0x600;
        assert!(sweep.clock(&mut timer));
        assert_eq!(timer, 0x900 & 0x7FF);
    }

    #[test]
    fn subtract_below_eight_silences() {
        let mut sweep = Sweep::new();
        sweep.set(0b1000_1001); // negate, shift 1
        let mut timer = 0x0A;
        assert!(sweep.clock(&mut timer));
        assert_eq!(timer, 0x05);
    }

    #[test]
    fn zero_shift_only_moves_counter() {
        let mut sweep = Sweep::new();
        sweep.set(0b1010_0000); // enabled, period 2, shift 0
        let mut timer = 0x123;
        assert!(!sweep.clock(&mut timer));
        assert_eq!(timer, 0x123);
        // 2 + 2 - 2 (period) - 2 (credit)
        assert_eq!(sweep.counter(), 0);
    }

    #[test]
    fn long_period_waits_several_frames() {
        let mut sweep = Sweep::new();
        sweep.set(0b1111_0001); // period 7, shift 1
        sweep.restore_counter(0);
        let mut timer = 0x100;
        sweep.clock(&mut timer); // 2
        sweep.clock(&mut timer); // 4
        sweep.clock(&mut timer); // 6
        assert_eq!(timer, 0x100);
        sweep.clock(&mut timer); // 8 >= 7
        assert_eq!(timer, 0x180);
        assert_eq!(sweep.counter(), -1);
    }

    #[test]
    fn counter_stays_in_range_for_every_period() {
        for value in 0x80..=0xFFu8 {
            let mut sweep = Sweep::new();
            sweep.set(value);
            let mut timer = 0x200;
            for _ in 0..64 {
                sweep.clock(&mut timer);
                assert!(SWEEP_COUNTER_RANGE.contains(&sweep.counter()));
            }
        }
    }
}
