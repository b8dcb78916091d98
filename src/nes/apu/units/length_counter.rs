/// Countdown that silences a channel once it runs out, unless halted.
///
/// Clocked once per frame (at vblank), so callers pass the number of
/// steps a single frame is worth.
#[derive(Debug, Clone, Default)]
pub struct LengthCounter {
    halted: bool,
    value: u8,
}

/* Source: nes-test-roms/apu_test/source/2-len_table.s
   table:  .byte 10, 254, 20,  2, 40,  4, 80,  6
           .byte 160,  8, 60, 10, 14, 12, 26, 14
           .byte 12,  16, 24, 18, 48, 20, 96, 22
           .byte 192, 24, 72, 26, 16, 28, 32, 30
*/
#[rustfmt::skip]
pub const LENGTH_TABLE: [u8; 32] = [
    10, 254, 20,  2, 40,  4, 80,  6,
    160,  8, 60, 10, 14, 12, 26, 14,
    12,  16, 24, 18, 48, 20, 96, 22,
    192, 24, 72, 26, 16, 28, 32, 30,
];

impl LengthCounter {
    pub fn new() -> LengthCounter {
        LengthCounter {
            halted: false,
            value: 0,
        }
    }

    pub fn set_halt(&mut self, halted: bool) {
        self.halted = halted;
    }

    pub fn load(&mut self, value: u8) {
        self.value = value;
    }

    pub fn load_index(&mut self, index: u8) {
        self.value = LENGTH_TABLE[(index & 0b1_1111) as usize];
    }

    /// Decrements by `step`, clamping at zero. Returns true when the counter was
    /// already exhausted before this clock, which is when the channel stops.
    pub fn clock(&mut self, step: u8) -> bool {
        if self.halted {
            return false;
        }
        if self.value == 0 {
            return true;
        }
        self.value = self.value.saturating_sub(step);
        false
    }

    pub fn output(&self) -> u8 {
        self.value
    }
}
