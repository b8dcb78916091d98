// See: https://www.nesdev.org/wiki/Controller_reading

use super::PAD_COUNT;
use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    pub struct PadButtons: u8 {
        const BUTTON_A = 0b0000_0001;
        const BUTTON_B = 0b0000_0010;
        const SELECT   = 0b0000_0100;
        const START    = 0b0000_1000;
        const UP       = 0b0001_0000;
        const DOWN     = 0b0010_0000;
        const LEFT     = 0b0100_0000;
        const RIGHT    = 0b1000_0000;
    }
}

/// Both controller ports: live button masks plus the shift registers latched
/// by the strobe.
#[derive(Debug, Default, Clone)]
pub struct GamePad {
    status: [PadButtons; PAD_COUNT],
    shift_registers: [u8; PAD_COUNT],
}

impl GamePad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the pressed buttons for pad `no`. Opposing directions held
    /// together cancel out.
    pub fn set_status(&mut self, no: usize, status: PadButtons) {
        if no >= PAD_COUNT {
            return;
        }
        let mut status = status;
        let lr = PadButtons::LEFT | PadButtons::RIGHT;
        let ud = PadButtons::UP | PadButtons::DOWN;
        if status.contains(lr) {
            status.remove(lr);
        }
        if status.contains(ud) {
            status.remove(ud);
        }
        self.status[no] = status;
    }

    pub fn status(&self, no: usize) -> PadButtons {
        self.status.get(no).copied().unwrap_or_default()
    }

    pub fn latch(&mut self) {
        for (shift, status) in self.shift_registers.iter_mut().zip(self.status.iter()) {
            *shift = status.bits();
        }
    }

    /// Next bit of pad `no`, button A first. Reads past the eighth return 0.
    pub fn shift(&mut self, no: usize) -> u8 {
        let Some(register) = self.shift_registers.get_mut(no) else {
            return 0;
        };
        let value = *register;
        *register = value >> 1;
        value & 1
    }
}
