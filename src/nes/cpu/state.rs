use serde::{Deserialize, Serialize};

use super::{Cpu, Flags};
use crate::nes::save_state::SaveStateError;

/// Register snapshot stored in a save state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuState {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub s: u8,
    pub p: u8,
    pub pc: u16,
}

impl CpuState {
    /// The reserved status bit always reads as 1 on hardware
    pub fn validate(&self) -> Result<(), SaveStateError> {
        if self.p & Flags::RESERVED.bits() == 0 {
            return Err(SaveStateError::Corrupt(format!(
                "cpu status 0x{:02X} has the reserved bit clear",
                self.p
            )));
        }
        Ok(())
    }
}

impl Cpu {
    pub fn save(&self) -> CpuState {
        CpuState {
            a: self.register_a,
            x: self.register_x,
            y: self.register_y,
            s: self.stack_pointer,
            p: self.status.bits(),
            pc: self.program_counter,
        }
    }

    pub fn load(&mut self, state: &CpuState) -> Result<(), SaveStateError> {
        state.validate()?;
        self.register_a = state.a;
        self.register_x = state.x;
        self.register_y = state.y;
        self.stack_pointer = state.s;
        self.status = Flags::from_bits_retain(state.p);
        self.program_counter = state.pc;
        self.current_op = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_restores_registers() {
        let mut cpu = Cpu::new(false);
        let state = CpuState {
            a: 0x12,
            x: 0x34,
            y: 0x56,
            s: 0xFD,
            p: 0x24,
            pc: 0xC123,
        };
        cpu.load(&state).unwrap();
        assert_eq!(cpu.save(), state);
        assert!(cpu.status.contains(Flags::INTERRUPT_DISABLE));
    }

    #[test]
    fn reserved_bit_clear_is_corrupt() {
        let mut cpu = Cpu::new(false);
        cpu.register_a = 7;
        let state = CpuState {
            a: 0,
            x: 0,
            y: 0,
            s: 0,
            p: 0x04,
            pc: 0,
        };
        assert!(matches!(cpu.load(&state), Err(SaveStateError::Corrupt(_))));
        assert_eq!(cpu.register_a, 7);
    }
}
