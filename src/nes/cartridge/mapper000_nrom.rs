use std::ops::RangeInclusive;

use super::bank_switch::BankSwitch;
use super::{check_register_len, Mapper};
use crate::nes::save_state::SaveStateError;

/// NROM: fixed 16/32 KiB PRG and 8 KiB CHR, no registers
#[derive(Debug, Default)]
pub struct Nrom;

impl Mapper for Nrom {
    fn mapper_no(&self) -> u16 {
        0
    }

    fn write_ranges(&self) -> Vec<RangeInclusive<u16>> {
        Vec::new()
    }

    fn reset(&mut self, banks: &mut BankSwitch) {
        banks.set_prg_bank_32k(0);
        banks.set_chr_bank_8k(0);
    }

    fn write(&mut self, _addr: u16, _value: u8, _banks: &mut BankSwitch) {
        // NOP
    }

    fn save_registers(&self) -> Vec<u8> {
        Vec::new()
    }

    fn load_registers(&mut self, regs: &[u8]) -> Result<(), SaveStateError> {
        check_register_len(0, regs, 0)
    }
}
