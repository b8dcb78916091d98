use std::ops::RangeInclusive;

use super::bank_switch::BankSwitch;
use super::{check_register_len, Mapper};
use crate::nes::save_state::SaveStateError;

/// UxROM: switchable 16 KiB at $8000, last 16 KiB fixed at $C000
#[derive(Debug, Default)]
pub struct UxRom;

impl Mapper for UxRom {
    fn mapper_no(&self) -> u16 {
        2
    }

    fn write_ranges(&self) -> Vec<RangeInclusive<u16>> {
        vec![0x8000..=0xFFFF]
    }

    fn reset(&mut self, banks: &mut BankSwitch) {
        let last = banks.prg_bank_count_16k() - 1;
        banks.set_prg_bank_16k(0, 0);
        banks.set_prg_bank_16k(1, last);
        banks.set_chr_bank_8k(0);
    }

    fn write(&mut self, _addr: u16, value: u8, banks: &mut BankSwitch) {
        /*
           7  bit  0
           ---- ----
           xxxx pPPP
                ||||
                ++++- Select 16 KB PRG ROM bank for CPU $8000-$BFFF
        */
        banks.set_prg_bank_16k(0, value as usize);
    }

    // Bank selection lives entirely in the shared bank table
    fn save_registers(&self) -> Vec<u8> {
        Vec::new()
    }

    fn load_registers(&mut self, regs: &[u8]) -> Result<(), SaveStateError> {
        check_register_len(2, regs, 0)
    }
}
