use std::ops::RangeInclusive;

use super::bank_switch::BankSwitch;
use super::{check_register_len, Mapper, Mirroring};
use crate::nes::save_state::SaveStateError;

/// AxROM: 32 KiB PRG switching with single-screen mirroring select
#[derive(Debug, Default)]
pub struct AxRom;

impl Mapper for AxRom {
    fn mapper_no(&self) -> u16 {
        7
    }

    fn write_ranges(&self) -> Vec<RangeInclusive<u16>> {
        vec![0x8000..=0xFFFF]
    }

    fn reset(&mut self, banks: &mut BankSwitch) {
        banks.set_prg_bank_32k(0);
        banks.set_chr_bank_8k(0);
        banks.set_mirroring(Mirroring::Single0);
    }

    fn write(&mut self, _addr: u16, value: u8, banks: &mut BankSwitch) {
        /*
           7  bit  0
           ---- ----
           xxxM xPPP
              |  |||
              |  +++- Select 32 KB PRG ROM bank for CPU $8000-$FFFF
              +------ Select 1 KB VRAM page for all 4 nametables
        */
        banks.set_prg_bank_32k((value & 0x07) as usize);
        banks.set_mirroring(if value & 0x10 == 0 {
            Mirroring::Single0
        } else {
            Mirroring::Single1
        });
    }

    fn save_registers(&self) -> Vec<u8> {
        Vec::new()
    }

    fn load_registers(&mut self, regs: &[u8]) -> Result<(), SaveStateError> {
        check_register_len(7, regs, 0)
    }
}
