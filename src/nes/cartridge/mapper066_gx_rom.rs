use std::ops::RangeInclusive;

use super::bank_switch::BankSwitch;
use super::{check_register_len, Mapper};
use crate::nes::save_state::SaveStateError;

/// GxROM: one register selecting a 32 KiB PRG bank and an 8 KiB CHR bank
#[derive(Debug, Default)]
pub struct GxRom;

impl Mapper for GxRom {
    fn mapper_no(&self) -> u16 {
        66
    }

    fn write_ranges(&self) -> Vec<RangeInclusive<u16>> {
        vec![0x8000..=0xFFFF]
    }

    fn reset(&mut self, banks: &mut BankSwitch) {
        banks.set_prg_bank_32k(0);
        banks.set_chr_bank_8k(0);
    }

    fn write(&mut self, _addr: u16, value: u8, banks: &mut BankSwitch) {
        // xxPP xxCC
        banks.set_prg_bank_32k(((value >> 4) & 0x03) as usize);
        banks.set_chr_bank_8k((value & 0x03) as usize);
    }

    fn save_registers(&self) -> Vec<u8> {
        Vec::new()
    }

    fn load_registers(&mut self, regs: &[u8]) -> Result<(), SaveStateError> {
        check_register_len(66, regs, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;

    #[test]
    fn one_write_selects_prg_and_chr() {
        let mut cart = cart(66, 16, 32);
        cart.cpu_write(0x8000, 0x21);
        assert_eq!(cart.cpu_read(0x8000), 8);
        assert_eq!(cart.cpu_read(0xFFFF), 11);
        assert_eq!(cart.ppu_read(0x0000), 8);
        assert_eq!(cart.ppu_read(0x1FFF), 15);
    }
}
