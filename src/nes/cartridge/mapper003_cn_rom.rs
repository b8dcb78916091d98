use std::ops::RangeInclusive;

use super::bank_switch::BankSwitch;
use super::{check_register_len, Mapper};
use crate::nes::save_state::SaveStateError;

/// CNROM: fixed PRG, 8 KiB CHR bank selected by any write to $8000-$FFFF
#[derive(Debug, Default)]
pub struct CnRom;

impl Mapper for CnRom {
    fn mapper_no(&self) -> u16 {
        3
    }

    fn write_ranges(&self) -> Vec<RangeInclusive<u16>> {
        vec![0x8000..=0xFFFF]
    }

    fn reset(&mut self, banks: &mut BankSwitch) {
        banks.set_prg_bank_32k(0);
        banks.set_chr_bank_8k(0);
    }

    fn write(&mut self, _addr: u16, value: u8, banks: &mut BankSwitch) {
        banks.set_chr_bank_8k(value as usize);
    }

    fn save_registers(&self) -> Vec<u8> {
        Vec::new()
    }

    fn load_registers(&mut self, regs: &[u8]) -> Result<(), SaveStateError> {
        check_register_len(3, regs, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;

    #[test]
    fn selects_8k_chr_bank() {
        let mut cart = cart(3, 4, 32);
        cart.cpu_write(0x8000, 2);
        assert_eq!(cart.ppu_read(0x0000), 16);
        assert_eq!(cart.ppu_read(0x1FFF), 23);
        // PRG untouched
        assert_eq!(cart.cpu_read(0x8000), 0);
    }

    #[test]
    fn chr_bank_wraps() {
        let mut cart = cart(3, 4, 32);
        cart.cpu_write(0xC000, 6); // 4 banks: 6 -> 2
        assert_eq!(cart.ppu_read(0x0000), 16);
    }
}
