use std::ops::RangeInclusive;

use super::bank_switch::BankSwitch;
use super::{check_register_len, Mapper};
use crate::nes::save_state::SaveStateError;

/// Mapper 87: 8 KiB CHR bank written to $6000-$7FFF with its two bits swapped
#[derive(Debug, Default)]
pub struct Mapper087;

impl Mapper for Mapper087 {
    fn mapper_no(&self) -> u16 {
        87
    }

    fn write_ranges(&self) -> Vec<RangeInclusive<u16>> {
        vec![0x6000..=0x7FFF]
    }

    fn reset(&mut self, banks: &mut BankSwitch) {
        banks.set_prg_bank_32k(0);
        banks.set_chr_bank_8k(0);
    }

    fn write(&mut self, _addr: u16, value: u8, banks: &mut BankSwitch) {
        let bank = ((value & 0x02) >> 1) | ((value & 0x01) << 1);
        banks.set_chr_bank_8k(bank as usize);
    }

    fn save_registers(&self) -> Vec<u8> {
        Vec::new()
    }

    fn load_registers(&mut self, regs: &[u8]) -> Result<(), SaveStateError> {
        check_register_len(87, regs, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;

    #[test]
    fn chr_bank_bits_are_swapped() {
        let mut cart = cart(87, 4, 32);
        cart.cpu_write(0x6000, 0x01);
        assert_eq!(cart.ppu_read(0x0000), 16);
        cart.cpu_write(0x7FFF, 0x02);
        assert_eq!(cart.ppu_read(0x0000), 8);
        cart.cpu_write(0x6000, 0x03);
        assert_eq!(cart.ppu_read(0x0000), 24);
    }

    #[test]
    fn claims_prg_ram_window_only() {
        let mut cart = cart(87, 4, 32);
        assert!(cart.claims(0x6000));
        assert!(!cart.claims(0x8000));
        cart.cpu_write(0x8000, 0x01);
        assert_eq!(cart.ppu_read(0x0000), 0);
    }
}
