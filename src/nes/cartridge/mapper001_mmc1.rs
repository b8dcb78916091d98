use std::ops::RangeInclusive;

use log::debug;

use super::bank_switch::BankSwitch;
use super::{check_register_len, Mapper, Mirroring};
use crate::nes::save_state::SaveStateError;

const SHIFT_RESET: u8 = 0x10;
const CONTROL_RESET: u8 = 0x0C; // PRG mode 3, CHR mode 0, nametable 0
const REGISTER_COUNT: usize = 6;

/// MMC1 (iNES mapper #1)
///
/// Registers are loaded one bit at a time through a 5-bit shift register;
/// the fifth write commits the value to the register picked by the address.
#[derive(Debug)]
pub struct Mmc1 {
    shift_reg: u8,
    shift_count: u8,

    control: u8,
    chr_bank0: u8,
    chr_bank1: u8,
    prg_bank: u8,
}

impl Mmc1 {
    pub fn new() -> Self {
        Mmc1 {
            shift_reg: SHIFT_RESET,
            shift_count: 0,
            control: CONTROL_RESET,
            chr_bank0: 0,
            chr_bank1: 0,
            prg_bank: 0,
        }
    }

    pub fn control(&self) -> u8 {
        self.control
    }

    fn mirroring(&self) -> Mirroring {
        match self.control & 0x03 {
            0 => Mirroring::Single0,
            1 => Mirroring::Single1,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        }
    }

    fn apply(&self, banks: &mut BankSwitch) {
        banks.set_mirroring(self.mirroring());

        let prg = (self.prg_bank & 0x0F) as usize;
        match (self.control >> 2) & 0b11 {
            0 | 1 => banks.set_prg_bank_32k(prg >> 1),
            2 => {
                // First bank fixed at $8000
                banks.set_prg_bank_16k(0, 0);
                banks.set_prg_bank_16k(1, prg);
            }
            _ => {
                // Last bank fixed at $C000
                let last = banks.prg_bank_count_16k() - 1;
                banks.set_prg_bank_16k(0, prg);
                banks.set_prg_bank_16k(1, last);
            }
        }

        if self.control & 0x10 != 0 {
            banks.set_chr_bank_4k(0, self.chr_bank0 as usize);
            banks.set_chr_bank_4k(1, self.chr_bank1 as usize);
        } else {
            banks.set_chr_bank_8k(((self.chr_bank0 & 0x1E) >> 1) as usize);
        }
    }
}

impl Default for Mmc1 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mapper for Mmc1 {
    fn mapper_no(&self) -> u16 {
        1
    }

    fn write_ranges(&self) -> Vec<RangeInclusive<u16>> {
        vec![0x8000..=0xFFFF]
    }

    fn reset(&mut self, banks: &mut BankSwitch) {
        *self = Mmc1::new();
        self.apply(banks);
    }

    fn write(&mut self, addr: u16, value: u8, banks: &mut BankSwitch) {
        // Reset shift register if bit 7 set ($80-$FF)
        if value & 0x80 != 0 {
            self.shift_reg = SHIFT_RESET;
            self.shift_count = 0;
            self.control |= CONTROL_RESET;
            self.apply(banks);
            return;
        }

        // Shift in one bit (LSB first)
        self.shift_reg = (self.shift_reg >> 1) | ((value & 1) << 4);
        self.shift_count += 1;
        if self.shift_count < 5 {
            return;
        }

        let data = self.shift_reg & 0x1F;
        match addr {
            0x8000..=0x9FFF => self.control = data,
            0xA000..=0xBFFF => self.chr_bank0 = data,
            0xC000..=0xDFFF => self.chr_bank1 = data,
            _ => self.prg_bank = data & 0x0F,
        }
        debug!("MMC1 ${:04X} <- {:02X}", addr & 0xE000, data);
        self.shift_reg = SHIFT_RESET;
        self.shift_count = 0;
        self.apply(banks);
    }

    fn save_registers(&self) -> Vec<u8> {
        vec![
            self.shift_reg,
            self.shift_count,
            self.control,
            self.chr_bank0,
            self.chr_bank1,
            self.prg_bank,
        ]
    }

    fn load_registers(&mut self, regs: &[u8]) -> Result<(), SaveStateError> {
        check_register_len(1, regs, REGISTER_COUNT)?;
        if regs[1] >= 5 {
            return Err(SaveStateError::Corrupt(format!(
                "MMC1 shift count {} out of range",
                regs[1]
            )));
        }
        self.shift_reg = regs[0];
        self.shift_count = regs[1];
        self.control = regs[2];
        self.chr_bank0 = regs[3];
        self.chr_bank1 = regs[4];
        self.prg_bank = regs[5];
        Ok(())
    }
}
