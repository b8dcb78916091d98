use std::ops::RangeInclusive;

use log::debug;

use super::bank_switch::BankSwitch;
use super::{check_register_len, Mapper, Mirroring};
use crate::nes::save_state::SaveStateError;

const PRE_RENDER_SCANLINE: u16 = 261;
const VISIBLE_SCANLINES: u16 = 240;
const REGISTER_COUNT: usize = 15;

/// MMC3 (iNES mapper #4)
///
/// Eight bank registers addressed through $8000/$8001, mirroring at $A000 and a
/// scanline counter at $C000-$E001 that raises an IRQ when it reaches zero.
#[derive(Debug)]
pub struct Mmc3 {
    bank_select: u8,
    bank_regs: [u8; 8],
    mirroring: u8,
    prg_ram_protect: u8,

    irq_latch: u8,
    irq_counter: u8,
    irq_reload: bool,
    irq_enabled: bool,
}

impl Mmc3 {
    pub fn new() -> Self {
        Mmc3 {
            bank_select: 0,
            bank_regs: [0, 2, 4, 5, 6, 7, 0, 1],
            mirroring: 0,
            prg_ram_protect: 0,
            irq_latch: 0,
            irq_counter: 0,
            irq_reload: false,
            irq_enabled: false,
        }
    }

    pub fn irq_counter(&self) -> u8 {
        self.irq_counter
    }

    fn apply(&self, banks: &mut BankSwitch) {
        let r = |i: usize| self.bank_regs[i] as usize;
        let second_last = banks.prg_bank_count().saturating_sub(2);
        let last = banks.prg_bank_count() - 1;

        // PRG mode (bit 6) swaps $8000 and $C000
        if self.bank_select & 0x40 == 0 {
            banks.set_prg_bank_8k(0, r(6));
            banks.set_prg_bank_8k(2, second_last);
        } else {
            banks.set_prg_bank_8k(0, second_last);
            banks.set_prg_bank_8k(2, r(6));
        }
        banks.set_prg_bank_8k(1, r(7));
        banks.set_prg_bank_8k(3, last);

        // CHR inversion (bit 7) swaps the 2K and 1K halves
        let (two_k, one_k) = if self.bank_select & 0x80 == 0 {
            (0, 4)
        } else {
            (2, 0)
        };
        banks.set_chr_bank_2k(two_k, r(0) >> 1);
        banks.set_chr_bank_2k(two_k + 1, r(1) >> 1);
        for i in 0..4 {
            banks.set_chr_bank_1k(one_k + i, r(2 + i));
        }
    }
}

impl Default for Mmc3 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mapper for Mmc3 {
    fn mapper_no(&self) -> u16 {
        4
    }

    fn write_ranges(&self) -> Vec<RangeInclusive<u16>> {
        vec![0x8000..=0xFFFF]
    }

    fn reset(&mut self, banks: &mut BankSwitch) {
        *self = Mmc3::new();
        self.apply(banks);
    }

    fn write(&mut self, addr: u16, value: u8, banks: &mut BankSwitch) {
        match addr & 0xE001 {
            0x8000 => {
                self.bank_select = value;
                self.apply(banks);
            }
            0x8001 => {
                self.bank_regs[(self.bank_select & 0x07) as usize] = value;
                self.apply(banks);
            }
            0xA000 => {
                self.mirroring = value & 1;
                if banks.mirroring() != Mirroring::FourScreen {
                    banks.set_mirroring(if self.mirroring == 0 {
                        Mirroring::Vertical
                    } else {
                        Mirroring::Horizontal
                    });
                }
            }
            0xA001 => self.prg_ram_protect = value,
            0xC000 => self.irq_latch = value,
            0xC001 => {
                self.irq_counter = 0;
                self.irq_reload = true;
            }
            0xE000 => self.irq_enabled = false, // also acknowledges
            _ => self.irq_enabled = true,
        }
    }

    fn on_hblank(&mut self, scanline: u16) -> bool {
        if scanline >= VISIBLE_SCANLINES && scanline != PRE_RENDER_SCANLINE {
            return false;
        }
        if self.irq_counter == 0 || self.irq_reload {
            self.irq_counter = self.irq_latch;
            self.irq_reload = false;
        } else {
            self.irq_counter -= 1;
        }
        if self.irq_counter == 0 && self.irq_enabled {
            debug!("MMC3 IRQ at scanline {}", scanline);
            return true;
        }
        false
    }

    fn save_registers(&self) -> Vec<u8> {
        let mut regs = Vec::with_capacity(REGISTER_COUNT);
        regs.push(self.bank_select);
        regs.extend_from_slice(&self.bank_regs);
        regs.extend_from_slice(&[
            self.mirroring,
            self.prg_ram_protect,
            self.irq_latch,
            self.irq_counter,
            self.irq_reload as u8,
            self.irq_enabled as u8,
        ]);
        regs
    }

    fn load_registers(&mut self, regs: &[u8]) -> Result<(), SaveStateError> {
        check_register_len(4, regs, REGISTER_COUNT)?;
        self.bank_select = regs[0];
        self.bank_regs.copy_from_slice(&regs[1..9]);
        self.mirroring = regs[9];
        self.prg_ram_protect = regs[10];
        self.irq_latch = regs[11];
        self.irq_counter = regs[12];
        self.irq_reload = regs[13] != 0;
        self.irq_enabled = regs[14] != 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;
    use super::super::Mirroring;
    use super::*;

    #[test]
    fn power_on_layout() {
        let cart = cart(4, 16, 64);
        assert_eq!(cart.cpu_read(0x8000), 0);
        assert_eq!(cart.cpu_read(0xA000), 1);
        assert_eq!(cart.cpu_read(0xC000), 14);
        assert_eq!(cart.cpu_read(0xE000), 15);
        assert_eq!(cart.ppu_read(0x0000), 0);
        assert_eq!(cart.ppu_read(0x0400), 1);
        assert_eq!(cart.ppu_read(0x0800), 2);
        assert_eq!(cart.ppu_read(0x1000), 4);
        assert_eq!(cart.ppu_read(0x1C00), 7);
    }

    #[test]
    fn prg_mode_swaps_fixed_window() {
        let mut cart = cart(4, 16, 64);
        cart.cpu_write(0x8000, 6);
        cart.cpu_write(0x8001, 3);
        assert_eq!(cart.cpu_read(0x8000), 3);
        assert_eq!(cart.cpu_read(0xC000), 14);

        cart.cpu_write(0x8000, 0x40 | 6);
        assert_eq!(cart.cpu_read(0x8000), 14);
        assert_eq!(cart.cpu_read(0xC000), 3);
        assert_eq!(cart.cpu_read(0xE000), 15);
    }

    #[test]
    fn chr_inversion() {
        let mut cart = cart(4, 16, 64);
        cart.cpu_write(0x8000, 0);
        cart.cpu_write(0x8001, 9); // low bit ignored for 2K banks
        cart.cpu_write(0x8000, 2);
        cart.cpu_write(0x8001, 33);
        assert_eq!(cart.ppu_read(0x0000), 8);
        assert_eq!(cart.ppu_read(0x0400), 9);
        assert_eq!(cart.ppu_read(0x1000), 33);

        cart.cpu_write(0x8000, 0x80);
        assert_eq!(cart.ppu_read(0x0000), 33);
        assert_eq!(cart.ppu_read(0x1000), 8);
        assert_eq!(cart.ppu_read(0x1400), 9);
    }

    #[test]
    fn mirroring_register() {
        let mut cart = cart(4, 16, 64);
        cart.cpu_write(0xA000, 0);
        assert_eq!(cart.mirroring(), Mirroring::Vertical);
        cart.cpu_write(0xA000, 1);
        assert_eq!(cart.mirroring(), Mirroring::Horizontal);
    }

    #[test]
    fn scanline_irq_counts_down_from_latch() {
        let mut mmc3 = Mmc3::new();
        let mut banks = BankSwitch::new(0x20000, 0x10000, Mirroring::Vertical);
        mmc3.write(0xC000, 3, &mut banks);
        mmc3.write(0xC001, 0, &mut banks);
        mmc3.write(0xE001, 0, &mut banks);

        assert!(!mmc3.on_hblank(0)); // reload -> 3
        assert!(!mmc3.on_hblank(1)); // 2
        assert!(!mmc3.on_hblank(2)); // 1
        assert!(mmc3.on_hblank(3)); // 0
        assert!(!mmc3.on_hblank(4)); // reload -> 3
        assert_eq!(mmc3.irq_counter(), 3);

        // Vblank scanlines do not clock the counter
        assert!(!mmc3.on_hblank(241));
        assert_eq!(mmc3.irq_counter(), 3);
        mmc3.on_hblank(PRE_RENDER_SCANLINE);
        assert_eq!(mmc3.irq_counter(), 2);
    }

    #[test]
    fn disabled_irq_stays_quiet() {
        let mut mmc3 = Mmc3::new();
        let mut banks = BankSwitch::new(0x20000, 0x10000, Mirroring::Vertical);
        mmc3.write(0xC000, 1, &mut banks);
        mmc3.write(0xE001, 0, &mut banks);
        mmc3.write(0xE000, 0, &mut banks);
        for line in 0..10 {
            assert!(!mmc3.on_hblank(line));
        }
    }

    #[test]
    fn load_checks_register_length() {
        let mut mmc3 = Mmc3::new();
        assert!(mmc3.load_registers(&[0; 3]).is_err());
        let regs = mmc3.save_registers();
        assert_eq!(regs.len(), REGISTER_COUNT);
        assert!(mmc3.load_registers(&regs).is_ok());
    }
}
