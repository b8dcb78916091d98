use log::debug;
use serde::{Deserialize, Serialize};

use super::Mirroring;
use crate::nes::save_state::SaveStateError;

pub const PRG_BANK_SIZE: usize = 0x2000; // 8 KiB
pub const CHR_BANK_SIZE: usize = 0x0400; // 1 KiB
pub const PRG_SLOTS: usize = 4; // $8000, $A000, $C000, $E000
pub const CHR_SLOTS: usize = 8;

/// Window table consulted on every cartridge fetch.
///
/// PRG space $8000-$FFFF is four 8 KiB slots and CHR space $0000-$1FFF eight
/// 1 KiB slots. Boards select banks in whatever unit they use; bank numbers
/// wrap modulo the image size.
#[derive(Debug, Clone)]
pub struct BankSwitch {
    prg_bank_count: usize,
    chr_bank_count: usize,
    prg_banks: [usize; PRG_SLOTS],
    chr_banks: [usize; CHR_SLOTS],
    mirroring: Mirroring,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankState {
    pub prg_banks: [usize; PRG_SLOTS],
    pub chr_banks: [usize; CHR_SLOTS],
    pub mirroring: Mirroring,
}

impl BankSwitch {
    pub fn new(prg_len: usize, chr_len: usize, mirroring: Mirroring) -> Self {
        let mut banks = BankSwitch {
            prg_bank_count: (prg_len / PRG_BANK_SIZE).max(1),
            chr_bank_count: (chr_len / CHR_BANK_SIZE).max(1),
            prg_banks: [0; PRG_SLOTS],
            chr_banks: [0; CHR_SLOTS],
            mirroring,
        };
        banks.set_prg_bank_32k(0);
        banks.set_chr_bank_8k(0);
        banks
    }

    pub fn prg_bank_count(&self) -> usize {
        self.prg_bank_count
    }

    pub fn chr_bank_count(&self) -> usize {
        self.chr_bank_count
    }

    /// Count of 16 KiB PRG banks (at least 1)
    pub fn prg_bank_count_16k(&self) -> usize {
        (self.prg_bank_count / 2).max(1)
    }

    pub fn set_prg_bank_8k(&mut self, slot: usize, bank: usize) {
        self.prg_banks[slot % PRG_SLOTS] = bank % self.prg_bank_count;
    }

    /// slot 0 = $8000, slot 1 = $C000
    pub fn set_prg_bank_16k(&mut self, slot: usize, bank: usize) {
        let first = (slot % 2) * 2;
        self.set_prg_bank_8k(first, bank * 2);
        self.set_prg_bank_8k(first + 1, bank * 2 + 1);
    }

    pub fn set_prg_bank_32k(&mut self, bank: usize) {
        for slot in 0..PRG_SLOTS {
            self.set_prg_bank_8k(slot, bank * 4 + slot);
        }
        debug!("PRG 32K bank -> {}", bank);
    }

    pub fn set_chr_bank_1k(&mut self, slot: usize, bank: usize) {
        self.chr_banks[slot % CHR_SLOTS] = bank % self.chr_bank_count;
    }

    /// slot counts 2 KiB windows (0..4)
    pub fn set_chr_bank_2k(&mut self, slot: usize, bank: usize) {
        let first = (slot % 4) * 2;
        self.set_chr_bank_1k(first, bank * 2);
        self.set_chr_bank_1k(first + 1, bank * 2 + 1);
    }

    /// slot 0 = $0000, slot 1 = $1000
    pub fn set_chr_bank_4k(&mut self, slot: usize, bank: usize) {
        let first = (slot % 2) * 4;
        for i in 0..4 {
            self.set_chr_bank_1k(first + i, bank * 4 + i);
        }
    }

    pub fn set_chr_bank_8k(&mut self, bank: usize) {
        for slot in 0..CHR_SLOTS {
            self.set_chr_bank_1k(slot, bank * 8 + slot);
        }
    }

    pub fn prg_bank(&self, slot: usize) -> usize {
        self.prg_banks[slot % PRG_SLOTS]
    }

    pub fn chr_bank(&self, slot: usize) -> usize {
        self.chr_banks[slot % CHR_SLOTS]
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    pub fn set_mirroring(&mut self, mirroring: Mirroring) {
        self.mirroring = mirroring;
    }

    /// Offset into PRG ROM for a CPU address in $8000-$FFFF
    pub fn prg_offset(&self, addr: u16) -> usize {
        let addr = (addr & 0x7FFF) as usize;
        self.prg_banks[addr / PRG_BANK_SIZE] * PRG_BANK_SIZE + (addr % PRG_BANK_SIZE)
    }

    /// Offset into CHR for a PPU address in $0000-$1FFF
    pub fn chr_offset(&self, addr: u16) -> usize {
        let addr = (addr & 0x1FFF) as usize;
        self.chr_banks[addr / CHR_BANK_SIZE] * CHR_BANK_SIZE + (addr % CHR_BANK_SIZE)
    }

    pub fn save(&self) -> BankState {
        BankState {
            prg_banks: self.prg_banks,
            chr_banks: self.chr_banks,
            mirroring: self.mirroring,
        }
    }

    pub fn load(&mut self, state: &BankState) -> Result<(), SaveStateError> {
        if let Some(bank) = state.prg_banks.iter().find(|b| **b >= self.prg_bank_count) {
            return Err(SaveStateError::Corrupt(format!(
                "PRG bank {} out of range ({} banks)",
                bank, self.prg_bank_count
            )));
        }
        if let Some(bank) = state.chr_banks.iter().find(|b| **b >= self.chr_bank_count) {
            return Err(SaveStateError::Corrupt(format!(
                "CHR bank {} out of range ({} banks)",
                bank, self.chr_bank_count
            )));
        }
        self.prg_banks = state.prg_banks;
        self.chr_banks = state.chr_banks;
        self.mirroring = state.mirroring;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixteen_k_image_is_mirrored() {
        let banks = BankSwitch::new(0x4000, 0x2000, Mirroring::Horizontal);
        assert_eq!(banks.prg_offset(0x8000), 0x0000);
        assert_eq!(banks.prg_offset(0xBFFF), 0x3FFF);
        assert_eq!(banks.prg_offset(0xC000), 0x0000);
        assert_eq!(banks.prg_offset(0xFFFC), 0x3FFC);
    }

    #[test]
    fn bank_numbers_wrap() {
        let mut banks = BankSwitch::new(0x8000, 0x2000, Mirroring::Vertical);
        banks.set_prg_bank_16k(0, 5); // two 16K banks: 5 % 2 = 1
        assert_eq!(banks.prg_offset(0x8000), 0x4000);
        banks.set_chr_bank_8k(3);
        assert_eq!(banks.chr_offset(0x0000), 0x0000);
    }

    #[test]
    fn chr_windows() {
        let mut banks = BankSwitch::new(0x8000, 0x8000, Mirroring::Vertical);
        banks.set_chr_bank_4k(1, 3);
        assert_eq!(banks.chr_offset(0x1000), 3 * 0x1000);
        assert_eq!(banks.chr_offset(0x1FFF), 3 * 0x1000 + 0xFFF);
        banks.set_chr_bank_2k(0, 5);
        assert_eq!(banks.chr_offset(0x0000), 5 * 0x800);
        assert_eq!(banks.chr_offset(0x07FF), 5 * 0x800 + 0x7FF);
        banks.set_chr_bank_1k(7, 31);
        assert_eq!(banks.chr_offset(0x1C00), 31 * 0x400);
    }

    #[test]
    fn load_rejects_out_of_range_bank() {
        let mut banks = BankSwitch::new(0x4000, 0x2000, Mirroring::Vertical);
        let mut state = banks.save();
        state.prg_banks[0] = 9;
        assert!(banks.load(&state).is_err());
        assert_eq!(banks.prg_bank(0), 0);
    }
}
