use std::ops::RangeInclusive;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::nes::save_state::SaveStateError;
use bank_switch::{BankState, BankSwitch, PRG_BANK_SIZE};

pub mod bank_switch;
pub mod mapper000_nrom;
pub mod mapper001_mmc1;
pub mod mapper002_ux_rom;
pub mod mapper003_cn_rom;
pub mod mapper004_mmc3;
pub mod mapper007_ax_rom;
pub mod mapper066_gx_rom;
pub mod mapper087;

use mapper000_nrom::Nrom;
use mapper001_mmc1::Mmc1;
use mapper002_ux_rom::UxRom;
use mapper003_cn_rom::CnRom;
use mapper004_mmc3::Mmc3;
use mapper007_ax_rom::AxRom;
use mapper066_gx_rom::GxRom;
use mapper087::Mapper087;

pub const PRG_RAM_START: u16 = 0x6000;
pub const PRG_RAM_END: u16 = 0x7FFF;
pub const PRG_RAM_SIZE: usize = 0x2000;
pub const PRG_ROM_START: u16 = 0x8000;
pub const CHR_RAM_SIZE: usize = 0x2000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartridgeError {
    #[error("Unsupported Mapper: {0}")]
    UnsupportedMapper(u16),

    #[error("PRG ROM size {0:#X} is not a non-zero multiple of 8 KiB")]
    InvalidPrgSize(usize),

    #[error("CHR size {0:#X} is not a multiple of 1 KiB")]
    InvalidChrSize(usize),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mirroring {
    Vertical,
    Horizontal,
    FourScreen,
    Single0,
    Single1,
}

/// Board-specific bank-switching logic.
///
/// A mapper never touches ROM data itself. It decodes register writes into
/// bank selections on the shared [`BankSwitch`], which the cartridge consults
/// on every fetch.
pub trait Mapper {
    fn mapper_no(&self) -> u16;

    /// CPU address ranges whose writes go to the board instead of memory
    fn write_ranges(&self) -> Vec<RangeInclusive<u16>>;

    fn reset(&mut self, banks: &mut BankSwitch);

    fn write(&mut self, addr: u16, value: u8, banks: &mut BankSwitch);

    /// Called once per scanline. Returns true to raise an IRQ.
    fn on_hblank(&mut self, _scanline: u16) -> bool {
        false
    }

    fn save_registers(&self) -> Vec<u8>;

    fn load_registers(&mut self, regs: &[u8]) -> Result<(), SaveStateError>;
}

pub fn create_mapper(mapper_no: u16) -> Result<Box<dyn Mapper>, CartridgeError> {
    let mapper: Box<dyn Mapper> = match mapper_no {
        0 => Box::new(Nrom),
        1 => Box::new(Mmc1::new()),
        2 => Box::new(UxRom),
        3 => Box::new(CnRom),
        4 => Box::new(Mmc3::new()),
        7 => Box::new(AxRom),
        66 => Box::new(GxRom),
        87 => Box::new(Mapper087),
        _ => return Err(CartridgeError::UnsupportedMapper(mapper_no)),
    };
    Ok(mapper)
}

/// Fails with `Corrupt` unless the register image has the expected length
pub(crate) fn check_register_len(
    mapper_no: u16,
    regs: &[u8],
    expected: usize,
) -> Result<(), SaveStateError> {
    if regs.len() != expected {
        return Err(SaveStateError::Corrupt(format!(
            "mapper {} expects {} register bytes, got {}",
            mapper_no,
            expected,
            regs.len()
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartridgeState {
    pub mapper_no: u16,
    pub banks: BankState,
    pub prg_ram: Vec<u8>,
    /// Only present when the board uses CHR-RAM
    pub chr_ram: Option<Vec<u8>>,
    pub mapper_registers: Vec<u8>,
}

pub struct Cartridge {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    prg_ram: Vec<u8>,
    banks: BankSwitch,
    mapper: Box<dyn Mapper>,
    write_ranges: Vec<RangeInclusive<u16>>,
}

impl Cartridge {
    pub fn new(
        prg_rom: Vec<u8>,
        chr_rom: Vec<u8>,
        mapper_no: u16,
        mirroring: Mirroring,
    ) -> Result<Cartridge, CartridgeError> {
        if prg_rom.is_empty() || prg_rom.len() % PRG_BANK_SIZE != 0 {
            return Err(CartridgeError::InvalidPrgSize(prg_rom.len()));
        }
        if chr_rom.len() % bank_switch::CHR_BANK_SIZE != 0 {
            return Err(CartridgeError::InvalidChrSize(chr_rom.len()));
        }
        let mapper = create_mapper(mapper_no)?;

        let chr_is_ram = chr_rom.is_empty();
        let chr = if chr_is_ram {
            vec![0u8; CHR_RAM_SIZE]
        } else {
            chr_rom
        };
        let banks = BankSwitch::new(prg_rom.len(), chr.len(), mirroring);
        let write_ranges = mapper.write_ranges();

        let mut cart = Cartridge {
            prg_rom,
            chr,
            chr_is_ram,
            prg_ram: vec![0u8; PRG_RAM_SIZE],
            banks,
            mapper,
            write_ranges,
        };
        cart.reset();
        debug!(
            "Cartridge: mapper={} prg={:#X} chr={:#X}{}",
            mapper_no,
            cart.prg_rom.len(),
            cart.chr.len(),
            if cart.chr_is_ram { " (RAM)" } else { "" }
        );
        Ok(cart)
    }

    pub fn reset(&mut self) {
        self.mapper.reset(&mut self.banks);
    }

    pub fn mapper_no(&self) -> u16 {
        self.mapper.mapper_no()
    }

    pub fn banks(&self) -> &BankSwitch {
        &self.banks
    }

    /// True when the board intercepts CPU writes to `addr`
    pub fn claims(&self, addr: u16) -> bool {
        self.write_ranges.iter().any(|r| r.contains(&addr))
    }

    /// CPU read ($4020-$FFFF)
    pub fn cpu_read(&self, addr: u16) -> u8 {
        match addr {
            PRG_RAM_START..=PRG_RAM_END => self.prg_ram[(addr - PRG_RAM_START) as usize],
            PRG_ROM_START..=0xFFFF => {
                let offset = self.banks.prg_offset(addr);
                self.prg_rom[offset % self.prg_rom.len()]
            }
            _ => 0, // open bus
        }
    }

    /// CPU write ($4020-$FFFF)
    pub fn cpu_write(&mut self, addr: u16, value: u8) {
        if self.claims(addr) {
            self.mapper.write(addr, value, &mut self.banks);
            return;
        }
        match addr {
            PRG_RAM_START..=PRG_RAM_END => {
                self.prg_ram[(addr - PRG_RAM_START) as usize] = value;
            }
            _ => {}
        }
    }

    /// PPU read ($0000-$1FFF)
    pub fn ppu_read(&self, addr: u16) -> u8 {
        let offset = self.banks.chr_offset(addr);
        self.chr[offset % self.chr.len()]
    }

    /// PPU write ($0000-$1FFF); ignored for CHR-ROM
    pub fn ppu_write(&mut self, addr: u16, value: u8) {
        if self.chr_is_ram {
            let offset = self.banks.chr_offset(addr) % self.chr.len();
            self.chr[offset] = value;
        }
    }

    pub fn mirroring(&self) -> Mirroring {
        self.banks.mirroring()
    }

    /// Per-scanline hook. Returns true when the board raises an IRQ.
    pub fn on_hblank(&mut self, scanline: u16) -> bool {
        self.mapper.on_hblank(scanline)
    }

    pub fn save(&self) -> CartridgeState {
        CartridgeState {
            mapper_no: self.mapper.mapper_no(),
            banks: self.banks.save(),
            prg_ram: self.prg_ram.clone(),
            chr_ram: if self.chr_is_ram {
                Some(self.chr.clone())
            } else {
                None
            },
            mapper_registers: self.mapper.save_registers(),
        }
    }

    pub fn validate(&self, state: &CartridgeState) -> Result<(), SaveStateError> {
        if state.mapper_no != self.mapper.mapper_no() {
            return Err(SaveStateError::Corrupt(format!(
                "snapshot is for mapper {}, cartridge uses mapper {}",
                state.mapper_no,
                self.mapper.mapper_no()
            )));
        }
        if state.prg_ram.len() != PRG_RAM_SIZE {
            return Err(SaveStateError::Corrupt(format!(
                "PRG-RAM image is {} bytes",
                state.prg_ram.len()
            )));
        }
        match (&state.chr_ram, self.chr_is_ram) {
            (Some(ram), true) if ram.len() == self.chr.len() => {}
            (None, false) => {}
            _ => {
                return Err(SaveStateError::Corrupt(
                    "CHR-RAM image does not match the cartridge".into(),
                ));
            }
        }
        // Dry run against a scratch copy so a bad snapshot leaves us untouched
        let mut banks = self.banks.clone();
        banks.load(&state.banks)?;
        let mut scratch = create_mapper(state.mapper_no)
            .map_err(|e| SaveStateError::Corrupt(e.to_string()))?;
        scratch.load_registers(&state.mapper_registers)
    }

    pub fn load(&mut self, state: &CartridgeState) -> Result<(), SaveStateError> {
        self.validate(state)?;
        self.banks.load(&state.banks)?;
        self.mapper.load_registers(&state.mapper_registers)?;
        self.prg_ram.copy_from_slice(&state.prg_ram);
        if let Some(ram) = &state.chr_ram {
            self.chr.copy_from_slice(ram);
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;

    /// PRG image whose every 8 KiB bank is filled with its own index
    pub fn tagged_prg(banks: usize) -> Vec<u8> {
        (0..banks)
            .flat_map(|b| std::iter::repeat(b as u8).take(PRG_BANK_SIZE))
            .collect()
    }

    /// CHR image whose every 1 KiB bank is filled with its own index
    pub fn tagged_chr(banks: usize) -> Vec<u8> {
        (0..banks)
            .flat_map(|b| std::iter::repeat(b as u8).take(bank_switch::CHR_BANK_SIZE))
            .collect()
    }

    pub fn cart(mapper_no: u16, prg_8k: usize, chr_1k: usize) -> Cartridge {
        Cartridge::new(
            tagged_prg(prg_8k),
            tagged_chr(chr_1k),
            mapper_no,
            Mirroring::Horizontal,
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_util::*;
    use super::*;

    #[test]
    fn rejects_unsupported_mapper() {
        let err = Cartridge::new(tagged_prg(2), vec![], 5, Mirroring::Vertical)
            .err()
            .unwrap();
        assert_eq!(err, CartridgeError::UnsupportedMapper(5));
    }

    #[test]
    fn rejects_bad_prg_size() {
        let err = Cartridge::new(vec![], vec![], 0, Mirroring::Vertical)
            .err()
            .unwrap();
        assert_eq!(err, CartridgeError::InvalidPrgSize(0));
        let err = Cartridge::new(vec![0; 0x1000], vec![], 0, Mirroring::Vertical)
            .err()
            .unwrap();
        assert_eq!(err, CartridgeError::InvalidPrgSize(0x1000));
    }

    #[test]
    fn prg_ram_read_write() {
        let mut cart = cart(0, 2, 8);
        cart.cpu_write(0x6000, 0x42);
        cart.cpu_write(0x7FFF, 0x24);
        assert_eq!(cart.cpu_read(0x6000), 0x42);
        assert_eq!(cart.cpu_read(0x7FFF), 0x24);
        assert_eq!(cart.cpu_read(0x5000), 0);
    }

    #[test]
    fn chr_rom_is_read_only_chr_ram_is_not() {
        let mut rom = cart(0, 2, 8);
        rom.ppu_write(0x0000, 0xAA);
        assert_eq!(rom.ppu_read(0x0000), 0);

        let mut ram = Cartridge::new(tagged_prg(2), vec![], 0, Mirroring::Vertical).unwrap();
        ram.ppu_write(0x1234, 0xAA);
        assert_eq!(ram.ppu_read(0x1234), 0xAA);
    }

    #[test]
    fn save_load_round_trip_restores_banks_and_ram() {
        let mut cart = Cartridge::new(tagged_prg(8), vec![], 2, Mirroring::Vertical).unwrap();
        cart.cpu_write(0x8000, 2);
        cart.cpu_write(0x6001, 0x77);
        cart.ppu_write(0x0010, 0x55);
        let state = cart.save();

        cart.cpu_write(0x8000, 0);
        cart.cpu_write(0x6001, 0);
        cart.ppu_write(0x0010, 0);
        cart.load(&state).unwrap();

        assert_eq!(cart.cpu_read(0x8000), 4);
        assert_eq!(cart.cpu_read(0x6001), 0x77);
        assert_eq!(cart.ppu_read(0x0010), 0x55);
    }

    #[test]
    fn load_rejects_foreign_snapshot() {
        let mut cart = cart(0, 2, 8);
        let mut state = cart.save();
        state.mapper_no = 3;
        assert!(cart.load(&state).is_err());

        let mut state = cart.save();
        state.prg_ram.truncate(10);
        assert!(cart.load(&state).is_err());

        let mut state = cart.save();
        state.chr_ram = Some(vec![0; CHR_RAM_SIZE]);
        assert!(cart.load(&state).is_err());
    }
}
