use log::{debug, warn};

use super::consts::*;
use crate::nes::apu::Apu;
use crate::nes::cartridge::{Cartridge, Mirroring};
use crate::nes::cpu::CpuBusInterface;
use crate::nes::ppu::PpuRegisterPort;
use crate::nes::save_state::SaveStateError;

/// The CPU's 16-bit address space.
///
/// Owns work RAM, the APU and the inserted cartridge; PPU registers are
/// forwarded to whatever [`PpuRegisterPort`] the host supplies.
pub struct NesBus {
    cpu_ram: [u8; CPU_RAM_SIZE],
    ppu: Box<dyn PpuRegisterPort>,
    apu: Apu,
    cart: Option<Cartridge>,

    // Some games expect an "open-bus":
    // i.e. invalid reads return last-read byte
    last_cpu_read: u8,

    /// CPU cycles owed to OAM DMA, collected by the machine after each step
    dma_stall: u32,
}

impl NesBus {
    pub fn new(apu: Apu, ppu: Box<dyn PpuRegisterPort>) -> NesBus {
        NesBus {
            cpu_ram: [0; CPU_RAM_SIZE],
            ppu,
            apu,
            cart: None,
            last_cpu_read: 0,
            dma_stall: 0,
        }
    }

    pub fn insert_cartridge(&mut self, cart: Cartridge) {
        debug!("NesBus::insert_cartridge() mapper={}", cart.mapper_no());
        self.cart = Some(cart);
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cart.as_ref()
    }

    pub fn cartridge_mut(&mut self) -> Option<&mut Cartridge> {
        self.cart.as_mut()
    }

    pub fn apu(&self) -> &Apu {
        &self.apu
    }

    pub fn apu_mut(&mut self) -> &mut Apu {
        &mut self.apu
    }

    pub fn set_ppu(&mut self, ppu: Box<dyn PpuRegisterPort>) {
        self.ppu = ppu;
    }

    pub fn ram(&self) -> &[u8; CPU_RAM_SIZE] {
        &self.cpu_ram
    }

    pub fn mirroring(&self) -> Mirroring {
        match &self.cart {
            Some(cart) => cart.mirroring(),
            None => Mirroring::Horizontal,
        }
    }

    /// PPU-side pattern table read ($0000-$1FFF)
    pub fn chr_read(&self, addr: u16) -> u8 {
        match &self.cart {
            Some(cart) => cart.ppu_read(addr),
            None => 0,
        }
    }

    pub fn chr_write(&mut self, addr: u16, value: u8) {
        if let Some(cart) = &mut self.cart {
            cart.ppu_write(addr, value);
        }
    }

    pub fn reset(&mut self) {
        self.cpu_ram = [0; CPU_RAM_SIZE];
        self.last_cpu_read = 0;
        self.dma_stall = 0;
        self.apu.reset();
        if let Some(cart) = &mut self.cart {
            cart.reset();
        }
    }

    /// Per-scanline tick for the APU and the cartridge.
    /// Returns true when the board raised an IRQ.
    pub fn on_hblank(&mut self, scanline: u16) -> bool {
        self.apu.on_hblank(scanline);
        match &mut self.cart {
            Some(cart) => cart.on_hblank(scanline),
            None => false,
        }
    }

    pub fn take_dma_stall(&mut self) -> u32 {
        std::mem::take(&mut self.dma_stall)
    }

    pub fn load_ram(&mut self, ram: &[u8]) -> Result<(), SaveStateError> {
        if ram.len() != CPU_RAM_SIZE {
            return Err(SaveStateError::Corrupt(format!(
                "work RAM image is {} bytes, expected {}",
                ram.len(),
                CPU_RAM_SIZE
            )));
        }
        self.cpu_ram.copy_from_slice(ram);
        Ok(())
    }

    fn oam_dma(&mut self, page: u8) {
        let base = (page as u16) << 8;
        let mut data = [0u8; 256];
        for (i, byte) in data.iter_mut().enumerate() {
            *byte = self.cpu_bus_read(base | i as u16);
        }
        self.ppu.write_oam_dma(&data);
        self.dma_stall += OAM_DMA_CYCLES;
    }
}

impl CpuBusInterface for NesBus {
    fn cpu_bus_read(&mut self, addr: u16) -> u8 {
        let value = match addr {
            CPU_RAM_START..=CPU_RAM_END => {
                // RAM mirrored every 0x0800
                self.cpu_ram[(addr & CPU_RAM_MASK) as usize]
            }
            PPU_REGISTERS_START..=PPU_REGISTERS_END => {
                // PPU Registers mirrored every 8 bytes
                self.ppu.read_register((addr & PPU_REGISTER_MASK) as u8)
            }
            OAM_DMA => {
                // Open bus
                self.last_cpu_read
            }
            APU_START..=APU_END => self.apu.read(addr),
            CART_START..=CART_END => match &self.cart {
                Some(cart) => cart.cpu_read(addr),
                None => 0,
            },
        };
        self.last_cpu_read = value;
        value
    }

    fn cpu_bus_write(&mut self, addr: u16, value: u8) {
        // Board registers win over everything else
        if let Some(cart) = &mut self.cart {
            if cart.claims(addr) {
                cart.cpu_write(addr, value);
                return;
            }
        }

        match addr {
            CPU_RAM_START..=CPU_RAM_END => {
                self.cpu_ram[(addr & CPU_RAM_MASK) as usize] = value;
            }
            PPU_REGISTERS_START..=PPU_REGISTERS_END => {
                self.ppu
                    .write_register((addr & PPU_REGISTER_MASK) as u8, value);
            }
            OAM_DMA => self.oam_dma(value),
            APU_START..=APU_END => self.apu.write(addr, value),
            CART_START..=CART_END => match &mut self.cart {
                Some(cart) => cart.cpu_write(addr, value),
                None => warn!("write to ${:04X} with no cartridge inserted", addr),
            },
        }
    }
}
