use log::{debug, info};

use crate::nes::apu::Apu;
use crate::nes::bus::nes_bus::NesBus;
use crate::nes::cartridge::Cartridge;
use crate::nes::controller::PadButtons;
use crate::nes::cpu::interrupts::IrqLine;
use crate::nes::cpu::{Cpu, CpuBusInterface};
use crate::nes::ppu::{NullPpu, PpuRegisterPort};
use crate::nes::save_state::{SaveState, SaveStateError, SAVE_STATE_VERSION};

pub mod apu;
pub mod bus;
pub mod cartridge;
pub mod controller;
pub mod cpu;
pub mod ppu;
pub mod save_state;

/// Cycles spent pushing PC/P and loading a vector on NMI or IRQ entry
pub const INTERRUPT_CYCLES: u32 = 7;

#[derive(Debug, Clone, Default)]
pub struct NesConfig {
    /// Fill the CPU step log with disassembled instructions
    pub debug_enabled: bool,
}

/// Outcome of [`Nes::run_cycles`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// The budget was used up
    Completed { cycles: u64 },
    /// A breakpoint, watchpoint or CPU error stopped execution early
    Paused { cycles: u64 },
}

/// One emulated console: CPU, bus and the IRQ line shared by the APU and mappers
pub struct Nes {
    cpu: Cpu,
    bus: NesBus,
    irq_line: IrqLine,
    config: NesConfig,
    cycles: u64,
}

impl Nes {
    pub fn new(config: NesConfig) -> Nes {
        let irq_line = IrqLine::new();
        let apu = Apu::new(irq_line.trigger());
        let bus = NesBus::new(apu, Box::new(NullPpu::new()));
        Nes {
            cpu: Cpu::new(config.debug_enabled),
            bus,
            irq_line,
            config,
            cycles: 0,
        }
    }

    pub fn with_cartridge(config: NesConfig, cart: Cartridge) -> Nes {
        let mut nes = Nes::new(config);
        nes.insert_cartridge(cart);
        nes
    }

    /// Inserts a cartridge and performs a reset
    pub fn insert_cartridge(&mut self, cart: Cartridge) {
        self.bus.insert_cartridge(cart);
        self.reset();
    }

    pub fn set_ppu(&mut self, ppu: Box<dyn PpuRegisterPort>) {
        self.bus.set_ppu(ppu);
    }

    pub fn reset(&mut self) {
        self.bus.reset();
        self.irq_line.clear();
        self.cpu.reset(&mut self.bus);
        self.cycles = 0;
        debug!("reset: pc=${:04X}", self.cpu.program_counter);
    }

    /// Runs one instruction, taking a pending IRQ first. Returns CPU cycles
    /// including interrupt entry and any OAM DMA stall. A paused machine does
    /// nothing and returns 0.
    pub fn step(&mut self) -> u32 {
        if self.cpu.is_paused() {
            return 0;
        }

        let mut cycles = 0;
        // The line stays raised until the CPU accepts it
        if self.irq_line.is_raised() && self.cpu.request_irq(&mut self.bus) {
            self.irq_line.clear();
            cycles += INTERRUPT_CYCLES;
        }

        cycles += self.cpu.step(&mut self.bus) as u32;
        cycles += self.bus.take_dma_stall();
        self.cycles += cycles as u64;
        cycles
    }

    /// Steps until at least `budget` cycles have run or the CPU pauses
    pub fn run_cycles(&mut self, budget: u64) -> RunState {
        let mut spent = 0u64;
        while spent < budget {
            if self.cpu.is_paused() {
                info!("run stopped at ${:04X} after {} cycles", self.cpu.program_counter, spent);
                return RunState::Paused { cycles: spent };
            }
            spent += self.step() as u64;
        }
        RunState::Completed { cycles: spent }
    }

    /// Called by the frame driver once per scanline
    pub fn on_hblank(&mut self, scanline: u16) {
        if self.bus.on_hblank(scanline) {
            self.irq_line.raise();
        }
    }

    /// Vertical-blank NMI from the video side
    pub fn nmi(&mut self) {
        self.cpu.nmi(&mut self.bus);
        self.cycles += INTERRUPT_CYCLES as u64;
    }

    pub fn set_pad_status(&mut self, no: usize, buttons: PadButtons) {
        self.bus.apu_mut().set_pad_status(no, buttons);
    }

    pub fn pause(&mut self, paused: bool) {
        self.cpu.pause(paused);
    }

    pub fn is_paused(&self) -> bool {
        self.cpu.is_paused()
    }

    pub fn is_irq_pending(&self) -> bool {
        self.irq_line.is_raised()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn config(&self) -> &NesConfig {
        &self.config
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn bus(&self) -> &NesBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut NesBus {
        &mut self.bus
    }

    /// CPU-visible read with no debugger side effects
    pub fn peek(&mut self, addr: u16) -> u8 {
        self.bus.cpu_bus_read(addr)
    }

    pub fn dump(&mut self, start: u16, count: usize) -> Vec<String> {
        self.cpu.dump(&mut self.bus, start, count)
    }

    pub fn save(&self) -> SaveState {
        SaveState {
            version: SAVE_STATE_VERSION,
            cpu: self.cpu.save(),
            apu: self.bus.apu().save(),
            ram: self.bus.ram().to_vec(),
            cartridge: self.bus.cartridge().map(|cart| cart.save()),
            irq_pending: self.irq_line.is_raised(),
        }
    }

    /// Restores a snapshot. Everything is validated up front, so a rejected
    /// snapshot leaves the machine untouched.
    pub fn load(&mut self, state: &SaveState) -> Result<(), SaveStateError> {
        if state.version != SAVE_STATE_VERSION {
            return Err(SaveStateError::UnsupportedVersion(state.version));
        }
        state.cpu.validate()?;
        if state.ram.len() != self.bus.ram().len() {
            return Err(SaveStateError::Corrupt(format!(
                "work RAM image is {} bytes",
                state.ram.len()
            )));
        }
        match (self.bus.cartridge(), &state.cartridge) {
            (Some(cart), Some(cart_state)) => cart.validate(cart_state)?,
            (None, None) => {}
            _ => {
                return Err(SaveStateError::Corrupt(
                    "cartridge presence does not match the snapshot".into(),
                ));
            }
        }

        // Apu::load checks its own image before touching anything
        self.bus.apu_mut().load(&state.apu)?;
        self.cpu.load(&state.cpu)?;
        self.bus.load_ram(&state.ram)?;
        if let (Some(cart), Some(cart_state)) = (self.bus.cartridge_mut(), &state.cartridge) {
            cart.load(cart_state)?;
        }
        if state.irq_pending {
            self.irq_line.raise();
        } else {
            self.irq_line.clear();
        }
        Ok(())
    }
}
