//! Convenient imports for consumers of famicore
//!
//! Pull in everything commonly needed in one line:
//! ```rust
//! use famicore::prelude::*;
//! ```

// Main machine API
pub use crate::nes::{Nes, NesConfig, RunState};

// Components
pub use crate::nes::apu::{Apu, ChannelType};
pub use crate::nes::bus::nes_bus::NesBus;
pub use crate::nes::cpu::{Cpu, CpuBusInterface, CpuError, DebugEvent, Flags};
pub use crate::nes::ppu::PpuRegisterPort;

// Cartridges
pub use crate::nes::cartridge::{Cartridge, CartridgeError, Mapper, Mirroring};

// Input
pub use crate::nes::controller::gamepad::PadButtons;

// Snapshots
pub use crate::nes::save_state::{SaveState, SaveStateError};
