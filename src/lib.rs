// NES core modules
pub mod nes;
pub mod prelude;

// Re-exports
pub use nes::{Nes, NesConfig};

pub use nes::cartridge::{Cartridge, CartridgeError, Mapper, Mirroring};
pub use nes::save_state::{SaveState, SaveStateError};
