use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::nes::apu::ApuState;
use crate::nes::cartridge::CartridgeState;
use crate::nes::cpu::CpuState;

pub const SAVE_STATE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SaveStateError {
    #[error("Corrupt save state: {0}")]
    Corrupt(String),

    #[error("Unsupported save state version: v{0}")]
    UnsupportedVersion(u32),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Structural snapshot of the whole machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveState {
    pub version: u32,
    pub cpu: CpuState,
    pub apu: ApuState,
    pub ram: Vec<u8>,
    pub cartridge: Option<CartridgeState>,
    /// IRQ raised by the APU or a mapper but not yet taken by the CPU
    #[serde(default)]
    pub irq_pending: bool,
}

impl SaveState {
    pub fn to_json(&self) -> Result<String, SaveStateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<SaveState, SaveStateError> {
        let state: SaveState = serde_json::from_str(json)?;
        if state.version != SAVE_STATE_VERSION {
            return Err(SaveStateError::UnsupportedVersion(state.version));
        }
        Ok(state)
    }
}
