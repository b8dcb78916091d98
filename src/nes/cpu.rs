use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod debugger;
pub mod disasm;
mod instruction_handlers;
pub mod interrupts;
pub mod opcodes;
pub mod processor;
pub mod state;
pub mod step_log;


pub use debugger::{Breakpoints, DebugEvent, Watchpoints};
pub use state::CpuState;
use step_log::StepLog;

pub const CPU_STACK_BASE: u16 = 0x0100;
pub const MAX_STEP_LOG: usize = 200;

/// Memory seen by the CPU. Mapper write intercepts live behind this interface.
pub trait CpuBusInterface {
    fn cpu_bus_read(&mut self, addr: u16) -> u8;
    fn cpu_bus_write(&mut self, addr: u16, value: u8);
}

bitflags! {
    /* https://www.nesdev.org/wiki/Status_flags
            7  bit  0
        ---- ----
        NV1B DIZC
        |||| ||||
        |||| |||+- Carry
        |||| ||+-- Zero
        |||| |+--- Interrupt Disable
        |||| +---- Decimal
        |||+------ (No CPU effect; see: the B flag)
        ||+------- (No CPU effect; always pushed as 1)
        |+-------- Overflow
        +--------- Negative
     */
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Flags: u8 {
        const CARRY             = 1<<0;
        const ZERO              = 1<<1;
        const INTERRUPT_DISABLE = 1<<2;
        const DECIMAL_MODE      = 1<<3;
        const BREAK             = 1<<4;
        const RESERVED          = 1<<5;
        const OVERFLOW          = 1<<6;
        const NEGATIVE          = 1<<7;
    }
}

/// N and Z bits for every possible result byte
pub const NZ_TABLE: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let mut value = 0;
        if i == 0 {
            value |= Flags::ZERO.bits();
        }
        if i & 0x80 != 0 {
            value |= Flags::NEGATIVE.bits();
        }
        table[i] = value;
        i += 1;
    }
    table
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,  // Only JMP supports this mode
    IndirectX,
    IndirectY,
    Relative,  // The branch instructions exclusively use this mode
}

impl AddressingMode {
    pub fn has_operand(&self) -> bool {
        !matches!(self, AddressingMode::Implied | AddressingMode::Accumulator)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("Unknown opcode 0x{code:02X} at ${pc:04X}")]
    UnknownOpcode { code: u8, pc: u16 },

    #[error("{name} at ${pc:04X} has no memory operand")]
    IllegalAddressing { name: &'static str, pc: u16 },
}

/// Resolved operand of the instruction being executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    /// `None` for accumulator and implied addressing
    pub addr: Option<u16>,
    pub page_crossed: bool,
}

impl Operand {
    pub const NONE: Operand = Operand {
        addr: None,
        page_crossed: false,
    };

    pub fn at(addr: u16) -> Operand {
        Operand {
            addr: Some(addr),
            page_crossed: false,
        }
    }
}

pub struct Cpu {
    pub register_a: u8,
    pub register_x: u8,
    pub register_y: u8,
    pub stack_pointer: u8,
    pub status: Flags,
    pub program_counter: u16,

    pub paused: bool,
    pub error: Option<CpuError>,

    pub breakpoints: Breakpoints,
    pub watchpoints: Watchpoints,

    debug_enabled: bool,
    step_log: StepLog,

    // address and table entry of the opcode currently executing
    instruction_pc: u16,
    current_op: Option<&'static opcodes::Instruction>,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new(false)
    }
}
