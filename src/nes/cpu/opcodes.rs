use super::{AddressingMode, Cpu, CpuBusInterface, Operand};
use once_cell::sync::Lazy;
use std::fmt;

/// Executes an instruction against its resolved operand and returns extra cycles
pub type ExecFn = fn(&mut Cpu, &mut dyn CpuBusInterface, Operand) -> u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpType {
    Lda, Ldx, Ldy, Sta, Stx, Sty,
    Tax, Tay, Txa, Tya, Txs, Tsx,
    Adc, Sbc,
    Inx, Iny, Inc, Dex, Dey, Dec,
    And, Ora, Eor,
    Rol, Ror, Asl, Lsr,
    Bit, Cmp, Cpx, Cpy,
    Jmp, Jsr, Rts, Rti,
    Bcc, Bcs, Bpl, Bmi, Bne, Beq, Bvc, Bvs,
    Pha, Php, Pla, Plp,
    Clc, Sec, Sei, Cli, Clv, Sed, Cld,
    Brk, Nop,
}

impl OpType {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            OpType::Lda => "LDA",
            OpType::Ldx => "LDX",
            OpType::Ldy => "LDY",
            OpType::Sta => "STA",
            OpType::Stx => "STX",
            OpType::Sty => "STY",
            OpType::Tax => "TAX",
            OpType::Tay => "TAY",
            OpType::Txa => "TXA",
            OpType::Tya => "TYA",
            OpType::Txs => "TXS",
            OpType::Tsx => "TSX",
            OpType::Adc => "ADC",
            OpType::Sbc => "SBC",
            OpType::Inx => "INX",
            OpType::Iny => "INY",
            OpType::Inc => "INC",
            OpType::Dex => "DEX",
            OpType::Dey => "DEY",
            OpType::Dec => "DEC",
            OpType::And => "AND",
            OpType::Ora => "ORA",
            OpType::Eor => "EOR",
            OpType::Rol => "ROL",
            OpType::Ror => "ROR",
            OpType::Asl => "ASL",
            OpType::Lsr => "LSR",
            OpType::Bit => "BIT",
            OpType::Cmp => "CMP",
            OpType::Cpx => "CPX",
            OpType::Cpy => "CPY",
            OpType::Jmp => "JMP",
            OpType::Jsr => "JSR",
            OpType::Rts => "RTS",
            OpType::Rti => "RTI",
            OpType::Bcc => "BCC",
            OpType::Bcs => "BCS",
            OpType::Bpl => "BPL",
            OpType::Bmi => "BMI",
            OpType::Bne => "BNE",
            OpType::Beq => "BEQ",
            OpType::Bvc => "BVC",
            OpType::Bvs => "BVS",
            OpType::Pha => "PHA",
            OpType::Php => "PHP",
            OpType::Pla => "PLA",
            OpType::Plp => "PLP",
            OpType::Clc => "CLC",
            OpType::Sec => "SEC",
            OpType::Sei => "SEI",
            OpType::Cli => "CLI",
            OpType::Clv => "CLV",
            OpType::Sed => "SED",
            OpType::Cld => "CLD",
            OpType::Brk => "BRK",
            OpType::Nop => "NOP",
        }
    }
}

pub struct Instruction {
    pub code: u8,
    pub op: OpType,
    pub size: u8,
    pub cycles: u8,
    pub mode: AddressingMode,
    /// +1 cycle when the indexed address leaves the base page
    pub page_penalty: bool,
    pub exec: ExecFn,
}

impl Instruction {
    pub const fn new(
        code: u8,
        op: OpType,
        size: u8,
        cycles: u8,
        mode: AddressingMode,
        exec: ExecFn,
    ) -> Self {
        Self {
            code,
            op,
            size,
            cycles,
            mode,
            page_penalty: false,
            exec,
        }
    }

    pub const fn page_penalty(mut self) -> Self {
        self.page_penalty = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.op.mnemonic()
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("code", &format_args!("0x{:02X}", self.code))
            .field("op", &self.op)
            .field("size", &self.size)
            .field("cycles", &self.cycles)
            .field("mode", &self.mode)
            .field("page_penalty", &self.page_penalty)
            .finish()
    }
}

use AddressingMode::*;

#[rustfmt::skip]
static OPCODES: &[Instruction] = &[
    // Software-defined interrupt
    Instruction::new(0x00, OpType::Brk, 1, 7, Implied, Cpu::brk),

    // General NOP
    Instruction::new(0xEA, OpType::Nop, 1, 2, Implied, Cpu::nop),

    // Transfers
    Instruction::new(0xAA, OpType::Tax, 1, 2, Implied, Cpu::tax),
    Instruction::new(0xA8, OpType::Tay, 1, 2, Implied, Cpu::tay),
    Instruction::new(0x8A, OpType::Txa, 1, 2, Implied, Cpu::txa),
    Instruction::new(0x98, OpType::Tya, 1, 2, Implied, Cpu::tya),
    Instruction::new(0xBA, OpType::Tsx, 1, 2, Implied, Cpu::tsx),
    Instruction::new(0x9A, OpType::Txs, 1, 2, Implied, Cpu::txs),

    // Flags
    Instruction::new(0xF8, OpType::Sed, 1, 2, Implied, Cpu::sed),
    Instruction::new(0x78, OpType::Sei, 1, 2, Implied, Cpu::sei),
    Instruction::new(0x38, OpType::Sec, 1, 2, Implied, Cpu::sec),
    Instruction::new(0xD8, OpType::Cld, 1, 2, Implied, Cpu::cld),
    Instruction::new(0x58, OpType::Cli, 1, 2, Implied, Cpu::cli),
    Instruction::new(0x18, OpType::Clc, 1, 2, Implied, Cpu::clc),
    Instruction::new(0xB8, OpType::Clv, 1, 2, Implied, Cpu::clv),

    // Loads
    Instruction::new(0xA9, OpType::Lda, 2, 2, Immediate, Cpu::lda),
    Instruction::new(0xA5, OpType::Lda, 2, 3, ZeroPage,  Cpu::lda),
    Instruction::new(0xB5, OpType::Lda, 2, 4, ZeroPageX, Cpu::lda),
    Instruction::new(0xAD, OpType::Lda, 3, 4, Absolute,  Cpu::lda),
    Instruction::new(0xBD, OpType::Lda, 3, 4, AbsoluteX, Cpu::lda).page_penalty(),
    Instruction::new(0xB9, OpType::Lda, 3, 4, AbsoluteY, Cpu::lda).page_penalty(),
    Instruction::new(0xA1, OpType::Lda, 2, 6, IndirectX, Cpu::lda),
    Instruction::new(0xB1, OpType::Lda, 2, 5, IndirectY, Cpu::lda).page_penalty(),

    Instruction::new(0xA2, OpType::Ldx, 2, 2, Immediate, Cpu::ldx),
    Instruction::new(0xA6, OpType::Ldx, 2, 3, ZeroPage,  Cpu::ldx),
    Instruction::new(0xB6, OpType::Ldx, 2, 4, ZeroPageY, Cpu::ldx),
    Instruction::new(0xAE, OpType::Ldx, 3, 4, Absolute,  Cpu::ldx),
    Instruction::new(0xBE, OpType::Ldx, 3, 4, AbsoluteY, Cpu::ldx).page_penalty(),

    Instruction::new(0xA0, OpType::Ldy, 2, 2, Immediate, Cpu::ldy),
    Instruction::new(0xA4, OpType::Ldy, 2, 3, ZeroPage,  Cpu::ldy),
    Instruction::new(0xB4, OpType::Ldy, 2, 4, ZeroPageX, Cpu::ldy),
    Instruction::new(0xAC, OpType::Ldy, 3, 4, Absolute,  Cpu::ldy),
    Instruction::new(0xBC, OpType::Ldy, 3, 4, AbsoluteX, Cpu::ldy).page_penalty(),

    // Stores
    Instruction::new(0x85, OpType::Sta, 2, 3, ZeroPage,  Cpu::sta),
    Instruction::new(0x95, OpType::Sta, 2, 4, ZeroPageX, Cpu::sta),
    Instruction::new(0x8D, OpType::Sta, 3, 4, Absolute,  Cpu::sta),
    Instruction::new(0x9D, OpType::Sta, 3, 5, AbsoluteX, Cpu::sta),
    Instruction::new(0x99, OpType::Sta, 3, 5, AbsoluteY, Cpu::sta),
    Instruction::new(0x81, OpType::Sta, 2, 6, IndirectX, Cpu::sta),
    Instruction::new(0x91, OpType::Sta, 2, 6, IndirectY, Cpu::sta),

    Instruction::new(0x86, OpType::Stx, 2, 3, ZeroPage,  Cpu::stx),
    Instruction::new(0x96, OpType::Stx, 2, 4, ZeroPageY, Cpu::stx),
    Instruction::new(0x8E, OpType::Stx, 3, 4, Absolute,  Cpu::stx),

    Instruction::new(0x84, OpType::Sty, 2, 3, ZeroPage,  Cpu::sty),
    Instruction::new(0x94, OpType::Sty, 2, 4, ZeroPageX, Cpu::sty),
    Instruction::new(0x8C, OpType::Sty, 3, 4, Absolute,  Cpu::sty),

    // Stack
    Instruction::new(0x48, OpType::Pha, 1, 3, Implied, Cpu::pha),
    Instruction::new(0x08, OpType::Php, 1, 3, Implied, Cpu::php),
    Instruction::new(0x68, OpType::Pla, 1, 4, Implied, Cpu::pla),
    Instruction::new(0x28, OpType::Plp, 1, 4, Implied, Cpu::plp),

    // Shifts
    Instruction::new(0x0A, OpType::Asl, 1, 2, Accumulator, Cpu::asl),
    Instruction::new(0x06, OpType::Asl, 2, 5, ZeroPage,    Cpu::asl),
    Instruction::new(0x16, OpType::Asl, 2, 6, ZeroPageX,   Cpu::asl),
    Instruction::new(0x0E, OpType::Asl, 3, 6, Absolute,    Cpu::asl),
    Instruction::new(0x1E, OpType::Asl, 3, 7, AbsoluteX,   Cpu::asl),

    Instruction::new(0x4A, OpType::Lsr, 1, 2, Accumulator, Cpu::lsr),
    Instruction::new(0x46, OpType::Lsr, 2, 5, ZeroPage,    Cpu::lsr),
    Instruction::new(0x56, OpType::Lsr, 2, 6, ZeroPageX,   Cpu::lsr),
    Instruction::new(0x4E, OpType::Lsr, 3, 6, Absolute,    Cpu::lsr),
    Instruction::new(0x5E, OpType::Lsr, 3, 7, AbsoluteX,   Cpu::lsr),

    // Rotates
    Instruction::new(0x2A, OpType::Rol, 1, 2, Accumulator, Cpu::rol),
    Instruction::new(0x26, OpType::Rol, 2, 5, ZeroPage,    Cpu::rol),
    Instruction::new(0x36, OpType::Rol, 2, 6, ZeroPageX,   Cpu::rol),
    Instruction::new(0x2E, OpType::Rol, 3, 6, Absolute,    Cpu::rol),
    Instruction::new(0x3E, OpType::Rol, 3, 7, AbsoluteX,   Cpu::rol),

    Instruction::new(0x6A, OpType::Ror, 1, 2, Accumulator, Cpu::ror),
    Instruction::new(0x66, OpType::Ror, 2, 5, ZeroPage,    Cpu::ror),
    Instruction::new(0x76, OpType::Ror, 2, 6, ZeroPageX,   Cpu::ror),
    Instruction::new(0x6E, OpType::Ror, 3, 6, Absolute,    Cpu::ror),
    Instruction::new(0x7E, OpType::Ror, 3, 7, AbsoluteX,   Cpu::ror),

    // Increments
    Instruction::new(0xE6, OpType::Inc, 2, 5, ZeroPage,  Cpu::inc),
    Instruction::new(0xF6, OpType::Inc, 2, 6, ZeroPageX, Cpu::inc),
    Instruction::new(0xEE, OpType::Inc, 3, 6, Absolute,  Cpu::inc),
    Instruction::new(0xFE, OpType::Inc, 3, 7, AbsoluteX, Cpu::inc),
    Instruction::new(0xE8, OpType::Inx, 1, 2, Implied,   Cpu::inx),
    Instruction::new(0xC8, OpType::Iny, 1, 2, Implied,   Cpu::iny),

    // Decrements
    Instruction::new(0xC6, OpType::Dec, 2, 5, ZeroPage,  Cpu::dec),
    Instruction::new(0xD6, OpType::Dec, 2, 6, ZeroPageX, Cpu::dec),
    Instruction::new(0xCE, OpType::Dec, 3, 6, Absolute,  Cpu::dec),
    Instruction::new(0xDE, OpType::Dec, 3, 7, AbsoluteX, Cpu::dec),
    Instruction::new(0xCA, OpType::Dex, 1, 2, Implied,   Cpu::dex),
    Instruction::new(0x88, OpType::Dey, 1, 2, Implied,   Cpu::dey),

    // Comparisons
    Instruction::new(0xC9, OpType::Cmp, 2, 2, Immediate, Cpu::cmp),
    Instruction::new(0xC5, OpType::Cmp, 2, 3, ZeroPage,  Cpu::cmp),
    Instruction::new(0xD5, OpType::Cmp, 2, 4, ZeroPageX, Cpu::cmp),
    Instruction::new(0xCD, OpType::Cmp, 3, 4, Absolute,  Cpu::cmp),
    Instruction::new(0xDD, OpType::Cmp, 3, 4, AbsoluteX, Cpu::cmp).page_penalty(),
    Instruction::new(0xD9, OpType::Cmp, 3, 4, AbsoluteY, Cpu::cmp).page_penalty(),
    Instruction::new(0xC1, OpType::Cmp, 2, 6, IndirectX, Cpu::cmp),
    Instruction::new(0xD1, OpType::Cmp, 2, 5, IndirectY, Cpu::cmp).page_penalty(),

    Instruction::new(0xE0, OpType::Cpx, 2, 2, Immediate, Cpu::cpx),
    Instruction::new(0xE4, OpType::Cpx, 2, 3, ZeroPage,  Cpu::cpx),
    Instruction::new(0xEC, OpType::Cpx, 3, 4, Absolute,  Cpu::cpx),

    Instruction::new(0xC0, OpType::Cpy, 2, 2, Immediate, Cpu::cpy),
    Instruction::new(0xC4, OpType::Cpy, 2, 3, ZeroPage,  Cpu::cpy),
    Instruction::new(0xCC, OpType::Cpy, 3, 4, Absolute,  Cpu::cpy),

    // Arithmetic
    Instruction::new(0x69, OpType::Adc, 2, 2, Immediate, Cpu::adc),
    Instruction::new(0x65, OpType::Adc, 2, 3, ZeroPage,  Cpu::adc),
    Instruction::new(0x75, OpType::Adc, 2, 4, ZeroPageX, Cpu::adc),
    Instruction::new(0x6D, OpType::Adc, 3, 4, Absolute,  Cpu::adc),
    Instruction::new(0x7D, OpType::Adc, 3, 4, AbsoluteX, Cpu::adc).page_penalty(),
    Instruction::new(0x79, OpType::Adc, 3, 4, AbsoluteY, Cpu::adc).page_penalty(),
    Instruction::new(0x61, OpType::Adc, 2, 6, IndirectX, Cpu::adc),
    Instruction::new(0x71, OpType::Adc, 2, 5, IndirectY, Cpu::adc).page_penalty(),

    Instruction::new(0xE9, OpType::Sbc, 2, 2, Immediate, Cpu::sbc),
    Instruction::new(0xE5, OpType::Sbc, 2, 3, ZeroPage,  Cpu::sbc),
    Instruction::new(0xF5, OpType::Sbc, 2, 4, ZeroPageX, Cpu::sbc),
    Instruction::new(0xED, OpType::Sbc, 3, 4, Absolute,  Cpu::sbc),
    Instruction::new(0xFD, OpType::Sbc, 3, 4, AbsoluteX, Cpu::sbc).page_penalty(),
    Instruction::new(0xF9, OpType::Sbc, 3, 4, AbsoluteY, Cpu::sbc).page_penalty(),
    Instruction::new(0xE1, OpType::Sbc, 2, 6, IndirectX, Cpu::sbc),
    Instruction::new(0xF1, OpType::Sbc, 2, 5, IndirectY, Cpu::sbc).page_penalty(),

    // Logic
    Instruction::new(0x29, OpType::And, 2, 2, Immediate, Cpu::and),
    Instruction::new(0x25, OpType::And, 2, 3, ZeroPage,  Cpu::and),
    Instruction::new(0x35, OpType::And, 2, 4, ZeroPageX, Cpu::and),
    Instruction::new(0x2D, OpType::And, 3, 4, Absolute,  Cpu::and),
    Instruction::new(0x3D, OpType::And, 3, 4, AbsoluteX, Cpu::and).page_penalty(),
    Instruction::new(0x39, OpType::And, 3, 4, AbsoluteY, Cpu::and).page_penalty(),
    Instruction::new(0x21, OpType::And, 2, 6, IndirectX, Cpu::and),
    Instruction::new(0x31, OpType::And, 2, 5, IndirectY, Cpu::and).page_penalty(),

    Instruction::new(0x49, OpType::Eor, 2, 2, Immediate, Cpu::eor),
    Instruction::new(0x45, OpType::Eor, 2, 3, ZeroPage,  Cpu::eor),
    Instruction::new(0x55, OpType::Eor, 2, 4, ZeroPageX, Cpu::eor),
    Instruction::new(0x4D, OpType::Eor, 3, 4, Absolute,  Cpu::eor),
    Instruction::new(0x5D, OpType::Eor, 3, 4, AbsoluteX, Cpu::eor).page_penalty(),
    Instruction::new(0x59, OpType::Eor, 3, 4, AbsoluteY, Cpu::eor).page_penalty(),
    Instruction::new(0x41, OpType::Eor, 2, 6, IndirectX, Cpu::eor),
    Instruction::new(0x51, OpType::Eor, 2, 5, IndirectY, Cpu::eor).page_penalty(),

    Instruction::new(0x09, OpType::Ora, 2, 2, Immediate, Cpu::ora),
    Instruction::new(0x05, OpType::Ora, 2, 3, ZeroPage,  Cpu::ora),
    Instruction::new(0x15, OpType::Ora, 2, 4, ZeroPageX, Cpu::ora),
    Instruction::new(0x0D, OpType::Ora, 3, 4, Absolute,  Cpu::ora),
    Instruction::new(0x1D, OpType::Ora, 3, 4, AbsoluteX, Cpu::ora).page_penalty(),
    Instruction::new(0x19, OpType::Ora, 3, 4, AbsoluteY, Cpu::ora).page_penalty(),
    Instruction::new(0x01, OpType::Ora, 2, 6, IndirectX, Cpu::ora),
    Instruction::new(0x11, OpType::Ora, 2, 5, IndirectY, Cpu::ora).page_penalty(),

    Instruction::new(0x24, OpType::Bit, 2, 3, ZeroPage, Cpu::bit),
    Instruction::new(0x2C, OpType::Bit, 3, 4, Absolute, Cpu::bit),

    // Jumps & subroutines
    Instruction::new(0x4C, OpType::Jmp, 3, 3, Absolute, Cpu::jmp),
    Instruction::new(0x6C, OpType::Jmp, 3, 5, Indirect, Cpu::jmp),
    Instruction::new(0x20, OpType::Jsr, 3, 6, Absolute, Cpu::jsr),
    Instruction::new(0x60, OpType::Rts, 1, 6, Implied,  Cpu::rts),
    Instruction::new(0x40, OpType::Rti, 1, 6, Implied,  Cpu::rti),

    // Branches: +1 cycle if taken, +1 more if the target is on another page
    Instruction::new(0x90, OpType::Bcc, 2, 2, Relative, Cpu::bcc),
    Instruction::new(0xB0, OpType::Bcs, 2, 2, Relative, Cpu::bcs),
    Instruction::new(0x10, OpType::Bpl, 2, 2, Relative, Cpu::bpl),
    Instruction::new(0x30, OpType::Bmi, 2, 2, Relative, Cpu::bmi),
    Instruction::new(0xD0, OpType::Bne, 2, 2, Relative, Cpu::bne),
    Instruction::new(0xF0, OpType::Beq, 2, 2, Relative, Cpu::beq),
    Instruction::new(0x50, OpType::Bvc, 2, 2, Relative, Cpu::bvc),
    Instruction::new(0x70, OpType::Bvs, 2, 2, Relative, Cpu::bvs),
];

pub static INSTRUCTION_TABLE: Lazy<[Option<&'static Instruction>; 256]> = Lazy::new(|| {
    let mut table = [None; 256];
    for instruction in OPCODES {
        table[instruction.code as usize] = Some(instruction);
    }
    table
});

/// Instruction for `code`, or `None` for the unmapped (undocumented) opcodes
pub fn lookup(code: u8) -> Option<&'static Instruction> {
    INSTRUCTION_TABLE[code as usize]
}
