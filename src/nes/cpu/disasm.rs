use super::opcodes::{self, Instruction};
use super::{AddressingMode, CpuBusInterface};

/// One step-log line: `PPPP: b0 b1 b2   MNEMONIC operand`.
///
/// Reads go straight to the bus so watchpoints are not triggered.
pub fn disassemble(bus: &mut dyn CpuBusInterface, pc: u16) -> String {
    let code = bus.cpu_bus_read(pc);
    let instruction = opcodes::lookup(code);
    let size = instruction.map_or(1, |inst| inst.size as usize);

    let mut mem = [0u8; 3];
    let mut bins: [String; 3] = Default::default();
    for i in 0..3 {
        if i < size {
            mem[i] = bus.cpu_bus_read(pc.wrapping_add(i as u16));
            bins[i] = format!("{:02X}", mem[i]);
        } else {
            bins[i] = "  ".to_string();
        }
    }

    let asm = match instruction {
        Some(inst) => format_instruction(inst, &mem, pc),
        None => format!("??? (0x{:02X})", code),
    };
    format!("{:04X}: {}   {}", pc, bins.join(" "), asm)
}

/// Assembly text for `inst` whose encoded bytes are `mem`, located at `pc`
pub fn format_instruction(inst: &Instruction, mem: &[u8; 3], pc: u16) -> String {
    let name = inst.name();
    let byte = mem[1];
    let word = u16::from_le_bytes([mem[1], mem[2]]);
    match inst.mode {
        AddressingMode::Implied => name.to_string(),
        AddressingMode::Accumulator => format!("{} A", name),
        AddressingMode::Immediate => format!("{} #${:02X}", name, byte),
        AddressingMode::ZeroPage => format!("{} ${:02X}", name, byte),
        AddressingMode::ZeroPageX => format!("{} ${:02X},X", name, byte),
        AddressingMode::ZeroPageY => format!("{} ${:02X},Y", name, byte),
        AddressingMode::Absolute => format!("{} ${:04X}", name, word),
        AddressingMode::AbsoluteX => format!("{} ${:04X},X", name, word),
        AddressingMode::AbsoluteY => format!("{} ${:04X},Y", name, word),
        AddressingMode::Indirect => format!("{} (${:04X})", name, word),
        AddressingMode::IndirectX => format!("{} (${:02X},X)", name, byte),
        AddressingMode::IndirectY => format!("{} (${:02X}),Y", name, byte),
        AddressingMode::Relative => {
            let target = pc
                .wrapping_add(inst.size as u16)
                .wrapping_add(byte as i8 as u16);
            format!("{} ${:04X}", name, target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nes::bus::simple_bus::SimpleBus;

    #[test]
    fn immediate_load_line() {
        let mut bus = SimpleBus::new();
        bus.load(0x8000, &[0xA9, 0x00]);
        assert_eq!(disassemble(&mut bus, 0x8000), "8000: A9 00      LDA #$00");
    }

    #[test]
    fn absolute_and_indirect_forms() {
        let mut bus = SimpleBus::new();
        bus.load(0xC000, &[0x6C, 0xFF, 0x02, 0x9D, 0x34, 0x12]);
        assert_eq!(disassemble(&mut bus, 0xC000), "C000: 6C FF 02   JMP ($02FF)");
        assert_eq!(disassemble(&mut bus, 0xC003), "C003: 9D 34 12   STA $1234,X");
    }

    #[test]
    fn branch_shows_target_address() {
        let mut bus = SimpleBus::new();
        bus.load(0x8010, &[0xD0, 0xFE]);
        assert_eq!(disassemble(&mut bus, 0x8010), "8010: D0 FE      BNE $8010");
    }

    #[test]
    fn unmapped_opcode() {
        let mut bus = SimpleBus::new();
        bus.load(0x8000, &[0x02]);
        assert_eq!(disassemble(&mut bus, 0x8000), "8000: 02         ??? (0x02)");
    }
}
