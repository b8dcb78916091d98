use log::{debug, error, info, warn};

use super::interrupts::{self, Interrupt, VEC_RESET};
use super::step_log::StepLog;
use super::{
    disasm, opcodes, AddressingMode, Breakpoints, Cpu, CpuBusInterface, CpuError, DebugEvent,
    Flags, Operand, Watchpoints, CPU_STACK_BASE, MAX_STEP_LOG, NZ_TABLE,
};

impl Cpu {
    pub fn new(debug_enabled: bool) -> Cpu {
        Cpu {
            register_a: 0,
            register_x: 0,
            register_y: 0,
            stack_pointer: 0,
            status: Flags::RESERVED,
            program_counter: 0,
            paused: false,
            error: None,
            breakpoints: Breakpoints::default(),
            watchpoints: Watchpoints::default(),
            debug_enabled,
            step_log: StepLog::new(MAX_STEP_LOG),
            instruction_pc: 0,
            current_op: None,
        }
    }

    /// Power-on / reset sequence. Registers A, X and Y keep their values.
    pub fn reset(&mut self, bus: &mut dyn CpuBusInterface) {
        self.status = Flags::INTERRUPT_DISABLE | Flags::BREAK | Flags::RESERVED;
        self.stack_pointer = self.stack_pointer.wrapping_sub(3);
        self.program_counter = self.read16(bus, VEC_RESET);
        self.step_log.clear();
        self.error = None;
        self.current_op = None;
    }

    /// Executes one instruction and returns the cycles it consumed.
    ///
    /// An unmapped opcode pauses the CPU and consumes 0 cycles; the program counter
    /// is left just past the offending byte.
    pub fn step(&mut self, bus: &mut dyn CpuBusInterface) -> u8 {
        if self.debug_enabled {
            let line = disasm::disassemble(bus, self.program_counter);
            self.step_log.write(line);
        }

        self.instruction_pc = self.program_counter;
        let code = self.read8(bus, self.program_counter);
        self.program_counter = self.program_counter.wrapping_add(1);

        let Some(instruction) = opcodes::lookup(code) else {
            let err = CpuError::UnknownOpcode {
                code,
                pc: self.instruction_pc,
            };
            error!("{}", err);
            self.error = Some(err);
            self.paused = true;
            return 0;
        };
        self.current_op = Some(instruction);

        let operand_pc = self.program_counter;
        self.program_counter = self
            .instruction_pc
            .wrapping_add(instruction.size as u16);
        let operand = self.resolve_operand(bus, operand_pc, instruction.mode);

        let mut cycles = instruction.cycles;
        cycles += (instruction.exec)(self, bus, operand);
        if instruction.page_penalty && operand.page_crossed {
            cycles += 1;
        }

        if self.breakpoints.is_enabled(self.program_counter) {
            self.paused = true;
            info!("Stop at breakpoint: ${:04X}", self.program_counter);
        }

        cycles
    }

    /// Non-maskable interrupt, raised by the video chip at vertical blank
    pub fn nmi(&mut self, bus: &mut dyn CpuBusInterface) {
        let pc = self.program_counter;
        if self.debug_enabled {
            self.step_log.write(format!("NMI occurred at pc={:04X}", pc));
        }
        self.enter_interrupt(bus, interrupts::NMI, pc);

        if self.breakpoints.is_event_enabled(DebugEvent::Nmi) {
            self.paused = true;
            warn!("paused because NMI: {:04X}, {:04X}", pc, self.program_counter);
        }
    }

    /// Maskable interrupt. Returns false and changes nothing while I is set.
    pub fn request_irq(&mut self, bus: &mut dyn CpuBusInterface) -> bool {
        if self.status.contains(Flags::INTERRUPT_DISABLE) {
            return false;
        }
        let pc = self.program_counter;
        if self.debug_enabled {
            self.step_log.write(format!("IRQ occurred at pc={:04X}", pc));
        }
        self.enter_interrupt(bus, interrupts::IRQ, pc);
        true
    }

    pub(super) fn enter_interrupt(
        &mut self,
        bus: &mut dyn CpuBusInterface,
        interrupt: Interrupt,
        return_addr: u16,
    ) {
        debug!(
            "{:?} entered from ${:04X}",
            interrupt.interrupt_type, return_addr
        );
        self.stack_push_u16(bus, return_addr);
        let mut pushed = self.status;
        pushed.set(Flags::BREAK, interrupt.pushes_break);
        self.stack_push(bus, pushed.bits());
        self.program_counter = self.read16(bus, interrupt.vector_addr);
        self.status.insert(Flags::INTERRUPT_DISABLE);
    }

    pub fn read8(&mut self, bus: &mut dyn CpuBusInterface, addr: u16) -> u8 {
        let value = bus.cpu_bus_read(addr);
        if self.watchpoints.watches_read(addr) {
            self.paused = true;
            info!(
                "Break because watched point read: adr=${:04X}, value=${:02X}",
                addr, value
            );
        }
        value
    }

    pub fn read16(&mut self, bus: &mut dyn CpuBusInterface, addr: u16) -> u16 {
        let lo = self.read8(bus, addr) as u16;
        let hi = self.read8(bus, addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// 16-bit read whose high byte never leaves the page of `addr` (the JMP ($xxFF) quirk)
    pub fn read16_indirect(&mut self, bus: &mut dyn CpuBusInterface, addr: u16) -> u16 {
        let lo = self.read8(bus, addr) as u16;
        let hi_addr = (addr & 0xFF00) | (addr.wrapping_add(1) & 0x00FF);
        let hi = self.read8(bus, hi_addr) as u16;
        (hi << 8) | lo
    }

    pub fn write8(&mut self, bus: &mut dyn CpuBusInterface, addr: u16, value: u8) {
        bus.cpu_bus_write(addr, value);
        if self.watchpoints.watches_write(addr) {
            self.paused = true;
            info!(
                "Break because watched point write: adr=${:04X}, value=${:02X}",
                addr, value
            );
        }
    }

    pub(super) fn stack_push(&mut self, bus: &mut dyn CpuBusInterface, value: u8) {
        let addr = CPU_STACK_BASE + self.stack_pointer as u16;
        self.write8(bus, addr, value);
        self.stack_pointer = self.stack_pointer.wrapping_sub(1);
    }

    pub(super) fn stack_push_u16(&mut self, bus: &mut dyn CpuBusInterface, value: u16) {
        self.stack_push(bus, (value >> 8) as u8);
        self.stack_push(bus, (value & 0xFF) as u8);
    }

    pub(super) fn stack_pop(&mut self, bus: &mut dyn CpuBusInterface) -> u8 {
        self.stack_pointer = self.stack_pointer.wrapping_add(1);
        let addr = CPU_STACK_BASE + self.stack_pointer as u16;
        self.read8(bus, addr)
    }

    pub(super) fn stack_pop_u16(&mut self, bus: &mut dyn CpuBusInterface) -> u16 {
        let lo = self.stack_pop(bus) as u16;
        let hi = self.stack_pop(bus) as u16;
        (hi << 8) | lo
    }

    /// Effective address of the operand bytes starting at `operand_pc`
    pub(super) fn resolve_operand(
        &mut self,
        bus: &mut dyn CpuBusInterface,
        operand_pc: u16,
        mode: AddressingMode,
    ) -> Operand {
        match mode {
            AddressingMode::Implied | AddressingMode::Accumulator => Operand::NONE,
            AddressingMode::Immediate | AddressingMode::Relative => Operand::at(operand_pc),
            AddressingMode::ZeroPage => {
                let zp = self.read8(bus, operand_pc);
                Operand::at(zp as u16)
            }
            AddressingMode::ZeroPageX => {
                let zp = self.read8(bus, operand_pc);
                Operand::at(zp.wrapping_add(self.register_x) as u16)
            }
            AddressingMode::ZeroPageY => {
                let zp = self.read8(bus, operand_pc);
                Operand::at(zp.wrapping_add(self.register_y) as u16)
            }
            AddressingMode::Absolute => Operand::at(self.read16(bus, operand_pc)),
            AddressingMode::AbsoluteX => {
                let base = self.read16(bus, operand_pc);
                Self::indexed(base, self.register_x)
            }
            AddressingMode::AbsoluteY => {
                let base = self.read16(bus, operand_pc);
                Self::indexed(base, self.register_y)
            }
            AddressingMode::Indirect => {
                let ptr = self.read16(bus, operand_pc);
                Operand::at(self.read16_indirect(bus, ptr))
            }
            AddressingMode::IndirectX => {
                let zp = self.read8(bus, operand_pc).wrapping_add(self.register_x);
                Operand::at(self.read16_indirect(bus, zp as u16))
            }
            AddressingMode::IndirectY => {
                let zp = self.read8(bus, operand_pc);
                let base = self.read16_indirect(bus, zp as u16);
                Self::indexed(base, self.register_y)
            }
        }
    }

    fn indexed(base: u16, index: u8) -> Operand {
        let addr = base.wrapping_add(index as u16);
        Operand {
            addr: Some(addr),
            page_crossed: (base ^ addr) & 0xFF00 != 0,
        }
    }

    /// Address carried by `operand`. Memory instructions decoded without one are
    /// reported and pause the CPU.
    pub(super) fn operand_addr(&mut self, operand: Operand) -> Option<u16> {
        if operand.addr.is_none() {
            let name = self.current_op.map(|op| op.name()).unwrap_or("???");
            let err = CpuError::IllegalAddressing {
                name,
                pc: self.instruction_pc,
            };
            error!("{}", err);
            self.error = Some(err);
            self.paused = true;
        }
        operand.addr
    }

    pub(super) fn update_zero_and_negative_flags(&mut self, value: u8) {
        self.status.remove(Flags::ZERO | Flags::NEGATIVE);
        self.status
            .insert(Flags::from_bits_retain(NZ_TABLE[value as usize]));
    }

    pub(super) fn update_nzc_flags(&mut self, value: u8, carry: bool) {
        self.update_zero_and_negative_flags(value);
        self.status.set(Flags::CARRY, carry);
    }

    pub(super) fn set_register_a(&mut self, value: u8) {
        self.register_a = value;
        self.update_zero_and_negative_flags(value);
    }

    pub(super) fn set_register_x(&mut self, value: u8) {
        self.register_x = value;
        self.update_zero_and_negative_flags(value);
    }

    pub(super) fn set_register_y(&mut self, value: u8) {
        self.register_y = value;
        self.update_zero_and_negative_flags(value);
    }

    pub fn pause(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_breakpoint(&mut self, addr: u16, enabled: bool) {
        self.breakpoints.set(addr, enabled);
    }

    pub fn set_event_breakpoint(&mut self, event: DebugEvent, enabled: bool) {
        self.breakpoints.set_event(event, enabled);
    }

    pub fn set_read_watch(&mut self, addr: u16, enabled: bool) {
        self.watchpoints.set_read(addr, enabled);
    }

    pub fn set_write_watch(&mut self, addr: u16, enabled: bool) {
        self.watchpoints.set_write(addr, enabled);
    }

    /// Clears breakpoints and both watch tables
    pub fn delete_all_breakpoints(&mut self) {
        self.breakpoints.clear();
        self.watchpoints.clear();
    }

    /// Disassembly of the most recent steps, oldest first. Empty unless debug is enabled.
    pub fn recent_steps(&self, count: usize) -> Vec<String> {
        self.step_log.recent(count)
    }

    /// Hex dump of `count` bytes from `start`, sixteen per line
    pub fn dump(&self, bus: &mut dyn CpuBusInterface, start: u16, count: usize) -> Vec<String> {
        let mut lines = Vec::with_capacity(count.div_ceil(16));
        let mut offset = 0usize;
        while offset < count {
            let line_start = start.wrapping_add(offset as u16);
            let mut line = format!("{:04X}:", line_start);
            for i in 0..16usize.min(count - offset) {
                let byte = bus.cpu_bus_read(line_start.wrapping_add(i as u16));
                line.push_str(&format!(" {:02X}", byte));
            }
            lines.push(line);
            offset += 16;
        }
        lines
    }
}
