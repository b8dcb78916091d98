use super::{interrupts, Cpu, CpuBusInterface, Flags, Operand};

// Every handler returns the cycles it adds on top of the table's base count.
// Only branches add any; the indexed page-cross penalty is applied by `step`.

impl Cpu {
    fn read_operand(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> Option<u8> {
        let addr = self.operand_addr(operand)?;
        Some(self.read8(bus, addr))
    }

    fn store(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand, value: u8) {
        if let Some(addr) = self.operand_addr(operand) {
            self.write8(bus, addr, value);
        }
    }

    pub(super) fn lda(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        if let Some(value) = self.read_operand(bus, operand) {
            self.set_register_a(value);
        }
        0
    }

    pub(super) fn ldx(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        if let Some(value) = self.read_operand(bus, operand) {
            self.set_register_x(value);
        }
        0
    }

    pub(super) fn ldy(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        if let Some(value) = self.read_operand(bus, operand) {
            self.set_register_y(value);
        }
        0
    }

    pub(super) fn sta(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        self.store(bus, operand, self.register_a);
        0
    }

    pub(super) fn stx(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        self.store(bus, operand, self.register_x);
        0
    }

    pub(super) fn sty(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        self.store(bus, operand, self.register_y);
        0
    }

    pub(super) fn tax(&mut self, _bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        self.set_register_x(self.register_a);
        0
    }

    pub(super) fn tay(&mut self, _bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        self.set_register_y(self.register_a);
        0
    }

    pub(super) fn tsx(&mut self, _bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        self.set_register_x(self.stack_pointer);
        0
    }

    pub(super) fn txa(&mut self, _bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        self.set_register_a(self.register_x);
        0
    }

    pub(super) fn txs(&mut self, _bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        // TXS leaves the flags alone
        self.stack_pointer = self.register_x;
        0
    }

    pub(super) fn tya(&mut self, _bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        self.set_register_a(self.register_y);
        0
    }

    pub(super) fn clc(&mut self, _bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        self.status.remove(Flags::CARRY);
        0
    }

    pub(super) fn cld(&mut self, _bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        self.status.remove(Flags::DECIMAL_MODE);
        0
    }

    pub(super) fn cli(&mut self, _bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        self.status.remove(Flags::INTERRUPT_DISABLE);
        0
    }

    pub(super) fn clv(&mut self, _bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        self.status.remove(Flags::OVERFLOW);
        0
    }

    pub(super) fn sec(&mut self, _bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        self.status.insert(Flags::CARRY);
        0
    }

    pub(super) fn sed(&mut self, _bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        // Decimal flag is stored but arithmetic stays binary
        self.status.insert(Flags::DECIMAL_MODE);
        0
    }

    pub(super) fn sei(&mut self, _bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        self.status.insert(Flags::INTERRUPT_DISABLE);
        0
    }

    pub(super) fn inx(&mut self, _bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        self.set_register_x(self.register_x.wrapping_add(1));
        0
    }

    pub(super) fn iny(&mut self, _bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        self.set_register_y(self.register_y.wrapping_add(1));
        0
    }

    pub(super) fn dex(&mut self, _bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        self.set_register_x(self.register_x.wrapping_sub(1));
        0
    }

    pub(super) fn dey(&mut self, _bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        self.set_register_y(self.register_y.wrapping_sub(1));
        0
    }

    pub(super) fn inc(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        if let Some(addr) = self.operand_addr(operand) {
            let value = self.read8(bus, addr).wrapping_add(1);
            self.write8(bus, addr, value);
            self.update_zero_and_negative_flags(value);
        }
        0
    }

    pub(super) fn dec(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        if let Some(addr) = self.operand_addr(operand) {
            let value = self.read8(bus, addr).wrapping_sub(1);
            self.write8(bus, addr, value);
            self.update_zero_and_negative_flags(value);
        }
        0
    }

    pub(super) fn pha(&mut self, bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        self.stack_push(bus, self.register_a);
        0
    }

    pub(super) fn pla(&mut self, bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        let value = self.stack_pop(bus);
        self.set_register_a(value);
        0
    }

    pub(super) fn php(&mut self, bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        // B is set in the pushed copy only
        let pushed = self.status | Flags::BREAK;
        self.stack_push(bus, pushed.bits());
        0
    }

    pub(super) fn plp(&mut self, bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        let value = self.stack_pop(bus);
        self.status = Flags::from_bits_retain(value) | Flags::RESERVED;
        0
    }

    fn add_to_register_a(&mut self, value: u8) {
        let carry_in = self.status.contains(Flags::CARRY) as u16;
        let sum = self.register_a as u16 + value as u16 + carry_in;
        let result = sum as u8;

        let overflow = (self.register_a ^ result) & (value ^ result) & 0x80 != 0;
        self.status.set(Flags::CARRY, sum > 0xFF);
        self.status.set(Flags::OVERFLOW, overflow);
        self.set_register_a(result);
    }

    pub(super) fn adc(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        if let Some(value) = self.read_operand(bus, operand) {
            self.add_to_register_a(value);
        }
        0
    }

    pub(super) fn sbc(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        // A - M - (1 - C) == A + !M + C
        if let Some(value) = self.read_operand(bus, operand) {
            self.add_to_register_a(!value);
        }
        0
    }

    pub(super) fn and(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        if let Some(value) = self.read_operand(bus, operand) {
            self.set_register_a(self.register_a & value);
        }
        0
    }

    pub(super) fn ora(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        if let Some(value) = self.read_operand(bus, operand) {
            self.set_register_a(self.register_a | value);
        }
        0
    }

    pub(super) fn eor(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        if let Some(value) = self.read_operand(bus, operand) {
            self.set_register_a(self.register_a ^ value);
        }
        0
    }

    pub(super) fn bit(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        if let Some(value) = self.read_operand(bus, operand) {
            self.status.set(Flags::ZERO, self.register_a & value == 0);
            self.status.set(Flags::NEGATIVE, value & 0x80 != 0);
            self.status.set(Flags::OVERFLOW, value & 0x40 != 0);
        }
        0
    }

    fn compare(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand, register: u8) {
        if let Some(value) = self.read_operand(bus, operand) {
            self.update_nzc_flags(register.wrapping_sub(value), register >= value);
        }
    }

    pub(super) fn cmp(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        self.compare(bus, operand, self.register_a);
        0
    }

    pub(super) fn cpx(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        self.compare(bus, operand, self.register_x);
        0
    }

    pub(super) fn cpy(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        self.compare(bus, operand, self.register_y);
        0
    }

    /// Applies `shift` to A (accumulator mode) or read-modify-writes memory.
    /// `shift` maps (value, carry_in) to (result, carry_out).
    fn shift_operand(
        &mut self,
        bus: &mut dyn CpuBusInterface,
        operand: Operand,
        shift: fn(u8, bool) -> (u8, bool),
    ) {
        let carry_in = self.status.contains(Flags::CARRY);
        match operand.addr {
            None => {
                let (result, carry) = shift(self.register_a, carry_in);
                self.register_a = result;
                self.update_nzc_flags(result, carry);
            }
            Some(addr) => {
                let value = self.read8(bus, addr);
                let (result, carry) = shift(value, carry_in);
                self.write8(bus, addr, result);
                self.update_nzc_flags(result, carry);
            }
        }
    }

    pub(super) fn asl(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        self.shift_operand(bus, operand, |value, _| (value << 1, value & 0x80 != 0));
        0
    }

    pub(super) fn lsr(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        self.shift_operand(bus, operand, |value, _| (value >> 1, value & 0x01 != 0));
        0
    }

    pub(super) fn rol(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        self.shift_operand(bus, operand, Self::rotate_value_left);
        0
    }

    pub(super) fn ror(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        self.shift_operand(bus, operand, Self::rotate_value_right);
        0
    }

    pub(super) fn rotate_value_left(value: u8, carry_in: bool) -> (u8, bool) {
        let carry_out = value & 0x80 != 0;
        ((value << 1) | carry_in as u8, carry_out)
    }

    pub(super) fn rotate_value_right(value: u8, carry_in: bool) -> (u8, bool) {
        let carry_out = value & 0x01 != 0;
        ((value >> 1) | ((carry_in as u8) << 7), carry_out)
    }

    pub(super) fn jmp(&mut self, _bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        if let Some(addr) = self.operand_addr(operand) {
            self.program_counter = addr;
        }
        0
    }

    pub(super) fn jsr(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        if let Some(addr) = self.operand_addr(operand) {
            // Return address is pushed minus one; RTS adds it back
            let ret = self.program_counter.wrapping_sub(1);
            self.stack_push_u16(bus, ret);
            self.program_counter = addr;
        }
        0
    }

    pub(super) fn rts(&mut self, bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        self.program_counter = self.stack_pop_u16(bus).wrapping_add(1);
        0
    }

    pub(super) fn rti(&mut self, bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        let value = self.stack_pop(bus);
        self.status = Flags::from_bits_retain(value) | Flags::RESERVED;
        self.program_counter = self.stack_pop_u16(bus);
        0
    }

    pub(super) fn brk(&mut self, bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        // Skips the padding byte after the opcode
        let ret = self.program_counter.wrapping_add(1);
        self.enter_interrupt(bus, interrupts::BRK, ret);
        0
    }

    pub(super) fn nop(&mut self, _bus: &mut dyn CpuBusInterface, _operand: Operand) -> u8 {
        0
    }

    fn branch(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand, condition: bool) -> u8 {
        if !condition {
            return 0;
        }
        let Some(addr) = self.operand_addr(operand) else {
            return 0;
        };
        let offset = self.read8(bus, addr) as i8;
        let pc = self.program_counter;
        let target = pc.wrapping_add(offset as u16);
        self.program_counter = target;

        // +1 for a taken branch, +1 more when it lands on another page
        if (pc ^ target) & 0xFF00 != 0 { 2 } else { 1 }
    }

    pub(super) fn bcc(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        let condition = !self.status.contains(Flags::CARRY);
        self.branch(bus, operand, condition)
    }

    pub(super) fn bcs(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        let condition = self.status.contains(Flags::CARRY);
        self.branch(bus, operand, condition)
    }

    pub(super) fn bne(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        let condition = !self.status.contains(Flags::ZERO);
        self.branch(bus, operand, condition)
    }

    pub(super) fn beq(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        let condition = self.status.contains(Flags::ZERO);
        self.branch(bus, operand, condition)
    }

    pub(super) fn bpl(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        let condition = !self.status.contains(Flags::NEGATIVE);
        self.branch(bus, operand, condition)
    }

    pub(super) fn bmi(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        let condition = self.status.contains(Flags::NEGATIVE);
        self.branch(bus, operand, condition)
    }

    pub(super) fn bvc(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        let condition = !self.status.contains(Flags::OVERFLOW);
        self.branch(bus, operand, condition)
    }

    pub(super) fn bvs(&mut self, bus: &mut dyn CpuBusInterface, operand: Operand) -> u8 {
        let condition = self.status.contains(Flags::OVERFLOW);
        self.branch(bus, operand, condition)
    }
}
