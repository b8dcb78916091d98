// See: https://www.nesdev.org/wiki/CPU_interrupts

use std::cell::Cell;
use std::rc::Rc;

pub const VEC_NMI: u16 = 0xFFFA;
pub const VEC_RESET: u16 = 0xFFFC;
pub const VEC_IRQ: u16 = 0xFFFE;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InterruptType {
    Nmi, // Non-maskable interrupt (triggered from PPU at VBLANK)
    Irq,
    Brk, // Software-defined interrupt
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Interrupt {
    pub interrupt_type: InterruptType,
    pub vector_addr: u16,
    /// Whether the pushed copy of P carries the B flag
    pub pushes_break: bool,
}

pub const NMI: Interrupt = Interrupt {
    interrupt_type: InterruptType::Nmi,
    vector_addr: VEC_NMI,
    pushes_break: false,
};

pub const BRK: Interrupt = Interrupt {
    interrupt_type: InterruptType::Brk,
    vector_addr: VEC_IRQ, // BRK shares the IRQ vector
    pushes_break: true,
};

pub const IRQ: Interrupt = Interrupt {
    interrupt_type: InterruptType::Irq,
    vector_addr: VEC_IRQ,
    pushes_break: false,
};

/// Zero-argument callback handed to interrupt sources (APU, mappers)
pub type IrqCallback = Box<dyn FnMut()>;

/// Shared IRQ request line.
///
/// Sources raise it through callbacks produced by [`IrqLine::trigger`]; the machine
/// drains it into `Cpu::request_irq` at the next instruction boundary.
#[derive(Clone, Default)]
pub struct IrqLine {
    raised: Rc<Cell<bool>>,
}

impl IrqLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) -> IrqCallback {
        let raised = Rc::clone(&self.raised);
        Box::new(move || raised.set(true))
    }

    pub fn raise(&self) {
        self.raised.set(true);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.get()
    }

    pub fn clear(&self) {
        self.raised.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_callbacks_share_one_line() {
        let line = IrqLine::new();
        let mut apu_irq = line.trigger();
        let mut mapper_irq = line.trigger();
        assert!(!line.is_raised());

        apu_irq();
        assert!(line.is_raised());
        line.clear();
        assert!(!line.is_raised());

        mapper_irq();
        assert!(line.is_raised());
    }

    #[test]
    fn brk_is_the_only_entry_pushing_break() {
        assert!(BRK.pushes_break);
        assert!(!NMI.pushes_break);
        assert!(!IRQ.pushes_break);
        assert_eq!(BRK.vector_addr, IRQ.vector_addr);
    }
}
