use crate::nes::cpu::CpuBusInterface;

/// Flat 64 KiB RAM with no mirroring or devices. Used to exercise the CPU alone.
pub struct SimpleBus {
    pub cpu_ram: Box<[u8; 0x10000]>,
    pub reads: usize,
    pub writes: usize,
}

impl SimpleBus {
    pub fn new() -> SimpleBus {
        SimpleBus {
            cpu_ram: Box::new([0; 0x10000]),
            reads: 0,
            writes: 0,
        }
    }

    /// Places `program` at `start` and points the reset vector at it
    pub fn with_program(start: u16, program: &[u8]) -> SimpleBus {
        let mut bus = SimpleBus::new();
        bus.load(start, program);
        bus.load(0xFFFC, &start.to_le_bytes());
        bus
    }

    pub fn load(&mut self, start: u16, bytes: &[u8]) {
        for (i, byte) in bytes.iter().enumerate() {
            let addr = start.wrapping_add(i as u16);
            self.cpu_ram[addr as usize] = *byte;
        }
    }

    pub fn peek(&self, addr: u16) -> u8 {
        self.cpu_ram[addr as usize]
    }
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuBusInterface for SimpleBus {
    fn cpu_bus_read(&mut self, addr: u16) -> u8 {
        self.reads += 1;
        self.cpu_ram[addr as usize]
    }

    fn cpu_bus_write(&mut self, addr: u16, value: u8) {
        self.writes += 1;
        self.cpu_ram[addr as usize] = value;
    }
}
