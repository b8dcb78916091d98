/// Register-level view of the picture processor.
///
/// Rendering is not part of this crate. The bus forwards CPU accesses to
/// $2000-$3FFF (mirrored every 8 bytes) and OAM DMA transfers through this
/// trait, and the host plugs in its own PPU.
pub trait PpuRegisterPort {
    /// `reg` is the register index 0..=7 ($2000 + reg)
    fn read_register(&mut self, reg: u8) -> u8;

    fn write_register(&mut self, reg: u8, value: u8);

    /// 256 bytes copied from CPU page `$XX00` by a write to $4014
    fn write_oam_dma(&mut self, _data: &[u8; 256]) {}
}

/// Stand-in used when no PPU is attached: reads return the last value written
/// to any register, writes are otherwise dropped.
#[derive(Debug, Default)]
pub struct NullPpu {
    latch: u8,
}

impl NullPpu {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PpuRegisterPort for NullPpu {
    fn read_register(&mut self, _reg: u8) -> u8 {
        self.latch
    }

    fn write_register(&mut self, _reg: u8, value: u8) {
        self.latch = value;
    }
}
