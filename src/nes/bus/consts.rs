pub const CPU_RAM_SIZE: usize = 2048;
pub const CPU_RAM_START: u16 = 0x0000;
pub const CPU_RAM_END: u16 = 0x1FFF;
pub const CPU_RAM_MASK: u16 = 0x07FF;

pub const PPU_REGISTERS_START: u16 = 0x2000;
pub const PPU_REGISTERS_END: u16 = 0x3FFF;
pub const PPU_REGISTER_MASK: u16 = 0x0007;

pub const APU_START: u16 = 0x4000;
pub const APU_END: u16 = 0x401F;
pub const OAM_DMA: u16 = 0x4014;
/// CPU cycles the CPU is stalled while OAM DMA copies a page
pub const OAM_DMA_CYCLES: u32 = 513;

pub const CART_START: u16 = 0x4020;
pub const CART_END: u16 = 0xFFFF;
