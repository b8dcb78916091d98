pub mod gamepad;

pub use gamepad::{GamePad, PadButtons};

pub const PAD_COUNT: usize = 2;
