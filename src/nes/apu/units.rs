pub mod envelope;
pub mod length_counter;
pub mod sweep;

pub use envelope::Envelope;
pub use length_counter::LengthCounter;
pub use sweep::Sweep;
