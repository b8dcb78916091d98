pub mod consts;
pub mod nes_bus;
pub mod simple_bus;

#[cfg(test)]
mod nes_bus_test;
