#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::nes::apu::Apu;
    use crate::nes::bus::consts::OAM_DMA_CYCLES;
    use crate::nes::bus::nes_bus::NesBus;
    use crate::nes::cartridge::{Cartridge, Mirroring};
    use crate::nes::controller::PadButtons;
    use crate::nes::cpu::interrupts::IrqLine;
    use crate::nes::cpu::CpuBusInterface;
    use crate::nes::ppu::{NullPpu, PpuRegisterPort};

    #[derive(Default)]
    struct PpuLog {
        writes: Vec<(u8, u8)>,
        reads: Vec<u8>,
        oam: Option<Vec<u8>>,
    }

    /// Records every register access so tests can check the forwarding
    struct RecordingPpu(Rc<RefCell<PpuLog>>);

    impl PpuRegisterPort for RecordingPpu {
        fn read_register(&mut self, reg: u8) -> u8 {
            self.0.borrow_mut().reads.push(reg);
            0x20 + reg
        }

        fn write_register(&mut self, reg: u8, value: u8) {
            self.0.borrow_mut().writes.push((reg, value));
        }

        fn write_oam_dma(&mut self, data: &[u8; 256]) {
            self.0.borrow_mut().oam = Some(data.to_vec());
        }
    }

    fn new_bus() -> NesBus {
        NesBus::new(Apu::new(IrqLine::new().trigger()), Box::new(NullPpu::new()))
    }

    fn recording_bus() -> (NesBus, Rc<RefCell<PpuLog>>) {
        let log = Rc::new(RefCell::new(PpuLog::default()));
        let bus = NesBus::new(
            Apu::new(IrqLine::new().trigger()),
            Box::new(RecordingPpu(Rc::clone(&log))),
        );
        (bus, log)
    }

    fn prg_with_reset_vector(size: usize) -> Vec<u8> {
        let mut prg = vec![0xEA; size];
        let last = size - 4;
        prg[last] = 0x00;
        prg[last + 1] = 0x80;
        prg
    }

    #[test]
    fn test_ram_is_mirrored_every_2k() {
        let mut bus = new_bus();
        bus.cpu_bus_write(0x0001, 0x42);
        for base in [0x0000u16, 0x0800, 0x1000, 0x1800] {
            assert_eq!(bus.cpu_bus_read(base + 1), 0x42);
        }
        bus.cpu_bus_write(0x1FFF, 0x99);
        assert_eq!(bus.cpu_bus_read(0x07FF), 0x99);
        assert_eq!(bus.ram()[0x07FF], 0x99);
    }

    #[test]
    fn test_ppu_registers_are_mirrored_every_8_bytes() {
        let (mut bus, log) = recording_bus();
        bus.cpu_bus_write(0x2000, 0x80);
        bus.cpu_bus_write(0x3FFE, 0x11);
        assert_eq!(bus.cpu_bus_read(0x2002), 0x22);
        assert_eq!(bus.cpu_bus_read(0x200A), 0x22);
        assert_eq!(bus.cpu_bus_read(0x3FFF), 0x27);

        let log = log.borrow();
        assert_eq!(log.writes, vec![(0, 0x80), (6, 0x11)]);
        assert_eq!(log.reads, vec![2, 2, 7]);
    }

    #[test]
    fn test_oam_dma_copies_page_and_stalls_cpu() {
        let (mut bus, log) = recording_bus();
        for i in 0..=0xFFu16 {
            bus.cpu_bus_write(0x0200 + i, i as u8);
        }
        bus.cpu_bus_write(0x4014, 0x02);

        let oam = log.borrow().oam.clone().unwrap();
        assert_eq!(oam.len(), 256);
        assert_eq!(oam[0], 0x00);
        assert_eq!(oam[0x80], 0x80);
        assert_eq!(oam[0xFF], 0xFF);

        assert_eq!(bus.take_dma_stall(), OAM_DMA_CYCLES);
        assert_eq!(bus.take_dma_stall(), 0);
    }

    #[test]
    fn test_apu_window_is_routed() {
        let mut bus = new_bus();
        bus.cpu_bus_write(0x4015, 0x01);
        bus.cpu_bus_write(0x4003, 0x08);
        assert_eq!(bus.apu().register(0x4003), Some(0x08));
        assert_eq!(bus.cpu_bus_read(0x4015) & 0x01, 0x01);
        // Unused APU addresses read as zero
        assert_eq!(bus.cpu_bus_read(0x4018), 0);
    }

    #[test]
    fn test_pad_is_read_through_4016() {
        let mut bus = new_bus();
        bus.apu_mut()
            .set_pad_status(0, PadButtons::BUTTON_A | PadButtons::START);
        bus.cpu_bus_write(0x4016, 1);
        bus.cpu_bus_write(0x4016, 0);

        let bits: Vec<u8> = (0..8).map(|_| bus.cpu_bus_read(0x4016) & 1).collect();
        assert_eq!(bits, vec![1, 0, 0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_cartridge_space_without_cartridge() {
        let mut bus = new_bus();
        assert_eq!(bus.cpu_bus_read(0x8000), 0);
        bus.cpu_bus_write(0x8000, 1);
        assert_eq!(bus.chr_read(0x0000), 0);
        assert_eq!(bus.mirroring(), Mirroring::Horizontal);
    }

    #[test]
    fn test_prg_rom_and_ram_through_bus() {
        let mut bus = new_bus();
        let cart = Cartridge::new(prg_with_reset_vector(0x4000), vec![], 0, Mirroring::Vertical)
            .unwrap();
        bus.insert_cartridge(cart);

        assert_eq!(bus.cpu_bus_read(0xFFFC), 0x00);
        assert_eq!(bus.cpu_bus_read(0xFFFD), 0x80);
        assert_eq!(bus.cpu_bus_read(0x8000), 0xEA);

        bus.cpu_bus_write(0x6000, 0x5A);
        assert_eq!(bus.cpu_bus_read(0x6000), 0x5A);

        bus.chr_write(0x0100, 0x33);
        assert_eq!(bus.chr_read(0x0100), 0x33);
        assert_eq!(bus.mirroring(), Mirroring::Vertical);
    }

    #[test]
    fn test_mapper_claims_take_priority_over_prg_ram() {
        let mut bus = new_bus();
        let chr: Vec<u8> = (0..4u8).flat_map(|b| vec![b; 0x2000]).collect();
        let cart = Cartridge::new(prg_with_reset_vector(0x8000), chr, 87, Mirroring::Vertical)
            .unwrap();
        bus.insert_cartridge(cart);

        bus.cpu_bus_write(0x6000, 0x01);
        // Write went to the board, not PRG-RAM
        assert_eq!(bus.cpu_bus_read(0x6000), 0x00);
        assert_eq!(bus.chr_read(0x0000), 2);
    }

    #[test]
    fn test_bank_switch_changes_code_fetch() {
        let mut bus = new_bus();
        let prg: Vec<u8> = (0..4u8).flat_map(|b| vec![b; 0x4000]).collect();
        let cart = Cartridge::new(prg, vec![], 2, Mirroring::Vertical).unwrap();
        bus.insert_cartridge(cart);

        assert_eq!(bus.cpu_bus_read(0x8000), 0);
        bus.cpu_bus_write(0x8000, 2);
        assert_eq!(bus.cpu_bus_read(0x8000), 2);
        assert_eq!(bus.cpu_bus_read(0xC000), 3);
    }

    #[test]
    fn test_reset_clears_ram_and_restores_banks() {
        let mut bus = new_bus();
        let prg: Vec<u8> = (0..4u8).flat_map(|b| vec![b; 0x4000]).collect();
        bus.insert_cartridge(Cartridge::new(prg, vec![], 2, Mirroring::Vertical).unwrap());
        bus.cpu_bus_write(0x0010, 0xFF);
        bus.cpu_bus_write(0x8000, 1);
        bus.reset();
        assert_eq!(bus.cpu_bus_read(0x0010), 0);
        assert_eq!(bus.cpu_bus_read(0x8000), 0);
    }

    #[test]
    fn test_load_ram_checks_size() {
        let mut bus = new_bus();
        assert!(bus.load_ram(&[0; 16]).is_err());
        let mut image = vec![0u8; 0x800];
        image[5] = 7;
        bus.load_ram(&image).unwrap();
        assert_eq!(bus.cpu_bus_read(0x0805), 7);
    }
}
