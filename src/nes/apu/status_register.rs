use bitflags::bitflags;

bitflags! {
    /* See: https://www.nesdev.org/wiki/APU#Status_($4015)
        7  bit  0
        ---- ----
        IF-D NT21
        |||| ||||
        |||| |||+- Pulse Channel 1 (0: disabled, 1: enabled)
        |||| ||+-- Pulse Channel 2 (0: disabled, 1: enabled)
        |||| |+--- Triangle Channel (0: disabled, 1: enabled)
        |||| +---- Noise Channel (0: disabled, 1: enabled)
        |||+------ DMC Channel (0: disabled, 1: enabled)
        ||+------- unused
        |+-------- Frame interrupt asserted
        +--------- DMC interrupt asserted
     */
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ApuStatusRegister: u8 {
        const PULSE_CHANNEL_1 =  0b0000_0001;
        const PULSE_CHANNEL_2 =  0b0000_0010;
        const TRIANGLE_CHANNEL = 0b0000_0100;
        const NOISE_CHANNEL =    0b0000_1000;
        const DMC_CHANNEL =      0b0001_0000;
        // open bit 5            0b0010_0000;
        const FRAME_INTERRUPT =  0b0100_0000;
        const DMC_INTERRUPT =    0b1000_0000;
    }
}

impl ApuStatusRegister {
    /// Enable bit for channel index 0..5
    pub fn channel(ch: usize) -> ApuStatusRegister {
        if ch >= 5 {
            return ApuStatusRegister::empty();
        }
        ApuStatusRegister::from_bits_truncate(1 << ch)
    }

    pub fn channels() -> ApuStatusRegister {
        ApuStatusRegister::PULSE_CHANNEL_1
            | ApuStatusRegister::PULSE_CHANNEL_2
            | ApuStatusRegister::TRIANGLE_CHANNEL
            | ApuStatusRegister::NOISE_CHANNEL
            | ApuStatusRegister::DMC_CHANNEL
    }
}

bitflags! {
    /* See: https://www.nesdev.org/wiki/APU_Frame_Counter
        7  bit  0
        ---- ----
        MI-- ----
        ||
        |+-------- IRQ inhibit
        +--------- Sequencer mode (0: 4-step, 1: 5-step)
     */
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FrameCounterRegister: u8 {
        const IRQ_INHIBIT =    0b0100_0000;
        const SEQUENCER_MODE = 0b1000_0000;
    }
}

impl FrameCounterRegister {
    /// Frame IRQs fire only with both mode bits clear
    pub fn irq_enabled(&self) -> bool {
        !self.intersects(FrameCounterRegister::IRQ_INHIBIT | FrameCounterRegister::SEQUENCER_MODE)
    }
}
