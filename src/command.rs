//! HT16K33 command bytes.
//!
//! The chip is configured with single-byte commands whose upper nibble selects
//! the register and whose lower nibble carries the setting. Display RAM and
//! key RAM are accessed through a register pointer byte followed by data.

use bitfield::bitfield;

/// Register pointer for the first byte of display RAM.
pub(crate) const DISPLAY_RAM: u8 = 0x00;
/// Register pointer for the first byte of key RAM.
pub(crate) const KEY_RAM: u8 = 0x40;

bitfield! {
    /// System setup register.
    ///
    /// The bit layout is as follows:
    /// - Bits 7-4: Command (0b0010)
    /// - Bit 0: Internal oscillator enable
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub(crate) struct SystemSetup(u8);
    impl Debug;
    pub command, set_command: 7, 4;
    pub oscillator, set_oscillator: 0;
}

impl SystemSetup {
    pub fn new(oscillator: bool) -> Self {
        let mut setup = Self(0);
        setup.set_command(0b0010);
        setup.set_oscillator(oscillator);
        setup
    }
}

bitfield! {
    /// Display setup register.
    ///
    /// The bit layout is as follows:
    /// - Bits 7-4: Command (0b1000)
    /// - Bits 2-1: Blink rate
    /// - Bit 0: Display on
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub(crate) struct DisplaySetup(u8);
    impl Debug;
    pub command, set_command: 7, 4;
    pub blink, set_blink: 2, 1;
    pub display_on, set_display_on: 0;
}

impl DisplaySetup {
    pub fn new(rate: BlinkRate) -> Self {
        let mut setup = Self(0);
        setup.set_command(0b1000);
        setup.set_blink(rate as u8);
        setup.set_display_on(true);
        setup
    }
}

bitfield! {
    /// ROW/INT set register.
    ///
    /// The bit layout is as follows:
    /// - Bits 7-4: Command (0b1010)
    /// - Bit 1: INT pin polarity, 0 is active low
    /// - Bit 0: Pin function, 1 is interrupt output
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub(crate) struct RowIntSet(u8);
    impl Debug;
    pub command, set_command: 7, 4;
    pub active_high, set_active_high: 1;
    pub interrupt, set_interrupt: 0;
}

impl RowIntSet {
    pub fn interrupt_active_low() -> Self {
        let mut set = Self(0);
        set.set_command(0b1010);
        set.set_active_high(false);
        set.set_interrupt(true);
        set
    }
}

bitfield! {
    /// Dimming set register.
    ///
    /// The bit layout is as follows:
    /// - Bits 7-4: Command (0b1110)
    /// - Bits 3-0: Duty cycle, 1/16 to 16/16
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub(crate) struct Dimming(u8);
    impl Debug;
    pub command, set_command: 7, 4;
    pub level, set_level: 3, 0;
}

impl Dimming {
    /// Levels above [`crate::MAX_BRIGHTNESS`] are clamped.
    pub fn new(level: u8) -> Self {
        let mut dimming = Self(0);
        dimming.set_command(0b1110);
        dimming.set_level(level.min(crate::MAX_BRIGHTNESS));
        dimming
    }
}

/// Hardware blink rate of the whole display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BlinkRate {
    /// No blinking
    #[default]
    Off = 0,
    /// Blink at 2 Hz
    TwoHz = 1,
    /// Blink at 1 Hz
    OneHz = 2,
    /// Blink at 0.5 Hz
    HalfHz = 3,
}

impl BlinkRate {
    /// Decode a raw 2-bit rate. Anything outside `0..=3` turns blinking off.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Self::TwoHz,
            2 => Self::OneHz,
            3 => Self::HalfHz,
            _ => Self::Off,
        }
    }
}
