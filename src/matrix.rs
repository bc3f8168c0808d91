//! Driver for a single HT16K33 wired as a 4x4 LED and button tile.
//!
//! The chip keeps 16 bytes of display RAM (one 16-bit word per common line)
//! and 6 bytes of key RAM (one 13-bit word per key scan line, packed into
//! bytes). The Trellis wiring does not follow the RAM bit order, so both LEDs
//! and keys are translated through fixed lookup tables.
//!
//! # LEDs
//! LED changes only touch the in-memory display buffer. Call
//! [`Matrix::flush`] to push the buffer to the chip.
//!
//! # Keys
//! Every [`Matrix::scan`] moves the current key snapshot into the previous
//! one before reading fresh key RAM, so [`Matrix::just_pressed`] and
//! [`Matrix::just_released`] report edges between the last two scans.
//!
//! # Example
//! ```rust,no_run
//! use trellis_grid::Matrix;
//! # fn demo<I2C: embedded_hal::i2c::I2c>(i2c: I2C) -> Result<(), trellis_grid::Error<I2C::Error>> {
//! let mut matrix = Matrix::new(i2c, 0x70);
//! matrix.initialize(15)?;
//!
//! loop {
//!     if matrix.scan()? {
//!         for key in 0..16 {
//!             if matrix.just_pressed(key) {
//!                 if matrix.is_led_on(key) {
//!                     matrix.clear_led(key);
//!                 } else {
//!                     matrix.set_led(key);
//!                 }
//!             }
//!         }
//!         matrix.flush()?;
//!     }
//! }
//! # }
//! ```

use bitfield::bitfield;
use embedded_hal::i2c::I2c;

use crate::command::{self, BlinkRate, Dimming, DisplaySetup, RowIntSet, SystemSetup};
use crate::Error;

/// Number of LEDs on one tile
pub const LED_COUNT: u8 = 16;
/// Number of keys on one tile
pub const KEY_COUNT: u8 = 16;

/// Words of display RAM, one per common line
const DISPLAY_WORDS: usize = 8;
/// Bytes of key RAM
const KEY_BYTES: usize = 6;

bitfield! {
    /// Location of one LED or key in chip RAM.
    ///
    /// The bit layout is as follows:
    /// - Bits 7-4: Word index (display word or key byte)
    /// - Bits 3-0: Bit offset within that word
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[repr(transparent)]
    struct BitPosition(u8);
    impl Debug;
    word, _: 7, 4;
    offset, _: 3, 0;
}

impl BitPosition {
    #[inline]
    fn word_index(self) -> usize {
        usize::from(self.word())
    }
}

/// LED number to display RAM position
const LED_LUT: [BitPosition; LED_COUNT as usize] = [
    BitPosition(0x3A),
    BitPosition(0x37),
    BitPosition(0x35),
    BitPosition(0x34),
    BitPosition(0x28),
    BitPosition(0x29),
    BitPosition(0x23),
    BitPosition(0x24),
    BitPosition(0x16),
    BitPosition(0x1B),
    BitPosition(0x11),
    BitPosition(0x10),
    BitPosition(0x0E),
    BitPosition(0x0D),
    BitPosition(0x0C),
    BitPosition(0x02),
];

/// Key number to key RAM position
const KEY_LUT: [BitPosition; KEY_COUNT as usize] = [
    BitPosition(0x07),
    BitPosition(0x04),
    BitPosition(0x02),
    BitPosition(0x22),
    BitPosition(0x05),
    BitPosition(0x06),
    BitPosition(0x00),
    BitPosition(0x01),
    BitPosition(0x03),
    BitPosition(0x10),
    BitPosition(0x30),
    BitPosition(0x21),
    BitPosition(0x13),
    BitPosition(0x12),
    BitPosition(0x11),
    BitPosition(0x31),
];

#[inline]
fn led_position(led: u8) -> Option<BitPosition> {
    LED_LUT.get(usize::from(led)).copied()
}

#[inline]
fn key_position(key: u8) -> Option<BitPosition> {
    KEY_LUT.get(usize::from(key)).copied()
}

fn key_bit(keys: &[u8; KEY_BYTES], key: u8) -> bool {
    key_position(key).is_some_and(|pos| keys[pos.word_index()] & (1 << pos.offset()) != 0)
}

/// One HT16K33 LED/key tile.
///
/// All LED and key numbers are `0..16`. Numbers outside that range are
/// ignored by setters and read as `false`.
pub struct Matrix<I2C> {
    i2c: I2C,
    address: u8,
    display: [u16; DISPLAY_WORDS],
    keys: [u8; KEY_BYTES],
    last_keys: [u8; KEY_BYTES],
}

impl<I2C> Matrix<I2C> {
    /// Create a driver for the chip at `address` on `i2c`.
    /// This does not communicate with the chip, call
    /// [`initialize`](Self::initialize) before use.
    pub const fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            display: [0; DISPLAY_WORDS],
            keys: [0; KEY_BYTES],
            last_keys: [0; KEY_BYTES],
        }
    }

    /// The 7-bit bus address of this chip
    #[must_use]
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// The in-memory display buffer, one word per common line
    #[must_use]
    pub const fn display_buffer(&self) -> &[u16; DISPLAY_WORDS] {
        &self.display
    }

    /// Consumes the driver and returns the bus it owned.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Is the LED on in the display buffer?
    #[must_use]
    pub fn is_led_on(&self, led: u8) -> bool {
        led_position(led)
            .is_some_and(|pos| self.display[pos.word_index()] & (1 << pos.offset()) != 0)
    }

    /// Turn an LED on in the display buffer.
    pub fn set_led(&mut self, led: u8) {
        if let Some(pos) = led_position(led) {
            self.display[pos.word_index()] |= 1 << pos.offset();
        }
    }

    /// Turn an LED off in the display buffer.
    pub fn clear_led(&mut self, led: u8) {
        if let Some(pos) = led_position(led) {
            self.display[pos.word_index()] &= !(1 << pos.offset());
        }
    }

    /// Set or clear an LED in the display buffer.
    pub fn set_led_state(&mut self, led: u8, on: bool) {
        if on {
            self.set_led(led);
        } else {
            self.clear_led(led);
        }
    }

    /// Turn every LED off in the display buffer.
    pub fn clear(&mut self) {
        self.display = [0; DISPLAY_WORDS];
    }

    /// Was the key down during the latest scan?
    #[must_use]
    pub fn is_pressed(&self, key: u8) -> bool {
        key_bit(&self.keys, key)
    }

    /// Was the key down during the scan before the latest one?
    #[must_use]
    pub fn was_pressed(&self, key: u8) -> bool {
        key_bit(&self.last_keys, key)
    }

    /// Did the key go down between the last two scans?
    #[must_use]
    pub fn just_pressed(&self, key: u8) -> bool {
        self.is_pressed(key) && !self.was_pressed(key)
    }

    /// Did the key come up between the last two scans?
    #[must_use]
    pub fn just_released(&self, key: u8) -> bool {
        !self.is_pressed(key) && self.was_pressed(key)
    }
}

impl<I2C: I2c> Matrix<I2C> {
    /// Start the oscillator, stop blinking, set the brightness and enable
    /// the active low key interrupt, in that order.
    ///
    /// # Errors
    ///
    /// Returns an error if any bus write fails.
    pub fn initialize(&mut self, brightness: u8) -> Result<(), Error<I2C::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "initializing matrix {=u8:#x} brightness {=u8}",
            self.address,
            brightness
        );
        self.write_command(SystemSetup::new(true).0)?;
        self.set_blink_rate(BlinkRate::Off)?;
        self.set_brightness(brightness)?;
        self.write_command(RowIntSet::interrupt_active_low().0)
    }

    /// Set the display brightness, `0..=15`. Larger values are clamped.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus write fails.
    pub fn set_brightness(&mut self, brightness: u8) -> Result<(), Error<I2C::Error>> {
        self.write_command(Dimming::new(brightness).0)
    }

    /// Set the hardware blink rate. The display stays on.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus write fails.
    pub fn set_blink_rate(&mut self, rate: BlinkRate) -> Result<(), Error<I2C::Error>> {
        self.write_command(DisplaySetup::new(rate).0)
    }

    /// Write the display buffer to display RAM, low byte first.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus write fails.
    pub fn flush(&mut self) -> Result<(), Error<I2C::Error>> {
        let mut bytes = [0u8; 1 + DISPLAY_WORDS * 2];
        bytes[0] = command::DISPLAY_RAM;
        for (chunk, word) in bytes[1..].chunks_exact_mut(2).zip(self.display.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        #[cfg(feature = "defmt")]
        defmt::trace!("flush {=u8:#x} {=[u8]:#x}", self.address, &bytes[1..]);
        self.i2c.write(self.address, &bytes).map_err(Error::Write)
    }

    /// Read key RAM, keeping the previous snapshot for edge detection.
    ///
    /// Returns `true` if any key changed since the previous scan. If the read
    /// fails the previous snapshot is kept as the current one, so no edges
    /// are reported.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus read fails.
    pub fn scan(&mut self) -> Result<bool, Error<I2C::Error>> {
        self.last_keys = self.keys;

        let mut keys = [0u8; KEY_BYTES];
        self.i2c
            .write_read(self.address, &[command::KEY_RAM], &mut keys)
            .map_err(Error::Read)?;
        self.keys = keys;

        let changed = self.keys != self.last_keys;
        #[cfg(feature = "defmt")]
        if changed {
            defmt::debug!("keys {=u8:#x} {:#x}", self.address, self.keys);
        }
        Ok(changed)
    }

    fn write_command(&mut self, command: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(self.address, &[command])
            .map_err(Error::Write)
    }
}

impl<I2C> core::fmt::Debug for Matrix<I2C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Matrix")
            .field("address", &self.address)
            .field("display", &self.display)
            .field("keys", &self.keys)
            .field("last_keys", &self.last_keys)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "defmt")]
impl<I2C> defmt::Format for Matrix<I2C> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Matrix {=u8:#x}", self.address);
        defmt::write!(f, " display: {:#x}", self.display);
        defmt::write!(f, " keys: {:#x}", self.keys);
    }
}
