//! Driver for HT16K33 based LED/button matrices tiled into one grid.
//!
//! ## How Trellis Tiles Work
//!
//! A Trellis tile is a 4x4 pad of buttons, each with an LED underneath, wired
//! to one HT16K33 LED controller/key scanner. The chip sits on an I2C bus at
//! one of the addresses `0x70..=0x77` selected by solder jumpers, so up to
//! eight tiles can share one bus. This crate drives up to four of them as a
//! single surface.
//!
//! ### Display RAM
//! The HT16K33 holds 16 bytes of display RAM, one 16-bit word per common
//! line. Each bit lights one LED. The chip refreshes the LEDs from this RAM on
//! its own, so the host only writes it when something changes.
//!
//! ### Key RAM
//! The chip continuously scans its key matrix and latches the result into 6
//! bytes of key RAM. The host polls this RAM. Comparing two consecutive polls
//! tells which keys went down or came up in between.
//!
//! ### Wiring
//! The Trellis PCB does not wire LEDs and keys in RAM bit order. The
//! [`Matrix`] driver hides that behind fixed lookup tables so LED and key
//! numbers are plain row-major `0..16` on every tile.
//!
//! ## Layers
//! - [`Matrix`] drives one tile: display buffer, key snapshots, bus commands.
//! - [`GridController`] routes cells `0..64` to up to four tiles by slot.
//! - [`tiling`] maps `x,y` coordinates to those cells, see
//!   [`tiling::Quadrants8x8`].
//!
//! The [`GridController`] also implements `embedded-graphics`'
//! [`DrawTarget`](embedded_graphics::draw_target::DrawTarget) for
//! [`BinaryColor`](embedded_graphics::pixelcolor::BinaryColor), so anything
//! `embedded-graphics` can draw can be shown on the LEDs.
//!
//! ## Example
//! ```rust
//! use core::cell::RefCell;
//! use embedded_hal_bus::i2c::RefCellDevice;
//! use embedded_hal_mock::eh1::i2c::{Mock, Transaction};
//! use trellis_grid::{GridController, Matrix};
//!
//! let bus = RefCell::new(Mock::new(&[
//!     Transaction::write_read(0x70, vec![0x40], vec![0x80, 0, 0, 0, 0, 0]),
//!     Transaction::write_read(0x71, vec![0x40], vec![0; 6]),
//! ]));
//! let mut left = Matrix::new(RefCellDevice::new(&bus), 0x70);
//! let mut right = Matrix::new(RefCellDevice::new(&bus), 0x71);
//!
//! let mut grid = GridController::new([Some(&mut left), Some(&mut right), None, None]);
//! if grid.scan().unwrap() {
//!     assert!(grid.just_pressed(0));
//!     grid.set_led_xy(0, 0);
//! }
//! assert!(grid.is_led_on(0));
//!
//! bus.borrow_mut().done();
//! ```
//!
//! ## Available Feature Flags
//!
//! ### `defmt` Feature
//! Implements `defmt::Format` for the public types and logs initialization,
//! flushes and key changes through the `defmt` logging framework. No
//! functional changes.
#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

mod command;
pub mod controller;
pub mod matrix;
pub mod tiling;

pub use command::BlinkRate;
pub use controller::{GridController, SlotMask};
pub use matrix::Matrix;

/// Number of tile slots in a [`GridController`]
pub const SLOT_COUNT: usize = 4;
/// Number of cells of a fully populated [`GridController`]
pub const GRID_SIZE: u8 = 64;
/// Highest brightness level
pub const MAX_BRIGHTNESS: u8 = 15;
/// Bus addresses of the four slots when the address jumpers are set in order
pub const DEFAULT_ADDRESSES: [u8; SLOT_COUNT] = [0x70, 0x71, 0x72, 0x73];

/// Bus errors reported by [`Matrix`] and [`GridController`].
///
/// Out of range LED, key and coordinate arguments are never errors, they are
/// ignored or read as `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// A command or display write failed
    Write(E),
    /// A key RAM read failed
    Read(E),
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Write(e) => write!(f, "bus write failed: {e:?}"),
            Self::Read(e) => write!(f, "key read failed: {e:?}"),
        }
    }
}

impl<E: core::fmt::Debug> core::error::Error for Error<E> {}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::format;

    use super::*;

    #[test]
    fn test_default_addresses() {
        assert_eq!(DEFAULT_ADDRESSES.len(), SLOT_COUNT);
        for (slot, address) in DEFAULT_ADDRESSES.iter().enumerate() {
            assert_eq!(usize::from(*address), 0x70 + slot);
        }
    }

    #[test]
    fn test_grid_size_matches_slots() {
        assert_eq!(
            usize::from(GRID_SIZE),
            SLOT_COUNT * usize::from(matrix::LED_COUNT)
        );
        assert_eq!(matrix::LED_COUNT, matrix::KEY_COUNT);
    }

    #[test]
    fn test_error_display() {
        let write: Error<u8> = Error::Write(3);
        let read: Error<u8> = Error::Read(4);
        assert_eq!(format!("{write}"), "bus write failed: 3");
        assert_eq!(format!("{read}"), "key read failed: 4");
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(Error::Write(1u8), Error::Write(1u8));
        assert_ne!(Error::Write(1u8), Error::Read(1u8));
    }
}
