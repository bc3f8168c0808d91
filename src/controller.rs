//! Several [`Matrix`] tiles driven as one grid.
//!
//! The [`GridController`] numbers its cells `0..64`. Cell `k` lives on slot
//! `k / 16` as LED/key `k % 16` of that tile. Empty slots behave like a tile
//! whose LEDs are all off and whose keys are never pressed.
//!
//! Coordinate based access goes through an [`IndexRemapper`], by default
//! [`Quadrants8x8`].

use core::convert::Infallible;
use core::marker::PhantomData;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Size};
use embedded_graphics::Pixel;
use embedded_hal::i2c::I2c;

use crate::matrix::{Matrix, LED_COUNT};
use crate::tiling::{IndexRemapper, Quadrants8x8};
use crate::{BlinkRate, Error, GRID_SIZE, MAX_BRIGHTNESS, SLOT_COUNT};

/// A set of slots, used to scan only part of a [`GridController`].
///
/// Boards often split their tiles into groups that are polled separately,
/// for example a pattern area on slots 0 and 1 and control keys on slots 2
/// and 3.
///
/// # Example
/// ```rust
/// use trellis_grid::SlotMask;
///
/// let pads = SlotMask::NONE.with(0).with(3);
/// assert!(pads.contains(0));
/// assert!(!pads.contains(1));
/// assert_eq!(SlotMask::PRIMARY.bits(), 0b0011);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlotMask(u8);

impl SlotMask {
    const VALID: u8 = (1 << SLOT_COUNT) - 1;

    /// No slots
    pub const NONE: Self = Self(0);
    /// Every slot
    pub const ALL: Self = Self(Self::VALID);
    /// Slots 0 and 1
    pub const PRIMARY: Self = Self(0b0011);
    /// Slots 2 and 3
    pub const SECONDARY: Self = Self(0b1100);

    /// Build a mask from raw bits, bit `n` selecting slot `n`. Bits for
    /// slots that do not exist are dropped.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::VALID)
    }

    /// The raw bits of this mask
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// This mask with `slot` added. Slots past [`SLOT_COUNT`] are ignored.
    #[must_use]
    pub const fn with(self, slot: usize) -> Self {
        if slot < SLOT_COUNT {
            Self(self.0 | (1 << slot))
        } else {
            self
        }
    }

    /// Does this mask select `slot`?
    #[must_use]
    pub const fn contains(self, slot: usize) -> bool {
        slot < SLOT_COUNT && self.0 & (1 << slot) != 0
    }
}

/// Split a grid cell into `(slot, local)`.
#[inline]
fn locate(index: u8) -> Option<(usize, u8)> {
    (index < GRID_SIZE).then(|| (usize::from(index / LED_COUNT), index % LED_COUNT))
}

/// Up to four [`Matrix`] tiles driven as one grid of 64 cells.
///
/// The controller borrows its tiles, they stay usable on their own once the
/// controller is dropped.
///
/// # Type Parameters
/// - `I2C` - The bus handle type of the tiles
/// - `M` - The coordinate layout (see implementers of [`IndexRemapper`])
///
/// # Example
/// ```rust,no_run
/// use trellis_grid::{GridController, Matrix, DEFAULT_ADDRESSES};
/// # fn demo<I2C: embedded_hal::i2c::I2c>(
/// #     buses: [I2C; 4],
/// # ) -> Result<(), trellis_grid::Error<I2C::Error>> {
/// let [a, b, c, d] = buses;
/// let mut m0 = Matrix::new(a, DEFAULT_ADDRESSES[0]);
/// let mut m1 = Matrix::new(b, DEFAULT_ADDRESSES[1]);
/// let mut m2 = Matrix::new(c, DEFAULT_ADDRESSES[2]);
/// let mut m3 = Matrix::new(d, DEFAULT_ADDRESSES[3]);
///
/// let mut grid =
///     GridController::new([Some(&mut m0), Some(&mut m1), Some(&mut m2), Some(&mut m3)]);
/// grid.initialize()?;
///
/// loop {
///     if grid.scan_primary()? {
///         for cell in 0..32 {
///             if grid.just_pressed(cell) {
///                 grid.set_led(cell);
///             }
///         }
///         grid.flush()?;
///     }
/// }
/// # }
/// ```
pub struct GridController<'a, I2C, M = Quadrants8x8> {
    matrices: [Option<&'a mut Matrix<I2C>>; SLOT_COUNT],
    layout: PhantomData<M>,
}

impl<'a, I2C> GridController<'a, I2C, Quadrants8x8> {
    /// Create a controller over the given slots using the [`Quadrants8x8`]
    /// layout. `None` marks an empty slot.
    #[must_use]
    pub fn new(matrices: [Option<&'a mut Matrix<I2C>>; SLOT_COUNT]) -> Self {
        Self::with_layout(matrices)
    }
}

impl<'a, I2C, M> GridController<'a, I2C, M> {
    /// Create a controller over the given slots with a custom layout.
    #[must_use]
    pub fn with_layout(matrices: [Option<&'a mut Matrix<I2C>>; SLOT_COUNT]) -> Self {
        Self {
            matrices,
            layout: PhantomData,
        }
    }

    /// The tile in `slot`, if any
    #[must_use]
    pub fn matrix(&self, slot: usize) -> Option<&Matrix<I2C>> {
        self.matrices.get(slot)?.as_deref()
    }

    /// Mutable access to the tile in `slot`, if any
    pub fn matrix_mut(&mut self, slot: usize) -> Option<&mut Matrix<I2C>> {
        self.matrices.get_mut(slot)?.as_deref_mut()
    }

    /// Which slots hold a tile
    #[must_use]
    pub fn present(&self) -> SlotMask {
        self.matrices
            .iter()
            .enumerate()
            .filter(|(_, matrix)| matrix.is_some())
            .fold(SlotMask::NONE, |mask, (slot, _)| mask.with(slot))
    }

    fn route(&self, index: u8) -> Option<(&Matrix<I2C>, u8)> {
        let (slot, local) = locate(index)?;
        self.matrix(slot).map(|matrix| (matrix, local))
    }

    fn route_mut(&mut self, index: u8) -> Option<(&mut Matrix<I2C>, u8)> {
        let (slot, local) = locate(index)?;
        self.matrix_mut(slot).map(|matrix| (matrix, local))
    }

    /// Is the LED of a cell on in the display buffer?
    #[must_use]
    pub fn is_led_on(&self, index: u8) -> bool {
        self.route(index)
            .is_some_and(|(matrix, led)| matrix.is_led_on(led))
    }

    /// Turn the LED of a cell on in the display buffer.
    pub fn set_led(&mut self, index: u8) {
        if let Some((matrix, led)) = self.route_mut(index) {
            matrix.set_led(led);
        }
    }

    /// Turn the LED of a cell off in the display buffer.
    pub fn clear_led(&mut self, index: u8) {
        if let Some((matrix, led)) = self.route_mut(index) {
            matrix.clear_led(led);
        }
    }

    /// Set or clear the LED of a cell in the display buffer.
    pub fn set_led_state(&mut self, index: u8, on: bool) {
        if let Some((matrix, led)) = self.route_mut(index) {
            matrix.set_led_state(led, on);
        }
    }

    /// Turn every LED off in every display buffer.
    pub fn clear(&mut self) {
        for matrix in self.matrices.iter_mut().flatten() {
            matrix.clear();
        }
    }

    /// Was the key of a cell down during the latest scan?
    #[must_use]
    pub fn is_pressed(&self, index: u8) -> bool {
        self.route(index)
            .is_some_and(|(matrix, key)| matrix.is_pressed(key))
    }

    /// Was the key of a cell down during the scan before the latest one?
    #[must_use]
    pub fn was_pressed(&self, index: u8) -> bool {
        self.route(index)
            .is_some_and(|(matrix, key)| matrix.was_pressed(key))
    }

    /// Did the key of a cell go down between the last two scans?
    #[must_use]
    pub fn just_pressed(&self, index: u8) -> bool {
        self.is_pressed(index) && !self.was_pressed(index)
    }

    /// Did the key of a cell come up between the last two scans?
    #[must_use]
    pub fn just_released(&self, index: u8) -> bool {
        !self.is_pressed(index) && self.was_pressed(index)
    }
}

impl<I2C, M: IndexRemapper> GridController<'_, I2C, M> {
    /// [`is_led_on`](Self::is_led_on) by coordinate
    #[must_use]
    pub fn is_led_on_xy(&self, x: u8, y: u8) -> bool {
        M::xy_to_index(x, y).is_some_and(|index| self.is_led_on(index))
    }

    /// [`set_led`](Self::set_led) by coordinate
    pub fn set_led_xy(&mut self, x: u8, y: u8) {
        if let Some(index) = M::xy_to_index(x, y) {
            self.set_led(index);
        }
    }

    /// [`clear_led`](Self::clear_led) by coordinate
    pub fn clear_led_xy(&mut self, x: u8, y: u8) {
        if let Some(index) = M::xy_to_index(x, y) {
            self.clear_led(index);
        }
    }

    /// [`is_pressed`](Self::is_pressed) by coordinate
    #[must_use]
    pub fn is_pressed_xy(&self, x: u8, y: u8) -> bool {
        M::xy_to_index(x, y).is_some_and(|index| self.is_pressed(index))
    }

    /// [`just_pressed`](Self::just_pressed) by coordinate
    #[must_use]
    pub fn just_pressed_xy(&self, x: u8, y: u8) -> bool {
        M::xy_to_index(x, y).is_some_and(|index| self.just_pressed(index))
    }

    /// [`just_released`](Self::just_released) by coordinate
    #[must_use]
    pub fn just_released_xy(&self, x: u8, y: u8) -> bool {
        M::xy_to_index(x, y).is_some_and(|index| self.just_released(index))
    }
}

impl<I2C: I2c, M> GridController<'_, I2C, M> {
    /// Run `op` on every tile in `mask`, even after a failure. Returns the
    /// first error.
    fn for_each_in<F>(&mut self, mask: SlotMask, mut op: F) -> Result<(), Error<I2C::Error>>
    where
        F: FnMut(&mut Matrix<I2C>) -> Result<(), Error<I2C::Error>>,
    {
        let mut first_error = None;
        for (slot, matrix) in self.matrices.iter_mut().enumerate() {
            if !mask.contains(slot) {
                continue;
            }
            let Some(matrix) = matrix.as_deref_mut() else {
                continue;
            };
            if let Err(e) = op(matrix) {
                #[cfg(feature = "defmt")]
                defmt::warn!("bus error on slot {=usize}", slot);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Initialize every tile at full brightness.
    ///
    /// # Errors
    ///
    /// Returns the first bus error. The remaining tiles are still initialized.
    pub fn initialize(&mut self) -> Result<(), Error<I2C::Error>> {
        self.for_each_in(SlotMask::ALL, |matrix| matrix.initialize(MAX_BRIGHTNESS))
    }

    /// Set the brightness of every tile.
    ///
    /// # Errors
    ///
    /// Returns the first bus error. The remaining tiles are still updated.
    pub fn set_brightness(&mut self, brightness: u8) -> Result<(), Error<I2C::Error>> {
        self.for_each_in(SlotMask::ALL, |matrix| matrix.set_brightness(brightness))
    }

    /// Set the blink rate of every tile.
    ///
    /// # Errors
    ///
    /// Returns the first bus error. The remaining tiles are still updated.
    pub fn set_blink_rate(&mut self, rate: BlinkRate) -> Result<(), Error<I2C::Error>> {
        self.for_each_in(SlotMask::ALL, |matrix| matrix.set_blink_rate(rate))
    }

    /// Write every display buffer to its tile.
    ///
    /// # Errors
    ///
    /// Returns the first bus error. The remaining tiles are still flushed.
    pub fn flush(&mut self) -> Result<(), Error<I2C::Error>> {
        self.for_each_in(SlotMask::ALL, Matrix::flush)
    }

    /// Scan every tile. Returns `true` if any key changed on any tile.
    ///
    /// # Errors
    ///
    /// Returns the first bus error. The remaining tiles are still scanned.
    pub fn scan(&mut self) -> Result<bool, Error<I2C::Error>> {
        self.scan_slots(SlotMask::ALL)
    }

    /// Scan slots 0 and 1.
    ///
    /// # Errors
    ///
    /// Returns the first bus error. The other tile is still scanned.
    pub fn scan_primary(&mut self) -> Result<bool, Error<I2C::Error>> {
        self.scan_slots(SlotMask::PRIMARY)
    }

    /// Scan slots 2 and 3.
    ///
    /// # Errors
    ///
    /// Returns the first bus error. The other tile is still scanned.
    pub fn scan_secondary(&mut self) -> Result<bool, Error<I2C::Error>> {
        self.scan_slots(SlotMask::SECONDARY)
    }

    /// Scan the tiles in `mask`. Returns `true` if any key changed on them.
    /// Tiles outside the mask keep their key snapshots.
    ///
    /// # Errors
    ///
    /// Returns the first bus error. The remaining tiles are still scanned.
    pub fn scan_slots(&mut self, mask: SlotMask) -> Result<bool, Error<I2C::Error>> {
        let mut changed = false;
        self.for_each_in(mask, |matrix| {
            changed |= matrix.scan()?;
            Ok(())
        })?;
        Ok(changed)
    }
}

impl<I2C, M: IndexRemapper> OriginDimensions for GridController<'_, I2C, M> {
    fn size(&self) -> Size {
        let (width, height) = M::size();
        Size::new(u32::from(width), u32::from(height))
    }
}

impl<I2C, M: IndexRemapper> DrawTarget for GridController<'_, I2C, M> {
    type Color = BinaryColor;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some(index) = M::remap_point(point) {
                self.set_led_state(index, color.is_on());
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        for index in 0..GRID_SIZE {
            self.set_led_state(index, color.is_on());
        }
        Ok(())
    }
}

impl<I2C, M> core::fmt::Debug for GridController<'_, I2C, M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GridController")
            .field("matrices", &self.matrices)
            .finish_non_exhaustive()
    }
}
