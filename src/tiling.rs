//! For tiling multiple 4x4 matrices together into one grid.
//!
//! Each chip drives a 4x4 tile whose keys and LEDs are numbered `0..16` in
//! row-major order. The [`GridController`](crate::GridController) numbers its
//! cells by slot, so cell `k` lives on slot `k / 16`. A layout translates
//! between that flat numbering and `x,y` coordinates on the combined surface.
//! Currently supported layouts:
//! - [`Quadrants8x8`]

use embedded_graphics::prelude::Point;

/// Returned by [`IndexRemapper::to_flat_index`] for coordinates off the grid
pub const INVALID_INDEX: u8 = 255;
/// Returned by [`IndexRemapper::to_coordinate`] for indices off the grid
pub const INVALID_COORDINATE: (u8, u8) = (255, 255);

/// Trait for index re-mappers
///
/// Implementors of this trait map x,y coordinates on the combined surface to
/// the flat cell index used by [`GridController`](crate::GridController) and
/// back again.
pub trait IndexRemapper {
    /// Number of columns of the combined surface
    const WIDTH: u8;
    /// Number of rows of the combined surface
    const HEIGHT: u8;

    /// Map a coordinate to a flat index, `None` if it is off the surface
    fn xy_to_index(x: u8, y: u8) -> Option<u8>;

    /// Map a flat index to its coordinate, `None` if it is off the surface
    fn index_to_xy(index: u8) -> Option<(u8, u8)>;

    /// Like [`xy_to_index`](Self::xy_to_index) but returns
    /// [`INVALID_INDEX`] for coordinates off the surface.
    #[inline]
    #[must_use]
    fn to_flat_index(x: u8, y: u8) -> u8 {
        Self::xy_to_index(x, y).unwrap_or(INVALID_INDEX)
    }

    /// Like [`index_to_xy`](Self::index_to_xy) but returns
    /// [`INVALID_COORDINATE`] for indices off the surface.
    #[inline]
    #[must_use]
    fn to_coordinate(index: u8) -> (u8, u8) {
        Self::index_to_xy(index).unwrap_or(INVALID_COORDINATE)
    }

    /// Map an `embedded-graphics` point to a flat index
    #[inline]
    #[must_use]
    fn remap_point(point: Point) -> Option<u8> {
        let x = u8::try_from(point.x).ok()?;
        let y = u8::try_from(point.y).ok()?;
        Self::xy_to_index(x, y)
    }

    /// Size of the combined surface as `(width, height)`
    #[inline]
    #[must_use]
    fn size() -> (u8, u8) {
        (Self::WIDTH, Self::HEIGHT)
    }
}

/// Four 4x4 tiles arranged as a square 8x8 grid.
///
/// When looking at the front, slot 0 is the top left tile, slot 1 the top
/// right, slot 2 the bottom left and slot 3 the bottom right:
///
/// ```text
///        x 0..4   x 4..8
/// y 0..4 [ 0..16 ][ 16..32 ]
/// y 4..8 [ 32..48][ 48..64 ]
/// ```
///
/// # Example
/// ```rust
/// use trellis_grid::tiling::{IndexRemapper, Quadrants8x8};
///
/// assert_eq!(Quadrants8x8::xy_to_index(5, 0), Some(17));
/// assert_eq!(Quadrants8x8::index_to_xy(17), Some((5, 0)));
/// assert_eq!(Quadrants8x8::to_coordinate(64), (255, 255));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quadrants8x8;

/// Flat index to `x << 4 | y`
const INDEX_TO_XY: [u8; 64] = [
    0x00, 0x10, 0x20, 0x30, 0x01, 0x11, 0x21, 0x31, //
    0x02, 0x12, 0x22, 0x32, 0x03, 0x13, 0x23, 0x33, //
    0x40, 0x50, 0x60, 0x70, 0x41, 0x51, 0x61, 0x71, //
    0x42, 0x52, 0x62, 0x72, 0x43, 0x53, 0x63, 0x73, //
    0x04, 0x14, 0x24, 0x34, 0x05, 0x15, 0x25, 0x35, //
    0x06, 0x16, 0x26, 0x36, 0x07, 0x17, 0x27, 0x37, //
    0x44, 0x54, 0x64, 0x74, 0x45, 0x55, 0x65, 0x75, //
    0x46, 0x56, 0x66, 0x76, 0x47, 0x57, 0x67, 0x77, //
];

/// `[y][x]` to flat index
const XY_TO_INDEX: [[u8; 8]; 8] = [
    [0, 1, 2, 3, 16, 17, 18, 19],
    [4, 5, 6, 7, 20, 21, 22, 23],
    [8, 9, 10, 11, 24, 25, 26, 27],
    [12, 13, 14, 15, 28, 29, 30, 31],
    [32, 33, 34, 35, 48, 49, 50, 51],
    [36, 37, 38, 39, 52, 53, 54, 55],
    [40, 41, 42, 43, 56, 57, 58, 59],
    [44, 45, 46, 47, 60, 61, 62, 63],
];

impl IndexRemapper for Quadrants8x8 {
    const WIDTH: u8 = 8;
    const HEIGHT: u8 = 8;

    #[inline]
    fn xy_to_index(x: u8, y: u8) -> Option<u8> {
        XY_TO_INDEX
            .get(usize::from(y))
            .and_then(|row| row.get(usize::from(x)))
            .copied()
    }

    #[inline]
    fn index_to_xy(index: u8) -> Option<(u8, u8)> {
        INDEX_TO_XY
            .get(usize::from(index))
            .map(|xy| (xy >> 4, xy & 0x0F))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_size() {
        assert_eq!(Quadrants8x8::size(), (8, 8));
    }

    #[test]
    fn test_xy_to_index_round_trips() {
        for y in 0..8 {
            for x in 0..8 {
                let index = Quadrants8x8::to_flat_index(x, y);
                assert!(index < 64);
                assert_eq!(Quadrants8x8::to_coordinate(index), (x, y));
            }
        }
    }

    #[test]
    fn test_index_to_xy_round_trips() {
        for index in 0..64 {
            let (x, y) = Quadrants8x8::to_coordinate(index);
            assert!(x < 8 && y < 8);
            assert_eq!(Quadrants8x8::to_flat_index(x, y), index);
        }
    }

    #[test]
    fn test_every_cell_is_covered_once() {
        let cells: HashSet<(u8, u8)> = (0..64)
            .map(|index| Quadrants8x8::index_to_xy(index).unwrap())
            .collect();
        assert_eq!(cells.len(), 64);
    }

    #[test]
    fn test_quadrant_per_slot() {
        for index in 0..64u8 {
            let (x, y) = Quadrants8x8::index_to_xy(index).unwrap();
            let slot = index / 16;
            let (left, top) = match slot {
                0 => (0, 0),
                1 => (4, 0),
                2 => (0, 4),
                _ => (4, 4),
            };
            assert!((left..left + 4).contains(&x), "index {index} x {x}");
            assert!((top..top + 4).contains(&y), "index {index} y {y}");

            // tiles are row-major
            let local = index % 16;
            assert_eq!(x - left, local % 4);
            assert_eq!(y - top, local / 4);
        }
    }

    #[test]
    fn test_known_corners() {
        assert_eq!(Quadrants8x8::xy_to_index(0, 0), Some(0));
        assert_eq!(Quadrants8x8::xy_to_index(7, 0), Some(19));
        assert_eq!(Quadrants8x8::xy_to_index(0, 7), Some(44));
        assert_eq!(Quadrants8x8::xy_to_index(7, 7), Some(63));
        assert_eq!(Quadrants8x8::xy_to_index(4, 4), Some(48));
    }

    #[test]
    fn test_off_grid_returns_sentinels() {
        assert_eq!(Quadrants8x8::xy_to_index(8, 0), None);
        assert_eq!(Quadrants8x8::xy_to_index(0, 8), None);
        assert_eq!(Quadrants8x8::to_flat_index(8, 3), INVALID_INDEX);
        assert_eq!(Quadrants8x8::to_flat_index(255, 255), INVALID_INDEX);

        assert_eq!(Quadrants8x8::index_to_xy(64), None);
        assert_eq!(Quadrants8x8::to_coordinate(64), INVALID_COORDINATE);
        assert_eq!(Quadrants8x8::to_coordinate(255), (255, 255));
    }

    #[test]
    fn test_remap_point() {
        assert_eq!(Quadrants8x8::remap_point(Point::new(5, 0)), Some(17));
        assert_eq!(Quadrants8x8::remap_point(Point::new(-1, 0)), None);
        assert_eq!(Quadrants8x8::remap_point(Point::new(0, -3)), None);
        assert_eq!(Quadrants8x8::remap_point(Point::new(8, 8)), None);
        assert_eq!(Quadrants8x8::remap_point(Point::new(1000, 0)), None);
    }
}
