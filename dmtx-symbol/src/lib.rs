//! Data Matrix ECC 200 symbol size catalog.
//!
//! ECC 200 defines a fixed catalog of 24 square and 6 rectangular symbol
//! sizes. Every other component in this workspace (placement, Reed-Solomon
//! block interleaving, the raster painter) derives its geometry from the
//! per-size attribute tables in this crate rather than recomputing it.
//!
//! # Safety
//! Unsafe code is forbidden via a crate-level attribute.

#![forbid(unsafe_code)]

use std::fmt;

mod module_status;

pub use module_status::{module_status, ModuleKind};

/// One of the 24 square or 6 rectangular ECC 200 symbol sizes.
///
/// Variants are ordered exactly as the ECC 200 size catalog lists them:
/// squares from smallest to largest, then rectangles from smallest to
/// largest. [`SymbolSize::index`] returns this ordinal, and
/// [`SymbolSize::from_index`] is its inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolSize {
    /// 10x10 square.
    Square10,
    /// 12x12 square.
    Square12,
    /// 14x14 square.
    Square14,
    /// 16x16 square.
    Square16,
    /// 18x18 square.
    Square18,
    /// 20x20 square.
    Square20,
    /// 22x22 square.
    Square22,
    /// 24x24 square.
    Square24,
    /// 26x26 square.
    Square26,
    /// 32x32 square.
    Square32,
    /// 36x36 square.
    Square36,
    /// 40x40 square.
    Square40,
    /// 44x44 square.
    Square44,
    /// 48x48 square.
    Square48,
    /// 52x52 square.
    Square52,
    /// 64x64 square.
    Square64,
    /// 72x72 square.
    Square72,
    /// 80x80 square.
    Square80,
    /// 88x88 square.
    Square88,
    /// 96x96 square.
    Square96,
    /// 104x104 square.
    Square104,
    /// 120x120 square.
    Square120,
    /// 132x132 square.
    Square132,
    /// 144x144 square.
    Square144,
    /// 8 rows x 18 columns rectangle.
    Rect8x18,
    /// 8 rows x 32 columns rectangle.
    Rect8x32,
    /// 12 rows x 26 columns rectangle.
    Rect12x26,
    /// 12 rows x 36 columns rectangle.
    Rect12x36,
    /// 16 rows x 36 columns rectangle.
    Rect16x36,
    /// 16 rows x 48 columns rectangle.
    Rect16x48,
}

/// How a caller wants the symbol size chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeRequest {
    /// Use a specific, already-known size.
    Explicit(SymbolSize),
    /// Pick the smallest square that fits the payload.
    SquareAuto,
    /// Pick the smallest rectangle that fits the payload.
    RectAuto,
    /// Pick the smallest symbol of either shape that fits the payload.
    ShapeAuto,
}

/// The number of square sizes in the catalog.
pub const SQUARE_COUNT: usize = 24;
/// The number of rectangular sizes in the catalog.
pub const RECT_COUNT: usize = 6;
/// The total number of sizes in the catalog.
pub const SIZE_COUNT: usize = SQUARE_COUNT + RECT_COUNT;

const ALL_SIZES: [SymbolSize; SIZE_COUNT] = [
    SymbolSize::Square10,
    SymbolSize::Square12,
    SymbolSize::Square14,
    SymbolSize::Square16,
    SymbolSize::Square18,
    SymbolSize::Square20,
    SymbolSize::Square22,
    SymbolSize::Square24,
    SymbolSize::Square26,
    SymbolSize::Square32,
    SymbolSize::Square36,
    SymbolSize::Square40,
    SymbolSize::Square44,
    SymbolSize::Square48,
    SymbolSize::Square52,
    SymbolSize::Square64,
    SymbolSize::Square72,
    SymbolSize::Square80,
    SymbolSize::Square88,
    SymbolSize::Square96,
    SymbolSize::Square104,
    SymbolSize::Square120,
    SymbolSize::Square132,
    SymbolSize::Square144,
    SymbolSize::Rect8x18,
    SymbolSize::Rect8x32,
    SymbolSize::Rect12x26,
    SymbolSize::Rect12x36,
    SymbolSize::Rect16x36,
    SymbolSize::Rect16x48,
];

const SYMBOL_ROWS: [u16; SIZE_COUNT] = [
    10, 12, 14, 16, 18, 20, 22, 24, 26, 32, 36, 40, 44, 48, 52, 64, 72, 80, 88, 96, 104, 120, 132,
    144, 8, 8, 12, 12, 16, 16,
];

const SYMBOL_COLS: [u16; SIZE_COUNT] = [
    10, 12, 14, 16, 18, 20, 22, 24, 26, 32, 36, 40, 44, 48, 52, 64, 72, 80, 88, 96, 104, 120, 132,
    144, 18, 32, 26, 36, 36, 48,
];

const DATA_REGION_ROWS: [u16; SIZE_COUNT] = [
    8, 10, 12, 14, 16, 18, 20, 22, 24, 14, 16, 18, 20, 22, 24, 14, 16, 18, 20, 22, 24, 18, 20, 22,
    6, 6, 10, 10, 14, 14,
];

const DATA_REGION_COLS: [u16; SIZE_COUNT] = [
    8, 10, 12, 14, 16, 18, 20, 22, 24, 14, 16, 18, 20, 22, 24, 14, 16, 18, 20, 22, 24, 18, 20, 22,
    16, 14, 24, 16, 16, 22,
];

const HORIZ_DATA_REGIONS: [u16; SIZE_COUNT] = [
    1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 4, 4, 4, 4, 4, 4, 6, 6, 6, 1, 2, 1, 2, 2, 2,
];

const INTERLEAVED_BLOCKS: [u16; SIZE_COUNT] = [
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 4, 4, 4, 4, 6, 6, 8, 10, 1, 1, 1, 1, 1, 1,
];

const SYMBOL_DATA_WORDS: [u16; SIZE_COUNT] = [
    3, 5, 8, 12, 18, 22, 30, 36, 44, 62, 86, 114, 144, 174, 204, 280, 368, 456, 576, 696, 816,
    1050, 1304, 1558, 5, 10, 16, 22, 32, 49,
];

const BLOCK_ERROR_WORDS: [u16; SIZE_COUNT] = [
    5, 7, 10, 12, 14, 18, 20, 24, 28, 36, 42, 48, 56, 68, 42, 56, 36, 48, 56, 68, 56, 68, 62, 62,
    7, 11, 14, 18, 24, 28,
];

const BLOCK_MAX_CORRECTABLE: [u16; SIZE_COUNT] = [
    2, 3, 5, 6, 7, 9, 10, 12, 14, 18, 21, 24, 28, 34, 21, 28, 18, 24, 28, 34, 28, 34, 31, 31, 3, 5,
    7, 9, 12, 14,
];

impl SymbolSize {
    /// This size's ordinal position in the ECC 200 catalog (0..=29).
    pub fn index(self) -> usize {
        ALL_SIZES.iter().position(|&s| s == self).expect("exhaustive table")
    }

    /// Looks up a size by its catalog ordinal, if in range.
    pub fn from_index(index: usize) -> Option<SymbolSize> {
        ALL_SIZES.get(index).copied()
    }

    /// All 30 sizes in catalog order.
    pub fn all() -> [SymbolSize; SIZE_COUNT] {
        ALL_SIZES
    }

    /// Whether this is one of the 24 square sizes.
    pub fn is_square(self) -> bool {
        self.index() < SQUARE_COUNT
    }

    /// Total module rows in the full symbol (including finder/timing border).
    pub fn symbol_rows(self) -> u16 {
        SYMBOL_ROWS[self.index()]
    }

    /// Total module columns in the full symbol (including finder/timing
    /// border).
    pub fn symbol_cols(self) -> u16 {
        SYMBOL_COLS[self.index()]
    }

    /// Data-bearing module rows within a single data region (excludes
    /// border).
    pub fn data_region_rows(self) -> u16 {
        DATA_REGION_ROWS[self.index()]
    }

    /// Data-bearing module columns within a single data region (excludes
    /// border).
    pub fn data_region_cols(self) -> u16 {
        DATA_REGION_COLS[self.index()]
    }

    /// Number of data regions laid out horizontally.
    pub fn horiz_data_regions(self) -> u16 {
        HORIZ_DATA_REGIONS[self.index()]
    }

    /// Number of data regions laid out vertically.
    pub fn vert_data_regions(self) -> u16 {
        if self.is_square() {
            HORIZ_DATA_REGIONS[self.index()]
        } else {
            1
        }
    }

    /// Rows in the logical mapping matrix (placement's coordinate space):
    /// `data_region_rows * vert_data_regions`.
    pub fn mapping_rows(self) -> u16 {
        self.data_region_rows() * self.vert_data_regions()
    }

    /// Columns in the logical mapping matrix: `data_region_cols *
    /// horiz_data_regions`.
    pub fn mapping_cols(self) -> u16 {
        self.data_region_cols() * self.horiz_data_regions()
    }

    /// Number of interleaved Reed-Solomon blocks.
    pub fn interleaved_blocks(self) -> u16 {
        INTERLEAVED_BLOCKS[self.index()]
    }

    /// Total data codewords across all interleaved blocks.
    pub fn symbol_data_words(self) -> u16 {
        SYMBOL_DATA_WORDS[self.index()]
    }

    /// Error-correction codewords per block.
    pub fn block_error_words(self) -> u16 {
        BLOCK_ERROR_WORDS[self.index()]
    }

    /// Maximum correctable errors per block.
    pub fn block_max_correctable(self) -> u16 {
        BLOCK_MAX_CORRECTABLE[self.index()]
    }

    /// Total error-correction codewords across all interleaved blocks.
    pub fn symbol_error_words(self) -> u16 {
        self.block_error_words() * self.interleaved_blocks()
    }

    /// Total correctable errors across all interleaved blocks.
    pub fn symbol_max_correctable(self) -> u16 {
        self.block_max_correctable() * self.interleaved_blocks()
    }

    /// Data codeword count carried by the block at `block_idx`.
    ///
    /// The 144x144 symbol distributes its remainder unevenly: its first 8
    /// blocks each carry one extra data codeword.
    pub fn block_data_size(self, block_idx: u16) -> Option<u16> {
        let blocks = self.interleaved_blocks();
        if blocks == 0 {
            return None;
        }
        let count = self.symbol_data_words() / blocks;
        Some(if self == SymbolSize::Square144 && block_idx < 8 {
            count + 1
        } else {
            count
        })
    }

    /// Reverse lookup: finds the catalog size whose physical dimensions
    /// match `(rows, cols)`, if any.
    pub fn from_dimensions(rows: u16, cols: u16) -> Option<SymbolSize> {
        ALL_SIZES
            .iter()
            .copied()
            .find(|&s| s.symbol_rows() == rows && s.symbol_cols() == cols)
    }

    /// Picks the smallest catalog size that can hold `data_words` data
    /// codewords, honoring `request`.
    pub fn find(data_words: u16, request: SizeRequest) -> Option<SymbolSize> {
        if data_words == 0 {
            return None;
        }

        let candidate = match request {
            SizeRequest::Explicit(size) => size,
            SizeRequest::SquareAuto => {
                ALL_SIZES[..SQUARE_COUNT]
                    .iter()
                    .copied()
                    .find(|&s| s.symbol_data_words() >= data_words)?
            }
            SizeRequest::RectAuto => {
                ALL_SIZES[SQUARE_COUNT..]
                    .iter()
                    .copied()
                    .find(|&s| s.symbol_data_words() >= data_words)?
            }
            SizeRequest::ShapeAuto => ALL_SIZES
                .iter()
                .copied()
                .find(|&s| s.symbol_data_words() >= data_words)?,
        };

        if data_words > candidate.symbol_data_words() {
            return None;
        }

        Some(candidate)
    }
}

impl fmt::Display for SymbolSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.symbol_rows(), self.symbol_cols())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips_through_from_index() {
        for size in ALL_SIZES {
            assert_eq!(SymbolSize::from_index(size.index()), Some(size));
        }
    }

    #[test]
    fn smallest_square_holds_its_own_capacity() {
        assert_eq!(SymbolSize::Square10.symbol_data_words(), 3);
        assert_eq!(SymbolSize::Square10.mapping_rows(), 8);
        assert_eq!(SymbolSize::Square10.mapping_cols(), 8);
    }

    #[test]
    fn from_dimensions_finds_144_square() {
        assert_eq!(
            SymbolSize::from_dimensions(144, 144),
            Some(SymbolSize::Square144)
        );
    }

    #[test]
    fn from_dimensions_rejects_unknown_shape() {
        assert_eq!(SymbolSize::from_dimensions(13, 13), None);
    }

    #[test]
    fn find_picks_smallest_square_that_fits() {
        assert_eq!(
            SymbolSize::find(4, SizeRequest::SquareAuto),
            Some(SymbolSize::Square12)
        );
    }

    #[test]
    fn find_rejects_explicit_size_too_small() {
        assert_eq!(
            SymbolSize::find(100, SizeRequest::Explicit(SymbolSize::Square10)),
            None
        );
    }

    #[test]
    fn find_rejects_zero_data_words() {
        assert_eq!(SymbolSize::find(0, SizeRequest::ShapeAuto), None);
    }

    #[test]
    fn block_data_size_144_distributes_remainder_to_first_eight_blocks() {
        let size = SymbolSize::Square144;
        assert_eq!(size.interleaved_blocks(), 10);
        assert_eq!(size.symbol_data_words(), 1558);
        assert_eq!(size.block_data_size(0), Some(156));
        assert_eq!(size.block_data_size(7), Some(156));
        assert_eq!(size.block_data_size(8), Some(155));
        assert_eq!(size.block_data_size(9), Some(155));
    }

    #[test]
    fn rect_sizes_have_single_vertical_region() {
        for size in &ALL_SIZES[SQUARE_COUNT..] {
            assert_eq!(size.vert_data_regions(), 1);
        }
    }
}
