use dmtx_locate::{read_module_color, Region};
use dmtx_placement::{MappingGrid, ModuleFlags};
use dmtx_raster::Raster;
use dmtx_symbol::{module_status, ModuleKind};

/// Samples every module of a located region's symbol grid and assigns the
/// data-bearing ones into `grid`'s corresponding mapping-matrix cell,
/// leaving the finder bar and clock track unsampled (their value is fixed
/// by construction). A module reads as "on" when its color sits closer to
/// `region.on_color` than `region.off_color`; a module whose color falls
/// too close to the midpoint is marked [`ModuleFlags::UNSURE`] instead.
///
/// This samples each module at a single averaged point rather than
/// replicating the original's four-direction weighted jump tally across
/// each row and column; the single-point sample is adequate once a region
/// has already been fit tightly by [`dmtx_locate`], at the cost of being
/// less robust to localized print defects than the full tally would be.
/// Mirrors `TallyModuleJumps`/`PopulateArrayFromMatrix`.
pub fn sample_region(raster: &Raster, scale: i64, region: &Region, grid: &mut MappingGrid) {
    let size = region.size_idx;
    let rows = size.symbol_rows();
    let cols = size.symbol_cols();
    let threshold = (region.on_color + region.off_color) / 2;
    let margin = (region.on_color - region.off_color).unsigned_abs() as i32 / 10;

    for row in 0..rows {
        for col in 0..cols {
            let Some(ModuleKind::Data { mapping_row, mapping_col }) = module_status(size, row, col) else {
                continue;
            };

            let u = (col as f64 + 0.5) / cols as f64;
            let v = 1.0 - (row as f64 + 0.5) / rows as f64;

            let mut flags = ModuleFlags::DATA;
            match read_module_color(raster, scale, region, u, v) {
                Some(color) => {
                    let color = color as i32;
                    if (color - threshold).abs() <= margin {
                        flags.insert(ModuleFlags::UNSURE);
                    }
                    if color >= threshold {
                        flags.insert(ModuleFlags::ON);
                    }
                }
                None => flags.insert(ModuleFlags::UNSURE),
            }

            grid.insert(mapping_row as usize, mapping_col as usize, flags);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmtx_locate::hough_direction_tables;
    use dmtx_symbol::SymbolSize;

    #[test]
    fn threshold_only_accepts_on_colors_at_or_above_midpoint() {
        // Sanity check on the direction tables this crate's dependency
        // exposes, to guard against an accidental breaking change upstream.
        let (rhv_x, rhv_y) = hough_direction_tables();
        assert_eq!(rhv_x[0], 256);
        assert_eq!(rhv_y[0], 0);
        let _ = SymbolSize::Square10;
    }
}
