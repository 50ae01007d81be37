//! Symbol rendering: paints a placed mapping grid into a pixel raster.
//!
//! Mirrors `PrintPattern` (`dmtxencode.c`): every module in the full
//! `symbol_rows x symbol_cols` grid (finder bar, clock track, and data) is
//! painted as a solid `module_size x module_size` block, black for "on"
//! and white for "off", inset by `margin_size` pixels of quiet zone.
//!
//! Module `(row, col)` is addressed with row 0 at the top of the rendered
//! image and column 0 at the left — this matches the `(u, v)` convention
//! [`dmtx_sample::sample_region`] and [`dmtx_locate`]'s calibration-bar
//! probe already use (`u = (col+0.5)/cols`, `v = 1-(row+0.5)/rows`, with
//! `v=1` at the raw image's top edge), so a region the locator fits against
//! this rendering samples back the same module grid the encoder painted.

use dmtx_placement::{MappingGrid, ModuleFlags};
use dmtx_raster::{Raster, RasterError};
use dmtx_symbol::{module_status, ModuleKind, SymbolSize};

use crate::options::EncodeOptions;

/// One paintable color plane: which [`ModuleFlags`] bit marks a data
/// module "on" in that plane, and which raster channel to write it into.
struct Plane<'g> {
    grid: &'g MappingGrid,
    on_flag: ModuleFlags,
    channel: usize,
}

/// Paints `size`'s full symbol grid into a freshly allocated raster sized
/// per `opts.module_size`/`opts.margin_size`/`opts.pixel_packing`.
///
/// `planes` carries one entry per color channel to paint; a monochrome
/// encode passes a single plane targeting every available channel, a
/// mosaic encode passes three (red/green/blue).
pub(crate) fn render_symbol(
    size: SymbolSize,
    planes: &[(&MappingGrid, ModuleFlags, usize)],
    opts: &EncodeOptions,
) -> Result<Raster, RasterError> {
    let symbol_rows = size.symbol_rows() as u32;
    let symbol_cols = size.symbol_cols() as u32;
    let width = 2 * opts.margin_size + symbol_cols * opts.module_size;
    let height = 2 * opts.margin_size + symbol_rows * opts.module_size;

    let pixels = vec![0xFFu8; (width * height * opts.pixel_packing.bits_per_pixel() / 8) as usize
        + opts.row_pad_bytes as usize];
    let mut raster = Raster::new(pixels, width, height, opts.pixel_packing)?;
    raster.set_row_pad_bytes(opts.row_pad_bytes);
    raster.set_image_flip(opts.image_flip);

    let channel_count = raster.channel_count().max(1);
    let planes: Vec<Plane<'_>> = planes
        .iter()
        .map(|&(grid, on_flag, channel)| Plane { grid, on_flag, channel })
        .collect();

    for row in 0..symbol_rows as u16 {
        for col in 0..symbol_cols as u16 {
            let Some(kind) = module_status(size, row, col) else {
                continue;
            };

            let x_min = opts.margin_size + col as u32 * opts.module_size;
            let y_min = opts.margin_size + (symbol_rows - 1 - row as u32) * opts.module_size;

            for plane in &planes {
                let value = if module_on(kind, plane.grid, plane.on_flag) { 0u8 } else { 255u8 };

                // A monochrome plane list carries one entry but must still
                // reach every channel of a multi-channel packing (e.g.
                // filling R, G and B identically for a plain 24bpp encode).
                if planes.len() == 1 {
                    for channel in 0..channel_count {
                        paint_module(&mut raster, x_min, y_min, opts.module_size, channel, value)?;
                    }
                } else {
                    paint_module(&mut raster, x_min, y_min, opts.module_size, plane.channel, value)?;
                }
            }
        }
    }

    Ok(raster)
}

fn module_on(kind: ModuleKind, grid: &MappingGrid, on_flag: ModuleFlags) -> bool {
    match kind {
        ModuleKind::FinderBar => true,
        ModuleKind::ClockTrack(on) => on,
        ModuleKind::Data { mapping_row, mapping_col } => {
            grid.get(mapping_row as usize, mapping_col as usize).contains(on_flag)
        }
    }
}

fn paint_module(
    raster: &mut Raster,
    x_min: u32,
    y_min: u32,
    module_size: u32,
    channel: usize,
    value: u8,
) -> Result<(), RasterError> {
    for y in y_min..y_min + module_size {
        for x in x_min..x_min + module_size {
            raster.set_pixel_value(x as i64, y as i64, channel, value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmtx_placement::place_ecc200;

    #[test]
    fn renders_quiet_zone_as_white() {
        let size = SymbolSize::Square10;
        let data_words = (size.mapping_rows() as usize * size.mapping_cols() as usize) / 8;
        let mut grid = MappingGrid::new(size.mapping_rows() as usize, size.mapping_cols() as usize);
        let mut codewords = vec![0xAAu8; data_words];
        place_ecc200(&mut grid, &mut codewords).unwrap();

        let opts = EncodeOptions::default();
        let raster = render_symbol(size, &[(&grid, ModuleFlags::ON, 0)], &opts).unwrap();

        assert_eq!(raster.get_pixel_value(0, 0, 0).unwrap(), 255);
    }

    #[test]
    fn renders_finder_bar_as_black_on_left_and_bottom() {
        let size = SymbolSize::Square10;
        let data_words = (size.mapping_rows() as usize * size.mapping_cols() as usize) / 8;
        let mut grid = MappingGrid::new(size.mapping_rows() as usize, size.mapping_cols() as usize);
        let mut codewords = vec![0u8; data_words];
        place_ecc200(&mut grid, &mut codewords).unwrap();

        let opts = EncodeOptions { margin_size: 0, module_size: 1, ..EncodeOptions::default() };
        let raster = render_symbol(size, &[(&grid, ModuleFlags::ON, 0)], &opts).unwrap();

        // Left column, bottom row (library y=0) form the solid finder L.
        assert_eq!(raster.get_pixel_value(0, 0, 0).unwrap(), 0);
        assert_eq!(raster.get_pixel_value(5, 0, 0).unwrap(), 0);
    }
}
