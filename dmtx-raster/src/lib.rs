//! Packed-pixel raster buffer model for Data Matrix encode/decode I/O.
//!
//! A [`Raster`] wraps a caller-owned pixel buffer plus the parameters
//! needed to address it: width/height, [`PixelPacking`], row padding, up to
//! 4 channel descriptors, and an [`ImageFlip`] to reconcile the library's
//! bottom-left-origin coordinate system with however the buffer is actually
//! stored.
//!
//! # Safety
//! Unsafe code is forbidden via a crate-level attribute.

#![forbid(unsafe_code)]

use std::fmt;

use bitflags::bitflags;

/// Maximum channel descriptors a [`Raster`] can carry (libdmtx's
/// `IMAGE_MAX_CHANNEL`).
pub const MAX_CHANNELS: usize = 4;

bitflags! {
    /// How a raster's stored row order relates to the library's
    /// bottom-left-origin coordinate system.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ImageFlip: u8 {
        /// Rows are stored bottom-to-top already, matching the library's
        /// coordinate system with no row remapping needed.
        const Y = 0x01 << 1;
    }
}

/// How pixels are packed into the raster's byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelPacking {
    /// Caller-defined layout; channels must be configured manually via
    /// [`Raster::set_channel`].
    Custom,
    /// 1 bit per pixel, one channel (unsupported: see
    /// [`Raster::new`]'s note).
    OneBppK,
    /// 8 bits per pixel, one 8-bit channel.
    EightBppK,
    /// 16 bits per pixel, packed 5/5/5 RGB.
    SixteenBppRgb,
    SixteenBppRgbX,
    SixteenBppXRgb,
    SixteenBppBgr,
    SixteenBppBgrX,
    SixteenBppXBgr,
    SixteenBppYCbCr,
    /// 24 bits per pixel, 8/8/8 channels.
    TwentyFourBppRgb,
    TwentyFourBppBgr,
    TwentyFourBppYCbCr,
    /// 32 bits per pixel, 8/8/8/8 channels (one channel unused except
    /// CMYK).
    ThirtyTwoBppRgbX,
    ThirtyTwoBppXRgb,
    ThirtyTwoBppBgrX,
    ThirtyTwoBppXBgr,
    ThirtyTwoBppCmyk,
}

impl PixelPacking {
    /// Bits occupied by one pixel in the buffer.
    pub fn bits_per_pixel(self) -> u32 {
        match self {
            Self::Custom => 0,
            Self::OneBppK => 1,
            Self::EightBppK => 8,
            Self::SixteenBppRgb
            | Self::SixteenBppRgbX
            | Self::SixteenBppXRgb
            | Self::SixteenBppBgr
            | Self::SixteenBppBgrX
            | Self::SixteenBppXBgr
            | Self::SixteenBppYCbCr => 16,
            Self::TwentyFourBppRgb | Self::TwentyFourBppBgr | Self::TwentyFourBppYCbCr => 24,
            Self::ThirtyTwoBppRgbX
            | Self::ThirtyTwoBppXRgb
            | Self::ThirtyTwoBppBgrX
            | Self::ThirtyTwoBppXBgr
            | Self::ThirtyTwoBppCmyk => 32,
        }
    }

    /// The channel `(start_bit, bits_per_channel)` list this packing
    /// implies, in storage order. Empty for [`PixelPacking::Custom`], which
    /// requires the caller to configure channels via
    /// [`Raster::set_channel`].
    fn default_channels(self) -> &'static [(u32, u32)] {
        match self {
            Self::Custom => &[],
            Self::OneBppK => &[(0, 1)],
            Self::EightBppK => &[(0, 8)],
            Self::SixteenBppRgb | Self::SixteenBppBgr | Self::SixteenBppYCbCr => {
                &[(0, 5), (5, 5), (10, 5)]
            }
            Self::SixteenBppRgbX | Self::SixteenBppBgrX => &[(0, 5), (5, 5), (10, 5)],
            Self::SixteenBppXRgb | Self::SixteenBppXBgr => &[(1, 5), (6, 5), (11, 5)],
            Self::TwentyFourBppRgb
            | Self::TwentyFourBppBgr
            | Self::TwentyFourBppYCbCr
            | Self::ThirtyTwoBppRgbX
            | Self::ThirtyTwoBppBgrX => &[(0, 8), (8, 8), (16, 8)],
            Self::ThirtyTwoBppXRgb | Self::ThirtyTwoBppXBgr => &[(8, 8), (16, 8), (24, 8)],
            Self::ThirtyTwoBppCmyk => &[(0, 8), (8, 8), (16, 8), (24, 8)],
        }
    }
}

/// Errors from raster construction and pixel access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterError {
    /// Width or height was less than 1.
    InvalidDimensions,
    /// [`PixelPacking::OneBppK`] was requested; unsupported, mirroring the
    /// upstream image constructor which explicitly rejects it.
    OneBppUnsupported,
    /// A channel was added after [`MAX_CHANNELS`] channels already exist.
    TooManyChannels,
    /// `(x, y)` lies outside the raster bounds (with the given margin).
    OutOfBounds,
    /// A channel index was requested that this raster doesn't have.
    NoSuchChannel,
    /// [`Raster::get_pixel_value`]/[`Raster::set_pixel_value`] was called on
    /// a 5-bit channel, which libdmtx declares but never actually reads or
    /// writes (see source note in `dmtximage.c`).
    FiveBitChannelUnsupported,
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::InvalidDimensions => "width and height must each be at least 1",
            Self::OneBppUnsupported => "1 bit-per-pixel packing is not a supported pixel format",
            Self::TooManyChannels => "a raster cannot carry more than 4 channels",
            Self::OutOfBounds => "coordinate is outside the raster bounds",
            Self::NoSuchChannel => "channel index is out of range for this raster",
            Self::FiveBitChannelUnsupported => "5-bit channel access is not implemented",
        };
        write!(f, "{msg}")
    }
}

impl std::error::Error for RasterError {}

/// Result type for this crate's fallible operations.
pub type Result<T> = std::result::Result<T, RasterError>;

/// A channel's bit position within one packed pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Channel {
    start_bit: u32,
    bits: u32,
}

/// A packed-pixel raster buffer plus its addressing parameters.
///
/// Coordinate (0,0) is always the bottom-left pixel in this library's
/// model (spec §6), regardless of how rows are physically stored in
/// `pixels` — [`ImageFlip::Y`] reconciles the two.
#[derive(Debug, Clone)]
pub struct Raster {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    pixel_packing: PixelPacking,
    bits_per_pixel: u32,
    bytes_per_pixel: u32,
    row_pad_bytes: u32,
    row_size_bytes: u32,
    image_flip: ImageFlip,
    channels: Vec<Channel>,
}

impl Raster {
    /// Builds a raster over `pixels`, deriving bytes-per-pixel and the
    /// default channel layout from `pixel_packing`.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, pixel_packing: PixelPacking) -> Result<Self> {
        if width < 1 || height < 1 {
            return Err(RasterError::InvalidDimensions);
        }
        if pixel_packing == PixelPacking::OneBppK {
            return Err(RasterError::OneBppUnsupported);
        }

        let bits_per_pixel = pixel_packing.bits_per_pixel();
        let bytes_per_pixel = bits_per_pixel / 8;
        let row_size_bytes = width * bytes_per_pixel;

        let mut raster = Self {
            pixels,
            width,
            height,
            pixel_packing,
            bits_per_pixel,
            bytes_per_pixel,
            row_pad_bytes: 0,
            row_size_bytes,
            image_flip: ImageFlip::empty(),
            channels: Vec::with_capacity(MAX_CHANNELS),
        };

        for &(start_bit, bits) in pixel_packing.default_channels() {
            raster.set_channel(start_bit, bits)?;
        }

        Ok(raster)
    }

    /// Registers one more channel, in storage order. Mirrors
    /// `dmtxImageSetChannel`.
    pub fn set_channel(&mut self, start_bit: u32, bits: u32) -> Result<()> {
        if self.channels.len() >= MAX_CHANNELS {
            return Err(RasterError::TooManyChannels);
        }
        self.channels.push(Channel { start_bit, bits });
        Ok(())
    }

    /// Sets `row_pad_bytes`, recomputing `row_size_bytes` from it.
    pub fn set_row_pad_bytes(&mut self, row_pad_bytes: u32) {
        self.row_pad_bytes = row_pad_bytes;
        self.row_size_bytes = self.width * self.bytes_per_pixel + row_pad_bytes;
    }

    /// Sets the image flip mode.
    pub fn set_image_flip(&mut self, image_flip: ImageFlip) {
        self.image_flip = image_flip;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_packing(&self) -> PixelPacking {
        self.pixel_packing
    }

    pub fn bits_per_pixel(&self) -> u32 {
        self.bits_per_pixel
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        self.bytes_per_pixel
    }

    pub fn row_pad_bytes(&self) -> u32 {
        self.row_pad_bytes
    }

    pub fn row_size_bytes(&self) -> u32 {
        self.row_size_bytes
    }

    pub fn image_flip(&self) -> ImageFlip {
        self.image_flip
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Raw pixel buffer, for callers that want to populate it directly
    /// (e.g. an encoder writing rendered symbol pixels).
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Raw pixel buffer, read-only.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Byte offset of pixel `(x, y)`'s first byte, per spec §6:
    /// `(flip_y ? y : height-1-y) * row_size_bytes + x * bytes_per_pixel`.
    /// Mirrors `dmtxImageGetByteOffset`.
    pub fn byte_offset(&self, x: i64, y: i64) -> Result<usize> {
        if !self.contains_int(0, x, y) {
            return Err(RasterError::OutOfBounds);
        }

        let row = if self.image_flip.contains(ImageFlip::Y) {
            y as u32
        } else {
            self.height - 1 - y as u32
        };

        Ok((row * self.row_size_bytes + x as u32 * self.bytes_per_pixel) as usize)
    }

    /// Whether `(x, y)` lies within the raster, shrunk inward by `margin`
    /// pixels on every side. Mirrors `dmtxImageContainsInt`.
    pub fn contains_int(&self, margin: i64, x: i64, y: i64) -> bool {
        x - margin >= 0
            && x + margin < self.width as i64
            && y - margin >= 0
            && y + margin < self.height as i64
    }

    /// Floating-point variant of [`Raster::contains_int`] with no margin,
    /// used by the sub-pixel region locator. Mirrors
    /// `dmtxImageContainsFloat`.
    pub fn contains_float(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && x < self.width as f64 && y >= 0.0 && y < self.height as f64
    }

    /// Reads `channel`'s value (0..255) at `(x, y)`. Only 8-bit channels are
    /// implemented, matching libdmtx (5-bit channels are declared in the
    /// packing tables but the reference reader never actually decodes
    /// them).
    pub fn get_pixel_value(&self, x: i64, y: i64, channel: usize) -> Result<u8> {
        let ch = *self.channels.get(channel).ok_or(RasterError::NoSuchChannel)?;
        let offset = self.byte_offset(x, y)?;

        match ch.bits {
            8 => Ok(self.pixels[offset + channel]),
            _ => Err(RasterError::FiveBitChannelUnsupported),
        }
    }

    /// Writes `value` into `channel` at `(x, y)`. See
    /// [`Raster::get_pixel_value`] for the 8-bit-only restriction.
    pub fn set_pixel_value(&mut self, x: i64, y: i64, channel: usize, value: u8) -> Result<()> {
        let ch = *self.channels.get(channel).ok_or(RasterError::NoSuchChannel)?;
        let offset = self.byte_offset(x, y)?;

        match ch.bits {
            8 => {
                self.pixels[offset + channel] = value;
                Ok(())
            }
            _ => Err(RasterError::FiveBitChannelUnsupported),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_offset_without_flip_reads_bottom_up() {
        let raster = Raster::new(vec![0u8; 3 * 2], 3, 2, PixelPacking::EightBppK).unwrap();
        assert_eq!(raster.byte_offset(0, 0).unwrap(), 3);
        assert_eq!(raster.byte_offset(0, 1).unwrap(), 0);
    }

    #[test]
    fn byte_offset_with_flip_y_reads_top_down() {
        let mut raster = Raster::new(vec![0u8; 3 * 2], 3, 2, PixelPacking::EightBppK).unwrap();
        raster.set_image_flip(ImageFlip::Y);
        assert_eq!(raster.byte_offset(0, 0).unwrap(), 0);
        assert_eq!(raster.byte_offset(0, 1).unwrap(), 3);
    }

    #[test]
    fn one_bpp_is_rejected() {
        assert_eq!(
            Raster::new(vec![0u8; 1], 8, 1, PixelPacking::OneBppK),
            Err(RasterError::OneBppUnsupported)
        );
    }

    #[test]
    fn set_and_get_pixel_value_round_trips() {
        let mut raster = Raster::new(vec![0u8; 4 * 4 * 3], 4, 4, PixelPacking::TwentyFourBppRgb)
            .unwrap();
        raster.set_pixel_value(1, 2, 0, 200).unwrap();
        assert_eq!(raster.get_pixel_value(1, 2, 0).unwrap(), 200);
    }

    #[test]
    fn out_of_bounds_pixel_is_rejected() {
        let raster = Raster::new(vec![0u8; 4 * 4], 4, 4, PixelPacking::EightBppK).unwrap();
        assert_eq!(raster.get_pixel_value(10, 0, 0), Err(RasterError::OutOfBounds));
    }
}
