//! Base types for the structure of a BMP file.

use binrw::{BinRead, BinWrite};

use crate::error::{Error, Result};

/// Size in bytes of [`BitmapFileHeader`] once written
pub const FILE_HEADER_SIZE: u64 = 14;

/// Size in bytes of [`BitmapInfoHeader`] once written
pub const INFO_HEADER_SIZE: u64 = 40;

/// Size in bytes of one [`PaletteEntry`]
pub const PALETTE_ENTRY_SIZE: u64 = 4;

/// Compression value of an uncompressed image
pub const BI_RGB: u32 = 0;

/// BMP file header
///
/// Always starts with "BM". All data is stored in little endian format
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(magic = b"BM", little)]
pub struct BitmapFileHeader {
    /// Size of the whole file in bytes
    pub file_size: u32,

    /// Unused, written as zero
    pub reserved: u32,

    /// Offset from the start of the file to the pixel array
    pub pixel_offset: u32,
}

/// BMP info header
///
/// Later header versions extend this one, their extra fields are skipped.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct BitmapInfoHeader {
    /// Size of the info header, at least [`INFO_HEADER_SIZE`]
    pub header_size: u32,

    /// Width of the image in pixels
    pub width: i32,

    /// Height of the image in pixels, negative for images stored top-down
    pub height: i32,

    /// Number of color planes, always `1`
    pub planes: u16,

    /// Bits per pixel
    pub bit_count: u16,

    /// Compression of the pixel array, [`BI_RGB`] for none
    pub compression: u32,

    /// Size of the pixel array, may be zero for uncompressed images
    pub image_size: u32,

    /// Horizontal resolution in pixels per meter
    pub x_pixels_per_meter: i32,

    /// Vertical resolution in pixels per meter
    pub y_pixels_per_meter: i32,

    /// Number of palette entries, zero meaning the maximum for the depth
    pub colors_used: u32,

    /// Number of palette entries needed to display the image
    pub colors_important: u32,
}

impl BitmapInfoHeader {
    /// Whether the first row of the pixel array is the top of the image
    pub fn is_top_down(&self) -> bool {
        self.height < 0
    }

    /// Height of the image regardless of row order
    pub fn abs_height(&self) -> u32 {
        self.height.unsigned_abs()
    }

    /// Bytes per row of the pixel array, including padding to four bytes
    pub fn row_stride(&self) -> u64 {
        let bits = u64::from(self.width.unsigned_abs()) * u64::from(self.bit_count);
        bits.div_ceil(32) * 4
    }

    /// Number of palette entries stored after the info header
    pub fn palette_len(&self) -> Result<usize> {
        if self.bit_count > 8 {
            return Ok(0);
        }

        let max = 1usize << self.bit_count;
        match self.colors_used as usize {
            0 => Ok(max),
            n if n <= max => Ok(n),
            n => Err(Error::InvalidBitmap(format!(
                "{n} palette entries for a {} bit image",
                self.bit_count
            ))),
        }
    }
}

/// One palette color, stored as blue, green, red and an unused byte
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[brw(little)]
pub struct PaletteEntry {
    /// Blue intensity
    pub blue: u8,
    /// Green intensity
    pub green: u8,
    /// Red intensity
    pub red: u8,
    /// Unused, written as zero
    pub reserved: u8,
}

impl PaletteEntry {
    /// Palette entry for an RGB color
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            blue,
            green,
            red,
            reserved: 0,
        }
    }

    /// The color as `[red, green, blue]`
    pub const fn to_rgb(self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }
}

/// How the pixels of a [`Bitmap`] are laid out
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PixelFormat {
    /// One byte per pixel indexing the palette
    Indexed8,

    /// Three bytes per pixel in red, green, blue order
    Rgb24,
}

impl PixelFormat {
    /// Bytes used by one pixel
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Indexed8 => 1,
            PixelFormat::Rgb24 => 3,
        }
    }

    /// Bits per pixel as stored in the file
    pub const fn bit_count(self) -> u16 {
        match self {
            PixelFormat::Indexed8 => 8,
            PixelFormat::Rgb24 => 24,
        }
    }
}

/// A decoded image
///
/// Pixels are kept top-down, row after row, without padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) format: PixelFormat,
    pub(crate) palette: Vec<PaletteEntry>,
    pub(crate) pixels: Vec<u8>,
}

impl Bitmap {
    /// An 8 bit image whose pixels index `palette`
    pub fn indexed(
        width: u32,
        height: u32,
        palette: Vec<PaletteEntry>,
        pixels: Vec<u8>,
    ) -> Result<Self> {
        if palette.is_empty() || palette.len() > 256 {
            return Err(Error::InvalidBitmap(format!(
                "{} palette entries",
                palette.len()
            )));
        }
        if let Some(index) = pixels.iter().find(|&&p| usize::from(p) >= palette.len()) {
            return Err(Error::InvalidBitmap(format!(
                "pixel index {index} outside of a palette of {}",
                palette.len()
            )));
        }
        Self::checked(width, height, PixelFormat::Indexed8, palette, pixels)
    }

    /// A 24 bit image, pixels given as red, green, blue
    pub fn rgb(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        Self::checked(width, height, PixelFormat::Rgb24, Vec::new(), pixels)
    }

    pub(crate) fn checked(
        width: u32,
        height: u32,
        format: PixelFormat,
        palette: Vec<PaletteEntry>,
        pixels: Vec<u8>,
    ) -> Result<Self> {
        if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(Error::InvalidBitmap(format!(
                "dimensions {width}x{height}"
            )));
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(format.bytes_per_pixel()))
            .ok_or_else(|| Error::InvalidBitmap(format!("dimensions {width}x{height}")))?;
        if pixels.len() != expected {
            return Err(Error::InvalidBitmap(format!(
                "{} pixel bytes for a {width}x{height} image, expected {expected}",
                pixels.len()
            )));
        }

        Ok(Self {
            width,
            height,
            format,
            palette,
            pixels,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Layout of [`Bitmap::pixels`]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Palette of an indexed image, empty otherwise
    pub fn palette(&self) -> &[PaletteEntry] {
        &self.palette
    }

    /// Pixel data, top row first
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Color of the pixel at column `x` of row `y`, counted from the top
    pub fn rgb_at(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let index = (y as usize * self.width as usize + x as usize) * self.format.bytes_per_pixel();
        match self.format {
            PixelFormat::Indexed8 => self
                .palette
                .get(usize::from(self.pixels[index]))
                .map(|entry| entry.to_rgb()),
            PixelFormat::Rgb24 => Some([
                self.pixels[index],
                self.pixels[index + 1],
                self.pixels[index + 2],
            ]),
        }
    }
}
