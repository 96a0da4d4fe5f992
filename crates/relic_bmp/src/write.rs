//! Writing bitmaps as BMP files
//!

use std::io::{Cursor, Write};

use binrw::BinWrite;
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::types::{
    Bitmap, BitmapFileHeader, BitmapInfoHeader, PixelFormat, BI_RGB, FILE_HEADER_SIZE,
    INFO_HEADER_SIZE, PALETTE_ENTRY_SIZE,
};

/// 72 DPI
const PIXELS_PER_METER: i32 = 2835;

impl Bitmap {
    /// Headers this bitmap is written with
    pub fn headers(&self) -> Result<(BitmapFileHeader, BitmapInfoHeader)> {
        let mut info = BitmapInfoHeader {
            header_size: INFO_HEADER_SIZE as u32,
            width: self.width as i32,
            height: self.height as i32,
            planes: 1,
            bit_count: self.format.bit_count(),
            compression: BI_RGB,
            image_size: 0,
            x_pixels_per_meter: PIXELS_PER_METER,
            y_pixels_per_meter: PIXELS_PER_METER,
            colors_used: self.palette.len() as u32,
            colors_important: 0,
        };

        let too_large = || Error::InvalidBitmap("image does not fit a BMP file".to_owned());
        let image_size = info
            .row_stride()
            .checked_mul(u64::from(self.height))
            .ok_or_else(too_large)?;
        let pixel_offset =
            FILE_HEADER_SIZE + INFO_HEADER_SIZE + self.palette.len() as u64 * PALETTE_ENTRY_SIZE;

        info.image_size = u32::try_from(image_size).map_err(|_| too_large())?;
        let file = BitmapFileHeader {
            file_size: u32::try_from(pixel_offset + image_size).map_err(|_| too_large())?,
            reserved: 0,
            pixel_offset: pixel_offset as u32,
        };

        Ok((file, info))
    }

    /// Write the bitmap as a bottom-up BMP file with padded rows
    #[instrument(skip(self, writer), fields(width = self.width, height = self.height), err)]
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        let (file, info) = self.headers()?;

        let mut header_block = Cursor::new(Vec::new());
        file.write(&mut header_block)?;
        info.write(&mut header_block)?;
        for entry in &self.palette {
            entry.write(&mut header_block)?;
        }
        writer.write_all(header_block.get_ref())?;

        let row_len = self.width as usize * self.format.bytes_per_pixel();
        let mut row = vec![0u8; info.row_stride() as usize];
        for source in self.pixels.chunks_exact(row_len).rev() {
            match self.format {
                PixelFormat::Indexed8 => row[..row_len].copy_from_slice(source),
                PixelFormat::Rgb24 => {
                    for (rgb, bgr) in source.chunks_exact(3).zip(row.chunks_exact_mut(3)) {
                        bgr.copy_from_slice(&[rgb[2], rgb[1], rgb[0]]);
                    }
                }
            }
            writer.write_all(&row)?;
        }

        debug!(bytes = file.file_size, "wrote bitmap");
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_str_eq;
    use tracing_test::traced_test;

    use crate::error::Result;
    use crate::types::{Bitmap, PaletteEntry};

    #[traced_test]
    #[test]
    fn write_rgb() -> Result<()> {
        #[rustfmt::skip]
        let expected = [
            // File header
            0x42, 0x4D,
            0x46, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x36, 0x00, 0x00, 0x00,
            // Info header
            0x28, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            0x01, 0x00,
            0x18, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x10, 0x00, 0x00, 0x00,
            0x13, 0x0B, 0x00, 0x00,
            0x13, 0x0B, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            // Bottom row: blue, white
            0xFF, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x00,
            // Top row: red, green
            0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0x00, 0x00,
        ];

        #[rustfmt::skip]
        let bitmap = Bitmap::rgb(2, 2, vec![
            0xFF, 0x00, 0x00, 0x00, 0xFF, 0x00,
            0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
        ])?;

        let mut actual = Vec::new();
        bitmap.write(&mut actual)?;
        assert_str_eq!(format!("{:02X?}", actual), format!("{:02X?}", expected));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn write_indexed() -> Result<()> {
        #[rustfmt::skip]
        let expected = [
            // File header
            0x42, 0x4D,
            0x42, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x3E, 0x00, 0x00, 0x00,
            // Info header
            0x28, 0x00, 0x00, 0x00,
            0x03, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x01, 0x00,
            0x08, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0x00,
            0x13, 0x0B, 0x00, 0x00,
            0x13, 0x0B, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            // Palette
            0x00, 0x00, 0x00, 0x00,
            0x10, 0x20, 0x30, 0x00,
            // Pixels
            0x01, 0x00, 0x01, 0x00,
        ];

        let palette = vec![PaletteEntry::rgb(0, 0, 0), PaletteEntry::rgb(0x30, 0x20, 0x10)];
        let bitmap = Bitmap::indexed(3, 1, palette, vec![1, 0, 1])?;

        let mut actual = Vec::new();
        bitmap.write(&mut actual)?;
        assert_str_eq!(format!("{:02X?}", actual), format!("{:02X?}", expected));

        Ok(())
    }
}
