//! Reading BMP files out of any [`SeekableReader`]
//!

use binrw::BinRead;
use relic_stream::SeekableReader;
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::types::{
    Bitmap, BitmapFileHeader, BitmapInfoHeader, PaletteEntry, PixelFormat, BI_RGB,
    FILE_HEADER_SIZE, INFO_HEADER_SIZE, PALETTE_ENTRY_SIZE,
};

impl Bitmap {
    /// Read a bitmap from `reader`
    ///
    /// Every region of the file is read through its own slice, so the reader can itself be a
    /// slice of a larger file such as an archive entry.
    ///
    /// ```
    /// use relic_bmp::Bitmap;
    /// use relic_stream::ByteReader;
    ///
    /// let image = Bitmap::rgb(1, 1, vec![0x10, 0x20, 0x30])?;
    /// let mut bytes = Vec::new();
    /// image.write(&mut bytes)?;
    ///
    /// let read = Bitmap::read(&ByteReader::new(bytes))?;
    /// assert_eq!(read.rgb_at(0, 0), Some([0x10, 0x20, 0x30]));
    /// # Ok::<(), relic_bmp::error::Error>(())
    /// ```
    #[instrument(skip(reader), err)]
    pub fn read<R: SeekableReader>(reader: &R) -> Result<Self> {
        let file_header = BitmapFileHeader::read(&mut reader.slice(0, FILE_HEADER_SIZE)?)?;

        let mut size_reader = reader.slice(FILE_HEADER_SIZE, 4)?;
        let header_size = u64::from(u32::read_le(&mut size_reader)?);
        if header_size < INFO_HEADER_SIZE {
            return Err(Error::Unsupported(format!(
                "{header_size} byte info header"
            )));
        }
        let info = BitmapInfoHeader::read(&mut reader.slice(FILE_HEADER_SIZE, header_size)?)?;
        debug!(?file_header, ?info, "read bitmap headers");

        let format = match (info.bit_count, info.compression) {
            (_, compression) if compression != BI_RGB => {
                return Err(Error::Unsupported(format!("compression {compression}")))
            }
            (8, _) => PixelFormat::Indexed8,
            (24, _) => PixelFormat::Rgb24,
            (bit_count, _) => return Err(Error::Unsupported(format!("{bit_count} bit pixels"))),
        };
        if info.planes != 1 {
            return Err(Error::InvalidBitmap(format!("{} color planes", info.planes)));
        }
        if info.width <= 0 || info.height == 0 {
            return Err(Error::InvalidBitmap(format!(
                "dimensions {}x{}",
                info.width, info.height
            )));
        }

        let palette = Self::read_palette(reader, &info, FILE_HEADER_SIZE + header_size)?;
        let pixels = Self::read_pixels(reader, &info, &file_header, format)?;

        let width = info.width.unsigned_abs();
        let height = info.abs_height();
        match format {
            PixelFormat::Indexed8 => Self::indexed(width, height, palette, pixels),
            PixelFormat::Rgb24 => Self::checked(width, height, format, palette, pixels),
        }
    }

    fn read_palette<R: SeekableReader>(
        reader: &R,
        info: &BitmapInfoHeader,
        start: u64,
    ) -> Result<Vec<PaletteEntry>> {
        let count = info.palette_len()?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut palette_reader = reader
            .slice(start, count as u64 * PALETTE_ENTRY_SIZE)
            .map_err(|e| Error::InvalidBitmap(format!("palette: {e}")))?;

        (0..count)
            .map(|_| PaletteEntry::read(&mut palette_reader).map_err(Error::from))
            .collect()
    }

    fn read_pixels<R: SeekableReader>(
        reader: &R,
        info: &BitmapInfoHeader,
        file_header: &BitmapFileHeader,
        format: PixelFormat,
    ) -> Result<Vec<u8>> {
        let width = info.width.unsigned_abs() as usize;
        let height = info.abs_height() as usize;
        let stride = info.row_stride();

        let size = stride
            .checked_mul(height as u64)
            .ok_or_else(|| Error::InvalidBitmap(format!("{height} rows of {stride} bytes")))?;
        let pixel_reader = reader
            .slice(u64::from(file_header.pixel_offset), size)
            .map_err(|e| Error::InvalidBitmap(format!("pixel array: {e}")))?;

        let row_len = width * format.bytes_per_pixel();
        let mut row = vec![0u8; row_len];
        let mut pixels = Vec::with_capacity(row_len * height);

        for y in 0..height {
            let stored_row = if info.is_top_down() { y } else { height - 1 - y };
            let read = pixel_reader.read_at(stored_row as u64 * stride, &mut row)?;
            if read != row_len {
                return Err(Error::InvalidBitmap(format!("short row {stored_row}")));
            }

            match format {
                PixelFormat::Indexed8 => pixels.extend_from_slice(&row),
                PixelFormat::Rgb24 => {
                    for bgr in row.chunks_exact(3) {
                        pixels.extend_from_slice(&[bgr[2], bgr[1], bgr[0]]);
                    }
                }
            }
        }

        Ok(pixels)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use relic_stream::ByteReader;
    use tracing_test::traced_test;

    use crate::error::{Error, Result};
    use crate::types::{Bitmap, PaletteEntry, PixelFormat};

    /// 2x2, 24 bit, bottom-up
    #[rustfmt::skip]
    const RGB_2X2: [u8; 70] = [
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

    #[traced_test]
    #[test]
    fn read_bottom_up_rgb() -> Result<()> {
        let bitmap = Bitmap::read(&ByteReader::new(RGB_2X2))?;

        assert_eq!(bitmap.width(), 2);
        assert_eq!(bitmap.height(), 2);
        assert_eq!(bitmap.format(), PixelFormat::Rgb24);
        assert_eq!(
            bitmap.pixels(),
            &[
                0xFF, 0x00, 0x00, 0x00, 0xFF, 0x00, //
                0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
            ]
        );

        Ok(())
    }

    #[test]
    fn read_top_down_rgb() -> Result<()> {
        let mut input = RGB_2X2;
        // height -2
        input[22..26].copy_from_slice(&(-2i32).to_le_bytes());

        let bitmap = Bitmap::read(&ByteReader::new(input))?;
        assert_eq!(bitmap.rgb_at(0, 0), Some([0x00, 0x00, 0xFF]));
        assert_eq!(bitmap.rgb_at(1, 1), Some([0x00, 0xFF, 0x00]));

        Ok(())
    }

    #[test]
    fn read_indexed_with_small_palette() -> Result<()> {
        #[rustfmt::skip]
        let input = [
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
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            // Palette
            0x00, 0x00, 0x00, 0x00,
            0x10, 0x20, 0x30, 0x00,
            // Pixels
            0x01, 0x00, 0x01, 0x00,
        ];

        let bitmap = Bitmap::read(&ByteReader::new(input))?;
        assert_eq!(bitmap.format(), PixelFormat::Indexed8);
        assert_eq!(
            bitmap.palette(),
            &[PaletteEntry::rgb(0, 0, 0), PaletteEntry::rgb(0x30, 0x20, 0x10)]
        );
        assert_eq!(bitmap.pixels(), &[1, 0, 1]);
        assert_eq!(bitmap.rgb_at(0, 0), Some([0x30, 0x20, 0x10]));

        Ok(())
    }

    #[test]
    fn compressed_images_are_unsupported() {
        let mut input = RGB_2X2;
        // BI_RLE8
        input[30] = 0x01;

        let result = Bitmap::read(&ByteReader::new(input));
        assert!(matches!(result, Err(Error::Unsupported(_))));
    }

    #[test]
    fn other_depths_are_unsupported() {
        let mut input = RGB_2X2;
        input[28] = 0x20;

        let result = Bitmap::read(&ByteReader::new(input));
        assert!(matches!(result, Err(Error::Unsupported(_))));
    }

    #[test]
    fn truncated_pixels_are_invalid() {
        let input = &RGB_2X2[..60];

        let result = Bitmap::read(&ByteReader::new(input));
        assert!(matches!(result, Err(Error::InvalidBitmap(_))));
    }

    #[test]
    fn zero_width_is_invalid() {
        let mut input = RGB_2X2;
        input[18..22].copy_from_slice(&0i32.to_le_bytes());

        let result = Bitmap::read(&ByteReader::new(input));
        assert!(matches!(result, Err(Error::InvalidBitmap(_))));
    }

    #[test]
    fn missing_magic_is_an_error() {
        let mut input = RGB_2X2;
        input[0] = b'X';

        assert!(Bitmap::read(&ByteReader::new(input)).is_err());
    }

    #[test]
    fn larger_info_headers_are_skipped() -> Result<()> {
        // a 44 byte info header with four bytes of extra fields
        let mut input = Vec::with_capacity(RGB_2X2.len() + 4);
        input.extend_from_slice(&RGB_2X2[..54]);
        input.extend_from_slice(&[0xAA; 4]);
        input.extend_from_slice(&RGB_2X2[54..]);
        input[10] = 0x3A;
        input[14] = 0x2C;

        let bitmap = Bitmap::read(&ByteReader::new(input))?;
        assert_eq!(bitmap.rgb_at(1, 1), Some([0xFF, 0xFF, 0xFF]));

        Ok(())
    }
}
