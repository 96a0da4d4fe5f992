use pretty_assertions::assert_eq;
use proptest::prelude::*;
use relic_bmp::error::Result;
use relic_bmp::{Bitmap, PaletteEntry, PixelFormat};
use relic_stream::{ByteReader, SeekableReader};
use tracing_test::traced_test;

fn rgb_bitmap() -> impl Strategy<Value = Bitmap> {
    (1u32..9, 1u32..9).prop_flat_map(|(width, height)| {
        prop::collection::vec(any::<u8>(), (width * height * 3) as usize)
            .prop_map(move |pixels| Bitmap::rgb(width, height, pixels).unwrap())
    })
}

fn indexed_bitmap() -> impl Strategy<Value = Bitmap> {
    (1u32..9, 1u32..9, 1usize..=256).prop_flat_map(|(width, height, colors)| {
        (
            prop::collection::vec(
                any::<(u8, u8, u8)>().prop_map(|(r, g, b)| PaletteEntry::rgb(r, g, b)),
                colors,
            ),
            prop::collection::vec(any::<u8>(), (width * height) as usize),
        )
            .prop_map(move |(palette, raw)| {
                let pixels = raw
                    .into_iter()
                    .map(|p| (usize::from(p) % colors) as u8)
                    .collect();
                Bitmap::indexed(width, height, palette, pixels).unwrap()
            })
    })
}

proptest! {
    #[test]
    fn rgb_images_round_trip(bitmap in rgb_bitmap()) {
        let mut bytes = Vec::new();
        bitmap.write(&mut bytes).unwrap();
        prop_assert_eq!(Bitmap::read(&ByteReader::new(bytes)).unwrap(), bitmap);
    }

    #[test]
    fn indexed_images_round_trip(bitmap in indexed_bitmap()) {
        let mut bytes = Vec::new();
        bitmap.write(&mut bytes).unwrap();
        prop_assert_eq!(Bitmap::read(&ByteReader::new(bytes)).unwrap(), bitmap);
    }
}

#[traced_test]
#[test]
fn reads_a_bitmap_embedded_in_a_larger_file() -> Result<()> {
    let bitmap = Bitmap::rgb(3, 2, (0..18).collect())?;
    let mut image = Vec::new();
    bitmap.write(&mut image)?;

    let mut container = vec![0xEE; 100];
    container.extend_from_slice(&image);
    container.extend_from_slice(&[0xEE; 100]);

    let root = ByteReader::new(container);
    let embedded = root.slice(100, image.len() as u64)?;

    let read = Bitmap::read(&embedded)?;
    assert_eq!(read, bitmap);
    assert_eq!(read.format(), PixelFormat::Rgb24);
    assert_eq!(read.rgb_at(2, 1), Some([15, 16, 17]));

    Ok(())
}
