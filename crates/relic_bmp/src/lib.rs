//! This library reads and writes the **BMP** images the game stores its artwork in.
//!
//! # BMP Format Documentation
//!
//! Only the subset the game uses is handled: uncompressed images with either 8 bit palette
//! indices or 24 bit colors.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | File header            | 14 bytes: "BM", file size, reserved, pixel array offset    |
//! | 0x000E         | Info header            | 40 bytes or more: dimensions, depth and compression        |
//! | 0x0036         | Palette                | 4 bytes per color (blue, green, red, unused), 8 bit only   |
//! | pixel offset   | Pixel array            | Rows padded to a multiple of 4 bytes                       |
//!
//! A positive height stores the bottom row first, a negative height the top row first. Pixels of
//! 24 bit images are stored as blue, green, red.
//!
//! A [`Bitmap`] always holds its rows top-down without padding and its colors as red, green,
//! blue, whatever order the file used.
//!

pub mod error;
pub mod read;
pub mod types;
pub mod write;

pub use types::{Bitmap, PaletteEntry, PixelFormat};
