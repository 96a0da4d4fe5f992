//! Bit-granular access on top of byte streams
//!
//! Bits are packed most significant bit first. When a [`BitWriter`] is flushed with a partial
//! byte pending, the unused low bits of that byte are written as zeros.

use std::io::Write;

use tracing::instrument;

use crate::{
    error::{Error, Result},
    read::SeekableReader,
};

/// Largest number of bits that can be moved by a single [`BitReader::read_bits`] or
/// [`BitWriter::write_bits`] call
pub const MAX_BITS: u8 = 32;

const BUFFER_SIZE: usize = 4096;

/// Reads individual bits from a [`SeekableReader`]
///
/// Bytes are pulled from the reader in blocks, so the position of the wrapped reader runs ahead
/// of the bits that have been handed out.
#[derive(Debug)]
pub struct BitReader<R> {
    reader: R,
    buffer: Box<[u8]>,
    filled: usize,
    consumed: usize,
    current: u8,
    bits_left: u8,
    bits_read: u64,
}

impl<R: SeekableReader> BitReader<R> {
    /// Start reading bits at the reader's current position
    pub fn new(reader: R) -> Self {
        BitReader {
            reader,
            buffer: vec![0u8; BUFFER_SIZE].into_boxed_slice(),
            filled: 0,
            consumed: 0,
            current: 0,
            bits_left: 0,
            bits_read: 0,
        }
    }

    /// Number of bits that can still be read
    pub fn bits_remaining(&self) -> u64 {
        let buffered = (self.filled - self.consumed) as u64;
        let unread = self.reader.remaining().saturating_add(buffered);
        unread
            .saturating_mul(8)
            .saturating_add(u64::from(self.bits_left))
    }

    /// Number of bits handed out so far
    pub fn bits_read(&self) -> u64 {
        self.bits_read
    }

    /// Read a single bit
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.bits_left == 0 {
            self.next_byte()?;
        }

        self.bits_left -= 1;
        self.bits_read += 1;
        Ok((self.current >> self.bits_left) & 1 == 1)
    }

    /// Read `bits` bits as an unsigned value, first bit read ending up most significant
    ///
    /// Fails with [`Error::EndOfStream`] before consuming anything if fewer than `bits` bits
    /// remain.
    pub fn read_bits(&mut self, bits: u8) -> Result<u32> {
        if bits > MAX_BITS {
            return Err(Error::InvalidBitCount {
                bits,
                max_bits: MAX_BITS,
            });
        }

        let available = self.bits_remaining();
        if u64::from(bits) > available {
            return Err(Error::EndOfStream {
                requested: u64::from(bits),
                available,
            });
        }

        let mut value = 0u32;
        for _ in 0..bits {
            value = (value << 1) | u32::from(self.read_bit()?);
        }
        Ok(value)
    }

    /// Unwrap and return the inner reader
    ///
    /// The reader is positioned after the last byte buffered, not after the last bit read.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn next_byte(&mut self) -> Result<()> {
        if self.consumed == self.filled {
            self.filled = self.reader.read_bytes(&mut self.buffer)?;
            self.consumed = 0;

            if self.filled == 0 {
                return Err(Error::EndOfStream {
                    requested: 1,
                    available: 0,
                });
            }
        }

        self.current = self.buffer[self.consumed];
        self.consumed += 1;
        self.bits_left = 8;
        Ok(())
    }
}

/// Writes individual bits to a [`Write`]
///
/// A partially filled byte is only written by [`BitWriter::flush`] or [`BitWriter::finish`];
/// dropping the writer loses it.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    writer: W,
    current: u8,
    bits_used: u8,
    bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Start writing bits to `writer`
    pub fn new(writer: W) -> Self {
        BitWriter {
            writer,
            current: 0,
            bits_used: 0,
            bits_written: 0,
        }
    }

    /// Number of bits written so far, padding excluded
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Get a reference to the underlying writer
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Append a single bit
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.current = (self.current << 1) | u8::from(bit);
        self.bits_used += 1;
        self.bits_written += 1;

        if self.bits_used == 8 {
            self.writer.write_all(&[self.current])?;
            self.current = 0;
            self.bits_used = 0;
        }
        Ok(())
    }

    /// Append the low `bits` bits of `value`, most significant first
    pub fn write_bits(&mut self, value: u32, bits: u8) -> Result<()> {
        if bits > MAX_BITS {
            return Err(Error::InvalidBitCount {
                bits,
                max_bits: MAX_BITS,
            });
        }

        for shift in (0..bits).rev() {
            self.write_bit((value >> shift) & 1 == 1)?;
        }
        Ok(())
    }

    /// Write out any partial byte, zero padded, and flush the underlying writer
    pub fn flush(&mut self) -> Result<()> {
        if self.bits_used > 0 {
            let padded = self.current << (8 - self.bits_used);
            self.writer.write_all(&[padded])?;
            self.current = 0;
            self.bits_used = 0;
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer
    #[instrument(skip(self), err, fields(bits = self.bits_written))]
    pub fn finish(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.writer)
    }
}
