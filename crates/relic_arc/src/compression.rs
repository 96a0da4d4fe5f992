//! Entry compression and decompression handling.

use std::fmt;
use std::io::{self, Read, Write};

use binrw::{BinRead, BinWrite};
use crc::{Crc, CRC_32_ISO_HDLC};
use relic_huffman::AdaptiveHuffmanTree;
use relic_stream::{BitReader, BitWriter, BoundedSliceReader, SeekableReader};
use tracing::{debug, instrument};

use crate::error::{Error, Result};

/// Number of symbols in the archive alphabet: every byte value plus [`END_OF_DATA`]
pub const ALPHABET_SIZE: usize = 257;

/// Symbol the encoder emits after the last byte of an entry
pub const END_OF_DATA: u16 = 256;

/// Checksum used for the decompressed contents of every entry
pub(crate) static CHECKSUM: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Identifies the storage format used for an entry inside the archive
///
/// Entries added to the archive can specify their method via [`crate::write::ArchiveWriter::start_file`]
///
#[derive(BinRead, BinWrite, Debug, Copy, Clone, Default, PartialEq, Eq)]
#[brw(repr=u32)]
pub enum CompressionMethod {
    /// Stores the data as it is
    None = 0,

    /// Compress the data with the adaptive Huffman code
    #[default]
    Huffman = 1,
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionMethod::None => f.write_str("stored"),
            CompressionMethod::Huffman => f.write_str("huffman"),
        }
    }
}

/// Decides when a decoding session has produced all of its output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopCondition {
    /// Number of bytes the entry holds once decompressed
    pub size_hint: usize,

    /// Symbol that terminates the stream, if the format uses one
    pub end_symbol: Option<u16>,
}

impl StopCondition {
    /// Stop condition for an archive entry of `size` bytes
    pub fn archive_entry(size: usize) -> Self {
        Self {
            size_hint: size,
            end_symbol: Some(END_OF_DATA),
        }
    }
}

/// Decodes the bytes of a single Huffman coded entry
///
/// Every decoded symbol updates the tree, mirroring the encoder. Decoding ends once the
/// [`StopCondition`] is met; running out of bits first surfaces as an
/// [`relic_stream::error::Error::EndOfStream`].
pub struct ArchiveEntryDecoder<R> {
    bits: BitReader<R>,
    tree: AdaptiveHuffmanTree,
    stop: StopCondition,
    produced: usize,
    finished: bool,
}

impl<R: SeekableReader> ArchiveEntryDecoder<R> {
    /// Start a decoding session over the stored bytes of an entry
    pub fn new(stored: R, stop: StopCondition) -> Result<Self> {
        Ok(Self {
            bits: BitReader::new(stored),
            tree: AdaptiveHuffmanTree::new(ALPHABET_SIZE)?,
            stop,
            produced: 0,
            finished: false,
        })
    }

    /// Number of bytes decoded so far
    pub fn produced(&self) -> usize {
        self.produced
    }

    /// Decode the next byte, or `None` once the stop condition has fired
    pub fn next_byte(&mut self) -> Result<Option<u8>> {
        if self.finished {
            return Ok(None);
        }
        if self.produced == self.stop.size_hint {
            self.finished = true;
            return Ok(None);
        }

        let symbol = self.tree.decode(&mut self.bits)?;
        self.tree.update(symbol)?;

        if Some(symbol) == self.stop.end_symbol {
            self.finished = true;
            return Err(Error::CorruptData(format!(
                "end of data after {} of {} bytes",
                self.produced, self.stop.size_hint
            )));
        }

        let byte = u8::try_from(symbol)
            .map_err(|_| Error::CorruptData(format!("symbol {symbol} is not a byte")))?;
        self.produced += 1;

        Ok(Some(byte))
    }

    /// Decode everything up to the stop condition
    #[instrument(skip(self), err)]
    pub fn decode_to_end(mut self) -> Result<Vec<u8>> {
        // every symbol takes at least one bit
        let bits = usize::try_from(self.bits.bits_remaining()).unwrap_or(usize::MAX);
        let mut out = Vec::with_capacity(self.stop.size_hint.min(bits));
        while let Some(byte) = self.next_byte()? {
            out.push(byte);
        }
        debug!(
            bytes = out.len(),
            bits = self.bits.bits_read(),
            "decoded entry"
        );
        Ok(out)
    }
}

impl<R: SeekableReader> Read for ArchiveEntryDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.next_byte()? {
                Some(byte) => {
                    buf[filled] = byte;
                    filled += 1;
                }
                None => break,
            }
        }
        Ok(filled)
    }
}

/// Encodes the bytes of a single entry with the adaptive Huffman code
///
/// Bytes written are coded immediately, [`ArchiveEntryEncoder::finish`] appends
/// [`END_OF_DATA`] and pads the last byte.
pub struct ArchiveEntryEncoder<W: Write> {
    bits: BitWriter<W>,
    tree: AdaptiveHuffmanTree,
    consumed: u64,
}

impl<W: Write> ArchiveEntryEncoder<W> {
    /// Start an encoding session writing to `writer`
    pub fn new(writer: W) -> Result<Self> {
        Ok(Self {
            bits: BitWriter::new(writer),
            tree: AdaptiveHuffmanTree::new(ALPHABET_SIZE)?,
            consumed: 0,
        })
    }

    /// Number of bytes encoded so far
    pub fn total_in(&self) -> u64 {
        self.consumed
    }

    fn push(&mut self, symbol: u16) -> Result<()> {
        self.tree.encode(symbol, &mut self.bits)?;
        self.tree.update(symbol)?;
        Ok(())
    }

    /// Terminate the stream and return the writer
    #[instrument(skip(self), err)]
    pub fn finish(mut self) -> Result<W> {
        self.push(END_OF_DATA)?;
        debug!(
            bytes = self.consumed,
            bits = self.bits.bits_written(),
            "encoded entry"
        );
        Ok(self.bits.finish()?)
    }
}

impl<W: Write> Write for ArchiveEntryEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            self.push(u16::from(byte))?;
            self.consumed += 1;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Huffman code `data` into a new buffer
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ArchiveEntryEncoder::new(Vec::with_capacity(data.len() / 2))?;
    encoder.write_all(data)?;
    encoder.finish()
}

/// Decode `size` bytes from a Huffman coded stream
pub fn decompress<R: SeekableReader>(stored: R, size: usize) -> Result<Vec<u8>> {
    ArchiveEntryDecoder::new(stored, StopCondition::archive_entry(size))?.decode_to_end()
}

pub(crate) enum ArchiveBlockReader<'a, R: SeekableReader> {
    Raw(BoundedSliceReader<'a, R>),
    Compressed(Box<ArchiveEntryDecoder<BoundedSliceReader<'a, R>>>),
}

impl<'a, R: SeekableReader> ArchiveBlockReader<'a, R> {
    #[instrument(skip(stored))]
    pub fn new(
        stored: BoundedSliceReader<'a, R>,
        size: u64,
        compression: CompressionMethod,
    ) -> Result<Self> {
        Ok(match compression {
            CompressionMethod::None => ArchiveBlockReader::Raw(stored),
            CompressionMethod::Huffman => {
                let size = usize::try_from(size)
                    .map_err(|_| Error::CorruptData(format!("entry size {size} is too large")))?;
                ArchiveBlockReader::Compressed(Box::new(ArchiveEntryDecoder::new(
                    stored,
                    StopCondition::archive_entry(size),
                )?))
            }
        })
    }

    #[instrument(skip(self), err)]
    pub fn read_all(self) -> Result<Vec<u8>> {
        match self {
            ArchiveBlockReader::Raw(mut r) => {
                let mut out = Vec::new();
                r.read_to_end(&mut out)?;
                Ok(out)
            }
            ArchiveBlockReader::Compressed(r) => r.decode_to_end(),
        }
    }
}

impl<R: SeekableReader> Read for ArchiveBlockReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            ArchiveBlockReader::Raw(r) => r.read(buf),
            ArchiveBlockReader::Compressed(r) => r.read(buf),
        }
    }
}
