//! Types for writing archives
//!

use binrw::BinWrite;
use bon::Builder;
use std::io::{self, Cursor, Write};
use tracing::{debug, instrument, Level};

use crate::compression::{self, CompressionMethod, CHECKSUM};
use crate::error::{Error, Result};
use crate::types::{ArchiveHeader, ArchiveRecord, HEADER_SIZE};

/// Options for how the archive should be written
#[derive(Debug, Clone, Copy, Builder)]
pub struct ArchiveWriterOptions {
    /// Store an entry as it is when Huffman coding would not make it smaller
    #[builder(default = true)]
    pub store_incompressible: bool,
}

impl Default for ArchiveWriterOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug)]
struct PendingEntry {
    compression: CompressionMethod,
    name_offset: u32,
    data: Vec<u8>,
}

/// Archive generator
///
/// ```
/// # fn doit() -> relic_arc::error::Result<()>
/// # {
/// # use relic_arc::ArchiveWriter;
/// use std::io::Write;
/// use relic_arc::write::ArchiveWriterOptions;
///
/// // We use a buffer here, though you'd normally use a `File`
/// let mut archive = ArchiveWriter::new(Vec::new(), ArchiveWriterOptions::builder()
///            .store_incompressible(false)
///            .build());
///
/// archive.start_file("hello_world.txt", relic_arc::CompressionMethod::Huffman)?;
/// archive.write_all(b"Hello, World!")?;
///
/// // Apply the changes you've made.
/// let bytes = archive.finish()?;
/// assert_eq!(&bytes[..4], b"RLCA");
///
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct ArchiveWriter<W: Write> {
    inner: W,
    options: ArchiveWriterOptions,
    current: Option<PendingEntry>,
    data_block: Vec<u8>,
    name_block: Vec<u8>,
    records: Vec<ArchiveRecord>,
}

fn offset_u32(value: u64) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::ArchiveTooLarge)
}

impl<W: Write> ArchiveWriter<W> {
    /// Initializes the archive.
    ///
    /// Before writing to this object, the [`ArchiveWriter::start_file`] function should be called.
    pub fn new(inner: W, options: ArchiveWriterOptions) -> ArchiveWriter<W> {
        ArchiveWriter {
            inner,
            options,
            current: None,
            data_block: Vec::new(),
            name_block: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Returns true if a file is currently open for writing.
    pub const fn is_writing_file(&self) -> bool {
        self.current.is_some()
    }

    /// Start a new file with the requested compression.
    ///
    /// Any file still open is finished first.
    #[instrument(skip(self, name), fields(name = %name.to_string()), err)]
    pub fn start_file(
        &mut self,
        name: impl ToString,
        compression: CompressionMethod,
    ) -> Result<()> {
        if self.current.is_some() {
            self.finish_file()?;
        }

        let name = name.to_string();
        if name.as_bytes().contains(&0) {
            return Err(Error::InvalidName(name));
        }

        let name_offset = offset_u32(self.name_block.len() as u64)?;
        self.name_block.extend_from_slice(name.as_bytes());
        self.name_block.push(0);

        self.current = Some(PendingEntry {
            compression,
            name_offset,
            data: Vec::new(),
        });

        Ok(())
    }

    /// Finish the open file, compressing its data
    #[instrument(skip(self), err)]
    pub fn finish_file(&mut self) -> Result<()> {
        let Some(entry) = self.current.take() else {
            return Ok(());
        };

        let crc32 = CHECKSUM.checksum(&entry.data);
        let (method, stored) = match entry.compression {
            CompressionMethod::None => (CompressionMethod::None, entry.data.clone()),
            CompressionMethod::Huffman => {
                let packed = compression::compress(&entry.data)?;
                if self.options.store_incompressible && packed.len() >= entry.data.len() {
                    debug!(
                        size = entry.data.len(),
                        packed = packed.len(),
                        "storing incompressible entry"
                    );
                    (CompressionMethod::None, entry.data.clone())
                } else {
                    (CompressionMethod::Huffman, packed)
                }
            }
        };

        let record = ArchiveRecord {
            crc32,
            size: offset_u32(entry.data.len() as u64)?,
            offset: offset_u32(HEADER_SIZE + self.data_block.len() as u64)?,
            method,
            stored_size: offset_u32(stored.len() as u64)?,
            name_offset: entry.name_offset,
        };
        debug!(?record, "finished entry");

        self.data_block.extend_from_slice(&stored);
        self.records.push(record);

        Ok(())
    }

    /// Finish the last file and write all other archive structures
    ///
    /// This will return the writer, but one should normally not append any data to the end of the file.
    #[instrument(skip(self), err)]
    pub fn finish(mut self) -> Result<W> {
        self.finish_file()?;

        let header = ArchiveHeader {
            entry_count: offset_u32(self.records.len() as u64)?,
            table_offset: offset_u32(HEADER_SIZE + self.data_block.len() as u64)?,
            names_size: offset_u32(self.name_block.len() as u64)?,
            ..Default::default()
        };

        let mut header_block = Cursor::new(Vec::new());
        header.write(&mut header_block)?;

        let mut table_block = Cursor::new(Vec::new());
        for record in &self.records {
            record.write(&mut table_block)?;
        }

        self.inner.write_all(header_block.get_ref())?;
        self.inner.write_all(&self.data_block)?;
        self.inner.write_all(table_block.get_ref())?;
        self.inner.write_all(&self.name_block)?;
        self.inner.flush()?;

        Ok(self.inner)
    }
}

impl<W: Write> Write for ArchiveWriter<W> {
    #[instrument(skip_all, err, ret(level = Level::TRACE), fields(size=buf.len()) )]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Some(entry) = self.current.as_mut() else {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "No file has been started",
            ));
        };
        entry.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    #[instrument(skip(self), err)]
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
