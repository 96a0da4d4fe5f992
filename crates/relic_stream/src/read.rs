//! Seekable readers over in-memory buffers and files
//!

use std::{
    cell::RefCell,
    fs::File,
    io::{self, Read, Seek, SeekFrom},
    path::Path,
};

use tracing::instrument;

use crate::{
    error::{Error, Result},
    slice::BoundedSliceReader,
};

/// A byte source with a known length, a cursor and positional reads.
///
/// Every format reader in relic is written against this trait, so any reader can be handed
/// a [`BoundedSliceReader`] confined to the part of a larger file it is allowed to see.
///
/// Implementors provide the cursor ([`SeekableReader::position`] / [`SeekableReader::seek_to`])
/// and a positional read ([`SeekableReader::read_at`]) which must not move the cursor. Reading
/// through a slice relies on that: a slice reads from its parent at an absolute offset and never
/// disturbs the parent's own cursor.
pub trait SeekableReader {
    /// Total number of bytes addressable through this reader
    fn length(&self) -> u64;

    /// Current cursor position, always `<= length()`
    fn position(&self) -> u64;

    /// Move the cursor to `position`
    ///
    /// Fails with [`Error::OutOfRange`] if `position > length()`.
    fn seek_to(&mut self, position: u64) -> Result<()>;

    /// Read up to `buf.len()` bytes starting at `offset` without moving the cursor
    ///
    /// Returns the number of bytes read, which is short when the read crosses the end of the
    /// reader and `0` when `offset >= length()`.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Read up to `buf.len()` bytes at the cursor and advance it by the amount read
    ///
    /// Returns `0` at the end of the stream.
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize> {
        let position = self.position();
        let read = self.read_at(position, buf)?;
        self.seek_to(position + read as u64)?;
        Ok(read)
    }

    /// Number of bytes between the cursor and the end of the reader
    fn remaining(&self) -> u64 {
        self.length().saturating_sub(self.position())
    }

    /// Create a reader confined to `[start, start + length)` of this reader
    ///
    /// The slice has its own cursor starting at `0`. See [`BoundedSliceReader::new`] for the
    /// bounds that are enforced.
    fn slice(&self, start: u64, length: u64) -> Result<BoundedSliceReader<'_, Self>>
    where
        Self: Sized,
    {
        BoundedSliceReader::new(self, start, length)
    }
}

impl<T: SeekableReader + ?Sized> SeekableReader for &mut T {
    fn length(&self) -> u64 {
        (**self).length()
    }

    fn position(&self) -> u64 {
        (**self).position()
    }

    fn seek_to(&mut self, position: u64) -> Result<()> {
        (**self).seek_to(position)
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        (**self).read_at(offset, buf)
    }
}

/// Number of bytes a read of `requested` bytes at `offset` may return from a reader of `length`
pub(crate) fn readable(length: u64, offset: u64, requested: usize) -> usize {
    let remaining = length.saturating_sub(offset);
    usize::try_from(remaining).map_or(requested, |remaining| remaining.min(requested))
}

pub(crate) fn check_position(position: u64, length: u64) -> Result<()> {
    if position > length {
        return Err(Error::OutOfRange { position, length });
    }
    Ok(())
}

/// Resolve a [`SeekFrom`] against a cursor, rejecting targets outside `[0, length]`
pub(crate) fn resolve_seek(target: SeekFrom, position: u64, length: u64) -> io::Result<u64> {
    let resolved = match target {
        SeekFrom::Start(offset) => Some(offset),
        SeekFrom::End(delta) => length.checked_add_signed(delta),
        SeekFrom::Current(delta) => position.checked_add_signed(delta),
    };

    match resolved {
        Some(resolved) if resolved <= length => Ok(resolved),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("seek to {target:?} leaves a reader of {length} bytes"),
        )),
    }
}

/// A [`SeekableReader`] over anything that derefs to a byte slice
///
/// ```
/// use relic_stream::{ByteReader, SeekableReader};
///
/// let reader = ByteReader::new(b"HEADERpayload".to_vec());
/// let mut payload = reader.slice(6, 7)?;
///
/// let mut buffer = [0u8; 16];
/// let read = payload.read_bytes(&mut buffer)?;
/// assert_eq!(&buffer[..read], b"payload");
/// # Ok::<(), relic_stream::error::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ByteReader<B> {
    data: B,
    position: u64,
}

impl<B: AsRef<[u8]>> ByteReader<B> {
    /// Wrap a buffer, with the cursor at the start
    pub fn new(data: B) -> Self {
        ByteReader { data, position: 0 }
    }

    /// Get a reference to the wrapped buffer
    pub fn get_ref(&self) -> &B {
        &self.data
    }

    /// Unwrap and return the inner buffer
    pub fn into_inner(self) -> B {
        self.data
    }
}

impl<B: AsRef<[u8]>> SeekableReader for ByteReader<B> {
    fn length(&self) -> u64 {
        self.data.as_ref().len() as u64
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn seek_to(&mut self, position: u64) -> Result<()> {
        check_position(position, self.length())?;
        self.position = position;
        Ok(())
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let count = readable(self.length(), offset, buf.len());
        if count == 0 {
            return Ok(0);
        }

        // `count > 0` means `offset < len`, which always fits in usize
        let start = offset as usize;
        buf[..count].copy_from_slice(&self.data.as_ref()[start..start + count]);
        Ok(count)
    }
}

impl<B: AsRef<[u8]>> Read for ByteReader<B> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_bytes(buf)?)
    }
}

impl<B: AsRef<[u8]>> Seek for ByteReader<B> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.position = resolve_seek(pos, self.position, self.length())?;
        Ok(self.position)
    }
}

/// A [`SeekableReader`] over a [`Read`] + [`Seek`] source such as a [`File`]
///
/// The length is taken once when the reader is created. The source sits behind a [`RefCell`]
/// so positional reads can be served from `&self`; this makes the reader `!Sync`, use one
/// reader per thread.
#[derive(Debug)]
pub struct FileReader<R> {
    inner: RefCell<R>,
    length: u64,
    position: u64,
}

impl FileReader<File> {
    /// Open the file at `path` for reading
    #[instrument(skip_all, err, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(File::open(path)?)
    }
}

impl<R: Read + Seek> FileReader<R> {
    /// Wrap a source, measuring its length
    #[instrument(skip(inner), err)]
    pub fn new(mut inner: R) -> Result<Self> {
        let length = inner.seek(SeekFrom::End(0))?;
        inner.rewind()?;

        Ok(FileReader {
            inner: RefCell::new(inner),
            length,
            position: 0,
        })
    }

    /// Unwrap and return the inner source
    ///
    /// The position of the source is undefined.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

impl<R: Read + Seek> SeekableReader for FileReader<R> {
    fn length(&self) -> u64 {
        self.length
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn seek_to(&mut self, position: u64) -> Result<()> {
        check_position(position, self.length)?;
        self.position = position;
        Ok(())
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let count = readable(self.length, offset, buf.len());
        if count == 0 {
            return Ok(0);
        }

        let mut inner = self.inner.borrow_mut();
        inner.seek(SeekFrom::Start(offset))?;

        let mut filled = 0;
        while filled < count {
            match inner.read(&mut buf[filled..count]) {
                Ok(0) => break,
                Ok(read) => filled += read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }
}

impl<R: Read + Seek> Read for FileReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_bytes(buf)?)
    }
}

impl<R: Read + Seek> Seek for FileReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.position = resolve_seek(pos, self.position, self.length)?;
        Ok(self.position)
    }
}
