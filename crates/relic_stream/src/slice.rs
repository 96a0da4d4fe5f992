//! Bounded views into a parent reader
//!

use std::io::{self, Read, Seek, SeekFrom};

use tracing::trace;

use crate::{
    error::{Error, Result},
    read::{check_position, readable, resolve_seek, SeekableReader},
};

/// A [`SeekableReader`] confined to `[start, start + length)` of its parent
///
/// The slice borrows its parent, so it can never outlive it, and keeps its own cursor: reading
/// from a slice neither reads from nor moves the parent's cursor. Slices can be sliced again;
/// each level only knows its immediate parent and is validated against that parent's bounds,
/// which were themselves validated when the parent was created.
///
/// ```
/// use relic_stream::{ByteReader, SeekableReader};
///
/// let archive = ByteReader::new(b"..[entry:data]..".to_vec());
/// let entry = archive.slice(2, 12)?;
/// let mut data = entry.slice(7, 4)?;
///
/// let mut buffer = Vec::new();
/// std::io::Read::read_to_end(&mut data, &mut buffer)?;
/// assert_eq!(buffer, b"data");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct BoundedSliceReader<'a, P: ?Sized> {
    parent: &'a P,
    start: u64,
    length: u64,
    position: u64,
}

impl<'a, P: SeekableReader + ?Sized> BoundedSliceReader<'a, P> {
    /// Create a slice of `parent`
    ///
    /// Fails with [`Error::InvalidRange`] if `start` is past the end of the parent, or if
    /// `start + length` is past the end of the parent or does not fit in a `u64`. A zero length
    /// slice is valid anywhere up to and including the end of the parent.
    pub fn new(parent: &'a P, start: u64, length: u64) -> Result<Self> {
        let parent_length = parent.length();

        match start.checked_add(length) {
            Some(end) if start <= parent_length && end <= parent_length => {}
            _ => {
                return Err(Error::InvalidRange {
                    start,
                    length,
                    parent_length,
                })
            }
        }

        trace!(start, length, parent_length, "slicing reader");

        Ok(BoundedSliceReader {
            parent,
            start,
            length,
            position: 0,
        })
    }

    /// Offset of this slice inside its immediate parent
    pub fn start(&self) -> u64 {
        self.start
    }

    /// The reader this slice was cut from
    pub fn parent(&self) -> &'a P {
        self.parent
    }
}

impl<P: SeekableReader + ?Sized> SeekableReader for BoundedSliceReader<'_, P> {
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

        // offset < length, and start + length was checked against the parent
        self.parent.read_at(self.start + offset, &mut buf[..count])
    }
}

impl<P: SeekableReader + ?Sized> Read for BoundedSliceReader<'_, P> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_bytes(buf)?)
    }
}

impl<P: SeekableReader + ?Sized> Seek for BoundedSliceReader<'_, P> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.position = resolve_seek(pos, self.position, self.length)?;
        Ok(self.position)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::read::{ByteReader, SeekableReader};
    use crate::slice::BoundedSliceReader;

    fn numbers() -> ByteReader<Vec<u8>> {
        ByteReader::new((0u8..32).collect())
    }

    #[test]
    fn slice_reports_requested_length() -> Result<()> {
        let root = numbers();
        let slice = root.slice(4, 10)?;

        assert_eq!(slice.length(), 10);
        assert_eq!(slice.position(), 0);
        assert_eq!(slice.start(), 4);

        Ok(())
    }

    #[test]
    fn slice_reads_only_its_range() -> Result<()> {
        let root = numbers();
        let mut slice = root.slice(30, 2)?;

        let mut buffer = [0xFFu8; 8];
        assert_eq!(slice.read_bytes(&mut buffer)?, 2);
        assert_eq!(&buffer[..2], &[30, 31]);
        assert_eq!(slice.read_bytes(&mut buffer)?, 0);

        Ok(())
    }

    #[test]
    fn slice_does_not_move_parent_cursor() -> Result<()> {
        let mut root = numbers();
        root.seek_to(3)?;

        let mut slice = root.slice(10, 5)?;
        let mut buffer = [0u8; 5];
        slice.read_bytes(&mut buffer)?;

        assert_eq!(buffer, [10, 11, 12, 13, 14]);
        assert_eq!(root.position(), 3);

        Ok(())
    }

    #[test]
    fn slice_rejects_start_past_end() {
        let root = numbers();
        assert!(matches!(
            root.slice(33, 0),
            Err(Error::InvalidRange {
                start: 33,
                length: 0,
                parent_length: 32
            })
        ));
    }

    #[test]
    fn slice_rejects_end_past_end() {
        let root = numbers();
        assert!(matches!(root.slice(16, 17), Err(Error::InvalidRange { .. })));
        assert!(root.slice(16, 16).is_ok());
    }

    #[test]
    fn slice_rejects_overflowing_length() {
        let root = numbers();
        assert!(matches!(
            root.slice(1, u64::MAX),
            Err(Error::InvalidRange { .. })
        ));
        assert!(matches!(
            root.slice(0, u64::MAX),
            Err(Error::InvalidRange { .. })
        ));
    }

    #[test]
    fn zero_length_slice_at_end_is_exhausted() -> Result<()> {
        let root = numbers();
        let mut slice = root.slice(32, 0)?;

        let mut buffer = [0u8; 4];
        assert_eq!(slice.read_bytes(&mut buffer)?, 0);
        assert_eq!(slice.remaining(), 0);

        Ok(())
    }

    #[test]
    fn nested_slice_is_relative_to_immediate_parent() -> Result<()> {
        let root = numbers();
        let outer = root.slice(8, 16)?;
        let mut inner = outer.slice(4, 4)?;

        let mut buffer = [0u8; 8];
        assert_eq!(inner.read_bytes(&mut buffer)?, 4);
        assert_eq!(&buffer[..4], &[12, 13, 14, 15]);

        assert!(matches!(outer.slice(8, 9), Err(Error::InvalidRange { .. })));

        Ok(())
    }

    #[test]
    fn seek_within_slice() -> Result<()> {
        let root = numbers();
        let mut slice = root.slice(20, 4)?;

        slice.seek_to(3)?;
        let mut buffer = [0u8; 4];
        assert_eq!(slice.read_bytes(&mut buffer)?, 1);
        assert_eq!(buffer[0], 23);

        assert!(matches!(slice.seek_to(5), Err(Error::OutOfRange { .. })));

        Ok(())
    }

    #[test]
    fn slice_of_trait_object() -> Result<()> {
        let root = numbers();
        let dynamic: &dyn SeekableReader = &root;
        let slice = BoundedSliceReader::new(dynamic, 2, 2)?;

        let mut buffer = [0u8; 2];
        assert_eq!(slice.read_at(0, &mut buffer)?, 2);
        assert_eq!(buffer, [2, 3]);

        Ok(())
    }
}
