//! The `Buffer` is the only owner of message bytes. Encoding appends at the write position, which always equals the
//! logical length; decoding consumes from an independent read position. The invariant
//! `read_position() <= len() <= capacity()` holds at all times.

use crate::error::{Error, Result};
use crate::packer::Packer;
use crate::unpacker::Unpacker;

/// Owning, growable byte storage with independent read and write cursors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    data: Vec<u8>,
    read_pos: usize,
}

impl Buffer {

    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer which can hold `capacity` bytes before it needs to grow. Aborts like
    /// [`Vec::with_capacity`] if the memory cannot be had; see [`Buffer::try_with_capacity`].
    pub fn with_capacity(capacity: usize) -> Self {
        Self { data: Vec::with_capacity(capacity), read_pos: 0 }
    }

    /// Like [`Buffer::with_capacity`] but reports [`Error::OutOfMemory`] instead of aborting.
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity).map_err(|_| Error::OutOfMemory(capacity))?;
        Ok(Self { data, read_pos: 0 })
    }

    /// Creates a buffer over a copy of received bytes, ready to be decoded from the start.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self { data: bytes.to_vec(), read_pos: 0 }
    }

    /// Ensures that the next `additional` bytes can be written without relocating storage. Capacity at least doubles
    /// whenever it has to grow, which keeps repeated small writes amortized O(1).
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let required = self.data.len().checked_add(additional).ok_or(Error::OutOfMemory(usize::MAX))?;
        if required <= self.data.capacity() {
            return Ok(());
        }
        let target = required.max(self.data.capacity().saturating_mul(2));
        self.data.try_reserve_exact(target - self.data.len()).map_err(|_| Error::OutOfMemory(target))
    }

    /// Appends raw bytes at the write position.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve(bytes.len())?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Returns a view of the next `n` unread bytes and advances the read position past them. On failure the read
    /// position stays where it was.
    pub fn read_bytes(&mut self, n: usize) -> Result<&[u8]> {
        let remaining = self.remaining();
        if remaining < n {
            return Err(Error::BufferUnderflow(n, remaining));
        }
        self.read_pos += n;
        Ok(&self.data[self.read_pos - n..self.read_pos])
    }

    /// Number of written bytes not consumed yet
    pub fn remaining(&self) -> usize {
        self.data.len() - self.read_pos
    }

    /// Rewinds the read position so that the message can be decoded again.
    pub fn reset_read(&mut self) {
        self.read_pos = 0;
    }

    /// Forgets all content but keeps the allocated storage for the next message.
    pub fn clear(&mut self) {
        self.data.clear();
        self.read_pos = 0;
    }

    /// All written bytes, regardless of the read position. This is what gets handed to a transport.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn read_position(&self) -> usize {
        self.read_pos
    }

    pub fn packer(&mut self) -> Packer<'_> {
        Packer::new(self)
    }

    /// An `Unpacker` starting at the current read position. It keeps its own cursor, so the buffer's read position
    /// is left untouched.
    pub fn unpacker(&self) -> Unpacker<'_> {
        Unpacker::new(self)
    }

    /// Overwrites already written bytes. Used to back-patch length prefixes.
    pub(crate) fn overwrite(&mut self, at: usize, bytes: &[u8]) {
        debug_assert!(at + bytes.len() <= self.data.len());
        if let Some(dst) = self.data.get_mut(at..at + bytes.len()) {
            dst.copy_from_slice(bytes);
        }
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(data: Vec<u8>) -> Self {
        Self { data, read_pos: 0 }
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::Buffer;
    use crate::error::Error;

    #[test]
    fn capacity_failure_is_reported() {
        assert_eq!(Buffer::try_with_capacity(usize::MAX), Err(Error::OutOfMemory(usize::MAX)));
        let buf = Buffer::try_with_capacity(16).unwrap();
        assert!(buf.capacity() >= 16);
        assert!(buf.is_empty());
    }

    #[test]
    fn grows_past_initial_capacity() {
        let mut buf = Buffer::with_capacity(4);
        let bytes: Vec<u8> = (0..10).collect();
        buf.write_bytes(&bytes).unwrap();
        assert!(buf.capacity() >= 10);
        assert_eq!(buf.len(), 10);
        for i in 0..10u8 {
            assert_eq!(buf.read_bytes(1).unwrap(), &[i]);
        }
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn capacity_doubles() {
        let mut buf = Buffer::with_capacity(16);
        buf.write_bytes(&[0; 16]).unwrap();
        let before = buf.capacity();
        buf.write_bytes(&[1]).unwrap();
        assert!(buf.capacity() >= 2 * before);
        buf.reserve(1000).unwrap();
        assert!(buf.capacity() >= 1017);
    }

    #[test]
    fn small_writes_equal_bulk_write() {
        let payload: Vec<u8> = (0..=255u8).cycle().take(5000).collect();
        let mut bulk = Buffer::new();
        bulk.write_bytes(&payload).unwrap();
        let mut small = Buffer::with_capacity(1);
        for chunk in payload.chunks(3) {
            small.write_bytes(chunk).unwrap();
        }
        assert_eq!(bulk.as_slice(), small.as_slice());
    }

    #[test]
    fn underflow_keeps_read_position() {
        let mut buf = Buffer::from_bytes(&[1, 2, 3]);
        assert_eq!(buf.read_bytes(2).unwrap(), &[1, 2]);
        assert_eq!(buf.read_bytes(2), Err(Error::BufferUnderflow(2, 1)));
        assert_eq!(buf.read_position(), 2);
        assert_eq!(buf.read_bytes(1).unwrap(), &[3]);
        assert_eq!(buf.read_bytes(1), Err(Error::BufferUnderflow(1, 0)));
    }

    #[test]
    fn reset_and_clear() {
        let mut buf = Buffer::from(vec![7, 8, 9]);
        let _ = buf.read_bytes(3).unwrap();
        buf.reset_read();
        assert_eq!(buf.remaining(), 3);
        let capacity = buf.capacity();
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.read_position(), 0);
        assert_eq!(buf.capacity(), capacity);
        buf.write_bytes(&[1]).unwrap();
        assert_eq!(buf.into_vec(), vec![1]);
    }

    #[test]
    fn zero_length_reads() {
        let mut buf = Buffer::new();
        assert_eq!(buf.read_bytes(0).unwrap(), &[] as &[u8]);
        buf.write_bytes(&[]).unwrap();
        assert_eq!(buf.len(), 0);
    }
}
