use crate::buffer::Buffer;
use crate::codec::Codec;
use crate::error::{Error, Result};
use std::str::from_utf8;

/// Sequences codec reads over borrowed message bytes. Decoding is strictly forward-only; there is no way to seek to
/// an arbitrary offset.
///
/// All slices handed out borrow from the underlying bytes, not from the `Unpacker`, so decoded `&str` and `&[u8]`
/// values may outlive it. When a read fails, the cursor stays at the start of the failing read. Reads that succeeded
/// before are not undone, the whole message is supposed to be discarded.
#[derive(Debug, Clone)]
pub struct Unpacker<'de> {
    input: &'de [u8],
    pos: usize,
}

impl<'de> Unpacker<'de> {

    /// Starts at the buffer's read position. The buffer's own cursor is not advanced.
    pub fn new(buf: &'de Buffer) -> Self {
        Self { input: buf.as_slice(), pos: buf.read_position() }
    }

    pub fn from_slice(input: &'de [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Decodes the next value.
    pub fn unpack<T: Codec<'de>>(&mut self) -> Result<T> {
        T::decode(self)
    }

    /// Number of unread bytes. Used to detect the end of a message or an optional trailing section.
    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Offset of the cursor from the start of the input
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the next `n` bytes without copying them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'de [u8]> {
        let remaining = self.remaining();
        if remaining < n {
            return Err(Error::BufferUnderflow(n, remaining));
        }
        let out = &self.input[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Reads `N` bytes and copies them into an array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    /// Reads a length or element count prefix. Every counted element occupies at least `min_size` bytes on wire, so
    /// a count that cannot possibly fit into the remaining input is rejected before anyone allocates for it. A
    /// `min_size` of zero disables the check.
    pub fn unpack_len(&mut self, min_size: usize) -> Result<usize> {
        let start = self.pos;
        let len = u32::from_le_bytes(self.read_array()?);
        let len = usize::try_from(len).map_err(|_| Error::Length(u64::from(len)));
        let remaining = self.remaining();
        match len {
            Ok(len) if min_size == 0 || len <= remaining / min_size => Ok(len),
            Ok(len) => {
                self.pos = start;
                Err(Error::LengthExceedsBuffer(len, remaining))
            }
            Err(e) => {
                self.pos = start;
                Err(e)
            }
        }
    }

    /// Reads a length-prefixed byte string.
    pub fn read_prefixed_bytes(&mut self) -> Result<&'de [u8]> {
        let start = self.pos;
        let len = self.unpack_len(1)?;
        self.read_bytes(len).map_err(|e| {
            self.pos = start;
            e
        })
    }

    /// Reads a length-prefixed Utf-8 string.
    pub fn read_str(&mut self) -> Result<&'de str> {
        let start = self.pos;
        let bytes = self.read_prefixed_bytes()?;
        from_utf8(bytes).map_err(|e| {
            self.pos = start;
            Error::from(e)
        })
    }

    /// Returns an `Unpacker` confined to the next length-prefixed frame and moves this one past it. Whatever the
    /// frame's reader leaves unread is skipped, which lets newer writers append fields older readers don't know.
    pub fn framed(&mut self) -> Result<Unpacker<'de>> {
        Ok(Unpacker::from_slice(self.read_prefixed_bytes()?))
    }
}
