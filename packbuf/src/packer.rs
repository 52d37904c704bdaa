use crate::buffer::Buffer;
use crate::codec::Codec;
use crate::error::{Error, Result};

/// Sequences codec writes into a borrowed [`Buffer`]. A `Packer` holds no state of its own, so any number of them
/// may wrap the same buffer one after another to build a message incrementally.
///
/// If an error is returned, bytes written before the failure stay in the buffer. The message is truncated and the
/// buffer has to be discarded (or cleared) by the caller.
pub struct Packer<'b> {
    buf: &'b mut Buffer,
}

impl<'b> Packer<'b> {

    pub fn new(buf: &'b mut Buffer) -> Self {
        Self { buf }
    }

    /// Appends the encoding of `value`.
    pub fn pack<'de, T: Codec<'de>>(&mut self, value: &T) -> Result<()> {
        value.encode(self)
    }

    /// Reborrows the underlying buffer for a sub-message. The outer packer can be used again once the nested one is
    /// dropped.
    pub fn nested(&mut self) -> Packer<'_> {
        Packer { buf: &mut *self.buf }
    }

    /// Writes a length or element count prefix.
    pub fn pack_len(&mut self, len: usize) -> Result<()> {
        let len = u32::try_from(len).map_err(|_| Error::Length(len as u64))?;
        self.write_bytes(&len.to_le_bytes())
    }

    /// Writes the sub-message produced by `f`, preceded by its length in bytes. The prefix is back-patched once `f`
    /// returns, so the sub-message is never copied.
    pub fn pack_framed<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Packer<'_>) -> Result<()>,
    {
        let at = self.buf.len();
        self.write_bytes(&[0; 4])?;
        f(&mut self.nested())?;
        let len = self.buf.len() - at - 4;
        let len = u32::try_from(len).map_err(|_| Error::Length(len as u64))?;
        self.buf.overwrite(at, &len.to_le_bytes());
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.write_bytes(bytes)
    }

    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.buf.reserve(additional)
    }

    /// Number of bytes in the underlying buffer so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
