//! A binary pack/unpack engine. Values are packed into a [`Buffer`] by a [`Packer`] and unpacked again by an
//! [`Unpacker`], both driven by the statically dispatched [`Codec`] trait.
//!
//! # Wire format
//!
//! The format is a dense byte stream without tags, padding or alignment. Position alone determines meaning, so
//! writer and reader have to agree on the layout. If a message needs versioning, write the version as an ordinary
//! leading field and pick the layout after reading it.
//!
//! * Integers and floats: fixed width, little-endian on every host.
//! * `bool`: one byte, `0` or `1`. Any non-zero byte decodes as `true`.
//! * Strings, byte strings, sequences and maps: a `u32` length followed by the payload.
//! * `Option`: a presence byte (`0` or `1`) followed by the value if present.
//! * Tuples, arrays and your own aggregates: the members in declared order.
//!
//! # A note on `usize`
//!
//! `usize` and `isize` always occupy eight bytes so that 32 and 64 bit hosts can talk to each other. Decoding a value
//! that does not fit into the host's `usize` raises `Error::Length`. Lengths on wire are limited to `u32::MAX`;
//! longer containers fail to encode with `Error::Length` as well.
//!
//! # Untrusted input
//!
//! Decoding never panics and never reads out of bounds. Length and count fields are checked against the remaining
//! input before anything gets allocated for them, so a corrupted length produces `Error::LengthExceedsBuffer` rather
//! than a huge allocation.
//!
//! # Examples
//!
//! ```
//! use packbuf::{Buffer, Packer, Unpacker};
//!
//! let mut buf = Buffer::with_capacity(4);
//! let mut packer = Packer::new(&mut buf);
//! packer.pack(&true).unwrap();
//! packer.pack(&42u32).unwrap();
//! packer.pack(&"hi").unwrap();
//! assert_eq!(buf.as_slice(), [
//!     0x01,                   // true
//!     0x2a, 0x00, 0x00, 0x00, // 42, little-endian
//!     0x02, 0x00, 0x00, 0x00, // string of length 2
//!     0x68,                   // 'h'
//!     0x69,                   // 'i'
//! ]);
//!
//! let mut unpacker = Unpacker::new(&buf);
//! assert_eq!(unpacker.unpack::<bool>().unwrap(), true);
//! assert_eq!(unpacker.unpack::<u32>().unwrap(), 42);
//! assert_eq!(unpacker.unpack::<&str>().unwrap(), "hi");
//! assert_eq!(unpacker.remaining(), 0);
//! ```

mod buffer;
mod codec;
mod collections;
mod error;
mod packer;
mod unpacker;

pub use buffer::Buffer;
pub use codec::Codec;
pub use error::{DecoderError, Error, Result};
pub use packer::Packer;
pub use unpacker::Unpacker;

/// Packs a single value into a fresh byte vector.
pub fn to_bytes<'de, T: Codec<'de>>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Buffer::try_with_capacity(T::MIN_SIZE)?;
    Packer::new(&mut buf).pack(value)?;
    Ok(buf.into_vec())
}

/// Unpacks a single value which has to span the whole input. Strings and byte slices are borrowed from `input`.
/// The returned error carries the position where decoding stopped.
pub fn from_bytes<'de, T: Codec<'de>>(input: &'de [u8]) -> std::result::Result<T, DecoderError> {
    let mut unpacker = Unpacker::from_slice(input);
    let value = unpacker.unpack::<T>().map_err(|e| e.at(unpacker.position()))?;
    if unpacker.is_empty() {
        Ok(value)
    } else {
        Err(Error::Trailing(unpacker.remaining()).at(unpacker.position()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Envelope<'a> {
        kind: u16,
        body: Body<'a>,
        checksum: u32,
    }

    #[derive(Debug, PartialEq)]
    enum Body<'a> {
        V1 { name: &'a str },
        V2 { name: &'a str, tags: Vec<u8> },
    }

    impl<'de> Codec<'de> for Body<'de> {
        const MIN_SIZE: usize = 1 + 4;

        fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
            match self {
                Body::V1 { name } => {
                    packer.pack(&1u8)?;
                    packer.pack(name)
                }
                Body::V2 { name, tags } => {
                    packer.pack(&2u8)?;
                    packer.pack(name)?;
                    packer.pack(tags)
                }
            }
        }

        fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
            match unpacker.unpack::<u8>()? {
                1 => Ok(Body::V1 { name: unpacker.unpack()? }),
                2 => Ok(Body::V2 { name: unpacker.unpack()?, tags: unpacker.unpack()? }),
                v => Err(Error::InvalidDiscriminant(v.into(), "Body")),
            }
        }
    }

    impl<'de> Codec<'de> for Envelope<'de> {
        const MIN_SIZE: usize = 2 + 4 + 4;

        fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
            packer.pack(&self.kind)?;
            packer.pack_framed(|inner| inner.pack(&self.body))?;
            packer.pack(&self.checksum)
        }

        fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
            let kind = unpacker.unpack()?;
            let body = unpacker.framed()?.unpack()?;
            Ok(Envelope { kind, body, checksum: unpacker.unpack()? })
        }
    }

    #[test]
    fn versioned_messages() {
        let v1 = Body::V1 { name: "a" };
        let bytes = to_bytes(&v1).unwrap();
        assert_eq!(bytes, [1, 1, 0, 0, 0, b'a']);
        assert_eq!(from_bytes::<Body>(&bytes).unwrap(), v1);

        let v2 = Body::V2 { name: "b", tags: vec![3, 4] };
        assert_eq!(from_bytes::<Body>(&to_bytes(&v2).unwrap()).unwrap(), v2);

        let err = from_bytes::<Body>(&[9, 1, 0, 0, 0, b'a']).unwrap_err();
        assert_eq!(err.inner(), &Error::InvalidDiscriminant(9, "Body"));
        assert_eq!(err.position(), 1);
    }

    #[test]
    fn framed_aggregate() {
        let envelope = Envelope { kind: 5, body: Body::V2 { name: "xy", tags: vec![] }, checksum: 0xaabbccdd };
        let bytes = to_bytes(&envelope).unwrap();
        assert_eq!(bytes, [
            0x05, 0x00,                         // kind
            0x0b, 0x00, 0x00, 0x00,             // frame of 11 bytes
            0x02,                               // body version
            0x02, 0x00, 0x00, 0x00, b'x', b'y', // name
            0x00, 0x00, 0x00, 0x00,             // no tags
            0xdd, 0xcc, 0xbb, 0xaa,             // checksum
        ]);
        assert_eq!(from_bytes::<Envelope>(&bytes).unwrap(), envelope);
    }

    #[test]
    fn old_reader_skips_unknown_frame_tail() {
        let mut buf = Buffer::new();
        let mut packer = buf.packer();
        packer.pack(&5u16).unwrap();
        packer.pack_framed(|inner| {
            inner.pack(&Body::V1 { name: "z" })?;
            inner.pack(&"appended by a newer writer")
        }).unwrap();
        packer.pack(&1u32).unwrap();
        let envelope = from_bytes::<Envelope>(buf.as_slice()).unwrap();
        assert_eq!(envelope.body, Body::V1 { name: "z" });
        assert_eq!(envelope.checksum, 1);
    }

    #[test]
    fn from_bytes_reports_position() {
        let err = from_bytes::<(u8, String)>(&[1, 5, 0, 0, 0, b'a']).unwrap_err();
        assert_eq!(err.position(), 1);
        assert_eq!(err.into_inner(), Error::LengthExceedsBuffer(5, 1));
        let err = from_bytes::<u8>(&[1, 2]).unwrap_err();
        assert_eq!(err.to_string(), "1 trailing bytes after message at input position 1");
    }
}
