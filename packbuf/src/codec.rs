//! The `Codec` trait and the codecs for scalar values and strings.
//!
//! Every multi-byte number is little-endian on wire, independent of the host. Floats travel as their IEEE-754 bit
//! pattern, so NaN payloads and signed zeros survive a round trip unchanged.

use crate::error::{Error, Result};
use crate::packer::Packer;
use crate::unpacker::Unpacker;
use std::borrow::Cow;

/// A stateless pair of encode and decode rules describing the byte layout of one type.
///
/// Implement this for your own aggregates by packing the members in a fixed order and unpacking them in the same
/// order. Dispatch is static: `Packer::pack` and `Unpacker::unpack` resolve to these functions at compile time.
///
/// ```
/// use packbuf::{Codec, Packer, Result, Unpacker};
///
/// #[derive(Debug, PartialEq)]
/// struct Reading {
///     sensor: u16,
///     celsius: f32,
/// }
///
/// impl<'de> Codec<'de> for Reading {
///     const MIN_SIZE: usize = 6;
///
///     fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
///         packer.pack(&self.sensor)?;
///         packer.pack(&self.celsius)
///     }
///
///     fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
///         Ok(Reading { sensor: unpacker.unpack()?, celsius: unpacker.unpack()? })
///     }
/// }
///
/// let bytes = packbuf::to_bytes(&Reading { sensor: 3, celsius: 21.5 }).unwrap();
/// assert_eq!(bytes, [0x03, 0x00, 0x00, 0x00, 0xac, 0x41]);
/// assert_eq!(packbuf::from_bytes::<Reading>(&bytes).unwrap(), Reading { sensor: 3, celsius: 21.5 });
/// ```
pub trait Codec<'de>: Sized {
    /// The least number of bytes any value of this type occupies on wire. Sequence decoders use it to reject element
    /// counts which cannot fit into the remaining input.
    const MIN_SIZE: usize;

    fn encode(&self, packer: &mut Packer<'_>) -> Result<()>;

    fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self>;
}

macro_rules! fixed_width {
    ($($ty:ty),*) => {$(
        impl<'de> Codec<'de> for $ty {
            const MIN_SIZE: usize = std::mem::size_of::<$ty>();

            #[inline]
            fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
                packer.write_bytes(&self.to_le_bytes())
            }

            #[inline]
            fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
                Ok(<$ty>::from_le_bytes(unpacker.read_array()?))
            }
        }
    )*};
}

fixed_width!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);

macro_rules! float {
    ($($ty:ty => $bits:ty),*) => {$(
        impl<'de> Codec<'de> for $ty {
            const MIN_SIZE: usize = std::mem::size_of::<$ty>();

            #[inline]
            fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
                packer.write_bytes(&self.to_bits().to_le_bytes())
            }

            #[inline]
            fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
                Ok(<$ty>::from_bits(<$bits>::from_le_bytes(unpacker.read_array()?)))
            }
        }
    )*};
}

float!(f32 => u32, f64 => u64);

/// Always 64 bits on wire so that 32 and 64 bit hosts agree.
impl<'de> Codec<'de> for usize {
    const MIN_SIZE: usize = 8;

    fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
        packer.pack(&(*self as u64))
    }

    fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
        let value = unpacker.unpack::<u64>()?;
        usize::try_from(value).map_err(|_| Error::Length(value))
    }
}

impl<'de> Codec<'de> for isize {
    const MIN_SIZE: usize = 8;

    fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
        packer.pack(&(*self as i64))
    }

    fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
        let value = unpacker.unpack::<i64>()?;
        isize::try_from(value).map_err(|_| Error::Length(value as u64))
    }
}

/// Encoded as `0` or `1`. Decoding is lenient and reads any non-zero byte as `true`.
impl<'de> Codec<'de> for bool {
    const MIN_SIZE: usize = 1;

    fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
        packer.write_bytes(&[u8::from(*self)])
    }

    fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
        Ok(unpacker.read_u8()? != 0)
    }
}

impl<'de> Codec<'de> for char {
    const MIN_SIZE: usize = 4;

    fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
        packer.pack(&u32::from(*self))
    }

    fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
        let value = unpacker.unpack::<u32>()?;
        char::from_u32(value).ok_or(Error::InvalidChar(value))
    }
}

impl<'de> Codec<'de> for () {
    const MIN_SIZE: usize = 0;

    fn encode(&self, _packer: &mut Packer<'_>) -> Result<()> {
        Ok(())
    }

    fn decode(_unpacker: &mut Unpacker<'de>) -> Result<Self> {
        Ok(())
    }
}

impl<'de> Codec<'de> for &'de [u8] {
    const MIN_SIZE: usize = 4;

    fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
        packer.pack_len(self.len())?;
        packer.write_bytes(self)
    }

    fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
        unpacker.read_prefixed_bytes()
    }
}

impl<'de> Codec<'de> for Cow<'de, [u8]> {
    const MIN_SIZE: usize = 4;

    fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
        let bytes: &[u8] = self;
        packer.pack(&bytes)
    }

    fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
        Ok(Cow::Borrowed(unpacker.read_prefixed_bytes()?))
    }
}

impl<'de> Codec<'de> for &'de str {
    const MIN_SIZE: usize = 4;

    fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
        packer.pack(&self.as_bytes())
    }

    fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
        unpacker.read_str()
    }
}

impl<'de> Codec<'de> for Cow<'de, str> {
    const MIN_SIZE: usize = 4;

    fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
        packer.pack(&self.as_bytes())
    }

    fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
        Ok(Cow::Borrowed(unpacker.read_str()?))
    }
}

impl<'de> Codec<'de> for String {
    const MIN_SIZE: usize = 4;

    fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
        packer.pack(&self.as_bytes())
    }

    fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
        let s = unpacker.read_str()?;
        let mut owned = String::new();
        owned.try_reserve_exact(s.len()).map_err(|_| Error::OutOfMemory(s.len()))?;
        owned.push_str(s);
        Ok(owned)
    }
}
