use std::fmt::{self, Display, Formatter};

/// An [`Error`] together with the input position at which decoding stopped.
#[derive(Debug, PartialEq)]
pub struct DecoderError {
    inner: Error,
    at: usize,
}

impl DecoderError {
    pub fn into_inner(self) -> Error {
        self.inner
    }

    pub fn inner(&self) -> &Error {
        &self.inner
    }

    /// Offset into the input where the failing read started
    pub fn position(&self) -> usize {
        self.at
    }
}

impl std::error::Error for DecoderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.inner)
    }
}

impl Display for DecoderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} at input position {}", self.inner, self.at)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A read needed more bytes than remain: `(needed, remaining)`
    BufferUnderflow(usize, usize),
    /// A decoded length or element count implies more data than remains: `(length, remaining)`
    LengthExceedsBuffer(usize, usize),
    /// Growing a buffer or preallocating a container failed for the given number of bytes
    OutOfMemory(usize),
    /// A tag byte outside of its defined domain, with the name of the tagged kind
    InvalidDiscriminant(u32, &'static str),
    Utf8(std::str::Utf8Error),
    /// A decoded `u32` that is not a unicode scalar value
    InvalidChar(u32),
    /// A length that cannot be represented on wire, or a decoded size that doesn't fit into `usize`
    Length(u64),
    /// Bytes left over after a complete message has been decoded
    Trailing(usize),
}

impl Error {
    pub fn at(self, at: usize) -> DecoderError {
        DecoderError { inner: self, at }
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(e: std::str::Utf8Error) -> Error {
        Error::Utf8(e)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Utf8(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::BufferUnderflow(needed, remaining) => {
                write!(f, "Unexpected end of buffer: needed {} bytes but only {} remain", needed, remaining)
            }
            Error::LengthExceedsBuffer(length, remaining) => {
                write!(f, "Declared length {} exceeds the {} remaining bytes", length, remaining)
            }
            Error::OutOfMemory(bytes) => write!(f, "Allocation of {} bytes failed", bytes),
            Error::InvalidDiscriminant(tag, kind) => write!(f, "Invalid discriminant {} for {}", tag, kind),
            Error::Utf8(e) => write!(f, "String slice was not valid Utf-8: {}", e),
            Error::InvalidChar(v) => write!(f, "{:#x} is not a unicode scalar value", v),
            Error::Length(value) => write!(f, "Length {} is out of range", value),
            Error::Trailing(count) => write!(f, "{} trailing bytes after message", count),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn messages() {
        assert_eq!(Error::BufferUnderflow(4, 1).to_string(), "Unexpected end of buffer: needed 4 bytes but only 1 remain");
        assert_eq!(Error::InvalidChar(0xd800).to_string(), "0xd800 is not a unicode scalar value");
        let err = Error::InvalidDiscriminant(3, "Batch").at(12);
        assert_eq!(err.to_string(), "Invalid discriminant 3 for Batch at input position 12");
        assert_eq!(err.position(), 12);
    }
}
