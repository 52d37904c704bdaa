use std::fmt;

/// Describes the shape of a message. Since the wire format carries no type information, `pbq` needs one of these to
/// make sense of the bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    I8,
    I16,
    I32,
    I64,
    I128,
    F32,
    F64,
    Char,
    Str,
    Bytes,
    Unit,
    Seq(Box<Layout>),
    Array(Box<Layout>, usize),
    Option(Box<Layout>),
    Tuple(Vec<Layout>),
    Map(Box<Layout>, Box<Layout>),
}

impl Layout {

    /// The least number of bytes a value of this layout occupies on wire, the same figure `Codec::MIN_SIZE` gives for
    /// the matching Rust type.
    pub fn min_size(&self) -> usize {
        match self {
            Layout::Unit => 0,
            Layout::Bool | Layout::U8 | Layout::I8 | Layout::Option(_) => 1,
            Layout::U16 | Layout::I16 => 2,
            Layout::U32 | Layout::I32 | Layout::F32 | Layout::Char => 4,
            Layout::Str | Layout::Bytes | Layout::Seq(_) | Layout::Map(_, _) => 4,
            Layout::U64 | Layout::I64 | Layout::F64 => 8,
            Layout::U128 | Layout::I128 => 16,
            Layout::Array(inner, n) => inner.min_size().saturating_mul(*n),
            Layout::Tuple(members) => members.iter().fold(0, |acc, m| acc.saturating_add(m.min_size())),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Bool            => f.write_str("bool"),
            Layout::U8              => f.write_str("u8"),
            Layout::U16             => f.write_str("u16"),
            Layout::U32             => f.write_str("u32"),
            Layout::U64             => f.write_str("u64"),
            Layout::U128            => f.write_str("u128"),
            Layout::I8              => f.write_str("i8"),
            Layout::I16             => f.write_str("i16"),
            Layout::I32             => f.write_str("i32"),
            Layout::I64             => f.write_str("i64"),
            Layout::I128            => f.write_str("i128"),
            Layout::F32             => f.write_str("f32"),
            Layout::F64             => f.write_str("f64"),
            Layout::Char            => f.write_str("char"),
            Layout::Str             => f.write_str("str"),
            Layout::Bytes           => f.write_str("bytes"),
            Layout::Unit            => f.write_str("()"),
            Layout::Seq(inner)      => write!(f, "[{}]", inner),
            Layout::Array(inner, n) => write!(f, "[{}; {}]", inner, n),
            Layout::Option(inner)   => write!(f, "?{}", inner),
            Layout::Tuple(members)  => write!(f, "({})", members.iter().map(|m| m.to_string()).collect::<Vec<_>>().join(", ")),
            Layout::Map(k, v)       => write!(f, "{{{}: {}}}", k, v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Layout;

    #[test]
    fn min_sizes() {
        assert_eq!(Layout::Tuple(vec![Layout::Bool, Layout::U32, Layout::Str]).min_size(), 9);
        assert_eq!(Layout::Array(Box::new(Layout::U16), 3).min_size(), 6);
        assert_eq!(Layout::Option(Box::new(Layout::U128)).min_size(), 1);
        assert_eq!(Layout::Array(Box::new(Layout::U128), usize::MAX).min_size(), usize::MAX);
        assert_eq!(Layout::Unit.min_size(), 0);
    }

    #[test]
    fn display() {
        let layout = Layout::Map(
            Box::new(Layout::Str),
            Box::new(Layout::Tuple(vec![Layout::Option(Box::new(Layout::I8)), Layout::Array(Box::new(Layout::F64), 2)])),
        );
        assert_eq!(layout.to_string(), "{str: (?i8, [f64; 2])}");
    }
}
