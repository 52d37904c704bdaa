//! Moves [`Value`]s in and out of the wire format, guided by a [`Layout`].

use anyhow::{anyhow, bail, Result};
use packbuf::{Error, Packer, Unpacker};
use crate::layout::Layout;
use crate::value::{Sign, Value};

/// Decodes one value of the given layout. Errors are the plain `packbuf` errors, so the caller can attach the
/// position of the unpacker.
pub fn decode(layout: &Layout, unpacker: &mut Unpacker<'_>) -> packbuf::Result<Value> {
    Ok(match layout {
        Layout::Bool => Value::Bool(unpacker.unpack()?),
        Layout::U8 => Value::unsigned(unpacker.unpack::<u8>()?.into()),
        Layout::U16 => Value::unsigned(unpacker.unpack::<u16>()?.into()),
        Layout::U32 => Value::unsigned(unpacker.unpack::<u32>()?.into()),
        Layout::U64 => Value::unsigned(unpacker.unpack::<u64>()?.into()),
        Layout::U128 => Value::unsigned(unpacker.unpack()?),
        Layout::I8 => Value::signed(unpacker.unpack::<i8>()?.into()),
        Layout::I16 => Value::signed(unpacker.unpack::<i16>()?.into()),
        Layout::I32 => Value::signed(unpacker.unpack::<i32>()?.into()),
        Layout::I64 => Value::signed(unpacker.unpack::<i64>()?.into()),
        Layout::I128 => Value::signed(unpacker.unpack()?),
        Layout::F32 => Value::F32(unpacker.unpack()?),
        Layout::F64 => Value::F64(unpacker.unpack()?),
        Layout::Char => Value::Str(unpacker.unpack::<char>()?.to_string()),
        Layout::Str => Value::Str(unpacker.read_str()?.to_string()),
        Layout::Bytes => Value::Bytes(unpacker.read_prefixed_bytes()?.to_vec()),
        Layout::Unit => Value::Unit,
        Layout::Seq(inner) => {
            let len = unpacker.unpack_len(inner.min_size().max(1))?;
            let mut elements = Vec::with_capacity(len.min(unpacker.remaining()));
            for _ in 0..len {
                elements.push(decode(inner, unpacker)?);
            }
            Value::Seq(elements)
        },
        Layout::Array(inner, n) => {
            let mut elements = Vec::with_capacity((*n).min(unpacker.remaining()));
            for _ in 0..*n {
                elements.push(decode(inner, unpacker)?);
            }
            Value::Seq(elements)
        },
        Layout::Option(inner) => {
            let mut peek = unpacker.clone();
            match peek.read_u8()? {
                0 => {
                    *unpacker = peek;
                    Value::None
                },
                1 => {
                    *unpacker = peek;
                    decode(inner, unpacker)?
                },
                tag => return Err(Error::InvalidDiscriminant(tag.into(), "Option")),
            }
        },
        Layout::Tuple(members) => Value::Tuple(members.iter().map(|m| decode(m, unpacker)).collect::<packbuf::Result<_>>()?),
        Layout::Map(k, v) => {
            let len = unpacker.unpack_len(k.min_size().saturating_add(v.min_size()).max(1))?;
            let mut entries = Vec::with_capacity(len.min(unpacker.remaining()));
            for _ in 0..len {
                let key = decode(k, unpacker)?;
                entries.push((key, decode(v, unpacker)?));
            }
            Value::Map(entries)
        },
    })
}

fn int<T: TryFrom<i128> + TryFrom<u128>>(layout: &Layout, sign: Sign, magnitude: u128) -> Result<T> {
    let out_of_range = || anyhow!("{}{} does not fit into {}", if sign == Sign::Neg { "-" } else { "" }, magnitude, layout);
    match sign {
        Sign::Pos => <T as TryFrom<u128>>::try_from(magnitude).map_err(|_| out_of_range()),
        Sign::Neg => {
            let v = 0i128.checked_sub_unsigned(magnitude).ok_or_else(out_of_range)?;
            <T as TryFrom<i128>>::try_from(v).map_err(|_| out_of_range())
        },
    }
}

fn mismatch(layout: &Layout, value: &Value) -> anyhow::Error {
    anyhow!("expected {} but found {}", layout, value.typename())
}

/// Encodes `value` according to `layout`. Values that don't match the layout, integers out of range among them, fail
/// with a message naming the expected layout.
pub fn encode(layout: &Layout, value: &Value, packer: &mut Packer<'_>) -> Result<()> {
    match (layout, value) {
        (Layout::Bool, Value::Bool(b)) => packer.pack(b)?,
        (Layout::U8, Value::Int(s, m)) => packer.pack(&int::<u8>(layout, *s, *m)?)?,
        (Layout::U16, Value::Int(s, m)) => packer.pack(&int::<u16>(layout, *s, *m)?)?,
        (Layout::U32, Value::Int(s, m)) => packer.pack(&int::<u32>(layout, *s, *m)?)?,
        (Layout::U64, Value::Int(s, m)) => packer.pack(&int::<u64>(layout, *s, *m)?)?,
        (Layout::U128, Value::Int(s, m)) => packer.pack(&int::<u128>(layout, *s, *m)?)?,
        (Layout::I8, Value::Int(s, m)) => packer.pack(&int::<i8>(layout, *s, *m)?)?,
        (Layout::I16, Value::Int(s, m)) => packer.pack(&int::<i16>(layout, *s, *m)?)?,
        (Layout::I32, Value::Int(s, m)) => packer.pack(&int::<i32>(layout, *s, *m)?)?,
        (Layout::I64, Value::Int(s, m)) => packer.pack(&int::<i64>(layout, *s, *m)?)?,
        (Layout::I128, Value::Int(s, m)) => packer.pack(&int::<i128>(layout, *s, *m)?)?,
        (Layout::F32, Value::F32(f)) => packer.pack(f)?,
        (Layout::F64, Value::F64(f)) => packer.pack(f)?,
        (Layout::Char, Value::Str(s)) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => packer.pack(&c)?,
                _ => bail!("expected a single character but found {:?}", s),
            }
        },
        (Layout::Str, Value::Str(s)) => packer.pack(&s.as_str())?,
        (Layout::Bytes, Value::Bytes(b)) => packer.pack(&b.as_slice())?,
        (Layout::Unit, Value::Unit) => {},
        (Layout::Seq(inner), Value::Seq(elements)) => {
            packer.pack_len(elements.len())?;
            for e in elements {
                encode(inner, e, packer)?;
            }
        },
        (Layout::Array(inner, n), Value::Seq(elements)) => {
            if elements.len() != *n {
                bail!("expected {} elements for {} but found {}", n, layout, elements.len());
            }
            for e in elements {
                encode(inner, e, packer)?;
            }
        },
        (Layout::Option(_), Value::None) => packer.write_bytes(&[0])?,
        (Layout::Option(inner), v) => {
            packer.write_bytes(&[1])?;
            encode(inner, v, packer)?;
        },
        (Layout::Tuple(members), Value::Tuple(values)) => {
            if members.len() != values.len() {
                bail!("expected {} members for {} but found {}", members.len(), layout, values.len());
            }
            for (m, v) in members.iter().zip(values) {
                encode(m, v, packer)?;
            }
        },
        (Layout::Map(k, v), Value::Map(entries)) => {
            packer.pack_len(entries.len())?;
            for (key, val) in entries {
                encode(k, key, packer)?;
                encode(v, val, packer)?;
            }
        },
        (layout, value) => return Err(mismatch(layout, value)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{decode, encode};
    use crate::parser::{parse_layout, parse_value};
    use packbuf::{Buffer, Error, Unpacker};

    fn encode_text(layout: &str, value: &str) -> anyhow::Result<Vec<u8>> {
        let mut buf = Buffer::new();
        encode(&parse_layout(layout)?, &parse_value(value)?, &mut buf.packer())?;
        Ok(buf.into_vec())
    }

    fn decode_text(layout: &str, bytes: &[u8]) -> packbuf::Result<String> {
        let layout = parse_layout(layout).unwrap();
        let mut unpacker = Unpacker::from_slice(bytes);
        let value = decode(&layout, &mut unpacker)?;
        assert!(unpacker.is_empty());
        Ok(value.to_string())
    }

    #[test]
    fn scenario_message() {
        let bytes = [0x01, 0x2a, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x68, 0x69];
        assert_eq!(encode_text("(bool, u32, str)", "(true, 42, \"hi\")").unwrap(), bytes);
        assert_eq!(decode_text("(bool, u32, str)", &bytes).unwrap(), "(\n  true,\n  42,\n  \"hi\",\n)");
    }

    #[test]
    fn empty_and_absent() {
        assert_eq!(encode_text("[u8]", "[]").unwrap(), [0, 0, 0, 0]);
        assert_eq!(decode_text("[u8]", &[0, 0, 0, 0]).unwrap(), "[]");
        assert_eq!(encode_text("?u32", "none").unwrap(), [0]);
        assert_eq!(encode_text("?u32", "7").unwrap(), [1, 7, 0, 0, 0]);
        assert_eq!(decode_text("?u32", &[0]).unwrap(), "none");
    }

    #[test]
    fn text_roundtrip() {
        let layout = "{str: ([i16; 2], ?char, bytes, f64, ())}";
        let text = "{\"a\": ([-1, 300], \"x\", 'AQI=', $$0.5, ()), \"b\": ([0, 0], none, '', $$-inf, ())}";
        let bytes = encode_text(layout, text).unwrap();
        let printed = decode_text(layout, &bytes).unwrap();
        assert_eq!(parse_value(&printed).unwrap(), parse_value(text).unwrap());
        assert_eq!(encode_text(layout, &printed).unwrap(), bytes);
    }

    #[test]
    fn integer_ranges() {
        assert_eq!(encode_text("i8", "-128").unwrap(), [0x80]);
        assert_eq!(encode_text("i128", "-170141183460469231731687303715884105728").unwrap(), i128::MIN.to_le_bytes());
        assert!(encode_text("u8", "256").is_err());
        assert!(encode_text("u8", "-1").is_err());
        assert!(encode_text("i8", "-129").is_err());
        assert_eq!(encode_text("u8", "-0").unwrap(), [0]);
    }

    #[test]
    fn mismatches() {
        assert!(encode_text("bool", "1").is_err());
        assert!(encode_text("[u8; 2]", "[1]").is_err());
        assert!(encode_text("(u8, u8)", "(1, 2, 3)").is_err());
        assert!(encode_text("char", "\"ab\"").is_err());
    }

    #[test]
    fn decoding_errors() {
        assert_eq!(decode_text("?u8", &[2, 0]), Err(Error::InvalidDiscriminant(2, "Option")));
        assert_eq!(decode_text("[u32]", &[9, 0, 0, 0, 1, 2]), Err(Error::LengthExceedsBuffer(9, 2)));
        assert_eq!(decode_text("{u8: u8}", &[2, 0, 0, 0, 1, 2, 3]), Err(Error::LengthExceedsBuffer(2, 3)));
        assert_eq!(decode_text("u16", &[1]), Err(Error::BufferUnderflow(2, 1)));
    }

    #[test]
    fn zero_width_elements() {
        assert_eq!(decode_text("[()]", &[0, 0, 0, 1]), Err(Error::LengthExceedsBuffer(16_777_216, 0)));
        assert_eq!(decode_text("{(): ()}", &[0xff; 4]), Err(Error::LengthExceedsBuffer(u32::MAX as usize, 0)));
        assert_eq!(decode_text("([()], u16)", &[2, 0, 0, 0, 7, 0]).unwrap(), "(\n  [\n    (),\n    (),\n  ],\n  7,\n)");
    }
}
