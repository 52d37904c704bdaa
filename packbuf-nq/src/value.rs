//! The textual side of `pbq`. A `Value` is what a message looks like once a [`Layout`](crate::layout::Layout) has
//! been applied to its bytes.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Pos,
    Neg,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unit,
    Bool(bool),
    /// Magnitude and sign, wide enough for every integer from `i128::MIN` to `u128::MAX`
    Int(Sign, u128),
    F32(f32),
    F64(f64),
    Str(String),
    Bytes(Vec<u8>),
    None,
    Seq(Vec<Value>),
    Tuple(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

impl Value {

    pub fn unsigned(v: u128) -> Value {
        Value::Int(Sign::Pos, v)
    }

    pub fn signed(v: i128) -> Value {
        if v < 0 {
            Value::Int(Sign::Neg, v.unsigned_abs())
        } else {
            Value::Int(Sign::Pos, v.unsigned_abs())
        }
    }

    pub fn typename(&self) -> &'static str {
        match *self {
            Self::Unit      => "unit",
            Self::Bool(_)   => "bool",
            Self::Int(_, _) => "integer",
            Self::F32(_)    => "f32",
            Self::F64(_)    => "f64",
            Self::Str(_)    => "string",
            Self::Bytes(_)  => "bytes",
            Self::None      => "none",
            Self::Seq(_)    => "sequence",
            Self::Tuple(_)  => "tuple",
            Self::Map(_)    => "map",
        }
    }

    fn block<I: Iterator<Item = String>>(f: &mut fmt::Formatter<'_>, open: &str, close: &str, items: I) -> fmt::Result {
        let lines = items
            .flat_map(|item| format!("{},", item).lines().map(|line| format!("  {}", line)).collect::<Vec<String>>())
            .collect::<Vec<String>>();
        if lines.is_empty() {
            write!(f, "{}{}", open, close)
        } else {
            write!(f, "{}\n{}\n{}", open, lines.join("\n"), close)
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit         => f.write_str("()"),
            Value::Bool(true)   => f.write_str("true"),
            Value::Bool(false)  => f.write_str("false"),
            Value::Int(s, v)    => write!(f, "{}{}", match s { Sign::Pos => "", Sign::Neg => "-" }, v),
            Value::F32(v)       => write!(f, "${}", v),
            Value::F64(v)       => write!(f, "$${}", v),
            Value::Str(v)       => write!(f, "\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")),
            Value::Bytes(v)     => write!(f, "'{}'", base64::encode(v)),
            Value::None         => f.write_str("none"),
            Value::Seq(v)       => Self::block(f, "[", "]", v.iter().map(|e| e.to_string())),
            Value::Tuple(v)     => Self::block(f, "(", ")", v.iter().map(|e| e.to_string())),
            Value::Map(v)       => Self::block(f, "{", "}", v.iter().map(|(k, e)| format!("{}: {}", k, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Sign, Value};

    #[test]
    fn scalars() {
        assert_eq!(Value::signed(i128::MIN).to_string(), i128::MIN.to_string());
        assert_eq!(Value::signed(-5), Value::Int(Sign::Neg, 5));
        assert_eq!(Value::unsigned(u128::MAX).to_string(), u128::MAX.to_string());
        assert_eq!(Value::F32(1.5).to_string(), "$1.5");
        assert_eq!(Value::F64(-0.25).to_string(), "$$-0.25");
        assert_eq!(Value::Str("a\"b\\c\nd".into()).to_string(), r#""a\"b\\c\nd""#);
        assert_eq!(Value::Bytes(vec![0xde, 0xad, 0xbe, 0xef]).to_string(), "'3q2+7w=='");
    }

    #[test]
    fn nested() {
        let value = Value::Tuple(vec![
            Value::Bool(true),
            Value::Seq(vec![Value::unsigned(1), Value::None]),
            Value::Map(vec![(Value::Str("k".into()), Value::Unit)]),
            Value::Seq(vec![]),
        ]);
        assert_eq!(value.to_string(), "(\n  true,\n  [\n    1,\n    none,\n  ],\n  {\n    \"k\": (),\n  },\n  [],\n)");
    }
}
