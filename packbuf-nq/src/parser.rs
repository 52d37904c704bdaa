use nom::{
    character::complete::{digit0, digit1, none_of, one_of},
    Finish,
    IResult,
    combinator::{all_consuming, map, map_res, opt, recognize, value},
    multi::separated_list0,
    sequence::{delimited, pair, preceded, terminated, tuple},
    branch::alt,
    bytes::complete::{tag, take_while, escaped_transform},
};
use anyhow::{anyhow, Result};
use crate::layout::Layout;
use crate::value::{Sign, Value};

const WHITESPACE: &str = " \t\r\n";
const B64_CHARS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/=";

fn white(i: &str) -> IResult<&str, &str> {
    take_while(move |c| WHITESPACE.contains(c))(i)
}

/// `open item, item, ... close` with optional whitespace everywhere and an optional trailing comma
fn items<'a, O, F>(open: &'static str, close: &'static str, item: F) -> impl FnMut(&'a str) -> IResult<&'a str, Vec<O>>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(
        pair(tag(open), white),
        terminated(separated_list0(tuple((white, tag(","), white)), item), pair(white, opt(pair(tag(","), white)))),
        tag(close),
    )
}

fn unsigned_layout(i: &str) -> IResult<&str, Layout> {
    alt((
        value(Layout::U8, tag("u8")),
        value(Layout::U16, tag("u16")),
        value(Layout::U32, tag("u32")),
        value(Layout::U64, tag("u64")),
        value(Layout::U128, tag("u128")),
    ))(i)
}

fn signed_layout(i: &str) -> IResult<&str, Layout> {
    alt((
        value(Layout::I8, tag("i8")),
        value(Layout::I16, tag("i16")),
        value(Layout::I32, tag("i32")),
        value(Layout::I64, tag("i64")),
        value(Layout::I128, tag("i128")),
    ))(i)
}

fn scalar_layout(i: &str) -> IResult<&str, Layout> {
    alt((
        unsigned_layout,
        signed_layout,
        value(Layout::Bool, tag("bool")),
        value(Layout::F32, tag("f32")),
        value(Layout::F64, tag("f64")),
        value(Layout::Char, tag("char")),
        value(Layout::Str, tag("str")),
        value(Layout::Bytes, tag("bytes")),
    ))(i)
}

fn seq_layout(i: &str) -> IResult<&str, Layout> {
    map(
        delimited(
            pair(tag("["), white),
            pair(layout, opt(preceded(tuple((white, tag(";"), white)), map_res(digit1, |n: &str| n.parse::<usize>())))),
            pair(white, tag("]")),
        ),
        |(inner, n)| match n {
            Some(n) => Layout::Array(Box::new(inner), n),
            None => Layout::Seq(Box::new(inner)),
        }
    )(i)
}

fn option_layout(i: &str) -> IResult<&str, Layout> {
    map(preceded(pair(tag("?"), white), layout), |inner| Layout::Option(Box::new(inner)))(i)
}

fn tuple_layout(i: &str) -> IResult<&str, Layout> {
    map(items("(", ")", layout), |members| if members.is_empty() { Layout::Unit } else { Layout::Tuple(members) })(i)
}

fn map_layout(i: &str) -> IResult<&str, Layout> {
    map(
        delimited(pair(tag("{"), white), tuple((layout, white, tag(":"), white, layout)), pair(white, tag("}"))),
        |(k, _, _, _, v)| Layout::Map(Box::new(k), Box::new(v))
    )(i)
}

fn layout(i: &str) -> IResult<&str, Layout> {
    alt((scalar_layout, seq_layout, option_layout, tuple_layout, map_layout))(i)
}

/// Parses a layout expression like `(bool, u32, [?str])`.
pub fn parse_layout(i: &str) -> Result<Layout> {
    Ok(all_consuming(delimited(white, layout, white))(i).finish().map_err(|e| anyhow!("{}", e))?.1)
}

fn float(i: &str) -> IResult<&str, &str> {
    recognize(pair(
        opt(tag("-")),
        alt((
            tag("inf"),
            tag("NaN"),
            recognize(tuple((
                digit1,
                opt(pair(tag("."), digit0)),
                opt(tuple((one_of("eE"), opt(one_of("+-")), digit1)))
            ))),
        ))
    ))(i)
}

fn float32(i: &str) -> IResult<&str, f32> {
    map_res(preceded(tag("$"), float), |n| n.parse())(i)
}

fn float64(i: &str) -> IResult<&str, f64> {
    map_res(preceded(tag("$$"), float), |n| n.parse())(i)
}

fn intn(i: &str) -> IResult<&str, u128> {
    map_res(preceded(tag("-"), digit1), |n: &str| n.parse())(i)
}

fn intp(i: &str) -> IResult<&str, u128> {
    map_res(digit1, |n: &str| n.parse())(i)
}

fn bytes(i: &str) -> IResult<&str, Vec<u8>> {
    map_res(delimited(tag("'"), take_while(move |c| B64_CHARS.contains(c)), tag("'")), |b: &str| base64::decode(b))(i)
}

fn string(i: &str) -> IResult<&str, String> {
    delimited(
            tag("\""),
            map(opt(escaped_transform(
                none_of("\\\""),
                '\\',
                alt((
                        value("\\", tag("\\")),
                        value("\"", tag("\"")),
                        value("\n", tag("n")),
                )))), |c| c.unwrap_or_default()),
            tag("\"")
    )(i)
}

fn keyword(i: &str) -> IResult<&str, Value> {
    alt((
            value(Value::None, tag("none")),
            value(Value::Bool(true), tag("true")),
            value(Value::Bool(false), tag("false")),
    ))(i)
}

fn entry(i: &str) -> IResult<&str, (Value, Value)> {
    map(tuple((pbq_value, white, tag(":"), white, pbq_value)), |(k, _, _, _, v)| (k, v))(i)
}

fn pbq_value(i: &str) -> IResult<&str, Value> {
    alt((
        map(string, Value::Str),
        map(bytes, Value::Bytes),
        map(intn, |i| Value::Int(Sign::Neg, i)),
        map(intp, |i| Value::Int(Sign::Pos, i)),
        map(float64, Value::F64),
        map(float32, Value::F32),
        keyword,
        map(items("[", "]", pbq_value), Value::Seq),
        map(items("(", ")", pbq_value), |v| if v.is_empty() { Value::Unit } else { Value::Tuple(v) }),
        map(items("{", "}", entry), Value::Map),
    ))(i)
}

/// Parses the text notation `pbq` prints, e.g. `(true, 42, "hi")`.
pub fn parse_value(i: &str) -> Result<Value> {
    Ok(all_consuming(delimited(white, pbq_value, white))(i).finish().map_err(|e| anyhow!("{}", e))?.1)
}

#[cfg(test)]
mod tests {
    use super::{parse_layout, parse_value};
    use crate::layout::Layout;
    use crate::value::{Sign, Value};

    #[test]
    fn layouts() {
        assert_eq!(parse_layout("(bool, u32, str)").unwrap(), Layout::Tuple(vec![Layout::Bool, Layout::U32, Layout::Str]));
        assert_eq!(parse_layout(" [ ?u8 ; 3 ] ").unwrap(), Layout::Array(Box::new(Layout::Option(Box::new(Layout::U8))), 3));
        assert_eq!(parse_layout("{str: [i128]}").unwrap(), Layout::Map(Box::new(Layout::Str), Box::new(Layout::Seq(Box::new(Layout::I128)))));
        assert_eq!(parse_layout("()").unwrap(), Layout::Unit);
        assert_eq!(parse_layout("(u16,)").unwrap(), Layout::Tuple(vec![Layout::U16]));
        assert!(parse_layout("u7").is_err());
        assert!(parse_layout("[u8").is_err());
        assert!(parse_layout("u8 u8").is_err());
    }

    #[test]
    fn layout_display_reparses() {
        for text in ["{str: (?i8, [f64; 2])}", "[bytes]", "(char, u64, ())"] {
            assert_eq!(parse_layout(text).unwrap().to_string(), text);
        }
    }

    #[test]
    fn scalars() {
        assert_eq!(parse_value("-5").unwrap(), Value::Int(Sign::Neg, 5));
        assert_eq!(parse_value("340282366920938463463374607431768211455").unwrap(), Value::unsigned(u128::MAX));
        assert_eq!(parse_value("$1.5").unwrap(), Value::F32(1.5));
        assert_eq!(parse_value("$$-2e3").unwrap(), Value::F64(-2000.0));
        assert!(matches!(parse_value("$NaN").unwrap(), Value::F32(v) if v.is_nan()));
        assert_eq!(parse_value("$$-inf").unwrap(), Value::F64(f64::NEG_INFINITY));
        assert_eq!(parse_value(r#""a\"b\\c\nd""#).unwrap(), Value::Str("a\"b\\c\nd".into()));
        assert_eq!(parse_value(r#""""#).unwrap(), Value::Str(String::new()));
        assert_eq!(parse_value("'3q2+7w=='").unwrap(), Value::Bytes(vec![0xde, 0xad, 0xbe, 0xef]));
        assert_eq!(parse_value("''").unwrap(), Value::Bytes(vec![]));
        assert_eq!(parse_value("none").unwrap(), Value::None);
        assert_eq!(parse_value("()").unwrap(), Value::Unit);
        assert!(parse_value("'not base64!'").is_err());
    }

    #[test]
    fn aggregates() {
        assert_eq!(parse_value("(true, 42, \"hi\")").unwrap(), Value::Tuple(vec![
            Value::Bool(true),
            Value::unsigned(42),
            Value::Str("hi".into()),
        ]));
        assert_eq!(parse_value("{1: [], 2: [none, 3,]}").unwrap(), Value::Map(vec![
            (Value::unsigned(1), Value::Seq(vec![])),
            (Value::unsigned(2), Value::Seq(vec![Value::None, Value::unsigned(3)])),
        ]));
    }

    #[test]
    fn display_reparses() {
        let value = Value::Tuple(vec![
            Value::Bool(false),
            Value::Seq(vec![Value::signed(-1), Value::None]),
            Value::Map(vec![(Value::Str("k".into()), Value::Bytes(vec![1, 2, 3]))]),
            Value::F64(0.1),
            Value::Seq(vec![]),
        ]);
        assert_eq!(parse_value(&value.to_string()).unwrap(), value);
    }
}
