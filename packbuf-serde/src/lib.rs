//! Conveniently serialize and deserialize your Rust data structures into the `packbuf` wire format.
//!
//! The bytes are the same the hand-written [`packbuf::Codec`] implementations produce, so a derived type and a
//! manual codec can read each other's messages. Structs and tuples are their fields in declared order, sequences and
//! maps carry a `u32` count, `Option` a presence byte and enums a `u32` variant index in front of the payload.
//!
//! # Limitations
//!
//! The format is not self-describing. Anything that makes serde ask the format for the type, like
//! `#[serde(untagged)]`, `#[serde(flatten)]` or internally tagged enums, fails with [`Error::AnyNotSupported`].
//! Skipping fields conditionally with `#[serde(skip_serializing_if = "...")]` shifts all following fields and cannot
//! be decoded. Sequences and maps need to know their length up front.
//!
//! serde does not tell the format how many bytes an element takes, so element counts cannot be checked against the
//! remaining input the way [`packbuf::Codec`] does it. A count too large for the input is only noticed when the
//! elements run out, and fails with [`packbuf::Error::BufferUnderflow`] where a codec reports
//! [`packbuf::Error::LengthExceedsBuffer`]. Preallocation never exceeds the number of unread bytes either way.
//!
//! # Examples
//!
//! ```
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! pub enum Species {
//!     PrionailurusViverrinus,
//!     LynxLynx,
//!     FelisCatus,
//! }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! pub struct Cat<'a> {
//!     name: &'a str,
//!     species: Species,
//! }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Message<'a> {
//!     version: u8,
//!     #[serde(borrow)]
//!     cats: Vec<Cat<'a>>,
//! }
//!
//! let msg = Message {
//!     version: 1,
//!     cats: vec![Cat { name: "Tom", species: Species::LynxLynx }],
//! };
//!
//! let bytes = packbuf_serde::to_bytes(&msg).unwrap();
//! assert_eq!(bytes, [
//!     0x01,                   // version
//!     0x01, 0x00, 0x00, 0x00, // one cat
//!     0x03, 0x00, 0x00, 0x00, // name of length 3
//!     0x54, 0x6f, 0x6d,       // 'Tom'
//!     0x01, 0x00, 0x00, 0x00, // variant index of LynxLynx
//! ]);
//!
//! let deserialized = packbuf_serde::from_bytes(&bytes).unwrap();
//! assert_eq!(msg, deserialized);
//! ```

mod de;
mod error;
mod ser;
mod size;

pub use de::{from_buffer, from_bytes, Deserializer};
pub use error::{DeserializationError, Error, Result};
pub use ser::{to_buffer, to_bytes, Serializer};
pub use size::serialized_size;

#[cfg(test)]
mod tests {
    use serde::{Serialize, Deserialize};
    use std::collections::{BTreeMap, HashMap};
    use super::{from_bytes, serialized_size, to_buffer, to_bytes, Error};
    use packbuf::{Buffer, Codec, Packer, Unpacker};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    enum Enum {
        UnitVariant,
        NewtypeVariant(bool),
        TupleVariant(f32, f32),
        StructVariant{ a: usize, b: usize, c: usize },
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Struct {
        field: u8,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct UnitStruct;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct NewtypeStruct(String);

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct TupleStruct(char, char, char);

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Test {
        bool: bool,
        i8: i8,
        i16: i16,
        i32: i32,
        i64: i64,
        i128: i128,
        u8: u8,
        u16: u16,
        u32: u32,
        u64: u64,
        u128: u128,
        f32: f32,
        f64: f64,
        char: char,
        str: String,
        #[serde(with = "serde_bytes")]
        bytes: Vec<u8>,
        none: Option<u8>,
        some: Option<u8>,
        unit: (),
        unit_struct: UnitStruct,
        newtype_struct: NewtypeStruct,
        tuple_struct: TupleStruct,
        seq: Vec<String>,
        tuple: (u16, u16, u16),
        array: [u8; 3],
        map: HashMap<usize, String>,
        r#struct: Struct,
        unit_variant: Enum,
        newtype_variant: Enum,
        tuple_variant: Enum,
        struct_variant: Enum,
    }

    #[test]
    fn roundtrip() {
        let message = Test {
            bool: true,
            i8: -1,
            i16: -20,
            i32: -7000,
            i64: i64::MIN,
            i128: i128::MIN + 1,
            u8: 1,
            u16: 20,
            u32: 7000,
            u64: u64::MAX,
            u128: u128::MAX,
            f32: 1337.8472,
            f64: 1337.8472,
            char: 'x',
            str: "Test".to_string(),
            bytes: vec![0x00, 0xff, 0x10, 0x80],
            none: None,
            some: Some(0),
            unit: (),
            unit_struct: UnitStruct,
            newtype_struct: NewtypeStruct("Qapla'".to_string()),
            tuple_struct: TupleStruct('a', 'ß', '🦀'),
            seq: vec![
                "Elen".to_string(),
                "síla".to_string(),
                "lúmenn'".to_string(),
                "omentielvo".to_string(),
            ],
            tuple: (0, 0, 0),
            array: [7, 8, 9],
            map: [
                (1701, "Enterprise".to_string()),
                (74656, "Voyager".to_string())
            ].into_iter().collect(),
            r#struct: Struct {
                field: 42,
            },
            unit_variant: Enum::UnitVariant,
            newtype_variant: Enum::NewtypeVariant(false),
            tuple_variant: Enum::TupleVariant(1.0, 0.999),
            struct_variant: Enum::StructVariant {
                a: 255,
                b: 0,
                c: 33,
            }
        };
        let bytes = to_bytes(&message).unwrap();
        assert_eq!(bytes.len(), serialized_size(&message).unwrap());
        assert_eq!(message, from_bytes::<Test>(&bytes).unwrap());
    }

    #[test]
    fn same_bytes_as_codec() {
        assert_eq!(to_bytes(&(true, 42u32, "hi")).unwrap(), [1, 42, 0, 0, 0, 2, 0, 0, 0, b'h', b'i']);
        let value = (Some(-3i16), vec![1.5f64, -0.0], 'λ', 9usize);
        assert_eq!(to_bytes(&value).unwrap(), packbuf::to_bytes(&value).unwrap());
        let map: BTreeMap<u8, Option<String>> = [(1, None), (2, Some("x".to_string()))].into_iter().collect();
        let bytes = to_bytes(&map).unwrap();
        assert_eq!(bytes, packbuf::to_bytes(&map).unwrap());
        assert_eq!(packbuf::from_bytes::<BTreeMap<u8, Option<String>>>(&bytes).unwrap(), map);
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl<'de> Codec<'de> for Point {
        const MIN_SIZE: usize = 8;

        fn encode(&self, packer: &mut Packer<'_>) -> packbuf::Result<()> {
            packer.pack(&self.x)?;
            packer.pack(&self.y)
        }

        fn decode(unpacker: &mut Unpacker<'de>) -> packbuf::Result<Self> {
            Ok(Point { x: unpacker.unpack()?, y: unpacker.unpack()? })
        }
    }

    #[test]
    fn derived_and_manual_interoperate() {
        let points = vec![Point { x: 1, y: -1 }, Point { x: i32::MAX, y: 0 }];
        let bytes = to_bytes(&points).unwrap();
        assert_eq!(bytes, packbuf::to_bytes(&points).unwrap());
        assert_eq!(packbuf::from_bytes::<Vec<Point>>(&bytes).unwrap(), points);
    }

    #[test]
    fn enum_layout() {
        assert_eq!(to_bytes(&Enum::UnitVariant).unwrap(), [0, 0, 0, 0]);
        assert_eq!(to_bytes(&Enum::NewtypeVariant(true)).unwrap(), [1, 0, 0, 0, 1]);
        assert_eq!(to_bytes(&Enum::StructVariant { a: 1, b: 2, c: 3 }).unwrap().len(), 4 + 3 * 8);
        let err = from_bytes::<Enum>(&[4, 0, 0, 0]).unwrap_err();
        assert_eq!(err.position(), 0);
        assert!(matches!(err.into_inner(), Error::Pack(packbuf::Error::InvalidDiscriminant(4, "Enum"))));
    }

    #[test]
    fn trailing_bytes() {
        let err = from_bytes::<u16>(&[1, 0, 0]).unwrap_err();
        assert_eq!(err.position(), 2);
        assert!(matches!(err.into_inner(), Error::Trailing));
    }

    #[test]
    fn unknown_length() {
        struct Unsized;

        impl Serialize for Unsized {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(None)?;
                seq.serialize_element(&1u8)?;
                seq.end()
            }
        }

        assert!(matches!(to_bytes(&Unsized), Err(Error::Length)));
        assert!(matches!(serialized_size(&Unsized), Err(Error::Length)));
    }

    #[test]
    fn appends_to_buffer() {
        let mut buf = Buffer::with_capacity(1);
        to_buffer(&mut buf, &1u8).unwrap();
        to_buffer(&mut buf, &Point { x: 2, y: 3 }).unwrap();
        assert_eq!(buf.as_slice(), [1, 2, 0, 0, 0, 3, 0, 0, 0]);
    }
}
