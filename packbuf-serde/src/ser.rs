use serde::{ser, Serialize};
use packbuf::{Buffer, Packer};

use crate::error::{Error, Result};
use crate::size::serialized_size;

/// Writes serde's data model through a [`Packer`]. The produced bytes are exactly what the matching built-in
/// [`packbuf::Codec`] implementations would produce.
pub struct Serializer<'b> {
    packer: Packer<'b>,
}

impl<'b> Serializer<'b> {
    pub fn new(buf: &'b mut Buffer) -> Self {
        Serializer { packer: Packer::new(buf) }
    }
}

/// Serializes into a fresh vector. The size of the message is computed in a first pass, so the vector is allocated
/// exactly once.
pub fn to_bytes<T: ?Sized + Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Buffer::try_with_capacity(serialized_size(value)?)?;
    to_buffer(&mut buf, value)?;
    Ok(buf.into_vec())
}

/// Appends the serialization of `value` to `buf`. On error the buffer holds a truncated message and should be
/// discarded.
pub fn to_buffer<T: ?Sized + Serialize>(buf: &mut Buffer, value: &T) -> Result<()> {
    value.serialize(&mut Serializer::new(buf))
}

impl<'a, 'b> ser::Serializer for &'a mut Serializer<'b> {

    type Ok = ();
    type Error = Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, v: bool) -> Result<()> {
        Ok(self.packer.pack(&v)?)
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        Ok(self.packer.pack(&v)?)
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        Ok(self.packer.pack(&v)?)
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        Ok(self.packer.pack(&v)?)
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        Ok(self.packer.pack(&v)?)
    }

    fn serialize_i128(self, v: i128) -> Result<()> {
        Ok(self.packer.pack(&v)?)
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        Ok(self.packer.pack(&v)?)
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        Ok(self.packer.pack(&v)?)
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        Ok(self.packer.pack(&v)?)
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        Ok(self.packer.pack(&v)?)
    }

    fn serialize_u128(self, v: u128) -> Result<()> {
        Ok(self.packer.pack(&v)?)
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        Ok(self.packer.pack(&v)?)
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        Ok(self.packer.pack(&v)?)
    }

    fn serialize_char(self, v: char) -> Result<()> {
        Ok(self.packer.pack(&v)?)
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        Ok(self.packer.pack(&v)?)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        Ok(self.packer.pack(&v)?)
    }

    fn serialize_none(self) -> Result<()> {
        Ok(self.packer.write_bytes(&[0])?)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<()> {
        self.packer.write_bytes(&[1])?;
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(self, _name: &'static str, index: u32, _variant: &'static str) -> Result<()> {
        Ok(self.packer.pack(&index)?)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _name: &'static str, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(self, _name: &'static str, index: u32, _variant: &'static str, value: &T) -> Result<()> {
        self.packer.pack(&index)?;
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        match len {
            Some(l) => {
                self.packer.pack_len(l)?;
                Ok(self)
            },
            None => Err(Error::Length),
        }
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeTupleStruct> {
        Ok(self)
    }

    fn serialize_tuple_variant(self, _name: &'static str, index: u32, _variant: &'static str, _len: usize) -> Result<Self::SerializeTupleVariant> {
        self.packer.pack(&index)?;
        Ok(self)
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        match len {
            Some(l) => {
                self.packer.pack_len(l)?;
                Ok(self)
            },
            None => Err(Error::Length),
        }
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(self)
    }

    fn serialize_struct_variant(self, _name: &'static str, index: u32, _variant: &'static str, _len: usize) -> Result<Self::SerializeStructVariant> {
        self.packer.pack(&index)?;
        Ok(self)
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

impl<'a, 'b> ser::SerializeSeq for &'a mut Serializer<'b> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, 'b> ser::SerializeTuple for &'a mut Serializer<'b> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, 'b> ser::SerializeTupleStruct for &'a mut Serializer<'b> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, 'b> ser::SerializeTupleVariant for &'a mut Serializer<'b> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, 'b> ser::SerializeMap for &'a mut Serializer<'b> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        key.serialize(&mut **self)
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, 'b> ser::SerializeStruct for &'a mut Serializer<'b> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _key: &'static str, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, 'b> ser::SerializeStructVariant for &'a mut Serializer<'b> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _key: &'static str, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}
