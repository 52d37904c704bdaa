use serde::ser::{self, Serialize};

use crate::error::{Error, Result};

/// Walks a value like the [`Serializer`](crate::Serializer) does but only adds up the number of bytes it would write.
pub struct SizeCounter {
    size: usize,
}

/// Returns the exact number of bytes [`to_bytes`](crate::to_bytes) produces for `value`.
pub fn serialized_size<T: ?Sized + Serialize>(value: &T) -> Result<usize> {
    let mut counter = SizeCounter { size: 0 };
    value.serialize(&mut counter)?;
    Ok(counter.size)
}

impl SizeCounter {

    #[inline]
    fn add(&mut self, n: usize) -> Result<()> {
        self.size = self.size.checked_add(n).ok_or(Error::Pack(packbuf::Error::Length(u64::MAX)))?;
        Ok(())
    }

    /// Mirrors `Packer::pack_len`, which refuses lengths beyond `u32::MAX`
    #[inline]
    fn add_len(&mut self, len: usize) -> Result<()> {
        u32::try_from(len).map_err(|_| Error::Pack(packbuf::Error::Length(len as u64)))?;
        self.add(4)
    }
}

impl<'a> ser::Serializer for &'a mut SizeCounter {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _v: bool) -> Result<()> {
        self.add(1)
    }

    fn serialize_i8(self, _v: i8) -> Result<()> {
        self.add(1)
    }

    fn serialize_i16(self, _v: i16) -> Result<()> {
        self.add(2)
    }

    fn serialize_i32(self, _v: i32) -> Result<()> {
        self.add(4)
    }

    fn serialize_i64(self, _v: i64) -> Result<()> {
        self.add(8)
    }

    fn serialize_i128(self, _v: i128) -> Result<()> {
        self.add(16)
    }

    fn serialize_u8(self, _v: u8) -> Result<()> {
        self.add(1)
    }

    fn serialize_u16(self, _v: u16) -> Result<()> {
        self.add(2)
    }

    fn serialize_u32(self, _v: u32) -> Result<()> {
        self.add(4)
    }

    fn serialize_u64(self, _v: u64) -> Result<()> {
        self.add(8)
    }

    fn serialize_u128(self, _v: u128) -> Result<()> {
        self.add(16)
    }

    fn serialize_f32(self, _v: f32) -> Result<()> {
        self.add(4)
    }

    fn serialize_f64(self, _v: f64) -> Result<()> {
        self.add(8)
    }

    fn serialize_char(self, _v: char) -> Result<()> {
        self.add(4)
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.add_len(v.len())?;
        self.add(v.len())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.add_len(v.len())?;
        self.add(v.len())
    }

    fn serialize_none(self) -> Result<()> {
        self.add(1)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<()> {
        self.add(1)?;
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_variant(self, _name: &'static str, _index: u32, _variant: &'static str) -> Result<()> {
        self.add(4)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _name: &'static str, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(self, _name: &'static str, _index: u32, _variant: &'static str, value: &T) -> Result<()> {
        self.add(4)?;
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        match len {
            Some(l) => {
                self.add_len(l)?;
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

    fn serialize_tuple_variant(self, _name: &'static str, _index: u32, _variant: &'static str, _len: usize) -> Result<Self::SerializeTupleVariant> {
        self.add(4)?;
        Ok(self)
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        match len {
            Some(l) => {
                self.add_len(l)?;
                Ok(self)
            },
            None => Err(Error::Length),
        }
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(self)
    }

    fn serialize_struct_variant(self, _name: &'static str, _index: u32, _variant: &'static str, _len: usize) -> Result<Self::SerializeStructVariant> {
        self.add(4)?;
        Ok(self)
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

impl<'a> ser::SerializeSeq for &'a mut SizeCounter {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeTuple for &'a mut SizeCounter {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeTupleStruct for &'a mut SizeCounter {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeTupleVariant for &'a mut SizeCounter {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeMap for &'a mut SizeCounter {
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

impl<'a> ser::SerializeStruct for &'a mut SizeCounter {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _key: &'static str, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeStructVariant for &'a mut SizeCounter {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _key: &'static str, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::serialized_size;
    use crate::to_bytes;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    enum Shape {
        Dot,
        Circle(f64),
        Rect { w: u16, h: u16 },
    }

    #[test]
    fn matches_serializer_output() {
        let shapes = vec![Shape::Dot, Shape::Circle(1.0), Shape::Rect { w: 3, h: 4 }];
        assert_eq!(serialized_size(&shapes).unwrap(), to_bytes(&shapes).unwrap().len());
        let map = BTreeMap::from([("key", Some(vec![1u128, 2])), ("other", None)]);
        assert_eq!(serialized_size(&map).unwrap(), to_bytes(&map).unwrap().len());
        assert_eq!(serialized_size(&(true, 42u32, "hi")).unwrap(), 11);
        assert_eq!(serialized_size(&()).unwrap(), 0);
    }
}
