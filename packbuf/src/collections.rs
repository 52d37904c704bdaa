//! Codecs for optional values, sequences, maps, fixed arrays and tuples.
//!
//! Sequences, sets and maps carry a `u32` element count. Decoders validate the count against the remaining input
//! before they allocate. Hash based containers are written in iteration order, so their bytes may differ between two
//! encodings of equal values, while decoding always yields an equal container. On duplicate keys the last entry wins.

use crate::codec::Codec;
use crate::error::{Error, Result};
use crate::packer::Packer;
use crate::unpacker::Unpacker;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};

const NONE: u8 = 0;
const SOME: u8 = 1;

/// One presence byte, followed by the value if there is one. Any presence byte besides `0` and `1` is rejected.
impl<'de, T: Codec<'de>> Codec<'de> for Option<T> {
    const MIN_SIZE: usize = 1;

    fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
        match self {
            None => packer.write_bytes(&[NONE]),
            Some(value) => {
                packer.write_bytes(&[SOME])?;
                packer.pack(value)
            }
        }
    }

    fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
        let start = unpacker.clone();
        match unpacker.read_u8()? {
            NONE => Ok(None),
            SOME => unpacker.unpack().map(Some),
            tag => {
                *unpacker = start;
                Err(Error::InvalidDiscriminant(u32::from(tag), "Option"))
            }
        }
    }
}

impl<'de, T: Codec<'de>> Codec<'de> for Box<T> {
    const MIN_SIZE: usize = T::MIN_SIZE;

    fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
        packer.pack(&**self)
    }

    fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
        unpacker.unpack().map(Box::new)
    }
}

/// The per-element size a count is checked against. Elements which take no bytes on wire but still occupy memory
/// count as one byte, so a count can never ask for more of them than there is input left.
const fn guard_size<T>(wire: usize) -> usize {
    if wire == 0 && std::mem::size_of::<T>() != 0 { 1 } else { wire }
}

/// Preallocates room for `len` elements, reporting failure instead of aborting.
fn vec_with_capacity<T>(len: usize) -> Result<Vec<T>> {
    let mut elements = Vec::new();
    elements
        .try_reserve(len)
        .map_err(|_| Error::OutOfMemory(len.saturating_mul(std::mem::size_of::<T>())))?;
    Ok(elements)
}

fn encode_seq<'a, 'de, T, I>(packer: &mut Packer<'_>, len: usize, elements: I) -> Result<()>
where
    T: Codec<'de> + 'a,
    I: IntoIterator<Item = &'a T>,
{
    packer.pack_len(len)?;
    for element in elements {
        packer.pack(element)?;
    }
    Ok(())
}

impl<'de, T: Codec<'de>> Codec<'de> for Vec<T> {
    const MIN_SIZE: usize = 4;

    fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
        encode_seq(packer, self.len(), self)
    }

    fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
        let len = unpacker.unpack_len(guard_size::<T>(T::MIN_SIZE))?;
        let mut elements = vec_with_capacity(len)?;
        for _ in 0..len {
            elements.push(unpacker.unpack()?);
        }
        Ok(elements)
    }
}

impl<'de, T: Codec<'de>> Codec<'de> for VecDeque<T> {
    const MIN_SIZE: usize = 4;

    fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
        encode_seq(packer, self.len(), self)
    }

    fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
        Vec::<T>::decode(unpacker).map(VecDeque::from)
    }
}

impl<'de, T: Codec<'de> + Ord> Codec<'de> for BTreeSet<T> {
    const MIN_SIZE: usize = 4;

    fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
        encode_seq(packer, self.len(), self)
    }

    fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
        let len = unpacker.unpack_len(guard_size::<T>(T::MIN_SIZE))?;
        let mut set = BTreeSet::new();
        for _ in 0..len {
            set.insert(unpacker.unpack()?);
        }
        Ok(set)
    }
}

impl<'de, T, S> Codec<'de> for HashSet<T, S>
where
    T: Codec<'de> + Eq + Hash,
    S: BuildHasher + Default,
{
    const MIN_SIZE: usize = 4;

    fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
        encode_seq(packer, self.len(), self)
    }

    fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
        let len = unpacker.unpack_len(guard_size::<T>(T::MIN_SIZE))?;
        let mut set = HashSet::with_hasher(S::default());
        set.try_reserve(len)
            .map_err(|_| Error::OutOfMemory(len.saturating_mul(std::mem::size_of::<T>())))?;
        for _ in 0..len {
            set.insert(unpacker.unpack()?);
        }
        Ok(set)
    }
}

fn encode_map<'a, 'de, K, V, I>(packer: &mut Packer<'_>, len: usize, entries: I) -> Result<()>
where
    K: Codec<'de> + 'a,
    V: Codec<'de> + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    packer.pack_len(len)?;
    for (key, value) in entries {
        packer.pack(key)?;
        packer.pack(value)?;
    }
    Ok(())
}

impl<'de, K: Codec<'de> + Ord, V: Codec<'de>> Codec<'de> for BTreeMap<K, V> {
    const MIN_SIZE: usize = 4;

    fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
        encode_map(packer, self.len(), self)
    }

    fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
        let len = unpacker.unpack_len(guard_size::<(K, V)>(K::MIN_SIZE + V::MIN_SIZE))?;
        let mut map = BTreeMap::new();
        for _ in 0..len {
            let key = unpacker.unpack()?;
            let value = unpacker.unpack()?;
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de, K, V, S> Codec<'de> for HashMap<K, V, S>
where
    K: Codec<'de> + Eq + Hash,
    V: Codec<'de>,
    S: BuildHasher + Default,
{
    const MIN_SIZE: usize = 4;

    fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
        encode_map(packer, self.len(), self)
    }

    fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
        let len = unpacker.unpack_len(guard_size::<(K, V)>(K::MIN_SIZE + V::MIN_SIZE))?;
        let mut map = HashMap::with_hasher(S::default());
        map.try_reserve(len)
            .map_err(|_| Error::OutOfMemory(len.saturating_mul(std::mem::size_of::<(K, V)>())))?;
        for _ in 0..len {
            let key = unpacker.unpack()?;
            let value = unpacker.unpack()?;
            map.insert(key, value);
        }
        Ok(map)
    }
}

/// The length is part of the type, so arrays are written without a prefix.
impl<'de, T: Codec<'de>, const N: usize> Codec<'de> for [T; N] {
    const MIN_SIZE: usize = N * T::MIN_SIZE;

    fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
        for element in self {
            packer.pack(element)?;
        }
        Ok(())
    }

    fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
        let mut elements: Vec<T> = vec_with_capacity(N)?;
        for _ in 0..N {
            elements.push(unpacker.unpack()?);
        }
        elements.try_into().map_err(|_| Error::Length(N as u64))
    }
}

macro_rules! tuple {
    ($($name:ident)+) => {
        impl<'de, $($name: Codec<'de>),+> Codec<'de> for ($($name,)+) {
            const MIN_SIZE: usize = 0 $(+ <$name as Codec<'de>>::MIN_SIZE)+;

            #[allow(non_snake_case)]
            fn encode(&self, packer: &mut Packer<'_>) -> Result<()> {
                let ($($name,)+) = self;
                $(packer.pack($name)?;)+
                Ok(())
            }

            fn decode(unpacker: &mut Unpacker<'de>) -> Result<Self> {
                Ok(($(unpacker.unpack::<$name>()?,)+))
            }
        }
    };
}

tuple!(A);
tuple!(A B);
tuple!(A B C);
tuple!(A B C D);
tuple!(A B C D E);
tuple!(A B C D E F);
tuple!(A B C D E F G);
tuple!(A B C D E F G H);
tuple!(A B C D E F G H I);
tuple!(A B C D E F G H I J);
tuple!(A B C D E F G H I J K);
tuple!(A B C D E F G H I J K L);
