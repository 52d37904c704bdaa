use anyhow::{bail, Context, Result};
use packbuf::{Buffer, Codec, Error, Packer, Unpacker};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A telemetry sample with a hand-written codec. The layout is the fields in declared order.
#[derive(Debug, PartialEq, Clone)]
struct Sample<'a> {
    station: &'a str,
    timestamp: u64,
    celsius: f32,
    humidity: Option<u8>,
}

impl<'de> Codec<'de> for Sample<'de> {
    const MIN_SIZE: usize = 4 + 8 + 4 + 1;

    fn encode(&self, packer: &mut Packer<'_>) -> packbuf::Result<()> {
        packer.pack(&self.station)?;
        packer.pack(&self.timestamp)?;
        packer.pack(&self.celsius)?;
        packer.pack(&self.humidity)
    }

    fn decode(unpacker: &mut Unpacker<'de>) -> packbuf::Result<Self> {
        Ok(Sample {
            station: unpacker.unpack()?,
            timestamp: unpacker.unpack()?,
            celsius: unpacker.unpack()?,
            humidity: unpacker.unpack()?,
        })
    }
}

/// Version 1 of a batch only knew single samples, version 2 sends several at once. The version is an ordinary
/// leading field.
#[derive(Debug, PartialEq)]
enum Batch<'a> {
    V1(Sample<'a>),
    V2(Vec<Sample<'a>>),
}

impl<'de> Codec<'de> for Batch<'de> {
    const MIN_SIZE: usize = 1 + 4;

    fn encode(&self, packer: &mut Packer<'_>) -> packbuf::Result<()> {
        match self {
            Batch::V1(sample) => {
                packer.pack(&1u8)?;
                packer.pack(sample)
            },
            Batch::V2(samples) => {
                packer.pack(&2u8)?;
                packer.pack(samples)
            },
        }
    }

    fn decode(unpacker: &mut Unpacker<'de>) -> packbuf::Result<Self> {
        match unpacker.unpack::<u8>()? {
            1 => Ok(Batch::V1(unpacker.unpack()?)),
            2 => Ok(Batch::V2(unpacker.unpack()?)),
            v => Err(Error::InvalidDiscriminant(v.into(), "Batch")),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
enum Species {
    PrionailurusViverrinus,
    LynxLynx,
    FelisCatus,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Cat<'a> {
    name: &'a str,
    species: Species,
    #[serde(with = "serde_bytes")]
    chip: &'a [u8],
    toys: BTreeMap<String, u32>,
}

fn manual() -> Result<()> {
    let samples = vec![
        Sample { station: "north", timestamp: 1_700_000_000, celsius: 21.5, humidity: Some(40) },
        Sample { station: "south", timestamp: 1_700_000_060, celsius: -3.25, humidity: None },
    ];

    let mut buf = Buffer::with_capacity(64);
    buf.packer().pack(&Batch::V2(samples.clone()))?;
    println!("batch v2: {} bytes", buf.len());

    let decoded: Batch = buf.unpacker().unpack()?;
    match &decoded {
        Batch::V2(s) if *s == samples => println!("batch v2 decoded: {:?}", s),
        other => bail!("unexpected batch {:?}", other),
    }

    buf.clear();
    buf.packer().pack(&Batch::V1(samples[0].clone()))?;
    let decoded = packbuf::from_bytes::<Batch>(buf.as_slice())?;
    println!("batch v1 decoded: {:?}", decoded);

    match packbuf::from_bytes::<Batch>(&[3, 0, 0, 0, 0]) {
        Err(e) => println!("unknown version rejected: {}", e),
        Ok(b) => bail!("version 3 should not decode, got {:?}", b),
    }
    Ok(())
}

/// A header, then the payload inside a frame. Readers that don't know about trailing fields in the frame skip them.
fn framed() -> Result<()> {
    let mut buf = Buffer::new();
    let mut packer = buf.packer();
    packer.pack(&7u16)?;
    packer.pack_framed(|inner| {
        inner.pack(&"payload")?;
        inner.pack(&0xdead_beef_u32)
    })?;
    packer.pack(&true)?;

    let mut unpacker = buf.unpacker();
    let kind: u16 = unpacker.unpack()?;
    let mut frame = unpacker.framed()?;
    let payload: &str = frame.unpack()?;
    let last: bool = unpacker.unpack()?;
    println!("framed: kind {}, payload {:?}, {} unread bytes in frame skipped, trailer {}", kind, payload, frame.remaining(), last);
    Ok(())
}

fn derived() -> Result<()> {
    let cat = Cat {
        name: "Jessica",
        species: Species::PrionailurusViverrinus,
        chip: &[0x2a, 0x00, 0xff, 0x10],
        toys: [("mouse".to_string(), 3), ("ball".to_string(), 1)].into_iter().collect(),
    };

    let packed = packbuf_serde::to_bytes(&cat).context("packbuf serialization failed")?;
    let json = serde_json::to_vec(&cat).context("json serialization failed")?;
    let msgpack = rmp_serde::to_vec(&cat).context("msgpack serialization failed")?;
    let named = rmp_serde::to_vec_named(&cat).context("msgpack serialization failed")?;
    println!("packbuf: {} bytes, json: {} bytes, msgpack: {} bytes ({} with field names)",
        packed.len(), json.len(), msgpack.len(), named.len());
    println!("{:02x?}", packed);

    let back: Cat = packbuf_serde::from_bytes(&packed).context("packbuf deserialization failed")?;
    if back != cat {
        bail!("roundtrip changed the cat: {:?}", back);
    }
    Ok(())
}

fn main() -> Result<()> {
    manual()?;
    framed()?;
    derived()?;
    Ok(())
}
