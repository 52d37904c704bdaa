mod codec;
mod layout;
mod parser;
mod value;

use packbuf::{Buffer, Error, Unpacker};
use std::io::{self, Read, Write};
use anyhow::{Context, Result};
use structopt::StructOpt;
use std::str::from_utf8;

/// Decode and print packbuf messages. Since the format carries no type information, the message's LAYOUT has to be
/// given, e.g. `(bool, u32, [?str])` or `{str: [u8; 4]}`.
#[derive(StructOpt)]
#[structopt(name = "pbq")]
struct Opt {
    /// parse a textual representation from stdin and write its binary encoding to stdout instead
    #[structopt(short, long)]
    encode: bool,
    /// when decoding, ignore bytes left over after the message instead of failing
    #[structopt(short, long)]
    allow_trailing: bool,
    /// the layout of the message
    layout: String,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();
    let layout = parser::parse_layout(&opt.layout).context("Invalid layout")?;
    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer).context("Failed to read stdin")?;
    if opt.encode {
        encode(&layout, &buffer)
    } else {
        print(&layout, &buffer, opt.allow_trailing)
    }
}

fn print(layout: &layout::Layout, buffer: &[u8], allow_trailing: bool) -> Result<()> {
    let mut unpacker = Unpacker::from_slice(buffer);
    let value = codec::decode(layout, &mut unpacker).map_err(|e| e.at(unpacker.position())).context("Decoding error")?;
    if !unpacker.is_empty() {
        let trailing = Error::Trailing(unpacker.remaining()).at(unpacker.position());
        if allow_trailing {
            eprintln!("{}", trailing);
        } else {
            return Err(trailing).context("Decoding error");
        }
    }
    println!("{}", &value);
    Ok(())
}

fn encode(layout: &layout::Layout, buffer: &[u8]) -> Result<()> {
    let string = from_utf8(buffer).context("input is not utf-8")?;
    let value = parser::parse_value(string)?;
    let mut buf = Buffer::with_capacity(layout.min_size());
    codec::encode(layout, &value, &mut buf.packer())?;
    io::stdout().write_all(buf.as_slice()).context("Failed to write stdout")?;
    Ok(())
}
