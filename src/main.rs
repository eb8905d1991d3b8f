//! `bleframe` binary: inspect the frames a message turns into and decode
//! captured frames.

mod cli;

use std::{fmt::Write as _, num::ParseIntError};

use bleframe::{
    ConfigError,
    FrameTransport,
    MessageId,
    Role,
    TransportConfig,
    TransportHooks,
    frame::ids,
};
use clap::Parser;
use thiserror::Error;

use crate::cli::{Cli, Command, DecodeArgs, EncodeArgs, LinkArgs, RoleArg};

#[derive(Debug, Error)]
enum CliError {
    #[error("unknown message id `{0}`")]
    UnknownId(String),
    #[error("invalid message id `{input}`: {source}")]
    InvalidId {
        input: String,
        source: ParseIntError,
    },
    #[error("invalid hex `{0}`")]
    InvalidHex(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout stays machine readable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Encode(args) => encode(&args)?,
        Command::Decode(args) => decode(&args)?,
        Command::Ids => {
            for (name, id) in ids::all() {
                println!("{id} {name}");
            }
        }
    }
    Ok(())
}

fn encode(args: &EncodeArgs) -> Result<(), CliError> {
    let id = parse_id(&args.id)?;
    let payload = match args.payload.as_deref() {
        None => Vec::new(),
        Some(text) if args.payload_is_hex() => parse_hex(text)?,
        Some(text) => text.as_bytes().to_vec(),
    };
    let mut transport = FrameTransport::new(link_config(&args.link)?);
    transport.send(id, &payload);
    while let Some(frame) = transport.poll_outgoing() {
        println!("{}", to_hex(&frame));
    }
    Ok(())
}

fn decode(args: &DecodeArgs) -> Result<(), CliError> {
    let frames = args
        .frames
        .iter()
        .map(|frame| parse_hex(frame))
        .collect::<Result<Vec<_>, _>>()?;

    let mut transport = FrameTransport::new(link_config(&args.link)?);
    transport.set_default_handler(|id, payload| {
        let name = ids::name(id).unwrap_or("unknown");
        println!("{id} {name} {}", to_hex(payload));
    });
    transport.set_hooks(TransportHooks::on_drop(|reason| println!("dropped: {reason}")));
    for frame in &frames {
        transport.on_frame_received(frame);
    }
    if let bleframe::ReassemblyState::Reassembling { fragments, buffered } =
        transport.reassembly_state()
    {
        println!("incomplete: {fragments} fragments, {buffered} bytes buffered");
    }
    Ok(())
}

fn link_config(link: &LinkArgs) -> Result<TransportConfig, ConfigError> {
    let role = match link.role {
        RoleArg::Central => Role::Central,
        RoleArg::Peripheral => Role::Peripheral,
    };
    TransportConfig::builder()
        .role(role)
        .max_frame_size(link.max_frame_size)
        .build()
}

fn parse_id(input: &str) -> Result<MessageId, CliError> {
    let trimmed = input.trim();
    let parsed = if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        u8::from_str_radix(hex, 16)
    } else if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        trimmed.parse()
    } else {
        return ids::lookup(trimmed).ok_or_else(|| CliError::UnknownId(input.to_owned()));
    };
    parsed.map(MessageId::new).map_err(|source| CliError::InvalidId {
        input: input.to_owned(),
        source,
    })
}

fn parse_hex(input: &str) -> Result<Vec<u8>, CliError> {
    let digits: Vec<u8> = input
        .bytes()
        .filter(|b| !b.is_ascii_whitespace() && *b != b':')
        .collect();
    if digits.len() % 2 != 0 {
        return Err(CliError::InvalidHex(input.to_owned()));
    }
    digits
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| CliError::InvalidHex(input.to_owned()))
        })
        .collect()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}
