//! Command line interface for the `bleframe` binary.
//!
//! The binary encodes messages into the frames a central would write and
//! decodes captured frames back into messages. This file is also compiled by
//! the build script to render the man page, so it depends on `clap` only.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command line arguments for the `bleframe` binary.
#[derive(Debug, Parser)]
#[command(
    name = "bleframe",
    version,
    about = "Encode and decode framed BLE messages"
)]
pub struct Cli {
    /// Action to perform.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of the `bleframe` binary.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the frames written for one message, one hex frame per line.
    Encode(EncodeArgs),
    /// Reassemble hex frames and print each dispatched message.
    Decode(DecodeArgs),
    /// List the known message ids.
    Ids,
}

/// End of the link the frames are produced or consumed by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    /// The app side of the link.
    #[default]
    Central,
    /// The robot side of the link.
    Peripheral,
}

/// Options shared by every framing subcommand.
#[derive(Debug, Args)]
pub struct LinkArgs {
    /// Which end of the link is speaking.
    #[arg(long, value_enum, default_value_t = RoleArg::Central)]
    pub role: RoleArg,
    /// Largest frame the link accepts, in bytes.
    #[arg(long, default_value_t = 20)]
    pub max_frame_size: usize,
}

/// Arguments for `bleframe encode`.
#[derive(Debug, Args)]
pub struct EncodeArgs {
    /// Message id as a number (`0x94`, `148`) or a known name
    /// (`dev-exec-cmd-line`).
    #[arg(long)]
    pub id: String,
    /// Treat the payload as hex instead of UTF-8 text.
    #[arg(long, conflicts_with = "text")]
    pub hex: bool,
    /// Treat the payload as UTF-8 text (the default).
    #[arg(long)]
    pub text: bool,
    #[command(flatten)]
    pub link: LinkArgs,
    /// Message payload; omit for an empty message.
    pub payload: Option<String>,
}

impl EncodeArgs {
    /// Whether the payload argument holds hex digits.
    #[must_use]
    pub fn payload_is_hex(&self) -> bool { self.hex && !self.text }
}

/// Arguments for `bleframe decode`.
#[derive(Debug, Args)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Frames as hex strings, in arrival order.
    #[arg(required = true)]
    pub frames: Vec<String>,
}
