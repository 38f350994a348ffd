// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # proto2json CLI
//!
//! Decode one binary protobuf message into JSON.
//!
//! ## Usage
//!
//! ```sh
//! # Compile the schema with protoc and read the message from stdin
//! proto2json person.proto example.Person < person.bin
//!
//! # Use an already compiled descriptor set and a hex dump
//! proto2json --descriptor-set schema.pb example.Person --hex -i dump.txt
//! ```

mod common;

use std::path::PathBuf;
use std::process;

use anyhow::Context as _;
use clap::Parser;
use common::Result;
use proto2json::{Converter, DecodeOptions, DescriptorIndex, JsonOptions};

/// proto2json - binary protobuf to JSON
///
/// Decodes a message using only its .proto schema and fully qualified
/// type name.
#[derive(Parser, Clone, Debug)]
#[command(name = "proto2json")]
#[command(about = "Decode a binary protobuf message into canonical JSON", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Schema file (.proto, or a compiled descriptor set with --descriptor-set)
    #[arg(value_name = "PROTO_FILE")]
    proto_file: PathBuf,

    /// Fully qualified message name, e.g. package.Outer.Inner
    #[arg(value_name = "MESSAGE_NAME")]
    message_name: String,

    /// Directory to search for imports (repeatable)
    #[arg(short = 'I', long = "proto-path", value_name = "DIR")]
    proto_path: Vec<PathBuf>,

    /// protoc executable
    #[arg(long, env = "PROTOC", default_value = "protoc")]
    protoc: PathBuf,

    /// PROTO_FILE is a serialized FileDescriptorSet, protoc is not run
    #[arg(long)]
    descriptor_set: bool,

    /// Read the message from FILE instead of standard input
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Input is hex text
    #[arg(long)]
    hex: bool,

    /// Print JSON on a single line
    #[arg(long)]
    compact: bool,

    /// Use field names as declared in the schema
    #[arg(long)]
    proto_names: bool,

    /// Print enum values as numbers
    #[arg(long)]
    enum_numbers: bool,

    /// Sort map entries by key
    #[arg(long)]
    sort_map_keys: bool,

    /// Drop unknown fields while decoding
    #[arg(long)]
    discard_unknown: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn json_options(&self) -> JsonOptions {
        JsonOptions::default()
            .with_multiline(!self.compact)
            .with_proto_names(self.proto_names)
            .with_enum_numbers(self.enum_numbers)
            .with_sorted_map_keys(self.sort_map_keys)
    }

    fn decode_options(&self) -> DecodeOptions {
        DecodeOptions::default().with_discard_unknown(self.discard_unknown)
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    common::init_logging(cli.verbose);

    let descriptor_set = if cli.descriptor_set {
        common::read_descriptor_set(&cli.proto_file)?
    } else {
        common::compile_schema(&cli.protoc, &cli.proto_file, &cli.proto_path)?
    };
    let index = DescriptorIndex::from_bytes(&descriptor_set)
        .with_context(|| format!("Failed to load schema {}", cli.proto_file.display()))?;

    let input = common::read_input(cli.input.as_deref(), cli.hex)?;

    let converter = Converter::new(index)
        .with_decode_options(cli.decode_options())
        .with_json_options(cli.json_options());
    let json = converter.convert_to_string(&cli.message_name, &input)?;

    println!("{json}");
    Ok(())
}

fn main() {
    let result = run();

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
