// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for the CLI: schema compilation, input reading and
//! logging setup.

use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{bail, Context as _};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Compile a `.proto` file into a serialized `FileDescriptorSet` by
/// running `protoc`.
///
/// Imports are included so every referenced type is present. The
/// descriptor set goes through a temporary file removed on return.
pub fn compile_schema(protoc: &Path, proto_file: &Path, include_paths: &[PathBuf]) -> Result<Vec<u8>> {
    let out = tempfile::Builder::new()
        .prefix("proto2json-")
        .suffix(".pb")
        .tempfile()
        .context("Failed to create temporary descriptor set file")?;

    let mut command = Command::new(protoc);
    command
        .arg(format!("--descriptor_set_out={}", out.path().display()))
        .arg("--include_imports");
    for path in include_paths {
        command.arg(format!("-I{}", path.display()));
    }
    command
        .arg(proto_file)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::inherit());

    tracing::debug!(?command, "running schema compiler");
    let status = command
        .status()
        .with_context(|| format!("Failed to run '{}'", protoc.display()))?;
    if !status.success() {
        bail!("{} failed on {} ({status})", protoc.display(), proto_file.display());
    }

    let bytes = std::fs::read(out.path())
        .with_context(|| format!("Failed to read {}", out.path().display()))?;
    tracing::debug!(bytes = bytes.len(), "compiled descriptor set");
    Ok(bytes)
}

/// Read the descriptor set from a file already produced by `protoc`.
pub fn read_descriptor_set(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Read the whole message from a file, or standard input when `path` is
/// `None`. With `hex`, the input is hex text and whitespace is ignored.
pub fn read_input(path: Option<&Path>, hex: bool) -> Result<Vec<u8>> {
    let raw = match path {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .context("Failed to read standard input")?;
            buf
        }
    };

    if hex {
        decode_hex(&raw)
    } else {
        Ok(raw)
    }
}

/// Decode hex text, ignoring whitespace.
pub fn decode_hex(text: &[u8]) -> Result<Vec<u8>> {
    let digits: Vec<u8> = text
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    hex::decode(digits).context("Input is not valid hex")
}

/// Install a stderr logger. `RUST_LOG` overrides the level chosen by
/// `verbosity`.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    // Only fails when a logger is already installed.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hex_ignores_whitespace() {
        assert_eq!(decode_hex(b"08 96\n01").unwrap(), vec![0x08, 0x96, 0x01]);
    }

    #[test]
    fn test_decode_hex_rejects_garbage() {
        assert!(decode_hex(b"zz").is_err());
        assert!(decode_hex(b"abc").is_err());
    }

    #[test]
    fn test_read_input_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"0a00").unwrap();
        assert_eq!(read_input(Some(file.path()), false).unwrap(), b"0a00");
        assert_eq!(read_input(Some(file.path()), true).unwrap(), vec![0x0a, 0x00]);
    }
}
