//! Command execution.
//!
//! Output goes to the provided writer; diagnostics go through `tracing`.

use std::io::{self, Read, Write};

use accounted_crypto::{
    CryptoError, MessageBody, generate_key_pair, open, parse, render, seal,
};

use crate::{cli::Command, error::CliError};

/// Run one command, reading omitted input from stdin.
pub fn run(command: Command, out: &mut impl Write) -> Result<(), CliError> {
    run_with_input(command, out, read_stdin)
}

/// Run one command with an explicit source for omitted input.
pub fn run_with_input(
    command: Command,
    out: &mut impl Write,
    input: impl FnOnce() -> io::Result<String>,
) -> Result<(), CliError> {
    match command {
        Command::Keygen => {
            let pair = generate_key_pair()?;
            writeln!(out, "public:  {}", pair.public_key().to_spki_base64()?)?;
            writeln!(out, "private: {}", pair.export_private_key()?.as_str())?;
        },
        Command::Encrypt { keys, plaintext } => {
            let plaintext = provided_or(plaintext, input)?;
            let stored = seal(&plaintext, &keys.select()?)?;
            tracing::info!(bytes = stored.len(), "message encrypted");
            writeln!(out, "{stored}")?;
        },
        Command::Decrypt { keys, stored } => {
            let stored = stored_or(stored, input)?;
            match open(&stored, &keys.select()?)? {
                MessageBody::Decrypted(text) => writeln!(out, "{text}")?,
                MessageBody::Plaintext(_) => {
                    tracing::info!("input is not an encrypted envelope");
                    return Err(CryptoError::DecryptionFailed.into());
                },
            }
        },
        Command::Render { keys, stored } => {
            let stored = stored_or(stored, input)?;
            writeln!(out, "{}", render(&stored, &keys.select()?)?)?;
        },
        Command::Inspect { stored } => {
            let stored = stored_or(stored, input)?;
            match parse(&stored) {
                Some(parts) => writeln!(
                    out,
                    "encrypted: {} ciphertext bytes, {} nonce bytes",
                    parts.ciphertext.len(),
                    parts.nonce.len()
                )?,
                None => writeln!(out, "plaintext")?,
            }
        },
    }

    Ok(())
}

fn provided_or(
    value: Option<String>,
    input: impl FnOnce() -> io::Result<String>,
) -> io::Result<String> {
    match value {
        Some(value) => Ok(value),
        None => input(),
    }
}

/// Stored envelope text, dropping the line ending a shell pipe adds.
fn stored_or(
    value: Option<String>,
    input: impl FnOnce() -> io::Result<String>,
) -> io::Result<String> {
    let mut stored = provided_or(value, input)?;
    let trimmed = stored.trim_end_matches(['\r', '\n']).len();
    stored.truncate(trimmed);
    Ok(stored)
}

fn read_stdin() -> io::Result<String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}
