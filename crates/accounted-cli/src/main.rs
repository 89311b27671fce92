//! `accounted-crypt`: Accounted message encryption from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Direct chat (argument order does not matter)
//! accounted-crypt encrypt --direct alice bob "hello"
//! accounted-crypt decrypt --direct bob alice '{"encrypted":true,...}'
//!
//! # Group chat, also trying a legacy author's key
//! accounted-crypt render --group g1 --legacy-author u7 < stored.txt
//!
//! # Key agreement
//! accounted-crypt keygen
//! accounted-crypt encrypt --private-key <PKCS8> --peer-key <SPKI> "hello"
//!
//! # Is this stored content encrypted?
//! accounted-crypt inspect "just a sticker caption"
//! ```

mod cli;
mod commands;
mod error;

use std::io;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let mut out = io::stdout().lock();
    commands::run(cli.command, &mut out)?;

    Ok(())
}
