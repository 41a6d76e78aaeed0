//! Task board entry-point: loads settings, wires the Supabase adapters and
//! runs one CLI command.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::{self, Write};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use taskboard::config::{AppSettings, LogFormat};
use taskboard::inbound::cli::{CliArgs, execute};
use taskboard::wiring::{BoardPorts, TaskBoard};

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let settings = AppSettings::load_ambient().wrap_err("load settings")?;
    init_tracing(settings.log_format().wrap_err("read log format")?);

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(args, settings))
}

fn init_tracing(format: LogFormat) {
    let builder = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr);
    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.compact().try_init(),
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}

async fn run(args: CliArgs, settings: AppSettings) -> Result<()> {
    let ports = BoardPorts::supabase(&settings).wrap_err("build Supabase adapters")?;
    let board = TaskBoard::assemble(ports);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&args, &board, &mut out)
        .await
        .wrap_err("command failed")?;
    out.flush().wrap_err("flush output")?;
    Ok(())
}
