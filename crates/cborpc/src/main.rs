mod arith;
mod cmd;
mod exit;
mod logging;
mod output;

use cborpc_frame::{FrameConfig, DEFAULT_MAX_BLOCK};
use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "cborpc", version, about = "Length-prefixed CBOR RPC over stdio")]
struct Cli {
    /// Output format for call replies.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Largest header or payload block accepted or sent, in bytes.
    #[arg(
        long,
        value_name = "BYTES",
        env = "CBORPC_MAX_BLOCK_SIZE",
        default_value_t = DEFAULT_MAX_BLOCK,
        global = true
    )]
    max_block_size: usize,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let config = FrameConfig {
        max_block_size: cli.max_block_size,
    };
    let result = cmd::run(cli.command, format, config);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
