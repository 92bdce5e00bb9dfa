use cborpc_frame::FrameConfig;
use clap::{Args, Subcommand};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod call;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the Arith methods on stdin/stdout until the input closes.
    Serve(ServeArgs),
    /// Start a server process, make one call, and print the reply.
    Call(CallArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, config: FrameConfig) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args, config),
        Command::Call(args) => call::run(args, format, config),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Print the registered method names and exit.
    #[arg(long)]
    pub list: bool,
}

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Method to call, e.g. Arith.Multiply.
    pub method: String,
    /// Call arguments as JSON.
    #[arg(long, default_value = "{}")]
    pub args: String,
    /// Server program and its arguments.
    #[arg(last = true, required = true, value_name = "PROGRAM")]
    pub command: Vec<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
