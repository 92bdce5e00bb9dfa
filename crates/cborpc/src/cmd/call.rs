use cborpc_frame::FrameConfig;
use cborpc_rpc::{ChildProcess, Value};

use crate::cmd::CallArgs;
use crate::exit::{rpc_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_reply, OutputFormat};

pub fn run(args: CallArgs, format: OutputFormat, config: FrameConfig) -> CliResult<i32> {
    let payload = parse_args(&args.args)?;
    let (program, program_args) = args
        .command
        .split_first()
        .ok_or_else(|| CliError::new(USAGE, "missing server program"))?;

    let mut server = ChildProcess::spawn_with_config(program, program_args, config)
        .map_err(|err| rpc_error("call failed", err))?;
    let reply = server.call::<_, Value>(&args.method, &payload);

    // Reap the server even when the call failed.
    let status = server
        .stop()
        .map_err(|err| rpc_error("stopping server failed", err))?;
    tracing::debug!(%status, "server stopped");

    let reply = reply.map_err(|err| rpc_error("call failed", err))?;
    print_reply(&args.method, &reply, format);
    Ok(SUCCESS)
}

fn parse_args(json: &str) -> CliResult<Value> {
    let json: serde_json::Value = serde_json::from_str(json)
        .map_err(|err| CliError::new(USAGE, format!("--args is not valid JSON: {err}")))?;
    Value::serialized(&json)
        .map_err(|err| CliError::new(USAGE, format!("--args cannot be encoded: {err}")))
}
