use cborpc_frame::FrameConfig;
use cborpc_rpc::{Served, ServerCodec, Value};

use crate::arith;
use crate::cmd::ServeArgs;
use crate::exit::{rpc_error, CliResult, SUCCESS};

pub fn run(args: ServeArgs, config: FrameConfig) -> CliResult<i32> {
    let dispatcher = arith::dispatcher();
    if args.list {
        for method in dispatcher.methods() {
            println!("{method}");
        }
        return Ok(SUCCESS);
    }

    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout().lock();
    let mut codec = ServerCodec::with_config(stdin, stdout, config);
    tracing::debug!(methods = ?dispatcher.methods(), "serving on stdio");

    loop {
        match dispatcher
            .service_one(&mut codec)
            .map_err(|err| rpc_error("serve failed", err))?
        {
            Served::Dispatched(call) => {
                let seq = seq_text(&call.seq);
                match call.error {
                    Some(error) => {
                        tracing::info!(method = %call.method, %seq, %error, "dispatched call")
                    }
                    None => tracing::info!(method = %call.method, %seq, "dispatched call"),
                }
            }
            Served::EndOfStream => {
                tracing::info!("pipeline closed, exiting");
                return Ok(SUCCESS);
            }
        }
    }
}

fn seq_text(seq: &Value) -> String {
    match seq {
        Value::Integer(int) => i128::from(*int).to_string(),
        Value::Text(text) => text.clone(),
        other => format!("{other:?}"),
    }
}
