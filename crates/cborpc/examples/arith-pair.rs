//! Server and client in one process, talking over a loopback TCP socket.
//!
//! Run with:
//!   cargo run --example arith-pair
//!
//! The same protocol runs over a child's stdin/stdout with:
//!   cargo run -- call Arith.Multiply --args '{"A":6,"B":7}' -- target/debug/cborpc serve

use std::net::{Shutdown, TcpListener, TcpStream};
use std::thread;

use cborpc::{Client, Dispatcher, HandlerError, Served, ServerCodec};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct Args {
    #[serde(rename = "A")]
    a: i64,
    #[serde(rename = "B")]
    b: i64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;

    let server = thread::spawn(move || -> Result<usize, cborpc::rpc::RpcError> {
        let (stream, peer) = listener.accept()?;
        eprintln!("Client connected: {peer}");

        let mut dispatcher = Dispatcher::new();
        dispatcher.register_fn("Arith.Multiply", |args: Args| {
            args.a
                .checked_mul(args.b)
                .ok_or_else(|| HandlerError::new("multiplication overflow"))
        });

        let mut codec = ServerCodec::new(stream.try_clone()?, stream);
        let mut served = 0;
        while let Served::Dispatched(call) = dispatcher.service_one(&mut codec)? {
            eprintln!("Dispatched {} (seq {:?})", call.method, call.seq);
            served += 1;
        }
        Ok(served)
    });

    let stream = TcpStream::connect(addr)?;
    let mut client = Client::new(stream.try_clone()?, stream);
    for (a, b) in [(6, 7), (12, 12), (-3, 5)] {
        let product: i64 = client.call("Arith.Multiply", &Args { a, b })?;
        println!("{a} * {b} = {product}");
    }

    match client.call::<_, i64>("Arith.Divide", &Args { a: 1, b: 1 }) {
        Ok(_) => println!("unexpected reply"),
        Err(err) => println!("Arith.Divide failed: {err}"),
    }

    let (_, writer) = client.into_inner();
    writer.shutdown(Shutdown::Write)?;

    let served = server
        .join()
        .map_err(|_| "server thread panicked")??;
    eprintln!("Server answered {served} calls");
    Ok(())
}
