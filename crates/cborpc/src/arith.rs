//! The `Arith` service exposed by `cborpc serve`.

use cborpc_rpc::{Dispatcher, HandlerError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Args {
    #[serde(rename = "A")]
    pub a: i64,
    #[serde(rename = "B")]
    pub b: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quotient {
    #[serde(rename = "Quo")]
    pub quo: i64,
    #[serde(rename = "Rem")]
    pub rem: i64,
}

pub fn multiply(args: Args) -> Result<i64, HandlerError> {
    args.a
        .checked_mul(args.b)
        .ok_or_else(|| HandlerError::new("multiplication overflow"))
}

pub fn divide(args: Args) -> Result<Quotient, HandlerError> {
    if args.b == 0 {
        return Err(HandlerError::new("divide by zero"));
    }
    match (args.a.checked_div(args.b), args.a.checked_rem(args.b)) {
        (Some(quo), Some(rem)) => Ok(Quotient { quo, rem }),
        _ => Err(HandlerError::new("division overflow")),
    }
}

pub fn dispatcher() -> Dispatcher {
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .register_fn("Arith.Multiply", multiply)
        .register_fn("Arith.Divide", divide);
    dispatcher
}
