#[macro_use]
extern crate serde;

mod arith;
mod ballot;
mod cast;
mod election;
mod error;
mod merkle;
mod paillier;
mod receipt;
mod serde_hex;
mod tally;
mod util;

pub use arith::*;
pub use ballot::*;
pub use cast::*;
pub use election::*;
pub use error::*;
pub use merkle::*;
pub use paillier::*;
pub use receipt::*;
pub use serde_hex::*;
pub use tally::*;
pub use util::*;
