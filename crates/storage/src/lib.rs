#![forbid(unsafe_code)]

mod codec;
pub mod repository;
pub mod sqlite;

pub use codec::{decode_snapshot, encode_snapshot};
