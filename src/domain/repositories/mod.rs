mod kv_store;
mod party_store;

pub use kv_store::*;
pub use party_store::*;
