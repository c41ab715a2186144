mod party;

pub use party::*;
