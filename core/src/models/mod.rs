//! Data records handed to and received from the persistence layer

mod bean;
mod preset;
mod record;

pub use bean::*;
pub use preset::*;
pub use record::*;
