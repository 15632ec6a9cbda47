//! Roast session timing and derived-metrics engine
//!
//! Shared by the native recorder and the browser build: a pausable roast
//! clock, the checkpoint store, pure metric calculators and the assembler
//! that turns a session into a saved record.

pub mod assembler;
pub mod checkpoint;
pub mod clock;
pub mod error;
pub mod form;
pub mod metrics;
pub mod models;
pub mod session;
pub mod types;
pub mod validation;

pub use assembler::*;
pub use checkpoint::*;
pub use clock::*;
pub use error::*;
pub use form::*;
pub use metrics::*;
pub use models::*;
pub use session::*;
pub use types::*;
pub use validation::*;
