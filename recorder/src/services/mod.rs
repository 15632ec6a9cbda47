//! Business logic services for the roast recorder

pub mod recorder;

pub use recorder::{LiveView, RoastRecorder};
