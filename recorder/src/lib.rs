//! Native host for the roast session engine
//!
//! Drives a live roast on a tokio tick task, publishes live views and hands
//! finished roasts to a record repository.

pub mod config;
pub mod error;
pub mod services;
pub mod store;
pub mod telemetry;

pub use config::Config;
pub use error::{RecorderError, RecorderResult, StoreError, UserNotice};
pub use services::{LiveView, RoastRecorder};
pub use store::{BeanListStore, InMemoryStore, JsonFileStore, RecordRepository};
