//! fxconvert
//!
//! Conversion state and orchestration for the currency converter, plus the
//! local storage it persists the last conversion and theme to.

pub mod config;
pub mod orchestrator;
pub mod state;
pub mod storage;

pub use config::AppConfig;
pub use orchestrator::Converter;
pub use state::ConversionState;
pub use storage::{FileStore, KeyValueStore, MemoryStore, PersistedConversion, Theme};
