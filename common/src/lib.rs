//! fxconvert Common Types
//!
//! Static currency reference data shared by the fetcher and the converter,
//! along with amount formatting and input filtering helpers.

pub mod catalog;
pub mod format;
pub mod time;

pub use catalog::*;
pub use format::*;
pub use time::*;
