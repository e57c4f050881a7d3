//! The `logger` module installs the global `tracing` subscriber.
//! `RUST_LOG` always wins over the filter given in settings.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
