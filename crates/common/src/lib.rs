//! Common utilities and types shared across keepalive components.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
