//! Utility modules
//!
//! Common utilities used throughout the client: error handling and
//! logging setup.

pub mod errors;
pub mod logging;

pub use errors::{ClientError, Result};
