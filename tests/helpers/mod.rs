//! Test helpers module
//!
//! Scripted API transport and snapshot builders shared by the
//! integration tests.

pub mod mock_api;

pub use mock_api::*;
