//! Client library for the mapping platform's REST surfaces: token-based
//! sessions, the asynchronous extract-changes job, the raster catalog
//! query endpoint, and item creation through the sharing API.

pub mod catalog;
pub mod changes;
pub mod error;
pub mod items;
pub mod metrics_defs;
pub mod session;
pub mod types;

pub use error::{PortalError, Result};

#[cfg(test)]
pub(crate) mod testutils;
