//! Dynamic overrides layered on immutable process definitions

pub mod definition_cache;
pub mod service;
pub mod snapshot;

pub use definition_cache::*;
pub use service::*;
pub use snapshot::*;
