//! Data models.

pub mod config;
pub mod invoice;
#[cfg(feature = "native")]
pub mod record;
#[cfg(feature = "native")]
pub mod supplier;
