//! Tilth Platform Abstraction Layer
//!
//! This crate provides the seams between the interaction engine and the host
//! it runs in.
//!
//! - [`Storage`] - Durable client-side key/value storage
//! - [`Capabilities`] - Optional host primitives, detected once at startup
//!
//! # Storage Implementations
//!
//! - [`MemoryStorage`] - Process-local map, used by tests and ephemeral hosts
//! - [`JsonFileStorage`] - A JSON object on disk, used by the replay CLI

mod capabilities;
mod error;
mod storage;

pub use capabilities::Capabilities;
pub use error::{PlatformError, Result};
pub use storage::{JsonFileStorage, MemoryStorage, Storage};
