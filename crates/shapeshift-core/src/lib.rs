//! Shapeshift Core — type identities, converter contracts, errors, and config.
//!
//! This crate provides the foundational types used across all Shapeshift
//! crates. It has no internal Shapeshift dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`config`]: Resolver configuration (TOML, environment, defaults)
//! - [`converter`]: Typed and type-erased conversion contracts
//! - [`error`]: Error types and Result alias
//! - [`key`]: Nominal type identity used as registry keys

#![doc = include_str!("../README.md")]

pub mod config;
pub mod converter;
pub mod error;
pub mod key;

// Re-export key types at crate root for convenience
pub use config::ResolverConfig;
pub use converter::{Converter, DynConverter, Typed};
pub use error::{ConversionError, Error, Result};
pub use key::TypeKey;
