//! Shapeshift Resolver — type-directed converter resolution.
//!
//! This crate maps `(source type, result type)` pairs to converters, resolves
//! them across declared type hierarchies, activates them through explicit
//! factories, and dispatches conversions on type-erased values.
//!
//! # Modules
//!
//! - [`activation`]: Converter types and the activation policy
//! - [`builtins`]: Built-in converters and the default registry
//! - [`hierarchy`]: Declared parent links and lineage walks
//! - [`registry`]: The immutable registry and its builder
//! - [`resolver`]: Resolution, activation caching and dispatch

#![doc = include_str!("../README.md")]

pub mod activation;
pub mod builtins;
pub mod hierarchy;
pub mod registry;
pub mod resolver;

// Re-export key types at crate root for convenience
pub use activation::ConverterType;
pub use builtins::{AnyEnum, EnumCatalog, EnumType, default_registry, default_registry_with_enums};
pub use hierarchy::TypeHierarchy;
pub use registry::{ConverterRegistry, RegistryBuilder, Resolution};
pub use resolver::ConverterResolver;

// Convenience re-exports from shapeshift-core
pub use shapeshift_core::{
    ConversionError, Converter, DynConverter, Error, ResolverConfig, Result, TypeKey, Typed,
};
