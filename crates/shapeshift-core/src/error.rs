//! Error types for Shapeshift operations.
//!
//! The conversion surface itself never returns errors: every miss is `None`.
//! [`Error`] covers configuration loading, and [`ConversionError`] is the
//! richer answer returned by the resolver's diagnostic path when a caller
//! needs to know why a conversion produced nothing.

use thiserror::Error;

use crate::key::TypeKey;

/// Errors that can occur in Shapeshift operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A conversion failed.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}

/// Why a conversion produced no result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// No registration matches any pair in the two type hierarchies.
    #[error("no converter registered from {source_type} to {result_type}")]
    NoConverter {
        source_type: TypeKey,
        result_type: TypeKey,
    },

    /// A converter was resolved but could not be instantiated.
    #[error("converter {converter} cannot be activated for {result_type}")]
    ActivationFailed {
        converter: &'static str,
        result_type: TypeKey,
    },

    /// The converter ran and had no result for the given input.
    #[error("converter {converter} rejected the {source_type} value")]
    Rejected {
        converter: &'static str,
        source_type: TypeKey,
    },

    /// The converter produced a value of a different type than requested.
    #[error("converter produced a value that is not a {expected}")]
    UnexpectedOutput { expected: TypeKey },
}

impl ConversionError {
    /// Returns `true` if no converter was found.
    pub fn is_no_converter(&self) -> bool {
        matches!(self, Self::NoConverter { .. })
    }

    /// Returns `true` if the converter ran and rejected the input.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Result type alias using Shapeshift's Error type.
pub type Result<T> = std::result::Result<T, Error>;
