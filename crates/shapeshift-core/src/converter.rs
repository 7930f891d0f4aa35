//! Conversion contracts.
//!
//! A converter takes one source value and produces one result value, or
//! `None` when the source cannot be converted. Two traits describe this:
//!
//! - [`Converter<S, R>`]: the typed contract converter authors implement.
//! - [`DynConverter`]: the type-erased contract the resolver dispatches
//!   through. [`Typed`] adapts the former into the latter.
//!
//! # Statelessness
//!
//! Converters must be stateless. The resolver may cache one instance per
//! `(source type, result type)` pair and share it between threads, so a
//! converter must return the same output for the same input no matter how
//! many times, or from where, it is called. `Send + Sync + 'static` and the
//! `&self` receiver enforce part of this; interior mutability that changes
//! results is a contract violation.

use std::any::{Any, type_name};
use std::fmt;
use std::marker::PhantomData;

/// Typed conversion from `S` to `R`.
///
/// # Example
///
/// ```
/// use shapeshift_core::Converter;
///
/// struct Celsius;
///
/// impl Converter<f64, String> for Celsius {
///     fn convert(&self, source: &f64) -> Option<String> {
///         Some(format!("{source:.1}°C"))
///     }
/// }
///
/// assert_eq!(Celsius.convert(&21.0), Some("21.0°C".to_string()));
/// ```
pub trait Converter<S, R>: Send + Sync + 'static {
    /// Converts `source`, or returns `None` if it has no valid result.
    fn convert(&self, source: &S) -> Option<R>;
}

/// Type-erased conversion.
///
/// Implemented directly by converters whose result type is only known at
/// runtime (for example, a converter that parses into whichever enum the
/// caller asked for), and through [`Typed`] for everything else.
pub trait DynConverter: Send + Sync + 'static {
    /// Converts a source value of the type this converter was registered for.
    ///
    /// Returns `None` if `source` is not of the expected type or cannot be
    /// converted.
    fn convert_dyn(&self, source: &dyn Any) -> Option<Box<dyn Any + Send>>;

    /// Name used in log output.
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// Adapts a [`Converter<S, R>`] into a [`DynConverter`].
pub struct Typed<C, S, R> {
    inner: C,
    _marker: PhantomData<fn(&S) -> R>,
}

impl<C, S, R> Typed<C, S, R>
where
    C: Converter<S, R>,
    S: Any,
    R: Any + Send,
{
    /// Wraps a typed converter.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// Returns the wrapped converter.
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C, S, R> DynConverter for Typed<C, S, R>
where
    C: Converter<S, R>,
    S: Any,
    R: Any + Send,
{
    fn convert_dyn(&self, source: &dyn Any) -> Option<Box<dyn Any + Send>> {
        let source = source.downcast_ref::<S>()?;
        self.inner
            .convert(source)
            .map(|result| Box::new(result) as Box<dyn Any + Send>)
    }

    fn name(&self) -> &'static str {
        type_name::<C>()
    }
}

impl<C, S, R> fmt::Debug for Typed<C, S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Typed")
            .field("converter", &type_name::<C>())
            .field("source", &type_name::<S>())
            .field("result", &type_name::<R>())
            .finish()
    }
}
