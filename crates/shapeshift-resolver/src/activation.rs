//! Converter types and their activation policy.
//!
//! A [`ConverterType`] names a converter implementation and carries the
//! factories that can instantiate it. The registrant picks the factories
//! once, when building the type:
//!
//! - a **default** factory taking no arguments, and/or
//! - a **targeted** factory receiving the requested result [`TypeKey`], for
//!   converters whose behaviour depends on the result type (e.g. parsing into
//!   whichever enum the caller asked for).
//!
//! [`ConverterType::activate`] applies the policy: default factory first,
//! targeted factory second, otherwise nothing.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use shapeshift_core::{Converter, DynConverter, TypeKey, Typed};

type DefaultFactory = Arc<dyn Fn() -> Arc<dyn DynConverter> + Send + Sync>;
type TargetedFactory = Arc<dyn Fn(TypeKey) -> Option<Arc<dyn DynConverter>> + Send + Sync>;

/// A converter implementation type plus the ways to instantiate it.
///
/// Two converter types are equal when they name the same implementation.
///
/// # Example
///
/// ```
/// use shapeshift_core::{Converter, TypeKey};
/// use shapeshift_resolver::ConverterType;
///
/// #[derive(Default)]
/// struct Shout;
///
/// impl Converter<String, String> for Shout {
///     fn convert(&self, source: &String) -> Option<String> {
///         Some(source.to_uppercase())
///     }
/// }
///
/// let shout = ConverterType::typed::<String, String, Shout>();
/// let converter = shout.activate(TypeKey::of::<String>()).unwrap();
/// let result = converter.convert_dyn(&"hey".to_string()).unwrap();
/// assert_eq!(*result.downcast::<String>().unwrap(), "HEY");
/// ```
#[derive(Clone)]
pub struct ConverterType {
    key: TypeKey,
    default: Option<DefaultFactory>,
    targeted: Option<TargetedFactory>,
}

impl ConverterType {
    /// A converter type for `C` with no factories. Activation fails until one
    /// is added.
    pub fn of<C: Any>() -> Self {
        Self {
            key: TypeKey::of::<C>(),
            default: None,
            targeted: None,
        }
    }

    /// A typed converter instantiated through `Default`.
    pub fn typed<S, R, C>() -> Self
    where
        S: Any,
        R: Any + Send,
        C: Converter<S, R> + Default,
    {
        Self::of::<C>().with_default(|| Typed::<C, S, R>::new(C::default()))
    }

    /// A type-erased converter instantiated through `Default`.
    pub fn dynamic<C: DynConverter + Default>() -> Self {
        Self::of::<C>().with_default(C::default)
    }

    /// Adds a zero-argument factory.
    pub fn with_default<D, F>(mut self, factory: F) -> Self
    where
        D: DynConverter,
        F: Fn() -> D + Send + Sync + 'static,
    {
        self.default = Some(Arc::new(move || Arc::new(factory()) as Arc<dyn DynConverter>));
        self
    }

    /// Adds a factory parameterized by the requested result type.
    ///
    /// The factory may decline a result type it cannot serve by returning
    /// `None`; activation then fails.
    pub fn with_targeted<D, F>(mut self, factory: F) -> Self
    where
        D: DynConverter,
        F: Fn(TypeKey) -> Option<D> + Send + Sync + 'static,
    {
        self.targeted = Some(Arc::new(move |result| {
            factory(result).map(|c| Arc::new(c) as Arc<dyn DynConverter>)
        }));
        self
    }

    /// Identity of the converter implementation.
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Full type name of the converter implementation.
    pub fn name(&self) -> &'static str {
        self.key.name()
    }

    /// Returns `true` if a zero-argument factory is present.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Returns `true` if a targeted factory is present.
    pub fn has_targeted(&self) -> bool {
        self.targeted.is_some()
    }

    /// Instantiates the converter for `result`.
    ///
    /// Uses the zero-argument factory when present, even if a targeted one
    /// exists too. Otherwise passes `result` to the targeted factory.
    /// Returns `None` when neither applies.
    pub fn activate(&self, result: TypeKey) -> Option<Arc<dyn DynConverter>> {
        if let Some(factory) = &self.default {
            return Some(factory());
        }
        if let Some(factory) = &self.targeted {
            let activated = factory(result);
            if activated.is_none() {
                log::debug!("{} declined activation for {result}", self.key);
            }
            return activated;
        }
        log::debug!("{} has no factory, cannot activate", self.key);
        None
    }

    /// Returns `true` if this names the implementation type `C`.
    pub fn is<C: Any>(&self) -> bool {
        self.key.is::<C>()
    }
}

impl PartialEq for ConverterType {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ConverterType {}

impl fmt::Debug for ConverterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterType")
            .field("converter", &self.key.name())
            .field("default", &self.has_default())
            .field("targeted", &self.has_targeted())
            .finish()
    }
}
