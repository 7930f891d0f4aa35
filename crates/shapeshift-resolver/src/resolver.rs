//! Converter resolution, activation and dispatch.
//!
//! [`ConverterResolver`] owns a frozen [`ConverterRegistry`] and answers
//! conversion requests:
//!
//! 1. take the runtime type of the source value,
//! 2. resolve a converter type across both lineages,
//! 3. activate it (or reuse a cached instance),
//! 4. present the value as the matched source type and invoke the converter.
//!
//! Every failure along the way yields `None` from
//! [`try_convert`](ConverterResolver::try_convert). Callers that need to know
//! which step failed use [`convert_detailed`](ConverterResolver::convert_detailed).
//!
//! # Example
//!
//! ```
//! use shapeshift_core::TypeKey;
//! use shapeshift_resolver::ConverterResolver;
//!
//! let resolver = ConverterResolver::with_defaults();
//!
//! assert_eq!(resolver.try_convert_to::<String, i32>(&"123".into()), Some(123));
//! assert_eq!(resolver.try_convert_to::<String, i32>(&"abc".into()), None);
//!
//! let boxed = resolver
//!     .try_convert(&"3.14".to_string(), TypeKey::of::<f64>())
//!     .unwrap();
//! assert_eq!(*boxed.downcast::<f64>().unwrap(), 3.14);
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::Level;
use parking_lot::RwLock;

use shapeshift_core::{ConversionError, DynConverter, ResolverConfig, TypeKey};

use crate::activation::ConverterType;
use crate::builtins;
use crate::registry::ConverterRegistry;

/// An activated converter and the source type its registration was for.
#[derive(Clone)]
struct Bound {
    converter: Arc<dyn DynConverter>,
    via: TypeKey,
}

/// Resolves, activates and invokes converters from a registry.
///
/// `ConverterResolver` is `Send + Sync`; share it behind an `Arc`.
pub struct ConverterResolver {
    registry: ConverterRegistry,
    config: ResolverConfig,
    cache: RwLock<HashMap<(TypeId, TypeId), Bound>>,
}

impl ConverterResolver {
    /// Creates a resolver with the default configuration.
    pub fn new(registry: ConverterRegistry) -> Self {
        Self::with_config(registry, ResolverConfig::default())
    }

    /// Creates a resolver with an explicit configuration.
    pub fn with_config(registry: ConverterRegistry, config: ResolverConfig) -> Self {
        Self {
            registry,
            config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// A resolver over [`builtins::default_registry`].
    pub fn with_defaults() -> Self {
        Self::new(builtins::default_registry())
    }

    /// The underlying registry.
    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// The active configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// See [`ConverterRegistry::resolve_exact`].
    pub fn resolve_exact(&self, source: TypeKey, result: TypeKey) -> Option<&ConverterType> {
        self.registry.resolve_exact(source, result)
    }

    /// See [`ConverterRegistry::resolve`].
    pub fn resolve(&self, source: TypeKey, result: TypeKey) -> Option<&ConverterType> {
        self.registry.resolve(source, result)
    }

    /// Instantiates `converter` for `result`. Never cached.
    pub fn activate(
        &self,
        result: TypeKey,
        converter: &ConverterType,
    ) -> Option<Arc<dyn DynConverter>> {
        converter.activate(result)
    }

    /// Resolves and activates a converter for `(source, result)`.
    pub fn resolve_activated(
        &self,
        source: TypeKey,
        result: TypeKey,
    ) -> Option<Arc<dyn DynConverter>> {
        self.bind(source, result).ok().map(|bound| bound.converter)
    }

    /// Converts `source` into a value of type `result`.
    ///
    /// The returned box holds whatever the resolved converter produced. When
    /// the match came from an ancestor of `result`, that may be a value of
    /// the ancestor type rather than `result` itself.
    pub fn try_convert(&self, source: &dyn Any, result: TypeKey) -> Option<Box<dyn Any + Send>> {
        self.convert_detailed(source, result).ok()
    }

    /// Converts `source` into an `R`.
    ///
    /// Returns `None` on any miss, including a converter whose output is not
    /// an `R`.
    pub fn try_convert_to<S: Any, R: Any>(&self, source: &S) -> Option<R> {
        self.convert_to_detailed(source).ok()
    }

    /// Like [`try_convert`](Self::try_convert), reporting why nothing was
    /// produced.
    pub fn convert_detailed(
        &self,
        source: &dyn Any,
        result: TypeKey,
    ) -> Result<Box<dyn Any + Send>, ConversionError> {
        let source_key = self.registry.hierarchy().key_for(source.type_id());
        let bound = self.bind(source_key, result)?;

        let rejected = || ConversionError::Rejected {
            converter: bound.converter.name(),
            source_type: source_key,
        };

        let view = self
            .registry
            .hierarchy()
            .project_to(source, bound.via)
            .ok_or_else(rejected)?;

        bound.converter.convert_dyn(view).ok_or_else(|| {
            log::trace!("{} had no result for {source_key} -> {result}", bound.converter.name());
            rejected()
        })
    }

    /// Like [`try_convert_to`](Self::try_convert_to), reporting why nothing
    /// was produced.
    pub fn convert_to_detailed<S: Any, R: Any>(&self, source: &S) -> Result<R, ConversionError> {
        let expected = TypeKey::of::<R>();
        self.convert_detailed(source, expected)?
            .downcast::<R>()
            .map(|value| *value)
            .map_err(|_| ConversionError::UnexpectedOutput { expected })
    }

    /// Drops every cached converter instance.
    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }

    /// Number of cached converter instances.
    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }

    fn bind(&self, source: TypeKey, result: TypeKey) -> Result<Bound, ConversionError> {
        let cache_key = (source.id(), result.id());
        if self.config.cache_instances {
            if let Some(bound) = self.cache.read().get(&cache_key) {
                return Ok(bound.clone());
            }
        }

        let Some(resolution) = self.registry.resolve_match(source, result) else {
            let level = if self.config.log_misses {
                Level::Debug
            } else {
                Level::Trace
            };
            log::log!(level, "no converter for {source} -> {result}");
            return Err(ConversionError::NoConverter {
                source_type: source,
                result_type: result,
            });
        };

        let converter = resolution.converter.activate(result).ok_or_else(|| {
            ConversionError::ActivationFailed {
                converter: resolution.converter.name(),
                result_type: result,
            }
        })?;

        log::debug!(
            "{source} -> {result} bound to {} via ({} -> {})",
            converter.name(),
            resolution.source,
            resolution.result
        );

        let bound = Bound {
            converter,
            via: resolution.source,
        };

        if self.config.cache_instances {
            self.cache
                .write()
                .entry(cache_key)
                .or_insert_with(|| bound.clone());
        }

        Ok(bound)
    }
}

impl fmt::Debug for ConverterResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterResolver")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("cached", &self.cached_len())
            .finish()
    }
}
