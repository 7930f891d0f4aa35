//! Converter registry and its builder.
//!
//! A [`RegistryBuilder`] collects `(source, result, converter)` registrations
//! and hierarchy declarations, then [`RegistryBuilder::build`] freezes them
//! into a [`ConverterRegistry`]. The registry is never mutated afterwards and
//! can be read from any number of threads without locking.
//!
//! # Resolution order
//!
//! [`ConverterRegistry::resolve`] walks the source lineage most-derived
//! first, and for each source candidate walks the whole result lineage
//! most-derived first. The first registered pair wins, so source specificity
//! always dominates result specificity.
//!
//! # Example
//!
//! ```
//! use shapeshift_core::{Converter, TypeKey};
//! use shapeshift_resolver::RegistryBuilder;
//!
//! struct Base { id: u32 }
//! struct Derived { base: Base }
//!
//! #[derive(Default)]
//! struct BaseId;
//!
//! impl Converter<Base, u32> for BaseId {
//!     fn convert(&self, source: &Base) -> Option<u32> {
//!         Some(source.id)
//!     }
//! }
//!
//! let registry = RegistryBuilder::new()
//!     .register_typed::<Base, u32, BaseId>()
//!     .extends::<Derived, Base>(|d| &d.base)
//!     .build();
//!
//! let found = registry.resolve(TypeKey::of::<Derived>(), TypeKey::of::<u32>());
//! assert!(found.unwrap().is::<BaseId>());
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use shapeshift_core::{Converter, TypeKey};

use crate::activation::ConverterType;
use crate::builtins::{self, AnyEnum, EnumCatalog};
use crate::hierarchy::TypeHierarchy;

/// The registered pair that satisfied a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Source type of the matching registration (the queried source or one
    /// of its ancestors).
    pub source: TypeKey,
    /// Result type of the matching registration.
    pub result: TypeKey,
    /// The registered converter type.
    pub converter: ConverterType,
}

/// Collects registrations for a [`ConverterRegistry`].
///
/// Registering the same `(source, result)` pair twice keeps the last
/// converter. `build` consumes the builder.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: HashMap<TypeKey, HashMap<TypeKey, ConverterType>>,
    hierarchy: TypeHierarchy,
    enums: EnumCatalog,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `converter` for the exact `(source, result)` pair.
    pub fn register(mut self, source: TypeKey, result: TypeKey, converter: ConverterType) -> Self {
        self.hierarchy.remember(source);
        self.hierarchy.remember(result);
        let by_result = self.entries.entry(source).or_default();
        if let Some(previous) = by_result.insert(result, converter) {
            log::debug!(
                "converter for {source} -> {result} overwritten (was {})",
                previous.key()
            );
        }
        self
    }

    /// Registers a typed converter `C` for `(S, R)`, instantiated through
    /// `Default`.
    pub fn register_typed<S, R, C>(self) -> Self
    where
        S: Any,
        R: Any + Send,
        C: Converter<S, R> + Default,
    {
        self.register(
            TypeKey::of::<S>(),
            TypeKey::of::<R>(),
            ConverterType::typed::<S, R, C>(),
        )
    }

    /// Declares `D` a subtype of `B`. A `D` value is presented to converters
    /// registered for `B` through `project`.
    pub fn extends<D: Any, B: Any>(mut self, project: fn(&D) -> &B) -> Self {
        self.hierarchy.extends(project);
        self
    }

    /// Declares `T` a member of the family marked by `F`. Converters
    /// registered for `F` receive `T` values unchanged.
    ///
    /// Because the value is not projected, a converter registered with `F`
    /// as its source must be a [`DynConverter`](shapeshift_core::DynConverter)
    /// that downcasts to the member types itself. A typed `Converter<F, _>`
    /// rejects every member value.
    pub fn member_of<T: Any, F: Any + ?Sized>(mut self) -> Self {
        self.hierarchy.member_of::<T, F>();
        self
    }

    /// Registers every built-in converter.
    pub fn with_defaults(self) -> Self {
        builtins::register_defaults(self)
    }

    /// Makes the enums in `catalog` members of [`AnyEnum`] and registers the
    /// string-to-enum converter for them.
    ///
    /// Catalogs from repeated calls accumulate. The converter registered for
    /// `(String, AnyEnum)` covers every enum added so far and replaces any
    /// earlier registration for that pair.
    pub fn with_enums(mut self, catalog: EnumCatalog) -> Self {
        for key in catalog.keys() {
            self.hierarchy.link_family(key, TypeKey::of::<AnyEnum>());
        }
        self.enums = std::mem::take(&mut self.enums).merge(catalog);
        let converter = builtins::enum_converter(self.enums.clone());
        self.register(TypeKey::of::<String>(), TypeKey::of::<AnyEnum>(), converter)
    }

    /// Every enum added through [`with_enums`](Self::with_enums).
    pub fn enums(&self) -> &EnumCatalog {
        &self.enums
    }

    /// Freezes the registrations.
    pub fn build(self) -> ConverterRegistry {
        let registry = ConverterRegistry {
            entries: self.entries,
            hierarchy: self.hierarchy,
        };
        log::debug!(
            "converter registry built: {} registrations, {} hierarchy links",
            registry.len(),
            registry.hierarchy.len()
        );
        registry
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("entries", &self.entries)
            .field("hierarchy", &self.hierarchy)
            .field("enums", &self.enums)
            .finish()
    }
}

/// Immutable map from `(source type, result type)` to converter type.
pub struct ConverterRegistry {
    entries: HashMap<TypeKey, HashMap<TypeKey, ConverterType>>,
    hierarchy: TypeHierarchy,
}

impl ConverterRegistry {
    /// Starts a new builder.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The converter registered for exactly `(source, result)`.
    pub fn resolve_exact(&self, source: TypeKey, result: TypeKey) -> Option<&ConverterType> {
        self.entries.get(&source)?.get(&result)
    }

    /// The best converter for `(source, result)`, walking both lineages.
    pub fn resolve(&self, source: TypeKey, result: TypeKey) -> Option<&ConverterType> {
        self.find(source, result).map(|(_, _, converter)| converter)
    }

    /// Like [`resolve`](Self::resolve), also reporting which pair matched.
    pub fn resolve_match(&self, source: TypeKey, result: TypeKey) -> Option<Resolution> {
        self.find(source, result)
            .map(|(source, result, converter)| Resolution {
                source,
                result,
                converter: converter.clone(),
            })
    }

    fn find(&self, source: TypeKey, result: TypeKey) -> Option<(TypeKey, TypeKey, &ConverterType)> {
        let results = self.hierarchy.lineage(result);

        for candidate_source in self.hierarchy.lineage(source) {
            let Some(by_result) = self.entries.get(&candidate_source) else {
                log::trace!("no registrations from {candidate_source}");
                continue;
            };
            for candidate_result in &results {
                log::trace!("probing {candidate_source} -> {candidate_result}");
                if let Some(converter) = by_result.get(candidate_result) {
                    return Some((candidate_source, *candidate_result, converter));
                }
            }
        }

        None
    }

    /// `key` followed by its declared ancestors, most-derived first.
    pub fn lineage(&self, key: TypeKey) -> Vec<TypeKey> {
        self.hierarchy.lineage(key)
    }

    /// The frozen type hierarchy.
    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    /// Every registration as `(source, result, converter)`, in no particular
    /// order.
    pub fn registrations(&self) -> impl Iterator<Item = (TypeKey, TypeKey, &ConverterType)> {
        self.entries.iter().flat_map(|(source, by_result)| {
            by_result
                .iter()
                .map(move |(result, converter)| (*source, *result, converter))
        })
    }

    /// Number of registered pairs.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("entries", &self.entries)
            .field("hierarchy", &self.hierarchy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapeshift_core::DynConverter;

    struct Base;
    struct Derived {
        base: Base,
    }
    struct MostDerived {
        derived: Derived,
    }

    struct ResultBase;
    struct ResultDerived;

    macro_rules! marker_converter {
        ($($name:ident),*) => {
            $(
                #[derive(Default)]
                struct $name;

                impl DynConverter for $name {
                    fn convert_dyn(&self, _source: &dyn Any) -> Option<Box<dyn Any + Send>> {
                        Some(Box::new(stringify!($name)))
                    }
                }
            )*
        };
    }

    marker_converter!(ConvA, ConvB, ConvC, ConvD);

    fn key<T: Any>() -> TypeKey {
        TypeKey::of::<T>()
    }

    fn hierarchy_builder() -> RegistryBuilder {
        RegistryBuilder::new()
            .extends::<Derived, Base>(|d| &d.base)
            .extends::<MostDerived, Derived>(|m| &m.derived)
            .member_of::<ResultDerived, ResultBase>()
    }

    #[test]
    fn test_resolve_exact_registered_pair() {
        let registry = RegistryBuilder::new()
            .register(key::<Base>(), key::<ResultBase>(), ConverterType::dynamic::<ConvA>())
            .build();

        let found = registry.resolve_exact(key::<Base>(), key::<ResultBase>());
        assert!(found.unwrap().is::<ConvA>());
    }

    #[test]
    fn test_resolve_exact_ignores_hierarchy() {
        let registry = hierarchy_builder()
            .register(key::<Base>(), key::<ResultBase>(), ConverterType::dynamic::<ConvA>())
            .build();

        assert!(registry.resolve_exact(key::<Derived>(), key::<ResultBase>()).is_none());
        assert!(registry.resolve_exact(key::<Base>(), key::<ResultDerived>()).is_none());
    }

    #[test]
    fn test_resolve_exact_unregistered_pair() {
        let registry = RegistryBuilder::new()
            .register(key::<Base>(), key::<ResultBase>(), ConverterType::dynamic::<ConvA>())
            .build();

        assert!(registry.resolve_exact(key::<ResultBase>(), key::<Base>()).is_none());
        assert!(registry.resolve_exact(key::<Base>(), key::<String>()).is_none());
    }

    #[test]
    fn test_resolve_walks_source_hierarchy() {
        let registry = hierarchy_builder()
            .register(key::<Base>(), key::<ResultBase>(), ConverterType::dynamic::<ConvA>())
            .build();

        let from_base = registry.resolve(key::<Base>(), key::<ResultBase>()).unwrap();
        let from_most = registry
            .resolve(key::<MostDerived>(), key::<ResultBase>())
            .unwrap();
        assert_eq!(from_base, from_most);
    }

    #[test]
    fn test_resolve_walks_result_hierarchy() {
        let registry = hierarchy_builder()
            .register(key::<Base>(), key::<ResultBase>(), ConverterType::dynamic::<ConvA>())
            .build();

        let found = registry.resolve(key::<Derived>(), key::<ResultDerived>());
        assert!(found.unwrap().is::<ConvA>());
    }

    #[test]
    fn test_resolve_source_specificity_wins() {
        let registry = hierarchy_builder()
            .register(key::<Base>(), key::<ResultDerived>(), ConverterType::dynamic::<ConvA>())
            .register(key::<Derived>(), key::<ResultBase>(), ConverterType::dynamic::<ConvB>())
            .build();

        let found = registry.resolve(key::<Derived>(), key::<ResultDerived>());
        assert!(found.unwrap().is::<ConvB>());
    }

    #[test]
    fn test_resolve_prefers_exact_pair() {
        let registry = hierarchy_builder()
            .register(key::<Derived>(), key::<ResultDerived>(), ConverterType::dynamic::<ConvA>())
            .register(key::<Derived>(), key::<ResultBase>(), ConverterType::dynamic::<ConvB>())
            .register(key::<Base>(), key::<ResultDerived>(), ConverterType::dynamic::<ConvC>())
            .build();

        let found = registry.resolve(key::<Derived>(), key::<ResultDerived>());
        assert!(found.unwrap().is::<ConvA>());
    }

    #[test]
    fn test_resolve_falls_back_to_base_source() {
        let registry = hierarchy_builder()
            .register(key::<Base>(), key::<ResultDerived>(), ConverterType::dynamic::<ConvA>())
            .register(key::<Base>(), key::<ResultBase>(), ConverterType::dynamic::<ConvD>())
            .build();

        let found = registry.resolve(key::<MostDerived>(), key::<ResultDerived>());
        assert!(found.unwrap().is::<ConvA>());
    }

    #[test]
    fn test_resolve_miss() {
        let registry = hierarchy_builder()
            .register(key::<Derived>(), key::<ResultBase>(), ConverterType::dynamic::<ConvA>())
            .build();

        assert!(registry.resolve(key::<Base>(), key::<ResultBase>()).is_none());
        assert!(registry.resolve(key::<Derived>(), key::<String>()).is_none());
    }

    #[test]
    fn test_resolve_same_type_without_registration() {
        let registry = hierarchy_builder().build();
        assert!(registry.resolve(key::<Base>(), key::<Base>()).is_none());
    }

    #[test]
    fn test_resolve_match_reports_matched_pair() {
        let registry = hierarchy_builder()
            .register(key::<Base>(), key::<ResultBase>(), ConverterType::dynamic::<ConvA>())
            .build();

        let resolution = registry
            .resolve_match(key::<MostDerived>(), key::<ResultDerived>())
            .unwrap();
        assert_eq!(resolution.source, key::<Base>());
        assert_eq!(resolution.result, key::<ResultBase>());
        assert!(resolution.converter.is::<ConvA>());
    }

    #[test]
    fn test_reregistration_last_wins() {
        let registry = RegistryBuilder::new()
            .register(key::<Base>(), key::<ResultBase>(), ConverterType::dynamic::<ConvA>())
            .register(key::<Base>(), key::<ResultBase>(), ConverterType::dynamic::<ConvB>())
            .build();

        let found = registry.resolve(key::<Base>(), key::<ResultBase>());
        assert!(found.unwrap().is::<ConvB>());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registrations_iterator() {
        let registry = RegistryBuilder::new()
            .register(key::<Base>(), key::<ResultBase>(), ConverterType::dynamic::<ConvA>())
            .register(key::<Base>(), key::<ResultDerived>(), ConverterType::dynamic::<ConvB>())
            .register(key::<Derived>(), key::<ResultBase>(), ConverterType::dynamic::<ConvC>())
            .build();

        let mut seen: Vec<_> = registry
            .registrations()
            .map(|(_, _, converter)| converter.name())
            .collect();
        seen.sort();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().any(|name| name.ends_with("ConvA")));
        assert!(seen.iter().any(|name| name.ends_with("ConvC")));
    }

    #[test]
    fn test_empty_registry() {
        let registry = ConverterRegistry::builder().build();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_lineage_exposed() {
        let registry = hierarchy_builder().build();
        assert_eq!(
            registry.lineage(key::<MostDerived>()),
            vec![key::<MostDerived>(), key::<Derived>(), key::<Base>()]
        );
    }

    #[test]
    fn test_registry_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConverterRegistry>();
    }
}
