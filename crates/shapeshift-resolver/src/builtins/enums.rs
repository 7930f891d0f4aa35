//! String to enum conversion.
//!
//! A single converter serves every enum. It is registered for the
//! `(String, AnyEnum)` pair and activated through its targeted factory, which
//! receives the enum the caller actually asked for and looks up that enum's
//! variant table in an [`EnumCatalog`].

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use shapeshift_core::{DynConverter, TypeKey};

use crate::activation::ConverterType;

/// Family marker for enums known to an [`EnumCatalog`].
///
/// Uninhabited; it only exists as a registry key and hierarchy parent.
#[derive(Debug)]
pub enum AnyEnum {}

/// An enum whose variants can be looked up by name.
///
/// # Example
///
/// ```
/// use shapeshift_resolver::builtins::EnumType;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Level {
///     Low,
///     High,
/// }
///
/// impl EnumType for Level {
///     fn variants() -> &'static [(&'static str, Self)] {
///         &[("Low", Level::Low), ("High", Level::High)]
///     }
/// }
/// ```
pub trait EnumType: Any + Copy + Send + Sync {
    /// Every variant with its name.
    fn variants() -> &'static [(&'static str, Self)];
}

type ParseFn = fn(&str) -> Option<Box<dyn Any + Send>>;

#[derive(Clone, Copy)]
struct EnumTable {
    key: TypeKey,
    parse: ParseFn,
}

fn parse_variant<E: EnumType>(text: &str) -> Option<Box<dyn Any + Send>> {
    let text = text.trim();
    E::variants()
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(text))
        .map(|(_, variant)| Box::new(*variant) as Box<dyn Any + Send>)
}

/// The enums string-to-enum conversion can produce.
#[derive(Clone, Default)]
pub struct EnumCatalog {
    tables: HashMap<TypeId, EnumTable>,
}

impl EnumCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `E`.
    pub fn with<E: EnumType>(mut self) -> Self {
        let key = TypeKey::of::<E>();
        self.tables.insert(
            key.id(),
            EnumTable {
                key,
                parse: parse_variant::<E>,
            },
        );
        self
    }

    /// Adds every enum in `other`.
    pub fn merge(mut self, other: EnumCatalog) -> Self {
        self.tables.extend(other.tables);
        self
    }

    /// Returns `true` if `key` names a catalogued enum.
    pub fn contains(&self, key: TypeKey) -> bool {
        self.tables.contains_key(&key.id())
    }

    /// Keys of every catalogued enum.
    pub fn keys(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.tables.values().map(|table| table.key)
    }

    /// Number of catalogued enums.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns `true` if no enum is catalogued.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// A converter parsing into `target`, if it is catalogued.
    pub fn converter_for(&self, target: TypeKey) -> Option<StringToEnum> {
        self.tables
            .get(&target.id())
            .map(|table| StringToEnum { table: *table })
    }
}

impl fmt::Debug for EnumCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

/// Parses a `String` into one specific enum, matching variant names
/// case-insensitively.
pub struct StringToEnum {
    table: EnumTable,
}

impl StringToEnum {
    /// The enum this converter produces.
    pub fn target(&self) -> TypeKey {
        self.table.key
    }

    /// The converter type to register for `(String, AnyEnum)`.
    ///
    /// It has only a targeted factory; activation fails for result types the
    /// catalog does not know.
    pub fn converter_type(catalog: Arc<EnumCatalog>) -> ConverterType {
        ConverterType::of::<Self>().with_targeted(move |target| catalog.converter_for(target))
    }
}

impl DynConverter for StringToEnum {
    fn convert_dyn(&self, source: &dyn Any) -> Option<Box<dyn Any + Send>> {
        let text = source.downcast_ref::<String>()?;
        (self.table.parse)(text)
    }
}

impl fmt::Debug for StringToEnum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringToEnum")
            .field("target", &self.table.key)
            .finish()
    }
}
