//! Built-in converters and the default registry.
//!
//! # Modules
//!
//! - [`enums`]: `String` → any catalogued enum (target-activated)
//! - [`numeric`]: `String` → `i32`, `i64`, `f64`
//! - [`text`]: `String` → `String` passthrough and `String` → `bool`
//!
//! Every built-in is stateless and safe to cache.

pub mod enums;
pub mod numeric;
pub mod text;

use std::sync::Arc;

use shapeshift_core::TypeKey;

pub use enums::{AnyEnum, EnumCatalog, EnumType, StringToEnum};
pub use numeric::{StringToDouble, StringToInt32, StringToInt64};
pub use text::{StringIdentity, StringToBool};

use crate::activation::ConverterType;
use crate::registry::{ConverterRegistry, RegistryBuilder};

/// Registers every built-in converter on `builder`.
///
/// The enum converter covers the enums added so far with
/// [`RegistryBuilder::with_enums`], if any.
pub fn register_defaults(builder: RegistryBuilder) -> RegistryBuilder {
    let enums = builder.enums().clone();
    builder
        .register_typed::<String, i32, StringToInt32>()
        .register_typed::<String, i64, StringToInt64>()
        .register_typed::<String, f64, StringToDouble>()
        .register_typed::<String, bool, StringToBool>()
        .register_typed::<String, String, StringIdentity>()
        .register(
            TypeKey::of::<String>(),
            TypeKey::of::<AnyEnum>(),
            enum_converter(enums),
        )
}

/// The `(String, AnyEnum)` converter type for `catalog`.
pub(crate) fn enum_converter(catalog: EnumCatalog) -> ConverterType {
    StringToEnum::converter_type(Arc::new(catalog))
}

/// A registry holding only the built-in converters.
pub fn default_registry() -> ConverterRegistry {
    RegistryBuilder::new().with_defaults().build()
}

/// A registry holding the built-in converters, able to parse the enums in
/// `enums`.
pub fn default_registry_with_enums(enums: EnumCatalog) -> ConverterRegistry {
    RegistryBuilder::new().with_defaults().with_enums(enums).build()
}
