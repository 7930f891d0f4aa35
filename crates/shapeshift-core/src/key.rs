//! Nominal type identity.
//!
//! [`TypeKey`] pairs a [`TypeId`] with the type's name. Only the `TypeId`
//! takes part in equality, hashing and ordering, so two keys are equal exactly
//! when they denote the same Rust type. The name is carried for diagnostics.

use std::any::{Any, TypeId, type_name};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A stable, comparable identity for a Rust type.
///
/// # Example
///
/// ```
/// use shapeshift_core::TypeKey;
///
/// let a = TypeKey::of::<String>();
/// let b = TypeKey::of::<String>();
/// assert_eq!(a, b);
/// assert_ne!(a, TypeKey::of::<i32>());
/// ```
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Returns the key for `T`.
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Builds a key from a raw `TypeId` and a display name.
    ///
    /// Used when only the runtime `TypeId` of a value is known. The name does
    /// not affect identity.
    pub fn from_parts(id: TypeId, name: &'static str) -> Self {
        Self { id, name }
    }

    /// The underlying `TypeId`.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The full type name, as reported by [`std::any::type_name`].
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type name with module paths stripped (`alloc::string::String` → `String`).
    ///
    /// Tuples, arrays, slices, references and pointers keep their full name.
    pub fn short_name(&self) -> &'static str {
        let starts_with_path = self
            .name
            .starts_with(|c: char| c.is_alphanumeric() || c == '_');
        if !starts_with_path {
            return self.name;
        }
        // Generic arguments may contain `::` too; only strip the outer path.
        let head = self.name.split('<').next().unwrap_or(self.name);
        match head.rfind("::") {
            Some(pos) => &self.name[pos + 2..],
            None => self.name,
        }
    }

    /// Returns `true` if this key denotes `T`.
    pub fn is<T: Any + ?Sized>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for TypeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
