//! Declared type hierarchies.
//!
//! Rust has no open-ended subtyping, so supertypes are declared explicitly by
//! the registrant. Each declaration links a type to exactly one parent and
//! says how a value of the child type is presented to code expecting the
//! parent:
//!
//! - `extends` edges carry a projection `fn(&Child) -> &Parent`, typically a
//!   field access for a struct that embeds its base.
//! - `member_of` edges have no projection. The parent is a family marker
//!   (such as [`AnyEnum`](crate::builtins::AnyEnum)) and converters
//!   registered for it receive the child value unchanged.
//!
//! [`TypeHierarchy::lineage`] walks these edges most-derived first.

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;

use shapeshift_core::TypeKey;

/// Presents a child value as its parent.
trait Projection: Send + Sync {
    fn project<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any>;
}

struct FieldProjection<D, B> {
    project: fn(&D) -> &B,
}

impl<D: Any, B: Any> Projection for FieldProjection<D, B> {
    fn project<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any> {
        value
            .downcast_ref::<D>()
            .map(|derived| (self.project)(derived) as &dyn Any)
    }
}

struct Edge {
    parent: TypeKey,
    // `None` for family membership: the value is passed through as-is.
    projection: Option<Box<dyn Projection>>,
}

/// Parent links between types, frozen inside a registry once built.
#[derive(Default)]
pub struct TypeHierarchy {
    parents: HashMap<TypeId, Edge>,
    names: HashMap<TypeId, &'static str>,
}

impl TypeHierarchy {
    /// Creates an empty hierarchy in which every type is its own root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `D` a subtype of `B`, projecting values with `project`.
    ///
    /// Redeclaring a parent for `D` replaces the previous one.
    pub(crate) fn extends<D: Any, B: Any>(&mut self, project: fn(&D) -> &B) {
        self.link(
            TypeKey::of::<D>(),
            TypeKey::of::<B>(),
            Some(Box::new(FieldProjection { project })),
        );
    }

    /// Declares `T` a member of the family marked by `F`.
    ///
    /// No projection is recorded: converters keyed on `F` receive the `T`
    /// value itself, so only a `DynConverter` that downcasts to `T` can
    /// serve it.
    pub(crate) fn member_of<T: Any, F: Any + ?Sized>(&mut self) {
        self.link_family(TypeKey::of::<T>(), TypeKey::of::<F>());
    }

    /// Untyped form of [`member_of`](Self::member_of).
    pub(crate) fn link_family(&mut self, child: TypeKey, family: TypeKey) {
        self.link(child, family, None);
    }

    fn link(&mut self, child: TypeKey, parent: TypeKey, projection: Option<Box<dyn Projection>>) {
        self.remember(child);
        self.remember(parent);
        if let Some(previous) = self.parents.insert(child.id(), Edge { parent, projection }) {
            log::debug!(
                "parent of {child} redeclared: {} replaced by {parent}",
                previous.parent
            );
        }
    }

    /// Records a display name for `key` so runtime lookups can report it.
    pub(crate) fn remember(&mut self, key: TypeKey) {
        self.names.entry(key.id()).or_insert(key.name());
    }

    /// The declared parent of `key`, if any.
    pub fn parent(&self, key: TypeKey) -> Option<TypeKey> {
        self.parents.get(&key.id()).map(|edge| edge.parent)
    }

    /// `key`, its parent, its parent's parent, and so on, most-derived first.
    ///
    /// A declared cycle is cut at the first repeated type.
    pub fn lineage(&self, key: TypeKey) -> Vec<TypeKey> {
        let mut chain = vec![key];
        let mut seen = HashSet::from([key.id()]);
        let mut current = key;

        while let Some(parent) = self.parent(current) {
            if !seen.insert(parent.id()) {
                log::warn!("type hierarchy cycle at {parent}, stopping walk from {key}");
                break;
            }
            chain.push(parent);
            current = parent;
        }

        chain
    }

    /// Returns `true` if `ancestor` appears in the lineage of `key`.
    pub fn is_a(&self, key: TypeKey, ancestor: TypeKey) -> bool {
        self.lineage(key).contains(&ancestor)
    }

    /// Presents `value` as `target`, walking up from the value's runtime type.
    ///
    /// Returns `None` if `target` is not in the value's lineage or a
    /// projection along the way does not apply.
    pub fn project_to<'a>(&self, value: &'a dyn Any, target: TypeKey) -> Option<&'a dyn Any> {
        let mut current = value;
        let mut current_id = value.type_id();
        let mut seen = HashSet::new();

        loop {
            if current_id == target.id() {
                return Some(current);
            }
            if !seen.insert(current_id) {
                return None;
            }
            let edge = self.parents.get(&current_id)?;
            if let Some(projection) = &edge.projection {
                current = projection.project(current)?;
            }
            current_id = edge.parent.id();
        }
    }

    /// A key for a runtime `TypeId`, named if the type was ever declared.
    pub fn key_for(&self, id: TypeId) -> TypeKey {
        let name = self.names.get(&id).copied().unwrap_or("<unregistered>");
        TypeKey::from_parts(id, name)
    }

    /// Number of declared parent links.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Returns `true` if no parent links are declared.
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

impl fmt::Debug for TypeHierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (child, edge) in &self.parents {
            map.entry(&self.key_for(*child), &edge.parent);
        }
        map.finish()
    }
}
