//! Record-type identity.
//!
//! A `TypeKey` is the join key between application record types, the
//! storage bindings that govern them, and the aliases that refer to them.

use std::any::TypeId;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Stable, comparable identity of a Rust type.
///
/// Two keys compare equal exactly when they were produced from the same
/// type. The type name is carried along for diagnostics only and never takes
/// part in comparisons.
///
/// # Example
///
/// ```rust
/// use relmap_common::types::TypeKey;
///
/// struct User;
/// struct Post;
///
/// assert_eq!(TypeKey::of::<User>(), TypeKey::of::<User>());
/// assert_ne!(TypeKey::of::<User>(), TypeKey::of::<Post>());
/// ```
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Returns the key of `T`.
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Returns the underlying `TypeId`.
    #[inline]
    #[must_use]
    pub const fn type_id(self) -> TypeId {
        self.id
    }

    /// Returns the fully qualified type name.
    #[inline]
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        self.name
    }

    /// Returns the last path segment of the type name, without generics.
    #[must_use]
    pub fn short_name(self) -> &'static str {
        let base = match self.name.find('<') {
            Some(pos) => &self.name[..pos],
            None => self.name,
        };
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Checks whether this key identifies `T`.
    #[inline]
    #[must_use]
    pub fn is<T: ?Sized + 'static>(self) -> bool {
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
