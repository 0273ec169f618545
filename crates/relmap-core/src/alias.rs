//! Alias classification.
//!
//! Every type that can appear as a recordset in a query implements
//! `Classify` and names its role with one marker type:
//!
//! - `Record` for plain types,
//! - `Aliased` for aliases (only available to types implementing `Alias`),
//! - `Reference<O>` for table references to `O`.
//!
//! An alias in turn names its target: `Expression` for column aliases, or
//! `AliasOf<O>` for aliases of the record set `O`. Every classification
//! fact, and the record set a type is looked up as, is derived from these
//! markers:
//!
//! | role            | target          | class               |
//! |-----------------|-----------------|---------------------|
//! | `Record`        |                 | `Plain`             |
//! | `Aliased`       | `Expression`    | `ColumnAlias`       |
//! | `Aliased`       | another type    | `TableAlias`        |
//! | `Aliased`       | itself          | `RecordsetAlias`    |
//! | `Reference<O>`  | `O`             | `TableReference`    |
//!
//! A self-referential alias names a recordset without introducing a new
//! record type; it is a recordset alias but never a table alias.

use std::fmt;
use std::marker::PhantomData;

use relmap_common::TypeKey;

/// Structural role of a type in recordset expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// An ordinary type (mapped record or not).
    #[default]
    Plain,
    /// A column, table or recordset alias.
    Alias,
    /// A non-aliasing reference to a mapped record type.
    TableReference,
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Record {}
    impl Sealed for super::Aliased {}
    impl<O> Sealed for super::Reference<O> {}
    impl Sealed for super::Expression {}
    impl<O> Sealed for super::AliasOf<O> {}
}

/// Classification capability.
///
/// Plain record types use the `Record` role:
///
/// ```rust
/// use relmap_core::alias::{self, Classify, Record};
///
/// struct User;
/// impl Classify for User {
///     type Role = Record;
/// }
///
/// assert!(!alias::is_alias::<User>());
/// ```
pub trait Classify: Sized + 'static {
    /// Role marker: `Record`, `Aliased` or `Reference<O>`.
    type Role: RoleOf<Self>;
}

/// Facts a role marker fixes for the classified type `A`.
pub trait RoleOf<A>: sealed::Sealed {
    /// Structural role.
    const ROLE: Role;

    /// Record set `A` is looked up as.
    type Recordset: 'static;

    /// Record type exposed by `A`, if any.
    fn referenced() -> Option<TypeKey>;
}

/// Role of plain types.
#[derive(Debug, Clone, Copy, Default)]
pub struct Record;

impl<A: 'static> RoleOf<A> for Record {
    const ROLE: Role = Role::Plain;
    type Recordset = A;

    fn referenced() -> Option<TypeKey> {
        None
    }
}

/// Role of aliases. `Aliased` is a role of `A` only when `A: Alias`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aliased;

impl<A: Alias> RoleOf<A> for Aliased {
    const ROLE: Role = Role::Alias;
    type Recordset = <A::Target as AliasTarget<A>>::Recordset;

    fn referenced() -> Option<TypeKey> {
        <A::Target as AliasTarget<A>>::referenced()
    }
}

/// Role of table references to `O`.
pub struct Reference<O>(PhantomData<fn() -> O>);

impl<A, O: 'static> RoleOf<A> for Reference<O> {
    const ROLE: Role = Role::TableReference;
    type Recordset = O;

    fn referenced() -> Option<TypeKey> {
        Some(TypeKey::of::<O>())
    }
}

/// Named alias.
///
/// Implementing `Alias` fixes the role to `Aliased`, and `Aliased` is not
/// available without it:
///
/// ```compile_fail
/// use relmap_core::alias::{Alias, Classify, Expression, Record};
///
/// struct Named;
/// impl Classify for Named {
///     type Role = Record;
/// }
/// impl Alias for Named {
///     type Target = Expression;
///     fn alias_name() -> String {
///         "n".to_string()
///     }
/// }
/// ```
///
/// ```compile_fail
/// use relmap_core::alias::{Aliased, Classify};
///
/// struct NotAnAlias;
/// impl Classify for NotAnAlias {
///     type Role = Aliased;
/// }
/// ```
pub trait Alias: Classify<Role = Aliased> {
    /// What the alias stands for: `Expression` or `AliasOf<O>`.
    type Target: AliasTarget<Self>;

    /// Identifier the alias renders as.
    fn alias_name() -> String;
}

/// Target of an alias `A`.
pub trait AliasTarget<A>: sealed::Sealed {
    /// Record set the alias is looked up as.
    type Recordset: 'static;

    /// Referenced record type, if any.
    fn referenced() -> Option<TypeKey>;
}

/// Target of column aliases: an expression, no record set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Expression;

impl<A: 'static> AliasTarget<A> for Expression {
    type Recordset = A;

    fn referenced() -> Option<TypeKey> {
        None
    }
}

/// Target of aliases standing for the record set `O`.
pub struct AliasOf<O>(PhantomData<fn() -> O>);

impl<A, O: 'static> AliasTarget<A> for AliasOf<O> {
    type Recordset = O;

    fn referenced() -> Option<TypeKey> {
        Some(TypeKey::of::<O>())
    }
}

/// Record set a `Classify` type is looked up as.
pub type RecordsetOf<A> = <<A as Classify>::Role as RoleOf<A>>::Recordset;

/// Result of classifying a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    /// Not an alias and not a table reference.
    Plain,
    /// Alias of a single column or expression.
    ColumnAlias,
    /// Alias of a different mapped record type.
    TableAlias {
        /// Referenced record type.
        target: TypeKey,
    },
    /// Alias whose referenced type is the alias itself.
    RecordsetAlias {
        /// Referenced record type (the alias).
        target: TypeKey,
    },
    /// Non-aliasing reference to a mapped record type.
    TableReference {
        /// Referenced record type.
        target: TypeKey,
    },
}

impl TypeClass {
    /// True for every alias kind.
    pub fn is_alias(self) -> bool {
        matches!(
            self,
            TypeClass::ColumnAlias | TypeClass::TableAlias { .. } | TypeClass::RecordsetAlias { .. }
        )
    }

    /// True for aliases that expose no referenced type.
    pub fn is_column_alias(self) -> bool {
        matches!(self, TypeClass::ColumnAlias)
    }

    /// True for aliases that expose a referenced type (table aliases included).
    pub fn is_recordset_alias(self) -> bool {
        matches!(self, TypeClass::TableAlias { .. } | TypeClass::RecordsetAlias { .. })
    }

    /// True for aliases of a different record type.
    pub fn is_table_alias(self) -> bool {
        matches!(self, TypeClass::TableAlias { .. })
    }

    /// True for table references.
    pub fn is_table_reference(self) -> bool {
        matches!(self, TypeClass::TableReference { .. })
    }

    /// Table reference or table alias.
    pub fn refers_to_table(self) -> bool {
        self.is_table_reference() || self.is_table_alias()
    }

    /// Table reference or any recordset alias.
    pub fn refers_to_recordset(self) -> bool {
        self.is_table_reference() || self.is_recordset_alias()
    }

    /// Referenced record type, if any.
    pub fn target(self) -> Option<TypeKey> {
        match self {
            TypeClass::TableAlias { target }
            | TypeClass::RecordsetAlias { target }
            | TypeClass::TableReference { target } => Some(target),
            TypeClass::Plain | TypeClass::ColumnAlias => None,
        }
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeClass::Plain => write!(f, "plain"),
            TypeClass::ColumnAlias => write!(f, "column alias"),
            TypeClass::TableAlias { target } => write!(f, "table alias of {}", target),
            TypeClass::RecordsetAlias { target } => write!(f, "recordset alias of {}", target),
            TypeClass::TableReference { target } => write!(f, "table reference to {}", target),
        }
    }
}

/// Structural role of `A`.
pub fn role<A: Classify>() -> Role {
    <A::Role as RoleOf<A>>::ROLE
}

/// Record type exposed by `A`, if any.
pub fn referenced<A: Classify>() -> Option<TypeKey> {
    <A::Role as RoleOf<A>>::referenced()
}

/// Classifies `A`.
pub fn classify<A: Classify>() -> TypeClass {
    let own = TypeKey::of::<A>();
    match (role::<A>(), referenced::<A>()) {
        (Role::Plain, _) => TypeClass::Plain,
        (Role::Alias, None) => TypeClass::ColumnAlias,
        (Role::Alias, Some(target)) if target == own => TypeClass::RecordsetAlias { target },
        (Role::Alias, Some(target)) => TypeClass::TableAlias { target },
        (Role::TableReference, target) => TypeClass::TableReference {
            target: target.unwrap_or(own),
        },
    }
}

/// True iff `A` is an alias, that is iff `A: Alias`.
pub fn is_alias<A: Classify>() -> bool {
    role::<A>() == Role::Alias
}

/// True iff `A` is an alias exposing no referenced type.
pub fn is_column_alias<A: Classify>() -> bool {
    classify::<A>().is_column_alias()
}

/// True iff `A` is an alias exposing a referenced type.
pub fn is_recordset_alias<A: Classify>() -> bool {
    classify::<A>().is_recordset_alias()
}

/// True iff `A` is a recordset alias of some other type.
pub fn is_table_alias<A: Classify>() -> bool {
    classify::<A>().is_table_alias()
}

/// True iff `A` is a table reference.
pub fn is_table_reference<A: Classify>() -> bool {
    role::<A>() == Role::TableReference
}

/// Table reference or table alias.
pub fn refers_to_table<A: Classify>() -> bool {
    classify::<A>().refers_to_table()
}

/// Table reference or recordset alias.
pub fn refers_to_recordset<A: Classify>() -> bool {
    classify::<A>().refers_to_recordset()
}

/// Identity after decaying table references; aliases keep their own key.
pub fn decay<A: Classify>() -> TypeKey {
    match classify::<A>() {
        TypeClass::TableReference { target } => target,
        _ => TypeKey::of::<A>(),
    }
}

/// Canonical record-type key used to look `A` up in a binding chain.
///
/// Table references and recordset aliases resolve to their referenced type;
/// everything else is looked up as itself. This is the key of
/// `RecordsetOf<A>`, the type `pick_recordset` resolves statically.
pub fn lookup_key<A: Classify>() -> TypeKey {
    TypeKey::of::<RecordsetOf<A>>()
}

/// Non-aliasing reference to the mapped record type `O`.
pub struct TableRef<O>(PhantomData<fn() -> O>);

impl<O> TableRef<O> {
    /// Creates the reference.
    pub const fn new() -> Self {
        TableRef(PhantomData)
    }
}

impl<O: 'static> Classify for TableRef<O> {
    type Role = Reference<O>;
}

impl<O> Default for TableRef<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> Clone for TableRef<O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O> Copy for TableRef<O> {}

impl<O> fmt::Debug for TableRef<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableRef<{}>", std::any::type_name::<O>())
    }
}

/// Single-letter alias of the record type `O`, rendered as `C`.
///
/// Two aliases of the same record type with different letters are distinct
/// types, which lets one query mention the same table twice.
pub struct TableAlias<O, const C: char>(PhantomData<fn() -> O>);

impl<O, const C: char> TableAlias<O, C> {
    /// Creates the alias.
    pub const fn new() -> Self {
        TableAlias(PhantomData)
    }
}

impl<O: 'static, const C: char> Classify for TableAlias<O, C> {
    type Role = Aliased;
}

impl<O: 'static, const C: char> Alias for TableAlias<O, C> {
    type Target = AliasOf<O>;

    fn alias_name() -> String {
        C.to_string()
    }
}

impl<O, const C: char> Default for TableAlias<O, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O, const C: char> Clone for TableAlias<O, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O, const C: char> Copy for TableAlias<O, C> {}

impl<O, const C: char> fmt::Debug for TableAlias<O, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableAlias<{}, '{}'>", std::any::type_name::<O>(), C)
    }
}

/// Single-letter column alias, rendered as `C`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnAlias<const C: char>;

impl<const C: char> Classify for ColumnAlias<C> {
    type Role = Aliased;
}

impl<const C: char> Alias for ColumnAlias<C> {
    type Target = Expression;

    fn alias_name() -> String {
        C.to_string()
    }
}
