//! The binding chain.
//!
//! A chain is a cons list `Link<B1, Link<B2, ... EmptyBinding>>` built once
//! in declaration order. Two lookups walk it:
//!
//! - `Pick` resolves at compile time. Each impl names a position in the
//!   chain through an index marker (`Here`/`There<I>`), so a key bound
//!   exactly once has exactly one index and the compiler infers it. An
//!   unmapped key has no index and fails to compile; a key bound twice has
//!   two and is ambiguous.
//! - `BindingChain::find_by` runs at runtime, head to tail, and returns the
//!   first binding whose table-type descriptor or record type equals the key.

use std::marker::PhantomData;

use relmap_common::TypeKey;

use crate::schema::{EmptyBinding, StorageBinding, Table};
use crate::tuple::Order;

/// One binding followed by the rest of the chain.
#[derive(Debug)]
pub struct Link<B, N> {
    head: B,
    tail: N,
}

impl<B, N> Link<B, N> {
    /// Prepends `head` to `tail`.
    pub fn new(head: B, tail: N) -> Self {
        Self { head, tail }
    }

    /// First binding.
    pub fn head(&self) -> &B {
        &self.head
    }

    /// Remaining bindings.
    pub fn tail(&self) -> &N {
        &self.tail
    }
}

/// Builds a binding chain from bindings in declaration order.
///
/// ```rust
/// use relmap_core::chain;
/// use relmap_core::registry::BindingChain;
/// use relmap_core::schema::{EmptyBinding, Table};
///
/// struct User;
/// let chain = chain![Table::<User>::new("users")];
/// assert_eq!(chain.len(), 1);
///
/// let empty: EmptyBinding = chain![];
/// assert_eq!(empty.len(), 0);
/// ```
#[macro_export]
macro_rules! chain {
    () => {
        $crate::schema::EmptyBinding
    };
    ($head:expr $(, $rest:expr)* $(,)?) => {
        $crate::registry::Link::new($head, $crate::chain!($($rest),*))
    };
}

/// Runtime view of a binding chain.
pub trait BindingChain: Send + Sync + 'static {
    /// Number of bindings, sentinel excluded.
    const LEN: usize;

    /// Number of bindings, sentinel excluded.
    fn len(&self) -> usize {
        Self::LEN
    }

    /// First binding matching `key`, head to tail.
    fn find_by(&self, key: TypeKey) -> Option<&dyn StorageBinding>;

    /// Mutable variant of `find_by`.
    fn find_by_mut(&mut self, key: TypeKey) -> Option<&mut dyn StorageBinding>;

    /// Visits every binding in the given order.
    fn walk<'a>(&'a self, order: Order, visit: &mut dyn FnMut(&'a dyn StorageBinding));
}

impl BindingChain for EmptyBinding {
    const LEN: usize = 0;

    fn find_by(&self, _key: TypeKey) -> Option<&dyn StorageBinding> {
        None
    }

    fn find_by_mut(&mut self, _key: TypeKey) -> Option<&mut dyn StorageBinding> {
        None
    }

    fn walk<'a>(&'a self, _order: Order, _visit: &mut dyn FnMut(&'a dyn StorageBinding)) {}
}

impl<B: StorageBinding, N: BindingChain> BindingChain for Link<B, N> {
    const LEN: usize = 1 + N::LEN;

    fn find_by(&self, key: TypeKey) -> Option<&dyn StorageBinding> {
        if self.head.matches(key) {
            Some(&self.head)
        } else {
            self.tail.find_by(key)
        }
    }

    fn find_by_mut(&mut self, key: TypeKey) -> Option<&mut dyn StorageBinding> {
        if self.head.matches(key) {
            Some(&mut self.head)
        } else {
            self.tail.find_by_mut(key)
        }
    }

    fn walk<'a>(&'a self, order: Order, visit: &mut dyn FnMut(&'a dyn StorageBinding)) {
        match order {
            Order::Forward => {
                visit(&self.head);
                self.tail.walk(order, visit);
            }
            Order::Reverse => {
                self.tail.walk(order, visit);
                visit(&self.head);
            }
        }
    }
}

/// Index marker: the key is matched at this link.
#[derive(Debug)]
pub struct Here<M>(PhantomData<M>);

/// Index marker: the key is matched further down the chain.
#[derive(Debug)]
pub struct There<I>(PhantomData<I>);

/// Match marker: the key is the record type a table governs.
#[derive(Debug)]
pub struct ByObject;

/// Match marker: the key is the binding's own table-type descriptor.
#[derive(Debug)]
pub struct ByTableType;

/// Compile-time lookup of the binding responsible for `K`.
///
/// `Idx` is inferred; callers write `_` for it.
pub trait Pick<K, Idx> {
    /// Concrete type of the picked binding.
    type Binding: StorageBinding;

    /// Returns the binding.
    fn pick(&self) -> &Self::Binding;

    /// Returns the binding mutably.
    fn pick_mut(&mut self) -> &mut Self::Binding;
}

impl<O: 'static, N> Pick<O, Here<ByObject>> for Link<Table<O>, N> {
    type Binding = Table<O>;

    fn pick(&self) -> &Table<O> {
        &self.head
    }

    fn pick_mut(&mut self) -> &mut Table<O> {
        &mut self.head
    }
}

impl<B: StorageBinding, N> Pick<B, Here<ByTableType>> for Link<B, N> {
    type Binding = B;

    fn pick(&self) -> &B {
        &self.head
    }

    fn pick_mut(&mut self) -> &mut B {
        &mut self.head
    }
}

impl<K, B, N, I> Pick<K, There<I>> for Link<B, N>
where
    N: Pick<K, I>,
{
    type Binding = N::Binding;

    fn pick(&self) -> &Self::Binding {
        self.tail.pick()
    }

    fn pick_mut(&mut self) -> &mut Self::Binding {
        self.tail.pick_mut()
    }
}
