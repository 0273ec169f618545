//! Traversal of fixed-size heterogeneous tuples.
//!
//! Rust closures cannot be generic over their argument type, so visitation
//! is expressed through visitor traits: a visitor implements `Visitor<T>`
//! (or `TypeVisitor<T>`) for every element type it can handle, and the
//! tuple implementations below dispatch to the matching impl per slot.
//!
//! Both traversals visit exactly `ARITY` slots, in declaration order or its
//! exact reverse.
//!
//! ```rust
//! use relmap_core::tuple::{for_each, Order, Visitor};
//!
//! #[derive(Default)]
//! struct Names(Vec<String>);
//!
//! impl<T: std::fmt::Debug> Visitor<T> for Names {
//!     fn visit(&mut self, element: &T) {
//!         self.0.push(format!("{:?}", element));
//!     }
//! }
//!
//! let mut names = Names::default();
//! for_each(&(1, "two", 3.0), &mut names, Order::Reverse);
//! assert_eq!(names.0, ["3.0", "\"two\"", "1"]);
//! ```

use std::fmt;
use std::marker::PhantomData;

/// Visits tuple elements of type `T`.
pub trait Visitor<T> {
    /// Called once per element of type `T`.
    fn visit(&mut self, element: &T);
}

/// Visits tuple slot types without requiring a tuple value.
pub trait TypeVisitor<T> {
    /// Called once per slot declared as `T`.
    fn visit_type(&mut self, slot: Slot<T>);
}

/// Type-tagged placeholder standing in for a tuple slot.
pub struct Slot<T>(PhantomData<fn() -> T>);

impl<T> Slot<T> {
    /// Creates the placeholder.
    pub fn new() -> Self {
        Slot(PhantomData)
    }

    /// Returns the Rust name of the slot type.
    pub fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Slot<T> {}

impl<T> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot<{}>", self.type_name())
    }
}

/// Traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// First slot to last.
    #[default]
    Forward,
    /// Last slot to first.
    Reverse,
}

/// A fixed-size heterogeneous tuple.
pub trait Tuple {
    /// Number of slots.
    const ARITY: usize;
}

/// Element-wise visitation of a tuple value.
pub trait ForEach<V>: Tuple {
    /// Visits the element at `index`; out-of-range indices are ignored.
    fn visit_at(&self, index: usize, visitor: &mut V);
}

/// Slot-type visitation of a tuple type.
pub trait ForEachType<V>: Tuple {
    /// Visits the slot type at `index`; out-of-range indices are ignored.
    fn visit_type_at(index: usize, visitor: &mut V);
}

/// Applies `visitor` to every element of `tuple` in the given order.
pub fn for_each<T, V>(tuple: &T, visitor: &mut V, order: Order)
where
    T: ForEach<V>,
{
    match order {
        Order::Forward => {
            for index in 0..T::ARITY {
                tuple.visit_at(index, visitor);
            }
        }
        Order::Reverse => {
            for index in (0..T::ARITY).rev() {
                tuple.visit_at(index, visitor);
            }
        }
    }
}

/// Applies `visitor` to a placeholder for every slot type of `T`, in
/// declaration order.
pub fn for_each_type<T, V>(visitor: &mut V)
where
    T: ForEachType<V>,
{
    for index in 0..T::ARITY {
        T::visit_type_at(index, visitor);
    }
}

macro_rules! impl_tuple {
    ($arity:expr; $($idx:tt => $T:ident),*) => {
        impl<$($T,)*> Tuple for ($($T,)*) {
            const ARITY: usize = $arity;
        }

        impl<V, $($T,)*> ForEach<V> for ($($T,)*)
        where
            $(V: Visitor<$T>,)*
        {
            #[allow(unused_variables)]
            fn visit_at(&self, index: usize, visitor: &mut V) {
                match index {
                    $($idx => <V as Visitor<$T>>::visit(visitor, &self.$idx),)*
                    _ => {}
                }
            }
        }

        impl<V, $($T,)*> ForEachType<V> for ($($T,)*)
        where
            $(V: TypeVisitor<$T>,)*
        {
            #[allow(unused_variables)]
            fn visit_type_at(index: usize, visitor: &mut V) {
                match index {
                    $($idx => <V as TypeVisitor<$T>>::visit_type(visitor, Slot::new()),)*
                    _ => {}
                }
            }
        }
    };
}

impl_tuple!(0;);
impl_tuple!(1; 0 => A);
impl_tuple!(2; 0 => A, 1 => B);
impl_tuple!(3; 0 => A, 1 => B, 2 => C);
impl_tuple!(4; 0 => A, 1 => B, 2 => C, 3 => D);
impl_tuple!(5; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E);
impl_tuple!(6; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F);
impl_tuple!(7; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G);
impl_tuple!(8; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H);
impl_tuple!(9; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H, 8 => I);
impl_tuple!(10; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H, 8 => I, 9 => J);
impl_tuple!(11; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H, 8 => I, 9 => J, 10 => K);
impl_tuple!(12; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H, 8 => I, 9 => J, 10 => K, 11 => L);
