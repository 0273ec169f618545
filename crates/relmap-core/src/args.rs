//! Argument tuple building.
//!
//! When the engine invokes a user function it hands over a flat array of
//! raw values plus a count. This module reconstructs the positionally typed
//! argument tuple the callback declared:
//!
//! - **Fixed shape**: a tuple `(A, B, ...)` of `FromValue` types. Each slot
//!   `i` is decoded from raw value `i`; the count is not consulted.
//! - **Variadic shape**: `ArgValues`, a catch-all list that borrows the raw
//!   values and decodes elements lazily on demand.
//!
//! Decode failures propagate unchanged (with the failing position attached);
//! no partial tuple is ever returned.

use std::fmt;

use relmap_common::{RelmapError, RelmapResult};

use crate::tuple::{for_each, for_each_type, ForEach, ForEachType, Order, Slot, TypeVisitor, Visitor};
use crate::value::{FromValue, ToValue, Value, ValueType};

/// Declared parameter shape of a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamShape {
    /// Exactly this many positional arguments.
    Fixed(usize),
    /// Any number of arguments, delivered as one catch-all list.
    Variadic,
}

impl ParamShape {
    /// Returns the fixed arity, if any.
    pub fn arity(self) -> Option<usize> {
        match self {
            ParamShape::Fixed(n) => Some(n),
            ParamShape::Variadic => None,
        }
    }

    /// Returns true if `count` arguments satisfy this shape.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            ParamShape::Fixed(n) => n == count,
            ParamShape::Variadic => true,
        }
    }

    /// Engine-facing arity code: the fixed arity, or -1 for variadic.
    pub fn as_engine_arity(self) -> i32 {
        match self {
            ParamShape::Fixed(n) => i32::try_from(n).unwrap_or(i32::MAX),
            ParamShape::Variadic => -1,
        }
    }
}

impl fmt::Display for ParamShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamShape::Fixed(n) => write!(f, "{}", n),
            ParamShape::Variadic => write!(f, "any"),
        }
    }
}

/// A parameter list that can be rebuilt from raw engine values.
pub trait ArgTuple<'a>: Sized {
    /// Declared shape.
    const SHAPE: ParamShape;

    /// Builds the argument list from `values`, of which the first `count`
    /// are live.
    fn build(values: &'a [Value], count: usize) -> RelmapResult<Self>;

    /// Declared storage class per slot (`None` for untyped slots). Empty
    /// for the variadic shape.
    fn param_types() -> Vec<Option<ValueType>>;
}

/// Rebuilds the argument list `P` from raw values.
///
/// # Errors
///
/// Returns the first decode error encountered, with the failing argument
/// position attached.
pub fn build<'a, P: ArgTuple<'a>>(values: &'a [Value], count: usize) -> RelmapResult<P> {
    P::build(values, count)
}

fn slot<T: FromValue>(values: &[Value], index: usize) -> RelmapResult<T> {
    let value = values.get(index).ok_or(RelmapError::MissingArgument {
        position: index,
        available: values.len(),
    })?;
    T::from_value(value).map_err(|e| e.at_position(index))
}

/// Collects the declared storage class of every slot.
#[derive(Debug, Default)]
struct DeclaredTypes(Vec<Option<ValueType>>);

impl<T: FromValue> TypeVisitor<T> for DeclaredTypes {
    fn visit_type(&mut self, _slot: Slot<T>) {
        self.0.push(T::DECLARED_TYPE);
    }
}

fn declared_types<T: ForEachType<DeclaredTypes>>() -> Vec<Option<ValueType>> {
    let mut types = DeclaredTypes::default();
    for_each_type::<T, _>(&mut types);
    types.0
}

macro_rules! impl_arg_tuple {
    ($arity:expr; $($idx:tt => $T:ident),*) => {
        impl<'a, $($T: FromValue,)*> ArgTuple<'a> for ($($T,)*) {
            const SHAPE: ParamShape = ParamShape::Fixed($arity);

            #[allow(unused_variables)]
            fn build(values: &'a [Value], _count: usize) -> RelmapResult<Self> {
                Ok(($(slot::<$T>(values, $idx)?,)*))
            }

            fn param_types() -> Vec<Option<ValueType>> {
                declared_types::<Self>()
            }
        }
    };
}

impl_arg_tuple!(0;);
impl_arg_tuple!(1; 0 => A);
impl_arg_tuple!(2; 0 => A, 1 => B);
impl_arg_tuple!(3; 0 => A, 1 => B, 2 => C);
impl_arg_tuple!(4; 0 => A, 1 => B, 2 => C, 3 => D);
impl_arg_tuple!(5; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E);
impl_arg_tuple!(6; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F);
impl_arg_tuple!(7; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G);
impl_arg_tuple!(8; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H);
impl_arg_tuple!(9; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H, 8 => I);
impl_arg_tuple!(10; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H, 8 => I, 9 => J);
impl_arg_tuple!(11; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H, 8 => I, 9 => J, 10 => K);
impl_arg_tuple!(12; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H, 8 => I, 9 => J, 10 => K, 11 => L);

/// Catch-all argument list over borrowed raw values.
#[derive(Debug, Clone, Copy)]
pub struct ArgValues<'a> {
    values: &'a [Value],
}

impl<'a> ArgValues<'a> {
    /// Wraps the first `count` raw values.
    ///
    /// # Errors
    ///
    /// Returns `MissingArgument` if fewer than `count` values are supplied.
    pub fn new(values: &'a [Value], count: usize) -> RelmapResult<Self> {
        let values = values.get(..count).ok_or(RelmapError::MissingArgument {
            position: values.len(),
            available: values.len(),
        })?;
        Ok(Self { values })
    }

    /// Returns the number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no arguments were passed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the argument at `index`.
    pub fn get(&self, index: usize) -> Option<ArgValue<'a>> {
        self.values.get(index).map(|value| ArgValue { index, value })
    }

    /// Iterates over the arguments in call order.
    pub fn iter(&self) -> ArgIter<'a> {
        ArgIter {
            values: self.values,
            next: 0,
        }
    }

    /// Returns the raw values.
    pub fn raw(&self) -> &'a [Value] {
        self.values
    }
}

impl<'a> ArgTuple<'a> for ArgValues<'a> {
    const SHAPE: ParamShape = ParamShape::Variadic;

    fn build(values: &'a [Value], count: usize) -> RelmapResult<Self> {
        ArgValues::new(values, count)
    }

    fn param_types() -> Vec<Option<ValueType>> {
        Vec::new()
    }
}

impl<'a> IntoIterator for ArgValues<'a> {
    type Item = ArgValue<'a>;
    type IntoIter = ArgIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &ArgValues<'a> {
    type Item = ArgValue<'a>;
    type IntoIter = ArgIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a catch-all argument list.
#[derive(Debug, Clone)]
pub struct ArgIter<'a> {
    values: &'a [Value],
    next: usize,
}

impl<'a> Iterator for ArgIter<'a> {
    type Item = ArgValue<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.values.get(self.next)?;
        let item = ArgValue {
            index: self.next,
            value,
        };
        self.next += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.values.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ArgIter<'_> {}

/// One element of a catch-all argument list, decoded on demand.
#[derive(Debug, Clone, Copy)]
pub struct ArgValue<'a> {
    index: usize,
    value: &'a Value,
}

impl<'a> ArgValue<'a> {
    /// Position of this argument in the call.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Storage class of the raw value.
    pub fn value_type(&self) -> ValueType {
        self.value.value_type()
    }

    /// Returns true if the raw value is NULL.
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    /// Returns true if the raw value is an integer.
    pub fn is_integer(&self) -> bool {
        self.value.is_integer()
    }

    /// Returns true if the raw value is a real.
    pub fn is_float(&self) -> bool {
        self.value.is_real()
    }

    /// Returns true if the raw value is text.
    pub fn is_text(&self) -> bool {
        self.value.is_text()
    }

    /// Returns true if the raw value is a blob.
    pub fn is_blob(&self) -> bool {
        self.value.is_blob()
    }

    /// Decodes the raw value as `T`.
    ///
    /// # Errors
    ///
    /// Returns the codec's decode error, tagged with this argument's index.
    pub fn get<T: FromValue>(&self) -> RelmapResult<T> {
        T::from_value(self.value).map_err(|e| e.at_position(self.index))
    }

    /// Returns the raw value.
    pub fn raw(&self) -> &'a Value {
        self.value
    }
}

/// Tuple visitor that encodes every element it is shown.
#[derive(Debug, Default)]
pub struct ValueEncoder(Vec<Value>);

impl ValueEncoder {
    /// Returns the encoded values.
    pub fn into_values(self) -> Vec<Value> {
        self.0
    }
}

impl<T: ToValue> Visitor<T> for ValueEncoder {
    fn visit(&mut self, element: &T) {
        self.0.push(element.to_value());
    }
}

/// Encodes a tuple of `ToValue` elements into raw values, in slot order.
///
/// This is the inverse of building a fixed-shape argument tuple.
pub fn to_values<T: ForEach<ValueEncoder>>(tuple: &T) -> Vec<Value> {
    let mut encoder = ValueEncoder::default();
    for_each(tuple, &mut encoder, Order::Forward);
    encoder.into_values()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_fixed() {
        let values = vec![Value::text("one"), Value::text("o")];
        let (a, b): (String, String) = build(&values, 2).unwrap();
        assert_eq!(a, "one");
        assert_eq!(b, "o");
    }

    #[test]
    fn test_build_ignores_count_for_fixed_shape() {
        let values = vec![Value::integer(4)];
        let (x,): (f64,) = build(&values, 0).unwrap();
        assert_eq!(x, 4.0);
    }

    #[test]
    fn test_build_empty() {
        let () = build::<()>(&[], 0).unwrap();
        assert_eq!(<() as ArgTuple>::SHAPE, ParamShape::Fixed(0));
    }

    #[test]
    fn test_decode_error_has_position() {
        let values = vec![Value::integer(1), Value::text("abc")];
        let err = build::<(i64, f64)>(&values, 2).unwrap_err();
        assert!(matches!(
            err,
            RelmapError::TypeMismatch {
                position: Some(1),
                ..
            }
        ));
    }

    #[test]
    fn test_missing_argument() {
        let values = vec![Value::integer(1)];
        let err = build::<(i64, i64)>(&values, 1).unwrap_err();
        assert!(matches!(
            err,
            RelmapError::MissingArgument {
                position: 1,
                available: 1
            }
        ));
    }

    #[test]
    fn test_param_types() {
        assert_eq!(
            <(i32, String, Option<f64>, Vec<u8>, Value) as ArgTuple>::param_types(),
            vec![
                Some(ValueType::Integer),
                Some(ValueType::Text),
                Some(ValueType::Real),
                Some(ValueType::Blob),
                None,
            ]
        );
        assert!(<ArgValues as ArgTuple>::param_types().is_empty());
        assert_eq!(<(i32, i32, i32) as ArgTuple>::SHAPE, ParamShape::Fixed(3));
    }

    #[test]
    fn test_variadic_preserves_count_and_order() {
        let values = vec![Value::text("Vanotek"), Value::integer(2), Value::Null];

        let none = build::<ArgValues>(&values, 0).unwrap();
        assert!(none.is_empty());
        assert_eq!(none.iter().count(), 0);

        let one = build::<ArgValues>(&values, 1).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one.get(0).unwrap().get::<String>().unwrap(), "Vanotek");

        let all = build::<ArgValues>(&values, 3).unwrap();
        assert_eq!(all.len(), 3);
        let raw: Vec<&Value> = all.iter().map(|v| v.raw()).collect();
        assert_eq!(raw, values.iter().collect::<Vec<_>>());
        assert!(all.get(1).unwrap().is_integer());
        assert!(all.get(2).unwrap().is_null());
        assert!(all.get(3).is_none());
    }

    #[test]
    fn test_variadic_count_beyond_values() {
        let values = vec![Value::integer(1)];
        let err = build::<ArgValues>(&values, 2).unwrap_err();
        assert!(matches!(err, RelmapError::MissingArgument { .. }));
    }

    #[test]
    fn test_lazy_element_decode_error() {
        let values = vec![Value::integer(1), Value::blob(vec![1u8])];
        let args = build::<ArgValues>(&values, 2).unwrap();
        assert_eq!(args.get(0).unwrap().get::<i64>().unwrap(), 1);
        let err = args.get(1).unwrap().get::<f64>().unwrap_err();
        assert!(matches!(
            err,
            RelmapError::TypeMismatch {
                position: Some(1),
                ..
            }
        ));
    }

    #[test]
    fn test_to_values_round_trip() {
        let encoded = to_values(&(1i64, "two".to_string(), 3.5f64, Some(true)));
        assert_eq!(
            encoded,
            vec![
                Value::integer(1),
                Value::text("two"),
                Value::real(3.5),
                Value::integer(1)
            ]
        );

        let decoded: (i64, String, f64, Option<bool>) = build(&encoded, encoded.len()).unwrap();
        assert_eq!(decoded, (1, "two".to_string(), 3.5, Some(true)));
    }

    #[test]
    fn test_round_trip_every_scalar_type() {
        let original = (
            -7i32,
            4_000_000_000u32,
            1.25f32,
            false,
            vec![0u8, 159, 255],
            i64::MIN,
            "text".to_string(),
            -0.5f64,
            None::<i64>,
        );
        let encoded = to_values(&original);
        assert_eq!(
            encoded,
            vec![
                Value::integer(-7),
                Value::integer(4_000_000_000),
                Value::real(1.25),
                Value::integer(0),
                Value::blob(vec![0u8, 159, 255]),
                Value::integer(i64::MIN),
                Value::text("text"),
                Value::real(-0.5),
                Value::Null,
            ]
        );

        let decoded: (i32, u32, f32, bool, Vec<u8>, i64, String, f64, Option<i64>) =
            build(&encoded, encoded.len()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_shape_helpers() {
        assert!(ParamShape::Fixed(2).accepts(2));
        assert!(!ParamShape::Fixed(2).accepts(3));
        assert!(ParamShape::Variadic.accepts(0));
        assert_eq!(ParamShape::Variadic.as_engine_arity(), -1);
        assert_eq!(ParamShape::Fixed(3).arity(), Some(3));
        assert_eq!(ParamShape::Variadic.to_string(), "any");
    }
}
