//! Value codec: conversions between engine values and Rust types.
//!
//! Decoding is lenient where the engine itself would be (integral reals,
//! numeric text) and strict everywhere else: non-numeric text never decodes
//! into a numeric slot, and NULL only decodes into `Option<T>` or `Value`.

use relmap_common::{RelmapError, RelmapResult};

use super::{Value, ValueType};

/// Decodes a concrete type from an engine value.
pub trait FromValue: Sized {
    /// Storage class this type is declared as, or `None` when any class is
    /// accepted as-is.
    const DECLARED_TYPE: Option<ValueType>;

    /// Decodes `value`.
    fn from_value(value: &Value) -> RelmapResult<Self>;
}

/// Encodes a concrete type into an engine value.
pub trait ToValue {
    /// Encodes `self`.
    fn to_value(&self) -> Value;
}

fn mismatch(expected: &str, value: &Value) -> RelmapError {
    RelmapError::type_mismatch(expected, value.describe())
}

fn unexpected_null(expected: &str) -> RelmapError {
    RelmapError::UnexpectedNull {
        position: None,
        expected: expected.to_string(),
    }
}

fn decode_i64(value: &Value, expected: &str) -> RelmapResult<i64> {
    match value {
        Value::Integer(i) => Ok(*i),
        #[allow(clippy::cast_possible_truncation)]
        Value::Real(f) if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 => {
            Ok(*f as i64)
        }
        Value::Text(s) => s.trim().parse::<i64>().map_err(|_| mismatch(expected, value)),
        Value::Null => Err(unexpected_null(expected)),
        _ => Err(mismatch(expected, value)),
    }
}

fn decode_f64(value: &Value, expected: &str) -> RelmapResult<f64> {
    match value {
        #[allow(clippy::cast_precision_loss)]
        Value::Integer(i) => Ok(*i as f64),
        Value::Real(f) => Ok(*f),
        Value::Text(s) => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(f),
            _ => Err(mismatch(expected, value)),
        },
        Value::Null => Err(unexpected_null(expected)),
        Value::Blob(_) => Err(mismatch(expected, value)),
    }
}

impl FromValue for i64 {
    const DECLARED_TYPE: Option<ValueType> = Some(ValueType::Integer);

    fn from_value(value: &Value) -> RelmapResult<Self> {
        decode_i64(value, "INTEGER")
    }
}

impl FromValue for i32 {
    const DECLARED_TYPE: Option<ValueType> = Some(ValueType::Integer);

    fn from_value(value: &Value) -> RelmapResult<Self> {
        let wide = decode_i64(value, "INTEGER")?;
        i32::try_from(wide).map_err(|_| mismatch("INTEGER (32-bit)", value))
    }
}

impl FromValue for u32 {
    const DECLARED_TYPE: Option<ValueType> = Some(ValueType::Integer);

    fn from_value(value: &Value) -> RelmapResult<Self> {
        let wide = decode_i64(value, "INTEGER")?;
        u32::try_from(wide).map_err(|_| mismatch("INTEGER (unsigned 32-bit)", value))
    }
}

impl FromValue for bool {
    const DECLARED_TYPE: Option<ValueType> = Some(ValueType::Integer);

    fn from_value(value: &Value) -> RelmapResult<Self> {
        decode_i64(value, "BOOLEAN").map(|i| i != 0)
    }
}

impl FromValue for f64 {
    const DECLARED_TYPE: Option<ValueType> = Some(ValueType::Real);

    fn from_value(value: &Value) -> RelmapResult<Self> {
        decode_f64(value, "REAL")
    }
}

impl FromValue for f32 {
    const DECLARED_TYPE: Option<ValueType> = Some(ValueType::Real);

    #[allow(clippy::cast_possible_truncation)]
    fn from_value(value: &Value) -> RelmapResult<Self> {
        let wide = decode_f64(value, "REAL")?;
        let narrow = wide as f32;
        if wide.is_finite() && !narrow.is_finite() {
            return Err(mismatch("REAL (32-bit)", value));
        }
        Ok(narrow)
    }
}

impl FromValue for String {
    const DECLARED_TYPE: Option<ValueType> = Some(ValueType::Text);

    fn from_value(value: &Value) -> RelmapResult<Self> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            Value::Integer(i) => Ok(i.to_string()),
            Value::Real(f) => Ok(f.to_string()),
            Value::Blob(b) => String::from_utf8(b.clone()).map_err(|_| mismatch("TEXT", value)),
            Value::Null => Err(unexpected_null("TEXT")),
        }
    }
}

impl FromValue for Vec<u8> {
    const DECLARED_TYPE: Option<ValueType> = Some(ValueType::Blob);

    fn from_value(value: &Value) -> RelmapResult<Self> {
        match value {
            Value::Blob(b) => Ok(b.clone()),
            Value::Text(s) => Ok(s.as_bytes().to_vec()),
            Value::Null => Err(unexpected_null("BLOB")),
            _ => Err(mismatch("BLOB", value)),
        }
    }
}

impl FromValue for Value {
    const DECLARED_TYPE: Option<ValueType> = None;

    fn from_value(value: &Value) -> RelmapResult<Self> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const DECLARED_TYPE: Option<ValueType> = T::DECLARED_TYPE;

    fn from_value(value: &Value) -> RelmapResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl ToValue for i64 {
    fn to_value(&self) -> Value {
        Value::Integer(*self)
    }
}

impl ToValue for i32 {
    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl ToValue for u32 {
    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Real(*self)
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Real(f64::from(*self))
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl ToValue for [u8] {
    fn to_value(&self) -> Value {
        Value::Blob(self.to_vec())
    }
}

impl ToValue for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Blob(self.clone())
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T: ToValue + FromValue + PartialEq + std::fmt::Debug>(v: T) {
        let encoded = v.to_value();
        assert_eq!(T::from_value(&encoded).unwrap(), v);
    }

    #[test]
    fn test_round_trip_scalars() {
        round_trip(42i64);
        round_trip(-7i32);
        round_trip(7u32);
        round_trip(true);
        round_trip(2.5f64);
        round_trip(0.25f32);
        round_trip("one".to_string());
        round_trip(vec![0u8, 1, 255]);
        round_trip(Some(3i64));
        round_trip(None::<String>);
        round_trip(Value::text("raw"));
    }

    #[test]
    fn test_integer_decoding() {
        assert_eq!(i64::from_value(&Value::real(3.0)).unwrap(), 3);
        assert_eq!(i64::from_value(&Value::text(" 12 ")).unwrap(), 12);
        assert!(i64::from_value(&Value::real(3.5)).is_err());
        assert!(i64::from_value(&Value::blob(vec![1u8])).is_err());

        let err = i32::from_value(&Value::integer(i64::MAX)).unwrap_err();
        assert!(matches!(err, RelmapError::TypeMismatch { .. }));

        let err = u32::from_value(&Value::integer(-1)).unwrap_err();
        assert!(err.is_decode_error());
    }

    #[test]
    fn test_real_out_of_f32_range() {
        let err = f32::from_value(&Value::real(1e300)).unwrap_err();
        assert!(matches!(err, RelmapError::TypeMismatch { .. }));
        assert!(f32::from_value(&Value::real(-1e39)).is_err());

        assert_eq!(f32::from_value(&Value::real(f64::from(f32::MAX))).unwrap(), f32::MAX);
        assert_eq!(f32::from_value(&Value::integer(3)).unwrap(), 3.0);
        assert!(f32::from_value(&Value::real(f64::INFINITY)).unwrap().is_infinite());
    }

    #[test]
    fn test_non_numeric_text_is_rejected() {
        let err = f64::from_value(&Value::text("abc")).unwrap_err();
        assert!(matches!(err, RelmapError::TypeMismatch { .. }));
        assert!(err.to_string().contains("TEXT 'abc'"));

        assert!(i64::from_value(&Value::text("abc")).is_err());
        assert!(f64::from_value(&Value::text("inf")).is_err());
        assert_eq!(f64::from_value(&Value::text("1e3")).unwrap(), 1000.0);
    }

    #[test]
    fn test_null_handling() {
        let err = String::from_value(&Value::Null).unwrap_err();
        assert!(matches!(err, RelmapError::UnexpectedNull { .. }));
        assert_eq!(Option::<String>::from_value(&Value::Null).unwrap(), None);
        assert_eq!(Value::from_value(&Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_text_rendering() {
        assert_eq!(String::from_value(&Value::integer(5)).unwrap(), "5");
        assert_eq!(String::from_value(&Value::real(1.5)).unwrap(), "1.5");
        assert_eq!(String::from_value(&Value::blob(b"hi".to_vec())).unwrap(), "hi");
        assert!(String::from_value(&Value::blob(vec![0xFFu8, 0xFE])).is_err());
    }

    #[test]
    fn test_declared_types() {
        assert_eq!(<i32 as FromValue>::DECLARED_TYPE, Some(ValueType::Integer));
        assert_eq!(<Option<f64> as FromValue>::DECLARED_TYPE, Some(ValueType::Real));
        assert_eq!(<Value as FromValue>::DECLARED_TYPE, None);
    }

    #[test]
    fn test_reference_encoding() {
        assert_eq!("one".to_value(), Value::text("one"));
        assert_eq!((&5i64).to_value(), Value::integer(5));
        assert_eq!(b"ab"[..].to_value(), Value::blob(b"ab".to_vec()));
    }
}
