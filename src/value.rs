use crate::errors::InvalidArgument;
use std::fmt;

/// A value that can be stored in a [`SignedCookieStore`].
///
/// Only scalars are allowed: strings, booleans and numbers.
/// The variant is preserved when the value travels to the client and back.
///
/// [`SignedCookieStore`]: crate::SignedCookieStore
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum CookieValue {
    String(String),
    Bool(bool),
    Integer(i64),
    /// Never NaN or infinite once stored.
    Float(f64),
}

impl CookieValue {
    /// Returns the inner string slice, if `self` is a `CookieValue::String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CookieValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the inner boolean, if `self` is a `CookieValue::Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CookieValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the inner integer, if `self` is a `CookieValue::Integer`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CookieValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float, if `self` is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CookieValue::Integer(i) => Some(*i as f64),
            CookieValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for CookieValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CookieValue::String(s) => f.write_str(s),
            CookieValue::Bool(b) => write!(f, "{b}"),
            CookieValue::Integer(i) => write!(f, "{i}"),
            CookieValue::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<String> for CookieValue {
    fn from(value: String) -> Self {
        CookieValue::String(value)
    }
}

impl From<&str> for CookieValue {
    fn from(value: &str) -> Self {
        CookieValue::String(value.to_string())
    }
}

impl From<bool> for CookieValue {
    fn from(value: bool) -> Self {
        CookieValue::Bool(value)
    }
}

impl From<i32> for CookieValue {
    fn from(value: i32) -> Self {
        CookieValue::Integer(value.into())
    }
}

impl From<i64> for CookieValue {
    fn from(value: i64) -> Self {
        CookieValue::Integer(value)
    }
}

impl From<f64> for CookieValue {
    fn from(value: f64) -> Self {
        CookieValue::Float(value)
    }
}

/// Conversion into a [`CookieValue`], checked when the value is handed to the store.
///
/// It's implemented for strings, booleans, integers and floats.
/// It's also implemented for [`serde_json::Value`], to accept values whose
/// shape is only known at runtime: arrays, objects and `null` are rejected.
///
/// ```rust
/// use tiramisu::{CookieValue, IntoCookieValue};
/// use serde_json::json;
///
/// assert_eq!("dark".into_cookie_value().unwrap(), CookieValue::String("dark".into()));
/// assert_eq!(json!(3).into_cookie_value().unwrap(), CookieValue::Integer(3));
/// assert!(json!([1, 2]).into_cookie_value().is_err());
/// assert!(f64::NAN.into_cookie_value().is_err());
/// ```
pub trait IntoCookieValue {
    fn into_cookie_value(self) -> Result<CookieValue, InvalidArgument>;
}

impl IntoCookieValue for CookieValue {
    fn into_cookie_value(self) -> Result<CookieValue, InvalidArgument> {
        match self {
            CookieValue::Float(f) => f.into_cookie_value(),
            other => Ok(other),
        }
    }
}

impl IntoCookieValue for &CookieValue {
    fn into_cookie_value(self) -> Result<CookieValue, InvalidArgument> {
        self.clone().into_cookie_value()
    }
}

impl IntoCookieValue for String {
    fn into_cookie_value(self) -> Result<CookieValue, InvalidArgument> {
        Ok(CookieValue::String(self))
    }
}

impl IntoCookieValue for &str {
    fn into_cookie_value(self) -> Result<CookieValue, InvalidArgument> {
        Ok(CookieValue::String(self.to_string()))
    }
}

impl IntoCookieValue for &String {
    fn into_cookie_value(self) -> Result<CookieValue, InvalidArgument> {
        Ok(CookieValue::String(self.clone()))
    }
}

impl IntoCookieValue for bool {
    fn into_cookie_value(self) -> Result<CookieValue, InvalidArgument> {
        Ok(CookieValue::Bool(self))
    }
}

macro_rules! lossless_integer {
    ($($t:ty),*) => {
        $(
            impl IntoCookieValue for $t {
                fn into_cookie_value(self) -> Result<CookieValue, InvalidArgument> {
                    Ok(CookieValue::Integer(i64::from(self)))
                }
            }
        )*
    };
}

lossless_integer!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! wide_integer {
    ($($t:ty),*) => {
        $(
            impl IntoCookieValue for $t {
                fn into_cookie_value(self) -> Result<CookieValue, InvalidArgument> {
                    i64::try_from(self).map(CookieValue::Integer).map_err(|_| {
                        InvalidArgument::new(format!(
                            "Cookie value {} does not fit in a 64-bit signed integer.",
                            self
                        ))
                    })
                }
            }
        )*
    };
}

wide_integer!(u64, usize, isize);

impl IntoCookieValue for f64 {
    fn into_cookie_value(self) -> Result<CookieValue, InvalidArgument> {
        if self.is_finite() {
            Ok(CookieValue::Float(self))
        } else {
            Err(InvalidArgument::new(
                "Cookie value can only be string, boolean or numeric.",
            ))
        }
    }
}

impl IntoCookieValue for f32 {
    fn into_cookie_value(self) -> Result<CookieValue, InvalidArgument> {
        f64::from(self).into_cookie_value()
    }
}

impl IntoCookieValue for serde_json::Value {
    fn into_cookie_value(self) -> Result<CookieValue, InvalidArgument> {
        use serde_json::Value;

        match self {
            Value::String(s) => Ok(CookieValue::String(s)),
            Value::Bool(b) => Ok(CookieValue::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(CookieValue::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    f.into_cookie_value()
                } else {
                    Err(InvalidArgument::new(
                        "Cookie value can only be string, boolean or numeric.",
                    ))
                }
            }
            Value::Null | Value::Array(_) | Value::Object(_) => Err(InvalidArgument::new(
                "Cookie value can only be string, boolean or numeric.",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CookieValue, IntoCookieValue};
    use googletest::prelude::*;
    use serde_json::json;

    #[test]
    fn scalars_are_accepted() {
        assert_that!("a".into_cookie_value().unwrap(), eq(CookieValue::String("a".into())));
        assert_that!(true.into_cookie_value().unwrap(), eq(CookieValue::Bool(true)));
        assert_that!(42u8.into_cookie_value().unwrap(), eq(CookieValue::Integer(42)));
        assert_that!((-7i32).into_cookie_value().unwrap(), eq(CookieValue::Integer(-7)));
        assert_that!(2.75f64.into_cookie_value().unwrap(), eq(CookieValue::Float(2.75)));
        assert_that!(json!(2.5).into_cookie_value().unwrap(), eq(CookieValue::Float(2.5)));
        assert_that!(
            json!(u64::MAX).into_cookie_value().unwrap(),
            eq(CookieValue::Float(u64::MAX as f64))
        );
    }

    #[test]
    fn structured_data_is_rejected() {
        for value in [json!([1, 2]), json!({"a": 1}), json!(null)] {
            let err = value.into_cookie_value().unwrap_err();
            assert_that!(
                err.to_string(),
                eq("Cookie value can only be string, boolean or numeric.")
            );
        }
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        assert!(f64::NAN.into_cookie_value().is_err());
        assert!(f64::INFINITY.into_cookie_value().is_err());
        assert!(CookieValue::Float(f64::NEG_INFINITY).into_cookie_value().is_err());
    }

    #[test]
    fn oversized_integers_are_rejected() {
        let err = u64::MAX.into_cookie_value().unwrap_err();
        assert_that!(err.to_string(), contains_substring("does not fit"));
    }

    #[test]
    fn variants_survive_serialization() {
        let values = vec![
            CookieValue::String("7".into()),
            CookieValue::Bool(false),
            CookieValue::Integer(7),
            CookieValue::Float(7.0),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_that!(json, eq(r#"["7",false,7,7.0]"#));
        let back: Vec<CookieValue> = serde_json::from_str(&json).unwrap();
        assert_that!(back, eq(values));
    }

    #[test]
    fn accessors() {
        let v = CookieValue::Integer(3);
        assert_that!(v.as_i64(), some(eq(3)));
        assert_that!(v.as_f64(), some(eq(3.0)));
        assert_that!(v.as_str(), none());
        assert_that!(v.to_string(), eq("3"));
        assert_that!(CookieValue::Bool(true).as_bool(), some(eq(true)));
    }
}
