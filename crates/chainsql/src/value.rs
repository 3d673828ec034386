//! Argument values carried alongside rendered SQL.
//!
//! Rendering produces a `Vec<Value>` rather than boxed `ToSql` objects so the
//! argument list can be compared, cloned, printed by [`crate::debug`] and
//! inspected by predicate maps (NULL and array operands change the emitted SQL).

use std::error::Error;
use std::fmt;

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio_postgres::types::{IsNull, ToSql, Type};
use uuid::Uuid;

use crate::fragment::{Fragment, Node};

/// A single positional argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    Uuid(Uuid),
    Json(serde_json::Value),
    Array(Vec<Value>),
}

impl Value {
    /// Wrap raw bytes. `Vec<u8>` converts to an array of integers via `From`,
    /// so binary data goes through this constructor.
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(data.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

fn quote(out: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(out, "'{}'", s.replace('\'', "''"))
}

/// SQL-literal form used by debug interpolation: text-like values are quoted,
/// numbers and booleans are not.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => quote(f, s),
            Value::Bytes(data) => {
                f.write_str("'\\x")?;
                for byte in data {
                    write!(f, "{byte:02x}")?;
                }
                f.write_str("'")
            }
            Value::Timestamp(ts) => quote(f, &ts.to_rfc3339()),
            Value::Date(d) => quote(f, &d.to_string()),
            Value::Uuid(u) => quote(f, &u.to_string()),
            Value::Json(v) => quote(f, &v.to_string()),
            Value::Array(items) => {
                f.write_str("ARRAY[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Each variant is encoded through its inner type's checked encoder, so a
/// parameter type the variant cannot represent is a `WrongType` error.
impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => b.to_sql_checked(ty, out),
            Value::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql_checked(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql_checked(ty, out),
                Type::OID => u32::try_from(*i)?.to_sql_checked(ty, out),
                Type::FLOAT4 => (*i as f32).to_sql_checked(ty, out),
                Type::FLOAT8 => (*i as f64).to_sql_checked(ty, out),
                _ => i.to_sql_checked(ty, out),
            },
            Value::Float(x) => match *ty {
                Type::FLOAT4 => (*x as f32).to_sql_checked(ty, out),
                _ => x.to_sql_checked(ty, out),
            },
            Value::Text(s) => s.as_str().to_sql_checked(ty, out),
            Value::Bytes(data) => data.as_slice().to_sql_checked(ty, out),
            Value::Timestamp(ts) => match *ty {
                Type::TIMESTAMP => ts.naive_utc().to_sql_checked(ty, out),
                _ => ts.to_sql_checked(ty, out),
            },
            Value::Date(d) => d.to_sql_checked(ty, out),
            Value::Uuid(u) => u.to_sql_checked(ty, out),
            Value::Json(v) => v.to_sql_checked(ty, out),
            Value::Array(items) => items.to_sql_checked(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

macro_rules! value_from {
    ($($t:ty => |$v:ident| $conv:expr),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from($v: $t) -> Self {
                    $conv
                }
            }
        )*
    };
}

value_from! {
    bool => |v| Value::Bool(v),
    i8 => |v| Value::Int(v.into()),
    i16 => |v| Value::Int(v.into()),
    i32 => |v| Value::Int(v.into()),
    i64 => |v| Value::Int(v),
    u8 => |v| Value::Int(v.into()),
    u16 => |v| Value::Int(v.into()),
    u32 => |v| Value::Int(v.into()),
    f32 => |v| Value::Float(v.into()),
    f64 => |v| Value::Float(v),
    &str => |v| Value::Text(v.to_string()),
    String => |v| Value::Text(v),
    &String => |v| Value::Text(v.clone()),
    &[u8] => |v| Value::Bytes(v.to_vec()),
    DateTime<Utc> => |v| Value::Timestamp(v),
    NaiveDateTime => |v| Value::Timestamp(v.and_utc()),
    NaiveDate => |v| Value::Date(v),
    Uuid => |v| Value::Uuid(v),
    serde_json::Value => |v| Value::Json(v),
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

/// A template argument: either a bound value or a nested fragment that is
/// rendered in place of its marker.
#[derive(Debug, Clone)]
pub enum Arg {
    Value(Value),
    Node(Node),
}

impl Arg {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Arg::Node(node) => Some(node),
            Arg::Value(_) => None,
        }
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Arg::Value(v)
    }
}

impl From<Node> for Arg {
    fn from(node: Node) -> Self {
        Arg::Node(node)
    }
}

impl<F: Fragment + 'static> From<F> for Arg {
    fn from(fragment: F) -> Self {
        Arg::Node(Node::new(fragment))
    }
}

macro_rules! arg_from_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Arg {
                fn from(v: $t) -> Self {
                    Arg::Value(v.into())
                }
            }
        )*
    };
}

arg_from_value!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    &str,
    String,
    &String,
    &[u8],
    DateTime<Utc>,
    NaiveDateTime,
    NaiveDate,
    Uuid,
    serde_json::Value,
);

impl<T: Into<Value>> From<Option<T>> for Arg {
    fn from(v: Option<T>) -> Self {
        Arg::Value(v.into())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Arg {
    fn from(v: Vec<T>) -> Self {
        Arg::Value(v.into())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Arg {
    fn from(v: [T; N]) -> Self {
        Arg::Value(v.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(3u8), Value::Int(3));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
        assert_eq!(
            Value::from(vec![1, 2]),
            Value::Array(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(Value::bytes(vec![1u8]), Value::Bytes(vec![1]));
    }

    #[test]
    fn test_display_quotes_text_only() {
        assert_eq!(Value::Int(7).to_string(), "7");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::from("it's").to_string(), "'it''s'");
        assert_eq!(Value::bytes(&[0xde, 0xad][..]).to_string(), "'\\xdead'");
        assert_eq!(
            Value::from(vec!["a", "b"]).to_string(),
            "ARRAY['a', 'b']"
        );
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(Value::from(d).to_string(), "'2024-01-02'");
    }

    #[test]
    fn test_arg_from_value_and_node() {
        assert!(matches!(Arg::from(1), Arg::Value(Value::Int(1))));
        assert!(Arg::from(Node::from("x")).as_node().is_some());
    }

    #[test]
    fn test_to_sql_rejects_mismatched_type() {
        let mut buf = BytesMut::new();
        assert!(Value::from("1234").to_sql_checked(&Type::INT4, &mut buf).is_err());
        assert!(buf.is_empty());

        let mut buf = BytesMut::new();
        assert!(Value::from(vec![1, 2]).to_sql_checked(&Type::INT4, &mut buf).is_err());

        let mut buf = BytesMut::new();
        assert!(Value::Bool(true).to_sql_checked(&Type::TEXT, &mut buf).is_err());
    }

    #[test]
    fn test_to_sql_array_of_matching_members() {
        let mut buf = BytesMut::new();
        let is_null = Value::from(vec![1, 2])
            .to_sql_checked(&Type::INT8_ARRAY, &mut buf)
            .unwrap();
        assert!(matches!(is_null, IsNull::No));

        let mut buf = BytesMut::new();
        assert!(
            Value::from(vec!["a"])
                .to_sql_checked(&Type::INT8_ARRAY, &mut buf)
                .is_err()
        );
    }

    #[test]
    fn test_to_sql_narrows_integers() {
        let mut buf = BytesMut::new();
        Value::Int(5).to_sql(&Type::INT4, &mut buf).unwrap();
        assert_eq!(&buf[..], &5i32.to_be_bytes());

        let mut buf = BytesMut::new();
        assert!(Value::Int(i64::MAX).to_sql(&Type::INT2, &mut buf).is_err());

        let mut buf = BytesMut::new();
        assert!(matches!(
            Value::Null.to_sql(&Type::TEXT, &mut buf).unwrap(),
            IsNull::Yes
        ));
    }
}
