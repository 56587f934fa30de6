//! Query-string construction.
//!
//! # Design
//! Parameters keep insertion order and may repeat a key. An entry whose value
//! is `None` is skipped when the string is built, so call sites can pass
//! optional filters straight through. Values are encoded as
//! `application/x-www-form-urlencoded` (space becomes `+`).

use std::fmt;

use url::form_urlencoded;

/// A scalar query-parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Str(s) => f.write_str(s),
            QueryValue::Int(n) => write!(f, "{n}"),
            QueryValue::Float(x) if x.is_infinite() => {
                f.write_str(if *x > 0.0 { "Infinity" } else { "-Infinity" })
            }
            QueryValue::Float(x) => write!(f, "{x}"),
            QueryValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::Str(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::Str(v)
    }
}

impl From<&String> for QueryValue {
    fn from(v: &String) -> Self {
        QueryValue::Str(v.clone())
    }
}

macro_rules! int_query_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for QueryValue {
                fn from(v: $t) -> Self {
                    QueryValue::Int(v as i64)
                }
            }
        )*
    };
}

int_query_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for QueryValue {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(n) => QueryValue::Int(n),
            Err(_) => QueryValue::Str(v.to_string()),
        }
    }
}

impl From<usize> for QueryValue {
    fn from(v: usize) -> Self {
        QueryValue::from(v as u64)
    }
}

impl From<f32> for QueryValue {
    fn from(v: f32) -> Self {
        QueryValue::Float(f64::from(v))
    }
}

impl From<f64> for QueryValue {
    fn from(v: f64) -> Self {
        QueryValue::Float(v)
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        QueryValue::Bool(v)
    }
}

/// Ordered query parameters; `None` values are omitted on encode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    entries: Vec<(String, Option<QueryValue>)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a present value.
    pub fn with(mut self, key: &str, value: impl Into<QueryValue>) -> Self {
        self.push(key, Some(value.into()));
        self
    }

    /// Add a value that may be absent.
    pub fn with_opt<V: Into<QueryValue>>(mut self, key: &str, value: Option<V>) -> Self {
        self.push(key, value.map(Into::into));
        self
    }

    pub fn push(&mut self, key: &str, value: Option<QueryValue>) {
        self.entries.push((key.to_string(), value));
    }

    /// True when no entry carries a value, i.e. encoding yields "".
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, v)| v.is_none())
    }

    /// Encode the present entries, without a leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.entries {
            if let Some(value) = value {
                serializer.append_pair(key, &value.to_string());
            }
        }
        serializer.finish()
    }

    /// Append the encoded parameters to `path`. The path is returned as-is
    /// when nothing is left to encode.
    pub fn append_to(&self, path: &str) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            return path.to_string();
        }
        let sep = if path.contains('?') { '&' } else { '?' };
        format!("{path}{sep}{query}")
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for QueryParams
where
    K: AsRef<str>,
    V: Into<QueryValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (key, value) in iter {
            params.push(key.as_ref(), value.map(Into::into));
        }
        params
    }
}
