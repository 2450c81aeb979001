use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ops::Index;

/// An Avro datum, decoupled from any particular schema.
///
/// A single `Value` can conform to many schemas: `Int` covers both `"int"`
/// and `"long"`, `Bin` covers both `"bytes"` and any `fixed` type, and `Str`
/// doubles as an enum symbol when written under an enum schema. Conformance
/// is only checked when the value is encoded with [`DatumWriter`].
///
/// [`DatumWriter`]: crate::DatumWriter
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    F32(f32),
    F64(f64),
    Bin(Vec<u8>),
    Str(String),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// A named record. `fields` hold name/value pairs; lookup during
    /// encoding is by name, so their order need not match the schema.
    Record {
        name: String,
        fields: Vec<(String, Value)>,
    },
    /// An enum symbol. A plain `Str` is accepted everywhere an `Enum` is;
    /// this variant exists so decoded data keeps the distinction.
    Enum(String),
    /// An explicit union branch selection: the zero-based branch index and
    /// the value for that branch. Writers may skip this and pass the bare
    /// value instead, letting branch matching pick the first fit.
    Union(usize, Box<Value>),
}

impl Value {
    /// Builds a record value. The field list is taken in the order given.
    pub fn record<N, F, V>(name: N, fields: F) -> Self
    where
        N: Into<String>,
        F: IntoIterator<Item = (V, Value)>,
        V: Into<String>,
    {
        Value::Record {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|(f, v)| (f.into(), v))
                .collect(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    pub fn is_f32(&self) -> bool {
        matches!(self, Value::F32(_))
    }

    pub fn is_f64(&self) -> bool {
        matches!(self, Value::F64(_))
    }

    pub fn is_bin(&self) -> bool {
        matches!(self, Value::Bin(_))
    }

    pub fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Value::Record { .. })
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, Value::Enum(_))
    }

    pub fn is_union(&self) -> bool {
        matches!(self, Value::Union(..))
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(val) = *self {
            Some(val)
        } else {
            None
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        if let Value::Int(val) = *self {
            Some(val)
        } else {
            None
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Value::F32(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F64(n) => Some(n),
            _ => None,
        }
    }

    /// Either float width, widened to `f64`.
    pub fn as_floating(&self) -> Option<f64> {
        match *self {
            Value::F32(n) => Some(n.into()),
            Value::F64(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Value::Str(ref val) | Value::Enum(ref val) => Some(val.as_str()),
            _ => None,
        }
    }

    pub fn as_slice(&self) -> Option<&[u8]> {
        if let Value::Bin(ref val) = *self {
            Some(val)
        } else {
            None
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        if let Value::Array(ref array) = *self {
            Some(&*array)
        } else {
            None
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        if let Value::Map(ref map) = *self {
            Some(map)
        } else {
            None
        }
    }

    /// Looks up a record field by name. Returns `None` for non-records too.
    pub fn field(&self, name: &str) -> Option<&Value> {
        if let Value::Record { ref fields, .. } = *self {
            fields.iter().find(|(f, _)| f == name).map(|(_, v)| v)
        } else {
            None
        }
    }

    /// Strips any number of explicit union branch wrappers.
    pub fn unwrap_union(&self) -> &Value {
        let mut val = self;
        while let Value::Union(_, ref inner) = *val {
            val = inner;
        }
        val
    }
}

impl std::default::Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

static NULL: Value = Value::Null;

impl Index<usize> for Value {
    type Output = Value;

    fn index(&self, index: usize) -> &Self::Output {
        self.as_array().and_then(|v| v.get(index)).unwrap_or(&NULL)
    }
}

impl Index<&str> for Value {
    type Output = Value;

    fn index(&self, index: &str) -> &Self::Output {
        self.as_map()
            .and_then(|v| v.get(index))
            .or_else(|| self.field(index))
            .unwrap_or(&NULL)
    }
}

macro_rules! impl_value_from {
    ($t: ty, $p: ident) => {
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::$p(v)
            }
        }
    };
}

macro_rules! impl_value_from_integer {
    ($t: ty) => {
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v.into())
            }
        }
    };
}

impl_value_from!(bool, Bool);
impl_value_from!(f32, F32);
impl_value_from!(f64, F64);
impl_value_from!(String, Str);
impl_value_from!(Vec<u8>, Bin);
impl_value_from!(Vec<Value>, Array);
impl_value_from!(BTreeMap<String, Value>, Map);
impl_value_from_integer!(u8);
impl_value_from_integer!(u16);
impl_value_from_integer!(u32);
impl_value_from_integer!(i8);
impl_value_from_integer!(i16);
impl_value_from_integer!(i32);
impl_value_from_integer!(i64);

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Null
    }
}

impl<'a> From<&'a str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl<'a> From<Cow<'a, str>> for Value {
    fn from(v: Cow<'a, str>) -> Self {
        Value::Str(v.to_string())
    }
}

impl<'a> From<&'a [u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bin(v.into())
    }
}

impl From<&serde_json::Value> for Value {
    /// Structural conversion from JSON. Numbers become `Int` when they fit
    /// an `i64` and `F64` otherwise; objects become maps, which conform to
    /// record schemas through field lookup.
    fn from(json: &serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Null,
            Json::Bool(v) => Value::Bool(*v),
            Json::Number(n) => match n.as_i64() {
                Some(v) => Value::Int(v),
                None => Value::F64(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::Str(s.clone()),
            Json::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            Json::Object(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl<V: Into<Value>> std::iter::FromIterator<V> for Value {
    fn from_iter<T: IntoIterator<Item = V>>(iter: T) -> Self {
        let v: Vec<Value> = iter.into_iter().map(Into::into).collect();
        Value::Array(v)
    }
}
