use crate::log::Fault;
use serde_json::Number;
use std::{collections::BTreeMap, fmt::Debug, sync::Arc};

/// Describes a type which can expose named attributes to the resolver.
///
/// Plain data inserted into a [`Store`][`crate::Store`] becomes maps, lists
/// and scalars, which the resolver walks on its own. An `Object` is for
/// domain types whose attributes are computed on demand, and whose
/// computation may fail with a [`Fault`].
///
/// Presence and evaluation are separate operations on purpose. The
/// resolver asks [`has_attribute`][`Object::has_attribute`] first, and only
/// then evaluates with [`attribute`][`Object::attribute`]. A fault raised
/// by the evaluation of an attribute that exists is therefore never
/// confused with the attribute being absent, even when the fault describes
/// a missing attribute somewhere inside the computation.
///
/// # Examples
///
/// ```
/// use sluice::{Fault, Object, Value};
///
/// #[derive(Debug)]
/// struct Account {
///     holder: String,
/// }
///
/// impl Object for Account {
///     fn has_attribute(&self, name: &str) -> bool {
///         name == "holder"
///     }
///
///     fn attribute(&self, name: &str) -> Result<Value, Box<dyn Fault>> {
///         match name {
///             "holder" => Ok(Value::from(self.holder.as_str())),
///             _ => unreachable!("attribute is only called after has_attribute"),
///         }
///     }
/// }
/// ```
pub trait Object: Debug + Send + Sync {
    /// Return true when the named attribute exists on this object.
    ///
    /// This check must be side effect free and must not evaluate the
    /// attribute.
    fn has_attribute(&self, name: &str) -> bool;

    /// Evaluate the named attribute.
    ///
    /// Only called when [`has_attribute`][`Object::has_attribute`] returned
    /// true for the same name.
    ///
    /// # Errors
    ///
    /// Returns a [`Fault`] when the evaluation fails. A silent fault makes
    /// the resolution fail quietly, any other fault aborts the render.
    fn attribute(&self, name: &str) -> Result<Value, Box<dyn Fault>>;
}

/// Data that expressions operate on.
///
/// The [`Invalid`][`Value::Invalid`] variant is the sentinel produced when
/// resolution fails quietly. It flows through filter pipelines like any
/// other value, but is never rendered as itself; the engine substitutes
/// its configured invalid text.
#[derive(Debug, Clone)]
pub enum Value {
    /// The sentinel for a resolution that failed quietly.
    Invalid,
    /// An empty value.
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer or float.
    Number(Number),
    /// A string.
    String(String),
    /// An ordered sequence of values, supporting position-based lookup.
    List(Vec<Value>),
    /// A collection of keyed values, supporting key-based lookup.
    Map(BTreeMap<String, Value>),
    /// A domain object, supporting named attribute lookup.
    Object(Arc<dyn Object>),
}

impl Value {
    /// Wrap the given [`Object`] in a [`Value`].
    pub fn from_object<T>(object: T) -> Self
    where
        T: Object + 'static,
    {
        Value::Object(Arc::new(object))
    }

    /// Return true if this is the invalid sentinel.
    #[inline]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Value::Invalid)
    }

    /// Return true if this is an empty value.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Return the string within, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(string) => Some(string),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Invalid, Value::Invalid) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(left), Value::Bool(right)) => left == right,
            (Value::Number(left), Value::Number(right)) => left == right,
            (Value::String(left), Value::String(right)) => left == right,
            (Value::List(left), Value::List(right)) => left == right,
            (Value::Map(left), Value::Map(right)) => left == right,
            (Value::Object(left), Value::Object(right)) => Arc::ptr_eq(left, right),
            _ => false,
        }
    }
}

impl From<serde_json::Value> for Value {
    /// Convert a serialized value into a [`Value`].
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(bool) => Value::Bool(bool),
            serde_json::Value::Number(number) => Value::Number(number),
            serde_json::Value::String(string) => Value::String(string),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Number(Number::from(value))
    }
}

impl From<f64> for Value {
    /// Convert a float into a [`Value`].
    ///
    /// A float that cannot be represented, such as NaN, becomes
    /// [`Value::Null`].
    fn from(value: f64) -> Self {
        Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
    }
}
