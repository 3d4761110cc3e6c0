use crate::{log::Error, value::Value};
use serde::Serialize;
use serde_json::to_value;
use std::collections::HashMap;

/// Provides storage for data that expressions can be rendered against.
///
/// Data lives in a stack of scopes. Lookup searches the innermost scope
/// first and walks outward, so a name in an inner scope shadows the same
/// name further out. The surrounding engine pushes and pops scopes as it
/// enters and leaves nested render states; a [`Store`] always keeps its
/// root scope.
///
/// # Examples
///
/// ```
/// use sluice::Store;
///
/// let mut store = Store::new().with_must("name", "taylor");
/// store.push_scope();
/// store.insert_must("name", "quinn");
///
/// assert!(store.get("name").is_some_and(|v| v.as_str() == Some("quinn")));
/// assert!(store.pop_scope().is_some());
/// assert!(store.get("name").is_some_and(|v| v.as_str() == Some("taylor")));
/// ```
pub struct Store {
    scopes: Vec<HashMap<String, Value>>,
}

impl Store {
    /// Create a new Store.
    #[inline]
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    /// Serialize the value and insert it into the innermost scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails.
    pub fn insert<S, T>(&mut self, key: S, value: T) -> Result<(), Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        let serialized = to_value(value).map_err(|_| {
            Error::build("unserializable value")
                .with_help("value does not serialize to a recognized type")
        })?;

        self.insert_value(key, Value::from(serialized));
        Ok(())
    }

    /// Serialize the value and insert it into the innermost scope.
    ///
    /// # Panics
    ///
    /// Will panic if the serialization fails.
    #[inline]
    pub fn insert_must<S, T>(&mut self, key: S, value: T)
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert(key, value).unwrap();
    }

    /// Serialize the value and insert it into the innermost scope.
    ///
    /// Returns the Store, so additional methods may be chained.
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails.
    pub fn with<S, T>(mut self, key: S, value: T) -> Result<Self, Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert(key, value)?;
        Ok(self)
    }

    /// Serialize the value and insert it into the innermost scope.
    ///
    /// Returns the Store, so additional methods may be chained.
    ///
    /// # Panics
    ///
    /// Will panic if the serialization fails.
    #[inline]
    pub fn with_must<S, T>(mut self, key: S, value: T) -> Self
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert_must(key, value);
        self
    }

    /// Insert an already constructed [`Value`] into the innermost scope.
    ///
    /// This is the entry point for values that do not travel through
    /// serialization, such as domain objects created with
    /// [`Value::from_object`].
    #[inline]
    pub fn insert_value<S>(&mut self, key: S, value: Value)
    where
        S: Into<String>,
    {
        self.scopes
            .last_mut()
            .expect("store should always have a root scope")
            .insert(key.into(), value);
    }

    /// Insert an already constructed [`Value`] into the innermost scope.
    ///
    /// Returns the Store, so additional methods may be chained.
    #[inline]
    pub fn with_value<S>(mut self, key: S, value: Value) -> Self
    where
        S: Into<String>,
    {
        self.insert_value(key, value);
        self
    }

    /// Push a new innermost scope.
    #[inline]
    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pop the innermost scope and return its data.
    ///
    /// Returns None without removing anything when only the root scope
    /// remains.
    pub fn pop_scope(&mut self) -> Option<HashMap<String, Value>> {
        if self.scopes.len() > 1 {
            self.scopes.pop()
        } else {
            None
        }
    }

    /// Get the value of the given key, if any.
    ///
    /// Scopes are searched from innermost to outermost, and the first
    /// match wins.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(key))
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
