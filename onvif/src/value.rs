use std::{collections::BTreeMap, fmt::Display};

/// Loosely typed tree decoded from a SOAP reply.
///
/// An element that occurs once under its parent is stored as [Value::Scalar] or [Value::Mapping],
/// the same element repeated under one parent becomes a [Value::Sequence].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Scalar(String),
    Mapping(BTreeMap<String, Value>),
    Sequence(Vec<Value>),
}

impl Default for Value {
    fn default() -> Self {
        Self::Mapping(BTreeMap::new())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Self::Sequence(value.into_iter().map(Value::Scalar).collect())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Sequence(value)
    }
}

impl<K: Into<String>, const N: usize> From<[(K, Value); N]> for Value {
    fn from(entries: [(K, Value); N]) -> Self {
        Self::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Requested path could not be resolved inside the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathNotFound {
    pub path: String,
    /// Segment that failed to resolve
    pub segment: String,
}

impl Display for PathNotFound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "path {} not found (missing {})", self.path, self.segment)
    }
}

impl std::error::Error for PathNotFound {}

impl Value {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Child of a mapping node. Any other shape has no children.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// Walks dotted `path` through mappings.
    ///
    /// A sequence met before the last segment is entered through its first element.
    /// Empty path resolves to `self`.
    pub fn value_for_path(&self, path: &str) -> Result<&Value, PathNotFound> {
        if path.is_empty() {
            return Ok(self);
        }
        let mut current = self;
        for segment in path.split('.') {
            let not_found = || PathNotFound {
                path: path.to_owned(),
                segment: segment.to_owned(),
            };
            let mapping = match current {
                Value::Mapping(m) => m,
                Value::Sequence(items) => items
                    .first()
                    .and_then(Value::as_mapping)
                    .ok_or_else(not_found)?,
                Value::Scalar(_) => return Err(not_found()),
            };
            current = mapping.get(segment).ok_or_else(not_found)?;
        }
        Ok(current)
    }

    /// Same walk as [Value::value_for_path] but always yields a list.
    ///
    /// Single occurrence of a repeated element is returned as one item list.
    pub fn values_for_path(&self, path: &str) -> Result<Vec<&Value>, PathNotFound> {
        let value = self.value_for_path(path)?;
        Ok(value.as_items())
    }

    /// String at `path` or empty string if it is absent or not a scalar
    pub fn value_for_path_string(&self, path: &str) -> String {
        self.value_for_path(path)
            .map(|v| as_string(Some(v)))
            .unwrap_or_default()
    }

    /// Record assembled from the child at `key` or default record if there is no such child
    pub fn child<T: FromValue>(&self, key: &str) -> T {
        self.get(key).map(T::from_value).unwrap_or_default()
    }

    /// View of the node as a repeated element
    pub fn as_items(&self) -> Vec<&Value> {
        match self {
            Value::Sequence(items) => items.iter().collect(),
            other => vec![other],
        }
    }
}

/// Typed record assembled from a decoded subtree.
///
/// Assembly never fails, fields missing from the subtree keep their default value.
pub trait FromValue: Default {
    fn from_value(value: &Value) -> Self;
}

pub fn as_string(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_scalar)
        .map(ToOwned::to_owned)
        .unwrap_or_default()
}

pub fn as_bool(value: Option<&Value>) -> bool {
    as_string(value).to_lowercase() == "true"
}

pub fn as_int(value: Option<&Value>) -> i64 {
    as_string(value).parse().unwrap_or(0)
}
