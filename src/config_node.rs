//! Read-only view over parsed YAML configuration documents
//!
//! Syntax and color scheme documents are parsed once with `serde_yaml`
//! and then walked through [`ConfigNode`], which borrows the parsed
//! tree and remembers the path it was reached by so that every error
//! can point back at the offending node.

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde_yaml::Value;

use crate::error::{ConfigError, Error, Location};

/// A parsed configuration document
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    origin: String,
    root: Value,
}

impl ConfigDocument {
    /// Parse a YAML document; `origin` is used in error locations
    pub fn parse(origin: impl Into<String>, text: &str) -> Result<Self, Error> {
        let origin = origin.into();
        let root = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_yaml::from_str(text).map_err(|source| Error::Yaml {
                origin: origin.clone(),
                source,
            })?
        };
        Ok(Self { origin, root })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Root node of the document
    pub fn root(&self) -> ConfigNode<'_> {
        ConfigNode {
            origin: &self.origin,
            path: String::new(),
            value: Some(Cow::Borrowed(&self.root)),
        }
    }
}

/// A node inside a [`ConfigDocument`]
///
/// A node may be undefined (a missing member); accessors on an undefined
/// node report an error at its path rather than panicking.
#[derive(Debug, Clone)]
pub struct ConfigNode<'a> {
    origin: &'a str,
    path: String,
    value: Option<Cow<'a, Value>>,
}

impl<'a> ConfigNode<'a> {
    /// Location of this node for error messages
    pub fn location(&self) -> Location {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        Location::new(self.origin, path)
    }

    /// Build an error attributed to this node
    pub fn error(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::new(self.location(), message)
    }

    pub fn is_defined(&self) -> bool {
        self.value.is_some()
    }

    /// Defined but empty (`~` or an empty document)
    pub fn is_null(&self) -> bool {
        matches!(self.value.as_deref(), Some(Value::Null))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self.value.as_deref(),
            Some(Value::String(_) | Value::Number(_) | Value::Bool(_))
        )
    }

    pub fn is_array(&self) -> bool {
        matches!(self.value.as_deref(), Some(Value::Sequence(_)))
    }

    pub fn is_object(&self) -> bool {
        matches!(self.value.as_deref(), Some(Value::Mapping(_)))
    }

    fn child<F>(&self, path: String, pick: F) -> ConfigNode<'a>
    where
        F: Fn(&Value) -> Option<&Value>,
    {
        let value = match &self.value {
            Some(Cow::Borrowed(v)) => pick(*v).map(Cow::Borrowed),
            Some(Cow::Owned(v)) => pick(v).cloned().map(Cow::Owned),
            None => None,
        };
        ConfigNode {
            origin: self.origin,
            path,
            value,
        }
    }

    fn assert_is_object(&self) -> Result<(), ConfigError> {
        if self.is_object() {
            Ok(())
        } else {
            Err(self.error("is not an object"))
        }
    }

    fn assert_is_array(&self) -> Result<(), ConfigError> {
        if self.is_array() {
            Ok(())
        } else {
            Err(self.error("is not an array"))
        }
    }

    fn member_path(&self, name: &str) -> String {
        format!("{}/{}", self.path, name)
    }

    pub fn has_member(&self, name: &str) -> bool {
        match self.value.as_deref() {
            Some(Value::Mapping(map)) => map.get(name).is_some(),
            _ => false,
        }
    }

    /// Member `name`; undefined if absent
    pub fn member(&self, name: &str) -> ConfigNode<'a> {
        self.child(self.member_path(name), |v| match v {
            Value::Mapping(map) => map.get(name),
            _ => None,
        })
    }

    /// Member `name`, or `default_yaml` parsed as YAML when absent
    pub fn member_or(&self, name: &str, default_yaml: &str) -> Result<ConfigNode<'a>, ConfigError> {
        if self.has_member(name) {
            return Ok(self.member(name));
        }
        let value: Value = serde_yaml::from_str(default_yaml).map_err(|e| {
            self.error(format!("invalid default for '{}': {}", name, e))
        })?;
        Ok(ConfigNode {
            origin: self.origin,
            path: self.member_path(name),
            value: Some(Cow::Owned(value)),
        })
    }

    pub fn required_member(&self, name: &str) -> Result<ConfigNode<'a>, ConfigError> {
        self.assert_is_object()?;
        if !self.has_member(name) {
            return Err(self.error(format!("does not have member '{}'", name)));
        }
        Ok(self.member(name))
    }

    pub fn num_elements(&self) -> Result<usize, ConfigError> {
        self.assert_is_array()?;
        match self.value.as_deref() {
            Some(Value::Sequence(seq)) => Ok(seq.len()),
            _ => Ok(0),
        }
    }

    pub fn element(&self, index: usize) -> Result<ConfigNode<'a>, ConfigError> {
        let len = self.num_elements()?;
        if index >= len {
            return Err(self.error(format!(
                "has {} elements, element {} requested",
                len, index
            )));
        }
        Ok(self.child(format!("{}[{}]", self.path, index), |v| match v {
            Value::Sequence(seq) => seq.get(index),
            _ => None,
        }))
    }

    pub fn elements(&self) -> Result<Vec<ConfigNode<'a>>, ConfigError> {
        (0..self.num_elements()?).map(|i| self.element(i)).collect()
    }

    /// Key/value pairs of an object, in document order
    pub fn members(&self) -> Result<Vec<(String, ConfigNode<'a>)>, ConfigError> {
        self.assert_is_object()?;
        let keys: Vec<Value> = match self.value.as_deref() {
            Some(Value::Mapping(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        };
        let mut result = Vec::with_capacity(keys.len());
        for key in keys {
            let name = scalar_to_string(&key)
                .ok_or_else(|| self.error("has a non-scalar key"))?;
            let node = self.child(self.member_path(&name), |v| match v {
                Value::Mapping(map) => map.get(&key),
                _ => None,
            });
            result.push((name, node));
        }
        Ok(result)
    }

    pub fn as_string(&self) -> Result<String, ConfigError> {
        match self.value.as_deref() {
            None => Err(self.error("is not defined")),
            Some(value) => scalar_to_string(value).ok_or_else(|| self.error("is not scalar")),
        }
    }

    pub fn as_string_list(&self) -> Result<Vec<String>, ConfigError> {
        self.elements()?.iter().map(|e| e.as_string()).collect()
    }

    /// Whether the node deserializes as `T`
    pub fn is_type<T: DeserializeOwned>(&self) -> bool {
        match self.value.as_deref() {
            Some(value) => serde_yaml::from_value::<T>(value.clone()).is_ok(),
            None => false,
        }
    }

    /// Deserialize the node as `T`
    pub fn as_type<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        let value = self
            .value
            .as_deref()
            .ok_or_else(|| self.error("is not defined"))?;
        serde_yaml::from_value::<T>(value.clone()).map_err(|e| {
            self.error(format!("is not a {}: {}", std::any::type_name::<T>(), e))
        })
    }

    /// Reject any object key not listed in `allowed`
    pub fn assert_properties(&self, allowed: &[&str]) -> Result<(), ConfigError> {
        for (name, _) in self.members()? {
            if !allowed.contains(&name.as_str()) {
                return Err(self.error(format!(
                    "has unexpected property '{}' (allowed: {})",
                    name,
                    allowed.join(", ")
                )));
            }
        }
        Ok(())
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
