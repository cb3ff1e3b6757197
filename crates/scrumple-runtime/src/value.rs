// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Runtime values exchanged between bundled modules.

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Signature of a host-implemented function value
pub type NativeFn = dyn Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync;

/// A value held in a module's exports
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// undefined
    #[default]
    Undefined,
    /// null
    Null,
    /// Boolean value
    Boolean(bool),
    /// Number (IEEE 754 double)
    Number(f64),
    /// String
    String(String),
    /// Shared object reference
    Object(Object),
    /// Function reference
    Function(NativeFunction),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            // NaN != NaN falls out of f64 comparison
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Value {
    /// Returns true if this value is undefined.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Returns true if this value is nullish (null or undefined).
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Returns the object handle if this value is an object.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Returns the function if this value is callable.
    pub fn as_function(&self) -> Option<&NativeFunction> {
        match self {
            Value::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Returns the string slice if this value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number if this value is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Property read; anything but an object yields undefined.
    pub fn get(&self, key: &str) -> Value {
        match self {
            Value::Object(obj) => obj.get(key),
            _ => Value::Undefined,
        }
    }

    /// Converts the value to a boolean (ToBoolean).
    pub fn to_boolean(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => !n.is_nan() && *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Object(_) | Value::Function(_) => true,
        }
    }

    /// Returns the type of this value as a string.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Object(_) => write!(f, "[object Object]"),
            Value::Function(func) => write!(f, "[Function: {}]", func.name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(obj)
    }
}

impl From<NativeFunction> for Value {
    fn from(func: NativeFunction) -> Self {
        Value::Function(func)
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                let obj = Object::new();
                for (i, item) in items.iter().enumerate() {
                    obj.set(i.to_string(), Value::from(item));
                }
                obj.set("length", Value::Number(items.len() as f64));
                Value::Object(obj)
            }
            serde_json::Value::Object(map) => {
                let obj = Object::new();
                for (k, v) in map {
                    obj.set(k.clone(), Value::from(v));
                }
                Value::Object(obj)
            }
        }
    }
}

/// A shared, mutable property bag.
///
/// Cloning an `Object` clones the handle, so every clone observes the same
/// properties. This is what keeps a module's exports stable while its
/// factory is still filling them in.
#[derive(Clone, Default)]
pub struct Object {
    props: Arc<RwLock<IndexMap<String, Value>>>,
}

impl Object {
    /// Create a new empty object
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a property, `Undefined` when absent
    pub fn get(&self, key: &str) -> Value {
        self.props.read().get(key).cloned().unwrap_or_default()
    }

    /// Write a property, keeping the original insertion position on overwrite
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.props.write().insert(key.into(), value.into());
    }

    /// Check whether a property exists
    pub fn has(&self, key: &str) -> bool {
        self.props.read().contains_key(key)
    }

    /// Remove a property
    pub fn delete(&self, key: &str) -> Option<Value> {
        self.props.write().shift_remove(key)
    }

    /// Property names in insertion order
    pub fn keys(&self) -> Vec<String> {
        self.props.read().keys().cloned().collect()
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.props.read().len()
    }

    /// Whether the object has no properties
    pub fn is_empty(&self) -> bool {
        self.props.read().is_empty()
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.props, &other.props)
    }
}

// Objects may reference themselves through a cycle, so only keys are printed.
impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object").field("keys", &self.keys()).finish()
    }
}

/// A named function implemented by the host or by a module body
#[derive(Clone)]
pub struct NativeFunction {
    name: Arc<str>,
    func: Arc<NativeFn>,
}

impl NativeFunction {
    /// Wrap a closure as a function value
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            func: Arc::new(func),
        }
    }

    /// The function's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the function
    pub fn call(&self, args: &[Value]) -> anyhow::Result<Value> {
        (self.func)(args)
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &NativeFunction) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Function: {}]", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_handles_share_state() {
        let a = Object::new();
        let b = a.clone();
        b.set("x", 1);

        assert_eq!(a.get("x"), Value::Number(1.0));
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&Object::new()));
    }

    #[test]
    fn test_missing_property_is_undefined() {
        let obj = Object::new();
        assert!(obj.get("nope").is_undefined());
        assert!(Value::Number(3.0).get("x").is_undefined());
    }

    #[test]
    fn test_object_equality_is_identity() {
        let a = Object::new();
        let b = Object::new();
        assert_ne!(Value::from(a.clone()), Value::from(b));
        assert_eq!(Value::from(a.clone()), Value::from(a));
    }

    #[test]
    fn test_insertion_order() {
        let obj = Object::new();
        obj.set("b", 1);
        obj.set("a", 2);
        obj.set("b", 3);
        assert_eq!(obj.keys(), vec!["b".to_string(), "a".to_string()]);
        assert_eq!(obj.delete("b"), Some(Value::Number(3.0)));
        assert_eq!(obj.keys(), vec!["a".to_string()]);
    }

    #[test]
    fn test_native_function_call() {
        let add = NativeFunction::new("add", |args| {
            let sum = args.iter().filter_map(Value::as_number).sum::<f64>();
            Ok(Value::Number(sum))
        });
        assert_eq!(add.call(&[1.into(), 2.into()]).unwrap(), Value::Number(3.0));
        assert_eq!(Value::from(add).to_string(), "[Function: add]");
    }

    #[test]
    fn test_json_conversion() {
        let json = serde_json::json!({ "name": "pkg", "tags": ["a", "b"] });
        let value = Value::from(&json);

        assert_eq!(value.get("name").as_str(), Some("pkg"));
        assert_eq!(value.get("tags").get("length"), Value::Number(2.0));
        assert_eq!(value.get("tags").get("1").as_str(), Some("b"));
    }

    #[test]
    fn test_to_boolean() {
        assert!(!Value::Undefined.to_boolean());
        assert!(!Value::Number(0.0).to_boolean());
        assert!(!Value::from("").to_boolean());
        assert!(Value::from(Object::new()).to_boolean());
    }
}
