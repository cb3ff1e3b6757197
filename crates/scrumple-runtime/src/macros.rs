// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Literal macros for runtime values.

/// Create an [`Object`](crate::Object) from key-value pairs.
///
/// Values go through `Value::from`, so plain Rust literals work.
///
/// # Example
///
/// ```
/// use scrumple_runtime::{object, Value};
///
/// let obj = object! {
///     "name" => "left-pad",
///     "version" => 1,
/// };
/// assert_eq!(obj.get("name"), Value::from("left-pad"));
/// assert_eq!(obj.len(), 2);
/// ```
#[macro_export]
macro_rules! object {
    () => {
        $crate::Object::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let obj = $crate::Object::new();
        $(obj.set($key, $crate::Value::from($value));)+
        obj
    }};
}

#[cfg(test)]
mod tests {
    use crate::Value;

    #[test]
    fn test_empty_object() {
        let obj = object! {};
        assert!(obj.is_empty());
    }

    #[test]
    fn test_object_literal() {
        let inner = object! { "x" => true };
        let obj = object! {
            "inner" => inner.clone(),
            "n" => 2.5,
        };
        assert_eq!(obj.get("n"), Value::Number(2.5));
        assert!(obj.get("inner").as_object().unwrap().ptr_eq(&inner));
    }
}
