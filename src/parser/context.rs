//! Parse context: the ordered multimap filled during a parse

use std::any::Any;

use indexmap::IndexMap;
use serde::Serialize;

use super::value::{FromValue, Value};
use crate::error::ContextError;

/// Values recorded by argument elements, keyed by element key.
///
/// Keys keep their first-insertion order and every key holds its values in
/// the order they were written. Writes are append-only while a parse runs;
/// the only way to drop values is [`rollback`](Self::rollback) to a
/// [`ContextMark`] taken earlier.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParseContext {
    values: IndexMap<String, Vec<Value>>,
}

/// Position in a [`ParseContext`] to roll back to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMark {
    keys: usize,
    lengths: Vec<usize>,
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under `key`
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// Every value recorded under `key`, in write order
    pub fn all(&self, key: &str) -> &[Value] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The value under `key` if exactly one was recorded
    pub fn one(&self, key: &str) -> Option<&Value> {
        match self.all(key) {
            [value] => Some(value),
            _ => None,
        }
    }

    /// The first value recorded under `key`
    pub fn first(&self, key: &str) -> Option<&Value> {
        self.all(key).first()
    }

    pub fn has_any(&self, key: &str) -> bool {
        !self.all(key).is_empty()
    }

    pub fn count(&self, key: &str) -> usize {
        self.all(key).len()
    }

    /// Like [`one`](Self::one), reporting why no single value is available
    pub fn require_one(&self, key: &str) -> Result<&Value, ContextError> {
        match self.all(key) {
            [] => Err(ContextError::Missing(key.to_string())),
            [value] => Ok(value),
            values => Err(ContextError::Ambiguous {
                key: key.to_string(),
                count: values.len(),
            }),
        }
    }

    /// Typed [`require_one`](Self::require_one)
    pub fn get_one<T: FromValue>(&self, key: &str) -> Result<T, ContextError> {
        let value = self.require_one(key)?;
        T::from_value(value).ok_or_else(|| ContextError::TypeMismatch {
            key: key.to_string(),
            expected: T::TYPE_NAME,
        })
    }

    /// Typed [`first`](Self::first); `None` when absent or of another type
    pub fn get_first<T: FromValue>(&self, key: &str) -> Option<T> {
        self.first(key).and_then(T::from_value)
    }

    /// Typed [`all`](Self::all), skipping values of other types
    pub fn get_all<T: FromValue>(&self, key: &str) -> Vec<T> {
        self.all(key).iter().filter_map(T::from_value).collect()
    }

    /// Collaborator payload stored as the single value under `key`
    pub fn one_custom<T: Any>(&self, key: &str) -> Option<&T> {
        self.one(key).and_then(Value::downcast_ref::<T>)
    }

    /// Keys in first-write order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Remember the current contents for a later [`rollback`](Self::rollback)
    pub fn mark(&self) -> ContextMark {
        ContextMark {
            keys: self.values.len(),
            lengths: self.values.values().map(Vec::len).collect(),
        }
    }

    /// Drop every write made since `mark` was taken.
    ///
    /// Keys first written after the mark are removed; older keys are
    /// truncated to their marked length.
    pub fn rollback(&mut self, mark: &ContextMark) {
        self.values.truncate(mark.keys);
        for (values, &len) in self.values.values_mut().zip(&mark.lengths) {
            values.truncate(len);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multimap_order() {
        let mut ctx = ParseContext::new();
        ctx.put("b", 1);
        ctx.put("a", "x");
        ctx.put("b", 2);

        assert_eq!(ctx.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(ctx.all("b"), &[Value::Integer(1), Value::Integer(2)]);
        assert_eq!(ctx.first("b"), Some(&Value::Integer(1)));
        assert_eq!(ctx.one("b"), None);
        assert_eq!(ctx.one("a"), Some(&Value::Text("x".into())));
        assert!(ctx.all("missing").is_empty());
    }

    #[test]
    fn test_require_one_errors() {
        let mut ctx = ParseContext::new();
        assert_eq!(
            ctx.require_one("k").unwrap_err(),
            ContextError::Missing("k".to_string())
        );
        ctx.put("k", true);
        ctx.put("k", false);
        assert_eq!(
            ctx.require_one("k").unwrap_err(),
            ContextError::Ambiguous {
                key: "k".to_string(),
                count: 2
            }
        );
    }

    #[test]
    fn test_typed_getters() {
        let mut ctx = ParseContext::new();
        ctx.put("n", 42);
        ctx.put("s", "word");

        assert_eq!(ctx.get_one::<i32>("n").unwrap(), 42);
        assert_eq!(ctx.get_first::<String>("s").as_deref(), Some("word"));
        assert_eq!(
            ctx.get_one::<bool>("n").unwrap_err(),
            ContextError::TypeMismatch {
                key: "n".to_string(),
                expected: "bool"
            }
        );
    }

    #[test]
    fn test_rollback_drops_later_writes() {
        let mut ctx = ParseContext::new();
        ctx.put("a", 1);
        let mark = ctx.mark();

        ctx.put("a", 2);
        ctx.put("b", 3);
        assert_eq!(ctx.len(), 2);

        ctx.rollback(&mark);
        assert_eq!(ctx.all("a"), &[Value::Integer(1)]);
        assert!(!ctx.has_any("b"));
        assert_eq!(ctx.keys().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_serializes_as_object() {
        let mut ctx = ParseContext::new();
        ctx.put("key", "something");
        ctx.put("q", 42);
        let json = serde_json::to_string(&ctx).unwrap();
        assert_eq!(json, r#"{"key":["something"],"q":[42]}"#);
    }
}
