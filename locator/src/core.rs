//! Core data structures: bindings, factories and dotted paths.

use crate::container::Container;
use crate::error::BoxError;
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A factory producing a service. It receives the container so it can resolve
/// its own dependencies.
pub type Factory<V = Value> =
  Arc<dyn Fn(&Container<V>) -> Result<V, BoxError> + Send + Sync + 'static>;

/// Wraps a closure as a [`Factory`], fixing its signature for type inference.
pub fn factory<V, F>(f: F) -> Factory<V>
where
  V: 'static,
  F: Fn(&Container<V>) -> Result<V, BoxError> + Send + Sync + 'static,
{
  Arc::new(f)
}

/// The initial factory set a container is constructed from.
pub type Factories<V = Value> = HashMap<String, Factory<V>>;

/// Single-step property access used to walk the remainder of a dotted path.
pub trait Lookup {
  /// Returns the property named `segment`, or `None` if there is no such property.
  fn lookup(&self, segment: &str) -> Option<&Self>;
}

impl Lookup for Value {
  fn lookup(&self, segment: &str) -> Option<&Self> {
    match self {
      Value::Object(map) => map.get(segment),
      Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
      _ => None,
    }
  }
}

/// A parsed `name[.prop1.prop2...]` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path<'a> {
  pub name: &'a str,
  pub segments: Vec<&'a str>,
}

impl<'a> Path<'a> {
  pub fn parse(path: &'a str) -> Self {
    let mut parts = path.split('.');
    // `split` always yields at least one item.
    let name = parts.next().unwrap_or_default();
    let mut segments: Vec<&str> = parts.collect();
    // A trailing dot leaves an empty remainder, which addresses the whole value.
    if segments == [""] {
      segments.clear();
    }
    Self { name, segments }
  }

  /// Walks the segments down from `root`. `None` means some segment was not found.
  pub fn read<'v, V: Lookup>(&self, root: &'v V) -> Option<&'v V> {
    descend(root, &self.segments)
  }
}

fn descend<'v, V: Lookup>(value: &'v V, segments: &[&str]) -> Option<&'v V> {
  match segments.split_first() {
    None => Some(value),
    Some((head, rest)) => descend(value.lookup(head)?, rest),
  }
}

/// A registered service: its factory and its (possibly empty) cached instance.
///
/// Cloning is shallow: the clone shares the factory and the cache cell. The
/// container clones a binding out of its map so a factory can run without a
/// map guard held, and the instance it builds lands in the shared cell.
pub(crate) struct Binding<V> {
  pub(crate) factory: Factory<V>,
  pub(crate) cell: Arc<OnceCell<Arc<V>>>,
}

impl<V> Clone for Binding<V> {
  fn clone(&self) -> Self {
    Self {
      factory: Arc::clone(&self.factory),
      cell: Arc::clone(&self.cell),
    }
  }
}

impl<V: Clone + Send + Sync + 'static> Binding<V> {
  pub(crate) fn lazy(factory: Factory<V>) -> Self {
    Self {
      factory,
      cell: Arc::new(OnceCell::new()),
    }
  }

  /// A binding whose factory always yields `value` and whose cache is already filled.
  pub(crate) fn constant(value: V) -> Self {
    let instance = Arc::new(value);
    let shared = Arc::clone(&instance);
    Self {
      factory: Arc::new(move |_: &Container<V>| Ok((*shared).clone())),
      cell: Arc::new(OnceCell::with_value(instance)),
    }
  }

  pub(crate) fn is_cached(&self) -> bool {
    self.cell.get().is_some()
  }

  /// Drops the cached instance, keeping the factory.
  pub(crate) fn clear(&mut self) {
    self.cell = Arc::new(OnceCell::new());
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn parse_splits_name_from_segments() {
    let path = Path::parse("config.db.url");
    assert_eq!(path.name, "config");
    assert_eq!(path.segments, vec!["db", "url"]);

    let bare = Path::parse("config");
    assert_eq!(bare.name, "config");
    assert!(bare.segments.is_empty());
  }

  #[test]
  fn parse_treats_a_trailing_dot_as_a_bare_name() {
    let path = Path::parse("config.");
    assert_eq!(path.name, "config");
    assert!(path.segments.is_empty());

    let value = json!({ "foo": "bar" });
    assert_eq!(path.read(&value), Some(&value));
  }

  #[test]
  fn read_descends_objects_and_arrays() {
    let value = json!({ "hosts": [{ "name": "a" }, { "name": "b" }] });
    let path = Path::parse("cfg.hosts.1.name");
    assert_eq!(path.read(&value), Some(&json!("b")));
  }

  #[test]
  fn read_distinguishes_missing_from_null() {
    let value = json!({ "present": null });
    assert_eq!(Path::parse("cfg.present").read(&value), Some(&Value::Null));
    assert_eq!(Path::parse("cfg.absent").read(&value), None);
    assert_eq!(Path::parse("cfg.present.deeper").read(&value), None);
  }

  #[test]
  fn scalars_have_no_properties() {
    assert_eq!(json!("text").lookup("len"), None);
    assert_eq!(json!([1, 2]).lookup("x"), None);
  }
}
