//! The `Container` struct and its associated methods.

use crate::core::{Binding, Factories, Factory, Lookup, Path};
use crate::error::{BoxError, ContainerError, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// A lazy service locator.
///
/// Each name maps to a factory that is invoked at most once, on first access,
/// and whose result is cached. Bindings can be swapped out with
/// [`override_service`](Container::override_service) and put back with
/// [`restore`](Container::restore), which is how tests install doubles.
///
/// The container is `Send + Sync`, but lazy construction is only guaranteed to
/// run a factory once per binding; no cycle detection is performed, so a factory
/// that resolves its own name will block forever.
pub struct Container<V = Value> {
  bindings: DashMap<String, Binding<V>>,
  // State of each overridden name right before its first override since the last restore.
  // `None` records that the name was unbound.
  shadows: Mutex<HashMap<String, Option<Binding<V>>>>,
}

impl<V> Default for Container<V> {
  fn default() -> Self {
    Self {
      bindings: DashMap::new(),
      shadows: Mutex::new(HashMap::new()),
    }
  }
}

impl<V> fmt::Debug for Container<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut names: Vec<String> = self.bindings.iter().map(|e| e.key().clone()).collect();
    names.sort();
    let mut shadowed: Vec<String> = self.shadows.lock().keys().cloned().collect();
    shadowed.sort();
    f.debug_struct("Container")
      .field("services", &names)
      .field("overridden", &shadowed)
      .finish()
  }
}

impl<V> Container<V>
where
  V: Lookup + Clone + Send + Sync + 'static,
{
  /// Creates a new, empty `Container`.
  pub fn new() -> Self {
    Self::default()
  }

  /// Builds a container with one lazy binding per factory. No factory is invoked.
  pub fn from_factories(factories: Factories<V>) -> Self {
    let container = Self::new();
    for (name, factory) in factories {
      container.bindings.insert(name, Binding::lazy(factory));
    }
    container
  }

  /// Starts a [`ContainerBuilder`] for registering factories by name.
  pub fn builder() -> ContainerBuilder<V> {
    ContainerBuilder::new()
  }

  // --- PRIVATE HELPERS ---

  // Clones the binding out so no map guard is held while a factory runs.
  fn binding(&self, name: &str) -> Option<Binding<V>> {
    self.bindings.get(name).map(|entry| entry.value().clone())
  }

  fn invoke(&self, name: &str, factory: &Factory<V>) -> Result<V> {
    factory(self).map_err(|source| ContainerError::FactoryFailed {
      name: name.to_owned(),
      source,
    })
  }

  // --- Resolution ---

  /// Resolves the service bound to `name`, constructing it on first access.
  ///
  /// The returned `Arc` is the cached instance itself, so repeated calls hand
  /// out the same allocation until the binding is reinitialized or replaced.
  pub fn resolve(&self, name: &str) -> Result<Arc<V>> {
    let binding = self
      .binding(name)
      .ok_or_else(|| ContainerError::UndefinedService {
        name: name.to_owned(),
      })?;

    if let Some(instance) = binding.cell.get() {
      trace!(service = name, "cache hit");
      return Ok(Arc::clone(instance));
    }

    let instance = binding.cell.get_or_try_init(|| {
      debug!(service = name, "constructing service");
      self.invoke(name, &binding.factory).map(Arc::new)
    })?;
    Ok(Arc::clone(instance))
  }

  /// Reads `name[.prop1.prop2...]`.
  ///
  /// With a bare name this is the resolved service (always `Some`). With a
  /// nested path it is the addressed property, or `None` when any segment is
  /// missing.
  pub fn get(&self, path: &str) -> Result<Option<V>> {
    let path = Path::parse(path);
    let instance = self.resolve(path.name)?;
    Ok(path.read(&*instance).cloned())
  }

  /// Like [`get`](Container::get), substituting `default` when the path is not found.
  ///
  /// # Errors
  ///
  /// Fails with [`ContainerError::UndefinedService`] if the leading name is unbound;
  /// the default does not apply to that case.
  pub fn get_or(&self, path: &str, default: V) -> Result<V> {
    Ok(self.get(path)?.unwrap_or(default))
  }

  /// Whether `name` is bound, regardless of whether its instance has been constructed.
  pub fn exists(&self, name: &str) -> bool {
    self.bindings.contains_key(name)
  }

  /// Whether the service bound to `name` currently holds a constructed instance.
  pub fn is_resolved(&self, name: &str) -> bool {
    self
      .bindings
      .get(name)
      .map(|entry| entry.value().is_cached())
      .unwrap_or(false)
  }

  /// Number of bound names.
  pub fn len(&self) -> usize {
    self.bindings.len()
  }

  /// Whether no name is bound.
  pub fn is_empty(&self) -> bool {
    self.bindings.is_empty()
  }

  /// All bound names, sorted.
  pub fn names(&self) -> Vec<String> {
    let mut names: Vec<String> = self.bindings.iter().map(|e| e.key().clone()).collect();
    names.sort();
    names
  }

  // --- Registration ---

  /// Registers a constant service under a new name.
  ///
  /// Existing names are rejected with [`ContainerError::DuplicateService`];
  /// use [`override_service`](Container::override_service) to replace one.
  pub fn set(&self, name: &str, value: V) -> Result<()> {
    match self.bindings.entry(name.to_owned()) {
      Entry::Occupied(_) => Err(ContainerError::DuplicateService {
        name: name.to_owned(),
      }),
      Entry::Vacant(slot) => {
        slot.insert(Binding::constant(value));
        Ok(())
      }
    }
  }

  /// Replaces whatever is bound to `name` (if anything) with `value`.
  ///
  /// The prior state is remembered only on the first override of a name since
  /// the last [`restore`](Container::restore); later overrides do not stack.
  pub fn override_service(&self, name: &str, value: V) {
    let mut shadows = self.shadows.lock();
    let replaced = self
      .bindings
      .insert(name.to_owned(), Binding::constant(value));
    let was_bound = replaced.is_some();
    shadows.entry(name.to_owned()).or_insert(replaced);
    debug!(service = name, was_bound, "service overridden");
  }

  /// Runs the factory currently bound to `name` and installs the result as an override.
  ///
  /// The fresh instance is cached, so subsequent reads do not call the factory
  /// again. [`restore`](Container::restore) reverts it like any other override.
  pub fn recreate(&self, name: &str) -> Result<()> {
    let binding = self
      .binding(name)
      .ok_or_else(|| ContainerError::MissingBinding {
        name: name.to_owned(),
      })?;
    debug!(service = name, "recreating service");
    let value = self.invoke(name, &binding.factory)?;
    self.override_service(name, value);
    Ok(())
  }

  // --- Lifecycle ---

  /// Drops every cached instance. Factories and overrides are left in place.
  pub fn reinitialize(&self) {
    for mut entry in self.bindings.iter_mut() {
      entry.value_mut().clear();
    }
    debug!(services = self.bindings.len(), "container reinitialized");
  }

  /// Reverts every overridden name to its state before the first override
  /// and forgets all overrides. A no-op when nothing is overridden.
  pub fn restore(&self) {
    let mut shadows = self.shadows.lock();
    let restored = shadows.len();
    for (name, prior) in shadows.drain() {
      match prior {
        Some(binding) => {
          self.bindings.insert(name, binding);
        }
        None => {
          self.bindings.remove(&name);
        }
      }
    }
    if restored > 0 {
      debug!(restored, "overridden services restored");
    }
  }
}

/// Collects named factories and builds a [`Container`] from them.
pub struct ContainerBuilder<V = Value> {
  factories: Factories<V>,
}

impl<V> ContainerBuilder<V>
where
  V: Lookup + Clone + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      factories: HashMap::new(),
    }
  }

  /// Adds a factory under `name`. A later factory for the same name replaces the earlier one.
  pub fn factory<F>(mut self, name: &str, factory: F) -> Self
  where
    F: Fn(&Container<V>) -> std::result::Result<V, BoxError> + Send + Sync + 'static,
  {
    self.factories.insert(name.to_owned(), Arc::new(factory));
    self
  }

  /// Adds a factory that always produces a clone of `value`. Still lazy: the
  /// binding starts out unresolved.
  pub fn value(self, name: &str, value: V) -> Self {
    self.factory(name, move |_| Ok(value.clone()))
  }

  pub fn build(self) -> Container<V> {
    Container::from_factories(self.factories)
  }
}

impl<V> Default for ContainerBuilder<V>
where
  V: Lookup + Clone + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn overriding_twice_keeps_the_first_prior_state() {
    let container: Container = Container::builder().value("svc", json!("original")).build();

    container.override_service("svc", json!("first"));
    container.override_service("svc", json!("second"));
    assert_eq!(container.get("svc").unwrap(), Some(json!("second")));

    container.restore();
    assert_eq!(container.get("svc").unwrap(), Some(json!("original")));
  }

  #[test]
  fn restore_clears_the_shadow_map() {
    let container: Container = Container::new();
    container.override_service("tmp", json!(1));
    container.restore();
    assert!(!container.exists("tmp"));

    container.set("tmp", json!(2)).unwrap();
    container.restore();
    assert_eq!(container.get("tmp").unwrap(), Some(json!(2)));
  }

  #[test]
  fn reinitialize_keeps_overrides() {
    let container: Container = Container::builder().value("svc", json!("original")).build();
    container.override_service("svc", json!("double"));

    container.reinitialize();
    assert!(!container.is_resolved("svc"));
    assert_eq!(container.get("svc").unwrap(), Some(json!("double")));

    container.restore();
    assert_eq!(container.get("svc").unwrap(), Some(json!("original")));
  }

  #[test]
  fn debug_lists_names() {
    let container: Container = Container::builder()
      .value("b", json!(1))
      .value("a", json!(2))
      .build();
    container.override_service("a", json!(3));
    let rendered = format!("{:?}", container);
    assert_eq!(
      rendered,
      r#"Container { services: ["a", "b"], overridden: ["a"] }"#
    );
  }
}
