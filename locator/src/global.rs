//! The process-wide container and its access functions.
//!
//! The holder starts empty. [`initialize`] fills it once; a second call fails
//! unless reinitialization is explicitly allowed. [`instance`] returns the
//! current container, creating an empty one on first use. There is no
//! teardown: tests isolate themselves with [`Container::override_service`],
//! [`Container::restore`] and [`Container::reinitialize`].

use crate::container::Container;
use crate::core::Factories;
use crate::error::{ContainerError, Result};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

static GLOBAL_CONTAINER: Lazy<RwLock<Option<Arc<Container>>>> = Lazy::new(|| RwLock::new(None));

fn install(slot: &mut Option<Arc<Container>>, factories: Factories) -> Arc<Container> {
  let container = Arc::new(Container::from_factories(factories));
  debug!(services = container.len(), "global container initialized");
  *slot = Some(Arc::clone(&container));
  container
}

/// Creates the process-wide container from `factories` (empty if `None`).
///
/// Fails with [`ContainerError::AlreadyInitialized`] if a container already
/// exists and `allow_reinit` is false. With `allow_reinit` the existing
/// container is replaced; handles obtained earlier keep pointing at the old one.
///
/// # Examples
///
/// ```
/// use fibre_locator::global;
/// use serde_json::json;
///
/// let container = global::initialize(None, true).unwrap();
/// container.set("greeting", json!("hello")).unwrap();
/// assert_eq!(global::instance().get("greeting").unwrap(), Some(json!("hello")));
/// ```
pub fn initialize(factories: Option<Factories>, allow_reinit: bool) -> Result<Arc<Container>> {
  let mut slot = GLOBAL_CONTAINER.write();
  if slot.is_some() && !allow_reinit {
    return Err(ContainerError::AlreadyInitialized);
  }
  Ok(install(&mut slot, factories.unwrap_or_default()))
}

/// Returns the process-wide container, initializing an empty one if needed.
pub fn instance() -> Arc<Container> {
  if let Some(container) = GLOBAL_CONTAINER.read().as_ref() {
    return Arc::clone(container);
  }
  let mut slot = GLOBAL_CONTAINER.write();
  match slot.as_ref() {
    Some(container) => Arc::clone(container),
    None => install(&mut slot, Factories::new()),
  }
}
