//! Public macros for ergonomic access to the process-wide container.

/// Reads a path from the process-wide container.
///
/// Panics if the leading service name is not defined or its factory fails.
/// For a non-panicking version, use `global::instance().get(...)` directly.
///
/// - `service!("name.path")` evaluates to `Option<Value>`.
/// - `service!("name.path", default)` evaluates to `Value`.
///
/// # Examples
///
/// ```
/// use fibre_locator::{global, service};
/// use serde_json::json;
///
/// global::instance().override_service("macro_doc_config", json!({ "port": 8080 }));
///
/// assert_eq!(service!("macro_doc_config.port"), Some(json!(8080)));
/// assert_eq!(service!("macro_doc_config.host", json!("localhost")), json!("localhost"));
/// ```
#[macro_export]
macro_rules! service {
  ($path:expr) => {{
    let path: &str = $path;
    $crate::global::instance()
      .get(path)
      .unwrap_or_else(|err| panic!("Failed to resolve required service '{}': {}", path, err))
  }};

  ($path:expr, $default:expr) => {{
    let path: &str = $path;
    $crate::global::instance()
      .get_or(path, $default)
      .unwrap_or_else(|err| panic!("Failed to resolve required service '{}': {}", path, err))
  }};
}
