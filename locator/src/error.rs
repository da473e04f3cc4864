use thiserror::Error;

/// Boxed error type returned by service factories.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the container and the process-wide accessor.
#[derive(Debug, Error)]
pub enum ContainerError {
  #[error("Service \"{name}\" is not defined")]
  UndefinedService { name: String },

  #[error("Service \"{name}\" already exists. Use Container::override_service to override an existing service.")]
  DuplicateService { name: String },

  #[error("Service container is already initialized")]
  AlreadyInitialized,

  /// `recreate` was asked to rebuild a name that has no binding to take a factory from.
  #[error("Service \"{name}\" has no binding to recreate from")]
  MissingBinding { name: String },

  #[error("Factory for service \"{name}\" failed: {source}")]
  FactoryFailed {
    name: String,
    #[source]
    source: BoxError,
  },
}

/// A specialized `Result` type for container operations.
pub type Result<T, E = ContainerError> = std::result::Result<T, E>;
