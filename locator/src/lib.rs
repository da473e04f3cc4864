//! # Fibre Locator
//!
//! A small, lazy service locator.
//!
//! A [`Container`] maps names to factories. Each factory runs at most once, on
//! the first read of its name, and the result is cached. Reads take a dotted
//! path, so `get("config.db.url")` resolves `config` and then walks into it.
//!
//! For tests, [`Container::override_service`] swaps in a double and
//! [`Container::restore`] puts every overridden binding back exactly as it was,
//! including an already-constructed instance.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_locator::Container;
//! use serde_json::json;
//!
//! let container: Container = Container::builder()
//!   .factory("greeting", |_| Ok(json!("Hello")))
//!   .factory("greeter", |c| {
//!     let greeting = c.get_or("greeting", json!(null))?;
//!     Ok(json!({ "message": greeting }))
//!   })
//!   .build();
//!
//! assert_eq!(container.get("greeter.message").unwrap(), Some(json!("Hello")));
//!
//! container.override_service("greeting", json!("Hi"));
//! container.reinitialize();
//! assert_eq!(container.get("greeter.message").unwrap(), Some(json!("Hi")));
//!
//! container.restore();
//! container.reinitialize();
//! assert_eq!(container.get("greeter.message").unwrap(), Some(json!("Hello")));
//! ```
//!
//! ## Process-wide container
//!
//! [`global::initialize`] and [`global::instance`] manage one container for the
//! whole process. The `service!` macro (feature `macros`, on by default) reads
//! from it.

mod container;
mod core;
mod error;
pub mod global;
#[cfg(feature = "macros")]
mod macros;

pub use crate::container::{Container, ContainerBuilder};
pub use crate::core::{factory, Factories, Factory, Lookup, Path};
pub use crate::error::{BoxError, ContainerError, Result};
