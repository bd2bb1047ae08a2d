//! Bridge from a declarative element tree to a live, imperative map library.
//!
//! A reconciliation runtime drives a [`Bridge`]: it creates an [`Instance`]
//! per element, attaches and reorders children, and commits prop updates.
//! The native library is reached through [`native::NativeLibrary`];
//! [`native::memory`] is a headless implementation of it.

pub mod applier;
pub mod config;
pub mod dom;
pub mod element;
pub mod error;
pub mod event;
pub mod factory;
pub mod geo;
pub mod host;
pub mod instance;
pub mod kind;
pub mod native;
pub mod props;
pub mod registry;
pub mod reorder;
pub mod size;

pub use config::BridgeConfig;
pub use element::Element;
pub use error::{BridgeError, NativeError, Result};
pub use host::Bridge;
pub use instance::Instance;
pub use kind::{Category, CatalogKind, ElementKind, ExtensionCategory};
pub use props::{Children, Options, PropValue, Props};
pub use registry::{ContentRenderer, RootRegistry};
