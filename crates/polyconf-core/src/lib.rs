//! Layered configuration resolution engine.
//!
//! Configuration is collected from independent source plugins, run in a
//! deterministic order over a per-resolution [`Context`]. Every plugin
//! contributes one [`Layer`]; layers are deep-merged in order, later layers
//! winning, and explicit overrides ("given" values) win over everything.
//!
//! # Flow
//!
//! 1. [`Registry::discover`] registers plugins by unique name
//! 2. [`Registry::select`] picks and orders them (`"ALL"` selects everything)
//! 3. [`Pipeline::run`] applies them one by one, recording each outcome
//! 4. [`Context::result`] exposes the merged tree through three views
//!
//! # Example
//!
//! ```ignore
//! use polyconf_core::{Context, LayerValues, Registry, Settings};
//!
//! let registry = Registry::with_plugins(polyconf_plugins::builtin_plugins(LayerValues::new()))?;
//! let context = Context::builder("widget").app_prefix("WIDGET").build();
//! let resolved = registry.resolve(context, &["ALL"], &Settings::default()).await?;
//!
//! println!("{}", resolved.status());
//! println!("{}", resolved.result().serialize());
//! ```

pub mod context;
pub mod error;
pub mod key_path;
pub mod layer;
pub mod merge;
pub mod pipeline;
pub mod plugin;
pub mod registry;
pub mod result;
pub mod settings;
pub mod status;

pub use context::{Context, ContextBuilder};
pub use error::{Error, PluginError, Result};
pub use key_path::KeyPath;
pub use layer::{Layer, LayerValues, Outcome};
pub use merge::MergedTree;
pub use pipeline::Pipeline;
pub use plugin::Plugin;
pub use registry::{ALL_PLUGINS, Registry, Selection};
pub use result::{LayerReport, Provenance, RawResult, RawValue, ResolvedResult};
pub use settings::Settings;
pub use status::Status;
