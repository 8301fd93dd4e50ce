//! Plugin trait: the contract every configuration source satisfies

use async_trait::async_trait;

use crate::context::Context;
use crate::error::PluginError;
use crate::layer::LayerValues;

/// A named, independently pluggable configuration source.
///
/// A plugin reads the context and returns the values of its layer; it never
/// mutates the context. The pipeline executor wraps the values into a
/// [`Layer`](crate::Layer) and appends it.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Unique identity within a registry.
    fn name(&self) -> &str;

    /// Ordering key; lower runs earlier and is overridden by later plugins.
    fn priority(&self) -> i32 {
        0
    }

    /// Whether this plugin has anything to offer for `context`.
    fn applicable(&self, _context: &Context) -> bool {
        true
    }

    /// A failure of a fatal plugin aborts the whole resolution.
    fn fatal(&self) -> bool {
        false
    }

    async fn apply(&self, context: &Context) -> Result<LayerValues, PluginError>;
}

impl std::fmt::Debug for dyn Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name())
            .field("priority", &self.priority())
            .field("fatal", &self.fatal())
            .finish()
    }
}
