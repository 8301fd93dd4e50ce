//! Sequential pipeline executor

use std::sync::Arc;
use std::time::Duration;

use crate::context::Context;
use crate::error::PluginError;
use crate::layer::{Layer, LayerValues, Outcome};
use crate::plugin::Plugin;
use crate::registry::Selection;
use crate::status::Status;
use crate::{Error, Result};

/// Reason recorded for plugins whose `applicable` check declined.
pub const NOT_APPLICABLE: &str = "not applicable";

/// Reason recorded for plugins that exceeded their time bound.
pub const TIMEOUT: &str = "timeout";

/// Folds an ordered [`Selection`] over a [`Context`].
///
/// Plugins run strictly one after another; order is precedence. Every
/// `apply` runs on its own task, bounded by `plugin_timeout`.
#[derive(Debug, Clone)]
pub struct Pipeline {
    plugin_timeout: Duration,
}

impl Pipeline {
    pub fn new(plugin_timeout: Duration) -> Self {
        Self { plugin_timeout }
    }

    pub fn plugin_timeout(&self) -> Duration {
        self.plugin_timeout
    }

    /// Run every selected plugin over `context`.
    ///
    /// Ordinary plugin failures become `error` layers and timeouts become
    /// `skipped` layers; the run continues either way. A failing fatal
    /// plugin stops the run and returns [`Error::FatalPlugin`] carrying the
    /// partial context.
    pub async fn run(&self, mut context: Context, selection: &Selection) -> Result<Context> {
        context.begin();
        tracing::debug!(
            app_name = context.app_name(),
            plugins = selection.len(),
            "Starting resolution"
        );

        for plugin in selection.plugins() {
            let name = plugin.name();

            if !plugin.applicable(&context) {
                tracing::debug!(plugin = name, "Plugin not applicable, skipping");
                context.append_layer(Layer::failed(name, Outcome::skipped(NOT_APPLICABLE)));
                continue;
            }

            tracing::debug!(plugin = name, "Applying plugin");
            let outcome = self
                .apply_bounded(Arc::clone(plugin), &context)
                .await
                .and_then(|values| match values.validate() {
                    Ok(()) => Ok(values),
                    Err(err) => Err(PluginError::execution(err.to_string())),
                });

            match outcome {
                Ok(values) => {
                    context.append_layer(Layer::ok(name, values));
                }
                Err(PluginError::Timeout { after }) => {
                    tracing::warn!(plugin = name, ?after, "Plugin timed out");
                    context.append_layer(Layer::failed(name, Outcome::skipped(TIMEOUT)));
                }
                Err(err) if plugin.fatal() => {
                    let reason = err.to_string();
                    tracing::error!(plugin = name, %reason, "Fatal plugin failed, aborting");
                    context.append_layer(Layer::failed(name, Outcome::error(reason.clone())));
                    context.fail();
                    return Err(Error::FatalPlugin {
                        plugin: name.to_string(),
                        reason,
                        context: Box::new(context),
                    });
                }
                Err(err) => {
                    let reason = err.to_string();
                    tracing::warn!(plugin = name, %reason, "Plugin failed");
                    context.append_layer(Layer::failed(name, Outcome::error(reason)));
                }
            }
        }

        context.finalize();
        let status = context.status();
        if status == Status::Failed {
            tracing::warn!(app_name = context.app_name(), %status, "Resolution finished");
        } else {
            tracing::info!(
                app_name = context.app_name(),
                %status,
                layers = context.layers().len(),
                "Resolution finished"
            );
        }
        Ok(context)
    }

    /// Apply `plugin` on its own task against a snapshot of `context`.
    ///
    /// The task is abandoned once `plugin_timeout` elapses, so a plugin that
    /// blocks its thread cannot hold up the pipeline.
    async fn apply_bounded(
        &self,
        plugin: Arc<dyn Plugin>,
        context: &Context,
    ) -> std::result::Result<LayerValues, PluginError> {
        let snapshot = context.clone();
        let mut task = tokio::spawn(async move { plugin.apply(&snapshot).await });

        match tokio::time::timeout(self.plugin_timeout, &mut task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(PluginError::execution(format!(
                "plugin task failed: {join_error}"
            ))),
            Err(_) => {
                task.abort();
                Err(PluginError::Timeout {
                    after: self.plugin_timeout,
                })
            }
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(crate::Settings::default().plugin_timeout())
    }
}
