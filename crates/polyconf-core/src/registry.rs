//! Plugin registry: discovery, selection and ordering

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::context::Context;
use crate::pipeline::Pipeline;
use crate::plugin::Plugin;
use crate::settings::Settings;
use crate::{Error, Result};

/// Selection sentinel expanding to every discovered plugin.
pub const ALL_PLUGINS: &str = "ALL";

/// Discovered plugins, in discovery order.
///
/// Read-only once built, so one registry can serve any number of
/// concurrent resolutions.
#[derive(Debug, Default)]
pub struct Registry {
    plugins: Vec<Arc<dyn Plugin>>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from `source`, see [`discover`](Self::discover).
    pub fn with_plugins<I>(source: I) -> Result<Self>
    where
        I: IntoIterator<Item = Arc<dyn Plugin>>,
    {
        let mut registry = Self::new();
        registry.discover(source)?;
        Ok(registry)
    }

    /// Register every plugin of `source`.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicatePlugin`] if a name is already registered or appears
    /// twice in `source`. Nothing is registered in that case.
    pub fn discover<I>(&mut self, source: I) -> Result<()>
    where
        I: IntoIterator<Item = Arc<dyn Plugin>>,
    {
        let incoming: Vec<Arc<dyn Plugin>> = source.into_iter().collect();
        let mut seen: HashSet<&str> = HashSet::new();
        for plugin in &incoming {
            let name = plugin.name();
            if self.index.contains_key(name) || !seen.insert(name) {
                return Err(Error::DuplicatePlugin {
                    name: name.to_string(),
                });
            }
        }

        for plugin in incoming {
            tracing::debug!(
                plugin = plugin.name(),
                priority = plugin.priority(),
                "Discovered plugin"
            );
            self.index.insert(plugin.name().to_string(), self.plugins.len());
            self.plugins.push(plugin);
        }
        Ok(())
    }

    /// Replace the discovered set with `source`.
    ///
    /// On error the previous set is kept.
    pub fn rediscover<I>(&mut self, source: I) -> Result<()>
    where
        I: IntoIterator<Item = Arc<dyn Plugin>>,
    {
        let fresh = Self::with_plugins(source)?;
        *self = fresh;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Plugin>> {
        self.index.get(name).map(|&i| &self.plugins[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Plugin names in discovery order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Resolve selection `patterns` into an ordered [`Selection`].
    ///
    /// [`ALL_PLUGINS`] expands to every discovered plugin; repeated
    /// patterns collapse. Ordering is by ascending priority, then discovery
    /// order, then name.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownPlugin`] for a name that was never discovered.
    pub fn select<S: AsRef<str>>(&self, patterns: &[S]) -> Result<Selection> {
        let mut chosen: Vec<usize> = Vec::new();
        let mut taken = vec![false; self.plugins.len()];

        for pattern in patterns {
            let pattern = pattern.as_ref();
            if pattern == ALL_PLUGINS {
                for (i, slot) in taken.iter_mut().enumerate() {
                    if !*slot {
                        *slot = true;
                        chosen.push(i);
                    }
                }
                continue;
            }
            let &i = self
                .index
                .get(pattern)
                .ok_or_else(|| Error::UnknownPlugin {
                    name: pattern.to_string(),
                })?;
            if !taken[i] {
                taken[i] = true;
                chosen.push(i);
            }
        }

        chosen.sort_by(|&a, &b| {
            let (pa, pb) = (&self.plugins[a], &self.plugins[b]);
            pa.priority()
                .cmp(&pb.priority())
                .then(a.cmp(&b))
                .then_with(|| pa.name().cmp(pb.name()))
        });

        let plugins: Vec<Arc<dyn Plugin>> =
            chosen.into_iter().map(|i| Arc::clone(&self.plugins[i])).collect();
        tracing::debug!(
            selected = ?plugins.iter().map(|p| p.name()).collect::<Vec<_>>(),
            "Selected plugins"
        );
        Ok(Selection { plugins })
    }

    /// Select with `patterns` and run the pipeline over `context`.
    ///
    /// An empty `patterns` falls back to `settings.default_select`.
    pub async fn resolve<S: AsRef<str>>(
        &self,
        context: Context,
        patterns: &[S],
        settings: &Settings,
    ) -> Result<Context> {
        let selection = if patterns.is_empty() {
            self.select(settings.default_select.as_slice())?
        } else {
            self.select(patterns)?
        };
        Pipeline::new(settings.plugin_timeout())
            .run(context, &selection)
            .await
    }
}

/// Plugins chosen for one resolution, in execution order.
#[derive(Debug, Clone)]
pub struct Selection {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl Selection {
    pub fn plugins(&self) -> &[Arc<dyn Plugin>] {
        &self.plugins
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
