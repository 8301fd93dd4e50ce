//! Built-in configuration sources for polyconf.
//!
//! Three plugins cover the usual layering of an application's settings,
//! in default execution order:
//!
//! 1. [`StaticPlugin`] (`defaults`): values compiled into the application
//! 2. [`FilePlugin`] (`file`): `<app>.toml|yaml|yml|json` on disk
//! 3. [`EnvPlugin`] (`env`): `<APP_PREFIX>_*` environment variables

pub mod env;
pub mod error;
pub mod file;
pub mod static_values;

use std::sync::Arc;

use polyconf_core::{LayerValues, Plugin};

pub use env::{ENV_PLUGIN, EnvPlugin};
pub use error::{Error, Result};
pub use file::{FILE_PLUGIN, FilePlugin, parse_file};
pub use static_values::{DEFAULTS_PLUGIN, StaticPlugin};

/// Number of plugins returned by [`builtin_plugins`].
pub const BUILTIN_COUNT: usize = 3;

/// The built-in plugins with `defaults` as the lowest layer.
pub fn builtin_plugins(defaults: LayerValues) -> Vec<Arc<dyn Plugin>> {
    vec![
        Arc::new(StaticPlugin::defaults(defaults)),
        Arc::new(FilePlugin::new()),
        Arc::new(EnvPlugin::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_plugins() {
        let plugins = builtin_plugins(LayerValues::new());
        assert_eq!(plugins.len(), BUILTIN_COUNT);

        let names: Vec<&str> = plugins.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec![DEFAULTS_PLUGIN, FILE_PLUGIN, ENV_PLUGIN]);

        let mut priorities: Vec<i32> = plugins.iter().map(|p| p.priority()).collect();
        let declared = priorities.clone();
        priorities.sort();
        assert_eq!(priorities, declared);
    }
}
