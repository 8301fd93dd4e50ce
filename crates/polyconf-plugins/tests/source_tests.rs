//! Integration tests for the built-in sources resolving real files and
//! variables through the pipeline.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use polyconf_core::{
    ALL_PLUGINS, Context, LayerValues, Outcome, Plugin, Registry, Settings, Status,
};
use polyconf_plugins::{EnvPlugin, FilePlugin, StaticPlugin};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn defaults() -> StaticPlugin {
    StaticPlugin::from_flat(
        "defaults",
        [
            ("timeout", json!(5)),
            ("db.host", json!("localhost")),
            ("db.port", json!(5432)),
        ],
    )
    .unwrap()
}

fn registry(dirs: Vec<&Path>, vars: Vec<(&str, &str)>) -> Registry {
    let plugins: Vec<Arc<dyn Plugin>> = vec![
        Arc::new(defaults()),
        Arc::new(FilePlugin::with_search_dirs(
            dirs.into_iter().map(Path::to_path_buf).collect(),
        )),
        Arc::new(EnvPlugin::with_vars(vars)),
    ];
    Registry::with_plugins(plugins).unwrap()
}

// ==========================================================================
// FilePlugin
// ==========================================================================

#[tokio::test]
async fn test_file_plugin_reads_app_file() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "widget.toml", "timeout = 10\n[db]\nhost = \"db.local\"\n");

    let plugin = FilePlugin::with_search_dirs(vec![temp.path().to_path_buf()]);
    let values = plugin.apply(&Context::builder("widget").build()).await.unwrap();

    assert_eq!(
        values.into_value(),
        json!({"timeout": 10, "db": {"host": "db.local"}})
    );
}

#[tokio::test]
async fn test_file_plugin_later_directory_wins() {
    let system = TempDir::new().unwrap();
    let local = TempDir::new().unwrap();
    write(system.path(), "widget.yaml", "timeout: 10\nlog:\n  level: info\n");
    write(local.path(), "widget.json", "{\"log\": {\"level\": \"debug\"}}");

    let plugin = FilePlugin::with_search_dirs(vec![
        system.path().to_path_buf(),
        local.path().to_path_buf(),
    ]);
    let values = plugin.apply(&Context::builder("widget").build()).await.unwrap();

    assert_eq!(
        values.into_value(),
        json!({"timeout": 10, "log": {"level": "debug"}})
    );
}

#[rstest]
#[case("widget.toml", "retries = 3\n")]
#[case("widget.yaml", "retries: 3\n")]
#[case("widget.yml", "retries: 3\n")]
#[case("widget.json", "{\"retries\": 3}")]
fn test_file_plugin_formats(#[case] name: &str, #[case] content: &str) {
    let temp = TempDir::new().unwrap();
    write(temp.path(), name, content);

    let plugin = FilePlugin::with_search_dirs(vec![temp.path().to_path_buf()]);
    let runtime = tokio::runtime::Runtime::new().unwrap();

    let candidates = runtime.block_on(plugin.candidates("widget"));
    assert_eq!(candidates, vec![temp.path().join(name)]);

    let values = runtime
        .block_on(plugin.apply(&Context::builder("widget").build()))
        .unwrap();
    assert_eq!(values.into_value(), json!({"retries": 3}));
}

#[tokio::test]
async fn test_file_plugin_ignores_other_apps_and_directories() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "gadget.toml", "retries = 3\n");
    fs::create_dir(temp.path().join("widget.json")).unwrap();

    let plugin = FilePlugin::with_search_dirs(vec![temp.path().to_path_buf()]);
    assert!(plugin.candidates("widget").await.is_empty());
}

#[tokio::test]
async fn test_file_plugin_comment_only_yaml_contributes_nothing() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "widget.yaml", "# retries: 3\n");

    let plugin = FilePlugin::with_search_dirs(vec![temp.path().to_path_buf()]);
    let values = plugin.apply(&Context::builder("widget").build()).await.unwrap();
    assert!(values.is_empty());
}

#[tokio::test]
async fn test_file_plugin_missing_file_is_error() {
    let temp = TempDir::new().unwrap();
    let plugin = FilePlugin::with_search_dirs(vec![temp.path().to_path_buf()]);

    let err = plugin
        .apply(&Context::builder("widget").build())
        .await
        .unwrap_err();
    assert!(
        err.to_string().contains("No configuration file found for widget"),
        "unexpected error: {err}"
    );
}

// ==========================================================================
// Full resolution
// ==========================================================================

#[tokio::test]
async fn test_builtin_layering() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "widget.toml", "timeout = 10\n[db]\nhost = \"db.local\"\n");

    let registry = registry(
        vec![temp.path()],
        vec![("WIDGET_DB__HOST", "prod"), ("WIDGET_DEBUG", "true")],
    );
    let context = Context::builder("widget")
        .app_prefix("WIDGET")
        .given("timeout", json!(60))
        .unwrap()
        .build();

    let resolved = registry
        .resolve(context, &[ALL_PLUGINS], &Settings::default())
        .await
        .unwrap();

    assert_eq!(resolved.status(), Status::Success);
    assert_eq!(
        resolved.result().as_native_value(),
        json!({
            "timeout": 60,
            "debug": true,
            "db": {"host": "prod", "port": 5432}
        })
    );

    let raw = resolved.raw();
    assert_eq!(raw.values["timeout"].source, "given");
    assert_eq!(raw.values["db.host"].source, "env");
    assert_eq!(raw.values["db.port"].source, "defaults");
    assert_eq!(raw.values["debug"].rank, 2);
}

#[tokio::test]
async fn test_missing_file_degrades() {
    let temp = TempDir::new().unwrap();
    let registry = registry(vec![temp.path()], vec![("WIDGET_TIMEOUT", "7")]);
    let context = Context::builder("widget").app_prefix("WIDGET").build();

    let resolved = registry
        .resolve(context, &[ALL_PLUGINS], &Settings::default())
        .await
        .unwrap();

    assert_eq!(resolved.status(), Status::Degraded);
    assert!(matches!(
        resolved.layer("file").unwrap().outcome(),
        Outcome::Error { .. }
    ));
    assert_eq!(
        resolved.result().as_native_value(),
        json!({"timeout": 7, "db": {"host": "localhost", "port": 5432}})
    );
}

#[tokio::test]
async fn test_env_skipped_without_prefix() {
    let temp = TempDir::new().unwrap();
    let registry = registry(vec![temp.path()], vec![("WIDGET_TIMEOUT", "7")]);

    let resolved = registry
        .resolve(
            Context::builder("widget").build(),
            &["env", "defaults"],
            &Settings::default(),
        )
        .await
        .unwrap();

    assert_eq!(resolved.status(), Status::Degraded);
    assert_eq!(resolved.layers().len(), 2);
    assert_eq!(
        resolved.layer("env").unwrap().outcome(),
        &Outcome::skipped("not applicable")
    );
    assert_eq!(resolved.result().get(&"timeout".parse().unwrap()), Some(&json!(5)));
}

#[tokio::test]
async fn test_builtin_plugins_register() {
    let registry =
        Registry::with_plugins(polyconf_plugins::builtin_plugins(LayerValues::new())).unwrap();
    let selection = registry.select(&[ALL_PLUGINS]).unwrap();
    assert_eq!(selection.names(), vec!["defaults", "file", "env"]);
}
