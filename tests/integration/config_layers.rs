use std::fs;
use std::path::Path;

use restview::config::{global_config_path, ConfigLoader};
use restview::transport::DeliveryOrder;
use restview::CollectionPolicy;
use tempfile::TempDir;

use crate::common::with_env;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn workspace_environment_file_overrides_base_file() {
    let xdg = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write(
        &workspace.path().join("config/config.toml"),
        "[aggregation]\ncollection_policy = \"resolved\"\nmax_deliveries = 50\n",
    );
    write(
        &workspace.path().join("config/test.toml"),
        "[aggregation]\nmax_deliveries = 75\n\n[logging]\nformat = \"json\"\n",
    );

    let config = with_env(
        &[("XDG_CONFIG_HOME", xdg.path().to_str().unwrap()), ("RESTVIEW_ENV", "test")],
        || ConfigLoader::load(workspace.path()).unwrap(),
    );
    assert_eq!(config.aggregation.collection_policy, CollectionPolicy::Resolved);
    assert_eq!(config.aggregation.max_deliveries, 75);
    assert_eq!(config.logging.format, "json");
    assert_eq!(config.logging.level, "info");
}

#[test]
fn workspace_file_overrides_global_file() {
    let xdg = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write(
        &xdg.path().join("restview/config.toml"),
        "[aggregation]\ndelivery_order = \"lifo\"\nmax_deliveries = 20\n",
    );
    write(&workspace.path().join("config/config.toml"), "[aggregation]\nmax_deliveries = 30\n");

    let (config, path) = with_env(
        &[("XDG_CONFIG_HOME", xdg.path().to_str().unwrap()), ("RESTVIEW_ENV", "test")],
        || (ConfigLoader::load(workspace.path()).unwrap(), global_config_path()),
    );
    assert_eq!(path.unwrap(), xdg.path().join("restview/config.toml"));
    assert_eq!(config.aggregation.delivery_order, DeliveryOrder::Lifo);
    assert_eq!(config.aggregation.max_deliveries, 30);
}

#[test]
fn environment_overrides_every_file() {
    let xdg = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write(&workspace.path().join("config/config.toml"), "[aggregation]\nmax_deliveries = 30\n");

    let config = with_env(
        &[
            ("XDG_CONFIG_HOME", xdg.path().to_str().unwrap()),
            ("RESTVIEW_ENV", "test"),
            ("RESTVIEW__AGGREGATION__MAX_DELIVERIES", "5"),
            ("RESTVIEW__AGGREGATION__COLLECTION_POLICY", "resolved"),
        ],
        || ConfigLoader::load(workspace.path()).unwrap(),
    );
    assert_eq!(config.aggregation.max_deliveries, 5);
    assert_eq!(config.aggregation.collection_policy, CollectionPolicy::Resolved);
}

#[test]
fn empty_workspace_yields_defaults() {
    let xdg = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    let config = with_env(
        &[("XDG_CONFIG_HOME", xdg.path().to_str().unwrap()), ("RESTVIEW_ENV", "test")],
        || ConfigLoader::load(workspace.path()).unwrap(),
    );
    assert_eq!(config, ConfigLoader::defaults().unwrap());
    assert!(config.validate().is_ok());
}
