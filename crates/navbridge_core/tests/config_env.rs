use std::env;
use std::sync::{Mutex, OnceLock};

use navbridge_core::camera::CameraMode;
use navbridge_core::config::{
    NavConfig, ENV_ACCESS_TOKEN, ENV_DISTANCE_UNIT, ENV_SHEET, ENV_SHEET_EXPANDED, ENV_SIMULATE,
};
use navbridge_core::route::DistanceUnit;

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(())).lock().expect("lock")
}

fn clear_env() {
    for key in [
        ENV_ACCESS_TOKEN,
        ENV_DISTANCE_UNIT,
        ENV_SIMULATE,
        ENV_SHEET,
        ENV_SHEET_EXPANDED,
    ] {
        env::remove_var(key);
    }
}

#[test]
fn cli_flags_override_environment() {
    let _guard = env_lock();
    clear_env();
    env::set_var(ENV_DISTANCE_UNIT, "imperial");
    env::set_var(ENV_SIMULATE, "yes");

    let config = NavConfig::from_args_iter([
        "bin",
        "--unit",
        "metric",
        "--no-simulate",
        "--camera=overview",
        "--language=fr",
    ]);

    assert_eq!(config.distance_unit, DistanceUnit::Metric);
    assert!(!config.simulate);
    assert_eq!(config.camera_mode, CameraMode::Overview);
    assert_eq!(config.language, "fr");

    clear_env();
}

#[test]
fn invalid_values_keep_defaults() {
    let _guard = env_lock();
    clear_env();

    let config = NavConfig::from_args_iter(["bin", "--unit", "parsecs", "--language", " "]);
    assert_eq!(config.distance_unit, DistanceUnit::Metric);
    assert_eq!(config.language, "en");
}

#[test]
fn access_token_comes_from_environment() {
    let _guard = env_lock();
    clear_env();
    env::set_var(ENV_ACCESS_TOKEN, "pk.eyJ1IjoidGVzdCJ9.signature");

    let config = NavConfig::from_args_iter(["bin"]);
    assert_eq!(
        config.require_access_token().unwrap(),
        "pk.eyJ1IjoidGVzdCJ9.signature"
    );

    let overridden = NavConfig::from_args_iter(["bin", "--token", "bad"]);
    assert!(overridden.require_access_token().is_err());

    clear_env();
}

#[test]
fn sheet_options_come_from_environment_and_flags() {
    let _guard = env_lock();
    clear_env();

    let defaults = NavConfig::from_args_iter(["bin"]);
    assert!(defaults.sheet_enabled);
    assert!(!defaults.sheet_expanded);

    env::set_var(ENV_SHEET, "off");
    env::set_var(ENV_SHEET_EXPANDED, "true");
    let from_env = NavConfig::from_args_iter(["bin"]);
    assert!(!from_env.sheet_enabled);
    assert!(from_env.sheet_expanded);

    env::remove_var(ENV_SHEET);
    env::remove_var(ENV_SHEET_EXPANDED);
    let from_flags = NavConfig::from_args_iter(["bin", "--no-sheet", "--sheet-expanded"]);
    assert!(!from_flags.sheet_enabled);
    assert!(from_flags.sheet_expanded);

    clear_env();
}
