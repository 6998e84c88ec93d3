use std::time::Duration;

use borderd_rest::config::Config;

#[test]
fn test_config_defaults() {
    let cfg = Config::default();
    assert_eq!(cfg.listen_addr, "127.0.0.1:8081");
    assert_eq!(cfg.read_timeout_ms, 2_000);
    assert_eq!(cfg.handler_timeout_ms, 10_000);
    assert_eq!(cfg.write_timeout_ms, 10_000);
    assert_eq!(cfg.diagnostics_window_ms, 2_000);
}

#[test]
fn test_config_from_yaml() {
    let cfg = Config::from_yaml(
        "listen_addr: 0.0.0.0:8090\nread_timeout_ms: 500\ndiagnostics_window_ms: 1000\n",
    )
    .unwrap();

    assert_eq!(cfg.listen_addr, "0.0.0.0:8090");
    assert_eq!(cfg.read_timeout_ms, 500);
    // Unset fields keep their defaults.
    assert_eq!(cfg.write_timeout_ms, 10_000);
    assert_eq!(cfg.diagnostics_window_ms, 1_000);
}

#[test]
fn test_config_empty_yaml_is_all_defaults() {
    let cfg = Config::from_yaml("{}").unwrap();
    assert_eq!(cfg.listen_addr, "127.0.0.1:8081");
}

#[test]
fn test_config_timeouts_mapping() {
    let cfg = Config::from_yaml(
        "read_timeout_ms: 250\nhandler_timeout_ms: 750\nwrite_timeout_ms: 1250\n",
    )
    .unwrap();
    let timeouts = cfg.timeouts();

    assert_eq!(timeouts.read, Duration::from_millis(250));
    assert_eq!(timeouts.handler, Duration::from_millis(750));
    assert_eq!(timeouts.write, Duration::from_millis(1250));
}

#[test]
fn test_config_listen_env_override() {
    unsafe {
        std::env::set_var("LISTEN", "0.0.0.0:3000");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.listen_addr, "0.0.0.0:3000");
    unsafe {
        std::env::remove_var("LISTEN");
    }
}
