// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use wlmaker::config::settings::Settings;
use wlmaker::utils::telemetry::init_telemetry;

#[test]
fn test_error_records_reach_the_error_log() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = Settings::with_defaults().unwrap();
    settings.logging.error_log = dir.path().join("logs").join("error.log");

    init_telemetry(&settings.logging).unwrap();
    tracing::info!("not an error");
    tracing::error!(target_input = "https://example.com", "collector exploded");

    let log = std::fs::read_to_string(&settings.logging.error_log).unwrap();
    assert!(log.contains("collector exploded"));
    assert!(!log.contains("not an error"));

    // The global subscriber can only be installed once per process
    assert!(init_telemetry(&settings.logging).is_err());
}
