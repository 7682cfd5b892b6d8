//! `disable_existing_loggers` touches the process-wide logger cache, so it
//! runs in its own test binary as a single test.

use rainbow_core::config::parse_config;
use rainbow_core::{get_config_logger, get_default_logger, LoggerKind};
use tracing_subscriber::filter::LevelFilter;

#[test]
fn disable_existing_spares_loggers_named_in_config() {
    let unnamed = get_default_logger("earlier");
    let named = get_default_logger("jobs");

    let keep_all = parse_config(r#"{ "version": 1, "loggers": { "": {} } }"#).unwrap();
    get_config_logger("first", &keep_all).unwrap();
    assert_eq!(unnamed.level(), LevelFilter::INFO);
    assert_eq!(named.level(), LevelFilter::INFO);

    let config = parse_config(
        r#"{
            "version": 1,
            "disable_existing_loggers": true,
            "loggers": {
                "": { "level": "DEBUG" },
                "jobs": { "level": "WARNING" }
            }
        }"#,
    )
    .unwrap();
    let current = get_config_logger("current", &config).unwrap();

    assert_eq!(current.kind(), LoggerKind::Config);
    assert_eq!(current.level(), LevelFilter::DEBUG);
    assert_eq!(unnamed.level(), LevelFilter::OFF);
    assert_eq!(named.level(), LevelFilter::INFO);
}
