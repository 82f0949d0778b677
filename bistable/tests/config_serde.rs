use std::time::Duration;

use bistable::config::{MonitorKind, ReloadConfig, ReloadMode};

#[test]
fn empty_document_yields_defaults() {
    let config: ReloadConfig = serde_json::from_str("{}").unwrap();

    assert_eq!(ReloadConfig::default(), config);
}

#[test]
fn whole_second_integers_are_accepted() {
    let config: ReloadConfig = serde_json::from_str(
        r#"{
            "mode": "internally_driven",
            "monitor_kind": "file_mod_time",
            "poll_interval": 30,
            "grace_period": 5,
            "monitor_param": "./test_for_reload"
        }"#,
    )
    .unwrap();

    assert_eq!(
        ReloadConfig::internally_driven(
            MonitorKind::FileModTime,
            Duration::from_secs(30),
            Duration::from_secs(5)
        )
        .with_monitor_param("./test_for_reload"),
        config
    );
}

#[test]
fn serializes_back_to_the_same_shape() {
    let config = ReloadConfig::externally_driven(MonitorKind::Always, Duration::from_secs(2));

    let value = serde_json::to_value(&config).unwrap();

    assert_eq!(
        serde_json::json!({
            "mode": "externally_driven",
            "monitor_kind": "always",
            "poll_interval": 60.0,
            "grace_period": 2.0,
            "monitor_param": null
        }),
        value
    );
    assert_eq!(config, serde_json::from_value::<ReloadConfig>(value).unwrap());
}

#[test]
fn sub_second_durations_survive_a_round_trip() {
    let config = ReloadConfig::internally_driven(
        MonitorKind::Always,
        Duration::from_millis(500),
        Duration::from_millis(250),
    );

    let text = serde_json::to_string(&config).unwrap();
    let read_back: ReloadConfig = serde_json::from_str(&text).unwrap();

    assert_eq!(config, read_back);
    assert!(read_back.validate().is_ok());
}

#[test]
fn fractional_seconds_are_accepted() {
    let config: ReloadConfig =
        serde_json::from_str(r#"{ "poll_interval": 0.5, "grace_period": 1.25 }"#).unwrap();

    assert_eq!(Duration::from_millis(500), config.poll_interval);
    assert_eq!(Duration::from_millis(1250), config.grace_period);
}

#[test]
fn unrecognized_monitor_kind_deserializes_to_unknown() {
    let config: ReloadConfig =
        serde_json::from_str(r#"{ "monitor_kind": "zookeeper_watch" }"#).unwrap();

    assert_eq!(MonitorKind::Unknown, config.monitor_kind);
    assert_eq!(ReloadMode::InternallyDriven, config.mode);
}

#[test]
fn unrecognized_mode_is_rejected() {
    let result = serde_json::from_str::<ReloadConfig>(r#"{ "mode": "sometimes" }"#);

    assert!(result.is_err());
}
