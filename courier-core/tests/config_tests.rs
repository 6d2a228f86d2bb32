//! Validation rules that decide which dispatchers start.

use std::path::PathBuf;
use std::time::Duration;

use courier_core::{ConfigError, RelayConfig, SocketPath, DEFAULT_INTERVAL_SECS, DEFAULT_SETTLE};
use rstest::rstest;

fn config(
    socket: Option<&str>,
    message: Option<&str>,
    interval_secs: i64,
    watch_dir: Option<&str>,
) -> RelayConfig {
    RelayConfig {
        socket: socket.map(PathBuf::from),
        message: message.map(PathBuf::from),
        interval_secs,
        watch_dir: watch_dir.map(PathBuf::from),
        settle: DEFAULT_SETTLE,
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[rstest]
#[case::absent(None)]
#[case::empty(Some(""))]
fn missing_socket_is_rejected(#[case] socket: Option<&str>) {
    let err = config(socket, Some("/tmp/m.txt"), 10, Some("/tmp/watch"))
        .validate()
        .unwrap_err();
    assert_eq!(err, ConfigError::MissingSocketPath);
    assert!(err.to_string().contains("socket"), "got: {err}");
}

#[rstest]
#[case::absent(None)]
#[case::empty(Some(""))]
fn positive_interval_without_message_or_watch_is_rejected(#[case] message: Option<&str>) {
    let err = config(Some("/tmp/s.sock"), message, 10, None)
        .validate()
        .unwrap_err();
    assert_eq!(err, ConfigError::MissingMessagePath);
}

#[rstest]
#[case::zero(0)]
#[case::negative(-3)]
fn disabled_interval_without_watch_has_nothing_to_do(#[case] interval_secs: i64) {
    let err = config(Some("/tmp/s.sock"), Some("/tmp/m.txt"), interval_secs, Some(""))
        .validate()
        .unwrap_err();
    assert_eq!(err, ConfigError::NothingToDo { interval_secs });
    assert!(err.to_string().contains(&interval_secs.to_string()));
}

// ---------------------------------------------------------------------------
// Mode selection
// ---------------------------------------------------------------------------

#[test]
fn interval_only() {
    let plan = config(Some("/tmp/s.sock"), Some("/tmp/m.txt"), 3, None)
        .validate()
        .expect("valid");
    assert_eq!(plan.socket, SocketPath::from("/tmp/s.sock"));
    let interval = plan.interval.as_ref().expect("interval plan");
    assert_eq!(interval.message, PathBuf::from("/tmp/m.txt"));
    assert_eq!(interval.period, Duration::from_secs(3));
    assert!(plan.watch.is_none());
    assert!(!plan.skipped_interval);
    assert_eq!(plan.modes(), vec!["interval"]);
}

#[test]
fn watch_only_when_interval_disabled() {
    let plan = config(Some("/tmp/s.sock"), Some("/tmp/m.txt"), 0, Some("/tmp/watch"))
        .validate()
        .expect("valid");
    assert!(plan.interval.is_none());
    assert!(!plan.skipped_interval);
    let watch = plan.watch.as_ref().expect("watch plan");
    assert_eq!(watch.dir, PathBuf::from("/tmp/watch"));
    assert_eq!(watch.settle, DEFAULT_SETTLE);
    assert_eq!(plan.modes(), vec!["watch"]);
}

#[test]
fn watch_only_flags_skipped_interval_when_message_missing() {
    let plan = config(Some("/tmp/s.sock"), None, DEFAULT_INTERVAL_SECS, Some("/tmp/watch"))
        .validate()
        .expect("valid");
    assert!(plan.interval.is_none());
    assert!(plan.skipped_interval);
    assert_eq!(plan.modes(), vec!["watch"]);
}

#[test]
fn both_modes_run_together() {
    let plan = config(Some("/tmp/s.sock"), Some("/tmp/m.txt"), 1, Some("/tmp/watch"))
        .validate()
        .expect("valid");
    assert_eq!(plan.modes(), vec!["interval", "watch"]);
}

#[test]
fn default_config_uses_ten_second_interval() {
    let plan = RelayConfig {
        socket: Some(PathBuf::from("/tmp/s.sock")),
        message: Some(PathBuf::from("/tmp/m.txt")),
        ..RelayConfig::default()
    }
    .validate()
    .expect("valid");
    assert_eq!(
        plan.interval.expect("interval plan").period,
        Duration::from_secs(10)
    );
}
