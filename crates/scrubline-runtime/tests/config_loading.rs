//! File-based loading of `ScrubberConfig`.

#![cfg(feature = "config")]

use std::io::Write;

use scrubline_runtime::{ConfigError, ScrubberConfig};

#[test]
fn toml_file_round_trip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "loop_playback = true").unwrap();
    writeln!(file, "default_trim_end = 5.0").unwrap();
    let config = ScrubberConfig::from_toml_file(file.path()).unwrap();
    assert!(config.loop_playback);
    assert_eq!(config.default_trim_end, 5.0);
    assert_eq!(config.knob_width, ScrubberConfig::default().knob_width);
}

#[test]
fn json_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scrubline.json");
    std::fs::write(&path, r#"{ "edge_width": 24.0, "passthrough": false }"#).unwrap();
    let config = ScrubberConfig::from_json_file(&path).unwrap();
    assert_eq!(config.edge_width, 24.0);
    assert!(!config.passthrough);
}

#[test]
fn serialized_default_loads_back() {
    let text = toml::to_string(&ScrubberConfig::default()).unwrap();
    assert_eq!(ScrubberConfig::from_toml_str(&text).unwrap(), ScrubberConfig::default());
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ScrubberConfig::from_toml_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn loaded_values_still_validated() {
    let config = ScrubberConfig::from_toml_str("min_width_ratio = 0.0").unwrap();
    assert!(matches!(config.validated(), Err(ConfigError::Validation(v)) if v.len() == 1));
}
