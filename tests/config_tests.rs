use std::path::PathBuf;

use timetable_view::{ConfigError, TtvConfig};

#[test]
fn save_and_load_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ttv.toml");
    let config = TtvConfig {
        ical_href: Some("https://timetable.example.edu/ical/student.ics".to_string()),
        view_id: Some("uni".to_string()),
        views_dir: PathBuf::from("/srv/ttv/views"),
        ..TtvConfig::default()
    };
    config.save(&path).expect("save config");
    let loaded = TtvConfig::load(&path).expect("load config");
    assert_eq!(loaded, config);
    assert_eq!(loaded.view_path("uni"), PathBuf::from("/srv/ttv/views/uni.json"));
}

#[test]
fn sample_config_builds_feed_url() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/ttv.toml");
    let config = TtvConfig::load(&path).expect("load sample config");
    assert_eq!(config.view_id.as_deref(), Some("uni"));
    assert_eq!(
        config.feed_url().as_deref(),
        Some(
            "https://api.allorigins.win/raw?url=\
             https%3A%2F%2Ftimetable.example.edu%2Fical%2Fstudent.ics"
        )
    );
    assert!(config.stylesheet_path("uni").ends_with("views/uni.css"));
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = TtvConfig::load(&dir.path().join("absent.toml")).expect_err("no file");
    assert!(matches!(err, ConfigError::NotFound(_)));
}

#[test]
fn invalid_toml_is_a_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ttv.toml");
    std::fs::write(&path, "view_id = [unclosed").expect("write");
    let err = TtvConfig::load(&path).expect_err("bad toml");
    assert!(matches!(err, ConfigError::Parse(_)));
}
