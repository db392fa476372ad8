use geoprep::config::{ConfigError, Settings, DEFAULT_PORT};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn yaml_file_fills_defaults_for_missing_fields() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("geoprep.yaml");
    fs::write(
        &path,
        r#"
input_dir: /srv/geoprep/input
output_dir: /srv/geoprep/output
initial_lat: 46.2
initial_lon: 6.1
converters:
  timeout_seconds: 120
"#,
    )
    .expect("write config");

    let settings = Settings::from_path(&path).expect("load");
    settings.validate().expect("valid");
    assert_eq!(settings.input_dir, PathBuf::from("/srv/geoprep/input"));
    assert_eq!(settings.port, DEFAULT_PORT);
    assert_eq!(settings.public_dir, PathBuf::from("public"));
    assert_eq!(settings.converters.ghostscript, "gs");
    assert_eq!(settings.converters.enscript, "enscript");
    assert_eq!(
        settings.converters.timeout(),
        Some(Duration::from_secs(120))
    );
    assert_eq!(settings.geoserver_url, None);
}

#[test]
fn unreadable_and_malformed_files_name_the_path() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("absent.yaml");
    let err = Settings::from_path(&missing).expect_err("missing");
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("absent.yaml"));

    let broken = dir.path().join("broken.yaml");
    fs::write(&broken, "port: [not, a, number]\n").expect("write");
    let err = Settings::from_path(&broken).expect_err("malformed");
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn zero_timeout_is_rejected() {
    let mut settings = Settings {
        input_dir: PathBuf::from("/in"),
        output_dir: PathBuf::from("/out"),
        ..Settings::default()
    };
    settings.converters.timeout_seconds = Some(0);
    let err = settings.validate().expect_err("zero timeout");
    assert!(err.to_string().contains("timeout_seconds"));
}
