use std::fs;

use lineconfig::{ConfigError, SceneFile};
use tempfile::TempDir;

#[test]
fn loads_scene_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("calm.toml");
    fs::write(
        &path,
        r#"
version = 1

[lines]
interactive = false
line_count = 6

[window]
size = "640x360"
"#,
    )
    .unwrap();

    let scene = SceneFile::load(&path).expect("load scene");
    assert!(!scene.lines.interactive);
    assert_eq!(scene.window.dimensions().unwrap(), Some((640, 360)));
    assert_eq!(scene.lines.resolve().visible_lines(), 18);
}

#[test]
fn missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    let err = SceneFile::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.toml"));
}
