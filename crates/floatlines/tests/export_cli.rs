use std::fs;
use std::process::Command;

use tempfile::TempDir;

#[test]
fn export_writes_png_without_a_window() {
    let root = TempDir::new().unwrap();
    let output = root.path().join("frames/out.png");

    let result = Command::new(env!("CARGO_BIN_EXE_floatlines"))
        .env_remove("FLOATLINES_CONFIG")
        .args(["--export"])
        .arg(&output)
        .args(["--size", "64x36", "--still-time", "2"])
        .output()
        .expect("failed to run floatlines --export");

    assert!(
        result.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&result.stderr)
    );
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.trim().ends_with("out.png"));

    let image = image::open(&output).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (64, 36));
}

#[test]
fn export_honours_scene_file() {
    let root = TempDir::new().unwrap();
    let scene = root.path().join("scene.toml");
    fs::write(
        &scene,
        r#"
version = 1

[lines]
enabled_waves = []

[window]
size = "20x10"
"#,
    )
    .unwrap();
    let output = root.path().join("blank.png");

    let status = Command::new(env!("CARGO_BIN_EXE_floatlines"))
        .arg("--config")
        .arg(&scene)
        .arg("--export")
        .arg(&output)
        .status()
        .expect("failed to run floatlines with a scene file");
    assert!(status.success());

    let image = image::open(&output).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (20, 10));
    assert!(image
        .pixels()
        .all(|pixel| pixel[0] == 0 && pixel[1] == 0 && pixel[2] == 0));
}

#[test]
fn malformed_scene_fails() {
    let root = TempDir::new().unwrap();
    let scene = root.path().join("broken.toml");
    fs::write(&scene, "version = 7\n").unwrap();

    let result = Command::new(env!("CARGO_BIN_EXE_floatlines"))
        .arg("--config")
        .arg(&scene)
        .args(["--export"])
        .arg(root.path().join("never.png"))
        .output()
        .expect("failed to run floatlines with a broken scene");

    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("broken.toml"));
    assert!(!root.path().join("never.png").exists());
}
