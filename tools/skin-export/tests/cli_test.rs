//! Integration tests for the skin-export binary
//!
//! Writes scene files, runs the binary, and checks the results on disk.

use std::path::Path;
use std::process::{Command, Output, Stdio};

use skin_export::{SceneFile, SkinHost};
use tempfile::tempdir;

fn write_scenes(dir: &Path) {
    let mut source = SceneFile::new(dir, "2024");
    source.add_binding(
        "skinCluster1",
        "|strip",
        vec![
            ("root".to_string(), vec![1.0, 0.75, 0.25, 0.0]),
            ("tip".to_string(), vec![0.0, 0.25, 0.75, 1.0]),
        ],
    );
    source.save(&dir.join("source.json")).expect("Failed to write scene");

    let mut target = SceneFile::new(dir, "2024");
    target.add_binding(
        "skinCluster7",
        "|strip_copy",
        vec![
            ("tip".to_string(), vec![0.5; 4]),
            ("root".to_string(), vec![0.5; 4]),
        ],
    );
    target.save(&dir.join("target.json")).expect("Failed to write scene");
}

fn skin_export(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_skin-export"))
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("Failed to run skin-export")
}

#[test]
fn test_cli_export_then_import() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_scenes(dir.path());
    let source = dir.path().join("source.json");
    let target = dir.path().join("target.json");
    let doc = dir.path().join("strip.json");

    let out = skin_export(&[
        "export",
        source.to_str().unwrap(),
        "skinCluster1",
        "-o",
        doc.to_str().unwrap(),
        "-c",
        "rigger",
    ]);
    assert!(out.status.success(), "export failed: {:?}", out);
    assert!(doc.exists());

    let out = skin_export(&[
        "import",
        target.to_str().unwrap(),
        "skinCluster7",
        doc.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "import failed: {:?}", out);

    let scene = SceneFile::load(&target).unwrap();
    assert_eq!(
        scene.query_weights("skinCluster7", "root", 4).unwrap(),
        vec![1.0, 0.75, 0.25, 0.0]
    );
    assert_eq!(scene.query_weight("skinCluster7", "tip", 0), Ok(0.0));
}

#[test]
fn test_cli_export_defaults_to_project_data_dir() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_scenes(dir.path());
    std::fs::create_dir(dir.path().join("data")).unwrap();
    let source = dir.path().join("source.json");

    let out = skin_export(&[
        "--config",
        dir.path().join("missing.toml").to_str().unwrap(),
        "list",
        source.to_str().unwrap(),
    ]);
    // An explicit config path must exist
    assert!(!out.status.success());

    let out = skin_export(&["export", source.to_str().unwrap(), "skinCluster1"]);
    assert!(out.status.success(), "export failed: {:?}", out);
    assert!(dir.path().join("data").join("skinCluster1.json").exists());
}

#[test]
fn test_cli_refuses_overwrite_without_force() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_scenes(dir.path());
    let source = dir.path().join("source.json");
    let doc = dir.path().join("strip.json");
    std::fs::write(&doc, "keep me").unwrap();

    // stdin is closed, so the prompt reads no answer
    let out = skin_export(&[
        "export",
        source.to_str().unwrap(),
        "skinCluster1",
        "-o",
        doc.to_str().unwrap(),
    ]);
    assert!(!out.status.success());
    assert_eq!(std::fs::read_to_string(&doc).unwrap(), "keep me");

    let out = skin_export(&[
        "export",
        source.to_str().unwrap(),
        "skinCluster1",
        "-o",
        doc.to_str().unwrap(),
        "--force",
    ]);
    assert!(out.status.success(), "forced export failed: {:?}", out);
    assert_ne!(std::fs::read_to_string(&doc).unwrap(), "keep me");
}

#[test]
fn test_cli_dry_run_leaves_scene() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_scenes(dir.path());
    let source = dir.path().join("source.json");
    let target = dir.path().join("target.json");
    let doc = dir.path().join("strip.json");

    let out = skin_export(&[
        "export",
        source.to_str().unwrap(),
        "skinCluster1",
        "-o",
        doc.to_str().unwrap(),
    ]);
    assert!(out.status.success());

    let before = std::fs::read_to_string(&target).unwrap();
    let out = skin_export(&[
        "import",
        target.to_str().unwrap(),
        "skinCluster7",
        doc.to_str().unwrap(),
        "--dry-run",
    ]);
    assert!(out.status.success(), "dry run failed: {:?}", out);
    assert_eq!(std::fs::read_to_string(&target).unwrap(), before);
}

#[test]
fn test_cli_inspect() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_scenes(dir.path());
    let source = dir.path().join("source.json");
    let doc = dir.path().join("strip.json");

    let out = skin_export(&[
        "export",
        source.to_str().unwrap(),
        "skinCluster1",
        "-o",
        doc.to_str().unwrap(),
        "-c",
        "rigger",
    ]);
    assert!(out.status.success());

    let out = skin_export(&["inspect", doc.to_str().unwrap()]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("skinCluster1"));
    assert!(stdout.contains("rigger"));
    assert!(stdout.contains("root, tip"));
}

#[test]
fn test_cli_inspect_respects_size_cap() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_scenes(dir.path());
    let source = dir.path().join("source.json");
    let doc = dir.path().join("strip.json");
    let config = dir.path().join("skin-export.toml");
    std::fs::write(&config, "max_document_bytes = 16\n").unwrap();

    let out = skin_export(&[
        "export",
        source.to_str().unwrap(),
        "skinCluster1",
        "-o",
        doc.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "export failed: {:?}", out);

    let out = skin_export(&[
        "--config",
        config.to_str().unwrap(),
        "inspect",
        doc.to_str().unwrap(),
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("too large"));
}
