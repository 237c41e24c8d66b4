use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn combined_output(output: &std::process::Output) -> String {
    format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

/// Runs the binary with an empty config so a user config cannot leak in.
fn curator(tmp: &TempDir) -> Command {
    let config = tmp.path().join("config.json");
    if !config.exists() {
        fs::write(&config, "{}").expect("write config");
    }
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("scene-dataset-curator"));
    cmd.arg("--config").arg(config);
    cmd
}

fn write_png(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbImage::new(width, height).save(path).unwrap();
}

fn make_scene(tmp: &TempDir) -> PathBuf {
    let scene = tmp.path().join("230825-MascotDrawing");
    write_png(&scene.join("230825-MascotDrawing-Clean/images/a.png"), 4, 3);
    write_png(&scene.join("230825-MascotDrawing-Clean/images/b.png"), 4, 3);
    write_png(&scene.join("230825-MascotDrawing-Clutter/images/a.png"), 4, 3);
    scene
}

#[test]
fn help_lists_all_commands() {
    let tmp = TempDir::new().unwrap();
    let output = curator(&tmp).arg("--help").output().expect("--help runs");
    assert!(output.status.success());
    let text = combined_output(&output);
    for cmd in ["manifest", "merge", "split", "check-split", "frame-counts"] {
        assert!(text.contains(cmd), "help text missing {cmd}: {text}");
    }
}

#[test]
fn manifest_merge_split_check_pipeline() {
    let tmp = TempDir::new().unwrap();
    let scene = make_scene(&tmp);

    let output = curator(&tmp).arg("manifest").arg(&scene).output().unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let meta: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(scene.join("meta.json")).unwrap()).unwrap();
    assert_eq!(meta["resolution"], "4x3");
    assert_eq!(meta["total_images"], 3);
    assert_eq!(meta["clean"]["count"], 2);
    assert_eq!(meta["clutter"]["count"], 1);

    let output = curator(&tmp).arg("merge").arg(&scene).output().unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let mut merged: Vec<_> = fs::read_dir(scene.join("230825-MascotDrawing-All/images"))
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    merged.sort();
    assert_eq!(merged, vec!["clutter_a.png", "extra_a.png", "extra_b.png"]);

    // The merged pool is not part of the manifest on a rebuild
    let output = curator(&tmp).arg("manifest").arg(&scene).output().unwrap();
    assert!(output.status.success());
    let meta: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(scene.join("meta.json")).unwrap()).unwrap();
    assert_eq!(meta["total_images"], 3);

    let model = scene.join("undistortion_sparse/0");
    fs::create_dir_all(&model).unwrap();
    let mut images_txt = String::from("# IMAGE_ID, QW, QX, QY, QZ, TX, TY, TZ, CAMERA_ID, NAME\n");
    for (id, name) in merged.iter().enumerate() {
        images_txt.push_str(&format!("{} 1 0 0 0 0 0 0 1 {}\n\n", id + 1, name));
    }
    fs::write(model.join("images.txt"), images_txt).unwrap();

    let output = curator(&tmp).arg("split").arg(&scene).output().unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let split = fs::read_to_string(scene.join("split.json")).unwrap();
    assert_eq!(
        split,
        "{\n  \"train\": [\n    \"clutter_a.png\"\n  ],\n  \"test\": [\n    \"extra_a.png\",\n    \"extra_b.png\"\n  ]\n}\n"
    );

    let output = curator(&tmp).arg("check-split").arg(&scene).output().unwrap();
    assert!(output.status.success());
    assert!(combined_output(&output).contains("All train/test entries follow the expected keyword pattern"));
}

#[test]
fn check_split_warns_but_succeeds_on_violations() {
    let tmp = TempDir::new().unwrap();
    let scene = tmp.path().join("scene");
    fs::create_dir_all(&scene).unwrap();
    fs::write(
        scene.join("split.json"),
        r#"{"train": ["extra_1.jpg"], "test": ["extra_2.jpg"]}"#,
    )
    .unwrap();

    let output = curator(&tmp).arg("check-split").arg(&scene).output().unwrap();
    assert!(output.status.success());
    let text = combined_output(&output);
    assert!(text.contains("extra_1.jpg"), "{text}");
    assert!(text.contains("missing 'clutter'"), "{text}");
}

#[test]
fn missing_inputs_exit_non_zero() {
    let tmp = TempDir::new().unwrap();
    let scene = tmp.path().join("230825-Nothing");
    fs::create_dir_all(&scene).unwrap();

    for cmd in ["merge", "split", "check-split", "frame-counts"] {
        let output = curator(&tmp).arg(cmd).arg(&scene).output().unwrap();
        assert!(!output.status.success(), "{cmd} should fail");
    }
}

#[test]
fn resolution_mismatch_leaves_no_manifest() {
    let tmp = TempDir::new().unwrap();
    let scene = tmp.path().join("010125-Odd");
    write_png(&scene.join("010125-Odd-Clean/images/a.png"), 4, 3);
    write_png(&scene.join("010125-Odd-Clutter/images/a.png"), 3, 4);

    let output = curator(&tmp).arg("manifest").arg(&scene).output().unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("resolution mismatch"));
    assert!(!scene.join("meta.json").exists());
}

#[test]
fn log_dir_writes_a_log_file_alongside_stdout() {
    let tmp = TempDir::new().unwrap();
    let scene = make_scene(&tmp);
    let logs = tmp.path().join("logs");

    let output = curator(&tmp)
        .arg("--log-dir")
        .arg(&logs)
        .arg("manifest")
        .arg(&scene)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("Log file created at"));

    let files: Vec<_> = fs::read_dir(&logs).unwrap().flatten().map(|e| e.path()).collect();
    assert_eq!(files.len(), 1);
    let name = files[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("scene_curator_") && name.ends_with(".log"), "{name}");
    let contents = fs::read_to_string(&files[0]).unwrap();
    assert!(contents.contains("230825-MascotDrawing"), "{contents}");
    assert!(!contents.contains('\u{1b}'), "file log must not carry ANSI escapes");
}
